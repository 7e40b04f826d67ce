//! Fetching the text of linked stylesheets.
//!
//! `file:` URLs are read from disk, `http`/`https` URLs with a blocking
//! reqwest client.

use crate::config::ExtractorConfig;
use crate::error::LoadError;
use std::collections::HashMap;
use std::fs;
use url::Url;

/// User-Agent header sent with stylesheet requests.
const USER_AGENT: &str = concat!("sheetgrab/", env!("CARGO_PKG_VERSION"));

pub trait SheetLoader: Send + Sync {
    fn load(&self, url: &Url) -> Result<String, LoadError>;
}

pub struct DefaultLoader {
    client: reqwest::blocking::Client,
}

impl DefaultLoader {
    pub fn new(config: &ExtractorConfig) -> Result<Self, LoadError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(LoadError::Client)?;
        Ok(DefaultLoader { client })
    }

    fn fetch_text(&self, url: &Url) -> Result<String, LoadError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|source| LoadError::Http {
                url: url.to_string(),
                source,
            })?;

        if !response.status().is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().map_err(|source| LoadError::Http {
            url: url.to_string(),
            source,
        })
    }
}

impl SheetLoader for DefaultLoader {
    fn load(&self, url: &Url) -> Result<String, LoadError> {
        match url.scheme() {
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|()| LoadError::BadFileUrl(url.to_string()))?;
                fs::read_to_string(&path).map_err(|source| LoadError::Io { path, source })
            }
            "http" | "https" => self.fetch_text(url),
            other => Err(LoadError::UnsupportedScheme(other.to_string())),
        }
    }
}

/// Serves stylesheets from memory, keyed by absolute URL.
#[derive(Debug, Default, Clone)]
pub struct StaticLoader {
    sheets: HashMap<Url, String>,
}

impl StaticLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sheet(mut self, url: Url, css_text: impl Into<String>) -> Self {
        self.sheets.insert(url, css_text.into());
        self
    }
}

impl SheetLoader for StaticLoader {
    fn load(&self, url: &Url) -> Result<String, LoadError> {
        self.sheets
            .get(url)
            .cloned()
            .ok_or_else(|| LoadError::NotFound(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::env;
    use std::process;

    #[test]
    fn test_reads_file_urls() {
        let path = env::temp_dir().join(format!("sheetgrab-loader-{}.css", process::id()));
        fs::write(&path, "a{color:red}").unwrap();
        let url = Url::from_file_path(&path).unwrap();

        let loader = DefaultLoader::new(&ExtractorConfig::default()).unwrap();
        assert_eq!(loader.load(&url).unwrap(), "a{color:red}");

        fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let path = env::temp_dir().join("sheetgrab-loader-does-not-exist.css");
        let url = Url::from_file_path(&path).unwrap();
        let loader = DefaultLoader::new(&ExtractorConfig::default()).unwrap();
        assert!(matches!(loader.load(&url), Err(LoadError::Io { .. })));
    }

    #[test]
    fn test_unsupported_scheme() {
        let url = Url::parse("data:text/css,a{}").unwrap();
        let loader = DefaultLoader::new(&ExtractorConfig::default()).unwrap();
        assert!(matches!(
            loader.load(&url),
            Err(LoadError::UnsupportedScheme(scheme)) if scheme == "data"
        ));
    }

    #[test]
    fn test_static_loader() {
        let url = Url::parse("https://x/y.css").unwrap();
        let loader = StaticLoader::new().with_sheet(url.clone(), "b{}");
        assert_eq!(loader.load(&url).unwrap(), "b{}");
        let other = Url::parse("https://x/z.css").unwrap();
        assert!(matches!(loader.load(&other), Err(LoadError::NotFound(_))));
    }
}
