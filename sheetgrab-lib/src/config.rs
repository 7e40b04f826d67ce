use std::time::Duration;

/// Delay between `publish` and the clipboard write.
///
/// Hosts tend to refuse clipboard writes while the gesture that triggered the
/// extraction is still being handled, so the write is pushed back a little.
pub const DEFAULT_PUBLISH_DELAY: Duration = Duration::from_millis(2000);

/// Timeout for fetching linked stylesheets over HTTP.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Knobs for loading a document and publishing its CSS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorConfig {
    pub publish_delay: Duration,
    /// Expose linked sheets from other origins instead of denying access.
    pub allow_cross_origin: bool,
    pub fetch_timeout: Duration,
    /// Re-serialize each rule in minified form instead of keeping its
    /// source text. Values are rewritten too (`blue` becomes `#00f`).
    pub normalize_rules: bool,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            publish_delay: DEFAULT_PUBLISH_DELAY,
            allow_cross_origin: false,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            normalize_rules: false,
        }
    }
}

impl ExtractorConfig {
    pub fn with_publish_delay(mut self, delay: Duration) -> Self {
        self.publish_delay = delay;
        self
    }

    pub fn with_cross_origin(mut self, allow: bool) -> Self {
        self.allow_cross_origin = allow;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_normalized_rules(mut self, normalize: bool) -> Self {
        self.normalize_rules = normalize;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ExtractorConfig::default();
        assert_eq!(config.publish_delay, Duration::from_millis(2000));
        assert!(!config.allow_cross_origin);
        assert!(!config.normalize_rules);
    }

    #[test]
    fn test_builders_override_fields() {
        let config = ExtractorConfig::default()
            .with_publish_delay(Duration::ZERO)
            .with_cross_origin(true)
            .with_normalized_rules(true);
        assert_eq!(config.publish_delay, Duration::ZERO);
        assert!(config.allow_cross_origin);
        assert!(config.normalize_rules);
        assert_eq!(config.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
    }
}
