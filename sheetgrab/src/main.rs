use anyhow::{bail, Context, Result};
use clap::Parser;
use log::info;
use sheetgrab_lib::clipboard::SystemClipboard;
use sheetgrab_lib::schedule::ThreadScheduler;
use sheetgrab_lib::source::document::HtmlDocument;
use sheetgrab_lib::source::loader::DefaultLoader;
use sheetgrab_lib::style::sheet::StyleSheetList;
use sheetgrab_lib::{ExtractorConfig, StyleExtractor};
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[derive(Parser)]
#[command(name = "sheetgrab")]
#[command(about = "Copy the CSS of every stylesheet in an HTML document to the clipboard")]
struct Args {
    /// Input HTML file.
    input: PathBuf,

    /// URL the document was served from; relative links and the origin
    /// check use it. Defaults to the file's own `file:` URL.
    #[arg(long)]
    base_url: Option<Url>,

    /// Delay before writing to the clipboard, in milliseconds.
    #[arg(long, default_value_t = 2000)]
    delay_ms: u64,

    /// Also read stylesheets from other origins.
    #[arg(long)]
    allow_cross_origin: bool,

    /// Re-serialize rules in minified form instead of copying their source text.
    #[arg(long)]
    normalize: bool,

    /// Print the CSS to stdout instead of copying it.
    #[arg(long)]
    print: bool,

    /// Keep serving the clipboard for this long after copying (Linux only).
    #[arg(long, default_value_t = 0)]
    hold_ms: u64,
}

fn document_url(args: &Args) -> Result<Url> {
    if let Some(url) = &args.base_url {
        return Ok(url.clone());
    }
    let path = fs::canonicalize(&args.input)
        .with_context(|| format!("Error resolving {}", args.input.display()))?;
    Url::from_file_path(&path)
        .map_err(|()| anyhow::anyhow!("{} cannot be expressed as a file URL", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    // parse the args given in terminal
    let args: Args = Args::parse();

    let config = ExtractorConfig::default()
        .with_publish_delay(Duration::from_millis(args.delay_ms))
        .with_cross_origin(args.allow_cross_origin)
        .with_normalized_rules(args.normalize);

    let html_content = fs::read_to_string(&args.input)
        .with_context(|| format!("Error reading HTML file {}", args.input.display()))?;
    let url = document_url(&args)?;

    let loader = DefaultLoader::new(&config).context("Error setting up stylesheet loader")?;
    let document = HtmlDocument::from_html(&html_content, &url, &loader, &config);
    info!("Loaded {} stylesheets from {}", document.len(), url);

    let clipboard = if args.hold_ms > 0 {
        SystemClipboard::holding_for(Duration::from_millis(args.hold_ms))
    } else {
        SystemClipboard::new()
    };
    let extractor =
        StyleExtractor::from_config(&config, Arc::new(ThreadScheduler), Arc::new(clipboard));

    let css = extractor.collect(&document);
    if args.print {
        println!("{}", css);
        return Ok(());
    }

    let bytes = css.len();
    let publication = extractor.publish(css)?;
    // The write happens on another thread; stay alive until it is done.
    if let Err(e) = publication.wait() {
        bail!("Error copying CSS to the clipboard: {}", e);
    }
    eprintln!("Copied {} bytes of CSS to the clipboard.", bytes);
    Ok(())
}
