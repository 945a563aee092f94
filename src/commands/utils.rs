use anyhow::{Context, Result, anyhow};
use std::path::PathBuf;

use crate::config::EngineConfig;
use crate::context::{FrameTarget, IframeStep};
use crate::driver::DriverManager;
use crate::target::Target;
use crate::types::{OutputFormat, ViewportSize};
use crate::webdriver::{Browser, BrowserType};

/// Browser/session options shared by every subcommand.
#[derive(Debug, clap::Args)]
pub struct BrowserOpts {
    /// Browser to use
    #[arg(short, long, default_value = "firefox")]
    pub browser: String,

    /// Set viewport size (WIDTHxHEIGHT, e.g., 1920x1080)
    #[arg(long)]
    pub viewport: Option<String>,

    /// Run browser in visible mode (disables headless)
    #[arg(long = "no-headless")]
    pub no_headless: bool,

    /// Path to a config file (default: ~/.config/webgrip/config.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "json")]
    pub format: OutputFormat,
}

/// Iframe addressing shared by every subcommand: a single selector, a
/// single src substring, or a JSON path of steps for nested frames.
#[derive(Debug, Default, clap::Args)]
pub struct FrameOpts {
    /// CSS selector of an iframe to operate inside
    #[arg(long)]
    pub iframe: Option<String>,

    /// Substring of an iframe src URL to operate inside
    #[arg(long)]
    pub iframe_url: Option<String>,

    /// JSON array of iframe steps for nested frames,
    /// e.g. '[{"selector": "iframe.outer"}, {"url_pattern": "inner"}]'
    #[arg(long)]
    pub iframe_path: Option<String>,
}

/// Start (or find) a WebDriver and open a browser session. The manager is
/// returned so spawned driver processes outlive the session and are killed
/// on drop.
pub async fn open_browser(opts: &BrowserOpts) -> Result<(DriverManager, Browser)> {
    let config = EngineConfig::load(opts.config.as_deref())?;
    let browser_type: BrowserType = opts.browser.parse()?;
    let viewport = opts
        .viewport
        .as_deref()
        .map(ViewportSize::parse)
        .transpose()?;

    let manager = DriverManager::new();
    let webdriver_url = manager.ensure_driver(browser_type).await?;
    let browser = Browser::connect(
        &webdriver_url,
        browser_type,
        viewport,
        !opts.no_headless,
        config,
    )
    .await?;
    Ok((manager, browser))
}

/// Navigate when a URL was given; empty means "operate on the current page"
/// (meaningful with an externally managed session).
pub async fn navigate_if_given(browser: &Browser, url: &str) -> Result<()> {
    if url.is_empty() {
        return Ok(());
    }
    url::Url::parse(url).with_context(|| format!("Invalid URL: {url}"))?;
    browser.goto(url).await
}

/// Parse a descriptor list from CLI JSON: either one object or an array.
pub fn parse_targets(raw: &str) -> Result<Vec<Target>> {
    let value: serde_json::Value =
        serde_json::from_str(raw).context("targets must be valid JSON")?;
    match value {
        serde_json::Value::Array(_) => {
            serde_json::from_value(value).context("Failed to parse target descriptor array")
        }
        serde_json::Value::Object(_) => Ok(vec![
            serde_json::from_value(value).context("Failed to parse target descriptor")?,
        ]),
        _ => Err(anyhow!(
            "targets must be a JSON descriptor object or an array of them"
        )),
    }
}

/// Build the frame target from the flat CLI options.
pub fn frame_target(opts: &FrameOpts) -> Result<FrameTarget> {
    let path: Option<Vec<IframeStep>> = opts
        .iframe_path
        .as_deref()
        .map(serde_json::from_str)
        .transpose()
        .context("Failed to parse --iframe-path JSON")?;
    FrameTarget::from_parts(opts.iframe.clone(), opts.iframe_url.clone(), path)
        .ok_or_else(|| anyhow!("Invalid iframe addressing: every step needs a selector or url_pattern"))
}

/// Pretty-print a result object as JSON on stdout.
pub fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
