use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::commands::utils::{self, BrowserOpts, FrameOpts};
use crate::executor::default_banner_strategies;
use crate::types::OutputFormat;

pub async fn handle_info(url: String, browser_opts: BrowserOpts) -> Result<()> {
    let (_driver, browser) = utils::open_browser(&browser_opts).await?;
    utils::navigate_if_given(&browser, &url).await?;
    let info = browser.page_info().await?;
    browser.close().await?;

    match browser_opts.format {
        OutputFormat::Json => utils::print_json(&info)?,
        OutputFormat::Simple => {
            println!("URL: {}", info.url);
            println!("Title: {}", info.title);
            if let Some(vp) = info.viewport {
                println!("Viewport: {}x{}", vp.width, vp.height);
            }
        }
    }
    Ok(())
}

pub async fn handle_screenshot(
    url: String,
    output: Option<PathBuf>,
    browser_opts: BrowserOpts,
) -> Result<()> {
    let (_driver, browser) = utils::open_browser(&browser_opts).await?;
    utils::navigate_if_given(&browser, &url).await?;
    let bytes = browser.screenshot().await?;
    browser.close().await?;

    let path = output.unwrap_or_else(|| {
        let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
        PathBuf::from(format!("screenshot_{timestamp}.png"))
    });
    std::fs::write(&path, &bytes)
        .with_context(|| format!("Failed to write screenshot to {}", path.display()))?;
    info!("Screenshot saved to {}", path.display());

    match browser_opts.format {
        OutputFormat::Json => utils::print_json(&serde_json::json!({
            "path": path,
            "size_bytes": bytes.len(),
        }))?,
        OutputFormat::Simple => {
            println!("Screenshot saved: {} ({} bytes)", path.display(), bytes.len())
        }
    }
    Ok(())
}

pub async fn handle_text(
    url: String,
    targets_json: String,
    browser_opts: BrowserOpts,
    frame_opts: FrameOpts,
) -> Result<()> {
    let targets = utils::parse_targets(&targets_json)?;
    let target = targets
        .first()
        .ok_or_else(|| anyhow::anyhow!("text requires one target descriptor"))?;
    let frame = utils::frame_target(&frame_opts)?;

    let (_driver, browser) = utils::open_browser(&browser_opts).await?;
    utils::navigate_if_given(&browser, &url).await?;
    let text = browser.get_text(target, &frame).await?;
    browser.close().await?;

    match browser_opts.format {
        OutputFormat::Json => utils::print_json(&serde_json::json!({
            "strategy": target.label(),
            "text": text,
        }))?,
        OutputFormat::Simple => println!("{text}"),
    }
    Ok(())
}

pub async fn handle_exists(
    url: String,
    targets_json: String,
    browser_opts: BrowserOpts,
    frame_opts: FrameOpts,
) -> Result<()> {
    let targets = utils::parse_targets(&targets_json)?;
    let target = targets
        .first()
        .ok_or_else(|| anyhow::anyhow!("exists requires one target descriptor"))?;
    let frame = utils::frame_target(&frame_opts)?;

    let (_driver, browser) = utils::open_browser(&browser_opts).await?;
    utils::navigate_if_given(&browser, &url).await?;
    let report = browser.check_element_exists(target, &frame).await?;
    browser.close().await?;

    match browser_opts.format {
        OutputFormat::Json => utils::print_json(&report)?,
        OutputFormat::Simple => {
            if report.exists && report.visible {
                println!("Element exists and is visible");
            } else if report.exists {
                println!("Element exists but is NOT visible");
            } else {
                println!("Element does NOT exist");
            }
        }
    }
    Ok(())
}

pub async fn handle_key(url: String, key: String, browser_opts: BrowserOpts) -> Result<()> {
    let (_driver, browser) = utils::open_browser(&browser_opts).await?;
    utils::navigate_if_given(&browser, &url).await?;
    browser.press_key(&key).await?;
    browser.close().await?;

    match browser_opts.format {
        OutputFormat::Json => utils::print_json(&serde_json::json!({ "pressed": key }))?,
        OutputFormat::Simple => println!("Pressed: {key}"),
    }
    Ok(())
}

pub async fn handle_banner(
    url: String,
    strategies: Option<String>,
    timeout_ms: Option<u64>,
    browser_opts: BrowserOpts,
) -> Result<()> {
    let strategies: Vec<String> = match strategies {
        Some(raw) => raw.split(',').map(|s| s.trim().to_string()).collect(),
        None => default_banner_strategies(),
    };

    let (_driver, browser) = utils::open_browser(&browser_opts).await?;
    utils::navigate_if_given(&browser, &url).await?;
    let timeout = timeout_ms.map(Duration::from_millis).unwrap_or_else(|| {
        // Banners either exist or don't; a long budget only slows the miss.
        Duration::from_millis(2_000)
    });
    let outcome = browser.dismiss_cookie_banner(&strategies, timeout).await?;
    browser.close().await?;

    match browser_opts.format {
        OutputFormat::Json => utils::print_json(&outcome)?,
        OutputFormat::Simple => {
            if outcome.clicked {
                println!(
                    "Banner dismissed via '{}' strategy",
                    outcome.strategy.as_deref().unwrap_or("?")
                );
            } else {
                println!("No cookie banner found (or already accepted)");
            }
        }
    }
    Ok(())
}
