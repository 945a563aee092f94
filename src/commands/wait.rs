use anyhow::Result;
use std::time::Duration;
use tracing::info;

use crate::commands::utils::{self, BrowserOpts, FrameOpts};
use crate::types::OutputFormat;
use crate::waits::{DomChangeOptions, ElementState};

/// Which snapshot family a named wait searches.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum WaitKind {
    Clickable,
    Field,
    Control,
}

pub async fn handle_wait_name(
    url: String,
    name: String,
    kind: WaitKind,
    control_type: Option<String>,
    timeout_ms: Option<u64>,
    browser_opts: BrowserOpts,
    frame_opts: FrameOpts,
) -> Result<()> {
    let frame = utils::frame_target(&frame_opts)?;
    if matches!(kind, WaitKind::Control) && control_type.is_none() {
        anyhow::bail!("--control-type is required with --kind control");
    }

    info!("Waiting for {:?} named '{}' on {}", kind, name, url);

    let (_driver, browser) = utils::open_browser(&browser_opts).await?;
    utils::navigate_if_given(&browser, &url).await?;

    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| browser.config().wait_timeout());
    let outcome = match kind {
        WaitKind::Clickable => {
            browser
                .wait_for_clickable_by_name(&name, timeout, &frame)
                .await
        }
        WaitKind::Field => browser.wait_for_field_by_name(&name, timeout, &frame).await,
        WaitKind::Control => {
            browser
                .wait_for_control_by_name_and_type(
                    &name,
                    control_type.as_deref().unwrap_or_default(),
                    timeout,
                    &frame,
                )
                .await
        }
    };
    browser.close().await?;

    match browser_opts.format {
        OutputFormat::Json => utils::print_json(&outcome)?,
        OutputFormat::Simple => {
            if let Some(matched) = &outcome.matched {
                println!(
                    "Found after {}ms; {} suggested strategies",
                    outcome.elapsed_ms,
                    matched.suggested_targets().len()
                );
            } else {
                println!("Not found within {}ms", outcome.elapsed_ms);
            }
        }
    }
    Ok(())
}

pub async fn handle_wait_state(
    url: String,
    targets_json: String,
    state: ElementState,
    timeout_ms: Option<u64>,
    browser_opts: BrowserOpts,
    frame_opts: FrameOpts,
) -> Result<()> {
    let targets = utils::parse_targets(&targets_json)?;
    let frame = utils::frame_target(&frame_opts)?;

    info!("Waiting for state {:?} on {}", state, url);

    let (_driver, browser) = utils::open_browser(&browser_opts).await?;
    utils::navigate_if_given(&browser, &url).await?;

    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| browser.config().wait_timeout());
    let outcome = browser
        .wait_for_element_state(&targets, state, timeout, &frame)
        .await?;
    browser.close().await?;

    match browser_opts.format {
        OutputFormat::Json => utils::print_json(&outcome)?,
        OutputFormat::Simple => println!(
            "{:?} {:?} after {}ms",
            outcome.status, outcome.state, outcome.elapsed_ms
        ),
    }
    Ok(())
}

pub async fn handle_wait_dom(
    url: String,
    root: String,
    attributes: bool,
    no_child_list: bool,
    no_subtree: bool,
    timeout_ms: Option<u64>,
    browser_opts: BrowserOpts,
    frame_opts: FrameOpts,
) -> Result<()> {
    let frame = utils::frame_target(&frame_opts)?;

    info!("Waiting for DOM change under '{}' on {}", root, url);

    let (_driver, browser) = utils::open_browser(&browser_opts).await?;
    utils::navigate_if_given(&browser, &url).await?;

    let options = DomChangeOptions {
        attributes,
        child_list: !no_child_list,
        subtree: !no_subtree,
    };
    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| browser.config().wait_timeout());
    let outcome = browser
        .wait_for_dom_change(&root, options, timeout, &frame)
        .await?;
    browser.close().await?;

    match browser_opts.format {
        OutputFormat::Json => utils::print_json(&outcome)?,
        OutputFormat::Simple => println!(
            "{:?}: {} mutations after {}ms",
            outcome.status, outcome.mutations, outcome.elapsed_ms
        ),
    }
    Ok(())
}
