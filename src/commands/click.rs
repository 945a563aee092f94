use anyhow::Result;
use std::time::Duration;
use tracing::info;

use crate::commands::utils::{self, BrowserOpts, FrameOpts};
use crate::executor::StrategyOutcome;
use crate::types::OutputFormat;

pub async fn handle_click(
    url: String,
    targets_json: String,
    timeout_ms: Option<u64>,
    browser_opts: BrowserOpts,
    frame_opts: FrameOpts,
) -> Result<()> {
    let targets = utils::parse_targets(&targets_json)?;
    let frame = utils::frame_target(&frame_opts)?;

    // An empty chain is rejected before any browser is touched.
    if targets.is_empty() {
        return emit(&StrategyOutcome::no_strategies("click"), browser_opts.format);
    }

    info!("Clicking via {} strategies on {}", targets.len(), url);

    let (_driver, browser) = utils::open_browser(&browser_opts).await?;
    utils::navigate_if_given(&browser, &url).await?;

    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| browser.config().per_attempt_timeout());
    let outcome = browser.click_chain(&targets, timeout, &frame).await?;
    browser.close().await?;

    emit(&outcome, browser_opts.format)
}

fn emit(outcome: &StrategyOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => utils::print_json(outcome)?,
        OutputFormat::Simple => {
            if outcome.is_success() {
                println!(
                    "Clicked via {} (tier: {}){}",
                    outcome.strategy_used.as_deref().unwrap_or("?"),
                    outcome
                        .click_tier
                        .map(|t| format!("{t:?}").to_lowercase())
                        .unwrap_or_default(),
                    if outcome.fallback_used {
                        " [fallback]"
                    } else {
                        ""
                    }
                );
            } else {
                println!(
                    "Click failed after {} strategies: {}",
                    outcome.strategies_attempted.len(),
                    outcome.last_error.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }
    Ok(())
}
