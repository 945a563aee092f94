use anyhow::Result;
use std::time::Duration;
use tracing::info;

use crate::commands::utils::{self, BrowserOpts, FrameOpts};
use crate::executor::StrategyOutcome;
use crate::types::OutputFormat;

pub async fn handle_fill(
    url: String,
    targets_json: String,
    value: String,
    no_clear: bool,
    timeout_ms: Option<u64>,
    browser_opts: BrowserOpts,
    frame_opts: FrameOpts,
) -> Result<()> {
    let targets = utils::parse_targets(&targets_json)?;
    let frame = utils::frame_target(&frame_opts)?;

    // An empty chain is rejected before any browser is touched.
    if targets.is_empty() {
        return emit(&StrategyOutcome::no_strategies("fill"), browser_opts.format);
    }

    info!("Filling via {} strategies on {}", targets.len(), url);

    let (_driver, browser) = utils::open_browser(&browser_opts).await?;
    utils::navigate_if_given(&browser, &url).await?;

    let timeout = timeout_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| browser.config().per_attempt_timeout());
    let outcome = browser
        .fill_chain(&targets, &value, timeout, &frame, !no_clear)
        .await?;
    browser.close().await?;

    emit(&outcome, browser_opts.format)
}

fn emit(outcome: &StrategyOutcome, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => utils::print_json(outcome)?,
        OutputFormat::Simple => {
            if outcome.is_success() {
                println!(
                    "Filled via {}{}",
                    outcome.strategy_used.as_deref().unwrap_or("?"),
                    if outcome.fallback_used {
                        " [fallback]"
                    } else {
                        ""
                    }
                );
            } else {
                println!(
                    "Fill failed after {} strategies: {}",
                    outcome.strategies_attempted.len(),
                    outcome.last_error.as_deref().unwrap_or("unknown error")
                );
            }
        }
    }
    Ok(())
}
