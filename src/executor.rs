use fantoccini::actions::{InputSource, MOUSE_BUTTON_LEFT, MouseActions, PointerAction};
use fantoccini::elements::Element;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::context::FrameTarget;
use crate::errors::EngineError;
use crate::target::Target;
use crate::webdriver::Browser;

/// Escalation tier a click succeeded (or was attempted) at.
///
/// The escalation path is data, not control flow: each tier is tried only
/// after the previous one failed within its timeout, and the tier that
/// landed is reported so callers can weigh a `javascript` click with lower
/// confidence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClickTier {
    /// Actionability-checked WebDriver click.
    Normal,
    /// Pointer-actions click at the element's location; bypasses click
    /// interception but still requires the element to report itself visible.
    Forced,
    /// `el.click()` dispatched in page JavaScript. Last resort.
    Javascript,
}

impl ClickTier {
    /// Next tier in the escalation order, if any.
    pub fn next(self) -> Option<ClickTier> {
        match self {
            ClickTier::Normal => Some(ClickTier::Forced),
            ClickTier::Forced => Some(ClickTier::Javascript),
            ClickTier::Javascript => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
    Success,
    Error,
}

/// Structured result of one fallback-chain call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyOutcome {
    pub status: OutcomeStatus,
    pub action: String,
    pub strategies_attempted: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_used: Option<String>,
    pub fallback_used: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub click_tier: Option<ClickTier>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl StrategyOutcome {
    pub fn no_strategies(action: &str) -> Self {
        Self {
            status: OutcomeStatus::Error,
            action: action.to_string(),
            strategies_attempted: Vec::new(),
            strategy_used: None,
            fallback_used: false,
            click_tier: None,
            reason: Some("no_strategies_provided".to_string()),
            last_error: Some(EngineError::NoStrategiesProvided.to_string()),
        }
    }

    fn success(
        action: &str,
        strategy_used: String,
        fallback_used: bool,
        click_tier: Option<ClickTier>,
        strategies_attempted: Vec<String>,
    ) -> Self {
        Self {
            status: OutcomeStatus::Success,
            action: action.to_string(),
            strategies_attempted,
            strategy_used: Some(strategy_used),
            fallback_used,
            click_tier,
            reason: None,
            last_error: None,
        }
    }

    fn exhausted(action: &str, strategies_attempted: Vec<String>, last_error: Option<String>) -> Self {
        let summary = EngineError::AllStrategiesExhausted {
            count: strategies_attempted.len(),
            attempted: strategies_attempted.clone(),
        };
        Self {
            status: OutcomeStatus::Error,
            action: action.to_string(),
            strategies_attempted,
            strategy_used: None,
            fallback_used: false,
            click_tier: None,
            reason: Some(summary.reason().to_string()),
            last_error: last_error.or_else(|| Some(summary.to_string())),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.status, OutcomeStatus::Success)
    }
}

/// Terminal result of the tier state machine for one descriptor.
enum TierResult {
    Clicked(ClickTier),
    Failed(String),
}

impl Browser {
    /// Perform the first descriptor in `targets` that succeeds, escalating
    /// through the click tiers within each descriptor.
    ///
    /// Per-descriptor and per-tier failures are swallowed and the chain
    /// advances; only total exhaustion surfaces, as an error-status outcome.
    /// Frame resolution is the one hard failure: when the caller explicitly
    /// asked for an iframe context that cannot be resolved there is nothing
    /// meaningful to click in, and the error propagates.
    pub async fn click_chain(
        &self,
        targets: &[Target],
        per_attempt_timeout: Duration,
        frame: &FrameTarget,
    ) -> Result<StrategyOutcome, EngineError> {
        if targets.is_empty() {
            return Ok(StrategyOutcome::no_strategies("click"));
        }
        self.resolve_context(frame).await?;

        let op_id = uuid::Uuid::new_v4();
        let mut attempted = Vec::new();
        let mut last_error: Option<String> = None;

        for (index, target) in targets.iter().enumerate() {
            let label = target.label();
            attempted.push(label.clone());
            debug!(%op_id, strategy = %label, "Attempting click strategy");

            let spec = match target.materialize(&self.config) {
                Ok(spec) => spec,
                Err(e) => {
                    debug!(%op_id, "Locator construction failed: {}", e);
                    last_error = Some(e.to_string());
                    continue;
                }
            };

            let element = match self
                .find_with_timeout(&spec, &label, per_attempt_timeout)
                .await
            {
                Ok(element) => element,
                Err(e) => {
                    debug!(%op_id, "No element for strategy: {}", e);
                    last_error = Some(e.to_string());
                    continue;
                }
            };

            match self.click_tiers(&element, per_attempt_timeout).await {
                TierResult::Clicked(tier) => {
                    info!(%op_id, strategy = %label, tier = ?tier, "Click succeeded");
                    return Ok(StrategyOutcome::success(
                        "click",
                        label,
                        index > 0,
                        Some(tier),
                        attempted,
                    ));
                }
                TierResult::Failed(message) => {
                    debug!(%op_id, strategy = %label, "Click failed: {}", message);
                    last_error = Some(
                        EngineError::ElementNotActionable {
                            strategy: label,
                            reason: message,
                        }
                        .to_string(),
                    );
                }
            }
        }

        warn!(%op_id, "All {} click strategies exhausted", attempted.len());
        Ok(StrategyOutcome::exhausted("click", attempted, last_error))
    }

    /// Fill the first matching field in the chain with `value`.
    ///
    /// No tier escalation: filling is not subject to click's actionability
    /// ambiguity. The clear step is tolerated to fail (read-only widgets).
    pub async fn fill_chain(
        &self,
        targets: &[Target],
        value: &str,
        per_attempt_timeout: Duration,
        frame: &FrameTarget,
        clear_first: bool,
    ) -> Result<StrategyOutcome, EngineError> {
        if targets.is_empty() {
            return Ok(StrategyOutcome::no_strategies("fill"));
        }
        self.resolve_context(frame).await?;

        let op_id = uuid::Uuid::new_v4();
        let mut attempted = Vec::new();
        let mut last_error: Option<String> = None;

        for (index, target) in targets.iter().enumerate() {
            let label = target.label();
            attempted.push(label.clone());
            debug!(%op_id, strategy = %label, "Attempting fill strategy");

            let spec = match target.materialize(&self.config) {
                Ok(spec) => spec,
                Err(e) => {
                    last_error = Some(e.to_string());
                    continue;
                }
            };

            let element = match self
                .find_with_timeout(&spec, &label, per_attempt_timeout)
                .await
            {
                Ok(element) => element,
                Err(e) => {
                    last_error = Some(e.to_string());
                    continue;
                }
            };

            if clear_first && let Err(e) = element.clear().await {
                // Read-only and custom widgets reject clear; typing still
                // works on most of them.
                debug!(%op_id, "Clear failed (tolerated): {}", e);
            }

            match tokio::time::timeout(per_attempt_timeout, element.send_keys(value)).await {
                Ok(Ok(())) => {
                    info!(%op_id, strategy = %label, "Fill succeeded");
                    return Ok(StrategyOutcome::success(
                        "fill", label, index > 0, None, attempted,
                    ));
                }
                Ok(Err(e)) => {
                    debug!(%op_id, strategy = %label, "Fill failed: {}", e);
                    last_error = Some(
                        EngineError::FillFailed {
                            strategy: label,
                            reason: e.to_string(),
                        }
                        .to_string(),
                    );
                }
                Err(_) => {
                    let e = EngineError::Timeout {
                        operation: format!("fill via '{label}'"),
                        timeout_ms: per_attempt_timeout.as_millis() as u64,
                    };
                    last_error = Some(e.to_string());
                }
            }
        }

        warn!(%op_id, "All {} fill strategies exhausted", attempted.len());
        Ok(StrategyOutcome::exhausted("fill", attempted, last_error))
    }

    /// Tier state machine for one located element:
    /// `Normal -> Forced -> Javascript`, stopping at the first success.
    ///
    /// Elements that report themselves invisible never escalate past
    /// `Normal`: no real user could click them, so a "successful" forced or
    /// scripted click there would be a false positive.
    async fn click_tiers(&self, element: &Element, per_attempt_timeout: Duration) -> TierResult {
        let mut tier = ClickTier::Normal;
        let mut last_failure;
        loop {
            match self.attempt_tier(element, tier, per_attempt_timeout).await {
                Ok(()) => return TierResult::Clicked(tier),
                Err(message) => last_failure = message,
            }
            match tier.next() {
                Some(next) => {
                    // Visibility gate before leaving the actionability-checked
                    // tier.
                    if tier == ClickTier::Normal
                        && !element.is_displayed().await.unwrap_or(false)
                    {
                        return TierResult::Failed(format!(
                            "element reports itself invisible; forced and javascript tiers skipped (normal tier: {last_failure})"
                        ));
                    }
                    debug!("Escalating click to {:?} tier", next);
                    tier = next;
                }
                None => return TierResult::Failed(last_failure),
            }
        }
    }

    async fn attempt_tier(
        &self,
        element: &Element,
        tier: ClickTier,
        per_attempt_timeout: Duration,
    ) -> Result<(), String> {
        let attempt = async {
            match tier {
                ClickTier::Normal => {
                    self.scroll_into_view(element).await;
                    element.click().await.map_err(|e| e.to_string())
                }
                ClickTier::Forced => self.forced_click(element).await,
                ClickTier::Javascript => self.javascript_click(element).await,
            }
        };
        match tokio::time::timeout(per_attempt_timeout, attempt).await {
            Ok(result) => result,
            Err(_) => Err(format!(
                "{tier:?} click timed out after {}ms",
                per_attempt_timeout.as_millis()
            )),
        }
    }

    /// W3C pointer click at the element's location. Covers widgets that use
    /// non-semantic container elements with custom pointer handling, which
    /// fail WebDriver's click-interception check.
    async fn forced_click(&self, element: &Element) -> Result<(), String> {
        let actions = MouseActions::new("mouse".to_string())
            .then(PointerAction::MoveToElement {
                element: element.clone(),
                duration: Some(Duration::from_millis(50)),
                x: 0,
                y: 0,
            })
            .then(PointerAction::Down {
                button: MOUSE_BUTTON_LEFT,
            })
            .then(PointerAction::Up {
                button: MOUSE_BUTTON_LEFT,
            });
        self.client
            .perform_actions(actions)
            .await
            .map_err(|e| e.to_string())?;
        let _ = self.client.release_actions().await;
        Ok(())
    }

    /// Dispatch a native click on the DOM handle, bypassing WebDriver's
    /// actionability model entirely.
    async fn javascript_click(&self, element: &Element) -> Result<(), String> {
        let arg = serde_json::to_value(element).map_err(|e| e.to_string())?;
        self.client
            .execute("arguments[0].click();", vec![arg])
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }

    /// Dismiss a cookie-consent banner by trying named strategy groups in
    /// order. Each group is an ordinary fallback chain of text/role
    /// descriptors, so the report carries the same structure as any click.
    /// Finding no banner is a success with `clicked: false`.
    pub async fn dismiss_cookie_banner(
        &self,
        strategies: &[String],
        per_attempt_timeout: Duration,
    ) -> Result<BannerOutcome, EngineError> {
        for strategy in strategies {
            let targets = banner_targets(strategy);
            if targets.is_empty() {
                warn!("Unknown cookie banner strategy '{}', skipping", strategy);
                continue;
            }
            let outcome = self
                .click_chain(&targets, per_attempt_timeout, &FrameTarget::Top)
                .await?;
            if outcome.is_success() {
                info!("Cookie banner dismissed via '{}' strategy", strategy);
                return Ok(BannerOutcome {
                    clicked: true,
                    strategy: Some(strategy.clone()),
                    strategy_used: outcome.strategy_used,
                });
            }
        }
        Ok(BannerOutcome {
            clicked: false,
            strategy: None,
            strategy_used: None,
        })
    }
}

/// Result of a cookie-banner dismissal attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BannerOutcome {
    pub clicked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_used: Option<String>,
}

/// Default strategy order for cookie banners.
pub fn default_banner_strategies() -> Vec<String> {
    vec!["accept".to_string(), "agree".to_string()]
}

/// Descriptor chains for the known banner strategies. Button texts cover
/// the languages the target suites run in.
pub(crate) fn banner_targets(strategy: &str) -> Vec<Target> {
    let texts: &[&str] = match strategy {
        "accept" => &["Accept all", "Accept", "Accetta", "Accepter", "Aceptar", "Akzeptieren"],
        "agree" => &["I agree", "Agree", "Acconsento"],
        "reject" => &["Reject all", "Rifiuta tutto", "Refuse"],
        _ => return Vec::new(),
    };
    let mut targets = Vec::new();
    for text in texts {
        targets.push(Target::Role {
            role: "button".to_string(),
            name: (*text).to_string(),
        });
    }
    for text in texts {
        targets.push(Target::Text {
            text: (*text).to_string(),
        });
    }
    targets
}

#[cfg(test)]
#[path = "executor_test.rs"]
mod executor_test;
