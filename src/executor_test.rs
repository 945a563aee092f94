// Unit tests for the executor's data model: tier escalation order and
// outcome shapes. Driving a live element is covered by the pure state
// transitions here plus the CLI integration tests.

use super::*;
use pretty_assertions::assert_eq;

#[test]
fn test_tier_escalation_order() {
    assert_eq!(ClickTier::Normal.next(), Some(ClickTier::Forced));
    assert_eq!(ClickTier::Forced.next(), Some(ClickTier::Javascript));
    assert_eq!(ClickTier::Javascript.next(), None);
}

#[test]
fn test_tier_serializes_lowercase() {
    assert_eq!(
        serde_json::to_string(&ClickTier::Javascript).unwrap(),
        "\"javascript\""
    );
    assert_eq!(
        serde_json::to_string(&ClickTier::Normal).unwrap(),
        "\"normal\""
    );
}

#[test]
fn test_no_strategies_outcome() {
    let outcome = StrategyOutcome::no_strategies("click");
    assert_eq!(outcome.status, OutcomeStatus::Error);
    assert_eq!(outcome.reason.as_deref(), Some("no_strategies_provided"));
    assert!(outcome.strategies_attempted.is_empty());
    assert!(outcome.strategy_used.is_none());
    assert!(!outcome.fallback_used);
}

#[test]
fn test_success_outcome_fallback_flag() {
    let first = StrategyOutcome::success(
        "click",
        "role:button/Save".into(),
        false,
        Some(ClickTier::Normal),
        vec!["role:button/Save".into()],
    );
    assert!(first.is_success());
    assert!(!first.fallback_used);

    let second = StrategyOutcome::success(
        "click",
        "text:Save".into(),
        true,
        Some(ClickTier::Normal),
        vec!["role:button/Save".into(), "text:Save".into()],
    );
    assert!(second.fallback_used);
    assert_eq!(second.strategy_used.as_deref(), Some("text:Save"));
    assert_eq!(second.strategies_attempted.len(), 2);
}

#[test]
fn test_exhausted_outcome_keeps_attempt_list_and_last_error() {
    let outcome = StrategyOutcome::exhausted(
        "fill",
        vec!["label:Email".into(), "css:#email".into()],
        Some("no such element".into()),
    );
    assert_eq!(outcome.status, OutcomeStatus::Error);
    assert_eq!(outcome.reason.as_deref(), Some("all_strategies_exhausted"));
    assert_eq!(
        outcome.strategies_attempted,
        vec!["label:Email".to_string(), "css:#email".to_string()]
    );
    assert_eq!(outcome.last_error.as_deref(), Some("no such element"));
}

#[test]
fn test_outcome_json_shape() {
    let outcome = StrategyOutcome::success(
        "click",
        "text:Save".into(),
        true,
        Some(ClickTier::Javascript),
        vec!["role:button/Save".into(), "text:Save".into()],
    );
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["click_tier"], "javascript");
    assert_eq!(json["fallback_used"], true);
    // Error-only fields are omitted on success
    assert!(json.get("reason").is_none());
    assert!(json.get("last_error").is_none());
}

#[test]
fn test_banner_targets_role_before_text() {
    let targets = banner_targets("accept");
    assert!(!targets.is_empty());
    assert!(matches!(targets[0], Target::Role { .. }));
    assert!(matches!(targets.last(), Some(Target::Text { .. })));
    // Unknown strategy yields nothing rather than guessing
    assert!(banner_targets("nonsense").is_empty());
}

#[test]
fn test_default_banner_strategy_order() {
    assert_eq!(default_banner_strategies(), vec!["accept", "agree"]);
}
