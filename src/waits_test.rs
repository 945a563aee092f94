// Unit tests for semantic wait matching and the polling loop, driven by a
// fake clock and fake snapshot sources so no real time passes.

use super::*;
use crate::snapshot::build_clickable;
use crate::a11y::RawNode;
use pretty_assertions::assert_eq;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

struct FakeClock {
    base: Instant,
    offset: Mutex<Duration>,
}

impl FakeClock {
    fn new() -> Self {
        Self {
            base: Instant::now(),
            offset: Mutex::new(Duration::ZERO),
        }
    }
}

#[async_trait]
impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.base + *self.offset.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        *self.offset.lock().unwrap() += duration;
    }
}

fn clickable(name: &str) -> ClickableElement {
    build_clickable(RawNode {
        tag: "button".into(),
        aria_label: Some(name.into()),
        visible: true,
        ..Default::default()
    })
}

fn page_with_clickables(names: &[&str]) -> PageInspection {
    PageInspection {
        url: "https://example.com".into(),
        clickable_elements: names.iter().map(|n| clickable(n)).collect(),
        ..Default::default()
    }
}

/// Snapshot source whose element only appears from the nth call onwards.
struct AppearingSource {
    calls: AtomicUsize,
    appear_at_call: usize,
    ready: PageInspection,
}

#[async_trait]
impl SnapshotSource for AppearingSource {
    async fn snapshot(
        &self,
        _frame: &FrameTarget,
        _root: Option<&str>,
    ) -> Result<PageInspection, EngineError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if call >= self.appear_at_call {
            Ok(self.ready.clone())
        } else {
            Ok(PageInspection::default())
        }
    }
}

/// Snapshot source that always fails, as a detached region would.
struct FailingSource;

#[async_trait]
impl SnapshotSource for FailingSource {
    async fn snapshot(
        &self,
        _frame: &FrameTarget,
        _root: Option<&str>,
    ) -> Result<PageInspection, EngineError> {
        Err(EngineError::WebDriverFailed("boom".into()))
    }
}

#[tokio::test]
async fn test_wait_resolves_when_element_appears() {
    // Button's accessible name becomes "Filters" only after 3s; polling
    // every 500ms for up to 10s must succeed exactly then, never before.
    let source = AppearingSource {
        calls: AtomicUsize::new(0),
        appear_at_call: 6, // 6 polls of 500ms = 3s of fake time
        ready: page_with_clickables(&["Filters"]),
    };
    let clock = FakeClock::new();

    let outcome = wait_for_clickable_by_name(
        &source,
        &clock,
        &FrameTarget::Top,
        "Filters",
        Duration::from_secs(10),
        Duration::from_millis(500),
        true,
    )
    .await;

    assert_eq!(outcome.status, OutcomeStatus::Success);
    assert_eq!(outcome.elapsed_ms, 3_000);
    let matched = outcome.matched.unwrap();
    assert_eq!(matched.suggested_targets()[0].label(), "role:button/Filters");
}

#[tokio::test]
async fn test_wait_times_out_without_match() {
    let source = AppearingSource {
        calls: AtomicUsize::new(0),
        appear_at_call: usize::MAX,
        ready: PageInspection::default(),
    };
    let clock = FakeClock::new();

    let outcome = wait_for_clickable_by_name(
        &source,
        &clock,
        &FrameTarget::Top,
        "Filters",
        Duration::from_secs(10),
        Duration::from_millis(500),
        true,
    )
    .await;

    assert_eq!(outcome.status, OutcomeStatus::Error);
    assert_eq!(outcome.reason.as_deref(), Some("timeout"));
    assert_eq!(outcome.elapsed_ms, 10_000);
    assert!(outcome.matched.is_none());
    // One poll at t=0 plus one per 500ms tick through 9.5s
    assert_eq!(source.calls.load(Ordering::SeqCst), 21);
}

#[tokio::test]
async fn test_wait_reports_last_inspection_error() {
    let clock = FakeClock::new();
    let outcome = wait_for_clickable_by_name(
        &FailingSource,
        &clock,
        &FrameTarget::Top,
        "Save",
        Duration::from_secs(2),
        Duration::from_millis(500),
        true,
    )
    .await;

    assert_eq!(outcome.status, OutcomeStatus::Error);
    assert!(outcome.last_error.unwrap().contains("boom"));
}

#[test]
fn test_exact_match_beats_containing() {
    let snap = page_with_clickables(&["Filters and more", "Filters"]);
    let matched = select_clickable(&snap, "filters", true).unwrap();
    match matched {
        WaitMatch::Clickable(el) => {
            assert_eq!(el.accessible_name.as_deref(), Some("Filters"));
        }
        other => panic!("unexpected match {other:?}"),
    }
}

#[test]
fn test_shortest_containing_name_wins() {
    let snap = page_with_clickables(&["Apply filters to the report", "All filters"]);
    let matched = select_clickable(&snap, "filters", true).unwrap();
    match matched {
        WaitMatch::Clickable(el) => {
            assert_eq!(el.accessible_name.as_deref(), Some("All filters"));
        }
        other => panic!("unexpected match {other:?}"),
    }
}

#[test]
fn test_first_wins_on_full_tie() {
    let snap = page_with_clickables(&["Save", "Save"]);
    assert!(select_clickable(&snap, "save", true).is_some());
}

#[test]
fn test_case_sensitivity_toggle() {
    let snap = page_with_clickables(&["Filters"]);
    assert!(select_clickable(&snap, "filters", true).is_some());
    assert!(select_clickable(&snap, "filters", false).is_none());
    assert!(select_clickable(&snap, "Filters", false).is_some());
}

#[test]
fn test_empty_query_matches_nothing() {
    let snap = page_with_clickables(&["Save"]);
    assert!(select_clickable(&snap, "  ", true).is_none());
}

#[test]
fn test_field_matching_uses_placeholder_and_name() {
    let field = crate::snapshot::build_field(RawNode {
        tag: "input".into(),
        input_type: Some("text".into()),
        placeholder: Some("Search accounts".into()),
        name: Some("account-search".into()),
        visible: true,
        ..Default::default()
    });
    let snap = PageInspection {
        form_fields: vec![field],
        ..Default::default()
    };
    assert!(select_field(&snap, "search", true).is_some());
    assert!(select_field(&snap, "account-search", true).is_some());
    assert!(select_field(&snap, "password", true).is_none());
}

#[test]
fn test_control_matching_filters_by_type() {
    let control = crate::snapshot::build_control(
        RawNode {
            tag: "input".into(),
            input_type: Some("checkbox".into()),
            aria_label: Some("Subscribe".into()),
            checked: Some(false),
            visible: true,
            ..Default::default()
        },
        "checkbox".into(),
    );
    let snap = PageInspection {
        interactive_controls: vec![control],
        ..Default::default()
    };
    assert!(select_control(&snap, "subscribe", "checkbox", true).is_some());
    assert!(select_control(&snap, "subscribe", "radio", true).is_none());
}

#[test]
fn test_state_satisfied_table() {
    use ElementState::*;
    // (state, found, displayed, enabled, expected)
    let cases = [
        (Attached, true, None, None, true),
        (Attached, false, None, None, false),
        (Detached, false, None, None, true),
        (Detached, true, Some(true), Some(true), false),
        (Visible, true, Some(true), None, true),
        (Visible, true, Some(false), None, false),
        (Visible, false, None, None, false),
        (Hidden, false, None, None, true),
        (Hidden, true, Some(false), None, true),
        (Hidden, true, Some(true), None, false),
        (Enabled, true, Some(true), Some(true), true),
        (Enabled, true, Some(true), Some(false), false),
        (Disabled, true, Some(true), Some(false), true),
        (Disabled, true, Some(true), Some(true), false),
        // An absent element is neither enabled nor disabled
        (Enabled, false, None, None, false),
        (Disabled, false, None, None, false),
    ];
    for (state, found, displayed, enabled, expected) in cases {
        assert_eq!(
            state_satisfied(state, found, displayed, enabled),
            expected,
            "state={state:?} found={found} displayed={displayed:?} enabled={enabled:?}"
        );
    }
}

#[test]
fn test_wait_outcome_json_shape() {
    let outcome = WaitOutcome::success(
        Duration::from_millis(1500),
        WaitMatch::Clickable(clickable("Save")),
    );
    let json = serde_json::to_value(&outcome).unwrap();
    assert_eq!(json["status"], "success");
    assert_eq!(json["elapsed_ms"], 1500);
    assert_eq!(json["matched"]["kind"], "clickable");
    assert_eq!(json["matched"]["accessible_name"], "Save");
    assert!(json["matched"]["suggested_targets"].is_array());
}
