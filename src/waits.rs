use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use crate::context::FrameTarget;
use crate::errors::EngineError;
use crate::executor::OutcomeStatus;
use crate::snapshot::{ClickableElement, FormField, InteractiveControl, PageInspection};
use crate::target::Target;
use crate::webdriver::Browser;

/// Injectable time source so wait loops are testable without real delays.
#[async_trait]
pub trait Clock: Send + Sync {
    fn now(&self) -> Instant;
    async fn sleep(&self, duration: Duration);
}

/// The real clock.
pub struct TokioClock;

#[async_trait]
impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Anything that can produce a fresh `PageInspection`. `Browser` is the
/// production implementation; tests substitute fakes.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn snapshot(
        &self,
        frame: &FrameTarget,
        root_selector: Option<&str>,
    ) -> Result<PageInspection, EngineError>;
}

#[async_trait]
impl SnapshotSource for Browser {
    async fn snapshot(
        &self,
        frame: &FrameTarget,
        root_selector: Option<&str>,
    ) -> Result<PageInspection, EngineError> {
        self.inspect(frame, root_selector).await
    }
}

/// The snapshot row a semantic wait resolved to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WaitMatch {
    Clickable(ClickableElement),
    Field(FormField),
    Control(InteractiveControl),
}

impl WaitMatch {
    /// Strategies ready to hand to `click_chain`/`fill_chain`.
    pub fn suggested_targets(&self) -> &[Target] {
        match self {
            WaitMatch::Clickable(el) => &el.suggested_targets,
            WaitMatch::Field(el) => &el.suggested_targets,
            WaitMatch::Control(el) => &el.suggested_targets,
        }
    }
}

/// Result of a semantic wait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaitOutcome {
    pub status: OutcomeStatus,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub matched: Option<WaitMatch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl WaitOutcome {
    fn success(elapsed: Duration, matched: WaitMatch) -> Self {
        Self {
            status: OutcomeStatus::Success,
            elapsed_ms: elapsed.as_millis() as u64,
            matched: Some(matched),
            reason: None,
            last_error: None,
        }
    }

    fn timed_out(elapsed: Duration, last_error: Option<String>) -> Self {
        Self {
            status: OutcomeStatus::Error,
            elapsed_ms: elapsed.as_millis() as u64,
            matched: None,
            reason: Some("timeout".to_string()),
            last_error,
        }
    }
}

fn fold(s: &str, case_insensitive: bool) -> String {
    let trimmed = s.trim();
    if case_insensitive {
        trimmed.to_lowercase()
    } else {
        trimmed.to_string()
    }
}

/// Pick the best of several named candidates for a query substring.
///
/// Exact (post-trim, case-folded) matches beat merely-containing ones, and
/// among ties the shortest matching name wins: an element whose name only
/// embeds the query as a substring is the likeliest false positive. First
/// listed wins remaining ties, which keeps document order meaningful.
pub(crate) fn pick_best<T>(
    candidates: Vec<(T, Vec<String>)>,
    query: &str,
    case_insensitive: bool,
) -> Option<T> {
    let folded_query = fold(query, case_insensitive);
    if folded_query.is_empty() {
        return None;
    }

    let mut best: Option<(usize, usize, T)> = None; // (class, name_len, item)
    for (item, names) in candidates {
        let mut item_best: Option<(usize, usize)> = None;
        for name in &names {
            let folded = fold(name, case_insensitive);
            let class = if folded == folded_query {
                0
            } else if folded.contains(&folded_query) {
                1
            } else {
                continue;
            };
            let key = (class, folded.len());
            if item_best.is_none_or(|current| key < current) {
                item_best = Some(key);
            }
        }
        if let Some((class, len)) = item_best
            && best
                .as_ref()
                .is_none_or(|(b_class, b_len, _)| (class, len) < (*b_class, *b_len))
        {
            best = Some((class, len, item));
        }
    }
    best.map(|(_, _, item)| item)
}

fn clickable_names(el: &ClickableElement) -> Vec<String> {
    el.accessible_name.iter().cloned().collect()
}

fn field_names(el: &FormField) -> Vec<String> {
    el.accessible_name
        .iter()
        .chain(el.placeholder.iter())
        .chain(el.name.iter())
        .cloned()
        .collect()
}

fn control_names(el: &InteractiveControl) -> Vec<String> {
    el.accessible_name
        .iter()
        .chain(el.name.iter())
        .cloned()
        .collect()
}

pub(crate) fn select_clickable(
    snapshot: &PageInspection,
    name: &str,
    case_insensitive: bool,
) -> Option<WaitMatch> {
    let candidates: Vec<_> = snapshot
        .clickable_elements
        .iter()
        .map(|el| (el, clickable_names(el)))
        .collect();
    pick_best(candidates, name, case_insensitive).map(|el| WaitMatch::Clickable(el.clone()))
}

pub(crate) fn select_field(
    snapshot: &PageInspection,
    name: &str,
    case_insensitive: bool,
) -> Option<WaitMatch> {
    let candidates: Vec<_> = snapshot
        .form_fields
        .iter()
        .map(|el| (el, field_names(el)))
        .collect();
    pick_best(candidates, name, case_insensitive).map(|el| WaitMatch::Field(el.clone()))
}

pub(crate) fn select_control(
    snapshot: &PageInspection,
    name: &str,
    control_type: &str,
    case_insensitive: bool,
) -> Option<WaitMatch> {
    let candidates: Vec<_> = snapshot
        .interactive_controls
        .iter()
        .filter(|el| el.control_type.eq_ignore_ascii_case(control_type))
        .map(|el| (el, control_names(el)))
        .collect();
    pick_best(candidates, name, case_insensitive).map(|el| WaitMatch::Control(el.clone()))
}

/// Shared polling loop: re-inspect until `select` finds a match or the
/// timeout elapses. Inspection errors are recorded and polling continues,
/// since a frame or region may legitimately appear later.
async fn wait_for_match<S, C, F>(
    source: &S,
    clock: &C,
    frame: &FrameTarget,
    timeout: Duration,
    poll: Duration,
    mut select: F,
) -> WaitOutcome
where
    S: SnapshotSource + ?Sized,
    C: Clock + ?Sized,
    F: FnMut(&PageInspection) -> Option<WaitMatch>,
{
    let start = clock.now();
    let mut last_error = None;
    loop {
        match source.snapshot(frame, None).await {
            Ok(snapshot) => {
                if let Some(matched) = select(&snapshot) {
                    let elapsed = clock.now().duration_since(start);
                    return WaitOutcome::success(elapsed, matched);
                }
            }
            Err(e) => {
                debug!("Inspection during wait failed: {}", e);
                last_error = Some(e.to_string());
            }
        }
        let elapsed = clock.now().duration_since(start);
        if elapsed >= timeout {
            return WaitOutcome::timed_out(elapsed, last_error);
        }
        clock.sleep(poll.min(timeout - elapsed)).await;
    }
}

pub async fn wait_for_clickable_by_name<S, C>(
    source: &S,
    clock: &C,
    frame: &FrameTarget,
    name: &str,
    timeout: Duration,
    poll: Duration,
    case_insensitive: bool,
) -> WaitOutcome
where
    S: SnapshotSource + ?Sized,
    C: Clock + ?Sized,
{
    wait_for_match(source, clock, frame, timeout, poll, |snap| {
        select_clickable(snap, name, case_insensitive)
    })
    .await
}

pub async fn wait_for_field_by_name<S, C>(
    source: &S,
    clock: &C,
    frame: &FrameTarget,
    name: &str,
    timeout: Duration,
    poll: Duration,
    case_insensitive: bool,
) -> WaitOutcome
where
    S: SnapshotSource + ?Sized,
    C: Clock + ?Sized,
{
    wait_for_match(source, clock, frame, timeout, poll, |snap| {
        select_field(snap, name, case_insensitive)
    })
    .await
}

pub async fn wait_for_control_by_name_and_type<S, C>(
    source: &S,
    clock: &C,
    frame: &FrameTarget,
    name: &str,
    control_type: &str,
    timeout: Duration,
    poll: Duration,
    case_insensitive: bool,
) -> WaitOutcome
where
    S: SnapshotSource + ?Sized,
    C: Clock + ?Sized,
{
    wait_for_match(source, clock, frame, timeout, poll, |snap| {
        select_control(snap, name, control_type, case_insensitive)
    })
    .await
}

/// Which MutationObserver channels `wait_for_dom_change` listens on.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct DomChangeOptions {
    pub attributes: bool,
    pub child_list: bool,
    pub subtree: bool,
}

impl Default for DomChangeOptions {
    fn default() -> Self {
        Self {
            attributes: false,
            child_list: true,
            subtree: true,
        }
    }
}

/// Result of a DOM-change wait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomChangeOutcome {
    pub status: OutcomeStatus,
    pub elapsed_ms: u64,
    pub mutations: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

const OBSERVER_INSTALL_SCRIPT: &str = r#"
    const sel = arguments[0];
    const opts = arguments[1];
    const root = document.querySelector(sel);
    if (!root) return { error: 'root not found: ' + sel };
    if (window.__webgrip_observer) window.__webgrip_observer.disconnect();
    window.__webgrip_mutations = 0;
    window.__webgrip_observer = new MutationObserver(function(records) {
        window.__webgrip_mutations += records.length;
    });
    window.__webgrip_observer.observe(root, {
        attributes: !!opts.attributes,
        childList: !!opts.child_list,
        subtree: !!opts.subtree
    });
    return { installed: true };
"#;

const OBSERVER_POLL_SCRIPT: &str = r#"
    return (typeof window.__webgrip_mutations === 'number')
        ? window.__webgrip_mutations : -1;
"#;

const OBSERVER_CLEANUP_SCRIPT: &str = r#"
    if (window.__webgrip_observer) {
        window.__webgrip_observer.disconnect();
        delete window.__webgrip_observer;
    }
"#;

/// Pure decision for one element-state poll tick, split out for tests.
/// `displayed`/`enabled` are `None` when the element was not found.
pub(crate) fn state_satisfied(
    state: ElementState,
    found: bool,
    displayed: Option<bool>,
    enabled: Option<bool>,
) -> bool {
    match state {
        ElementState::Attached => found,
        ElementState::Detached => !found,
        ElementState::Visible => displayed.unwrap_or(false),
        ElementState::Hidden => !displayed.unwrap_or(false),
        ElementState::Enabled => enabled.unwrap_or(false),
        ElementState::Disabled => found && !enabled.unwrap_or(true),
    }
}

/// Observable element states for `wait_for_element_state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ElementState {
    Visible,
    Hidden,
    Attached,
    Detached,
    Enabled,
    Disabled,
}

/// Result of an element-state wait.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StateOutcome {
    pub status: OutcomeStatus,
    pub state: ElementState,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strategy_used: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl Browser {
    /// Wait for a clickable element whose accessible name contains `name`.
    pub async fn wait_for_clickable_by_name(
        &self,
        name: &str,
        timeout: Duration,
        frame: &FrameTarget,
    ) -> WaitOutcome {
        wait_for_clickable_by_name(
            self,
            &TokioClock,
            frame,
            name,
            timeout,
            self.config.poll_interval(),
            self.config.case_insensitive_names,
        )
        .await
    }

    /// Wait for a form field whose accessible name, placeholder or name
    /// attribute contains `name`.
    pub async fn wait_for_field_by_name(
        &self,
        name: &str,
        timeout: Duration,
        frame: &FrameTarget,
    ) -> WaitOutcome {
        wait_for_field_by_name(
            self,
            &TokioClock,
            frame,
            name,
            timeout,
            self.config.poll_interval(),
            self.config.case_insensitive_names,
        )
        .await
    }

    /// Wait for an interactive control of `control_type` whose name contains
    /// `name`.
    pub async fn wait_for_control_by_name_and_type(
        &self,
        name: &str,
        control_type: &str,
        timeout: Duration,
        frame: &FrameTarget,
    ) -> WaitOutcome {
        wait_for_control_by_name_and_type(
            self,
            &TokioClock,
            frame,
            name,
            control_type,
            timeout,
            self.config.poll_interval(),
            self.config.case_insensitive_names,
        )
        .await
    }

    /// Observe structural mutation under `root_selector` and resolve on the
    /// first qualifying change. Used to detect "something changed here"
    /// before re-scoping `inspect` to the same selector, avoiding a
    /// full-page re-scan after every action.
    pub async fn wait_for_dom_change(
        &self,
        root_selector: &str,
        options: DomChangeOptions,
        timeout: Duration,
        frame: &FrameTarget,
    ) -> Result<DomChangeOutcome, EngineError> {
        self.resolve_context(frame).await?;

        let install_args = vec![json!(root_selector), json!(options)];
        let installed = self
            .client
            .execute(OBSERVER_INSTALL_SCRIPT, install_args.clone())
            .await?;
        if let Some(err) = installed.get("error").and_then(|e| e.as_str()) {
            return Ok(DomChangeOutcome {
                status: OutcomeStatus::Error,
                elapsed_ms: 0,
                mutations: 0,
                reason: Some("timeout".to_string()),
                last_error: Some(err.to_string()),
            });
        }

        let start = Instant::now();
        let mut last_error = None;
        loop {
            match self.client.execute(OBSERVER_POLL_SCRIPT, vec![]).await {
                Ok(value) => {
                    let count = value.as_i64().unwrap_or(-1);
                    if count > 0 {
                        let _ = self.client.execute(OBSERVER_CLEANUP_SCRIPT, vec![]).await;
                        let elapsed = start.elapsed();
                        info!(
                            "DOM change under '{}' after {}ms ({} mutations)",
                            root_selector,
                            elapsed.as_millis(),
                            count
                        );
                        return Ok(DomChangeOutcome {
                            status: OutcomeStatus::Success,
                            elapsed_ms: elapsed.as_millis() as u64,
                            mutations: count as u64,
                            reason: None,
                            last_error: None,
                        });
                    }
                    if count < 0 {
                        // Navigation wiped the observer; reinstall and keep
                        // waiting.
                        warn!("Mutation observer lost (navigation?); reinstalling");
                        let _ = self
                            .client
                            .execute(OBSERVER_INSTALL_SCRIPT, install_args.clone())
                            .await;
                    }
                }
                Err(e) => last_error = Some(e.to_string()),
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                let _ = self.client.execute(OBSERVER_CLEANUP_SCRIPT, vec![]).await;
                return Ok(DomChangeOutcome {
                    status: OutcomeStatus::Error,
                    elapsed_ms: elapsed.as_millis() as u64,
                    mutations: 0,
                    reason: Some("timeout".to_string()),
                    last_error,
                });
            }
            tokio::time::sleep(self.config.poll_interval().min(timeout - elapsed)).await;
        }
    }

    /// Resolve the first materializable descriptor and poll until the
    /// element reaches `state` or the timeout elapses.
    pub async fn wait_for_element_state(
        &self,
        targets: &[Target],
        state: ElementState,
        timeout: Duration,
        frame: &FrameTarget,
    ) -> Result<StateOutcome, EngineError> {
        if targets.is_empty() {
            return Ok(StateOutcome {
                status: OutcomeStatus::Error,
                state,
                elapsed_ms: 0,
                strategy_used: None,
                reason: Some("no_strategies_provided".to_string()),
                last_error: Some(EngineError::NoStrategiesProvided.to_string()),
            });
        }
        self.resolve_context(frame).await?;

        // First descriptor that materializes names the element we watch.
        let mut spec_and_label = None;
        let mut last_error = None;
        for target in targets {
            match target.materialize(&self.config) {
                Ok(spec) => {
                    spec_and_label = Some((spec, target.label()));
                    break;
                }
                Err(e) => last_error = Some(e.to_string()),
            }
        }
        let Some((spec, label)) = spec_and_label else {
            return Ok(StateOutcome {
                status: OutcomeStatus::Error,
                state,
                elapsed_ms: 0,
                strategy_used: None,
                reason: Some("locator_construction_failed".to_string()),
                last_error,
            });
        };

        let start = Instant::now();
        loop {
            let found = self.client.find(spec.as_locator()).await.ok();
            let (displayed, enabled) = match &found {
                Some(element) => (
                    element.is_displayed().await.ok(),
                    element.is_enabled().await.ok(),
                ),
                None => (None, None),
            };
            if state_satisfied(state, found.is_some(), displayed, enabled) {
                let elapsed = start.elapsed();
                info!(
                    "Element '{}' reached state {:?} after {}ms",
                    label,
                    state,
                    elapsed.as_millis()
                );
                return Ok(StateOutcome {
                    status: OutcomeStatus::Success,
                    state,
                    elapsed_ms: elapsed.as_millis() as u64,
                    strategy_used: Some(label),
                    reason: None,
                    last_error: None,
                });
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                return Ok(StateOutcome {
                    status: OutcomeStatus::Error,
                    state,
                    elapsed_ms: elapsed.as_millis() as u64,
                    strategy_used: Some(label),
                    reason: Some("timeout".to_string()),
                    last_error: None,
                });
            }
            tokio::time::sleep(self.config.poll_interval().min(timeout - elapsed)).await;
        }
    }
}

#[cfg(test)]
#[path = "waits_test.rs"]
mod waits_test;
