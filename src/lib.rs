//! # webgrip
//!
//! Resilient, accessibility-grounded browser interaction engine for
//! automated test scenarios.
//!
//! Enterprise UIs are flaky, animated, and frequently non-semantic. webgrip
//! drives them through three cooperating layers:
//!
//! - **Fallback chains**: an ordered list of locating strategies (role,
//!   label, placeholder, text, test-id, CSS, XPath) is executed until one
//!   succeeds, with a three-tier click escalation per strategy
//!   (actionability-checked → forced pointer click → JavaScript dispatch).
//! - **Snapshots**: `inspect` scans a page, an iframe, or a sub-region for
//!   clickable elements, form fields and interactive controls, computing a
//!   WCAG-style accessible name for each and emitting ready-to-use locating
//!   strategies ordered by robustness.
//! - **Semantic waits**: polling primitives that wait for an element by
//!   (partial) accessible name, for an element lifecycle state
//!   (visible/hidden/attached/detached/enabled/disabled), or for DOM
//!   mutation under a container, and hand back the strategies to act on
//!   what appeared.
//!
//! ## CLI usage
//!
//! ```bash
//! # Discover interactive elements and their locating strategies
//! webgrip inspect "https://app.example.com"
//!
//! # Scope discovery to a modal that just changed
//! webgrip inspect "https://app.example.com" --root ".modal"
//!
//! # Click with a fallback chain
//! webgrip click "https://app.example.com" \
//!   '[{"by":"role","role":"button","name":"Save"},{"by":"text","text":"Save"}]'
//!
//! # Fill a field located by label, falling back to placeholder
//! webgrip fill "https://app.example.com" \
//!   '[{"by":"label","label":"Email"},{"by":"placeholder","placeholder":"you@example.com"}]' \
//!   "user@example.com"
//!
//! # Wait for a button to appear, then read its strategies from the output
//! webgrip wait-name "https://app.example.com" "Filters" --timeout-ms 10000
//!
//! # Operate inside a nested iframe
//! webgrip click "https://app.example.com" '{"by":"text","text":"Pay now"}' \
//!   --iframe-path '[{"selector":"iframe.outer"},{"url_pattern":"checkout"}]'
//! ```
//!
//! ## Library usage
//!
//! ```no_run
//! use webgrip::{Browser, BrowserType, EngineConfig, FrameTarget, Target};
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let browser = Browser::connect(
//!     "http://localhost:4444",
//!     BrowserType::Firefox,
//!     None,  // Default viewport
//!     true,  // Headless
//!     EngineConfig::default(),
//! ).await?;
//!
//! browser.goto("https://app.example.com").await?;
//!
//! // Discover elements and their suggested strategies
//! let inspection = browser.inspect(&FrameTarget::Top, None).await?;
//!
//! // Act through a fallback chain
//! let targets = vec![
//!     Target::Role { role: "button".into(), name: "Save".into() },
//!     Target::Text { text: "Save".into() },
//! ];
//! let outcome = browser
//!     .click_chain(&targets, Duration::from_secs(5), &FrameTarget::Top)
//!     .await?;
//! assert!(outcome.is_success());
//! # Ok(())
//! # }
//! ```
//!
//! The engine holds no cross-call state about the page: every operation
//! re-resolves its iframe context from the top document and re-scans the
//! DOM, trading a little performance for freedom from stale-reference bugs.
//! Calls must be issued strictly one at a time per session.

/// Accessible name and effective role computation (pure)
pub mod a11y;

/// Engine configuration
pub mod config;

/// Iframe addressing and execution contexts
pub mod context;

/// WebDriver process management
pub mod driver;

/// Engine error taxonomy
pub mod errors;

/// Fallback chain executor (click, fill)
pub mod executor;

/// Element snapshots and the in-page collector
pub mod snapshot;

/// Target descriptors and locator materialization
pub mod target;

/// Shared CLI types
pub mod types;

/// Semantic wait primitives
pub mod waits;

/// WebDriver browser session
pub mod webdriver;

pub use config::EngineConfig;
pub use context::{FrameTarget, IframeStep};
pub use driver::DriverManager;
pub use errors::EngineError;
pub use executor::{BannerOutcome, ClickTier, OutcomeStatus, StrategyOutcome};
pub use snapshot::{
    ClickableElement, FormField, IframeInfo, InteractiveControl, PageInspection,
};
pub use target::{LocatorSpec, Target};
pub use types::{OutputFormat, ViewportSize};
pub use waits::{
    Clock, DomChangeOptions, DomChangeOutcome, ElementState, SnapshotSource, StateOutcome,
    TokioClock, WaitMatch, WaitOutcome,
};
pub use webdriver::{Browser, BrowserType, ExistsReport, PageInfo};
