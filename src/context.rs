use serde::{Deserialize, Serialize};

/// One step on the way into a (possibly nested) iframe. Either field may be
/// given; a step with neither is rejected at parse time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct IframeStep {
    /// CSS selector for the `<iframe>` element.
    pub selector: Option<String>,
    /// Substring matched against each iframe's `src` URL.
    pub url_pattern: Option<String>,
}

impl IframeStep {
    pub fn selector(selector: impl Into<String>) -> Self {
        Self {
            selector: Some(selector.into()),
            url_pattern: None,
        }
    }

    pub fn url_pattern(pattern: impl Into<String>) -> Self {
        Self {
            selector: None,
            url_pattern: Some(pattern.into()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selector.as_deref().is_none_or(str::is_empty)
            && self.url_pattern.as_deref().is_none_or(str::is_empty)
    }

    /// Human-readable description for errors and logs.
    pub fn describe(&self) -> String {
        match (&self.selector, &self.url_pattern) {
            (Some(sel), _) => format!("iframe selector '{sel}'"),
            (None, Some(pat)) => format!("iframe src containing '{pat}'"),
            (None, None) => "empty iframe step".to_string(),
        }
    }
}

/// The document scope locators are evaluated against: the top page, or a
/// frame reached by a depth-first path of iframe steps.
///
/// Resolution is stateless: every engine call re-resolves its context from
/// the top document, so detached frames never leak across calls.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameTarget {
    #[default]
    Top,
    Frames(Vec<IframeStep>),
}

impl FrameTarget {
    /// Build from the flat parameters the CLI and callers pass: a single
    /// selector, a single url pattern, or a JSON path of steps. Returns
    /// `None` when the combination is invalid (a step with no fields).
    pub fn from_parts(
        selector: Option<String>,
        url_pattern: Option<String>,
        path: Option<Vec<IframeStep>>,
    ) -> Option<Self> {
        if let Some(steps) = path {
            if steps.is_empty() || steps.iter().any(IframeStep::is_empty) {
                return None;
            }
            return Some(FrameTarget::Frames(steps));
        }
        match (selector, url_pattern) {
            (None, None) => Some(FrameTarget::Top),
            (sel, pat) => {
                let step = IframeStep {
                    selector: sel.filter(|s| !s.is_empty()),
                    url_pattern: pat.filter(|s| !s.is_empty()),
                };
                if step.is_empty() {
                    None
                } else {
                    Some(FrameTarget::Frames(vec![step]))
                }
            }
        }
    }

    pub fn is_top(&self) -> bool {
        matches!(self, FrameTarget::Top)
    }

    /// True for the one shape allowed to degrade to "first iframe": a
    /// single step addressed by url pattern alone. Pages often set an
    /// iframe's `src` asynchronously after navigation, so a pattern miss
    /// there does not prove the frame is absent.
    pub fn degrades_to_first_iframe(&self) -> bool {
        match self {
            FrameTarget::Frames(steps) => {
                steps.len() == 1 && steps[0].selector.is_none() && steps[0].url_pattern.is_some()
            }
            FrameTarget::Top => false,
        }
    }
}

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;
