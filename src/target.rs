use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::errors::EngineError;

/// One strategy for locating a single element.
///
/// Descriptors are immutable value objects; the order of a descriptor list
/// is significant (first-listed = preferred). The `by` tag on the wire
/// matches the names the orchestration layer emits.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Target {
    /// ARIA role plus accessible name, the most robust strategy in practice.
    Role { role: String, name: String },
    /// Text of an associated `<label>` (form fields).
    Label { label: String },
    /// `placeholder` attribute (form fields).
    Placeholder { placeholder: String },
    /// Exact visible text, matched on the innermost element carrying it.
    Text { text: String },
    /// Test-id attribute. Lowest priority: the most likely to drift under
    /// refactors.
    #[serde(alias = "testid")]
    TestId { id: String },
    /// Raw CSS selector. A bare identifier is normalized to `#identifier`.
    Css { selector: String },
    /// Raw XPath expression.
    Xpath { expr: String },
}

/// A materialized locator, ready to hand to the WebDriver layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocatorSpec {
    Css(String),
    XPath(String),
}

impl LocatorSpec {
    pub fn as_locator(&self) -> fantoccini::Locator<'_> {
        match self {
            LocatorSpec::Css(s) => fantoccini::Locator::Css(s),
            LocatorSpec::XPath(s) => fantoccini::Locator::XPath(s),
        }
    }
}

impl Target {
    /// Short label used in `strategies_attempted` lists and logs.
    pub fn label(&self) -> String {
        match self {
            Target::Role { role, name } => format!("role:{role}/{name}"),
            Target::Label { label } => format!("label:{label}"),
            Target::Placeholder { placeholder } => format!("placeholder:{placeholder}"),
            Target::Text { text } => format!("text:{text}"),
            Target::TestId { id } => format!("test_id:{id}"),
            Target::Css { selector } => format!("css:{selector}"),
            Target::Xpath { expr } => format!("xpath:{expr}"),
        }
    }

    /// Strategy name alone, for outcome summaries.
    pub fn strategy_name(&self) -> &'static str {
        match self {
            Target::Role { .. } => "role",
            Target::Label { .. } => "label",
            Target::Placeholder { .. } => "placeholder",
            Target::Text { .. } => "text",
            Target::TestId { .. } => "test_id",
            Target::Css { .. } => "css",
            Target::Xpath { .. } => "xpath",
        }
    }

    /// Turn the descriptor into a concrete CSS/XPath locator.
    ///
    /// The single exhaustive match here is the only place strategies become
    /// selectors; adding a variant is a compile-checked change. A descriptor
    /// whose required field is empty fails with
    /// `LocatorConstructionFailed`, which the chain executor treats as that
    /// descriptor's failure rather than a hard error.
    pub fn materialize(&self, cfg: &EngineConfig) -> Result<LocatorSpec, EngineError> {
        let fail = |reason: &str| EngineError::LocatorConstructionFailed {
            descriptor: self.label(),
            reason: reason.to_string(),
        };
        match self {
            Target::Role { role, name } => {
                if role.trim().is_empty() {
                    return Err(fail("role is empty"));
                }
                Ok(LocatorSpec::XPath(role_xpath(role.trim(), name.trim())))
            }
            Target::Label { label } => {
                if label.trim().is_empty() {
                    return Err(fail("label is empty"));
                }
                Ok(LocatorSpec::XPath(label_xpath(label.trim())))
            }
            Target::Placeholder { placeholder } => {
                if placeholder.is_empty() {
                    return Err(fail("placeholder is empty"));
                }
                let lit = css_string(placeholder);
                Ok(LocatorSpec::Css(format!(
                    "input[placeholder={lit}], textarea[placeholder={lit}]"
                )))
            }
            Target::Text { text } => {
                if text.trim().is_empty() {
                    return Err(fail("text is empty"));
                }
                Ok(LocatorSpec::XPath(text_xpath(text.trim())))
            }
            Target::TestId { id } => {
                if id.is_empty() {
                    return Err(fail("test id is empty"));
                }
                Ok(LocatorSpec::Css(format!(
                    "[{}={}]",
                    cfg.test_id_attribute,
                    css_string(id)
                )))
            }
            Target::Css { selector } => {
                let selector = selector.trim();
                if selector.is_empty() {
                    return Err(fail("selector is empty"));
                }
                Ok(LocatorSpec::Css(normalize_css(selector)))
            }
            Target::Xpath { expr } => {
                let expr = expr.trim();
                if expr.is_empty() {
                    return Err(fail("expression is empty"));
                }
                Ok(LocatorSpec::XPath(expr.to_string()))
            }
        }
    }
}

/// A selector that looks like a bare identifier (`loginButton`) is almost
/// always a misremembered element id; rewrite it to `#loginButton`.
/// Anything already carrying CSS syntax passes through untouched.
pub(crate) fn normalize_css(selector: &str) -> String {
    let bare = !selector.is_empty()
        && !selector.starts_with(['#', '.', '['])
        && selector
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        && !is_html_tag(selector);
    if bare {
        format!("#{selector}")
    } else {
        selector.to_string()
    }
}

/// Tags that commonly appear alone as selectors; these stay element
/// selectors rather than being rewritten to ids.
fn is_html_tag(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "a" | "body"
            | "button"
            | "div"
            | "form"
            | "h1"
            | "h2"
            | "h3"
            | "h4"
            | "h5"
            | "h6"
            | "html"
            | "iframe"
            | "img"
            | "input"
            | "label"
            | "li"
            | "nav"
            | "option"
            | "p"
            | "section"
            | "select"
            | "span"
            | "table"
            | "td"
            | "textarea"
            | "th"
            | "tr"
            | "ul"
    )
}

/// Double-quoted CSS string literal with backslash and quote escaping.
pub(crate) fn css_string(value: &str) -> String {
    let escaped = value.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\"")
}

/// XPath 1.0 string literal. Values containing both quote kinds need
/// `concat()`; everything else gets plain quotes.
pub(crate) fn xpath_literal(value: &str) -> String {
    if !value.contains('\'') {
        format!("'{value}'")
    } else if !value.contains('"') {
        format!("\"{value}\"")
    } else {
        let parts: Vec<String> = value
            .split('\'')
            .map(|p| format!("'{p}'"))
            .collect();
        format!("concat({})", parts.join(", \"'\", "))
    }
}

/// Tag-level predicate for elements that carry a role implicitly, per the
/// ARIA-in-HTML defaults this engine needs for locating.
fn role_tag_predicate(role: &str) -> Option<&'static str> {
    match role {
        "button" => Some(
            "self::button or (self::input and (@type='submit' or @type='button' or @type='reset'))",
        ),
        "link" => Some("(self::a and @href)"),
        "textbox" => Some(
            "self::textarea or (self::input and (not(@type) or @type='text' or @type='email' \
             or @type='password' or @type='tel' or @type='url'))",
        ),
        "searchbox" => Some("(self::input and @type='search')"),
        "checkbox" => Some("(self::input and @type='checkbox')"),
        "radio" => Some("(self::input and @type='radio')"),
        "combobox" => Some("self::select"),
        "slider" => Some("(self::input and @type='range')"),
        "option" => Some("self::option"),
        _ => None,
    }
}

/// XPath for the role strategy: explicit `@role` or the tag-derived default,
/// filtered by a WCAG-narrowed accessible-name predicate. An empty name
/// matches on role alone.
fn role_xpath(role: &str, name: &str) -> String {
    let role_lit = xpath_literal(role);
    let role_pred = match role_tag_predicate(role) {
        Some(tags) => format!("@role={role_lit} or {tags}"),
        None => format!("@role={role_lit}"),
    };
    if name.is_empty() {
        return format!("//*[{role_pred}]");
    }
    let lit = xpath_literal(name);
    format!(
        "//*[({role_pred}) and (normalize-space(@aria-label)={lit} \
         or normalize-space(string(.))={lit} \
         or normalize-space(@title)={lit} \
         or normalize-space(@value)={lit})]"
    )
}

/// XPath for the label strategy: `<label for=…>`-associated fields, fields
/// nested inside a matching label, and fields whose `aria-label` matches.
fn label_xpath(label: &str) -> String {
    let lit = xpath_literal(label);
    format!(
        "//*[(self::input or self::textarea or self::select) \
         and @id = //label[normalize-space(string(.))={lit}]/@for] \
         | //label[normalize-space(string(.))={lit}]//*[self::input or self::textarea or self::select] \
         | //*[(self::input or self::textarea or self::select) and normalize-space(@aria-label)={lit}]"
    )
}

/// XPath for the text strategy: the innermost element whose normalized text
/// equals the value, so a match lands on the button rather than on `<body>`.
fn text_xpath(text: &str) -> String {
    let lit = xpath_literal(text);
    format!(
        "//*[normalize-space(string(.))={lit} \
         and not(descendant::*[normalize-space(string(.))={lit}]) \
         and not(self::script or self::style)]"
    )
}

#[cfg(test)]
#[path = "target_test.rs"]
mod target_test;
