use serde::{Deserialize, Serialize};

/// One option of a `<select>` control.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

/// Raw per-element facts gathered by the in-page collector script.
///
/// The script only harvests attributes and text; every judgement (accessible
/// name, effective role, suggested strategies) is made here in Rust so it
/// can be unit-tested against fixture nodes with no browser involved.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct RawNode {
    pub tag: String,
    pub role: Option<String>,
    pub aria_label: Option<String>,
    /// Text of the element referenced by `aria-labelledby` (one hop only).
    pub labelledby_text: Option<String>,
    /// Own trimmed visible text, truncated by the collector.
    pub text: Option<String>,
    pub title: Option<String>,
    pub value: Option<String>,
    /// Text of an associated `<label for=id>` or enclosing `<label>`.
    pub label_text: Option<String>,
    pub placeholder: Option<String>,
    pub name: Option<String>,
    pub id: Option<String>,
    pub input_type: Option<String>,
    pub test_id: Option<String>,
    pub visible: bool,
    pub checked: Option<bool>,
    pub selected: Option<bool>,
    pub options: Vec<SelectOption>,
}

fn nonempty(s: &Option<String>) -> Option<String> {
    s.as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

impl RawNode {
    pub fn is_form_element(&self) -> bool {
        matches!(self.tag.as_str(), "input" | "select" | "textarea")
    }
}

/// WCAG-style accessible name, narrowed to what locating needs.
///
/// Priority, first non-empty wins: `aria-label` → `aria-labelledby`
/// referenced text (one hop, no chains) → own trimmed text → `title` →
/// form `value`. For form fields the associated `<label>` is preferred
/// ahead of placeholder and the `name` attribute. No full accessibility
/// tree is computed; table/caption special cases are out of scope.
pub fn accessible_name(node: &RawNode) -> Option<String> {
    if let Some(label) = nonempty(&node.aria_label) {
        return Some(label);
    }
    if let Some(label) = nonempty(&node.labelledby_text) {
        return Some(label);
    }
    if node.is_form_element() {
        return nonempty(&node.label_text)
            .or_else(|| nonempty(&node.title))
            .or_else(|| nonempty(&node.placeholder))
            .or_else(|| nonempty(&node.name));
    }
    nonempty(&node.text)
        .or_else(|| nonempty(&node.title))
        .or_else(|| nonempty(&node.value))
}

/// Explicit ARIA role, or a tag/type-derived default.
///
/// The mapping covers the element families the snapshot builder emits;
/// anything unknown falls back to its tag name, which still reads sensibly
/// in snapshots (`"summary"`, `"details"`, …).
pub fn effective_role(node: &RawNode) -> String {
    if let Some(role) = nonempty(&node.role) {
        return role;
    }
    let input_type = node.input_type.as_deref().unwrap_or("");
    match node.tag.as_str() {
        "button" => "button".into(),
        "a" => "link".into(),
        "select" => "combobox".into(),
        "textarea" => "textbox".into(),
        "option" => "option".into(),
        "input" => match input_type {
            "button" | "submit" | "reset" | "image" => "button".into(),
            "checkbox" => "checkbox".into(),
            "radio" => "radio".into(),
            "range" => "slider".into(),
            "search" => "searchbox".into(),
            "color" | "file" => "button".into(),
            "number" => "spinbutton".into(),
            _ => "textbox".into(),
        },
        other => other.into(),
    }
}

/// Role to suggest for a form field from its input type, used by the
/// role-by-input-type strategy in suggested-target lists.
pub fn role_for_input_type(tag: &str, input_type: Option<&str>) -> Option<&'static str> {
    match tag {
        "textarea" => Some("textbox"),
        "select" => Some("combobox"),
        "input" => Some(match input_type.unwrap_or("text") {
            "search" => "searchbox",
            "number" => "spinbutton",
            "range" => "slider",
            "checkbox" => "checkbox",
            "radio" => "radio",
            "button" | "submit" | "reset" => "button",
            _ => "textbox",
        }),
        _ => None,
    }
}

#[cfg(test)]
#[path = "a11y_test.rs"]
mod a11y_test;
