use serde::{Deserialize, Serialize};

use crate::a11y::{self, RawNode, SelectOption};
use crate::target::Target;

/// An iframe present in the inspected context, with the attributes callers
/// need to build an `IframeStep` for it.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct IframeInfo {
    pub index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A clickable element: buttons, links, button-like inputs, ARIA
/// button/link/menuitem/option/tab roles, and configured widget classes.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ClickableElement {
    pub tag: String,
    pub effective_role: String,
    pub accessible_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    pub visible: bool,
    pub suggested_targets: Vec<Target>,
}

/// A text-bearing form field: `input`/`textarea` minus the control types.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FormField {
    pub tag: String,
    pub effective_role: String,
    pub field_type: String,
    pub accessible_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    pub visible: bool,
    pub suggested_targets: Vec<Target>,
}

/// A stateful control: checkbox/radio/switch/tab/select/range/color/file,
/// annotated with its current value state.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct InteractiveControl {
    pub tag: String,
    pub effective_role: String,
    pub control_type: String,
    pub accessible_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_id: Option<String>,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checked: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub options: Vec<SelectOption>,
    pub suggested_targets: Vec<Target>,
}

/// The full read-only projection one `inspect` call produces. Built fresh
/// on every call; nothing here is cached or mutated afterwards.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct PageInspection {
    pub url: String,
    /// The requested root selector matched nothing; all families are empty.
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub root_missing: bool,
    pub iframes: Vec<IframeInfo>,
    pub clickable_elements: Vec<ClickableElement>,
    pub form_fields: Vec<FormField>,
    pub interactive_controls: Vec<InteractiveControl>,
}

/// Wire shape returned by the collector script.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct RawCollection {
    pub url: String,
    pub error: Option<String>,
    pub iframes: Vec<IframeInfo>,
    pub clickable: Vec<RawNode>,
    pub fields: Vec<RawNode>,
    pub controls: Vec<RawControl>,
}

/// Control nodes carry their kind in a side field the collector sets.
#[derive(Debug, Deserialize)]
pub(crate) struct RawControl {
    #[serde(flatten)]
    pub node: RawNode,
    #[serde(default)]
    pub control_type: Option<String>,
}

/// In-page collector. Harvests raw facts only; all classification of names,
/// roles and strategies happens on the Rust side. Arguments:
/// root selector (nullable), clickable widget classes, text truncation
/// length, test-id attribute name.
pub(crate) const COLLECT_SCRIPT: &str = r#"
    const rootSel = arguments[0];
    const widgetClasses = arguments[1] || [];
    const truncate = arguments[2] || 120;
    const testIdAttr = arguments[3] || 'data-testid';

    const root = rootSel ? document.querySelector(rootSel) : document;
    if (!root) {
        return { url: document.location.href, error: 'root not found: ' + rootSel };
    }

    function attr(el, n) {
        const v = el.getAttribute(n);
        return v === null || v === '' ? null : v;
    }

    function clip(t) {
        if (!t) return null;
        t = t.trim();
        if (!t) return null;
        return t.length > truncate ? t.slice(0, truncate) : t;
    }

    function isVisible(el) {
        const r = el.getBoundingClientRect();
        const s = window.getComputedStyle(el);
        return r.width > 0 && r.height > 0 &&
               s.display !== 'none' && s.visibility !== 'hidden';
    }

    function labelledbyText(el) {
        const ref = el.getAttribute('aria-labelledby');
        if (!ref) return null;
        const parts = ref.split(/\s+/).map(function(id) {
            const t = document.getElementById(id);
            return t ? t.innerText.trim() : '';
        }).filter(Boolean);
        return parts.length ? clip(parts.join(' ')) : null;
    }

    function labelText(el) {
        if (el.labels && el.labels.length) return clip(el.labels[0].innerText);
        const wrap = el.closest ? el.closest('label') : null;
        return wrap ? clip(wrap.innerText) : null;
    }

    const CONTROL_INPUTS = ['checkbox', 'radio', 'range', 'color', 'file'];
    const BUTTON_INPUTS = ['button', 'submit', 'reset', 'image'];
    const CLICKABLE_ROLES = ['button', 'link', 'menuitem', 'option', 'tab'];

    function controlKind(el, tag, type, role) {
        if (tag === 'select') return 'select';
        if (tag === 'input' && CONTROL_INPUTS.indexOf(type) !== -1) return type;
        if (role === 'switch') return 'switch';
        if (role === 'tab') return 'tab';
        if (role === 'checkbox') return 'checkbox';
        if (role === 'radio') return 'radio';
        return null;
    }

    function isClickable(el, tag, type, role) {
        if (tag === 'button') return true;
        if (tag === 'a' && el.hasAttribute('href')) return true;
        if (tag === 'input' && BUTTON_INPUTS.indexOf(type) !== -1) return true;
        if (CLICKABLE_ROLES.indexOf(role) !== -1) return true;
        for (const c of widgetClasses) {
            if (el.classList.contains(c)) return true;
        }
        return false;
    }

    function rawNode(el, tag, type) {
        const isForm = tag === 'input' || tag === 'select' || tag === 'textarea';
        return {
            tag: tag,
            role: attr(el, 'role'),
            aria_label: attr(el, 'aria-label'),
            labelledby_text: labelledbyText(el),
            text: clip(el.innerText),
            title: attr(el, 'title'),
            value: (isForm && type !== 'password') ? clip(el.value) : null,
            label_text: isForm ? labelText(el) : null,
            placeholder: attr(el, 'placeholder'),
            name: attr(el, 'name'),
            id: attr(el, 'id'),
            input_type: tag === 'input' ? (type || 'text') : null,
            test_id: attr(el, testIdAttr),
            visible: isVisible(el)
        };
    }

    const widgetSelector = widgetClasses.map(function(c) {
        return '.' + (window.CSS && CSS.escape ? CSS.escape(c) : c);
    });
    const selector = ['button', 'a[href]', 'input', 'select', 'textarea', '[role]']
        .concat(widgetSelector).join(', ');

    const seen = new Set();
    const clickable = [], fields = [], controls = [];

    for (const el of root.querySelectorAll(selector)) {
        if (seen.has(el)) continue;
        seen.add(el);

        const tag = el.tagName.toLowerCase();
        const type = (el.getAttribute('type') || '').toLowerCase();
        const role = (el.getAttribute('role') || '').toLowerCase();
        if (tag === 'input' && type === 'hidden') continue;

        const kind = controlKind(el, tag, type, role);
        if (kind) {
            const node = rawNode(el, tag, type);
            node.control_type = kind;
            if (kind === 'checkbox' || kind === 'radio' || kind === 'switch') {
                node.checked = tag === 'input'
                    ? !!el.checked
                    : el.getAttribute('aria-checked') === 'true';
            }
            if (kind === 'tab') {
                node.selected = el.getAttribute('aria-selected') === 'true';
            }
            if (kind === 'select') {
                node.options = Array.from(el.options || []).map(function(o) {
                    return {
                        value: o.value,
                        label: (o.label || o.text || '').trim(),
                        selected: o.selected
                    };
                });
            }
            controls.push(node);
        } else if ((tag === 'input' || tag === 'textarea')
                   && BUTTON_INPUTS.indexOf(type) === -1) {
            fields.push(rawNode(el, tag, type));
        } else if (isClickable(el, tag, type, role)) {
            clickable.push(rawNode(el, tag, type));
        }
    }

    const iframes = Array.from(document.querySelectorAll('iframe')).map(function(f, i) {
        return {
            index: i,
            src: attr(f, 'src'),
            name: attr(f, 'name'),
            id: attr(f, 'id'),
            title: attr(f, 'title')
        };
    });

    return {
        url: document.location.href,
        iframes: iframes,
        clickable: clickable,
        fields: fields,
        controls: controls
    };
"#;

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn css_attr(attr: &str, value: &str) -> Target {
    Target::Css {
        selector: format!("[{attr}={}]", crate::target::css_string(value)),
    }
}

fn css_id(id: &str) -> Target {
    Target::Css {
        selector: format!("#{id}"),
    }
}

fn nonempty(opt: &Option<String>) -> Option<&str> {
    opt.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

/// Strategies for a clickable element, most robust first.
///
/// Icon+label composite buttons concatenate an icon glyph name with the
/// human label across lines; an exact full-string text match on those is
/// unreliable, so a label-only strategy built from the last non-empty line
/// goes ahead of the full-text one.
fn suggest_clickable(raw: &RawNode, role: &str, name: Option<&str>) -> Vec<Target> {
    let mut targets = Vec::new();
    if let Some(name) = name {
        targets.push(Target::Role {
            role: role.to_string(),
            name: name.to_string(),
        });
    }
    if let Some(text) = nonempty(&raw.text) {
        let lines: Vec<&str> = text
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect();
        if lines.len() > 1
            && let Some(last) = lines.last()
        {
            targets.push(Target::Text {
                text: last.to_string(),
            });
        }
        targets.push(Target::Text {
            text: collapse_ws(text),
        });
    }
    if let Some(name_attr) = nonempty(&raw.name) {
        targets.push(css_attr("name", name_attr));
    }
    if let Some(id) = nonempty(&raw.id) {
        targets.push(css_id(id));
    }
    if let Some(aria) = nonempty(&raw.aria_label) {
        targets.push(css_attr("aria-label", aria));
    }
    if let Some(test_id) = nonempty(&raw.test_id) {
        targets.push(Target::TestId {
            id: test_id.to_string(),
        });
    }
    targets
}

/// Strategies for a form field: label first, test-id last. The role
/// strategy is only emitted when the field carries an `aria-label`, since a
/// label-derived name is invisible to a role locator.
fn suggest_field(raw: &RawNode) -> Vec<Target> {
    let mut targets = Vec::new();
    if let Some(label) = nonempty(&raw.label_text) {
        targets.push(Target::Label {
            label: label.to_string(),
        });
    }
    if let Some(placeholder) = nonempty(&raw.placeholder) {
        targets.push(Target::Placeholder {
            placeholder: placeholder.to_string(),
        });
    }
    if let Some(aria) = nonempty(&raw.aria_label)
        && let Some(role) = a11y::role_for_input_type(&raw.tag, raw.input_type.as_deref())
    {
        targets.push(Target::Role {
            role: role.to_string(),
            name: aria.to_string(),
        });
    }
    if let Some(name_attr) = nonempty(&raw.name) {
        targets.push(css_attr("name", name_attr));
    }
    if let Some(id) = nonempty(&raw.id) {
        targets.push(css_id(id));
    }
    if let Some(aria) = nonempty(&raw.aria_label) {
        targets.push(css_attr("aria-label", aria));
    }
    if let Some(test_id) = nonempty(&raw.test_id) {
        targets.push(Target::TestId {
            id: test_id.to_string(),
        });
    }
    targets
}

/// Strategies for an interactive control.
fn suggest_control(raw: &RawNode, role: &str) -> Vec<Target> {
    let mut targets = Vec::new();
    if let Some(aria) = nonempty(&raw.aria_label) {
        targets.push(Target::Role {
            role: role.to_string(),
            name: aria.to_string(),
        });
    }
    if let Some(label) = nonempty(&raw.label_text) {
        targets.push(Target::Label {
            label: label.to_string(),
        });
    }
    if let Some(id) = nonempty(&raw.id) {
        targets.push(css_id(id));
    }
    if let Some(name_attr) = nonempty(&raw.name) {
        targets.push(css_attr("name", name_attr));
    }
    if let Some(test_id) = nonempty(&raw.test_id) {
        targets.push(Target::TestId {
            id: test_id.to_string(),
        });
    }
    targets
}

pub(crate) fn build_clickable(raw: RawNode) -> ClickableElement {
    let role = a11y::effective_role(&raw);
    let name = a11y::accessible_name(&raw);
    let suggested_targets = suggest_clickable(&raw, &role, name.as_deref());
    ClickableElement {
        tag: raw.tag,
        effective_role: role,
        accessible_name: name,
        visible_text: raw.text,
        aria_label: raw.aria_label,
        id: raw.id,
        test_id: raw.test_id,
        visible: raw.visible,
        suggested_targets,
    }
}

pub(crate) fn build_field(raw: RawNode) -> FormField {
    let role = a11y::effective_role(&raw);
    let name = a11y::accessible_name(&raw);
    let suggested_targets = suggest_field(&raw);
    FormField {
        field_type: raw.input_type.clone().unwrap_or_else(|| raw.tag.clone()),
        tag: raw.tag,
        effective_role: role,
        accessible_name: name,
        label: raw.label_text,
        placeholder: raw.placeholder,
        name: raw.name,
        id: raw.id,
        aria_label: raw.aria_label,
        test_id: raw.test_id,
        visible: raw.visible,
        suggested_targets,
    }
}

pub(crate) fn build_control(mut raw: RawNode, control_type: String) -> InteractiveControl {
    let role = a11y::effective_role(&raw);
    let name = a11y::accessible_name(&raw);
    let suggested_targets = suggest_control(&raw, &role);
    InteractiveControl {
        tag: std::mem::take(&mut raw.tag),
        effective_role: role,
        control_type,
        accessible_name: name,
        label: raw.label_text,
        name: raw.name,
        id: raw.id,
        aria_label: raw.aria_label,
        test_id: raw.test_id,
        visible: raw.visible,
        checked: raw.checked,
        selected: raw.selected,
        options: raw.options,
        suggested_targets,
    }
}

pub(crate) fn build_inspection(raw: RawCollection) -> PageInspection {
    PageInspection {
        url: raw.url,
        root_missing: raw.error.is_some(),
        iframes: raw.iframes,
        clickable_elements: raw.clickable.into_iter().map(build_clickable).collect(),
        form_fields: raw.fields.into_iter().map(build_field).collect(),
        interactive_controls: raw
            .controls
            .into_iter()
            .map(|c| {
                let kind = c.control_type.unwrap_or_else(|| "unknown".to_string());
                build_control(c.node, kind)
            })
            .collect(),
    }
}

#[cfg(test)]
#[path = "snapshot_test.rs"]
mod snapshot_test;
