// Unit tests for snapshot building and suggested-target ordering

use super::*;
use pretty_assertions::assert_eq;

fn raw_button(text: &str) -> RawNode {
    RawNode {
        tag: "button".into(),
        text: Some(text.into()),
        visible: true,
        ..Default::default()
    }
}

#[test]
fn test_button_with_aria_label_suggests_role_first() {
    // Page has a button with aria-label="Submit" and visible text "Submit"
    let raw = RawNode {
        aria_label: Some("Submit".into()),
        ..raw_button("Submit")
    };
    let snap = build_clickable(raw);

    assert_eq!(snap.accessible_name.as_deref(), Some("Submit"));
    assert_eq!(snap.effective_role, "button");
    assert_eq!(
        snap.suggested_targets[0],
        Target::Role {
            role: "button".into(),
            name: "Submit".into()
        }
    );
}

#[test]
fn test_clickable_strategy_order_semantic_first_test_id_last() {
    let raw = RawNode {
        aria_label: Some("Save".into()),
        name: Some("save-action".into()),
        id: Some("saveBtn".into()),
        test_id: Some("save-button".into()),
        ..raw_button("Save")
    };
    let snap = build_clickable(raw);

    let kinds: Vec<&str> = snap
        .suggested_targets
        .iter()
        .map(|t| t.strategy_name())
        .collect();
    assert_eq!(kinds, vec!["role", "text", "css", "css", "css", "test_id"]);
    assert_eq!(
        snap.suggested_targets.last(),
        Some(&Target::TestId {
            id: "save-button".into()
        })
    );
}

#[test]
fn test_icon_label_composite_gets_label_only_text_strategy() {
    // An icon glyph name on the first line, human label on the second
    let raw = RawNode {
        aria_label: Some("Filters".into()),
        ..raw_button("filter_list\nFilters")
    };
    let snap = build_clickable(raw);

    let texts: Vec<&Target> = snap
        .suggested_targets
        .iter()
        .filter(|t| matches!(t, Target::Text { .. }))
        .collect();
    // Label-only strategy comes before the full-text one
    assert_eq!(
        texts[0],
        &Target::Text {
            text: "Filters".into()
        }
    );
    assert_eq!(
        texts[1],
        &Target::Text {
            text: "filter_list Filters".into()
        }
    );
}

#[test]
fn test_single_line_button_gets_no_label_only_strategy() {
    let snap = build_clickable(raw_button("Save"));
    let texts: Vec<&Target> = snap
        .suggested_targets
        .iter()
        .filter(|t| matches!(t, Target::Text { .. }))
        .collect();
    assert_eq!(texts, vec![&Target::Text { text: "Save".into() }]);
}

#[test]
fn test_field_strategy_order() {
    let raw = RawNode {
        tag: "input".into(),
        input_type: Some("email".into()),
        label_text: Some("Email address".into()),
        placeholder: Some("you@example.com".into()),
        aria_label: Some("Email".into()),
        name: Some("email".into()),
        id: Some("emailInput".into()),
        test_id: Some("email-field".into()),
        visible: true,
        ..Default::default()
    };
    let snap = build_field(raw);

    assert_eq!(
        snap.suggested_targets,
        vec![
            Target::Label {
                label: "Email address".into()
            },
            Target::Placeholder {
                placeholder: "you@example.com".into()
            },
            Target::Role {
                role: "textbox".into(),
                name: "Email".into()
            },
            Target::Css {
                selector: "[name=\"email\"]".into()
            },
            Target::Css {
                selector: "#emailInput".into()
            },
            Target::Css {
                selector: "[aria-label=\"Email\"]".into()
            },
            Target::TestId {
                id: "email-field".into()
            },
        ]
    );
    assert_eq!(snap.field_type, "email");
    assert_eq!(snap.accessible_name.as_deref(), Some("Email"));
}

#[test]
fn test_field_without_aria_label_skips_role_strategy() {
    let raw = RawNode {
        tag: "input".into(),
        input_type: Some("text".into()),
        label_text: Some("City".into()),
        ..Default::default()
    };
    let snap = build_field(raw);
    assert!(
        !snap
            .suggested_targets
            .iter()
            .any(|t| matches!(t, Target::Role { .. })),
        "label-derived names are invisible to role locators"
    );
}

#[test]
fn test_checkbox_control_state_and_strategies() {
    let raw = RawNode {
        tag: "input".into(),
        input_type: Some("checkbox".into()),
        label_text: Some("Subscribe".into()),
        id: Some("subscribe".into()),
        checked: Some(true),
        visible: true,
        ..Default::default()
    };
    let snap = build_control(raw, "checkbox".into());

    assert_eq!(snap.control_type, "checkbox");
    assert_eq!(snap.effective_role, "checkbox");
    assert_eq!(snap.checked, Some(true));
    assert_eq!(
        snap.suggested_targets,
        vec![
            Target::Label {
                label: "Subscribe".into()
            },
            Target::Css {
                selector: "#subscribe".into()
            },
        ]
    );
}

#[test]
fn test_select_control_keeps_options() {
    let raw = RawNode {
        tag: "select".into(),
        name: Some("country".into()),
        options: vec![
            SelectOption {
                value: "it".into(),
                label: "Italy".into(),
                selected: true,
            },
            SelectOption {
                value: "de".into(),
                label: "Germany".into(),
                selected: false,
            },
        ],
        visible: true,
        ..Default::default()
    };
    let snap = build_control(raw, "select".into());
    assert_eq!(snap.effective_role, "combobox");
    assert_eq!(snap.options.len(), 2);
    assert!(snap.options[0].selected);
}

#[test]
fn test_inspection_idempotent_over_same_raw_data() {
    let collection = || RawCollection {
        url: "https://example.com".into(),
        error: None,
        iframes: vec![IframeInfo {
            index: 0,
            src: Some("https://pay.example.com".into()),
            ..Default::default()
        }],
        clickable: vec![RawNode {
            aria_label: Some("Submit".into()),
            ..raw_button("Submit")
        }],
        fields: vec![],
        controls: vec![],
    };
    let a = build_inspection(collection());
    let b = build_inspection(collection());
    assert_eq!(a, b);
}

#[test]
fn test_root_missing_flag() {
    let raw = RawCollection {
        url: "https://example.com".into(),
        error: Some("root not found: #gone".into()),
        ..Default::default()
    };
    let snap = build_inspection(raw);
    assert!(snap.root_missing);
    assert!(snap.clickable_elements.is_empty());
}

#[test]
fn test_raw_collection_parses_collector_output() {
    let json = serde_json::json!({
        "url": "https://example.com/app",
        "iframes": [{"index": 0, "src": "https://pay.example.com/frame"}],
        "clickable": [{
            "tag": "button",
            "aria_label": "Submit",
            "text": "Submit",
            "visible": true
        }],
        "fields": [{
            "tag": "input",
            "input_type": "email",
            "placeholder": "you@example.com",
            "visible": true
        }],
        "controls": [{
            "tag": "input",
            "input_type": "checkbox",
            "control_type": "checkbox",
            "checked": false,
            "visible": true
        }]
    });
    let raw: RawCollection = serde_json::from_value(json).unwrap();
    let snap = build_inspection(raw);
    assert_eq!(snap.clickable_elements.len(), 1);
    assert_eq!(snap.form_fields.len(), 1);
    assert_eq!(snap.interactive_controls.len(), 1);
    assert_eq!(snap.interactive_controls[0].control_type, "checkbox");
    assert_eq!(snap.interactive_controls[0].checked, Some(false));
}
