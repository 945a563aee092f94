// Unit tests for accessible-name and role computation

use super::*;
use pretty_assertions::assert_eq;

fn button(text: &str) -> RawNode {
    RawNode {
        tag: "button".into(),
        text: Some(text.into()),
        visible: true,
        ..Default::default()
    }
}

#[test]
fn test_aria_label_wins_over_everything() {
    let node = RawNode {
        tag: "button".into(),
        aria_label: Some("Submit".into()),
        labelledby_text: Some("Other".into()),
        text: Some("Click here".into()),
        title: Some("tooltip".into()),
        ..Default::default()
    };
    assert_eq!(accessible_name(&node), Some("Submit".into()));
}

#[test]
fn test_labelledby_beats_own_text() {
    let node = RawNode {
        tag: "div".into(),
        labelledby_text: Some("Billing address".into()),
        text: Some("123 Main St".into()),
        ..Default::default()
    };
    assert_eq!(accessible_name(&node), Some("Billing address".into()));
}

#[test]
fn test_text_then_title_then_value() {
    assert_eq!(accessible_name(&button("Save")), Some("Save".into()));

    let node = RawNode {
        tag: "button".into(),
        title: Some("Save changes".into()),
        ..Default::default()
    };
    assert_eq!(accessible_name(&node), Some("Save changes".into()));

    let node = RawNode {
        tag: "div".into(),
        value: Some("42".into()),
        ..Default::default()
    };
    assert_eq!(accessible_name(&node), Some("42".into()));
}

#[test]
fn test_whitespace_only_candidates_are_skipped() {
    let node = RawNode {
        tag: "button".into(),
        aria_label: Some("   ".into()),
        text: Some("  Save  ".into()),
        ..Default::default()
    };
    assert_eq!(accessible_name(&node), Some("Save".into()));
}

#[test]
fn test_form_field_prefers_label_over_placeholder() {
    let node = RawNode {
        tag: "input".into(),
        input_type: Some("email".into()),
        label_text: Some("Email address".into()),
        placeholder: Some("you@example.com".into()),
        name: Some("email".into()),
        ..Default::default()
    };
    assert_eq!(accessible_name(&node), Some("Email address".into()));
}

#[test]
fn test_form_field_falls_back_placeholder_then_name() {
    let node = RawNode {
        tag: "input".into(),
        placeholder: Some("Search".into()),
        name: Some("q".into()),
        ..Default::default()
    };
    assert_eq!(accessible_name(&node), Some("Search".into()));

    let node = RawNode {
        tag: "input".into(),
        name: Some("q".into()),
        ..Default::default()
    };
    assert_eq!(accessible_name(&node), Some("q".into()));
}

#[test]
fn test_nameless_node() {
    let node = RawNode {
        tag: "div".into(),
        ..Default::default()
    };
    assert_eq!(accessible_name(&node), None);
}

#[test]
fn test_explicit_role_wins() {
    let node = RawNode {
        tag: "div".into(),
        role: Some("button".into()),
        ..Default::default()
    };
    assert_eq!(effective_role(&node), "button");
}

#[test]
fn test_tag_derived_roles() {
    let cases = vec![
        ("button", None, "button"),
        ("a", None, "link"),
        ("select", None, "combobox"),
        ("textarea", None, "textbox"),
        ("input", Some("submit"), "button"),
        ("input", Some("checkbox"), "checkbox"),
        ("input", Some("radio"), "radio"),
        ("input", Some("range"), "slider"),
        ("input", Some("search"), "searchbox"),
        ("input", Some("number"), "spinbutton"),
        ("input", Some("text"), "textbox"),
        ("input", None, "textbox"),
    ];
    for (tag, input_type, expected) in cases {
        let node = RawNode {
            tag: tag.into(),
            input_type: input_type.map(Into::into),
            ..Default::default()
        };
        assert_eq!(effective_role(&node), expected, "tag={tag} type={input_type:?}");
    }
}

#[test]
fn test_unknown_tag_falls_back_to_tag_name() {
    let node = RawNode {
        tag: "summary".into(),
        ..Default::default()
    };
    assert_eq!(effective_role(&node), "summary");
}

#[test]
fn test_role_for_input_type() {
    assert_eq!(role_for_input_type("input", Some("email")), Some("textbox"));
    assert_eq!(role_for_input_type("input", Some("search")), Some("searchbox"));
    assert_eq!(role_for_input_type("textarea", None), Some("textbox"));
    assert_eq!(role_for_input_type("select", None), Some("combobox"));
    assert_eq!(role_for_input_type("div", None), None);
}
