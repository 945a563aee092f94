// Tests for CLI argument validation and the no-browser failure paths.
// Everything here must pass without a WebDriver or browser installed:
// empty chains and malformed arguments are rejected before any session is
// opened.

use anyhow::Result;
use serde_json::Value;
use std::process::Command;

/// Run the webgrip binary and return parsed stdout JSON plus the exit code.
fn run_command(args: &[&str]) -> Result<(Value, i32)> {
    let output = Command::new(env!("CARGO_BIN_EXE_webgrip"))
        .args(args)
        .output()?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    let exit_code = output.status.code().unwrap_or(-1);

    let json = match serde_json::from_str(&stdout) {
        Ok(json) => json,
        Err(_) => {
            let message = if !stdout.is_empty() {
                stdout.to_string()
            } else {
                stderr.to_string()
            };
            serde_json::json!({
                "error": exit_code != 0,
                "message": message,
                "exit_code": exit_code
            })
        }
    };

    Ok((json, exit_code))
}

#[test]
fn test_empty_click_chain_is_rejected_without_browser() -> Result<()> {
    let (result, exit_code) = run_command(&["click", "https://example.com", "[]"])?;

    // A structured outcome, not a crash: callers branch on `status`
    assert_eq!(exit_code, 0);
    assert_eq!(result["status"], "error");
    assert_eq!(result["reason"], "no_strategies_provided");
    assert_eq!(result["action"], "click");
    assert_eq!(result["strategies_attempted"], serde_json::json!([]));
    assert_eq!(result["fallback_used"], false);
    Ok(())
}

#[test]
fn test_empty_fill_chain_is_rejected_without_browser() -> Result<()> {
    let (result, exit_code) =
        run_command(&["fill", "https://example.com", "[]", "some value"])?;

    assert_eq!(exit_code, 0);
    assert_eq!(result["status"], "error");
    assert_eq!(result["reason"], "no_strategies_provided");
    assert_eq!(result["action"], "fill");
    Ok(())
}

#[test]
fn test_malformed_targets_json_errors() -> Result<()> {
    let (result, exit_code) = run_command(&["click", "https://example.com", "{not json"])?;

    assert_ne!(exit_code, 0);
    assert_eq!(result["error"], true);
    assert!(result["message"].is_string());
    Ok(())
}

#[test]
fn test_unknown_strategy_tag_errors() -> Result<()> {
    let (result, exit_code) = run_command(&[
        "click",
        "https://example.com",
        r#"[{"by": "telepathy", "thought": "Save"}]"#,
    ])?;

    assert_ne!(exit_code, 0);
    assert_eq!(result["error"], true);
    Ok(())
}

#[test]
fn test_single_descriptor_object_is_accepted_shape() -> Result<()> {
    // A bare object (not an array) is valid target JSON; with an invalid
    // iframe path the command must still fail on the frame arguments, not
    // on descriptor parsing.
    let (result, exit_code) = run_command(&[
        "click",
        "https://example.com",
        r#"{"by": "text", "text": "Save"}"#,
        "--iframe-path",
        r#"[{}]"#,
    ])?;

    assert_ne!(exit_code, 0);
    let message = result["message"].as_str().unwrap_or_default();
    assert!(
        message.contains("iframe"),
        "expected an iframe addressing error, got: {message}"
    );
    Ok(())
}

#[test]
fn test_invalid_iframe_path_json_errors() -> Result<()> {
    let (result, exit_code) = run_command(&[
        "click",
        "https://example.com",
        r#"[{"by": "text", "text": "Save"}]"#,
        "--iframe-path",
        "{broken",
    ])?;

    assert_ne!(exit_code, 0);
    assert_eq!(result["error"], true);
    Ok(())
}

#[test]
fn test_wait_control_requires_control_type() -> Result<()> {
    let (result, exit_code) = run_command(&[
        "wait-name",
        "https://example.com",
        "Subscribe",
        "--kind",
        "control",
    ])?;

    assert_ne!(exit_code, 0);
    let message = result["message"].as_str().unwrap_or_default();
    assert!(
        message.contains("control-type"),
        "expected a control-type error, got: {message}"
    );
    Ok(())
}

#[test]
fn test_help_lists_engine_operations() -> Result<()> {
    let output = Command::new(env!("CARGO_BIN_EXE_webgrip"))
        .arg("--help")
        .output()?;
    let help = String::from_utf8_lossy(&output.stdout);

    for subcommand in [
        "inspect",
        "click",
        "fill",
        "wait-name",
        "wait-state",
        "wait-dom",
    ] {
        assert!(
            help.contains(subcommand),
            "help output missing '{subcommand}'"
        );
    }
    Ok(())
}
