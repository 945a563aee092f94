// Unit tests for shared CLI types

use super::*;

#[test]
fn test_viewport_size_parse() {
    let size = ViewportSize::parse("1920x1080").unwrap();
    assert_eq!(size.width, 1920);
    assert_eq!(size.height, 1080);

    let size = ViewportSize::parse("375x667").unwrap();
    assert_eq!(size.width, 375);
    assert_eq!(size.height, 667);

    // Invalid formats
    assert!(ViewportSize::parse("1920").is_err());
    assert!(ViewportSize::parse("1920x").is_err());
    assert!(ViewportSize::parse("x1080").is_err());
    assert!(ViewportSize::parse("abc x def").is_err());
    assert!(ViewportSize::parse("1920X1080").is_err()); // uppercase X
}

#[test]
fn test_output_format_serde_names() {
    assert_eq!(
        serde_json::to_string(&OutputFormat::Json).unwrap(),
        "\"json\""
    );
    assert_eq!(
        serde_json::to_string(&OutputFormat::Simple).unwrap(),
        "\"simple\""
    );
}
