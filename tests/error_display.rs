use pps_lib::PpsError;

#[test]
fn config_error_display_includes_message() {
    let err = PpsError::Config("missing style id".to_string());

    assert_eq!(format!("{}", err), "Configuration error: missing style id");
}

#[test]
fn io_error_display_wraps_source() {
    let io_err = std::io::Error::other("disk full");
    let err: PpsError = io_err.into();
    let rendered = format!("{}", err);

    assert!(rendered.starts_with("IO error: "));
    assert!(rendered.contains("disk full"));
}

#[test]
fn api_helper_includes_status_and_message() {
    let err = PpsError::api(Some(reqwest::StatusCode::NOT_FOUND), "model not found");

    assert_eq!(
        format!("{}", err),
        "Generation API error (status: Some(404)): model not found"
    );
}

#[test]
fn api_helper_handles_missing_status() {
    let err = PpsError::api(None, "connection reset");

    assert_eq!(
        format!("{}", err),
        "Generation API error (status: None): connection reset"
    );
}

#[test]
fn precondition_helper_uses_message() {
    let err = PpsError::precondition("No visual style selected");

    assert_eq!(
        format!("{}", err),
        "Precondition failed: No visual style selected"
    );
}

#[test]
fn missing_api_key_display_is_stable() {
    assert_eq!(
        format!("{}", PpsError::MissingApiKey),
        "No API key configured for the generation service"
    );
}
