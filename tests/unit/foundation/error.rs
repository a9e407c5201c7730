use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        SpindleError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(SpindleError::render("x").to_string().contains("render error:"));
    assert!(SpindleError::encode("x").to_string().contains("encode error:"));
}

#[test]
fn asset_load_names_slot_and_path() {
    let err = SpindleError::asset_load(2, "images/3.png", "no such file");
    let msg = err.to_string();
    assert!(msg.contains("asset 2"));
    assert!(msg.contains("images/3.png"));
    assert!(msg.contains("no such file"));
}

#[test]
fn timeout_reports_pending_count() {
    let err = SpindleError::AssetTimeout {
        waited_ms: 250,
        pending: 1,
    };
    assert_eq!(
        err.to_string(),
        "asset loading timed out after 250 ms (1 still pending)"
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = SpindleError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
