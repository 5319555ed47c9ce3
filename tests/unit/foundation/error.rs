use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        ReplayError::malformed("x")
            .to_string()
            .contains("malformed input:")
    );
    assert!(
        ReplayError::invariant("x")
            .to_string()
            .contains("invariant violated:")
    );
    assert!(
        ReplayError::encoder_unavailable("x")
            .to_string()
            .contains("encoder unavailable:")
    );
    assert!(
        ReplayError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        ReplayError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
}

#[test]
fn name_errors_quote_the_name() {
    let err = ReplayError::UnknownName("FF_1".to_string());
    assert_eq!(err.to_string(), "unknown cell name 'FF_1'");
    let err = ReplayError::DuplicateName("FF_2".to_string());
    assert_eq!(err.to_string(), "duplicate cell name 'FF_2'");
}

#[test]
fn only_malformed_input_counts_as_input_error() {
    assert!(ReplayError::malformed("x").is_input_error());
    assert!(!ReplayError::DeckExhausted.is_input_error());
    assert!(!ReplayError::BufferFull { capacity: 3 }.is_input_error());
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = ReplayError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
}
