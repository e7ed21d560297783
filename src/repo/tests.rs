use super::*;

#[test]
fn test_require_text() {
    assert!(require_text("Name", "Projector").is_ok());
    assert_eq!(
        require_text("Name", "  \t"),
        Err(DomainError::Invalid("Name must not be empty".to_string()))
    );
    assert!(require_text("Name", "").is_err());
}
