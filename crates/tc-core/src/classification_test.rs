use super::*;

#[test]
fn test_runnable_threshold() {
    let runnable: Vec<_> = ClassificationStatus::ALL
        .into_iter()
        .filter(|s| s.is_runnable())
        .collect();
    assert_eq!(
        runnable,
        vec![
            ClassificationStatus::RunnableAsIs,
            ClassificationStatus::RunnableWithRewrite
        ]
    );
}

#[test]
fn test_codes_are_unique_and_reversible() {
    for status in ClassificationStatus::ALL {
        assert_eq!(ClassificationStatus::from_code(status.code()).unwrap(), status);
    }
    assert!(ClassificationStatus::from_code(42).is_err());
}

#[test]
fn test_serde_uses_screaming_names() {
    let json = serde_json::to_string(&ClassificationStatus::NotRunnableLegacyJoin).unwrap();
    assert_eq!(json, "\"NOT_RUNNABLE_LEGACY_JOIN\"");
    assert_eq!(
        ClassificationStatus::NotRunnableLegacyJoin.to_string(),
        "NOT_RUNNABLE_LEGACY_JOIN"
    );
}

#[test]
fn test_rewritten_carries_sql() {
    let c = Classification::rewritten(4, "SELECT CURRENT_TIMESTAMP".to_string());
    assert!(c.is_runnable());
    assert_eq!(c.rewritten_sql.as_deref(), Some("SELECT CURRENT_TIMESTAMP"));
    assert!(c.detail.is_none());
}
