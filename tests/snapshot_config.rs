use apptbook::{
    config::SchedulerConfig,
    core::directory::{Directory, DirectoryError, DirectorySnapshotV1},
    engine::conflict::{ConflictScope, OverlapKind},
};

fn sample_directory() -> Directory {
    let mut dir = Directory::new();
    dir.add_user("carol").unwrap();
    dir.add_user("alice").unwrap();
    dir.schedule_appointment("alice", "2023-06-01", "10:00 AM", "11:00 AM", "lunch")
        .unwrap();
    dir.schedule_appointment("alice", "2024-12-31", "11:00 PM", "11:59 PM", "countdown")
        .unwrap();
    dir
}

#[test]
fn snapshot_json_roundtrip_preserves_users_and_diaries() {
    let dir = sample_directory();
    let json = serde_json::to_string(&dir.export_snapshot()).unwrap();

    let decoded: DirectorySnapshotV1 = serde_json::from_str(&json).unwrap();
    let restored = Directory::from_snapshot(decoded, SchedulerConfig::default()).unwrap();

    assert_eq!(restored.list_users(), vec!["alice", "carol"]);
    assert_eq!(restored.diary("alice").unwrap(), dir.diary("alice").unwrap());
    assert_eq!(
        restored.get_purpose("alice", "2024-12-31", "11:00 PM"),
        Ok("countdown")
    );
}

#[test]
fn snapshot_uses_display_formats() {
    let value = serde_json::to_value(sample_directory().export_snapshot()).unwrap();
    let first = &value["users"][0]["diary"][0];

    assert_eq!(first["date"], "2023-06-01");
    assert_eq!(first["start"], "10:00 AM");
    assert_eq!(first["end"], "11:00 AM");
    assert_eq!(first["purpose"], "lunch");
}

#[test]
fn snapshot_with_out_of_range_date_fails_to_decode() {
    let json = r#"{"users":[{"username":"bob","diary":[
        {"date":"2025-01-01","start":"10:00 AM","end":"11:00 AM","purpose":"x"}
    ]}]}"#;
    assert!(serde_json::from_str::<DirectorySnapshotV1>(json).is_err());
}

#[test]
fn snapshot_import_rejects_broken_invariants() {
    let unfolded = r#"{"users":[{"username":"Bob","diary":[]}]}"#;
    let snapshot: DirectorySnapshotV1 = serde_json::from_str(unfolded).unwrap();
    assert!(matches!(
        Directory::from_snapshot(snapshot, SchedulerConfig::default()),
        Err(DirectoryError::Snapshot(_))
    ));

    let duplicate = r#"{"users":[
        {"username":"bob","diary":[]},
        {"username":"bob","diary":[]}
    ]}"#;
    let snapshot: DirectorySnapshotV1 = serde_json::from_str(duplicate).unwrap();
    assert!(matches!(
        Directory::from_snapshot(snapshot, SchedulerConfig::default()),
        Err(DirectoryError::Snapshot(_))
    ));

    let same_slot = r#"{"users":[{"username":"bob","diary":[
        {"date":"2023-06-01","start":"10:00 AM","end":"11:00 AM","purpose":"a"},
        {"date":"2023-06-01","start":"10:00 AM","end":"10:30 AM","purpose":"b"}
    ]}]}"#;
    let snapshot: DirectorySnapshotV1 = serde_json::from_str(same_slot).unwrap();
    assert!(matches!(
        Directory::from_snapshot(snapshot, SchedulerConfig::default()),
        Err(DirectoryError::Snapshot(_))
    ));
}

#[test]
fn snapshot_import_sorts_users() {
    let json = r#"{"users":[
        {"username":"zed","diary":[]},
        {"username":"amy","diary":[]}
    ]}"#;
    let snapshot: DirectorySnapshotV1 = serde_json::from_str(json).unwrap();
    let dir = Directory::from_snapshot(snapshot, SchedulerConfig::default()).unwrap();
    assert_eq!(dir.list_users(), vec!["amy", "zed"]);
}

#[test]
fn config_defaults_to_reference_semantics() {
    let cfg = SchedulerConfig::from_json_str("{}").unwrap();
    assert_eq!(cfg, SchedulerConfig::default());
    assert_eq!(cfg.conflict.rule, OverlapKind::Reference);
    assert_eq!(cfg.conflict.scope, ConflictScope::AnyDate);
    assert!(cfg.require_end_after_start);
}

#[test]
fn config_parses_partial_overrides() {
    let cfg = SchedulerConfig::from_json_str(
        r#"{"conflict": {"rule": "half_open", "scope": "same_date"}}"#,
    )
    .unwrap();
    assert_eq!(cfg.conflict.rule, OverlapKind::HalfOpen);
    assert_eq!(cfg.conflict.scope, ConflictScope::SameDate);
    assert!(cfg.require_end_after_start);

    let cfg = SchedulerConfig::from_json_str(r#"{"require_end_after_start": false}"#).unwrap();
    assert!(!cfg.require_end_after_start);
    assert_eq!(cfg.conflict.rule, OverlapKind::Reference);
}

#[test]
fn config_rejects_unknown_rule() {
    assert!(SchedulerConfig::from_json_str(r#"{"conflict": {"rule": "fuzzy"}}"#).is_err());
}
