use super::*;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn sample() -> Snapshot {
    Snapshot::new(
        HashMap::from([
            ("group_1".to_string(), 1_700_000_060.25),
            ("私聊:用户😀".to_string(), 1_700_003_600.0),
        ]),
        HashMap::from([
            ("group_1".to_string(), 1_699_999_990.5),
            ("friend/42".to_string(), 12.0),
        ]),
    )
}

#[test]
fn test_save_and_load_round_trip() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path().join("data.json"));

    let snapshot = sample();
    store.save(&snapshot).unwrap();

    let loaded = store.load();
    assert_eq!(loaded, snapshot);
    assert_eq!(loaded.version, SNAPSHOT_VERSION);
}

#[test]
fn test_save_creates_parent_directories() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data").join("llm_mute").join("data.json");
    let store = SnapshotStore::new(&path);

    store.save(&sample()).unwrap();
    assert!(path.exists());
}

#[test]
fn test_save_overwrites_and_leaves_no_temp_files() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path().join("data.json"));

    store.save(&sample()).unwrap();
    store.save(&Snapshot::new(HashMap::new(), HashMap::new())).unwrap();

    assert!(store.load().is_empty());
    let entries = std::fs::read_dir(dir.path()).unwrap().count();
    assert_eq!(entries, 1);
}

#[test]
fn test_save_keeps_non_ascii_readable() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path().join("data.json"));
    store.save(&sample()).unwrap();

    let content = std::fs::read_to_string(store.path()).unwrap();
    assert!(content.contains("私聊:用户😀"));
    assert!(content.contains("\"muted_until\""));
    assert!(content.contains("\"last_generated\""));
}

#[test]
fn test_load_missing_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path().join("absent.json"));
    assert_eq!(store.load(), Snapshot::default());
}

#[test]
fn test_load_corrupt_file_is_empty() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, "{ not json").unwrap();

    assert_eq!(SnapshotStore::new(&path).load(), Snapshot::default());
}

#[test]
fn test_load_unversioned_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(
        &path,
        r#"{"muted_until": {"a": 10.0}, "last_generated": null, "extra": true}"#,
    )
    .unwrap();

    let loaded = SnapshotStore::new(&path).load();
    assert_eq!(loaded.version, 0);
    assert_eq!(loaded.muted_until.get("a"), Some(&10.0));
    assert!(loaded.last_generated.is_empty());
}

#[test]
fn test_load_missing_fields() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("data.json");
    std::fs::write(&path, "{}").unwrap();

    assert!(SnapshotStore::new(&path).load().is_empty());
}

#[test]
fn test_save_into_file_as_directory_fails() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();

    let store = SnapshotStore::new(blocker.join("data.json"));
    assert!(store.save(&sample()).is_err());
}

#[tokio::test]
async fn test_writer_flushes_latest_on_close() {
    let dir = TempDir::new().unwrap();
    let store = SnapshotStore::new(dir.path().join("data.json"));
    let writer = SnapshotWriter::spawn(store.clone());

    for i in 0..10_u8 {
        let snapshot = Snapshot::new(
            HashMap::from([("s".to_string(), f64::from(i))]),
            HashMap::new(),
        );
        writer.submit(snapshot);
    }
    writer.close().await;

    assert_eq!(store.load().muted_until.get("s"), Some(&9.0));
}

#[tokio::test]
async fn test_writer_survives_failed_save() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, "").unwrap();

    let writer = SnapshotWriter::spawn(SnapshotStore::new(blocker.join("data.json")));
    writer.submit(sample());
    writer.close().await;
}
