/// Storage integration tests — the JSON file backend on a real filesystem.

use story_lab::core::config::StoryLabConfig;
use story_lab::core::storage::{
    JsonFileStore, StorageErrorKind, StoryStorage, COLLECTION_VERSION,
};
use tempfile::TempDir;

fn file_storage(dir: &TempDir) -> StoryStorage<JsonFileStore> {
    StoryStorage::new(JsonFileStore::new(dir.path().join("projects.json")))
}

#[test]
fn missing_file_lists_nothing() {
    let dir = TempDir::new().unwrap();
    let storage = file_storage(&dir);
    assert!(storage.list_projects().is_empty());
    assert_eq!(storage.storage_info().unwrap().project_count, 0);
}

#[test]
fn projects_survive_reopening() {
    let dir = TempDir::new().unwrap();
    let id = {
        let mut storage = file_storage(&dir);
        storage.create_project("A fox builds a raft").unwrap().id
    };

    let storage = file_storage(&dir);
    let project = storage.load_project(&id).unwrap();
    assert_eq!(project.title, "A fox builds a");
    assert_eq!(project.logline, "A fox builds a raft");

    let raw = std::fs::read_to_string(dir.path().join("projects.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["version"], COLLECTION_VERSION);
    assert_eq!(value["projects"][0]["id"], id.as_str());
    assert_eq!(value["projects"][0]["step"], 1);
    assert_eq!(value["projects"][0]["status"], "draft");
}

#[test]
fn nested_store_directory_is_created() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stories").join("projects.json");
    let mut storage = StoryStorage::new(JsonFileStore::new(&path));
    assert_eq!(storage.store().path(), path.as_path());
    storage.create_project("A cat").unwrap();
    assert!(path.exists());
}

#[test]
fn corrupt_file_reads_as_empty() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("projects.json"), "{\"version\": 1, \"projects\": [").unwrap();
    let mut storage = file_storage(&dir);
    assert!(storage.list_projects().is_empty());

    // The next write replaces the corrupt document.
    storage.create_project("A cat").unwrap();
    assert_eq!(storage.list_projects().len(), 1);
}

#[test]
fn legacy_array_file_is_upgraded_on_save() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join("projects.json"),
        r#"[{"id":"story_1_legacy000","title":"Old","logline":"Old story",
            "createdAt":"2024-01-01T00:00:00Z","updatedAt":"2024-01-01T00:00:00Z"}]"#,
    )
    .unwrap();

    let mut storage = file_storage(&dir);
    let mut project = storage.load_project("story_1_legacy000").unwrap();
    project.title = "Renamed".to_string();
    storage.save_project(&mut project).unwrap();

    let raw = std::fs::read_to_string(dir.path().join("projects.json")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(value["version"], COLLECTION_VERSION);
    assert_eq!(value["projects"][0]["title"], "Renamed");
}

#[test]
fn unstarted_legacy_project_survives_a_new_project() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("projects.json");
    std::fs::write(
        &path,
        r#"[{"id":"story_1792137007857_avxpwwewp","title":"A cat opens a","logline":"A cat opens a bakery","createdAt":"2026-10-16T12:34:56.789Z","updatedAt":"2026-10-16T12:34:56.789Z","step":1,"outline":[],"script":{"enabled":true,"scenes":[]},"scenes":[],"cuts":{"order":[],"durations":{}},"status":"draft"}]"#,
    )
    .unwrap();

    let mut storage = StoryStorage::new(JsonFileStore::new(&path));
    assert_eq!(storage.list_projects().len(), 1);
    storage.create_project("A dog learns to surf").unwrap();

    let storage = StoryStorage::new(JsonFileStore::new(&path));
    let projects = storage.list_projects();
    assert_eq!(projects.len(), 2);
    let legacy = storage.load_project("story_1792137007857_avxpwwewp").unwrap();
    assert_eq!(legacy.logline, "A cat opens a bakery");
    assert!(legacy.outline.is_none());
}

#[test]
fn failed_rename_cleans_up_temp_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("projects.json");
    // A directory in the way makes the final rename fail.
    std::fs::create_dir(&path).unwrap();

    let mut storage = StoryStorage::new(JsonFileStore::new(&path));
    let err = storage.create_project("A cat").unwrap_err();
    assert_eq!(err.kind(), StorageErrorKind::Unknown);
    assert!(!dir.path().join("projects.json.tmp").exists());
    assert!(path.is_dir());
}

#[test]
fn quota_failure_leaves_file_untouched() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("projects.json");
    let mut storage = StoryStorage::new(JsonFileStore::new(&path).with_quota(Some(1024)));

    storage.create_project("A cat").unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    let long_logline = "A cat ".repeat(200);
    let err = storage.create_project(&long_logline).unwrap_err();
    assert_eq!(err.kind(), StorageErrorKind::QuotaExceeded);
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
    assert_eq!(storage.list_projects().len(), 1);
}

#[test]
fn clear_all_removes_the_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("projects.json");
    let mut storage = StoryStorage::new(JsonFileStore::new(&path));
    storage.create_project("A cat").unwrap();
    storage.clear_all().unwrap();
    assert!(!path.exists());
    // Clearing twice is fine.
    storage.clear_all().unwrap();
}

#[test]
fn config_opens_quota_checked_store() {
    let dir = TempDir::new().unwrap();
    let config = StoryLabConfig {
        store_path: dir.path().join("projects.json"),
        quota_bytes: 16,
        taxonomy_path: None,
    };
    let mut storage = config.open_storage();
    let err = storage.create_project("A cat").unwrap_err();
    assert_eq!(err.kind(), StorageErrorKind::QuotaExceeded);
}
