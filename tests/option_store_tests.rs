use custodian::db::OptionStoreHandle;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;
use std::time::SystemTime;
use tokio::fs;

async fn spawn_store(tag: &str) -> (OptionStoreHandle, PathBuf) {
    let tmp_dir = std::env::temp_dir();
    let mut hasher = DefaultHasher::new();
    SystemTime::now().hash(&mut hasher);
    tag.hash(&mut hasher);
    let db_path = tmp_dir.join(format!("test_options_{}_{}.sqlite", tag, hasher.finish()));
    let database_url = format!("sqlite:{}", db_path.to_str().unwrap());

    let handle = custodian::db::spawn(&database_url).await;
    (handle, db_path)
}

async fn cleanup(db_path: PathBuf) {
    let wal_path = PathBuf::from(format!("{}-wal", db_path.to_string_lossy()));
    let shm_path = PathBuf::from(format!("{}-shm", db_path.to_string_lossy()));
    let _ = fs::remove_file(&wal_path).await;
    let _ = fs::remove_file(&shm_path).await;
    fs::remove_file(&db_path).await.unwrap();
}

#[tokio::test]
async fn upsert_get_roundtrip_and_replace() {
    let (store, db_path) = spawn_store("roundtrip").await;

    assert!(store.get("template").await.unwrap().is_none());

    store.upsert("template", "twentynineteen", true).await.unwrap();
    let row = store.get("template").await.unwrap().unwrap();
    assert_eq!(row.name, "template");
    assert_eq!(row.value, "twentynineteen");
    assert!(row.autoload);

    // Upsert replaces both value and flag.
    store.upsert("template", "twentytwenty", false).await.unwrap();
    let row = store.get("template").await.unwrap().unwrap();
    assert_eq!(row.value, "twentytwenty");
    assert!(!row.autoload);

    cleanup(db_path).await;
}

#[tokio::test]
async fn set_autoload_reports_only_real_flips() {
    let (store, db_path) = spawn_store("flip").await;

    store.upsert("rewrite_rules", "rules", true).await.unwrap();

    assert!(store.set_autoload("rewrite_rules", false).await.unwrap());
    // Already disabled: the conditional update touches nothing.
    assert!(!store.set_autoload("rewrite_rules", false).await.unwrap());
    // Unknown row: nothing to flip.
    assert!(!store.set_autoload("missing", false).await.unwrap());

    let row = store.get("rewrite_rules").await.unwrap().unwrap();
    assert!(!row.autoload);

    cleanup(db_path).await;
}

#[tokio::test]
async fn autoloaded_rows_lists_only_flagged_rows() {
    let (store, db_path) = spawn_store("autoloaded").await;

    store.upsert("a", "1", true).await.unwrap();
    store.upsert("b", "2", false).await.unwrap();
    store.upsert("c", "3", true).await.unwrap();

    let rows = store.autoloaded_rows().await.unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["a", "c"]);

    cleanup(db_path).await;
}

#[tokio::test]
async fn prefix_scan_treats_underscores_literally() {
    let (store, db_path) = spawn_store("prefix").await;

    store.upsert("_transient_foo", "v", true).await.unwrap();
    store.upsert("_transient_timeout_foo", "123", false).await.unwrap();
    // Would match a naive LIKE '_transient_%' via the `_` wildcard.
    store.upsert("Xtransient_bar", "v", true).await.unwrap();
    store.upsert("unrelated", "v", true).await.unwrap();

    let rows = store.rows_with_prefix("_transient_").await.unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["_transient_foo", "_transient_timeout_foo"]);

    let markers = store.rows_with_prefix("_transient_timeout_").await.unwrap();
    assert_eq!(markers.len(), 1);
    assert_eq!(markers[0].name, "_transient_timeout_foo");

    cleanup(db_path).await;
}

#[tokio::test]
async fn delete_named_is_set_based_and_idempotent() {
    let (store, db_path) = spawn_store("delete").await;

    store.upsert("a", "1", true).await.unwrap();
    store.upsert("b", "2", true).await.unwrap();
    store.upsert("c", "3", true).await.unwrap();

    let removed = store
        .delete_named(vec!["a".to_string(), "b".to_string(), "ghost".to_string()])
        .await
        .unwrap();
    assert_eq!(removed, 2);

    // Same set again: nothing left to remove.
    let removed_again = store
        .delete_named(vec!["a".to_string(), "b".to_string()])
        .await
        .unwrap();
    assert_eq!(removed_again, 0);

    assert_eq!(store.delete_named(Vec::new()).await.unwrap(), 0);

    assert!(store.delete("c").await.unwrap());
    assert!(!store.delete("c").await.unwrap());

    cleanup(db_path).await;
}
