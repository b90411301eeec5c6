use converse::storage::ChatStore;
use tempfile::TempDir;

#[allow(dead_code)]
pub fn create_temp_store() -> (ChatStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("history.db");
    let store = ChatStore::new_with_path(db_path).expect("failed to create chat store with path");
    (store, tmp)
}
