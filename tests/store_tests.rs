// Integration tests for the credential store on file-backed storage.

use passlock::bus::ChangeBus;
use passlock::models::{CredentialPatch, NewCredential};
use passlock::storage::FileStorage;
use passlock::store::{CredentialStore, STORE_KEY};
use passlock::PasslockError;
use serial_test::serial;
use std::sync::Arc;

fn new_credential(site: &str, username: &str, secret: &str) -> NewCredential {
    NewCredential {
        site: site.to_string(),
        username: username.to_string(),
        secret: secret.to_string(),
    }
}

#[test]
fn add_update_list_scenario() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()));
    let store = CredentialStore::open_with(storage, Arc::new(ChangeBus::new()), STORE_KEY).unwrap();

    let created = store
        .add(new_credential("Example", "u@example.com", "abc"))
        .unwrap();

    store
        .update(
            &created.id,
            CredentialPatch {
                secret: Some("xyz".to_string()),
                ..Default::default()
            },
        )
        .unwrap();

    let entries = store.list().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].site, "Example");
    assert_eq!(entries[0].username, "u@example.com");
    assert_eq!(entries[0].secret, "xyz");
    assert_eq!(entries[0].id, created.id);
    assert_eq!(entries[0].created_at, created.created_at);
}

#[test]
fn double_remove_surfaces_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()));
    let store = CredentialStore::open_with(storage, Arc::new(ChangeBus::new()), STORE_KEY).unwrap();

    let created = store.add(new_credential("Example", "", "pw")).unwrap();
    store.remove(&created.id).unwrap();
    assert!(matches!(
        store.remove(&created.id),
        Err(PasslockError::NotFound(_))
    ));
}

#[test]
fn search_is_case_insensitive_over_site_and_username() {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(FileStorage::new(dir.path()));
    let store = CredentialStore::open_with(storage, Arc::new(ChangeBus::new()), STORE_KEY).unwrap();

    store.add(new_credential("GitHub", "octocat", "pw")).unwrap();
    store.add(new_credential("Forge", "git-admin", "pw")).unwrap();
    store.add(new_credential("Bank", "alice", "pw")).unwrap();

    let hits = store.search("git").unwrap();
    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].site, "GitHub");
    assert_eq!(hits[1].site, "Forge");

    assert_eq!(store.search("").unwrap(), store.list().unwrap());
}

#[test]
fn entries_survive_process_style_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let created = {
        let storage = Arc::new(FileStorage::new(dir.path()));
        let store =
            CredentialStore::open_with(storage, Arc::new(ChangeBus::new()), STORE_KEY).unwrap();
        store.add(new_credential("Example", "u", "pw")).unwrap()
    };

    // Fresh storage handle and bus, as after a restart.
    let storage = Arc::new(FileStorage::new(dir.path()));
    let store = CredentialStore::open_with(storage, Arc::new(ChangeBus::new()), STORE_KEY).unwrap();
    let entries = store.list().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, created.id);
    assert_eq!(entries[0].secret, "pw");
}

#[test]
fn corrupt_block_on_disk_is_treated_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(format!("{STORE_KEY}.json")), "{broken").unwrap();

    let storage = Arc::new(FileStorage::new(dir.path()));
    let store = CredentialStore::open_with(storage, Arc::new(ChangeBus::new()), STORE_KEY).unwrap();
    assert!(store.list().unwrap().is_empty());

    // The store remains usable and overwrites the bad block.
    store.add(new_credential("Example", "", "pw")).unwrap();
    assert_eq!(store.list().unwrap().len(), 1);
}

// Uses the process-wide bus that `open` wires up by default, so it must not
// run concurrently with other tests publishing on that bus.
#[test]
#[serial]
fn default_open_converges_through_the_global_bus() {
    let dir = tempfile::tempdir().unwrap();
    let storage: Arc<FileStorage> = Arc::new(FileStorage::new(dir.path()));

    let writer = CredentialStore::open(storage.clone()).unwrap();
    let observer = CredentialStore::open(storage).unwrap();

    let created = writer.add(new_credential("GitHub", "octocat", "pw")).unwrap();

    let seen = observer.list().unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].id, created.id);
}
