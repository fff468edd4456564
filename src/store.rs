//! The credential store: an ordered entry sequence persisted as one JSON
//! block, kept in sync across live store instances via the change bus.

use crate::bus::{ChangeBus, ChangeEvent, SubscriberId};
use crate::error::{PasslockError, Result};
use crate::models::{CredentialEntry, CredentialPatch, NewCredential};
use crate::storage::StorageArea;
use chrono::Utc;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

/// Fixed key the entry sequence is persisted under.
pub const STORE_KEY: &str = "passlock-passwords";

/// A view over the persisted credential block.
///
/// Multiple stores may be open against the same storage area and key; each
/// mutation publishes the old and new serialized block on the bus and every
/// other store replaces its in-memory view from the event. Two stores
/// writing near-simultaneously race with last-write-wins on the block; that
/// is an accepted limitation of the whole-block persistence model.
pub struct CredentialStore {
    storage: Arc<dyn StorageArea>,
    bus: Arc<ChangeBus>,
    key: String,
    view: Arc<Mutex<Option<Vec<CredentialEntry>>>>,
    subscription: SubscriberId,
}

impl CredentialStore {
    /// Open a store on `storage` under the default key and the process-wide
    /// bus, hydrated and ready for use.
    pub fn open(storage: Arc<dyn StorageArea>) -> Result<Self> {
        Self::open_with(storage, ChangeBus::global(), STORE_KEY)
    }

    /// Open a store with an explicit bus and key, hydrated and ready.
    pub fn open_with(
        storage: Arc<dyn StorageArea>,
        bus: Arc<ChangeBus>,
        key: &str,
    ) -> Result<Self> {
        let store = Self::attach(storage, bus, key);
        store.hydrate()?;
        Ok(store)
    }

    /// Attach to storage and the bus without reading anything yet. Every
    /// operation fails with `NotHydrated` until [`hydrate`](Self::hydrate)
    /// has run.
    pub fn attach(storage: Arc<dyn StorageArea>, bus: Arc<ChangeBus>, key: &str) -> Self {
        let view: Arc<Mutex<Option<Vec<CredentialEntry>>>> = Arc::new(Mutex::new(None));

        let observer_view = Arc::clone(&view);
        let observer_key = key.to_string();
        let subscription = bus.subscribe(Arc::new(move |event: &ChangeEvent| {
            if event.key == observer_key {
                let entries = decode_block(Some(&event.new_value));
                *observer_view.lock().expect("store lock poisoned") = Some(entries);
            }
        }));

        Self {
            storage,
            bus,
            key: key.to_string(),
            view,
            subscription,
        }
    }

    /// Load the in-memory view from storage. A missing or corrupt block
    /// hydrates to an empty sequence rather than failing.
    pub fn hydrate(&self) -> Result<()> {
        let raw = self.storage.read(&self.key)?;
        let entries = decode_block(raw.as_deref());
        *self.view.lock().expect("store lock poisoned") = Some(entries);
        Ok(())
    }

    /// Whether the store has hydrated its view.
    pub fn is_ready(&self) -> bool {
        self.view.lock().expect("store lock poisoned").is_some()
    }

    /// All entries in insertion order.
    pub fn list(&self) -> Result<Vec<CredentialEntry>> {
        self.view
            .lock()
            .expect("store lock poisoned")
            .clone()
            .ok_or(PasslockError::NotHydrated)
    }

    /// Case-insensitive substring filter over site and username. An empty
    /// term returns every entry; ordering is preserved.
    pub fn search(&self, term: &str) -> Result<Vec<CredentialEntry>> {
        let entries = self.list()?;
        if term.is_empty() {
            return Ok(entries);
        }
        let needle = term.to_lowercase();
        Ok(entries
            .into_iter()
            .filter(|entry| {
                entry.site.to_lowercase().contains(&needle)
                    || entry.username.to_lowercase().contains(&needle)
            })
            .collect())
    }

    /// Validate, assign id and timestamp, append, persist, and return the
    /// created entry.
    pub fn add(&self, new: NewCredential) -> Result<CredentialEntry> {
        if new.site.trim().is_empty() {
            return Err(PasslockError::Validation(
                "site must not be empty".to_string(),
            ));
        }
        if new.secret.is_empty() {
            return Err(PasslockError::Validation(
                "secret must not be empty".to_string(),
            ));
        }

        let entry = CredentialEntry {
            id: Uuid::new_v4().to_string(),
            site: new.site,
            username: new.username,
            secret: new.secret,
            created_at: Utc::now(),
        };

        let created = entry.clone();
        self.mutate(move |entries| {
            entries.push(entry);
            Ok(())
        })?;
        Ok(created)
    }

    /// Merge `patch` into the entry with the given id, preserving its
    /// identity fields, and return the updated entry.
    pub fn update(&self, id: &str, patch: CredentialPatch) -> Result<CredentialEntry> {
        if matches!(&patch.site, Some(site) if site.trim().is_empty()) {
            return Err(PasslockError::Validation(
                "site must not be empty".to_string(),
            ));
        }
        if matches!(&patch.secret, Some(secret) if secret.is_empty()) {
            return Err(PasslockError::Validation(
                "secret must not be empty".to_string(),
            ));
        }

        let target = id.to_string();
        let mut updated: Option<CredentialEntry> = None;
        let result = self.mutate(|entries| {
            let entry = entries
                .iter_mut()
                .find(|entry| entry.id == target)
                .ok_or_else(|| PasslockError::NotFound(target.clone()))?;
            if let Some(site) = patch.site {
                entry.site = site;
            }
            if let Some(username) = patch.username {
                entry.username = username;
            }
            if let Some(secret) = patch.secret {
                entry.secret = secret;
            }
            updated = Some(entry.clone());
            Ok(())
        });
        result?;
        // mutate only succeeds once the closure has recorded the entry
        updated.ok_or_else(|| PasslockError::NotFound(id.to_string()))
    }

    /// Remove the entry with the given id. A second removal of the same id
    /// surfaces `NotFound` rather than silently succeeding.
    pub fn remove(&self, id: &str) -> Result<()> {
        let target = id.to_string();
        self.mutate(|entries| {
            let position = entries
                .iter()
                .position(|entry| entry.id == target)
                .ok_or_else(|| PasslockError::NotFound(target.clone()))?;
            entries.remove(position);
            Ok(())
        })
    }

    /// Run `apply` against a copy of the current view; on success persist
    /// the new block, commit it to the in-memory view, and notify the other
    /// observers of this key.
    fn mutate<F>(&self, apply: F) -> Result<()>
    where
        F: FnOnce(&mut Vec<CredentialEntry>) -> Result<()>,
    {
        let mut guard = self.view.lock().expect("store lock poisoned");
        let current = guard.as_ref().ok_or(PasslockError::NotHydrated)?;

        let old_value = serde_json::to_string(current)?;
        let mut next = current.clone();
        apply(&mut next)?;
        let new_value = serde_json::to_string(&next)?;

        self.storage.write(&self.key, &new_value)?;
        *guard = Some(next);
        drop(guard);

        self.bus.publish(
            &ChangeEvent {
                key: self.key.clone(),
                old_value: Some(old_value),
                new_value,
            },
            Some(self.subscription),
        );
        Ok(())
    }
}

impl Drop for CredentialStore {
    fn drop(&mut self) {
        self.bus.unsubscribe(self.subscription);
    }
}

/// Deserialize a persisted block, treating a missing or corrupt block as an
/// empty sequence.
fn decode_block(raw: Option<&str>) -> Vec<CredentialEntry> {
    raw.and_then(|block| serde_json::from_str(block).ok())
        .unwrap_or_default()
}
