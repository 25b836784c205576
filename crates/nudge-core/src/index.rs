//! Secondary indices over the key/value store
//!
//! The store cannot query by field, so two denormalized lists are kept next
//! to the records: each owner's reminder ids, and the registry of every owner
//! that has ever had a reminder. The scheduler discovers work only through
//! the registry.

use nudge_store::{Store, StoreError, StoreExt, StoreResult};
use nudge_util::{OwnerId, ReminderId};
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Namespace of reminder records, keyed by reminder id
pub const NS_REMINDER: &str = "reminder";

/// Namespace of per-owner reminder id lists, keyed by owner id
pub const NS_USER_REMINDERS: &str = "user_reminders";

/// Namespace for service-wide keys
pub const NS_GLOBAL: &str = "global";

/// Key of the owner registry inside [`NS_GLOBAL`]
pub const OWNER_REGISTRY_KEY: &str = "reminder_owners";

/// Per-owner id lists plus the global owner registry
pub(crate) struct OwnerIndex {
    store: Arc<dyn Store>,
    /// Serializes read-modify-write of the lists within this process
    write_lock: Mutex<()>,
}

impl OwnerIndex {
    pub(crate) fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            write_lock: Mutex::new(()),
        }
    }

    /// Every owner with at least one reminder
    pub(crate) fn owners(&self) -> StoreResult<Vec<OwnerId>> {
        Ok(self
            .store
            .get_json(NS_GLOBAL, OWNER_REGISTRY_KEY)?
            .unwrap_or_default())
    }

    /// Ids of an owner's reminders, in creation order
    pub(crate) fn reminder_ids(&self, owner: OwnerId) -> StoreResult<Vec<ReminderId>> {
        Ok(self
            .store
            .get_json(NS_USER_REMINDERS, &owner.key())?
            .unwrap_or_default())
    }

    /// Record that `id` belongs to `owner`, registering the owner if needed.
    /// Idempotent.
    pub(crate) fn attach(&self, owner: OwnerId, id: &ReminderId) -> StoreResult<()> {
        let _guard = self
            .write_lock
            .lock()
            .map_err(|_| StoreError::Unavailable("index lock poisoned".into()))?;

        let mut ids = self.reminder_ids(owner)?;
        if !ids.contains(id) {
            ids.push(id.clone());
            self.store
                .set_json(NS_USER_REMINDERS, &owner.key(), &ids, None)?;
            debug!(owner_id = %owner, reminder_id = %id, "Reminder indexed");
        }

        let mut owners = self.owners()?;
        if !owners.contains(&owner) {
            owners.push(owner);
            self.store
                .set_json(NS_GLOBAL, OWNER_REGISTRY_KEY, &owners, None)?;
            debug!(owner_id = %owner, "Owner registered");
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nudge_store::SqliteStore;

    fn index() -> OwnerIndex {
        OwnerIndex::new(Arc::new(SqliteStore::in_memory().unwrap()))
    }

    #[test]
    fn empty_index() {
        let index = index();
        assert!(index.owners().unwrap().is_empty());
        assert!(index.reminder_ids(OwnerId::new(1)).unwrap().is_empty());
    }

    #[test]
    fn attach_is_idempotent() {
        let index = index();
        let owner = OwnerId::new(42);
        let first = ReminderId::new();
        let second = ReminderId::new();

        index.attach(owner, &first).unwrap();
        index.attach(owner, &second).unwrap();
        index.attach(owner, &first).unwrap();

        assert_eq!(index.reminder_ids(owner).unwrap(), vec![first, second]);
        assert_eq!(index.owners().unwrap(), vec![owner]);
    }

    #[test]
    fn owners_are_kept_apart() {
        let index = index();
        let a = OwnerId::new(1);
        let b = OwnerId::new(2);
        let id_a = ReminderId::new();
        let id_b = ReminderId::new();

        index.attach(a, &id_a).unwrap();
        index.attach(b, &id_b).unwrap();

        assert_eq!(index.reminder_ids(a).unwrap(), vec![id_a]);
        assert_eq!(index.reminder_ids(b).unwrap(), vec![id_b]);
        assert_eq!(index.owners().unwrap(), vec![a, b]);
    }
}
