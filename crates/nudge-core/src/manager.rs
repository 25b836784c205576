//! Reminder manager: CRUD, owner indices and the due-scan

use chrono::{DateTime, FixedOffset};
use nudge_store::{Store, StoreExt, StoreResult};
use nudge_util::{NudgeError, NudgeResult, OwnerId, ReminderId};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::{
    NS_REMINDER, NewReminder, OwnerIndex, Reminder, Recurrence, advance_after_firing,
    is_ready_to_send,
};

/// Filters for [`ReminderManager::list_for_owner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListFilter {
    /// Skip soft-deleted and finished reminders
    pub active_only: bool,
    /// Keep one-shot reminders that were already delivered
    pub include_sent_oneoff: bool,
}

impl ListFilter {
    /// What a user normally sees: live reminders that can still fire
    pub const UPCOMING: ListFilter = ListFilter {
        active_only: true,
        include_sent_oneoff: false,
    };

    /// Everything ever created, including deleted and delivered reminders
    pub const ALL: ListFilter = ListFilter {
        active_only: false,
        include_sent_oneoff: true,
    };

    /// What the due-scan inspects
    pub const SCAN: ListFilter = ListFilter {
        active_only: true,
        include_sent_oneoff: true,
    };

    fn admits(&self, reminder: &Reminder) -> bool {
        if self.active_only && !reminder.is_active {
            return false;
        }
        if !self.include_sent_oneoff
            && reminder.recurrence == Recurrence::None
            && reminder.is_sent
        {
            return false;
        }
        true
    }
}

impl Default for ListFilter {
    fn default() -> Self {
        Self::UPCOMING
    }
}

/// Owns the authoritative reminder records and their indices.
///
/// Persistence failures are absorbed here: reads degrade to `None` or an
/// empty list and writes report `false`, with the error logged.
pub struct ReminderManager {
    store: Arc<dyn Store>,
    index: OwnerIndex,
}

impl ReminderManager {
    pub fn new(store: Arc<dyn Store>) -> Self {
        let index = OwnerIndex::new(store.clone());
        Self { store, index }
    }

    /// Validate and persist a new reminder, returning its id
    pub fn create(&self, new: NewReminder) -> NudgeResult<ReminderId> {
        let reminder = Reminder::from_new(new, nudge_util::now());
        reminder.validate()?;

        self.write(&reminder)
            .map_err(|e| NudgeError::store(e.to_string()))?;

        if let Err(e) = self.index.attach(reminder.owner_id, &reminder.id) {
            error!(
                reminder_id = %reminder.id,
                owner_id = %reminder.owner_id,
                error = %e,
                "Reminder stored but not indexed"
            );
        }

        info!(
            reminder_id = %reminder.id,
            owner_id = %reminder.owner_id,
            recurrence = ?reminder.recurrence,
            "Reminder created"
        );
        Ok(reminder.id)
    }

    /// Load a reminder; `None` if absent or unreadable
    pub fn get(&self, id: &ReminderId) -> Option<Reminder> {
        match self.try_get(id) {
            Ok(reminder) => reminder,
            Err(e) => {
                warn!(reminder_id = %id, error = %e, "Failed to load reminder");
                None
            }
        }
    }

    /// An owner's reminders sorted by first firing date and time
    pub fn list_for_owner(&self, owner: OwnerId, filter: ListFilter) -> Vec<Reminder> {
        self.try_list_for_owner(owner, filter)
            .unwrap_or_else(|e| {
                warn!(owner_id = %owner, error = %e, "Failed to list reminders");
                Vec::new()
            })
    }

    /// Overwrite an existing reminder with the caller's copy.
    ///
    /// The stored record must exist and keep its owner; the owner of a
    /// reminder never changes.
    pub fn update(&self, reminder: &Reminder) -> bool {
        if let Err(e) = reminder.validate() {
            warn!(reminder_id = %reminder.id, error = %e, "Rejected reminder update");
            return false;
        }

        let stored = match self.try_get(&reminder.id) {
            Ok(Some(stored)) => stored,
            Ok(None) => {
                warn!(reminder_id = %reminder.id, "Update of unknown reminder");
                return false;
            }
            Err(e) => {
                warn!(reminder_id = %reminder.id, error = %e, "Failed to load reminder for update");
                return false;
            }
        };

        if stored.owner_id != reminder.owner_id {
            warn!(
                reminder_id = %reminder.id,
                owner_id = %stored.owner_id,
                requested_owner = %reminder.owner_id,
                "Rejected owner change"
            );
            return false;
        }

        if let Err(e) = self.write(reminder) {
            warn!(reminder_id = %reminder.id, error = %e, "Failed to save reminder");
            return false;
        }

        if let Err(e) = self.index.attach(reminder.owner_id, &reminder.id) {
            warn!(reminder_id = %reminder.id, error = %e, "Failed to refresh reminder index");
        }

        debug!(reminder_id = %reminder.id, "Reminder updated");
        true
    }

    /// Soft-delete a reminder on behalf of `owner`.
    ///
    /// Returns `false` for a missing reminder, a reminder owned by someone
    /// else, or a failed write; see [`ReminderManager::remove`] to tell
    /// those apart.
    pub fn delete(&self, id: &ReminderId, owner: OwnerId) -> bool {
        match self.remove(id, owner) {
            Ok(()) => true,
            Err(e) => {
                debug!(reminder_id = %id, owner_id = %owner, error = %e, "Delete refused");
                false
            }
        }
    }

    /// Soft-delete with a distinct error for each failure cause
    pub fn remove(&self, id: &ReminderId, owner: OwnerId) -> NudgeResult<()> {
        let mut reminder = self
            .try_get(id)
            .map_err(|e| NudgeError::store(e.to_string()))?
            .ok_or_else(|| NudgeError::NotFound(id.clone()))?;

        if reminder.owner_id != owner {
            warn!(
                reminder_id = %id,
                owner_id = %reminder.owner_id,
                requested_by = %owner,
                "Delete by non-owner"
            );
            return Err(NudgeError::permission(format!(
                "reminder {id} does not belong to {owner}"
            )));
        }

        reminder.is_active = false;
        self.write(&reminder)
            .map_err(|e| NudgeError::store(e.to_string()))?;

        info!(reminder_id = %id, owner_id = %owner, "Reminder deleted");
        Ok(())
    }

    /// Every reminder that should be delivered at `now`, across all owners
    pub fn due_reminders(&self, now: DateTime<FixedOffset>) -> Vec<Reminder> {
        let owners = match self.index.owners() {
            Ok(owners) => owners,
            Err(e) => {
                error!(error = %e, "Failed to read owner registry");
                return Vec::new();
            }
        };

        if owners.is_empty() {
            debug!("No owners registered, nothing due");
            return Vec::new();
        }

        let mut due = Vec::new();
        for owner in owners {
            match self.try_list_for_owner(owner, ListFilter::SCAN) {
                Ok(reminders) => {
                    let ready: Vec<Reminder> = reminders
                        .into_iter()
                        .filter(|r| is_ready_to_send(r, now))
                        .collect();
                    if !ready.is_empty() {
                        debug!(owner_id = %owner, count = ready.len(), "Owner has due reminders");
                    }
                    due.extend(ready);
                }
                Err(e) => {
                    error!(owner_id = %owner, error = %e, "Failed to scan reminders for owner");
                }
            }
        }

        if !due.is_empty() {
            info!(count = due.len(), "Due reminders found");
        }
        due
    }

    /// Advance a reminder past the occurrence that was just delivered
    pub fn mark_fired(&self, id: &ReminderId) -> bool {
        let Some(mut reminder) = self.get(id) else {
            warn!(reminder_id = %id, "Fired reminder not found");
            return false;
        };

        advance_after_firing(&mut reminder);

        if let Err(e) = self.write(&reminder) {
            error!(reminder_id = %id, error = %e, "Failed to record firing");
            return false;
        }

        debug!(
            reminder_id = %id,
            occurrence_count = reminder.occurrence_count,
            next_occurrence = ?reminder.next_occurrence,
            is_active = reminder.is_active,
            "Reminder advanced"
        );
        true
    }

    /// Owners known to the registry
    pub fn owners(&self) -> Vec<OwnerId> {
        self.index.owners().unwrap_or_else(|e| {
            warn!(error = %e, "Failed to read owner registry");
            Vec::new()
        })
    }

    fn try_get(&self, id: &ReminderId) -> StoreResult<Option<Reminder>> {
        self.store.get_json(NS_REMINDER, &id.key())
    }

    fn try_list_for_owner(&self, owner: OwnerId, filter: ListFilter) -> StoreResult<Vec<Reminder>> {
        let ids = self.index.reminder_ids(owner)?;

        let mut reminders = Vec::with_capacity(ids.len());
        for id in ids {
            match self.try_get(&id) {
                Ok(Some(reminder)) if reminder.owner_id != owner => {
                    warn!(
                        owner_id = %owner,
                        reminder_id = %id,
                        record_owner = %reminder.owner_id,
                        "Indexed reminder belongs to another owner"
                    );
                }
                Ok(Some(reminder)) => {
                    if filter.admits(&reminder) {
                        reminders.push(reminder);
                    }
                }
                Ok(None) => {
                    debug!(owner_id = %owner, reminder_id = %id, "Indexed reminder has no record");
                }
                Err(e) => {
                    warn!(owner_id = %owner, reminder_id = %id, error = %e, "Skipping unreadable reminder");
                }
            }
        }

        reminders.sort_by_key(|r| (r.remind_date, r.remind_time));
        Ok(reminders)
    }

    fn write(&self, reminder: &Reminder) -> StoreResult<()> {
        self.store
            .set_json(NS_REMINDER, &reminder.id.key(), reminder, None)
    }
}
