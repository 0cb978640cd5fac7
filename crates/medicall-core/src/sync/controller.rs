//! Optimistic apply-then-push over a shared entity store.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};

use super::{ApiError, CrmApi, SyncError, SyncResult, SyncStatus};
use crate::db::{Database, CONTACTS_VERSION_KEY, PROCEDURES_VERSION_KEY};
use crate::models::{Contact, EntityStore};
use crate::schedule::{Mutation, ScheduleResult};

/// What one poll tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// A bulk import holds the lock; no request was made.
    SkippedImporting,
    /// The server marker matches the last one seen.
    UpToDate,
    Refreshed { contacts: usize },
    /// Network failure or malformed response; treated as "no update".
    Unavailable,
}

/// Result of an optimistic edit.
#[derive(Debug, Clone, PartialEq)]
pub struct Committed {
    pub mutation: Mutation,
    /// False when pushing failed. The local edit is kept regardless.
    pub persisted: bool,
}

/// Clears the import flag when the import settles, even if its future is
/// dropped mid-flight.
struct ImportGuard<'a>(&'a AtomicBool);

impl Drop for ImportGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Owns the shared contact/time-off collections and keeps them in step with
/// the backend and the local database.
///
/// Locks are only ever held for synchronous sections, never across an await.
pub struct SyncController<A> {
    api: A,
    store: RwLock<EntityStore>,
    db: Mutex<Database>,
    importing: AtomicBool,
    /// Bumped when an import starts; polls spanning one are discarded.
    import_generation: AtomicU64,
    last_marker: Mutex<Option<String>>,
}

impl<A: CrmApi> SyncController<A> {
    /// Start from whatever the local database holds (cached contacts,
    /// time-off, last marker). Call [`initial_load`](Self::initial_load)
    /// next to bring contacts up to date.
    pub fn new(api: A, db: Database) -> SyncResult<Self> {
        let contacts = db.load_contact_cache()?;
        let time_offs = db.list_time_off()?;
        let marker = db.sync_marker(CONTACTS_VERSION_KEY)?;
        tracing::debug!(
            contacts = contacts.len(),
            time_offs = time_offs.len(),
            "sync controller restored local state"
        );
        Ok(Self {
            api,
            store: RwLock::new(EntityStore::new(contacts, time_offs)),
            db: Mutex::new(db),
            importing: AtomicBool::new(false),
            import_generation: AtomicU64::new(0),
            last_marker: Mutex::new(marker),
        })
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    /// A copy of the current collections.
    pub fn snapshot(&self) -> EntityStore {
        self.store.read().clone()
    }

    /// Read the collections in place, e.g. to build an event index for a render.
    pub fn with_store<R>(&self, f: impl FnOnce(&EntityStore) -> R) -> R {
        f(&self.store.read())
    }

    pub fn is_importing(&self) -> bool {
        self.importing.load(Ordering::SeqCst)
    }

    pub fn last_marker(&self) -> Option<String> {
        self.last_marker.lock().clone()
    }

    // ---- reads from the server ----

    /// Unconditional full refetch at startup.
    pub async fn initial_load(&self) -> SyncResult<usize> {
        let count = self.refetch().await?;
        tracing::info!(contacts = count, "initial load complete");
        Ok(count)
    }

    /// Fetch the full contact list regardless of markers and install it.
    pub async fn refetch(&self) -> SyncResult<usize> {
        // Status first, so the remembered marker is never newer than the data.
        let status = match self.api.fetch_sync_status().await {
            Ok(status) => Some(status),
            Err(e) => {
                tracing::debug!(error = %e, "sync status unavailable during refetch");
                None
            }
        };
        let contacts = self.api.fetch_contacts().await?;
        Ok(self.install(contacts, status.as_ref()))
    }

    /// One poll: compare markers and refetch only when the server moved on.
    pub async fn poll_tick(&self) -> PollOutcome {
        if self.is_importing() {
            tracing::debug!("poll skipped: bulk import in flight");
            return PollOutcome::SkippedImporting;
        }
        let generation = self.import_generation.load(Ordering::SeqCst);

        let status = match self.api.fetch_sync_status().await {
            Ok(status) => status,
            Err(e) => {
                log_unavailable(&e, "sync status");
                return PollOutcome::Unavailable;
            }
        };
        let Some(marker) = status.contacts.as_deref() else {
            return PollOutcome::UpToDate;
        };
        if self.last_marker.lock().as_deref() == Some(marker) {
            return PollOutcome::UpToDate;
        }

        let contacts = match self.api.fetch_contacts().await {
            Ok(contacts) => contacts,
            Err(e) => {
                log_unavailable(&e, "contact list");
                return PollOutcome::Unavailable;
            }
        };
        // An import may have started, or even finished, while the fetch was
        // in flight. Either way this list predates it.
        if self.is_importing() || self.import_generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("poll result dropped: bulk import overlapped the fetch");
            return PollOutcome::SkippedImporting;
        }

        let count = self.install(contacts, Some(&status));
        tracing::info!(contacts = count, marker, "contacts refreshed from server");
        PollOutcome::Refreshed { contacts: count }
    }

    /// Replace contacts and the marker in memory, then mirror both into the
    /// cache. A cache failure only costs the offline copy.
    fn install(&self, contacts: Vec<Contact>, status: Option<&SyncStatus>) -> usize {
        let count = contacts.len();
        let contacts_marker = status.and_then(|s| s.contacts.clone());
        {
            let mut store = self.store.write();
            store.contacts = contacts;
            if contacts_marker.is_some() {
                *self.last_marker.lock() = contacts_marker.clone();
            }
            let mut db = self.db.lock();
            if let Err(e) = db.replace_contact_cache(&store.contacts, contacts_marker.as_deref()) {
                tracing::warn!(error = %e, "failed to cache refreshed contacts");
            }
            if let Some(procedures) = status.and_then(|s| s.procedures.as_deref()) {
                if let Err(e) = db.set_sync_state(PROCEDURES_VERSION_KEY, procedures) {
                    tracing::warn!(error = %e, "failed to store procedures marker");
                }
            }
        }
        count
    }

    // ---- local edits ----

    /// Apply an edit locally, then persist it.
    ///
    /// Validation errors abort before anything changes. Persistence failures
    /// are logged and reported through [`Committed::persisted`]; the local
    /// edit is not rolled back.
    pub async fn commit<F>(&self, edit: F) -> SyncResult<Committed>
    where
        F: FnOnce(&mut EntityStore) -> ScheduleResult<Mutation> + Send,
    {
        let mutation = {
            let mut store = self.store.write();
            edit(&mut store)?
        };
        let persisted = self.persist(&mutation).await;
        Ok(Committed {
            mutation,
            persisted,
        })
    }

    /// Push an already-applied mutation. Returns whether every step succeeded.
    pub async fn persist(&self, mutation: &Mutation) -> bool {
        match mutation {
            Mutation::ContactsChanged(ids) => {
                let contacts: Vec<Contact> = {
                    let store = self.store.read();
                    ids.iter().filter_map(|id| store.contact(id).cloned()).collect()
                };
                let mut ok = contacts.len() == ids.len();
                for contact in &contacts {
                    ok &= self.push_contact(contact).await;
                }
                ok
            }
            Mutation::VisitDeleted(locator) => {
                let contact = self.store.read().contact(&locator.contact_id).cloned();
                let cached = contact.as_ref().map_or(true, |c| self.cache_contact(c));
                match self
                    .api
                    .delete_visit(&locator.contact_id, &locator.visit_id)
                    .await
                {
                    Ok(()) => cached,
                    Err(e) => {
                        tracing::warn!(
                            error = %e,
                            contact_id = %locator.contact_id,
                            visit_id = %locator.visit_id,
                            "failed to delete visit on server, keeping local state"
                        );
                        false
                    }
                }
            }
            Mutation::TimeOffCreated(time_off) => match self.db.lock().insert_time_off(time_off) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, time_off_id = %time_off.id, "failed to store time-off");
                    false
                }
            },
            Mutation::TimeOffDeleted(id) => match self.db.lock().delete_time_off(id) {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!(error = %e, time_off_id = %id, "failed to delete stored time-off");
                    false
                }
            },
        }
    }

    fn cache_contact(&self, contact: &Contact) -> bool {
        match self.db.lock().upsert_cached_contact(contact) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(error = %e, contact_id = %contact.id, "failed to cache contact");
                false
            }
        }
    }

    async fn push_contact(&self, contact: &Contact) -> bool {
        let cached = self.cache_contact(contact);
        match self.api.upsert_contact(contact).await {
            Ok(()) => cached,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    contact_id = %contact.id,
                    "failed to push contact, keeping local state"
                );
                false
            }
        }
    }

    /// Add or replace a contact (profile forms). New contacts go first.
    pub async fn upsert_contact(&self, contact: Contact) -> bool {
        {
            let mut store = self.store.write();
            match store.contact_mut(&contact.id) {
                Some(existing) => *existing = contact.clone(),
                None => store.contacts.insert(0, contact.clone()),
            }
        }
        self.push_contact(&contact).await
    }

    pub async fn delete_contact(&self, contact_id: &str) -> bool {
        self.store.write().contacts.retain(|c| c.id != contact_id);
        let cached = match self.db.lock().delete_cached_contact(contact_id) {
            Ok(_) => true,
            Err(e) => {
                tracing::warn!(error = %e, contact_id, "failed to drop cached contact");
                false
            }
        };
        match self.api.delete_contact(contact_id).await {
            Ok(()) => cached,
            Err(e) => {
                tracing::warn!(error = %e, contact_id, "failed to delete contact on server");
                false
            }
        }
    }

    // ---- bulk import ----

    /// Insert a batch ahead of the current contacts and push it in one call.
    ///
    /// Polling is suppressed while the call is in flight. On failure the
    /// pre-import contact list is restored exactly. Either way the lock is
    /// released and a full refetch follows.
    pub async fn import_contacts(&self, batch: Vec<Contact>) -> SyncResult<()> {
        if self
            .importing
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return Err(SyncError::ImportInProgress);
        }
        let guard = ImportGuard(&self.importing);
        self.import_generation.fetch_add(1, Ordering::SeqCst);

        let snapshot = {
            let mut store = self.store.write();
            let snapshot = store.contacts.clone();
            store.contacts.splice(0..0, batch.iter().cloned());
            snapshot
        };
        tracing::info!(count = batch.len(), "bulk import started");

        let result = self.api.bulk_upsert_contacts(&batch).await;
        if let Err(e) = &result {
            self.store.write().contacts = snapshot;
            tracing::warn!(error = %e, "bulk import failed, restored pre-import contacts");
        } else {
            tracing::info!(count = batch.len(), "bulk import accepted");
        }

        drop(guard);
        if let Err(e) = self.refetch().await {
            tracing::warn!(error = %e, "refetch after bulk import failed");
        }
        result.map_err(SyncError::from)
    }
}

fn log_unavailable(error: &ApiError, what: &str) {
    match error {
        ApiError::Malformed(_) => {
            tracing::debug!(error = %error, "{what}: malformed response, treating as no update")
        }
        _ => tracing::warn!(error = %error, "{what}: request failed"),
    }
}
