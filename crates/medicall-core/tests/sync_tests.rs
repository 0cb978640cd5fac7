//! Sync controller behaviour against a scripted in-memory backend.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::{watch, Notify};
use tracing_test::traced_test;

use medicall_core::db::Database;
use medicall_core::models::{Contact, EntityStore, TimeOff, VisitLocator};
use medicall_core::schedule::{InteractionController, Mutation, PendingDeletion};
use medicall_core::sync::{
    ApiError, ApiResult, CrmApi, PollOutcome, SyncController, SyncError, SyncStatus,
};

/// A backend whose data, failures and timing are driven by the test.
#[derive(Default)]
struct ScriptedApi {
    contacts: Mutex<Vec<Contact>>,
    marker: Mutex<Option<String>>,
    fail_bulk: AtomicBool,
    fail_upsert: AtomicBool,
    malformed_status: AtomicBool,
    hold_bulk: AtomicBool,
    bulk_started: Notify,
    bulk_release: Notify,
    fetches: AtomicUsize,
    status_calls: AtomicUsize,
    upserts: Mutex<Vec<String>>,
    deleted_visits: Mutex<Vec<(String, String)>>,
}

impl ScriptedApi {
    fn with_contacts(contacts: Vec<Contact>, marker: &str) -> Self {
        Self {
            contacts: Mutex::new(contacts),
            marker: Mutex::new(Some(marker.to_string())),
            ..Default::default()
        }
    }

    fn set_marker(&self, marker: &str) {
        *self.marker.lock() = Some(marker.to_string());
    }

    fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CrmApi for ScriptedApi {
    async fn fetch_contacts(&self) -> ApiResult<Vec<Contact>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.contacts.lock().clone())
    }

    async fn fetch_sync_status(&self) -> ApiResult<SyncStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);
        if self.malformed_status.load(Ordering::SeqCst) {
            return Err(ApiError::Malformed("expected application/json, got \"text/html\"".into()));
        }
        Ok(SyncStatus {
            contacts: self.marker.lock().clone(),
            procedures: None,
        })
    }

    async fn upsert_contact(&self, contact: &Contact) -> ApiResult<()> {
        if self.fail_upsert.load(Ordering::SeqCst) {
            return Err(ApiError::Transport("connection reset".into()));
        }
        self.upserts.lock().push(contact.id.clone());
        Ok(())
    }

    async fn bulk_upsert_contacts(&self, contacts: &[Contact]) -> ApiResult<()> {
        if self.hold_bulk.load(Ordering::SeqCst) {
            self.bulk_started.notify_one();
            self.bulk_release.notified().await;
        }
        if self.fail_bulk.load(Ordering::SeqCst) {
            return Err(ApiError::Status {
                status: 500,
                message: "import rejected".into(),
            });
        }
        let mut stored = self.contacts.lock();
        stored.splice(0..0, contacts.iter().cloned());
        drop(stored);
        self.set_marker("after-import");
        Ok(())
    }

    async fn delete_contact(&self, _: &str) -> ApiResult<()> {
        Ok(())
    }

    async fn delete_visit(&self, contact_id: &str, visit_id: &str) -> ApiResult<()> {
        self.deleted_visits
            .lock()
            .push((contact_id.to_string(), visit_id.to_string()));
        Ok(())
    }
}

fn make_contacts() -> Vec<Contact> {
    vec![
        Contact::new("ORALIA".into(), "Aida Simbron".into()),
        Contact::new("ORALIA".into(), "Alba Jasso".into()),
    ]
}

async fn make_controller(api: ScriptedApi) -> SyncController<ScriptedApi> {
    let sync = SyncController::new(api, Database::open_in_memory().unwrap()).unwrap();
    sync.initial_load().await.unwrap();
    sync
}

#[tokio::test]
#[traced_test]
async fn test_failed_import_restores_snapshot_and_suppresses_polling() {
    let api = ScriptedApi::with_contacts(make_contacts(), "v1");
    api.hold_bulk.store(true, Ordering::SeqCst);
    api.fail_bulk.store(true, Ordering::SeqCst);
    let sync = make_controller(api).await;

    let before = serde_json::to_vec(&sync.snapshot().contacts).unwrap();
    let fetches_before = sync.api().fetches();
    // The server moved on, so an unsuppressed poll would refetch.
    sync.api().set_marker("v2");

    let batch = vec![Contact::new("ORALIA".into(), "Nuevo Contacto".into())];
    let (result, ()) = tokio::join!(sync.import_contacts(batch), async {
        sync.api().bulk_started.notified().await;
        assert!(sync.is_importing());
        assert_eq!(sync.snapshot().contacts[0].name, "Nuevo Contacto");

        assert_eq!(sync.poll_tick().await, PollOutcome::SkippedImporting);
        assert_eq!(sync.poll_tick().await, PollOutcome::SkippedImporting);
        assert!(matches!(
            sync.import_contacts(Vec::new()).await,
            Err(SyncError::ImportInProgress)
        ));
        assert_eq!(sync.api().fetches(), fetches_before);

        sync.api().bulk_release.notify_one();
    });

    assert!(matches!(
        result,
        Err(SyncError::Api(ApiError::Status { status: 500, .. }))
    ));
    assert!(!sync.is_importing());
    assert_eq!(sync.api().fetches(), fetches_before + 1);
    assert_eq!(serde_json::to_vec(&sync.snapshot().contacts).unwrap(), before);
    assert!(logs_contain("poll skipped: bulk import in flight"));
    assert!(logs_contain("bulk import failed, restored pre-import contacts"));
}

#[tokio::test]
async fn test_successful_import_refetches_server_copy() {
    let sync = make_controller(ScriptedApi::with_contacts(make_contacts(), "v1")).await;
    let fetches_before = sync.api().fetches();

    let batch = vec![
        Contact::new("ORALIA".into(), "Nuevo Uno".into()),
        Contact::new("ORALIA".into(), "Nuevo Dos".into()),
    ];
    sync.import_contacts(batch).await.unwrap();

    assert_eq!(sync.api().fetches(), fetches_before + 1);
    let names: Vec<String> = sync
        .snapshot()
        .contacts
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Nuevo Uno", "Nuevo Dos", "Aida Simbron", "Alba Jasso"]);
    assert_eq!(sync.last_marker().as_deref(), Some("after-import"));

    // The refetch already saw the new marker.
    assert_eq!(sync.poll_tick().await, PollOutcome::UpToDate);
}

#[tokio::test]
async fn test_malformed_status_counts_as_no_update() {
    let sync = make_controller(ScriptedApi::with_contacts(make_contacts(), "v1")).await;
    sync.api().malformed_status.store(true, Ordering::SeqCst);
    sync.api().set_marker("v2");
    let fetches_before = sync.api().fetches();

    assert_eq!(sync.poll_tick().await, PollOutcome::Unavailable);
    assert_eq!(sync.api().fetches(), fetches_before);
    assert_eq!(sync.snapshot().contacts.len(), 2);

    sync.api().malformed_status.store(false, Ordering::SeqCst);
    assert_eq!(sync.poll_tick().await, PollOutcome::Refreshed { contacts: 2 });
}

#[tokio::test]
async fn test_single_mutation_failure_keeps_optimistic_state() {
    let sync = make_controller(ScriptedApi::with_contacts(make_contacts(), "v1")).await;
    sync.api().fail_upsert.store(true, Ordering::SeqCst);
    let contact_id = sync.snapshot().contacts[0].id.clone();

    let mut ctl = InteractionController::new();
    ctl.compose_visit("2024-03-05".parse().unwrap());
    sync.with_store(|store| ctl.select_contact(store, &contact_id))
        .unwrap();
    ctl.set_objective("presentar").unwrap();

    let committed = sync.commit(|store| ctl.save(store)).await.unwrap();
    assert!(!committed.persisted);
    assert_eq!(
        committed.mutation,
        Mutation::ContactsChanged(vec![contact_id.clone()])
    );
    assert_eq!(sync.snapshot().contacts[0].visits.len(), 1);
    assert!(sync.api().upserts.lock().is_empty());
}

#[tokio::test]
async fn test_validation_error_touches_nothing() {
    let sync = make_controller(ScriptedApi::with_contacts(make_contacts(), "v1")).await;
    let before = sync.snapshot();

    let mut ctl = InteractionController::new();
    ctl.compose_visit("2024-03-05".parse().unwrap());
    let err = sync.commit(|store| ctl.save(store)).await.unwrap_err();

    assert!(matches!(err, SyncError::Schedule(_)));
    assert_eq!(sync.snapshot(), before);
    assert!(sync.api().upserts.lock().is_empty());
}

#[tokio::test]
async fn test_visit_deletion_is_pushed() {
    let sync = make_controller(ScriptedApi::with_contacts(make_contacts(), "v1")).await;
    let contact_id = sync.snapshot().contacts[1].id.clone();

    let mut ctl = InteractionController::new();
    ctl.compose_at_slot("2024-03-05".parse().unwrap(), "10:30".parse().unwrap());
    sync.with_store(|store| ctl.select_contact(store, &contact_id))
        .unwrap();
    ctl.set_objective("presentar").unwrap();
    sync.commit(|store| ctl.save(store)).await.unwrap();

    let visit_id = sync.snapshot().contacts[1].visits[0].id.clone();
    let locator = VisitLocator::new(contact_id.clone(), visit_id.clone());
    let committed = sync
        .commit(|store| PendingDeletion::visit(locator.clone()).confirm(store))
        .await
        .unwrap();

    assert!(committed.persisted);
    assert_eq!(
        sync.api().deleted_visits.lock().as_slice(),
        &[(contact_id, visit_id)]
    );
    assert!(sync.snapshot().contacts[1].visits.is_empty());
}

#[tokio::test]
async fn test_time_off_stays_local() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("medicall.db");
    let sync = SyncController::new(
        ScriptedApi::with_contacts(make_contacts(), "v1"),
        Database::open(&path).unwrap(),
    )
    .unwrap();

    let mut ctl = InteractionController::new();
    ctl.compose_time_off("ORALIA", "2024-03-05".parse().unwrap());
    ctl.time_off_draft_mut().unwrap().end_date = "2024-03-06".parse().unwrap();
    let committed = sync.commit(|store| ctl.save(store)).await.unwrap();
    assert!(committed.persisted);
    let Mutation::TimeOffCreated(created) = committed.mutation else {
        panic!("expected a time-off mutation");
    };

    // No network traffic for time-off.
    assert_eq!(sync.api().status_calls(), 0);
    assert_eq!(sync.api().fetches(), 0);
    assert!(sync.api().upserts.lock().is_empty());

    let stored: Vec<TimeOff> = Database::open(&path).unwrap().list_time_off().unwrap();
    assert_eq!(stored, vec![created.clone()]);

    // A fresh controller on the same file sees it too.
    drop(sync);
    let restored = SyncController::new(
        ScriptedApi::default(),
        Database::open(&path).unwrap(),
    )
    .unwrap();
    assert_eq!(restored.snapshot().time_offs, vec![created]);
}

#[tokio::test(start_paused = true)]
async fn test_poller_refetches_on_marker_change_until_shutdown() {
    let sync = make_controller(ScriptedApi::with_contacts(make_contacts(), "v1")).await;
    let status_before = sync.api().status_calls();
    let fetches_before = sync.api().fetches();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let driver = async {
        // Ticks at 5s and 10s see an unchanged marker.
        tokio::time::sleep(Duration::from_secs(12)).await;
        assert_eq!(sync.api().fetches(), fetches_before);
        sync.api().set_marker("v2");
        // Tick at 15s refetches.
        tokio::time::sleep(Duration::from_secs(5)).await;
        shutdown_tx.send(true).unwrap();
    };
    tokio::join!(sync.run_poller(Duration::from_secs(5), shutdown_rx), driver);

    assert_eq!(sync.api().status_calls(), status_before + 3);
    assert_eq!(sync.api().fetches(), fetches_before + 1);
    assert_eq!(sync.last_marker().as_deref(), Some("v2"));
}

#[tokio::test]
async fn test_store_helpers_see_latest_state() {
    let sync = make_controller(ScriptedApi::with_contacts(make_contacts(), "v1")).await;
    let contact = Contact::new("TALINA".into(), "Hospital Angeles".into());
    assert!(sync.upsert_contact(contact.clone()).await);
    assert_eq!(sync.snapshot().contacts[0], contact);
    assert_eq!(sync.with_store(EntityStore::executives), vec!["ORALIA", "TALINA"]);

    assert!(sync.delete_contact(&contact.id).await);
    assert!(sync.with_store(|s| s.contact(&contact.id).is_none()));
}
