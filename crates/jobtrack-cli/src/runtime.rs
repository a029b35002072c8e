// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Context, Result};
use jobtrack_app::{FetchError, JobId, RawRecord, RequestId, UserId};
use jobtrack_db::Store;
use jobtrack_tui::InternalEvent;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use std::thread;

pub struct DbRuntime<'a> {
    store: &'a Store,
    db_path: Option<PathBuf>,
}

impl<'a> DbRuntime<'a> {
    /// With a file-backed `db_path`, list fetches run on a worker thread
    /// that opens its own connection.
    pub fn with_db_path(store: &'a Store, db_path: Option<PathBuf>) -> Self {
        let db_path = db_path.filter(|path| path.as_os_str() != ":memory:");
        Self { store, db_path }
    }
}

impl jobtrack_tui::AppRuntime for DbRuntime<'_> {
    fn fetch_records(&mut self, user_id: UserId) -> Result<Vec<RawRecord>> {
        self.store.list_records(user_id)
    }

    fn fetch_record(&mut self, user_id: UserId, job_id: JobId) -> Result<Option<RawRecord>> {
        self.store.get_record(user_id, job_id)
    }

    fn create_record(&mut self, user_id: UserId, payload: &Value) -> Result<JobId> {
        self.store.insert_record(user_id, payload)
    }

    fn spawn_fetch(
        &mut self,
        request: RequestId,
        user_id: UserId,
        tx: Sender<InternalEvent>,
    ) -> Result<()> {
        let Some(db_path) = self.db_path.clone() else {
            let result = self.fetch_records(user_id).map_err(to_fetch_error);
            return send_loaded(&tx, request, result);
        };

        thread::Builder::new()
            .name("jobtrack-fetch".to_owned())
            .spawn(move || {
                let result = fetch_on_worker(&db_path, user_id).map_err(to_fetch_error);
                if let Err(error) = send_loaded(&tx, request, result) {
                    tracing::debug!(%request, "{error:#}");
                }
            })
            .context("spawn fetch worker")?;
        Ok(())
    }
}

fn fetch_on_worker(db_path: &Path, user_id: UserId) -> Result<Vec<RawRecord>> {
    let store = Store::open(db_path)
        .with_context(|| format!("open database {} for fetch", db_path.display()))?;
    store.list_records(user_id)
}

fn to_fetch_error(error: anyhow::Error) -> FetchError {
    tracing::error!("record fetch failed: {error:#}");
    FetchError::new(format!("{error:#}"))
}

fn send_loaded(
    tx: &Sender<InternalEvent>,
    request: RequestId,
    result: Result<Vec<RawRecord>, FetchError>,
) -> Result<()> {
    tx.send(InternalEvent::RecordsLoaded { request, result })
        .map_err(|_| anyhow::anyhow!("fetch event channel closed"))
}

#[cfg(test)]
mod tests {
    use super::DbRuntime;
    use anyhow::Result;
    use jobtrack_app::{FetchTracker, JobId, UserId, normalize};
    use jobtrack_db::Store;
    use jobtrack_testkit::{ApplicationFaker, payload_for, temp_db_path};
    use jobtrack_tui::{AppRuntime, InternalEvent};
    use std::path::PathBuf;
    use std::sync::mpsc;
    use std::time::Duration;

    #[test]
    fn create_then_fetch_round_trips_through_store() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        let mut runtime = DbRuntime::with_db_path(&store, None);
        let user = UserId::new(1);

        let application = ApplicationFaker::new(21).application();
        let id = runtime.create_record(user, &payload_for(&application))?;

        let records = runtime.fetch_records(user)?;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, id);

        let raw = runtime
            .fetch_record(user, id)?
            .expect("record visible to its owner");
        let record = normalize(&raw)?;
        assert_eq!(record.company, application.company);
        assert_eq!(runtime.fetch_record(UserId::new(2), id)?, None);
        assert_eq!(runtime.fetch_record(user, JobId::new(404))?, None);
        Ok(())
    }

    #[test]
    fn in_memory_store_fetches_inline() -> Result<()> {
        let store = Store::open_memory()?;
        store.bootstrap()?;
        store.seed_demo(UserId::new(1))?;
        let mut runtime = DbRuntime::with_db_path(&store, Some(PathBuf::from(":memory:")));

        let mut tracker = FetchTracker::default();
        let request = tracker.begin();
        let (tx, rx) = mpsc::channel();
        runtime.spawn_fetch(request, UserId::new(1), tx)?;

        match rx.try_recv()? {
            InternalEvent::RecordsLoaded {
                request: loaded,
                result,
            } => {
                assert_eq!(loaded, request);
                assert_eq!(result?.len(), store.count_records(UserId::new(1))?);
            }
            other => panic!("unexpected event {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn file_store_fetches_on_worker_thread() -> Result<()> {
        let (_dir, path) = temp_db_path()?;
        let store = Store::open(&path)?;
        store.bootstrap()?;
        let user = UserId::new(3);
        let mut faker = ApplicationFaker::new(8);
        for application in faker.applications(4) {
            store.insert_record(user, &payload_for(&application))?;
        }

        let mut runtime = DbRuntime::with_db_path(&store, Some(path.clone()));
        let mut tracker = FetchTracker::default();
        let request = tracker.begin();
        let (tx, rx) = mpsc::channel();
        runtime.spawn_fetch(request, user, tx)?;

        match rx.recv_timeout(Duration::from_secs(5))? {
            InternalEvent::RecordsLoaded {
                request: loaded,
                result,
            } => {
                assert_eq!(loaded, request);
                assert_eq!(result?.len(), 4);
            }
            other => panic!("unexpected event {other:?}"),
        }
        Ok(())
    }

    #[test]
    fn worker_fetch_failure_is_reported_as_fetch_error() -> Result<()> {
        let (dir, path) = temp_db_path()?;
        let store = Store::open(&path)?;
        store.bootstrap()?;

        let missing = dir.path().join("missing").join("jobtrack.db");
        let mut runtime = DbRuntime::with_db_path(&store, Some(missing));
        let mut tracker = FetchTracker::default();
        let request = tracker.begin();
        let (tx, rx) = mpsc::channel();
        runtime.spawn_fetch(request, UserId::new(1), tx)?;

        match rx.recv_timeout(Duration::from_secs(5))? {
            InternalEvent::RecordsLoaded { result, .. } => {
                let error = result.expect_err("missing directory cannot be opened");
                assert!(error.message.contains("for fetch"), "{}", error.message);
            }
            other => panic!("unexpected event {other:?}"),
        }
        Ok(())
    }
}
