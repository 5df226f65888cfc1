//! In-memory participant store.
//!
//! Records sit behind a `std::sync::Mutex` that is never held across an
//! await. Every successful write republishes the full projected snapshot on
//! a `watch` channel while still holding the lock, so snapshots are
//! published in write order.

#[cfg(test)]
#[path = "memory_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::debug;

use super::{People, PeopleStore, PersonRecord, StoreError, check_draw, project};

pub struct MemoryStore {
    records: Mutex<BTreeMap<String, PersonRecord>>,
    snapshots: watch::Sender<Arc<People>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_records(BTreeMap::new())
    }

    /// Start from a pre-populated collection.
    #[must_use]
    pub fn with_records(records: BTreeMap<String, PersonRecord>) -> Self {
        let (snapshots, _) = watch::channel(Arc::new(project(&records)));
        Self { records: Mutex::new(records), snapshots }
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, PersonRecord>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, records: &BTreeMap<String, PersonRecord>) {
        self.snapshots.send_replace(Arc::new(project(records)));
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl PeopleStore for MemoryStore {
    async fn get(&self, id: &str) -> Result<Option<PersonRecord>, StoreError> {
        Ok(self.lock().get(id).cloned())
    }

    async fn create(&self, id: &str, record: PersonRecord) -> Result<(), StoreError> {
        let mut records = self.lock();
        if records.contains_key(id) {
            return Err(StoreError::AlreadyExists(id.to_owned()));
        }
        records.insert(id.to_owned(), record);
        debug!(%id, "memory store: participant created");
        self.publish(&records);
        Ok(())
    }

    async fn claim_password(&self, id: &str, password: &str) -> Result<bool, StoreError> {
        let mut records = self.lock();
        let record = records
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(id.to_owned()))?;
        if record.password.is_some() {
            return Ok(false);
        }
        record.password = Some(password.to_owned());
        // Public snapshot is unchanged.
        Ok(true)
    }

    async fn record_draw(&self, drawer: &str, winner: &str) -> Result<(), StoreError> {
        let mut records = self.lock();
        check_draw(drawer, winner, records.get(drawer), records.get(winner))?;

        if let Some(record) = records.get_mut(winner) {
            record.available = false;
            record.assigned_to = Some(drawer.to_owned());
        }
        if let Some(record) = records.get_mut(drawer) {
            record.assigned_to = Some(winner.to_owned());
        }
        debug!(%drawer, %winner, "memory store: draw recorded");
        self.publish(&records);
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Arc<People>> {
        self.snapshots.subscribe()
    }
}
