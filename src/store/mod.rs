//! Participant store — the shared "people" collection.
//!
//! ARCHITECTURE
//! ============
//! `PeopleStore` is the seam between the draw logic and whatever backs the
//! collection. Reads and writes are point operations keyed by participant
//! name. Change notification is a live *snapshot* feed: every change
//! publishes the whole collection, and consumers replace their local copy
//! wholesale instead of merging diffs.
//!
//! Two backends:
//! - `MemoryStore` — process-local, used when no database is configured and
//!   throughout the tests.
//! - `PgStore` — Postgres via sqlx, with `LISTEN/NOTIFY` feeding snapshots so
//!   several server processes observe each other's draws.

pub mod memory;
pub mod postgres;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

pub use memory::MemoryStore;
pub use postgres::PgStore;

// =============================================================================
// TYPES
// =============================================================================

/// Full stored record, including the login secret.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonRecord {
    pub available: bool,
    pub assigned_to: Option<String>,
    pub password: Option<String>,
}

impl PersonRecord {
    /// A fresh, undrawn participant.
    #[must_use]
    pub fn new(password: Option<String>) -> Self {
        Self { available: true, assigned_to: None, password }
    }

    /// True once this participant has drawn someone.
    #[must_use]
    pub fn has_drawn(&self) -> bool {
        drawn(self.assigned_to.as_deref())
    }
}

fn drawn(assigned_to: Option<&str>) -> bool {
    assigned_to.is_some_and(|s| !s.is_empty())
}

/// Public view of a participant. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub available: bool,
    pub assigned_to: Option<String>,
}

impl Participant {
    #[must_use]
    pub fn from_record(id: &str, record: &PersonRecord) -> Self {
        Self { id: id.to_owned(), available: record.available, assigned_to: record.assigned_to.clone() }
    }

    /// True once this participant has drawn someone.
    #[must_use]
    pub fn has_drawn(&self) -> bool {
        drawn(self.assigned_to.as_deref())
    }
}

/// Snapshot of the whole collection, ordered by participant id.
pub type People = BTreeMap<String, Participant>;

/// Project stored records into a public snapshot.
#[must_use]
pub fn project(records: &BTreeMap<String, PersonRecord>) -> People {
    records
        .iter()
        .map(|(id, record)| (id.clone(), Participant::from_record(id, record)))
        .collect()
}

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("participant not found: {0}")]
    NotFound(String),
    #[error("participant already exists: {0}")]
    AlreadyExists(String),
    #[error("draw conflict: {0}")]
    Conflict(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

// =============================================================================
// TRAIT
// =============================================================================

#[async_trait::async_trait]
pub trait PeopleStore: Send + Sync {
    /// Point read by participant id.
    async fn get(&self, id: &str) -> Result<Option<PersonRecord>, StoreError>;

    /// Create a participant. Fails with `AlreadyExists` if the id is taken.
    async fn create(&self, id: &str, record: PersonRecord) -> Result<(), StoreError>;

    /// Set the login password on a participant that has none yet. Returns
    /// false, writing nothing, if a password was already set.
    async fn claim_password(&self, id: &str, password: &str) -> Result<bool, StoreError>;

    /// Persist a draw result as one atomic update: `winner` becomes
    /// unavailable and assigned to `drawer`, and `drawer` is assigned
    /// `winner`. Nothing is written unless both halves apply.
    async fn record_draw(&self, drawer: &str, winner: &str) -> Result<(), StoreError>;

    /// Live snapshot feed. The receiver starts with the current collection.
    fn subscribe(&self) -> watch::Receiver<Arc<People>>;

    /// Current snapshot.
    fn snapshot(&self) -> Arc<People> {
        self.subscribe().borrow().clone()
    }

    /// Create any missing participants with no password, so the first login
    /// under each name claims it. Returns how many were created.
    async fn seed(&self, names: &[String]) -> Result<usize, StoreError> {
        let mut created = 0;
        for name in names {
            if self.get(name).await?.is_some() {
                continue;
            }
            match self.create(name, PersonRecord::new(None)).await {
                Ok(()) => created += 1,
                Err(StoreError::AlreadyExists(_)) => {}
                Err(e) => return Err(e),
            }
        }
        Ok(created)
    }
}

/// Validate a draw against current records. Shared by both backends so they
/// refuse exactly the same writes.
pub(crate) fn check_draw(
    drawer: &str,
    winner: &str,
    drawer_record: Option<&PersonRecord>,
    winner_record: Option<&PersonRecord>,
) -> Result<(), StoreError> {
    if drawer == winner {
        return Err(StoreError::Conflict(format!("{drawer} cannot draw themselves")));
    }
    let drawer_record = drawer_record.ok_or_else(|| StoreError::NotFound(drawer.to_owned()))?;
    let winner_record = winner_record.ok_or_else(|| StoreError::NotFound(winner.to_owned()))?;
    if !winner_record.available {
        return Err(StoreError::Conflict(format!("{winner} was already drawn")));
    }
    if drawer_record.has_drawn() {
        return Err(StoreError::Conflict(format!("{drawer} has already drawn")));
    }
    Ok(())
}
