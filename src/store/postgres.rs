//! Postgres participant store.
//!
//! DESIGN
//! ======
//! Point reads and writes go straight to the `people` table. A trigger
//! issues `pg_notify('people_changed', id)` on every row change; a listener
//! task reloads the whole table on each notification and republishes it as a
//! snapshot, so draws made through other server processes show up live.
//!
//! `record_draw` locks both rows (`SELECT ... FOR UPDATE`), validates them
//! with the same rules as the in-memory store, and applies both updates in
//! one transaction.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::PgListener;
use sqlx::{PgPool, Row};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::{Participant, People, PeopleStore, PersonRecord, StoreError, check_draw};

const PEOPLE_CHANNEL: &str = "people_changed";
const LISTENER_RETRY_DELAY: Duration = Duration::from_secs(1);

pub struct PgStore {
    pool: PgPool,
    snapshots: Arc<watch::Sender<Arc<People>>>,
}

impl PgStore {
    /// Load the current collection and build the store.
    ///
    /// # Errors
    ///
    /// Returns a database error if the initial load fails.
    pub async fn connect(pool: PgPool) -> Result<Self, StoreError> {
        let people = load_people(&pool).await?;
        info!(count = people.len(), "postgres store: loaded people");
        let (snapshots, _) = watch::channel(Arc::new(people));
        Ok(Self { pool, snapshots: Arc::new(snapshots) })
    }

    /// Spawn the `LISTEN people_changed` task that keeps snapshots live.
    #[must_use]
    pub fn spawn_listener(&self) -> JoinHandle<()> {
        let pool = self.pool.clone();
        let snapshots = self.snapshots.clone();
        tokio::spawn(async move {
            loop {
                if let Err(e) = listen(&pool, &snapshots).await {
                    warn!(error = %e, "postgres store: listener failed");
                }
                tokio::time::sleep(LISTENER_RETRY_DELAY).await;
            }
        })
    }

    /// Republish after a committed write. A failed reload leaves the old
    /// snapshot until the listener catches up; the write itself stands.
    async fn refresh_after_write(&self) {
        if let Err(e) = refresh(&self.pool, &self.snapshots).await {
            warn!(error = %e, "postgres store: snapshot refresh after write failed");
        }
    }
}

async fn listen(pool: &PgPool, snapshots: &watch::Sender<Arc<People>>) -> Result<(), StoreError> {
    let mut listener = PgListener::connect_with(pool).await?;
    listener.listen(PEOPLE_CHANNEL).await?;
    // Catch up on anything missed while (re)connecting.
    refresh(pool, snapshots).await?;

    loop {
        let notification = listener.recv().await?;
        debug!(id = notification.payload(), "postgres store: people changed");
        refresh(pool, snapshots).await?;
    }
}

async fn refresh(pool: &PgPool, snapshots: &watch::Sender<Arc<People>>) -> Result<(), StoreError> {
    let people = load_people(pool).await?;
    snapshots.send_replace(Arc::new(people));
    Ok(())
}

async fn load_people(pool: &PgPool) -> Result<People, StoreError> {
    let rows = sqlx::query("SELECT id, available, assigned_to FROM people ORDER BY id")
        .fetch_all(pool)
        .await?;

    Ok(rows
        .iter()
        .map(|r| {
            let id: String = r.get("id");
            let participant = Participant { id: id.clone(), available: r.get("available"), assigned_to: r.get("assigned_to") };
            (id, participant)
        })
        .collect::<BTreeMap<_, _>>())
}

fn record_from_row(row: &sqlx::postgres::PgRow) -> PersonRecord {
    PersonRecord { available: row.get("available"), assigned_to: row.get("assigned_to"), password: row.get("password") }
}

#[async_trait::async_trait]
impl PeopleStore for PgStore {
    async fn get(&self, id: &str) -> Result<Option<PersonRecord>, StoreError> {
        let row = sqlx::query("SELECT available, assigned_to, password FROM people WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(record_from_row))
    }

    async fn create(&self, id: &str, record: PersonRecord) -> Result<(), StoreError> {
        let result = sqlx::query(
            r"INSERT INTO people (id, available, assigned_to, password)
              VALUES ($1, $2, $3, $4)
              ON CONFLICT (id) DO NOTHING",
        )
        .bind(id)
        .bind(record.available)
        .bind(&record.assigned_to)
        .bind(&record.password)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists(id.to_owned()));
        }
        self.refresh_after_write().await;
        Ok(())
    }

    async fn claim_password(&self, id: &str, password: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "UPDATE people SET password = $2, updated_at = now() WHERE id = $1 AND password IS NULL",
        )
        .bind(id)
        .bind(password)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            return Ok(true);
        }
        match self.get(id).await? {
            Some(_) => Ok(false),
            None => Err(StoreError::NotFound(id.to_owned())),
        }
    }

    async fn record_draw(&self, drawer: &str, winner: &str) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let (drawer_record, winner_record) = {
            let rows = sqlx::query("SELECT id, available, assigned_to, password FROM people WHERE id IN ($1, $2) FOR UPDATE")
                .bind(drawer)
                .bind(winner)
                .fetch_all(&mut *tx)
                .await?;
            let find = |id: &str| {
                rows.iter()
                    .find(|r| r.get::<String, _>("id") == id)
                    .map(record_from_row)
            };
            (find(drawer), find(winner))
        };
        check_draw(drawer, winner, drawer_record.as_ref(), winner_record.as_ref())?;

        sqlx::query("UPDATE people SET available = FALSE, assigned_to = $2, updated_at = now() WHERE id = $1")
            .bind(winner)
            .bind(drawer)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE people SET assigned_to = $2, updated_at = now() WHERE id = $1")
            .bind(drawer)
            .bind(winner)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        debug!(%drawer, %winner, "postgres store: draw recorded");
        self.refresh_after_write().await;
        Ok(())
    }

    fn subscribe(&self) -> watch::Receiver<Arc<People>> {
        self.snapshots.subscribe()
    }
}


// =============================================================================
// UNREACHABLE DATABASE
// =============================================================================
