//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds the participant store and the wheel tuning handed to every new
//! session. Per-client state (logged-in name, wheel, pending draw) lives in
//! the session task, never here.

use std::sync::Arc;

use crate::store::PeopleStore;
use crate::wheel::WheelConfig;

/// Shared application state. Clone is required by Axum; the store is
/// Arc-wrapped and the wheel config is `Copy`.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn PeopleStore>,
    pub wheel: WheelConfig,
}

impl AppState {
    #[must_use]
    pub fn new(store: Arc<dyn PeopleStore>, wheel: WheelConfig) -> Self {
        Self { store, wheel }
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================

#[cfg(test)]
pub mod test_helpers {
    use std::collections::BTreeMap;
    use std::time::Duration;

    use super::*;
    use crate::store::{MemoryStore, PersonRecord};

    /// Wheel timings short enough for real-time tests.
    #[must_use]
    pub fn fast_wheel() -> WheelConfig {
        WheelConfig {
            full_turns: 5,
            spin_duration: Duration::from_millis(40),
            transition: Duration::from_millis(30),
            reset_delay: Duration::from_millis(10),
        }
    }

    /// `AppState` over an empty in-memory store.
    #[must_use]
    pub fn test_app_state() -> AppState {
        AppState::new(Arc::new(MemoryStore::new()), fast_wheel())
    }

    /// `AppState` over an in-memory store holding `names`, all with password "pw".
    #[must_use]
    pub fn test_app_state_with(names: &[&str]) -> AppState {
        let records: BTreeMap<String, PersonRecord> = names
            .iter()
            .map(|name| ((*name).to_owned(), PersonRecord::new(Some("pw".into()))))
            .collect();
        AppState::new(Arc::new(MemoryStore::with_records(records)), fast_wheel())
    }
}
