//! Draw orchestrator — pick a winner, spin the wheel, persist on completion.
//!
//! DESIGN
//! ======
//! A draw is two halves joined by the wheel:
//!
//! 1. `draw()` validates, picks a winner uniformly from the eligible pool,
//!    and sends `Spin` to the wheel with the winner's slot among *all*
//!    non-self candidates (drawn participants keep their slice).
//! 2. When the wheel reports `Completed`, `complete()` writes the result to
//!    the store and toasts it.
//!
//! The orchestrator keeps no copy of persisted fields: who is available and
//! who has drawn always come from the latest store snapshot passed in. The
//! only local state is what the UI needs between the halves: the pending
//! draw, the last wheel phase seen, and the last revealed result.
//!
//! ERROR HANDLING
//! ==============
//! Validation failures and persistence failures are toasted and returned.
//! A draw request while one is pending is ignored silently (`Busy`, no
//! toast). Nothing is retried.

#[cfg(test)]
#[path = "draw_test.rs"]
mod tests;

use std::sync::Arc;

use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use tracing::{debug, error, info, warn};

use crate::notify::{Notifier, RESULT_TOAST_MS, Toast};
use crate::store::{Participant, People, PeopleStore, StoreError};
use crate::wheel::animator::WheelError;
use crate::wheel::{SpinRequest, WheelHandle, WheelPhase, WheelView};

// =============================================================================
// POOL SELECTION
// =============================================================================

/// Wheel candidates: everyone except the current user, in id order.
#[must_use]
pub fn candidates<'a>(people: &'a People, current_user: Option<&str>) -> Vec<&'a Participant> {
    people
        .values()
        .filter(|p| Some(p.id.as_str()) != current_user)
        .collect()
}

/// Pick a uniformly random available candidate. Returns its position in
/// `candidates`, which is also its wheel segment index.
pub fn pick_segment<R: Rng + ?Sized>(candidates: &[&Participant], rng: &mut R) -> Option<usize> {
    let pool: Vec<usize> = candidates
        .iter()
        .enumerate()
        .filter(|(_, p)| p.available)
        .map(|(i, _)| i)
        .collect();
    pool.choose(rng).copied()
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum DrawError {
    #[error("a draw is already in progress")]
    Busy,
    #[error("not logged in")]
    NotLoggedIn,
    #[error("{0} has already drawn")]
    AlreadyDrawn(String),
    #[error("nobody is available")]
    NobodyAvailable,
    #[error("no draw is pending")]
    NoPendingDraw,
    #[error(transparent)]
    Wheel(#[from] WheelError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DrawError {
    /// User-facing toast, if this error is shown at all.
    #[must_use]
    pub fn toast(&self) -> Option<Toast> {
        match self {
            Self::Busy | Self::NoPendingDraw => None,
            Self::NotLoggedIn => Some(Toast::error("Log in first!")),
            Self::AlreadyDrawn(_) => Some(Toast::error("You have already drawn!")),
            Self::NobodyAvailable => Some(Toast::error("Nobody is available!")),
            Self::Wheel(_) | Self::Store(_) => Some(Toast::error("The draw failed")),
        }
    }
}

// =============================================================================
// ORCHESTRATOR
// =============================================================================

struct PendingDraw {
    drawer: String,
    winner: String,
}

struct Reveal {
    drawer: String,
    winner: String,
}

pub struct DrawOrchestrator {
    store: Arc<dyn PeopleStore>,
    wheel: WheelHandle,
    notifier: Arc<dyn Notifier>,
    rng: StdRng,
    pending: Option<PendingDraw>,
    wheel_phase: WheelPhase,
    revealed: Option<Reveal>,
}

impl DrawOrchestrator {
    #[must_use]
    pub fn new(store: Arc<dyn PeopleStore>, wheel: WheelHandle, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            wheel,
            notifier,
            rng: StdRng::from_os_rng(),
            pending: None,
            wheel_phase: WheelPhase::Idle,
            revealed: None,
        }
    }

    /// Replace the random source (seeded in tests).
    #[must_use]
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = rng;
        self
    }

    /// True from the moment a spin is requested until the wheel is back at rest.
    #[must_use]
    pub fn is_spinning(&self) -> bool {
        self.pending.is_some() || self.wheel_phase != WheelPhase::Idle
    }

    /// Result revealed to `user` in this session, if any.
    #[must_use]
    pub fn result_for(&self, user: &str) -> Option<&str> {
        self.revealed
            .as_ref()
            .filter(|r| r.drawer == user)
            .map(|r| r.winner.as_str())
    }

    fn has_drawn(&self, user: &str, people: &People) -> bool {
        self.result_for(user).is_some() || people.get(user).is_some_and(Participant::has_drawn)
    }

    /// Whether the spin action should be offered to `current_user`.
    #[must_use]
    pub fn can_spin(&self, current_user: Option<&str>, people: &People) -> bool {
        current_user.is_some_and(|user| !self.is_spinning() && !self.has_drawn(user, people))
    }

    /// Start a draw for `current_user` against the latest snapshot.
    /// Returns the chosen winner; the result is persisted later by
    /// [`DrawOrchestrator::complete`].
    ///
    /// # Errors
    ///
    /// `Busy` while a draw is in flight; `NotLoggedIn`, `AlreadyDrawn`, and
    /// `NobodyAvailable` for validation; `Wheel` if the wheel task is gone.
    pub async fn draw(&mut self, current_user: Option<&str>, people: &People) -> Result<String, DrawError> {
        let result = self.start(current_user, people).await;
        if let Err(e) = &result {
            debug!(error = %e, "draw: not started");
            if let Some(toast) = e.toast() {
                self.notifier.notify(toast);
            }
        }
        result
    }

    async fn start(&mut self, current_user: Option<&str>, people: &People) -> Result<String, DrawError> {
        if self.is_spinning() {
            return Err(DrawError::Busy);
        }
        let drawer = current_user.ok_or(DrawError::NotLoggedIn)?;
        if self.has_drawn(drawer, people) {
            return Err(DrawError::AlreadyDrawn(drawer.to_owned()));
        }

        let candidates = candidates(people, Some(drawer));
        let index = pick_segment(&candidates, &mut self.rng).ok_or(DrawError::NobodyAvailable)?;
        let winner = candidates[index].id.clone();

        self.wheel
            .spin(SpinRequest { winner: winner.clone(), segment_index: index, segment_count: candidates.len() })
            .await?;
        self.wheel_phase = WheelPhase::Spinning;
        self.pending = Some(PendingDraw { drawer: drawer.to_owned(), winner: winner.clone() });

        info!(%drawer, %winner, segment = index, segments = candidates.len(), "draw: started");
        Ok(winner)
    }

    /// Track the wheel's visible phase.
    pub fn observe(&mut self, view: &WheelView) {
        self.wheel_phase = view.phase;
    }

    /// Persist the pending draw once the wheel has stopped on `winner`.
    ///
    /// # Errors
    ///
    /// `NoPendingDraw` if nothing was started; `Store` if the write is
    /// refused or the store is unreachable.
    pub async fn complete(&mut self, winner: &str) -> Result<String, DrawError> {
        let Some(pending) = self.pending.take() else {
            warn!(%winner, "draw: completion without a pending draw");
            return Err(DrawError::NoPendingDraw);
        };
        if pending.winner != winner {
            warn!(expected = %pending.winner, got = %winner, "draw: wheel reported a different winner");
        }

        match self.store.record_draw(&pending.drawer, &pending.winner).await {
            Ok(()) => {
                info!(drawer = %pending.drawer, winner = %pending.winner, "draw: recorded");
                self.notifier.notify(
                    Toast::success(format!("🎁 You drew: {}!", pending.winner)).with_duration_ms(RESULT_TOAST_MS),
                );
                let winner = pending.winner.clone();
                self.revealed = Some(Reveal { drawer: pending.drawer, winner: pending.winner });
                Ok(winner)
            }
            Err(e) => {
                error!(drawer = %pending.drawer, winner = %pending.winner, error = %e, "draw: persistence failed");
                let err = DrawError::Store(e);
                if let Some(toast) = err.toast() {
                    self.notifier.notify(toast);
                }
                Err(err)
            }
        }
    }
}
