//! Spin animator — wheel state machine and the task that drives it.
//!
//! DESIGN
//! ======
//! `Wheel` is a plain state machine (`idle → spinning → settled → idle`)
//! holding the cumulative rotation. `run_wheel` owns one `Wheel` and turns
//! `Spin` commands into a timed sequence of frames:
//!
//! 1. `spinning` frame with the target rotation and easing enabled
//! 2. after `spin_duration`: `settled` frame, then `Completed { winner }`
//! 3. after `reset_delay`: `idle` frame snapped back to 0° with easing off
//!
//! Completion is driven by a wall-clock timer, never by client render
//! acknowledgements, so a slow or absent renderer cannot stall a draw.
//!
//! LIFECYCLE
//! =========
//! A spin that has started always runs to completion. If every handle is
//! dropped mid-spin the task finishes the cycle, emits its events, and only
//! then exits.

#[cfg(test)]
#[path = "animator_test.rs"]
mod tests;

use std::time::Duration;

use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{WheelConfig, geometry};

const COMMAND_QUEUE_CAPACITY: usize = 16;
const EVENT_QUEUE_CAPACITY: usize = 64;

// =============================================================================
// STATE MACHINE
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum WheelPhase {
    Idle,
    Spinning,
    Settled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WheelInput {
    Spin,
    Elapsed,
    Reset,
}

impl WheelPhase {
    /// Transition table. `None` means the input is ignored in this phase.
    #[must_use]
    pub fn next(self, input: WheelInput) -> Option<Self> {
        match (self, input) {
            (Self::Idle, WheelInput::Spin) => Some(Self::Spinning),
            (Self::Spinning, WheelInput::Elapsed) => Some(Self::Settled),
            (Self::Settled, WheelInput::Reset) => Some(Self::Idle),
            _ => None,
        }
    }
}

/// What a client needs to render the wheel at this instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WheelView {
    pub phase: WheelPhase,
    pub rotation_deg: f64,
    /// Whether the change to `rotation_deg` should animate.
    pub eased: bool,
    pub transition_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpinRequest {
    pub winner: String,
    /// Winner's position among all wheel segments.
    pub segment_index: usize,
    pub segment_count: usize,
}

/// One animation cycle. Lives only until the wheel settles.
#[derive(Debug, Clone)]
pub struct DrawEvent {
    pub id: Uuid,
    pub winner: String,
    pub segment_index: usize,
    pub segment_count: usize,
    pub target_deg: f64,
    pub started_at: Instant,
    pub duration: Duration,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WheelError {
    #[error("wheel is not idle ({0:?})")]
    Busy(WheelPhase),
    #[error(transparent)]
    Geometry(#[from] geometry::GeometryError),
    #[error("wheel task stopped")]
    Stopped,
}

pub struct Wheel {
    config: WheelConfig,
    phase: WheelPhase,
    rotation_deg: f64,
    current: Option<DrawEvent>,
}

impl Wheel {
    #[must_use]
    pub fn new(config: WheelConfig) -> Self {
        Self { config, phase: WheelPhase::Idle, rotation_deg: 0.0, current: None }
    }

    #[must_use]
    pub fn phase(&self) -> WheelPhase {
        self.phase
    }

    #[must_use]
    pub fn rotation_deg(&self) -> f64 {
        self.rotation_deg
    }

    #[must_use]
    pub fn current(&self) -> Option<&DrawEvent> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn view(&self) -> WheelView {
        WheelView {
            phase: self.phase,
            rotation_deg: self.rotation_deg,
            eased: self.phase == WheelPhase::Spinning,
            transition_ms: u64::try_from(self.config.transition.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Start a spin toward `request.segment_index`.
    ///
    /// # Errors
    ///
    /// `Busy` unless idle; `Geometry` for an invalid segment.
    pub fn spin(&mut self, request: SpinRequest, now: Instant) -> Result<DrawEvent, WheelError> {
        let Some(next) = self.phase.next(WheelInput::Spin) else {
            return Err(WheelError::Busy(self.phase));
        };
        let target_deg = geometry::target_rotation_deg(
            request.segment_index,
            request.segment_count,
            self.rotation_deg,
            self.config.full_turns,
        )?;

        let event = DrawEvent {
            id: Uuid::new_v4(),
            winner: request.winner,
            segment_index: request.segment_index,
            segment_count: request.segment_count,
            target_deg,
            started_at: now,
            duration: self.config.spin_duration,
        };
        self.phase = next;
        self.rotation_deg = target_deg;
        self.current = Some(event.clone());
        Ok(event)
    }

    /// Stop spinning and hand back the finished cycle.
    pub fn settle(&mut self) -> Option<DrawEvent> {
        self.phase = self.phase.next(WheelInput::Elapsed)?;
        self.current.take()
    }

    /// Snap back to the 0° baseline. Returns false outside `settled`.
    pub fn reset(&mut self) -> bool {
        let Some(next) = self.phase.next(WheelInput::Reset) else {
            return false;
        };
        self.phase = next;
        self.rotation_deg = 0.0;
        true
    }
}

// =============================================================================
// TASK
// =============================================================================

enum WheelCommand {
    Spin(SpinRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub enum WheelEvent {
    Frame(WheelView),
    Completed { winner: String },
}

/// Sending side of a wheel task.
#[derive(Clone)]
pub struct WheelHandle {
    tx: mpsc::Sender<WheelCommand>,
}

impl WheelHandle {
    /// Ask the wheel to spin. Ignored by the wheel if it is not idle.
    ///
    /// # Errors
    ///
    /// Returns `Stopped` if the wheel task has exited.
    pub async fn spin(&self, request: SpinRequest) -> Result<(), WheelError> {
        self.tx
            .send(WheelCommand::Spin(request))
            .await
            .map_err(|_| WheelError::Stopped)
    }
}

/// Spawn a wheel task. Returns its handle and event stream.
#[must_use]
pub fn spawn_wheel(config: WheelConfig) -> (WheelHandle, mpsc::Receiver<WheelEvent>) {
    let (tx, rx) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
    let (event_tx, event_rx) = mpsc::channel(EVENT_QUEUE_CAPACITY);
    tokio::spawn(run_wheel(Wheel::new(config), rx, event_tx));
    (WheelHandle { tx }, event_rx)
}

async fn run_wheel(mut wheel: Wheel, mut commands: mpsc::Receiver<WheelCommand>, events: mpsc::Sender<WheelEvent>) {
    let mut deadline: Option<Instant> = None;
    let mut accepting = true;

    loop {
        if !accepting && deadline.is_none() {
            break;
        }

        tokio::select! {
            cmd = commands.recv(), if accepting => {
                let Some(WheelCommand::Spin(request)) = cmd else {
                    accepting = false;
                    continue;
                };
                match wheel.spin(request, Instant::now()) {
                    Ok(event) => {
                        info!(draw_id = %event.id, winner = %event.winner, target_deg = event.target_deg, "wheel: spin started");
                        deadline = Some(event.started_at + event.duration);
                        emit(&events, WheelEvent::Frame(wheel.view())).await;
                    }
                    Err(WheelError::Busy(phase)) => {
                        debug!(?phase, current = ?wheel.current().map(|e| e.id), "wheel: spin ignored");
                    }
                    Err(e) => warn!(error = %e, "wheel: spin rejected"),
                }
            }
            () = sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                deadline = advance(&mut wheel, &events).await;
            }
        }
    }
    debug!("wheel: task exited");
}

/// Fire the pending timer. Returns the next deadline, if any.
async fn advance(wheel: &mut Wheel, events: &mpsc::Sender<WheelEvent>) -> Option<Instant> {
    match wheel.phase() {
        WheelPhase::Spinning => {
            let event = wheel.settle()?;
            info!(draw_id = %event.id, winner = %event.winner, "wheel: settled");
            let landed = geometry::landed_segment(wheel.rotation_deg(), event.segment_count);
            if landed != Ok(event.segment_index) {
                warn!(draw_id = %event.id, expected = event.segment_index, ?landed, "wheel: pointer missed target segment");
            }
            emit(events, WheelEvent::Frame(wheel.view())).await;
            emit(events, WheelEvent::Completed { winner: event.winner }).await;
            Some(Instant::now() + wheel.config.reset_delay)
        }
        WheelPhase::Settled => {
            wheel.reset();
            emit(events, WheelEvent::Frame(wheel.view())).await;
            None
        }
        WheelPhase::Idle => None,
    }
}

async fn emit(events: &mpsc::Sender<WheelEvent>, event: WheelEvent) {
    if events.send(event).await.is_err() {
        debug!("wheel: event receiver dropped");
    }
}
