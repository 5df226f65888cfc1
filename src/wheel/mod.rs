//! The draw wheel: targeting math, segment layout, and the spin animator.

pub mod animator;
pub mod geometry;
pub mod layout;

use std::time::Duration;

pub use animator::{SpinRequest, WheelEvent, WheelHandle, WheelPhase, WheelView, spawn_wheel};

pub const DEFAULT_SPIN_MS: u64 = 4200;
pub const DEFAULT_TRANSITION_MS: u64 = 4000;
pub const DEFAULT_RESET_MS: u64 = 100;

/// Timing and magnitude of a spin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WheelConfig {
    /// Extra full rotations added to every target angle.
    pub full_turns: u32,
    /// Wall-clock time from spin start until completion is reported.
    pub spin_duration: Duration,
    /// Length of the eased rotation transition shown to clients.
    pub transition: Duration,
    /// Pause between completion and the snap back to 0°.
    pub reset_delay: Duration,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            full_turns: geometry::DEFAULT_FULL_TURNS,
            spin_duration: Duration::from_millis(DEFAULT_SPIN_MS),
            transition: Duration::from_millis(DEFAULT_TRANSITION_MS),
            reset_delay: Duration::from_millis(DEFAULT_RESET_MS),
        }
    }
}
