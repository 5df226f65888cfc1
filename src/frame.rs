//! Frame — messages exchanged over the session websocket.
//!
//! DESIGN
//! ======
//! JSON objects tagged by `type`. Clients send commands (`login`, `spin`,
//! `logout`); the server pushes state (`view`, `wheel`) and `toast`s. The
//! server never replies to a command directly: every effect of a command
//! shows up as a later `view`, `wheel`, or `toast` frame, so a client renders
//! the same way whether a change came from itself or from another session.

#[cfg(test)]
#[path = "frame_test.rs"]
mod tests;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::notify::Toast;
use crate::store::Participant;
use crate::wheel::WheelView;
use crate::wheel::layout::WheelSegment;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientFrame {
    Login { name: String, password: String },
    Spin,
    Logout,
}

impl ClientFrame {
    /// Parse one inbound text message.
    ///
    /// # Errors
    ///
    /// Returns the serde error for malformed JSON or an unknown `type`.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Frame type for logging. Never includes credentials.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Login { .. } => "login",
            Self::Spin => "spin",
            Self::Logout => "logout",
        }
    }
}

/// Everything a client needs to render the page outside the wheel animation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionView {
    /// All participants, ordered by name. Doubles as the login name list.
    pub people: Vec<Participant>,
    pub current_user: Option<String>,
    /// Who the current user drew, once they have.
    pub assigned_to: Option<String>,
    /// Wheel slices for everyone except the current user.
    pub segments: Vec<WheelSegment>,
    pub spinning: bool,
    pub can_spin: bool,
    /// Last revealed result in this session.
    pub result: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerFrame {
    Connected { session_id: Uuid },
    View(SessionView),
    Wheel(WheelView),
    Toast(Toast),
}

impl ServerFrame {
    /// Encode as a JSON text message.
    ///
    /// # Errors
    ///
    /// Returns the serde error if encoding fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
