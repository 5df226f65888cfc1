//! Domain services used by the websocket route.
//!
//! ARCHITECTURE
//! ============
//! Service modules own login, draw, and per-client session logic so the
//! route handlers stay focused on protocol translation.

pub mod auth;
pub mod draw;
pub mod session;
