//! Operator console core for a voice-agent calling platform.
//!
//! - `api`: typed client for the backend REST API (agents, flows, calls)
//! - `state_machine` + `webcall`: live web-call sessions and transcript display
//! - `ui`, `forms`: presentation models and input validation

pub mod api;
pub mod forms;
pub mod settings;
pub mod state_machine;
pub mod ui;
pub mod webcall;

pub use api::{ApiClient, ApiError};
pub use settings::{load_settings, AppSettings};
pub use state_machine::{SessionStatus, State};
pub use webcall::{open_web_call_for, SessionError, SessionManager, WebCallDialog};
