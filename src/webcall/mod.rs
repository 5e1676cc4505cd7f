//! Live web-call sessions with streaming transcript display
//!
//! This module drives one real-time voice session per dialog through the
//! vendor SDK seam (`VoiceClient`) and keeps the transcript window for display.
//!
//! # Architecture
//!
//! ```text
//! start/stop/close ──▶ SessionManager ──▶ reduce(state, event) ──▶ effects
//!                            ▲                                        │
//!                            │                                        ▼
//!                   SessionEvent (mpsc) ◀── EventSink ◀── VoiceClient (vendor)
//!                            │
//!                            ▼
//!                   TranscriptAggregator ──▶ DialogView (watch)
//! ```
//!
//! # Failure Strategy
//!
//! - Vendor errors are terminal for the session; no automatic retry
//! - Teardown errors from the vendor handle are logged and swallowed
//! - The vendor handle is released on every exit path, including drop

mod dialog;
mod manager;
mod stub;
mod transcript_aggregator;
mod vendor;

use serde::{Deserialize, Serialize};

use crate::state_machine::SessionStatus;

pub use dialog::{open_web_call_for, WebCallDialog};
pub use manager::SessionManager;
pub use stub::{StubVoiceClient, StubVoiceClientFactory};
pub use transcript_aggregator::{TranscriptAggregator, TranscriptEntry};
pub use vendor::{
    CallAudio, EventSink, SessionEvent, StartCallOptions, UpdatePayload, VendorEvent,
    VoiceClient, VoiceClientFactory,
};

/// Speaker of an utterance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Agent,
    User,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "agent" => Some(Role::Agent),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Agent => "agent",
            Role::User => "user",
        }
    }
}

/// One role-tagged utterance unit as delivered in an `update` event.
/// Either field may be missing in upstream data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fragment {
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

impl Fragment {
    pub fn new(role: Role, content: &str) -> Self {
        Self {
            role: Some(role.as_str().to_string()),
            content: Some(content.to_string()),
        }
    }
}

/// Errors reported by the vendor SDK
#[derive(Debug, Clone, thiserror::Error)]
pub enum VendorError {
    /// The begin-call operation was refused
    #[error("Call rejected: {0}")]
    Rejected(String),
    /// Media or signalling failure
    #[error("Voice transport error: {0}")]
    Transport(String),
}

/// Errors returned by the session manager's user-facing operations
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No access token on the dialog or an empty token was supplied
    #[error("No access token available for this call")]
    MissingAccessToken,
    /// A session is already connecting or active in this dialog
    #[error("A web call is already in progress ({0:?})")]
    AlreadyInProgress(SessionStatus),
}
