//! Presentation models for the console
//!
//! The session manager publishes a `DialogView` after every state change;
//! renderers only read these values and send intents back to the manager.

use serde::Serialize;

use crate::api::CallOut;
use crate::state_machine::State;
use crate::webcall::{Role, TranscriptEntry};

/// UI state of the live-call dialog.
/// Uses tagged union format: { "status": "idle" } or { "status": "inCall", "elapsedSecs": 5 }
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum UiState {
    Idle,
    Connecting,
    InCall {
        #[serde(rename = "elapsedSecs")]
        elapsed_secs: u64,
    },
    Ended,
    Failed {
        message: String,
    },
}

impl UiState {
    /// Text of the status chip
    pub fn chip_label(&self) -> &'static str {
        match self {
            UiState::Idle => "Idle",
            UiState::Connecting => "Connecting",
            UiState::InCall { .. } => "In Call",
            UiState::Ended => "Ended",
            UiState::Failed { .. } => "Failed",
        }
    }
}

/// Convert internal State to UiState
pub fn state_to_ui(state: &State) -> UiState {
    match state {
        State::Idle => UiState::Idle,
        State::Connecting { .. } => UiState::Connecting,
        State::Active { started_at, .. } => UiState::InCall {
            elapsed_secs: started_at.elapsed().as_secs(),
        },
        State::Ended { .. } => UiState::Ended,
        State::Failed { message, .. } => UiState::Failed {
            message: message.clone(),
        },
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptLine {
    pub role: Role,
    pub text: String,
}

/// Everything the live-call dialog renders
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DialogView {
    pub title: String,
    pub state: UiState,
    pub transcript: Vec<TranscriptLine>,
    pub error: Option<String>,
    /// Stop is only offered while connecting or in a call
    pub can_stop: bool,
}

impl DialogView {
    pub fn build(title: &str, state: &State, entries: &[TranscriptEntry]) -> Self {
        let title = if title.is_empty() { "Web Call" } else { title };
        Self {
            title: title.to_string(),
            state: state_to_ui(state),
            transcript: entries
                .iter()
                .map(|e| TranscriptLine {
                    role: e.role,
                    text: e.text.clone(),
                })
                .collect(),
            error: state.last_error().map(str::to_string),
            can_stop: state.is_live(),
        }
    }
}

/// Plain-text rendering of the dialog for terminal output
pub fn render_dialog(view: &DialogView) -> String {
    let mut out = format!("== {} [{}] ==\n", view.title, view.state.chip_label());
    if let Some(error) = &view.error {
        out.push_str(&format!("! {}\n", error));
    }
    for line in &view.transcript {
        let role = match line.role {
            Role::Agent => "Agent",
            Role::User => "User",
        };
        out.push_str(&format!("{:>6}: {}\n", role, line.text));
    }
    out
}

/// One line of the calls overview
pub fn render_call_row(call: &CallOut) -> String {
    format!(
        "{:<36}  {:<20}  load {:<10}  {:<11}  {}",
        call.id,
        call.driver_name,
        call.load_number,
        call.status.label(),
        call.started_at.as_deref().unwrap_or("-")
    )
}
