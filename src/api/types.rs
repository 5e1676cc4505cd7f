//! Data structures exchanged with the backend REST API.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form structured summary produced by the backend after a call
pub type Summary = Map<String, Value>;

/// Conversation flow document; edited as raw JSON by operators
pub type ConversationFlow = Map<String, Value>;

// ============================================================================
// Agents
// ============================================================================

/// Agent registered with the backend (`GET /api/configs/`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentRecord {
    /// Backend config id, used as `agent_config_id` when starting calls
    pub id: String,
    /// Vendor agent id
    pub agent_id: String,
    #[serde(default)]
    pub agent_name: Option<String>,
}

impl AgentRecord {
    /// Name shown in agent pickers
    pub fn display_name(&self) -> &str {
        match self.agent_name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.agent_id,
        }
    }
}

/// Vendor agent as returned by the config endpoints.
/// Fields the console does not edit are kept verbatim in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetellAgent {
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_speed: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_backchannel: Option<bool>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Body of `POST /api/configs/`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentCreateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,
}

// ============================================================================
// Calls
// ============================================================================

/// Lifecycle of a backend call record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Queued,
    NotJoined,
    InProgress,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl CallStatus {
    pub fn label(&self) -> &'static str {
        match self {
            CallStatus::Queued => "Queued",
            CallStatus::NotJoined => "Not Joined",
            CallStatus::InProgress => "In Progress",
            CallStatus::Completed => "Completed",
            CallStatus::Failed => "Failed",
            CallStatus::Unknown => "Unknown",
        }
    }
}

/// Speaker tag in a stored call transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptRole {
    Agent,
    Driver,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptMessage {
    pub role: TranscriptRole,
    pub text: String,
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// Body of `POST /api/calls/start`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallStartRequest {
    pub driver_name: String,
    pub phone_number: String,
    pub load_number: String,
    pub agent_config_id: String,
}

/// Call record returned by the calls endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallOut {
    pub id: String,
    pub driver_name: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    pub load_number: String,
    pub agent_config_id: String,
    pub status: CallStatus,
    #[serde(default)]
    pub retell_call_id: Option<String>,
    #[serde(default)]
    pub retell_call_access_token: Option<String>,
    #[serde(default)]
    pub summary: Option<Summary>,
    #[serde(default)]
    pub transcript: Option<Vec<TranscriptMessage>>,
    #[serde(default)]
    pub started_at: Option<String>,
    #[serde(default)]
    pub completed_at: Option<String>,
}

impl CallOut {
    /// Title of the live-call dialog for this call
    pub fn dialog_title(&self) -> String {
        format!("{} - Load {}", self.driver_name, self.load_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_call_out_parses_backend_row() {
        let call: CallOut = serde_json::from_str(
            r#"{
                "id": "c1",
                "driver_name": "Mike",
                "load_number": "7890",
                "agent_config_id": "a1",
                "status": "not_joined",
                "retell_call_access_token": "tok",
                "driver_status": "Not Joined",
                "started_at": "2026-10-01T12:00:00Z"
            }"#,
        )
        .unwrap();
        assert_eq!(call.status, CallStatus::NotJoined);
        assert_eq!(call.retell_call_access_token.as_deref(), Some("tok"));
        assert_eq!(call.dialog_title(), "Mike - Load 7890");
    }

    #[test]
    fn test_unknown_status_does_not_fail_parsing() {
        let status: CallStatus = serde_json::from_str(r#""archived""#).unwrap();
        assert_eq!(status, CallStatus::Unknown);
    }

    #[test]
    fn test_retell_agent_keeps_unedited_fields() {
        let agent: RetellAgent = serde_json::from_str(
            r#"{"agent_id":"ag_1","agent_name":"Dispatch","response_engine":{"type":"conversation-flow"}}"#,
        )
        .unwrap();
        assert_eq!(agent.agent_name.as_deref(), Some("Dispatch"));
        assert!(agent.extra.contains_key("response_engine"));

        let back = serde_json::to_value(&agent).unwrap();
        assert_eq!(back["response_engine"]["type"], "conversation-flow");
    }

    #[test]
    fn test_agent_display_name_falls_back_to_agent_id() {
        let record = AgentRecord {
            id: "1".to_string(),
            agent_id: "ag_1".to_string(),
            agent_name: Some(String::new()),
        };
        assert_eq!(record.display_name(), "ag_1");
    }
}
