//! Operator input validation
//!
//! Forms are checked before anything is sent to the backend; failures are
//! reported inline and the submission is aborted.

use serde_json::{Map, Value};

use crate::api::{AgentCreateRequest, AgentRecord, CallStartRequest, RetellAgent};

/// Malformed operator input
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("{field} is required")]
    MissingField { field: &'static str },
    #[error("Invalid JSON: {0}")]
    InvalidJson(String),
    #[error("Expected a JSON object")]
    NotAnObject,
}

/// Agent fields the console lets operators edit
pub const EDITABLE_AGENT_FIELDS: [&str; 5] = [
    "agent_name",
    "voice_id",
    "voice_speed",
    "voice_temperature",
    "enable_backchannel",
];

/// Parse a free-text JSON editor into an object.
pub fn parse_json_object(text: &str) -> Result<Map<String, Value>, InputError> {
    let value: Value =
        serde_json::from_str(text).map_err(|e| InputError::InvalidJson(e.to_string()))?;
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(InputError::NotAnObject),
    }
}

/// "Start test call" form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallForm {
    pub driver_name: String,
    pub phone_number: String,
    pub load_number: String,
    pub agent_config_id: String,
}

impl CallForm {
    /// Preselect the first agent when none is chosen yet
    pub fn select_default_agent(&mut self, agents: &[AgentRecord]) {
        if self.agent_config_id.is_empty() {
            if let Some(first) = agents.first() {
                self.agent_config_id = first.id.clone();
            }
        }
    }

    pub fn to_request(&self) -> Result<CallStartRequest, InputError> {
        let driver_name = required(&self.driver_name, "Driver name")?;
        let load_number = required(&self.load_number, "Load number")?;
        let agent_config_id = required(&self.agent_config_id, "Agent")?;

        Ok(CallStartRequest {
            driver_name,
            phone_number: self.phone_number.trim().to_string(),
            load_number,
            agent_config_id,
        })
    }
}

/// Create/edit agent form
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentForm {
    pub agent: RetellAgent,
}

impl AgentForm {
    pub fn new(agent: RetellAgent) -> Self {
        Self { agent }
    }

    /// Body for creating an agent: blank name/voice are omitted
    pub fn to_create_request(&self) -> AgentCreateRequest {
        AgentCreateRequest {
            agent_name: non_blank(self.agent.agent_name.as_deref()),
            voice_id: non_blank(self.agent.voice_id.as_deref()),
        }
    }

    /// Body for updating an agent: only the editable fields the agent has set are sent
    pub fn to_update_body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        let Ok(Value::Object(all)) = serde_json::to_value(&self.agent) else {
            return body;
        };
        for field in EDITABLE_AGENT_FIELDS {
            if let Some(value) = all.get(field) {
                body.insert(field.to_string(), value.clone());
            }
        }
        body
    }
}

fn required(value: &str, field: &'static str) -> Result<String, InputError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(InputError::MissingField { field });
    }
    Ok(trimmed.to_string())
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
