//! Backend REST API integration for agents, conversation flows, and calls.
//!
//! This module provides:
//! - A typed JSON-over-HTTP client for the console backend
//! - Data structures for agent and call records
//!
//! Non-2xx responses are surfaced as `ApiError::Http` carrying the status
//! and the response body; there is no retry.

mod client;
mod types;

pub use client::ApiClient;
pub use types::{
    AgentCreateRequest, AgentRecord, CallOut, CallStartRequest, CallStatus, ConversationFlow,
    RetellAgent, Summary, TranscriptMessage, TranscriptRole,
};

/// Errors that can occur when talking to the backend
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Configured base URL is unusable
    #[error("Invalid API base URL: {0}")]
    InvalidBaseUrl(String),
    /// Network/HTTP transport error
    #[error("Network error: {0}")]
    Network(String),
    /// The backend answered with a non-2xx status
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },
    /// Failed to parse the response body
    #[error("Failed to parse API response: {0}")]
    Parse(String),
}

impl ApiError {
    /// HTTP status of the failed response, if the backend answered
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
