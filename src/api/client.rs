//! Backend REST API client.

use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::types::{
    AgentCreateRequest, AgentRecord, CallOut, CallStartRequest, ConversationFlow, RetellAgent,
};
use super::ApiError;
use crate::settings::AppSettings;

/// JSON-over-HTTP client for the console backend.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ApiError::InvalidBaseUrl(base_url));
        }

        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self { http, base_url })
    }

    pub fn from_settings(settings: &AppSettings) -> Result<Self, ApiError> {
        Self::new(&settings.api_base_url, settings.request_timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // ------------------------------------------------------------------
    // Agents
    // ------------------------------------------------------------------

    pub async fn list_agents(&self) -> Result<Vec<AgentRecord>, ApiError> {
        self.send(self.request(Method::GET, "/api/configs/")).await
    }

    pub async fn get_agent(&self, agent_id: &str) -> Result<RetellAgent, ApiError> {
        let path = format!("/api/configs/{}", agent_id);
        self.send(self.request(Method::GET, &path)).await
    }

    pub async fn create_agent(&self, payload: &AgentCreateRequest) -> Result<RetellAgent, ApiError> {
        self.send(self.request(Method::POST, "/api/configs/").json(payload))
            .await
    }

    pub async fn update_agent(
        &self,
        agent_id: &str,
        payload: &serde_json::Map<String, Value>,
    ) -> Result<RetellAgent, ApiError> {
        let path = format!("/api/configs/{}", agent_id);
        self.send(self.request(Method::PUT, &path).json(payload))
            .await
    }

    // ------------------------------------------------------------------
    // Conversation flows
    // ------------------------------------------------------------------

    pub async fn get_conversation_flow(
        &self,
        flow_id: &str,
        version: Option<u32>,
    ) -> Result<ConversationFlow, ApiError> {
        let path = format!("/api/configs/flows/{}", flow_id);
        let request = with_version(self.request(Method::GET, &path), version);
        self.send(request).await
    }

    pub async fn update_conversation_flow(
        &self,
        flow_id: &str,
        payload: &ConversationFlow,
        version: Option<u32>,
    ) -> Result<ConversationFlow, ApiError> {
        let path = format!("/api/configs/flows/{}", flow_id);
        let request = with_version(self.request(Method::PUT, &path), version).json(payload);
        self.send(request).await
    }

    // ------------------------------------------------------------------
    // Calls
    // ------------------------------------------------------------------

    pub async fn list_calls(&self) -> Result<Vec<CallOut>, ApiError> {
        self.send(self.request(Method::GET, "/api/calls/")).await
    }

    pub async fn get_call(&self, call_id: &str) -> Result<CallOut, ApiError> {
        let path = format!("/api/calls/{}", call_id);
        self.send(self.request(Method::GET, &path)).await
    }

    pub async fn start_call(&self, payload: &CallStartRequest) -> Result<CallOut, ApiError> {
        log::info!(
            "Starting call for {} (load {})",
            payload.driver_name,
            payload.load_number
        );
        self.send(self.request(Method::POST, "/api/calls/start").json(payload))
            .await
    }

    /// Ask the backend to regenerate the structured summary of a call
    pub async fn refresh_summary(&self, call_id: &str) -> Result<CallOut, ApiError> {
        let path = format!("/api/calls/{}/refresh", call_id);
        self.send(self.request(Method::POST, &path)).await
    }

    // ------------------------------------------------------------------

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        log::debug!("{} {}", method, url);
        self.http
            .request(method, url)
            .header("Content-Type", "application/json")
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            log::warn!("API error ({}): {}", status.as_u16(), body);
            return Err(ApiError::Http {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }
}

fn with_version(request: RequestBuilder, version: Option<u32>) -> RequestBuilder {
    match version {
        Some(v) => request.query(&[("version", v)]),
        None => request,
    }
}
