//! Web-call dialog value object
//!
//! Holds what the presentation layer knows when it opens a live call: the
//! vendor access token for the call and the dialog title.

use serde::Serialize;

use crate::api::{ApiClient, ApiError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WebCallDialog {
    /// Vendor access token; None when the backend has not issued one yet
    pub access_token: Option<String>,
    pub title: String,
}

impl WebCallDialog {
    pub fn new(access_token: Option<String>, title: impl Into<String>) -> Self {
        Self {
            access_token: access_token.filter(|t| !t.is_empty()),
            title: title.into(),
        }
    }
}

/// Fetch the latest call record and build the dialog for joining it.
pub async fn open_web_call_for(api: &ApiClient, call_id: &str) -> Result<WebCallDialog, ApiError> {
    let call = api.get_call(call_id).await?;
    log::info!(
        "Opening web call for {} (token present: {})",
        call.id,
        call.retell_call_access_token.is_some()
    );
    Ok(WebCallDialog::new(
        call.retell_call_access_token.clone(),
        call.dialog_title(),
    ))
}
