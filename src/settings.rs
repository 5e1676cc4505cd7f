use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::webcall::CallAudio;

const API_BASE_ENV: &str = "CONSOLE_API_BASE";
const REQUEST_TIMEOUT_ENV: &str = "CONSOLE_REQUEST_TIMEOUT_SECS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// Base URL of the backend API host, without trailing slash.
    pub api_base_url: String,

    /// Per-request timeout for backend calls.
    pub request_timeout_secs: u64,

    /// Audio parameters passed to the vendor when a web call begins.
    pub call_audio: CallAudio,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 30,
            call_audio: CallAudio::default(),
        }
    }
}

impl AppSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Build settings from the process environment.
pub fn load_settings() -> AppSettings {
    load_settings_from(|key| std::env::var(key).ok())
}

/// Build settings from an arbitrary variable lookup; unusable values fall back to defaults.
pub fn load_settings_from(lookup: impl Fn(&str) -> Option<String>) -> AppSettings {
    let mut settings = AppSettings::default();

    if let Some(base) = lookup(API_BASE_ENV).filter(|v| !v.trim().is_empty()) {
        settings.api_base_url = base.trim().trim_end_matches('/').to_string();
    }

    if let Some(raw) = lookup(REQUEST_TIMEOUT_ENV) {
        match raw.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => settings.request_timeout_secs = secs,
            _ => log::warn!(
                "Settings: ignoring {}={:?}, using {}s",
                REQUEST_TIMEOUT_ENV,
                raw,
                settings.request_timeout_secs
            ),
        }
    }

    settings
}
