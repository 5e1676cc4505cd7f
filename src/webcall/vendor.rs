//! Vendor real-time voice SDK surface
//!
//! The vendor client is consumed only through these traits. A client is
//! constructed with its event sink already attached, so every callback the
//! vendor fires after `begin_call` lands in the manager's channel.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use uuid::Uuid;

use super::{Fragment, VendorError};
use crate::state_machine::Event;

/// Sample rate requested from the vendor for web calls
pub const DEFAULT_SAMPLE_RATE: u32 = 24_000;

/// Audio parameters that are fixed per deployment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallAudio {
    pub sample_rate: u32,
    /// The SDK plays audio itself; raw samples are not needed by the console
    pub emit_raw_audio_samples: bool,
}

impl Default for CallAudio {
    fn default() -> Self {
        Self {
            sample_rate: DEFAULT_SAMPLE_RATE,
            emit_raw_audio_samples: false,
        }
    }
}

/// Arguments of the vendor begin-call operation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCallOptions {
    pub access_token: String,
    pub sample_rate: u32,
    pub emit_raw_audio_samples: bool,
}

impl StartCallOptions {
    pub fn new(access_token: impl Into<String>, audio: CallAudio) -> Self {
        Self {
            access_token: access_token.into(),
            sample_rate: audio.sample_rate,
            emit_raw_audio_samples: audio.emit_raw_audio_samples,
        }
    }
}

/// Payload of the vendor `update` event
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UpdatePayload {
    #[serde(default)]
    pub transcript: Vec<Fragment>,
}

/// Callbacks the vendor SDK fires
#[derive(Debug, Clone)]
pub enum VendorEvent {
    CallStarted,
    CallEnded,
    Update(UpdatePayload),
    Error { message: String },
}

/// A vendor event tagged with the session attempt that produced it
#[derive(Debug, Clone)]
pub struct SessionEvent {
    pub session_id: Uuid,
    pub event: VendorEvent,
}

impl SessionEvent {
    pub(crate) fn into_event(self) -> Event {
        let id = self.session_id;
        match self.event {
            VendorEvent::CallStarted => Event::CallStarted { id },
            VendorEvent::CallEnded => Event::CallEnded { id },
            VendorEvent::Update(payload) => Event::TranscriptUpdate {
                id,
                fragments: payload.transcript,
            },
            VendorEvent::Error { message } => Event::VendorError { id, message },
        }
    }
}

/// Handler registration handed to a vendor client at construction
#[derive(Debug, Clone)]
pub struct EventSink {
    session_id: Uuid,
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl EventSink {
    pub(crate) fn new(session_id: Uuid, tx: mpsc::UnboundedSender<SessionEvent>) -> Self {
        Self { session_id, tx }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Deliver a vendor callback. Returns false once the manager is gone.
    pub fn emit(&self, event: VendorEvent) -> bool {
        self.tx
            .send(SessionEvent {
                session_id: self.session_id,
                event,
            })
            .is_ok()
    }
}

/// One vendor client handle (one real-time connection)
#[async_trait]
pub trait VoiceClient: Send {
    /// Begin the call. Success only means the request was accepted; media
    /// flowing is signalled later by `VendorEvent::CallStarted`.
    async fn begin_call(&mut self, options: StartCallOptions) -> Result<(), VendorError>;

    /// Terminate the call and release audio resources
    fn stop_call(&mut self) -> Result<(), VendorError>;
}

/// Constructs vendor clients with their handlers attached
pub trait VoiceClientFactory: Send + Sync + 'static {
    fn create(&self, events: EventSink) -> Box<dyn VoiceClient>;
}
