//! Simulated vendor client
//!
//! Replays a fixed script of vendor callbacks after the call begins. Used by
//! the console binary for offline runs and by integration tests.

use async_trait::async_trait;
use std::time::Duration;

use super::vendor::{EventSink, StartCallOptions, UpdatePayload, VendorEvent};
use super::{Fragment, Role, VendorError, VoiceClient, VoiceClientFactory};

/// Factory producing `StubVoiceClient`s that all replay the same script
#[derive(Debug, Clone)]
pub struct StubVoiceClientFactory {
    script: Vec<(Duration, VendorEvent)>,
}

impl StubVoiceClientFactory {
    pub fn new(script: Vec<(Duration, VendorEvent)>) -> Self {
        Self { script }
    }

    /// A short check call: connect, two transcript windows, remote hang-up
    pub fn check_call() -> Self {
        let step = Duration::from_millis(200);
        Self::new(vec![
            (step, VendorEvent::CallStarted),
            (
                step,
                VendorEvent::Update(UpdatePayload {
                    transcript: vec![Fragment::new(
                        Role::Agent,
                        "Hi, this is Dispatch with a check call. Can you give me an update on your status?",
                    )],
                }),
            ),
            (
                step,
                VendorEvent::Update(UpdatePayload {
                    transcript: vec![
                        Fragment::new(Role::Agent, "Can you give me an update on your status?"),
                        Fragment::new(Role::User, "Driving, about two hours out."),
                    ],
                }),
            ),
            (step, VendorEvent::CallEnded),
        ])
    }
}

impl VoiceClientFactory for StubVoiceClientFactory {
    fn create(&self, events: EventSink) -> Box<dyn VoiceClient> {
        Box::new(StubVoiceClient {
            events,
            script: self.script.clone(),
            task: None,
        })
    }
}

pub struct StubVoiceClient {
    events: EventSink,
    script: Vec<(Duration, VendorEvent)>,
    /// Handle to the replay task (aborted on stop/drop)
    task: Option<tokio::task::JoinHandle<()>>,
}

#[async_trait]
impl VoiceClient for StubVoiceClient {
    async fn begin_call(&mut self, options: StartCallOptions) -> Result<(), VendorError> {
        if options.access_token.is_empty() {
            return Err(VendorError::Rejected("missing access token".to_string()));
        }
        log::info!(
            "Stub: call begun for session {} at {} Hz",
            self.events.session_id(),
            options.sample_rate
        );

        let events = self.events.clone();
        let script = std::mem::take(&mut self.script);
        self.task = Some(tokio::spawn(async move {
            for (delay, event) in script {
                tokio::time::sleep(delay).await;
                if !events.emit(event) {
                    log::debug!("Stub: event channel closed");
                    break;
                }
            }
        }));
        Ok(())
    }

    fn stop_call(&mut self) -> Result<(), VendorError> {
        match self.task.take() {
            Some(task) => {
                task.abort();
                log::info!("Stub: call stopped for session {}", self.events.session_id());
                Ok(())
            }
            None => Err(VendorError::Transport("call was never started".to_string())),
        }
    }
}

impl Drop for StubVoiceClient {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
