//! Session manager for live web calls
//!
//! Owns the single vendor client handle of a dialog and executes the effects
//! produced by `state_machine::reduce`. Vendor callbacks reach the manager
//! through an mpsc channel whose sender is attached to the client before the
//! call begins, so no event can be emitted before a handler exists.
//!
//! The handle is taken out of the manager before the vendor terminate
//! operation runs; callbacks racing with teardown find no handle and are
//! dropped by the reducer as stale.

use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use uuid::Uuid;

use super::vendor::{CallAudio, EventSink, SessionEvent, StartCallOptions};
use super::{
    SessionError, TranscriptAggregator, TranscriptEntry, VoiceClient, VoiceClientFactory,
    WebCallDialog,
};
use crate::state_machine::{reduce, Effect, Event, SessionStatus, State};
use crate::ui::DialogView;

/// The live vendor client together with the session it was opened for
struct ClientHandle {
    session_id: Uuid,
    client: Box<dyn VoiceClient>,
}

/// Begin-call waiting to be awaited by `start()`
struct PendingBegin {
    session_id: Uuid,
    options: StartCallOptions,
}

/// Drives one web-call dialog end to end.
pub struct SessionManager {
    dialog: WebCallDialog,
    factory: Arc<dyn VoiceClientFactory>,
    audio: CallAudio,
    state: State,
    handle: Option<ClientHandle>,
    pending_begin: Option<PendingBegin>,
    transcript: TranscriptAggregator,
    events_tx: mpsc::UnboundedSender<SessionEvent>,
    events_rx: mpsc::UnboundedReceiver<SessionEvent>,
    view_tx: watch::Sender<DialogView>,
}

impl SessionManager {
    pub fn new(dialog: WebCallDialog, factory: Arc<dyn VoiceClientFactory>) -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let state = State::default();
        let view = DialogView::build(&dialog.title, &state, &[]);
        let (view_tx, _) = watch::channel(view);

        Self {
            dialog,
            factory,
            audio: CallAudio::default(),
            state,
            handle: None,
            pending_begin: None,
            transcript: TranscriptAggregator::new(),
            events_tx,
            events_rx,
            view_tx,
        }
    }

    /// Override the audio parameters passed to begin-call
    pub fn with_audio(mut self, audio: CallAudio) -> Self {
        self.audio = audio;
        self
    }

    pub fn dialog(&self) -> &WebCallDialog {
        &self.dialog
    }

    pub fn state(&self) -> &State {
        &self.state
    }

    pub fn status(&self) -> SessionStatus {
        self.state.status()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.state.last_error()
    }

    pub fn transcript(&self) -> &[TranscriptEntry] {
        self.transcript.entries()
    }

    /// Whether a vendor client handle is currently referenced
    pub fn has_client(&self) -> bool {
        self.handle.is_some()
    }

    pub fn view(&self) -> DialogView {
        DialogView::build(&self.dialog.title, &self.state, self.transcript.entries())
    }

    /// Receive every view published after a state change
    pub fn subscribe(&self) -> watch::Receiver<DialogView> {
        self.view_tx.subscribe()
    }

    /// Start a session with the dialog's own access token
    pub async fn open(&mut self) -> Result<(), SessionError> {
        let token = self
            .dialog
            .access_token
            .clone()
            .ok_or(SessionError::MissingAccessToken)?;
        self.start(&token).await
    }

    /// Open a vendor client and begin the call.
    ///
    /// Returns once the begin-call operation settles. The session becomes
    /// `Active` only when the vendor reports `CallStarted`.
    pub async fn start(&mut self, access_token: &str) -> Result<(), SessionError> {
        if access_token.is_empty() {
            return Err(SessionError::MissingAccessToken);
        }
        if self.state.is_live() {
            log::warn!("Web call start rejected: session is {:?}", self.status());
            return Err(SessionError::AlreadyInProgress(self.status()));
        }

        self.dispatch(Event::Start {
            access_token: access_token.to_string(),
        });
        self.begin_pending().await;
        Ok(())
    }

    /// Stop the current call. Safe to call from any state.
    pub fn stop(&mut self) {
        self.dispatch(Event::Stop);
    }

    /// Dismiss the dialog: stop, then clear transcript and error
    pub fn close(&mut self) {
        self.dispatch(Event::Close);
    }

    /// Wait for the next vendor callback and apply it.
    ///
    /// Returns `None` once the session is settled and nothing is queued, since
    /// no further callbacks can arrive for it.
    pub async fn process_next(&mut self) -> Option<SessionStatus> {
        let event = match self.events_rx.try_recv() {
            Ok(event) => event,
            Err(_) if !self.state.is_live() => return None,
            Err(_) => self.events_rx.recv().await?,
        };
        self.handle_session_event(event);
        Some(self.status())
    }

    /// Apply every vendor callback already queued; returns how many were handled
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_session_event(event);
            handled += 1;
        }
        handled
    }

    fn handle_session_event(&mut self, event: SessionEvent) {
        if self.state.session_id() != Some(event.session_id) {
            log::debug!(
                "Dropping stale vendor event for session {}: {:?}",
                event.session_id,
                event.event
            );
            return;
        }
        self.dispatch(event.into_event());
    }

    async fn begin_pending(&mut self) {
        let Some(PendingBegin {
            session_id,
            options,
        }) = self.pending_begin.take()
        else {
            return;
        };

        let result = match self.handle.as_mut() {
            Some(handle) if handle.session_id == session_id => {
                log::info!(
                    "Beginning web call {} (sample_rate={})",
                    session_id,
                    options.sample_rate
                );
                handle.client.begin_call(options).await
            }
            _ => return,
        };

        if let Err(e) = result {
            log::warn!("Begin call failed for session {}: {}", session_id, e);
            self.dispatch(Event::BeginCallFailed {
                id: session_id,
                err: e.to_string(),
            });
        }
    }

    fn dispatch(&mut self, event: Event) {
        log::debug!("Web call event: {:?}", event);

        let old_status = self.state.status();
        let (next, effects) = reduce(&self.state, event);
        if old_status != next.status() {
            log::info!("Web call transition: {:?} -> {:?}", self.state, next);
        }
        self.state = next;

        for effect in effects {
            self.run_effect(effect);
        }

        // No handle may outlive a live state
        if !self.state.is_live() && self.handle.is_some() {
            log::warn!("Vendor handle survived into {:?}; releasing", self.status());
            self.release_client();
        }
    }

    fn run_effect(&mut self, effect: Effect) {
        match effect {
            Effect::OpenClient { id, access_token } => {
                // A replaced session must give up its handle first
                self.release_client();

                let sink = EventSink::new(id, self.events_tx.clone());
                let client = self.factory.create(sink);
                self.handle = Some(ClientHandle {
                    session_id: id,
                    client,
                });
                self.pending_begin = Some(PendingBegin {
                    session_id: id,
                    options: StartCallOptions::new(access_token, self.audio),
                });
            }
            Effect::ReleaseClient { id } => {
                log::debug!("Releasing vendor client for session {}", id);
                self.release_client();
            }
            Effect::ReplaceTranscript { fragments } => {
                self.transcript.apply_update(&fragments);
            }
            Effect::ClearTranscript => self.transcript.clear(),
            Effect::EmitUi => {
                self.view_tx.send_replace(self.view());
            }
        }
    }

    /// Drop the handle reference, then terminate it (errors swallowed)
    fn release_client(&mut self) {
        let Some(mut handle) = self.handle.take() else {
            return;
        };
        self.pending_begin = None;

        if let Err(e) = handle.client.stop_call() {
            log::debug!(
                "Ignoring teardown error for session {}: {}",
                handle.session_id,
                e
            );
        }
        log::info!("Vendor client released for session {}", handle.session_id);
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        // Dialog discarded without close(): audio must still be released
        self.release_client();
    }
}
