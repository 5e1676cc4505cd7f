//! State machine for live web-call sessions
//!
//! This module implements the session lifecycle using a single-writer pattern.
//! All state transitions go through the `reduce()` function, which returns
//! a new state and a list of effects to execute. The `SessionManager` in
//! `webcall::manager` owns the vendor handle and runs the effects.

use std::time::Instant;
use uuid::Uuid;

use crate::webcall::Fragment;

/// Internal state of the web-call dialog.
/// This is the authoritative state - all transitions go through the reducer.
#[derive(Debug, Clone)]
pub enum State {
    Idle,
    Connecting {
        session_id: Uuid,
    },
    Active {
        session_id: Uuid,
        started_at: Instant,
    },
    Ended {
        session_id: Uuid,
    },
    Failed {
        session_id: Uuid,
        message: String,
    },
}

impl Default for State {
    fn default() -> Self {
        State::Idle
    }
}

/// Data-free view of `State`, used for assertions and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Connecting,
    Active,
    Ended,
    Failed,
}

impl State {
    pub fn status(&self) -> SessionStatus {
        match self {
            State::Idle => SessionStatus::Idle,
            State::Connecting { .. } => SessionStatus::Connecting,
            State::Active { .. } => SessionStatus::Active,
            State::Ended { .. } => SessionStatus::Ended,
            State::Failed { .. } => SessionStatus::Failed,
        }
    }

    /// Id of the session attempt this state belongs to (None when idle)
    pub fn session_id(&self) -> Option<Uuid> {
        match self {
            State::Idle => None,
            State::Connecting { session_id }
            | State::Active { session_id, .. }
            | State::Ended { session_id }
            | State::Failed { session_id, .. } => Some(*session_id),
        }
    }

    /// True while a vendor handle may legitimately be held
    pub fn is_live(&self) -> bool {
        matches!(self, State::Connecting { .. } | State::Active { .. })
    }

    pub fn last_error(&self) -> Option<&str> {
        match self {
            State::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Events that can trigger state transitions.
/// User intents come from the presentation layer; the rest are vendor callbacks
/// tagged with the session they belong to.
#[derive(Debug, Clone)]
pub enum Event {
    /// Operator requested a web call
    Start { access_token: String },
    /// Operator pressed Stop
    Stop,
    /// Dialog dismissed
    Close,

    // Vendor events
    /// The begin-call operation rejected
    BeginCallFailed { id: Uuid, err: String },
    /// Media is flowing
    CallStarted { id: Uuid },
    /// Remote side hung up
    CallEnded { id: Uuid },
    /// New transcript window
    TranscriptUpdate { id: Uuid, fragments: Vec<Fragment> },
    /// Vendor-level failure, terminal for the session
    VendorError { id: Uuid, message: String },
}

/// Effects to be executed after a state transition.
#[derive(Debug, Clone)]
pub enum Effect {
    /// Create a vendor client and begin the call
    OpenClient { id: Uuid, access_token: String },
    /// Terminate and drop the vendor client (teardown errors are swallowed)
    ReleaseClient { id: Uuid },
    ReplaceTranscript { fragments: Vec<Fragment> },
    ClearTranscript,
    /// Signal to publish the dialog view
    EmitUi,
}

/// Reducer function: (state, event) -> (next_state, effects)
///
/// Key rules:
/// - Never mutate state directly
/// - Ignore vendor events with stale session IDs
/// - Every exit from Connecting/Active emits exactly one ReleaseClient
pub fn reduce(state: &State, event: Event) -> (State, Vec<Effect>) {
    use Effect::*;
    use Event::*;
    use State::*;

    match (state, event) {
        // -----------------
        // Start
        // -----------------
        (Idle | Ended { .. } | Failed { .. }, Start { access_token }) => {
            if access_token.is_empty() {
                return (state.clone(), vec![]);
            }
            let id = Uuid::new_v4();
            (
                Connecting { session_id: id },
                vec![ClearTranscript, OpenClient { id, access_token }, EmitUi],
            )
        }
        // Busy: rejected without side effects
        (Connecting { .. } | Active { .. }, Start { .. }) => (state.clone(), vec![]),

        // -----------------
        // Connecting
        // -----------------
        (Connecting { session_id }, CallStarted { id }) if *session_id == id => (
            Active {
                session_id: *session_id,
                started_at: Instant::now(),
            },
            vec![EmitUi],
        ),
        (Connecting { session_id }, BeginCallFailed { id, err }) if *session_id == id => (
            Failed {
                session_id: *session_id,
                message: err,
            },
            vec![ReleaseClient { id: *session_id }, EmitUi],
        ),

        // -----------------
        // Active
        // -----------------
        (Active { session_id, .. }, TranscriptUpdate { id, fragments }) if *session_id == id => {
            (state.clone(), vec![ReplaceTranscript { fragments }, EmitUi])
        }

        // -----------------
        // Connecting | Active
        // -----------------
        (
            Connecting { session_id } | Active { session_id, .. },
            CallEnded { id },
        ) if *session_id == id => (
            Ended {
                session_id: *session_id,
            },
            vec![ReleaseClient { id: *session_id }, EmitUi],
        ),
        (
            Connecting { session_id } | Active { session_id, .. },
            VendorError { id, message },
        ) if *session_id == id => (
            Failed {
                session_id: *session_id,
                message,
            },
            vec![ReleaseClient { id: *session_id }, EmitUi],
        ),
        (Connecting { session_id } | Active { session_id, .. }, Stop) => (
            Ended {
                session_id: *session_id,
            },
            vec![ReleaseClient { id: *session_id }, EmitUi],
        ),
        (Connecting { session_id } | Active { session_id, .. }, Close) => (
            Idle,
            vec![ReleaseClient { id: *session_id }, ClearTranscript, EmitUi],
        ),

        // -----------------
        // Stop / Close from a settled state
        // -----------------
        (_, Stop) => (state.clone(), vec![]),
        (_, Close) => (Idle, vec![ClearTranscript, EmitUi]),

        // -----------------
        // Stale or out-of-order vendor events (drop silently)
        // -----------------
        _ => (state.clone(), vec![]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::webcall::Role;

    fn connecting() -> (State, Uuid) {
        let id = Uuid::new_v4();
        (State::Connecting { session_id: id }, id)
    }

    fn active() -> (State, Uuid) {
        let id = Uuid::new_v4();
        (
            State::Active {
                session_id: id,
                started_at: Instant::now(),
            },
            id,
        )
    }

    fn release_count(effects: &[Effect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, Effect::ReleaseClient { .. }))
            .count()
    }

    #[test]
    fn idle_start_transitions_to_connecting() {
        let (next, effects) = reduce(
            &State::Idle,
            Event::Start {
                access_token: "tok".to_string(),
            },
        );
        assert!(matches!(next, State::Connecting { .. }));
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::OpenClient { access_token, .. } if access_token == "tok")));
        assert!(effects.iter().any(|e| matches!(e, Effect::EmitUi)));
    }

    #[test]
    fn start_with_empty_token_is_ignored() {
        let (next, effects) = reduce(
            &State::Idle,
            Event::Start {
                access_token: String::new(),
            },
        );
        assert!(matches!(next, State::Idle));
        assert!(effects.is_empty());
    }

    #[test]
    fn start_while_active_has_no_effects() {
        let (state, id) = active();
        let (next, effects) = reduce(
            &state,
            Event::Start {
                access_token: "tok".to_string(),
            },
        );
        assert!(matches!(next, State::Active { session_id, .. } if session_id == id));
        assert!(effects.is_empty());
    }

    #[test]
    fn started_moves_connecting_to_active() {
        let (state, id) = connecting();
        let (next, effects) = reduce(&state, Event::CallStarted { id });
        assert!(matches!(next, State::Active { .. }));
        assert_eq!(release_count(&effects), 0);
    }

    #[test]
    fn stale_started_is_ignored() {
        let (state, _) = connecting();
        let (next, effects) = reduce(&state, Event::CallStarted { id: Uuid::new_v4() });
        assert!(matches!(next, State::Connecting { .. }));
        assert!(effects.is_empty());
    }

    #[test]
    fn error_while_connecting_fails_directly() {
        let (state, id) = connecting();
        let (next, effects) = reduce(
            &state,
            Event::VendorError {
                id,
                message: "mic denied".to_string(),
            },
        );
        assert_eq!(next.last_error(), Some("mic denied"));
        assert_eq!(release_count(&effects), 1);
    }

    #[test]
    fn begin_call_rejection_fails_and_releases() {
        let (state, id) = connecting();
        let (next, effects) = reduce(
            &state,
            Event::BeginCallFailed {
                id,
                err: "bad token".to_string(),
            },
        );
        assert_eq!(next.status(), SessionStatus::Failed);
        assert_eq!(release_count(&effects), 1);
    }

    #[test]
    fn remote_hangup_ends_and_releases() {
        let (state, id) = active();
        let (next, effects) = reduce(&state, Event::CallEnded { id });
        assert_eq!(next.status(), SessionStatus::Ended);
        assert_eq!(release_count(&effects), 1);
    }

    #[test]
    fn stop_from_settled_state_is_noop() {
        let state = State::Ended {
            session_id: Uuid::new_v4(),
        };
        let (next, effects) = reduce(&state, Event::Stop);
        assert_eq!(next.status(), SessionStatus::Ended);
        assert!(effects.is_empty());

        let (next, effects) = reduce(&State::Idle, Event::Stop);
        assert_eq!(next.status(), SessionStatus::Idle);
        assert!(effects.is_empty());
    }

    #[test]
    fn stop_keeps_failure_message() {
        let state = State::Failed {
            session_id: Uuid::new_v4(),
            message: "boom".to_string(),
        };
        let (next, _) = reduce(&state, Event::Stop);
        assert_eq!(next.last_error(), Some("boom"));
    }

    #[test]
    fn close_while_connecting_releases_and_clears() {
        let (state, _) = connecting();
        let (next, effects) = reduce(&state, Event::Close);
        assert!(matches!(next, State::Idle));
        assert_eq!(release_count(&effects), 1);
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::ClearTranscript)));
    }

    #[test]
    fn close_from_failed_returns_to_idle_without_release() {
        let state = State::Failed {
            session_id: Uuid::new_v4(),
            message: "x".to_string(),
        };
        let (next, effects) = reduce(&state, Event::Close);
        assert!(matches!(next, State::Idle));
        assert_eq!(release_count(&effects), 0);
        assert!(next.last_error().is_none());
    }

    #[test]
    fn update_only_applies_while_active() {
        let fragments = vec![Fragment::new(Role::Agent, "Hello")];

        let (state, id) = connecting();
        let (_, effects) = reduce(
            &state,
            Event::TranscriptUpdate {
                id,
                fragments: fragments.clone(),
            },
        );
        assert!(effects.is_empty());

        let (state, id) = active();
        let (_, effects) = reduce(&state, Event::TranscriptUpdate { id, fragments });
        assert!(effects
            .iter()
            .any(|e| matches!(e, Effect::ReplaceTranscript { .. })));
    }

    #[test]
    fn restart_after_end_gets_new_session_id() {
        let old_id = Uuid::new_v4();
        let state = State::Ended { session_id: old_id };
        let (next, _) = reduce(
            &state,
            Event::Start {
                access_token: "tok".to_string(),
            },
        );
        assert!(matches!(next, State::Connecting { session_id } if session_id != old_id));
    }
}
