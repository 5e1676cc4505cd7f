//! Transcript aggregation for live web calls
//!
//! Turns vendor `update` events into the ordered log shown in the dialog.
//!
//! # Aggregation Strategy
//!
//! The vendor reports the last few sentences of the conversation on every
//! update, so each update is a snapshot, not a delta:
//!
//! - **Valid fragments**: replace the whole log (authoritative from the vendor)
//! - **No valid fragments**: the log is left as it was
//!
//! Fragments without a known role or with empty content are dropped.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{Fragment, Role};

/// One attributable utterance in the displayed transcript
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub text: String,
    pub emitted_at: DateTime<Utc>,
}

/// Holds the transcript window for the current session only
#[derive(Debug, Clone)]
pub struct TranscriptAggregator {
    /// Latest accepted snapshot, in vendor order
    entries: Vec<TranscriptEntry>,
    /// Count of snapshots that replaced the log
    update_count: u64,
}

impl Default for TranscriptAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl TranscriptAggregator {
    /// Create a new empty aggregator
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            update_count: 0,
        }
    }

    /// Process an incoming update
    ///
    /// Valid fragments replace the log; returns the resulting log.
    pub fn apply_update(&mut self, fragments: &[Fragment]) -> &[TranscriptEntry] {
        let now = Utc::now();
        let snapshot: Vec<TranscriptEntry> = fragments
            .iter()
            .filter_map(|fragment| {
                let entry = fragment_to_entry(fragment, now);
                if entry.is_none() {
                    log::debug!("TranscriptAggregator: dropping malformed fragment {:?}", fragment);
                }
                entry
            })
            .collect();

        if snapshot.is_empty() {
            return &self.entries;
        }

        self.entries = snapshot;
        self.update_count += 1;

        if self.update_count % 10 == 0 {
            log::debug!(
                "TranscriptAggregator: {} updates, {} entries in window",
                self.update_count,
                self.entries.len()
            );
        }
        &self.entries
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Get count of snapshots applied
    pub fn update_count(&self) -> u64 {
        self.update_count
    }

    /// Reset the aggregator when the dialog returns to idle or a new session starts
    pub fn clear(&mut self) {
        self.entries.clear();
        self.update_count = 0;
    }
}

/// Keep a fragment only if it has a known role and non-empty content
fn fragment_to_entry(fragment: &Fragment, now: DateTime<Utc>) -> Option<TranscriptEntry> {
    let role = fragment.role.as_deref().and_then(Role::parse)?;
    let text = fragment.content.as_deref().filter(|c| !c.is_empty())?;
    Some(TranscriptEntry {
        role,
        text: text.to_string(),
        emitted_at: now,
    })
}
