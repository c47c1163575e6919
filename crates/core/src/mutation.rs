//! Per-entity mutation bookkeeping (attempt, retry, error).
//!
//! The state machine is `Idle -> Updating -> Idle | Failed`. A state carries
//! no entity data; the authoritative values live in the remote store.
//!
//! This type lives in `core` so the event bus can carry it without depending
//! on the coordinator crate.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// MutationState
// ---------------------------------------------------------------------------

/// Tracking state for one entity id. `Default` is idle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MutationState {
    pub is_updating: bool,
    pub error: Option<String>,
    pub retry_count: u32,
}

/// Coarse status derived from a [`MutationState`], for rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationStatus {
    Idle,
    Updating,
    Failed,
}

impl MutationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Updating => "updating",
            Self::Failed => "failed",
        }
    }
}

impl MutationState {
    pub fn status(&self) -> MutationStatus {
        if self.is_updating {
            MutationStatus::Updating
        } else if self.error.is_some() {
            MutationStatus::Failed
        } else {
            MutationStatus::Idle
        }
    }

    /// Start a new attempt chain. A previous error is superseded.
    pub fn begin(&mut self) {
        self.is_updating = true;
        self.error = None;
        self.retry_count = 0;
    }

    /// Record that another attempt is about to be made.
    pub fn record_retry(&mut self) {
        self.retry_count += 1;
    }

    pub fn succeed(&mut self) {
        self.is_updating = false;
        self.error = None;
        self.retry_count = 0;
    }

    /// Settle with an error. `retry_count` keeps the number of retries used.
    pub fn fail(&mut self, message: impl Into<String>) {
        self.is_updating = false;
        self.error = Some(message.into());
    }

    /// Dismiss the error without touching `is_updating`.
    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
