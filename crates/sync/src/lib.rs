//! Optimistic mutation coordination for the study planner.
//!
//! Every status toggle or field edit that must reach the remote store goes
//! through a [`MutationCoordinator`]. It keeps one [`MutationState`] per
//! entity id, drops duplicate requests while an attempt chain is in flight,
//! retries transient failures with linear backoff, and reports the final
//! error so the caller can roll back its optimistic update.
//!
//! [`MutationState`]: studyplan_core::mutation::MutationState

pub mod config;
pub mod coordinator;
pub mod delay;
pub mod error;
pub mod optimistic;

pub use config::{CoordinatorConfig, MutationOptions};
pub use coordinator::{MutationCoordinator, MutationOutcome};
pub use delay::{Delay, NoDelay, RecordingDelay, TokioDelay};
pub use error::{ClassifyError, ConfigError, MutationError, OperationError};
pub use optimistic::Optimistic;
