//! Per-entity mutation coordinator.
//!
//! One [`MutationState`] is tracked per entity id. A call to
//! [`MutationCoordinator::mutate`] on an id that is already updating is a
//! silent no-op, so at most one attempt chain is ever active per id. Calls on
//! different ids are independent.
//!
//! There is no timeout: an operation that never resolves leaves its id in
//! the updating state. Callers that need a bound should wrap the operation
//! in `tokio::time::timeout` and map the elapsed case to their own
//! retryable or terminal error.

use std::collections::HashMap;
use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use studyplan_core::mutation::MutationState;
use studyplan_core::types::EntityId;
use studyplan_events::{EventBus, PlannerEvent};

use crate::config::{CoordinatorConfig, MutationOptions, RetryPolicy};
use crate::delay::{Delay, TokioDelay};
use crate::error::{ClassifyError, MutationError};

/// Result of a mutation call that did not fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome<T> {
    /// The operation succeeded; carries its authoritative result.
    Completed(T),
    /// Another attempt chain was already in flight for this id, so nothing
    /// was sent. Not an error and never shown to the user as one.
    Skipped,
}

impl<T> MutationOutcome<T> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, MutationOutcome::Skipped)
    }

    pub fn completed(self) -> Option<T> {
        match self {
            MutationOutcome::Completed(value) => Some(value),
            MutationOutcome::Skipped => None,
        }
    }
}

/// Tracks mutation state per entity id and owns the only path to the remote
/// store for status and field changes.
///
/// Designed to be wrapped in `Arc` and shared. The registry lock is never
/// held across an `.await`.
pub struct MutationCoordinator {
    states: Mutex<HashMap<EntityId, MutationState>>,
    config: CoordinatorConfig,
    delay: Arc<dyn Delay>,
    event_bus: Option<Arc<EventBus>>,
}

impl MutationCoordinator {
    /// Create a coordinator that sleeps on the tokio timer between retries.
    pub fn new(config: CoordinatorConfig) -> Self {
        Self {
            states: Mutex::new(HashMap::new()),
            config,
            delay: Arc::new(TokioDelay),
            event_bus: None,
        }
    }

    /// Replace the wait used between retries.
    pub fn with_delay(mut self, delay: Arc<dyn Delay>) -> Self {
        self.delay = delay;
        self
    }

    /// Publish every state transition on `bus`.
    pub fn with_event_bus(mut self, bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(bus);
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<EntityId, MutationState>> {
        self.states.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -----------------------------------------------------------------------
    // Status surface
    // -----------------------------------------------------------------------

    /// Current state for `id`. Unseen ids are idle.
    pub fn state(&self, id: &str) -> MutationState {
        self.registry().get(id).cloned().unwrap_or_default()
    }

    /// Snapshot of every tracked id.
    pub fn states(&self) -> HashMap<EntityId, MutationState> {
        self.registry().clone()
    }

    pub fn is_updating(&self, id: &str) -> bool {
        self.registry().get(id).is_some_and(|s| s.is_updating)
    }

    /// Dismiss the error for `id` without touching `is_updating`.
    pub fn clear_error(&self, id: &str) {
        let changed = {
            let mut registry = self.registry();
            match registry.get_mut(id) {
                Some(state) if state.error.is_some() => {
                    state.clear_error();
                    Some(state.clone())
                }
                _ => None,
            }
        };
        if let Some(state) = changed {
            self.publish(id, state);
        }
    }

    /// Drop the state of a settled id. Returns `false` (and keeps the state)
    /// while an attempt chain is in flight.
    pub fn forget(&self, id: &str) -> bool {
        let mut registry = self.registry();
        match registry.get(id) {
            Some(state) if state.is_updating => false,
            Some(_) => {
                registry.remove(id);
                true
            }
            None => true,
        }
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    /// Run `operation` for `id` with retry and deduplication.
    ///
    /// Returns [`MutationOutcome::Skipped`] without invoking `operation` when
    /// `id` is already updating. Otherwise the operation is invoked, and
    /// retryable failures are retried up to `max_retries` times, waiting
    /// `backoff_base_ms * n` before retry `n`. On final failure the composed
    /// message is stored in the state and returned; the caller rolls back any
    /// optimistic change it made.
    ///
    /// Dropping the returned future before it settles (for example when it
    /// loses a `tokio::time::timeout` or `select!`) releases the id and
    /// records a cancellation error, so the id can be retried.
    pub async fn mutate<T, E, F, Fut>(
        &self,
        id: &str,
        operation: F,
        options: MutationOptions,
    ) -> Result<MutationOutcome<T>, MutationError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ClassifyError + Display,
    {
        let Some(guard) = self.try_begin(id, &options) else {
            tracing::debug!(entity_id = id, "Mutation already in flight, skipping");
            return Ok(MutationOutcome::Skipped);
        };
        self.run_attempts(guard, operation)
            .await
            .map(MutationOutcome::Completed)
    }

    /// User-initiated retry after a failed mutation.
    ///
    /// Starts a fresh attempt chain with a full retry budget, superseding the
    /// stored error. The settled failure does not block it; only a chain that
    /// is genuinely in flight does.
    pub async fn retry<T, E, F, Fut>(
        &self,
        id: &str,
        operation: F,
        options: MutationOptions,
    ) -> Result<MutationOutcome<T>, MutationError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ClassifyError + Display,
    {
        let previous = self.state(id);
        if let Some(error) = &previous.error {
            tracing::info!(entity_id = id, previous_error = %error, "Retrying failed mutation");
        }
        self.mutate(id, operation, options).await
    }

    /// Atomically move `id` to updating. Returns `None` if it already was.
    ///
    /// The returned guard must be settled; dropping it unsettled marks the id
    /// as failed with a cancellation message.
    pub(crate) fn try_begin<'a>(
        &'a self,
        id: &'a str,
        options: &'a MutationOptions,
    ) -> Option<InFlight<'a>> {
        let state = {
            let mut registry = self.registry();
            let state = registry.entry(id.to_string()).or_default();
            if state.is_updating {
                return None;
            }
            state.begin();
            state.clone()
        };
        self.publish(id, state);
        Some(InFlight {
            coordinator: self,
            id,
            options,
            settled: false,
        })
    }

    /// Invoke the operation until success, a non-retryable error, or the
    /// retry budget is spent.
    pub(crate) async fn run_attempts<T, E, F, Fut>(
        &self,
        guard: InFlight<'_>,
        mut operation: F,
    ) -> Result<T, MutationError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ClassifyError + Display,
    {
        let id = guard.id;
        let options = guard.options;
        let policy = RetryPolicy::resolve(&self.config, options);
        let mut retries: u32 = 0;

        loop {
            let attempt = retries + 1;
            match operation().await {
                Ok(value) => {
                    guard.settle(MutationState::succeed);
                    tracing::debug!(entity_id = id, attempt, "Mutation succeeded");
                    return Ok(value);
                }
                Err(error) if error.is_retryable() && retries < policy.max_retries => {
                    retries += 1;
                    self.transition(id, MutationState::record_retry);
                    let backoff = policy.backoff(retries);
                    tracing::warn!(
                        entity_id = id,
                        attempt,
                        backoff_ms = backoff.as_millis() as u64,
                        error = %error,
                        "Mutation attempt failed, retrying"
                    );
                    self.delay.wait(backoff).await;
                }
                Err(error) => {
                    let message = compose_message(options, id, attempt, &error);
                    let retryable = error.is_retryable();
                    guard.settle(|state| state.fail(message.clone()));
                    tracing::error!(
                        entity_id = id,
                        attempts = attempt,
                        retryable,
                        error = %error,
                        "Mutation failed"
                    );
                    return Err(if retryable {
                        MutationError::Exhausted {
                            message,
                            attempts: attempt,
                            error,
                        }
                    } else {
                        MutationError::Rejected {
                            message,
                            attempts: attempt,
                            error,
                        }
                    });
                }
            }
        }
    }

    fn transition(&self, id: &str, apply: impl FnOnce(&mut MutationState)) {
        let state = {
            let mut registry = self.registry();
            let state = registry.entry(id.to_string()).or_default();
            apply(state);
            state.clone()
        };
        self.publish(id, state);
    }

    fn publish(&self, id: &str, state: MutationState) {
        if let Some(bus) = &self.event_bus {
            bus.publish(PlannerEvent::mutation_state_changed(id, state));
        }
    }
}

impl Default for MutationCoordinator {
    fn default() -> Self {
        Self::new(CoordinatorConfig::default())
    }
}

// ---------------------------------------------------------------------------
// In-flight guard
// ---------------------------------------------------------------------------

/// Ownership of an id's attempt chain, handed out by `try_begin`.
pub(crate) struct InFlight<'a> {
    coordinator: &'a MutationCoordinator,
    id: &'a str,
    options: &'a MutationOptions,
    settled: bool,
}

impl InFlight<'_> {
    fn settle(mut self, apply: impl FnOnce(&mut MutationState)) {
        self.settled = true;
        self.coordinator.transition(self.id, apply);
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.settled {
            return;
        }
        let message = format!(
            "Failed to {} {}: cancelled before completion",
            self.options.action_or_default(),
            self.options.label_or(self.id)
        );
        tracing::warn!(entity_id = self.id, "Mutation dropped before settling");
        self.coordinator
            .transition(self.id, |state| state.fail(message));
    }
}

fn compose_message(
    options: &MutationOptions,
    id: &str,
    attempts: u32,
    error: &impl Display,
) -> String {
    let action = options.action_or_default();
    let label = options.label_or(id);
    if attempts > 1 {
        format!("Failed to {action} {label} after {attempts} attempts: {error}")
    } else {
        format!("Failed to {action} {label}: {error}")
    }
}
