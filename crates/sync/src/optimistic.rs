//! Optimistic local values with rollback on failed mutations.

use std::fmt::Display;
use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use crate::config::MutationOptions;
use crate::coordinator::{MutationCoordinator, MutationOutcome};
use crate::error::{ClassifyError, MutationError};

/// A locally displayed value that may run ahead of the remote store.
///
/// Cheap to clone; clones share the same value. The lock is only held for
/// the duration of a read or write, never across an `.await`.
#[derive(Debug, Default)]
pub struct Optimistic<T> {
    value: Arc<RwLock<T>>,
}

impl<T> Clone for Optimistic<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
        }
    }
}

impl<T: Clone> Optimistic<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(value)),
        }
    }

    pub fn get(&self) -> T {
        self.value
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn set(&self, value: T) {
        *self.value.write().unwrap_or_else(PoisonError::into_inner) = value;
    }

    /// Apply `update` and return a guard that restores the previous value
    /// unless committed.
    fn apply(&self, update: impl FnOnce(&mut T)) -> Rollback<'_, T> {
        let mut guard = self.value.write().unwrap_or_else(PoisonError::into_inner);
        let snapshot = guard.clone();
        update(&mut *guard);
        Rollback {
            cell: self,
            snapshot: Some(snapshot),
        }
    }
}

/// Restores the pre-update value on drop unless [`commit`](Self::commit)ted.
struct Rollback<'a, T: Clone> {
    cell: &'a Optimistic<T>,
    snapshot: Option<T>,
}

impl<T: Clone> Rollback<'_, T> {
    fn commit(mut self, authoritative: T) {
        self.snapshot = None;
        self.cell.set(authoritative);
    }
}

impl<T: Clone> Drop for Rollback<'_, T> {
    fn drop(&mut self) {
        if let Some(snapshot) = self.snapshot.take() {
            self.cell.set(snapshot);
            tracing::debug!("Rolled back optimistic update");
        }
    }
}

impl MutationCoordinator {
    /// Apply `update` to `cell` immediately, then run `operation` through
    /// [`mutate`](Self::mutate).
    ///
    /// On success the cell is replaced with the authoritative result. On
    /// failure, or when the future is dropped before settling, it is
    /// restored to the value it held before `update`. When the call is
    /// skipped because `id` is already updating, `update` is not applied.
    pub async fn mutate_optimistic<T, E, F, Fut>(
        &self,
        id: &str,
        cell: &Optimistic<T>,
        update: impl FnOnce(&mut T),
        operation: F,
        options: MutationOptions,
    ) -> Result<MutationOutcome<T>, MutationError<E>>
    where
        T: Clone,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: ClassifyError + Display,
    {
        let Some(guard) = self.try_begin(id, &options) else {
            tracing::debug!(entity_id = id, "Mutation already in flight, skipping");
            return Ok(MutationOutcome::Skipped);
        };

        let rollback = cell.apply(update);
        let authoritative = self.run_attempts(guard, operation).await?;
        rollback.commit(authoritative.clone());
        Ok(MutationOutcome::Completed(authoritative))
    }
}
