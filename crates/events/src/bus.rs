//! Planner notifications over a `tokio::sync::broadcast` channel.
//!
//! The mutation coordinator and the preference store publish
//! [`PlannerEvent`]s here; views hold an `Arc<EventBus>` and subscribe.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use studyplan_core::mutation::MutationState;
use studyplan_core::preferences::NotificationPreferences;
use studyplan_core::types::{EntityId, Timestamp};

// ---------------------------------------------------------------------------
// PlannerEvent
// ---------------------------------------------------------------------------

/// Everything that can be broadcast on the bus.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventPayload {
    /// A tracked entity's mutation state changed.
    MutationStateChanged {
        entity_id: EntityId,
        state: MutationState,
    },
    /// The user's notification preferences were replaced.
    NotificationPreferencesChanged { preferences: NotificationPreferences },
}

/// An event plus the time it was created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerEvent {
    pub payload: EventPayload,
    pub timestamp: Timestamp,
}

impl PlannerEvent {
    pub fn new(payload: EventPayload) -> Self {
        Self {
            payload,
            timestamp: Utc::now(),
        }
    }

    pub fn mutation_state_changed(entity_id: impl Into<EntityId>, state: MutationState) -> Self {
        Self::new(EventPayload::MutationStateChanged {
            entity_id: entity_id.into(),
            state,
        })
    }

    pub fn preferences_changed(preferences: NotificationPreferences) -> Self {
        Self::new(EventPayload::NotificationPreferencesChanged { preferences })
    }

    /// Stable dot-separated name, useful for log fields.
    pub fn event_type(&self) -> &'static str {
        match self.payload {
            EventPayload::MutationStateChanged { .. } => "mutation.state_changed",
            EventPayload::NotificationPreferencesChanged { .. } => "preferences.changed",
        }
    }
}

// ---------------------------------------------------------------------------
// EventBus
// ---------------------------------------------------------------------------

/// Events a subscriber may fall behind by before it starts missing them.
const DEFAULT_CAPACITY: usize = 1024;

/// Shared hub for planner events.
///
/// Each receiver from [`EventBus::subscribe`] gets its own copy of every
/// event published after it subscribed.
///
/// ```rust
/// use studyplan_core::mutation::MutationState;
/// use studyplan_events::bus::{EventBus, PlannerEvent};
///
/// let bus = EventBus::default();
/// let mut view = bus.subscribe();
///
/// bus.publish(PlannerEvent::mutation_state_changed("course-1", MutationState::default()));
/// assert_eq!(view.try_recv().unwrap().event_type(), "mutation.state_changed");
/// ```
pub struct EventBus {
    sender: broadcast::Sender<PlannerEvent>,
}

impl EventBus {
    /// Bus that keeps up to `capacity` events per subscriber.
    ///
    /// A view that falls further behind loses the earliest events and its
    /// next `recv` reports `RecvError::Lagged` with the number skipped.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Fan `event` out to every view subscribed right now.
    ///
    /// Nobody listening is not an error; the event is discarded.
    pub fn publish(&self, event: PlannerEvent) {
        let event_type = event.event_type();
        if self.sender.send(event).is_err() {
            tracing::trace!(event_type, "No subscribers for event");
        }
    }

    /// New receiver for events published from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<PlannerEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
