//! Current notification preferences, published through the event bus.

use std::sync::Arc;

use tokio::sync::RwLock;

use studyplan_core::error::CoreError;
use studyplan_core::preferences::NotificationPreferences;

use crate::bus::{EventBus, PlannerEvent};

/// Owner of the current [`NotificationPreferences`].
///
/// Components read the latest value with [`current`](Self::current) and
/// learn about changes by subscribing to the shared [`EventBus`].
pub struct PreferencesHub {
    current: RwLock<NotificationPreferences>,
    bus: Arc<EventBus>,
}

impl PreferencesHub {
    pub fn new(initial: NotificationPreferences, bus: Arc<EventBus>) -> Self {
        Self {
            current: RwLock::new(initial),
            bus,
        }
    }

    pub async fn current(&self) -> NotificationPreferences {
        self.current.read().await.clone()
    }

    /// Validate and store new preferences, then broadcast them.
    ///
    /// Invalid preferences are rejected and nothing is published. Storing a
    /// value equal to the current one publishes nothing and returns `false`.
    pub async fn update(&self, preferences: NotificationPreferences) -> Result<bool, CoreError> {
        preferences.validate()?;

        let mut current = self.current.write().await;
        if *current == preferences {
            return Ok(false);
        }
        *current = preferences.clone();
        drop(current);

        tracing::debug!(
            enabled = preferences.enabled,
            reminder_lead_minutes = preferences.reminder_lead_minutes,
            "Notification preferences updated"
        );
        self.bus.publish(PlannerEvent::preferences_changed(preferences));
        Ok(true)
    }
}
