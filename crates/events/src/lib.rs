//! Study planner event bus.
//!
//! - [`EventBus`]: in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`PlannerEvent`]: the event envelope with a typed [`EventPayload`].
//! - [`PreferencesHub`]: holds the current notification preferences and
//!   broadcasts every accepted change.

pub mod bus;
pub mod preferences;

pub use bus::{EventBus, EventPayload, PlannerEvent};
pub use preferences::PreferencesHub;
