//! Notification preferences shared across the application.
//!
//! Changes are broadcast on the event bus as a single payload shape rather
//! than read from ambient global state.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::schedule::ClockTime;

/// Longest allowed reminder lead time: one week.
pub const MAX_REMINDER_LEAD_MINUTES: u32 = 7 * 24 * 60;

/// Default reminder lead time before an assignment or exam is due.
pub const DEFAULT_REMINDER_LEAD_MINUTES: u32 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuietHours {
    pub start: ClockTime,
    pub end: ClockTime,
}

impl QuietHours {
    /// Whether `time` falls inside the quiet window. Windows where
    /// `start > end` wrap past midnight.
    pub fn contains(&self, time: ClockTime) -> bool {
        if self.start <= self.end {
            self.start <= time && time < self.end
        } else {
            time >= self.start || time < self.end
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPreferences {
    pub enabled: bool,
    pub reminder_lead_minutes: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quiet_hours: Option<QuietHours>,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            enabled: true,
            reminder_lead_minutes: DEFAULT_REMINDER_LEAD_MINUTES,
            quiet_hours: None,
        }
    }
}

impl NotificationPreferences {
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.reminder_lead_minutes > MAX_REMINDER_LEAD_MINUTES {
            return Err(CoreError::Validation(format!(
                "reminder_lead_minutes must be at most {MAX_REMINDER_LEAD_MINUTES}, got {}",
                self.reminder_lead_minutes
            )));
        }
        if let Some(quiet) = &self.quiet_hours {
            if quiet.start == quiet.end {
                return Err(CoreError::Validation(
                    "quiet hours must not start and end at the same time".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Whether a reminder may be delivered at `time`.
    pub fn allows_delivery_at(&self, time: ClockTime) -> bool {
        self.enabled
            && self
                .quiet_hours
                .as_ref()
                .map_or(true, |quiet| !quiet.contains(time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(raw: &str) -> ClockTime {
        raw.parse().unwrap()
    }

    #[test]
    fn defaults_are_valid() {
        assert!(NotificationPreferences::default().validate().is_ok());
    }

    #[test]
    fn lead_time_over_a_week_is_rejected() {
        let prefs = NotificationPreferences {
            reminder_lead_minutes: MAX_REMINDER_LEAD_MINUTES + 1,
            ..Default::default()
        };
        let msg = prefs.validate().unwrap_err().to_string();
        assert!(msg.contains("reminder_lead_minutes"));
    }

    #[test]
    fn zero_length_quiet_hours_are_rejected() {
        let prefs = NotificationPreferences {
            quiet_hours: Some(QuietHours {
                start: t("22:00"),
                end: t("22:00"),
            }),
            ..Default::default()
        };
        assert!(prefs.validate().is_err());
    }

    #[test]
    fn quiet_hours_wrapping_midnight() {
        let quiet = QuietHours {
            start: t("22:00"),
            end: t("07:00"),
        };
        assert!(quiet.contains(t("23:30")));
        assert!(quiet.contains(t("06:59")));
        assert!(!quiet.contains(t("07:00")));
        assert!(!quiet.contains(t("12:00")));
    }

    #[test]
    fn delivery_respects_enabled_and_quiet_hours() {
        let mut prefs = NotificationPreferences {
            quiet_hours: Some(QuietHours {
                start: t("12:00"),
                end: t("13:00"),
            }),
            ..Default::default()
        };
        assert!(prefs.allows_delivery_at(t("11:59")));
        assert!(!prefs.allows_delivery_at(t("12:30")));
        prefs.enabled = false;
        assert!(!prefs.allows_delivery_at(t("11:59")));
    }
}
