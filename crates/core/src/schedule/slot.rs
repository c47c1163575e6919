//! Weekly time slots and the pairwise overlap test.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::weekday::{day_short_label, MAX_DAY_OF_WEEK};
use crate::error::CoreError;

// ---------------------------------------------------------------------------
// ClockTime
// ---------------------------------------------------------------------------

const MINUTES_PER_HOUR: u16 = 60;
const HOURS_PER_DAY: u16 = 24;

/// A wall-clock time of day with minute precision.
///
/// Stored as minutes since midnight, so ordering matches the lexicographic
/// ordering of the zero-padded `"HH:MM"` form. Serializes as that string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(u16);

impl ClockTime {
    /// Build from hour and minute components.
    pub fn new(hour: u8, minute: u8) -> Result<Self, CoreError> {
        if u16::from(hour) >= HOURS_PER_DAY {
            return Err(CoreError::Validation(format!(
                "hour must be between 0 and 23, got {hour}"
            )));
        }
        if u16::from(minute) >= MINUTES_PER_HOUR {
            return Err(CoreError::Validation(format!(
                "minute must be between 0 and 59, got {minute}"
            )));
        }
        Ok(Self(u16::from(hour) * MINUTES_PER_HOUR + u16::from(minute)))
    }

    pub fn hour(&self) -> u8 {
        (self.0 / MINUTES_PER_HOUR) as u8
    }

    pub fn minute(&self) -> u8 {
        (self.0 % MINUTES_PER_HOUR) as u8
    }

    /// Minutes elapsed since midnight.
    pub fn minutes_since_midnight(&self) -> u16 {
        self.0
    }
}

impl FromStr for ClockTime {
    type Err = CoreError;

    /// Parse `"HH:MM"`, also accepting a single-digit hour (`"9:05"`) as
    /// produced by timetable recognition.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || CoreError::Validation(format!("invalid time '{trimmed}', expected HH:MM"));

        let (hour, minute) = trimmed.split_once(':').ok_or_else(invalid)?;
        if hour.is_empty() || hour.len() > 2 || minute.len() != 2 {
            return Err(invalid());
        }
        if !hour.bytes().chain(minute.bytes()).all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let hour: u8 = hour.parse().map_err(|_| invalid())?;
        let minute: u8 = minute.parse().map_err(|_| invalid())?;
        ClockTime::new(hour, minute)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = CoreError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour(), self.minute())
    }
}

// ---------------------------------------------------------------------------
// WeeklySlot
// ---------------------------------------------------------------------------

/// A recurring weekly interval. Day 0 is Monday.
///
/// A slot is well-formed when `day_of_week <= 6` and `start_time < end_time`.
/// Deserialization does not enforce this; call [`WeeklySlot::validate`]
/// before handing untrusted slots to the conflict checks.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklySlot {
    pub day_of_week: u8,
    pub start_time: ClockTime,
    pub end_time: ClockTime,
}

impl WeeklySlot {
    /// Build a validated slot.
    pub fn new(
        day_of_week: u8,
        start_time: ClockTime,
        end_time: ClockTime,
    ) -> Result<Self, CoreError> {
        let slot = Self {
            day_of_week,
            start_time,
            end_time,
        };
        slot.validate()?;
        Ok(slot)
    }

    /// Parse a slot from `"HH:MM"` strings.
    pub fn parse(day_of_week: u8, start_time: &str, end_time: &str) -> Result<Self, CoreError> {
        Self::new(day_of_week, start_time.parse()?, end_time.parse()?)
    }

    /// Check the day range and that the slot starts strictly before it ends.
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.day_of_week > MAX_DAY_OF_WEEK {
            return Err(CoreError::Validation(format!(
                "day_of_week must be between 0 and {MAX_DAY_OF_WEEK}, got {}",
                self.day_of_week
            )));
        }
        if self.start_time >= self.end_time {
            return Err(CoreError::InvalidTimeRange {
                day: self.day_of_week,
                start: self.start_time.to_string(),
                end: self.end_time.to_string(),
            });
        }
        Ok(())
    }

    pub fn duration_minutes(&self) -> u16 {
        self.end_time
            .minutes_since_midnight()
            .saturating_sub(self.start_time.minutes_since_midnight())
    }
}

impl fmt::Display for WeeklySlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}-{}",
            day_short_label(self.day_of_week),
            self.start_time,
            self.end_time
        )
    }
}

// ---------------------------------------------------------------------------
// Overlap
// ---------------------------------------------------------------------------

/// Returns `true` if two slots share any time on the same day.
///
/// The comparison is strict: back-to-back slots (one ends exactly when the
/// other starts) do not overlap.
pub fn overlaps(a: &WeeklySlot, b: &WeeklySlot) -> bool {
    a.day_of_week == b.day_of_week && a.start_time < b.end_time && b.start_time < a.end_time
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    fn slot(day: u8, start: &str, end: &str) -> WeeklySlot {
        WeeklySlot::parse(day, start, end).unwrap()
    }

    // -----------------------------------------------------------------------
    // ClockTime parsing
    // -----------------------------------------------------------------------

    #[test]
    fn parses_zero_padded_time() {
        let t: ClockTime = "09:05".parse().unwrap();
        assert_eq!(t.hour(), 9);
        assert_eq!(t.minute(), 5);
        assert_eq!(t.to_string(), "09:05");
    }

    #[test]
    fn parses_single_digit_hour_and_pads_on_display() {
        let t: ClockTime = "9:30".parse().unwrap();
        assert_eq!(t.to_string(), "09:30");
    }

    #[test]
    fn trims_surrounding_whitespace() {
        let t: ClockTime = " 23:59 ".parse().unwrap();
        assert_eq!(t.minutes_since_midnight(), 23 * 60 + 59);
    }

    #[test]
    fn rejects_malformed_times() {
        for raw in ["", "0930", "24:00", "12:60", "12:5", "ab:cd", "-1:30", "123:00"] {
            assert_matches!(
                raw.parse::<ClockTime>(),
                Err(CoreError::Validation(_)),
                "expected '{raw}' to be rejected"
            );
        }
    }

    #[test]
    fn ordering_matches_zero_padded_string_ordering() {
        let times = ["00:00", "08:59", "09:00", "10:30", "12:00", "23:59"];
        for a in times {
            for b in times {
                let ta: ClockTime = a.parse().unwrap();
                let tb: ClockTime = b.parse().unwrap();
                assert_eq!(ta.cmp(&tb), a.cmp(b), "{a} vs {b}");
            }
        }
    }

    #[test]
    fn serializes_as_string() {
        let t: ClockTime = "7:00".parse().unwrap();
        assert_eq!(serde_json::to_string(&t).unwrap(), "\"07:00\"");
    }

    #[test]
    fn deserialize_rejects_bad_time() {
        assert!(serde_json::from_str::<ClockTime>("\"25:00\"").is_err());
    }

    // -----------------------------------------------------------------------
    // WeeklySlot validation
    // -----------------------------------------------------------------------

    #[test]
    fn equal_start_and_end_is_invalid_range() {
        let err = WeeklySlot::parse(0, "09:00", "09:00").unwrap_err();
        assert!(err.is_invalid_time_range());
    }

    #[test]
    fn reversed_range_is_invalid() {
        let err = WeeklySlot::parse(2, "11:00", "10:00").unwrap_err();
        assert_eq!(
            err,
            CoreError::InvalidTimeRange {
                day: 2,
                start: "11:00".into(),
                end: "10:00".into(),
            }
        );
    }

    #[test]
    fn day_out_of_range_is_rejected() {
        assert_matches!(
            WeeklySlot::parse(7, "09:00", "10:00"),
            Err(CoreError::Validation(_))
        );
    }

    #[test]
    fn slot_uses_camel_case_wire_names() {
        let json = serde_json::to_value(slot(0, "09:00", "10:30")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"dayOfWeek": 0, "startTime": "09:00", "endTime": "10:30"})
        );
    }

    #[test]
    fn duration_and_display() {
        let s = slot(4, "13:15", "14:45");
        assert_eq!(s.duration_minutes(), 90);
        assert_eq!(s.to_string(), "Fri 13:15-14:45");
    }

    // -----------------------------------------------------------------------
    // Overlap
    // -----------------------------------------------------------------------

    #[test]
    fn touching_slots_do_not_overlap() {
        let a = slot(0, "09:00", "10:30");
        let b = slot(0, "10:30", "12:00");
        assert!(!overlaps(&a, &b));
        assert!(!overlaps(&b, &a));
    }

    #[test]
    fn partially_overlapping_slots_overlap() {
        let a = slot(0, "09:00", "10:30");
        let b = slot(0, "10:00", "11:00");
        assert!(overlaps(&a, &b));
        assert!(overlaps(&b, &a));
    }

    #[test]
    fn contained_slot_overlaps() {
        let outer = slot(3, "08:00", "12:00");
        let inner = slot(3, "09:00", "10:00");
        assert!(overlaps(&outer, &inner));
        assert!(overlaps(&inner, &outer));
    }

    #[test]
    fn identical_slots_overlap() {
        let a = slot(1, "14:00", "15:00");
        assert!(overlaps(&a, &a.clone()));
    }

    #[test]
    fn different_days_never_overlap() {
        let a = slot(0, "09:00", "10:30");
        let b = slot(1, "09:00", "10:30");
        assert!(!overlaps(&a, &b));
    }

    #[test]
    fn overlap_matches_formula_and_commutes() {
        let times = ["08:00", "09:00", "09:30", "10:00", "11:00"];
        let mut slots = Vec::new();
        for (i, start) in times.iter().enumerate() {
            for end in &times[i + 1..] {
                slots.push(slot(2, start, end));
            }
        }
        for a in &slots {
            for b in &slots {
                let expected = a.start_time < b.end_time && b.start_time < a.end_time;
                assert_eq!(overlaps(a, b), expected, "{a} vs {b}");
                assert_eq!(overlaps(a, b), overlaps(b, a), "{a} vs {b}");
            }
        }
    }
}
