//! Day-of-week convention adapter.
//!
//! Inside the planner, day 0 is Monday. Host calendar APIs commonly number
//! days Sunday-first (day 0 = Sunday). Every translation between the two
//! goes through this module instead of being inlined at call sites.

use crate::error::CoreError;

/// Largest valid `day_of_week` value (Sunday).
pub const MAX_DAY_OF_WEEK: u8 = 6;

const DAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

const DAY_SHORT_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn check_range(day: u8, name: &str) -> Result<(), CoreError> {
    if day > MAX_DAY_OF_WEEK {
        return Err(CoreError::Validation(format!(
            "{name} must be between 0 and {MAX_DAY_OF_WEEK}, got {day}"
        )));
    }
    Ok(())
}

/// Convert a Sunday-first day index (0 = Sunday) to the planner's
/// Monday-first index.
pub fn from_sunday_first(native: u8) -> Result<u8, CoreError> {
    check_range(native, "native day index")?;
    Ok((native + 6) % 7)
}

/// Convert a planner day index (0 = Monday) to a Sunday-first index.
pub fn to_sunday_first(day_of_week: u8) -> Result<u8, CoreError> {
    check_range(day_of_week, "day_of_week")?;
    Ok((day_of_week + 1) % 7)
}

pub fn from_chrono(weekday: chrono::Weekday) -> u8 {
    weekday.num_days_from_monday() as u8
}

/// Parse an English day name or three-letter abbreviation, ignoring case.
pub fn parse_day_name(raw: &str) -> Result<u8, CoreError> {
    let needle = raw.trim().to_ascii_lowercase();
    let found = DAY_NAMES.iter().zip(DAY_SHORT_NAMES).position(|(full, short)| {
        needle == full.to_ascii_lowercase() || needle == short.to_ascii_lowercase()
    });
    match found {
        Some(idx) => Ok(idx as u8),
        None => Err(CoreError::Validation(format!(
            "unrecognized day of week '{}'",
            raw.trim()
        ))),
    }
}

/// Full English name, or `"Unknown"` for out-of-range values.
pub fn day_label(day_of_week: u8) -> &'static str {
    DAY_NAMES
        .get(usize::from(day_of_week))
        .copied()
        .unwrap_or("Unknown")
}

pub fn day_short_label(day_of_week: u8) -> &'static str {
    DAY_SHORT_NAMES
        .get(usize::from(day_of_week))
        .copied()
        .unwrap_or("???")
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Weekday;

    #[test]
    fn sunday_first_sunday_maps_to_six() {
        assert_eq!(from_sunday_first(0).unwrap(), 6);
    }

    #[test]
    fn sunday_first_monday_maps_to_zero() {
        assert_eq!(from_sunday_first(1).unwrap(), 0);
    }

    #[test]
    fn sunday_first_saturday_maps_to_five() {
        assert_eq!(from_sunday_first(6).unwrap(), 5);
    }

    #[test]
    fn conversion_round_trips_every_day() {
        for native in 0..=6 {
            let day = from_sunday_first(native).unwrap();
            assert_eq!(to_sunday_first(day).unwrap(), native);
        }
    }

    #[test]
    fn out_of_range_indices_are_rejected() {
        assert_matches!(from_sunday_first(7), Err(CoreError::Validation(_)));
        assert_matches!(to_sunday_first(9), Err(CoreError::Validation(_)));
    }

    #[test]
    fn chrono_weekdays_are_monday_first() {
        assert_eq!(from_chrono(Weekday::Mon), 0);
        assert_eq!(from_chrono(Weekday::Sun), 6);
    }

    #[test]
    fn parses_full_and_short_names() {
        assert_eq!(parse_day_name("Monday").unwrap(), 0);
        assert_eq!(parse_day_name("wed").unwrap(), 2);
        assert_eq!(parse_day_name("  SUNDAY ").unwrap(), 6);
    }

    #[test]
    fn unknown_name_is_rejected() {
        let err = parse_day_name("Funday").unwrap_err();
        assert!(err.to_string().contains("Funday"));
    }

    #[test]
    fn labels() {
        assert_eq!(day_label(0), "Monday");
        assert_eq!(day_short_label(5), "Sat");
        assert_eq!(day_label(42), "Unknown");
    }
}
