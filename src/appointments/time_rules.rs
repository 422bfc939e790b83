// Scheduling time rules
// Pure checks of a proposed appointment instant against clinic business
// rules; deterministic given (input, now).

use chrono::{DateTime, Datelike, Duration, Timelike, Utc, Weekday};

/// Clinic opens at 09:00
pub const OPENING_HOUR: u32 = 9;
/// Last bookable slot starts at 16:00; 17:00 itself is rejected
pub const CLOSING_HOUR: u32 = 17;
/// Appointments must be booked at least this far ahead
pub const MIN_NOTICE_HOURS: i64 = 24;

/// Distinct failure kinds, reported in the order the rules run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRuleViolation {
    InvalidFormat,
    NotFuture,
    OutsideWorkingHours,
    Weekend,
    InsufficientNotice,
    NotHourAligned,
}

impl TimeRuleViolation {
    /// Client-facing message for this violation
    pub fn message(&self) -> &'static str {
        match self {
            TimeRuleViolation::InvalidFormat => "Invalid date format",
            TimeRuleViolation::NotFuture => "Appointment date must be in the future",
            TimeRuleViolation::OutsideWorkingHours => "Appointments must be between 9 AM and 5 PM",
            TimeRuleViolation::Weekend => "Appointments cannot be scheduled on weekends",
            TimeRuleViolation::InsufficientNotice => {
                "Appointments must be scheduled at least 24 hours in advance"
            }
            TimeRuleViolation::NotHourAligned => {
                "Appointments must start at the beginning of an hour"
            }
        }
    }
}

/// Validator for proposed appointment timestamps
///
/// Hours and weekdays are evaluated in UTC; timestamps arrive as RFC 3339
/// strings and are normalized to UTC before the checks run.
pub struct TimeRuleValidator;

impl TimeRuleValidator {
    /// Parse and validate a proposed appointment timestamp
    ///
    /// Runs the rules in a fixed order, returning the first violation:
    /// parseable, in the future, within working hours, on a weekday,
    /// at least 24 hours ahead, aligned to the hour.
    pub fn validate(raw: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>, TimeRuleViolation> {
        let proposed = DateTime::parse_from_rfc3339(raw)
            .map_err(|_| TimeRuleViolation::InvalidFormat)?
            .with_timezone(&Utc);

        Self::validate_instant(proposed, now)?;
        Ok(proposed)
    }

    /// Validate an already-parsed instant against the scheduling rules
    pub fn validate_instant(
        proposed: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<(), TimeRuleViolation> {
        if proposed <= now {
            return Err(TimeRuleViolation::NotFuture);
        }

        let hour = proposed.hour();
        if hour < OPENING_HOUR || hour >= CLOSING_HOUR {
            return Err(TimeRuleViolation::OutsideWorkingHours);
        }

        match proposed.weekday() {
            Weekday::Sat | Weekday::Sun => return Err(TimeRuleViolation::Weekend),
            _ => {}
        }

        if proposed - now < Duration::hours(MIN_NOTICE_HOURS) {
            return Err(TimeRuleViolation::InsufficientNotice);
        }

        if proposed.minute() != 0 || proposed.second() != 0 || proposed.nanosecond() != 0 {
            return Err(TimeRuleViolation::NotHourAligned);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use proptest::prelude::*;

    // Monday 2025-06-02 08:00 UTC
    fn monday_morning() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 8, 0, 0).unwrap()
    }

    #[test]
    fn test_valid_weekday_slot_is_accepted() {
        let now = monday_morning();
        // Tuesday 10:00, 26 hours ahead
        let parsed = TimeRuleValidator::validate("2025-06-03T10:00:00Z", now).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2025, 6, 3, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_garbage_input_is_invalid_format() {
        let result = TimeRuleValidator::validate("next tuesday", monday_morning());
        assert_eq!(result.unwrap_err(), TimeRuleViolation::InvalidFormat);
    }

    #[test]
    fn test_past_timestamp_is_rejected() {
        let result = TimeRuleValidator::validate("2025-06-01T10:00:00Z", monday_morning());
        assert_eq!(result.unwrap_err(), TimeRuleViolation::NotFuture);
    }

    #[test]
    fn test_0859_boundary_is_outside_working_hours() {
        let result = TimeRuleValidator::validate("2025-06-03T08:59:00Z", monday_morning());
        assert_eq!(result.unwrap_err(), TimeRuleViolation::OutsideWorkingHours);
    }

    #[test]
    fn test_1700_boundary_is_outside_working_hours() {
        let result = TimeRuleValidator::validate("2025-06-03T17:00:00Z", monday_morning());
        assert_eq!(result.unwrap_err(), TimeRuleViolation::OutsideWorkingHours);
    }

    #[test]
    fn test_opening_hour_is_accepted() {
        assert!(TimeRuleValidator::validate("2025-06-03T09:00:00Z", monday_morning()).is_ok());
    }

    #[test]
    fn test_last_slot_of_the_day_is_accepted() {
        assert!(TimeRuleValidator::validate("2025-06-03T16:00:00Z", monday_morning()).is_ok());
    }

    #[test]
    fn test_saturday_is_rejected() {
        let result = TimeRuleValidator::validate("2025-06-07T10:00:00Z", monday_morning());
        assert_eq!(result.unwrap_err(), TimeRuleViolation::Weekend);
    }

    #[test]
    fn test_sunday_is_rejected() {
        let result = TimeRuleValidator::validate("2025-06-08T10:00:00Z", monday_morning());
        assert_eq!(result.unwrap_err(), TimeRuleViolation::Weekend);
    }

    #[test]
    fn test_same_day_booking_has_insufficient_notice() {
        // Monday 10:00, only two hours ahead of Monday 08:00
        let result = TimeRuleValidator::validate("2025-06-02T10:00:00Z", monday_morning());
        assert_eq!(result.unwrap_err(), TimeRuleViolation::InsufficientNotice);
    }

    #[test]
    fn test_half_hour_slot_is_rejected() {
        let result = TimeRuleValidator::validate("2025-06-03T10:30:00Z", monday_morning());
        assert_eq!(result.unwrap_err(), TimeRuleViolation::NotHourAligned);
    }

    #[test]
    fn test_seconds_component_is_rejected() {
        let result = TimeRuleValidator::validate("2025-06-03T10:00:05Z", monday_morning());
        assert_eq!(result.unwrap_err(), TimeRuleViolation::NotHourAligned);
    }

    #[test]
    fn test_offset_input_is_normalized_to_utc() {
        // 11:00+02:00 is 09:00 UTC, inside working hours
        let parsed = TimeRuleValidator::validate("2025-06-03T11:00:00+02:00", monday_morning());
        assert_eq!(
            parsed.unwrap(),
            Utc.with_ymd_and_hms(2025, 6, 3, 9, 0, 0).unwrap()
        );
    }

    proptest! {
        // Any hour-aligned weekday slot inside working hours, at least a
        // day ahead, passes every rule.
        #[test]
        fn prop_valid_slots_are_accepted(
            day_offset in 1u32..60,
            hour in OPENING_HOUR..CLOSING_HOUR,
        ) {
            let now = monday_morning();
            let proposed = (now + Duration::days(day_offset as i64))
                .date_naive()
                .and_hms_opt(hour, 0, 0)
                .unwrap()
                .and_utc();

            let result = TimeRuleValidator::validate_instant(proposed, now);
            match proposed.weekday() {
                Weekday::Sat | Weekday::Sun => {
                    prop_assert_eq!(result.unwrap_err(), TimeRuleViolation::Weekend);
                }
                _ => prop_assert!(result.is_ok()),
            }
        }

        // Misaligned minutes always fail, on whatever rule fires first.
        #[test]
        fn prop_misaligned_minutes_are_rejected(
            day_offset in 2u32..60,
            hour in OPENING_HOUR..CLOSING_HOUR,
            minute in 1u32..60,
        ) {
            let now = monday_morning();
            let proposed = (now + Duration::days(day_offset as i64))
                .date_naive()
                .and_hms_opt(hour, minute, 0)
                .unwrap()
                .and_utc();

            prop_assert!(TimeRuleValidator::validate_instant(proposed, now).is_err());
        }
    }
}
