//! Usage records reported by devices.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// A single button-press session on a device.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct UsageRecord {
    pub id: Uuid,
    pub device_id: Uuid,
    pub button_number: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
    pub usage_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

/// Usage record as submitted, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct NewUsageRecord {
    pub device_id: Uuid,
    pub button_number: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// Usage record that passed validation, with its derived fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUsage {
    pub device_id: Uuid,
    pub button_number: i32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_seconds: i64,
    pub usage_date: NaiveDate,
}

impl NewUsageRecord {
    /// Derive the duration and usage date, rejecting non-positive sessions.
    pub fn validate(&self) -> DomainResult<ValidatedUsage> {
        if self.button_number < 1 {
            return Err(DomainError::validation("Button number must be positive"));
        }

        let duration_seconds = session_duration_seconds(self.start_time, self.end_time)?;

        Ok(ValidatedUsage {
            device_id: self.device_id,
            button_number: self.button_number,
            start_time: self.start_time,
            end_time: self.end_time,
            duration_seconds,
            usage_date: self.start_time.date_naive(),
        })
    }
}

/// Session length in whole seconds, rounded half up from milliseconds.
///
/// # Errors
/// Returns a validation error when the rounded duration is not positive.
pub fn session_duration_seconds(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<i64> {
    let millis = (end - start).num_milliseconds();
    let seconds = (millis + 500).div_euclid(1000);

    if seconds <= 0 {
        return Err(DomainError::validation(
            "Usage end time must be after start time (duration must be positive)",
        ));
    }

    Ok(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(ms: i64) -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000 + ms).unwrap()
    }

    #[test]
    fn test_duration_rounds_to_nearest_second() {
        assert_eq!(session_duration_seconds(at(0), at(90_000)).unwrap(), 90);
        assert_eq!(session_duration_seconds(at(0), at(1_499)).unwrap(), 1);
        assert_eq!(session_duration_seconds(at(0), at(1_500)).unwrap(), 2);
        assert_eq!(session_duration_seconds(at(0), at(500)).unwrap(), 1);
    }

    #[test]
    fn test_non_positive_duration_is_rejected() {
        assert!(session_duration_seconds(at(0), at(0)).is_err());
        assert!(session_duration_seconds(at(5_000), at(0)).is_err());
        // Rounds down to zero seconds
        assert!(session_duration_seconds(at(0), at(499)).is_err());
    }

    #[test]
    fn test_validate_derives_usage_date_from_start() {
        let start = Utc.with_ymd_and_hms(2024, 3, 31, 23, 59, 0).unwrap();
        let record = NewUsageRecord {
            device_id: Uuid::new_v4(),
            button_number: 2,
            start_time: start,
            end_time: start + Duration::minutes(3),
        };

        let validated = record.validate().unwrap();
        assert_eq!(validated.duration_seconds, 180);
        assert_eq!(validated.usage_date, NaiveDate::from_ymd_opt(2024, 3, 31).unwrap());
    }

    #[test]
    fn test_validate_rejects_button_zero() {
        let record = NewUsageRecord {
            device_id: Uuid::new_v4(),
            button_number: 0,
            start_time: at(0),
            end_time: at(10_000),
        };
        assert!(matches!(record.validate(), Err(DomainError::Validation(_))));
    }
}
