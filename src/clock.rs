//! Game-day dates. NBA schedules are keyed by the US/Eastern calendar day.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::US::Eastern;
use thiserror::Error;

#[derive(Debug, Error)]
#[error("invalid date {input:?}: expected YYYY-MM-DD")]
pub struct InvalidDate {
    pub input: String,
}

/// Today's date in US Eastern Time.
pub fn today_us_eastern() -> NaiveDate {
    eastern_date(Utc::now())
}

/// US Eastern calendar date of an instant.
pub fn eastern_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Eastern).date_naive()
}

pub fn parse_game_date(input: &str) -> Result<NaiveDate, InvalidDate> {
    let trimmed = input.trim();
    // chrono accepts unpadded fields; the API contract does not
    if trimmed.len() != 10 {
        return Err(InvalidDate {
            input: input.to_string(),
        });
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| InvalidDate {
        input: input.to_string(),
    })
}
