// handlers/protected/params.rs - query string parsing shared by the list handlers

use chrono::{DateTime, NaiveDate, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::ApiError;
use crate::services::scheduled_task_service::day_bounds;

/// Which end of a day a bare date stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayEdge {
    Start,
    End,
}

/// Parse an upper-case enum value such as `COMPLETED` from the query string.
pub fn parse_enum<T: DeserializeOwned>(field: &str, raw: &str) -> Result<T, ApiError> {
    serde_json::from_value(Value::String(raw.trim().to_ascii_uppercase()))
        .map_err(|_| ApiError::field_error(field, format!("Unknown {}: {}", field, raw)))
}

pub fn parse_day(field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::field_error(field, format!("{} must be a date (YYYY-MM-DD)", field)))
}

/// Accepts an RFC 3339 timestamp, or a bare date widened to the given edge of that UTC day.
pub fn parse_instant(field: &str, value: &str, edge: DayEdge) -> Result<DateTime<Utc>, ApiError> {
    let value = value.trim();
    if let Ok(instant) = DateTime::parse_from_rfc3339(value) {
        return Ok(instant.with_timezone(&Utc));
    }

    let (start, end) = day_bounds(parse_day(field, value).map_err(|_| {
        ApiError::field_error(
            field,
            format!("{} must be an RFC 3339 timestamp or a date", field),
        )
    })?);
    Ok(match edge {
        DayEdge::Start => start,
        DayEdge::End => end,
    })
}

/// Both ends required; reversed ranges are rejected.
pub fn parse_range(
    start: Option<&str>,
    end: Option<&str>,
) -> Result<(DateTime<Utc>, DateTime<Utc>), ApiError> {
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (
            parse_instant("startDate", start, DayEdge::Start)?,
            parse_instant("endDate", end, DayEdge::End)?,
        ),
        _ => {
            return Err(ApiError::bad_request(
                "startDate and endDate must be supplied together",
            ))
        }
    };

    if start > end {
        return Err(ApiError::field_error(
            "startDate",
            "startDate must not be after endDate",
        ));
    }
    Ok((start, end))
}
