//! Query-string parsing shared by the list endpoints.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use common::PageRequest;

use crate::error::ApiError;

/// Which end of a day a bare `YYYY-MM-DD` date stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayBound {
    Start,
    End,
}

/// Builds a normalized page request from raw `page`/`limit` values.
///
/// Values that are not integers are treated like absent ones.
pub fn page_request(page: Option<&str>, limit: Option<&str>) -> PageRequest {
    let parse = |value: Option<&str>| {
        value
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0)
    };
    PageRequest::new(parse(page), parse(limit))
}

/// Returns the value unless it is missing or blank.
pub fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Parses an `income`/`expense` style label.
pub fn label<T: FromStr>(param: &str, value: Option<&str>) -> Result<Option<T>, ApiError> {
    value
        .map(|v| {
            v.parse().map_err(|_| {
                ApiError::BadRequest(format!(
                    "Invalid '{param}' query parameter. Must be 'income' or 'expense'."
                ))
            })
        })
        .transpose()
}

/// Parses an RFC 3339 timestamp, or a `YYYY-MM-DD` date taken as the start
/// or end of that UTC day.
pub fn date(
    param: &str,
    value: Option<&str>,
    bound: DayBound,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    let Some(value) = value else {
        return Ok(None);
    };

    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(Some(timestamp.with_timezone(&Utc)));
    }

    let day = NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| {
        ApiError::BadRequest(format!(
            "Invalid '{param}' format. Use RFC3339 (YYYY-MM-DDTHH:mm:ssZ) or YYYY-MM-DD."
        ))
    })?;
    let start = day.and_time(NaiveTime::MIN).and_utc();
    Ok(Some(match bound {
        DayBound::Start => start,
        DayBound::End => start + TimeDelta::days(1) - TimeDelta::microseconds(1),
    }))
}
