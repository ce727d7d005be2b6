use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// One entry of the job list endpoint. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct JobRecord {
    pub job_id: String,
    pub status: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, alias = "start_date", deserialize_with = "lenient_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "completion_date", deserialize_with = "lenient_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// Accepts RFC 3339 timestamps and naive ISO timestamps (read as UTC).
/// Anything else becomes `None` so one odd record cannot sink the whole list.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|v| v.as_str()).and_then(parse_timestamp))
}

pub(crate) fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(stamp) = DateTime::<FixedOffset>::parse_from_rfc3339(text) {
        return Some(stamp.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .map(|naive| naive.and_utc())
}

/// `job_id -> status code`, as returned by the statuses endpoint.
pub type JobStatuses = BTreeMap<String, String>;

/// `job_id -> log lines`, as returned by the logs endpoint.
pub type JobLogs = BTreeMap<String, Vec<String>>;

/// Caller-supplied reason for a batched request, echoed back in its event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestTag {
    Poll,
    Backfill,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    JobsListed(Result<Vec<JobRecord>, FetchError>),
    StatusesFetched {
        tag: RequestTag,
        job_ids: Vec<String>,
        result: Result<JobStatuses, FetchError>,
    },
    LogsFetched {
        tag: RequestTag,
        job_ids: Vec<String>,
        result: Result<JobLogs, FetchError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Decode,
    Network,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Decode => write!(f, "malformed response body"),
            FailureKind::Network => write!(f, "network error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn timestamps_with_and_without_offset_parse() {
        let expected = Utc.with_ymd_and_hms(2021, 9, 8, 12, 34, 56).unwrap();
        assert_eq!(parse_timestamp("2021-09-08T12:34:56Z"), Some(expected));
        assert_eq!(parse_timestamp("2021-09-08T14:34:56+02:00"), Some(expected));
        assert_eq!(parse_timestamp("2021-09-08T12:34:56"), Some(expected));
        assert_eq!(parse_timestamp("2021-09-08 12:34:56"), Some(expected));
        assert_eq!(
            parse_timestamp("2021-09-08T12:34:56.123"),
            Some(expected + chrono::Duration::milliseconds(123))
        );
        assert_eq!(parse_timestamp("yesterday"), None);
    }
}
