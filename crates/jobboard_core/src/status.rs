use std::fmt;
use std::str::FromStr;

/// Lifecycle status reported by the backend for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StatusCode {
    InQueue,
    Uploading,
    Processing,
    Parsing,
    Completed,
    Failed,
    /// A code this board does not know. Treated as non-terminal.
    Unknown(String),
}

impl StatusCode {
    pub fn parse(code: &str) -> Self {
        match code.trim() {
            "INQ" => StatusCode::InQueue,
            "UPL" => StatusCode::Uploading,
            "PRO" => StatusCode::Processing,
            "PAR" => StatusCode::Parsing,
            "COM" => StatusCode::Completed,
            "FAI" => StatusCode::Failed,
            other => StatusCode::Unknown(other.to_string()),
        }
    }

    /// Wire code as sent by the backend.
    pub fn code(&self) -> &str {
        match self {
            StatusCode::InQueue => "INQ",
            StatusCode::Uploading => "UPL",
            StatusCode::Processing => "PRO",
            StatusCode::Parsing => "PAR",
            StatusCode::Completed => "COM",
            StatusCode::Failed => "FAI",
            StatusCode::Unknown(code) => code,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            StatusCode::InQueue => "In Queue",
            StatusCode::Uploading => "Uploading",
            StatusCode::Processing => "Processing",
            StatusCode::Parsing => "Parsing",
            StatusCode::Completed => "Complete",
            StatusCode::Failed => "Failed",
            StatusCode::Unknown(code) => code,
        }
    }

    /// True iff no further transition can occur (COM or FAI).
    pub fn is_terminal(&self) -> bool {
        matches!(self, StatusCode::Completed | StatusCode::Failed)
    }
}

impl FromStr for StatusCode {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(StatusCode::parse(s))
    }
}

impl From<&str> for StatusCode {
    fn from(code: &str) -> Self {
        StatusCode::parse(code)
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
