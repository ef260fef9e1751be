use reqwest::StatusCode;
use thiserror::Error;

/// Every failure the dashboard core can report.
///
/// All variants are recoverable at the operation boundary: the
/// [`Dashboard`](crate::Dashboard) turns them into notifications.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DashboardError {
    #[error("City '{0}' was not found by the weather service")]
    CityNotFound(String),

    #[error("The request timed out")]
    RequestTimeout,

    #[error("Server error: {0}")]
    ServerError(u16),

    /// The request never received a response (connection refused, DNS, ...).
    #[error("Could not connect to the server. {0}")]
    NetworkUnavailable(String),

    /// A response or a submission did not match the expected schema.
    #[error("Invalid data: {0}")]
    Validation(String),

    #[error("City '{0}' is already in the list")]
    DuplicateCity(String),

    /// The entries backend refused a submission and explained why.
    #[error("Rejected by the server (status {status}): {detail}")]
    Rejected { status: u16, detail: String },

    #[error("The city roster is unavailable")]
    RosterUnavailable,
}

pub type DashboardResult<T> = Result<T, DashboardError>;

/// Fieldless discriminant of [`DashboardError`], cheap to copy into outcomes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    CityNotFound,
    RequestTimeout,
    ServerError,
    NetworkUnavailable,
    Validation,
    DuplicateCity,
    Rejected,
    RosterUnavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::CityNotFound => "city_not_found",
            ErrorKind::RequestTimeout => "request_timeout",
            ErrorKind::ServerError => "server_error",
            ErrorKind::NetworkUnavailable => "network_unavailable",
            ErrorKind::Validation => "validation",
            ErrorKind::DuplicateCity => "duplicate_city",
            ErrorKind::Rejected => "rejected",
            ErrorKind::RosterUnavailable => "roster_unavailable",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DashboardError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DashboardError::CityNotFound(_) => ErrorKind::CityNotFound,
            DashboardError::RequestTimeout => ErrorKind::RequestTimeout,
            DashboardError::ServerError(_) => ErrorKind::ServerError,
            DashboardError::NetworkUnavailable(_) => ErrorKind::NetworkUnavailable,
            DashboardError::Validation(_) => ErrorKind::Validation,
            DashboardError::DuplicateCity(_) => ErrorKind::DuplicateCity,
            DashboardError::Rejected { .. } => ErrorKind::Rejected,
            DashboardError::RosterUnavailable => ErrorKind::RosterUnavailable,
        }
    }

    /// Map a non-success status of a city lookup.
    pub fn from_status(status: StatusCode, city: &str) -> Self {
        match status {
            StatusCode::NOT_FOUND => DashboardError::CityNotFound(city.to_string()),
            StatusCode::REQUEST_TIMEOUT => DashboardError::RequestTimeout,
            other => DashboardError::ServerError(other.as_u16()),
        }
    }

    /// Map a reqwest failure that happened before any status was received.
    pub fn from_transport(err: &reqwest::Error, base_url: &str) -> Self {
        if err.is_timeout() {
            return DashboardError::RequestTimeout;
        }
        if let Some(status) = err.status() {
            return DashboardError::ServerError(status.as_u16());
        }
        DashboardError::NetworkUnavailable(format!(
            "Hint: the weather service may be unreachable at {base_url}."
        ))
    }
}
