use thiserror::Error;

/// Application-wide error types.
///
/// Every variant except the configuration ones represents a *hard* failure: the
/// remote call did not complete and the run cannot continue safely. Calls that
/// complete with a non-success status code on a mutation endpoint are not errors
/// at all; they travel as [`OperationOutcome`](crate::models::OperationOutcome)s
/// and are reported by [`report_failures`](crate::report::report_failures).
///
/// # Error Conversion
///
/// - `serde_json::Error` → `AppError::SerializationError`
///
/// Transport errors are mapped by the client crate into `Timeout`,
/// `NetworkError` or `ClientError`.
///
/// # Examples
///
/// ```
/// use lockdown_core::error::AppError;
///
/// fn example() -> Result<(), AppError> {
///     Err(AppError::TemplateNotFound("tpl-42".to_string()))
/// }
///
/// assert!(example().is_err());
/// ```
#[derive(Error, Debug)]
pub enum AppError {
    /// HTTP client request failed.
    ///
    /// Raised for transport problems that are neither timeouts nor connection
    /// failures, and for responses whose body could not be decoded.
    #[error("API Client error: {0}")]
    ClientError(String),

    /// A read endpoint answered with a non-success status.
    ///
    /// Listing and template lookups must succeed for the run to make sense, so
    /// this is a hard failure, unlike a non-success status from a mutation.
    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    /// JSON serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// The service base URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// The requested permission template does not exist on the service.
    #[error("Permission template not found: {0}")]
    TemplateNotFound(String),

    /// A run option is outside the range the service accepts.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Network or connection error.
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Request timeout.
    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    /// A background task panicked or was aborted before it could be joined.
    #[error("Background task failed: {0}")]
    TaskFailed(String),
}

impl AppError {
    /// Returns a user-friendly error message suitable for CLI output.
    pub fn user_message(&self) -> String {
        match self {
            AppError::ClientError(msg) => {
                if msg.contains("timeout") || msg.contains("timed out") {
                    "Request timed out. The service may be slow or unreachable.\n   Try a larger --read-timeout.".to_string()
                } else if msg.contains("connect") {
                    format!("Cannot connect to service: {}\n   Check your network and the --base-url.", msg)
                } else {
                    format!("API error: {}", msg)
                }
            }
            AppError::HttpStatus { status, url } => match *status {
                401 => "Authentication failed.\n   Check your LOCKDOWN_TOKEN environment variable."
                    .to_string(),
                403 => format!(
                    "Access denied by {}.\n   The token needs administer permissions.",
                    url
                ),
                _ => format!("The service answered HTTP {} for {}", status, url),
            },
            AppError::TemplateNotFound(id) => {
                format!(
                    "Permission template '{}' does not exist.\n   Check the --template-id value.",
                    id
                )
            }
            AppError::InvalidUrl(url) => {
                format!(
                    "Invalid service URL: {}\n   Example: https://projects.example.com",
                    url
                )
            }
            AppError::NetworkError(msg) => {
                format!("Network error: {}\n   Check your internet connection.", msg)
            }
            AppError::Timeout(ms) => {
                format!(
                    "Request timed out after {} ms.\n   The server may be overloaded. Try again later.",
                    ms
                )
            }
            _ => self.to_string(),
        }
    }

    /// Returns true if this error aborts a run once the core has started.
    ///
    /// Configuration and template errors are startup failures and are raised
    /// before any project is touched.
    ///
    /// # Examples
    ///
    /// ```
    /// use lockdown_core::error::AppError;
    ///
    /// assert!(AppError::NetworkError("connection reset".to_string()).is_hard_failure());
    /// assert!(!AppError::InvalidConfig("page size".to_string()).is_hard_failure());
    /// ```
    pub fn is_hard_failure(&self) -> bool {
        !matches!(
            self,
            AppError::InvalidConfig(_) | AppError::TemplateNotFound(_) | AppError::InvalidUrl(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AppError::TemplateNotFound("tpl-1".to_string());
        assert_eq!(err.to_string(), "Permission template not found: tpl-1");
    }

    #[test]
    fn test_http_status_display() {
        let err = AppError::HttpStatus {
            status: 500,
            url: "https://example.com/api/projects/search".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 500 from https://example.com/api/projects/search"
        );
    }

    #[test]
    fn test_user_message_unauthorized() {
        let err = AppError::HttpStatus {
            status: 401,
            url: "https://example.com".to_string(),
        };
        assert!(err.user_message().contains("LOCKDOWN_TOKEN"));
    }

    #[test]
    fn test_user_message_template() {
        let err = AppError::TemplateNotFound("abc".to_string());
        assert!(err.user_message().contains("--template-id"));
    }

    #[test]
    fn test_error_from_serde() {
        let result: Result<serde_json::Value, _> = serde_json::from_str("{ invalid json }");
        let app_err: AppError = result.unwrap_err().into();
        assert!(matches!(app_err, AppError::SerializationError(_)));
    }

    #[test]
    fn test_is_hard_failure() {
        assert!(AppError::Timeout(120_000).is_hard_failure());
        assert!(AppError::ClientError("boom".to_string()).is_hard_failure());
        assert!(!AppError::TemplateNotFound("x".to_string()).is_hard_failure());
        assert!(!AppError::InvalidUrl("x".to_string()).is_hard_failure());
    }

    #[test]
    fn test_timeout_error() {
        let err = AppError::Timeout(120_000);
        assert_eq!(err.to_string(), "Request timed out after 120000 ms");
    }
}
