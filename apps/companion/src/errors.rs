use std::time::Duration;

use thiserror::Error;

/// Shown when the backend gives no usable `detail` message.
pub const FALLBACK_MESSAGE: &str = "Something went wrong during analysis. Please check if the backend is running and the API key is set.";

/// Every way an analysis run can fail.
///
/// The workflow collapses all variants into one user-visible message via
/// [`AnalysisError::user_message`]; the variants exist for logging and tests.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{endpoint} rejected the request (status {status})")]
    Rejected {
        endpoint: &'static str,
        status: u16,
        detail: Option<String>,
    },

    #[error("malformed response from {endpoint}: {source}")]
    Malformed {
        endpoint: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("analysis timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("analysis cancelled")]
    Cancelled,

    #[error("failed to read resume file: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalysisError {
    /// The backend-supplied detail message, if it sent a non-empty one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            AnalysisError::Rejected {
                detail: Some(detail),
                ..
            } if !detail.is_empty() => Some(detail.as_str()),
            _ => None,
        }
    }

    /// The single message surfaced to the user for this failure.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::TimedOut(after) => {
                format!("Analysis timed out after {} seconds.", after.as_secs())
            }
            AnalysisError::Cancelled => "Analysis was cancelled.".to_string(),
            _ => self
                .detail()
                .map(str::to_string)
                .unwrap_or_else(|| FALLBACK_MESSAGE.to_string()),
        }
    }
}
