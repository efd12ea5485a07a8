//! Analysis Backend: the only path from the workflow to the network.
//!
//! The workflow controller depends on the `AnalysisBackend` trait, never on
//! `reqwest` directly, so the HTTP client can be swapped for a scripted double
//! in tests.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::AnalysisError;
use crate::models::{CareerCompanionReport, SelectedFile};

pub mod http;

pub use http::HttpBackend;

pub const PARSE_RESUME_PATH: &str = "/parse-resume";
pub const ANALYZE_FULL_PATH: &str = "/analyze-full";

/// Success body of `/parse-resume`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseResumeResponse {
    pub resume_text: String,
}

/// JSON body of `/analyze-full`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    pub resume_text: String,
    pub target_role: String,
}

/// Error body the backend may attach to a non-2xx response.
/// `detail` is only honored when it is a plain string.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    pub(crate) fn detail_from(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorBody>(body)
            .ok()
            .and_then(|e| e.detail.as_str().map(str::to_string))
    }
}

/// The two calls the analysis workflow makes, in order.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    /// Uploads the resume and returns the text the backend extracted from it.
    async fn parse_resume(&self, file: &SelectedFile) -> Result<String, AnalysisError>;

    /// Runs the full gap / roadmap / interview analysis.
    async fn analyze_full(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<CareerCompanionReport, AnalysisError>;
}
