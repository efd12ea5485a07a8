use std::time::Duration;

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::{
    AnalysisBackend, AnalyzeRequest, ErrorBody, ParseResumeResponse, ANALYZE_FULL_PATH,
    PARSE_RESUME_PATH,
};
use crate::config::Config;
use crate::errors::AnalysisError;
use crate::models::{CareerCompanionReport, SelectedFile};

/// `AnalysisBackend` over HTTP. No retries: every failure is returned to the
/// workflow as-is.
#[derive(Clone)]
pub struct HttpBackend {
    client: Client,
    base_url: String,
    request_timeout: Option<Duration>,
}

impl HttpBackend {
    pub fn new(config: &Config) -> Result<Self, AnalysisError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            request_timeout: Some(config.request_timeout),
            ..Self::with_client(client, &config.api_url)
        })
    }

    /// Wraps a prebuilt client. Its timeout, if any, is unknown here, so
    /// request timeouts surface as `Http` errors.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: None,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn parse_resume(&self, file: &SelectedFile) -> Result<String, AnalysisError> {
        let part =
            multipart::Part::stream_with_length(file.contents().clone(), file.size() as u64)
                .file_name(file.name().to_string())
                .mime_str(file.content_type())?;
        let form = multipart::Form::new().part("file", part);

        let response = self
            .client
            .post(self.url(PARSE_RESUME_PATH))
            .multipart(form)
            .send()
            .await
            .map_err(|e| request_error(e, self.request_timeout))?;

        let parsed: ParseResumeResponse =
            read_json(PARSE_RESUME_PATH, response, self.request_timeout).await?;
        debug!(
            "Resume parsed: {} chars extracted from {}",
            parsed.resume_text.len(),
            file.name()
        );
        Ok(parsed.resume_text)
    }

    async fn analyze_full(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<CareerCompanionReport, AnalysisError> {
        let response = self
            .client
            .post(self.url(ANALYZE_FULL_PATH))
            .json(request)
            .send()
            .await
            .map_err(|e| request_error(e, self.request_timeout))?;

        read_json(ANALYZE_FULL_PATH, response, self.request_timeout).await
    }
}

/// A request that hit the configured per-request timeout reports as
/// `TimedOut`; everything else stays a transport error.
fn request_error(err: reqwest::Error, request_timeout: Option<Duration>) -> AnalysisError {
    match request_timeout {
        Some(limit) if err.is_timeout() => AnalysisError::TimedOut(limit),
        _ => AnalysisError::Http(err),
    }
}

/// Turns a response into `T`, or into `Rejected` / `Malformed`.
async fn read_json<T: DeserializeOwned>(
    endpoint: &'static str,
    response: Response,
    request_timeout: Option<Duration>,
) -> Result<T, AnalysisError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| request_error(e, request_timeout))?;

    if !status.is_success() {
        warn!("{} returned {}: {}", endpoint, status, body);
        return Err(AnalysisError::Rejected {
            endpoint,
            status: status.as_u16(),
            detail: ErrorBody::detail_from(&body),
        });
    }

    serde_json::from_str(&body).map_err(|source| AnalysisError::Malformed { endpoint, source })
}
