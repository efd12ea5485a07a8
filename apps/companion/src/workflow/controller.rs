use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use super::cancel::{self, CancelHandle};
use super::step::WorkflowStep;
use crate::backend::{AnalysisBackend, AnalyzeRequest, HttpBackend};
use crate::config::Config;
use crate::errors::AnalysisError;
use crate::models::{CareerCompanionReport, SelectedFile};

/// What a call to [`WorkflowController::start_analysis`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisOutcome {
    /// Preconditions were not met; nothing changed and no request was sent.
    NotStarted,
    /// Both calls succeeded; the controller is in `Results`.
    Completed,
    /// A call failed, timed out or was cancelled; the controller is back in
    /// `Upload` with an error message set.
    Failed,
}

/// Owns the workflow state machine and drives the two-call analysis.
///
/// State is only reachable through the operations below, so every change
/// is a legal transition. `start_analysis` borrows the controller mutably for
/// the whole run, which rules out overlapping runs on one controller.
pub struct WorkflowController {
    backend: Arc<dyn AnalysisBackend>,
    analysis_timeout: Option<Duration>,
    cancel: CancelHandle,
    step: WorkflowStep,
    selected_file: Option<SelectedFile>,
    target_role: String,
    report: Option<CareerCompanionReport>,
    error: Option<String>,
}

impl WorkflowController {
    /// A controller with no overall analysis bound.
    pub fn new(backend: Arc<dyn AnalysisBackend>) -> Self {
        Self {
            backend,
            analysis_timeout: None,
            cancel: CancelHandle::new(),
            step: WorkflowStep::Landing,
            selected_file: None,
            target_role: String::new(),
            report: None,
            error: None,
        }
    }

    /// An HTTP-backed controller with the configured timeouts.
    pub fn from_config(config: &Config) -> Result<Self, AnalysisError> {
        let backend = HttpBackend::new(config)?;
        Ok(Self::new(Arc::new(backend)).with_analysis_timeout(config.analysis_timeout))
    }

    pub fn with_analysis_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.analysis_timeout = timeout;
        self
    }

    pub fn step(&self) -> WorkflowStep {
        self.step
    }

    pub fn selected_file(&self) -> Option<&SelectedFile> {
        self.selected_file.as_ref()
    }

    pub fn target_role(&self) -> &str {
        &self.target_role
    }

    /// The last successfully received report. A later failed run leaves it in place.
    pub fn report(&self) -> Option<&CareerCompanionReport> {
        self.report.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// landing → upload. Ignored from any other step.
    pub fn begin(&mut self) -> bool {
        if self.step != WorkflowStep::Landing {
            return false;
        }
        self.transition(WorkflowStep::Upload);
        true
    }

    /// Replaces the current file.
    pub fn select_file(&mut self, file: SelectedFile) {
        debug!("Selected file {} ({} bytes)", file.name(), file.size());
        self.selected_file = Some(file);
    }

    /// Stores the role exactly as typed.
    pub fn set_target_role(&mut self, role: impl Into<String>) {
        self.target_role = role.into();
    }

    pub fn can_start_analysis(&self) -> bool {
        self.selected_file.is_some() && !self.target_role.is_empty()
    }

    /// Runs parse-resume then analyze-full.
    ///
    /// A no-op when [`can_start_analysis`](Self::can_start_analysis) is false.
    pub async fn start_analysis(&mut self) -> AnalysisOutcome {
        let file = match (&self.selected_file, self.target_role.is_empty()) {
            (Some(file), false) => file.clone(),
            _ => {
                debug!("start_analysis ignored: file or target role missing");
                return AnalysisOutcome::NotStarted;
            }
        };
        let target_role = self.target_role.clone();

        self.transition(WorkflowStep::Analyzing);
        self.error = None;
        info!(
            "Starting analysis of {} for role '{}'",
            file.name(),
            target_role
        );

        let backend = Arc::clone(&self.backend);
        let limit = self.analysis_timeout;
        let cancel_rx = self.cancel.arm();

        let bounded = async {
            let protocol = run_protocol(backend.as_ref(), &file, target_role);
            match limit {
                Some(limit) => tokio::time::timeout(limit, protocol)
                    .await
                    .unwrap_or(Err(AnalysisError::TimedOut(limit))),
                None => protocol.await,
            }
        };

        let result = tokio::select! {
            result = bounded => result,
            _ = cancel::cancelled(cancel_rx) => Err(AnalysisError::Cancelled),
        };

        match result {
            Ok(report) => {
                info!(
                    "Analysis complete: {} skill gaps, {} roadmap weeks",
                    report.skill_gaps.len(),
                    report.roadmap.len()
                );
                self.report = Some(report);
                self.transition(WorkflowStep::Results);
                AnalysisOutcome::Completed
            }
            Err(e) => {
                error!("Analysis failed: {e:?}");
                self.error = Some(e.user_message());
                self.transition(WorkflowStep::Upload);
                AnalysisOutcome::Failed
            }
        }
    }

    /// Back to landing. File and role are kept for the next run.
    pub fn reset(&mut self) {
        self.transition(WorkflowStep::Landing);
    }

    fn transition(&mut self, to: WorkflowStep) {
        debug!("Workflow step {} -> {}", self.step, to);
        self.step = to;
    }
}

/// The second call needs the first call's output, so they never overlap.
async fn run_protocol(
    backend: &dyn AnalysisBackend,
    file: &SelectedFile,
    target_role: String,
) -> Result<CareerCompanionReport, AnalysisError> {
    let resume_text = backend.parse_resume(file).await?;
    let request = AnalyzeRequest {
        resume_text,
        target_role,
    };
    backend.analyze_full(&request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FALLBACK_MESSAGE;
    use crate::models::report::fixtures::report_json;
    use crate::report::ReportSummary;
    use async_trait::async_trait;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    enum Reply<T> {
        Ok(T),
        Reject { status: u16, detail: Option<&'static str> },
        Hang,
    }

    /// In-memory backend that replays fixed replies and records what it saw.
    struct ScriptedBackend {
        parse: Reply<&'static str>,
        analyze: Reply<Value>,
        parse_calls: AtomicUsize,
        analyze_calls: AtomicUsize,
        analyze_requests: Mutex<Vec<AnalyzeRequest>>,
    }

    impl ScriptedBackend {
        fn new(parse: Reply<&'static str>, analyze: Reply<Value>) -> Arc<Self> {
            Arc::new(Self {
                parse,
                analyze,
                parse_calls: AtomicUsize::new(0),
                analyze_calls: AtomicUsize::new(0),
                analyze_requests: Mutex::new(Vec::new()),
            })
        }

        fn succeeding() -> Arc<Self> {
            Self::new(Reply::Ok("10 years Python..."), Reply::Ok(report_json()))
        }

        fn calls(&self) -> (usize, usize) {
            (
                self.parse_calls.load(Ordering::SeqCst),
                self.analyze_calls.load(Ordering::SeqCst),
            )
        }
    }

    async fn reply_with<T, U>(
        endpoint: &'static str,
        reply: &Reply<T>,
        convert: impl FnOnce(&T) -> Result<U, AnalysisError>,
    ) -> Result<U, AnalysisError> {
        match reply {
            Reply::Ok(value) => convert(value),
            Reply::Reject { status, detail } => Err(AnalysisError::Rejected {
                endpoint,
                status: *status,
                detail: detail.map(String::from),
            }),
            Reply::Hang => std::future::pending().await,
        }
    }

    #[async_trait]
    impl AnalysisBackend for ScriptedBackend {
        async fn parse_resume(&self, _file: &SelectedFile) -> Result<String, AnalysisError> {
            self.parse_calls.fetch_add(1, Ordering::SeqCst);
            reply_with("/parse-resume", &self.parse, |text| Ok(text.to_string())).await
        }

        async fn analyze_full(
            &self,
            request: &AnalyzeRequest,
        ) -> Result<CareerCompanionReport, AnalysisError> {
            self.analyze_calls.fetch_add(1, Ordering::SeqCst);
            self.analyze_requests.lock().unwrap().push(request.clone());
            reply_with("/analyze-full", &self.analyze, |body| {
                serde_json::from_value(body.clone()).map_err(|source| AnalysisError::Malformed {
                    endpoint: "/analyze-full",
                    source,
                })
            })
            .await
        }
    }

    fn ready_controller(backend: Arc<ScriptedBackend>, role: &str) -> WorkflowController {
        let mut controller = WorkflowController::new(backend);
        controller.begin();
        controller.select_file(SelectedFile::new("resume.pdf", "%PDF-1.7"));
        controller.set_target_role(role);
        controller
    }

    #[test]
    fn test_can_start_requires_file_and_role() {
        let mut controller = WorkflowController::new(ScriptedBackend::succeeding());
        assert!(!controller.can_start_analysis());

        controller.set_target_role("Data Scientist");
        assert!(!controller.can_start_analysis());

        controller.set_target_role("");
        controller.select_file(SelectedFile::new("resume.pdf", "x"));
        assert!(!controller.can_start_analysis());

        controller.set_target_role("Data Scientist");
        assert!(controller.can_start_analysis());
    }

    #[test]
    fn test_role_is_stored_raw() {
        let mut controller = WorkflowController::new(ScriptedBackend::succeeding());
        controller.select_file(SelectedFile::new("resume.pdf", "x"));
        controller.set_target_role("  ");
        assert_eq!(controller.target_role(), "  ");
        assert!(controller.can_start_analysis());
    }

    #[tokio::test]
    async fn test_start_without_preconditions_is_noop() {
        let cases: [(Option<&str>, &str); 3] = [
            (None, "Data Scientist"),
            (Some("resume.pdf"), ""),
            (None, ""),
        ];

        for (file_name, role) in cases {
            let backend = ScriptedBackend::succeeding();
            let mut controller = WorkflowController::new(backend.clone());
            controller.begin();
            if let Some(name) = file_name {
                controller.select_file(SelectedFile::new(name, "%PDF-1.7"));
            }
            controller.set_target_role(role);

            let outcome = controller.start_analysis().await;

            assert_eq!(
                outcome,
                AnalysisOutcome::NotStarted,
                "file {file_name:?}, role {role:?}"
            );
            assert_eq!(controller.step(), WorkflowStep::Upload);
            assert_eq!(backend.calls(), (0, 0));
            assert!(controller.error().is_none());
            assert!(controller.report().is_none());
        }
    }

    #[tokio::test]
    async fn test_second_request_carries_parsed_text_and_role() {
        let backend = ScriptedBackend::new(Reply::Ok("X"), Reply::Ok(report_json()));
        let mut controller = ready_controller(backend.clone(), "Senior Frontend Engineer");

        controller.start_analysis().await;

        let requests = backend.analyze_requests.lock().unwrap();
        assert_eq!(
            *requests,
            vec![AnalyzeRequest {
                resume_text: "X".to_string(),
                target_role: "Senior Frontend Engineer".to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn test_parse_failure_skips_analysis_call() {
        let backend = ScriptedBackend::new(
            Reply::Reject {
                status: 502,
                detail: None,
            },
            Reply::Ok(report_json()),
        );
        let mut controller = ready_controller(backend.clone(), "Data Scientist");

        let outcome = controller.start_analysis().await;

        assert_eq!(outcome, AnalysisOutcome::Failed);
        assert_eq!(backend.calls(), (1, 0));
        assert_eq!(controller.step(), WorkflowStep::Upload);
        assert_eq!(controller.error(), Some(FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn test_analysis_failure_returns_to_upload() {
        let backend = ScriptedBackend::new(
            Reply::Ok("resume"),
            Reply::Reject {
                status: 500,
                detail: Some("GOOGLE_API_KEY not set"),
            },
        );
        let mut controller = ready_controller(backend.clone(), "Data Scientist");

        let outcome = controller.start_analysis().await;

        assert_eq!(outcome, AnalysisOutcome::Failed);
        assert_eq!(backend.calls(), (1, 1));
        assert_eq!(controller.step(), WorkflowStep::Upload);
        assert_eq!(controller.error(), Some("GOOGLE_API_KEY not set"));
        assert!(controller.report().is_none());
    }

    #[tokio::test]
    async fn test_malformed_report_is_a_failure() {
        let mut body = report_json();
        body.as_object_mut().unwrap().remove("interview_questions");
        let backend = ScriptedBackend::new(Reply::Ok("resume"), Reply::Ok(body));
        let mut controller = ready_controller(backend, "Data Scientist");

        let outcome = controller.start_analysis().await;

        assert_eq!(outcome, AnalysisOutcome::Failed);
        assert_eq!(controller.step(), WorkflowStep::Upload);
        assert_eq!(controller.error(), Some(FALLBACK_MESSAGE));
    }

    #[tokio::test]
    async fn test_success_stores_report_and_shows_results() {
        let backend = ScriptedBackend::succeeding();
        let mut controller = ready_controller(backend.clone(), "Data Scientist");

        let outcome = controller.start_analysis().await;

        let expected: CareerCompanionReport = serde_json::from_value(report_json()).unwrap();
        assert_eq!(outcome, AnalysisOutcome::Completed);
        assert_eq!(controller.step(), WorkflowStep::Results);
        assert_eq!(controller.report(), Some(&expected));
        assert!(controller.error().is_none());
        assert_eq!(backend.calls(), (1, 1));
    }

    #[tokio::test]
    async fn test_data_scientist_scenario_reports_two_gaps() {
        let backend = ScriptedBackend::new(Reply::Ok("10 years Python..."), Reply::Ok(report_json()));
        let mut controller = ready_controller(backend.clone(), "Data Scientist");

        controller.start_analysis().await;

        assert_eq!(controller.step(), WorkflowStep::Results);
        let summary = ReportSummary::new(controller.report().unwrap());
        assert_eq!(summary.gap_count(), 2);
        assert_eq!(
            backend.analyze_requests.lock().unwrap()[0].resume_text,
            "10 years Python..."
        );
    }

    #[tokio::test]
    async fn test_backend_detail_is_shown_verbatim() {
        let backend = ScriptedBackend::new(
            Reply::Reject {
                status: 500,
                detail: Some("unsupported file type"),
            },
            Reply::Ok(report_json()),
        );
        let mut controller = ready_controller(backend, "Data Scientist");

        controller.start_analysis().await;

        assert_eq!(controller.step(), WorkflowStep::Upload);
        assert_eq!(controller.error(), Some("unsupported file type"));
    }

    #[tokio::test]
    async fn test_failed_retry_keeps_previous_report() {
        let mut controller = ready_controller(ScriptedBackend::succeeding(), "Data Scientist");
        controller.start_analysis().await;
        let first = controller.report().cloned();
        assert!(first.is_some());

        // Same controller state, new backend that fails on the first call.
        controller.backend = ScriptedBackend::new(
            Reply::Reject {
                status: 503,
                detail: None,
            },
            Reply::Ok(report_json()),
        );
        controller.reset();
        controller.begin();
        controller.start_analysis().await;

        assert_eq!(controller.step(), WorkflowStep::Upload);
        assert!(controller.error().is_some());
        assert_eq!(controller.report().cloned(), first);
    }

    #[tokio::test]
    async fn test_new_run_clears_previous_error() {
        let mut controller = ready_controller(
            ScriptedBackend::new(
                Reply::Reject {
                    status: 500,
                    detail: Some("boom"),
                },
                Reply::Ok(report_json()),
            ),
            "Data Scientist",
        );
        controller.start_analysis().await;
        assert_eq!(controller.error(), Some("boom"));

        controller.backend = ScriptedBackend::succeeding();
        controller.start_analysis().await;

        assert!(controller.error().is_none());
        assert_eq!(controller.step(), WorkflowStep::Results);
    }

    #[test]
    fn test_begin_only_leaves_landing() {
        let mut controller = WorkflowController::new(ScriptedBackend::succeeding());
        assert_eq!(controller.step(), WorkflowStep::Landing);
        assert!(controller.begin());
        assert_eq!(controller.step(), WorkflowStep::Upload);
        assert!(!controller.begin());
        assert_eq!(controller.step(), WorkflowStep::Upload);
    }

    #[tokio::test]
    async fn test_reset_keeps_file_and_role() {
        let mut controller = ready_controller(ScriptedBackend::succeeding(), "Data Scientist");
        controller.start_analysis().await;

        controller.reset();

        assert_eq!(controller.step(), WorkflowStep::Landing);
        assert_eq!(controller.selected_file().unwrap().name(), "resume.pdf");
        assert_eq!(controller.target_role(), "Data Scientist");
        assert!(controller.can_start_analysis());
    }

    #[test]
    fn test_select_file_replaces_previous() {
        let mut controller = WorkflowController::new(ScriptedBackend::succeeding());
        controller.select_file(SelectedFile::new("old.pdf", "a"));
        controller.select_file(SelectedFile::new("new.txt", "b"));
        assert_eq!(controller.selected_file().unwrap().name(), "new.txt");
    }

    #[tokio::test(start_paused = true)]
    async fn test_hung_backend_times_out() {
        let backend = ScriptedBackend::new(Reply::Hang, Reply::Ok(report_json()));
        let mut controller = ready_controller(backend.clone(), "Data Scientist")
            .with_analysis_timeout(Some(Duration::from_secs(5)));

        let outcome = controller.start_analysis().await;

        assert_eq!(outcome, AnalysisOutcome::Failed);
        assert_eq!(controller.step(), WorkflowStep::Upload);
        assert_eq!(
            controller.error(),
            Some("Analysis timed out after 5 seconds.")
        );
        assert_eq!(backend.calls(), (1, 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_aborts_in_flight_analysis() {
        let backend = ScriptedBackend::new(Reply::Ok("resume"), Reply::Hang);
        let mut controller = ready_controller(backend.clone(), "Data Scientist");
        let handle = controller.cancel_handle();

        let (outcome, _) = tokio::join!(controller.start_analysis(), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            handle.cancel();
        });

        assert_eq!(outcome, AnalysisOutcome::Failed);
        assert_eq!(controller.step(), WorkflowStep::Upload);
        assert_eq!(controller.error(), Some("Analysis was cancelled."));
        assert_eq!(backend.calls(), (1, 1));
    }

    #[tokio::test]
    async fn test_cancel_before_start_does_not_abort_run() {
        let mut controller = ready_controller(ScriptedBackend::succeeding(), "Data Scientist");
        controller.cancel_handle().cancel();

        let outcome = controller.start_analysis().await;

        assert_eq!(outcome, AnalysisOutcome::Completed);
    }

    #[test]
    fn test_from_config_builds_http_controller() {
        let config = Config {
            analysis_timeout: Some(Duration::from_secs(30)),
            ..Config::default()
        };
        let controller = WorkflowController::from_config(&config).unwrap();
        assert_eq!(controller.analysis_timeout, Some(Duration::from_secs(30)));
        assert_eq!(controller.step(), WorkflowStep::Landing);
    }
}
