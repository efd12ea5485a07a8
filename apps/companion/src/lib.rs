//! Career Companion client core.
//!
//! Collects a resume file and a target role, runs them through the analysis
//! backend in two sequential calls, and holds the resulting career report for
//! a rendering layer to display.

pub mod backend;
pub mod config;
pub mod errors;
pub mod file_selector;
pub mod models;
pub mod report;
pub mod telemetry;
pub mod workflow;

pub use backend::{AnalysisBackend, AnalyzeRequest, HttpBackend};
pub use config::Config;
pub use errors::AnalysisError;
pub use file_selector::{FileEvent, FileSelector};
pub use models::{CareerCompanionReport, SelectedFile};
pub use workflow::{AnalysisOutcome, CancelHandle, WorkflowController, WorkflowStep};
