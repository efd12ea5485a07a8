// Analysis workflow: landing → upload → analyzing → results.
// All network access goes through backend::AnalysisBackend.

pub mod cancel;
pub mod controller;
pub mod step;

pub use cancel::CancelHandle;
pub use controller::{AnalysisOutcome, WorkflowController};
pub use step::WorkflowStep;
