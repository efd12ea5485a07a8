// Read-only views derived from a received report for the rendering layer.

pub mod summary;

pub use summary::{GapBar, ReportSummary};
