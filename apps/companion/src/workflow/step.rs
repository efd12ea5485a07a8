use std::fmt;

/// The single active phase of the analysis workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowStep {
    #[default]
    Landing,
    Upload,
    Analyzing,
    Results,
}

impl WorkflowStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkflowStep::Landing => "landing",
            WorkflowStep::Upload => "upload",
            WorkflowStep::Analyzing => "analyzing",
            WorkflowStep::Results => "results",
        }
    }
}

impl fmt::Display for WorkflowStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
