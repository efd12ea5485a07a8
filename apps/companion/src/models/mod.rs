pub mod file;
pub mod report;

pub use file::SelectedFile;
pub use report::{
    CareerCompanionReport, Difficulty, InterviewQuestion, Priority, ResumeAnalysis,
    RoadmapStep, RoleRequirements, SkillGap,
};
