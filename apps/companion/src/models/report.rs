use serde::{Deserialize, Serialize};

/// Upper bound of the 0–5 skill scale used by the backend.
/// Levels are trusted as sent; nothing here clamps or rejects them.
pub const MAX_SKILL_LEVEL: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeAnalysis {
    pub name: String,
    pub years_of_experience: u32,
    pub skills: Vec<String>,
    pub projects: Vec<String>,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRequirements {
    pub required_skills: Vec<String>,
    pub expected_experience: String,
    pub common_tools: Vec<String>,
    pub role_summary: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillGap {
    pub skill_name: String,
    pub current_level: u8,
    pub required_level: u8,
    pub priority: Priority,
    pub reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadmapStep {
    pub week_number: u32,
    pub learning_goal: String,
    pub recommended_resources: Vec<String>,
    pub estimated_hours: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question: String,
    pub difficulty: Difficulty,
    pub expected_answer_points: Vec<String>,
}

/// The full report returned by `/analyze-full`.
///
/// Every field is required: a body missing any of them fails to deserialize
/// and is treated like any other analysis failure. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CareerCompanionReport {
    pub resume_analysis: ResumeAnalysis,
    pub role_requirements: RoleRequirements,
    pub skill_gaps: Vec<SkillGap>,
    pub roadmap: Vec<RoadmapStep>,
    pub interview_questions: Vec<InterviewQuestion>,
}
