use crate::models::report::MAX_SKILL_LEVEL;
use crate::models::{CareerCompanionReport, Priority};

/// How many resume skills the insights panel lists.
pub const TOP_SKILLS_SHOWN: usize = 6;

/// One skill-gap row as displayed: name, priority badge, and the filled share
/// of the 0–5 level bar.
#[derive(Debug, Clone, PartialEq)]
pub struct GapBar<'a> {
    pub skill_name: &'a str,
    pub priority: Priority,
    pub fill_percent: f32,
}

/// Derived figures over a report. Borrows the report and never changes it.
#[derive(Debug, Clone, Copy)]
pub struct ReportSummary<'a> {
    report: &'a CareerCompanionReport,
}

impl<'a> ReportSummary<'a> {
    pub fn new(report: &'a CareerCompanionReport) -> Self {
        Self { report }
    }

    pub fn gap_count(&self) -> usize {
        self.report.skill_gaps.len()
    }

    pub fn headline(&self) -> String {
        format!(
            "We've identified {} key areas for growth.",
            self.gap_count()
        )
    }

    pub fn top_skills(&self) -> &'a [String] {
        let report = self.report;
        let skills = &report.resume_analysis.skills;
        &skills[..skills.len().min(TOP_SKILLS_SHOWN)]
    }

    /// Fill is `current_level / 5` and is not clamped; out-of-scale levels
    /// from the backend show as-is.
    pub fn gap_bars(&self) -> Vec<GapBar<'a>> {
        let report = self.report;
        report
            .skill_gaps
            .iter()
            .map(|gap| GapBar {
                skill_name: &gap.skill_name,
                priority: gap.priority,
                fill_percent: gap.current_level as f32 / MAX_SKILL_LEVEL as f32 * 100.0,
            })
            .collect()
    }

    pub fn total_roadmap_hours(&self) -> u64 {
        self.report
            .roadmap
            .iter()
            .map(|step| u64::from(step.estimated_hours))
            .sum()
    }
}
