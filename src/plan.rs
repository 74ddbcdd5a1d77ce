use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::insights::InsightResult;
use crate::metrics::round_half_up;
use crate::models::Category;
use crate::risk::TrendDirection;

pub const TARGET_GRADE: f64 = 85.0;
pub const TARGET_LABEL: &str = "Very Satisfactory";

pub const ATTENDANCE_GOAL: f64 = 95.0;
pub const ATTENDANCE_STEP: f64 = 10.0;
pub const ATTENDANCE_GAIN_FACTOR: f64 = 0.5;
pub const ATTENDANCE_GAIN_CAP: f64 = 2.0;

pub const COMPLETION_TRIGGER: f64 = 90.0;
pub const COMPLETION_STEP: f64 = 20.0;

pub const CATEGORY_TARGET_CAP: f64 = 90.0;
pub const CATEGORY_STEP: f64 = 15.0;
pub const CATEGORY_GAIN_CAP: f64 = 3.0;

pub const MOMENTUM_GAIN: f64 = 1.0;

pub const REQUIRED_SCORE_CAP: f64 = 95.0;
pub const REQUIRED_SCORE_FACTOR: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    Attendance,
    Completion,
    WeakestCategory,
    Momentum,
    ScoreTarget,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementStep {
    pub kind: StepKind,
    pub title: String,
    pub current_value: String,
    pub target_value: String,
    pub action: String,
    pub grade_impact: f64,
    pub formula: String,
    pub details: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanConclusion {
    pub current_grade: f64,
    pub expected_grade: f64,
    pub projected_grade: f64,
    pub gap_closed: f64,
    pub remaining_gap: f64,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementPlan {
    pub target_grade: f64,
    pub gap_to_target: f64,
    pub is_already_met: bool,
    pub steps: Vec<ImprovementStep>,
    pub projected_grade_gain: f64,
    pub conclusion: PlanConclusion,
}

fn strings(lines: &[&str]) -> Vec<String> {
    lines.iter().map(|line| line.to_string()).collect()
}

fn attendance_step(rate: f64) -> Option<ImprovementStep> {
    if rate >= ATTENDANCE_GOAL {
        return None;
    }

    let target = (rate + ATTENDANCE_STEP).min(ATTENDANCE_GOAL);
    let gain = round_half_up((target - rate) * ATTENDANCE_GAIN_FACTOR).min(ATTENDANCE_GAIN_CAP);

    Some(ImprovementStep {
        kind: StepKind::Attendance,
        title: "Improve Attendance".to_string(),
        current_value: format!("{rate:.0}%"),
        target_value: format!("{target:.0}%"),
        action: format!("Raise attendance from {rate:.0}% to {target:.0}%"),
        grade_impact: gain,
        formula: format!("min(2, round(({target:.0} - {rate:.0}) x 0.5)) = +{gain:.0}"),
        details: strings(&[
            "Attend every scheduled class session",
            "Arrive on time to avoid being marked late",
            "Coordinate with the teacher ahead of any planned absence",
            "Catch up on missed lessons within the same week",
        ]),
    })
}

fn completion_step(rate: f64) -> Option<ImprovementStep> {
    if rate >= COMPLETION_TRIGGER {
        return None;
    }

    let target = (rate + COMPLETION_STEP).min(100.0);
    let gain = if target >= COMPLETION_TRIGGER { 2.0 } else { 1.0 };

    Some(ImprovementStep {
        kind: StepKind::Completion,
        title: "Complete All Tasks".to_string(),
        current_value: format!("{rate:.0}%"),
        target_value: format!("{target:.0}%"),
        action: format!("Raise task completion from {rate:.0}% to {target:.0}%"),
        grade_impact: gain,
        formula: format!("target {target:.0}% {} 90% -> +{gain:.0}", if target >= COMPLETION_TRIGGER { ">=" } else { "<" }),
        details: strings(&[
            "Submit every written work and performance task",
            "Keep a planner of upcoming deadlines",
            "Ask about make-up work for missed activities",
            "Start long tasks early instead of the night before",
        ]),
    })
}

fn category_strategies(category: Category) -> Vec<String> {
    match category {
        Category::WrittenWorks => strings(&[
            "Review lesson notes before every quiz",
            "Practice with sample exercises from the textbook",
            "Re-check answers before submitting written work",
            "Ask for feedback on returned quizzes",
        ]),
        Category::PerformanceTask => strings(&[
            "Read the rubric before starting each task",
            "Plan projects in stages with checkpoints",
            "Show work drafts to the teacher for early feedback",
            "Put extra care into presentation and completeness",
        ]),
        Category::QuarterlyExam => strings(&[
            "Start reviewing at least two weeks before the exam",
            "Summarize each unit into a one-page reviewer",
            "Take timed practice tests",
            "Join or form a study group for difficult topics",
        ]),
    }
}

/// Skipped once the category already sits at or above the target cap.
fn weakest_category_step(category: Category, score: f64) -> Option<ImprovementStep> {
    if score >= CATEGORY_TARGET_CAP {
        return None;
    }

    let target = (score + CATEGORY_STEP).min(CATEGORY_TARGET_CAP);
    let weight = category.weight();
    let gain = round_half_up((target - score) * weight).min(CATEGORY_GAIN_CAP);

    Some(ImprovementStep {
        kind: StepKind::WeakestCategory,
        title: format!("Strengthen {}", category.label()),
        current_value: format!("{score:.1}%"),
        target_value: format!("{target:.1}%"),
        action: format!(
            "Raise the {} average from {score:.1}% to {target:.1}%",
            category.label()
        ),
        grade_impact: gain,
        formula: format!(
            "min(3, round(({target:.1} - {score:.1}) x {weight:.2})) = +{gain:.0}"
        ),
        details: category_strategies(category),
    })
}

fn momentum_step(direction: TrendDirection) -> Option<ImprovementStep> {
    if direction == TrendDirection::Improving {
        return None;
    }

    Some(ImprovementStep {
        kind: StepKind::Momentum,
        title: "Build Positive Momentum".to_string(),
        current_value: direction.as_str().to_string(),
        target_value: "improving".to_string(),
        action: "Turn the grade trend upward over the next assessments".to_string(),
        grade_impact: MOMENTUM_GAIN,
        formula: "consistent improvement -> +1".to_string(),
        details: strings(&[
            "Set a weekly study schedule and keep to it",
            "Aim to beat the previous score on each new assessment",
            "Review mistakes right after results are returned",
        ]),
    })
}

fn score_target_step(expected_grade: f64, gap: f64, prior_gains: f64) -> ImprovementStep {
    let required = (expected_grade + gap * REQUIRED_SCORE_FACTOR).min(REQUIRED_SCORE_CAP);
    let shown = round_half_up(required);
    let gain = (gap - prior_gains).max(1.0);

    ImprovementStep {
        kind: StepKind::ScoreTarget,
        title: "Score Higher on Upcoming Assessments".to_string(),
        current_value: format!("{expected_grade:.0}%"),
        target_value: format!("{shown:.0}%"),
        action: format!("Average at least {shown:.0}% on the remaining assessments"),
        grade_impact: gain,
        formula: format!(
            "min(95, {expected_grade:.0} + {gap:.0} x 1.5) = {required:.1}%; max(1, {gap:.0} - {prior_gains:.0}) = +{gain:.0}"
        ),
        details: strings(&[
            "Prioritize the highest-weighted upcoming assessments",
            "Prepare for each assessment with active recall",
            "Clarify unclear topics with the teacher before the assessment",
        ]),
    }
}

fn conclusion(current_grade: f64, expected_grade: f64, projected_grade: f64) -> PlanConclusion {
    let remaining_gap = (TARGET_GRADE - projected_grade).max(0.0);
    let message = if projected_grade >= TARGET_GRADE {
        format!(
            "Following these steps can lift the grade from {expected_grade:.0}% to {projected_grade:.0}%, reaching the {TARGET_LABEL} level."
        )
    } else {
        format!(
            "Following these steps can lift the grade to {projected_grade:.0}%, leaving {remaining_gap:.0} points to reach {TARGET_LABEL}. Ask the teacher for additional support."
        )
    };

    PlanConclusion {
        current_grade,
        expected_grade,
        projected_grade,
        gap_closed: projected_grade - expected_grade,
        remaining_gap,
        message,
    }
}

pub fn compute_plan(insights: &InsightResult) -> ImprovementPlan {
    let expected_grade = insights.expected_grade;
    let gap = (TARGET_GRADE - expected_grade).max(0.0);

    if gap <= 0.0 {
        return ImprovementPlan {
            target_grade: TARGET_GRADE,
            gap_to_target: 0.0,
            is_already_met: true,
            steps: Vec::new(),
            projected_grade_gain: 0.0,
            conclusion: PlanConclusion {
                current_grade: insights.current_grade,
                expected_grade,
                projected_grade: expected_grade,
                gap_closed: 0.0,
                remaining_gap: 0.0,
                message: format!(
                    "On track for {TARGET_LABEL} or better with an expected grade of {expected_grade:.0}%. Keep up the good work!"
                ),
            },
        };
    }

    let mut steps: Vec<ImprovementStep> = Vec::new();
    steps.extend(attendance_step(insights.attendance_rate));
    steps.extend(completion_step(insights.completion_rate));
    if let Some(category) = insights.weakest_category {
        steps.extend(weakest_category_step(category, insights.weakest_score));
    }
    steps.extend(momentum_step(insights.trend_direction));

    let prior_gains: f64 = steps.iter().map(|s| s.grade_impact).sum();
    steps.push(score_target_step(expected_grade, gap, prior_gains));

    let total_gain: f64 = steps.iter().map(|s| s.grade_impact).sum();
    let projected_grade = (expected_grade + total_gain).min(100.0);

    debug!(
        gap,
        steps = steps.len(),
        projected_grade,
        "improvement plan generated"
    );

    ImprovementPlan {
        target_grade: TARGET_GRADE,
        gap_to_target: gap,
        is_already_met: false,
        steps,
        projected_grade_gain: total_gain,
        conclusion: conclusion(insights.current_grade, expected_grade, projected_grade),
    }
}
