use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classify::{classify, PerformanceLevel, SubjectStanding};
use crate::gap::{analyze_gaps, GapAnalysis};
use crate::metrics::{extract_metrics, CategoryScores};
use crate::models::{Category, RiskFactor, StudentSnapshot};
use crate::projection::{project_grade, Adjustment};
use crate::risk::{assess_risk, RiskBreakdown, RiskLevel, TrendDirection};

/// Everything the dashboard shows for one subject, computed from a single snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightResult {
    pub current_grade: f64,
    pub expected_grade: f64,
    pub performance_level: PerformanceLevel,
    pub performance_color: String,
    pub subject_standing: SubjectStanding,
    pub risk_level: RiskLevel,
    pub risk_score: f64,
    pub risk_breakdown: RiskBreakdown,
    pub risk_factors: Vec<RiskFactor>,
    pub category_scores: CategoryScores,
    pub weakest_category: Option<Category>,
    pub weakest_score: f64,
    pub average_category_score: f64,
    pub trend_direction: TrendDirection,
    pub trend_change: f64,
    pub attendance_rate: f64,
    pub completion_rate: f64,
    pub adjustments: Vec<Adjustment>,
    #[serde(flatten)]
    pub gaps: GapAnalysis,
}

/// Runs extraction, classification, risk scoring, projection and gap analysis.
///
/// Returns `None` only when there is no record at all; partial records
/// degrade to defaults instead.
pub fn compute_insights(
    snapshot: Option<&StudentSnapshot>,
    target_grade: f64,
) -> Option<InsightResult> {
    let snapshot = snapshot?;

    let metrics = extract_metrics(snapshot);
    let (performance_level, subject_standing) = classify(metrics.current_grade);
    let risk = assess_risk(&metrics);
    let projection = project_grade(&metrics, &risk.trend);
    let gaps = analyze_gaps(metrics.current_grade, projection.expected_grade, target_grade);

    debug!(
        record = %snapshot.display_name(),
        current_grade = metrics.current_grade,
        expected_grade = projection.expected_grade,
        risk_score = risk.score,
        "insights computed"
    );

    let (weakest_category, weakest_score) = match projection.weakest {
        Some((category, score)) => (Some(category), score),
        None => (None, 0.0),
    };

    Some(InsightResult {
        current_grade: metrics.current_grade,
        expected_grade: projection.expected_grade,
        performance_level,
        performance_color: performance_level.color().to_string(),
        subject_standing,
        risk_level: risk.level,
        risk_score: risk.score,
        risk_breakdown: risk.breakdown,
        risk_factors: risk.factors,
        category_scores: metrics.category_scores,
        weakest_category,
        weakest_score,
        average_category_score: projection.average_category_score,
        trend_direction: risk.trend.direction,
        trend_change: risk.trend.change,
        attendance_rate: metrics.attendance_rate,
        completion_rate: metrics.completion_rate,
        adjustments: projection.adjustments,
        gaps,
    })
}
