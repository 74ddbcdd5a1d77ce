use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::metrics::{round_half_up, SubjectMetrics};
use crate::models::Category;
use crate::risk::{TrendAnalysis, TrendDirection};

/// Starting point when no grade exists yet.
pub const BASELINE_GRADE: f64 = 75.0;
/// Lower clamp on the projection; keeps stacked penalties from running away.
pub const MIN_EXPECTED_GRADE: f64 = 60.0;
pub const MAX_EXPECTED_GRADE: f64 = 100.0;

pub const ATTENDANCE_BONUS: f64 = 1.0;
pub const ATTENDANCE_PENALTY_FACTOR: f64 = 0.3;
pub const TREND_IMPROVING_FACTOR: f64 = 0.4;
pub const TREND_DECLINING_FACTOR: f64 = 0.3;
pub const TREND_ADJUSTMENT_CAP: f64 = 3.0;
pub const COMPLETION_BONUS: f64 = 1.0;
pub const COMPLETION_PENALTY: f64 = -2.0;
pub const IMPROVEMENT_POTENTIAL_BONUS: f64 = 2.0;
/// Minimum spread between the category mean and the weakest category.
pub const IMPROVEMENT_POTENTIAL_SPREAD: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Adjustment {
    pub label: String,
    pub value: String,
    pub impact: f64,
    pub formula: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub base_grade: f64,
    pub expected_grade: f64,
    pub adjustments: Vec<Adjustment>,
    pub weakest: Option<(Category, f64)>,
    pub average_category_score: f64,
}

pub fn attendance_adjustment(rate: f64) -> f64 {
    if rate >= 90.0 {
        ATTENDANCE_BONUS
    } else if rate >= 80.0 {
        0.0
    } else {
        -round_half_up((90.0 - rate) * ATTENDANCE_PENALTY_FACTOR)
    }
}

pub fn trend_adjustment(trend: &TrendAnalysis) -> f64 {
    match trend.direction {
        TrendDirection::Improving => {
            round_half_up(trend.change * TREND_IMPROVING_FACTOR).min(TREND_ADJUSTMENT_CAP)
        }
        TrendDirection::Declining | TrendDirection::SlightlyDeclining => {
            round_half_up(trend.change * TREND_DECLINING_FACTOR).max(-TREND_ADJUSTMENT_CAP)
        }
        TrendDirection::Stable => 0.0,
    }
}

pub fn completion_adjustment(rate: f64) -> f64 {
    if rate >= 80.0 {
        COMPLETION_BONUS
    } else if rate < 60.0 {
        COMPLETION_PENALTY
    } else {
        0.0
    }
}

fn attendance_formula(rate: f64) -> String {
    if rate >= 90.0 {
        "attendance >= 90% -> +1".to_string()
    } else if rate >= 80.0 {
        "80% <= attendance < 90% -> 0".to_string()
    } else {
        format!("-round((90 - {rate:.0}) x 0.3)")
    }
}

fn trend_formula(trend: &TrendAnalysis) -> String {
    match trend.direction {
        TrendDirection::Improving => format!("min(3, round({:+.1} x 0.4))", trend.change),
        TrendDirection::Declining | TrendDirection::SlightlyDeclining => {
            format!("max(-3, round({:+.1} x 0.3))", trend.change)
        }
        TrendDirection::Stable => "stable trend -> 0".to_string(),
    }
}

fn completion_formula(rate: f64) -> String {
    if rate >= 80.0 {
        "completion >= 80% -> +1".to_string()
    } else if rate < 60.0 {
        "completion < 60% -> -2".to_string()
    } else {
        "60% <= completion < 80% -> 0".to_string()
    }
}

pub fn project_grade(metrics: &SubjectMetrics, trend: &TrendAnalysis) -> Projection {
    let base_grade = if metrics.current_grade > 0.0 {
        metrics.current_grade
    } else {
        BASELINE_GRADE
    };

    let mut adjustments = vec![
        Adjustment {
            label: "Attendance".to_string(),
            value: format!("{:.0}%", metrics.attendance_rate),
            impact: attendance_adjustment(metrics.attendance_rate),
            formula: attendance_formula(metrics.attendance_rate),
        },
        Adjustment {
            label: "Grade trend".to_string(),
            value: format!("{} ({:+.1})", trend.direction.as_str(), trend.change),
            impact: trend_adjustment(trend),
            formula: trend_formula(trend),
        },
        Adjustment {
            label: "Task completion".to_string(),
            value: format!("{:.0}%", metrics.completion_rate),
            impact: completion_adjustment(metrics.completion_rate),
            formula: completion_formula(metrics.completion_rate),
        },
    ];

    let weakest = metrics.category_scores.weakest();
    let average_category_score = metrics.category_scores.non_zero_mean();
    if let Some((category, weakest_score)) = weakest {
        if average_category_score - weakest_score >= IMPROVEMENT_POTENTIAL_SPREAD {
            adjustments.push(Adjustment {
                label: "Improvement potential".to_string(),
                value: format!("{} at {:.1}%", category.label(), weakest_score),
                impact: IMPROVEMENT_POTENTIAL_BONUS,
                formula: format!(
                    "{average_category_score:.1} - {weakest_score:.1} >= 10 -> +2"
                ),
            });
        }
    }

    let raw = base_grade + adjustments.iter().map(|a| a.impact).sum::<f64>();
    let expected_grade = round_half_up(raw).clamp(MIN_EXPECTED_GRADE, MAX_EXPECTED_GRADE);

    debug!(base_grade, raw, expected_grade, "grade projected");

    Projection {
        base_grade,
        expected_grade,
        adjustments,
        weakest,
        average_category_score,
    }
}
