use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::metrics::SubjectMetrics;
use crate::models::{RiskFactor, Severity};

pub const GRADE_RISK_WEIGHT: f64 = 40.0;
pub const ATTENDANCE_RISK_WEIGHT: f64 = 30.0;
pub const TREND_RISK_WEIGHT: f64 = 20.0;
pub const COMPLETION_RISK_WEIGHT: f64 = 10.0;

pub const HIGH_RISK_THRESHOLD: f64 = 50.0;
pub const MODERATE_RISK_THRESHOLD: f64 = 25.0;

pub const PASSING_GRADE: f64 = 75.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    High,
    Moderate,
    Low,
}

impl RiskLevel {
    pub fn from_score(score: f64) -> Self {
        if score >= HIGH_RISK_THRESHOLD {
            RiskLevel::High
        } else if score >= MODERATE_RISK_THRESHOLD {
            RiskLevel::Moderate
        } else {
            RiskLevel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::High => "High",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::Low => "Low",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendDirection {
    #[serde(rename = "improving")]
    Improving,
    #[serde(rename = "declining")]
    Declining,
    #[serde(rename = "slightly declining")]
    SlightlyDeclining,
    #[serde(rename = "stable")]
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendDirection::Improving => "improving",
            TrendDirection::Declining => "declining",
            TrendDirection::SlightlyDeclining => "slightly declining",
            TrendDirection::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrendAnalysis {
    pub direction: TrendDirection,
    pub change: f64,
    pub declines: usize,
}

/// Sub-scores before they are summed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskBreakdown {
    pub grade: f64,
    pub attendance: f64,
    pub trend: f64,
    pub completion: f64,
}

impl RiskBreakdown {
    pub fn total(&self) -> f64 {
        self.grade + self.attendance + self.trend + self.completion
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RiskAssessment {
    pub score: f64,
    pub level: RiskLevel,
    pub breakdown: RiskBreakdown,
    pub factors: Vec<RiskFactor>,
    pub trend: TrendAnalysis,
}

/// Only strictly positive trend values count; zeros are quarters without a grade.
pub fn analyze_trend(values: &[f64]) -> TrendAnalysis {
    let valid: Vec<f64> = values.iter().copied().filter(|v| *v > 0.0).collect();

    if valid.len() < 2 {
        return TrendAnalysis {
            direction: TrendDirection::Stable,
            change: 0.0,
            declines: 0,
        };
    }

    let declines = valid.windows(2).filter(|pair| pair[1] < pair[0]).count();
    let change = valid[valid.len() - 1] - valid[0];

    let direction = if change > 0.0 {
        TrendDirection::Improving
    } else if declines >= 2 {
        TrendDirection::Declining
    } else if declines == 1 && change < 0.0 {
        TrendDirection::SlightlyDeclining
    } else {
        TrendDirection::Stable
    };

    TrendAnalysis {
        direction,
        change,
        declines,
    }
}

pub fn grade_risk(grade: f64) -> f64 {
    if grade <= 0.0 {
        0.0
    } else if grade < PASSING_GRADE {
        GRADE_RISK_WEIGHT
    } else if grade < 80.0 {
        20.0
    } else if grade < 85.0 {
        10.0
    } else {
        0.0
    }
}

pub fn attendance_risk(rate: f64) -> f64 {
    if rate < 80.0 {
        ATTENDANCE_RISK_WEIGHT
    } else if rate < 90.0 {
        15.0
    } else {
        0.0
    }
}

/// Scored from the decline count, not the direction.
pub fn trend_risk(trend: &TrendAnalysis) -> f64 {
    if trend.declines >= 2 {
        TREND_RISK_WEIGHT
    } else if trend.declines == 1 && trend.change < 0.0 {
        10.0
    } else {
        0.0
    }
}

pub fn completion_risk(rate: f64) -> f64 {
    if rate < 50.0 {
        COMPLETION_RISK_WEIGHT
    } else if rate < 80.0 {
        5.0
    } else {
        0.0
    }
}

fn risk_factors(metrics: &SubjectMetrics, trend: &TrendAnalysis) -> Vec<RiskFactor> {
    let mut factors = Vec::new();
    let grade = metrics.current_grade;

    if grade > 0.0 && grade < PASSING_GRADE {
        factors.push(RiskFactor {
            text: "Below passing grade (75%)".to_string(),
            severity: Severity::High,
        });
    } else if (PASSING_GRADE..80.0).contains(&grade) {
        factors.push(RiskFactor {
            text: "Near failing threshold".to_string(),
            severity: Severity::Medium,
        });
    }

    let attendance = metrics.attendance_rate;
    if attendance < 80.0 {
        factors.push(RiskFactor {
            text: format!("Low attendance ({attendance:.0}%)"),
            severity: Severity::High,
        });
    } else if attendance < 90.0 {
        factors.push(RiskFactor {
            text: format!("Attendance below 90% ({attendance:.0}%)"),
            severity: Severity::Medium,
        });
    }

    if trend.declines >= 2 {
        factors.push(RiskFactor {
            text: "Consistent grade decline".to_string(),
            severity: Severity::Medium,
        });
    }

    if metrics.completion_rate < 50.0 {
        factors.push(RiskFactor {
            text: format!("Low task completion ({:.0}%)", metrics.completion_rate),
            severity: Severity::Low,
        });
    }

    factors
}

pub fn assess_risk(metrics: &SubjectMetrics) -> RiskAssessment {
    let trend = analyze_trend(&metrics.trend_values);
    let breakdown = RiskBreakdown {
        grade: grade_risk(metrics.current_grade),
        attendance: attendance_risk(metrics.attendance_rate),
        trend: trend_risk(&trend),
        completion: completion_risk(metrics.completion_rate),
    };
    let score = breakdown.total();
    let level = RiskLevel::from_score(score);

    debug!(
        score,
        level = level.as_str(),
        trend = trend.direction.as_str(),
        "risk assessed"
    );

    RiskAssessment {
        score,
        level,
        breakdown,
        factors: risk_factors(metrics, &trend),
        trend,
    }
}
