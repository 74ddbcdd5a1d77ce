use serde::{Deserialize, Serialize};

pub const OUTSTANDING_MILESTONE: f64 = 90.0;
pub const VERY_SATISFACTORY_MILESTONE: f64 = 85.0;
pub const PASSING_MILESTONE: f64 = 75.0;

/// Distances to the grading milestones. `None` means no grade has been
/// posted yet, which is not the same as a closed gap (`Some(0.0)`).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GapAnalysis {
    pub gap_to_90: Option<f64>,
    pub gap_to_85: Option<f64>,
    pub gap_to_75: Option<f64>,
    pub expected_to_85_gap: f64,
    pub target_grade: f64,
    pub gap_to_target: Option<f64>,
}

pub fn gap_to(milestone: f64, current_grade: f64) -> Option<f64> {
    (current_grade > 0.0).then(|| (milestone - current_grade).max(0.0))
}

pub fn analyze_gaps(current_grade: f64, expected_grade: f64, target_grade: f64) -> GapAnalysis {
    GapAnalysis {
        gap_to_90: gap_to(OUTSTANDING_MILESTONE, current_grade),
        gap_to_85: gap_to(VERY_SATISFACTORY_MILESTONE, current_grade),
        gap_to_75: gap_to(PASSING_MILESTONE, current_grade),
        expected_to_85_gap: (VERY_SATISFACTORY_MILESTONE - expected_grade).max(0.0),
        target_grade,
        gap_to_target: gap_to(target_grade, current_grade),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gaps_are_measured_from_current_grade() {
        let gaps = analyze_gaps(78.0, 76.0, 88.0);
        assert_eq!(gaps.gap_to_90, Some(12.0));
        assert_eq!(gaps.gap_to_85, Some(7.0));
        assert_eq!(gaps.gap_to_75, Some(0.0));
        assert_eq!(gaps.expected_to_85_gap, 9.0);
        assert_eq!(gaps.gap_to_target, Some(10.0));
    }

    #[test]
    fn no_grade_yields_no_gaps() {
        let gaps = analyze_gaps(0.0, 74.0, 85.0);
        assert_eq!(gaps.gap_to_90, None);
        assert_eq!(gaps.gap_to_85, None);
        assert_eq!(gaps.gap_to_75, None);
        assert_eq!(gaps.gap_to_target, None);
        assert_eq!(gaps.expected_to_85_gap, 11.0);
    }

    #[test]
    fn closed_gaps_are_zero() {
        let gaps = analyze_gaps(93.0, 94.0, 85.0);
        assert_eq!(gaps.gap_to_90, Some(0.0));
        assert_eq!(gaps.expected_to_85_gap, 0.0);
    }
}
