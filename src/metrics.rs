use serde::{Deserialize, Serialize};

use crate::models::{CategoryBucket, Category, StudentSnapshot};

/// Per-quarter task count assumed when the true number of assigned tasks is unknown.
pub const TASK_BASELINE: usize = 15;
/// Missing attendance is read as full attendance.
pub const DEFAULT_ATTENDANCE_RATE: f64 = 100.0;

/// Rounds half-way values toward positive infinity (`-4.5` becomes `-4`).
pub fn round_half_up(value: f64) -> f64 {
    let rounded = value.round();
    if (rounded - value).abs() == 0.5 {
        value.ceil()
    } else {
        rounded
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryScores {
    pub written_works: f64,
    pub performance_task: f64,
    pub quarterly_exam: f64,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> f64 {
        match category {
            Category::WrittenWorks => self.written_works,
            Category::PerformanceTask => self.performance_task,
            Category::QuarterlyExam => self.quarterly_exam,
        }
    }

    /// Lowest non-zero category average; ties go to the earlier category.
    pub fn weakest(&self) -> Option<(Category, f64)> {
        Category::ALL
            .iter()
            .map(|&category| (category, self.get(category)))
            .filter(|(_, score)| *score > 0.0)
            .fold(None, |weakest, candidate| match weakest {
                Some((_, lowest)) if lowest <= candidate.1 => weakest,
                _ => Some(candidate),
            })
    }

    /// Mean of the non-zero category averages, 0 when none are recorded.
    pub fn non_zero_mean(&self) -> f64 {
        let scores: Vec<f64> = Category::ALL
            .iter()
            .map(|&category| self.get(category))
            .filter(|score| *score > 0.0)
            .collect();

        if scores.is_empty() {
            0.0
        } else {
            scores.iter().sum::<f64>() / scores.len() as f64
        }
    }
}

/// Primitive metrics every later stage works from.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectMetrics {
    pub current_grade: f64,
    pub attendance_rate: f64,
    pub total_completed_tasks: usize,
    pub estimated_total_tasks: usize,
    pub completion_rate: f64,
    pub category_scores: CategoryScores,
    pub trend_values: Vec<f64>,
}

pub fn category_average(bucket: &CategoryBucket) -> f64 {
    if let Some(average) = bucket.average {
        return average;
    }

    if bucket.items.is_empty() {
        0.0
    } else {
        bucket.items.iter().map(|item| item.percentage).sum::<f64>() / bucket.items.len() as f64
    }
}

pub fn extract_metrics(snapshot: &StudentSnapshot) -> SubjectMetrics {
    let performance = snapshot.performance.as_ref();
    let current_grade = performance
        .and_then(|p| p.overall_grade)
        .unwrap_or(0.0);
    let attendance_rate = snapshot
        .attendance
        .as_ref()
        .and_then(|a| a.rate)
        .unwrap_or(DEFAULT_ATTENDANCE_RATE);

    let mut category_scores = CategoryScores::default();
    let mut total_completed_tasks = 0usize;

    if let Some(performance) = performance {
        let breakdown = &performance.grade_breakdown;
        for category in Category::ALL {
            total_completed_tasks += breakdown.bucket(category).items.len();
        }
        category_scores = CategoryScores {
            written_works: category_average(&breakdown.written_works),
            performance_task: category_average(&breakdown.performance_task),
            quarterly_exam: category_average(&breakdown.quarterly_exam),
        };
    }

    let estimated_total_tasks = total_completed_tasks.max(TASK_BASELINE);
    let completion_rate = if estimated_total_tasks == 0 {
        0.0
    } else {
        round_half_up(total_completed_tasks as f64 / estimated_total_tasks as f64 * 100.0)
    };

    SubjectMetrics {
        current_grade,
        attendance_rate,
        total_completed_tasks,
        estimated_total_tasks,
        completion_rate,
        category_scores,
        trend_values: snapshot.grade_trend.iter().map(|point| point.value).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceSummary, GradeItem, PerformanceRecord};

    fn item(percentage: f64) -> GradeItem {
        GradeItem {
            id: "item".to_string(),
            name: "Quiz".to_string(),
            score: percentage,
            total_score: 100.0,
            percentage,
            quarter: Some(1),
            date: None,
        }
    }

    #[test]
    fn empty_snapshot_uses_defaults() {
        let metrics = extract_metrics(&StudentSnapshot::default());
        assert_eq!(metrics.current_grade, 0.0);
        assert_eq!(metrics.attendance_rate, 100.0);
        assert_eq!(metrics.total_completed_tasks, 0);
        assert_eq!(metrics.estimated_total_tasks, TASK_BASELINE);
        assert_eq!(metrics.completion_rate, 0.0);
        assert_eq!(metrics.category_scores, CategoryScores::default());
    }

    #[test]
    fn completion_rate_uses_task_baseline() {
        let mut performance = PerformanceRecord::default();
        performance.grade_breakdown.written_works.items = vec![item(80.0); 4];
        performance.grade_breakdown.performance_task.items = vec![item(70.0); 2];
        let snapshot = StudentSnapshot {
            performance: Some(performance),
            ..Default::default()
        };

        let metrics = extract_metrics(&snapshot);
        assert_eq!(metrics.total_completed_tasks, 6);
        assert_eq!(metrics.completion_rate, 40.0);
    }

    #[test]
    fn completion_rate_caps_at_full_when_tasks_exceed_baseline() {
        let mut performance = PerformanceRecord::default();
        performance.grade_breakdown.performance_task.items = vec![item(90.0); 18];
        let snapshot = StudentSnapshot {
            performance: Some(performance),
            ..Default::default()
        };

        let metrics = extract_metrics(&snapshot);
        assert_eq!(metrics.estimated_total_tasks, 18);
        assert_eq!(metrics.completion_rate, 100.0);
    }

    #[test]
    fn category_average_prefers_precomputed_value() {
        let bucket = CategoryBucket {
            items: vec![item(50.0), item(70.0)],
            average: Some(88.0),
            count: 2,
        };
        assert_eq!(category_average(&bucket), 88.0);

        let bucket = CategoryBucket {
            average: None,
            ..bucket
        };
        assert_eq!(category_average(&bucket), 60.0);
        assert_eq!(category_average(&CategoryBucket::default()), 0.0);
    }

    #[test]
    fn attendance_rate_is_read_when_present() {
        let snapshot = StudentSnapshot {
            attendance: Some(AttendanceSummary {
                rate: Some(82.0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_eq!(extract_metrics(&snapshot).attendance_rate, 82.0);
    }

    #[test]
    fn weakest_skips_empty_categories_and_keeps_first_on_tie() {
        let scores = CategoryScores {
            written_works: 70.0,
            performance_task: 0.0,
            quarterly_exam: 70.0,
        };
        assert_eq!(scores.weakest(), Some((Category::WrittenWorks, 70.0)));
        assert_eq!(scores.non_zero_mean(), 70.0);
        assert_eq!(CategoryScores::default().weakest(), None);
        assert_eq!(CategoryScores::default().non_zero_mean(), 0.0);
    }

    #[test]
    fn rounding_goes_up_on_halves() {
        assert_eq!(round_half_up(2.5), 3.0);
        assert_eq!(round_half_up(-4.5), -4.0);
        assert_eq!(round_half_up(-3.6), -4.0);
        assert_eq!(round_half_up(3.4), 3.0);
        assert_eq!(round_half_up(0.49999999999999994), 0.0);
        assert_eq!(round_half_up(-0.5), 0.0);
    }
}
