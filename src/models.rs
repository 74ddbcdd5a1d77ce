use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One graded artifact as delivered by the grades service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeItem {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub score: f64,
    #[serde(default)]
    pub total_score: f64,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub quarter: Option<u32>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryBucket {
    #[serde(default)]
    pub items: Vec<GradeItem>,
    #[serde(default)]
    pub average: Option<f64>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradeBreakdown {
    #[serde(default)]
    pub written_works: CategoryBucket,
    #[serde(default)]
    pub performance_task: CategoryBucket,
    #[serde(default)]
    pub quarterly_exam: CategoryBucket,
}

impl GradeBreakdown {
    pub fn bucket(&self, category: Category) -> &CategoryBucket {
        match category {
            Category::WrittenWorks => &self.written_works,
            Category::PerformanceTask => &self.performance_task,
            Category::QuarterlyExam => &self.quarterly_exam,
        }
    }

    pub fn bucket_mut(&mut self, category: Category) -> &mut CategoryBucket {
        match category {
            Category::WrittenWorks => &mut self.written_works,
            Category::PerformanceTask => &mut self.performance_task,
            Category::QuarterlyExam => &mut self.quarterly_exam,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuarterlyGrade {
    pub quarter: u32,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub grade: Option<f64>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub expected_grade: Option<f64>,
    #[serde(default)]
    pub attendance: Option<f64>,
    #[serde(default)]
    pub item_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    #[serde(default)]
    pub overall_grade: Option<f64>,
    #[serde(default)]
    pub remarks: Option<String>,
    #[serde(default)]
    pub grade_breakdown: GradeBreakdown,
    #[serde(default)]
    pub quarterly_grades: Vec<QuarterlyGrade>,
}

/// Attendance totals for the subject. `present_days + absent_days <= total_days`
/// is assumed, not checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceSummary {
    #[serde(default)]
    pub rate: Option<f64>,
    #[serde(default)]
    pub total_days: u32,
    #[serde(default)]
    pub present_days: u32,
    #[serde(default)]
    pub absent_days: u32,
    #[serde(default)]
    pub late_days: u32,
    #[serde(default)]
    pub excused_days: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(default)]
    pub label: String,
    pub value: f64,
}

/// Everything the engine reads for one student in one subject.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentSnapshot {
    #[serde(default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub subject: Option<String>,
    #[serde(default)]
    pub performance: Option<PerformanceRecord>,
    #[serde(default)]
    pub attendance: Option<AttendanceSummary>,
    #[serde(default)]
    pub grade_trend: Vec<TrendPoint>,
}

impl StudentSnapshot {
    pub fn display_name(&self) -> String {
        match (&self.student_name, &self.subject) {
            (Some(name), Some(subject)) => format!("{name} ({subject})"),
            (Some(name), None) => name.clone(),
            (None, Some(subject)) => subject.clone(),
            (None, None) => "Unnamed record".to_string(),
        }
    }
}

/// Grading categories in their fixed evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    WrittenWorks,
    PerformanceTask,
    QuarterlyExam,
}

pub const WRITTEN_WORKS_WEIGHT: f64 = 0.25;
pub const PERFORMANCE_TASK_WEIGHT: f64 = 0.50;
pub const QUARTERLY_EXAM_WEIGHT: f64 = 0.25;

impl Category {
    pub const ALL: [Category; 3] = [
        Category::WrittenWorks,
        Category::PerformanceTask,
        Category::QuarterlyExam,
    ];

    pub fn weight(self) -> f64 {
        match self {
            Category::WrittenWorks => WRITTEN_WORKS_WEIGHT,
            Category::PerformanceTask => PERFORMANCE_TASK_WEIGHT,
            Category::QuarterlyExam => QUARTERLY_EXAM_WEIGHT,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Category::WrittenWorks => "Written Works",
            Category::PerformanceTask => "Performance Tasks",
            Category::QuarterlyExam => "Quarterly Exam",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub text: String,
    pub severity: Severity,
}
