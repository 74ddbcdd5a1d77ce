use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{InsightsError, Result};
use crate::models::{Category, GradeBreakdown, GradeItem, StudentSnapshot};

/// Reads a snapshot file. A document that is literally `null` means there is
/// no record for the student, which is not an error.
pub fn load_snapshot(path: &Path) -> Result<Option<StudentSnapshot>> {
    let raw = std::fs::read_to_string(path).map_err(|source| InsightsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot: Option<StudentSnapshot> =
        serde_json::from_str(&raw).map_err(|source| InsightsError::Json {
            path: path.to_path_buf(),
            source,
        })?;

    debug!(
        "loaded {} from {}",
        snapshot
            .as_ref()
            .map(StudentSnapshot::display_name)
            .unwrap_or_else(|| "empty record".to_string()),
        path.display()
    );
    Ok(snapshot)
}

pub fn save_snapshot(path: &Path, snapshot: &StudentSnapshot) -> Result<()> {
    let json = serde_json::to_string_pretty(snapshot).map_err(|source| InsightsError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    std::fs::write(path, json).map_err(|source| InsightsError::Io {
        path: path.to_path_buf(),
        source,
    })
}

pub fn parse_category(raw: &str) -> Result<Category> {
    match raw.trim().to_lowercase().replace(['-', ' '], "_").as_str() {
        "written_works" | "writtenworks" | "ww" => Ok(Category::WrittenWorks),
        "performance_task" | "performance_tasks" | "performancetask" | "pt" => {
            Ok(Category::PerformanceTask)
        }
        "quarterly_exam" | "quarterlyexam" | "qe" => Ok(Category::QuarterlyExam),
        _ => Err(InsightsError::UnknownCategory(raw.to_string())),
    }
}

#[derive(serde::Deserialize)]
struct CsvRow {
    category: String,
    name: String,
    score: f64,
    total_score: f64,
    quarter: Option<u32>,
    date: Option<NaiveDate>,
    id: Option<String>,
}

/// Folds grade item rows into a breakdown. Averages are left unset so the
/// metrics stage recomputes them from the item percentages.
pub fn import_grade_items<R: Read>(source: R) -> Result<GradeBreakdown> {
    let mut reader = csv::Reader::from_reader(source);
    let mut breakdown = GradeBreakdown::default();
    let mut imported = 0usize;

    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let line = index as u64 + 2;
        let category = parse_category(&row.category)?;

        if row.score < 0.0 {
            return Err(InsightsError::InvalidGradeItem {
                name: row.name,
                line,
                reason: format!("negative score {}", row.score),
            });
        }
        if row.total_score <= 0.0 {
            warn!(line, name = %row.name, "skipping grade item without a positive total score");
            continue;
        }

        let id = row
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| format!("item-{}", Uuid::new_v4()));

        let bucket = breakdown.bucket_mut(category);
        bucket.items.push(GradeItem {
            id,
            percentage: row.score / row.total_score * 100.0,
            name: row.name,
            score: row.score,
            total_score: row.total_score,
            quarter: row.quarter,
            date: row.date,
        });
        bucket.count = bucket.items.len();
        imported += 1;
    }

    debug!(imported, "grade items imported");
    Ok(breakdown)
}

pub fn import_grade_items_from_path(path: &Path) -> Result<GradeBreakdown> {
    let file = std::fs::File::open(path).map_err(|source| InsightsError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    import_grade_items(file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const GRADES_CSV: &str = "\
category,name,score,total_score,quarter,date,id
ww,Quiz 1,8,10,1,2026-06-14,ww-001
written_works,Quiz 2,9,10,1,2026-06-21,
performance-task,Lab Report,42,50,1,2026-06-28,pt-001
QE,First Quarter Exam,45,60,1,,qe-001
";

    #[test]
    fn imports_rows_into_categories() {
        let breakdown = import_grade_items(GRADES_CSV.as_bytes()).unwrap();

        assert_eq!(breakdown.written_works.items.len(), 2);
        assert_eq!(breakdown.written_works.count, 2);
        assert_eq!(breakdown.performance_task.items.len(), 1);
        assert_eq!(breakdown.quarterly_exam.items.len(), 1);

        let quiz = &breakdown.written_works.items[0];
        assert_eq!(quiz.id, "ww-001");
        assert_eq!(quiz.percentage, 80.0);
        assert_eq!(quiz.date, NaiveDate::from_ymd_opt(2026, 6, 14));

        let generated = &breakdown.written_works.items[1];
        assert!(generated.id.starts_with("item-"));

        assert_eq!(breakdown.quarterly_exam.items[0].percentage, 75.0);
        assert_eq!(breakdown.quarterly_exam.items[0].date, None);
        assert_eq!(breakdown.written_works.average, None);
    }

    #[test]
    fn unknown_category_is_an_error() {
        let csv = "category,name,score,total_score,quarter,date,id\nhomework,Sheet,5,10,1,,\n";
        let err = import_grade_items(csv.as_bytes()).unwrap_err();
        assert!(matches!(err, InsightsError::UnknownCategory(ref c) if c == "homework"));
    }

    #[test]
    fn negative_score_reports_line() {
        let csv = "category,name,score,total_score,quarter,date,id\nww,Quiz,8,10,1,,\nww,Bad,-1,10,1,,\n";
        let err = import_grade_items(csv.as_bytes()).unwrap_err();
        match err {
            InsightsError::InvalidGradeItem { line, name, .. } => {
                assert_eq!(line, 3);
                assert_eq!(name, "Bad");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn zero_total_rows_are_skipped() {
        let csv = "category,name,score,total_score,quarter,date,id\npt,Ungraded,0,0,2,,\n";
        let breakdown = import_grade_items(csv.as_bytes()).unwrap();
        assert!(breakdown.performance_task.items.is_empty());
    }

    #[test]
    fn null_snapshot_file_loads_as_none() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "null").unwrap();
        assert!(load_snapshot(file.path()).unwrap().is_none());
    }

    #[test]
    fn snapshot_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        let snapshot = StudentSnapshot {
            student_name: Some("Kiara Patel".to_string()),
            ..Default::default()
        };

        save_snapshot(&path, &snapshot).unwrap();
        assert_eq!(load_snapshot(&path).unwrap(), Some(snapshot));
    }

    #[test]
    fn malformed_snapshot_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ \"performance\": ").unwrap();
        let err = load_snapshot(file.path()).unwrap_err();
        assert!(matches!(err, InsightsError::Json { .. }));
        assert!(err.to_string().contains("invalid snapshot JSON"));
    }

    #[test]
    fn missing_snapshot_file_is_io_error() {
        let err = load_snapshot(Path::new("/nonexistent/snapshot.json")).unwrap_err();
        assert!(matches!(err, InsightsError::Io { .. }));
    }
}
