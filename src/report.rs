use std::collections::HashMap;
use std::fmt::Write;

use chrono::NaiveDate;

use crate::insights::{compute_insights, InsightResult};
use crate::models::{Severity, StudentSnapshot};
use crate::plan::ImprovementPlan;
use crate::risk::RiskLevel;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedRecord {
    pub name: String,
    pub current_grade: f64,
    pub expected_grade: f64,
    pub risk_score: f64,
    pub risk_level: RiskLevel,
    pub factor_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactorSummary {
    pub text: String,
    pub severity: Severity,
    pub count: usize,
}

/// Highest risk first; equal scores put the lower expected grade first.
/// Records that are entirely absent are skipped.
pub fn rank_snapshots(
    snapshots: &[Option<StudentSnapshot>],
    target_grade: f64,
) -> Vec<(RankedRecord, InsightResult)> {
    let mut ranked: Vec<(RankedRecord, InsightResult)> = snapshots
        .iter()
        .filter_map(|snapshot| {
            let snapshot = snapshot.as_ref()?;
            let insights = compute_insights(Some(snapshot), target_grade)?;
            let record = RankedRecord {
                name: snapshot.display_name(),
                current_grade: insights.current_grade,
                expected_grade: insights.expected_grade,
                risk_score: insights.risk_score,
                risk_level: insights.risk_level,
                factor_count: insights.risk_factors.len(),
            };
            Some((record, insights))
        })
        .collect();

    ranked.sort_by(|(a, _), (b, _)| {
        b.risk_score
            .partial_cmp(&a.risk_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(
                a.expected_grade
                    .partial_cmp(&b.expected_grade)
                    .unwrap_or(std::cmp::Ordering::Equal),
            )
    });
    ranked
}

pub fn summarize_factors<'a, I>(results: I) -> Vec<FactorSummary>
where
    I: IntoIterator<Item = &'a InsightResult>,
{
    let mut map: HashMap<String, (Severity, usize)> = HashMap::new();

    for insights in results {
        for factor in &insights.risk_factors {
            let key = factor_key(&factor.text);
            let entry = map.entry(key).or_insert((factor.severity, 0));
            entry.1 += 1;
        }
    }

    let mut summaries: Vec<FactorSummary> = map
        .into_iter()
        .map(|(text, (severity, count))| FactorSummary {
            text,
            severity,
            count,
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.text.cmp(&b.text)));
    summaries
}

/// Strips the per-record percentage so the same factor groups together.
fn factor_key(text: &str) -> String {
    match text.find(" (") {
        Some(index) if text.ends_with("%)") && !text.ends_with("(75%)") => text[..index].to_string(),
        _ => text.to_string(),
    }
}

fn format_gap(gap: Option<f64>) -> String {
    match gap {
        Some(value) => format!("{value:.1}"),
        None => "n/a".to_string(),
    }
}

pub fn build_report(
    snapshot: &StudentSnapshot,
    insights: &InsightResult,
    plan: Option<&ImprovementPlan>,
    generated_on: NaiveDate,
) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Academic Insights Report");
    let _ = writeln!(
        output,
        "Generated for {} on {}",
        snapshot.display_name(),
        generated_on
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Standing");
    let _ = writeln!(
        output,
        "- Current grade: {:.1} ({}, {})",
        insights.current_grade,
        insights.performance_level.as_str(),
        insights.subject_standing.as_str()
    );
    let _ = writeln!(output, "- Expected grade: {:.0}", insights.expected_grade);
    let _ = writeln!(
        output,
        "- Risk: {} (score {:.0}/100)",
        insights.risk_level.as_str(),
        insights.risk_score
    );
    let _ = writeln!(
        output,
        "- Trend: {} ({:+.1})",
        insights.trend_direction.as_str(),
        insights.trend_change
    );

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Factors");
    if insights.risk_factors.is_empty() {
        let _ = writeln!(output, "No risk factors detected.");
    } else {
        for factor in &insights.risk_factors {
            let _ = writeln!(output, "- [{}] {}", factor.severity.as_str(), factor.text);
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Expected Grade Breakdown");
    for adjustment in &insights.adjustments {
        let _ = writeln!(
            output,
            "- {} ({}): {:+.0} via {}",
            adjustment.label, adjustment.value, adjustment.impact, adjustment.formula
        );
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Gap Analysis");
    let _ = writeln!(output, "| Milestone | Gap |");
    let _ = writeln!(output, "|---|---|");
    let _ = writeln!(output, "| 90 | {} |", format_gap(insights.gaps.gap_to_90));
    let _ = writeln!(output, "| 85 | {} |", format_gap(insights.gaps.gap_to_85));
    let _ = writeln!(output, "| 75 | {} |", format_gap(insights.gaps.gap_to_75));
    let _ = writeln!(
        output,
        "| Target {:.0} | {} |",
        insights.gaps.target_grade,
        format_gap(insights.gaps.gap_to_target)
    );
    let _ = writeln!(
        output,
        "| Expected vs 85 | {:.1} |",
        insights.gaps.expected_to_85_gap
    );

    if let Some(performance) = &snapshot.performance {
        if !performance.quarterly_grades.is_empty() {
            let _ = writeln!(output);
            let _ = writeln!(output, "## Quarterly Grades");
            for quarter in &performance.quarterly_grades {
                let label = if quarter.label.is_empty() {
                    format!("Q{}", quarter.quarter)
                } else {
                    quarter.label.clone()
                };
                let grade = quarter
                    .grade
                    .map(|g| format!("{g:.1}"))
                    .unwrap_or_else(|| "pending".to_string());
                let _ = writeln!(
                    output,
                    "- {}: {} ({} items){}",
                    label,
                    grade,
                    quarter.item_count,
                    quarter
                        .remarks
                        .as_deref()
                        .map(|r| format!(" - {r}"))
                        .unwrap_or_default()
                );
            }
        }
    }

    if let Some(attendance) = &snapshot.attendance {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Attendance");
        let _ = writeln!(
            output,
            "- {:.0}% over {} days: {} present, {} absent, {} late, {} excused",
            insights.attendance_rate,
            attendance.total_days,
            attendance.present_days,
            attendance.absent_days,
            attendance.late_days,
            attendance.excused_days
        );
    }

    if let Some(plan) = plan {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Improvement Plan");
        if plan.is_already_met {
            let _ = writeln!(output, "{}", plan.conclusion.message);
        } else {
            let _ = writeln!(
                output,
                "Target {:.0}, gap {:.0} points from the expected grade.",
                plan.target_grade, plan.gap_to_target
            );
            for (index, step) in plan.steps.iter().enumerate() {
                let _ = writeln!(
                    output,
                    "{}. {} ({} -> {}): +{:.0}",
                    index + 1,
                    step.title,
                    step.current_value,
                    step.target_value,
                    step.grade_impact
                );
                let _ = writeln!(output, "   {}", step.action);
                for detail in &step.details {
                    let _ = writeln!(output, "   - {detail}");
                }
            }
            let _ = writeln!(output);
            let _ = writeln!(
                output,
                "Projected grade: {:.0} ({:+.0}). {}",
                plan.conclusion.projected_grade,
                plan.conclusion.gap_closed,
                plan.conclusion.message
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AttendanceSummary, PerformanceRecord, QuarterlyGrade, TrendPoint};
    use crate::plan::{compute_plan, TARGET_GRADE};

    fn sample_snapshot(name: &str, grade: f64, attendance: f64, trend: &[f64]) -> StudentSnapshot {
        StudentSnapshot {
            student_name: Some(name.to_string()),
            subject: Some("Science".to_string()),
            performance: Some(PerformanceRecord {
                overall_grade: Some(grade),
                quarterly_grades: vec![QuarterlyGrade {
                    quarter: 1,
                    label: "First Quarter".to_string(),
                    grade: Some(grade),
                    remarks: Some("Needs follow-up".to_string()),
                    expected_grade: None,
                    attendance: Some(attendance),
                    item_count: 6,
                }],
                ..Default::default()
            }),
            attendance: Some(AttendanceSummary {
                rate: Some(attendance),
                total_days: 40,
                present_days: 34,
                absent_days: 6,
                late_days: 2,
                excused_days: 1,
            }),
            grade_trend: trend
                .iter()
                .map(|value| TrendPoint {
                    label: String::new(),
                    value: *value,
                })
                .collect(),
        }
    }

    #[test]
    fn ranks_by_risk_then_expected_grade() {
        let snapshots = vec![
            Some(sample_snapshot("Avery Lee", 91.0, 98.0, &[88.0, 91.0])),
            None,
            Some(sample_snapshot("Jules Moreno", 72.0, 78.0, &[80.0, 75.0, 70.0])),
            Some(sample_snapshot("Kiara Patel", 77.0, 85.0, &[])),
        ];

        let ranked = rank_snapshots(&snapshots, TARGET_GRADE);
        let names: Vec<&str> = ranked.iter().map(|(r, _)| r.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Jules Moreno (Science)",
                "Kiara Patel (Science)",
                "Avery Lee (Science)"
            ]
        );
        assert_eq!(ranked[0].0.risk_level, RiskLevel::High);
    }

    #[test]
    fn factor_summary_groups_across_records() {
        let snapshots = vec![
            Some(sample_snapshot("Jules Moreno", 72.0, 78.0, &[])),
            Some(sample_snapshot("Kiara Patel", 70.0, 60.0, &[])),
        ];
        let ranked = rank_snapshots(&snapshots, TARGET_GRADE);
        let summaries = summarize_factors(ranked.iter().map(|(_, insights)| insights));

        let attendance = summaries
            .iter()
            .find(|s| s.text == "Low attendance")
            .unwrap();
        assert_eq!(attendance.count, 2);
        assert_eq!(attendance.severity, Severity::High);
        assert!(summaries.iter().any(|s| s.text == "Below passing grade (75%)" && s.count == 2));
    }

    #[test]
    fn report_contains_plan_and_gaps() {
        let snapshot = sample_snapshot("Jules Moreno", 72.0, 78.0, &[80.0, 75.0, 70.0]);
        let insights = compute_insights(Some(&snapshot), TARGET_GRADE).unwrap();
        let plan = compute_plan(&insights);
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();

        let report = build_report(&snapshot, &insights, Some(&plan), date);
        assert!(report.starts_with("# Academic Insights Report"));
        assert!(report.contains("Generated for Jules Moreno (Science) on 2026-10-16"));
        assert!(report.contains("- [high] Below passing grade (75%)"));
        assert!(report.contains("| 75 | 3.0 |"));
        assert!(report.contains("- First Quarter: 72.0 (6 items) - Needs follow-up"));
        assert!(report.contains("## Improvement Plan"));
        assert!(report.contains("1. Improve Attendance (78% -> 88%): +2"));
    }

    #[test]
    fn report_without_grade_shows_missing_gaps() {
        let snapshot = StudentSnapshot::default();
        let insights = compute_insights(Some(&snapshot), TARGET_GRADE).unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();

        let report = build_report(&snapshot, &insights, None, date);
        assert!(report.contains("| 90 | n/a |"));
        assert!(!report.contains("## Improvement Plan"));
        assert!(!report.contains("## Attendance"));
    }
}
