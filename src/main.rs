use std::path::PathBuf;

use anyhow::Context;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use academic_early_warning::config::AppConfig;
use academic_early_warning::models::{AttendanceSummary, PerformanceRecord, StudentSnapshot};
use academic_early_warning::{compute_insights, compute_plan, input, report};

#[derive(Parser)]
#[command(name = "academic-early-warning")]
#[command(about = "Academic risk scoring and grade projection for student records", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Optional TOML config file
    #[arg(long, global = true, env = "EARLY_WARNING_CONFIG")]
    config: Option<PathBuf>,

    #[arg(long, short, global = true)]
    verbose: bool,

    #[arg(long, short, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute standing, risk, expected grade and gaps for one snapshot
    Insights {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Build the improvement plan for one snapshot
    Plan {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Rank several snapshots by risk score
    Rank {
        #[arg(long = "input", required = true, num_args = 1..)]
        inputs: Vec<PathBuf>,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Generate a markdown report for one snapshot
    Report {
        #[arg(long)]
        input: PathBuf,
        #[arg(long, default_value = "report.md")]
        out: PathBuf,
        #[arg(long)]
        no_plan: bool,
    },
    /// Build a snapshot from a CSV of grade items
    Import {
        #[arg(long)]
        csv: PathBuf,
        #[arg(long, default_value = "snapshot.json")]
        out: PathBuf,
        #[arg(long)]
        overall_grade: Option<f64>,
        #[arg(long)]
        attendance_rate: Option<f64>,
        #[arg(long)]
        student: Option<String>,
        #[arg(long)]
        subject: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "warn"
    } else {
        "info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = AppConfig::load(cli.config.as_deref()).context("failed to load config")?;
    let target = config.gaps.custom_target;

    match cli.command {
        Commands::Insights { input: path, json } => {
            let snapshot = input::load_snapshot(&path)?;
            let Some(insights) = compute_insights(snapshot.as_ref(), target) else {
                println!("No performance data available.");
                return Ok(());
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&insights)?);
                return Ok(());
            }

            println!(
                "Grade {:.1} ({}, {}), expected {:.0}",
                insights.current_grade,
                insights.performance_level.as_str(),
                insights.subject_standing.as_str(),
                insights.expected_grade
            );
            println!(
                "Risk {} ({:.0}/100), trend {} ({:+.1})",
                insights.risk_level.as_str(),
                insights.risk_score,
                insights.trend_direction.as_str(),
                insights.trend_change
            );
            for factor in &insights.risk_factors {
                println!("- [{}] {}", factor.severity.as_str(), factor.text);
            }
        }
        Commands::Plan { input: path, json } => {
            let snapshot = input::load_snapshot(&path)?;
            let Some(insights) = compute_insights(snapshot.as_ref(), target) else {
                println!("No performance data available.");
                return Ok(());
            };
            let plan = compute_plan(&insights);

            if json {
                println!("{}", serde_json::to_string_pretty(&plan)?);
                return Ok(());
            }

            if plan.is_already_met {
                println!("{}", plan.conclusion.message);
                return Ok(());
            }

            println!(
                "Gap to {:.0}: {:.0} points from expected grade {:.0}",
                plan.target_grade, plan.gap_to_target, insights.expected_grade
            );
            for (index, step) in plan.steps.iter().enumerate() {
                println!(
                    "{}. {} ({} -> {}): +{:.0}",
                    index + 1,
                    step.title,
                    step.current_value,
                    step.target_value,
                    step.grade_impact
                );
            }
            println!("{}", plan.conclusion.message);
        }
        Commands::Rank { inputs, limit } => {
            let mut snapshots = Vec::with_capacity(inputs.len());
            for path in &inputs {
                snapshots.push(
                    input::load_snapshot(path)
                        .with_context(|| format!("failed to load {}", path.display()))?,
                );
            }

            let ranked = report::rank_snapshots(&snapshots, target);
            if ranked.is_empty() {
                println!("No records with performance data.");
                return Ok(());
            }

            let limit = limit.unwrap_or(config.report.rank_limit);
            println!("Top records by risk score:");
            for (record, _) in ranked.iter().take(limit) {
                println!(
                    "- {} grade {:.1}, expected {:.0}, risk {} ({:.0}) with {} factors",
                    record.name,
                    record.current_grade,
                    record.expected_grade,
                    record.risk_level.as_str(),
                    record.risk_score,
                    record.factor_count
                );
            }

            let summaries = report::summarize_factors(ranked.iter().map(|(_, insights)| insights));
            if !summaries.is_empty() {
                println!();
                println!("Risk factor mix:");
                for summary in summaries {
                    println!(
                        "- {} [{}]: {} records",
                        summary.text,
                        summary.severity.as_str(),
                        summary.count
                    );
                }
            }
        }
        Commands::Report {
            input: path,
            out,
            no_plan,
        } => {
            let snapshot = input::load_snapshot(&path)?;
            let Some(snapshot) = snapshot else {
                println!("No performance data available; report skipped.");
                return Ok(());
            };
            let insights = compute_insights(Some(&snapshot), target)
                .context("insights missing for a present record")?;
            let plan = (config.report.include_plan && !no_plan).then(|| compute_plan(&insights));

            let text = report::build_report(
                &snapshot,
                &insights,
                plan.as_ref(),
                Utc::now().date_naive(),
            );
            std::fs::write(&out, text)
                .with_context(|| format!("failed to write {}", out.display()))?;
            info!("report written to {}", out.display());
            println!("Report written to {}.", out.display());
        }
        Commands::Import {
            csv,
            out,
            overall_grade,
            attendance_rate,
            student,
            subject,
        } => {
            let breakdown = input::import_grade_items_from_path(&csv)?;
            let item_count = breakdown.written_works.items.len()
                + breakdown.performance_task.items.len()
                + breakdown.quarterly_exam.items.len();

            let snapshot = StudentSnapshot {
                student_name: student,
                subject,
                performance: Some(PerformanceRecord {
                    overall_grade,
                    grade_breakdown: breakdown,
                    ..Default::default()
                }),
                attendance: attendance_rate.map(|rate| AttendanceSummary {
                    rate: Some(rate),
                    ..Default::default()
                }),
                grade_trend: Vec::new(),
            };
            input::save_snapshot(&out, &snapshot)?;
            info!(item_count, "snapshot saved");
            println!(
                "Imported {item_count} grade items from {} into {}.",
                csv.display(),
                out.display()
            );
        }
    }

    Ok(())
}
