pub mod classify;
pub mod config;
pub mod error;
pub mod gap;
pub mod input;
pub mod insights;
pub mod metrics;
pub mod models;
pub mod plan;
pub mod projection;
pub mod report;
pub mod risk;

pub use error::{InsightsError, Result};
pub use insights::{compute_insights, InsightResult};
pub use models::StudentSnapshot;
pub use plan::{compute_plan, ImprovementPlan};
