pub mod allowlist;
pub mod analysis;
pub mod audit;
pub mod classifier;
pub mod config;
pub mod error;
pub mod expiry;
pub mod model;
pub mod output;
pub mod report;

pub use analysis::{analyze, analyze_with, AnalysisOptions};
pub use config::Config;
pub use error::AnalysisError;
pub use model::{
    AllowlistEntry, AllowlistStatus, AnalysisResult, ClassifiedVulnerability, ReportFormat,
    Severity, Vulnerability, VulnerabilityCounts,
};
