//! Core data types for advisories, allowlist entries, and analysis results.
//!
//! This module contains the fundamental types used throughout auditgate:
//!
//! - [`Vulnerability`] - A canonical advisory row, whatever report shape it came from
//! - [`Severity`] - Advisory severity as reported by the package manager
//! - [`ReportFormat`] - The report shape a vulnerability was normalized from
//! - [`AllowlistEntry`] - A reviewed, time-bound exception
//! - [`ClassifiedVulnerability`] - A vulnerability tagged with its allowlist status
//! - [`AnalysisResult`] - Complete analysis results
//!
//! # Example
//!
//! ```
//! use auditgate::{ReportFormat, Severity, Vulnerability};
//!
//! let vuln = Vulnerability::new("1065", "lodash", Severity::High, ReportFormat::Legacy);
//!
//! assert!(vuln.severity.is_blocking());
//! ```

mod allowlist;
mod result;
mod vulnerability;

pub use allowlist::*;
pub use result::*;
pub use vulnerability::*;
