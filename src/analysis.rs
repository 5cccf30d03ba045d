//! The single entry point that turns a report and an allowlist into a verdict.
//!
//! Analysis is a pure function of its inputs. The current time is passed in
//! by the caller, so identical inputs always produce identical results.
//!
//! # Example
//!
//! ```
//! use auditgate::analyze;
//! use chrono::{TimeZone, Utc};
//!
//! let report = r#"{
//!   "advisories": { "1234": { "id": 1234, "module_name": "lodash", "severity": "high" } },
//!   "metadata": { "vulnerabilities": { "high": 1 } }
//! }"#;
//! let allowlist = r#"[{ "id": "1234", "package": "lodash", "reason": "dev only", "expires": "2031-01-01" }]"#;
//! let now = Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap();
//!
//! let result = analyze(report, Some(allowlist), now)?;
//! assert!(result.is_successful);
//! assert_eq!(result.allowed_vulnerabilities.len(), 1);
//! # Ok::<(), auditgate::AnalysisError>(())
//! ```

use crate::allowlist::parse_allowlist;
use crate::classifier::classify;
use crate::error::AnalysisError;
use crate::expiry::DEFAULT_EXPIRING_THRESHOLD_DAYS;
use crate::model::AnalysisResult;
use crate::report::parse_report;
use chrono::{DateTime, Utc};

/// Tunables for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisOptions {
    /// Allowed entries expiring within this many days are reported as expiring.
    pub expiring_threshold_days: i64,
}

impl Default for AnalysisOptions {
    fn default() -> Self {
        Self {
            expiring_threshold_days: DEFAULT_EXPIRING_THRESHOLD_DAYS,
        }
    }
}

/// Analyzes a raw audit report against an optional raw allowlist.
///
/// Uses the default 30 day expiring window.
///
/// # Errors
///
/// Returns the first failing stage's error unchanged. The report is parsed
/// before the allowlist, and nothing is classified unless both succeed.
pub fn analyze(
    report: &str,
    allowlist: Option<&str>,
    now: DateTime<Utc>,
) -> Result<AnalysisResult, AnalysisError> {
    analyze_with(report, allowlist, now, &AnalysisOptions::default())
}

/// Like [`analyze`], with explicit options.
pub fn analyze_with(
    report: &str,
    allowlist: Option<&str>,
    now: DateTime<Utc>,
    options: &AnalysisOptions,
) -> Result<AnalysisResult, AnalysisError> {
    let report = parse_report(report)?;
    let entries = parse_allowlist(allowlist)?;

    let classification = classify(
        &report.vulnerabilities,
        &entries,
        now,
        options.expiring_threshold_days,
    );

    let mut result = AnalysisResult::new(
        classification.new,
        classification.allowed,
        classification.expired,
        classification.expiring,
    );
    result.format = report.format.report_format();
    result.metadata = report.metadata;
    result.warnings = report.warnings;

    Ok(result)
}
