//! Sanitized, machine-oriented log summary.
//!
//! Log sinks are often shipped off-host, so records here never carry
//! free-text fields: no allowlist reason or notes, no advisory title or URL.

use crate::model::{AllowlistStatus, AnalysisResult, ClassifiedVulnerability, Severity};
use serde::Serialize;
use tracing::{info, warn};

/// The only vulnerability fields allowed on the log channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord<'a> {
    pub package: &'a str,
    pub id: &'a str,
    pub severity: Severity,
    pub status: AllowlistStatus,
}

impl<'a> From<&'a ClassifiedVulnerability> for LogRecord<'a> {
    fn from(vuln: &'a ClassifiedVulnerability) -> Self {
        Self {
            package: vuln.package(),
            id: vuln.id(),
            severity: vuln.severity(),
            status: vuln.allowlist_status,
        }
    }
}

/// Emits one event per classified vulnerability plus a summary event.
pub fn log_summary(result: &AnalysisResult) {
    for warning in &result.warnings {
        warn!(warning = %warning, "audit report warning");
    }

    for record in result.vulnerabilities.iter().map(LogRecord::from) {
        warn!(package = record.package, id = record.id, severity = %record.severity, status = record.status.as_str(), "vulnerability not in allowlist");
    }

    for record in result.expired_allowlist_entries.iter().map(LogRecord::from) {
        warn!(package = record.package, id = record.id, severity = %record.severity, status = record.status.as_str(), "allowlist entry expired");
    }

    for record in result.allowed_vulnerabilities.iter().map(LogRecord::from) {
        info!(package = record.package, id = record.id, severity = %record.severity, status = record.status.as_str(), "vulnerability allowlisted");
    }

    for record in result.expiring_entries.iter().map(LogRecord::from) {
        warn!(package = record.package, id = record.id, severity = %record.severity, status = record.status.as_str(), "allowlist entry expiring soon");
    }

    info!(
        format = result.format.map(|f| f.as_str()).unwrap_or("unknown"),
        new = result.vulnerabilities.len(),
        allowed = result.allowed_vulnerabilities.len(),
        expired = result.expired_allowlist_entries.len(),
        expiring = result.expiring_entries.len(),
        success = result.is_successful,
        "audit analysis complete"
    );
}
