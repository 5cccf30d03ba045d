use super::{Severity, Vulnerability, VulnerabilityCounts};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AllowlistStatus {
    /// No allowlist entry covers this advisory.
    New,
    /// Covered by an allowlist entry that has not expired.
    Allowed,
    /// Covered by an allowlist entry whose expiry has passed.
    Expired,
}

impl AllowlistStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AllowlistStatus::New => "new",
            AllowlistStatus::Allowed => "allowed",
            AllowlistStatus::Expired => "expired",
        }
    }
}

/// A blocking vulnerability together with the allowlist decision made for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedVulnerability {
    #[serde(flatten)]
    pub vulnerability: Vulnerability,
    pub allowlist_status: AllowlistStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl ClassifiedVulnerability {
    pub fn id(&self) -> &str {
        &self.vulnerability.id
    }

    pub fn package(&self) -> &str {
        &self.vulnerability.package
    }

    pub fn severity(&self) -> Severity {
        self.vulnerability.severity
    }
}

/// Outcome of one analysis run.
///
/// The three status lists partition the blocking advisories of the report.
/// `expiring_entries` is a subset of `allowed_vulnerabilities` and never
/// affects `is_successful`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub vulnerabilities: Vec<ClassifiedVulnerability>,
    pub allowed_vulnerabilities: Vec<ClassifiedVulnerability>,
    pub expired_allowlist_entries: Vec<ClassifiedVulnerability>,
    pub expiring_entries: Vec<ClassifiedVulnerability>,
    pub is_successful: bool,
    /// Report shape that was detected, `None` when the shape was not recognised.
    pub format: Option<super::ReportFormat>,
    pub metadata: VulnerabilityCounts,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl AnalysisResult {
    pub fn new(
        vulnerabilities: Vec<ClassifiedVulnerability>,
        allowed_vulnerabilities: Vec<ClassifiedVulnerability>,
        expired_allowlist_entries: Vec<ClassifiedVulnerability>,
        expiring_entries: Vec<ClassifiedVulnerability>,
    ) -> Self {
        let is_successful = vulnerabilities.is_empty() && expired_allowlist_entries.is_empty();
        Self {
            vulnerabilities,
            allowed_vulnerabilities,
            expired_allowlist_entries,
            expiring_entries,
            is_successful,
            format: None,
            metadata: VulnerabilityCounts::default(),
            warnings: Vec::new(),
        }
    }

    /// Total number of blocking advisories across the three status lists.
    pub fn classified_count(&self) -> usize {
        self.vulnerabilities.len()
            + self.allowed_vulnerabilities.len()
            + self.expired_allowlist_entries.len()
    }
}
