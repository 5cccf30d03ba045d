use serde::{Deserialize, Serialize};

/// Range substituted when a report omits the affected versions.
pub const ANY_VERSION_RANGE: &str = "*";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Low,
    Moderate,
    High,
    Critical,
}

impl Severity {
    /// Parses a severity label from a report.
    ///
    /// Labels are case-insensitive and `medium` is accepted for `moderate`.
    /// Anything unrecognised yields `None`.
    pub fn parse(label: &str) -> Option<Self> {
        match label.trim().to_ascii_lowercase().as_str() {
            "info" => Some(Severity::Info),
            "low" => Some(Severity::Low),
            "moderate" | "medium" => Some(Severity::Moderate),
            "high" => Some(Severity::High),
            "critical" => Some(Severity::Critical),
            _ => None,
        }
    }

    /// Whether this severity can fail a build. Only high and critical do.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Severity::High | Severity::Critical)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Low => "low",
            Severity::Moderate => "moderate",
            Severity::High => "high",
            Severity::Critical => "critical",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The report shape a vulnerability was normalized from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// Advisory-keyed report (`advisories` map), as written by npm 6.
    Legacy,
    /// Package-keyed report (`vulnerabilities` map with `via` lists), as written by npm 7+.
    Modern,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Legacy => "legacy",
            ReportFormat::Modern => "modern",
        }
    }
}

impl std::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single advisory affecting a single package, in canonical form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    pub id: String,
    pub package: String,
    pub severity: Severity,
    pub title: String,
    pub url: String,
    pub vulnerable_versions: String,
    pub source: ReportFormat,
}

impl Vulnerability {
    pub fn new(
        id: impl Into<String>,
        package: impl Into<String>,
        severity: Severity,
        source: ReportFormat,
    ) -> Self {
        Self {
            id: id.into(),
            package: package.into(),
            severity,
            title: String::new(),
            url: String::new(),
            vulnerable_versions: ANY_VERSION_RANGE.to_string(),
            source,
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_range(mut self, range: impl Into<String>) -> Self {
        let range = range.into();
        self.vulnerable_versions = if range.trim().is_empty() {
            ANY_VERSION_RANGE.to_string()
        } else {
            range
        };
        self
    }
}

/// Per-severity advisory counts copied from the report's `metadata` block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VulnerabilityCounts {
    pub info: u64,
    pub low: u64,
    pub moderate: u64,
    pub high: u64,
    pub critical: u64,
    pub total: u64,
}
