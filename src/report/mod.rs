//! Audit report detection and normalization.
//!
//! The package manager has written two incompatible report shapes over its
//! history. This module detects which one it was given and converts either
//! into canonical [`Vulnerability`] rows.
//!
//! # Supported Shapes
//!
//! | Normalizer | Format | Marker |
//! |------------|--------|--------|
//! | [`ModernNormalizer`] | [`ReportFormat::Modern`] | `vulnerabilities` map of package records with `via` lists |
//! | [`LegacyNormalizer`] | [`ReportFormat::Legacy`] | `advisories` map of advisory records |
//!
//! Detection tries the modern shape first. A JSON object that matches neither
//! degrades to an empty report carrying only its metadata counts.
//!
//! # Example
//!
//! ```
//! use auditgate::report::{parse_report, DetectedFormat};
//!
//! let raw = r#"{
//!   "advisories": {
//!     "1234": { "id": 1234, "module_name": "lodash", "severity": "high",
//!               "title": "Prototype Pollution", "url": "https://example.test/1234",
//!               "vulnerable_versions": "<4.17.21" }
//!   },
//!   "metadata": { "vulnerabilities": { "info": 0, "low": 0, "moderate": 0, "high": 1, "critical": 0 } }
//! }"#;
//!
//! let report = parse_report(raw)?;
//! assert_eq!(report.format, DetectedFormat::Legacy);
//! assert_eq!(report.vulnerabilities[0].id, "1234");
//! # Ok::<(), auditgate::AnalysisError>(())
//! ```

mod legacy;
mod modern;

pub use legacy::LegacyNormalizer;
pub use modern::ModernNormalizer;

use crate::error::{json_type, AnalysisError, InputKind};
use crate::model::{ReportFormat, Vulnerability, VulnerabilityCounts};
use serde_json::{Map, Value};

/// Report shape resolved once, right after parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectedFormat {
    Legacy,
    Modern,
    Unknown,
}

impl DetectedFormat {
    pub fn report_format(&self) -> Option<ReportFormat> {
        match self {
            DetectedFormat::Legacy => Some(ReportFormat::Legacy),
            DetectedFormat::Modern => Some(ReportFormat::Modern),
            DetectedFormat::Unknown => None,
        }
    }
}

impl From<ReportFormat> for DetectedFormat {
    fn from(format: ReportFormat) -> Self {
        match format {
            ReportFormat::Legacy => DetectedFormat::Legacy,
            ReportFormat::Modern => DetectedFormat::Modern,
        }
    }
}

/// Converts one recognised report shape into canonical rows.
///
/// Implementations never fail: a payload whose shape is wrong is filtered
/// out by [`Normalizer::matches`] before [`Normalizer::normalize`] is called,
/// and missing fields fall back to neutral defaults.
pub trait Normalizer: Send + Sync {
    /// The format tag stamped on every row this normalizer produces.
    fn format(&self) -> ReportFormat;

    /// Returns true if the report root carries this shape's structural markers.
    fn matches(&self, root: &Map<String, Value>) -> bool;

    /// Produces one row per advisory/package pair.
    fn normalize(&self, root: &Map<String, Value>) -> Vec<Vulnerability>;
}

/// Returns the normalizers in detection order.
pub fn all_normalizers() -> Vec<Box<dyn Normalizer>> {
    vec![Box::new(ModernNormalizer), Box::new(LegacyNormalizer)]
}

/// Returns the normalizer for a specific format.
pub fn get_normalizer(format: ReportFormat) -> Box<dyn Normalizer> {
    match format {
        ReportFormat::Legacy => Box::new(LegacyNormalizer),
        ReportFormat::Modern => Box::new(ModernNormalizer),
    }
}

/// A report after detection and normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedReport {
    pub format: DetectedFormat,
    pub vulnerabilities: Vec<Vulnerability>,
    pub metadata: VulnerabilityCounts,
    /// Non-fatal problems found while parsing, for the caller to log.
    pub warnings: Vec<String>,
}

/// Identifies the report shape from its top-level object.
pub fn detect_format(root: &Map<String, Value>) -> DetectedFormat {
    all_normalizers()
        .iter()
        .find(|n| n.matches(root))
        .map(|n| DetectedFormat::from(n.format()))
        .unwrap_or(DetectedFormat::Unknown)
}

/// Parses a raw audit report into canonical form.
///
/// # Errors
///
/// - [`AnalysisError::JsonSyntax`] if the input is not valid JSON
/// - [`AnalysisError::UnsupportedFormat`] if the top-level value is not an object
pub fn parse_report(raw: &str) -> Result<ParsedReport, AnalysisError> {
    let value: Value =
        serde_json::from_str(raw).map_err(|e| AnalysisError::syntax(InputKind::Report, &e))?;

    let root = match value {
        Value::Object(map) => map,
        other => {
            return Err(AnalysisError::UnsupportedFormat {
                reason: format!("expected a JSON object at the top level, found {}", json_type(&other)),
            })
        }
    };

    let format = detect_format(&root);
    let metadata = extract_counts(&root);
    let mut warnings = Vec::new();

    let vulnerabilities = match format.report_format() {
        Some(report_format) => get_normalizer(report_format).normalize(&root),
        None => {
            warnings.push(unknown_format_warning(&root));
            Vec::new()
        }
    };

    Ok(ParsedReport {
        format,
        vulnerabilities,
        metadata,
        warnings,
    })
}

fn unknown_format_warning(root: &Map<String, Value>) -> String {
    // npm writes `{"error": {"code": ..., "summary": ...}}` when the audit itself failed.
    let summary = root
        .get("error")
        .and_then(Value::as_object)
        .and_then(|e| e.get("summary").or_else(|| e.get("code")))
        .and_then(Value::as_str);

    match summary {
        Some(summary) => format!(
            "unrecognised audit report format; the report carries an error: {}",
            summary
        ),
        None => "unrecognised audit report format; no advisories were extracted".to_string(),
    }
}

/// Reads `metadata.vulnerabilities` severity counts, defaulting missing ones to zero.
pub fn extract_counts(root: &Map<String, Value>) -> VulnerabilityCounts {
    let Some(counts) = root
        .get("metadata")
        .and_then(|m| m.get("vulnerabilities"))
        .and_then(Value::as_object)
    else {
        return VulnerabilityCounts::default();
    };

    let count = |key: &str| counts.get(key).and_then(as_count).unwrap_or(0);

    let info = count("info");
    let low = count("low");
    let moderate = count("moderate");
    let high = count("high");
    let critical = count("critical");
    let total = counts.get("total").and_then(as_count).unwrap_or_else(|| {
        [info, low, moderate, high, critical]
            .into_iter()
            .fold(0u64, u64::saturating_add)
    });

    VulnerabilityCounts {
        info,
        low,
        moderate,
        high,
        critical,
        total,
    }
}

/// Float counts saturate at `u64::MAX`.
fn as_count(value: &Value) -> Option<u64> {
    value
        .as_u64()
        .or_else(|| value.as_f64().filter(|f| *f >= 0.0).map(|f| f as u64))
}

/// Renders an advisory id as a string, printing integral numbers in decimal.
pub(crate) fn render_id(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(i.to_string())
            } else if let Some(u) = n.as_u64() {
                Some(u.to_string())
            } else {
                n.as_f64().map(|f| {
                    if f.fract() == 0.0 && f.abs() < 1e15 {
                        format!("{}", f as i64)
                    } else {
                        f.to_string()
                    }
                })
            }
        }
        _ => None,
    }
}

/// Reads a string field, returning `None` for missing or non-string values.
pub(crate) fn str_field<'a>(record: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    record.get(key).and_then(Value::as_str)
}
