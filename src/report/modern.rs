use super::{render_id, str_field, Normalizer};
use crate::model::{ReportFormat, Severity, Vulnerability};
use serde_json::{Map, Value};

/// Normalizer for package-keyed reports.
///
/// ```json
/// { "vulnerabilities": { "minimist": { "severity": "critical", "via": [ { "source": 1179, ... }, "mkdirp" ] } } }
/// ```
///
/// A package record fans out to one row per advisory object in its `via`
/// list. Bare strings in `via` name another vulnerable package that has its
/// own record, so they are skipped here.
pub struct ModernNormalizer;

impl Normalizer for ModernNormalizer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Modern
    }

    fn matches(&self, root: &Map<String, Value>) -> bool {
        root.get("vulnerabilities")
            .and_then(Value::as_object)
            .is_some_and(|packages| {
                packages
                    .values()
                    .all(|record| record.get("via").is_some_and(Value::is_array))
            })
    }

    fn normalize(&self, root: &Map<String, Value>) -> Vec<Vulnerability> {
        let Some(packages) = root.get("vulnerabilities").and_then(Value::as_object) else {
            return Vec::new();
        };

        let mut rows = Vec::new();
        for (name, record) in packages {
            let Some(record) = record.as_object() else {
                continue;
            };
            let Some(via) = record.get("via").and_then(Value::as_array) else {
                continue;
            };

            let package_severity = str_field(record, "severity").and_then(Severity::parse);

            rows.extend(
                via.iter()
                    .filter_map(Value::as_object)
                    .map(|advisory| normalize_via(name, advisory, package_severity)),
            );
        }
        rows
    }
}

fn normalize_via(
    package: &str,
    advisory: &Map<String, Value>,
    package_severity: Option<Severity>,
) -> Vulnerability {
    let id = advisory
        .get("source")
        .and_then(render_id)
        .unwrap_or_else(|| "unknown".to_string());

    let severity = str_field(advisory, "severity")
        .and_then(Severity::parse)
        .or(package_severity)
        .unwrap_or(Severity::Info);

    Vulnerability::new(id, package, severity, ReportFormat::Modern)
        .with_title(str_field(advisory, "title").unwrap_or_default())
        .with_url(str_field(advisory, "url").unwrap_or_default())
        .with_range(str_field(advisory, "range").unwrap_or_default())
}
