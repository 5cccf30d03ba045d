use super::{render_id, str_field, Normalizer};
use crate::model::{ReportFormat, Severity, Vulnerability};
use serde_json::{Map, Value};

/// Normalizer for advisory-keyed reports.
///
/// ```json
/// { "advisories": { "1234": { "id": 1234, "module_name": "lodash", "severity": "high", ... } } }
/// ```
///
/// Each advisory record becomes exactly one row.
pub struct LegacyNormalizer;

impl Normalizer for LegacyNormalizer {
    fn format(&self) -> ReportFormat {
        ReportFormat::Legacy
    }

    fn matches(&self, root: &Map<String, Value>) -> bool {
        root.get("advisories")
            .and_then(Value::as_object)
            .is_some_and(|advisories| advisories.values().all(Value::is_object))
    }

    fn normalize(&self, root: &Map<String, Value>) -> Vec<Vulnerability> {
        let Some(advisories) = root.get("advisories").and_then(Value::as_object) else {
            return Vec::new();
        };

        advisories
            .iter()
            .filter_map(|(key, record)| {
                let record = record.as_object()?;
                Some(normalize_advisory(key, record))
            })
            .collect()
    }
}

fn normalize_advisory(key: &str, record: &Map<String, Value>) -> Vulnerability {
    // The record's own id wins; the map key is only a fallback.
    let id = record
        .get("id")
        .and_then(render_id)
        .or_else(|| render_id(&Value::String(key.to_string())))
        .unwrap_or_else(|| "unknown".to_string());

    let package = str_field(record, "module_name").unwrap_or("unknown");
    let severity = str_field(record, "severity")
        .and_then(Severity::parse)
        .unwrap_or(Severity::Info);

    Vulnerability::new(id, package, severity, ReportFormat::Legacy)
        .with_title(str_field(record, "title").unwrap_or_default())
        .with_url(str_field(record, "url").unwrap_or_default())
        .with_range(str_field(record, "vulnerable_versions").unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn root(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_matches() {
        let normalizer = LegacyNormalizer;
        assert!(normalizer.matches(&root(json!({ "advisories": {} }))));
        assert!(normalizer.matches(&root(json!({ "advisories": { "1": { "id": 1 } } }))));
        assert!(!normalizer.matches(&root(json!({ "advisories": { "1": "lodash" } }))));
        assert!(!normalizer.matches(&root(json!({ "advisories": [] }))));
        assert!(!normalizer.matches(&root(json!({ "vulnerabilities": {} }))));
    }

    #[test]
    fn test_normalize_copies_fields() {
        let report = root(json!({
            "advisories": {
                "1065": {
                    "id": 1065,
                    "module_name": "lodash",
                    "severity": "high",
                    "title": "Prototype Pollution",
                    "url": "https://npmjs.com/advisories/1065",
                    "vulnerable_versions": "<4.17.12"
                }
            }
        }));

        let rows = LegacyNormalizer.normalize(&report);
        assert_eq!(rows.len(), 1);

        let row = &rows[0];
        assert_eq!(row.id, "1065");
        assert_eq!(row.package, "lodash");
        assert_eq!(row.severity, Severity::High);
        assert_eq!(row.title, "Prototype Pollution");
        assert_eq!(row.url, "https://npmjs.com/advisories/1065");
        assert_eq!(row.vulnerable_versions, "<4.17.12");
        assert_eq!(row.source, ReportFormat::Legacy);
    }

    #[test]
    fn test_normalize_one_row_per_advisory() {
        let report = root(json!({
            "advisories": {
                "1": { "id": 1, "module_name": "a", "severity": "high" },
                "2": { "id": 2, "module_name": "a", "severity": "critical" },
                "3": { "id": 3, "module_name": "b", "severity": "low" }
            }
        }));

        assert_eq!(LegacyNormalizer.normalize(&report).len(), 3);
    }

    #[test]
    fn test_normalize_defaults_missing_fields() {
        let report = root(json!({ "advisories": { "77": {} } }));
        let rows = LegacyNormalizer.normalize(&report);

        assert_eq!(rows[0].id, "77");
        assert_eq!(rows[0].package, "unknown");
        assert_eq!(rows[0].severity, Severity::Info);
        assert_eq!(rows[0].title, "");
        assert_eq!(rows[0].url, "");
        assert_eq!(rows[0].vulnerable_versions, "*");
    }

    #[test]
    fn test_normalize_string_id_and_empty_range() {
        let report = root(json!({
            "advisories": {
                "x": { "id": "1234", "module_name": "m", "severity": "CRITICAL", "vulnerable_versions": "" }
            }
        }));
        let rows = LegacyNormalizer.normalize(&report);

        assert_eq!(rows[0].id, "1234");
        assert_eq!(rows[0].severity, Severity::Critical);
        assert_eq!(rows[0].vulnerable_versions, "*");
    }
}
