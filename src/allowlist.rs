//! Allowlist parsing and schema validation.
//!
//! An allowlist is a JSON array of reviewed exceptions:
//!
//! ```json
//! [
//!   {
//!     "id": "1234",
//!     "package": "lodash",
//!     "reason": "Only reachable from build tooling",
//!     "expires": "2025-01-31",
//!     "notes": "Upgrade blocked on webpack 5",
//!     "reviewedOn": "2024-11-02"
//!   }
//! ]
//! ```
//!
//! `id`, `package`, `reason` and `expires` are required non-empty strings and
//! `expires` must parse as a date. `notes` and `reviewedOn` may be omitted or
//! null. No other properties are allowed.
//!
//! Every entry is checked and all violations are reported together in one
//! [`AnalysisError::AllowlistSchema`].

use crate::error::{json_type, AnalysisError, InputKind, SchemaViolation, ViolationKind};
use crate::expiry::parse_utc;
use crate::model::AllowlistEntry;
use serde_json::{Map, Value};

const REQUIRED_FIELDS: [&str; 4] = ["id", "package", "reason", "expires"];
const OPTIONAL_FIELDS: [&str; 2] = ["notes", "reviewedOn"];

/// Parses and validates a raw allowlist.
///
/// `None` means no allowlist was supplied and yields an empty list.
///
/// # Errors
///
/// - [`AnalysisError::JsonSyntax`] if the input is not valid JSON
/// - [`AnalysisError::AllowlistStructure`] if the top-level value is not an array
/// - [`AnalysisError::AllowlistSchema`] if any entry breaks the schema
///
/// # Example
///
/// ```
/// use auditgate::allowlist::parse_allowlist;
///
/// let entries = parse_allowlist(Some(
///     r#"[{ "id": "1234", "package": "lodash", "reason": "dev only", "expires": "2030-01-01" }]"#,
/// ))?;
/// assert_eq!(entries[0].package, "lodash");
///
/// assert!(parse_allowlist(None)?.is_empty());
/// # Ok::<(), auditgate::AnalysisError>(())
/// ```
pub fn parse_allowlist(raw: Option<&str>) -> Result<Vec<AllowlistEntry>, AnalysisError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };

    let value: Value =
        serde_json::from_str(raw).map_err(|e| AnalysisError::syntax(InputKind::Allowlist, &e))?;

    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(AnalysisError::AllowlistStructure {
                found: json_type(&other),
            })
        }
    };

    let mut entries = Vec::with_capacity(items.len());
    let mut violations = Vec::new();

    for (index, item) in items.iter().enumerate() {
        match validate_entry(index, item) {
            Ok(entry) => entries.push(entry),
            Err(mut entry_violations) => violations.append(&mut entry_violations),
        }
    }

    if violations.is_empty() {
        Ok(entries)
    } else {
        Err(AnalysisError::AllowlistSchema { violations })
    }
}

/// Checks one entry against the schema, collecting every violation.
fn validate_entry(index: usize, item: &Value) -> Result<AllowlistEntry, Vec<SchemaViolation>> {
    let Some(object) = item.as_object() else {
        return Err(vec![SchemaViolation::entry(index, ViolationKind::NotAnObject)]);
    };

    let mut violations = Vec::new();

    let [id, package, reason, expires] =
        REQUIRED_FIELDS.map(|field| required_string(index, object, field, &mut violations));

    if let Some(value) = &expires {
        if parse_utc(value).is_none() {
            violations.push(SchemaViolation::field(
                index,
                "expires",
                ViolationKind::InvalidDate {
                    value: value.clone(),
                },
            ));
        }
    }

    let notes = optional_string(index, object, "notes", &mut violations);
    let reviewed_on = optional_string(index, object, "reviewedOn", &mut violations);

    for key in object.keys() {
        if !REQUIRED_FIELDS.contains(&key.as_str()) && !OPTIONAL_FIELDS.contains(&key.as_str()) {
            violations.push(SchemaViolation::field(index, key, ViolationKind::UnknownProperty));
        }
    }

    match (id, package, reason, expires) {
        (Some(id), Some(package), Some(reason), Some(expires)) if violations.is_empty() => {
            Ok(AllowlistEntry {
                id,
                package,
                reason,
                expires,
                notes,
                reviewed_on,
            })
        }
        _ => Err(violations),
    }
}

fn required_string(
    index: usize,
    object: &Map<String, Value>,
    field: &str,
    violations: &mut Vec<SchemaViolation>,
) -> Option<String> {
    let kind = match object.get(field) {
        None => ViolationKind::Missing,
        Some(Value::String(s)) if s.is_empty() => ViolationKind::Empty,
        Some(Value::String(s)) => return Some(s.clone()),
        Some(_) => ViolationKind::WrongType { expected: "a string" },
    };
    violations.push(SchemaViolation::field(index, field, kind));
    None
}

fn optional_string(
    index: usize,
    object: &Map<String, Value>,
    field: &str,
    violations: &mut Vec<SchemaViolation>,
) -> Option<String> {
    match object.get(field) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(_) => {
            violations.push(SchemaViolation::field(
                index,
                field,
                ViolationKind::WrongType {
                    expected: "a string or null",
                },
            ));
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn violations(raw: &str) -> Vec<SchemaViolation> {
        match parse_allowlist(Some(raw)) {
            Err(AnalysisError::AllowlistSchema { violations }) => violations,
            other => panic!("expected schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_none_is_empty() {
        assert!(parse_allowlist(None).unwrap().is_empty());
    }

    #[test]
    fn test_empty_array_is_empty() {
        assert!(parse_allowlist(Some("[]")).unwrap().is_empty());
    }

    #[test]
    fn test_valid_entry_with_optional_fields() {
        let raw = r#"[{
            "id": "1234", "package": "lodash", "reason": "dev only",
            "expires": "2030-01-01T00:00:00Z", "notes": "tracked", "reviewedOn": null
        }]"#;
        let entries = parse_allowlist(Some(raw)).unwrap();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, "1234");
        assert_eq!(entries[0].notes.as_deref(), Some("tracked"));
        assert_eq!(entries[0].reviewed_on, None);
    }

    #[test]
    fn test_malformed_json_is_syntax_error() {
        let err = parse_allowlist(Some(r#"[{ "id": "1" "#)).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::JsonSyntax {
                input: InputKind::Allowlist,
                ..
            }
        ));
    }

    #[test]
    fn test_non_array_is_structure_error() {
        let err = parse_allowlist(Some(r#"{ "id": "1" }"#)).unwrap_err();
        assert!(matches!(
            err,
            AnalysisError::AllowlistStructure { found: "an object" }
        ));

        let err = parse_allowlist(Some("null")).unwrap_err();
        assert!(matches!(err, AnalysisError::AllowlistStructure { found: "null" }));
    }

    #[test]
    fn test_missing_required_fields() {
        let found = violations(r#"[{ "id": "1" }]"#);
        let fields: Vec<_> = found.iter().filter_map(|v| v.field.as_deref()).collect();

        assert_eq!(fields, vec!["package", "reason", "expires"]);
        assert!(found.iter().all(|v| v.kind == ViolationKind::Missing));
    }

    #[test]
    fn test_empty_and_wrong_type() {
        let found = violations(
            r#"[{ "id": 1234, "package": "", "reason": "r", "expires": "2030-01-01", "notes": 5 }]"#,
        );

        assert!(found.contains(&SchemaViolation::field(
            0,
            "id",
            ViolationKind::WrongType { expected: "a string" }
        )));
        assert!(found.contains(&SchemaViolation::field(0, "package", ViolationKind::Empty)));
        assert!(found.contains(&SchemaViolation::field(
            0,
            "notes",
            ViolationKind::WrongType {
                expected: "a string or null"
            }
        )));
        assert_eq!(found.len(), 3);
    }

    #[test]
    fn test_unparsable_date() {
        let found = violations(r#"[{ "id": "1", "package": "p", "reason": "r", "expires": "someday" }]"#);
        assert_eq!(
            found,
            vec![SchemaViolation::field(
                0,
                "expires",
                ViolationKind::InvalidDate {
                    value: "someday".to_string()
                }
            )]
        );
    }

    #[test]
    fn test_unknown_property() {
        let found = violations(
            r#"[{ "id": "1", "package": "p", "reason": "r", "expires": "2030-01-01", "owner": "me" }]"#,
        );
        assert_eq!(
            found,
            vec![SchemaViolation::field(0, "owner", ViolationKind::UnknownProperty)]
        );
    }

    #[test]
    fn test_violations_aggregate_across_entries() {
        let raw = r#"[
            { "id": "1", "package": "ok", "reason": "r", "expires": "2030-01-01" },
            "not an object",
            { "package": "p", "reason": "r", "expires": "2030-01-01" },
            { "id": "4", "package": "p", "reason": "r", "expires": "31/12/2030" }
        ]"#;
        let found = violations(raw);

        assert_eq!(found.len(), 3);
        assert_eq!(found[0], SchemaViolation::entry(1, ViolationKind::NotAnObject));
        assert_eq!(found[1], SchemaViolation::field(2, "id", ViolationKind::Missing));
        assert_eq!(found[2].index, 3);
        assert_eq!(found[2].field.as_deref(), Some("expires"));
    }
}
