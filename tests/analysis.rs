use auditgate::report::{parse_report, DetectedFormat};
use auditgate::{analyze, AllowlistStatus, AnalysisError, ReportFormat, Severity};
use chrono::{DateTime, Duration, TimeZone, Utc};

const LEGACY_REPORT: &str = r#"{
  "actions": [],
  "advisories": {
    "1234": {
      "id": 1234,
      "module_name": "lodash",
      "severity": "high",
      "title": "Prototype Pollution",
      "url": "https://npmjs.com/advisories/1234",
      "vulnerable_versions": "<4.17.21"
    },
    "5678": {
      "id": 5678,
      "module_name": "minimist",
      "severity": "low",
      "title": "Low severity issue",
      "url": "https://npmjs.com/advisories/5678",
      "vulnerable_versions": "<1.2.6"
    }
  },
  "metadata": {
    "vulnerabilities": { "info": 0, "low": 1, "moderate": 0, "high": 1, "critical": 0 },
    "dependencies": 120
  }
}"#;

const MODERN_REPORT: &str = r#"{
  "auditReportVersion": 2,
  "vulnerabilities": {
    "node-fetch": {
      "name": "node-fetch",
      "severity": "critical",
      "isDirect": true,
      "via": [
        {
          "source": 1556,
          "name": "node-fetch",
          "dependency": "node-fetch",
          "title": "Exposure of Sensitive Information",
          "url": "https://github.com/advisories/GHSA-r683-j2x4-v87g",
          "severity": "high",
          "range": "<2.6.7"
        },
        {
          "source": 1702,
          "name": "node-fetch",
          "dependency": "node-fetch",
          "title": "Header forwarding",
          "url": "https://github.com/advisories/GHSA-w7rc-rwvf-8q5r",
          "severity": "critical",
          "range": "<2.6.1"
        }
      ],
      "effects": ["isomorphic-fetch"],
      "range": "<=2.6.6",
      "nodes": ["node_modules/node-fetch"],
      "fixAvailable": true
    },
    "isomorphic-fetch": {
      "name": "isomorphic-fetch",
      "severity": "critical",
      "isDirect": false,
      "via": ["node-fetch"],
      "effects": [],
      "range": "2.0.0 - 2.2.1",
      "nodes": ["node_modules/isomorphic-fetch"],
      "fixAvailable": true
    }
  },
  "metadata": {
    "vulnerabilities": { "info": 0, "low": 0, "moderate": 0, "high": 1, "critical": 2, "total": 3 }
  }
}"#;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 1, 8, 30, 0).unwrap()
}

fn entry(id: &str, package: &str, expires: DateTime<Utc>) -> String {
    format!(
        r#"{{ "id": "{}", "package": "{}", "reason": "reviewed", "expires": "{}" }}"#,
        id,
        package,
        expires.to_rfc3339()
    )
}

#[test]
fn legacy_report_without_allowlist_fails() {
    let result = analyze(LEGACY_REPORT, None, now()).unwrap();

    assert_eq!(result.vulnerabilities.len(), 1);
    assert_eq!(result.vulnerabilities[0].id(), "1234");
    assert_eq!(result.vulnerabilities[0].allowlist_status, AllowlistStatus::New);
    assert!(!result.is_successful);
}

#[test]
fn legacy_report_with_live_allowlist_passes() {
    let allowlist = format!("[{}]", entry("1234", "lodash", now() + Duration::days(365)));
    let result = analyze(LEGACY_REPORT, Some(&allowlist), now()).unwrap();

    assert!(result.vulnerabilities.is_empty());
    assert_eq!(result.allowed_vulnerabilities.len(), 1);
    assert_eq!(result.allowed_vulnerabilities[0].reason.as_deref(), Some("reviewed"));
    assert!(result.is_successful);
}

#[test]
fn legacy_report_with_expired_allowlist_fails() {
    let allowlist = format!("[{}]", entry("1234", "lodash", now() - Duration::days(365)));
    let result = analyze(LEGACY_REPORT, Some(&allowlist), now()).unwrap();

    assert_eq!(result.expired_allowlist_entries.len(), 1);
    assert!(result.allowed_vulnerabilities.is_empty());
    assert!(!result.is_successful);
}

#[test]
fn modern_report_fans_out_via_advisories() {
    let report = parse_report(MODERN_REPORT).unwrap();

    assert_eq!(report.format, DetectedFormat::Modern);
    assert_eq!(report.vulnerabilities.len(), 2);

    let ids: Vec<_> = report.vulnerabilities.iter().map(|v| v.id.as_str()).collect();
    assert_eq!(ids, vec!["1556", "1702"]);
    assert!(report.vulnerabilities.iter().all(|v| v.package == "node-fetch"));
    assert_eq!(report.vulnerabilities[1].severity, Severity::Critical);
    assert_eq!(report.metadata.total, 3);
}

#[test]
fn modern_report_partitions_every_advisory_once() {
    let allowlist = format!(
        "[{}, {}]",
        entry("1556", "node-fetch", now() + Duration::days(10)),
        entry("9999", "node-fetch", now() + Duration::days(10)),
    );
    let result = analyze(MODERN_REPORT, Some(&allowlist), now()).unwrap();

    assert_eq!(result.format, Some(ReportFormat::Modern));
    assert_eq!(result.allowed_vulnerabilities.len(), 1);
    assert_eq!(result.expiring_entries.len(), 1);
    assert_eq!(result.vulnerabilities.len(), 1);
    assert_eq!(result.vulnerabilities[0].id(), "1702");
    assert_eq!(result.classified_count(), 2);
    assert!(!result.is_successful);
}

#[test]
fn allowlist_must_match_package_exactly() {
    let allowlist = format!("[{}]", entry("1234", "lodash-es", now() + Duration::days(365)));
    let result = analyze(LEGACY_REPORT, Some(&allowlist), now()).unwrap();

    assert_eq!(result.vulnerabilities.len(), 1);
    assert!(!result.is_successful);
}

#[test]
fn expiring_window_is_inclusive_at_thirty_days() {
    for (days, expiring) in [(29, true), (30, true), (31, false)] {
        let allowlist = format!("[{}]", entry("1234", "lodash", now() + Duration::days(days)));
        let result = analyze(LEGACY_REPORT, Some(&allowlist), now()).unwrap();

        assert_eq!(!result.expiring_entries.is_empty(), expiring, "{} days", days);
        assert!(result.is_successful);
    }
}

#[test]
fn malformed_allowlist_aborts_analysis() {
    let err = analyze(LEGACY_REPORT, Some(r#"[{ "id": "1234", "package": "lodash" "#), now())
        .unwrap_err();
    assert!(matches!(err, AnalysisError::JsonSyntax { .. }));
}

#[test]
fn schema_errors_are_reported_together() {
    let allowlist = r#"[
        { "id": "1234", "package": "lodash", "reason": "", "expires": "2030-01-01" },
        { "id": "1234", "package": "lodash", "reason": "r", "expires": "never", "extra": true }
    ]"#;

    match analyze(LEGACY_REPORT, Some(allowlist), now()).unwrap_err() {
        AnalysisError::AllowlistSchema { violations } => {
            assert_eq!(violations.len(), 3);
            assert_eq!(violations[0].index, 0);
            assert!(violations[1..].iter().all(|v| v.index == 1));
        }
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn unrecognised_report_degrades_to_empty_success() {
    let result = analyze(
        r#"{ "metadata": { "vulnerabilities": { "critical": 4 } } }"#,
        None,
        now(),
    )
    .unwrap();

    assert!(result.is_successful);
    assert!(result.vulnerabilities.is_empty());
    assert_eq!(result.metadata.critical, 4);
    assert!(!result.warnings.is_empty());
}

#[test]
fn result_serializes_for_downstream_consumers() {
    let result = analyze(MODERN_REPORT, None, now()).unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert_eq!(json["isSuccessful"], false);
    assert_eq!(json["vulnerabilities"].as_array().unwrap().len(), 2);
    assert_eq!(json["vulnerabilities"][0]["package"], "node-fetch");
    assert_eq!(json["vulnerabilities"][0]["allowlistStatus"], "new");
    assert_eq!(json["format"], "modern");
}
