use crate::model::{AnalysisResult, ClassifiedVulnerability, Severity};
use anyhow::Result;
use tabled::{settings::Style, Table, Tabled};

#[derive(Tabled)]
struct NewRow {
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Affected")]
    range: String,
    #[tabled(rename = "URL")]
    url: String,
}

#[derive(Tabled)]
struct AllowedRow {
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Severity")]
    severity: String,
    #[tabled(rename = "Reason")]
    reason: String,
    #[tabled(rename = "Expires")]
    expires: String,
}

pub fn print_cli_report(result: &AnalysisResult) -> Result<()> {
    println!();

    if let Some(format) = result.format {
        println!("Audit report format: {}", format);
    }
    for warning in &result.warnings {
        println!("Warning: {}", warning);
    }

    if !result.vulnerabilities.is_empty() {
        println!();
        println!(
            "Found {} vulnerabilities not covered by the allowlist:",
            result.vulnerabilities.len()
        );
        println!();

        let mut vulns: Vec<&ClassifiedVulnerability> = result.vulnerabilities.iter().collect();
        vulns.sort_by(|a, b| b.severity().cmp(&a.severity()));

        let rows: Vec<NewRow> = vulns
            .iter()
            .map(|v| NewRow {
                severity: format_severity(&v.severity()),
                package: v.package().to_string(),
                id: v.id().to_string(),
                title: truncate(&v.vulnerability.title, 50),
                range: v.vulnerability.vulnerable_versions.clone(),
                url: or_dash(&v.vulnerability.url),
            })
            .collect();

        println!("{}", Table::new(rows).with(Style::rounded()));
    }

    if !result.expired_allowlist_entries.is_empty() {
        println!();
        println!(
            "Found {} expired allowlist entries (review or renew them):",
            result.expired_allowlist_entries.len()
        );
        println!();
        println!("{}", allowed_table(&result.expired_allowlist_entries));
    }

    if !result.allowed_vulnerabilities.is_empty() {
        println!();
        println!(
            "Allowlisted vulnerabilities ({}):",
            result.allowed_vulnerabilities.len()
        );
        println!();
        println!("{}", allowed_table(&result.allowed_vulnerabilities));

        for vuln in result.allowed_vulnerabilities.iter() {
            if let Some(notes) = &vuln.notes {
                println!("  {} {}: {}", vuln.package(), vuln.id(), notes);
            }
        }
    }

    if !result.expiring_entries.is_empty() {
        println!();
        println!("Allowlist entries expiring soon:");
        for vuln in &result.expiring_entries {
            println!(
                "  \x1b[33m!\x1b[0m {} {} expires {}",
                vuln.package(),
                vuln.id(),
                vuln.expires_on.as_deref().unwrap_or("-")
            );
        }
    }

    println!();
    print_summary(result);

    Ok(())
}

fn allowed_table(vulns: &[ClassifiedVulnerability]) -> String {
    let rows: Vec<AllowedRow> = vulns
        .iter()
        .map(|v| AllowedRow {
            package: v.package().to_string(),
            id: v.id().to_string(),
            severity: format_severity(&v.severity()),
            reason: truncate(v.reason.as_deref().unwrap_or("-"), 50),
            expires: v.expires_on.clone().unwrap_or_else(|| "-".to_string()),
        })
        .collect();

    Table::new(rows).with(Style::rounded()).to_string()
}

fn print_summary(result: &AnalysisResult) {
    let metadata = &result.metadata;

    println!("Summary:");
    println!(
        "  Reported: {} critical, {} high, {} moderate, {} low, {} info",
        metadata.critical, metadata.high, metadata.moderate, metadata.low, metadata.info
    );
    println!(
        "  New: {}  Allowed: {}  Expired: {}  Expiring soon: {}",
        result.vulnerabilities.len(),
        result.allowed_vulnerabilities.len(),
        result.expired_allowlist_entries.len(),
        result.expiring_entries.len()
    );
    println!();

    if result.is_successful {
        println!("\x1b[32mPASS\x1b[0m no unreviewed high or critical vulnerabilities");
    } else {
        println!("\x1b[31mFAIL\x1b[0m dependency audit found blocking vulnerabilities");
    }
}

fn format_severity(severity: &Severity) -> String {
    match severity {
        Severity::Critical => "\x1b[31mCRITICAL\x1b[0m".to_string(),
        Severity::High => "\x1b[91mHIGH\x1b[0m".to_string(),
        Severity::Moderate => "\x1b[33mMODERATE\x1b[0m".to_string(),
        Severity::Low => "\x1b[32mLOW\x1b[0m".to_string(),
        Severity::Info => "INFO".to_string(),
    }
}

fn or_dash(s: &str) -> String {
    if s.is_empty() {
        "-".to_string()
    } else {
        s.to_string()
    }
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len - 3).collect();
        format!("{}...", kept)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("a much longer title", 10), "a much ...");
        assert_eq!(truncate("ünïcödé-title", 8), "ünïcö...");
    }

    #[test]
    fn test_or_dash() {
        assert_eq!(or_dash(""), "-");
        assert_eq!(or_dash("https://x"), "https://x");
    }
}
