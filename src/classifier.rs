//! Cross-references blocking vulnerabilities against the allowlist.

use crate::expiry::{is_expired, will_expire_soon};
use crate::model::{AllowlistEntry, AllowlistStatus, ClassifiedVulnerability, Vulnerability};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Classification output before it is assembled into an [`crate::AnalysisResult`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    pub new: Vec<ClassifiedVulnerability>,
    pub allowed: Vec<ClassifiedVulnerability>,
    pub expired: Vec<ClassifiedVulnerability>,
    /// Allowed vulnerabilities whose entry expires within the threshold.
    pub expiring: Vec<ClassifiedVulnerability>,
}

impl Classification {
    pub fn is_successful(&self) -> bool {
        self.new.is_empty() && self.expired.is_empty()
    }
}

/// Sorts every high or critical vulnerability into exactly one of
/// new, allowed or expired.
///
/// Lower severities are dropped. An allowlist entry matches only on exact
/// advisory id and package name; when several entries match, the first one
/// in the allowlist wins.
pub fn classify(
    vulnerabilities: &[Vulnerability],
    allowlist: &[AllowlistEntry],
    now: DateTime<Utc>,
    expiring_threshold_days: i64,
) -> Classification {
    let mut index: HashMap<(&str, &str), &AllowlistEntry> = HashMap::new();
    for entry in allowlist {
        index
            .entry((entry.id.as_str(), entry.package.as_str()))
            .or_insert(entry);
    }

    let mut classification = Classification::default();

    for vuln in vulnerabilities.iter().filter(|v| v.severity.is_blocking()) {
        let Some(entry) = index.get(&(vuln.id.as_str(), vuln.package.as_str())) else {
            classification.new.push(ClassifiedVulnerability {
                vulnerability: vuln.clone(),
                allowlist_status: AllowlistStatus::New,
                reason: None,
                expires_on: None,
                notes: None,
            });
            continue;
        };

        let expires = Some(entry.expires.as_str());
        let status = if is_expired(expires, now) {
            AllowlistStatus::Expired
        } else {
            AllowlistStatus::Allowed
        };

        let classified = ClassifiedVulnerability {
            vulnerability: vuln.clone(),
            allowlist_status: status,
            reason: Some(entry.reason.clone()),
            expires_on: Some(entry.expires.clone()),
            notes: entry.notes.clone(),
        };

        match status {
            AllowlistStatus::Expired => classification.expired.push(classified),
            _ => {
                if will_expire_soon(expires, now, expiring_threshold_days) {
                    classification.expiring.push(classified.clone());
                }
                classification.allowed.push(classified);
            }
        }
    }

    classification
}
