//! Repeated error detection: the same message recurring many times.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::Severity;
use crate::types::Finding;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepeatedError {
    pub severity: Severity,
    /// Normalized (trimmed, lower-cased) message shared by the group.
    pub message: String,
    pub count: usize,
    pub first_occurrence: Option<String>,
    pub last_occurrence: Option<String>,
    pub affected_lines: Vec<usize>,
}

/// Group errors by normalized message and report groups of at least
/// `threshold`, in order of first appearance.
///
/// Groups larger than twice the threshold are `HIGH`, the rest `MEDIUM`.
pub fn detect_repeated_errors(errors: &[Finding], threshold: usize) -> Vec<RepeatedError> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut groups: Vec<(String, Vec<&Finding>)> = Vec::new();

    for error in errors {
        let key = error.message.trim().to_lowercase();
        match index.get(&key) {
            Some(&slot) => groups[slot].1.push(error),
            None => {
                index.insert(key.clone(), groups.len());
                groups.push((key, vec![error]));
            }
        }
    }

    groups
        .into_iter()
        .filter(|(_, group)| group.len() >= threshold)
        .map(|(message, group)| {
            let count = group.len();
            RepeatedError {
                severity: if count > threshold * 2 {
                    Severity::High
                } else {
                    Severity::Medium
                },
                message,
                count,
                first_occurrence: group.first().and_then(|e| e.timestamp.clone()),
                last_occurrence: group.last().and_then(|e| e.timestamp.clone()),
                affected_lines: group.iter().map(|e| e.line_number).collect(),
            }
        })
        .collect()
}
