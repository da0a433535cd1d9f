//! Structural checks on search fragments.

use std::fmt;

use serde::Serialize;
use tracing::warn;

use crate::docindex::types::SearchRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IssueKind {
    /// The key sorts before the one preceding it in the fragment.
    KeyOrder { previous: String },
    EmptyKey,
    EmptyLabel,
    /// The parser rejects link-less records, so this only fires for tables
    /// assembled with `SymbolTable::from_fragments`.
    NoLinks,
    /// Link number `link` has an empty page.
    EmptyPage { link: usize },
}

impl IssueKind {
    /// Generated fragments are not always sorted (the README page key is
    /// emitted first), so ordering problems do not make a fragment invalid.
    pub fn severity(&self) -> Severity {
        match self {
            Self::KeyOrder { .. } => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::KeyOrder { previous } => write!(f, "out of order after '{previous}'"),
            Self::EmptyKey => f.write_str("empty key"),
            Self::EmptyLabel => f.write_str("empty label"),
            Self::NoLinks => f.write_str("no links"),
            Self::EmptyPage { link } => write!(f, "link {link} has an empty page"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub fragment: String,
    pub key: String,
    #[serde(flatten)]
    pub kind: IssueKind,
    pub severity: Severity,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.severity {
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        write!(f, "{level}: {}: '{}': {}", self.fragment, self.key, self.kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub fragments: usize,
    pub records: usize,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// True when no issue is an error. Warnings are allowed.
    pub fn is_valid(&self) -> bool {
        self.errors().next().is_none()
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(|i| i.severity == Severity::Warning)
    }

    pub fn merge(&mut self, other: ValidationReport) {
        self.fragments += other.fragments;
        self.records += other.records;
        self.issues.extend(other.issues);
    }
}

/// Check the records of one fragment, in file order.
pub fn validate(fragment: &str, records: &[SearchRecord]) -> ValidationReport {
    let mut issues = Vec::new();
    let mut push = |key: &str, kind: IssueKind| {
        let issue = ValidationIssue {
            fragment: fragment.to_string(),
            key: key.to_string(),
            severity: kind.severity(),
            kind,
        };
        warn!("{issue}");
        issues.push(issue);
    };

    let mut previous: Option<&str> = None;
    for record in records {
        if record.key.is_empty() {
            push(&record.key, IssueKind::EmptyKey);
        }
        if let Some(prev) = previous {
            if prev > record.key.as_str() {
                push(
                    &record.key,
                    IssueKind::KeyOrder {
                        previous: prev.to_string(),
                    },
                );
            }
        }
        previous = Some(record.key.as_str());

        if record.label.is_empty() {
            push(&record.key, IssueKind::EmptyLabel);
        }
        if record.links.is_empty() {
            push(&record.key, IssueKind::NoLinks);
        }
        for (index, link) in record.links.iter().enumerate() {
            if link.target.page.is_empty() {
                push(&record.key, IssueKind::EmptyPage { link: index });
            }
        }
    }

    ValidationReport {
        fragments: 1,
        records: records.len(),
        issues,
    }
}
