//! Validation issues with location context.
//!
//! [`ValidationIssue`] is data, not an error: a validation run always
//! returns the full list, and only issues of [`Severity::Error`] make the
//! composition invalid.

use std::fmt;

use serde::{Deserialize, Serialize};

use movematrix_core::id::{ConnectionId, PrimitiveId};

/// How serious an issue is. Only `Error` blocks validity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        })
    }
}

/// Machine-readable classification of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IssueKind {
    /// A parameter record holds no value (or an empty string).
    MissingParameter,
    /// A parameter value breaks its definition's range, enum or type rule.
    ConstraintViolated,
    /// A parameter record the primitive's template does not declare.
    UnknownParameter,
    /// A connection's source port is not an output of any primitive.
    DanglingSource,
    /// A connection's target port is not an input of any primitive.
    DanglingTarget,
    /// Source and target tags are not exactly equal.
    ResourceTypeMismatch,
    /// Source and target ports belong to the same primitive.
    SelfLoop,
    /// No connection touches any port of the primitive.
    OrphanedPrimitive,
}

/// Where in the composition an issue was found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueLocation {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primitive: Option<PrimitiveId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection: Option<ConnectionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter: Option<String>,
}

impl IssueLocation {
    pub fn primitive(id: PrimitiveId) -> Self {
        IssueLocation {
            primitive: Some(id),
            ..Default::default()
        }
    }

    pub fn parameter(id: PrimitiveId, parameter: impl Into<String>) -> Self {
        IssueLocation {
            primitive: Some(id),
            parameter: Some(parameter.into()),
            ..Default::default()
        }
    }

    pub fn connection(id: ConnectionId) -> Self {
        IssueLocation {
            connection: Some(id),
            ..Default::default()
        }
    }
}

/// One finding from a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub kind: IssueKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<IssueLocation>,
}

impl ValidationIssue {
    pub fn new(
        severity: Severity,
        kind: IssueKind,
        message: impl Into<String>,
        location: IssueLocation,
    ) -> Self {
        ValidationIssue {
            severity,
            kind,
            message: message.into(),
            location: Some(location),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.severity, self.message)
    }
}

/// The verdict plus every issue, in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `true` iff no issue has severity `Error`.
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn from_issues(issues: Vec<ValidationIssue>) -> Self {
        let valid = !issues.iter().any(|i| i.severity == Severity::Error);
        ValidationResult { valid, issues }
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    pub fn errors(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Error)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Warning)
    }

    pub fn infos(&self) -> impl Iterator<Item = &ValidationIssue> {
        self.with_severity(Severity::Info)
    }

    pub fn of_kind(&self, kind: IssueKind) -> impl Iterator<Item = &ValidationIssue> {
        self.issues.iter().filter(move |i| i.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issue(severity: Severity) -> ValidationIssue {
        ValidationIssue::new(
            severity,
            IssueKind::OrphanedPrimitive,
            "m",
            IssueLocation::primitive(PrimitiveId(0)),
        )
    }

    #[test]
    fn warnings_and_infos_do_not_block_validity() {
        let result = ValidationResult::from_issues(vec![
            issue(Severity::Warning),
            issue(Severity::Info),
        ]);
        assert!(result.valid);
        assert_eq!(result.warnings().count(), 1);
        assert_eq!(result.infos().count(), 1);
    }

    #[test]
    fn any_error_blocks_validity() {
        let result = ValidationResult::from_issues(vec![
            issue(Severity::Warning),
            issue(Severity::Error),
        ]);
        assert!(!result.valid);
        assert_eq!(result.errors().count(), 1);
    }

    #[test]
    fn empty_is_valid() {
        assert!(ValidationResult::from_issues(Vec::new()).valid);
    }

    #[test]
    fn display_prefixes_severity() {
        assert_eq!(issue(Severity::Warning).to_string(), "warning: m");
    }

    #[test]
    fn location_serializes_only_present_fields() {
        let json = serde_json::to_value(IssueLocation::parameter(PrimitiveId(3), "assetType"))
            .unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "primitive": 3, "parameter": "assetType" })
        );
    }
}
