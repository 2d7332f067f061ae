//! Structural and semantic validation of a composition snapshot.
//!
//! [`validate`] is a pure function: it reads the composition and returns a
//! [`ValidationResult`], reporting every issue rather than stopping at the
//! first. Checks, in emission order:
//!
//! - per primitive, per parameter record: empty value (error), undeclared
//!   parameter (info), constraint violation of a non-empty value (warning);
//! - per connection: missing source or target port (error), resource tags
//!   not exactly equal (error), source and target on one primitive
//!   (warning);
//! - per primitive: no connection touching any of its ports (warning).
//!
//! The tag check here is strict equality, stricter than the resolver's
//! compatibility heuristic. A connection the resolver accepted through a
//! synonym or common root is still reported as a mismatch.

pub mod diagnostics;

pub use diagnostics::{IssueKind, IssueLocation, Severity, ValidationIssue, ValidationResult};

use movematrix_core::composition::Composition;
use movematrix_core::connection::Connection;
use movematrix_core::primitive::Primitive;
use movematrix_core::registry::Registry;

/// Validates the whole composition and reports all issues at once.
pub fn validate(composition: &Composition) -> ValidationResult {
    let mut issues = Vec::new();

    for primitive in composition.primitives() {
        check_parameters(primitive, &mut issues);
    }

    for connection in composition.connections() {
        check_connection(composition, connection, &mut issues);
    }

    for primitive in composition.primitives() {
        if composition.incident_connections(primitive.id).is_empty() {
            issues.push(ValidationIssue::new(
                Severity::Warning,
                IssueKind::OrphanedPrimitive,
                format!(
                    "Primitive \"{}\" is not connected to any other primitive",
                    primitive.label
                ),
                IssueLocation::primitive(primitive.id),
            ));
        }
    }

    ValidationResult::from_issues(issues)
}

fn check_parameters(primitive: &Primitive, issues: &mut Vec<ValidationIssue>) {
    let template = Registry::template_for(primitive.kind);

    for (parameter, value) in &primitive.parameters {
        let location = || IssueLocation::parameter(primitive.id, parameter.as_str());

        if value.is_empty() {
            issues.push(ValidationIssue::new(
                Severity::Error,
                IssueKind::MissingParameter,
                format!("Parameter \"{}\" is required but not set", parameter),
                location(),
            ));
            continue;
        }

        match template.parameter(parameter) {
            None => issues.push(ValidationIssue::new(
                Severity::Info,
                IssueKind::UnknownParameter,
                format!(
                    "Parameter \"{}\" is not defined for {} and will be ignored",
                    parameter, primitive.kind
                ),
                location(),
            )),
            Some(def) => {
                if let Err(violation) = def.check(value) {
                    issues.push(ValidationIssue::new(
                        Severity::Warning,
                        IssueKind::ConstraintViolated,
                        format!("Primitive \"{}\": {}", primitive.label, violation),
                        location(),
                    ));
                }
            }
        }
    }
}

fn check_connection(
    composition: &Composition,
    connection: &Connection,
    issues: &mut Vec<ValidationIssue>,
) {
    let location = || IssueLocation::connection(connection.id);
    let source = composition.find_output(connection.source);
    let target = composition.find_input(connection.target);

    if source.is_none() {
        issues.push(ValidationIssue::new(
            Severity::Error,
            IssueKind::DanglingSource,
            "Connection source port not found",
            location(),
        ));
    }
    if target.is_none() {
        issues.push(ValidationIssue::new(
            Severity::Error,
            IssueKind::DanglingTarget,
            "Connection target port not found",
            location(),
        ));
    }

    let (Some(source), Some(target)) = (source, target) else {
        return;
    };

    if source.resource_type != target.resource_type {
        issues.push(ValidationIssue::new(
            Severity::Error,
            IssueKind::ResourceTypeMismatch,
            format!(
                "Resource type mismatch: \"{}\" cannot connect to \"{}\"",
                source.resource_type, target.resource_type
            ),
            location(),
        ));
    }

    if source.primitive == target.primitive {
        let label = composition
            .primitive(source.primitive)
            .map(|p| p.label.as_str())
            .unwrap_or_default();
        issues.push(ValidationIssue::new(
            Severity::Warning,
            IssueKind::SelfLoop,
            format!("Self-connection detected on primitive \"{}\"", label),
            location(),
        ));
    }
}
