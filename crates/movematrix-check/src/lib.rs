//! Connection resolution and composition validation.
//!
//! - [`compat`] -- the three-tier resource-type compatibility heuristic
//! - [`resolve`] -- legality decisions for new connections
//! - [`validate`] -- full-snapshot structural and semantic checks

pub mod compat;
pub mod resolve;
pub mod validate;

pub use compat::{compatibility, is_compatible, Compatibility};
pub use resolve::{check_connection, connect, ConnectError, Resolution};
pub use validate::{validate, IssueKind, IssueLocation, Severity, ValidationIssue, ValidationResult};
