//! The composition engine: one [`CompositionStore`] per editing session.
//!
//! The store owns the composition and delegates to the lower crates:
//! `movematrix-core` for the data model and registry, `movematrix-check`
//! for connection resolution and validation, `movematrix-codegen` for Move
//! output.

pub mod error;
pub mod store;

pub use error::EngineError;
pub use store::CompositionStore;

pub use movematrix_check::{ConnectError, IssueKind, Severity, ValidationIssue, ValidationResult};
pub use movematrix_codegen::GenerateOptions;
