//! Engine-level error type.
//!
//! [`EngineError`] wraps the failures of the lower crates that the store
//! surfaces to its caller. Connection refusals are not here: they are
//! reported as [`movematrix_check::ConnectError`] values or as `None`.

use thiserror::Error;

use movematrix_core::error::CoreError;
use movematrix_core::param::{ConstraintViolation, ParamError};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Lookup failure in the composition, e.g. an absent primitive id.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Raw input that does not convert to the parameter's declared type.
    #[error("invalid parameter value: {0}")]
    Param(#[from] ParamError),

    /// A converted value that breaks the parameter's constraints.
    #[error("constraint violated: {0}")]
    Constraint(#[from] ConstraintViolation),
}
