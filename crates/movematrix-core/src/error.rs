//! Core error types for movematrix-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! lookups that can fail in the composition data model.

use crate::id::{PortId, PrimitiveId};
use thiserror::Error;

/// Core errors produced by the movematrix-core crate.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// A primitive kind tag that the registry does not know.
    #[error("unknown primitive kind: '{kind}'")]
    UnknownKind { kind: String },

    /// A primitive ID was not found in the composition.
    #[error("primitive not found: PrimitiveId({id})", id = id.0)]
    PrimitiveNotFound { id: PrimitiveId },

    /// A port ID was not found on any primitive of the composition.
    #[error("port not found: PortId({id})", id = id.0)]
    PortNotFound { id: PortId },
}
