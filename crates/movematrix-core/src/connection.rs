//! Directed edges between primitives.

use serde::{Deserialize, Serialize};

use crate::id::{ConnectionId, PortId};

/// A directed edge from one primitive's output port to another primitive's
/// input port.
///
/// `resource_type` is copied from the source port when the connection is
/// created and is not re-evaluated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub id: ConnectionId,
    /// Must name an output port.
    pub source: PortId,
    /// Must name an input port.
    pub target: PortId,
    pub resource_type: String,
}
