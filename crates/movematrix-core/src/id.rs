//! Stable ID newtypes for composition entities.
//!
//! Primitive, port and connection IDs are distinct newtype wrappers over
//! `u32`, so a `PortId` cannot be passed where a `PrimitiveId` is expected.
//! They are allocated by an [`IdAllocator`] owned by the composition and are
//! never reused, even after the entity they named has been removed.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of a primitive instance within a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PrimitiveId(pub u32);

/// Identity of a port. Unique across every primitive of a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortId(pub u32);

/// Identity of a connection within a composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectionId(pub u32);

/// Identity of a whole composition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CompositionId(pub Uuid);

impl CompositionId {
    /// Generates a fresh random identity.
    pub fn new() -> Self {
        CompositionId(Uuid::new_v4())
    }
}

impl Default for CompositionId {
    fn default() -> Self {
        Self::new()
    }
}

// Display implementations -- just print the inner value.

impl fmt::Display for PrimitiveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for PortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for CompositionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Monotonic counters handing out fresh IDs for one composition.
///
/// The allocator travels with the composition it belongs to, so a cloned
/// snapshot continues numbering from the same point.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    next_primitive: u32,
    next_port: u32,
    next_connection: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primitive(&mut self) -> PrimitiveId {
        let id = PrimitiveId(self.next_primitive);
        self.next_primitive += 1;
        id
    }

    pub fn port(&mut self) -> PortId {
        let id = PortId(self.next_port);
        self.next_port += 1;
        id
    }

    pub fn connection(&mut self) -> ConnectionId {
        let id = ConnectionId(self.next_connection);
        self.next_connection += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn primitive_id_display() {
        assert_eq!(format!("{}", PrimitiveId(7)), "7");
    }

    #[test]
    fn port_id_display() {
        assert_eq!(format!("{}", PortId(99)), "99");
    }

    #[test]
    fn connection_id_display() {
        assert_eq!(format!("{}", ConnectionId(3)), "3");
    }

    #[test]
    fn allocator_counters_are_independent() {
        let mut ids = IdAllocator::new();
        assert_eq!(ids.primitive(), PrimitiveId(0));
        assert_eq!(ids.port(), PortId(0));
        assert_eq!(ids.port(), PortId(1));
        assert_eq!(ids.primitive(), PrimitiveId(1));
        assert_eq!(ids.connection(), ConnectionId(0));
    }

    #[test]
    fn cloned_allocator_continues_numbering() {
        let mut ids = IdAllocator::new();
        ids.port();
        let mut copy = ids.clone();
        assert_eq!(copy.port(), PortId(1));
        assert_eq!(ids.port(), PortId(1));
    }

    #[test]
    fn composition_ids_are_unique() {
        assert_ne!(CompositionId::new(), CompositionId::new());
    }

    #[test]
    fn serde_roundtrip() {
        let port = PortId(42);
        let json = serde_json::to_string(&port).unwrap();
        let back: PortId = serde_json::from_str(&json).unwrap();
        assert_eq!(port, back);

        let comp = CompositionId::new();
        let json = serde_json::to_string(&comp).unwrap();
        let back: CompositionId = serde_json::from_str(&json).unwrap();
        assert_eq!(comp, back);
    }
}
