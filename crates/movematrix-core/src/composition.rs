//! Composition: the graph of primitives and connections being edited.
//!
//! [`Composition`] owns its primitives and connections in insertion-ordered
//! maps, so iteration order is declaration order everywhere downstream
//! (validation issue order, generated code order). All mutations go through
//! methods on this type, which keep the endpoint invariant (every connection
//! names ports that exist) and bump `updated_at`.
//!
//! Connection legality (self-loops, duplicates, resource-type compatibility)
//! is decided by the resolver in `movematrix-check`; this type only refuses
//! endpoints that do not exist.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use petgraph::graphmap::DiGraphMap;
use serde::{Deserialize, Serialize};

use crate::connection::Connection;
use crate::error::CoreError;
use crate::id::{CompositionId, ConnectionId, IdAllocator, PortId, PrimitiveId};
use crate::param::ParamValue;
use crate::primitive::{Port, Position, Primitive, PrimitiveKind, PrimitivePatch};
use crate::registry::Registry;

/// A primitive together with the connections its removal cascaded to.
#[derive(Debug, Clone, PartialEq)]
pub struct RemovedPrimitive {
    pub primitive: Primitive,
    pub connections: Vec<Connection>,
}

/// The full graph of primitives and connections.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Composition {
    id: CompositionId,
    name: String,
    description: String,
    primitives: IndexMap<PrimitiveId, Primitive>,
    connections: IndexMap<ConnectionId, Connection>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    ids: IdAllocator,
}

impl Composition {
    /// Creates an empty composition.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        let now = Utc::now();
        Composition {
            id: CompositionId::new(),
            name: name.into(),
            description: description.into(),
            primitives: IndexMap::new(),
            connections: IndexMap::new(),
            created_at: now,
            updated_at: now,
            ids: IdAllocator::new(),
        }
    }

    /// Constructs a `Composition` from all its component parts.
    ///
    /// Bypasses the mutation methods, so none of the graph invariants are
    /// checked. The validator is the tool for auditing a composition built
    /// this way.
    #[allow(clippy::too_many_arguments)]
    pub fn from_parts(
        id: CompositionId,
        name: String,
        description: String,
        primitives: IndexMap<PrimitiveId, Primitive>,
        connections: IndexMap<ConnectionId, Connection>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        ids: IdAllocator,
    ) -> Self {
        Composition {
            id,
            name,
            description,
            primitives,
            connections,
            created_at,
            updated_at,
            ids,
        }
    }

    // -----------------------------------------------------------------------
    // Read-only accessors
    // -----------------------------------------------------------------------

    pub fn id(&self) -> CompositionId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Primitives in insertion order.
    pub fn primitives(&self) -> impl Iterator<Item = &Primitive> {
        self.primitives.values()
    }

    pub fn primitive(&self, id: PrimitiveId) -> Option<&Primitive> {
        self.primitives.get(&id)
    }

    pub fn primitive_count(&self) -> usize {
        self.primitives.len()
    }

    /// Connections in insertion order.
    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.values()
    }

    pub fn connection(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(&id)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    // -----------------------------------------------------------------------
    // Port lookup (linear scan over primitives)
    // -----------------------------------------------------------------------

    /// Finds an output port anywhere in the composition.
    pub fn find_output(&self, id: PortId) -> Option<&Port> {
        self.primitives().find_map(|p| p.output(id))
    }

    /// Finds an input port anywhere in the composition.
    pub fn find_input(&self, id: PortId) -> Option<&Port> {
        self.primitives().find_map(|p| p.input(id))
    }

    /// Finds a port of either direction.
    pub fn find_port(&self, id: PortId) -> Option<&Port> {
        self.primitives().find_map(|p| p.ports().find(|port| port.id == id))
    }

    /// The primitive owning `port`, if any.
    pub fn port_owner(&self, port: PortId) -> Option<PrimitiveId> {
        self.find_port(port).map(|p| p.primitive)
    }

    /// Returns `true` if a connection with exactly this (source, target)
    /// pair already exists.
    pub fn has_connection(&self, source: PortId, target: PortId) -> bool {
        self.connections()
            .any(|c| c.source == source && c.target == target)
    }

    /// Connections whose source or target port belongs to `primitive`.
    pub fn incident_connections(&self, primitive: PrimitiveId) -> Vec<&Connection> {
        match self.primitive(primitive) {
            Some(p) => self
                .connections()
                .filter(|c| p.owns_port(c.source) || p.owns_port(c.target))
                .collect(),
            None => Vec::new(),
        }
    }

    /// Primitive-level view of the wiring: one node per primitive, one edge
    /// per pair of primitives joined by at least one resolvable connection.
    pub fn wiring(&self) -> DiGraphMap<PrimitiveId, ()> {
        let mut graph = DiGraphMap::new();
        for id in self.primitives.keys() {
            graph.add_node(*id);
        }
        for connection in self.connections() {
            if let (Some(from), Some(to)) = (
                self.port_owner(connection.source),
                self.port_owner(connection.target),
            ) {
                graph.add_edge(from, to, ());
            }
        }
        graph
    }

    // -----------------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------------

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }

    fn primitive_mut(&mut self, id: PrimitiveId) -> Result<&mut Primitive, CoreError> {
        self.primitives
            .get_mut(&id)
            .ok_or(CoreError::PrimitiveNotFound { id })
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touch();
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
        self.touch();
    }

    /// Instantiates `kind` from the registry and appends it.
    pub fn add_primitive(&mut self, kind: PrimitiveKind, position: Position) -> &Primitive {
        let primitive = Registry::instantiate(kind, position, &mut self.ids);
        let id = primitive.id;
        self.primitives.insert(id, primitive);
        self.touch();
        &self.primitives[&id]
    }

    pub fn set_position(&mut self, id: PrimitiveId, position: Position) -> Result<(), CoreError> {
        self.primitive_mut(id)?.position = position;
        self.touch();
        Ok(())
    }

    /// Stores `value` under `parameter`. No type or range checking happens
    /// here; an unknown parameter id simply adds a new record.
    pub fn set_parameter(
        &mut self,
        id: PrimitiveId,
        parameter: impl Into<String>,
        value: ParamValue,
    ) -> Result<(), CoreError> {
        self.primitive_mut(id)?
            .parameters
            .insert(parameter.into(), value);
        self.touch();
        Ok(())
    }

    /// Applies a partial update and returns the updated primitive.
    pub fn patch_primitive(
        &mut self,
        id: PrimitiveId,
        patch: PrimitivePatch,
    ) -> Result<&Primitive, CoreError> {
        self.primitive_mut(id)?.apply(patch);
        self.touch();
        Ok(&self.primitives[&id])
    }

    /// Removes a primitive and every connection touching one of its ports.
    ///
    /// Returns `None` (and leaves the composition untouched) if the
    /// primitive is already absent.
    pub fn remove_primitive(&mut self, id: PrimitiveId) -> Option<RemovedPrimitive> {
        let primitive = self.primitives.shift_remove(&id)?;

        let mut removed = Vec::new();
        self.connections.retain(|_, c| {
            let incident = primitive.owns_port(c.source) || primitive.owns_port(c.target);
            if incident {
                removed.push(c.clone());
            }
            !incident
        });

        self.touch();
        Some(RemovedPrimitive {
            primitive,
            connections: removed,
        })
    }

    /// Appends a connection between two existing ports.
    ///
    /// `source` must be an output port and `target` an input port. Legality
    /// beyond existence is the caller's responsibility.
    pub fn insert_connection(
        &mut self,
        source: PortId,
        target: PortId,
        resource_type: impl Into<String>,
    ) -> Result<&Connection, CoreError> {
        if self.find_output(source).is_none() {
            return Err(CoreError::PortNotFound { id: source });
        }
        if self.find_input(target).is_none() {
            return Err(CoreError::PortNotFound { id: target });
        }

        let id = self.ids.connection();
        let connection = Connection {
            id,
            source,
            target,
            resource_type: resource_type.into(),
        };
        self.connections.insert(id, connection);
        self.touch();
        Ok(&self.connections[&id])
    }

    /// Removes a connection. Returns `None` if it was already absent.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        let removed = self.connections.shift_remove(&id)?;
        self.touch();
        Some(removed)
    }
}
