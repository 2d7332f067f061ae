//! CompositionStore: the single owner of one composition and the entry
//! point for every editing operation.
//!
//! The store keeps the current composition behind an `Arc`. Each mutation
//! clones the current version, applies the change to the clone and, only
//! if the change succeeded, swaps the `Arc`. Snapshots returned by
//! [`CompositionStore::get_composition`] are therefore never modified, and
//! a failed mutation leaves the current version untouched.
//!
//! The store assumes a single writer. A host with several writers must
//! serialize calls itself.

use std::sync::Arc;

use movematrix_check::resolve::{connect, ConnectError};
use movematrix_check::validate::{validate, ValidationResult};
use movematrix_codegen::{generate, GenerateOptions};
use movematrix_core::composition::{Composition, RemovedPrimitive};
use movematrix_core::connection::Connection;
use movematrix_core::error::CoreError;
use movematrix_core::id::{ConnectionId, PortId, PrimitiveId};
use movematrix_core::param::{ParamError, ParamValue};
use movematrix_core::primitive::{Position, Primitive, PrimitiveKind, PrimitivePatch};
use movematrix_core::registry::Registry;

use crate::error::EngineError;

/// Default name of a store created with [`Default`].
pub const DEFAULT_NAME: &str = "Untitled Composition";
/// Default description of a store created with [`Default`].
pub const DEFAULT_DESCRIPTION: &str = "A DeFi composition";

/// Owns one composition and exposes the editing, validation and export
/// operations.
#[derive(Debug, Clone)]
pub struct CompositionStore {
    current: Arc<Composition>,
    options: GenerateOptions,
}

impl Default for CompositionStore {
    fn default() -> Self {
        CompositionStore::new(DEFAULT_NAME, DEFAULT_DESCRIPTION)
    }
}

impl CompositionStore {
    /// Creates a store holding a new, empty composition.
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        CompositionStore::from_composition(Composition::new(name, description))
    }

    /// Adopts an existing composition.
    pub fn from_composition(composition: Composition) -> Self {
        CompositionStore {
            current: Arc::new(composition),
            options: GenerateOptions::default(),
        }
    }

    /// Sets the options used by [`CompositionStore::export_code`].
    pub fn with_options(mut self, options: GenerateOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &GenerateOptions {
        &self.options
    }

    /// Returns the current snapshot.
    pub fn get_composition(&self) -> Arc<Composition> {
        Arc::clone(&self.current)
    }

    /// Runs `change` against a copy of the current composition and installs
    /// the copy only if `change` succeeds.
    fn commit<T, E>(
        &mut self,
        change: impl FnOnce(&mut Composition) -> Result<T, E>,
    ) -> Result<T, E> {
        let mut next = Composition::clone(&self.current);
        let out = change(&mut next)?;
        self.current = Arc::new(next);
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Primitives
    // -----------------------------------------------------------------------

    /// Instantiates `kind` from the registry and adds it at `position`.
    pub fn add_primitive(&mut self, kind: PrimitiveKind, position: Position) -> Primitive {
        let mut next = Composition::clone(&self.current);
        let primitive = next.add_primitive(kind, position).clone();
        self.current = Arc::new(next);
        tracing::debug!(primitive = %primitive.id, %kind, "added primitive");
        primitive
    }

    /// Applies a partial update to a primitive and returns the result.
    pub fn update_primitive(
        &mut self,
        id: PrimitiveId,
        patch: PrimitivePatch,
    ) -> Result<Primitive, EngineError> {
        let updated = self.commit(|c| c.patch_primitive(id, patch).cloned())?;
        tracing::debug!(primitive = %id, "updated primitive");
        Ok(updated)
    }

    /// Removes a primitive and every connection touching its ports.
    ///
    /// Removing an absent primitive is a no-op and returns `None`.
    pub fn remove_primitive(&mut self, id: PrimitiveId) -> Option<RemovedPrimitive> {
        if self.current.primitive(id).is_none() {
            tracing::debug!(primitive = %id, "remove_primitive: already absent");
            return None;
        }
        let removed = self.commit(|c| c.remove_primitive(id).ok_or(()));
        if let Ok(r) = &removed {
            tracing::debug!(
                primitive = %id,
                connections = r.connections.len(),
                "removed primitive"
            );
        }
        removed.ok()
    }

    pub fn update_primitive_position(
        &mut self,
        id: PrimitiveId,
        position: Position,
    ) -> Result<(), EngineError> {
        self.commit(|c| c.set_position(id, position))?;
        tracing::debug!(primitive = %id, x = position.x, y = position.y, "moved primitive");
        Ok(())
    }

    /// Stores `value` for `parameter` as given. No type or constraint
    /// checking happens here; the validator reports problems later.
    pub fn update_primitive_parameter(
        &mut self,
        id: PrimitiveId,
        parameter: &str,
        value: ParamValue,
    ) -> Result<(), EngineError> {
        self.commit(|c| c.set_parameter(id, parameter, value))?;
        tracing::debug!(primitive = %id, parameter, "updated parameter");
        Ok(())
    }

    /// Converts raw input with the parameter's declared type, checks its
    /// constraints and stores it. On any failure nothing is stored.
    pub fn set_parameter_from_json(
        &mut self,
        id: PrimitiveId,
        parameter: &str,
        raw: &serde_json::Value,
    ) -> Result<ParamValue, EngineError> {
        let kind = self
            .current
            .primitive(id)
            .map(|p| p.kind)
            .ok_or(CoreError::PrimitiveNotFound { id })?;
        let def = Registry::template_for(kind).parameter(parameter).ok_or_else(|| {
            ParamError::UnknownParameter {
                kind: kind.to_string(),
                parameter: parameter.to_string(),
            }
        })?;

        let value = ParamValue::from_json(def.ty, raw)?;
        def.check(&value)?;

        self.update_primitive_parameter(id, parameter, value.clone())?;
        Ok(value)
    }

    // -----------------------------------------------------------------------
    // Connections
    // -----------------------------------------------------------------------

    /// Connects an output port to an input port.
    ///
    /// Returns `None` when the resolver refuses the pair; the reason is
    /// logged. Use [`CompositionStore::try_add_connection`] to get it.
    pub fn add_connection(&mut self, source: PortId, target: PortId) -> Option<Connection> {
        self.try_add_connection(source, target).ok()
    }

    /// Connects an output port to an input port, returning the refusal
    /// reason on failure.
    pub fn try_add_connection(
        &mut self,
        source: PortId,
        target: PortId,
    ) -> Result<Connection, ConnectError> {
        // Refusals are decided before any mutation, so nothing is swapped in.
        self.commit(|c| connect(c, source, target))
    }

    /// Removes a connection. Removing an absent connection is a no-op and
    /// returns `None`.
    pub fn remove_connection(&mut self, id: ConnectionId) -> Option<Connection> {
        if self.current.connection(id).is_none() {
            tracing::debug!(connection = %id, "remove_connection: already absent");
            return None;
        }
        let removed = self.commit(|c| c.remove_connection(id).ok_or(())).ok();
        tracing::debug!(connection = %id, "removed connection");
        removed
    }

    // -----------------------------------------------------------------------
    // Validation and export
    // -----------------------------------------------------------------------

    /// Validates the current snapshot.
    pub fn validate_composition(&self) -> ValidationResult {
        let result = validate(&self.current);
        tracing::info!(
            valid = result.valid,
            errors = result.errors().count(),
            warnings = result.warnings().count(),
            infos = result.infos().count(),
            "validation finished"
        );
        result
    }

    /// Generates Move source for the current snapshot. Does not validate.
    pub fn export_code(&self) -> String {
        let code = generate(&self.current, &self.options);
        tracing::info!(bytes = code.len(), "exported code");
        code
    }
}
