//! Connection resolver: decides whether two ports may be connected.
//!
//! [`check_connection`] is the pure decision; [`connect`] runs it and, on
//! success, inserts the new connection into the composition. Rejections are
//! ordinary user-facing outcomes (a drag that does not land), so they come
//! back as [`ConnectError`] values and are logged, never panicked on.
//!
//! Resolution order:
//! 1. look up the source among output ports and the target among input
//!    ports,
//! 2. refuse a source and target on the same primitive,
//! 3. refuse an exact (source, target) pair that already exists,
//! 4. refuse tags that fail [`compatibility`].

use serde::Serialize;
use thiserror::Error;

use movematrix_core::composition::Composition;
use movematrix_core::connection::Connection;
use movematrix_core::id::{ConnectionId, PortId, PrimitiveId};
use movematrix_core::primitive::Port;

use crate::compat::{compatibility, Compatibility};

/// Why a connection attempt was refused.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
pub enum ConnectError {
    /// The source is not an output port, or the target is not an input
    /// port, of any primitive in the composition.
    #[error(
        "source or target port not found (source {source_port}: {source_found}, target {target_port}: {target_found})"
    )]
    PortNotFound {
        source_port: PortId,
        target_port: PortId,
        source_found: bool,
        target_found: bool,
    },

    /// Both ports belong to the same primitive.
    #[error("cannot connect primitive {primitive} to itself")]
    SelfConnection { primitive: PrimitiveId },

    /// A connection between exactly these two ports already exists.
    #[error("connection already exists between these ports (connection {existing})")]
    DuplicateConnection { existing: ConnectionId },

    /// The resource types fail every compatibility tier.
    #[error("incompatible resource types: '{source_type}' cannot feed '{target_type}'")]
    IncompatibleTypes {
        source_type: String,
        target_type: String,
    },
}

/// A legal (source, target) pair together with the tier that accepted it.
#[derive(Debug, Clone, Copy)]
pub struct Resolution<'a> {
    pub source: &'a Port,
    pub target: &'a Port,
    pub tier: Compatibility,
}

/// Decides whether `source_port` may be connected to `target_port` without
/// modifying the composition.
pub fn check_connection(
    composition: &Composition,
    source_port: PortId,
    target_port: PortId,
) -> Result<Resolution<'_>, ConnectError> {
    let source = composition.find_output(source_port);
    let target = composition.find_input(target_port);

    let (source, target) = match (source, target) {
        (Some(s), Some(t)) => (s, t),
        (s, t) => {
            return Err(ConnectError::PortNotFound {
                source_port,
                target_port,
                source_found: s.is_some(),
                target_found: t.is_some(),
            })
        }
    };

    if source.primitive == target.primitive {
        return Err(ConnectError::SelfConnection {
            primitive: source.primitive,
        });
    }

    if let Some(existing) = composition
        .connections()
        .find(|c| c.source == source_port && c.target == target_port)
    {
        return Err(ConnectError::DuplicateConnection {
            existing: existing.id,
        });
    }

    let tier = compatibility(&source.resource_type, &target.resource_type).ok_or_else(|| {
        ConnectError::IncompatibleTypes {
            source_type: source.resource_type.clone(),
            target_type: target.resource_type.clone(),
        }
    })?;

    Ok(Resolution {
        source,
        target,
        tier,
    })
}

/// Resolves and, if legal, inserts a connection from `source_port` to
/// `target_port`. The new connection's resource type is the source port's.
pub fn connect(
    composition: &mut Composition,
    source_port: PortId,
    target_port: PortId,
) -> Result<Connection, ConnectError> {
    let (resource_type, tier) = match check_connection(composition, source_port, target_port) {
        Ok(resolution) => (resolution.source.resource_type.clone(), resolution.tier),
        Err(err) => {
            tracing::warn!(
                source_port = source_port.0,
                target_port = target_port.0,
                reason = %err,
                "connection rejected"
            );
            return Err(err);
        }
    };

    // Both ports were just resolved, so insertion cannot miss them.
    let connection = composition
        .insert_connection(source_port, target_port, resource_type)
        .map_err(|_| ConnectError::PortNotFound {
            source_port,
            target_port,
            source_found: false,
            target_found: false,
        })?
        .clone();

    tracing::debug!(
        connection = connection.id.0,
        source_port = source_port.0,
        target_port = target_port.0,
        resource_type = %connection.resource_type,
        tier = ?tier,
        "connection created"
    );

    Ok(connection)
}
