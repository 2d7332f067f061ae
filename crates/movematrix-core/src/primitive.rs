//! Primitive instances and their typed ports.
//!
//! A [`Primitive`] is one DeFi building block placed in a composition. Its
//! ports are allocated once by the registry when the primitive is created
//! and never change afterwards; only the label, description, position and
//! parameter values can be updated.

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::error::CoreError;
use crate::id::{PortId, PrimitiveId};
use crate::param::ParamValue;

/// The closed set of building-block kinds the registry knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrimitiveKind {
    LendingPool,
    AmmPool,
    Staking,
    Vault,
}

impl PrimitiveKind {
    /// All kinds, in catalog order.
    pub const ALL: [PrimitiveKind; 4] = [
        PrimitiveKind::LendingPool,
        PrimitiveKind::AmmPool,
        PrimitiveKind::Staking,
        PrimitiveKind::Vault,
    ];

    /// The camelCase tag used on the engine boundary.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveKind::LendingPool => "lendingPool",
            PrimitiveKind::AmmPool => "ammPool",
            PrimitiveKind::Staking => "staking",
            PrimitiveKind::Vault => "vault",
        }
    }
}

impl fmt::Display for PrimitiveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrimitiveKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PrimitiveKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnknownKind {
                kind: s.to_string(),
            })
    }
}

/// Canvas position. Display-only; never affects validation or codegen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }
}

/// Which side of a primitive a port sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Direction {
    Input,
    Output,
}

/// A typed connection point on a primitive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: PortId,
    /// The primitive this port belongs to.
    pub primitive: PrimitiveId,
    pub direction: Direction,
    /// Free-form domain tag such as `asset` or `stakeReceipt`.
    pub resource_type: String,
    pub label: String,
}

/// One DeFi building block instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Primitive {
    pub id: PrimitiveId,
    pub kind: PrimitiveKind,
    pub position: Position,
    pub label: String,
    pub description: String,
    /// Parameter id -> current value, in template declaration order.
    pub parameters: IndexMap<String, ParamValue>,
    pub inputs: SmallVec<[Port; 2]>,
    pub outputs: SmallVec<[Port; 3]>,
}

impl Primitive {
    /// Iterates over input ports followed by output ports.
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().chain(self.outputs.iter())
    }

    /// Returns `true` if any of this primitive's ports has the given id.
    pub fn owns_port(&self, id: PortId) -> bool {
        self.ports().any(|p| p.id == id)
    }

    pub fn input(&self, id: PortId) -> Option<&Port> {
        self.inputs.iter().find(|p| p.id == id)
    }

    pub fn output(&self, id: PortId) -> Option<&Port> {
        self.outputs.iter().find(|p| p.id == id)
    }

    /// Finds an input port by its display label (case-insensitive).
    pub fn input_labeled(&self, label: &str) -> Option<&Port> {
        self.inputs
            .iter()
            .find(|p| p.label.eq_ignore_ascii_case(label))
    }

    /// Finds an output port by its display label (case-insensitive).
    pub fn output_labeled(&self, label: &str) -> Option<&Port> {
        self.outputs
            .iter()
            .find(|p| p.label.eq_ignore_ascii_case(label))
    }

    pub fn parameter(&self, id: &str) -> Option<&ParamValue> {
        self.parameters.get(id)
    }

    /// Applies a partial update. Absent fields are left untouched; a
    /// present `parameters` map replaces the whole parameter record.
    pub fn apply(&mut self, patch: PrimitivePatch) {
        if let Some(label) = patch.label {
            self.label = label;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(parameters) = patch.parameters {
            self.parameters = parameters;
        }
    }
}

/// The updatable subset of a primitive's fields.
///
/// Identity, kind and ports are fixed at creation and cannot be patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrimitivePatch {
    pub label: Option<String>,
    pub description: Option<String>,
    pub position: Option<Position>,
    pub parameters: Option<IndexMap<String, ParamValue>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_tags_roundtrip_through_from_str() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(kind.as_str().parse::<PrimitiveKind>().unwrap(), kind);
        }
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let err = "orderBook".parse::<PrimitiveKind>().unwrap_err();
        assert_eq!(
            err,
            CoreError::UnknownKind {
                kind: "orderBook".into()
            }
        );
    }

    #[test]
    fn kind_serializes_as_camel_case_tag() {
        let json = serde_json::to_string(&PrimitiveKind::AmmPool).unwrap();
        assert_eq!(json, "\"ammPool\"");
        let back: PrimitiveKind = serde_json::from_str("\"lendingPool\"").unwrap();
        assert_eq!(back, PrimitiveKind::LendingPool);
    }

    #[test]
    fn patch_only_touches_present_fields() {
        let mut primitive = Primitive {
            id: PrimitiveId(0),
            kind: PrimitiveKind::Vault,
            position: Position::new(1.0, 2.0),
            label: "Yield Vault".into(),
            description: "d".into(),
            parameters: IndexMap::new(),
            inputs: SmallVec::new(),
            outputs: SmallVec::new(),
        };

        primitive.apply(PrimitivePatch {
            label: Some("Treasury".into()),
            ..Default::default()
        });

        assert_eq!(primitive.label, "Treasury");
        assert_eq!(primitive.description, "d");
        assert_eq!(primitive.position, Position::new(1.0, 2.0));
    }
}
