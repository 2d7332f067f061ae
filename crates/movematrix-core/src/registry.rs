//! The primitive registry: a static catalog of building-block templates.
//!
//! Every [`PrimitiveKind`] maps to exactly one [`PrimitiveTemplate`] holding
//! its parameter schema, its port schema and the metadata the catalog panel
//! uses for grouping and search. The catalog is compiled in and never
//! mutated; [`Registry::instantiate`] is the factory that turns a template
//! into a fresh [`Primitive`].

use indexmap::IndexMap;
use serde::Serialize;
use smallvec::{Array, SmallVec};

use crate::error::CoreError;
use crate::id::{IdAllocator, PrimitiveId};
use crate::param::{Constraints, Literal, ParamType, ParameterDef};
use crate::primitive::{Direction, Port, Position, Primitive, PrimitiveKind};

/// Schema of one port on a template.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortSpec {
    pub resource_type: &'static str,
    pub label: &'static str,
}

const fn port(resource_type: &'static str, label: &'static str) -> PortSpec {
    PortSpec {
        resource_type,
        label,
    }
}

/// Fixed, ordered schema for one primitive kind.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PrimitiveTemplate {
    pub kind: PrimitiveKind,
    pub name: &'static str,
    pub description: &'static str,
    /// UI grouping only.
    pub category: &'static str,
    pub tags: &'static [&'static str],
    pub parameters: &'static [ParameterDef],
    pub inputs: &'static [PortSpec],
    pub outputs: &'static [PortSpec],
}

impl PrimitiveTemplate {
    pub fn parameter(&self, id: &str) -> Option<&'static ParameterDef> {
        self.parameters.iter().find(|p| p.id == id)
    }

    /// Case-insensitive match of `term` against name, description and tags.
    pub fn matches(&self, term: &str) -> bool {
        let term = term.to_lowercase();
        self.name.to_lowercase().contains(&term)
            || self.description.to_lowercase().contains(&term)
            || self.tags.iter().any(|t| t.to_lowercase().contains(&term))
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

static LENDING_POOL: PrimitiveTemplate = PrimitiveTemplate {
    kind: PrimitiveKind::LendingPool,
    name: "Lending Pool",
    description: "A lending pool that allows users to deposit assets and borrow against collateral",
    category: "Lending",
    tags: &["lending", "borrowing", "collateral"],
    parameters: &[
        ParameterDef {
            id: "interestRate",
            name: "Interest Rate",
            ty: ParamType::Number,
            description: "Annual interest rate for borrowing (in percentage)",
            default: Literal::Number(5.0),
            constraints: Constraints::range(0.0, 100.0),
        },
        ParameterDef {
            id: "collateralRatio",
            name: "Collateral Ratio",
            ty: ParamType::Number,
            description: "Required collateral to loan ratio (in percentage)",
            default: Literal::Number(150.0),
            constraints: Constraints::range(100.0, 500.0),
        },
        ParameterDef {
            id: "liquidationThreshold",
            name: "Liquidation Threshold",
            ty: ParamType::Number,
            description: "Threshold at which loans become eligible for liquidation (in percentage)",
            default: Literal::Number(120.0),
            constraints: Constraints::range(100.0, 200.0),
        },
        ParameterDef {
            id: "assetType",
            name: "Asset Type",
            ty: ParamType::Asset,
            description: "Type of asset for this lending pool",
            default: Literal::Text("USDC"),
            constraints: Constraints::REQUIRED,
        },
    ],
    inputs: &[port("asset", "Deposit"), port("collateral", "Collateral")],
    outputs: &[port("asset", "Loan"), port("receipt", "Deposit Receipt")],
};

static AMM_POOL: PrimitiveTemplate = PrimitiveTemplate {
    kind: PrimitiveKind::AmmPool,
    name: "AMM Pool",
    description: "An automated market maker pool for swapping between two assets",
    category: "Exchange",
    tags: &["swap", "liquidity", "amm"],
    parameters: &[
        ParameterDef {
            id: "feePercent",
            name: "Fee Percentage",
            ty: ParamType::Number,
            description: "Fee percentage charged on swaps",
            default: Literal::Number(0.3),
            constraints: Constraints::range(0.0, 10.0),
        },
        ParameterDef {
            id: "assetTypeA",
            name: "Asset Type A",
            ty: ParamType::Asset,
            description: "First asset in the pair",
            default: Literal::Text("USDC"),
            constraints: Constraints::REQUIRED,
        },
        ParameterDef {
            id: "assetTypeB",
            name: "Asset Type B",
            ty: ParamType::Asset,
            description: "Second asset in the pair",
            default: Literal::Text("ETH"),
            constraints: Constraints::REQUIRED,
        },
    ],
    inputs: &[port("assetA", "Token A"), port("assetB", "Token B")],
    outputs: &[
        port("assetA", "Token A Out"),
        port("assetB", "Token B Out"),
        port("lpToken", "LP Token"),
    ],
};

static STAKING: PrimitiveTemplate = PrimitiveTemplate {
    kind: PrimitiveKind::Staking,
    name: "Staking Pool",
    description: "A staking pool that rewards users for locking up assets",
    category: "Yield",
    tags: &["staking", "rewards", "yield"],
    parameters: &[
        ParameterDef {
            id: "rewardRate",
            name: "Reward Rate",
            ty: ParamType::Number,
            description: "Annual reward rate (in percentage)",
            default: Literal::Number(10.0),
            constraints: Constraints::range(0.0, 1000.0),
        },
        ParameterDef {
            id: "lockPeriod",
            name: "Lock Period",
            ty: ParamType::Number,
            description: "Required lock period in days",
            default: Literal::Number(30.0),
            // Five years.
            constraints: Constraints::range(0.0, 1825.0),
        },
        ParameterDef {
            id: "assetType",
            name: "Stake Asset",
            ty: ParamType::Asset,
            description: "Asset to stake",
            default: Literal::Text("APT"),
            constraints: Constraints::REQUIRED,
        },
        ParameterDef {
            id: "rewardAssetType",
            name: "Reward Asset",
            ty: ParamType::Asset,
            description: "Asset for rewards",
            default: Literal::Text("APT"),
            constraints: Constraints::REQUIRED,
        },
    ],
    inputs: &[port("stakeAsset", "Stake")],
    outputs: &[
        port("rewardAsset", "Rewards"),
        port("stakeReceipt", "Stake Receipt"),
    ],
};

static VAULT: PrimitiveTemplate = PrimitiveTemplate {
    kind: PrimitiveKind::Vault,
    name: "Yield Vault",
    description: "A yield-generating vault that automatically reinvests returns",
    category: "Yield",
    tags: &["vault", "yield", "auto-compound"],
    parameters: &[
        ParameterDef {
            id: "strategy",
            name: "Yield Strategy",
            ty: ParamType::Enum,
            description: "Strategy for generating yield",
            default: Literal::Text("conservative"),
            constraints: Constraints::one_of(&["conservative", "moderate", "aggressive"]),
        },
        ParameterDef {
            id: "performanceFee",
            name: "Performance Fee",
            ty: ParamType::Number,
            description: "Fee charged on profits (in percentage)",
            default: Literal::Number(10.0),
            constraints: Constraints::range(0.0, 50.0),
        },
        ParameterDef {
            id: "withdrawalFee",
            name: "Withdrawal Fee",
            ty: ParamType::Number,
            description: "Fee charged on withdrawals (in percentage)",
            default: Literal::Number(0.1),
            constraints: Constraints::range(0.0, 10.0),
        },
        ParameterDef {
            id: "assetType",
            name: "Asset Type",
            ty: ParamType::Asset,
            description: "Asset managed by this vault",
            default: Literal::Text("USDC"),
            constraints: Constraints::REQUIRED,
        },
    ],
    inputs: &[port("asset", "Deposit")],
    outputs: &[port("vaultShare", "Vault Shares"), port("asset", "Yield")],
};

// ---------------------------------------------------------------------------
// Lookup and factory
// ---------------------------------------------------------------------------

/// Read-only access to the compiled-in catalog.
#[derive(Debug, Clone, Copy, Default)]
pub struct Registry;

impl Registry {
    /// Returns the template for `kind`. Every kind is registered.
    pub fn template_for(kind: PrimitiveKind) -> &'static PrimitiveTemplate {
        match kind {
            PrimitiveKind::LendingPool => &LENDING_POOL,
            PrimitiveKind::AmmPool => &AMM_POOL,
            PrimitiveKind::Staking => &STAKING,
            PrimitiveKind::Vault => &VAULT,
        }
    }

    /// Looks a template up by its camelCase kind tag.
    pub fn template_named(tag: &str) -> Result<&'static PrimitiveTemplate, CoreError> {
        tag.parse::<PrimitiveKind>().map(Self::template_for)
    }

    /// All registered kinds, in declaration order.
    pub fn kinds() -> &'static [PrimitiveKind] {
        &PrimitiveKind::ALL
    }

    /// All templates in catalog order.
    pub fn templates() -> impl Iterator<Item = &'static PrimitiveTemplate> {
        PrimitiveKind::ALL.into_iter().map(Self::template_for)
    }

    /// Distinct categories, in first-seen catalog order.
    pub fn categories() -> Vec<&'static str> {
        let mut seen = Vec::new();
        for template in Self::templates() {
            if !seen.contains(&template.category) {
                seen.push(template.category);
            }
        }
        seen
    }

    /// Filters the catalog the way the library panel does: `term` matches
    /// name, description or any tag (case-insensitive, empty matches all),
    /// and `category`, if given, must match exactly.
    pub fn search(term: &str, category: Option<&str>) -> Vec<&'static PrimitiveTemplate> {
        Self::templates()
            .filter(|t| term.is_empty() || t.matches(term))
            .filter(|t| category.map_or(true, |c| t.category == c))
            .collect()
    }

    /// Creates a fresh primitive of `kind` at `position`.
    ///
    /// Parameter records are seeded from the template defaults and one port
    /// is allocated per port schema entry, each with a new id from `ids`.
    pub fn instantiate(kind: PrimitiveKind, position: Position, ids: &mut IdAllocator) -> Primitive {
        let template = Self::template_for(kind);
        let id = ids.primitive();

        let parameters: IndexMap<String, _> = template
            .parameters
            .iter()
            .map(|def| (def.id.to_string(), def.default_value()))
            .collect();

        let inputs = make_ports(id, Direction::Input, template.inputs, ids);
        let outputs = make_ports(id, Direction::Output, template.outputs, ids);

        Primitive {
            id,
            kind,
            position,
            label: template.name.to_string(),
            description: template.description.to_string(),
            parameters,
            inputs,
            outputs,
        }
    }
}

fn make_ports<A: Array<Item = Port>>(
    owner: PrimitiveId,
    direction: Direction,
    specs: &[PortSpec],
    ids: &mut IdAllocator,
) -> SmallVec<A> {
    specs
        .iter()
        .map(|spec| Port {
            id: ids.port(),
            primitive: owner,
            direction,
            resource_type: spec.resource_type.to_string(),
            label: spec.label.to_string(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParamValue;

    #[test]
    fn every_kind_has_a_matching_template() {
        for kind in PrimitiveKind::ALL {
            assert_eq!(Registry::template_for(kind).kind, kind);
        }
    }

    #[test]
    fn template_named_rejects_unknown_tags() {
        assert!(Registry::template_named("vault").is_ok());
        assert!(matches!(
            Registry::template_named("perpetual"),
            Err(CoreError::UnknownKind { .. })
        ));
    }

    #[test]
    fn lending_pool_schema() {
        let t = Registry::template_for(PrimitiveKind::LendingPool);
        let ids: Vec<_> = t.parameters.iter().map(|p| p.id).collect();
        assert_eq!(
            ids,
            ["interestRate", "collateralRatio", "liquidationThreshold", "assetType"]
        );
        assert_eq!(t.inputs[0], port("asset", "Deposit"));
        assert_eq!(t.inputs[1], port("collateral", "Collateral"));
        assert_eq!(t.outputs[0], port("asset", "Loan"));
        assert_eq!(t.outputs[1], port("receipt", "Deposit Receipt"));
    }

    #[test]
    fn amm_pool_has_three_outputs() {
        let t = Registry::template_for(PrimitiveKind::AmmPool);
        let tags: Vec<_> = t.outputs.iter().map(|p| p.resource_type).collect();
        assert_eq!(tags, ["assetA", "assetB", "lpToken"]);
    }

    #[test]
    fn vault_strategy_is_an_enum_with_three_tags() {
        let def = Registry::template_for(PrimitiveKind::Vault)
            .parameter("strategy")
            .unwrap();
        assert_eq!(def.ty, ParamType::Enum);
        assert_eq!(
            def.constraints.allowed,
            ["conservative", "moderate", "aggressive"]
        );
    }

    #[test]
    fn all_defaults_pass_their_constraints() {
        for template in Registry::templates() {
            for def in template.parameters {
                assert!(
                    def.check(&def.default_value()).is_ok(),
                    "{}.{} default fails its own constraints",
                    template.kind,
                    def.id
                );
            }
        }
    }

    #[test]
    fn instantiate_seeds_defaults_and_fresh_ports() {
        let mut ids = IdAllocator::new();
        let p = Registry::instantiate(PrimitiveKind::Staking, Position::new(3.0, 4.0), &mut ids);

        assert_eq!(p.label, "Staking Pool");
        assert_eq!(p.position, Position::new(3.0, 4.0));
        assert_eq!(p.parameter("rewardRate"), Some(&ParamValue::Number(10.0)));
        assert_eq!(p.parameter("assetType"), Some(&ParamValue::Asset("APT".into())));
        assert_eq!(p.inputs.len(), 1);
        assert_eq!(p.outputs.len(), 2);
        assert!(p.ports().all(|port| port.primitive == p.id));
        assert!(p.inputs.iter().all(|port| port.direction == Direction::Input));

        let q = Registry::instantiate(PrimitiveKind::Staking, Position::default(), &mut ids);
        assert_ne!(p.id, q.id);
        assert!(q.ports().all(|port| !p.owns_port(port.id)));
    }

    #[test]
    fn categories_in_first_seen_order() {
        assert_eq!(Registry::categories(), ["Lending", "Exchange", "Yield"]);
    }

    #[test]
    fn search_matches_tags_and_category() {
        let kinds = |v: Vec<&PrimitiveTemplate>| v.iter().map(|t| t.kind).collect::<Vec<_>>();

        assert_eq!(kinds(Registry::search("", None)).len(), 4);
        assert_eq!(
            kinds(Registry::search("YIELD", None)),
            [PrimitiveKind::Staking, PrimitiveKind::Vault]
        );
        assert_eq!(
            kinds(Registry::search("yield", Some("Yield"))),
            [PrimitiveKind::Staking, PrimitiveKind::Vault]
        );
        assert_eq!(
            kinds(Registry::search("swap", None)),
            [PrimitiveKind::AmmPool]
        );
        assert!(Registry::search("swap", Some("Lending")).is_empty());
    }
}
