//! End-to-end editing sessions through the public store API.
//!
//! Covers:
//! - two fresh primitives validate with orphan warnings only
//! - loan output feeding an AMM token input
//! - self-connection refusal
//! - empty required parameter
//! - vault export
//! - fractional rates surviving export
//! - duplicate connections, cascade removal, export determinism

use proptest::prelude::*;

use movematrix_core::param::ParamValue;
use movematrix_core::primitive::{Position, PrimitiveKind};
use movematrix_engine::{CompositionStore, ConnectError, IssueKind, Severity};

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// A lending pool at (0,0) and an AMM pool at (100,100).
fn lending_and_amm() -> (CompositionStore, movematrix_core::Primitive, movematrix_core::Primitive) {
    let mut store = CompositionStore::default();
    let lending = store.add_primitive(PrimitiveKind::LendingPool, Position::new(0.0, 0.0));
    let amm = store.add_primitive(PrimitiveKind::AmmPool, Position::new(100.0, 100.0));
    (store, lending, amm)
}

// ---------------------------------------------------------------------------
// Scenarios
// ---------------------------------------------------------------------------

#[test]
fn fresh_primitives_are_valid_but_orphaned() {
    let (store, lending, amm) = lending_and_amm();
    let result = store.validate_composition();

    assert!(result.valid);
    assert_eq!(result.errors().count(), 0);
    let orphans: Vec<_> = result.of_kind(IssueKind::OrphanedPrimitive).collect();
    assert_eq!(orphans.len(), 2);
    assert!(orphans.iter().all(|i| i.severity == Severity::Warning));
    assert_eq!(orphans[0].location.as_ref().unwrap().primitive, Some(lending.id));
    assert_eq!(orphans[1].location.as_ref().unwrap().primitive, Some(amm.id));
}

#[test]
fn loan_feeds_amm_token_a() {
    let (mut store, lending, amm) = lending_and_amm();
    let loan = lending.output_labeled("Loan").unwrap().id;
    let token_a = amm.input_labeled("Token A").unwrap().id;

    let connection = store.add_connection(loan, token_a).unwrap();
    assert_eq!(connection.resource_type, "asset");
    assert_eq!(connection.source, loan);
    assert_eq!(connection.target, token_a);
    assert_eq!(store.get_composition().connection_count(), 1);

    // Accepted by the heuristic, rejected by the strict check.
    let result = store.validate_composition();
    assert!(!result.valid);
    assert_eq!(result.of_kind(IssueKind::ResourceTypeMismatch).count(), 1);
    assert_eq!(result.of_kind(IssueKind::OrphanedPrimitive).count(), 0);
}

#[test]
fn own_output_to_own_input_is_refused() {
    let (mut store, lending, _) = lending_and_amm();
    let loan = lending.outputs[0].id;
    let deposit = lending.inputs[0].id;

    assert!(store.add_connection(loan, deposit).is_none());
    assert_eq!(
        store.try_add_connection(loan, deposit),
        Err(ConnectError::SelfConnection {
            primitive: lending.id
        })
    );
    assert_eq!(store.get_composition().connection_count(), 0);
}

#[test]
fn empty_asset_type_invalidates() {
    let (mut store, lending, _) = lending_and_amm();
    store
        .update_primitive_parameter(lending.id, "assetType", ParamValue::Asset(String::new()))
        .unwrap();

    let result = store.validate_composition();
    assert!(!result.valid);
    let errors: Vec<_> = result.errors().collect();
    assert_eq!(errors.len(), 1);
    let location = errors[0].location.as_ref().unwrap();
    assert_eq!(location.primitive, Some(lending.id));
    assert_eq!(location.parameter.as_deref(), Some("assetType"));
}

#[test]
fn aggressive_vault_exports() {
    let mut store = CompositionStore::new("Vault Only", "");
    let vault = store.add_primitive(PrimitiveKind::Vault, Position::default());
    store
        .update_primitive_parameter(vault.id, "strategy", ParamValue::EnumTag("aggressive".into()))
        .unwrap();

    let code = store.export_code();
    let field = code
        .lines()
        .find(|l| l.trim_start().starts_with("strategy: u8,"))
        .unwrap();
    assert!(field.contains("aggressive"));
    assert!(code.contains("public fun initialize_vault("));
}

#[test]
fn fractional_interest_rate_exports_exactly() {
    let mut store = CompositionStore::new("Low Rate", "");
    let lending = store.add_primitive(PrimitiveKind::LendingPool, Position::default());
    store
        .update_primitive_parameter(lending.id, "interestRate", ParamValue::Number(0.4))
        .unwrap();

    assert!(store.validate_composition().valid);
    let code = store.export_code();
    assert!(code.contains("const INTEREST_RATE: u64 = 40; // 0.4%"));
    assert!(!code.contains("const INTEREST_RATE: u64 = 0;"));
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

#[test]
fn second_identical_connection_is_a_duplicate() {
    let (mut store, lending, amm) = lending_and_amm();
    let loan = lending.outputs[0].id;
    let token_a = amm.inputs[0].id;

    let first = store.add_connection(loan, token_a).unwrap();
    assert_eq!(
        store.try_add_connection(loan, token_a),
        Err(ConnectError::DuplicateConnection { existing: first.id })
    );
    assert_eq!(store.get_composition().connection_count(), 1);
}

#[test]
fn export_is_deterministic() {
    let (mut store, lending, amm) = lending_and_amm();
    store.add_connection(lending.outputs[0].id, amm.inputs[0].id);
    assert_eq!(store.export_code(), store.export_code());
}

#[derive(Debug, Clone, Copy)]
enum Op {
    Add(usize),
    Connect(usize, usize, usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0usize..4).prop_map(Op::Add),
        (0usize..8, 0usize..3, 0usize..8, 0usize..2).prop_map(|(a, o, b, i)| Op::Connect(a, o, b, i)),
    ]
}

proptest! {
    #[test]
    fn removal_cascades_and_is_idempotent(ops in prop::collection::vec(op(), 1..24), pick in 0usize..8) {
        let mut store = CompositionStore::default();
        let mut ids = Vec::new();

        for op in ops {
            match op {
                Op::Add(k) => {
                    ids.push(store.add_primitive(PrimitiveKind::ALL[k], Position::default()).id);
                }
                Op::Connect(a, o, b, i) if !ids.is_empty() => {
                    let c = store.get_composition();
                    let source = c.primitive(ids[a % ids.len()]).and_then(|p| p.outputs.get(o % p.outputs.len()).map(|x| x.id));
                    let target = c.primitive(ids[b % ids.len()]).and_then(|p| p.inputs.get(i % p.inputs.len()).map(|x| x.id));
                    if let (Some(s), Some(t)) = (source, target) {
                        store.add_connection(s, t);
                    }
                }
                Op::Connect(..) => {}
            }
        }
        prop_assume!(!ids.is_empty());
        let victim = ids[pick % ids.len()];
        let ports: Vec<_> = store
            .get_composition()
            .primitive(victim)
            .unwrap()
            .ports()
            .map(|p| p.id)
            .collect();

        prop_assert!(store.remove_primitive(victim).is_some());
        let after = store.get_composition();
        prop_assert!(after
            .connections()
            .all(|c| !ports.contains(&c.source) && !ports.contains(&c.target)));

        prop_assert!(store.remove_primitive(victim).is_none());
        prop_assert!(std::sync::Arc::ptr_eq(&after, &store.get_composition()));
    }
}
