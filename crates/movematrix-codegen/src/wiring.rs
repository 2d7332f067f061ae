//! Documentation-only wiring summary.
//!
//! Connections never turn into code; they are listed in a comment block so
//! a reader of the generated module can see how the primitives were wired.

use std::collections::{HashMap, VecDeque};

use petgraph::Direction;

use movematrix_core::composition::Composition;
use movematrix_core::id::PrimitiveId;

use crate::naming::comment_text;

/// Orders primitives so that every primitive comes after the ones feeding
/// it, using Kahn's algorithm over the primitive-level wiring graph.
///
/// Ties are broken by insertion order. Any cycle (a self-loop included)
/// makes the whole order fall back to insertion order.
pub fn primitive_order(composition: &Composition) -> Vec<PrimitiveId> {
    let insertion: Vec<PrimitiveId> = composition.primitives().map(|p| p.id).collect();
    let graph = composition.wiring();

    let mut in_degree: HashMap<PrimitiveId, usize> = insertion
        .iter()
        .map(|&id| (id, graph.neighbors_directed(id, Direction::Incoming).count()))
        .collect();

    let mut queue: VecDeque<PrimitiveId> = insertion
        .iter()
        .copied()
        .filter(|id| in_degree[id] == 0)
        .collect();

    let mut sorted = Vec::with_capacity(insertion.len());
    while let Some(id) = queue.pop_front() {
        sorted.push(id);
        let mut next: Vec<PrimitiveId> = graph
            .neighbors_directed(id, Direction::Outgoing)
            .collect();
        next.sort_by_key(|n| insertion.iter().position(|i| i == n));
        for target in next {
            if let Some(deg) = in_degree.get_mut(&target) {
                *deg -= 1;
                if *deg == 0 {
                    queue.push_back(target);
                }
            }
        }
    }

    if sorted.len() != insertion.len() {
        tracing::debug!(
            primitives = insertion.len(),
            sorted = sorted.len(),
            "wiring has a cycle, listing connections in insertion order"
        );
        return insertion;
    }
    sorted
}

/// One line per resolvable connection, grouped by source primitive in
/// [`primitive_order`]:
/// `<source label>.<port label> -> <target label>.<port label> (<type>)`.
pub fn wiring_lines(composition: &Composition) -> Vec<String> {
    let mut lines = Vec::new();
    for id in primitive_order(composition) {
        let Some(primitive) = composition.primitive(id) else {
            continue;
        };
        for connection in composition.connections() {
            let Some(source) = primitive.output(connection.source) else {
                continue;
            };
            let Some(target) = composition.find_input(connection.target) else {
                continue;
            };
            let Some(owner) = composition.primitive(target.primitive) else {
                continue;
            };
            lines.push(format!(
                "{}.{} -> {}.{} ({})",
                comment_text(&primitive.label),
                comment_text(&source.label),
                comment_text(&owner.label),
                comment_text(&target.label),
                connection.resource_type
            ));
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use movematrix_core::primitive::{Position, PrimitiveKind};

    fn wire(c: &mut Composition, from: PrimitiveId, output: usize, to: PrimitiveId, input: usize) {
        let source = c.primitive(from).unwrap().outputs[output].id;
        let target = c.primitive(to).unwrap().inputs[input].id;
        let ty = c.find_output(source).unwrap().resource_type.clone();
        c.insert_connection(source, target, ty).unwrap();
    }

    #[test]
    fn downstream_primitives_sort_after_upstream() {
        let mut c = Composition::new("Order", "");
        let vault = c.add_primitive(PrimitiveKind::Vault, Position::default()).id;
        let lending = c.add_primitive(PrimitiveKind::LendingPool, Position::default()).id;
        let staking = c.add_primitive(PrimitiveKind::Staking, Position::default()).id;
        wire(&mut c, lending, 0, vault, 0);

        assert_eq!(primitive_order(&c), [lending, staking, vault]);
    }

    #[test]
    fn cycles_fall_back_to_insertion_order() {
        let mut c = Composition::new("Cycle", "");
        let a = c.add_primitive(PrimitiveKind::LendingPool, Position::default()).id;
        let b = c.add_primitive(PrimitiveKind::LendingPool, Position::default()).id;
        wire(&mut c, b, 0, a, 0);
        wire(&mut c, a, 0, b, 0);

        assert_eq!(primitive_order(&c), [a, b]);
    }

    #[test]
    fn lines_use_labels_and_connection_type() {
        let mut c = Composition::new("Lines", "");
        let vault = c.add_primitive(PrimitiveKind::Vault, Position::default()).id;
        let lending = c.add_primitive(PrimitiveKind::LendingPool, Position::default()).id;
        wire(&mut c, lending, 0, vault, 0);

        assert_eq!(
            wiring_lines(&c),
            ["Lending Pool.Loan -> Yield Vault.Deposit (asset)"]
        );
    }
}
