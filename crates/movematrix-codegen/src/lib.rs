//! Move (Aptos) source generation for compositions.
//!
//! Generation is a pure function of a composition snapshot: templates build
//! a structured [`ir::ModuleIr`] and [`render::render`] turns it into text.
//! The generator never validates; a missing parameter value renders as the
//! placeholder `UNSET`.
//!
//! # Modules
//!
//! - [`ir`] -- Module, constant, record and function representation
//! - [`naming`] -- Module identifiers, constant names and collision suffixes
//! - [`templates`] -- Fixed per-kind emission templates
//! - [`wiring`] -- Topologically ordered connection summary (comments only)
//! - [`render`] -- IR to text

pub mod ir;
pub mod naming;
pub mod render;
pub mod templates;
pub mod wiring;

use serde::{Deserialize, Serialize};

use movematrix_core::composition::Composition;

use crate::ir::{Item, ModuleIr};
use crate::naming::{module_ident, Suffixes};

/// Options controlling code generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerateOptions {
    /// Account address for `module <address>::<name>`.
    /// `None` emits an unqualified module.
    pub module_address: Option<String>,

    /// Whether to emit the wiring comment block.
    pub include_wiring: bool,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            module_address: None,
            include_wiring: true,
        }
    }
}

/// The framework modules every generated module imports.
pub const USES: [&str; 3] = ["std::signer", "aptos_framework::coin", "aptos_framework::account"];

/// Builds the IR for a composition.
///
/// All constants come first, then every record, then every function, each
/// group in primitive insertion order.
pub fn build_module(composition: &Composition, options: &GenerateOptions) -> ModuleIr {
    let mut suffixes = Suffixes::default();
    let emitted: Vec<_> = composition
        .primitives()
        .map(|p| templates::emit(p, &suffixes.next(p.kind)))
        .collect();

    let mut items = Vec::new();
    for e in &emitted {
        items.extend(e.constants.iter().cloned().map(Item::Constant));
    }
    for e in &emitted {
        items.push(Item::Record(e.record.clone()));
    }
    for e in emitted {
        items.extend(e.functions.into_iter().map(Item::Function));
    }

    ModuleIr {
        header: format!("Generated Move code for composition: {}", composition.name()),
        name: module_ident(composition.name()),
        address: options.module_address.clone(),
        uses: USES.iter().map(|u| u.to_string()).collect(),
        wiring: if options.include_wiring {
            wiring::wiring_lines(composition)
        } else {
            Vec::new()
        },
        items,
    }
}

/// Generates Move source text for a composition. Deterministic: the same
/// snapshot and options always produce the same text.
pub fn generate(composition: &Composition, options: &GenerateOptions) -> String {
    render::render(&build_module(composition, options))
}
