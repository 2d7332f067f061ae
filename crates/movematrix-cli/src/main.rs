//! movematrix command-line tool.
//!
//! Provides the `movematrix` binary with two subcommands:
//! - `catalog` lists the primitive templates, optionally filtered
//! - `scaffold` builds a composition in memory from flags, validates it and
//!   prints the generated Move module
//!
//! Nothing is read from or written to disk.

use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;

use movematrix_core::id::PrimitiveId;
use movematrix_core::primitive::{Position, PrimitiveKind};
use movematrix_core::registry::{PrimitiveTemplate, Registry};
use movematrix_engine::{CompositionStore, GenerateOptions, ValidationResult};

/// Environment variable holding the log level (default `warn`).
const LOG_ENV: &str = "MOVEMATRIX_LOG";
/// Environment variable supplying the default `--address`.
const ADDRESS_ENV: &str = "MOVEMATRIX_MODULE_ADDRESS";

/// DeFi composition scaffolding for Move.
#[derive(Parser)]
#[command(name = "movematrix", about = "DeFi composition scaffolding for Move")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// List primitive templates with their parameters and ports.
    Catalog {
        /// Only templates whose name, description or tags contain TERM.
        #[arg(short, long)]
        search: Option<String>,

        /// Only templates in this category (e.g. Lending, Exchange, Yield).
        #[arg(short, long)]
        category: Option<String>,

        /// Print the matching templates as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Build a composition, validate it and print the generated module.
    Scaffold {
        /// Composition name; also the module name after normalization.
        #[arg(short, long)]
        name: String,

        #[arg(short, long, default_value = "")]
        description: String,

        /// Primitive kind to add (lendingPool, ammPool, staking, vault).
        /// Repeatable; primitives are indexed from 0 in flag order.
        #[arg(short, long = "kind")]
        kinds: Vec<String>,

        /// Parameter assignment IDX.PARAM=VALUE, e.g. `0.interestRate=7`.
        #[arg(short, long = "set")]
        sets: Vec<String>,

        /// Connection SRC_IDX:OUTPUT_LABEL=DST_IDX:INPUT_LABEL,
        /// e.g. `0:Loan=1:Token A`.
        #[arg(long = "connect")]
        connects: Vec<String>,

        /// Module address (default: $MOVEMATRIX_MODULE_ADDRESS).
        #[arg(short, long)]
        address: Option<String>,

        /// Omit the wiring comment block.
        #[arg(long)]
        no_wiring: bool,

        /// Print the validation report and code as one JSON object.
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    init_logging();
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Catalog {
            search,
            category,
            json,
        } => run_catalog(search.as_deref(), category.as_deref(), json),
        Commands::Scaffold {
            name,
            description,
            kinds,
            sets,
            connects,
            address,
            no_wiring,
            json,
        } => {
            let options = GenerateOptions {
                module_address: address.or_else(|| std::env::var(ADDRESS_ENV).ok()),
                include_wiring: !no_wiring,
            };
            let request = ScaffoldRequest {
                name,
                description,
                kinds,
                sets,
                connects,
            };
            run_scaffold(&request, options, json)
        }
    };
    process::exit(exit_code);
}

/// Installs a stderr fmt subscriber at the level named by `MOVEMATRIX_LOG`.
fn init_logging() {
    let level = std::env::var(LOG_ENV)
        .ok()
        .and_then(|v| v.parse::<tracing::Level>().ok())
        .unwrap_or(tracing::Level::WARN);
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

// ---------------------------------------------------------------------------
// catalog
// ---------------------------------------------------------------------------

/// Execute the catalog subcommand. Returns 0, or 1 if nothing matched.
fn run_catalog(search: Option<&str>, category: Option<&str>, json: bool) -> i32 {
    let templates = Registry::search(search.unwrap_or(""), category);
    if templates.is_empty() {
        eprintln!("No templates match.");
        return 1;
    }

    if json {
        match serde_json::to_string_pretty(&templates) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: failed to serialize catalog: {}", e);
                return 1;
            }
        }
        return 0;
    }

    for template in templates {
        print!("{}", describe_template(template));
    }
    0
}

fn describe_template(t: &PrimitiveTemplate) -> String {
    let mut out = format!("{} ({}) [{}]\n  {}\n", t.name, t.kind, t.category, t.description);
    out.push_str("  parameters:\n");
    for p in t.parameters {
        let mut bounds = Vec::new();
        if let Some(min) = p.constraints.minimum {
            bounds.push(format!("min {}", min));
        }
        if let Some(max) = p.constraints.maximum {
            bounds.push(format!("max {}", max));
        }
        if !p.constraints.allowed.is_empty() {
            bounds.push(format!("one of {}", p.constraints.allowed.join("|")));
        }
        let bounds = if bounds.is_empty() {
            String::new()
        } else {
            format!(" ({})", bounds.join(", "))
        };
        out.push_str(&format!(
            "    {}: {} = {}{}\n",
            p.id,
            p.ty,
            p.default_value(),
            bounds
        ));
    }
    let ports = |specs: &[movematrix_core::registry::PortSpec]| {
        specs
            .iter()
            .map(|s| format!("{} <{}>", s.label, s.resource_type))
            .collect::<Vec<_>>()
            .join(", ")
    };
    out.push_str(&format!("  inputs:  {}\n", ports(t.inputs)));
    out.push_str(&format!("  outputs: {}\n", ports(t.outputs)));
    out
}

// ---------------------------------------------------------------------------
// scaffold
// ---------------------------------------------------------------------------

struct ScaffoldRequest {
    name: String,
    description: String,
    kinds: Vec<String>,
    sets: Vec<String>,
    connects: Vec<String>,
}

#[derive(Serialize)]
struct ScaffoldReport<'a> {
    validation: &'a ValidationResult,
    code: Option<&'a str>,
}

/// Execute the scaffold subcommand.
///
/// Returns exit code: 0 = success, 1 = usage or engine error,
/// 2 = validation failed (no code printed).
fn run_scaffold(request: &ScaffoldRequest, options: GenerateOptions, json: bool) -> i32 {
    let store = match build_store(request, options) {
        Ok(store) => store,
        Err(msg) => {
            eprintln!("Error: {}", msg);
            return 1;
        }
    };

    let validation = store.validate_composition();
    let code = validation.valid.then(|| store.export_code());

    if json {
        let report = ScaffoldReport {
            validation: &validation,
            code: code.as_deref(),
        };
        match serde_json::to_string_pretty(&report) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("Error: failed to serialize report: {}", e);
                return 1;
            }
        }
    } else {
        for issue in &validation.issues {
            eprintln!("{}", issue);
        }
        if let Some(code) = &code {
            print!("{}", code);
        }
    }

    if validation.valid {
        0
    } else {
        eprintln!(
            "Validation failed with {} error(s).",
            validation.errors().count()
        );
        2
    }
}

/// Applies the scaffold flags to a fresh store, in order: kinds, sets,
/// connections.
fn build_store(request: &ScaffoldRequest, options: GenerateOptions) -> Result<CompositionStore, String> {
    let mut store =
        CompositionStore::new(request.name.as_str(), request.description.as_str()).with_options(options);

    let mut ids: Vec<PrimitiveId> = Vec::new();
    for (i, tag) in request.kinds.iter().enumerate() {
        let kind: PrimitiveKind = tag.parse().map_err(|e| format!("--kind {}: {}", tag, e))?;
        let position = Position::new(i as f64 * 200.0, 0.0);
        ids.push(store.add_primitive(kind, position).id);
    }

    for raw in &request.sets {
        let (index, parameter, value) = parse_set(raw)?;
        let id = primitive_at(&ids, index)?;
        store
            .set_parameter_from_json(id, parameter, &serde_json::Value::String(value.to_string()))
            .map_err(|e| format!("--set {}: {}", raw, e))?;
    }

    for raw in &request.connects {
        let ((src, output), (dst, input)) = parse_connect(raw)?;
        let composition = store.get_composition();
        let source = composition
            .primitive(primitive_at(&ids, src)?)
            .and_then(|p| p.output_labeled(output))
            .map(|p| p.id)
            .ok_or_else(|| format!("--connect {}: no output labeled '{}'", raw, output))?;
        let target = composition
            .primitive(primitive_at(&ids, dst)?)
            .and_then(|p| p.input_labeled(input))
            .map(|p| p.id)
            .ok_or_else(|| format!("--connect {}: no input labeled '{}'", raw, input))?;
        store
            .try_add_connection(source, target)
            .map_err(|e| format!("--connect {}: {}", raw, e))?;
    }

    Ok(store)
}

fn primitive_at(ids: &[PrimitiveId], index: usize) -> Result<PrimitiveId, String> {
    ids.get(index).copied().ok_or_else(|| {
        format!(
            "primitive index {} out of range ({} primitive(s) added)",
            index,
            ids.len()
        )
    })
}

/// Parses `IDX.PARAM=VALUE`.
fn parse_set(raw: &str) -> Result<(usize, &str, &str), String> {
    let (target, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("invalid --set '{}', expected IDX.PARAM=VALUE", raw))?;
    let (index, parameter) = target
        .split_once('.')
        .ok_or_else(|| format!("invalid --set '{}', expected IDX.PARAM=VALUE", raw))?;
    let index = parse_index(index)?;
    Ok((index, parameter.trim(), value))
}

/// Parses `SRC_IDX:OUTPUT_LABEL=DST_IDX:INPUT_LABEL`.
fn parse_connect(raw: &str) -> Result<((usize, &str), (usize, &str)), String> {
    let invalid = || {
        format!(
            "invalid --connect '{}', expected SRC_IDX:OUTPUT_LABEL=DST_IDX:INPUT_LABEL",
            raw
        )
    };
    let (source, target) = raw.split_once('=').ok_or_else(invalid)?;
    let source = parse_endpoint(source).ok_or_else(invalid)?;
    let target = parse_endpoint(target).ok_or_else(invalid)?;
    Ok((source, target))
}

/// Parses `IDX:LABEL`; the label may contain spaces.
fn parse_endpoint(s: &str) -> Option<(usize, &str)> {
    let (index, label) = s.split_once(':')?;
    Some((index.trim().parse().ok()?, label.trim()))
}

fn parse_index(s: &str) -> Result<usize, String> {
    s.trim()
        .parse()
        .map_err(|_| format!("invalid primitive index '{}'", s))
}
