//! Text rendering of [`ModuleIr`].
//!
//! Layout: header comment, module declaration, `use` lines, the wiring
//! comment block, then constants, records and functions in item order.
//! Four-space indentation throughout.

use std::fmt::Write;

use crate::ir::{Constant, Function, Item, ModuleIr, Record};

const INDENT: &str = "    ";

/// Renders a module to Move source text.
pub fn render(module: &ModuleIr) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail.
    let _ = write_module(&mut out, module);
    out
}

fn write_module(out: &mut String, module: &ModuleIr) -> std::fmt::Result {
    writeln!(out, "// {}", module.header)?;
    writeln!(out)?;
    match &module.address {
        Some(address) => writeln!(out, "module {}::{} {{", address, module.name)?,
        None => writeln!(out, "module {} {{", module.name)?,
    }

    for path in &module.uses {
        writeln!(out, "{INDENT}use {path};")?;
    }
    writeln!(out)?;

    if !module.wiring.is_empty() {
        writeln!(out, "{INDENT}// Wiring")?;
        for line in &module.wiring {
            writeln!(out, "{INDENT}//   {line}")?;
        }
        writeln!(out)?;
    }

    let mut previous_was_constant = false;
    for item in &module.items {
        match item {
            Item::Constant(c) => {
                write_constant(out, c)?;
                previous_was_constant = true;
                continue;
            }
            Item::Record(r) => {
                if previous_was_constant {
                    writeln!(out)?;
                }
                write_record(out, r)?;
            }
            Item::Function(f) => {
                if previous_was_constant {
                    writeln!(out)?;
                }
                write_function(out, f)?;
            }
        }
        previous_was_constant = false;
    }
    if previous_was_constant {
        writeln!(out)?;
    }

    writeln!(out, "}}")
}

fn trailing(comment: &Option<String>) -> String {
    comment
        .as_ref()
        .map(|c| format!(" // {c}"))
        .unwrap_or_default()
}

fn write_constant(out: &mut String, c: &Constant) -> std::fmt::Result {
    writeln!(
        out,
        "{INDENT}const {}: {} = {};{}",
        c.name,
        c.ty,
        c.value,
        trailing(&c.comment)
    )
}

fn write_record(out: &mut String, r: &Record) -> std::fmt::Result {
    if let Some(doc) = &r.doc {
        writeln!(out, "{INDENT}// {doc}")?;
    }
    let abilities = if r.abilities.is_empty() {
        String::new()
    } else {
        format!(" has {}", r.abilities.join(", "))
    };
    writeln!(out, "{INDENT}struct {}{} {{", r.name, abilities)?;
    for field in &r.fields {
        writeln!(
            out,
            "{INDENT}{INDENT}{}: {},{}",
            field.name,
            field.ty,
            trailing(&field.comment)
        )?;
    }
    writeln!(out, "{INDENT}}}")?;
    writeln!(out)
}

fn write_function(out: &mut String, f: &Function) -> std::fmt::Result {
    if let Some(doc) = &f.doc {
        writeln!(out, "{INDENT}// {doc}")?;
    }
    let params = f
        .params
        .iter()
        .map(|(name, ty)| format!("{name}: {ty}"))
        .collect::<Vec<_>>()
        .join(", ");
    let acquires = f
        .acquires
        .as_ref()
        .map(|r| format!(" acquires {r}"))
        .unwrap_or_default();
    writeln!(out, "{INDENT}public fun {}({}){} {{", f.name, params, acquires)?;
    for line in &f.body {
        writeln!(out, "{INDENT}{INDENT}{line}")?;
    }
    writeln!(out, "{INDENT}}}")?;
    writeln!(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Field;

    fn module(items: Vec<Item>) -> ModuleIr {
        ModuleIr {
            header: "Generated".into(),
            name: "demo".into(),
            address: None,
            uses: vec!["std::signer".into()],
            wiring: Vec::new(),
            items,
        }
    }

    #[test]
    fn empty_module_is_well_formed() {
        assert_eq!(
            render(&module(Vec::new())),
            "// Generated\n\nmodule demo {\n    use std::signer;\n\n}\n"
        );
    }

    #[test]
    fn address_qualifies_module() {
        let mut m = module(Vec::new());
        m.address = Some("0x42".into());
        assert!(render(&m).contains("module 0x42::demo {"));
    }

    #[test]
    fn items_render_with_comments() {
        let text = render(&module(vec![
            Item::Constant(Constant {
                name: "FEE".into(),
                ty: "u64".into(),
                value: "30".into(),
                comment: Some("0.3%".into()),
            }),
            Item::Record(Record {
                name: "Pool".into(),
                doc: None,
                abilities: vec!["key".into()],
                fields: vec![Field::new("fee", "u64", Some("0.3%".into()))],
            }),
            Item::Function(Function {
                name: "touch".into(),
                doc: Some("Touch".into()),
                params: vec![("account".into(), "&signer".into())],
                acquires: Some("Pool".into()),
                body: vec!["let x = 1;".into()],
            }),
        ]));

        assert!(text.contains("    const FEE: u64 = 30; // 0.3%\n\n    struct Pool has key {\n"));
        assert!(text.contains("        fee: u64, // 0.3%\n"));
        assert!(text.contains(
            "    // Touch\n    public fun touch(account: &signer) acquires Pool {\n        let x = 1;\n    }\n"
        ));
    }

    #[test]
    fn wiring_renders_as_comment_block() {
        let mut m = module(Vec::new());
        m.wiring = vec!["A.Out -> B.In (asset)".into()];
        assert!(render(&m).contains("    // Wiring\n    //   A.Out -> B.In (asset)\n"));
    }
}
