//! Structured intermediate representation of a generated Move module.
//!
//! Templates build a [`ModuleIr`]; [`crate::render`] is the only code that
//! turns it into text. Nothing here knows about primitives.

use serde::Serialize;

/// One generated module.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModuleIr {
    /// Leading comment line, without the `// ` prefix.
    pub header: String,
    /// Normalized module identifier.
    pub name: String,
    /// Optional account address, rendered as `module <address>::<name>`.
    pub address: Option<String>,
    /// Fully qualified `use` paths.
    pub uses: Vec<String>,
    /// Documentation-only wiring lines, rendered as a comment block.
    pub wiring: Vec<String>,
    pub items: Vec<Item>,
}

impl ModuleIr {
    pub fn constants(&self) -> impl Iterator<Item = &Constant> {
        self.items.iter().filter_map(|item| match item {
            Item::Constant(c) => Some(c),
            _ => None,
        })
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.items.iter().filter_map(|item| match item {
            Item::Record(r) => Some(r),
            _ => None,
        })
    }

    pub fn functions(&self) -> impl Iterator<Item = &Function> {
        self.items.iter().filter_map(|item| match item {
            Item::Function(f) => Some(f),
            _ => None,
        })
    }
}

/// A top-level module item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Item {
    Constant(Constant),
    Record(Record),
    Function(Function),
}

/// `const NAME: ty = value; // comment`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constant {
    pub name: String,
    pub ty: String,
    /// Literal text; `UNSET` when the parameter has no usable value.
    pub value: String,
    pub comment: Option<String>,
}

/// A resource struct with `key` ability.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Record {
    pub name: String,
    /// Comment line rendered above the struct.
    pub doc: Option<String>,
    pub abilities: Vec<String>,
    pub fields: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name: String,
    pub ty: String,
    pub comment: Option<String>,
}

/// A `public fun` with a pre-formatted body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Function {
    pub name: String,
    pub doc: Option<String>,
    /// `(name, type)` pairs.
    pub params: Vec<(String, String)>,
    pub acquires: Option<String>,
    /// Body statements, one per line, indented relative to the function.
    pub body: Vec<String>,
}

impl Field {
    pub fn new(name: &str, ty: impl Into<String>, comment: Option<String>) -> Self {
        Field {
            name: name.to_string(),
            ty: ty.into(),
            comment,
        }
    }
}
