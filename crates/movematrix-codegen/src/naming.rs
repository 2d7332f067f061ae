//! Identifier derivation for modules and per-instance items.

use std::collections::HashMap;

use movematrix_core::primitive::PrimitiveKind;

/// Placeholder for a parameter with no usable value.
pub const UNSET: &str = "UNSET";

/// Normalizes a composition name into a Move module identifier.
///
/// Lowercases, turns each whitespace run into one `_` and drops any other
/// character that is not ASCII alphanumeric or `_`. An empty result or one
/// starting with a digit is prefixed with `composition`.
pub fn module_ident(name: &str) -> String {
    let mut ident = String::with_capacity(name.len());
    let mut in_space = false;
    for ch in name.trim().chars() {
        if ch.is_whitespace() {
            if !in_space {
                ident.push('_');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        if ch.is_ascii_alphanumeric() || ch == '_' {
            ident.push(ch.to_ascii_lowercase());
        }
    }

    match ident.chars().next() {
        None => "composition".to_string(),
        Some(c) if c.is_ascii_digit() => format!("composition_{ident}"),
        Some(_) => ident,
    }
}

/// Assigns each primitive instance its collision suffix.
///
/// The first instance of a kind gets `""`, the n-th (n >= 2) gets `"_n"`.
#[derive(Debug, Default)]
pub struct Suffixes {
    seen: HashMap<PrimitiveKind, usize>,
}

impl Suffixes {
    pub fn next(&mut self, kind: PrimitiveKind) -> String {
        let n = self.seen.entry(kind).or_insert(0);
        *n += 1;
        if *n == 1 {
            String::new()
        } else {
            format!("_{n}")
        }
    }
}

/// Converts a camelCase parameter id into a constant name:
/// `interestRate` becomes `INTEREST_RATE`.
pub fn const_ident(parameter: &str) -> String {
    let mut out = String::with_capacity(parameter.len() + 4);
    for (i, ch) in parameter.chars().enumerate() {
        if ch.is_ascii_uppercase() && i > 0 {
            out.push('_');
        }
        out.push(ch.to_ascii_uppercase());
    }
    out
}

/// Flattens free text for use inside a `//` comment.
pub fn comment_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
