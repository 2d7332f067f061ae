//! Resource-type compatibility rules for new connections.
//!
//! Decides whether an output tagged `source` may feed an input tagged
//! `target`. This is a permissive heuristic over a small domain vocabulary,
//! not a sound type system. Three tiers are tried in order, each strictly
//! more permissive than the last, and the first hit wins:
//!
//! 1. [`Compatibility::Exact`]: the tags are equal ignoring case.
//! 2. [`Compatibility::Synonym`]: either tag's synonym list names the other.
//!    Lists are not symmetric, so both directions are consulted.
//!    Keys are matched ignoring case, including mixed-case keys such as
//!    `stakeAsset` and `loanReceipt`. A lookup of the lowercased tag against
//!    the keys as written would never reach those entries and would reject
//!    pairs like `debt`/`loanReceipt`; accepting them is intentional.
//! 3. [`Compatibility::CommonRoot`]: both tags contain the same common root
//!    (`asset`, `token`, `receipt`, `stake`) as a substring.
//!
//! The verdict is taken once, when a connection is created. The validator
//! deliberately applies a stricter exact-equality rule afterwards.

use serde::Serialize;

/// Which tier accepted a pair of tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Compatibility {
    Exact,
    Synonym,
    CommonRoot,
}

/// Hand-curated synonym lists, keyed by tag.
///
/// Asset-like, staking, lending and yield clusters. A key's list is not
/// guaranteed to mirror the lists of the tags it names.
const SYNONYMS: &[(&str, &[&str])] = &[
    // Asset category
    (
        "asset",
        &["token", "liquidity", "coin", "currency", "collateral", "stakeAsset", "stakeReceipt", "receipt"],
    ),
    (
        "token",
        &["asset", "liquidity", "coin", "currency", "collateral", "stakeAsset", "stakeReceipt", "receipt"],
    ),
    ("coin", &["asset", "token", "liquidity", "currency", "collateral"]),
    ("currency", &["asset", "token", "liquidity", "coin", "collateral"]),
    ("liquidity", &["token", "asset", "coin", "currency"]),
    ("collateral", &["asset", "token", "coin", "currency"]),
    // Staking
    ("stake", &["token", "asset", "stakeAsset"]),
    ("stakeAsset", &["token", "asset", "stake"]),
    ("stakeReceipt", &["receipt", "token", "asset"]),
    ("receipt", &["stakeReceipt", "token", "asset", "depositReceipt", "loanReceipt"]),
    // Lending
    ("loan", &["asset", "token", "debt"]),
    ("debt", &["loan", "asset", "token"]),
    ("depositReceipt", &["receipt", "token", "asset"]),
    ("loanReceipt", &["receipt", "debt", "loan"]),
    // Yield
    ("interest", &["yield", "rewards", "revenue"]),
    ("yield", &["interest", "rewards", "revenue"]),
    ("rewards", &["yield", "interest", "asset", "token", "revenue"]),
    ("revenue", &["yield", "interest", "rewards", "asset", "token"]),
];

/// Substrings that make two otherwise unrelated tags compatible.
const COMMON_ROOTS: [&str; 4] = ["asset", "token", "receipt", "stake"];

/// Unicode case fold used by every tier.
fn fold(tag: &str) -> String {
    tag.to_lowercase()
}

/// Takes folded tags.
fn synonyms_of(tag: &str) -> &'static [&'static str] {
    SYNONYMS
        .iter()
        .find(|(key, _)| fold(key) == tag)
        .map(|(_, list)| *list)
        .unwrap_or(&[])
}

/// Takes folded tags.
fn lists(tag: &str, other: &str) -> bool {
    synonyms_of(tag).iter().any(|s| fold(s) == other)
}

/// Classifies a (source, target) tag pair. `None` means incompatible.
pub fn compatibility(source: &str, target: &str) -> Option<Compatibility> {
    let source = fold(source);
    let target = fold(target);

    if source == target {
        return Some(Compatibility::Exact);
    }

    if lists(&source, &target) || lists(&target, &source) {
        return Some(Compatibility::Synonym);
    }

    if COMMON_ROOTS
        .iter()
        .any(|root| source.contains(root) && target.contains(root))
    {
        return Some(Compatibility::CommonRoot);
    }

    None
}

/// Returns `true` if an output tagged `source` may feed an input tagged
/// `target`.
pub fn is_compatible(source: &str, target: &str) -> bool {
    compatibility(source, target).is_some()
}
