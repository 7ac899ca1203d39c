//! Resolution helpers for the fixed set of built-in utility type names
//! (spec §4.5.6). `Array`, `Record`, and `Promise` are not listed here: the
//! parser already folds those into dedicated `TypeNode` variants
//! (`build_reference` in `parser.rs`), so the emitter never sees them as a
//! named `Reference`.

use crate::ast::TypeNode;

pub const UTILITY_TYPE_NAMES: &[&str] = &[
    "Partial",
    "Required",
    "Pick",
    "Omit",
    "Readonly",
    "NonNullable",
    "Set",
    "Map",
];

pub fn is_utility_type(name: &str) -> bool {
    UTILITY_TYPE_NAMES.contains(&name)
}

/// Extracts the literal string keys named by a `Pick`/`Omit` key argument —
/// a single string literal or a union of string literals. `None` means the
/// keys can't be statically determined, in which case callers pass the base
/// type through unchanged (spec §4.5.6).
pub fn literal_string_keys(node: &TypeNode) -> Option<Vec<String>> {
    match node {
        TypeNode::LiteralString(s) => Some(vec![s.clone()]),
        TypeNode::Union(members) => {
            let mut keys = Vec::with_capacity(members.len());
            for member in members {
                match member {
                    TypeNode::LiteralString(s) => keys.push(s.clone()),
                    _ => return None,
                }
            }
            Some(keys)
        }
        _ => None,
    }
}
