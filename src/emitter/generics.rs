//! Monomorphic generic instantiation via the positional parameter
//! convention (spec §4.5.7, §9): the parser discards type-parameter names
//! and keeps only their position, so substitution keys off position using a
//! fixed conventional name table rather than the source's own names.

use std::collections::HashMap;

use crate::ast::{IndexSignature, Property, TupleElement, TypeNode};

pub const PARAM_NAMES: &[&str] = &["T", "U", "V", "W", "K", "TKey", "TValue"];

/// Builds `conventional name -> argument` for as many arguments as the name
/// table covers; extra arguments beyond `PARAM_NAMES.len()` are dropped.
pub fn substitution_map(args: &[TypeNode]) -> HashMap<&'static str, TypeNode> {
    PARAM_NAMES
        .iter()
        .zip(args.iter())
        .map(|(&name, arg)| (name, arg.clone()))
        .collect()
}

/// Recursively replaces argumentless `Reference` nodes whose name matches a
/// substitution key with the corresponding argument; everything else is
/// cloned structurally.
pub fn substitute(node: &TypeNode, subst: &HashMap<&'static str, TypeNode>) -> TypeNode {
    match node {
        TypeNode::Reference { name, type_args: None } => subst
            .get(name.as_str())
            .cloned()
            .unwrap_or_else(|| node.clone()),
        TypeNode::Reference { name, type_args: Some(args) } => TypeNode::Reference {
            name: name.clone(),
            type_args: Some(args.iter().map(|a| substitute(a, subst)).collect()),
        },
        TypeNode::Array(inner) => TypeNode::Array(Box::new(substitute(inner, subst))),
        TypeNode::Parenthesized(inner) => TypeNode::Parenthesized(Box::new(substitute(inner, subst))),
        TypeNode::Record(k, v) => TypeNode::Record(
            Box::new(substitute(k, subst)),
            Box::new(substitute(v, subst)),
        ),
        TypeNode::Union(members) => TypeNode::Union(members.iter().map(|m| substitute(m, subst)).collect()),
        TypeNode::Intersection(members) => {
            TypeNode::Intersection(members.iter().map(|m| substitute(m, subst)).collect())
        }
        TypeNode::Tuple(elements) => TypeNode::Tuple(
            elements
                .iter()
                .map(|e| TupleElement {
                    type_node: substitute(&e.type_node, subst),
                    optional: e.optional,
                    label: e.label.clone(),
                    rest: e.rest,
                })
                .collect(),
        ),
        TypeNode::Object { properties, index_signature } => TypeNode::Object {
            properties: properties
                .iter()
                .map(|p| Property {
                    name: p.name.clone(),
                    type_node: substitute(&p.type_node, subst),
                    optional: p.optional,
                    readonly: p.readonly,
                    doc: p.doc.clone(),
                })
                .collect(),
            index_signature: index_signature.as_ref().map(|idx| {
                Box::new(IndexSignature {
                    key_type: substitute(&idx.key_type, subst),
                    value_type: substitute(&idx.value_type, subst),
                })
            }),
        },
        TypeNode::Mapped { param, constraint, value, optional } => TypeNode::Mapped {
            param: param.clone(),
            constraint: Box::new(substitute(constraint, subst)),
            value: Box::new(substitute(value, subst)),
            optional: *optional,
        },
        other => other.clone(),
    }
}
