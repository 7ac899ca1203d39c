//! The declaration and type-expression tree produced by the parser.
//!
//! Nodes are owned, plain tagged enums/structs — no arena, no interning.
//! Cross-declaration references are by name only (`TypeNode::Reference`);
//! the emitter resolves them against the declaration list it was given.

use std::path::PathBuf;

/// A JSDoc comment attached to a declaration or property.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JsDoc {
    pub description: Option<String>,
    pub tags: std::collections::HashMap<String, String>,
}

impl JsDoc {
    pub fn tag(&self, name: &str) -> Option<&str> {
        self.tags.get(name).map(String::as_str)
    }
}

/// A top-level named entity: interface, type alias, or enum.
#[derive(Debug, Clone, PartialEq)]
pub struct Declaration {
    pub name: String,
    pub exported: bool,
    pub doc: Option<JsDoc>,
    pub source_file: Option<PathBuf>,
    pub kind: DeclarationKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DeclarationKind {
    Interface(InterfaceDecl),
    TypeAlias(TypeAliasDecl),
    Enum(EnumDecl),
}

impl Declaration {
    pub fn description(&self) -> Option<&str> {
        self.doc.as_ref().and_then(|d| d.description.as_deref())
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.doc.as_ref().and_then(|d| d.tag(name))
    }
}

/// `interface Name [<T, U, ...>] [extends Ref1, Ref2, ...] { ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct InterfaceDecl {
    pub type_params: Vec<String>,
    pub extends: Vec<TypeNode>,
    pub properties: Vec<Property>,
    pub index_signature: Option<IndexSignature>,
}

/// `type Name [<T, U, ...>] = TypeNode;`
#[derive(Debug, Clone, PartialEq)]
pub struct TypeAliasDecl {
    pub type_params: Vec<String>,
    pub value: TypeNode,
}

/// `enum Name { A, B = "b", ... }`
#[derive(Debug, Clone, PartialEq)]
pub struct EnumDecl {
    pub members: Vec<EnumMember>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EnumMember {
    pub name: String,
    pub value: EnumValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum EnumValue {
    String(String),
    Number(f64),
}

/// An object member: `readonly? name ?? : TypeNode`.
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub type_node: TypeNode,
    pub optional: bool,
    pub readonly: bool,
    pub doc: Option<JsDoc>,
}

impl Property {
    pub fn description(&self) -> Option<&str> {
        self.doc.as_ref().and_then(|d| d.description.as_deref())
    }

    pub fn tag(&self, name: &str) -> Option<&str> {
        self.doc.as_ref().and_then(|d| d.tag(name))
    }
}

/// `[name: KeyType]: ValueType`
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSignature {
    pub key_type: TypeNode,
    pub value_type: TypeNode,
}

/// A single element of a tuple type: `...?name: TypeNode?`.
#[derive(Debug, Clone, PartialEq)]
pub struct TupleElement {
    pub type_node: TypeNode,
    pub optional: bool,
    pub label: Option<String>,
    pub rest: bool,
}

/// A primitive keyword type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveKind {
    String,
    Number,
    Boolean,
    Null,
    Undefined,
    Any,
    Unknown,
    Never,
    Void,
    Object,
    BigInt,
}

/// A recursive type expression.
#[derive(Debug, Clone, PartialEq)]
pub enum TypeNode {
    Primitive(PrimitiveKind),
    LiteralString(String),
    LiteralNumber(f64),
    LiteralBoolean(bool),
    Object {
        properties: Vec<Property>,
        index_signature: Option<Box<IndexSignature>>,
    },
    Array(Box<TypeNode>),
    Tuple(Vec<TupleElement>),
    Union(Vec<TypeNode>),
    Intersection(Vec<TypeNode>),
    Reference {
        name: String,
        type_args: Option<Vec<TypeNode>>,
    },
    Parenthesized(Box<TypeNode>),
    Record(Box<TypeNode>, Box<TypeNode>),
    TemplateLiteral(Vec<String>),
    Mapped {
        param: String,
        constraint: Box<TypeNode>,
        value: Box<TypeNode>,
        optional: Option<bool>,
    },
}

impl TypeNode {
    /// Wraps a parsed union's member list, unwrapping the singleton case.
    /// `Union.members.len() >= 2` is an invariant of the constructed node.
    pub fn union(mut members: Vec<TypeNode>) -> TypeNode {
        if members.len() == 1 {
            members.pop().expect("checked len == 1")
        } else {
            TypeNode::Union(members)
        }
    }

    pub fn intersection(mut members: Vec<TypeNode>) -> TypeNode {
        if members.len() == 1 {
            members.pop().expect("checked len == 1")
        } else {
            TypeNode::Intersection(members)
        }
    }

    /// `T | null`/`T | undefined` detection used by union emission (§4.5.5).
    pub fn is_null_or_undefined(&self) -> bool {
        matches!(
            self,
            TypeNode::Primitive(PrimitiveKind::Null) | TypeNode::Primitive(PrimitiveKind::Undefined)
        )
    }
}
