//! Declaration list → JSON Schema (spec §4.5). This is the bulk of the
//! pipeline: resolving generics and utility types, placing `$ref`s,
//! detecting self-reference, and applying JSDoc-derived constraints.

mod generics;
pub mod schema;
mod utility_types;

pub use schema::{AdditionalProperties, Schema, SchemaType};

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use serde_json::Value;

use crate::ast::{
    Declaration, DeclarationKind, EnumDecl, EnumValue, IndexSignature, InterfaceDecl, JsDoc, PrimitiveKind,
    Property, TupleElement, TypeNode,
};
use crate::error::{Error, Result};

/// Callback signature shared by `defineNameTransform` and `defineId`: `Err`
/// carries the message wrapped into `Error::Callback`.
pub type NameTransform<'a> = dyn Fn(&str, &Declaration) -> std::result::Result<String, String> + 'a;
pub type IdCallback<'a> = dyn Fn(&str, &Declaration) -> std::result::Result<String, String> + 'a;

pub struct EmitOptions<'a> {
    pub include_schema: bool,
    pub schema_version: String,
    pub strict_objects: bool,
    pub additional_properties: Option<bool>,
    pub root_type: Option<String>,
    pub include_jsdoc: bool,
    pub define_name_transform: Option<&'a NameTransform<'a>>,
    pub define_id: Option<&'a IdCallback<'a>>,
}

impl<'a> Default for EmitOptions<'a> {
    fn default() -> Self {
        EmitOptions {
            include_schema: true,
            schema_version: "https://json-schema.org/draft/2020-12/schema".to_string(),
            strict_objects: false,
            additional_properties: None,
            root_type: None,
            include_jsdoc: true,
            define_name_transform: None,
            define_id: None,
        }
    }
}

/// Single-document mode (spec §4.5.2.A): one root schema, everything else
/// reachable from it grouped under `$defs`.
pub fn emit(declarations: &[Declaration], options: &EmitOptions) -> Result<Schema> {
    if declarations.is_empty() {
        let mut schema = Schema::empty();
        if options.include_schema {
            schema.schema = Some(options.schema_version.clone());
        }
        return Ok(schema);
    }

    let mut ctx = Ctx::new(declarations, options)?;
    let root_name = options
        .root_type
        .clone()
        .unwrap_or_else(|| declarations[0].name.clone());

    ctx.ensure_def_emitted(&root_name)?;
    let transformed_root = ctx.transformed_name(&root_name);
    let self_ref = ctx.is_self_referential(&root_name);

    let mut root_schema = if self_ref {
        Schema::reference(ctx.ref_pointer(&root_name)?)
    } else {
        ctx.defs.shift_remove(&transformed_root).unwrap_or_else(Schema::empty)
    };

    if options.include_schema {
        root_schema.schema = Some(options.schema_version.clone());
    }
    root_schema.defs = std::mem::take(&mut ctx.defs);
    Ok(root_schema)
}

/// Batch mode (spec §4.5.2.B): every declaration gets a self-contained
/// entry, draft-07 `definitions` trimmed to its own transitive dependencies.
pub fn emit_all(declarations: &[Declaration], options: &EmitOptions) -> Result<IndexMap<String, Schema>> {
    let mut ctx = Ctx::new(declarations, options)?;
    for decl in declarations {
        ctx.ensure_def_emitted(&decl.name)?;
    }

    let mut out = IndexMap::new();
    for decl in declarations {
        let transformed = ctx.transformed_name(&decl.name);
        let body = ctx.defs.get(&transformed).cloned().unwrap_or_else(Schema::empty);
        let reachable = reachable_from(&ctx.defs, &body);
        let self_ref = reachable.contains(&transformed);

        let mut entry = if self_ref {
            Schema::reference(ctx.ref_pointer(&decl.name)?)
        } else {
            body
        };

        if options.define_id.is_some() {
            entry.id = Some(ctx.id_for(&decl.name)?);
        } else {
            entry = rewrite_refs_to_definitions(entry);
            let mut definitions = IndexMap::new();
            for name in ctx.defs.keys() {
                if reachable.contains(name) {
                    if let Some(schema) = ctx.defs.get(name) {
                        definitions.insert(name.clone(), rewrite_refs_to_definitions(schema.clone()));
                    }
                }
            }
            entry.definitions = definitions;
        }

        if options.include_schema {
            entry.schema = Some(options.schema_version.clone());
        }
        out.insert(transformed, entry);
    }
    Ok(out)
}

struct Ctx<'a> {
    by_name: HashMap<&'a str, &'a Declaration>,
    options: &'a EmitOptions<'a>,
    names: HashMap<String, String>,
    defs: IndexMap<String, Schema>,
    emitted: HashSet<String>,
    ids: HashMap<String, String>,
    id_to_name: HashMap<String, String>,
}

impl<'a> Ctx<'a> {
    fn new(declarations: &'a [Declaration], options: &'a EmitOptions<'a>) -> Result<Self> {
        let by_name = declarations.iter().map(|d| (d.name.as_str(), d)).collect();
        let names = build_name_map(declarations, options)?;
        Ok(Ctx {
            by_name,
            options,
            names,
            defs: IndexMap::new(),
            emitted: HashSet::new(),
            ids: HashMap::new(),
            id_to_name: HashMap::new(),
        })
    }

    fn transformed_name(&self, original: &str) -> String {
        self.names.get(original).cloned().unwrap_or_else(|| original.to_string())
    }

    fn id_for(&mut self, name: &str) -> Result<String> {
        if let Some(id) = self.ids.get(name) {
            return Ok(id.clone());
        }
        let decl = *self
            .by_name
            .get(name)
            .expect("id_for called only for declared names");
        let callback = self.options.define_id.expect("id_for called only when defineId is set");
        let id = callback(name, decl).map_err(|message| Error::Callback {
            callback: "defineId",
            type_name: name.to_string(),
            message,
        })?;
        if let Some(existing) = self.id_to_name.get(&id) {
            return Err(Error::DuplicateId {
                id,
                first: existing.clone(),
                second: name.to_string(),
            });
        }
        self.id_to_name.insert(id.clone(), name.to_string());
        self.ids.insert(name.to_string(), id.clone());
        Ok(id)
    }

    fn ref_pointer(&mut self, name: &str) -> Result<String> {
        if self.options.define_id.is_some() {
            self.id_for(name)
        } else {
            Ok(format!("#/$defs/{}", self.transformed_name(name)))
        }
    }

    /// Emits `name`'s own declaration into `$defs` (idempotent). A
    /// placeholder is inserted before recursing so self-referential bodies
    /// terminate instead of looping.
    fn ensure_def_emitted(&mut self, name: &str) -> Result<()> {
        if self.emitted.contains(name) {
            return Ok(());
        }
        let Some(decl) = self.by_name.get(name).copied() else {
            return Ok(());
        };
        self.emitted.insert(name.to_string());
        let transformed = self.transformed_name(name);
        self.defs.insert(transformed.clone(), Schema::empty());
        let schema = self.emit_declaration(decl)?;
        self.defs.insert(transformed, schema);
        Ok(())
    }

    fn is_self_referential(&self, original_root_name: &str) -> bool {
        let transformed_root = self.transformed_name(original_root_name);
        let Some(body) = self.defs.get(&transformed_root) else {
            return false;
        };
        reachable_from(&self.defs, body).contains(&transformed_root)
    }

    // -- declaration bodies --------------------------------------------

    fn emit_declaration(&mut self, decl: &Declaration) -> Result<Schema> {
        let mut schema = match &decl.kind {
            DeclarationKind::Interface(iface) => self.emit_interface(decl, iface)?,
            DeclarationKind::TypeAlias(alias) => self.emit_type_alias(decl, alias)?,
            DeclarationKind::Enum(e) => self.emit_enum(e),
        };
        if self.options.include_jsdoc {
            apply_doc(&mut schema, decl.doc.as_ref());
        }
        Ok(schema)
    }

    fn emit_interface(&mut self, decl: &Declaration, iface: &InterfaceDecl) -> Result<Schema> {
        let (props, idx) = self.structural_interface(decl, iface)?;
        let tag = if self.options.include_jsdoc {
            tag_bool(decl.doc.as_ref(), "additionalproperties")
        } else {
            None
        };
        self.emit_object(&props, idx.as_ref(), tag)
    }

    /// A type alias whose body is an inline object type also honors a
    /// declaration-level `@additionalProperties` tag (spec §4.5.4 rule 2
    /// names "the declaration or property", not just interfaces).
    fn emit_type_alias(&mut self, decl: &Declaration, alias: &crate::ast::TypeAliasDecl) -> Result<Schema> {
        if let TypeNode::Object { properties, index_signature } = &alias.value {
            let tag = if self.options.include_jsdoc {
                tag_bool(decl.doc.as_ref(), "additionalproperties")
            } else {
                None
            };
            return self.emit_object(properties, index_signature.as_deref(), tag);
        }
        self.emit_type(&alias.value)
    }

    fn emit_enum(&self, e: &EnumDecl) -> Schema {
        let all_strings = e.members.iter().all(|m| matches!(m.value, EnumValue::String(_)));
        let mut schema = if all_strings { Schema::string() } else { Schema::number() };
        schema.enum_values = e
            .members
            .iter()
            .map(|m| match &m.value {
                EnumValue::String(s) => Value::String(s.clone()),
                EnumValue::Number(n) => json_number(*n),
            })
            .collect();
        schema
    }

    // -- structural (extends/utility) flattening ------------------------

    /// Resolves `node`'s object shape for use in an `extends` clause or a
    /// structural utility type: properties are flattened in directly, never
    /// left as a `$ref` (spec §4.2 extends example, seed scenario 4).
    fn structural_properties(&mut self, node: &TypeNode) -> Result<(Vec<Property>, Option<IndexSignature>)> {
        match node {
            TypeNode::Reference { name, type_args } => {
                if utility_types::is_utility_type(name) {
                    return self.structural_from_utility(name, type_args.as_deref().unwrap_or(&[]));
                }
                let Some(decl) = self.by_name.get(name.as_str()).copied() else {
                    return Ok((Vec::new(), None));
                };
                match &decl.kind {
                    DeclarationKind::Interface(iface) => {
                        if let Some(args) = type_args {
                            if !iface.type_params.is_empty() && !args.is_empty() {
                                let subst = generics::substitution_map(args);
                                let instantiated = instantiate_interface(iface, &subst);
                                return self.structural_interface(decl, &instantiated);
                            }
                        }
                        self.ensure_def_emitted(name)?;
                        self.structural_interface(decl, iface)
                    }
                    DeclarationKind::TypeAlias(alias) => {
                        let generic_instantiation = type_args
                            .as_ref()
                            .filter(|args| !alias.type_params.is_empty() && !args.is_empty());
                        let value = match generic_instantiation {
                            Some(args) => {
                                let subst = generics::substitution_map(args);
                                generics::substitute(&alias.value, &subst)
                            }
                            None => {
                                self.ensure_def_emitted(name)?;
                                alias.value.clone()
                            }
                        };
                        self.structural_properties(&value)
                    }
                    DeclarationKind::Enum(_) => Ok((Vec::new(), None)),
                }
            }
            TypeNode::Object { properties, index_signature } => {
                Ok((properties.clone(), index_signature.as_ref().map(|b| (**b).clone())))
            }
            TypeNode::Intersection(members) => {
                let mut props = Vec::new();
                let mut idx = None;
                for member in members {
                    let (p, i) = self.structural_properties(member)?;
                    merge_properties(&mut props, p);
                    if idx.is_none() {
                        idx = i;
                    }
                }
                Ok((props, idx))
            }
            TypeNode::Parenthesized(inner) => self.structural_properties(inner),
            _ => Ok((Vec::new(), None)),
        }
    }

    fn structural_interface(
        &mut self,
        _decl: &Declaration,
        iface: &InterfaceDecl,
    ) -> Result<(Vec<Property>, Option<IndexSignature>)> {
        let mut props = Vec::new();
        let mut idx = iface.index_signature.clone();
        for ext in &iface.extends {
            let (p, i) = self.structural_properties(ext)?;
            merge_properties(&mut props, p);
            if idx.is_none() {
                idx = i;
            }
        }
        merge_properties(&mut props, iface.properties.clone());
        Ok((props, idx))
    }

    fn structural_from_utility(
        &mut self,
        name: &str,
        args: &[TypeNode],
    ) -> Result<(Vec<Property>, Option<IndexSignature>)> {
        let Some(base) = args.first() else {
            return Ok((Vec::new(), None));
        };
        let (mut props, idx) = self.structural_properties(base)?;
        match name {
            "Partial" => {
                for p in &mut props {
                    p.optional = true;
                }
            }
            "Required" => {
                for p in &mut props {
                    p.optional = false;
                }
            }
            "Pick" => {
                if let Some(keys) = args.get(1).and_then(utility_types::literal_string_keys) {
                    props.retain(|p| keys.contains(&p.name));
                }
            }
            "Omit" => {
                if let Some(keys) = args.get(1).and_then(utility_types::literal_string_keys) {
                    props.retain(|p| !keys.contains(&p.name));
                }
            }
            "Readonly" | "NonNullable" => {}
            _ => {}
        }
        Ok((props, idx))
    }

    // -- general type -> schema mapping (spec §4.5.3) -------------------

    fn emit_type(&mut self, node: &TypeNode) -> Result<Schema> {
        match node {
            TypeNode::Primitive(kind) => Ok(emit_primitive(*kind)),
            TypeNode::LiteralString(s) => Ok(Schema {
                const_value: Some(Value::String(s.clone())),
                ..Schema::empty()
            }),
            TypeNode::LiteralNumber(n) => Ok(Schema {
                const_value: Some(json_number(*n)),
                ..Schema::empty()
            }),
            TypeNode::LiteralBoolean(b) => Ok(Schema {
                const_value: Some(Value::Bool(*b)),
                ..Schema::empty()
            }),
            TypeNode::Object { properties, index_signature } => {
                self.emit_object(properties, index_signature.as_deref(), None)
            }
            TypeNode::Array(elt) => {
                let items = self.emit_type(elt)?;
                Ok(Schema {
                    items: Some(Box::new(items)),
                    ..Schema::array()
                })
            }
            TypeNode::Tuple(elements) => self.emit_tuple(elements),
            TypeNode::Union(members) => self.emit_union(members),
            TypeNode::Intersection(members) => self.emit_intersection(members),
            TypeNode::Parenthesized(inner) => self.emit_type(inner),
            TypeNode::Record(k, v) => self.emit_record(k, v),
            TypeNode::Reference { name, type_args } => self.emit_reference(name, type_args.as_deref()),
            TypeNode::TemplateLiteral(_) => Ok(Schema::string()),
            TypeNode::Mapped { .. } => Ok(Schema::object()),
        }
    }

    fn emit_tuple(&mut self, elements: &[TupleElement]) -> Result<Schema> {
        let mut prefix_items = Vec::new();
        let mut rest_items = None;
        let mut min_items = 0usize;
        let mut still_required = true;
        for el in elements {
            if el.rest {
                rest_items = Some(self.emit_type(&el.type_node)?);
                continue;
            }
            prefix_items.push(self.emit_type(&el.type_node)?);
            if still_required && !el.optional {
                min_items += 1;
            } else {
                still_required = false;
            }
        }
        let prefix_count = prefix_items.len();
        let mut schema = Schema::array();
        schema.prefix_items = prefix_items;
        if min_items > 0 {
            schema.min_items = Some(min_items);
        }
        match rest_items {
            Some(items) => schema.items = Some(Box::new(items)),
            None => schema.max_items = Some(prefix_count),
        }
        Ok(schema)
    }

    fn emit_union(&mut self, members: &[TypeNode]) -> Result<Schema> {
        let mut flat = Vec::new();
        flatten_union(members, &mut flat);

        if !flat.is_empty() && flat.iter().all(|m| matches!(m, TypeNode::LiteralString(_))) {
            let mut schema = Schema::string();
            schema.enum_values = flat
                .iter()
                .map(|m| match m {
                    TypeNode::LiteralString(s) => Value::String(s.clone()),
                    _ => unreachable!(),
                })
                .collect();
            return Ok(schema);
        }
        if !flat.is_empty() && flat.iter().all(|m| matches!(m, TypeNode::LiteralNumber(_))) {
            let mut schema = Schema::number();
            schema.enum_values = flat
                .iter()
                .map(|m| match m {
                    TypeNode::LiteralNumber(n) => json_number(*n),
                    _ => unreachable!(),
                })
                .collect();
            return Ok(schema);
        }

        let non_null: Vec<&TypeNode> = flat.iter().filter(|m| !m.is_null_or_undefined()).collect();
        if non_null.len() == 1 && non_null.len() != flat.len() {
            let inner = self.emit_type(non_null[0])?;
            if let Some(SchemaType::Single(t)) = &inner.ty {
                let mut schema = inner.clone();
                schema.ty = Some(SchemaType::Multiple(vec![t.clone(), "null".to_string()]));
                return Ok(schema);
            }
            return Ok(Schema {
                any_of: vec![inner, Schema::null()],
                ..Schema::empty()
            });
        }

        let mut any_of = Vec::with_capacity(flat.len());
        for m in &flat {
            any_of.push(self.emit_type(m)?);
        }
        Ok(Schema { any_of, ..Schema::empty() })
    }

    fn emit_intersection(&mut self, members: &[TypeNode]) -> Result<Schema> {
        if members.len() == 1 {
            return self.emit_type(&members[0]);
        }
        let mut all_of = Vec::with_capacity(members.len());
        for m in members {
            all_of.push(self.emit_type(m)?);
        }
        Ok(Schema { all_of, ..Schema::empty() })
    }

    fn emit_record(&mut self, key: &TypeNode, value: &TypeNode) -> Result<Schema> {
        if let Some(keys) = utility_types::literal_string_keys(key) {
            let value_schema = self.emit_type(value)?;
            let mut schema = Schema::object();
            for k in &keys {
                schema.properties.insert(k.clone(), value_schema.clone());
            }
            schema.required = keys;
            return Ok(schema);
        }
        let value_schema = self.emit_type(value)?;
        let mut schema = Schema::object();
        schema.additional_properties = Some(AdditionalProperties::Schema(Box::new(value_schema)));
        Ok(schema)
    }

    fn emit_reference(&mut self, name: &str, args: Option<&[TypeNode]>) -> Result<Schema> {
        if name == "Date" && args.is_none() {
            let mut schema = Schema::string();
            schema.format = Some("date-time".to_string());
            return Ok(schema);
        }
        if utility_types::is_utility_type(name) {
            return self.emit_utility_type(name, args.unwrap_or(&[]));
        }
        if let Some(decl) = self.by_name.get(name).copied() {
            let has_params = match &decl.kind {
                DeclarationKind::Interface(i) => !i.type_params.is_empty(),
                DeclarationKind::TypeAlias(a) => !a.type_params.is_empty(),
                DeclarationKind::Enum(_) => false,
            };
            if has_params {
                if let Some(args) = args {
                    if !args.is_empty() {
                        return self.emit_instantiated(decl, args);
                    }
                }
            }
        }
        self.emit_named_ref(name)
    }

    fn emit_named_ref(&mut self, name: &str) -> Result<Schema> {
        self.ensure_def_emitted(name)?;
        let pointer = self.ref_pointer(name)?;
        Ok(Schema::reference(pointer))
    }

    fn emit_instantiated(&mut self, decl: &Declaration, args: &[TypeNode]) -> Result<Schema> {
        match &decl.kind {
            DeclarationKind::Interface(iface) => {
                let subst = generics::substitution_map(args);
                let instantiated = instantiate_interface(iface, &subst);
                let (props, idx) = self.structural_interface(decl, &instantiated)?;
                let tag = if self.options.include_jsdoc {
                    tag_bool(decl.doc.as_ref(), "additionalproperties")
                } else {
                    None
                };
                self.emit_object(&props, idx.as_ref(), tag)
            }
            DeclarationKind::TypeAlias(alias) => {
                let subst = generics::substitution_map(args);
                let substituted = generics::substitute(&alias.value, &subst);
                self.emit_type(&substituted)
            }
            DeclarationKind::Enum(_) => self.emit_named_ref(&decl.name),
        }
    }

    fn emit_utility_type(&mut self, name: &str, args: &[TypeNode]) -> Result<Schema> {
        match name {
            "Set" => {
                let Some(t) = args.first() else {
                    return Ok(Schema::array());
                };
                let items = self.emit_type(t)?;
                let mut schema = Schema::array();
                schema.items = Some(Box::new(items));
                schema.unique_items = Some(true);
                Ok(schema)
            }
            "Map" => {
                let value_schema = match args.get(1) {
                    Some(v) => self.emit_type(v)?,
                    None => Schema::empty(),
                };
                let mut schema = Schema::object();
                schema.additional_properties = Some(AdditionalProperties::Schema(Box::new(value_schema)));
                Ok(schema)
            }
            "Partial" | "Required" | "Pick" | "Omit" | "Readonly" | "NonNullable" => {
                let (props, idx) = self.structural_from_utility(name, args)?;
                self.emit_object(&props, idx.as_ref(), None)
            }
            _ => Ok(Schema::empty()),
        }
    }

    /// Builds an object schema from a flattened property list. Concentrates
    /// the `additionalProperties` precedence chain in one place (spec §9).
    fn emit_object(
        &mut self,
        properties: &[Property],
        index_signature: Option<&IndexSignature>,
        additional_properties_tag: Option<bool>,
    ) -> Result<Schema> {
        let mut schema = Schema::object();
        let mut required = Vec::new();
        for prop in properties {
            let mut prop_schema = match &prop.type_node {
                TypeNode::Object { properties: inner_props, index_signature: inner_idx } => {
                    let inner_tag = if self.options.include_jsdoc {
                        tag_bool(prop.doc.as_ref(), "additionalproperties")
                    } else {
                        None
                    };
                    self.emit_object(inner_props, inner_idx.as_deref(), inner_tag)?
                }
                other => self.emit_type(other)?,
            };
            if prop.readonly {
                prop_schema.read_only = Some(true);
            }
            if self.options.include_jsdoc {
                apply_doc(&mut prop_schema, prop.doc.as_ref());
            }
            if !prop.optional {
                required.push(prop.name.clone());
            }
            schema.properties.insert(prop.name.clone(), prop_schema);
        }
        if !required.is_empty() {
            schema.required = required;
        }

        schema.additional_properties = if let Some(idx) = index_signature {
            Some(AdditionalProperties::Schema(Box::new(self.emit_type(&idx.value_type)?)))
        } else if let Some(tag) = additional_properties_tag {
            Some(AdditionalProperties::Bool(tag))
        } else if self.options.strict_objects {
            Some(AdditionalProperties::Bool(false))
        } else {
            self.options.additional_properties.map(AdditionalProperties::Bool)
        };

        Ok(schema)
    }
}

fn emit_primitive(kind: PrimitiveKind) -> Schema {
    match kind {
        PrimitiveKind::String => Schema::string(),
        PrimitiveKind::Number => Schema::number(),
        PrimitiveKind::Boolean => Schema::boolean(),
        PrimitiveKind::Null => Schema::null(),
        PrimitiveKind::BigInt => Schema::integer(),
        PrimitiveKind::Undefined | PrimitiveKind::Void | PrimitiveKind::Any | PrimitiveKind::Unknown => {
            Schema::empty()
        }
        PrimitiveKind::Never => Schema::not_anything(),
        PrimitiveKind::Object => Schema::object(),
    }
}

fn flatten_union(members: &[TypeNode], out: &mut Vec<TypeNode>) {
    for m in members {
        match unwrap_parens(m) {
            TypeNode::Union(inner) => flatten_union(inner, out),
            other => out.push(other.clone()),
        }
    }
}

/// Strips `Parenthesized` wrappers so a parenthesized nested union (`("a" |
/// "b") | "c"`) flattens the same as its unparenthesized form.
fn unwrap_parens(node: &TypeNode) -> &TypeNode {
    match node {
        TypeNode::Parenthesized(inner) => unwrap_parens(inner),
        other => other,
    }
}

fn merge_properties(target: &mut Vec<Property>, incoming: Vec<Property>) {
    for prop in incoming {
        if let Some(existing) = target.iter_mut().find(|p| p.name == prop.name) {
            *existing = prop;
        } else {
            target.push(prop);
        }
    }
}

fn instantiate_interface(
    iface: &InterfaceDecl,
    subst: &HashMap<&'static str, TypeNode>,
) -> InterfaceDecl {
    InterfaceDecl {
        type_params: Vec::new(),
        extends: iface.extends.iter().map(|e| generics::substitute(e, subst)).collect(),
        properties: iface
            .properties
            .iter()
            .map(|p| Property {
                name: p.name.clone(),
                type_node: generics::substitute(&p.type_node, subst),
                optional: p.optional,
                readonly: p.readonly,
                doc: p.doc.clone(),
            })
            .collect(),
        index_signature: iface.index_signature.as_ref().map(|idx| IndexSignature {
            key_type: generics::substitute(&idx.key_type, subst),
            value_type: generics::substitute(&idx.value_type, subst),
        }),
    }
}

fn build_name_map(declarations: &[Declaration], options: &EmitOptions) -> Result<HashMap<String, String>> {
    let mut map = HashMap::new();
    let Some(transform) = options.define_name_transform else {
        for d in declarations {
            map.insert(d.name.clone(), d.name.clone());
        }
        return Ok(map);
    };

    let mut transformed_to_original: HashMap<String, String> = HashMap::new();
    for d in declarations {
        let transformed = transform(&d.name, d).map_err(|message| Error::Callback {
            callback: "defineNameTransform",
            type_name: d.name.clone(),
            message,
        })?;
        if let Some(existing) = transformed_to_original.get(&transformed) {
            return Err(Error::NameCollision {
                first: existing.clone(),
                second: d.name.clone(),
                transformed,
            });
        }
        transformed_to_original.insert(transformed.clone(), d.name.clone());
        map.insert(d.name.clone(), transformed);
    }
    Ok(map)
}

/// Tag-derived `additionalProperties` override (spec §4.5.4 rule 2).
fn tag_bool(doc: Option<&JsDoc>, name: &str) -> Option<bool> {
    let value = doc?.tag(name)?;
    match value.trim().to_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

/// JSDoc tag application (spec §4.5.8): description plus the constraint
/// tags. `additionalProperties` is handled separately in `emit_object`.
fn apply_doc(schema: &mut Schema, doc: Option<&JsDoc>) {
    let Some(doc) = doc else { return };
    if let Some(desc) = &doc.description {
        schema.description = Some(desc.clone());
    }
    if let Some(v) = doc.tag("minimum").and_then(parse_f64) {
        schema.minimum = Some(v);
    }
    if let Some(v) = doc.tag("maximum").and_then(parse_f64) {
        schema.maximum = Some(v);
    }
    if let Some(v) = doc.tag("minlength").and_then(parse_u64) {
        schema.min_length = Some(v);
    }
    if let Some(v) = doc.tag("maxlength").and_then(parse_u64) {
        schema.max_length = Some(v);
    }
    if let Some(v) = doc.tag("pattern") {
        schema.pattern = Some(v.to_string());
    }
    if let Some(v) = doc.tag("format") {
        schema.format = Some(v.to_string());
    }
    if let Some(v) = doc.tag("multipleof").and_then(parse_f64) {
        schema.multiple_of = Some(v);
    }
    if let Some(v) = doc.tag("default") {
        schema.default = Some(parse_json_or_string(v));
    }
    for tag_name in ["example", "examples"] {
        if let Some(v) = doc.tag(tag_name) {
            for line in v.split('\n').filter(|l| !l.is_empty()) {
                schema.examples.push(parse_json_or_string(line));
            }
        }
    }
    if doc.tag("deprecated").is_some() {
        schema.deprecated = Some(true);
    }
    if let Some(v) = doc.tag("title") {
        schema.title = Some(v.to_string());
    }
}

fn parse_f64(s: &str) -> Option<f64> {
    s.trim().parse().ok()
}

fn parse_u64(s: &str) -> Option<u64> {
    s.trim().parse().ok()
}

fn parse_json_or_string(s: &str) -> Value {
    let trimmed = s.trim();
    serde_json::from_str(trimmed).unwrap_or_else(|_| Value::String(trimmed.to_string()))
}

fn json_number(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map(Value::Number).unwrap_or(Value::Null)
    }
}

/// Directed `$ref` reachability over an already-emitted `$defs` map (spec
/// §4.5.9): used both for self-reference detection and batch mode's
/// per-entry dependency closure.
fn reachable_from(defs: &IndexMap<String, Schema>, start: &Schema) -> HashSet<String> {
    let mut visited = HashSet::new();
    let mut stack = Vec::new();
    collect_refs(start, &mut stack);
    while let Some(name) = stack.pop() {
        if !visited.insert(name.clone()) {
            continue;
        }
        if let Some(schema) = defs.get(&name) {
            collect_refs(schema, &mut stack);
        }
    }
    visited
}

fn collect_refs(schema: &Schema, out: &mut Vec<String>) {
    if let Some(r) = &schema.reference {
        if let Some(name) = r.strip_prefix("#/$defs/") {
            out.push(name.to_string());
        }
    }
    for v in schema.properties.values() {
        collect_refs(v, out);
    }
    if let Some(items) = &schema.items {
        collect_refs(items, out);
    }
    for v in &schema.prefix_items {
        collect_refs(v, out);
    }
    for v in &schema.any_of {
        collect_refs(v, out);
    }
    for v in &schema.all_of {
        collect_refs(v, out);
    }
    if let Some(AdditionalProperties::Schema(s)) = &schema.additional_properties {
        collect_refs(s, out);
    }
    if let Some(n) = &schema.not {
        collect_refs(n, out);
    }
}

fn rewrite_refs_to_definitions(mut schema: Schema) -> Schema {
    rewrite_in_place(&mut schema);
    schema
}

fn rewrite_in_place(schema: &mut Schema) {
    if let Some(r) = &schema.reference {
        if let Some(rest) = r.strip_prefix("#/$defs/") {
            schema.reference = Some(format!("#/definitions/{rest}"));
        }
    }
    for v in schema.properties.values_mut() {
        rewrite_in_place(v);
    }
    if let Some(items) = &mut schema.items {
        rewrite_in_place(items);
    }
    for v in &mut schema.prefix_items {
        rewrite_in_place(v);
    }
    for v in &mut schema.any_of {
        rewrite_in_place(v);
    }
    for v in &mut schema.all_of {
        rewrite_in_place(v);
    }
    if let Some(AdditionalProperties::Schema(s)) = &mut schema.additional_properties {
        rewrite_in_place(s);
    }
    if let Some(n) = &mut schema.not {
        rewrite_in_place(n);
    }
}
