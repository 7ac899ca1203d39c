//! Tokens → declaration list via recursive descent, one token of lookahead
//! (spec §4.2). `import`/`export ... from` statements and ambient
//! `declare function/var/let/class/namespace/module` blocks are consumed and
//! discarded here; the import extractor (`imports.rs`) walks the same token
//! stream separately.

use crate::ast::*;
use crate::error::{Error, Result};
use crate::jsdoc;
use crate::token::{Token, TokenKind};

pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    pending_doc: Option<JsDoc>,
}

/// Parses a token stream into an ordered declaration list.
pub fn parse(tokens: Vec<Token>) -> Result<Vec<Declaration>> {
    Parser::new(tokens).parse_program()
}

impl Parser {
    fn new(tokens: Vec<Token>) -> Self {
        Parser {
            tokens,
            pos: 0,
            pending_doc: None,
        }
    }

    // --- token-stream primitives -------------------------------------------------

    fn skip_newlines(&mut self) {
        while self.tokens[self.pos].kind == TokenKind::Newline {
            self.pos += 1;
        }
    }

    /// The `n`th non-newline token from the current position, without consuming.
    fn peek_significant(&self, mut n: usize) -> &Token {
        let mut i = self.pos;
        loop {
            while self.tokens[i].kind == TokenKind::Newline {
                i += 1;
            }
            if n == 0 || self.tokens[i].kind == TokenKind::Eof {
                return &self.tokens[i];
            }
            n -= 1;
            i += 1;
        }
    }

    fn advance(&mut self) -> Token {
        self.skip_newlines();
        let tok = self.tokens[self.pos].clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn at_keyword(&self, kw: &str) -> bool {
        let tok = self.peek_significant(0);
        tok.kind == TokenKind::Keyword && tok.value == kw
    }

    fn at_punct(&self, p: &str) -> bool {
        let tok = self.peek_significant(0);
        tok.kind == TokenKind::Punctuation && tok.value == p
    }

    fn eat_keyword(&mut self, kw: &str) -> bool {
        if self.at_keyword(kw) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_punct(&mut self, p: &str) -> bool {
        if self.at_punct(p) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect_punct(&mut self, p: &str) -> Result<()> {
        if self.eat_punct(p) {
            Ok(())
        } else {
            Err(self.unexpected(format!("'{p}'")))
        }
    }

    fn expect_keyword(&mut self, kw: &str) -> Result<()> {
        if self.eat_keyword(kw) {
            Ok(())
        } else {
            Err(self.unexpected(format!("keyword '{kw}'")))
        }
    }

    fn unexpected(&self, expected: impl Into<String>) -> Error {
        let tok = self.peek_significant(0);
        Error::Parse {
            found: tok.kind,
            value: tok.value.clone(),
            line: tok.line,
            column: tok.column,
            expected: expected.into(),
        }
    }

    /// An identifier, or any keyword/primitive used as an identifier-like name
    /// (TypeScript freely allows reserved words as property/member names).
    fn expect_name_like(&mut self) -> Result<String> {
        let tok = self.peek_significant(0).clone();
        match tok.kind {
            TokenKind::Identifier | TokenKind::Keyword | TokenKind::Primitive | TokenKind::String => {
                self.advance();
                Ok(tok.value)
            }
            _ => Err(self.unexpected("an identifier")),
        }
    }

    fn expect_identifier(&mut self) -> Result<String> {
        let tok = self.peek_significant(0).clone();
        if tok.kind == TokenKind::Identifier {
            self.advance();
            Ok(tok.value)
        } else {
            Err(self.unexpected("an identifier"))
        }
    }

    // --- top-level loop ------------------------------------------------------------

    fn parse_program(&mut self) -> Result<Vec<Declaration>> {
        let mut decls = Vec::new();
        loop {
            if self.peek_significant(0).kind == TokenKind::Eof {
                break;
            }

            if self.peek_significant(0).kind == TokenKind::JsDoc {
                let body = self.advance().value;
                self.pending_doc = Some(jsdoc::parse(&body));
                continue;
            }

            if self.at_keyword("import") {
                self.skip_statement();
                continue;
            }

            if self.at_keyword("export") && self.is_ignorable_export() {
                self.skip_statement();
                continue;
            }

            let exported = self.eat_keyword("export");
            let _declare = self.eat_keyword("declare");
            let doc = self.pending_doc.take();

            if self.at_keyword("interface") {
                decls.push(self.parse_interface(exported, doc)?);
            } else if self.at_keyword("type") {
                decls.push(self.parse_type_alias(exported, doc)?);
            } else if self.at_keyword("const")
                && self.peek_significant(1).kind == TokenKind::Keyword
                && self.peek_significant(1).value == "enum"
            {
                self.advance(); // "const"
                decls.push(self.parse_enum(exported, doc)?);
            } else if self.at_keyword("enum") {
                decls.push(self.parse_enum(exported, doc)?);
            } else if self.is_skip_block_start() {
                self.skip_block();
            } else {
                return Err(self.unexpected("a declaration (interface, type, or enum)"));
            }
        }
        Ok(decls)
    }

    /// `export { X } from "..."`, `export type { X } from "..."`,
    /// `export * from "..."`, `export default ...` — none of these introduce
    /// a declaration the parser tracks.
    fn is_ignorable_export(&self) -> bool {
        let next = self.peek_significant(1);
        if next.kind == TokenKind::Punctuation && (next.value == "{" || next.value == "*") {
            return true;
        }
        if next.kind == TokenKind::Keyword && next.value == "type" {
            let after = self.peek_significant(2);
            if after.kind == TokenKind::Punctuation && after.value == "{" {
                return true;
            }
        }
        if next.kind == TokenKind::Identifier && next.value == "default" {
            return true;
        }
        false
    }

    /// A bare `const` reaches here only when it's not followed by `enum`
    /// (that case is dispatched to `parse_enum` before this is checked), so
    /// every `const` seen here is an ambient `declare const x: ...;`.
    fn is_skip_block_start(&self) -> bool {
        let tok = self.peek_significant(0);
        match tok.kind {
            TokenKind::Identifier => {
                matches!(tok.value.as_str(), "function" | "var" | "let" | "class" | "default")
            }
            TokenKind::Keyword => matches!(tok.value.as_str(), "namespace" | "module" | "const"),
            _ => false,
        }
    }

    /// Consumes an import-like statement up to its terminating `;` (or, absent
    /// one, up to the next token that plausibly starts a new top-level
    /// construct). Nested brace/paren/bracket depth is tracked so a
    /// multi-line `import { A, B } from "..."` is consumed whole. The leading
    /// `import`/`export` keyword is always consumed first, since it would
    /// otherwise match its own boundary check and the statement would never
    /// advance.
    fn skip_statement(&mut self) {
        let mut depth = 0i32;
        let mut first = true;
        loop {
            let tok = self.peek_significant(0).clone();
            if tok.kind == TokenKind::Eof {
                break;
            }
            if depth == 0 && tok.kind == TokenKind::Punctuation && tok.value == ";" {
                self.advance();
                break;
            }
            if !first && depth == 0 && self.looks_like_statement_boundary(&tok) {
                break;
            }
            if tok.kind == TokenKind::Punctuation {
                match tok.value.as_str() {
                    "{" | "(" | "[" => depth += 1,
                    "}" | ")" | "]" => depth -= 1,
                    _ => {}
                }
            }
            self.advance();
            first = false;
        }
    }

    fn looks_like_statement_boundary(&self, tok: &Token) -> bool {
        tok.kind == TokenKind::JsDoc
            || (tok.kind == TokenKind::Keyword
                && matches!(
                    tok.value.as_str(),
                    "import" | "export" | "interface" | "type" | "enum" | "declare"
                ))
    }

    /// Consumes an ambient `declare ...`/`export default ...` block. Nested
    /// braces are counted so a `declare namespace Foo { ... }` containing its
    /// own object types doesn't terminate early (design note, open question).
    fn skip_block(&mut self) {
        let mut depth = 0i32;
        let mut saw_brace = false;
        loop {
            let tok = self.peek_significant(0).clone();
            if tok.kind == TokenKind::Eof {
                break;
            }
            if tok.kind == TokenKind::Punctuation {
                match tok.value.as_str() {
                    "{" => {
                        saw_brace = true;
                        depth += 1;
                    }
                    "}" => {
                        depth -= 1;
                        if saw_brace && depth == 0 {
                            self.advance();
                            break;
                        }
                    }
                    ";" if depth == 0 => {
                        self.advance();
                        break;
                    }
                    _ => {}
                }
            }
            self.advance();
        }
    }

    // --- declarations ----------------------------------------------------------

    fn parse_interface(&mut self, exported: bool, doc: Option<JsDoc>) -> Result<Declaration> {
        self.expect_keyword("interface")?;
        let name = self.expect_identifier()?;
        let type_params = self.parse_optional_type_params()?;
        let extends = if self.eat_keyword("extends") {
            self.parse_type_list()?
        } else {
            Vec::new()
        };
        self.expect_punct("{")?;
        let (properties, index_signature) = self.parse_object_members()?;
        Ok(Declaration {
            name,
            exported,
            doc,
            source_file: None,
            kind: DeclarationKind::Interface(InterfaceDecl {
                type_params,
                extends,
                properties,
                index_signature,
            }),
        })
    }

    fn parse_type_alias(&mut self, exported: bool, doc: Option<JsDoc>) -> Result<Declaration> {
        self.expect_keyword("type")?;
        let name = self.expect_identifier()?;
        let type_params = self.parse_optional_type_params()?;
        self.expect_punct("=")?;
        let value = self.parse_union()?;
        self.eat_punct(";");
        Ok(Declaration {
            name,
            exported,
            doc,
            source_file: None,
            kind: DeclarationKind::TypeAlias(TypeAliasDecl { type_params, value }),
        })
    }

    fn parse_enum(&mut self, exported: bool, doc: Option<JsDoc>) -> Result<Declaration> {
        self.expect_keyword("enum")?;
        let name = self.expect_identifier()?;
        self.expect_punct("{")?;

        let mut members = Vec::new();
        let mut next_numeric = 0f64;
        loop {
            if self.at_punct("}") {
                self.advance();
                break;
            }
            let member_name = self.expect_name_like()?;
            let value = if self.eat_punct("=") {
                self.parse_enum_initializer(&mut next_numeric)
            } else {
                let v = next_numeric;
                next_numeric += 1.0;
                EnumValue::Number(v)
            };
            members.push(EnumMember { name: member_name, value });

            if self.eat_punct(",") {
                continue;
            }
            if self.at_punct("}") {
                self.advance();
                break;
            }
        }

        Ok(Declaration {
            name,
            exported,
            doc,
            source_file: None,
            kind: DeclarationKind::Enum(EnumDecl { members }),
        })
    }

    fn parse_enum_initializer(&mut self, next_numeric: &mut f64) -> EnumValue {
        let tok = self.peek_significant(0).clone();
        if tok.kind == TokenKind::String {
            self.advance();
            EnumValue::String(tok.value)
        } else if tok.kind == TokenKind::Number {
            self.advance();
            let n: f64 = tok.value.parse().unwrap_or(0.0);
            *next_numeric = n + 1.0;
            EnumValue::Number(n)
        } else {
            // Non-literal initializer (e.g. a computed expression): tolerated
            // by skipping it; the member still gets an auto-incremented value.
            self.skip_enum_initializer_expr();
            let v = *next_numeric;
            *next_numeric += 1.0;
            EnumValue::Number(v)
        }
    }

    fn skip_enum_initializer_expr(&mut self) {
        let mut depth = 0i32;
        loop {
            let tok = self.peek_significant(0).clone();
            if tok.kind == TokenKind::Eof {
                break;
            }
            if depth == 0 && tok.kind == TokenKind::Punctuation && (tok.value == "," || tok.value == "}") {
                break;
            }
            if tok.kind == TokenKind::Punctuation {
                match tok.value.as_str() {
                    "{" | "(" | "[" => depth += 1,
                    "}" | ")" | "]" => depth -= 1,
                    _ => {}
                }
            }
            self.advance();
        }
    }

    // --- object bodies (shared by interfaces and inline object types) --------------

    fn parse_object_members(&mut self) -> Result<(Vec<Property>, Option<IndexSignature>)> {
        let mut properties = Vec::new();
        let mut index_signature = None;
        let mut pending_prop_doc: Option<JsDoc> = None;

        loop {
            while self.peek_significant(0).kind == TokenKind::JsDoc {
                let body = self.advance().value;
                pending_prop_doc = Some(jsdoc::parse(&body));
            }

            if self.at_punct("}") {
                self.advance();
                break;
            }

            if self.is_index_signature_lookahead() {
                index_signature = Some(self.parse_index_signature()?);
            } else {
                let readonly = self.eat_keyword("readonly");
                let name = self.expect_name_like()?;
                let optional = self.eat_punct("?");
                self.expect_punct(":")?;
                let type_node = self.parse_union()?;
                properties.push(Property {
                    name,
                    type_node,
                    optional,
                    readonly,
                    doc: pending_prop_doc.take(),
                });
            }

            if self.eat_punct(",") || self.eat_punct(";") {
                continue;
            }
        }

        Ok((properties, index_signature))
    }

    fn is_index_signature_lookahead(&self) -> bool {
        let open = self.peek_significant(0);
        let name = self.peek_significant(1);
        let colon = self.peek_significant(2);
        open.kind == TokenKind::Punctuation
            && open.value == "["
            && matches!(name.kind, TokenKind::Identifier)
            && colon.kind == TokenKind::Punctuation
            && colon.value == ":"
    }

    fn parse_index_signature(&mut self) -> Result<IndexSignature> {
        self.expect_punct("[")?;
        let _binder = self.expect_identifier()?;
        self.expect_punct(":")?;
        let key_type = self.parse_union()?;
        self.expect_punct("]")?;
        self.expect_punct(":")?;
        let value_type = self.parse_union()?;
        Ok(IndexSignature { key_type, value_type })
    }

    // --- type parameter lists --------------------------------------------------

    /// Consumes `<T, U extends Foo<Bar>, V = Default>` and returns just the
    /// parameter names; constraints/defaults are discarded (spec §4.2, §9 —
    /// downstream emission uses the fixed positional convention table).
    fn parse_optional_type_params(&mut self) -> Result<Vec<String>> {
        if !self.eat_punct("<") {
            return Ok(Vec::new());
        }
        let mut names = Vec::new();
        loop {
            if self.at_punct(">") {
                self.advance();
                break;
            }
            names.push(self.expect_identifier()?);
            let mut depth = 0i32;
            loop {
                if depth == 0 && self.eat_punct(",") {
                    break;
                }
                if depth == 0 && self.eat_punct(">") {
                    return Ok(names);
                }
                let tok = self.peek_significant(0).clone();
                if tok.kind == TokenKind::Eof {
                    return Ok(names);
                }
                if tok.kind == TokenKind::Punctuation {
                    match tok.value.as_str() {
                        "<" | "(" | "[" => depth += 1,
                        ">" | ")" | "]" => depth -= 1,
                        _ => {}
                    }
                }
                self.advance();
            }
        }
        Ok(names)
    }

    fn parse_type_list(&mut self) -> Result<Vec<TypeNode>> {
        let mut list = vec![self.parse_union()?];
        while self.eat_punct(",") {
            list.push(self.parse_union()?);
        }
        Ok(list)
    }

    // --- type grammar (spec §4.2) ------------------------------------------------

    fn parse_union(&mut self) -> Result<TypeNode> {
        self.eat_punct("|");
        let mut members = vec![self.parse_intersection()?];
        while self.eat_punct("|") {
            members.push(self.parse_intersection()?);
        }
        Ok(TypeNode::union(members))
    }

    fn parse_intersection(&mut self) -> Result<TypeNode> {
        self.eat_punct("&");
        let mut members = vec![self.parse_postfix()?];
        while self.eat_punct("&") {
            members.push(self.parse_postfix()?);
        }
        Ok(TypeNode::intersection(members))
    }

    fn parse_postfix(&mut self) -> Result<TypeNode> {
        let mut node = self.parse_primary()?;
        loop {
            if self.at_punct("[")
                && self.peek_significant(1).kind == TokenKind::Punctuation
                && self.peek_significant(1).value == "]"
            {
                self.advance();
                self.advance();
                node = TypeNode::Array(Box::new(node));
            } else {
                break;
            }
        }
        Ok(node)
    }

    fn parse_primary(&mut self) -> Result<TypeNode> {
        if self.eat_keyword("readonly") {
            return self.parse_postfix();
        }

        let tok = self.peek_significant(0).clone();
        match tok.kind {
            TokenKind::Primitive => {
                self.advance();
                Ok(match tok.value.as_str() {
                    "true" => TypeNode::LiteralBoolean(true),
                    "false" => TypeNode::LiteralBoolean(false),
                    other => TypeNode::Primitive(primitive_kind(other)),
                })
            }
            TokenKind::String => {
                self.advance();
                Ok(TypeNode::LiteralString(tok.value))
            }
            TokenKind::Number => {
                self.advance();
                Ok(TypeNode::LiteralNumber(tok.value.parse().unwrap_or(0.0)))
            }
            TokenKind::Punctuation if tok.value == "(" => {
                self.advance();
                let inner = self.parse_union()?;
                self.expect_punct(")")?;
                Ok(TypeNode::Parenthesized(Box::new(inner)))
            }
            TokenKind::Punctuation if tok.value == "[" => self.parse_tuple(),
            TokenKind::Punctuation if tok.value == "{" => self.parse_object_type(),
            TokenKind::Identifier | TokenKind::Keyword => self.parse_type_reference(),
            _ => Err(self.unexpected("a type")),
        }
    }

    fn parse_object_type(&mut self) -> Result<TypeNode> {
        self.expect_punct("{")?;
        let (properties, index_signature) = self.parse_object_members()?;
        Ok(TypeNode::Object {
            properties,
            index_signature: index_signature.map(Box::new),
        })
    }

    fn parse_tuple(&mut self) -> Result<TypeNode> {
        self.expect_punct("[")?;
        let mut elements = Vec::new();
        loop {
            if self.at_punct("]") {
                self.advance();
                break;
            }
            elements.push(self.parse_tuple_element()?);
            if self.eat_punct(",") {
                continue;
            }
        }
        Ok(TypeNode::Tuple(elements))
    }

    fn parse_tuple_element(&mut self) -> Result<TupleElement> {
        let rest = self.eat_ellipsis();
        let label = if self.is_labeled_tuple_element() {
            let name = self.expect_identifier()?;
            self.expect_punct(":")?;
            Some(name)
        } else {
            None
        };
        let type_node = self.parse_union()?;
        let optional = self.eat_punct("?");
        Ok(TupleElement {
            type_node,
            optional,
            label,
            rest,
        })
    }

    fn is_labeled_tuple_element(&self) -> bool {
        let ident = self.peek_significant(0);
        let colon = self.peek_significant(1);
        ident.kind == TokenKind::Identifier
            && colon.kind == TokenKind::Punctuation
            && colon.value == ":"
    }

    fn eat_ellipsis(&mut self) -> bool {
        let is_dot = |n: usize, s: &Self| {
            let t = s.peek_significant(n);
            t.kind == TokenKind::Punctuation && t.value == "."
        };
        if is_dot(0, self) && is_dot(1, self) && is_dot(2, self) {
            self.advance();
            self.advance();
            self.advance();
            true
        } else {
            false
        }
    }

    fn parse_type_reference(&mut self) -> Result<TypeNode> {
        let name = self.expect_name_like()?;
        let type_args = if self.at_punct("<") {
            self.advance();
            let mut args = vec![self.parse_union()?];
            while self.eat_punct(",") {
                args.push(self.parse_union()?);
            }
            self.expect_punct(">")?;
            Some(args)
        } else {
            None
        };
        Ok(build_reference(name, type_args))
    }
}

fn primitive_kind(s: &str) -> PrimitiveKind {
    match s {
        "string" => PrimitiveKind::String,
        "number" => PrimitiveKind::Number,
        "boolean" => PrimitiveKind::Boolean,
        "null" => PrimitiveKind::Null,
        "undefined" => PrimitiveKind::Undefined,
        "any" => PrimitiveKind::Any,
        "unknown" => PrimitiveKind::Unknown,
        "never" => PrimitiveKind::Never,
        "void" => PrimitiveKind::Void,
        "object" => PrimitiveKind::Object,
        "bigint" => PrimitiveKind::BigInt,
        _ => PrimitiveKind::Any,
    }
}

/// Applies the parse-time edge cases from spec §4.2: `Array<T>` becomes an
/// `Array` node, `Record<K,V>` becomes a `Record` node, and `Promise<T>` is
/// unwrapped to its argument outright.
fn build_reference(name: String, type_args: Option<Vec<TypeNode>>) -> TypeNode {
    match (name.as_str(), &type_args) {
        ("Array", Some(args)) if args.len() == 1 => {
            TypeNode::Array(Box::new(args[0].clone()))
        }
        ("Record", Some(args)) if args.len() == 2 => {
            TypeNode::Record(Box::new(args[0].clone()), Box::new(args[1].clone()))
        }
        ("Promise", Some(args)) if args.len() == 1 => args[0].clone(),
        _ => TypeNode::Reference { name, type_args },
    }
}
