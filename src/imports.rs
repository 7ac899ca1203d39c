//! Second, independent pass over the token stream that recognizes
//! `import`/`export ... from` statements (spec §4.3). Runs separately from
//! the parser and never fails the pipeline: on a statement shape it can't
//! classify, it simply gives up on that statement and keeps scanning.

use crate::token::{Token, TokenKind};

#[derive(Debug, Clone, PartialEq)]
pub struct ImportStatement {
    /// Original exported names being imported (a rename's `as Z` is dropped;
    /// the original name `X` is retained).
    pub names: Vec<String>,
    pub module_path: String,
    pub is_default: bool,
    pub is_namespace: bool,
    pub namespace_alias: Option<String>,
}

pub fn extract_imports(tokens: &[Token]) -> Vec<ImportStatement> {
    let mut cursor = Cursor::new(tokens);
    let mut out = Vec::new();

    while !cursor.at_eof() {
        if cursor.at_keyword("import") {
            if let Some(stmt) = try_parse_import(&mut cursor) {
                out.push(stmt);
                continue;
            }
        } else if cursor.at_keyword("export") && export_from_lookahead(&cursor) {
            if let Some(stmt) = try_parse_export_from(&mut cursor) {
                out.push(stmt);
                continue;
            }
        }
        cursor.advance();
    }

    out
}

fn export_from_lookahead(c: &Cursor) -> bool {
    let next = c.peek_at(1);
    if next.kind == TokenKind::Punctuation && (next.value == "{" || next.value == "*") {
        return true;
    }
    if next.kind == TokenKind::Keyword && next.value == "type" {
        let after = c.peek_at(2);
        return after.kind == TokenKind::Punctuation && (after.value == "{" || after.value == "*");
    }
    false
}

fn try_parse_import(c: &mut Cursor) -> Option<ImportStatement> {
    c.expect_keyword("import")?;
    c.eat_keyword("type");

    if c.eat_punct("*") {
        c.expect_keyword("as")?;
        let alias = c.expect_identifier()?;
        c.expect_keyword("from")?;
        let path = c.expect_string()?;
        return Some(ImportStatement {
            names: Vec::new(),
            module_path: path,
            is_default: false,
            is_namespace: true,
            namespace_alias: Some(alias),
        });
    }

    if c.at_punct("{") {
        let names = parse_named_clause(c)?;
        c.expect_keyword("from")?;
        let path = c.expect_string()?;
        return Some(ImportStatement {
            names,
            module_path: path,
            is_default: false,
            is_namespace: false,
            namespace_alias: None,
        });
    }

    // `import Default from "path"`, optionally followed by `, { ... }` or `, * as ns`.
    let default_name = c.expect_identifier()?;
    let mut names = vec![default_name];
    if c.eat_punct(",") {
        if c.eat_punct("*") {
            c.expect_keyword("as")?;
            let alias = c.expect_identifier()?;
            c.expect_keyword("from")?;
            let path = c.expect_string()?;
            return Some(ImportStatement {
                names,
                module_path: path,
                is_default: true,
                is_namespace: true,
                namespace_alias: Some(alias),
            });
        }
        if c.at_punct("{") {
            names.extend(parse_named_clause(c)?);
        } else {
            return None;
        }
    }
    c.expect_keyword("from")?;
    let path = c.expect_string()?;
    Some(ImportStatement {
        names,
        module_path: path,
        is_default: true,
        is_namespace: false,
        namespace_alias: None,
    })
}

fn try_parse_export_from(c: &mut Cursor) -> Option<ImportStatement> {
    c.expect_keyword("export")?;
    c.eat_keyword("type");

    if c.eat_punct("*") {
        let alias = if c.eat_keyword("as") {
            Some(c.expect_identifier()?)
        } else {
            None
        };
        c.expect_keyword("from")?;
        let path = c.expect_string()?;
        return Some(ImportStatement {
            names: Vec::new(),
            module_path: path,
            is_default: false,
            is_namespace: true,
            namespace_alias: alias,
        });
    }

    if c.at_punct("{") {
        let names = parse_named_clause(c)?;
        c.expect_keyword("from")?;
        let path = c.expect_string()?;
        return Some(ImportStatement {
            names,
            module_path: path,
            is_default: false,
            is_namespace: false,
            namespace_alias: None,
        });
    }

    None
}

/// `{ X, Y as Z, ... }` — returns the original (pre-rename) names.
fn parse_named_clause(c: &mut Cursor) -> Option<Vec<String>> {
    c.expect_punct("{")?;
    let mut names = Vec::new();
    loop {
        if c.eat_punct("}") {
            break;
        }
        let original = c.expect_name_like()?;
        if c.eat_keyword("as") {
            c.expect_name_like()?;
        }
        names.push(original);
        if c.eat_punct(",") {
            continue;
        }
        if c.eat_punct("}") {
            break;
        }
        return None;
    }
    Some(names)
}

/// A standalone, minimal token cursor — deliberately not shared with the
/// parser's, since this pass runs independently over the same stream.
struct Cursor<'a> {
    tokens: &'a [Token],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(tokens: &'a [Token]) -> Self {
        Cursor { tokens, pos: 0 }
    }

    fn peek_at(&self, mut n: usize) -> &Token {
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

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn at_eof(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> Token {
        while self.tokens[self.pos].kind == TokenKind::Newline {
            self.pos += 1;
        }
        let tok = self.tokens[self.pos].clone();
        if tok.kind != TokenKind::Eof {
            self.pos += 1;
        }
        tok
    }

    fn at_keyword(&self, kw: &str) -> bool {
        let tok = self.peek();
        tok.kind == TokenKind::Keyword && tok.value == kw
    }

    fn at_punct(&self, p: &str) -> bool {
        let tok = self.peek();
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

    fn expect_keyword(&mut self, kw: &str) -> Option<()> {
        self.eat_keyword(kw).then_some(())
    }

    fn expect_punct(&mut self, p: &str) -> Option<()> {
        self.eat_punct(p).then_some(())
    }

    fn expect_identifier(&mut self) -> Option<String> {
        if self.peek().kind == TokenKind::Identifier {
            Some(self.advance().value)
        } else {
            None
        }
    }

    fn expect_string(&mut self) -> Option<String> {
        if self.peek().kind == TokenKind::String {
            Some(self.advance().value)
        } else {
            None
        }
    }

    /// Accepts identifier/keyword/primitive tokens as an importable name
    /// (mirrors the parser's leniency toward reserved-word-shaped names).
    fn expect_name_like(&mut self) -> Option<String> {
        match self.peek().kind {
            TokenKind::Identifier | TokenKind::Keyword | TokenKind::Primitive => {
                Some(self.advance().value)
            }
            _ => None,
        }
    }
}
