//! Text → token stream (spec §4.1).
//!
//! The tokenizer never fails: unknown characters are silently skipped so the
//! parser can still make progress over partial or slightly malformed sources.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Keyword,
    Primitive,
    Identifier,
    String,
    Number,
    Punctuation,
    JsDoc,
    Newline,
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub line: usize,
    pub column: usize,
}

const KEYWORDS: &[&str] = &[
    "interface", "type", "enum", "export", "extends", "const", "readonly", "import", "from",
    "as", "declare", "namespace", "module",
];

const PRIMITIVES: &[&str] = &[
    "string", "number", "boolean", "null", "undefined", "any", "unknown", "never", "void",
    "object", "bigint", "true", "false",
];

const PUNCTUATION: &str = "{}()[]:;,?|&=<>.*";

pub struct Tokenizer<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    line: usize,
    column: usize,
}

impl<'a> Tokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Tokenizer {
            chars: source.char_indices().peekable(),
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some(tok) = self.next_token() {
            tokens.push(tok);
        }
        tokens.push(Token {
            kind: TokenKind::Eof,
            value: String::new(),
            line: self.line,
            column: self.column,
        });
        tokens
    }

    fn advance(&mut self) -> Option<char> {
        let (_, c) = self.chars.next()?;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn peek(&mut self) -> Option<char> {
        self.chars.peek().map(|&(_, c)| c)
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.clone().nth(offset).map(|(_, c)| c)
    }

    fn next_token(&mut self) -> Option<Token> {
        loop {
            let c = self.peek()?;

            if c == '\n' {
                let line = self.line;
                let column = self.column;
                self.advance();
                return Some(Token {
                    kind: TokenKind::Newline,
                    value: String::new(),
                    line,
                    column,
                });
            }

            if c == ' ' || c == '\t' || c == '\r' {
                self.advance();
                continue;
            }

            if c == '/' && self.peek_at(1) == Some('*') {
                return self.scan_comment_or_doc();
            }

            if c == '/' && self.peek_at(1) == Some('/') {
                self.skip_line_comment();
                continue;
            }

            break;
        }

        let line = self.line;
        let column = self.column;
        let c = self.peek()?;

        if c == '"' || c == '\'' || c == '`' {
            return Some(self.scan_string(line, column));
        }

        if c.is_ascii_digit() || (c == '-' && self.peek_at(1).is_some_and(|n| n.is_ascii_digit())) {
            return Some(self.scan_number(line, column));
        }

        if c.is_alphabetic() || c == '_' || c == '$' {
            return Some(self.scan_word(line, column));
        }

        if PUNCTUATION.contains(c) {
            self.advance();
            return Some(Token {
                kind: TokenKind::Punctuation,
                value: c.to_string(),
                line,
                column,
            });
        }

        // Unrecognized character: skip it and keep going (tokenizer never fails).
        self.advance();
        self.next_token()
    }

    fn scan_comment_or_doc(&mut self) -> Option<Token> {
        let line = self.line;
        let column = self.column;
        self.advance(); // '/'
        self.advance(); // '*'
        let is_doc = self.peek() == Some('*') && self.peek_at(1) != Some('/');
        if is_doc {
            self.advance(); // second '*'
        }
        let mut body = String::new();
        loop {
            match self.peek() {
                None => break,
                Some('*') if self.peek_at(1) == Some('/') => {
                    self.advance();
                    self.advance();
                    break;
                }
                Some(c) => {
                    body.push(c);
                    self.advance();
                }
            }
        }
        if is_doc {
            Some(Token {
                kind: TokenKind::JsDoc,
                value: body.trim().to_string(),
                line,
                column,
            })
        } else {
            self.next_token()
        }
    }

    fn skip_line_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.advance();
        }
    }

    fn scan_string(&mut self, line: usize, column: usize) -> Token {
        let quote = self.peek().unwrap();
        self.advance();
        let mut value = String::new();
        loop {
            match self.peek() {
                None => break,
                Some(c) if c == quote => {
                    self.advance();
                    break;
                }
                Some('\\') => {
                    self.advance();
                    if let Some(escaped) = self.peek() {
                        value.push(escaped);
                        self.advance();
                    }
                }
                Some(c) => {
                    value.push(c);
                    self.advance();
                }
            }
        }
        Token {
            kind: TokenKind::String,
            value,
            line,
            column,
        }
    }

    fn scan_number(&mut self, line: usize, column: usize) -> Token {
        let mut value = String::new();
        if self.peek() == Some('-') {
            value.push('-');
            self.advance();
        }
        while let Some(c) = self.peek() {
            if c.is_ascii_digit() {
                value.push(c);
                self.advance();
            } else {
                break;
            }
        }
        if self.peek() == Some('.') && self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) {
            value.push('.');
            self.advance();
            while let Some(c) = self.peek() {
                if c.is_ascii_digit() {
                    value.push(c);
                    self.advance();
                } else {
                    break;
                }
            }
        }
        Token {
            kind: TokenKind::Number,
            value,
            line,
            column,
        }
    }

    fn scan_word(&mut self, line: usize, column: usize) -> Token {
        let mut value = String::new();
        while let Some(c) = self.peek() {
            if c.is_alphanumeric() || c == '_' || c == '$' {
                value.push(c);
                self.advance();
            } else {
                break;
            }
        }
        let kind = if KEYWORDS.contains(&value.as_str()) {
            TokenKind::Keyword
        } else if PRIMITIVES.contains(&value.as_str()) {
            TokenKind::Primitive
        } else {
            TokenKind::Identifier
        };
        Token {
            kind,
            value,
            line,
            column,
        }
    }
}

/// Tokenizes `source`. Never panics; always ends in `Eof`.
pub fn tokenize(source: &str) -> Vec<Token> {
    Tokenizer::new(source).tokenize()
}
