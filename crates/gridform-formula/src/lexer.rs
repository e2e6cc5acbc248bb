//! High-level formula token stream
//!
//! Wraps the low-level scanner: quoted strings are reassembled into single
//! `String` tokens with their escapes resolved, raw kinds are normalized to
//! [`TokenKind`]s, and tokens can be pushed back for re-reading. The
//! pushback buffer is LIFO and unbounded, though the parser only ever needs
//! to look two tokens ahead.

use crate::error::{FormulaResult, ParseError, Position};
use crate::scanner::{RawKind, RawToken, Scanner};
use std::fmt;

/// Token kinds delivered to the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Ident,
    CellRange,
    Number,
    String,
    True,
    False,
    Bang,
    Colon,
    Comma,
    OpenParen,
    CloseParen,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Gt,
    Lt,
    Geq,
    Leq,
    Eq,
    Neq,
    Eof,
}

impl TokenKind {
    /// The tag used in error messages
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Ident => "Ident",
            TokenKind::CellRange => "CellRange",
            TokenKind::Number => "Number",
            TokenKind::String => "String",
            TokenKind::True => "True",
            TokenKind::False => "False",
            TokenKind::Bang => "!",
            TokenKind::Colon => ":",
            TokenKind::Comma => ",",
            TokenKind::OpenParen => "(",
            TokenKind::CloseParen => ")",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Caret => "^",
            TokenKind::Gt => ">",
            TokenKind::Lt => "<",
            TokenKind::Geq => ">=",
            TokenKind::Leq => "<=",
            TokenKind::Eq => "=",
            TokenKind::Neq => "<>",
            TokenKind::Eof => "EOF",
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A lexical token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub value: String,
    pub pos: Position,
}

impl Token {
    pub fn is_eof(&self) -> bool {
        self.kind == TokenKind::Eof
    }
}

/// A lexer for formulas, with pushback
pub struct Lexer<'a> {
    scanner: Scanner<'a>,
    pushed: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            scanner: Scanner::new(input),
            pushed: Vec::new(),
        }
    }

    /// Return the next token, draining the pushback buffer first.
    /// Idempotent at EOF.
    pub fn next(&mut self) -> FormulaResult<Token> {
        if let Some(tok) = self.pushed.pop() {
            return Ok(tok);
        }

        let raw = self.scanner.next()?;
        match raw.kind {
            RawKind::SingleQuote | RawKind::DoubleQuote | RawKind::TickQuote => {
                self.consume_string(raw)
            }
            _ => Ok(Token {
                kind: token_kind(&raw)?,
                value: raw.value,
                pos: raw.pos,
            }),
        }
    }

    /// Push tokens back onto the lexer. Tokens are returned in reverse
    /// order of pushing: after `push([a, b])` the next call to `next`
    /// yields `b`, then `a`.
    pub fn push<I: IntoIterator<Item = Token>>(&mut self, tokens: I) {
        self.pushed.extend(tokens);
    }

    /// Concatenate run and escaped-character tokens up to the closing
    /// quote. The resulting token is positioned at the opening quote.
    fn consume_string(&mut self, open: RawToken) -> FormulaResult<Token> {
        let mut text = String::new();
        loop {
            let tok = self.scanner.next()?;
            match tok.kind {
                RawKind::Chars | RawKind::Char => text.push_str(&tok.value),
                kind if kind == open.kind => {
                    return Ok(Token {
                        kind: TokenKind::String,
                        value: text,
                        pos: open.pos,
                    });
                }
                _ => {
                    return Err(ParseError::new(
                        tok.pos,
                        format!("expected end of string: found '{}'", tok.value),
                    ));
                }
            }
        }
    }
}

fn token_kind(raw: &RawToken) -> FormulaResult<TokenKind> {
    let kind = match raw.kind {
        RawKind::True => TokenKind::True,
        RawKind::False => TokenKind::False,
        RawKind::CellRange => TokenKind::CellRange,
        RawKind::Ident => TokenKind::Ident,
        RawKind::Number => TokenKind::Number,
        RawKind::Bang => TokenKind::Bang,
        RawKind::Colon => TokenKind::Colon,
        RawKind::Comma => TokenKind::Comma,
        RawKind::OpenParen => TokenKind::OpenParen,
        RawKind::CloseParen => TokenKind::CloseParen,
        RawKind::Plus => TokenKind::Plus,
        RawKind::Minus => TokenKind::Minus,
        RawKind::Star => TokenKind::Star,
        RawKind::Slash => TokenKind::Slash,
        RawKind::Caret => TokenKind::Caret,
        RawKind::Gt => TokenKind::Gt,
        RawKind::Lt => TokenKind::Lt,
        RawKind::Geq => TokenKind::Geq,
        RawKind::Leq => TokenKind::Leq,
        RawKind::Eq => TokenKind::Eq,
        RawKind::Neq => TokenKind::Neq,
        RawKind::Eof => TokenKind::Eof,
        _ => {
            return Err(ParseError::new(
                raw.pos,
                format!("unknown token '{}'", raw.value),
            ));
        }
    };

    Ok(kind)
}
