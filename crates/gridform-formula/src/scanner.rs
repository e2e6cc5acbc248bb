//! Low-level formula tokenizer
//!
//! A table-driven state machine: each state owns an ordered list of
//! anchored regex rules, and quoting rules push/pop states so that the
//! three quote styles and backslash escapes each tokenize in their own
//! mode. The compiled tables are process-global constants.
//!
//! Rule order in the root state matters: `TRUE`/`FALSE` win over
//! identifiers, and the range pattern consumes range-shaped text eagerly so
//! that `A:Z` becomes one `CellRange` token rather than two idents. A bare
//! cell like `A34` is NOT a range (the pattern requires the colon) and
//! falls through to `Ident`.

use crate::error::{ParseError, Position};
use lazy_static::lazy_static;
use regex::Regex;

/// Token kinds produced by the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RawKind {
    SingleQuote,
    DoubleQuote,
    TickQuote,
    True,
    False,
    CellRange,
    Ident,
    Bang,
    Colon,
    Comma,
    OpenParen,
    CloseParen,
    Geq,
    Leq,
    Neq,
    Gt,
    Lt,
    Eq,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Number,
    /// A run of ordinary characters inside a quoted string
    Chars,
    /// A single escaped character inside a quoted string
    Char,
    Eof,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawToken {
    pub kind: RawKind,
    pub value: String,
    pub pos: Position,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Root,
    SingleQuoted,
    DoubleQuoted,
    TickQuoted,
    Escaped,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    None,
    Push(State),
    Pop,
}

struct Rule {
    /// `None` elides the matched text (whitespace, escape introducer)
    kind: Option<RawKind>,
    pattern: Regex,
    action: Action,
}

impl Rule {
    fn new(kind: Option<RawKind>, pattern: &str, action: Action) -> Self {
        Self {
            kind,
            pattern: Regex::new(pattern).unwrap(),
            action,
        }
    }
}

lazy_static! {
    static ref ROOT_RULES: Vec<Rule> = vec![
        Rule::new(Some(RawKind::SingleQuote), r"^'", Action::Push(State::SingleQuoted)),
        Rule::new(Some(RawKind::DoubleQuote), "^\"", Action::Push(State::DoubleQuoted)),
        Rule::new(Some(RawKind::TickQuote), "^`", Action::Push(State::TickQuoted)),
        Rule::new(Some(RawKind::True), r"^[Tt][Rr][Uu][Ee]\b", Action::None),
        Rule::new(Some(RawKind::False), r"^[Ff][Aa][Ll][Ss][Ee]\b", Action::None),
        Rule::new(
            Some(RawKind::CellRange),
            r"^([A-Za-z]{1,3})?(\d+)?\s*:\s*([A-Za-z]{1,3})?(\d+)?",
            Action::None,
        ),
        Rule::new(Some(RawKind::Ident), r"^[A-Za-z_][A-Za-z0-9_]*", Action::None),
        Rule::new(Some(RawKind::Bang), r"^!", Action::None),
        Rule::new(Some(RawKind::Colon), r"^:", Action::None),
        Rule::new(Some(RawKind::Comma), r"^,", Action::None),
        Rule::new(Some(RawKind::OpenParen), r"^\(", Action::None),
        Rule::new(Some(RawKind::CloseParen), r"^\)", Action::None),
        Rule::new(Some(RawKind::Geq), r"^>=", Action::None),
        Rule::new(Some(RawKind::Leq), r"^<=", Action::None),
        Rule::new(Some(RawKind::Neq), r"^<>", Action::None),
        Rule::new(Some(RawKind::Gt), r"^>", Action::None),
        Rule::new(Some(RawKind::Lt), r"^<", Action::None),
        Rule::new(Some(RawKind::Eq), r"^=", Action::None),
        Rule::new(Some(RawKind::Plus), r"^\+", Action::None),
        Rule::new(Some(RawKind::Minus), r"^-", Action::None),
        Rule::new(Some(RawKind::Star), r"^\*", Action::None),
        Rule::new(Some(RawKind::Slash), r"^/", Action::None),
        Rule::new(Some(RawKind::Caret), r"^\^", Action::None),
        Rule::new(Some(RawKind::Number), r"^[0-9]+(\.[0-9]+)?", Action::None),
        Rule::new(None, r"^\s+", Action::None),
    ];
    static ref SINGLE_QUOTED_RULES: Vec<Rule> = vec![
        Rule::new(None, r"^\\", Action::Push(State::Escaped)),
        Rule::new(Some(RawKind::SingleQuote), r"^'", Action::Pop),
        Rule::new(Some(RawKind::Chars), r"^[^'\\]+", Action::None),
    ];
    static ref DOUBLE_QUOTED_RULES: Vec<Rule> = vec![
        Rule::new(None, r"^\\", Action::Push(State::Escaped)),
        Rule::new(Some(RawKind::DoubleQuote), "^\"", Action::Pop),
        Rule::new(Some(RawKind::Chars), "^[^\"\\\\]+", Action::None),
    ];
    static ref TICK_QUOTED_RULES: Vec<Rule> = vec![
        Rule::new(None, r"^\\", Action::Push(State::Escaped)),
        Rule::new(Some(RawKind::TickQuote), "^`", Action::Pop),
        Rule::new(Some(RawKind::Chars), "^[^`\\\\]+", Action::None),
    ];
    static ref ESCAPED_RULES: Vec<Rule> = vec![
        // One verbatim character, not interpreted
        Rule::new(Some(RawKind::Char), r"^(?s).", Action::Pop),
    ];
}

fn rules_for(state: State) -> &'static [Rule] {
    match state {
        State::Root => &ROOT_RULES,
        State::SingleQuoted => &SINGLE_QUOTED_RULES,
        State::DoubleQuoted => &DOUBLE_QUOTED_RULES,
        State::TickQuoted => &TICK_QUOTED_RULES,
        State::Escaped => &ESCAPED_RULES,
    }
}

/// The stateful tokenizer. Produces [`RawToken`]s one at a time; returns an
/// EOF token at (and beyond) the end of input.
pub(crate) struct Scanner<'a> {
    input: &'a str,
    offset: usize,
    line: u32,
    column: u32,
    stack: Vec<State>,
}

impl<'a> Scanner<'a> {
    pub fn new(input: &'a str) -> Self {
        Self {
            input,
            offset: 0,
            line: 1,
            column: 1,
            stack: vec![State::Root],
        }
    }

    pub fn next(&mut self) -> Result<RawToken, ParseError> {
        loop {
            if self.offset >= self.input.len() {
                return Ok(RawToken {
                    kind: RawKind::Eof,
                    value: String::new(),
                    pos: self.pos(),
                });
            }

            let rest = &self.input[self.offset..];
            let matched = rules_for(self.state()).iter().find_map(|rule| {
                rule.pattern
                    .find(rest)
                    .filter(|m| !m.as_str().is_empty())
                    .map(|m| (rule, m.as_str().to_string()))
            });

            let Some((rule, text)) = matched else {
                let c = rest.chars().next().unwrap();
                return Err(ParseError::new(
                    self.pos(),
                    format!("unrecognized character '{}'", c),
                ));
            };

            let pos = self.pos();
            self.advance(&text);

            match rule.action {
                Action::Push(state) => self.stack.push(state),
                Action::Pop => {
                    self.stack.pop();
                }
                Action::None => {}
            }

            if let Some(kind) = rule.kind {
                return Ok(RawToken {
                    kind,
                    value: text,
                    pos,
                });
            }
        }
    }

    fn state(&self) -> State {
        *self.stack.last().unwrap_or(&State::Root)
    }

    fn pos(&self) -> Position {
        Position::new(self.line, self.column)
    }

    fn advance(&mut self, text: &str) {
        self.offset += text.len();
        for c in text.chars() {
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }
}
