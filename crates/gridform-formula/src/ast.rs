//! Formula abstract syntax tree
//!
//! ASTs are immutable trees produced by the parser and consumed read-only
//! by downstream evaluators. Each variant has a canonical string form;
//! printing performs no automatic parenthesization, so round-trips are not
//! guaranteed across associativity.

use chrono::SecondsFormat;
use gridform_core::{Operator, Pos, Range, Value};
use std::fmt;

/// A formula expression
#[derive(Debug, Clone, PartialEq)]
pub enum Formula {
    /// A constant value
    Constant(Value),

    /// A reference to a single cell, optionally sheet-qualified
    CellRef(CellReference),

    /// A reference to a range of cells, optionally sheet-qualified
    RangeRef(RangeReference),

    /// A reference to a named range
    NameRef(String),

    /// A function call; the name is stored uppercased
    Function { name: String, args: Vec<Formula> },

    /// A binary arithmetic or comparison expression
    BinaryOp {
        op: Operator,
        left: Box<Formula>,
        right: Box<Formula>,
    },
}

/// Cell reference with optional sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellReference {
    pub sheet: Option<String>,
    pub pos: Pos,
}

/// Range reference with optional sheet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeReference {
    pub sheet: Option<String>,
    pub range: Range,
}

impl fmt::Display for Formula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Formula::Constant(value) => match value {
                Value::Text(s) => write!(f, "\"{}\"", escape_text(s)),
                Value::Time(tm) => {
                    write!(f, "\"{}\"", tm.to_rfc3339_opts(SecondsFormat::Secs, true))
                }
                other => write!(f, "{}", other),
            },
            Formula::CellRef(cell_ref) => write!(f, "{}", cell_ref),
            Formula::RangeRef(range_ref) => write!(f, "{}", range_ref),
            Formula::NameRef(name) => write!(f, "{}", name),
            Formula::Function { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i != 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
            Formula::BinaryOp { op, left, right } => write!(f, "{} {} {}", left, op, right),
        }
    }
}

impl fmt::Display for CellReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sheet {
            Some(sheet) => write!(f, "`{}`!{}", sheet, self.pos),
            None => write!(f, "{}", self.pos),
        }
    }
}

impl fmt::Display for RangeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.sheet {
            Some(sheet) => write!(f, "`{}`!{}", sheet, self.range),
            None => write!(f, "{}", self.range),
        }
    }
}

fn escape_text(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        if c == '"' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped
}
