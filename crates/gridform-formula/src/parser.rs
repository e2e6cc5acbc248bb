//! Formula parser
//!
//! A recursive descent parser with one-token lookahead through the lexer's
//! pushback buffer. Formulas don't quite follow a context-free grammar, but
//! a pseudo-EBNF looks like:
//!
//! ```text
//! Formula      := Expression [ (">" | "<" | ">=" | "<=" | "<>" | "=") Expression ]
//! Expression   := Term   { ("+" | "-") Term }
//! Term         := Factor { ("*" | "/" | "^") Factor }
//! Factor       := FunctionCall | Reference | Constant | "(" Formula ")"
//! FunctionCall := IDENT "(" [ Formula { "," Formula } ] ")"
//! Reference    := [ (IDENT | STRING) "!" ] ( CELL_RANGE | IDENT )
//! Constant     := NUMBER | STRING | TRUE | FALSE
//! ```
//!
//! The grammar needs to peek past an identifier for `(` (function call vs
//! reference) and past a string for `!` (sheet name vs string constant),
//! which is where the pushback comes in. An `IDENT` that parses as a cell
//! position becomes a cell reference; otherwise it names a range.

use crate::ast::{CellReference, Formula, RangeReference};
use crate::error::{FormulaResult, ParseError};
use crate::lexer::{Lexer, Token, TokenKind};
use gridform_core::{Operator, Pos, Range, Value};

/// Parse a formula string into an AST
///
/// # Example
/// ```rust
/// use gridform_formula::parse_formula;
///
/// let ast = parse_formula("1+2").unwrap();
/// let ast = parse_formula("SUM(A1:A10)").unwrap();
/// let ast = parse_formula("IF(A1>0, \"Yes\", \"No\")").unwrap();
/// ```
pub fn parse_formula(input: &str) -> FormulaResult<Formula> {
    let mut parser = Parser::new(input);
    let formula = parser.formula()?;

    // Make sure we consumed all input
    let last = parser.lexer.next()?;
    if !last.is_eof() {
        return Err(ParseError::unexpected_token(&last, &[TokenKind::Eof]));
    }

    Ok(formula)
}

struct Parser<'a> {
    lexer: Lexer<'a>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lexer: Lexer::new(input),
        }
    }

    /// Formula := Expression [ cmp Expression ]
    fn formula(&mut self) -> FormulaResult<Formula> {
        let expr = self.expression()?;

        let next = self.lexer.next()?;
        let op = match next.kind {
            TokenKind::Gt => Operator::Gt,
            TokenKind::Lt => Operator::Lt,
            TokenKind::Geq => Operator::Geq,
            TokenKind::Leq => Operator::Leq,
            TokenKind::Eq => Operator::Eq,
            TokenKind::Neq => Operator::Neq,
            _ => {
                self.lexer.push([next]);
                return Ok(expr);
            }
        };

        let right = self.expression()?;
        Ok(Formula::BinaryOp {
            op,
            left: Box::new(expr),
            right: Box::new(right),
        })
    }

    /// Expression := Term { ("+" | "-") Term }, folding left
    fn expression(&mut self) -> FormulaResult<Formula> {
        let mut left = self.term()?;

        loop {
            let next = self.lexer.next()?;
            let op = match next.kind {
                TokenKind::Plus => Operator::Add,
                TokenKind::Minus => Operator::Subtract,
                _ => {
                    self.lexer.push([next]);
                    return Ok(left);
                }
            };

            let right = self.term()?;
            left = Formula::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    /// Term := Factor { ("*" | "/" | "^") Factor }, folding left
    fn term(&mut self) -> FormulaResult<Formula> {
        let mut left = self.factor()?;

        loop {
            let next = self.lexer.next()?;
            let op = match next.kind {
                TokenKind::Star => Operator::Multiply,
                TokenKind::Slash => Operator::Divide,
                TokenKind::Caret => Operator::Power,
                _ => {
                    self.lexer.push([next]);
                    return Ok(left);
                }
            };

            let right = self.factor()?;
            left = Formula::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
    }

    fn factor(&mut self) -> FormulaResult<Formula> {
        let tok = self.lexer.next()?;
        match tok.kind {
            TokenKind::Ident => {
                // Might be a function call or a reference; it's a function
                // call iff the next token is an open paren
                let next = self.lexer.next()?;
                let is_call = next.kind == TokenKind::OpenParen;
                self.lexer.push([next, tok]);

                if is_call {
                    self.function()
                } else {
                    self.reference()
                }
            }

            TokenKind::String => {
                // Might be a sheet-qualified reference or a string
                // constant; it's a sheet name iff the next token is a bang
                let next = self.lexer.next()?;
                let is_sheet = next.kind == TokenKind::Bang;
                self.lexer.push([next, tok]);

                if is_sheet {
                    self.reference()
                } else {
                    self.constant()
                }
            }

            TokenKind::CellRange => {
                self.lexer.push([tok]);
                self.reference()
            }

            TokenKind::Number | TokenKind::True | TokenKind::False => {
                self.lexer.push([tok]);
                self.constant()
            }

            TokenKind::OpenParen => {
                let formula = self.formula()?;

                let next = self.lexer.next()?;
                if next.kind != TokenKind::CloseParen {
                    return Err(ParseError::unexpected_token(
                        &next,
                        &[TokenKind::CloseParen],
                    ));
                }

                Ok(formula)
            }

            _ => Err(ParseError::unexpected_token(
                &tok,
                &[
                    TokenKind::Ident,
                    TokenKind::CellRange,
                    TokenKind::Number,
                    TokenKind::String,
                    TokenKind::True,
                    TokenKind::False,
                ],
            )),
        }
    }

    fn function(&mut self) -> FormulaResult<Formula> {
        let name_tok = self.lexer.next()?;
        if name_tok.kind != TokenKind::Ident {
            return Err(ParseError::unexpected_token(&name_tok, &[TokenKind::Ident]));
        }

        let name = name_tok.value.to_uppercase();

        let open = self.lexer.next()?;
        if open.kind != TokenKind::OpenParen {
            return Err(ParseError::unexpected_token(&open, &[TokenKind::OpenParen]));
        }

        // Quick check for an empty argument list
        let maybe_close = self.lexer.next()?;
        if maybe_close.kind == TokenKind::CloseParen {
            return Ok(Formula::Function {
                name,
                args: Vec::new(),
            });
        }
        self.lexer.push([maybe_close]);

        let mut args = Vec::new();
        loop {
            args.push(self.formula()?);

            let next = self.lexer.next()?;
            match next.kind {
                TokenKind::Comma => continue,
                TokenKind::CloseParen => break,
                _ => {
                    return Err(ParseError::unexpected_token(
                        &next,
                        &[TokenKind::Comma, TokenKind::CloseParen],
                    ));
                }
            }
        }

        Ok(Formula::Function { name, args })
    }

    fn constant(&mut self) -> FormulaResult<Formula> {
        let tok = self.lexer.next()?;
        let value = match tok.kind {
            TokenKind::True => Value::Bool(true),
            TokenKind::False => Value::Bool(false),
            TokenKind::Number => tok
                .value
                .parse::<f64>()
                .map(Value::Number)
                .map_err(|_| {
                    ParseError::new(tok.pos, format!("invalid number '{}'", tok.value))
                })?,
            // Quoted date-shaped or number-shaped strings become Time or
            // Number constants
            TokenKind::String => Value::infer(&tok.value),
            _ => {
                return Err(ParseError::unexpected_token(
                    &tok,
                    &[
                        TokenKind::String,
                        TokenKind::Number,
                        TokenKind::True,
                        TokenKind::False,
                    ],
                ));
            }
        };

        Ok(Formula::Constant(value))
    }

    fn reference(&mut self) -> FormulaResult<Formula> {
        let tok = self.lexer.next()?;
        match tok.kind {
            TokenKind::CellRange => {
                let range = parse_embedded_range(&tok)?;
                Ok(Formula::RangeRef(RangeReference { sheet: None, range }))
            }

            TokenKind::Ident | TokenKind::String => {
                // Could name a sheet, a cell, or a named range
                let next = self.lexer.next()?;
                if next.kind == TokenKind::Bang {
                    // The leading token names the sheet
                    return self.cell_or_named_range(Some(tok.value));
                }

                self.lexer.push([next]);
                self.lexer.push([tok]);
                self.cell_or_named_range(None)
            }

            _ => Err(ParseError::unexpected_token(
                &tok,
                &[
                    TokenKind::Ident,
                    TokenKind::String,
                    TokenKind::CellRange,
                ],
            )),
        }
    }

    fn cell_or_named_range(&mut self, sheet: Option<String>) -> FormulaResult<Formula> {
        let tok = self.lexer.next()?;
        match tok.kind {
            TokenKind::CellRange => {
                let range = parse_embedded_range(&tok)?;
                Ok(Formula::RangeRef(RangeReference { sheet, range }))
            }

            TokenKind::Ident => {
                if let Ok(pos) = Pos::parse(&tok.value) {
                    return Ok(Formula::CellRef(CellReference { sheet, pos }));
                }

                Ok(Formula::NameRef(tok.value))
            }

            _ => Err(ParseError::unexpected_token(
                &tok,
                &[TokenKind::Ident, TokenKind::CellRange],
            )),
        }
    }
}

/// Parse the raw text of a `CellRange` token, anchoring failures at the
/// token's position.
fn parse_embedded_range(tok: &Token) -> FormulaResult<Range> {
    Range::parse(&tok.value).map_err(|err| ParseError::new(tok.pos, err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use gridform_core::MAX_ROW;

    fn num(n: f64) -> Formula {
        Formula::Constant(Value::Number(n))
    }

    fn binop(op: Operator, left: Formula, right: Formula) -> Formula {
        Formula::BinaryOp {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn cell(sheet: Option<&str>, pos: &str) -> Formula {
        Formula::CellRef(CellReference {
            sheet: sheet.map(|s| s.to_string()),
            pos: Pos::parse(pos).unwrap(),
        })
    }

    #[test]
    fn test_parse_expressions() {
        assert_eq!(
            parse_formula("100.3 + 45").unwrap(),
            binop(Operator::Add, num(100.3), num(45.0))
        );

        assert_eq!(
            parse_formula("100.3*17 + 45").unwrap(),
            binop(
                Operator::Add,
                binop(Operator::Multiply, num(100.3), num(17.0)),
                num(45.0)
            )
        );

        assert_eq!(
            parse_formula("100.3*17 + 45 >= A34").unwrap(),
            binop(
                Operator::Geq,
                binop(
                    Operator::Add,
                    binop(Operator::Multiply, num(100.3), num(17.0)),
                    num(45.0)
                ),
                cell(None, "A34")
            )
        );

        assert_eq!(
            parse_formula("(100.3*17 + 45) >= A34").unwrap(),
            binop(
                Operator::Geq,
                binop(
                    Operator::Add,
                    binop(Operator::Multiply, num(100.3), num(17.0)),
                    num(45.0)
                ),
                cell(None, "A34")
            )
        );
    }

    #[test]
    fn test_binary_levels_fold_left() {
        assert_eq!(
            parse_formula("1+2+3").unwrap(),
            binop(
                Operator::Add,
                binop(Operator::Add, num(1.0), num(2.0)),
                num(3.0)
            )
        );

        assert_eq!(
            parse_formula("100/10/5").unwrap(),
            binop(
                Operator::Divide,
                binop(Operator::Divide, num(100.0), num(10.0)),
                num(5.0)
            )
        );

        assert_eq!(
            parse_formula("2^3*4 - 1").unwrap(),
            binop(
                Operator::Subtract,
                binop(
                    Operator::Multiply,
                    binop(Operator::Power, num(2.0), num(3.0)),
                    num(4.0)
                ),
                num(1.0)
            )
        );
    }

    #[test]
    fn test_parse_function_against_mean() {
        assert_eq!(
            parse_formula("(100.3*17 + 45) >= MEAN(A:A)").unwrap(),
            binop(
                Operator::Geq,
                binop(
                    Operator::Add,
                    binop(Operator::Multiply, num(100.3), num(17.0)),
                    num(45.0)
                ),
                Formula::Function {
                    name: "MEAN".into(),
                    args: vec![Formula::RangeRef(RangeReference {
                        sheet: None,
                        range: Range::parse("A:A").unwrap(),
                    })],
                }
            )
        );
    }

    #[test]
    fn test_parse_errors() {
        for (input, expected) in [
            (
                "100.3 + ",
                "error at 1:9: expected one of [Ident, CellRange, Number, String, True, False]: found '' (EOF)",
            ),
            (
                "100.3 + 45 *",
                "error at 1:13: expected one of [Ident, CellRange, Number, String, True, False]: found '' (EOF)",
            ),
            (
                "100.3 + 45 * 7 >= ",
                "error at 1:19: expected one of [Ident, CellRange, Number, String, True, False]: found '' (EOF)",
            ),
            (
                "(100.3 + )",
                "error at 1:10: expected one of [Ident, CellRange, Number, String, True, False]: found ')' ())",
            ),
            ("(100.3", "error at 1:7: expected one of [)]: found '' (EOF)"),
            (
                "100.3 45",
                "error at 1:7: expected one of [EOF]: found '45' (Number)",
            ),
        ] {
            let err = parse_formula(input).unwrap_err();
            assert_eq!(err.to_string(), expected, "{}", input);
        }
    }

    #[test]
    fn test_parse_functions() {
        assert_eq!(
            parse_formula("no_args()").unwrap(),
            Formula::Function {
                name: "NO_ARGS".into(),
                args: Vec::new(),
            }
        );

        assert_eq!(
            parse_formula("median(`My Sheet`!A:A)").unwrap(),
            Formula::Function {
                name: "MEDIAN".into(),
                args: vec![Formula::RangeRef(RangeReference {
                    sheet: Some("My Sheet".into()),
                    range: Range::new(0, MAX_ROW, 0, 0),
                })],
            }
        );

        assert_eq!(
            parse_formula("VLOOKUP( M23, `Other Sheet`!A1:C45, 1, FALSE )").unwrap(),
            Formula::Function {
                name: "VLOOKUP".into(),
                args: vec![
                    cell(None, "M23"),
                    Formula::RangeRef(RangeReference {
                        sheet: Some("Other Sheet".into()),
                        range: Range::new(0, 44, 0, 2),
                    }),
                    num(1.0),
                    Formula::Constant(Value::Bool(false)),
                ],
            }
        );

        assert_eq!(
            parse_formula(r#"split("This is a set of \"quoted\" words")"#).unwrap(),
            Formula::Function {
                name: "SPLIT".into(),
                args: vec![Formula::Constant(Value::Text(
                    r#"This is a set of "quoted" words"#.into()
                ))],
            }
        );
    }

    #[test]
    fn test_parse_constants() {
        assert_eq!(parse_formula("100.45").unwrap(), num(100.45));
        assert_eq!(
            parse_formula("True").unwrap(),
            Formula::Constant(Value::Bool(true))
        );
        assert_eq!(
            parse_formula("FALSE").unwrap(),
            Formula::Constant(Value::Bool(false))
        );
        assert_eq!(
            parse_formula(r#""This is a string""#).unwrap(),
            Formula::Constant(Value::Text("This is a string".into()))
        );

        // Date-shaped and number-shaped strings collapse to their most
        // specific value
        assert_eq!(
            parse_formula(r#""2024-01-14T12:34:56Z""#).unwrap(),
            Formula::Constant(Value::Time(
                Utc.with_ymd_and_hms(2024, 1, 14, 12, 34, 56).unwrap()
            ))
        );
        assert_eq!(
            parse_formula(r#""2024/01/14""#).unwrap(),
            Formula::Constant(Value::Time(
                Utc.with_ymd_and_hms(2024, 1, 14, 0, 0, 0).unwrap()
            ))
        );
        assert_eq!(parse_formula(r#""2019.3746""#).unwrap(), num(2019.3746));
    }

    #[test]
    fn test_parse_references() {
        assert_eq!(
            parse_formula("A34:C72").unwrap(),
            Formula::RangeRef(RangeReference {
                sheet: None,
                range: Range::new(33, 71, 0, 2),
            })
        );

        assert_eq!(
            parse_formula(r#""Another Sheet"!A34:C72"#).unwrap(),
            Formula::RangeRef(RangeReference {
                sheet: Some("Another Sheet".into()),
                range: Range::new(33, 71, 0, 2),
            })
        );

        assert_eq!(parse_formula("B34").unwrap(), cell(None, "B34"));

        assert_eq!(
            parse_formula("MyNamedRange").unwrap(),
            Formula::NameRef("MyNamedRange".into())
        );

        assert_eq!(
            parse_formula("YetAnotherSheet!B45").unwrap(),
            cell(Some("YetAnotherSheet"), "B45")
        );
    }

    #[test]
    fn test_invalid_embedded_range_is_anchored() {
        let err = parse_formula("SUM(A1:)").unwrap_err();
        assert_eq!(
            err.to_string(),
            "error at 1:5: invalid range: expected A23:B54, found 'A1:'"
        );
    }
}
