//! Pratt (top-down operator precedence) expression parsing.

use crate::ast::{BinaryOp, Expr, Lit, UnaryOp};
use crate::lexer::{Keyword, TokenKind};

use super::core::Parser;
use super::error::ParseError;

/// Returns the infix operator and its binding power for the given
/// token, if it starts an infix position.
fn infix_binding_power(kind: &TokenKind) -> Option<(BinaryOp, u8)> {
    let op = match kind {
        TokenKind::Keyword(Keyword::Or) => BinaryOp::Or,
        TokenKind::Keyword(Keyword::And) => BinaryOp::And,
        TokenKind::Keyword(Keyword::Like) => BinaryOp::Like,
        TokenKind::Eq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::Ne,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::LtEq => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::GtEq => BinaryOp::Ge,
        TokenKind::Concat => BinaryOp::Concat,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        _ => return None,
    };
    Some((op, op.precedence()))
}

impl<'a> Parser<'a> {
    /// Parses an expression with the given minimum binding power.
    pub(crate) fn parse_expression(&mut self, min_bp: u8) -> Result<Expr, ParseError> {
        let mut left = self.parse_prefix()?;

        loop {
            // `IS [NOT] NULL`, `[NOT] IN`, `[NOT] BETWEEN` sit at
            // comparison precedence.
            if min_bp <= 4 {
                if self.check_keyword(Keyword::Is) {
                    self.advance()?;
                    let negated = self.eat_keyword(Keyword::Not)?;
                    self.expect_keyword(Keyword::Null)?;
                    left = Expr::IsNull {
                        expr: Box::new(left),
                        negated,
                    };
                    continue;
                }
                if self.check_keyword(Keyword::In) {
                    self.advance()?;
                    left = self.parse_in_list(left, false)?;
                    continue;
                }
                if self.check_keyword(Keyword::Between) {
                    self.advance()?;
                    left = self.parse_between(left, false)?;
                    continue;
                }
                if self.check_keyword(Keyword::Not) {
                    // NOT here can only introduce NOT IN / NOT BETWEEN /
                    // NOT LIKE.
                    self.advance()?;
                    if self.eat_keyword(Keyword::In)? {
                        left = self.parse_in_list(left, true)?;
                        continue;
                    }
                    if self.eat_keyword(Keyword::Between)? {
                        left = self.parse_between(left, true)?;
                        continue;
                    }
                    if self.eat_keyword(Keyword::Like)? {
                        let right = self.parse_expression(5)?;
                        left = Expr::Unary {
                            op: UnaryOp::Not,
                            expr: Box::new(Expr::Binary {
                                op: BinaryOp::Like,
                                left: Box::new(left),
                                right: Box::new(right),
                            }),
                        };
                        continue;
                    }
                    return Err(ParseError::unexpected(
                        "IN, BETWEEN or LIKE after NOT",
                        self.current.kind.clone(),
                        self.current.span,
                    ));
                }
            }

            let Some((op, bp)) = infix_binding_power(&self.current.kind) else {
                break;
            };
            if bp < min_bp {
                break;
            }
            self.advance()?;
            let right = self.parse_expression(bp + 1)?;
            left = Expr::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }

        Ok(left)
    }

    fn parse_in_list(&mut self, expr: Expr, negated: bool) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftParen)?;
        let mut list = Vec::new();
        loop {
            list.push(self.parse_expression(0)?);
            if !self.eat(&TokenKind::Comma)? {
                break;
            }
        }
        self.expect(&TokenKind::RightParen)?;
        Ok(Expr::InList {
            expr: Box::new(expr),
            list,
            negated,
        })
    }

    fn parse_between(&mut self, expr: Expr, negated: bool) -> Result<Expr, ParseError> {
        let low = self.parse_expression(5)?;
        self.expect_keyword(Keyword::And)?;
        let high = self.parse_expression(5)?;
        Ok(Expr::Between {
            expr: Box::new(expr),
            low: Box::new(low),
            high: Box::new(high),
            negated,
        })
    }

    /// Parses a prefix position: literal, path, function call, array,
    /// parenthesized expression, or unary operator.
    fn parse_prefix(&mut self) -> Result<Expr, ParseError> {
        match self.current.kind.clone() {
            TokenKind::Integer(v) => {
                self.advance()?;
                Ok(Expr::Lit(Lit::Integer(v)))
            }
            TokenKind::Float(v) => {
                self.advance()?;
                Ok(Expr::Lit(Lit::Float(v)))
            }
            TokenKind::Str(s) => {
                self.advance()?;
                Ok(Expr::Lit(Lit::String(s)))
            }
            TokenKind::ByteStr(s) => {
                self.advance()?;
                Ok(Expr::Lit(Lit::Bytes(s)))
            }
            TokenKind::Minus => {
                self.advance()?;
                let expr = self.parse_expression(8)?;
                Ok(Expr::Unary {
                    op: UnaryOp::Neg,
                    expr: Box::new(expr),
                })
            }
            TokenKind::Keyword(Keyword::Not) => {
                self.advance()?;
                let expr = self.parse_expression(3)?;
                Ok(Expr::Unary {
                    op: UnaryOp::Not,
                    expr: Box::new(expr),
                })
            }
            TokenKind::Keyword(Keyword::True) => {
                self.advance()?;
                Ok(Expr::Lit(Lit::Bool(true)))
            }
            TokenKind::Keyword(Keyword::False) => {
                self.advance()?;
                Ok(Expr::Lit(Lit::Bool(false)))
            }
            TokenKind::Keyword(Keyword::Null) => {
                self.advance()?;
                Ok(Expr::Lit(Lit::Null))
            }
            TokenKind::LeftParen => {
                self.advance()?;
                let expr = self.parse_expression(0)?;
                self.expect(&TokenKind::RightParen)?;
                Ok(expr)
            }
            TokenKind::LeftBracket => self.parse_array(),
            TokenKind::Keyword(Keyword::Array) if self.peek_is(&TokenKind::LeftBracket) => {
                self.advance()?;
                self.parse_array()
            }
            // Typed literals: the type keyword directly followed by a
            // string. Otherwise the keyword is an ordinary identifier.
            TokenKind::Keyword(kw @ (Keyword::Date
            | Keyword::Timestamp
            | Keyword::Numeric
            | Keyword::Json)) => {
                if let Some(lit) = self.try_typed_literal(kw)? {
                    Ok(Expr::Lit(lit))
                } else {
                    self.parse_path_expr()
                }
            }
            TokenKind::Ident(_) | TokenKind::Keyword(_) => self.parse_path_expr(),
            kind => Err(ParseError::unexpected(
                "an expression",
                kind,
                self.current.span,
            )),
        }
    }

    fn try_typed_literal(&mut self, kw: Keyword) -> Result<Option<Lit>, ParseError> {
        if !self.peek_is_string() {
            return Ok(None);
        }
        self.advance()?;
        let TokenKind::Str(value) = self.current.kind.clone() else {
            return Err(ParseError::unexpected(
                "a string literal",
                self.current.kind.clone(),
                self.current.span,
            ));
        };
        self.advance()?;
        let lit = match kw {
            Keyword::Date => Lit::Date(value),
            Keyword::Timestamp => Lit::Timestamp(value),
            Keyword::Numeric => Lit::Numeric(value),
            _ => Lit::Json(value),
        };
        Ok(Some(lit))
    }

    fn parse_array(&mut self) -> Result<Expr, ParseError> {
        self.expect(&TokenKind::LeftBracket)?;
        let mut items = Vec::new();
        if !self.check(&TokenKind::RightBracket) {
            loop {
                items.push(self.parse_expression(0)?);
                if !self.eat(&TokenKind::Comma)? {
                    break;
                }
            }
        }
        self.expect(&TokenKind::RightBracket)?;
        Ok(Expr::Array(items))
    }

    /// Parses a dotted path, continuing into a function call if a `(`
    /// follows.
    fn parse_path_expr(&mut self) -> Result<Expr, ParseError> {
        let path = self.parse_path()?;
        if self.eat(&TokenKind::LeftParen)? {
            let mut args = Vec::new();
            if !self.check(&TokenKind::RightParen) {
                loop {
                    args.push(self.parse_expression(0)?);
                    if !self.eat(&TokenKind::Comma)? {
                        break;
                    }
                }
            }
            self.expect(&TokenKind::RightParen)?;
            Ok(Expr::Func { name: path, args })
        } else {
            Ok(Expr::Path(path))
        }
    }
}
