//! Expressions: precedence climbing for binary operators, right-recursive
//! unary prefixes, and postfix call chains.
//!
//! Binding power, lowest first:
//!
//! | level | operators                 |
//! |-------|---------------------------|
//! | 1     | `\|\|`                    |
//! | 2     | `&&`                      |
//! | 3     | `==` `!=` `<` `<=` `>` `>=` |
//! | 4     | `+` `-`                   |
//! | 5     | `*` `/`                   |
//!
//! Unary `+ - ! ^` bind tighter than any binary operator. Parentheses only
//! steer the parse; they leave no node behind.

use super::{error_at, PResult, Parser};
use crate::ast::{BinaryOp, Expr, ExprList, Ident, Spanned, UnaryOp};
use crate::error::{Expected, ParseErrorKind};
use crate::lexer::{Tok, TokenKind};

const LOWEST_PRECEDENCE: u8 = 1;

fn binary_op(kind: TokenKind) -> Option<BinaryOp> {
    Some(match kind {
        TokenKind::LOr => BinaryOp::LOr,
        TokenKind::LAnd => BinaryOp::LAnd,
        TokenKind::EqEq => BinaryOp::Eq,
        TokenKind::NotEq => BinaryOp::NotEq,
        TokenKind::Lt => BinaryOp::Lt,
        TokenKind::Le => BinaryOp::Le,
        TokenKind::Gt => BinaryOp::Gt,
        TokenKind::Ge => BinaryOp::Ge,
        TokenKind::Plus => BinaryOp::Add,
        TokenKind::Minus => BinaryOp::Sub,
        TokenKind::Star => BinaryOp::Mul,
        TokenKind::Slash => BinaryOp::Div,
        _ => return None,
    })
}

fn unary_op(kind: TokenKind) -> Option<UnaryOp> {
    Some(match kind {
        TokenKind::Plus => UnaryOp::Plus,
        TokenKind::Minus => UnaryOp::Neg,
        TokenKind::Bang => UnaryOp::Not,
        TokenKind::Caret => UnaryOp::Compl,
        _ => return None,
    })
}

impl<'src> Parser<'src> {
    /// Parses a maximal expression, leaving the cursor on the first token
    /// that cannot continue it.
    pub fn parse_expression(&mut self) -> PResult<Spanned<Expr>> {
        self.parse_binary(LOWEST_PRECEDENCE)
    }

    /// One or more comma-separated expressions.
    pub(crate) fn parse_expr_list(&mut self) -> PResult<ExprList> {
        let mut list = ExprList::new();
        list.push(self.parse_expression()?);
        while self.eat(TokenKind::Comma)?.is_some() {
            list.push(self.parse_expression()?);
        }
        Ok(list)
    }

    /// Every operator folded into the left spine takes a nesting level until
    /// the chain is finished, so a long `a + b + ...` is bounded like any
    /// other nesting.
    fn parse_binary(&mut self, min_prec: u8) -> PResult<Spanned<Expr>> {
        let depth = self.depth;
        let out = self.parse_binary_chain(min_prec);
        self.leave_to(depth);
        out
    }

    fn parse_binary_chain(&mut self, min_prec: u8) -> PResult<Spanned<Expr>> {
        let mut left = self.parse_unary()?;

        while let Some(op) = binary_op(self.peek_kind()?) {
            let prec = op.precedence();
            if prec < min_prec {
                break;
            }
            self.enter()?;
            self.advance()?;
            // `prec + 1` on the right makes every level associate left
            let right = self.parse_binary(prec + 1)?;
            let span = left.span.to(right.span);
            let pos = left.pos;
            left = Spanned::new(
                Expr::Binary {
                    op,
                    left: Box::new(left),
                    right: Box::new(right),
                },
                span,
                pos,
            );
        }

        Ok(left)
    }

    fn parse_unary(&mut self) -> PResult<Spanned<Expr>> {
        let Some(op) = unary_op(self.peek_kind()?) else {
            return self.parse_primary();
        };
        let tok = self.advance()?;
        let operand = self.with_depth(|p| p.parse_unary())?;
        let span = tok.span.to(operand.span);
        Ok(Spanned::new(
            Expr::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
            tok.pos,
        ))
    }

    /// Operand followed by any number of call suffixes: `f(a)(b)`. Each
    /// suffix nests the callee one level deeper.
    fn parse_primary(&mut self) -> PResult<Spanned<Expr>> {
        let depth = self.depth;
        let out = self.parse_call_chain();
        self.leave_to(depth);
        out
    }

    fn parse_call_chain(&mut self) -> PResult<Spanned<Expr>> {
        let mut expr = self.parse_operand()?;

        while self.at(TokenKind::LParen)? {
            self.enter()?;
            let args = self.parse_call_args()?;
            let span = expr.span.to(self.cursor.last_span());
            let pos = expr.pos;
            expr = Spanned::new(
                Expr::Call {
                    callee: Box::new(expr),
                    args,
                },
                span,
                pos,
            );
        }

        Ok(expr)
    }

    /// `( [expr {, expr} [,]] )`
    fn parse_call_args(&mut self) -> PResult<Vec<Spanned<Expr>>> {
        self.expect(TokenKind::LParen)?;
        let mut args = Vec::new();
        while !self.at(TokenKind::RParen)? {
            args.push(self.parse_expression()?);
            if self.eat(TokenKind::Comma)?.is_none() {
                break;
            }
        }
        self.expect_one_of(TokenKind::RParen, &[TokenKind::Comma, TokenKind::RParen])?;
        Ok(args)
    }

    fn parse_operand(&mut self) -> PResult<Spanned<Expr>> {
        match self.peek_kind()? {
            TokenKind::LParen => return self.parse_paren(),
            TokenKind::Ident | TokenKind::IntLit | TokenKind::FloatLit | TokenKind::StringLit => {}
            _ => return Err(self.unexpected(Expected::Expression)),
        }

        let tok = self.advance()?;
        let node = match &tok.tok {
            Tok::Ident(name) => Expr::Ident(Ident::new(*name)),
            Tok::IntLit(v) => Expr::IntLit(*v),
            Tok::FloatLit(v) => Expr::FloatLit(*v),
            Tok::StringLit(s) => Expr::StringLit(s.to_string()),
            _ => {
                let kind = ParseErrorKind::UnexpectedToken {
                    found: tok.describe(),
                    expected: Expected::Expression,
                };
                return Err(error_at(&tok, kind));
            }
        };
        Ok(Spanned::new(node, tok.span, tok.pos))
    }

    /// `( expr )`: yields the inner expression, widened to cover the parens.
    fn parse_paren(&mut self) -> PResult<Spanned<Expr>> {
        let open = self.expect(TokenKind::LParen)?;
        let inner = self.with_depth(|p| p.parse_expression())?;
        let close = self.expect(TokenKind::RParen)?;
        Ok(Spanned::new(inner.node, open.span.to(close.span), open.pos))
    }
}
