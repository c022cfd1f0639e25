//! Blocks and statements.

use super::{PResult, Parser};
use crate::ast::{AssignOp, AssignStmt, Block, Else, ForStmt, IfStmt, Spanned, Stmt};
use crate::error::{Expected, ParseError, ParseErrorKind};
use crate::lexer::TokenKind;

const AFTER_STMT: &[TokenKind] = &[TokenKind::Semi, TokenKind::RBrace];

impl<'src> Parser<'src> {
    /// `{` statements `}`. Every statement but the last is followed by a
    /// terminator, explicit or inserted.
    pub fn parse_block(&mut self) -> PResult<Block> {
        let open = self.expect(TokenKind::LBrace)?;
        let stmts = self.with_depth(|p| p.parse_stmt_list())?;
        let close = self.expect_one_of(TokenKind::RBrace, AFTER_STMT)?;
        Ok(Block {
            stmts,
            span: open.span.to(close.span),
            pos: open.pos,
        })
    }

    fn parse_stmt_list(&mut self) -> PResult<Vec<Spanned<Stmt>>> {
        let mut stmts = Vec::new();
        loop {
            match self.peek_kind()? {
                TokenKind::RBrace | TokenKind::Eof => return Ok(stmts),
                TokenKind::Semi => {
                    let tok = self.advance()?;
                    stmts.push(Spanned::new(Stmt::Empty, tok.span, tok.pos));
                    continue;
                }
                _ => {}
            }

            stmts.push(self.parse_statement()?);

            match self.peek_kind()? {
                TokenKind::Semi => {
                    self.advance()?;
                }
                TokenKind::RBrace => {}
                _ => return Err(self.unexpected(Expected::one_of(AFTER_STMT))),
            }
        }
    }

    pub fn parse_statement(&mut self) -> PResult<Spanned<Stmt>> {
        match self.peek_kind()? {
            // compound statements nest a level of their own on top of their blocks
            TokenKind::KwIf => {
                let s = self.with_depth(|p| p.parse_if())?;
                Ok(Spanned::new(Stmt::If(s.node), s.span, s.pos))
            }
            TokenKind::KwFor => self.with_depth(|p| p.parse_for()),
            TokenKind::KwReturn => self.parse_return(),
            _ => self.parse_simple_stmt(),
        }
    }

    /// Expression statement, assignment or short declaration.
    pub(crate) fn parse_simple_stmt(&mut self) -> PResult<Spanned<Stmt>> {
        let mut lhs = self.parse_expr_list()?;
        let span = lhs[0].span;
        let pos = lhs[0].pos;

        let op = match self.peek_kind()? {
            TokenKind::Define => AssignOp::Declare,
            TokenKind::Assign => AssignOp::Assign,
            _ if lhs.len() == 1 => {
                let expr = lhs.swap_remove(0);
                return Ok(Spanned::new(Stmt::Expr(expr), span, pos));
            }
            _ => {
                return Err(self.unexpected(Expected::one_of(&[
                    TokenKind::Define,
                    TokenKind::Assign,
                ])))
            }
        };

        if let Some(bad) = lhs.iter().find(|t| t.node.as_ident().is_none()) {
            let kind = ParseErrorKind::InvalidAssignmentTarget;
            return Err(ParseError::new(kind, bad.pos, bad.span).into());
        }

        self.advance()?;
        let values = self.parse_expr_list()?;
        let span = span.to(self.cursor.last_span());
        Ok(Spanned::new(
            Stmt::Assign(AssignStmt {
                targets: lhs,
                op,
                values,
            }),
            span,
            pos,
        ))
    }

    /// `if cond { } [else (if ... | { })]`
    pub(crate) fn parse_if(&mut self) -> PResult<Spanned<IfStmt>> {
        let kw = self.expect(TokenKind::KwIf)?;
        let cond = self.parse_expression()?;
        let then_block = self.parse_block()?;

        let otherwise = match self.peek_kind()? {
            TokenKind::KwElse => {
                self.advance()?;
                match self.peek_kind()? {
                    TokenKind::KwIf => {
                        let nested = self.with_depth(|p| p.parse_if())?;
                        Some(Else::If(Box::new(nested)))
                    }
                    TokenKind::LBrace => Some(Else::from_block(self.parse_block()?)),
                    _ => {
                        return Err(self.unexpected(Expected::one_of(&[
                            TokenKind::KwIf,
                            TokenKind::LBrace,
                        ])))
                    }
                }
            }
            // `}` newline `else`: the terminator already ended the `if`
            TokenKind::Semi
                if self.cursor.peek()?.is_inserted_semi()
                    && self.cursor.peek_nth(1)?.kind() == TokenKind::KwElse =>
            {
                return Err(self.unexpected(Expected::token(TokenKind::KwElse)));
            }
            _ => None,
        };

        let span = kw.span.to(self.cursor.last_span());
        Ok(Spanned::new(
            IfStmt {
                cond,
                then_block,
                otherwise,
            },
            span,
            kw.pos,
        ))
    }

    /// Three header shapes: `for { }`, `for cond { }` and
    /// `for [init]; [cond]; [post] { }`.
    fn parse_for(&mut self) -> PResult<Spanned<Stmt>> {
        let kw = self.expect(TokenKind::KwFor)?;
        let mut init = None;
        let mut cond = None;
        let mut post = None;

        if !self.at(TokenKind::LBrace)? {
            let first = if self.at(TokenKind::Semi)? {
                None
            } else {
                Some(self.parse_simple_stmt()?)
            };

            if self.at(TokenKind::LBrace)? {
                match first {
                    Some(Spanned {
                        node: Stmt::Expr(expr),
                        ..
                    }) => cond = Some(expr),
                    Some(other) => {
                        return Err(ParseError::new(
                            ParseErrorKind::InvalidForClause {
                                reason: "loop condition must be an expression",
                            },
                            other.pos,
                            other.span,
                        )
                        .into())
                    }
                    None => {}
                }
            } else {
                self.expect_one_of(TokenKind::Semi, &[TokenKind::Semi, TokenKind::LBrace])?;
                init = first.map(Box::new);

                if !matches!(self.peek_kind()?, TokenKind::Semi | TokenKind::LBrace) {
                    cond = Some(self.parse_expression()?);
                }
                if !self.at(TokenKind::Semi)? {
                    return Err(self.error_here(ParseErrorKind::InvalidForClause {
                        reason: "expected `;` after loop condition",
                    }));
                }
                self.advance()?;

                if !self.at(TokenKind::LBrace)? {
                    let stmt = self.parse_simple_stmt()?;
                    if let Stmt::Assign(AssignStmt {
                        op: AssignOp::Declare,
                        ..
                    }) = stmt.node
                    {
                        return Err(ParseError::new(
                            ParseErrorKind::InvalidForClause {
                                reason: "post statement cannot declare variables",
                            },
                            stmt.pos,
                            stmt.span,
                        )
                        .into());
                    }
                    post = Some(Box::new(stmt));
                }
            }
        }

        let body = self.parse_block()?;
        Ok(Spanned::new(
            Stmt::For(ForStmt {
                init,
                cond,
                post,
                body,
            }),
            kw.span.to(self.cursor.last_span()),
            kw.pos,
        ))
    }

    /// `return [expr {, expr}]`
    fn parse_return(&mut self) -> PResult<Spanned<Stmt>> {
        let kw = self.expect(TokenKind::KwReturn)?;
        let values = if self.peek_kind()?.starts_expression() {
            self.parse_expr_list()?
        } else {
            Default::default()
        };
        Ok(Spanned::new(
            Stmt::Return(values),
            kw.span.to(self.cursor.last_span()),
            kw.pos,
        ))
    }
}
