//! Recursive-descent parser.
//!
//! The [`Parser`] state lives here together with the token helpers; the
//! productions are spread over `impl Parser` blocks in the submodules:
//!
//! - `decl`: program, package clause, function declarations, types
//! - `stmt`: blocks and statements
//! - `expr`: precedence climbing, unary chains, calls
//!
//! Every production returns `Result<_, SyntaxError>`; a lexical error found
//! while peeking is propagated unchanged.

mod decl;
mod expr;
mod stmt;

use crate::ast::{Ident, Spanned};
use crate::config::ParseConfig;
use crate::cursor::TokenCursor;
use crate::error::{Expected, ParseError, ParseErrorKind, SyntaxError};
use crate::lexer::{Tok, Token, TokenKind};

pub(crate) type PResult<T> = Result<T, SyntaxError>;

pub struct Parser<'src> {
    cursor: TokenCursor<'src>,
    config: ParseConfig,
    depth: u32,
}

impl<'src> Parser<'src> {
    pub fn new(src: &'src str) -> Self {
        Self::with_config(src, ParseConfig::default())
    }

    pub fn with_config(src: &'src str, config: ParseConfig) -> Self {
        Self {
            cursor: TokenCursor::new(src),
            config,
            depth: 0,
        }
    }

    pub fn config(&self) -> &ParseConfig {
        &self.config
    }

    // ===== Token helpers =====

    #[inline]
    pub(crate) fn peek_kind(&mut self) -> PResult<TokenKind> {
        Ok(self.cursor.peek_kind()?)
    }

    #[inline]
    pub(crate) fn at(&mut self, kind: TokenKind) -> PResult<bool> {
        Ok(self.peek_kind()? == kind)
    }

    #[inline]
    pub(crate) fn advance(&mut self) -> PResult<Token<'src>> {
        Ok(self.cursor.advance()?)
    }

    /// Consumes the current token when it has the given kind.
    pub(crate) fn eat(&mut self, kind: TokenKind) -> PResult<Option<Token<'src>>> {
        if self.at(kind)? {
            self.advance().map(Some)
        } else {
            Ok(None)
        }
    }

    pub(crate) fn expect(&mut self, kind: TokenKind) -> PResult<Token<'src>> {
        match self.eat(kind)? {
            Some(tok) => Ok(tok),
            None => Err(self.unexpected(Expected::token(kind))),
        }
    }

    /// Consumes `kind`, reporting the whole accepted set on failure.
    pub(crate) fn expect_one_of(
        &mut self,
        kind: TokenKind,
        accepted: &[TokenKind],
    ) -> PResult<Token<'src>> {
        match self.eat(kind)? {
            Some(tok) => Ok(tok),
            None => Err(self.unexpected(Expected::one_of(accepted))),
        }
    }

    pub(crate) fn expect_ident(&mut self) -> PResult<Spanned<Ident>> {
        let tok = self.expect(TokenKind::Ident)?;
        match tok.tok {
            Tok::Ident(name) => Ok(Spanned::new(Ident::new(name), tok.span, tok.pos)),
            _ => Err(error_at(&tok, ParseErrorKind::UnexpectedToken {
                found: tok.describe(),
                expected: Expected::token(TokenKind::Ident),
            })),
        }
    }

    /// Error for the current token not matching `expected`.
    pub(crate) fn unexpected(&mut self, expected: Expected) -> SyntaxError {
        match self.cursor.peek() {
            Err(err) => err.into(),
            Ok(tok) if tok.kind() == TokenKind::Eof => {
                error_at(tok, ParseErrorKind::UnexpectedEndOfInput { expected })
            }
            Ok(tok) => error_at(
                tok,
                ParseErrorKind::UnexpectedToken {
                    found: tok.describe(),
                    expected,
                },
            ),
        }
    }

    /// Error located at the current token.
    pub(crate) fn error_here(&mut self, kind: ParseErrorKind) -> SyntaxError {
        match self.cursor.peek() {
            Err(err) => err.into(),
            Ok(tok) => error_at(tok, kind),
        }
    }

    /// Takes one nesting level, failing with `NestingTooDeep` when the
    /// budget is spent. Callers give the level back with [`Parser::leave_to`].
    pub(crate) fn enter(&mut self) -> PResult<()> {
        if self.depth >= self.config.max_depth {
            let limit = self.config.max_depth;
            return Err(self.error_here(ParseErrorKind::NestingTooDeep { limit }));
        }
        self.depth += 1;
        Ok(())
    }

    #[inline]
    pub(crate) fn leave_to(&mut self, depth: u32) {
        self.depth = depth;
    }

    /// Runs one level of a recursive production, refusing to go deeper than
    /// `max_depth`.
    pub(crate) fn with_depth<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> PResult<T>,
    ) -> PResult<T> {
        let depth = self.depth;
        self.enter()?;
        let out = f(self);
        self.leave_to(depth);
        out
    }
}

fn error_at(tok: &Token<'_>, kind: ParseErrorKind) -> SyntaxError {
    ParseError::new(kind, tok.pos, tok.span).into()
}
