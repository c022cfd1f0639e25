use std::collections::VecDeque;

use crate::error::{LexError, Span};
use crate::lexer::{Lexer, Token, TokenKind};

/// Deepest lookahead the parser ever asks for.
pub const LOOKAHEAD: usize = 2;

/// Two-token lookahead over a [`Lexer`].
///
/// The first lexical error is stored: tokens buffered before it are still
/// handed out, after that every `peek`/`advance` reports the same error.
pub struct TokenCursor<'src> {
    lexer: Lexer<'src>,
    buf: VecDeque<Token<'src>>,
    error: Option<LexError>,
    last_span: Span,
}

impl<'src> TokenCursor<'src> {
    pub fn new(src: &'src str) -> Self {
        Self::from_lexer(Lexer::new(src))
    }

    pub fn from_lexer(lexer: Lexer<'src>) -> Self {
        Self {
            lexer,
            buf: VecDeque::with_capacity(LOOKAHEAD),
            error: None,
            last_span: Span::default(),
        }
    }

    fn fill(&mut self, n: usize) -> Result<(), LexError> {
        debug_assert!(n <= LOOKAHEAD, "lookahead of {n} tokens requested");
        while self.buf.len() < n {
            if let Some(err) = &self.error {
                return Err(err.clone());
            }
            match self.lexer.next_token() {
                Ok(tok) => self.buf.push_back(tok),
                Err(err) => {
                    self.error = Some(err.clone());
                    return Err(err);
                }
            }
        }
        Ok(())
    }

    /// Current token, not consumed.
    #[inline]
    pub fn peek(&mut self) -> Result<&Token<'src>, LexError> {
        self.peek_nth(0)
    }

    /// Token `k` positions ahead (`k < LOOKAHEAD`), not consumed.
    pub fn peek_nth(&mut self, k: usize) -> Result<&Token<'src>, LexError> {
        self.fill(k + 1)?;
        Ok(&self.buf[k])
    }

    #[inline]
    pub fn peek_kind(&mut self) -> Result<TokenKind, LexError> {
        self.peek().map(Token::kind)
    }

    /// Consumes and returns the current token. At end of input this keeps
    /// returning `Eof`.
    pub fn advance(&mut self) -> Result<Token<'src>, LexError> {
        self.fill(1)?;
        let tok = self.buf.pop_front();
        match tok {
            Some(tok) => {
                // inserted terminators and `Eof` cover no source text
                if !tok.span.is_empty() {
                    self.last_span = tok.span;
                }
                Ok(tok)
            }
            // `fill(1)` guarantees a buffered token
            None => self.lexer.next_token(),
        }
    }

    /// Span of the most recently consumed token that covers source text.
    #[inline]
    pub fn last_span(&self) -> Span {
        self.last_span
    }

    /// The stored lexical error, if scanning has failed.
    pub fn lex_error(&self) -> Option<&LexError> {
        self.error.as_ref()
    }
}
