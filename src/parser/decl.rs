//! Top level: optional package clause, function declarations, parameter
//! groups and result clauses.

use tracing::debug;

use super::{PResult, Parser};
use crate::ast::{FuncDecl, Ident, Param, Program, Spanned, Type};
use crate::error::{Expected, SyntaxError};
use crate::lexer::{Tok, TokenKind};

const AFTER_DECL: &[TokenKind] = &[TokenKind::Semi, TokenKind::Eof];

impl<'src> Parser<'src> {
    /// Parses a whole source unit.
    ///
    /// Without recovery the first error ends the parse. With
    /// `recover_top_level` a syntax error inside a declaration is recorded and
    /// parsing resumes at the next `func`; lexical errors always end it.
    pub fn parse_program(&mut self) -> Result<Program, Vec<SyntaxError>> {
        let mut program = Program::default();
        let mut errors = Vec::new();

        match self.parse_package_clause() {
            Ok(package) => program.package = package,
            Err(err) => {
                let fatal = !self.config.recover_top_level || err.lex_kind().is_some();
                errors.push(err);
                if fatal || self.skip_to_func(&mut errors) {
                    return Err(errors);
                }
            }
        }

        loop {
            match self.parse_top_level_item() {
                Ok(Some(func)) => program.funcs.push(func),
                Ok(None) => break,
                Err(err) => {
                    let fatal = !self.config.recover_top_level || err.lex_kind().is_some();
                    errors.push(err);
                    if fatal || self.skip_to_func(&mut errors) {
                        break;
                    }
                }
            }
        }

        if errors.is_empty() {
            Ok(program)
        } else {
            Err(errors)
        }
    }

    /// Skips to the next `func` keyword. Returns `true` when nothing is left
    /// to parse.
    fn skip_to_func(&mut self, errors: &mut Vec<SyntaxError>) -> bool {
        let mut skipped = 0usize;
        loop {
            match self.cursor.peek_kind() {
                Ok(TokenKind::Eof) => return true,
                Ok(TokenKind::KwFunc) => {
                    let resume = self.cursor.peek().map(|t| t.pos).unwrap_or_default();
                    debug!(skipped, line = resume.line, "resuming at next declaration");
                    return false;
                }
                Ok(_) => {}
                Err(err) => {
                    errors.push(err.into());
                    return true;
                }
            }
            if let Err(err) = self.cursor.advance() {
                errors.push(err.into());
                return true;
            }
            skipped += 1;
        }
    }

    fn skip_terminators(&mut self) -> PResult<()> {
        while self.eat(TokenKind::Semi)?.is_some() {}
        Ok(())
    }

    fn parse_package_clause(&mut self) -> PResult<Option<Spanned<Ident>>> {
        self.skip_terminators()?;
        if self.eat(TokenKind::KwPackage)?.is_none() {
            return Ok(None);
        }
        let name = self.expect_ident()?;
        if !self.at(TokenKind::Eof)? {
            self.expect_one_of(TokenKind::Semi, AFTER_DECL)?;
        }
        Ok(Some(name))
    }

    /// Next function declaration, or `None` at end of input.
    fn parse_top_level_item(&mut self) -> PResult<Option<Spanned<FuncDecl>>> {
        self.skip_terminators()?;
        match self.peek_kind()? {
            TokenKind::Eof => Ok(None),
            TokenKind::KwFunc => {
                let func = self.parse_function_decl()?;
                if !self.at(TokenKind::Eof)? {
                    self.expect_one_of(TokenKind::Semi, AFTER_DECL)?;
                }
                Ok(Some(func))
            }
            _ => Err(self.unexpected(Expected::token(TokenKind::KwFunc))),
        }
    }

    /// `func name ( params ) [results] { body }`
    pub fn parse_function_decl(&mut self) -> PResult<Spanned<FuncDecl>> {
        let kw = self.expect(TokenKind::KwFunc)?;
        let name = self.expect_ident()?;
        let params = self.parse_params()?;
        let results = self.parse_results()?;
        let body = self.parse_block()?;

        let span = kw.span.to(body.span);
        Ok(Spanned::new(
            FuncDecl {
                name,
                params,
                results,
                body,
            },
            span,
            kw.pos,
        ))
    }

    /// `( [name {, name} type {, name {, name} type}] [,] )`
    ///
    /// Names without their own type share the next type written: `a, b int`
    /// declares two `int` parameters.
    fn parse_params(&mut self) -> PResult<Vec<Spanned<Param>>> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        let mut pending: Vec<Spanned<Ident>> = Vec::new();

        while self.at(TokenKind::Ident)? {
            let name = self.expect_ident()?;
            if self.at(TokenKind::Ident)? {
                let typ = self.parse_type()?;
                for name in pending.drain(..).chain(std::iter::once(name)) {
                    let span = name.span.to(typ.span);
                    let pos = name.pos;
                    params.push(Spanned::new(
                        Param {
                            name,
                            typ: typ.clone(),
                        },
                        span,
                        pos,
                    ));
                }
            } else {
                pending.push(name);
            }

            if self.eat(TokenKind::Comma)?.is_none() {
                break;
            }
        }

        if !pending.is_empty() {
            return Err(self.unexpected(Expected::TypeName));
        }
        self.expect_one_of(TokenKind::RParen, &[TokenKind::Comma, TokenKind::RParen])?;
        Ok(params)
    }

    /// Nothing, a bare type, or a parenthesised type list.
    fn parse_results(&mut self) -> PResult<Vec<Spanned<Type>>> {
        match self.peek_kind()? {
            TokenKind::Ident => Ok(vec![self.parse_type()?]),
            TokenKind::LParen => {
                self.advance()?;
                let mut results = Vec::new();
                while !self.at(TokenKind::RParen)? {
                    results.push(self.parse_type()?);
                    if self.eat(TokenKind::Comma)?.is_none() {
                        break;
                    }
                }
                self.expect_one_of(TokenKind::RParen, &[TokenKind::Comma, TokenKind::RParen])?;
                Ok(results)
            }
            _ => Ok(Vec::new()),
        }
    }

    pub(crate) fn parse_type(&mut self) -> PResult<Spanned<Type>> {
        let typ = match &self.cursor.peek()?.tok {
            Tok::Ident(name) => Type::from_name(name),
            _ => None,
        };
        let Some(typ) = typ else {
            return Err(self.unexpected(Expected::TypeName));
        };
        let tok = self.advance()?;
        Ok(Spanned::new(typ, tok.span, tok.pos))
    }
}
