//! Lexer and parser for a small Go-like language.
//!
//! - The lexer is generated with Logos and inserts statement terminators at
//!   newlines the way Go does.
//! - The parser is hand-written recursive descent with precedence climbing
//!   for expressions, and returns an owned, span-annotated tree.

pub mod ast;
pub mod config;
pub mod cursor;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod printer;
pub mod walk;

// Re-exports for convenience
pub use config::ParseConfig;
pub use lexer::Lexer;
pub use parser::Parser;

use tracing::debug;

use crate::ast::{Expr, Program, Spanned};
use crate::error::{Expected, LexError, ParseFailure, SyntaxError};
use crate::lexer::{Token, TokenKind};

/// Parses a source file with the default configuration.
///
/// `name` is only used to label diagnostics.
pub fn parse_source(name: &str, text: &str) -> Result<Program, ParseFailure> {
    parse_source_with(name, text, &ParseConfig::default())
}

pub fn parse_source_with(
    name: &str,
    text: &str,
    config: &ParseConfig,
) -> Result<Program, ParseFailure> {
    debug!(source = name, bytes = text.len(), "parse start");
    let mut parser = Parser::with_config(text, *config);
    match parser.parse_program() {
        Ok(program) => {
            debug!(source = name, funcs = program.funcs.len(), "parse finished");
            Ok(program)
        }
        Err(errors) => {
            debug!(source = name, errors = errors.len(), "parse failed");
            Err(ParseFailure {
                source_name: name.to_string(),
                errors,
            })
        }
    }
}

/// Parses `text` as exactly one expression.
pub fn parse_expr(text: &str) -> Result<Spanned<Expr>, SyntaxError> {
    let mut parser = Parser::new(text);
    let expr = parser.parse_expression()?;
    // the terminator inserted at end of input is allowed
    parser.eat(TokenKind::Semi)?;
    if !parser.at(TokenKind::Eof)? {
        return Err(parser.unexpected(Expected::token(TokenKind::Eof)));
    }
    Ok(expr)
}

/// Scans the whole input, inserted terminators included.
pub fn tokenize(text: &str) -> Result<Vec<Token<'_>>, LexError> {
    Lexer::new(text).collect()
}
