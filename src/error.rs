use std::fmt;

use smallvec::SmallVec;
use thiserror::Error;

use crate::lexer::TokenKind;

/// Compact byte-span used across the crate.
///
/// Offsets are stored as `u32`; inputs beyond 4GiB are clamped rather than
/// panicking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Span {
    pub start: u32,
    pub end: u32, // exclusive
}

impl Span {
    #[inline]
    pub const fn new(start: usize, end: usize) -> Self {
        Self {
            start: clamp_u32(start),
            end: clamp_u32(end),
        }
    }

    #[inline]
    pub const fn empty_at(pos: usize) -> Self {
        let p = clamp_u32(pos);
        Self { start: p, end: p }
    }

    pub const fn from_range(range: std::ops::Range<usize>) -> Self {
        Self::new(range.start, range.end)
    }

    #[inline]
    pub const fn len(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest span covering both `self` and `other`.
    #[inline]
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }
}

#[inline(always)]
const fn clamp_u32(x: usize) -> u32 {
    if x > u32::MAX as usize {
        u32::MAX
    } else {
        x as u32
    }
}

/// 1-based line/column of a token's first character. Columns count chars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pos {
    pub line: u32,
    pub column: u32,
}

impl Pos {
    pub const START: Pos = Pos { line: 1, column: 1 };

    #[inline]
    pub const fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

impl Default for Pos {
    fn default() -> Self {
        Self::START
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagKind {
    Lex,
    Parse,
}

/// Flat, formatter-friendly view of any error this crate produces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diag {
    pub kind: DiagKind,
    pub pos: Pos,
    pub span: Span,
    pub message: String,
}

// =============================================================================
// Lexical errors
// =============================================================================

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum LexErrorKind {
    #[error("unterminated string literal")]
    UnterminatedString,
    #[error("unterminated block comment")]
    UnterminatedComment,
    #[error("invalid character")]
    InvalidCharacter,
    #[error("invalid escape sequence")]
    InvalidEscape,
    #[error("invalid numeric literal")]
    InvalidNumber,
}

// logos reports unmatched input through the error type's default.
impl Default for LexErrorKind {
    #[inline]
    fn default() -> Self {
        LexErrorKind::InvalidCharacter
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{pos}: {kind}")]
pub struct LexError {
    pub kind: LexErrorKind,
    pub pos: Pos,
    pub span: Span,
}

impl LexError {
    #[inline]
    pub fn diag(&self) -> Diag {
        Diag {
            kind: DiagKind::Lex,
            pos: self.pos,
            span: self.span,
            message: self.kind.to_string(),
        }
    }
}

// =============================================================================
// Syntax errors
// =============================================================================

/// What the parser would have accepted at the failing position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expected {
    Tokens(SmallVec<[TokenKind; 4]>),
    Expression,
    TypeName,
}

impl Expected {
    pub fn token(kind: TokenKind) -> Self {
        Expected::Tokens(smallvec::smallvec![kind])
    }

    pub fn one_of(kinds: &[TokenKind]) -> Self {
        Expected::Tokens(SmallVec::from_slice(kinds))
    }

    /// True when `kind` is a member of the expected token set.
    pub fn contains(&self, kind: TokenKind) -> bool {
        match self {
            Expected::Tokens(set) => set.contains(&kind),
            Expected::Expression => kind.starts_expression(),
            Expected::TypeName => kind == TokenKind::Ident,
        }
    }
}

impl fmt::Display for Expected {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expected::Tokens(set) => match set.as_slice() {
                [] => f.write_str("nothing"),
                [one] => write!(f, "{one}"),
                many => {
                    f.write_str("one of ")?;
                    for (i, k) in many.iter().enumerate() {
                        if i > 0 {
                            f.write_str(", ")?;
                        }
                        write!(f, "{k}")?;
                    }
                    Ok(())
                }
            },
            Expected::Expression => f.write_str("expression"),
            Expected::TypeName => f.write_str("type name (int, float64, string)"),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken { found: String, expected: Expected },
    #[error("unexpected end of input, expected {expected}")]
    UnexpectedEndOfInput { expected: Expected },
    #[error("assignment target must be an identifier")]
    InvalidAssignmentTarget,
    #[error("invalid for clause: {reason}")]
    InvalidForClause { reason: &'static str },
    #[error("nesting deeper than {limit} levels")]
    NestingTooDeep { limit: u32 },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{pos}: {kind}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub pos: Pos,
    pub span: Span,
}

impl ParseError {
    #[inline]
    pub fn new(kind: ParseErrorKind, pos: Pos, span: Span) -> Self {
        Self { kind, pos, span }
    }

    #[inline]
    pub fn diag(&self) -> Diag {
        Diag {
            kind: DiagKind::Parse,
            pos: self.pos,
            span: self.span,
            message: self.kind.to_string(),
        }
    }
}

/// Any error that stops a parse: lexical errors surface through the parser
/// unchanged.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl SyntaxError {
    pub fn pos(&self) -> Pos {
        match self {
            SyntaxError::Lex(e) => e.pos,
            SyntaxError::Parse(e) => e.pos,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            SyntaxError::Lex(e) => e.span,
            SyntaxError::Parse(e) => e.span,
        }
    }

    pub fn diag(&self) -> Diag {
        match self {
            SyntaxError::Lex(e) => e.diag(),
            SyntaxError::Parse(e) => e.diag(),
        }
    }

    pub fn lex_kind(&self) -> Option<LexErrorKind> {
        match self {
            SyntaxError::Lex(e) => Some(e.kind),
            SyntaxError::Parse(_) => None,
        }
    }

    pub fn parse_kind(&self) -> Option<&ParseErrorKind> {
        match self {
            SyntaxError::Lex(_) => None,
            SyntaxError::Parse(e) => Some(&e.kind),
        }
    }
}

/// Result of a failed `parse_source`: never carries a partial tree.
#[derive(Debug, Clone)]
pub struct ParseFailure {
    pub source_name: String,
    pub errors: Vec<SyntaxError>,
}

impl ParseFailure {
    pub fn diags(&self) -> Vec<Diag> {
        self.errors.iter().map(SyntaxError::diag).collect()
    }
}

impl fmt::Display for ParseFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, d) in self.errors.iter().map(SyntaxError::diag).enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            let stage = match d.kind {
                DiagKind::Lex => "lexical",
                DiagKind::Parse => "syntax",
            };
            write!(f, "{}:{}: {stage} error: {}", self.source_name, d.pos, d.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseFailure {}
