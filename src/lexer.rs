use std::borrow::Cow;
use std::fmt;

use logos::{Lexer as LogosLexer, Logos, Skip};
use tracing::trace;

use crate::error::{LexError, LexErrorKind, Pos, Span};

// =============================================================================
// 0. Shared helpers
// =============================================================================

// One canonical hex LUT, shared by escape validation and decoding.
pub const HEX_LUT: [u8; 256] = {
    let mut t = [0xFFu8; 256];

    let mut i = b'0';
    while i <= b'9' {
        t[i as usize] = i - b'0';
        i += 1;
    }

    let mut i = b'a';
    while i <= b'f' {
        t[i as usize] = (i - b'a') + 10;
        i += 1;
    }

    let mut i = b'A';
    while i <= b'F' {
        t[i as usize] = (i - b'A') + 10;
        i += 1;
    }

    t
};

#[inline(always)]
pub const fn is_hex_digit(b: u8) -> bool {
    HEX_LUT[b as usize] != 0xFF
}

#[inline(always)]
pub const fn hex_value(b: u8) -> u8 {
    HEX_LUT[b as usize]
}

/// Single-character escapes accepted inside string literals.
#[inline(always)]
const fn simple_escape(b: u8) -> Option<char> {
    match b {
        b'n' => Some('\n'),
        b'r' => Some('\r'),
        b't' => Some('\t'),
        b'v' => Some('\u{0B}'),
        b'a' => Some('\u{07}'),
        b'b' => Some('\u{08}'),
        b'f' => Some('\u{0C}'),
        b'\\' => Some('\\'),
        b'"' => Some('"'),
        b'\'' => Some('\''),
        _ => None,
    }
}

// =============================================================================
// 1. Comment scanners
// =============================================================================

fn skip_line_comment(lex: &mut LogosLexer<'_, RawTok>) -> Skip {
    // Stop before the newline so it still drives terminator insertion.
    let rem = lex.remainder().as_bytes();
    let end = memchr::memchr(b'\n', rem).unwrap_or(rem.len());
    lex.bump(end);
    Skip
}

fn lex_block_comment(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let rem = lex.remainder().as_bytes();
    let mut search_start = 0;

    while let Some(star_pos) = memchr::memchr(b'*', &rem[search_start..]) {
        let abs_pos = search_start + star_pos;
        if rem.get(abs_pos + 1) == Some(&b'/') {
            lex.bump(abs_pos + 2);
            return Ok(());
        }
        search_start = abs_pos + 1;
    }

    lex.bump(rem.len());
    Err(LexErrorKind::UnterminatedComment)
}

// =============================================================================
// 2. String literal scanner (quote matching + escape validation)
// =============================================================================

/// Extends the token from the opening quote through the closing one.
///
/// A raw newline or end of input before the closing quote is an unterminated
/// literal; the token then stops right before the newline. Any other byte
/// below `0x20` is an invalid character.
fn lex_string(lex: &mut LogosLexer<'_, RawTok>) -> Result<(), LexErrorKind> {
    let rem = lex.remainder().as_bytes();
    let mut i = 0;

    while let Some(off) = memchr::memchr3(b'"', b'\\', b'\n', &rem[i..]) {
        let at = i + off;
        // raw control characters must be written as escapes
        if let Some(ctl) = rem[i..at].iter().position(|&b| b < 0x20) {
            lex.bump(i + ctl);
            return Err(LexErrorKind::InvalidCharacter);
        }
        match rem[at] {
            b'"' => {
                lex.bump(at + 1);
                return Ok(());
            }
            b'\n' => {
                lex.bump(at);
                return Err(LexErrorKind::UnterminatedString);
            }
            _ => {
                let Some(&esc) = rem.get(at + 1) else {
                    lex.bump(rem.len());
                    return Err(LexErrorKind::UnterminatedString);
                };
                if esc == b'x' {
                    let ok = matches!(
                        (rem.get(at + 2), rem.get(at + 3)),
                        (Some(&h1), Some(&h2)) if is_hex_digit(h1) && is_hex_digit(h2)
                    );
                    if !ok {
                        lex.bump((at + 2).min(rem.len()));
                        return Err(LexErrorKind::InvalidEscape);
                    }
                    i = at + 4;
                } else if simple_escape(esc).is_some() {
                    i = at + 2;
                } else {
                    // `\` followed by a raw newline is still a broken literal.
                    if esc == b'\n' {
                        lex.bump(at + 1);
                        return Err(LexErrorKind::UnterminatedString);
                    }
                    lex.bump(at + 1);
                    return Err(LexErrorKind::InvalidEscape);
                }
            }
        }
    }

    if let Some(ctl) = rem[i..].iter().position(|&b| b < 0x20) {
        lex.bump(i + ctl);
        return Err(LexErrorKind::InvalidCharacter);
    }
    lex.bump(rem.len());
    Err(LexErrorKind::UnterminatedString)
}

/// Decodes the body of an already validated string literal (quotes excluded).
///
/// Borrows from the source when the body has no escapes. `\xHH` decodes to
/// the code point `U+00HH`.
fn decode_string(body: &str) -> Cow<'_, str> {
    if !body.contains('\\') {
        return Cow::Borrowed(body);
    }

    let bytes = body.as_bytes();
    let mut out = String::with_capacity(body.len());
    let mut run_start = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'\\' {
            i += 1;
            continue;
        }
        out.push_str(&body[run_start..i]);
        let esc = bytes.get(i + 1).copied().unwrap_or(b'\\');
        if esc == b'x' {
            let hi = bytes.get(i + 2).map_or(0, |&b| hex_value(b));
            let lo = bytes.get(i + 3).map_or(0, |&b| hex_value(b));
            out.push(char::from((hi << 4) | lo));
            i += 4;
        } else {
            out.push(simple_escape(esc).unwrap_or(esc as char));
            i += 2;
        }
        run_start = i.min(bytes.len());
    }
    out.push_str(&body[run_start..]);

    Cow::Owned(out)
}

// =============================================================================
// 3. Raw token definition (logos DFA)
// =============================================================================

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(error = LexErrorKind)]
#[logos(skip r"[ \t\r\x0B\x0C]+")]
#[rustfmt::skip]
enum RawTok {
    // Trivia
    #[token("\n")] Newline,
    #[token("//", skip_line_comment)] _LineComment,
    #[token("/*", lex_block_comment)] BlockComment,

    // Keywords (before Ident)
    #[token("else")] KwElse,
    #[token("for")] KwFor,
    #[token("func")] KwFunc,
    #[token("if")] KwIf,
    #[token("package")] KwPackage,
    #[token("return")] KwReturn,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")] Ident,

    // Numbers: decimal only, `_` between digits
    #[regex(r"[0-9](_?[0-9])*")] Int,
    #[regex(r"[0-9](_?[0-9])*\.[0-9](_?[0-9])*([eE][+-]?[0-9](_?[0-9])*)?")]
    #[regex(r"[0-9](_?[0-9])*[eE][+-]?[0-9](_?[0-9])*")]
    Float,

    #[token("\"", lex_string)] Str,

    // Operators
    #[token("&&")] LAnd,
    #[token("||")] LOr,
    #[token("==")] EqEq,
    #[token("!=")] NotEq,
    #[token("<=")] Le,
    #[token(">=")] Ge,
    #[token(":=")] Define,
    #[token("=")] Assign,
    #[token("+")] Plus,
    #[token("-")] Minus,
    #[token("*")] Star,
    #[token("/")] Slash,
    #[token("^")] Caret,
    #[token("!")] Bang,
    #[token("<")] Lt,
    #[token(">")] Gt,

    // Delimiters
    #[token("(")] LParen,
    #[token(")")] RParen,
    #[token("{")] LBrace,
    #[token("}")] RBrace,
    #[token(",")] Comma,
    #[token(";")] Semi,
}

impl RawTok {
    /// Tokens after which a newline terminates the statement.
    #[inline(always)]
    const fn can_insert_semicolon(self) -> bool {
        matches!(
            self,
            RawTok::Ident
                | RawTok::Int
                | RawTok::Float
                | RawTok::Str
                | RawTok::KwReturn
                | RawTok::RParen
                | RawTok::RBrace
        )
    }

    /// Maps payload-free raw tokens 1:1. Literals are built by the wrapper.
    #[inline]
    fn to_simple<'src>(self) -> Option<Tok<'src>> {
        macro_rules! simple_tok {
            ($($raw:ident => $tok:ident),* $(,)?) => {
                match self {
                    $(Self::$raw => Some(Tok::$tok),)*
                    _ => None,
                }
            };
        }

        simple_tok! {
            KwElse => KwElse, KwFor => KwFor, KwFunc => KwFunc, KwIf => KwIf,
            KwPackage => KwPackage, KwReturn => KwReturn,

            LAnd => LAnd, LOr => LOr, EqEq => EqEq, NotEq => NotEq, Le => Le, Ge => Ge,
            Define => Define, Assign => Assign, Plus => Plus, Minus => Minus, Star => Star,
            Slash => Slash, Caret => Caret, Bang => Bang, Lt => Lt, Gt => Gt,

            LParen => LParen, RParen => RParen, LBrace => LBrace, RBrace => RBrace,
            Comma => Comma, Semi => Semi,
        }
    }
}

// =============================================================================
// 4. Public tokens
// =============================================================================

/// Token payloads. Identifiers and escape-free strings borrow from the source.
#[derive(Debug, Clone, PartialEq)]
pub enum Tok<'src> {
    Ident(&'src str),
    IntLit(i64),
    FloatLit(f64),
    StringLit(Cow<'src, str>),

    // Keywords
    KwElse,
    KwFor,
    KwFunc,
    KwIf,
    KwPackage,
    KwReturn,

    // Operators
    LAnd,
    LOr,
    EqEq,
    NotEq,
    Le,
    Ge,
    Define,
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Bang,
    Lt,
    Gt,

    // Delimiters
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    /// Explicit `;` or a terminator inserted at a newline.
    Semi,

    Eof,
}

/// Payload-free token classification, used for lookahead decisions and in
/// "expected ..." diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Ident,
    IntLit,
    FloatLit,
    StringLit,
    KwElse,
    KwFor,
    KwFunc,
    KwIf,
    KwPackage,
    KwReturn,
    LAnd,
    LOr,
    EqEq,
    NotEq,
    Le,
    Ge,
    Define,
    Assign,
    Plus,
    Minus,
    Star,
    Slash,
    Caret,
    Bang,
    Lt,
    Gt,
    LParen,
    RParen,
    LBrace,
    RBrace,
    Comma,
    Semi,
    Eof,
}

impl TokenKind {
    /// Source text of keyword and punctuation kinds.
    pub const fn symbol(self) -> Option<&'static str> {
        Some(match self {
            TokenKind::KwElse => "else",
            TokenKind::KwFor => "for",
            TokenKind::KwFunc => "func",
            TokenKind::KwIf => "if",
            TokenKind::KwPackage => "package",
            TokenKind::KwReturn => "return",
            TokenKind::LAnd => "&&",
            TokenKind::LOr => "||",
            TokenKind::EqEq => "==",
            TokenKind::NotEq => "!=",
            TokenKind::Le => "<=",
            TokenKind::Ge => ">=",
            TokenKind::Define => ":=",
            TokenKind::Assign => "=",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Caret => "^",
            TokenKind::Bang => "!",
            TokenKind::Lt => "<",
            TokenKind::Gt => ">",
            TokenKind::LParen => "(",
            TokenKind::RParen => ")",
            TokenKind::LBrace => "{",
            TokenKind::RBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semi => ";",
            TokenKind::Ident
            | TokenKind::IntLit
            | TokenKind::FloatLit
            | TokenKind::StringLit
            | TokenKind::Eof => return None,
        })
    }

    pub const fn is_keyword(self) -> bool {
        matches!(
            self,
            TokenKind::KwElse
                | TokenKind::KwFor
                | TokenKind::KwFunc
                | TokenKind::KwIf
                | TokenKind::KwPackage
                | TokenKind::KwReturn
        )
    }

    pub const fn is_literal(self) -> bool {
        matches!(
            self,
            TokenKind::IntLit | TokenKind::FloatLit | TokenKind::StringLit
        )
    }

    /// Kinds that may begin an expression.
    pub const fn starts_expression(self) -> bool {
        matches!(
            self,
            TokenKind::Ident
                | TokenKind::IntLit
                | TokenKind::FloatLit
                | TokenKind::StringLit
                | TokenKind::LParen
                | TokenKind::Plus
                | TokenKind::Minus
                | TokenKind::Bang
                | TokenKind::Caret
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident => f.write_str("identifier"),
            TokenKind::IntLit => f.write_str("integer literal"),
            TokenKind::FloatLit => f.write_str("float literal"),
            TokenKind::StringLit => f.write_str("string literal"),
            TokenKind::Eof => f.write_str("end of input"),
            TokenKind::Semi => f.write_str("`;` or newline"),
            other => match other.symbol() {
                Some(sym) => write!(f, "`{sym}`"),
                None => write!(f, "{other:?}"),
            },
        }
    }
}

impl<'src> Tok<'src> {
    pub fn kind(&self) -> TokenKind {
        match self {
            Tok::Ident(_) => TokenKind::Ident,
            Tok::IntLit(_) => TokenKind::IntLit,
            Tok::FloatLit(_) => TokenKind::FloatLit,
            Tok::StringLit(_) => TokenKind::StringLit,
            Tok::KwElse => TokenKind::KwElse,
            Tok::KwFor => TokenKind::KwFor,
            Tok::KwFunc => TokenKind::KwFunc,
            Tok::KwIf => TokenKind::KwIf,
            Tok::KwPackage => TokenKind::KwPackage,
            Tok::KwReturn => TokenKind::KwReturn,
            Tok::LAnd => TokenKind::LAnd,
            Tok::LOr => TokenKind::LOr,
            Tok::EqEq => TokenKind::EqEq,
            Tok::NotEq => TokenKind::NotEq,
            Tok::Le => TokenKind::Le,
            Tok::Ge => TokenKind::Ge,
            Tok::Define => TokenKind::Define,
            Tok::Assign => TokenKind::Assign,
            Tok::Plus => TokenKind::Plus,
            Tok::Minus => TokenKind::Minus,
            Tok::Star => TokenKind::Star,
            Tok::Slash => TokenKind::Slash,
            Tok::Caret => TokenKind::Caret,
            Tok::Bang => TokenKind::Bang,
            Tok::Lt => TokenKind::Lt,
            Tok::Gt => TokenKind::Gt,
            Tok::LParen => TokenKind::LParen,
            Tok::RParen => TokenKind::RParen,
            Tok::LBrace => TokenKind::LBrace,
            Tok::RBrace => TokenKind::RBrace,
            Tok::Comma => TokenKind::Comma,
            Tok::Semi => TokenKind::Semi,
            Tok::Eof => TokenKind::Eof,
        }
    }
}

impl fmt::Display for Tok<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tok::Ident(name) => f.write_str(name),
            Tok::IntLit(v) => write!(f, "{v}"),
            Tok::FloatLit(v) => write!(f, "{v:?}"),
            Tok::StringLit(s) => write!(f, "{s:?}"),
            other => match other.kind().symbol() {
                Some(sym) => f.write_str(sym),
                None => f.write_str("EOF"),
            },
        }
    }
}

/// A token with its byte span and the line/column of its first character.
#[derive(Debug, Clone, PartialEq)]
pub struct Token<'src> {
    pub tok: Tok<'src>,
    pub span: Span,
    pub pos: Pos,
}

impl<'src> Token<'src> {
    #[inline]
    pub fn kind(&self) -> TokenKind {
        self.tok.kind()
    }

    /// Terminators synthesized at a newline have an empty span.
    #[inline]
    pub fn is_inserted_semi(&self) -> bool {
        matches!(self.tok, Tok::Semi) && self.span.is_empty()
    }

    /// Short human description for "unexpected ..." diagnostics.
    pub fn describe(&self) -> String {
        match &self.tok {
            Tok::Ident(name) => format!("identifier `{name}`"),
            Tok::IntLit(v) => format!("integer literal `{v}`"),
            Tok::FloatLit(v) => format!("float literal `{v:?}`"),
            Tok::StringLit(_) => "string literal".to_string(),
            Tok::Semi if self.is_inserted_semi() => "newline".to_string(),
            Tok::Eof => "end of input".to_string(),
            other if other.kind().is_keyword() => format!("keyword {}", other.kind()),
            other => other.kind().to_string(),
        }
    }
}

// =============================================================================
// 5. Lexer wrapper: terminator insertion + positions + literal values
// =============================================================================

pub struct Lexer<'src> {
    logos: LogosLexer<'src, RawTok>,
    src: &'src str,
    last_can_insert_semi: bool,
    line: u32,
    line_start: usize,
    /// Byte offset and column of the last position handed out on the
    /// current line; the next one is counted forward from here.
    last_col: (usize, u32),
    finished: bool,
    yielded_end: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(input: &'src str) -> Self {
        Self {
            logos: RawTok::lexer(input),
            src: input,
            last_can_insert_semi: false,
            line: 1,
            line_start: 0,
            last_col: (0, 1),
            finished: false,
            yielded_end: false,
        }
    }

    /// Produces the next token. Returns `Tok::Eof` forever once the input is
    /// exhausted or after the first error.
    pub fn next_token(&mut self) -> Result<Token<'src>, LexError> {
        loop {
            if self.finished {
                return Ok(self.token_at(Tok::Eof, Span::empty_at(self.src.len())));
            }

            match self.logos.next() {
                None => {
                    self.finished = true;
                    if self.last_can_insert_semi {
                        self.last_can_insert_semi = false;
                        return Ok(self.inserted_semi(self.src.len()));
                    }
                }
                Some(Err(kind)) => {
                    let span = Span::from_range(self.logos.span());
                    let pos = self.pos_at(span.start as usize);
                    self.finished = true;
                    self.last_can_insert_semi = false;
                    return Err(LexError { kind, pos, span });
                }
                Some(Ok(raw)) => {
                    if let Some(tok) = self.handle_raw_token(raw)? {
                        return Ok(tok);
                    }
                }
            }
        }
    }

    fn pos_at(&mut self, offset: usize) -> Pos {
        let (from, col) = match self.last_col {
            (at, col) if at >= self.line_start && at <= offset => (at, col),
            _ => (self.line_start, 1),
        };
        let ahead = self.src.get(from..offset).map_or(0, |s| s.chars().count());
        let col = col.saturating_add(ahead as u32);
        self.last_col = (offset, col);
        Pos::new(self.line, col)
    }

    #[inline]
    fn token_at(&mut self, tok: Tok<'src>, span: Span) -> Token<'src> {
        let pos = self.pos_at(span.start as usize);
        Token { tok, span, pos }
    }

    #[inline]
    fn inserted_semi(&mut self, at: usize) -> Token<'src> {
        let tok = self.token_at(Tok::Semi, Span::empty_at(at));
        trace!(line = tok.pos.line, column = tok.pos.column, "inserted terminator");
        tok
    }

    #[inline]
    fn start_line(&mut self, line_start: usize, newlines: usize) {
        self.line = self.line.saturating_add(newlines as u32);
        self.line_start = line_start;
    }

    fn handle_raw_token(&mut self, raw: RawTok) -> Result<Option<Token<'src>>, LexError> {
        let range = self.logos.span();
        let span = Span::from_range(range.clone());
        let slice = self.logos.slice();

        match raw {
            RawTok::Newline => {
                let semi = self.take_insertion(range.start);
                self.start_line(range.end, 1);
                Ok(semi)
            }
            RawTok::BlockComment => {
                let Some(first_nl) = memchr::memchr(b'\n', slice.as_bytes()) else {
                    return Ok(None);
                };
                let semi = self.take_insertion(range.start + first_nl);
                let newlines = memchr::memchr_iter(b'\n', slice.as_bytes()).count();
                let last_nl = memchr::memrchr(b'\n', slice.as_bytes()).unwrap_or(first_nl);
                self.start_line(range.start + last_nl + 1, newlines);
                Ok(semi)
            }
            // skipped by its callback
            RawTok::_LineComment => Ok(None),
            RawTok::Ident => Ok(Some(self.emit(raw, Tok::Ident(slice), span))),
            RawTok::Int => {
                // `010` would read as octal in Go; only a lone `0` may start with zero
                let value = Some(slice)
                    .filter(|s| s.len() == 1 || !s.starts_with('0'))
                    .and_then(parse_digits::<i64>)
                    .ok_or_else(|| self.error_at(LexErrorKind::InvalidNumber, span))?;
                Ok(Some(self.emit(raw, Tok::IntLit(value), span)))
            }
            RawTok::Float => {
                let value = parse_digits::<f64>(slice)
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| self.error_at(LexErrorKind::InvalidNumber, span))?;
                Ok(Some(self.emit(raw, Tok::FloatLit(value), span)))
            }
            RawTok::Str => {
                let body = &slice[1..slice.len() - 1];
                Ok(Some(self.emit(raw, Tok::StringLit(decode_string(body)), span)))
            }
            other => match other.to_simple() {
                Some(tok) => Ok(Some(self.emit(raw, tok, span))),
                None => Err(self.error_at(LexErrorKind::InvalidCharacter, span)),
            },
        }
    }

    #[inline]
    fn take_insertion(&mut self, at: usize) -> Option<Token<'src>> {
        if !self.last_can_insert_semi {
            return None;
        }
        self.last_can_insert_semi = false;
        Some(self.inserted_semi(at))
    }

    #[inline]
    fn emit(&mut self, raw: RawTok, tok: Tok<'src>, span: Span) -> Token<'src> {
        self.last_can_insert_semi = raw.can_insert_semicolon();
        self.token_at(tok, span)
    }

    fn error_at(&mut self, kind: LexErrorKind, span: Span) -> LexError {
        self.finished = true;
        self.last_can_insert_semi = false;
        LexError {
            kind,
            pos: self.pos_at(span.start as usize),
            span,
        }
    }
}

/// Parses a decimal literal, ignoring digit separators.
fn parse_digits<T: std::str::FromStr>(slice: &str) -> Option<T> {
    if slice.contains('_') {
        slice.replace('_', "").parse().ok()
    } else {
        slice.parse().ok()
    }
}

/// Yields every token up to (excluding) `Tok::Eof`; an error is yielded once
/// and ends the stream.
impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token<'src>, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.yielded_end {
            return None;
        }
        match self.next_token() {
            Ok(tok) if matches!(tok.tok, Tok::Eof) => {
                self.yielded_end = true;
                None
            }
            Ok(tok) => Some(Ok(tok)),
            Err(e) => {
                self.yielded_end = true;
                Some(Err(e))
            }
        }
    }
}
