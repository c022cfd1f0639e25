// tests/lexer_errors.rs
use minigo_syntax::error::{LexErrorKind, Pos, Span};
use minigo_syntax::lexer::{Lexer, Tok, TokenKind};
use minigo_syntax::{parse_source, tokenize};

fn first_error(input: &str) -> (LexErrorKind, Pos, Span) {
    match tokenize(input) {
        Ok(toks) => panic!("expected a lex error for <<{input}>>, got {} tokens", toks.len()),
        Err(e) => (e.kind, e.pos, e.span),
    }
}

#[test]
fn unterminated_string_at_eof() {
    let (kind, pos, span) = first_error("x := \"abc");
    assert_eq!(kind, LexErrorKind::UnterminatedString);
    assert_eq!(pos, Pos::new(1, 6));
    assert_eq!(span, Span::new(5, 9));
}

#[test]
fn unterminated_string_at_newline() {
    let (kind, pos, span) = first_error("s := \"abc\nfoo\"");
    assert_eq!(kind, LexErrorKind::UnterminatedString);
    assert_eq!(pos, Pos::new(1, 6));
    // the token stops before the newline
    assert_eq!(span, Span::new(5, 9));
}

#[test]
fn unterminated_block_comment() {
    let (kind, pos, _) = first_error("a\n/* never\nclosed");
    assert_eq!(kind, LexErrorKind::UnterminatedComment);
    assert_eq!(pos, Pos::new(2, 1));
}

#[test]
fn invalid_characters() {
    let cases = [
        ("a @ b", 3),
        ("x[0]", 2),
        ("a % b", 3),
        ("a & b", 3),
        ("a | b", 3),
        ("a : b", 3),
    ];
    for (src, col) in cases {
        let (kind, pos, _) = first_error(src);
        assert_eq!(kind, LexErrorKind::InvalidCharacter, "input {src:?}");
        assert_eq!(pos, Pos::new(1, col), "input {src:?}");
    }
}

#[test]
fn invalid_escapes() {
    for src in [r#""\q""#, r#""\x4""#, r#""\xZZ""#, r#""\8""#] {
        let (kind, _, _) = first_error(src);
        assert_eq!(kind, LexErrorKind::InvalidEscape, "input {src:?}");
    }
}

#[test]
fn valid_escapes_decode() {
    let toks = tokenize(r#""\n\r\t\v\a\b\f\\\"\'\x41""#).unwrap();
    let Tok::StringLit(s) = &toks[0].tok else {
        panic!("expected string, got {:?}", toks[0]);
    };
    assert_eq!(s.as_ref(), "\n\r\t\u{0B}\u{07}\u{08}\u{0C}\\\"'A");
}

#[test]
fn invalid_numbers() {
    let (kind, _, _) = first_error("99999999999999999999");
    assert_eq!(kind, LexErrorKind::InvalidNumber);
    let (kind, _, _) = first_error("1e999");
    assert_eq!(kind, LexErrorKind::InvalidNumber);
    assert!(tokenize("9223372036854775807").is_ok());
}

#[test]
fn leading_zero_integers_are_refused() {
    for src in ["010", "00", "0_1", "x := 007"] {
        let (kind, _, _) = first_error(src);
        assert_eq!(kind, LexErrorKind::InvalidNumber, "input {src:?}");
    }
    let (_, pos, span) = first_error("a + 012");
    assert_eq!(pos, Pos::new(1, 5));
    assert_eq!(span, Span::new(4, 7));

    let toks = tokenize("0 0.5 01.5 10").unwrap();
    assert_eq!(toks[0].tok, Tok::IntLit(0));
    assert_eq!(toks[1].tok, Tok::FloatLit(0.5));
    assert_eq!(toks[2].tok, Tok::FloatLit(1.5));
    assert_eq!(toks[3].tok, Tok::IntLit(10));
}

#[test]
fn raw_control_characters_in_strings() {
    for src in ["s := \"a\tb\"", "\"\x01\"", "\"\r\"", "\"open\x1f"] {
        let (kind, pos, _) = first_error(src);
        assert_eq!(kind, LexErrorKind::InvalidCharacter, "input {src:?}");
        assert_eq!(pos.line, 1, "input {src:?}");
    }
    let (_, pos, _) = first_error("s := \"a\tb\"");
    assert_eq!(pos, Pos::new(1, 6));

    // the escaped spelling is still fine, and a raw newline stays an unterminated string
    let toks = tokenize(r#""a\tb""#).unwrap();
    assert_eq!(toks[0].tok, Tok::StringLit("a\tb".into()));
    let (kind, _, _) = first_error("\"a\nb\"");
    assert_eq!(kind, LexErrorKind::UnterminatedString);
}

#[test]
fn tokens_before_the_error_are_delivered() {
    let mut lx = Lexer::new("a b $");
    assert_eq!(lx.next().unwrap().unwrap().kind(), TokenKind::Ident);
    assert_eq!(lx.next().unwrap().unwrap().kind(), TokenKind::Ident);
    assert!(lx.next().unwrap().is_err());
    // the stream ends after the error
    assert!(lx.next().is_none());
    // the underlying lexer keeps answering `Eof`
    assert_eq!(lx.next_token().unwrap().kind(), TokenKind::Eof);
}

#[test]
fn unterminated_string_yields_one_error_and_no_program() {
    let failure = parse_source("t.go", "func main() {\n\ts := \"abc\n}\n").unwrap_err();
    assert_eq!(failure.errors.len(), 1);
    assert_eq!(
        failure.errors[0].lex_kind(),
        Some(LexErrorKind::UnterminatedString)
    );
    assert_eq!(failure.errors[0].pos(), Pos::new(2, 7));
}

#[test]
fn lex_error_is_reported_even_with_recovery() {
    use minigo_syntax::{parse_source_with, ParseConfig};
    let cfg = ParseConfig::default().with_recovery(true);
    let src = "func a() { x = \n}\nfunc b() { y := \"open\n}\nfunc c() {}\n";
    let failure = parse_source_with("t.go", src, &cfg).unwrap_err();
    // the syntax error in `a`, then the lexical error in `b` ends the parse
    assert_eq!(failure.errors.len(), 2);
    assert!(failure.errors[0].parse_kind().is_some());
    assert_eq!(
        failure.errors[1].lex_kind(),
        Some(LexErrorKind::UnterminatedString)
    );
}
