#![no_main]

use minigo_syntax::lexer::{Lexer, TokenKind};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let s = String::from_utf8_lossy(data);

    let mut last_real_end = 0u32;
    let mut prev_was_semi = false;
    let max_steps = s.len().saturating_mul(2) + 8;

    for (steps, item) in Lexer::new(&s).enumerate() {
        assert!(steps <= max_steps);

        let tok = match item {
            Ok(tok) => tok,
            Err(e) => {
                assert!(e.span.start <= e.span.end);
                assert!(e.span.end as usize <= s.len());
                break;
            }
        };

        assert!(tok.span.start <= tok.span.end);
        assert!(tok.span.end as usize <= s.len());
        assert!(tok.kind() != TokenKind::Eof);

        assert!(tok.span.start >= last_real_end);
        if tok.is_inserted_semi() {
            assert!(!prev_was_semi);
        } else {
            last_real_end = tok.span.end;
        }
        prev_was_semi = tok.kind() == TokenKind::Semi;
    }
});
