// src/bin/hot_parse.rs
//
// Spins on lexing or parsing a fixed corpus for a fixed time; meant to be run
// under a profiler.
use minigo_syntax::lexer::{Lexer, Tok};
use minigo_syntax::parse_source;
use std::hint::black_box as bb;
use std::time::{Duration, Instant};

const SMALL: &str = r#"
package main
func main() { println("Hello, World!") }
"#;

const MEDIUM: &str = include_str!("../../tests/fixtures/calc.go");

const LARGE: &str = include_str!("../../tests/fixtures/syntax.go");

// ----------------- arg parsing -----------------

fn arg_value<'a>(args: &'a [String], key: &str) -> Option<&'a str> {
    let mut it = args.iter();
    while let Some(a) = it.next() {
        if a == key {
            return it.next().map(|s| s.as_str());
        }
    }
    None
}

fn arg_usize(args: &[String], key: &str, default: usize) -> usize {
    arg_value(args, key)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn arg_f64(args: &[String], key: &str, default: f64) -> f64 {
    arg_value(args, key)
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

fn arg_str<'a>(args: &'a [String], key: &str, default: &'a str) -> &'a str {
    arg_value(args, key).unwrap_or(default)
}

// ----------------- hot loops -----------------

#[inline(never)]
fn lex_once(input: &str) -> u64 {
    let mut checksum: u64 = 0;
    let mut n: u64 = 0;

    for tok in Lexer::new(bb(input)).flatten() {
        n = n.wrapping_add(1);
        checksum ^= (tok.span.start as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15);
        checksum ^= (tok.span.end as u64).wrapping_mul(0xC2B2_AE3D_27D4_EB4F);

        // Touch payloads so literal decoding can't be optimized away.
        match tok.tok {
            Tok::Ident(x) => checksum ^= x.len() as u64,
            Tok::StringLit(s) => checksum ^= (s.len() as u64) << 32,
            Tok::IntLit(v) => checksum ^= v as u64,
            Tok::FloatLit(v) => checksum ^= v.to_bits(),
            _ => checksum ^= 1,
        }
    }

    checksum ^ (n.wrapping_mul(0xD6E8_FEB8_6659_FD93))
}

#[inline(never)]
fn parse_once(input: &str) -> u64 {
    match parse_source("hot.go", bb(input)) {
        Ok(program) => program.funcs.len() as u64,
        Err(failure) => failure.errors.len() as u64 | 1 << 63,
    }
}

fn main() {
    let args: Vec<String> = std::env::args().collect();

    let seconds = arg_f64(&args, "--seconds", 3.0);
    let repeat = arg_usize(&args, "--repeat", 64);
    let corpus = arg_str(&args, "--corpus", "large");
    let mode = arg_str(&args, "--mode", "parse");

    let base = match corpus {
        "small" => SMALL,
        "medium" => MEDIUM,
        _ => LARGE,
    };

    // Each copy after the first drops its package clause so the result
    // still parses.
    let body = base.replacen("package main", "", 1);
    let mut input = String::with_capacity(base.len() * repeat);
    input.push_str(base);
    for _ in 1..repeat {
        input.push('\n');
        input.push_str(&body);
    }

    let run: fn(&str) -> u64 = if mode == "lex" { lex_once } else { parse_once };

    let dur = Duration::from_secs_f64(seconds);
    let start = Instant::now();

    let mut iters: u64 = 0;
    let mut acc: u64 = 0;

    while start.elapsed() < dur {
        acc ^= run(&input);
        iters += 1;
    }

    eprintln!(
        "hot_parse done: mode={mode}, iters={iters}, checksum={acc}, bytes={}",
        input.len()
    );
    bb(acc);
}
