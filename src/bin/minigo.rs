// src/bin/minigo.rs
use std::{
    env, fs,
    path::{Path, PathBuf},
    process,
};

use anyhow::{bail, Context};
use tracing::Level;

use minigo_syntax::{
    parse_source_with, printer::print_program, tokenize, walk::NodeCounter, ParseConfig,
};

const USAGE: &str = "\
Usage: minigo [options] <file.go>...

Options:
  --tokens         print the token stream (inserted terminators included)
  --ast            print the syntax tree
  --print          print canonical source
  --stats          print node counts
  --max-depth N    nesting limit (default 128)
  --recover        report one error per broken declaration instead of stopping
  -v, -vv          log to stderr (debug, trace)";

#[derive(Debug, Default)]
struct Options {
    tokens: bool,
    ast: bool,
    print: bool,
    stats: bool,
    verbosity: u8,
    config: ParseConfig,
    files: Vec<PathBuf>,
}

// ----------------- arg parsing -----------------

fn parse_args(args: &[String]) -> anyhow::Result<Options> {
    let mut opts = Options::default();
    let mut it = args.iter();
    while let Some(a) = it.next() {
        match a.as_str() {
            "--tokens" => opts.tokens = true,
            "--ast" => opts.ast = true,
            "--print" => opts.print = true,
            "--stats" => opts.stats = true,
            "--recover" => opts.config = opts.config.with_recovery(true),
            "--max-depth" => {
                let value = it.next().context("--max-depth needs a value")?;
                let depth = value
                    .parse()
                    .with_context(|| format!("invalid --max-depth {value:?}"))?;
                opts.config = opts.config.with_max_depth(depth);
            }
            "-v" => opts.verbosity = opts.verbosity.max(1),
            "-vv" => opts.verbosity = 2,
            "-h" | "--help" => {
                println!("{USAGE}");
                process::exit(0);
            }
            flag if flag.starts_with('-') => bail!("unknown option {flag}\n\n{USAGE}"),
            path => opts.files.push(PathBuf::from(path)),
        }
    }
    if opts.files.is_empty() {
        bail!("no input files\n\n{USAGE}");
    }
    Ok(opts)
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Returns `false` when the file failed to lex or parse.
fn run_file(path: &Path, opts: &Options) -> anyhow::Result<bool> {
    let src = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path.display().to_string();

    if opts.tokens {
        match tokenize(&src) {
            Ok(tokens) => {
                for t in &tokens {
                    let text = if t.is_inserted_semi() {
                        "<newline>".to_string()
                    } else {
                        t.tok.to_string()
                    };
                    println!("{}\t{:?}\t{}", t.pos, t.kind(), text);
                }
            }
            Err(e) => {
                eprintln!("{name}:{e}");
                return Ok(false);
            }
        }
    }

    let program = match parse_source_with(&name, &src, &opts.config) {
        Ok(program) => program,
        Err(failure) => {
            eprintln!("{failure}");
            return Ok(false);
        }
    };

    if opts.ast {
        println!("{program:#?}");
    }
    if opts.print {
        print!("{}", print_program(&program));
    }
    if opts.stats {
        let s = NodeCounter::count(&program);
        println!(
            "{name}: funcs={} params={} blocks={} stmts={} exprs={} calls={} max_expr_depth={}",
            s.funcs, s.params, s.blocks, s.stmts, s.exprs, s.calls, s.max_expr_depth
        );
    }
    Ok(true)
}

fn main() -> anyhow::Result<()> {
    let args = env::args().skip(1).collect::<Vec<_>>();
    let opts = parse_args(&args)?;
    init_logging(opts.verbosity);

    let mut failed = 0usize;
    for path in &opts.files {
        if !run_file(path, &opts)? {
            failed += 1;
        }
    }

    if failed > 0 {
        bail!("{failed} of {} file(s) failed to parse", opts.files.len());
    }
    Ok(())
}
