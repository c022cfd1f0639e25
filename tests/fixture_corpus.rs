use std::path::Path;

use minigo_syntax::ast::{Else, Expr, Stmt};
use minigo_syntax::error::{LexErrorKind, ParseErrorKind};
use minigo_syntax::printer::print_program;
use minigo_syntax::walk::NodeCounter;
use minigo_syntax::parse_source;
use walkdir::WalkDir;

const SYNTAX_GO: &str = include_str!("fixtures/syntax.go");

fn fixtures_root() -> &'static Path {
    Path::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures"))
}

#[test]
fn every_valid_fixture_parses_and_reprints_stably() {
    let mut total = 0usize;

    for entry in WalkDir::new(fixtures_root()).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("go") {
            continue;
        }
        if path.components().any(|c| c.as_os_str() == "invalid") {
            continue;
        }

        total += 1;
        let src = std::fs::read_to_string(path).unwrap();
        let name = path.display().to_string();
        let program = match parse_source(&name, &src) {
            Ok(p) => p,
            Err(f) => panic!("FAILED: {name}\n{f}"),
        };

        let printed = print_program(&program);
        let reparsed = parse_source(&name, &printed)
            .unwrap_or_else(|f| panic!("reprint of {name} does not parse:\n{f}\n---\n{printed}"));
        assert_eq!(print_program(&reparsed), printed, "printing {name} is not idempotent");
        assert_eq!(
            NodeCounter::count(&reparsed),
            NodeCounter::count(&program),
            "reprint of {name} changed the tree"
        );
    }

    assert!(total >= 2, "expected fixtures under {}", fixtures_root().display());
}

#[test]
fn every_invalid_fixture_fails_with_one_error() {
    let mut total = 0usize;

    for entry in WalkDir::new(fixtures_root().join("invalid"))
        .into_iter()
        .filter_map(|e| e.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }
        total += 1;
        let src = std::fs::read_to_string(entry.path()).unwrap();
        let name = entry.path().display().to_string();
        match parse_source(&name, &src) {
            Ok(_) => panic!("{name} parsed but should not"),
            Err(f) => assert_eq!(f.errors.len(), 1, "{f}"),
        }
    }

    assert!(total >= 5);
}

#[test]
fn invalid_fixture_kinds() {
    let kind_of = |file: &str| {
        let path = fixtures_root().join("invalid").join(file);
        let src = std::fs::read_to_string(&path).unwrap();
        parse_source(file, &src).unwrap_err().errors.remove(0)
    };

    assert_eq!(
        kind_of("unterminated_string.go").lex_kind(),
        Some(LexErrorKind::UnterminatedString)
    );
    assert_eq!(
        kind_of("unterminated_comment.go").lex_kind(),
        Some(LexErrorKind::UnterminatedComment)
    );
    assert!(matches!(
        kind_of("for_missing_semicolon.go").parse_kind(),
        Some(ParseErrorKind::InvalidForClause { .. })
    ));
    assert_eq!(
        kind_of("call_as_target.go").parse_kind(),
        Some(&ParseErrorKind::InvalidAssignmentTarget)
    );
    assert!(matches!(
        kind_of("else_on_new_line.go").parse_kind(),
        Some(ParseErrorKind::UnexpectedToken { found, .. }) if found == "newline"
    ));
}

#[test]
fn syntax_fixture_shape() {
    let program = parse_source("syntax.go", SYNTAX_GO).unwrap();
    assert_eq!(program.package.as_ref().unwrap().node.as_str(), "main");

    let names: Vec<_> = program.funcs.iter().map(|f| f.node.name.node.as_str()).collect();
    assert_eq!(
        names,
        [
            "noargs", "empty", "arg", "args", "ret", "without", "rets", "function", "call",
            "expression", "statements", "cycle",
        ]
    );

    let func = |name: &str| {
        program
            .funcs
            .iter()
            .find(|f| f.node.name.node.as_str() == name)
            .map(|f| &f.node)
            .unwrap()
    };

    assert_eq!(func("function").params.len(), 4);
    assert_eq!(func("function").results.len(), 2);
    assert_eq!(func("ret").results.len(), 1);
    assert_eq!(func("empty").body.stmts.len(), 1);

    // `a = +-+-+-+-a`
    let expression = func("expression");
    let unary = expression
        .body
        .stmts
        .iter()
        .filter_map(|s| match &s.node {
            Stmt::Assign(a) => Some(&a.values[0].node),
            _ => None,
        })
        .find(|v| v.to_string() == "(+(-(+(-(+(-(+(-a))))))))");
    assert!(unary.is_some());

    // the last statement returns two values
    let Some(Stmt::Return(values)) = expression.body.stmts.last().map(|s| &s.node) else {
        panic!("expected return");
    };
    assert_eq!(values.len(), 2);

    // four more `if`s nested in the first branch of the second one
    let statements = func("statements");
    let Stmt::If(outer) = &statements.body.stmts[1].node else {
        panic!("expected if");
    };
    let mut depth = 0;
    let mut block = &outer.then_block;
    while let Some(Stmt::If(inner)) = block.stmts.first().map(|s| &s.node) {
        depth += 1;
        assert!(matches!(inner.otherwise, Some(Else::Block(_))));
        block = &inner.then_block;
    }
    assert_eq!(depth, 4);

    // the second loop has only a condition
    let cycle = func("cycle");
    let loops: Vec<_> = cycle
        .body
        .stmts
        .iter()
        .filter_map(|s| match &s.node {
            Stmt::For(f) => Some(f),
            _ => None,
        })
        .collect();
    assert_eq!(loops.len(), 5);
    assert_eq!(loops.iter().filter(|f| f.init.is_some()).count(), 4);
    assert!(loops[1].init.is_none() && loops[1].post.is_none());
    assert!(matches!(
        loops[1].cond.as_ref().map(|c| &c.node),
        Some(Expr::Binary { .. })
    ));
}

#[test]
fn syntax_fixture_positions() {
    let program = parse_source("syntax.go", SYNTAX_GO).unwrap();
    let noargs = &program.funcs[0];
    assert_eq!((noargs.pos.line, noargs.pos.column), (5, 1));
    let cycle = program.funcs.last().unwrap();
    assert_eq!(cycle.node.name.node.as_str(), "cycle");
    assert_eq!(cycle.pos.line, 106);
}
