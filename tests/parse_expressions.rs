use minigo_syntax::ast::{BinaryOp, Expr, Spanned, UnaryOp};
use minigo_syntax::error::{Expected, ParseErrorKind};
use minigo_syntax::printer::print_program;
use minigo_syntax::{parse_expr, parse_source, parse_source_with, ParseConfig, Parser};

fn expr(src: &str) -> Spanned<Expr> {
    parse_expr(src).unwrap_or_else(|e| panic!("failed to parse {src:?}: {e}"))
}

/// Fully parenthesised rendering; easiest way to compare tree shapes.
fn shape(src: &str) -> String {
    expr(src).to_string()
}

#[test]
fn subtraction_associates_left() {
    let e = expr("a - b - c");
    let Expr::Binary { op, left, right } = e.node else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Sub);
    assert!(matches!(right.node, Expr::Ident(ref id) if id.as_str() == "c"));
    assert!(matches!(left.node, Expr::Binary { op: BinaryOp::Sub, .. }));
}

#[test]
fn every_level_associates_left() {
    assert_eq!(shape("a / b * c"), "((a / b) * c)");
    assert_eq!(shape("a == b == c"), "((a == b) == c)");
    assert_eq!(shape("a && b && c"), "((a && b) && c)");
    assert_eq!(shape("a || b || c"), "((a || b) || c)");
}

#[test]
fn precedence_levels() {
    assert_eq!(shape("a || b && c"), "(a || (b && c))");
    assert_eq!(shape("a && b == c"), "(a && (b == c))");
    assert_eq!(shape("a < b + c"), "(a < (b + c))");
    assert_eq!(shape("a + b * c"), "(a + (b * c))");
    assert_eq!(shape("-a * b"), "((-a) * b)");
    assert_eq!(
        shape("call(1) * 3 == call(2) / 4 + 5"),
        "((call(1) * 3) == ((call(2) / 4) + 5))"
    );
}

#[test]
fn unary_chain_nests_right() {
    let mut e = expr("+-+-+-+-a");
    let mut ops = Vec::new();
    while let Expr::Unary { op, operand } = e.node {
        ops.push(op);
        e = *operand;
    }
    assert_eq!(ops.len(), 8);
    assert_eq!(ops[0], UnaryOp::Plus);
    assert_eq!(ops[1], UnaryOp::Neg);
    assert!(matches!(e.node, Expr::Ident(ref id) if id.as_str() == "a"));
}

#[test]
fn all_unary_operators() {
    assert_eq!(shape("!a"), "(!a)");
    assert_eq!(shape("^a"), "(^a)");
    assert_eq!(shape("- -a"), "(-(-a))");
    assert_eq!(shape("+(-(+(-a)))"), "(+(-(+(-a))))");
}

#[test]
fn parentheses_leave_no_node() {
    assert_eq!(expr("((((((b))))))").node, expr("b").node);
    assert_eq!(shape("(a + b) * c"), "((a + b) * c)");
    assert_eq!(shape("((((1) + 2) -+-+ 4)) * 8"), "(((1 + 2) - (+(-(+4)))) * 8)");
}

#[test]
fn calls_chain_and_nest() {
    assert_eq!(shape("call(call(call(10)))"), "call(call(call(10)))");
    assert_eq!(shape("f(a)(b)"), "f(a)(b)");
    assert_eq!(shape("(f)(x)"), "f(x)");
    assert_eq!(shape("f()"), "f()");
    let e = expr("f(a, b + 1, g())");
    let Expr::Call { callee, args } = e.node else {
        panic!("expected call");
    };
    assert!(matches!(callee.node, Expr::Ident(_)));
    assert_eq!(args.len(), 3);
}

#[test]
fn literals() {
    assert_eq!(expr("42").node, Expr::IntLit(42));
    assert_eq!(expr("1_000").node, Expr::IntLit(1000));
    assert_eq!(expr("2.5").node, Expr::FloatLit(2.5));
    assert_eq!(expr("1e3").node, Expr::FloatLit(1000.0));
    assert_eq!(expr("\"esc\"").node, Expr::StringLit("esc".into()));
}

#[test]
fn node_positions_are_first_token() {
    let e = expr("a +\n\tb * c");
    assert_eq!((e.pos.line, e.pos.column), (1, 1));
    let Expr::Binary { right, .. } = e.node else {
        panic!("expected binary");
    };
    assert_eq!((right.pos.line, right.pos.column), (2, 2));
    assert_eq!(right.span.start, 5);
    assert_eq!(right.span.end, 10);
}

#[test]
fn missing_operand_is_reported() {
    // `+` does not end a line, so no terminator is inserted
    let err = parse_expr("a +").unwrap_err();
    assert!(matches!(
        err.parse_kind(),
        Some(ParseErrorKind::UnexpectedEndOfInput { expected: Expected::Expression })
    ));

    let err = parse_expr("a + )").unwrap_err();
    match err.parse_kind() {
        Some(ParseErrorKind::UnexpectedToken { found, expected }) => {
            assert_eq!(found, "`)`");
            assert_eq!(*expected, Expected::Expression);
        }
        other => panic!("unexpected {other:?}"),
    }

    let err = Parser::new("(a").parse_expression().unwrap_err();
    match err.parse_kind() {
        Some(ParseErrorKind::UnexpectedToken { found, .. }) => assert_eq!(found, "newline"),
        other => panic!("unexpected {other:?}"),
    }

    let err = Parser::new("").parse_expression().unwrap_err();
    assert!(matches!(
        err.parse_kind(),
        Some(ParseErrorKind::UnexpectedEndOfInput { .. })
    ));
}

#[test]
fn unbalanced_call_reports_expected_set() {
    let err = parse_expr("f(a b)").unwrap_err();
    let Some(ParseErrorKind::UnexpectedToken { expected, .. }) = err.parse_kind() else {
        panic!("unexpected {err:?}");
    };
    assert_eq!(expected.to_string(), "one of `,`, `)`");
}

#[test]
fn nesting_limit_applies_to_parens_and_unary() {
    let cfg = ParseConfig::default().with_max_depth(16);

    let deep = format!("func f() {{ x = {}1{} }}", "(".repeat(40), ")".repeat(40));
    let failure = parse_source_with("t.go", &deep, &cfg).unwrap_err();
    assert!(matches!(
        failure.errors[0].parse_kind(),
        Some(ParseErrorKind::NestingTooDeep { limit: 16 })
    ));

    let deep = format!("func f() {{ x = {}a }}", "-".repeat(40));
    let failure = parse_source_with("t.go", &deep, &cfg).unwrap_err();
    assert!(matches!(
        failure.errors[0].parse_kind(),
        Some(ParseErrorKind::NestingTooDeep { .. })
    ));

    let shallow = format!("func f() {{ x = {}1{} }}", "(".repeat(8), ")".repeat(8));
    assert!(parse_source_with("t.go", &shallow, &cfg).is_ok());
}

/// Runs `f` on a thread with a 2 MiB stack, the default for spawned threads.
fn on_small_stack<T: Send + 'static>(f: impl FnOnce() -> T + Send + 'static) -> T {
    std::thread::Builder::new()
        .stack_size(2 << 20)
        .spawn(f)
        .unwrap()
        .join()
        .unwrap()
}

/// `x = <expr>` inside a function body, parsed with the default config.
fn assign_result(expr: &str) -> Result<String, Option<u32>> {
    let src = format!("func f() {{\n\tx = {expr}\n}}\n");
    match parse_source("deep.go", &src) {
        Ok(program) => Ok(print_program(&program)),
        Err(failure) => match failure.errors[0].parse_kind() {
            Some(ParseErrorKind::NestingTooDeep { limit }) => Err(Some(*limit)),
            _ => Err(None),
        },
    }
}

fn sum_of(terms: usize) -> String {
    vec!["a"; terms].join(" + ")
}

fn nested_calls(levels: usize) -> String {
    format!("{}1{}", "f(".repeat(levels), ")".repeat(levels))
}

#[test]
fn default_limit_stops_pathological_input() {
    let src = format!("{}a", "!".repeat(10_000));
    let err = on_small_stack(move || parse_expr(&src).unwrap_err());
    assert!(matches!(
        err.parse_kind(),
        Some(ParseErrorKind::NestingTooDeep { limit }) if *limit == ParseConfig::DEFAULT_MAX_DEPTH
    ));
}

#[test]
fn binary_chain_counts_against_the_limit() {
    let cfg = ParseConfig::default().with_max_depth(16);
    let ok = format!("func f() {{ x = {} }}", sum_of(12));
    assert!(parse_source_with("t.go", &ok, &cfg).is_ok());

    let long = format!("func f() {{ x = {} }}", sum_of(40));
    let failure = parse_source_with("t.go", &long, &cfg).unwrap_err();
    assert!(matches!(
        failure.errors[0].parse_kind(),
        Some(ParseErrorKind::NestingTooDeep { limit: 16 })
    ));

    // operators of a tighter level nest inside the outer chain's budget
    let mixed = format!("func f() {{ x = {} }}", vec!["a * b"; 6].join(" + "));
    assert!(parse_source_with("t.go", &mixed, &cfg).is_ok());
}

#[test]
fn very_long_sum_is_refused_without_exhausting_the_stack() {
    let src = sum_of(100_000);
    let out = on_small_stack(move || assign_result(&src));
    assert_eq!(out, Err(Some(ParseConfig::DEFAULT_MAX_DEPTH)));
}

#[test]
fn call_chains_and_nested_arguments_count_against_the_limit() {
    let out = on_small_stack(|| assign_result(&nested_calls(1_000)));
    assert_eq!(out, Err(Some(ParseConfig::DEFAULT_MAX_DEPTH)));

    let suffixes = format!("f{}", "()".repeat(10_000));
    let out = on_small_stack(move || assign_result(&suffixes));
    assert_eq!(out, Err(Some(ParseConfig::DEFAULT_MAX_DEPTH)));
}

#[test]
fn expressions_just_inside_the_default_limit_parse_print_and_drop() {
    let near = 100;
    let cases = [
        sum_of(near),
        nested_calls(near),
        format!("f{}", "()".repeat(near)),
        format!("{}1{}", "(".repeat(near), ")".repeat(near)),
        format!("{}a", "-".repeat(near)),
    ];
    for expr in cases {
        let shown = expr.chars().take(16).collect::<String>();
        let out = on_small_stack(move || assign_result(&expr).is_ok());
        assert!(out, "{shown}... should parse");
    }
}
