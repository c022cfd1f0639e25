#![no_main]

use minigo_syntax::printer::print_program;
use minigo_syntax::{parse_source_with, ParseConfig};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    let cfg = ParseConfig::default().with_recovery(true);
    let Ok(program) = parse_source_with("fuzz.go", s, &cfg) else {
        return;
    };

    // anything accepted must survive a print/parse cycle unchanged
    let printed = print_program(&program);
    let again = parse_source_with("fuzz.go", &printed, &cfg)
        .unwrap_or_else(|f| panic!("reprint does not parse:\n{f}\n---\n{printed}"));
    assert_eq!(print_program(&again), printed);
});
