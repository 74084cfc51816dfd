//! Fuzz target: lex and parse arbitrary text (no evaluation).
//!
//! The lexer and parser are specified to recover from every malformed input
//! rather than fail outright (§4.1, §4.2); a crash here means that contract
//! is broken, not that the input was rejected.

#![no_main]

use libfuzzer_sys::fuzz_target;

use template_engine::lexer::lex;
use template_engine::parser::parse;

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    if text.len() > 16384 {
        return;
    }

    let chars: Vec<char> = text.chars().collect();
    let lexed = lex(&chars);
    let _ = parse(&chars, &lexed.tokens);
});
