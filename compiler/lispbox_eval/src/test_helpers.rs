//! S-expression reader for unit tests.
//!
//! Hosts bring their own parser; this one only exists so tests can write
//! `read("((lambda (x) x) 'z)")` instead of building trees by hand.
//! `'x` reads as `(quote x)`.

#![allow(
    clippy::expect_used,
    clippy::arithmetic_side_effects,
    reason = "test-only reader"
)]

use lispbox_value::{EvalResult, Value};

use crate::interpreter::{Interpreter, InterpreterBuilder};

/// Parse exactly one expression. Panics on malformed input.
pub fn read(src: &str) -> Value {
    let tokens = tokenize(src);
    let mut pos = 0;
    let value = parse(&tokens, &mut pos);
    assert_eq!(pos, tokens.len(), "trailing input in {src:?}");
    value
}

fn tokenize(src: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    for ch in src.chars() {
        match ch {
            '(' | ')' | '\'' => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
                tokens.push(ch.to_string());
            }
            c if c.is_whitespace() => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            c => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

fn parse(tokens: &[String], pos: &mut usize) -> Value {
    let token = tokens.get(*pos).expect("unexpected end of input");
    *pos += 1;
    match token.as_str() {
        "(" => {
            let mut items = Vec::new();
            while tokens.get(*pos).expect("unclosed list") != ")" {
                items.push(parse(tokens, pos));
            }
            *pos += 1;
            Value::list(items)
        }
        ")" => panic!("unexpected ')'"),
        "'" => Value::list(vec![Value::symbol("quote"), parse(tokens, pos)]),
        name => Value::symbol(name),
    }
}

/// Default session with the core builtins.
pub fn session() -> Interpreter {
    Interpreter::new()
}

/// Run `src` in `interp` and return the value.
pub fn run(interp: &mut Interpreter, src: &str) -> Value {
    interp.run(&read(src)).expect("evaluation failed").value
}

/// Run `src` in a fresh session built from `builder`.
pub fn run_with(builder: InterpreterBuilder, src: &str) -> EvalResult {
    Interpreter::eval_in_new(&read(src), builder)
}
