//! Property-based tests for the lispbox evaluator.
//!
//! Trees are generated as plain data and converted to `Value`s per case:
//! 1. Truthiness follows the falsy-symbol set, case-insensitively
//! 2. `quote` returns its argument verbatim
//! 3. `if` evaluates exactly one branch, and the condition once
//! 4. Closure calls with the wrong count fail with both counts
//! 5. Unbounded self-application always ends in a resource-limit error

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]
#![allow(
    clippy::doc_markdown,
    clippy::redundant_closure_for_method_calls,
    clippy::arithmetic_side_effects,
    reason = "Proptest macros generate code with these patterns"
)]

use lispbox_eval::{
    init_tracing, Arity, EvalErrorKind, Interpreter, Value, ANONYMOUS, FALSY_SYMBOLS,
};
use proptest::prelude::*;

// -- Tree Generation --

/// Plain-data expression tree; `Value` is not `Send`, so strategies build these.
#[derive(Clone, Debug)]
enum Tree {
    Sym(String),
    List(Vec<Tree>),
}

impl Tree {
    fn to_value(&self) -> Value {
        match self {
            Tree::Sym(name) => Value::symbol(name.as_str()),
            Tree::List(items) => Value::list(items.iter().map(Tree::to_value).collect()),
        }
    }
}

fn symbol_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-zA-Z0-9_-]{0,10}").expect("valid regex")
}

/// A falsy token with its letters randomly upper-cased.
fn falsy_strategy() -> impl Strategy<Value = String> {
    (prop::sample::select(FALSY_SYMBOLS.to_vec()), any::<u64>()).prop_map(|(token, mask)| {
        token
            .chars()
            .enumerate()
            .map(|(i, c)| {
                if mask >> (i % 64) & 1 == 1 {
                    c.to_ascii_uppercase()
                } else {
                    c
                }
            })
            .collect()
    })
}

fn tree_strategy() -> impl Strategy<Value = Tree> {
    let leaf = symbol_strategy().prop_map(Tree::Sym);
    leaf.prop_recursive(4, 64, 6, |inner| {
        prop::collection::vec(inner, 0..6).prop_map(Tree::List)
    })
}

fn quote(expr: Value) -> Value {
    Value::list(vec![Value::symbol("quote"), expr])
}

fn call(items: Vec<Value>) -> Value {
    Value::list(items)
}

fn is_falsy_token(name: &str) -> bool {
    FALSY_SYMBOLS.contains(&name.to_lowercase().as_str())
}

// -- Property Tests --

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        ..ProptestConfig::default()
    })]

    /// Case-mangled falsy tokens are false.
    #[test]
    fn prop_falsy_tokens(name in falsy_strategy()) {
        prop_assert!(!Value::symbol(name.as_str()).is_truthy());
    }

    /// Every other symbol is true.
    #[test]
    fn prop_symbol_truthiness(name in symbol_strategy()) {
        prop_assert_eq!(Value::symbol(name.as_str()).is_truthy(), !is_falsy_token(&name));
    }

    /// Lists are false exactly when empty.
    #[test]
    fn prop_list_truthiness(tree in tree_strategy()) {
        let value = tree.to_value();
        if let Tree::List(items) = &tree {
            prop_assert_eq!(value.is_truthy(), !items.is_empty());
        }
    }

    /// `(quote x)` is `x`, the same allocation, for any tree.
    #[test]
    fn prop_quote_is_verbatim(tree in tree_strategy()) {
        init_tracing();
        let expr = tree.to_value();
        let mut interp = Interpreter::new();
        let value = interp.run(&quote(expr.clone())).unwrap().value;
        prop_assert!(value.ptr_eq(&expr));
        prop_assert_eq!(value, expr);
    }

    /// The branch not taken is an unbound symbol and must never be looked up.
    #[test]
    fn prop_if_evaluates_one_branch(cond in prop_oneof![symbol_strategy(), falsy_strategy()]) {
        let truthy = !is_falsy_token(&cond);
        let cond = quote(Value::symbol(cond.as_str()));
        let taken = quote(Value::symbol("taken"));
        let skipped = Value::symbol("skipped-branch-is-unbound");
        let expr = if truthy {
            call(vec![Value::symbol("if"), cond, taken, skipped])
        } else {
            call(vec![Value::symbol("if"), cond, skipped, taken])
        };
        let mut interp = Interpreter::new();
        prop_assert_eq!(interp.run(&expr).unwrap().value, Value::symbol("taken"));
    }

    /// Wrong argument counts name the closure and both counts.
    #[test]
    fn prop_closure_arity(params in 0usize..6, args in 0usize..6) {
        prop_assume!(params != args);
        let names = (0..params).map(|i| Value::symbol(format!("p{i}"))).collect();
        let lambda = call(vec![Value::symbol("lambda"), Value::list(names), Value::nil()]);
        let mut items = vec![lambda];
        items.extend((0..args).map(|_| quote(Value::symbol("a"))));

        let mut interp = Interpreter::new();
        let err = interp.run(&call(items)).unwrap_err();
        prop_assert_eq!(
            err.kind,
            EvalErrorKind::ArityMismatch {
                callable: ANONYMOUS.to_string(),
                expected: Arity::Exact(params),
                got: args,
            }
        );
    }

    /// `((lambda (f) (f f)) (lambda (f) (f f)))` stops under any limits.
    #[test]
    fn prop_self_application_terminates(max_depth in 1usize..400, max_steps in 1usize..4_000) {
        let omega = || {
            let f = || Value::symbol("f");
            call(vec![
                Value::symbol("lambda"),
                Value::list(vec![f()]),
                call(vec![f(), f()]),
            ])
        };
        let expr = call(vec![omega(), omega()]);
        let mut interp = Interpreter::builder()
            .max_depth(max_depth)
            .max_steps(max_steps)
            .build();
        let err = interp.run(&expr).unwrap_err();
        prop_assert!(err.is_resource_limit());
        prop_assert!(interp.is_exhausted());
        prop_assert!(interp.steps() <= max_steps);
    }

    /// `cons` prepends without touching its tail.
    #[test]
    fn prop_cons_prepends(head in symbol_strategy(), tail in prop::collection::vec(symbol_strategy(), 0..8)) {
        let tail_value = Value::list(tail.iter().map(|s| Value::symbol(s.as_str())).collect());
        let expr = call(vec![
            Value::symbol("cons"),
            quote(Value::symbol(head.as_str())),
            quote(tail_value.clone()),
        ]);
        let mut interp = Interpreter::new();
        let value = interp.run(&expr).unwrap().value;

        let items = value.as_list().unwrap();
        prop_assert_eq!(items.len(), tail.len() + 1);
        prop_assert_eq!(&items[0], &Value::symbol(head.as_str()));
        prop_assert_eq!(&items[1..], tail_value.as_list().unwrap());
    }
}
