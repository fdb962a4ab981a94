//! The core builtin set.
//!
//! | Name | Policy | Arity |
//! |---|---|---|
//! | `quote` | quoted | 1 |
//! | `eval` | evaluated | 1 |
//! | `apply` | evaluated | 2 |
//! | `progn` | evaluated | at least 1 |
//! | `lambda` | quoted | 2 |
//! | `set` | quoted | 2 |
//! | `if` | quoted | 3 |
//! | `cons` | evaluated | 2 |
//!
//! The dispatcher checks arity before any of these run. Each builtin still
//! destructures its arguments through [`exact`] so a direct call with the
//! wrong count is an error, not a panic.

use lispbox_value::{
    wrong_arg_count, wrong_arg_type, ArgPolicy, Arity, Builtin, Closure, EvalError, EvalResult,
    Executor, Value,
};

static CORE: [Builtin; 8] = [
    Builtin::new("quote", Arity::Exact(1), ArgPolicy::Quoted, quote),
    Builtin::new("eval", Arity::Exact(1), ArgPolicy::Evaluated, eval),
    Builtin::new("apply", Arity::Exact(2), ArgPolicy::Evaluated, apply),
    Builtin::new("progn", Arity::AtLeast(1), ArgPolicy::Evaluated, progn),
    Builtin::new("lambda", Arity::Exact(2), ArgPolicy::Quoted, lambda),
    Builtin::new("set", Arity::Exact(2), ArgPolicy::Quoted, set),
    Builtin::new("if", Arity::Exact(3), ArgPolicy::Quoted, if_),
    Builtin::new("cons", Arity::Exact(2), ArgPolicy::Evaluated, cons),
];

/// The eight core builtins.
pub fn core_builtins() -> &'static [Builtin] {
    &CORE
}

fn exact<'a, const N: usize>(name: &str, args: &'a [Value]) -> Result<&'a [Value; N], EvalError> {
    args.try_into()
        .map_err(|_| wrong_arg_count(name, Arity::Exact(N), args.len()))
}

/// `(quote x)`: `x`, unevaluated.
fn quote(args: &[Value], _exec: &mut dyn Executor) -> EvalResult {
    let [expr] = exact::<1>("quote", args)?;
    Ok(expr.clone())
}

/// `(eval x)`: the argument arrives evaluated and is evaluated once more.
fn eval(args: &[Value], exec: &mut dyn Executor) -> EvalResult {
    let [expr] = exact::<1>("eval", args)?;
    exec.eval(expr)
}

/// `(apply f xs)`: call `f` with the elements of `xs`, which are not
/// evaluated again.
fn apply(args: &[Value], exec: &mut dyn Executor) -> EvalResult {
    let [callee, list] = exact::<2>("apply", args)?;
    if !callee.is_callable() {
        return Err(wrong_arg_type("apply", 1, "a callable", callee));
    }
    let items = list
        .as_list()
        .ok_or_else(|| wrong_arg_type("apply", 2, "list", list))?;
    exec.call(callee, items.to_vec())
}

fn progn(args: &[Value], _exec: &mut dyn Executor) -> EvalResult {
    args.last()
        .cloned()
        .ok_or_else(|| wrong_arg_count("progn", Arity::AtLeast(1), 0))
}

/// `(lambda (params...) body)`: a closure over the current chain.
///
/// The chain is shared with the defining environment, not copied.
fn lambda(args: &[Value], exec: &mut dyn Executor) -> EvalResult {
    let [params, body] = exact::<2>("lambda", args)?;
    let names = params
        .as_list()
        .and_then(|items| {
            items
                .iter()
                .map(|item| item.as_symbol().map(str::to_string))
                .collect::<Option<Vec<_>>>()
        })
        .ok_or_else(|| wrong_arg_type("lambda", 1, "list of symbols", params))?;
    let scopes = exec.capture_scopes();
    exec.track(Value::closure(Closure::new(names, body.clone(), scopes)))
}

/// `(set name expr)`: bind the value of `expr` in the innermost frame.
fn set(args: &[Value], exec: &mut dyn Executor) -> EvalResult {
    let [target, expr] = exact::<2>("set", args)?;
    let name = target
        .as_symbol()
        .ok_or_else(|| wrong_arg_type("set", 1, "symbol", target))?;
    let value = exec.eval(expr)?;
    exec.assign(name, value.clone());
    Ok(value)
}

/// `(if cond then else)`: only the chosen branch is evaluated.
fn if_(args: &[Value], exec: &mut dyn Executor) -> EvalResult {
    let [cond, then, otherwise] = exact::<3>("if", args)?;
    if exec.eval(cond)?.is_truthy() {
        exec.eval(then)
    } else {
        exec.eval(otherwise)
    }
}

/// `(cons x xs)`: a new list with `x` in front of the elements of `xs`.
fn cons(args: &[Value], exec: &mut dyn Executor) -> EvalResult {
    let [head, tail] = exact::<2>("cons", args)?;
    let items = tail
        .as_list()
        .ok_or_else(|| wrong_arg_type("cons", 2, "list", tail))?;
    let list = std::iter::once(head.clone())
        .chain(items.iter().cloned())
        .collect();
    exec.track(Value::list(list))
}
