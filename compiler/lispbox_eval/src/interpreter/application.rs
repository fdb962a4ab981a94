//! Application of callables: argument preparation and closure calls.

use lispbox_value::{not_callable, wrong_arg_count, Arity, Closure, EvalResult, Scope, Value};

use super::Interpreter;

impl Interpreter {
    /// Evaluate `(head args...)`.
    ///
    /// The head is evaluated first and must be callable. Quoting builtins
    /// receive `args` as written; every other callable receives them
    /// evaluated left to right.
    pub(super) fn eval_application(&mut self, head: &Value, args: &[Value]) -> EvalResult {
        let callee = self.eval(head)?;
        let args = match &callee {
            Value::Builtin(builtin) if builtin.quotes() => args.to_vec(),
            Value::Builtin(_) | Value::Closure(_) => args
                .iter()
                .map(|arg| self.eval(arg))
                .collect::<Result<Vec<_>, _>>()?,
            Value::Symbol(_) | Value::List(_) => return Err(not_callable(&callee)),
        };
        self.call(&callee, args)
    }

    /// Apply `callee` to `args` without evaluating them.
    ///
    /// Used by `apply` and by hosts that already hold argument values.
    pub fn call(&mut self, callee: &Value, args: Vec<Value>) -> EvalResult {
        self.ensure_live()?;
        let result = match callee {
            Value::Builtin(builtin) => builtin.invoke(&args, self),
            Value::Closure(closure) => self.call_closure(closure, args),
            Value::Symbol(_) | Value::List(_) => Err(not_callable(callee)),
        };
        self.record(result)
    }

    /// Bind `args` to the closure's parameters in a fresh frame and evaluate
    /// the body over the captured chain plus that frame.
    ///
    /// The caller's chain is back in place when this returns, on every path.
    #[tracing::instrument(level = "debug", skip_all, fields(closure = %closure.name()))]
    fn call_closure(&mut self, closure: &Closure, args: Vec<Value>) -> EvalResult {
        let arity = Arity::Exact(closure.params().len());
        if !arity.accepts(args.len()) {
            return Err(wrong_arg_count(closure.name(), arity, args.len()));
        }
        let frame: Scope = closure.params().iter().cloned().zip(args).collect();

        self.call_stack.push(closure.name());
        let result = {
            let mut swapped = self.scopes_as(closure.scopes().clone());
            let mut scoped = swapped.scoped(frame);
            scoped.eval(closure.body())
        };
        let result = result.map_err(|err| err.with_backtrace(self.call_stack.capture()));
        self.call_stack.pop();
        result
    }
}
