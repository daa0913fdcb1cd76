//! Tree-walking evaluation.
//!
//! [`eval`] runs an expression against an [`Environment`]: an ordered list of
//! variable bindings plus a borrowed [`FunctionStore`]. [`eval_pure`] needs no
//! environment and only understands numbers, `quote`, and the context-free
//! built-ins.
//!
//! Dispatch on a non-empty list looks at the head symbol. Special forms are handled
//! before any operand is evaluated. Otherwise operands are evaluated left to right,
//! then the head is applied: built-ins first, then user functions.
//!
//! A user function call copies the caller's bindings into a new environment and
//! binds the parameters on top, so the callee sees everything visible at the call
//! site. There is no recursion depth guard.

use crate::ast::Value;
use crate::builtinops::{BuiltinFn, BuiltinOp, OpKind, SpecialForm};
use crate::functions::{FunctionStore, Lambda};
use crate::intern::{Interner, STALE_SYMBOL, Symbol};
use crate::{DEFUN_KEYWORD, Error, IF_KEYWORD};

/// Variable scope for one evaluation
#[derive(Debug)]
pub struct Environment<'s> {
    bindings: Vec<(Symbol, Value)>,
    functions: &'s mut FunctionStore,
    interner: &'s Interner,
}

impl<'s> Environment<'s> {
    pub fn new(functions: &'s mut FunctionStore, interner: &'s Interner) -> Self {
        Environment {
            bindings: Vec::new(),
            functions,
            interner,
        }
    }

    /// Push a binding. An earlier binding of the same name is shadowed, not removed.
    pub fn bind(&mut self, name: Symbol, value: Value) {
        self.bindings.push((name, value));
    }

    /// Most recent binding of `name`
    pub fn lookup(&self, name: Symbol) -> Option<&Value> {
        self.bindings
            .iter()
            .rev()
            .find(|(bound, _)| *bound == name)
            .map(|(_, value)| value)
    }

    /// Drop every variable binding; the function store is untouched
    pub fn clear(&mut self) {
        self.bindings.clear();
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings from oldest to newest
    pub fn bindings(&self) -> impl Iterator<Item = (Symbol, &Value)> {
        self.bindings.iter().map(|(name, value)| (*name, value))
    }

    pub fn functions(&self) -> &FunctionStore {
        &*self.functions
    }

    pub fn functions_mut(&mut self) -> &mut FunctionStore {
        &mut *self.functions
    }

    pub fn interner(&self) -> &'s Interner {
        self.interner
    }

    /// Scope for a function call: a snapshot of this scope sharing the same store
    fn call_scope(&mut self) -> Environment<'_> {
        Environment {
            bindings: self.bindings.clone(),
            functions: &mut *self.functions,
            interner: self.interner,
        }
    }
}

/// Evaluate an S-expression with full language semantics
pub fn eval(expr: &Value, env: &mut Environment<'_>) -> Result<Value, Error> {
    match expr {
        Value::Number(_) => Ok(expr.clone()),
        Value::Symbol(name) => env
            .lookup(*name)
            .cloned()
            .ok_or_else(|| Error::UnboundVariable(env.interner.name_of(*name))),
        Value::List(elements) => eval_list(elements, env),
    }
}

/// Evaluate without an environment: numbers, `quote`, `+ - * /`, `car` and `cdr`.
///
/// Every symbol in value position is unbound. Environment-only operators such as
/// `if`, `defun` and the comparisons are unknown here.
pub fn eval_pure(expr: &Value, interner: &Interner) -> Result<Value, Error> {
    let elements = match expr {
        Value::Number(_) => return Ok(expr.clone()),
        Value::Symbol(name) => return Err(Error::UnboundVariable(interner.name_of(*name))),
        Value::List(elements) => elements,
    };

    let (head, arg_exprs) = split_form(elements)?;
    check_operator(interner, head)?;

    let builtin = interner.builtin_op(head).filter(|op| op.is_context_free());
    if let Some(op) = builtin
        && let OpKind::SpecialForm(SpecialForm::Quote) = op.op_kind
    {
        op.validate_arity(arg_exprs.len())?;
        return eval_quote(arg_exprs);
    }

    let args = arg_exprs
        .iter()
        .map(|arg| eval_pure(arg, interner))
        .collect::<Result<Vec<_>, _>>()?;

    match builtin.map(|op| (op, op.op_kind)) {
        Some((op, OpKind::Function(func))) => apply_builtin(op, func, &args),
        _ => Err(Error::UnknownOperator(interner.name_of(head))),
    }
}

/// Split a form into its head symbol and operand expressions
fn split_form(elements: &[Value]) -> Result<(Symbol, &[Value]), Error> {
    match elements {
        [] => Err(Error::EmptyListEval),
        [Value::Symbol(head), args @ ..] => Ok((*head, args)),
        [head, ..] => Err(Error::EvalError(format!(
            "operator must be a symbol, got {}",
            head.kind_name()
        ))),
    }
}

fn check_operator(interner: &Interner, head: Symbol) -> Result<(), Error> {
    if interner.is_current(head) {
        return Ok(());
    }
    Err(Error::EvalError(format!(
        "operator {STALE_SYMBOL} was interned before the symbol table was cleared"
    )))
}

fn apply_builtin(op: &BuiltinOp, func: BuiltinFn, args: &[Value]) -> Result<Value, Error> {
    op.validate_arity(args.len())?;
    func(args)
}

/// Evaluate a non-empty or empty list form (special form or application)
fn eval_list(elements: &[Value], env: &mut Environment<'_>) -> Result<Value, Error> {
    let (head, arg_exprs) = split_form(elements)?;
    let interner = env.interner;
    check_operator(interner, head)?;

    let mut function = None;
    if let Some(op) = interner.builtin_op(head) {
        match op.op_kind {
            OpKind::SpecialForm(form) => {
                op.validate_arity(arg_exprs.len())?;
                return match form {
                    SpecialForm::Quote => eval_quote(arg_exprs),
                    SpecialForm::If => eval_if(arg_exprs, env),
                    SpecialForm::Defun => eval_defun(arg_exprs, env),
                };
            }
            OpKind::Function(func) => function = Some((op, func)),
        }
    }

    let args = eval_args(arg_exprs, env)?;

    if let Some((op, func)) = function {
        return apply_builtin(op, func, &args);
    }

    match env.functions.lookup_shared(head) {
        Some(lambda) => call_function(head, &lambda, args, env),
        None => Err(Error::UnknownOperator(interner.name_of(head))),
    }
}

fn eval_args(args: &[Value], env: &mut Environment<'_>) -> Result<Vec<Value>, Error> {
    args.iter().map(|arg| eval(arg, env)).collect()
}

/// Apply a user function in a snapshot of the caller's scope
#[tracing::instrument(
    level = "trace",
    skip_all,
    fields(function = %env.interner.name_of(name), argc = args.len())
)]
fn call_function(
    name: Symbol,
    lambda: &Lambda,
    args: Vec<Value>,
    env: &mut Environment<'_>,
) -> Result<Value, Error> {
    if lambda.arity() != args.len() {
        return Err(Error::arity_error_with_expr(
            lambda.arity(),
            args.len(),
            env.interner.name_of(name),
        ));
    }

    let mut scope = env.call_scope();
    for (param, arg) in lambda.params().iter().zip(args) {
        scope.bind(*param, arg);
    }
    eval(lambda.body(), &mut scope)
}

/// Evaluate quote special form
fn eval_quote(args: &[Value]) -> Result<Value, Error> {
    match args {
        [expr] => Ok(expr.clone()),
        _ => Err(Error::arity_error_with_expr(1, args.len(), "quote")),
    }
}

/// Evaluate if special form; only the chosen branch is evaluated
fn eval_if(args: &[Value], env: &mut Environment<'_>) -> Result<Value, Error> {
    let [condition, then_branch, else_branch] = args else {
        return Err(Error::arity_error_with_expr(3, args.len(), IF_KEYWORD));
    };

    match eval(condition, env)? {
        Value::Number(0) => eval(else_branch, env),
        Value::Number(_) => eval(then_branch, env),
        other => Err(Error::TypeError(format!(
            "if condition must be a number, got {}",
            other.kind_name()
        ))),
    }
}

/// Evaluate defun special form: `(defun name (params...) body)`
fn eval_defun(args: &[Value], env: &mut Environment<'_>) -> Result<Value, Error> {
    let [name, params, body] = args else {
        return Err(Error::arity_error_with_expr(3, args.len(), DEFUN_KEYWORD));
    };

    let Value::Symbol(name) = name else {
        return Err(Error::TypeError(format!(
            "defun name must be a symbol, got {}",
            name.kind_name()
        )));
    };
    let display_name = env.interner.name_of(*name);

    let Value::List(params) = params else {
        return Err(Error::TypeError(format!(
            "defun parameter list must be a list, got {}",
            params.kind_name()
        )));
    };

    let mut param_names = Vec::with_capacity(params.len());
    for param in params.iter() {
        let Value::Symbol(param) = param else {
            return Err(Error::TypeError(format!(
                "defun parameters must be symbols, got {}",
                param.kind_name()
            )));
        };
        if param_names.contains(param) {
            return Err(Error::EvalError(format!(
                "duplicate parameter '{}' in defun {display_name}",
                env.interner.name_of(*param)
            )));
        }
        param_names.push(*param);
    }

    if env.interner.builtin_op(*name).is_some() {
        tracing::warn!(
            function = %display_name,
            "defun names a built-in operator; calls will still reach the built-in"
        );
    }

    let arity = param_names.len();
    let replaced = env
        .functions
        .define(*name, Lambda::new(param_names, body.clone()));
    if replaced.is_some() {
        tracing::debug!(function = %display_name, arity, "redefined function");
    } else {
        tracing::debug!(function = %display_name, arity, "defined function");
    }

    Ok(Value::Symbol(*name))
}
