//! Built-in operations registry.
//!
//! Every head symbol the evaluator recognizes without consulting the function store is
//! listed here once, with its arity and whether the context-free evaluator may use it.
//! The interner looks each new name up here, so the evaluator can dispatch on handles.
//!
//! ```scheme
//! (quote (1 2))      ; special form, operands not evaluated
//! (+ 1 2 3)          ; arithmetic, variadic
//! (car '(1 2 3))     ; list access
//! (<= 1 2)           ; comparison, yields 1 or 0
//! ```
//!
//! ## Functions vs Special Forms
//!
//! - **Functions**: receive already evaluated operands (e.g., `+`, `car`, `<`)
//! - **Special Forms**: control evaluation of their operands (`quote`, `if`, `defun`);
//!   the evaluator implements them, this table only carries their arity
//!
//! ## Availability
//!
//! The context-free evaluator has no environment and no `if`, so it
//! only sees `quote` and the arithmetic and list operators. Comparisons, `if` and
//! `defun` are marked [`Availability::EnvironmentOnly`].
//!
//! ## Error Handling
//!
//! - **Type Safety**: arithmetic and comparisons reject non-numbers, `car`/`cdr`
//!   reject non-lists
//! - **Overflow Detection**: arithmetic reports overflow instead of wrapping. Only
//!   the final result of a variadic operator has to fit [`NumberType`]
//! - **Arity Checking**: every operator validates its operand count

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::ast::Value;
use crate::{DEFUN_KEYWORD, Error, IF_KEYWORD, NumberType, QUOTE_KEYWORD};

/// Number of operands an operator accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly n arguments
    Exact(usize),
    /// At least n arguments
    AtLeast(usize),
}

impl Arity {
    pub fn accepts(&self, arg_count: usize) -> bool {
        match *self {
            Arity::Exact(n) => arg_count == n,
            Arity::AtLeast(n) => arg_count >= n,
        }
    }

    /// Check if the given number of arguments is valid
    pub fn validate(&self, arg_count: usize) -> Result<(), Error> {
        if self.accepts(arg_count) {
            return Ok(());
        }
        let expected = match *self {
            Arity::Exact(n) | Arity::AtLeast(n) => n,
        };
        Err(Error::arity_error(expected, arg_count))
    }
}

/// Signature shared by every built-in function; operands are already evaluated
pub type BuiltinFn = fn(&[Value]) -> Result<Value, Error>;

/// Special forms implemented directly by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialForm {
    Quote,
    If,
    Defun,
}

/// Represents the implementation of a built-in expression (function or special form)
#[derive(Clone, Copy)]
pub enum OpKind {
    Function(BuiltinFn),
    SpecialForm(SpecialForm),
}

impl std::fmt::Debug for OpKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OpKind::Function(_) => write!(f, "Function(<fn>)"),
            OpKind::SpecialForm(form) => write!(f, "SpecialForm({form:?})"),
        }
    }
}

/// Which evaluators may dispatch to an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Availability {
    /// Context-free and environment-aware evaluation
    Everywhere,
    /// Environment-aware evaluation only
    EnvironmentOnly,
}

/// Definition of a built-in operation
#[derive(Debug, Clone)]
pub struct BuiltinOp {
    /// Head symbol text naming this operation
    pub id: &'static str,
    pub op_kind: OpKind,
    pub arity: Arity,
    pub availability: Availability,
}

impl PartialEq for BuiltinOp {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl BuiltinOp {
    pub fn is_special_form(&self) -> bool {
        matches!(self.op_kind, OpKind::SpecialForm(_))
    }

    /// Whether the context-free evaluator may dispatch to this operation
    pub fn is_context_free(&self) -> bool {
        self.availability == Availability::Everywhere
    }

    /// Check the operand count, naming this operation in the error
    pub fn validate_arity(&self, arg_count: usize) -> Result<(), Error> {
        self.arity.validate(arg_count).map_err(|err| match err {
            Error::ArityError { expected, got, .. } => {
                Error::arity_error_with_expr(expected, got, self.id)
            }
            other => other,
        })
    }
}

//
// Builtin Function Implementations
//

fn expect_number(op: &str, value: &Value) -> Result<NumberType, Error> {
    match value {
        Value::Number(n) => Ok(*n),
        other => Err(Error::TypeError(format!(
            "'{op}' expects numbers, got {}",
            other.kind_name()
        ))),
    }
}

fn expect_list<'a>(op: &str, value: &'a Value) -> Result<&'a [Value], Error> {
    match value {
        Value::List(items) => Ok(items),
        other => Err(Error::TypeError(format!(
            "'{op}' expects a list, got {}",
            other.kind_name()
        ))),
    }
}

fn overflow(what: &str) -> Error {
    Error::EvalError(format!("Integer overflow in {what}"))
}

// Variadic arithmetic runs in a wider type. Only the final result has to fit, so
// `(+ MAX 1 -1)` is MAX rather than an overflow.
type Wide = i128;

fn narrow(total: Wide, what: &str) -> Result<Value, Error> {
    NumberType::try_from(total)
        .map(Value::Number)
        .map_err(|_| overflow(what))
}

fn wide_sum(op: &str, args: &[Value]) -> Result<Wide, Error> {
    args.iter().try_fold(0, |sum: Wide, arg| {
        sum.checked_add(Wide::from(expect_number(op, arg)?))
            .ok_or_else(|| overflow("addition"))
    })
}

fn builtin_add(args: &[Value]) -> Result<Value, Error> {
    narrow(wide_sum("+", args)?, "addition")
}

fn builtin_mul(args: &[Value]) -> Result<Value, Error> {
    let factors = args
        .iter()
        .map(|arg| expect_number("*", arg))
        .collect::<Result<Vec<_>, _>>()?;

    // |product| never shrinks past a nonzero factor, so once the wide product
    // overflows the result cannot fit either.
    if factors.contains(&0) {
        return Ok(Value::Number(0));
    }
    let product = factors.iter().try_fold(1, |product: Wide, factor| {
        product
            .checked_mul(Wide::from(*factor))
            .ok_or_else(|| overflow("multiplication"))
    })?;
    narrow(product, "multiplication")
}

/// `(- x)` negates; `(- x y ...)` is x minus the sum of the rest.
fn builtin_sub(args: &[Value]) -> Result<Value, Error> {
    let [first, rest @ ..] = args else {
        return Err(Error::arity_error_with_expr(1, 0, "-"));
    };
    let first = Wide::from(expect_number("-", first)?);

    if rest.is_empty() {
        return narrow(-first, "negation");
    }

    let subtrahend = wide_sum("-", rest)?;
    let difference = first
        .checked_sub(subtrahend)
        .ok_or_else(|| overflow("subtraction"))?;
    narrow(difference, "subtraction")
}

fn builtin_div(args: &[Value]) -> Result<Value, Error> {
    let [dividend, divisor] = args else {
        return Err(Error::arity_error_with_expr(2, args.len(), "/"));
    };
    let dividend = expect_number("/", dividend)?;
    let divisor = expect_number("/", divisor)?;

    if divisor == 0 {
        return Err(Error::DivideByZero);
    }

    // Integer division truncates toward zero; only MIN / -1 can overflow.
    dividend
        .checked_div(divisor)
        .map(Value::Number)
        .ok_or_else(|| overflow("division"))
}

fn builtin_car(args: &[Value]) -> Result<Value, Error> {
    let [list] = args else {
        return Err(Error::arity_error_with_expr(1, args.len(), "car"));
    };
    match expect_list("car", list)? {
        [first, ..] => Ok(first.clone()),
        [] => Err(Error::EvalError("car of empty list".into())),
    }
}

fn builtin_cdr(args: &[Value]) -> Result<Value, Error> {
    let [list] = args else {
        return Err(Error::arity_error_with_expr(1, args.len(), "cdr"));
    };
    match expect_list("cdr", list)? {
        [_, rest @ ..] => Ok(Value::list(rest.iter().cloned())),
        [] => Err(Error::EvalError("cdr of empty list".into())),
    }
}

// Macro to generate numeric comparison functions
macro_rules! numeric_comparison {
    ($name:ident, $op:tt, $op_str:expr) => {
        fn $name(args: &[Value]) -> Result<Value, Error> {
            let [left, right] = args else {
                return Err(Error::arity_error_with_expr(2, args.len(), $op_str));
            };
            let left = expect_number($op_str, left)?;
            let right = expect_number($op_str, right)?;
            Ok(Value::Number(NumberType::from(left $op right)))
        }
    };
}

numeric_comparison!(builtin_lt, <, "<");
numeric_comparison!(builtin_gt, >, ">");
numeric_comparison!(builtin_eq, ==, "=");
numeric_comparison!(builtin_le, <=, "<=");
numeric_comparison!(builtin_ge, >=, ">=");

/// Global registry of all built-in operations, in dispatch priority order.
static BUILTIN_OPS: &[BuiltinOp] = &[
    // Special forms
    BuiltinOp {
        id: QUOTE_KEYWORD,
        op_kind: OpKind::SpecialForm(SpecialForm::Quote),
        arity: Arity::Exact(1),
        availability: Availability::Everywhere,
    },
    BuiltinOp {
        id: IF_KEYWORD,
        op_kind: OpKind::SpecialForm(SpecialForm::If),
        arity: Arity::Exact(3),
        availability: Availability::EnvironmentOnly,
    },
    BuiltinOp {
        id: DEFUN_KEYWORD,
        op_kind: OpKind::SpecialForm(SpecialForm::Defun),
        arity: Arity::Exact(3),
        availability: Availability::EnvironmentOnly,
    },
    // Arithmetic operations
    BuiltinOp {
        id: "+",
        op_kind: OpKind::Function(builtin_add),
        arity: Arity::AtLeast(0),
        availability: Availability::Everywhere,
    },
    BuiltinOp {
        id: "*",
        op_kind: OpKind::Function(builtin_mul),
        arity: Arity::AtLeast(0),
        availability: Availability::Everywhere,
    },
    BuiltinOp {
        id: "-",
        op_kind: OpKind::Function(builtin_sub),
        arity: Arity::AtLeast(1),
        availability: Availability::Everywhere,
    },
    BuiltinOp {
        id: "/",
        op_kind: OpKind::Function(builtin_div),
        arity: Arity::Exact(2),
        availability: Availability::Everywhere,
    },
    // List operations
    BuiltinOp {
        id: "car",
        op_kind: OpKind::Function(builtin_car),
        arity: Arity::Exact(1),
        availability: Availability::Everywhere,
    },
    BuiltinOp {
        id: "cdr",
        op_kind: OpKind::Function(builtin_cdr),
        arity: Arity::Exact(1),
        availability: Availability::Everywhere,
    },
    // Comparison operations
    BuiltinOp {
        id: "<",
        op_kind: OpKind::Function(builtin_lt),
        arity: Arity::Exact(2),
        availability: Availability::EnvironmentOnly,
    },
    BuiltinOp {
        id: ">",
        op_kind: OpKind::Function(builtin_gt),
        arity: Arity::Exact(2),
        availability: Availability::EnvironmentOnly,
    },
    BuiltinOp {
        id: "=",
        op_kind: OpKind::Function(builtin_eq),
        arity: Arity::Exact(2),
        availability: Availability::EnvironmentOnly,
    },
    BuiltinOp {
        id: "<=",
        op_kind: OpKind::Function(builtin_le),
        arity: Arity::Exact(2),
        availability: Availability::EnvironmentOnly,
    },
    BuiltinOp {
        id: ">=",
        op_kind: OpKind::Function(builtin_ge),
        arity: Arity::Exact(2),
        availability: Availability::EnvironmentOnly,
    },
];

/// Lazy static map from id to BuiltinOp (private - use find_builtin_op)
static BUILTIN_BY_ID: LazyLock<HashMap<&'static str, &'static BuiltinOp>> =
    LazyLock::new(|| BUILTIN_OPS.iter().map(|op| (op.id, op)).collect());

/// All builtin operations in priority order
pub fn get_builtin_ops() -> &'static [BuiltinOp] {
    BUILTIN_OPS
}

/// Find a builtin operation by its head symbol text
pub fn find_builtin_op(id: &str) -> Option<&'static BuiltinOp> {
    BUILTIN_BY_ID.get(id).copied()
}
