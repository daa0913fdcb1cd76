//! MiniLisp - a minimal McCarthy-style Lisp
//!
//! This crate provides a small S-expression language: a recursive-descent reader that
//! turns text into trees of interned symbols, numbers and lists, and a tree-walking
//! evaluator with user-defined functions, conditionals and comparisons.
//!
//! ```scheme
//! (+ 10 (* 2 5))                        ; arithmetic
//! (car '(10 20 30))                     ; list operations
//! (if (< 1 2) 42 (/ 1 0))               ; conditionals (short-circuit)
//! (defun square (x) (* x x))            ; function definition
//! (square 7)                            ; application
//! ```
//!
//! ## Evaluation Modes
//!
//! Two evaluators share one dispatch table:
//!
//! - [`evaluator::eval_pure`] is context-free: numbers, `quote`, and `+ - * / car cdr`.
//!   Any symbol in value position is unbound.
//! - [`evaluator::eval`] runs against an [`evaluator::Environment`] and adds `if`,
//!   `defun`, numeric comparisons, variable lookup and user function calls.
//!
//! ## Scoping
//!
//! A user function call copies the *caller's* bindings and pushes one binding per
//! parameter on top. The callee therefore sees the call-site scope, not the
//! definition-site scope. There are no closures.
//!
//! ## Modules
//!
//! - `intern`: symbol interner with cheap, comparable handles
//! - `ast`: the [`ast::Value`] S-expression type
//! - `parser`: text to [`ast::Value`]
//! - `builtinops`: registry of special forms and built-in operators
//! - `functions`: the shared function store
//! - `evaluator`: environments and both evaluators
//! - `session`: host-facing convenience bundling an interner and a function store

/// Type alias for number values in the interpreter
pub type NumberType = i64;

/// Head symbol of the quote special form; `'x` reads as `(quote x)`
pub const QUOTE_KEYWORD: &str = "quote";

/// Head symbol of the conditional special form
pub const IF_KEYWORD: &str = "if";

/// Head symbol of the function definition special form
pub const DEFUN_KEYWORD: &str = "defun";

/// Categorizes the different kinds of parsing errors.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ParseErrorKind {
    /// Input ended before the expression was complete (empty input, unclosed parens)
    Incomplete,
    /// Invalid or unexpected syntax (empty atom, stray closing paren)
    InvalidSyntax,
    /// Extra input found after a complete, valid expression
    TrailingContent,
    /// Implementation-imposed limit exceeded (integer literal out of range)
    ImplementationLimit,
}

/// A structured error providing detailed information about a parsing failure.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub message: String,
    /// Context snippet from the input showing where the error occurred (max 100 chars)
    pub context: Option<String>,
    /// The problematic token or character encountered, if identifiable
    pub found: Option<String>,
}

impl ParseError {
    /// Create a ParseError with all fields
    pub fn new(
        kind: ParseErrorKind,
        message: impl Into<String>,
        context: Option<String>,
        found: Option<String>,
    ) -> Self {
        ParseError {
            kind,
            message: message.into(),
            context,
            found,
        }
    }

    /// Create a simple ParseError with a kind and message but no context
    pub fn from_message(kind: ParseErrorKind, message: impl Into<String>) -> Self {
        Self::new(kind, message, None, None)
    }

    /// Create a ParseError with context extracted from input at a given byte offset
    pub fn with_context(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
    ) -> Self {
        Self::with_context_and_found(kind, message, input, error_offset, None)
    }

    /// Create a ParseError with context and found token
    pub fn with_context_and_found(
        kind: ParseErrorKind,
        message: impl Into<String>,
        input: &str,
        error_offset: usize,
        found: Option<String>,
    ) -> Self {
        const MAX_CONTEXT: usize = 100;
        const LEAD_IN: usize = 20;

        // Offsets come from byte positions; count characters up to the error instead.
        let error_char = input
            .char_indices()
            .take_while(|(i, _)| *i < error_offset)
            .count();
        let context_start = error_char.saturating_sub(LEAD_IN);
        let total_chars = input.chars().count();

        let context_str: String = input
            .chars()
            .skip(context_start)
            .take(MAX_CONTEXT)
            .collect();

        let mut display_context = String::new();
        if context_start > 0 {
            display_context.push_str("[...]");
        }
        display_context.push_str(&context_str);
        if context_start + context_str.chars().count() < total_chars {
            display_context.push_str("[...]");
        }

        let display_context = display_context.replace('\n', "\\n").replace('\t', "\\t");

        Self::new(kind, message, Some(display_context), found)
    }
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(found) = &self.found {
            write!(f, "\nFound: {found}")?;
        }
        if let Some(context) = &self.context {
            write!(f, "\nContext: {context}")?;
        }
        Ok(())
    }
}

/// Error types for the interpreter
///
/// Stack exhaustion from very deep nesting or recursion is not represented here:
/// it aborts the process.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("ParseError: {0}")]
    ParseError(ParseError),
    #[error("EvaluationError: {0}")]
    EvalError(String),
    #[error("Type error: {0}")]
    TypeError(String),
    #[error("Unbound variable: {0}")]
    UnboundVariable(String),
    #[error("{}", format_arity(.expected, .got, .expression))]
    ArityError {
        expected: usize,
        got: usize,
        expression: Option<String>, // Optional expression context
    },
    #[error("Division by zero")]
    DivideByZero,
    #[error("Unknown operator: {0}")]
    UnknownOperator(String),
    #[error("EvaluationError: cannot evaluate empty list")]
    EmptyListEval,
}

fn format_arity(expected: &usize, got: &usize, expression: &Option<String>) -> String {
    match expression {
        Some(expr) => {
            format!("ArityError: {expr}: expected {expected} arguments, got {got}")
        }
        None => format!("ArityError: function expected {expected} arguments but got {got}"),
    }
}

impl Error {
    /// Create an ArityError without expression context
    pub fn arity_error(expected: usize, got: usize) -> Self {
        Error::ArityError {
            expected,
            got,
            expression: None,
        }
    }

    /// Create an ArityError naming the operator or function that rejected the call
    pub fn arity_error_with_expr(expected: usize, got: usize, expression: impl Into<String>) -> Self {
        Error::ArityError {
            expected,
            got,
            expression: Some(expression.into()),
        }
    }
}

impl From<ParseError> for Error {
    fn from(err: ParseError) -> Self {
        Error::ParseError(err)
    }
}

pub mod ast;
pub mod builtinops;
pub mod evaluator;
pub mod functions;
pub mod intern;
pub mod parser;
pub mod session;

pub use ast::Value;
pub use evaluator::{Environment, eval, eval_pure};
pub use functions::{FunctionStore, Lambda};
pub use intern::{Interner, Symbol};
pub use parser::{Reader, parse, parse_all, parse_exact};
pub use session::{Session, SessionConfig};
