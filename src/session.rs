//! Host-facing session.
//!
//! A [`Session`] owns the interner and function store that one REPL or embedding
//! evaluates against. Each top-level evaluation gets a fresh [`Environment`], so
//! variable bindings never survive between inputs while function definitions do.
//!
//! ```
//! use minilisp::Session;
//!
//! let mut session = Session::new();
//! session.eval_str("(defun square (x) (* x x))").unwrap();
//! assert_eq!(session.eval_to_number("(square 7)"), 49);
//! assert_eq!(session.eval_to_number("(car '())"), 0);
//! ```

use crate::ast::{DisplayValue, Value};
use crate::evaluator::{self, Environment};
use crate::functions::FunctionStore;
use crate::intern::Interner;
use crate::parser::{self, Reader};
use crate::{Error, NumberType};

/// Result value used by [`Session::eval_to_number`] for errors and non-numeric results
pub const NON_NUMERIC_SENTINEL: NumberType = 0;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionConfig {
    /// Render non-numeric results in full instead of as the sentinel `0`
    pub echo_non_numeric: bool,
}

#[derive(Debug, Default)]
pub struct Session {
    interner: Interner,
    functions: FunctionStore,
    config: SessionConfig,
}

impl Session {
    pub fn new() -> Self {
        Session::default()
    }

    pub fn with_config(config: SessionConfig) -> Self {
        Session {
            config,
            ..Session::default()
        }
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    pub fn functions(&self) -> &FunctionStore {
        &self.functions
    }

    /// Parse the first form in `text`, interning its symbols into this session.
    /// Anything after that form is ignored.
    pub fn parse(&mut self, text: &str) -> Result<Value, Error> {
        parser::parse(text, &mut self.interner)
    }

    /// Evaluate a parsed form in a fresh environment
    pub fn eval(&mut self, expr: &Value) -> Result<Value, Error> {
        let mut env = Environment::new(&mut self.functions, &self.interner);
        evaluator::eval(expr, &mut env)
    }

    /// Evaluate a parsed form with the context-free evaluator
    pub fn eval_pure(&self, expr: &Value) -> Result<Value, Error> {
        evaluator::eval_pure(expr, &self.interner)
    }

    /// Parse and evaluate the first form in `text`
    pub fn eval_str(&mut self, text: &str) -> Result<Value, Error> {
        let expr = self.parse(text)?;
        self.eval(&expr)
    }

    /// Parse and evaluate every form in `text` in order, stopping at the first error.
    ///
    /// Forms are read one at a time, so a definition earlier in the buffer is in
    /// effect for later forms even when a subsequent form fails to parse.
    pub fn eval_all(&mut self, text: &str) -> Result<Vec<Value>, Error> {
        let mut reader = Reader::new(text);
        let mut results = Vec::new();
        while let Some(form) = self.read_next(&mut reader) {
            let form = form?;
            results.push(self.eval(&form)?);
        }
        Ok(results)
    }

    /// Read the next form from `reader` into this session, or `None` at end of input
    pub fn read_next(&mut self, reader: &mut Reader<'_>) -> Option<Result<Value, Error>> {
        reader.next_form(&mut self.interner)
    }

    /// Evaluate one form and extract a number.
    ///
    /// Errors and non-numeric results (such as the name returned by `defun`) both
    /// yield [`NON_NUMERIC_SENTINEL`]. Hosts that must tell a real `0` apart should
    /// use [`Session::eval_str`] and inspect the value.
    pub fn eval_to_number(&mut self, text: &str) -> NumberType {
        match self.eval_str(text) {
            Ok(Value::Number(n)) => n,
            Ok(other) => {
                tracing::debug!(kind = other.kind_name(), "non-numeric result mapped to sentinel");
                NON_NUMERIC_SENTINEL
            }
            Err(err) => {
                tracing::debug!(error = %err, "evaluation failed; returning sentinel");
                NON_NUMERIC_SENTINEL
            }
        }
    }

    /// Printable form of a value using this session's symbols
    pub fn display<'a>(&'a self, value: &'a Value) -> DisplayValue<'a> {
        value.display(&self.interner)
    }

    /// Render a result following the configured convention
    pub fn render(&self, value: &Value) -> String {
        match value {
            Value::Number(n) => n.to_string(),
            Value::Symbol(_) | Value::List(_) if self.config.echo_non_numeric => {
                self.display(value).to_string()
            }
            Value::Symbol(_) | Value::List(_) => NON_NUMERIC_SENTINEL.to_string(),
        }
    }

    /// Forget every function and every interned symbol.
    ///
    /// Values parsed before the reset hold stale symbols and must not be evaluated
    /// afterwards.
    pub fn reset(&mut self) {
        self.functions.clear();
        self.interner.clear();
        tracing::debug!("session reset");
    }
}
