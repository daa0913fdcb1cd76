//! The function store: user definitions created by `defun`.
//!
//! One store is shared by every [`Environment`](crate::evaluator::Environment) in a
//! session. Entries are kept in definition order. Redefining a name removes the old
//! entry before appending the new one, so a name maps to exactly one definition at
//! any time and the most recent definition sorts last.

use std::rc::Rc;

use crate::ast::Value;
use crate::intern::Symbol;

/// A user function: fixed parameter list plus a single body expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lambda {
    params: Vec<Symbol>,
    body: Value,
}

impl Lambda {
    pub fn new(params: Vec<Symbol>, body: Value) -> Self {
        Lambda { params, body }
    }

    pub fn params(&self) -> &[Symbol] {
        &self.params
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

/// Ordered name -> definition mapping, last write wins
#[derive(Debug, Default, Clone)]
pub struct FunctionStore {
    entries: Vec<(Symbol, Rc<Lambda>)>,
}

impl FunctionStore {
    pub fn new() -> Self {
        FunctionStore::default()
    }

    /// Define or redefine `name`. Returns the replaced definition, if any.
    pub fn define(&mut self, name: Symbol, lambda: Lambda) -> Option<Rc<Lambda>> {
        let previous = self
            .entries
            .iter()
            .position(|(existing, _)| *existing == name)
            .map(|index| self.entries.remove(index).1);
        self.entries.push((name, Rc::new(lambda)));
        previous
    }

    pub fn lookup(&self, name: Symbol) -> Option<&Lambda> {
        self.find(name).map(Rc::as_ref)
    }

    /// Shared handle to a definition, usable after the store is mutated again
    pub fn lookup_shared(&self, name: Symbol) -> Option<Rc<Lambda>> {
        self.find(name).cloned()
    }

    fn find(&self, name: Symbol) -> Option<&Rc<Lambda>> {
        self.entries
            .iter()
            .find(|(existing, _)| *existing == name)
            .map(|(_, lambda)| lambda)
    }

    pub fn contains(&self, name: Symbol) -> bool {
        self.find(name).is_some()
    }

    /// Definitions in definition order
    pub fn iter(&self) -> impl Iterator<Item = (Symbol, &Lambda)> {
        self.entries
            .iter()
            .map(|(name, lambda)| (*name, lambda.as_ref()))
    }

    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
