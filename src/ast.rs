//! This module defines the S-expression type shared by the reader and both evaluators.
//! A [`Value`] is exactly one of a number, an interned symbol, or a list; there is no
//! representation in which a value is both an atom and a list, or neither.
//!
//! Lists are reference-counted slices, so copying a value (for example when a function
//! call snapshots the caller's bindings) never deep-copies list structure. Lists are
//! never mutated in place: `cdr` builds a new list.
//!
//! Symbols are handles into an [`Interner`], so printing needs the interner that
//! issued them; see [`Value::display`].

use std::fmt;
use std::rc::Rc;

use crate::intern::{Interner, STALE_SYMBOL, Symbol};
use crate::{Error, NumberType};

/// Core S-expression type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Numbers (signed integers only)
    Number(NumberType),
    /// Interned symbols (identifiers)
    Symbol(Symbol),
    /// Ordered lists; the empty list is a valid datum but cannot be evaluated
    List(Rc<[Value]>),
}

impl Value {
    /// Build a list from anything that yields values
    pub fn list<I: IntoIterator<Item = Value>>(items: I) -> Value {
        Value::List(items.into_iter().collect())
    }

    /// The empty list
    pub fn nil() -> Value {
        Value::list(std::iter::empty())
    }

    pub fn as_number(&self) -> Option<NumberType> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Symbol(_) | Value::List(_) => None,
        }
    }

    pub fn as_symbol(&self) -> Option<Symbol> {
        match self {
            Value::Symbol(s) => Some(*s),
            Value::Number(_) | Value::List(_) => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            Value::Number(_) | Value::Symbol(_) => None,
        }
    }

    pub fn is_atom(&self) -> bool {
        !matches!(self, Value::List(_))
    }

    /// Check if a value represents nil (empty list)
    pub fn is_nil(&self) -> bool {
        matches!(self, Value::List(list) if list.is_empty())
    }

    /// Short variant name for type errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::Symbol(_) => "symbol",
            Value::List(_) => "list",
        }
    }

    /// Render this value as re-readable text using the interner that issued its symbols
    pub fn display<'a>(&'a self, interner: &'a Interner) -> DisplayValue<'a> {
        DisplayValue {
            value: self,
            interner,
        }
    }
}

/// Printable view of a [`Value`], returned by [`Value::display`]
pub struct DisplayValue<'a> {
    value: &'a Value,
    interner: &'a Interner,
}

impl fmt::Display for DisplayValue<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.value {
            Value::Number(n) => write!(f, "{n}"),
            Value::Symbol(s) => match self.interner.resolve(*s) {
                Some(name) => write!(f, "{name}"),
                None => write!(f, "{STALE_SYMBOL}"),
            },
            Value::List(elements) => {
                write!(f, "(")?;
                for (i, elem) in elements.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", elem.display(self.interner))?;
                }
                write!(f, ")")
            }
        }
    }
}

// From trait implementations for Value - enables .into() conversion

impl From<Symbol> for Value {
    fn from(s: Symbol) -> Self {
        Value::Symbol(s)
    }
}

macro_rules! impl_from_integer {
    ($int_type:ty) => {
        impl From<$int_type> for Value {
            fn from(n: $int_type) -> Self {
                Value::Number(NumberType::from(n))
            }
        }
    };
}

impl_from_integer!(i8);
impl_from_integer!(i16);
impl_from_integer!(i32);
impl_from_integer!(NumberType);
impl_from_integer!(u8);
impl_from_integer!(u16);
impl_from_integer!(u32);

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(v: Vec<T>) -> Self {
        Value::list(v.into_iter().map(Into::into))
    }
}

impl<T: Into<Value>, const N: usize> From<[T; N]> for Value {
    fn from(arr: [T; N]) -> Self {
        Value::list(arr.into_iter().map(Into::into))
    }
}

impl TryFrom<Value> for NumberType {
    type Error = Error;

    fn try_from(value: Value) -> Result<NumberType, Error> {
        match value {
            Value::Number(n) => Ok(n),
            other => Err(Error::TypeError(format!(
                "expected number, got {}",
                other.kind_name()
            ))),
        }
    }
}

/// Helper function for creating Values - works great in mixed lists!
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn val<T: Into<Value>>(value: T) -> Value {
    value.into()
}

/// Helper function for creating empty lists (nil)
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn nil() -> Value {
    Value::nil()
}
