//! Symbol interning.
//!
//! Every symbol the reader produces goes through an [`Interner`], which stores one
//! permanent copy of each distinct name and hands back a [`Symbol`] handle. Handles are
//! `Copy` and compare in O(1) without touching the text.
//!
//! Storage is a bucket backend: interned strings are written into fixed-capacity
//! chunks that are never reallocated, so no entry moves once inserted. Clearing the
//! table bumps a generation counter carried by every handle. A handle issued before
//! [`Interner::clear`] therefore never compares equal to one issued after it, and no
//! longer resolves.
//!
//! The table also remembers which handles name a built-in operator. The entry is
//! recorded once, when a name is first interned, so evaluation dispatches on the
//! handle without going back to the text.

use string_interner::backend::BucketBackend;
use string_interner::{DefaultSymbol, StringInterner, Symbol as _};

use crate::builtinops::{BuiltinOp, find_builtin_op};

type SymbolTable = StringInterner<BucketBackend<DefaultSymbol>>;

/// Opaque handle to an interned symbol name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Symbol {
    generation: u64,
    id: DefaultSymbol,
}

/// Deduplicating symbol table.
pub struct Interner {
    table: SymbolTable,
    /// Built-in operator named by each symbol, indexed by symbol id
    builtins: Vec<Option<&'static BuiltinOp>>,
    generation: u64,
}

impl Default for Interner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Interner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interner")
            .field("generation", &self.generation)
            .field("len", &self.table.len())
            .finish()
    }
}

impl Interner {
    pub fn new() -> Self {
        Interner {
            table: SymbolTable::new(),
            builtins: Vec::new(),
            generation: 0,
        }
    }

    /// Return the handle for `text`, storing a copy on first sight.
    pub fn intern(&mut self, text: &str) -> Symbol {
        let id = self.table.get_or_intern(text);
        // Ids are dense, so a new name gets exactly the next slot
        if id.to_usize() == self.builtins.len() {
            self.builtins.push(find_builtin_op(text));
        }
        Symbol {
            generation: self.generation,
            id,
        }
    }

    /// Look up an existing handle without inserting.
    pub fn get(&self, text: &str) -> Option<Symbol> {
        self.table.get(text).map(|id| Symbol {
            generation: self.generation,
            id,
        })
    }

    /// Text behind a handle, or `None` for handles issued before the last `clear`.
    pub fn resolve(&self, symbol: Symbol) -> Option<&str> {
        if !self.is_current(symbol) {
            return None;
        }
        self.table.resolve(symbol.id)
    }

    /// Whether `symbol` was issued since the last `clear`
    pub fn is_current(&self, symbol: Symbol) -> bool {
        symbol.generation == self.generation
    }

    /// Built-in operator named by `symbol`. Stale handles name nothing.
    pub fn builtin_op(&self, symbol: Symbol) -> Option<&'static BuiltinOp> {
        if !self.is_current(symbol) {
            return None;
        }
        self.builtins.get(symbol.id.to_usize()).copied().flatten()
    }

    /// Resolve a handle for use in diagnostics; stale handles get a placeholder.
    pub(crate) fn name_of(&self, symbol: Symbol) -> String {
        self.resolve(symbol)
            .map_or_else(|| STALE_SYMBOL.to_owned(), str::to_owned)
    }

    pub fn size(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Drop every entry. All previously issued handles are invalidated.
    pub fn clear(&mut self) {
        self.table = SymbolTable::new();
        self.builtins.clear();
        self.generation += 1;
        tracing::debug!(generation = self.generation, "symbol table cleared");
    }
}

/// Placeholder text for handles that no longer resolve
pub(crate) const STALE_SYMBOL: &str = "#<stale-symbol>";
