//! Primary key interning.
//!
//! Every view bound to one table store shares a single `SymbolTable`, so a
//! key value maps to the same `Symbol` no matter which view interns it.

use crate::scalar::Scalar;
use alloc::vec::Vec;
use core::cell::RefCell;
use hashbrown::HashMap;

/// Canonical handle for an interned primary key.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Symbol(u32);

impl Symbol {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Default)]
struct Interned {
    ids: HashMap<Scalar, Symbol>,
    values: Vec<Scalar>,
}

/// Content-keyed interner for primary key scalars.
///
/// Interning takes `&self`; the table is shared between views behind an `Rc`
/// and mutated through a `RefCell`.
#[derive(Default)]
pub struct SymbolTable {
    inner: RefCell<Interned>,
}

impl SymbolTable {
    /// Creates an empty symbol table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the canonical symbol for `key`, interning it on first sight.
    pub fn intern(&self, key: &Scalar) -> Symbol {
        let mut inner = self.inner.borrow_mut();
        if let Some(&sym) = inner.ids.get(key) {
            return sym;
        }
        let sym = Symbol(inner.values.len() as u32);
        inner.values.push(key.clone());
        inner.ids.insert(key.clone(), sym);
        sym
    }

    /// Returns the symbol for `key` if it has been interned.
    pub fn lookup(&self, key: &Scalar) -> Option<Symbol> {
        self.inner.borrow().ids.get(key).copied()
    }

    /// Returns the key a symbol stands for.
    pub fn resolve(&self, sym: Symbol) -> Option<Scalar> {
        self.inner.borrow().values.get(sym.index()).cloned()
    }

    /// Returns the number of interned keys.
    pub fn len(&self) -> usize {
        self.inner.borrow().values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
