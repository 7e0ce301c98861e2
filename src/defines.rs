//! Define Sets
//!
//! A [`DefineSet`] is the preprocessor-like state that gates descriptor
//! parsing and keys both caches. Names and values are interned [`Symbol`]s,
//! so comparing and hashing a set is integer work.
//!
//! # Usage
//!
//! ```rust,ignore
//! use myth_effects::DefineSet;
//!
//! let mut defines = DefineSet::new();
//! defines.add("USE_SHADOW", "1");
//! defines.add("USE_SHADOW", "0"); // last write wins
//!
//! let hash = defines.compute_hash();
//! ```

use std::hash::{Hash, Hasher};

use crate::utils::interner::{self, Symbol};

/// An ordered collection of name → value definitions.
///
/// Entries are kept sorted by name symbol, so two sets holding the same
/// mapping are equal and hash identically regardless of insertion order.
///
/// # Performance
///
/// - Insertion/lookup: O(log n) binary search
/// - Equality/hash: O(n) over integer pairs
#[derive(Debug, Clone, Default)]
pub struct DefineSet {
    defines: Vec<(Symbol, Symbol)>,
}

impl DefineSet {
    /// Creates an empty define set.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            defines: Vec::new(),
        }
    }

    /// Adds a definition. An existing entry with the same name is overwritten.
    pub fn add(&mut self, name: &str, value: &str) {
        self.add_symbol(interner::intern(name), interner::intern(value));
    }

    /// Adds a definition from already-interned symbols.
    #[inline]
    pub fn add_symbol(&mut self, name: Symbol, value: Symbol) {
        match self.defines.binary_search_by_key(&name, |&(k, _)| k) {
            Ok(idx) => self.defines[idx].1 = value,
            Err(idx) => self.defines.insert(idx, (name, value)),
        }
    }

    /// Removes a definition, returning whether it was present.
    pub fn remove(&mut self, name: &str) -> bool {
        let Some(key) = interner::get(name) else {
            return false;
        };
        match self.defines.binary_search_by_key(&key, |&(k, _)| k) {
            Ok(idx) => {
                self.defines.remove(idx);
                true
            }
            Err(_) => false,
        }
    }

    /// Returns whether `name` is defined.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns the value bound to `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'static str> {
        let key = interner::get(name)?;
        self.defines
            .binary_search_by_key(&key, |&(k, _)| k)
            .ok()
            .map(|idx| interner::resolve(self.defines[idx].1))
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.defines.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.defines.is_empty()
    }

    /// Iterates all definitions as resolved strings, ordered by name symbol.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &'static str)> + '_ {
        self.defines
            .iter()
            .map(|&(k, v)| (interner::resolve(k), interner::resolve(v)))
    }

    /// Adds every definition of `other`, overriding same-name entries.
    pub fn merge(&mut self, other: &DefineSet) {
        for &(name, value) in &other.defines {
            self.add_symbol(name, value);
        }
    }

    /// Content hash, stable for equal sets.
    #[must_use]
    pub fn compute_hash(&self) -> u64 {
        use std::hash::BuildHasher;

        rustc_hash::FxBuildHasher.hash_one(self)
    }
}

impl Hash for DefineSet {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.defines.hash(state);
    }
}

impl PartialEq for DefineSet {
    fn eq(&self, other: &Self) -> bool {
        self.defines == other.defines
    }
}

impl Eq for DefineSet {}

impl From<&[(&str, &str)]> for DefineSet {
    fn from(defines: &[(&str, &str)]) -> Self {
        let mut result = Self {
            defines: Vec::with_capacity(defines.len()),
        };
        for (name, value) in defines {
            result.add(name, value);
        }
        result
    }
}

impl<const N: usize> From<[(&str, &str); N]> for DefineSet {
    fn from(defines: [(&str, &str); N]) -> Self {
        Self::from(&defines[..])
    }
}
