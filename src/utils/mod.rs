//! Utility Module
//!
//! - [`interner`]: String interning for define names, values and effect names
//!
//! Interned strings ([`Symbol`]s) compare in O(1) time:
//!
//! ```rust,ignore
//! use myth_effects::utils::interner;
//!
//! let sym1 = interner::intern("USE_SHADOW");
//! let sym2 = interner::intern("USE_SHADOW");
//! assert_eq!(sym1, sym2);
//! ```

pub mod interner;

pub use interner::Symbol;
