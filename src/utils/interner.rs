//! Global String Interner
//!
//! Maps define names, define values and effect names to compact integer
//! [`Symbol`]s so that define sets and cache keys compare and hash as integers.

use std::sync::LazyLock;

use lasso::{Spur, ThreadedRodeo};

static INTERNER: LazyLock<ThreadedRodeo> = LazyLock::new(ThreadedRodeo::new);

/// Compact identifier of an interned string.
pub type Symbol = Spur;

/// Interns a string, returning the existing symbol if it was seen before.
#[inline]
pub fn intern(s: &str) -> Symbol {
    INTERNER.get_or_intern(s)
}

/// Looks up the symbol of an already-interned string without allocating.
#[inline]
pub fn get(s: &str) -> Option<Symbol> {
    INTERNER.get(s)
}

/// Resolves a symbol back to its string.
#[inline]
pub fn resolve(sym: Symbol) -> &'static str {
    INTERNER.resolve(&sym)
}

/// Pre-interns define names and values that nearly every effect uses, so the
/// first effect loads do not pay for them.
pub fn preload_common_symbols() {
    let common = [
        // Shading styles / capabilities
        "USE_GLSL",
        "USE_SHADOW",
        "USE_SHADOW_PCF",
        "USE_FOG",
        "USE_INSTANCING",
        "USE_GPU_SKINNING",
        "USE_NORMAL_MAP",
        "USE_SPECULAR_MAP",
        "USE_OBJECTCOLOR",
        "USE_PLAYERCOLOR",
        "USE_TRANSPARENT",
        "IGNORE_LOS",
        "MODE_SHADOWCAST",
        "MODE_WIREFRAME",
        "MODE_SILHOUETTEOCCLUDER",
        "MODE_SILHOUETTEDISPLAY",
        // Common values
        "0",
        "1",
        "true",
        "false",
    ];

    for name in common {
        intern(name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_and_resolve() {
        let s1 = intern("hello");
        let s2 = intern("hello");
        let s3 = intern("world");

        assert_eq!(s1, s2);
        assert_ne!(s1, s3);

        assert_eq!(resolve(s1), "hello");
        assert_eq!(resolve(s3), "world");
    }

    #[test]
    fn test_get() {
        let _ = intern("existing_symbol");

        assert!(get("existing_symbol").is_some());
        assert!(get("never_interned_symbol").is_none());
    }

    #[test]
    fn test_preload() {
        preload_common_symbols();
        assert!(get("USE_SHADOW").is_some());
        assert!(get("1").is_some());
    }
}
