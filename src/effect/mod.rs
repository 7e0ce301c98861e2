//! Effects
//!
//! An effect is a named set of alternative [`Technique`]s. Loading an effect
//! selects one technique for the active backend and define set, and expands
//! it into ordered [`Pass`]es, each pairing fixed-function pipeline state with
//! a program from the [`ProgramCache`].
//!
//! Compiled techniques are memoized by [`EffectCache`] under an
//! [`EffectCacheKey`]; failures are memoized too.

pub mod compiler;
pub mod patch;

use std::sync::Arc;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::defines::DefineSet;
use crate::pipeline::GraphicsPipelineStateDesc;
use crate::program::{LoaderContext, ProgramCache, ProgramHandle};
use crate::utils::interner::{self, Symbol};

pub use compiler::{compile_effect, is_usable, select_technique};

/// One draw of a technique: pipeline state plus the program to bind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pass {
    pipeline_state: GraphicsPipelineStateDesc,
    program: Option<ProgramHandle>,
    shader: String,
    defines: DefineSet,
}

impl Pass {
    #[inline]
    #[must_use]
    pub fn pipeline_state(&self) -> &GraphicsPipelineStateDesc {
        &self.pipeline_state
    }

    /// Program bound by this pass. `None` when its descriptor failed to load.
    ///
    /// The handle is shared with the program cache and survives hot reloads.
    #[inline]
    #[must_use]
    pub fn program(&self) -> Option<ProgramHandle> {
        self.program
    }

    /// Name of the program descriptor.
    #[must_use]
    pub fn shader(&self) -> &str {
        &self.shader
    }

    /// Defines the program was compiled with.
    #[must_use]
    pub fn defines(&self) -> &DefineSet {
        &self.defines
    }
}

/// The selected alternative of an effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Technique {
    passes: SmallVec<[Pass; 2]>,
    sort_by_distance: bool,
}

impl Technique {
    /// Passes in declaration order.
    #[inline]
    #[must_use]
    pub fn passes(&self) -> &[Pass] {
        &self.passes
    }

    #[must_use]
    pub fn num_passes(&self) -> usize {
        self.passes.len()
    }

    #[must_use]
    pub fn pass(&self, index: usize) -> Option<&Pass> {
        self.passes.get(index)
    }

    /// Whether draws using this technique must be sorted back to front.
    #[inline]
    #[must_use]
    pub fn sort_by_distance(&self) -> bool {
        self.sort_by_distance
    }
}

/// Identity of a compiled effect.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EffectCacheKey {
    pub name: Symbol,
    pub defines: DefineSet,
}

impl EffectCacheKey {
    #[must_use]
    pub fn new(name: &str, defines: &DefineSet) -> Self {
        Self {
            name: interner::intern(name),
            defines: defines.clone(),
        }
    }
}

/// Memoizes `(effect name, define set) → technique`.
#[derive(Debug, Default)]
pub struct EffectCache {
    techniques: FxHashMap<EffectCacheKey, Option<Arc<Technique>>>,
}

impl EffectCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the technique for `(name, defines)`, compiling it on first
    /// use. Failures are logged and cached as `None`.
    pub fn load(
        &mut self,
        ctx: &LoaderContext<'_>,
        programs: &mut ProgramCache,
        name: &str,
        defines: &DefineSet,
    ) -> Option<Arc<Technique>> {
        let key = EffectCacheKey::new(name, defines);
        if let Some(cached) = self.techniques.get(&key) {
            return cached.clone();
        }

        let technique = match compile_effect(ctx, programs, name, defines) {
            Ok(technique) => {
                log::debug!(
                    "Compiled effect '{name}' ({} passes)",
                    technique.num_passes()
                );
                Some(Arc::new(technique))
            }
            Err(e) => {
                log::error!("Failed to load effect '{name}': {e}");
                None
            }
        };

        self.techniques.insert(key, technique.clone());
        technique
    }

    /// Number of cache entries, failed loads included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.techniques.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.techniques.is_empty()
    }
}
