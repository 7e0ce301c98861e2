//! Program Cache
//!
//! Memoizes `(program name, define set) → program`. Programs live in a
//! [`SlotMap`] arena and are handed out as [`ProgramHandle`]s, which stay
//! valid across hot reloads.
//!
//! # Caching rules
//!
//! - A key is compiled at most once; repeated lookups return the same handle.
//! - A descriptor failure caches `None`, so a broken program is not re-parsed
//!   every frame.
//! - Nothing is evicted automatically. Dropping the cache releases every GPU
//!   program through the backend.

use std::path::{Path, PathBuf};

use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::backend::ShaderBackend;
use crate::defines::DefineSet;
use crate::hotload::HotReloadTracker;

use super::CompiledProgram;
use super::loader::{LoaderContext, load_program_desc};

new_key_type! {
    /// Stable, generation-checked identity of a cached program.
    pub struct ProgramHandle;
}

/// Identity of a compiled program.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProgramCacheKey {
    pub name: String,
    pub defines: DefineSet,
}

/// Arena of compiled programs plus the lookup table keyed by
/// [`ProgramCacheKey`].
pub struct ProgramCache {
    backend: Box<dyn ShaderBackend>,
    programs: SlotMap<ProgramHandle, CompiledProgram>,
    lookup: FxHashMap<ProgramCacheKey, Option<ProgramHandle>>,
    hotload: HotReloadTracker<ProgramHandle>,
    /// Paths registered through [`register_dependency`](Self::register_dependency).
    extra_dependencies: FxHashMap<ProgramHandle, SmallVec<[PathBuf; 2]>>,
}

impl ProgramCache {
    #[must_use]
    pub fn new(backend: Box<dyn ShaderBackend>) -> Self {
        Self {
            backend,
            programs: SlotMap::with_key(),
            lookup: FxHashMap::default(),
            hotload: HotReloadTracker::new(),
            extra_dependencies: FxHashMap::default(),
        }
    }

    #[inline]
    #[must_use]
    pub fn backend(&self) -> &dyn ShaderBackend {
        self.backend.as_ref()
    }

    /// Returns the program for `(name, defines)`, loading it on first use.
    ///
    /// `None` means the descriptor could not be loaded; that outcome is cached
    /// as well.
    pub fn load(
        &mut self,
        ctx: &LoaderContext<'_>,
        name: &str,
        defines: &DefineSet,
    ) -> Option<ProgramHandle> {
        let key = ProgramCacheKey {
            name: name.to_string(),
            defines: defines.clone(),
        };
        if let Some(&cached) = self.lookup.get(&key) {
            return cached;
        }

        let handle = match load_program_desc(ctx, name, defines) {
            Ok(desc) => Some(self.insert(desc)),
            Err(e) => {
                log::error!("Failed to load shader '{name}': {e}");
                None
            }
        };

        self.lookup.insert(key, handle);
        handle
    }

    fn insert(&mut self, desc: super::ProgramDesc) -> ProgramHandle {
        log::debug!("Compiling program '{}'", desc.name);
        let handle = self.programs.insert(CompiledProgram::new(desc));
        self.programs[handle].reload(self.backend.as_mut());
        self.track(handle);
        handle
    }

    /// Replaces every tracker entry of `handle` with its current dependencies.
    fn track(&mut self, handle: ProgramHandle) {
        self.hotload.unregister(handle);
        let Some(program) = self.programs.get(handle) else {
            return;
        };
        let extra = self.extra_dependencies.get(&handle).into_iter().flatten();
        for path in program.file_dependencies().iter().chain(extra) {
            self.hotload.register(handle, path.clone());
        }
    }

    #[inline]
    #[must_use]
    pub fn get(&self, handle: ProgramHandle) -> Option<&CompiledProgram> {
        self.programs.get(handle)
    }

    /// Reloads every live program depending on `path`. Returns how many were
    /// reloaded; unknown paths reload nothing.
    pub fn reload_changed_file(&mut self, path: &Path) -> usize {
        let targets: SmallVec<[ProgramHandle; 4]> =
            self.hotload.live_dependents(path, &self.programs).collect();

        for &handle in &targets {
            let program = &mut self.programs[handle];
            log::info!(
                "Reloading program '{}' ({} changed)",
                program.name(),
                path.display()
            );
            program.reload(self.backend.as_mut());
            self.track(handle);
        }
        targets.len()
    }

    /// Adds a hot-reload association between `handle` and `path`.
    pub fn register_dependency(&mut self, handle: ProgramHandle, path: &Path) {
        if !self.programs.contains_key(handle) {
            return;
        }
        let extra = self.extra_dependencies.entry(handle).or_default();
        if !extra.iter().any(|known| known == path) {
            extra.push(path.to_path_buf());
        }
        self.hotload.register(handle, path);
    }

    /// Removes every hot-reload association of `handle`.
    pub fn unregister_dependencies(&mut self, handle: ProgramHandle) {
        self.hotload.unregister(handle);
        self.extra_dependencies.remove(&handle);
    }

    #[must_use]
    pub fn tracker(&self) -> &HotReloadTracker<ProgramHandle> {
        &self.hotload
    }

    /// Number of cache entries, failed loads included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lookup.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lookup.is_empty()
    }
}

impl Drop for ProgramCache {
    fn drop(&mut self) {
        for (_, program) in &mut self.programs {
            program.release(self.backend.as_mut());
        }
    }
}
