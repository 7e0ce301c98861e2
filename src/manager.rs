//! Shader Manager
//!
//! Owns the program and effect caches together with the collaborators they
//! need (file system, schema validator, condition evaluator, backend).
//!
//! | Method | Result |
//! |--------|--------|
//! | [`ShaderManager::load_program`] | one program, by descriptor name + defines |
//! | [`ShaderManager::load_effect`]  | the selected technique of an effect |
//!
//! Both are memoized, failures included, and never return an error: failures
//! are logged and yield `None`.
//!
//! # Threading
//!
//! The manager is used from a single owner thread. File watchers living on
//! other threads send changed paths through [`ShaderManager::file_change_sender`];
//! the owner drains them with [`ShaderManager::process_file_changes`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use flume::{Receiver, Sender};
use rustc_hash::FxHashSet;

use crate::backend::{BackendCapabilities, ShaderBackend};
use crate::conditional::{ConditionEvaluator, PreprocessorEvaluator};
use crate::defines::DefineSet;
use crate::effect::{EffectCache, Technique};
use crate::io::VirtualFileSystem;
use crate::markup::{BuiltinSchemas, SchemaValidator};
use crate::program::{CompiledProgram, LoaderContext, ProgramCache, ProgramHandle};
use crate::settings::ShaderSettings;
use crate::utils::interner;

pub struct ShaderManager {
    settings: ShaderSettings,
    fs: Box<dyn VirtualFileSystem>,
    validator: Box<dyn SchemaValidator>,
    evaluator: Box<dyn ConditionEvaluator>,
    programs: ProgramCache,
    effects: EffectCache,
    change_tx: Sender<PathBuf>,
    change_rx: Receiver<PathBuf>,
}

impl ShaderManager {
    pub fn new(
        settings: ShaderSettings,
        backend: impl ShaderBackend + 'static,
        fs: impl VirtualFileSystem + 'static,
    ) -> Self {
        if settings.preload_symbols {
            interner::preload_common_symbols();
        }
        let (change_tx, change_rx) = flume::unbounded();

        Self {
            settings,
            fs: Box::new(fs),
            validator: Box::new(BuiltinSchemas),
            evaluator: Box::new(PreprocessorEvaluator),
            programs: ProgramCache::new(Box::new(backend)),
            effects: EffectCache::new(),
            change_tx,
            change_rx,
        }
    }

    /// Replaces the conditional expression evaluator.
    #[must_use]
    pub fn with_evaluator(mut self, evaluator: impl ConditionEvaluator + 'static) -> Self {
        self.evaluator = Box::new(evaluator);
        self
    }

    /// Replaces the program descriptor validator.
    #[must_use]
    pub fn with_validator(mut self, validator: impl SchemaValidator + 'static) -> Self {
        self.validator = Box::new(validator);
        self
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &ShaderSettings {
        &self.settings
    }

    #[must_use]
    pub fn capabilities(&self) -> BackendCapabilities {
        self.programs.backend().capabilities()
    }

    /// Splits `self` into a loader context and the caches it feeds.
    fn split(&mut self) -> (LoaderContext<'_>, &mut ProgramCache, &mut EffectCache) {
        let ctx = LoaderContext {
            settings: &self.settings,
            fs: self.fs.as_ref(),
            validator: self.validator.as_ref(),
            evaluator: self.evaluator.as_ref(),
            capabilities: self.programs.backend().capabilities(),
        };
        (ctx, &mut self.programs, &mut self.effects)
    }

    // ========================================================================
    // Programs
    // ========================================================================

    /// Loads program `name` compiled with `defines`.
    pub fn load_program(&mut self, name: &str, defines: &DefineSet) -> Option<ProgramHandle> {
        let (ctx, programs, _) = self.split();
        programs.load(&ctx, name, defines)
    }

    #[inline]
    #[must_use]
    pub fn program(&self, handle: ProgramHandle) -> Option<&CompiledProgram> {
        self.programs.get(handle)
    }

    #[must_use]
    pub fn num_programs_loaded(&self) -> usize {
        self.programs.len()
    }

    // ========================================================================
    // Effects
    // ========================================================================

    /// Loads effect `name` with `defines` and returns its selected technique.
    pub fn load_effect(&mut self, name: &str, defines: &DefineSet) -> Option<Arc<Technique>> {
        let (ctx, programs, effects) = self.split();
        effects.load(&ctx, programs, name, defines)
    }

    /// [`load_effect`](Self::load_effect) with no defines.
    pub fn load_effect_default(&mut self, name: &str) -> Option<Arc<Technique>> {
        self.load_effect(name, &DefineSet::new())
    }

    #[must_use]
    pub fn num_effects_loaded(&self) -> usize {
        self.effects.len()
    }

    // ========================================================================
    // Hot reload
    // ========================================================================

    /// Reloads every live program built from `path`. Unknown paths are a no-op.
    ///
    /// Returns the number of programs reloaded.
    pub fn reload_changed_file(&mut self, path: &Path) -> usize {
        self.programs.reload_changed_file(path)
    }

    /// Sender for changed paths, usable from any thread.
    #[must_use]
    pub fn file_change_sender(&self) -> Sender<PathBuf> {
        self.change_tx.clone()
    }

    /// Reloads programs for every path queued through
    /// [`file_change_sender`](Self::file_change_sender). A path queued several
    /// times since the last call is handled once.
    pub fn process_file_changes(&mut self) -> usize {
        let mut seen = FxHashSet::default();
        let mut reloaded = 0;
        while let Ok(path) = self.change_rx.try_recv() {
            if seen.insert(path.clone()) {
                reloaded += self.programs.reload_changed_file(&path);
            }
        }
        reloaded
    }

    /// Makes `handle` reload whenever `path` changes.
    pub fn register_dependency(&mut self, handle: ProgramHandle, path: &Path) {
        self.programs.register_dependency(handle, path);
    }

    /// Stops reloading `handle` on file changes. The program stays cached.
    pub fn unregister_program(&mut self, handle: ProgramHandle) {
        self.programs.unregister_dependencies(handle);
    }

    #[must_use]
    pub fn tracked_paths(&self) -> usize {
        self.programs.tracker().tracked_paths()
    }
}
