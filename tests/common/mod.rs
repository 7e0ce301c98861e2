//! Shared fixtures for the integration tests.
//!
//! - `RecordingBackend`: a `ShaderBackend` that logs every link/release into a
//!   shared `BackendLog` and can be told to fail or report includes
//! - `CountingFileSystem`: a `MemoryFileSystem` that counts reads
//! - `fixture_fs`: the descriptors most tests load

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use myth_effects::{
    BackendCapabilities, DefineSet, GpuProgramId, LinkRequest, LinkedProgram, MemoryFileSystem,
    ShaderBackend, ShaderManager, ShaderSettings, VirtualFileSystem,
};
use rustc_hash::{FxHashMap, FxHashSet};

pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// ============================================================================
// Backend
// ============================================================================

#[derive(Debug, Default)]
pub struct BackendLog {
    /// `(program name, defines)` of every link attempt, in order.
    pub links: Vec<(String, DefineSet)>,
    pub released: Vec<GpuProgramId>,
    /// Programs whose link fails.
    pub failing: FxHashSet<String>,
    /// Extra files reported for a program.
    pub includes: FxHashMap<String, Vec<PathBuf>>,
    next_id: u64,
}

impl BackendLog {
    pub fn link_count(&self, program: &str) -> usize {
        self.links.iter().filter(|(name, _)| name == program).count()
    }
}

#[derive(Clone)]
pub struct RecordingBackend {
    pub log: Rc<RefCell<BackendLog>>,
    pub capabilities: BackendCapabilities,
}

impl RecordingBackend {
    pub fn new(capabilities: BackendCapabilities) -> Self {
        Self {
            log: Rc::default(),
            capabilities,
        }
    }
}

impl ShaderBackend for RecordingBackend {
    fn capabilities(&self) -> BackendCapabilities {
        self.capabilities
    }

    fn link(&mut self, request: &LinkRequest<'_>) -> Result<LinkedProgram, String> {
        let mut log = self.log.borrow_mut();
        log.links
            .push((request.name.to_string(), request.defines.clone()));

        if log.failing.contains(request.name) {
            return Err(format!("{}: syntax error", request.vertex_file.display()));
        }

        log.next_id += 1;
        Ok(LinkedProgram {
            id: GpuProgramId(log.next_id),
            includes: log.includes.get(request.name).cloned().unwrap_or_default(),
        })
    }

    fn release(&mut self, program: GpuProgramId) {
        self.log.borrow_mut().released.push(program);
    }
}

// ============================================================================
// File system
// ============================================================================

#[derive(Clone, Default)]
pub struct CountingFileSystem {
    pub inner: MemoryFileSystem,
    pub reads: Rc<Cell<usize>>,
}

impl CountingFileSystem {
    pub fn new(inner: MemoryFileSystem) -> Self {
        Self {
            inner,
            reads: Rc::default(),
        }
    }
}

impl VirtualFileSystem for CountingFileSystem {
    fn read_to_string(&self, path: &Path) -> io::Result<String> {
        self.reads.set(self.reads.get() + 1);
        self.inner.read_to_string(path)
    }
}

// ============================================================================
// Descriptors
// ============================================================================

pub const MODEL_PROGRAM: &str = r#"<program type="glsl">
    <define name="USE_INSTANCING" value="1"/>
    <vertex file="glsl/model.vs">
        <stream name="pos"/>
        <stream name="normal"/>
        <stream name="uv0" if="USE_TEXTURE"/>
        <attrib name="a_vertex" semantics="gl_Vertex"/>
        <attrib name="a_normal" semantics="gl_Normal"/>
        <attrib name="a_uv0" semantics="gl_MultiTexCoord0" if="USE_TEXTURE"/>
        <attrib name="a_transform" semantics="CustomAttribute0" if="USE_INSTANCING"/>
    </vertex>
    <fragment file="glsl/model.fs"/>
</program>"#;

pub const SOLID_PROGRAM: &str = r#"<program type="glsl">
    <vertex file="glsl/solid.vs">
        <stream name="pos"/>
        <attrib name="a_vertex" semantics="gl_Vertex"/>
    </vertex>
    <fragment file="glsl/solid.fs"/>
</program>"#;

pub const LEGACY_PROGRAM: &str = r#"<program type="arb">
    <vertex file="arb/model.vp">
        <uniform name="transform" loc="0"/>
    </vertex>
    <fragment file="arb/model.fp">
        <uniform name="baseTex" loc="0" type="sampler2D"/>
    </fragment>
</program>"#;

pub fn fixture_fs() -> MemoryFileSystem {
    MemoryFileSystem::new()
        .with_file("shaders/model.xml", MODEL_PROGRAM)
        .with_file("shaders/solid.xml", SOLID_PROGRAM)
        .with_file("shaders/legacy.xml", LEGACY_PROGRAM)
}

pub fn manager_with(fs: MemoryFileSystem) -> (ShaderManager, Rc<RefCell<BackendLog>>) {
    init_logger();
    let backend = RecordingBackend::new(BackendCapabilities::desktop_gl());
    let log = Rc::clone(&backend.log);
    (ShaderManager::new(ShaderSettings::default(), backend, fs), log)
}
