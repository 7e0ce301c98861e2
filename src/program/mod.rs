//! Shader Programs
//!
//! A program descriptor names one vertex and one fragment source plus the
//! bindings the backend needs to link them. Parsing produces a
//! [`ProgramDesc`]; the [`ProgramCache`] turns it into a [`CompiledProgram`]
//! living in an arena and addressed by a generation-checked [`ProgramHandle`].
//!
//! Two mutually exclusive binding styles exist, modelled by
//! [`ProgramInterface`]:
//!
//! | Style | Bindings |
//! |-------|----------|
//! | `Glsl` | vertex attribute locations |
//! | `Arb`  | explicit vertex and fragment uniform locations |

pub mod cache;
pub mod loader;

use std::path::{Path, PathBuf};

use bitflags::bitflags;
use rustc_hash::FxHashMap;
use smallvec::{SmallVec, smallvec};

use crate::backend::{GpuProgramId, LinkRequest, SamplerDimension, ShaderBackend, ShadingStyle};
use crate::defines::DefineSet;
use crate::utils::interner::{self, Symbol};

pub use cache::{ProgramCache, ProgramCacheKey, ProgramHandle};
pub use loader::{LoaderContext, attrib_location, parse_attrib_semantics};

bitflags! {
    /// Standard vertex input streams a program consumes.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct StreamFlags: u32 {
        const POS    = 1 << 0;
        const NORMAL = 1 << 1;
        const COLOR  = 1 << 2;
        const UV0    = 1 << 3;
        const UV1    = 1 << 4;
        const UV2    = 1 << 5;
        const UV3    = 1 << 6;
    }
}

impl StreamFlags {
    /// Maps a `<stream name="...">` value to its flag.
    #[must_use]
    pub fn from_stream_name(name: &str) -> Option<Self> {
        match name {
            "pos" => Some(Self::POS),
            "normal" => Some(Self::NORMAL),
            "color" => Some(Self::COLOR),
            "uv0" => Some(Self::UV0),
            "uv1" => Some(Self::UV1),
            "uv2" => Some(Self::UV2),
            "uv3" => Some(Self::UV3),
            _ => None,
        }
    }
}

/// A fragment-stage uniform of a legacy program.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FragmentUniform {
    pub location: i32,
    pub sampler: SamplerDimension,
}

/// Binding information, by program style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgramInterface {
    /// Modern programs bind vertex attributes to fixed locations.
    Glsl { attributes: FxHashMap<Symbol, u32> },
    /// Legacy programs need explicit per-stage uniform locations.
    Arb {
        vertex_uniforms: FxHashMap<Symbol, i32>,
        fragment_uniforms: FxHashMap<Symbol, FragmentUniform>,
    },
}

impl ProgramInterface {
    #[must_use]
    pub fn style(&self) -> ShadingStyle {
        match self {
            Self::Glsl { .. } => ShadingStyle::Glsl,
            Self::Arb { .. } => ShadingStyle::Arb,
        }
    }
}

/// A parsed program descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramDesc {
    pub name: String,
    pub vertex_file: PathBuf,
    pub fragment_file: PathBuf,
    /// Base defines plus every `<define>` of the descriptor.
    pub defines: DefineSet,
    pub interface: ProgramInterface,
    pub stream_flags: StreamFlags,
}

/// A program owned by the [`ProgramCache`].
///
/// The GPU handle may be swapped by [`reload`](Self::reload) at any time; the
/// program's identity (its [`ProgramHandle`]) never changes.
#[derive(Debug)]
pub struct CompiledProgram {
    desc: ProgramDesc,
    gpu: Option<GpuProgramId>,
    dependencies: SmallVec<[PathBuf; 4]>,
    revision: u32,
    last_error: Option<String>,
}

impl CompiledProgram {
    #[must_use]
    pub fn new(desc: ProgramDesc) -> Self {
        let dependencies = smallvec![desc.vertex_file.clone(), desc.fragment_file.clone()];
        Self {
            desc,
            gpu: None,
            dependencies,
            revision: 0,
            last_error: None,
        }
    }

    /// Relinks the program against `backend`, replacing the GPU handle.
    ///
    /// On failure the program is left invalid (no GPU handle) but keeps its
    /// source dependencies, so a later reload can repair it.
    pub fn reload(&mut self, backend: &mut dyn ShaderBackend) -> bool {
        if let Some(old) = self.gpu.take() {
            backend.release(old);
        }
        self.revision += 1;

        let request = LinkRequest {
            name: &self.desc.name,
            vertex_file: &self.desc.vertex_file,
            fragment_file: &self.desc.fragment_file,
            defines: &self.desc.defines,
            interface: &self.desc.interface,
            stream_flags: self.desc.stream_flags,
        };

        self.dependencies.clear();
        self.dependencies.push(self.desc.vertex_file.clone());
        self.dependencies.push(self.desc.fragment_file.clone());

        match backend.link(&request) {
            Ok(linked) => {
                for include in linked.includes {
                    if !self.dependencies.contains(&include) {
                        self.dependencies.push(include);
                    }
                }
                self.gpu = Some(linked.id);
                self.last_error = None;
                true
            }
            Err(message) => {
                log::error!("Failed to link program '{}': {message}", self.desc.name);
                self.last_error = Some(message);
                false
            }
        }
    }

    /// Releases the GPU handle, if any.
    pub(crate) fn release(&mut self, backend: &mut dyn ShaderBackend) {
        if let Some(id) = self.gpu.take() {
            backend.release(id);
        }
    }

    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.gpu.is_some()
    }

    #[inline]
    #[must_use]
    pub fn gpu_program(&self) -> Option<GpuProgramId> {
        self.gpu
    }

    #[inline]
    #[must_use]
    pub fn desc(&self) -> &ProgramDesc {
        &self.desc
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.desc.name
    }

    #[must_use]
    pub fn vertex_file(&self) -> &Path {
        &self.desc.vertex_file
    }

    #[must_use]
    pub fn fragment_file(&self) -> &Path {
        &self.desc.fragment_file
    }

    #[must_use]
    pub fn defines(&self) -> &DefineSet {
        &self.desc.defines
    }

    #[must_use]
    pub fn style(&self) -> ShadingStyle {
        self.desc.interface.style()
    }

    #[must_use]
    pub fn stream_flags(&self) -> StreamFlags {
        self.desc.stream_flags
    }

    /// Attribute location of a GLSL program.
    #[must_use]
    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        match &self.desc.interface {
            ProgramInterface::Glsl { attributes } => attributes.get(&interner::get(name)?).copied(),
            ProgramInterface::Arb { .. } => None,
        }
    }

    /// Vertex uniform location of a legacy program.
    #[must_use]
    pub fn vertex_uniform(&self, name: &str) -> Option<i32> {
        match &self.desc.interface {
            ProgramInterface::Arb { vertex_uniforms, .. } => {
                vertex_uniforms.get(&interner::get(name)?).copied()
            }
            ProgramInterface::Glsl { .. } => None,
        }
    }

    /// Fragment uniform of a legacy program.
    #[must_use]
    pub fn fragment_uniform(&self, name: &str) -> Option<FragmentUniform> {
        match &self.desc.interface {
            ProgramInterface::Arb {
                fragment_uniforms, ..
            } => fragment_uniforms.get(&interner::get(name)?).copied(),
            ProgramInterface::Glsl { .. } => None,
        }
    }

    /// Files whose modification should trigger a reload.
    #[must_use]
    pub fn file_dependencies(&self) -> &[PathBuf] {
        &self.dependencies
    }

    /// Number of link attempts so far (the initial link counts).
    #[inline]
    #[must_use]
    pub fn revision(&self) -> u32 {
        self.revision
    }

    /// Backend diagnostic of the last failed link.
    #[must_use]
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }
}
