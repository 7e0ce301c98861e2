//! GPU Backend Interface
//!
//! Program linking and GPU object creation belong to the rendering backend.
//! The shader manager only needs three things from it:
//!
//! - capability queries (which shading styles and sampler kinds exist),
//! - linking a parsed program into an opaque [`GpuProgramId`],
//! - releasing a previously linked program.

use std::path::{Path, PathBuf};

use crate::defines::DefineSet;
use crate::program::{ProgramInterface, StreamFlags};

/// Shading style a program or technique is written for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShadingStyle {
    /// Legacy assembly programs with explicit uniform locations.
    Arb,
    /// GLSL programs with attribute bindings.
    Glsl,
}

impl ShadingStyle {
    /// Parses the `shaders` requirement token.
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        match token {
            "arb" => Some(Self::Arb),
            "glsl" => Some(Self::Glsl),
            _ => None,
        }
    }
}

/// Dimensionality of a fragment sampler uniform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SamplerDimension {
    D1,
    #[default]
    D2,
    D3,
    Cube,
}

/// What the active backend can do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackendCapabilities {
    pub glsl: bool,
    pub arb: bool,
    pub sampler_1d: bool,
    pub sampler_3d: bool,
}

impl Default for BackendCapabilities {
    fn default() -> Self {
        Self::desktop_gl()
    }
}

impl BackendCapabilities {
    /// Full desktop GL: GLSL only.
    #[must_use]
    pub const fn desktop_gl() -> Self {
        Self {
            glsl: true,
            arb: false,
            sampler_1d: true,
            sampler_3d: true,
        }
    }

    /// Desktop GL with the legacy ARB program path selected.
    #[must_use]
    pub const fn desktop_arb() -> Self {
        Self {
            glsl: false,
            arb: true,
            sampler_1d: true,
            sampler_3d: true,
        }
    }

    /// Constrained (GLES-class) backend: no 1D or 3D samplers.
    #[must_use]
    pub const fn constrained() -> Self {
        Self {
            glsl: true,
            arb: false,
            sampler_1d: false,
            sampler_3d: false,
        }
    }

    #[must_use]
    pub fn supports_style(&self, style: ShadingStyle) -> bool {
        match style {
            ShadingStyle::Arb => self.arb,
            ShadingStyle::Glsl => self.glsl,
        }
    }

    #[must_use]
    pub fn supports_sampler(&self, dimension: SamplerDimension) -> bool {
        match dimension {
            SamplerDimension::D1 => self.sampler_1d,
            SamplerDimension::D3 => self.sampler_3d,
            SamplerDimension::D2 | SamplerDimension::Cube => true,
        }
    }
}

/// Opaque backend handle of a linked program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GpuProgramId(pub u64);

/// Everything the backend needs to (re)link one program.
#[derive(Debug, Clone, Copy)]
pub struct LinkRequest<'a> {
    pub name: &'a str,
    pub vertex_file: &'a Path,
    pub fragment_file: &'a Path,
    pub defines: &'a DefineSet,
    pub interface: &'a ProgramInterface,
    pub stream_flags: StreamFlags,
}

/// Result of a successful link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedProgram {
    pub id: GpuProgramId,
    /// Files pulled in by the sources (e.g. `#include`), besides the sources themselves.
    pub includes: Vec<PathBuf>,
}

/// A rendering backend able to link shader programs.
pub trait ShaderBackend {
    fn capabilities(&self) -> BackendCapabilities;

    /// Compiles and links a program. Errors carry the backend diagnostic.
    fn link(&mut self, request: &LinkRequest<'_>) -> Result<LinkedProgram, String>;

    /// Frees a program returned by [`link`](Self::link).
    fn release(&mut self, program: GpuProgramId);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_support() {
        let gl = BackendCapabilities::desktop_gl();
        assert!(gl.supports_style(ShadingStyle::Glsl));
        assert!(!gl.supports_style(ShadingStyle::Arb));

        let arb = BackendCapabilities::desktop_arb();
        assert!(arb.supports_style(ShadingStyle::Arb));
        assert!(!arb.supports_style(ShadingStyle::Glsl));

        assert_eq!(ShadingStyle::parse("glsl"), Some(ShadingStyle::Glsl));
        assert_eq!(ShadingStyle::parse("spirv"), None);
    }

    #[test]
    fn test_constrained_samplers() {
        let caps = BackendCapabilities::constrained();
        assert!(!caps.supports_sampler(SamplerDimension::D1));
        assert!(!caps.supports_sampler(SamplerDimension::D3));
        assert!(caps.supports_sampler(SamplerDimension::D2));
        assert!(caps.supports_sampler(SamplerDimension::Cube));
    }
}
