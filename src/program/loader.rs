//! Program descriptor parsing.
//!
//! Walks a program descriptor in document order and produces a
//! [`ProgramDesc`]. `define` elements extend the working define set as they
//! are met, so later bindings gated by `if` see them.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::backend::{BackendCapabilities, SamplerDimension};
use crate::conditional::{self, ConditionEvaluator};
use crate::defines::DefineSet;
use crate::errors::{Result, ShaderError};
use crate::io::VirtualFileSystem;
use crate::markup::{self, Element, SchemaValidator, schema::PROGRAM_SCHEMA};
use crate::settings::ShaderSettings;
use crate::utils::interner;

use super::{FragmentUniform, ProgramDesc, ProgramInterface, StreamFlags};

/// Collaborators needed to parse descriptors.
#[derive(Clone, Copy)]
pub struct LoaderContext<'a> {
    pub settings: &'a ShaderSettings,
    pub fs: &'a dyn VirtualFileSystem,
    pub validator: &'a dyn SchemaValidator,
    pub evaluator: &'a dyn ConditionEvaluator,
    pub capabilities: BackendCapabilities,
}

/// Attribute location for a vertex attribute semantic.
///
/// Standard semantics follow the NVIDIA fixed-function aliasing table; the
/// custom slots fill locations no standard semantic uses.
#[must_use]
pub fn attrib_location(semantics: &str) -> Option<u32> {
    let location = match semantics {
        "gl_Vertex" => 0,
        "CustomAttribute0" => 1,
        "gl_Normal" => 2,
        "gl_Color" => 3,
        "gl_SecondaryColor" => 4,
        "gl_FogCoord" => 5,
        "CustomAttribute1" => 6,
        "CustomAttribute2" => 7,
        "gl_MultiTexCoord0" => 8,
        "gl_MultiTexCoord1" => 9,
        "gl_MultiTexCoord2" => 10,
        "gl_MultiTexCoord3" => 11,
        "gl_MultiTexCoord4" => 12,
        "gl_MultiTexCoord5" => 13,
        "gl_MultiTexCoord6" => 14,
        "gl_MultiTexCoord7" => 15,
        _ => return None,
    };
    Some(location)
}

/// Like [`attrib_location`], for descriptor content.
///
/// An unknown semantic means the schema itself is corrupt: debug builds
/// panic, release builds log and fall back to location 0.
#[must_use]
pub fn parse_attrib_semantics(semantics: &str) -> u32 {
    attrib_location(semantics).unwrap_or_else(|| {
        if cfg!(debug_assertions) {
            panic!("Invalid attribute semantics '{semantics}'");
        }
        log::error!("Invalid attribute semantics '{semantics}'");
        0
    })
}

fn parse_location(element: &Element) -> i32 {
    let loc = element.attr("loc");
    loc.trim().parse().unwrap_or_else(|_| {
        log::warn!(
            "Invalid uniform location '{loc}' for '{}'",
            element.attr("name")
        );
        0
    })
}

fn parse_sampler_type(type_name: &str, capabilities: BackendCapabilities) -> SamplerDimension {
    // Shadow and rect samplers are treated as 2D.
    let requested = match type_name {
        "sampler1D" => SamplerDimension::D1,
        "sampler3D" => SamplerDimension::D3,
        "samplerCube" => SamplerDimension::Cube,
        _ => SamplerDimension::D2,
    };
    if capabilities.supports_sampler(requested) {
        requested
    } else {
        log::warn!("{type_name} not implemented on this backend, using sampler2D");
        SamplerDimension::D2
    }
}

/// Reads, validates and parses the descriptor of program `name`.
pub fn load_program_desc(
    ctx: &LoaderContext<'_>,
    name: &str,
    base_defines: &DefineSet,
) -> Result<ProgramDesc> {
    let path = ctx.settings.program_descriptor(name);
    let root = markup::load_document(ctx.fs, &path)?;

    if ctx.settings.validate_programs {
        ctx.validator
            .validate(PROGRAM_SCHEMA, &root)
            .map_err(|message| ShaderError::SchemaInvalid {
                path: path.clone(),
                message,
            })?;
    }

    Ok(parse_program(ctx, name, &root, base_defines))
}

/// Interprets an already-loaded program descriptor.
#[must_use]
pub fn parse_program(
    ctx: &LoaderContext<'_>,
    name: &str,
    root: &Element,
    base_defines: &DefineSet,
) -> ProgramDesc {
    let mut defines = base_defines.clone();
    let mut vertex_file = PathBuf::new();
    let mut fragment_file = PathBuf::new();
    let mut vertex_uniforms = FxHashMap::default();
    let mut fragment_uniforms = FxHashMap::default();
    let mut attributes = FxHashMap::default();
    let mut stream_flags = StreamFlags::empty();

    for child in root.children() {
        match child.name() {
            "define" => defines.add(child.attr("name"), child.attr("value")),
            "vertex" => {
                vertex_file = ctx.settings.shader_source(child.attr("file"));

                for param in conditional::applicable_children(ctx.evaluator, child, "if", &defines) {
                    match param.name() {
                        "uniform" => {
                            vertex_uniforms.insert(interner::intern(param.attr("name")), parse_location(param));
                        }
                        "stream" => {
                            if let Some(flag) = StreamFlags::from_stream_name(param.attr("name")) {
                                stream_flags |= flag;
                            }
                        }
                        "attrib" => {
                            let location = parse_attrib_semantics(param.attr("semantics"));
                            attributes.insert(interner::intern(param.attr("name")), location);
                        }
                        _ => {}
                    }
                }
            }
            "fragment" => {
                fragment_file = ctx.settings.shader_source(child.attr("file"));

                for param in conditional::applicable_children(ctx.evaluator, child, "if", &defines) {
                    if param.name() == "uniform" {
                        let uniform = FragmentUniform {
                            location: parse_location(param),
                            sampler: parse_sampler_type(param.attr("type"), ctx.capabilities),
                        };
                        fragment_uniforms.insert(interner::intern(param.attr("name")), uniform);
                    }
                }
            }
            _ => {}
        }
    }

    let interface = if root.attr("type") == "glsl" {
        ProgramInterface::Glsl { attributes }
    } else {
        ProgramInterface::Arb {
            vertex_uniforms,
            fragment_uniforms,
        }
    };

    ProgramDesc {
        name: name.to_string(),
        vertex_file,
        fragment_file,
        defines,
        interface,
        stream_flags,
    }
}
