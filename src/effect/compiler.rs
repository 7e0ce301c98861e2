//! Effect descriptor compilation.
//!
//! An effect descriptor lists alternative techniques. The first technique
//! whose `require` elements all hold is compiled; the rest are ignored.
//!
//! ```xml
//! <effect>
//!     <technique>
//!         <require shaders="glsl"/>
//!         <require context="USE_SHADOWS"/>
//!         <define name="USE_FOG" value="1"/>
//!         <sort_by_distance/>
//!         <pass shader="model_solid">
//!             <define name="ALPHA_BLEND" value="1"/>
//!             <blend src="src_alpha" dst="one_minus_src_alpha"/>
//!             <depth mask="false"/>
//!         </pass>
//!     </technique>
//! </effect>
//! ```

use smallvec::SmallVec;

use crate::backend::ShadingStyle;
use crate::conditional;
use crate::defines::DefineSet;
use crate::errors::{Result, ShaderError};
use crate::markup::{self, Element};
use crate::pipeline::GraphicsPipelineStateDesc;
use crate::program::{LoaderContext, ProgramCache};

use super::{Pass, Technique, patch};

/// Loads effect `name` and compiles its first usable technique.
///
/// Programs referenced by passes are resolved through `programs`.
pub fn compile_effect(
    ctx: &LoaderContext<'_>,
    programs: &mut ProgramCache,
    name: &str,
    base_defines: &DefineSet,
) -> Result<Technique> {
    let path = ctx.settings.effect_descriptor(name);
    let root = markup::load_document(ctx.fs, &path)?;

    let technique = select_technique(ctx, &root, base_defines).ok_or_else(|| {
        ShaderError::NoUsableTechnique {
            effect: name.to_string(),
        }
    })?;

    let technique = build_technique(ctx, programs, technique, base_defines);
    if technique.passes.is_empty() {
        return Err(ShaderError::EmptyTechnique {
            effect: name.to_string(),
        });
    }
    Ok(technique)
}

/// First technique of `root`, in document order, that is usable.
pub fn select_technique<'a>(
    ctx: &LoaderContext<'_>,
    root: &'a Element,
    defines: &DefineSet,
) -> Option<&'a Element> {
    root.children()
        .enumerate()
        .find(|(index, technique)| {
            let usable = is_usable(ctx, technique, defines);
            if !usable {
                log::debug!("Technique #{index} is not usable");
            }
            usable
        })
        .map(|(_, technique)| technique)
}

/// Checks every `require` of a technique against the backend and `defines`.
#[must_use]
pub fn is_usable(ctx: &LoaderContext<'_>, technique: &Element, defines: &DefineSet) -> bool {
    technique
        .children()
        .filter(|child| child.name() == "require")
        .all(|require| match ShadingStyle::parse(require.attr("shaders")) {
            Some(style) => ctx.capabilities.supports_style(style),
            None => conditional::passes(ctx.evaluator, require.attr("context"), defines),
        })
}

fn build_technique(
    ctx: &LoaderContext<'_>,
    programs: &mut ProgramCache,
    technique: &Element,
    base_defines: &DefineSet,
) -> Technique {
    // Technique defines apply to every pass regardless of where they appear.
    let mut technique_defines = base_defines.clone();
    let mut sort_by_distance = false;
    for child in technique.children() {
        match child.name() {
            "define" => technique_defines.add(child.attr("name"), child.attr("value")),
            "sort_by_distance" => sort_by_distance = true,
            _ => {}
        }
    }

    let passes: SmallVec<[Pass; 2]> = technique
        .children()
        .filter(|child| child.name() == "pass")
        .map(|pass| build_pass(ctx, programs, pass, &technique_defines))
        .collect();

    Technique {
        passes,
        sort_by_distance,
    }
}

fn build_pass(
    ctx: &LoaderContext<'_>,
    programs: &mut ProgramCache,
    element: &Element,
    technique_defines: &DefineSet,
) -> Pass {
    let mut defines = technique_defines.clone();
    let mut pipeline_state = GraphicsPipelineStateDesc::default();

    for child in element.children() {
        if child.name() == "define" {
            defines.add(child.attr("name"), child.attr("value"));
        } else if !patch::apply(&mut pipeline_state, child) {
            log::debug!("Ignoring <{}> in pass", child.name());
        }
    }

    // Loaded last so the program sees every define of the pass.
    let shader = element.attr("shader").to_string();
    let program = programs.load(ctx, &shader, &defines);

    Pass {
        pipeline_state,
        program,
        shader,
        defines,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::BackendCapabilities;
    use crate::conditional::PreprocessorEvaluator;
    use crate::io::MemoryFileSystem;
    use crate::markup::AcceptAll;
    use crate::settings::ShaderSettings;

    fn usable(technique: &str, defines: &DefineSet) -> bool {
        let settings = ShaderSettings::default();
        let fs = MemoryFileSystem::new();
        let ctx = LoaderContext {
            settings: &settings,
            fs: &fs,
            validator: &AcceptAll,
            evaluator: &PreprocessorEvaluator,
            capabilities: BackendCapabilities::desktop_gl(),
        };
        is_usable(&ctx, &Element::parse(technique).unwrap(), defines)
    }

    #[test]
    fn test_require_checks() {
        let none = DefineSet::new();
        assert!(usable("<technique/>", &none));
        assert!(usable(r#"<technique><require shaders="glsl"/></technique>"#, &none));
        assert!(!usable(r#"<technique><require shaders="arb"/></technique>"#, &none));
        assert!(!usable(r#"<technique><require context="USE_X"/></technique>"#, &none));
        assert!(usable(
            r#"<technique><require context="USE_X"/></technique>"#,
            &DefineSet::from([("USE_X", "1")])
        ));
    }

    #[test]
    fn test_unknown_style_falls_through_to_context() {
        let none = DefineSet::new();
        assert!(usable(r#"<technique><require shaders="spirv"/></technique>"#, &none));
        assert!(!usable(
            r#"<technique><require shaders="spirv" context="0"/></technique>"#,
            &none
        ));
        // Every requirement must hold.
        assert!(!usable(
            r#"<technique><require shaders="glsl"/><require context="0"/></technique>"#,
            &none
        ));
    }
}
