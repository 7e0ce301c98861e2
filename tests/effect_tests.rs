//! Effect Compiler Tests
//!
//! Tests for:
//! - Technique selection: first usable in document order, `require` checks
//! - Define accumulation across technique and passes
//! - Pipeline state patches read from passes
//! - Failure caching: no usable technique, empty technique

mod common;

use anyhow::Context;
use common::{CountingFileSystem, RecordingBackend, fixture_fs, init_logger, manager_with};
use myth_effects::pipeline::{BlendFactor, ColorWriteMask, CompareOp, CullMode, StencilOp};
use myth_effects::{
    BackendCapabilities, ConditionEvaluator, DefineSet, MemoryFileSystem, ShaderManager,
    ShaderSettings,
};

fn with_effect(name: &str, xml: &str) -> MemoryFileSystem {
    fixture_fs().with_file(format!("shaders/effects/{name}.xml"), xml)
}

// ============================================================================
// Technique Selection
// ============================================================================

const SELECTION_EFFECT: &str = r#"<effect>
    <technique>
        <require shaders="arb"/>
        <pass shader="legacy"/>
    </technique>
    <technique>
        <require context="USE_SHADOWS &amp;&amp; QUALITY >= 2"/>
        <define name="PATH" value="shadowed"/>
        <pass shader="model"/>
    </technique>
    <technique>
        <require shaders="glsl"/>
        <define name="PATH" value="plain"/>
        <pass shader="solid"/>
    </technique>
    <technique>
        <define name="PATH" value="fallback"/>
        <pass shader="solid"/>
    </technique>
</effect>"#;

#[test]
fn first_usable_technique_wins() {
    let (mut manager, _log) = manager_with(with_effect("select", SELECTION_EFFECT));

    let plain = manager.load_effect_default("select").unwrap();
    assert_eq!(plain.pass(0).unwrap().defines().get("PATH"), Some("plain"));
    assert_eq!(plain.pass(0).unwrap().shader(), "solid");

    let shadowed = manager
        .load_effect("select", &DefineSet::from([("USE_SHADOWS", "1"), ("QUALITY", "2")]))
        .unwrap();
    assert_eq!(shadowed.pass(0).unwrap().defines().get("PATH"), Some("shadowed"));

    let low_quality = manager
        .load_effect("select", &DefineSet::from([("USE_SHADOWS", "1"), ("QUALITY", "1")]))
        .unwrap();
    assert_eq!(low_quality.pass(0).unwrap().defines().get("PATH"), Some("plain"));

    assert_eq!(manager.num_effects_loaded(), 3);
}

#[test]
fn legacy_backend_selects_legacy_technique() -> anyhow::Result<()> {
    init_logger();
    let backend = RecordingBackend::new(BackendCapabilities::desktop_arb());
    let mut manager = ShaderManager::new(
        ShaderSettings::default(),
        backend,
        with_effect("select", SELECTION_EFFECT),
    );

    let technique = manager
        .load_effect_default("select")
        .context("effect should load")?;
    let pass = technique.pass(0).context("technique has a pass")?;
    assert_eq!(pass.shader(), "legacy");

    let program = pass
        .program()
        .and_then(|handle| manager.program(handle))
        .context("legacy program should be cached")?;
    assert!(program.vertex_uniform("transform").is_some());
    Ok(())
}

struct NeverEvaluator;

impl ConditionEvaluator for NeverEvaluator {
    fn evaluate(&self, _expression: &str, _defines: &myth_effects::DefineSet) -> bool {
        false
    }
}

#[test]
fn custom_evaluator_drives_context_requirements() {
    let (manager, _log) = manager_with(with_effect("select", SELECTION_EFFECT));
    let mut manager = manager.with_evaluator(NeverEvaluator);

    let technique = manager
        .load_effect("select", &DefineSet::from([("USE_SHADOWS", "1"), ("QUALITY", "2")]))
        .unwrap();
    assert_eq!(technique.pass(0).unwrap().defines().get("PATH"), Some("plain"));
}

#[test]
fn no_usable_technique_is_cached() {
    init_logger();
    let fs = CountingFileSystem::new(with_effect(
        "arb_only",
        r#"<effect>
            <technique><require shaders="arb"/><pass shader="legacy"/></technique>
            <technique><require context="0"/><pass shader="solid"/></technique>
        </effect>"#,
    ));
    let reads = fs.reads.clone();
    let backend = RecordingBackend::new(BackendCapabilities::desktop_gl());
    let log = backend.log.clone();
    let mut manager = ShaderManager::new(ShaderSettings::default(), backend, fs);

    assert!(manager.load_effect_default("arb_only").is_none());
    assert!(manager.load_effect_default("arb_only").is_none());

    assert_eq!(reads.get(), 1);
    assert_eq!(manager.num_effects_loaded(), 1);
    assert!(log.borrow().links.is_empty());
}

#[test]
fn empty_technique_fails() {
    let (mut manager, _log) = manager_with(with_effect(
        "empty",
        r#"<effect><technique><define name="A" value="1"/></technique></effect>"#,
    ));

    assert!(manager.load_effect_default("empty").is_none());
    assert_eq!(manager.num_effects_loaded(), 1);
}

#[test]
fn missing_effect_fails() {
    let (mut manager, _log) = manager_with(fixture_fs());
    assert!(manager.load_effect_default("nowhere").is_none());
}

// ============================================================================
// Defines
// ============================================================================

const PASSES_EFFECT: &str = r#"<effect>
    <technique>
        <define name="TECH" value="1"/>
        <pass shader="solid">
            <define name="FIRST" value="1"/>
            <define name="BASE" value="overridden"/>
        </pass>
        <pass shader="solid">
            <define name="SECOND" value="1"/>
        </pass>
        <define name="LATE" value="1"/>
        <sort_by_distance/>
    </technique>
</effect>"#;

#[test]
fn pass_defines_do_not_leak_sideways() {
    let (mut manager, log) = manager_with(with_effect("passes", PASSES_EFFECT));

    let technique = manager
        .load_effect("passes", &DefineSet::from([("BASE", "1")]))
        .unwrap();
    assert!(technique.sort_by_distance());
    assert_eq!(technique.num_passes(), 2);

    let first = technique.pass(0).unwrap().defines();
    let second = technique.pass(1).unwrap().defines();

    assert_eq!(
        *first,
        DefineSet::from([
            ("BASE", "overridden"),
            ("TECH", "1"),
            ("LATE", "1"),
            ("FIRST", "1"),
        ])
    );
    assert_eq!(
        *second,
        DefineSet::from([("BASE", "1"), ("TECH", "1"), ("LATE", "1"), ("SECOND", "1")])
    );

    // Each pass compiled its own program variant.
    assert_ne!(technique.pass(0).unwrap().program(), technique.pass(1).unwrap().program());
    assert_eq!(log.borrow().link_count("solid"), 2);
}

#[test]
fn effects_share_programs_through_the_cache() {
    let fs = with_effect("passes", PASSES_EFFECT).with_file(
        "shaders/effects/other.xml",
        r#"<effect><technique>
            <define name="TECH" value="1"/>
            <define name="LATE" value="1"/>
            <pass shader="solid"><define name="SECOND" value="1"/></pass>
        </technique></effect>"#,
    );
    let (mut manager, log) = manager_with(fs);
    let base = DefineSet::from([("BASE", "1")]);

    let passes = manager.load_effect("passes", &base).unwrap();
    let other = manager.load_effect("other", &base).unwrap();

    assert_eq!(
        passes.pass(1).unwrap().program(),
        other.pass(0).unwrap().program()
    );
    assert_eq!(log.borrow().link_count("solid"), 2);
}

// ============================================================================
// Pipeline State
// ============================================================================

#[test]
fn pass_state_patches_start_from_defaults() {
    let (mut manager, _log) = manager_with(with_effect(
        "states",
        r#"<effect><technique>
            <pass shader="solid">
                <blend src="src_alpha" dst="one_minus_src_alpha" constant="not a color"/>
                <color mask_red="TRUE" mask_green="TRUE" mask_blue="true"/>
                <cull mode="none"/>
                <depth func="less" mask="false"/>
                <stencil test="TRUE" reference="3" compare="notequal" fail="zero"/>
            </pass>
            <pass shader="solid"/>
        </technique></effect>"#,
    ));

    let technique = manager.load_effect_default("states").unwrap();

    let first = technique.pass(0).unwrap().pipeline_state();
    assert!(first.blend_state.enabled);
    assert_eq!(first.blend_state.src_alpha_blend_factor, BlendFactor::SrcAlpha);
    assert_eq!(first.blend_state.constant, glam::Vec4::ZERO);
    assert_eq!(
        first.blend_state.color_write_mask,
        ColorWriteMask::RED | ColorWriteMask::GREEN
    );
    assert_eq!(first.rasterization_state.cull_mode, CullMode::None);
    assert!(first.depth_stencil_state.depth_test_enabled);
    assert!(!first.depth_stencil_state.depth_write_enabled);
    assert_eq!(first.depth_stencil_state.depth_compare_op, CompareOp::Less);
    assert_eq!(first.depth_stencil_state.stencil_reference, 3);
    assert_eq!(
        first.depth_stencil_state.stencil_back_face.fail_op,
        StencilOp::Zero
    );
    assert_eq!(
        first.depth_stencil_state.stencil_front_face,
        first.depth_stencil_state.stencil_back_face
    );

    let second = technique.pass(1).unwrap().pipeline_state();
    assert_eq!(*second, myth_effects::GraphicsPipelineStateDesc::default());
}

#[test]
fn pass_with_broken_program_still_loads() {
    let (mut manager, _log) = manager_with(with_effect(
        "broken",
        r#"<effect><technique>
            <pass shader="does_not_exist"/>
            <pass shader="solid"/>
        </technique></effect>"#,
    ));

    let technique = manager.load_effect_default("broken").unwrap();
    assert_eq!(technique.pass(0).unwrap().program(), None);
    assert!(technique.pass(1).unwrap().program().is_some());
}
