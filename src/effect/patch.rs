//! Pass state patches.
//!
//! Each state element of a `<pass>` patches part of the running
//! [`GraphicsPipelineStateDesc`]. Attributes that are absent (or empty) leave
//! their field untouched, as do tokens that fail to parse.

use crate::markup::Element;
use crate::pipeline::{
    BlendFactor, BlendOp, ColorWriteMask, CompareOp, CullMode, FrontFace,
    GraphicsPipelineStateDesc, PolygonMode, StencilOp, parse_color,
};

/// Applies `element` to `desc`. Returns `false` for elements that are not
/// state patches.
pub fn apply(desc: &mut GraphicsPipelineStateDesc, element: &Element) -> bool {
    match element.name() {
        "blend" => apply_blend(desc, element),
        "color" => apply_color(desc, element),
        "cull" => apply_cull(desc, element),
        "polygon" => apply_polygon(desc, element),
        "depth" => apply_depth(desc, element),
        "stencil" => apply_stencil(desc, element),
        _ => return false,
    }
    true
}

fn non_empty<'a>(element: &'a Element, attribute: &str) -> Option<&'a str> {
    Some(element.attr(attribute)).filter(|value| !value.is_empty())
}

/// Parses `attribute` with `parse`, warning on unknown tokens.
fn token<T>(element: &Element, attribute: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    let value = non_empty(element, attribute)?;
    let parsed = parse(value);
    if parsed.is_none() {
        log::warn!(
            "Unknown value '{value}' for '{}' of <{}>",
            attribute,
            element.name()
        );
    }
    parsed
}

fn unsigned(element: &Element, attribute: &str) -> Option<u32> {
    let value = non_empty(element, attribute)?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            log::warn!(
                "Invalid unsigned value '{value}' for '{}' of <{}>",
                attribute,
                element.name()
            );
            None
        }
    }
}

fn apply_blend(desc: &mut GraphicsPipelineStateDesc, element: &Element) {
    let blend = &mut desc.blend_state;
    blend.enabled = true;

    if let Some(src) = token(element, "src", BlendFactor::parse) {
        blend.src_color_blend_factor = src;
        blend.src_alpha_blend_factor = src;
    }
    if let Some(dst) = token(element, "dst", BlendFactor::parse) {
        blend.dst_color_blend_factor = dst;
        blend.dst_alpha_blend_factor = dst;
    }
    if let Some(op) = token(element, "op", BlendOp::parse) {
        blend.color_blend_op = op;
        blend.alpha_blend_op = op;
    }
    if let Some(constant) = non_empty(element, "constant") {
        match parse_color(constant) {
            Ok(color) => blend.constant = color,
            Err(message) => log::error!("Failed to parse blend constant: {message}"),
        }
    }
}

// Channels are enabled only by the exact string "TRUE".
fn apply_color(desc: &mut GraphicsPipelineStateDesc, element: &Element) {
    let mut mask = ColorWriteMask::empty();
    for (attribute, channel) in [
        ("mask_red", ColorWriteMask::RED),
        ("mask_green", ColorWriteMask::GREEN),
        ("mask_blue", ColorWriteMask::BLUE),
        ("mask_alpha", ColorWriteMask::ALPHA),
    ] {
        mask.set(channel, element.attr(attribute) == "TRUE");
    }
    desc.blend_state.color_write_mask = mask;
}

fn apply_cull(desc: &mut GraphicsPipelineStateDesc, element: &Element) {
    let raster = &mut desc.rasterization_state;
    if let Some(mode) = token(element, "mode", CullMode::parse) {
        raster.cull_mode = mode;
    }
    if let Some(front_face) = token(element, "front_face", FrontFace::parse) {
        raster.front_face = front_face;
    }
}

fn apply_polygon(desc: &mut GraphicsPipelineStateDesc, element: &Element) {
    if let Some(mode) = token(element, "mode", PolygonMode::parse) {
        desc.rasterization_state.polygon_mode = mode;
    }
}

fn apply_depth(desc: &mut GraphicsPipelineStateDesc, element: &Element) {
    let depth = &mut desc.depth_stencil_state;
    if let Some(test) = non_empty(element, "test") {
        depth.depth_test_enabled = test == "TRUE";
    }
    if let Some(func) = token(element, "func", CompareOp::parse) {
        depth.depth_compare_op = func;
    }
    // Lowercase, unlike every other boolean of the effect grammar.
    if let Some(mask) = non_empty(element, "mask") {
        depth.depth_write_enabled = mask == "true";
    }
}

fn apply_stencil(desc: &mut GraphicsPipelineStateDesc, element: &Element) {
    let stencil = &mut desc.depth_stencil_state;
    if let Some(test) = non_empty(element, "test") {
        stencil.stencil_test_enabled = test == "TRUE";
    }
    if let Some(reference) = unsigned(element, "reference") {
        stencil.stencil_reference = reference;
    }
    if let Some(read_mask) = unsigned(element, "mask_read") {
        stencil.stencil_read_mask = read_mask;
    }
    if let Some(write_mask) = unsigned(element, "mask") {
        stencil.stencil_write_mask = write_mask;
    }

    let faces = [&mut stencil.stencil_front_face, &mut stencil.stencil_back_face];
    let compare = token(element, "compare", CompareOp::parse);
    let fail = token(element, "fail", StencilOp::parse);
    let pass = token(element, "pass", StencilOp::parse);
    let depth_fail = token(element, "depth_fail", StencilOp::parse);
    for face in faces {
        if let Some(compare) = compare {
            face.compare_op = compare;
        }
        if let Some(fail) = fail {
            face.fail_op = fail;
        }
        if let Some(pass) = pass {
            face.pass_op = pass;
        }
        if let Some(depth_fail) = depth_fail {
            face.depth_fail_op = depth_fail;
        }
    }
}
