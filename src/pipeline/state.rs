//! Backend-neutral fixed-function pipeline state.
//!
//! These are plain, hashable records of blend / depth-stencil / rasterizer
//! state. A backend translates a [`GraphicsPipelineStateDesc`] into its own
//! pipeline object; effects only ever patch fields of the engine defaults
//! returned by [`GraphicsPipelineStateDesc::default`].
//!
//! Every enum parses from the lowercase token used in effect descriptors.

use std::hash::{Hash, Hasher};

use bitflags::bitflags;
use glam::Vec4;

macro_rules! token_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $token:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Parses a descriptor token.
            #[must_use]
            pub fn parse(token: &str) -> Option<Self> {
                match token {
                    $($token => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// Descriptor token of this value.
            #[must_use]
            pub fn token(self) -> &'static str {
                match self {
                    $(Self::$variant => $token,)+
                }
            }
        }
    };
}

token_enum! {
    /// Blend factor applied to source or destination.
    BlendFactor {
        Zero => "zero",
        One => "one",
        SrcColor => "src_color",
        OneMinusSrcColor => "one_minus_src_color",
        DstColor => "dst_color",
        OneMinusDstColor => "one_minus_dst_color",
        SrcAlpha => "src_alpha",
        OneMinusSrcAlpha => "one_minus_src_alpha",
        DstAlpha => "dst_alpha",
        OneMinusDstAlpha => "one_minus_dst_alpha",
        ConstantColor => "constant_color",
        OneMinusConstantColor => "one_minus_constant_color",
        ConstantAlpha => "constant_alpha",
        OneMinusConstantAlpha => "one_minus_constant_alpha",
        SrcAlphaSaturate => "src_alpha_saturate",
        Src1Color => "src1_color",
        OneMinusSrc1Color => "one_minus_src1_color",
        Src1Alpha => "src1_alpha",
        OneMinusSrc1Alpha => "one_minus_src1_alpha",
    }
}

token_enum! {
    BlendOp {
        Add => "add",
        Subtract => "subtract",
        ReverseSubtract => "reverse_subtract",
        Min => "min",
        Max => "max",
    }
}

token_enum! {
    /// Comparison used by depth and stencil tests.
    CompareOp {
        Never => "never",
        Less => "less",
        Equal => "equal",
        LessOrEqual => "lequal",
        Greater => "greater",
        NotEqual => "notequal",
        GreaterOrEqual => "gequal",
        Always => "always",
    }
}

token_enum! {
    StencilOp {
        Keep => "keep",
        Zero => "zero",
        Replace => "replace",
        IncrementAndClamp => "increment_and_clamp",
        DecrementAndClamp => "decrement_and_clamp",
        Invert => "invert",
        IncrementAndWrap => "increment_and_wrap",
        DecrementAndWrap => "decrement_and_wrap",
    }
}

token_enum! {
    CullMode {
        None => "none",
        Front => "front",
        Back => "back",
    }
}

token_enum! {
    /// Winding order of front-facing triangles.
    FrontFace {
        CounterClockwise => "counter_clockwise",
        Clockwise => "clockwise",
    }
}

token_enum! {
    PolygonMode {
        Fill => "fill",
        Line => "line",
    }
}

bitflags! {
    /// Color channels written by a pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct ColorWriteMask: u8 {
        const RED   = 1 << 0;
        const GREEN = 1 << 1;
        const BLUE  = 1 << 2;
        const ALPHA = 1 << 3;
    }
}

impl Default for ColorWriteMask {
    fn default() -> Self {
        Self::all()
    }
}

/// Blend configuration of the single color target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendState {
    pub enabled: bool,
    pub src_color_blend_factor: BlendFactor,
    pub dst_color_blend_factor: BlendFactor,
    pub color_blend_op: BlendOp,
    pub src_alpha_blend_factor: BlendFactor,
    pub dst_alpha_blend_factor: BlendFactor,
    pub alpha_blend_op: BlendOp,
    /// Normalized constant blend color.
    pub constant: Vec4,
    pub color_write_mask: ColorWriteMask,
}

impl Default for BlendState {
    fn default() -> Self {
        Self {
            enabled: false,
            src_color_blend_factor: BlendFactor::One,
            dst_color_blend_factor: BlendFactor::Zero,
            color_blend_op: BlendOp::Add,
            src_alpha_blend_factor: BlendFactor::One,
            dst_alpha_blend_factor: BlendFactor::Zero,
            alpha_blend_op: BlendOp::Add,
            constant: Vec4::ZERO,
            color_write_mask: ColorWriteMask::all(),
        }
    }
}

// `Vec4` is not `Eq`/`Hash`; compare the constant bitwise.
impl Eq for BlendState {}

impl Hash for BlendState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.enabled.hash(state);
        self.src_color_blend_factor.hash(state);
        self.dst_color_blend_factor.hash(state);
        self.color_blend_op.hash(state);
        self.src_alpha_blend_factor.hash(state);
        self.dst_alpha_blend_factor.hash(state);
        self.alpha_blend_op.hash(state);
        self.constant.to_array().map(f32::to_bits).hash(state);
        self.color_write_mask.hash(state);
    }
}

/// Stencil operations of one face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StencilOpState {
    pub fail_op: StencilOp,
    pub pass_op: StencilOp,
    pub depth_fail_op: StencilOp,
    pub compare_op: CompareOp,
}

impl Default for StencilOpState {
    fn default() -> Self {
        Self {
            fail_op: StencilOp::Keep,
            pass_op: StencilOp::Keep,
            depth_fail_op: StencilOp::Keep,
            compare_op: CompareOp::Always,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DepthStencilState {
    pub depth_test_enabled: bool,
    pub depth_compare_op: CompareOp,
    pub depth_write_enabled: bool,
    pub stencil_test_enabled: bool,
    pub stencil_read_mask: u32,
    pub stencil_write_mask: u32,
    pub stencil_reference: u32,
    pub stencil_front_face: StencilOpState,
    pub stencil_back_face: StencilOpState,
}

impl Default for DepthStencilState {
    fn default() -> Self {
        Self {
            depth_test_enabled: true,
            depth_compare_op: CompareOp::LessOrEqual,
            depth_write_enabled: true,
            stencil_test_enabled: false,
            stencil_read_mask: 0xFF,
            stencil_write_mask: 0xFF,
            stencil_reference: 0,
            stencil_front_face: StencilOpState::default(),
            stencil_back_face: StencilOpState::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RasterizationState {
    pub polygon_mode: PolygonMode,
    pub cull_mode: CullMode,
    pub front_face: FrontFace,
}

impl Default for RasterizationState {
    fn default() -> Self {
        Self {
            polygon_mode: PolygonMode::Fill,
            cull_mode: CullMode::Back,
            front_face: FrontFace::CounterClockwise,
        }
    }
}

/// Full fixed-function state of one pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct GraphicsPipelineStateDesc {
    pub blend_state: BlendState,
    pub depth_stencil_state: DepthStencilState,
    pub rasterization_state: RasterizationState,
}

/// Parses a blend constant: three or four integers in `0..=255` separated by
/// whitespace (alpha defaults to 255), normalized to `0..=1`.
pub fn parse_color(value: &str) -> Result<Vec4, String> {
    let mut channels = [0u8, 0, 0, 255];
    let mut count = 0;

    for part in value.split_whitespace() {
        if count == channels.len() {
            return Err(format!("too many parameters in color '{value}'"));
        }
        let parsed: i64 = part
            .parse()
            .map_err(|_| format!("unable to parse color '{value}'"))?;
        channels[count] = u8::try_from(parsed)
            .map_err(|_| format!("invalid value (<0 or >255) in color '{value}'"))?;
        count += 1;
    }

    if count < 3 {
        return Err(format!("not enough parameters in color '{value}'"));
    }

    Ok(Vec4::from_array(channels.map(|c| f32::from(c) / 255.0)))
}
