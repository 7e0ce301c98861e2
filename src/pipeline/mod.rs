//! Pipeline State
//!
//! Backend-neutral fixed-function state attached to every effect pass:
//! - `GraphicsPipelineStateDesc`: blend + depth/stencil + rasterization
//! - token parsers for every enum used by effect descriptors
//! - `parse_color`: blend constant parsing

pub mod state;

pub use state::{
    BlendFactor, BlendOp, BlendState, ColorWriteMask, CompareOp, CullMode, DepthStencilState,
    FrontFace, GraphicsPipelineStateDesc, PolygonMode, RasterizationState, StencilOp,
    StencilOpState, parse_color,
};
