//! Per-fragment terrain shading
//!
//! Leaf first: [`normal`] reconstructs shading normals, [`blend`] mixes the
//! ground-cover layers, [`input`] builds the lighting request, [`post`]
//! composites the lit color, and [`pipeline`] ties them into one
//! capability-driven entry point.

pub mod blend;
pub mod fragment;
pub mod input;
pub mod normal;
pub mod pipeline;
pub mod post;

#[cfg(test)]
mod tests;

pub use blend::{
    blend_samples, distance_fade, select_blend, slope_term, BlendWeights, SurfaceSample, TerrainLayer,
    TerrainLayers,
};
pub use fragment::FragmentGeometry;
pub use input::{assemble, AssembledFragment, NormalSource, ShadingInput};
pub use normal::{decode_tangent_space_normal, reconstruct_normal, TangentFrame};
pub use pipeline::{FragmentOutput, PipelineError, ShadingContext, ShadingPath, TerrainPipeline};
pub use post::{composite, exponential_fog, linear_fog, FogMode, FogParams, PostSteps};
