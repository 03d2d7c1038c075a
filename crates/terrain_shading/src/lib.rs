//! # Terrain Shading
//!
//! Per-fragment shading for slope-blended terrain: grass/rock layer blending,
//! tangent-space normal mapping, shading input assembly for an external
//! lighting evaluator, and fog/tonemap/dither/premultiply compositing.
//!
//! ## Features
//!
//! - **Slope and Distance Blending**: rock shows on steep faces, grass fades
//!   to an averaged color at range
//! - **Normal Mapping**: un-orthogonalized tangent frames, two-component maps,
//!   double-sided flipping
//! - **Capability-Driven Pipeline**: one pipeline, variant resolved at build time
//! - **Pluggable Services**: lighting, tone mapping, alpha discard and texture
//!   sampling are traits
//! - **File Configuration**: TOML and RON
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use terrain_shading::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let grass = SolidColor(Vec4::new(0.2, 0.5, 0.1, 1.0));
//!     let rock = SolidColor(Vec4::new(0.4, 0.4, 0.4, 1.0));
//!     let material = MaterialParams::terrain_default();
//!     let layers = TerrainLayers {
//!         grass: TerrainLayer::new(&grass, &material),
//!         rock: TerrainLayer::new(&rock, &material),
//!     };
//!     let pipeline = TerrainPipeline::new(TerrainShadingConfig::default(), layers)?;
//!
//!     let view = Camera::perspective(Vec3::new(0.0, 20.0, 40.0), 60.0, 16.0 / 9.0, 0.1, 5000.0)
//!         .view_uniform();
//!     let fog = FogParams::exponential(Vec4::new(0.7, 0.8, 0.9, 1.0), 0.002);
//!     let lighting = LambertEvaluator::new(LightingEnvironment::daylight());
//!     let ctx = ShadingContext::new(&view, &fog, &lighting);
//!
//!     let fragment = FragmentGeometry::new(Vec3::new(1.0, 0.0, -3.0), Vec3::y());
//!     if let Some(color) = pipeline.shade(&ctx, &fragment).color() {
//!         println!("{color:?}");
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod config;
pub mod core;
pub mod foundation;
pub mod render;

/// Common imports for pipeline users
pub mod prelude {
    pub use crate::{
        config::{Config, ConfigError},
        core::config::{
            BlendConfig, DitherPattern, FogAlphaSource, LayerSlot, LayersConfig, MaterialSource,
            PipelineCapabilities, PostConfig, SlopeMode, TerrainShadingConfig,
        },
        foundation::math::{Mat4, Vec2, Vec3, Vec4},
        render::{
            camera::{Camera, ViewUniform},
            lighting::{LambertEvaluator, Light, LightingEnvironment, LightingEvaluator},
            material::{AlphaDiscard, AlphaMode, CutoffDiscard, MaterialFlags, MaterialParams},
            shading::{
                FogMode, FogParams, FragmentGeometry, FragmentOutput, PipelineError, ShadingContext,
                ShadingInput, TerrainLayer, TerrainLayers, TerrainPipeline,
            },
            texture::{SolidColor, Texture2D, TextureSampler},
            tonemap::{ColorGrading, ToneMapper, Tonemapping},
        },
    };
}
