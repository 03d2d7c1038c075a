//! Rendering types used by the terrain shading pipeline
//!
//! Camera and fog state, material parameters, texture sampling, and the seams
//! to the external lighting evaluator and tone mapper.

pub mod camera;
pub mod lighting;
pub mod material;
pub mod shading;
pub mod texture;
pub mod tonemap;

pub use camera::{Camera, Projection, ViewUniform};
pub use lighting::{LambertEvaluator, Light, LightingEnvironment, LightingEvaluator};
pub use material::{AlphaDiscard, AlphaMode, CutoffDiscard, MaterialFlags, MaterialParams};
pub use texture::{SolidColor, Texture2D, TextureError, TextureSampler};
pub use tonemap::{ColorGrading, PassThrough, Reinhard, ReinhardLuminance, ToneMapper, Tonemapping};
