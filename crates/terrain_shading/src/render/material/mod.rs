//! Material system
//!
//! Per-layer PBR parameters, feature flags and alpha handling. Materials are
//! created by the binding layer and only ever read by the shading pipeline.

pub mod alpha;
pub mod material_params;

pub use alpha::{AlphaDiscard, CutoffDiscard};
pub use material_params::{AlphaMode, MaterialFlags, MaterialParams};
