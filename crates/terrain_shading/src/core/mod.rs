//! # Core Module
//!
//! Shared configuration for the shading pipeline.

pub mod config;

pub use config::{
    BlendConfig,
    DitherPattern,
    FogAlphaSource,
    LayerConfig,
    LayerSlot,
    LayersConfig,
    MaterialSource,
    PipelineCapabilities,
    PostConfig,
    SlopeMode,
    TerrainShadingConfig,
};
pub use crate::config::{Config, ConfigError};
