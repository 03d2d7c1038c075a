//! # Terrain Shading Configuration
//!
//! All tunables of the shading pipeline in one place. Feature variants that a
//! shader would select with preprocessor defines are explicit fields here and
//! get resolved once when a [`TerrainPipeline`](crate::render::shading::TerrainPipeline)
//! is built.
//!
//! ## Configuration Categories
//!
//! - **Blend Config**: slope/distance heuristics that mix the ground layers
//! - **Layers Config**: per-layer world-space tiling
//! - **Post Config**: fog alpha handling and dither pattern
//! - **Pipeline Capabilities**: which optional inputs and post steps exist

use serde::{Deserialize, Serialize};

use crate::config::{Config, ConfigError};
use crate::foundation::math::Vec3;

/// Fallback grass color used at range instead of the tiled texture
pub const DEFAULT_GRASS_FALLBACK: [f32; 3] = [0.31, 0.57, 0.17];

/// How surface steepness is derived from the normal's Y component
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SlopeMode {
    /// `(1 - n.y)^2`, favours near-vertical faces
    #[default]
    Squared,
    /// `1 - n.y`, proportional to steepness
    Linear,
}

/// One of the two ground-cover layers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LayerSlot {
    /// Flat-ground layer
    Grass,
    /// Steep-slope layer
    Rock,
}

/// Where the material parameters handed to lighting come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaterialSource {
    /// Always one fixed layer
    Layer(LayerSlot),
    /// Whichever layer carries the larger blend weight
    Dominant,
    /// Metallic, roughness, reflectance, tint and emissive interpolated by rock weight
    Blended,
}

impl Default for MaterialSource {
    fn default() -> Self {
        Self::Layer(LayerSlot::Grass)
    }
}

/// # Blend Configuration
///
/// Slope and distance heuristics for mixing grass and rock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlendConfig {
    /// Slope term shape
    pub slope_mode: SlopeMode,
    /// Multiplier on the slope term before clamping to `[0, 1]`
    pub slope_gain: f32,
    /// Distance at which grass is fully replaced by the fallback color
    pub falloff_distance: f32,
    /// Averaged grass color used at range
    pub fallback_color: Vec3,
    /// Mix the per-layer normal texels by the same weights as the colors
    pub blend_normals: bool,
    /// Material parameters fed to lighting
    pub material_source: MaterialSource,
    /// Mip bias applied to every layer sample
    pub mip_bias: f32,
}

impl Default for BlendConfig {
    fn default() -> Self {
        Self {
            slope_mode: SlopeMode::Squared,
            slope_gain: 5.0,
            falloff_distance: 300.0,
            fallback_color: Vec3::from(DEFAULT_GRASS_FALLBACK),
            blend_normals: false,
            material_source: MaterialSource::default(),
            mip_bias: 0.0,
        }
    }
}

impl BlendConfig {
    /// Set the slope mode and gain
    pub fn with_slope(mut self, mode: SlopeMode, gain: f32) -> Self {
        self.slope_mode = mode;
        self.slope_gain = gain;
        self
    }

    /// Set the distance fade falloff
    pub fn with_falloff(mut self, distance: f32) -> Self {
        self.falloff_distance = distance;
        self
    }

    /// Enable or disable normal blending
    pub fn with_blended_normals(mut self, enabled: bool) -> Self {
        self.blend_normals = enabled;
        self
    }

    /// Select where material parameters come from
    pub fn with_material_source(mut self, source: MaterialSource) -> Self {
        self.material_source = source;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.slope_gain >= 0.0 && self.slope_gain.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "slope_gain must be a finite non-negative number, got {}",
                self.slope_gain
            )));
        }

        if !(self.falloff_distance > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "falloff_distance must be positive, got {}",
                self.falloff_distance
            )));
        }

        Ok(())
    }
}

/// Per-layer settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerConfig {
    /// Name used in logs
    pub name: String,
    /// World units covered by one texture repeat
    pub scale: f32,
}

impl LayerConfig {
    /// Create a layer configuration
    pub fn new(name: impl Into<String>, scale: f32) -> Self {
        Self { name: name.into(), scale }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.scale > 0.0 && self.scale.is_finite()) {
            return Err(ConfigError::Invalid(format!(
                "layer '{}' scale must be positive and finite, got {}",
                self.name, self.scale
            )));
        }
        Ok(())
    }
}

/// Settings for both ground-cover layers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayersConfig {
    /// Flat-ground layer
    pub grass: LayerConfig,
    /// Steep-slope layer
    pub rock: LayerConfig,
}

impl Default for LayersConfig {
    fn default() -> Self {
        Self {
            grass: LayerConfig::new("grass", 4.0),
            rock: LayerConfig::new("rock", 16.0),
        }
    }
}

impl LayersConfig {
    /// Look up a layer by slot
    pub fn get(&self, slot: LayerSlot) -> &LayerConfig {
        match slot {
            LayerSlot::Grass => &self.grass,
            LayerSlot::Rock => &self.rock,
        }
    }
}

/// Which alpha drives the fog mix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FogAlphaSource {
    /// The distance-derived fog alpha alone
    #[default]
    Computed,
    /// The distance-derived alpha scaled by the fog color's own alpha
    ColorAlpha,
}

/// Screen-space noise used for debanding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DitherPattern {
    /// Hash of the pixel coordinate, one offset per channel
    #[default]
    ScreenSpace,
    /// Ordered 4x4 Bayer matrix
    Bayer4x4,
}

/// # Post Configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PostConfig {
    /// Fog alpha source
    pub fog_alpha: FogAlphaSource,
    /// Dither pattern when debanding is enabled
    pub dither_pattern: DitherPattern,
}

/// # Pipeline Capabilities
///
/// Which optional inputs the vertex stage provides and which post-lighting steps
/// the render target needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineCapabilities {
    /// Vertex stage provides world tangents
    pub vertex_tangents: bool,
    /// Layers carry normal maps
    pub normal_map: bool,
    /// Normals come from a previous prepass instead of being reconstructed
    pub prepass_normals: bool,
    /// This pipeline writes lighting inputs for a deferred pass instead of color
    pub prepass_pipeline: bool,
    /// Tone map in the fragment stage (non-HDR targets)
    pub tonemap_in_shader: bool,
    /// Add screen-space dither after tone mapping
    pub deband_dither: bool,
    /// Multiply RGB by alpha at the end
    pub premultiply_alpha: bool,
}

impl Default for PipelineCapabilities {
    fn default() -> Self {
        Self {
            vertex_tangents: true,
            normal_map: true,
            prepass_normals: false,
            prepass_pipeline: false,
            tonemap_in_shader: true,
            deband_dither: false,
            premultiply_alpha: false,
        }
    }
}

impl PipelineCapabilities {
    /// Plain forward pipeline: no normal mapping, no post steps
    pub fn minimal() -> Self {
        Self {
            vertex_tangents: false,
            normal_map: false,
            prepass_normals: false,
            prepass_pipeline: false,
            tonemap_in_shader: false,
            deband_dither: false,
            premultiply_alpha: false,
        }
    }

    /// Whether the tangent-space reconstructor can run
    pub fn can_reconstruct_normals(&self) -> bool {
        self.vertex_tangents && self.normal_map
    }
}

/// # Complete Terrain Shading Configuration
///
/// Top-level configuration the pipeline is built from.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainShadingConfig {
    /// Layer blending
    pub blend: BlendConfig,
    /// Layer tiling
    pub layers: LayersConfig,
    /// Post-lighting options
    pub post: PostConfig,
    /// Capability set
    pub capabilities: PipelineCapabilities,
}

impl TerrainShadingConfig {
    /// Set blend configuration
    pub fn with_blend(mut self, blend: BlendConfig) -> Self {
        self.blend = blend;
        self
    }

    /// Set layer configuration
    pub fn with_layers(mut self, layers: LayersConfig) -> Self {
        self.layers = layers;
        self
    }

    /// Set post configuration
    pub fn with_post(mut self, post: PostConfig) -> Self {
        self.post = post;
        self
    }

    /// Set capabilities
    pub fn with_capabilities(mut self, capabilities: PipelineCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.blend.validate()?;
        self.layers.grass.validate()?;
        self.layers.rock.validate()?;
        Ok(())
    }
}

impl Config for TerrainShadingConfig {
    fn check(&self) -> Result<(), ConfigError> {
        self.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(TerrainShadingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let config = TerrainShadingConfig::default().with_blend(BlendConfig::default().with_falloff(0.0));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let config = TerrainShadingConfig::default()
            .with_blend(BlendConfig::default().with_slope(SlopeMode::Linear, -1.0));
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));

        let mut layers = LayersConfig::default();
        layers.rock.scale = f32::NAN;
        let config = TerrainShadingConfig::default().with_layers(layers);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_layer_lookup_by_slot() {
        let layers = LayersConfig::default();
        assert_eq!(layers.get(LayerSlot::Grass).name, "grass");
        assert_eq!(layers.get(LayerSlot::Rock).scale, 16.0);
    }

    #[test]
    fn test_toml_round_trip_keeps_modes() {
        let config = TerrainShadingConfig::default()
            .with_blend(
                BlendConfig::default()
                    .with_slope(SlopeMode::Linear, 10.0)
                    .with_material_source(MaterialSource::Blended),
            )
            .with_capabilities(PipelineCapabilities::minimal());

        let text = toml::to_string_pretty(&config).unwrap();
        let parsed = TerrainShadingConfig::from_str_with_format(&text, "terrain.toml").unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_partial_ron_uses_defaults() {
        let parsed = TerrainShadingConfig::from_str_with_format(
            "(blend: (slope_gain: 10.0), post: (dither_pattern: Bayer4x4))",
            "terrain.ron",
        )
        .unwrap();

        assert_eq!(parsed.blend.slope_gain, 10.0);
        assert_eq!(parsed.blend.falloff_distance, 300.0);
        assert_eq!(parsed.post.dither_pattern, DitherPattern::Bayer4x4);
        assert_eq!(parsed.layers, LayersConfig::default());
    }

    #[test]
    fn test_loading_runs_validation() {
        let result = TerrainShadingConfig::from_str_with_format("(blend: (falloff_distance: 0.0))", "terrain.ron");
        assert!(matches!(result, Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_extension_is_rejected() {
        let result = TerrainShadingConfig::from_str_with_format("", "terrain.json");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }
}
