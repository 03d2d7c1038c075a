//! Ground-cover layer blending
//!
//! Decides how much rock shows through the grass from the steepness of the
//! surface, fades tiled grass toward a flat averaged color at range, and mixes
//! the per-layer samples into one logical surface sample.

use crate::core::config::{BlendConfig, LayerSlot, MaterialSource, SlopeMode};
use crate::foundation::math::{utils, Vec2, Vec3, Vec4};
use crate::render::material::MaterialParams;
use crate::render::texture::TextureSampler;

/// Encoded normal-map texel of an unperturbed surface
pub fn flat_normal_texel() -> Vec3 {
    Vec3::new(0.5, 0.5, 1.0)
}

/// One layer's textures sampled at one fragment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceSample {
    /// Tinted albedo, linear RGBA
    pub base_color: Vec4,
    /// Raw normal-map texel in `[0, 1]`, not yet decoded
    pub tangent_space_normal: Vec3,
    /// Mip bias the sample was taken with
    pub mip_bias: f32,
}

impl SurfaceSample {
    /// A sample with the given color and an unperturbed normal
    pub fn flat(base_color: Vec4) -> Self {
        Self {
            base_color,
            tangent_space_normal: flat_normal_texel(),
            mip_bias: 0.0,
        }
    }
}

/// Per-fragment layer weights
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendWeights {
    /// Grass contribution, `1 - rock_weight`
    pub grass_weight: f32,
    /// Rock contribution in `[0, 1]`
    pub rock_weight: f32,
    /// How far grass has faded to its fallback color, in `[0, 1]`
    pub distance_fade: f32,
}

impl BlendWeights {
    /// Weights for a given (unclamped) rock amount and distance fade
    pub fn from_rock_amount(rock_amount: f32, distance_fade: f32) -> Self {
        let rock_weight = utils::saturate(rock_amount);
        Self {
            grass_weight: 1.0 - rock_weight,
            rock_weight,
            distance_fade: utils::saturate(distance_fade),
        }
    }

    /// The layer with the larger weight; ties go to rock
    pub fn dominant(&self) -> LayerSlot {
        if self.rock_weight >= self.grass_weight {
            LayerSlot::Rock
        } else {
            LayerSlot::Grass
        }
    }
}

/// Steepness term from the world normal's Y component
///
/// 0 on flat ground, 1 on vertical faces.
pub fn slope_term(world_normal_y: f32, mode: SlopeMode) -> f32 {
    let steepness = (1.0 - world_normal_y).max(0.0);
    match mode {
        SlopeMode::Squared => steepness * steepness,
        SlopeMode::Linear => steepness,
    }
}

/// Unclamped rock amount for a slope term; callers clamp before mixing
pub fn blend_amount(slope: f32, gain: f32) -> f32 {
    slope * gain
}

/// Fraction of the way from tiled grass to the fallback color
pub fn distance_fade(distance: f32, falloff: f32) -> f32 {
    (distance / falloff).clamp(0.0, 1.0)
}

/// Compute blend weights for a fragment
pub fn select_blend(world_normal_y: f32, distance_to_camera: f32, config: &BlendConfig) -> BlendWeights {
    let slope = slope_term(world_normal_y, config.slope_mode);
    BlendWeights::from_rock_amount(
        blend_amount(slope, config.slope_gain),
        distance_fade(distance_to_camera, config.falloff_distance),
    )
}

/// Texture coordinate for a layer tiled every `scale` world units over XZ
pub fn layer_uv(world_position: &Vec3, scale: f32) -> Vec2 {
    Vec2::new(world_position.x / scale, world_position.z / scale)
}

/// Texture and material bindings of one ground-cover layer
///
/// Borrowed from the binding layer for the duration of a draw call.
#[derive(Clone, Copy)]
pub struct TerrainLayer<'a> {
    /// Albedo texture
    pub albedo: &'a dyn TextureSampler,
    /// Optional tangent-space normal map
    pub normal_map: Option<&'a dyn TextureSampler>,
    /// Layer material
    pub material: &'a MaterialParams,
}

impl<'a> TerrainLayer<'a> {
    /// Layer with an albedo texture only
    pub fn new(albedo: &'a dyn TextureSampler, material: &'a MaterialParams) -> Self {
        Self { albedo, normal_map: None, material }
    }

    /// Attach a normal map
    pub fn with_normal_map(mut self, normal_map: &'a dyn TextureSampler) -> Self {
        self.normal_map = Some(normal_map);
        self
    }

    /// Sample this layer at a world position
    pub fn sample(&self, world_position: &Vec3, scale: f32, mip_bias: f32) -> SurfaceSample {
        let uv = layer_uv(world_position, scale);
        let base_color = self
            .albedo
            .sample(uv, mip_bias)
            .component_mul(&self.material.base_color_tint);
        let tangent_space_normal = self
            .normal_map
            .map_or_else(flat_normal_texel, |map| map.sample(uv, mip_bias).xyz());

        SurfaceSample { base_color, tangent_space_normal, mip_bias }
    }
}

impl std::fmt::Debug for TerrainLayer<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerrainLayer")
            .field("has_normal_map", &self.normal_map.is_some())
            .field("material", self.material)
            .finish_non_exhaustive()
    }
}

/// The grass and rock layers of a terrain draw
#[derive(Debug, Clone, Copy)]
pub struct TerrainLayers<'a> {
    /// Flat-ground layer
    pub grass: TerrainLayer<'a>,
    /// Steep-slope layer
    pub rock: TerrainLayer<'a>,
}

impl<'a> TerrainLayers<'a> {
    /// Look up a layer by slot
    pub fn get(&self, slot: LayerSlot) -> &TerrainLayer<'a> {
        match slot {
            LayerSlot::Grass => &self.grass,
            LayerSlot::Rock => &self.rock,
        }
    }

    /// Whether any layer has a normal map bound
    pub fn has_normal_maps(&self) -> bool {
        self.grass.normal_map.is_some() || self.rock.normal_map.is_some()
    }

    /// Material parameters handed to lighting
    pub fn resolve_material(&self, weights: &BlendWeights, source: MaterialSource) -> MaterialParams {
        match source {
            MaterialSource::Layer(slot) => self.get(slot).material.clone(),
            MaterialSource::Dominant => self.get(weights.dominant()).material.clone(),
            MaterialSource::Blended => self.grass.material.mix(self.rock.material, weights.rock_weight),
        }
    }
}

/// Grass color after the distance fade; alpha is left untouched
pub fn distance_adjusted_grass(grass: &Vec4, fallback: &Vec3, fade: f32) -> Vec4 {
    let rgb = utils::mix3(&grass.xyz(), fallback, fade);
    Vec4::new(rgb.x, rgb.y, rgb.z, grass.w)
}

/// Mix two layer samples into one surface sample
pub fn blend_samples(
    grass: &SurfaceSample,
    rock: &SurfaceSample,
    weights: &BlendWeights,
    config: &BlendConfig,
) -> SurfaceSample {
    let grass_color = distance_adjusted_grass(&grass.base_color, &config.fallback_color, weights.distance_fade);
    let base_color = utils::mix4(&grass_color, &rock.base_color, weights.rock_weight);

    let tangent_space_normal = if config.blend_normals {
        utils::mix3(&grass.tangent_space_normal, &rock.tangent_space_normal, weights.rock_weight)
    } else {
        match weights.dominant() {
            LayerSlot::Grass => grass.tangent_space_normal,
            LayerSlot::Rock => rock.tangent_space_normal,
        }
    };

    SurfaceSample { base_color, tangent_space_normal, mip_bias: grass.mip_bias }
}
