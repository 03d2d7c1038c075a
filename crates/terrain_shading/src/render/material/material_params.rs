//! Material parameter types for ground-cover layers

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Vec4};

bitflags! {
    /// Per-material feature flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct MaterialFlags: u32 {
        /// Skip lighting and output the base color directly
        const UNLIT = 1 << 0;
        /// Back faces are shaded with the normal frame flipped
        const DOUBLE_SIDED = 1 << 1;
        /// Normal map stores only X/Y; Z is reconstructed
        const TWO_COMPONENT_NORMAL_MAP = 1 << 2;
        /// Normal map was authored with the opposite green-channel convention
        const FLIP_NORMAL_Y = 1 << 3;
        /// Distance fog is applied after lighting
        const FOG_ENABLED = 1 << 4;
    }
}

impl Default for MaterialFlags {
    fn default() -> Self {
        Self::FOG_ENABLED
    }
}

/// Alpha handling modes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AlphaMode {
    /// Alpha is forced to 1
    #[default]
    Opaque,
    /// Fragments with alpha below `alpha_cutoff` are discarded, the rest are opaque
    Mask,
    /// Alpha is kept for blending
    Blend,
}

/// PBR material parameters for one ground-cover layer
///
/// Immutable for the lifetime of a draw call and shared by every fragment of it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialParams {
    /// Linear RGBA multiplier applied to the sampled albedo
    pub base_color_tint: Vec4,
    /// Linear emissive color (alpha unused)
    pub emissive: Vec4,
    /// Metallic factor (0.0 = dielectric, 1.0 = metallic)
    pub metallic: f32,
    /// Perceptual roughness (0.0 = mirror, 1.0 = completely rough)
    pub perceptual_roughness: f32,
    /// Specular reflectance at normal incidence for dielectrics
    pub reflectance: f32,
    /// Alpha threshold used by [`AlphaMode::Mask`]
    pub alpha_cutoff: f32,
    /// How alpha is interpreted
    pub alpha_mode: AlphaMode,
    /// Feature flags
    pub flags: MaterialFlags,
}

impl Default for MaterialParams {
    fn default() -> Self {
        Self {
            base_color_tint: Vec4::new(1.0, 1.0, 1.0, 1.0),
            emissive: Vec4::new(0.0, 0.0, 0.0, 1.0),
            metallic: 0.0,
            perceptual_roughness: 0.5,
            reflectance: 0.5,
            alpha_cutoff: 0.5,
            alpha_mode: AlphaMode::Opaque,
            flags: MaterialFlags::default(),
        }
    }
}

impl MaterialParams {
    /// Rough, non-metallic dielectric used for both terrain layers
    pub fn terrain_default() -> Self {
        Self {
            perceptual_roughness: 0.9,
            metallic: 0.0,
            reflectance: 0.2,
            ..Self::default()
        }
    }

    /// Set the tint color
    pub fn with_tint(mut self, tint: Vec4) -> Self {
        self.base_color_tint = tint;
        self
    }

    /// Set the metallic factor
    pub fn with_metallic(mut self, metallic: f32) -> Self {
        self.metallic = metallic;
        self
    }

    /// Set the perceptual roughness
    pub fn with_roughness(mut self, roughness: f32) -> Self {
        self.perceptual_roughness = roughness;
        self
    }

    /// Set the alpha mode and cutoff
    pub fn with_alpha(mut self, mode: AlphaMode, cutoff: f32) -> Self {
        self.alpha_mode = mode;
        self.alpha_cutoff = cutoff;
        self
    }

    /// Replace the feature flags
    pub fn with_flags(mut self, flags: MaterialFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Interpolate the scalar and color parameters toward `other`
    ///
    /// Flags, alpha mode and cutoff always come from `self`; they select code
    /// paths and have no meaningful midpoint.
    pub fn mix(&self, other: &Self, t: f32) -> Self {
        let t = utils::saturate(t);
        Self {
            base_color_tint: utils::mix4(&self.base_color_tint, &other.base_color_tint, t),
            emissive: utils::mix4(&self.emissive, &other.emissive, t),
            metallic: utils::lerp(self.metallic, other.metallic, t),
            perceptual_roughness: utils::lerp(self.perceptual_roughness, other.perceptual_roughness, t),
            reflectance: utils::lerp(self.reflectance, other.reflectance, t),
            ..self.clone()
        }
    }
}
