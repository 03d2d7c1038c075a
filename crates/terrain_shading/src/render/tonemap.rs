//! Tone mapping and color grading
//!
//! Compresses linear HDR color into displayable range. The mapper is chosen by
//! the camera; grading parameters travel with the view uniform.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Vec3};

/// Rec. 709 luma weights
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Relative luminance of a linear RGB color
pub fn luminance(color: &Vec3) -> f32 {
    color.x * LUMA[0] + color.y * LUMA[1] + color.z * LUMA[2]
}

/// Scale saturation around luminance (0 = grayscale, 1 = unchanged)
pub fn saturate_color(color: &Vec3, saturation: f32) -> Vec3 {
    let luma = Vec3::repeat(luminance(color));
    utils::mix3(&luma, color, saturation)
}

/// Per-camera color grading settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorGrading {
    /// Exposure in EV stops, applied before tone mapping
    pub exposure: f32,
    /// Gamma applied after tone mapping (1.0 = none)
    pub gamma: f32,
    /// Saturation applied before tone mapping
    pub pre_saturation: f32,
    /// Saturation applied after tone mapping
    pub post_saturation: f32,
}

impl Default for ColorGrading {
    fn default() -> Self {
        Self {
            exposure: 0.0,
            gamma: 1.0,
            pre_saturation: 1.0,
            post_saturation: 1.0,
        }
    }
}

impl ColorGrading {
    /// Exposure and pre-saturation
    pub fn apply_pre(&self, color: &Vec3) -> Vec3 {
        saturate_color(&(color * self.exposure.exp2()), self.pre_saturation)
    }

    /// Gamma and post-saturation
    pub fn apply_post(&self, color: &Vec3) -> Vec3 {
        let graded = utils::pow3(&color.map(|c| c.max(0.0)), self.gamma);
        saturate_color(&graded, self.post_saturation)
    }
}

/// Maps linear HDR color into `[0, 1]`
pub trait ToneMapper: Send + Sync {
    /// Tone map `color` using `grading`
    fn map(&self, color: Vec3, grading: &ColorGrading) -> Vec3;
}

/// Grading only, no curve
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl ToneMapper for PassThrough {
    fn map(&self, color: Vec3, grading: &ColorGrading) -> Vec3 {
        grading.apply_post(&grading.apply_pre(&color))
    }
}

/// Per-channel Reinhard `c / (1 + c)`
#[derive(Debug, Clone, Copy, Default)]
pub struct Reinhard;

impl ToneMapper for Reinhard {
    fn map(&self, color: Vec3, grading: &ColorGrading) -> Vec3 {
        let color = grading.apply_pre(&color);
        let mapped = color.map(|c| c / (1.0 + c));
        grading.apply_post(&mapped)
    }
}

/// Reinhard on luminance, preserving hue
#[derive(Debug, Clone, Copy, Default)]
pub struct ReinhardLuminance;

impl ToneMapper for ReinhardLuminance {
    fn map(&self, color: Vec3, grading: &ColorGrading) -> Vec3 {
        let color = grading.apply_pre(&color);
        let l_old = luminance(&color);
        if l_old <= 0.0 {
            return grading.apply_post(&Vec3::zeros());
        }
        let l_new = l_old / (1.0 + l_old);
        grading.apply_post(&(color * (l_new / l_old)))
    }
}

/// Available tone mapping curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Tonemapping {
    /// Grading only
    None,
    /// Per-channel Reinhard
    Reinhard,
    /// Luminance Reinhard
    #[default]
    ReinhardLuminance,
}

impl ToneMapper for Tonemapping {
    fn map(&self, color: Vec3, grading: &ColorGrading) -> Vec3 {
        match self {
            Self::None => PassThrough.map(color, grading),
            Self::Reinhard => Reinhard.map(color, grading),
            Self::ReinhardLuminance => ReinhardLuminance.map(color, grading),
        }
    }
}
