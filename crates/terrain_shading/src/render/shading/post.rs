//! Post-lighting compositor
//!
//! Applies, in this fixed order:
//!
//! 1. distance fog
//! 2. tone mapping (non-HDR targets only)
//! 3. screen-space debanding dither
//! 4. alpha premultiplication
//!
//! Changing the order changes the image, so [`composite`] is the only entry
//! point that runs more than one step.

use serde::{Deserialize, Serialize};

use crate::core::config::{DitherPattern, FogAlphaSource, PipelineCapabilities, PostConfig};
use crate::foundation::math::{utils, Vec2, Vec3, Vec4};
use crate::render::camera::ViewUniform;
use crate::render::material::{MaterialFlags, MaterialParams};
use crate::render::shading::fragment::FragmentGeometry;
use crate::render::tonemap::ToneMapper;

/// Fog falloff model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FogMode {
    /// No fog
    #[default]
    Off,
    /// Linear ramp between a start and end distance
    Linear,
    /// Squared exponential falloff by density
    Exponential,
}

/// Per-frame fog uniform
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FogParams {
    /// Fog color; alpha is used only with [`FogAlphaSource::ColorAlpha`]
    pub color: Vec4,
    /// Density for exponential fog, start distance for linear fog
    pub density_or_start: f32,
    /// End distance for linear fog
    pub end: f32,
    /// Falloff model
    pub mode: FogMode,
}

impl Default for FogParams {
    fn default() -> Self {
        Self {
            color: Vec4::new(0.5, 0.5, 0.5, 1.0),
            density_or_start: 0.0,
            end: 0.0,
            mode: FogMode::Off,
        }
    }
}

impl FogParams {
    /// Fog disabled
    pub fn off() -> Self {
        Self::default()
    }

    /// Exponential fog with the given density
    pub fn exponential(color: Vec4, density: f32) -> Self {
        Self { color, density_or_start: density, end: 0.0, mode: FogMode::Exponential }
    }

    /// Linear fog between `start` and `end`
    pub fn linear(color: Vec4, start: f32, end: f32) -> Self {
        Self { color, density_or_start: start, end, mode: FogMode::Linear }
    }

    /// Fog color with the distance-derived alpha for `distance`
    pub fn at_distance(&self, distance: f32) -> Vec4 {
        match self.mode {
            FogMode::Off => Vec4::new(self.color.x, self.color.y, self.color.z, 0.0),
            FogMode::Linear => linear_fog(&self.color, distance, self.density_or_start, self.end),
            FogMode::Exponential => exponential_fog(&self.color, distance, self.density_or_start),
        }
    }
}

/// Squared exponential fog: `alpha = 1 - 1 / exp((distance * density)^2)`
pub fn exponential_fog(fog_color: &Vec4, distance: f32, density: f32) -> Vec4 {
    let d = distance * density;
    let alpha = 1.0 - 1.0 / (d * d).exp();
    Vec4::new(fog_color.x, fog_color.y, fog_color.z, alpha)
}

/// Linear fog ramping from 0 at `start` to 1 at `end`
pub fn linear_fog(fog_color: &Vec4, distance: f32, start: f32, end: f32) -> Vec4 {
    let alpha = if end > start {
        utils::saturate((distance - start) / (end - start))
    } else if distance >= end {
        1.0
    } else {
        0.0
    };
    Vec4::new(fog_color.x, fog_color.y, fog_color.z, alpha)
}

/// Mix `color` toward the fog color; the color's own alpha is kept
pub fn apply_fog(color: &Vec4, fog: &FogParams, distance: f32, alpha_source: FogAlphaSource) -> Vec4 {
    if fog.mode == FogMode::Off {
        return *color;
    }

    let fogged = fog.at_distance(distance);
    let factor = match alpha_source {
        FogAlphaSource::Computed => fogged.w,
        FogAlphaSource::ColorAlpha => fogged.w * fog.color.w,
    };
    let rgb = utils::mix3(&color.xyz(), &fogged.xyz(), factor);
    Vec4::new(rgb.x, rgb.y, rgb.z, color.w)
}

const BAYER_4X4: [[u8; 4]; 4] = [
    [0, 8, 2, 10],
    [12, 4, 14, 6],
    [3, 11, 1, 9],
    [15, 7, 13, 5],
];

/// Screen-space noise in `[-0.5/255, 0.5/255]` keyed by pixel coordinate
pub fn screen_space_dither(frag_coord: &Vec2, pattern: DitherPattern) -> Vec3 {
    match pattern {
        DitherPattern::ScreenSpace => {
            let seed = Vec2::new(171.0, 231.0).dot(frag_coord);
            let noise = Vec3::new(
                utils::fract(seed / 103.0),
                utils::fract(seed / 71.0),
                utils::fract(seed / 97.0),
            );
            (noise - Vec3::repeat(0.5)) / 255.0
        }
        DitherPattern::Bayer4x4 => {
            let x = (frag_coord.x.floor() as i64).rem_euclid(4) as usize;
            let y = (frag_coord.y.floor() as i64).rem_euclid(4) as usize;
            let threshold = (f32::from(BAYER_4X4[y][x]) + 0.5) / 16.0;
            Vec3::repeat((threshold - 0.5) / 255.0)
        }
    }
}

fn pow_safe(value: f32, exponent: f32) -> f32 {
    value.signum() * value.abs().powf(exponent)
}

/// Add dither in a gamma-like space so the noise survives 8-bit quantization
pub fn deband(rgb: &Vec3, frag_coord: &Vec2, pattern: DitherPattern) -> Vec3 {
    let encoded = rgb.map(|c| pow_safe(c, 1.0 / 2.2)) + screen_space_dither(frag_coord, pattern);
    encoded.map(|c| pow_safe(c, 2.2))
}

/// Multiply RGB by alpha
pub fn premultiply_alpha(color: &Vec4) -> Vec4 {
    Vec4::new(color.x * color.w, color.y * color.w, color.z * color.w, color.w)
}

/// Post-lighting steps enabled for a pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PostSteps {
    /// How fog alpha is derived
    pub fog_alpha: FogAlphaSource,
    /// Tone map when the view is not HDR
    pub tonemap: bool,
    /// Dither pattern, if debanding runs
    pub dither: Option<DitherPattern>,
    /// Premultiply alpha at the end
    pub premultiply: bool,
}

impl PostSteps {
    /// Resolve the steps from capabilities and post settings
    pub fn resolve(capabilities: &PipelineCapabilities, post: &PostConfig) -> Self {
        Self {
            fog_alpha: post.fog_alpha,
            tonemap: capabilities.tonemap_in_shader,
            dither: capabilities.deband_dither.then_some(post.dither_pattern),
            premultiply: capabilities.premultiply_alpha,
        }
    }

    /// No tone mapping, dither or premultiply
    pub fn none() -> Self {
        Self {
            fog_alpha: FogAlphaSource::Computed,
            tonemap: false,
            dither: None,
            premultiply: false,
        }
    }
}

/// Composite a lit color into the final output color
pub fn composite(
    lit_color: Vec4,
    geometry: &FragmentGeometry,
    material: &MaterialParams,
    fog: &FogParams,
    view: &ViewUniform,
    steps: &PostSteps,
    tone_mapper: &dyn ToneMapper,
) -> Vec4 {
    let mut color = lit_color;

    if material.flags.contains(MaterialFlags::FOG_ENABLED) {
        let distance = view.distance_to(&geometry.world_position);
        color = apply_fog(&color, fog, distance, steps.fog_alpha);
    }

    if steps.tonemap && !view.hdr {
        let mapped = tone_mapper.map(color.xyz(), &view.color_grading);
        color = Vec4::new(mapped.x, mapped.y, mapped.z, color.w);
    }

    if let Some(pattern) = steps.dither {
        let rgb = deband(&color.xyz(), &geometry.frag_coord(), pattern);
        color = Vec4::new(rgb.x, rgb.y, rgb.z, color.w);
    }

    if steps.premultiply {
        color = premultiply_alpha(&color);
    }

    color
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::camera::Camera;
    use crate::render::tonemap::{Reinhard, Tonemapping};
    use approx::assert_relative_eq;

    fn view_at_origin() -> ViewUniform {
        Camera::perspective(Vec3::zeros(), 60.0, 1.0, 0.1, 1000.0)
            .look_at(Vec3::new(0.0, 0.0, -1.0), Vec3::y())
            .view_uniform()
    }

    #[test]
    fn test_exponential_fog_is_clear_at_camera() {
        let color = Vec4::new(0.3, 0.4, 0.5, 1.0);
        for density in [0.0001, 0.01, 0.5, 3.0] {
            assert_eq!(exponential_fog(&color, 0.0, density).w, 0.0);
        }
    }

    #[test]
    fn test_exponential_fog_thickens_with_distance() {
        let color = Vec4::new(1.0, 1.0, 1.0, 1.0);
        let near = exponential_fog(&color, 10.0, 0.01).w;
        let far = exponential_fog(&color, 100.0, 0.01).w;
        assert!(near > 0.0 && near < far);
        assert_relative_eq!(far, 1.0 - (-1.0f32).exp(), epsilon = 1e-6);
        assert_relative_eq!(exponential_fog(&color, 1.0e4, 0.01).w, 1.0);
    }

    #[test]
    fn test_linear_fog_ramp() {
        let color = Vec4::new(1.0, 1.0, 1.0, 1.0);
        assert_relative_eq!(linear_fog(&color, 4000.0, 4500.0, 5000.0).w, 0.0);
        assert_relative_eq!(linear_fog(&color, 4750.0, 4500.0, 5000.0).w, 0.5);
        assert_relative_eq!(linear_fog(&color, 6000.0, 4500.0, 5000.0).w, 1.0);
        assert_relative_eq!(linear_fog(&color, 10.0, 5.0, 5.0).w, 1.0);
    }

    #[test]
    fn test_fog_alpha_source() {
        let fog = FogParams::linear(Vec4::new(0.0, 0.0, 0.0, 0.5), 0.0, 10.0);
        let lit = Vec4::new(1.0, 1.0, 1.0, 0.8);

        let computed = apply_fog(&lit, &fog, 10.0, FogAlphaSource::Computed);
        assert_relative_eq!(computed, Vec4::new(0.0, 0.0, 0.0, 0.8));

        let scaled = apply_fog(&lit, &fog, 10.0, FogAlphaSource::ColorAlpha);
        assert_relative_eq!(scaled, Vec4::new(0.5, 0.5, 0.5, 0.8));
    }

    #[test]
    fn test_fog_respects_material_flag_and_mode() {
        let geometry = FragmentGeometry::new(Vec3::new(0.0, 0.0, -10.0), Vec3::y());
        let fog = FogParams::linear(Vec4::new(0.0, 0.0, 0.0, 1.0), 0.0, 10.0);
        let lit = Vec4::new(1.0, 1.0, 1.0, 1.0);
        let view = view_at_origin();
        let steps = PostSteps::none();

        let no_fog = MaterialParams::default().with_flags(MaterialFlags::empty());
        assert_eq!(composite(lit, &geometry, &no_fog, &fog, &view, &steps, &Reinhard), lit);

        let fogged = MaterialParams::default();
        assert_relative_eq!(
            composite(lit, &geometry, &fogged, &fog, &view, &steps, &Reinhard),
            Vec4::new(0.0, 0.0, 0.0, 1.0)
        );
        assert_eq!(composite(lit, &geometry, &fogged, &FogParams::off(), &view, &steps, &Reinhard), lit);
    }

    #[test]
    fn test_fog_runs_before_tonemap() {
        let geometry = FragmentGeometry::new(Vec3::new(0.0, 0.0, -10.0), Vec3::y());
        let fog = FogParams::linear(Vec4::new(0.0, 0.0, 0.0, 1.0), 0.0, 20.0);
        let steps = PostSteps { tonemap: true, ..PostSteps::none() };

        let out = composite(
            Vec4::new(4.0, 4.0, 4.0, 1.0),
            &geometry,
            &MaterialParams::default(),
            &fog,
            &view_at_origin(),
            &steps,
            &Tonemapping::Reinhard,
        );

        // fog halves 4 to 2, Reinhard maps 2 to 2/3
        assert_relative_eq!(out.x, 2.0 / 3.0, epsilon = 1e-6);
    }

    #[test]
    fn test_premultiply_runs_last() {
        let geometry = FragmentGeometry::new(Vec3::new(0.0, 0.0, -1.0), Vec3::y());
        let steps = PostSteps { tonemap: true, premultiply: true, ..PostSteps::none() };

        let out = composite(
            Vec4::new(1.0, 1.0, 1.0, 0.5),
            &geometry,
            &MaterialParams::default(),
            &FogParams::off(),
            &view_at_origin(),
            &steps,
            &Reinhard,
        );
        assert_relative_eq!(out, Vec4::new(0.25, 0.25, 0.25, 0.5), epsilon = 1e-6);
    }

    #[test]
    fn test_dither_runs_between_tonemap_and_premultiply() {
        let geometry = FragmentGeometry::new(Vec3::new(0.0, 0.0, -1.0), Vec3::y()).with_screen_position(0.5, 0.5);
        let view = view_at_origin();
        let steps = PostSteps {
            tonemap: true,
            dither: Some(DitherPattern::Bayer4x4),
            premultiply: true,
            ..PostSteps::none()
        };
        let lit = Vec4::new(4.0, 4.0, 4.0, 0.5);
        let out = composite(lit, &geometry, &MaterialParams::default(), &FogParams::off(), &view, &steps, &Reinhard);

        let mapped = Reinhard.map(lit.xyz(), &view.color_grading);
        let dithered = deband(&mapped, &geometry.frag_coord(), DitherPattern::Bayer4x4);
        assert!((dithered - mapped).magnitude() > 1e-4);
        assert_relative_eq!(
            out,
            Vec4::new(dithered.x * 0.5, dithered.y * 0.5, dithered.z * 0.5, 0.5),
            epsilon = 1e-6
        );

        // Dithering the unmapped HDR color would land somewhere else
        let early = Reinhard.map(deband(&lit.xyz(), &geometry.frag_coord(), DitherPattern::Bayer4x4), &view.color_grading);
        assert!((out.x - early.x * 0.5).abs() > 1e-3);
    }

    #[test]
    fn test_hdr_view_skips_tonemap() {
        let geometry = FragmentGeometry::new(Vec3::new(0.0, 0.0, -1.0), Vec3::y());
        let steps = PostSteps { tonemap: true, ..PostSteps::none() };
        let mut view = view_at_origin();
        view.hdr = true;

        let lit = Vec4::new(3.0, 2.0, 1.0, 1.0);
        let out = composite(lit, &geometry, &MaterialParams::default(), &FogParams::off(), &view, &steps, &Reinhard);
        assert_eq!(out, lit);
    }

    #[test]
    fn test_dither_amplitude() {
        let bound = 0.5 / 255.0;
        for pattern in [DitherPattern::ScreenSpace, DitherPattern::Bayer4x4] {
            for y in 0..8 {
                for x in 0..8 {
                    let noise = screen_space_dither(&Vec2::new(x as f32 + 0.5, y as f32 + 0.5), pattern);
                    for c in noise.iter() {
                        assert!(c.abs() <= bound, "{pattern:?} noise {c} exceeds bound");
                    }
                }
            }
        }
    }

    #[test]
    fn test_bayer_covers_sixteen_levels() {
        let mut levels: Vec<f32> = (0..16)
            .map(|i| screen_space_dither(&Vec2::new((i % 4) as f32, (i / 4) as f32), DitherPattern::Bayer4x4).x)
            .collect();
        levels.sort_by(f32::total_cmp);
        levels.dedup();
        assert_eq!(levels.len(), 16);

        let wrapped = screen_space_dither(&Vec2::new(5.0, -3.0), DitherPattern::Bayer4x4);
        assert_eq!(wrapped, screen_space_dither(&Vec2::new(1.0, 1.0), DitherPattern::Bayer4x4));
    }

    #[test]
    fn test_deband_stays_close() {
        let rgb = Vec3::new(0.2, 0.5, 0.8);
        let out = deband(&rgb, &Vec2::new(17.5, 42.5), DitherPattern::ScreenSpace);
        assert_relative_eq!(out, rgb, epsilon = 0.01);
    }

    #[test]
    fn test_steps_resolution() {
        let capabilities = PipelineCapabilities { deband_dither: true, premultiply_alpha: true, ..Default::default() };
        let post = PostConfig { dither_pattern: DitherPattern::Bayer4x4, ..Default::default() };
        let steps = PostSteps::resolve(&capabilities, &post);
        assert!(steps.tonemap);
        assert!(steps.premultiply);
        assert_eq!(steps.dither, Some(DitherPattern::Bayer4x4));

        let steps = PostSteps::resolve(&PipelineCapabilities::minimal(), &post);
        assert_eq!(steps, PostSteps::none());
    }
}
