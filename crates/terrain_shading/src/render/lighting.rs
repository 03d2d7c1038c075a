//! Lighting evaluation
//!
//! The shading pipeline hands a fully assembled [`ShadingInput`] to a
//! [`LightingEvaluator`] and gets linear color back. The BRDF lives behind that
//! trait; [`LambertEvaluator`] is a small reference implementation (Lambert
//! diffuse plus Blinn-Phong highlight) over a [`LightingEnvironment`] so the
//! pipeline can run on the CPU without a GPU lighting pass.

use crate::foundation::math::{utils, Vec3, Vec4};
use crate::render::shading::ShadingInput;

/// Turns a shading input record into a lit linear color
pub trait LightingEvaluator: Send + Sync {
    /// Evaluate lighting; the returned alpha is the input base color alpha
    fn evaluate(&self, input: &ShadingInput) -> Vec4;
}

/// A punctual light evaluated by [`LambertEvaluator`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    /// Infinitely distant light such as the sun
    Directional {
        /// Unit direction the light travels in
        direction: Vec3,
        /// Linear color scaled by intensity
        radiance: Vec3,
    },
    /// Local light with a smooth range cutoff
    Point {
        /// World-space position
        position: Vec3,
        /// Linear color scaled by intensity
        radiance: Vec3,
        /// Distance at which the contribution reaches zero
        range: f32,
    },
}

impl Light {
    /// Sun-like light travelling along `direction`
    pub fn directional(direction: Vec3, color: Vec3, intensity: f32) -> Self {
        Self::Directional { direction: direction.normalize(), radiance: color * intensity }
    }

    /// Light at `position` fading out by `range`
    pub fn point(position: Vec3, color: Vec3, intensity: f32, range: f32) -> Self {
        Self::Point { position, radiance: color * intensity, range }
    }

    /// Unit direction toward the light and the radiance arriving at `world_position`
    fn incident(&self, world_position: &Vec3) -> (Vec3, Vec3) {
        match *self {
            Self::Directional { direction, radiance } => (-direction, radiance),
            Self::Point { position, radiance, range } => {
                let to_light = position - world_position;
                let distance = to_light.magnitude();
                if distance <= f32::EPSILON || range <= 0.0 {
                    return (Vec3::zeros(), Vec3::zeros());
                }
                // Smooth window, zero at `range`
                let window = utils::saturate(1.0 - (distance / range).powi(2));
                (to_light / distance, radiance * (window * window))
            }
        }
    }
}

/// Lights and ambient term shared by every fragment of a frame
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LightingEnvironment {
    /// Punctual lights
    pub lights: Vec<Light>,
    /// Ambient radiance (color times intensity)
    pub ambient: Vec3,
}

impl LightingEnvironment {
    /// Environment with no ambient light and no lights
    pub fn dark() -> Self {
        Self::default()
    }

    /// Append a light
    pub fn with_light(mut self, light: Light) -> Self {
        self.lights.push(light);
        self
    }

    /// Replace the ambient term
    pub fn with_ambient(mut self, color: Vec3, intensity: f32) -> Self {
        self.ambient = color * intensity;
        self
    }

    /// Low afternoon sun over a pale blue sky
    pub fn daylight() -> Self {
        Self::dark()
            .with_ambient(Vec3::new(0.45, 0.6, 0.85), 0.35)
            .with_light(Light::directional(Vec3::new(-0.4, -1.0, -0.25), Vec3::new(1.0, 0.96, 0.88), 1.1))
    }
}

/// Lambert diffuse and Blinn-Phong specular over a [`LightingEnvironment`]
#[derive(Debug, Clone, Default)]
pub struct LambertEvaluator {
    /// Lights to evaluate against
    pub environment: LightingEnvironment,
}

impl LambertEvaluator {
    /// Create an evaluator for `environment`
    pub fn new(environment: LightingEnvironment) -> Self {
        Self { environment }
    }
}

impl LightingEvaluator for LambertEvaluator {
    fn evaluate(&self, input: &ShadingInput) -> Vec4 {
        let material = &input.material;
        let base = input.base_color.xyz();
        let metallic = utils::saturate(material.metallic);

        let diffuse_color = base * (1.0 - metallic);
        let dielectric_f0 = 0.16 * material.reflectance * material.reflectance;
        let f0 = utils::mix3(&Vec3::repeat(dielectric_f0), &base, metallic);
        let roughness = utils::clamp(material.perceptual_roughness, 0.089, 1.0);
        let shininess = (10.0 * (1.0 - roughness) + 1.0).exp2();

        let n = input.world_normal;
        let v = input.view;

        let mut color = self.environment.ambient.component_mul(&diffuse_color) * input.occlusion;

        for light in &self.environment.lights {
            let (l, radiance) = light.incident(&input.world_position);
            let n_dot_l = n.dot(&l);
            if n_dot_l <= 0.0 {
                continue;
            }

            let h = (l + v).normalize();
            let specular = f0 * n.dot(&h).max(0.0).powf(shininess);
            color += (diffuse_color + specular).component_mul(&(radiance * n_dot_l));
        }

        color += material.emissive.xyz();
        Vec4::new(color.x, color.y, color.z, input.base_color.w)
    }
}
