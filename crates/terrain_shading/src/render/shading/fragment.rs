//! Per-fragment geometry produced by the rasterizer

use crate::foundation::math::{Vec2, Vec3, Vec4};

/// Interpolated vertex outputs for one fragment
///
/// Read-only to the shading pipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentGeometry {
    /// World-space position
    pub world_position: Vec3,
    /// World-space surface normal (unit)
    pub world_normal: Vec3,
    /// World-space tangent; `w` is the handedness sign, +1 or -1
    pub world_tangent: Vec4,
    /// Mesh texture coordinate
    pub uv: Vec2,
    /// Whether the triangle faces the camera
    pub is_front_face: bool,
    /// Framebuffer position; `xy` are pixel coordinates
    pub screen_position: Vec4,
    /// Normal loaded from a depth/normal prepass, when one ran
    pub prepass_normal: Option<Vec3>,
}

impl FragmentGeometry {
    /// Front-facing fragment with a +X tangent and no prepass data
    pub fn new(world_position: Vec3, world_normal: Vec3) -> Self {
        Self {
            world_position,
            world_normal,
            world_tangent: Vec4::new(1.0, 0.0, 0.0, 1.0),
            uv: Vec2::zeros(),
            is_front_face: true,
            screen_position: Vec4::zeros(),
            prepass_normal: None,
        }
    }

    /// Set the tangent and handedness
    pub fn with_tangent(mut self, tangent: Vec3, handedness: f32) -> Self {
        self.world_tangent = Vec4::new(tangent.x, tangent.y, tangent.z, handedness);
        self
    }

    /// Mark the fragment as front or back facing
    pub fn with_front_face(mut self, is_front_face: bool) -> Self {
        self.is_front_face = is_front_face;
        self
    }

    /// Set the pixel coordinate
    pub fn with_screen_position(mut self, x: f32, y: f32) -> Self {
        self.screen_position = Vec4::new(x, y, 0.0, 1.0);
        self
    }

    /// Attach a prepass normal
    pub fn with_prepass_normal(mut self, normal: Vec3) -> Self {
        self.prepass_normal = Some(normal);
        self
    }

    /// Pixel coordinate used for screen-space noise
    pub fn frag_coord(&self) -> Vec2 {
        self.screen_position.xy()
    }
}
