//! Vector aliases and shader-style helpers
//!
//! `nalgebra` `f32` aliases used throughout the crate, plus the handful of
//! GLSL/WGSL-style helpers (`mix`, `saturate`, `fract`) fragment code leans on.

pub use nalgebra::{Matrix4, Vector2, Vector3, Vector4};

/// Texture coordinates and pixel positions
pub type Vec2 = Vector2<f32>;

/// Positions, directions and RGB colors
pub type Vec3 = Vector3<f32>;

/// 4D vector type (also used for RGBA colors)
pub type Vec4 = Vector4<f32>;

/// Projection and camera transforms
pub type Mat4 = Matrix4<f32>;

/// Scalar and color helpers mirroring shader builtins
pub mod utils {
    use super::{Vec3, Vec4};

    /// Clamp `value` into `[min, max]`
    pub fn clamp(value: f32, min: f32, max: f32) -> f32 {
        value.max(min).min(max)
    }

    /// Clamp a value to `[0, 1]`
    pub fn saturate(value: f32) -> f32 {
        clamp(value, 0.0, 1.0)
    }

    // Interpolation is written as `a * (1 - t) + b * t` so both endpoints are
    // reproduced exactly at t = 0 and t = 1.

    /// Scalar `mix`
    pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
        a * (1.0 - t) + b * t
    }

    /// Component-wise linear interpolation of two RGB values
    pub fn mix3(a: &Vec3, b: &Vec3, t: f32) -> Vec3 {
        a * (1.0 - t) + b * t
    }

    /// Component-wise linear interpolation of two RGBA values
    pub fn mix4(a: &Vec4, b: &Vec4, t: f32) -> Vec4 {
        a * (1.0 - t) + b * t
    }

    /// Apply `powf` to each RGB channel
    pub fn pow3(v: &Vec3, exponent: f32) -> Vec3 {
        v.map(|c| c.powf(exponent))
    }

    /// Fractional part, matching the shader `fract` builtin for negative inputs
    pub fn fract(value: f32) -> f32 {
        value - value.floor()
    }
}

/// Extension trait for Mat4 with projection helpers
pub trait Mat4Ext {
    /// Create a perspective projection matrix (depth mapped to `[0, 1]`)
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create an orthographic projection matrix (depth mapped to `[0, 1]`)
    fn orthographic(half_width: f32, half_height: f32, near: f32, far: f32) -> Mat4;

    /// Create a world-from-view matrix for a camera at `eye` looking at `target`
    ///
    /// The camera looks down its local -Z axis, so column 2 is the world-space
    /// "backward" direction (pointing from the scene toward the viewer).
    fn world_from_view(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;

    /// Whether this projection matrix is orthographic (`[3][3] == 1`)
    fn is_orthographic(&self) -> bool;
}

impl Mat4Ext for Mat4 {
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = far / (far - near);
        result[(2, 3)] = -(near * far) / (far - near);
        result[(3, 2)] = 1.0;

        result
    }

    fn orthographic(half_width: f32, half_height: f32, near: f32, far: f32) -> Mat4 {
        let mut result = Mat4::identity();
        result[(0, 0)] = 1.0 / half_width;
        result[(1, 1)] = 1.0 / half_height;
        result[(2, 2)] = 1.0 / (far - near);
        result[(2, 3)] = -near / (far - near);
        result
    }

    fn world_from_view(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let backward = (eye - target).normalize();
        let right = up.cross(&backward).normalize();
        let camera_up = backward.cross(&right);

        Mat4::new(
            right.x, camera_up.x, backward.x, eye.x,
            right.y, camera_up.y, backward.y, eye.y,
            right.z, camera_up.z, backward.z, eye.z,
            0.0, 0.0, 0.0, 1.0,
        )
    }

    fn is_orthographic(&self) -> bool {
        // Element [3][3] is 1 for orthographic and 0 for perspective projections
        (self[(3, 3)] - 1.0).abs() < f32::EPSILON
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_projection_kind_detection() {
        let perspective = Mat4::perspective(1.0, 16.0 / 9.0, 0.1, 1000.0);
        let orthographic = Mat4::orthographic(10.0, 10.0, 0.1, 1000.0);

        assert!(!perspective.is_orthographic());
        assert!(orthographic.is_orthographic());
    }

    #[test]
    fn test_world_from_view_backward_axis() {
        let eye = Vec3::new(0.0, 10.0, 0.0);
        let target = Vec3::new(0.0, 0.0, -10.0);
        let m = Mat4::world_from_view(eye, target, Vec3::y());

        let backward = Vec3::new(m[(0, 2)], m[(1, 2)], m[(2, 2)]);
        assert_relative_eq!(backward, (eye - target).normalize(), epsilon = 1e-6);
        assert_relative_eq!(m[(1, 3)], 10.0);
    }

    #[test]
    fn test_mix_endpoints() {
        let a = Vec3::new(0.0, 0.5, 1.0);
        let b = Vec3::new(1.0, 0.5, 0.0);
        assert_relative_eq!(utils::mix3(&a, &b, 0.0), a);
        assert_relative_eq!(utils::mix3(&a, &b, 1.0), b);
        assert_relative_eq!(utils::saturate(1.5), 1.0);
        assert_relative_eq!(utils::saturate(-0.5), 0.0);
    }
}
