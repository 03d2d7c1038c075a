//! # Camera and view uniforms
//!
//! [`Camera`] is the user-facing description; [`ViewUniform`] is the per-frame,
//! read-only snapshot the shading pipeline consumes (position, projection,
//! world-from-view transform, output target and color grading).
//!
//! ## Coordinate System
//! Right-handed, Y-up. The camera looks down its local -Z axis, so column 2 of
//! `world_from_view` points from the scene back toward the viewer.

use crate::foundation::math::{Mat4, Mat4Ext, Vec3};
use crate::render::tonemap::{ColorGrading, Tonemapping};

/// Projection model
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Perspective projection with vertical field of view in radians
    Perspective {
        /// Vertical field of view in radians
        fov: f32,
    },
    /// Orthographic projection with the half-height of the view volume
    Orthographic {
        /// Half the visible height in world units
        half_height: f32,
    },
}

/// 3D camera for perspective and orthographic projections
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space
    pub position: Vec3,

    /// Point the camera is looking at in world space
    pub target: Vec3,

    /// Up vector for camera orientation (typically [0, 1, 0])
    pub up: Vec3,

    /// Projection model
    pub projection: Projection,

    /// Aspect ratio (width / height) for projection calculations
    pub aspect: f32,

    /// Distance to near clipping plane
    pub near: f32,

    /// Distance to far clipping plane
    pub far: f32,

    /// Whether the camera renders into an HDR target (tone mapping deferred)
    pub hdr: bool,

    /// Color grading applied during tone mapping
    pub color_grading: ColorGrading,

    /// Tone mapping curve
    pub tonemapping: Tonemapping,
}

impl Camera {
    /// Create a perspective camera looking at the origin
    ///
    /// # Arguments
    /// * `position` - Camera position in world space
    /// * `fov_degrees` - Vertical field of view in degrees
    /// * `aspect` - Aspect ratio (width / height)
    /// * `near` - Distance to near clipping plane (must be > 0)
    /// * `far` - Distance to far clipping plane (must be > near)
    pub fn perspective(position: Vec3, fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            projection: Projection::Perspective { fov: fov_degrees.to_radians() },
            aspect,
            near,
            far,
            ..Self::default()
        }
    }

    /// Create an orthographic camera looking at the origin
    pub fn orthographic(position: Vec3, half_height: f32, aspect: f32, near: f32, far: f32) -> Self {
        Self {
            position,
            projection: Projection::Orthographic { half_height },
            aspect,
            near,
            far,
            ..Self::default()
        }
    }

    /// Point the camera at `target`
    pub fn look_at(mut self, target: Vec3, up: Vec3) -> Self {
        self.target = target;
        self.up = up;
        log::trace!("Camera look_at updated - target: {:?}, up: {:?}", target, up);
        self
    }

    /// Render into an HDR target
    pub fn with_hdr(mut self, hdr: bool) -> Self {
        self.hdr = hdr;
        self
    }

    /// Set color grading
    pub fn with_color_grading(mut self, grading: ColorGrading) -> Self {
        self.color_grading = grading;
        self
    }

    /// Set the tone mapping curve
    pub fn with_tonemapping(mut self, tonemapping: Tonemapping) -> Self {
        self.tonemapping = tonemapping;
        self
    }

    /// Projection matrix for the current settings
    pub fn projection_matrix(&self) -> Mat4 {
        match self.projection {
            Projection::Perspective { fov } => Mat4::perspective(fov, self.aspect, self.near, self.far),
            Projection::Orthographic { half_height } => {
                Mat4::orthographic(half_height * self.aspect, half_height, self.near, self.far)
            }
        }
    }

    /// Snapshot the camera into the per-frame view uniform
    pub fn view_uniform(&self) -> ViewUniform {
        ViewUniform {
            world_position: self.position,
            projection: self.projection_matrix(),
            world_from_view: Mat4::world_from_view(self.position, self.target, self.up),
            hdr: self.hdr,
            color_grading: self.color_grading,
            tonemapping: self.tonemapping,
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 3.0, 3.0),
            target: Vec3::zeros(),
            up: Vec3::new(0.0, 1.0, 0.0),
            projection: Projection::Perspective { fov: std::f32::consts::FRAC_PI_4 },
            aspect: 16.0 / 9.0,
            near: 0.1,
            far: 10000.0,
            hdr: false,
            color_grading: ColorGrading::default(),
            tonemapping: Tonemapping::default(),
        }
    }
}

/// Per-frame camera state read by every fragment
#[derive(Debug, Clone, PartialEq)]
pub struct ViewUniform {
    /// Camera position in world space
    pub world_position: Vec3,
    /// Projection matrix
    pub projection: Mat4,
    /// Camera-to-world transform
    pub world_from_view: Mat4,
    /// Whether the render target is HDR
    pub hdr: bool,
    /// Color grading settings
    pub color_grading: ColorGrading,
    /// Tone mapping curve used for non-HDR targets
    pub tonemapping: Tonemapping,
}

impl ViewUniform {
    /// Whether the projection is orthographic
    pub fn is_orthographic(&self) -> bool {
        self.projection.is_orthographic()
    }

    /// World-space unit vector from the scene toward the camera along the view axis
    pub fn backward(&self) -> Vec3 {
        Vec3::new(
            self.world_from_view[(0, 2)],
            self.world_from_view[(1, 2)],
            self.world_from_view[(2, 2)],
        )
        .normalize()
    }

    /// Unit view vector (surface toward viewer) for a fragment at `world_position`
    ///
    /// Perspective views point at the camera position; orthographic views share
    /// the camera's backward axis for every fragment.
    pub fn view_vector(&self, world_position: &Vec3) -> Vec3 {
        if self.is_orthographic() {
            self.backward()
        } else {
            (self.world_position - world_position).normalize()
        }
    }

    /// Euclidean distance from the camera to `world_position`
    pub fn distance_to(&self, world_position: &Vec3) -> f32 {
        (self.world_position - world_position).magnitude()
    }
}

impl Default for ViewUniform {
    fn default() -> Self {
        Camera::default().view_uniform()
    }
}
