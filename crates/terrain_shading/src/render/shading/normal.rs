//! Tangent-space normal reconstruction
//!
//! Rotates a normal-map texel from tangent space into world space using the
//! interpolated vertex frame.
//!
//! The tangent is used exactly as interpolated and is never re-orthogonalized
//! against the normal; baked normal maps expect the mikktspace frame as is.
//!
//! Degenerate input (zero-length tangent or normal) is not guarded and yields
//! NaN in the returned normal.

use crate::foundation::math::{Vec3, Vec4};
use crate::render::material::MaterialFlags;

/// Tangent / bitangent / normal frame of one fragment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TangentFrame {
    /// Tangent (not normalized or orthogonalized)
    pub tangent: Vec3,
    /// Bitangent, `handedness * cross(normal, tangent)`
    pub bitangent: Vec3,
    /// Unit surface normal
    pub normal: Vec3,
}

impl TangentFrame {
    /// Build the frame from a world normal and a tangent whose `w` holds the handedness sign
    pub fn new(world_normal: &Vec3, world_tangent: &Vec4) -> Self {
        let normal = world_normal.normalize();
        let tangent = world_tangent.xyz();
        let bitangent = normal.cross(&tangent) * world_tangent.w;
        Self { tangent, bitangent, normal }
    }

    /// Build the frame and flip it for back faces of double-sided materials
    pub fn for_fragment(
        world_normal: &Vec3,
        world_tangent: &Vec4,
        flags: MaterialFlags,
        is_front_face: bool,
    ) -> Self {
        let frame = Self::new(world_normal, world_tangent);
        if flags.contains(MaterialFlags::DOUBLE_SIDED) && !is_front_face {
            frame.flipped()
        } else {
            frame
        }
    }

    /// Negate all three axes together
    pub fn flipped(self) -> Self {
        Self {
            tangent: -self.tangent,
            bitangent: -self.bitangent,
            normal: -self.normal,
        }
    }

    /// Rotate a decoded tangent-space vector into world space and renormalize
    pub fn to_world(&self, tangent_space: &Vec3) -> Vec3 {
        (self.tangent * tangent_space.x + self.bitangent * tangent_space.y + self.normal * tangent_space.z)
            .normalize()
    }
}

/// Decode a normal-map texel from `[0, 1]` channels into a tangent-space vector
///
/// Two-component maps carry only X and Y; Z is rebuilt on the unit hemisphere.
/// Texels outside the unit disc would give a negative radicand, which is
/// clamped to zero so Z collapses to 0 instead of producing NaN.
pub fn decode_tangent_space_normal(texel: &Vec3, flags: MaterialFlags) -> Vec3 {
    let mut decoded = if flags.contains(MaterialFlags::TWO_COMPONENT_NORMAL_MAP) {
        let x = texel.x * 2.0 - 1.0;
        let y = texel.y * 2.0 - 1.0;
        let z = (1.0 - x * x - y * y).max(0.0).sqrt();
        Vec3::new(x, y, z)
    } else {
        texel * 2.0 - Vec3::repeat(1.0)
    };

    if flags.contains(MaterialFlags::FLIP_NORMAL_Y) {
        decoded.y = -decoded.y;
    }

    decoded
}

/// Perturb `world_normal` with a tangent-space normal-map texel
///
/// Returns a unit world-space normal.
pub fn reconstruct_normal(
    world_normal: &Vec3,
    world_tangent: &Vec4,
    texel: &Vec3,
    flags: MaterialFlags,
    is_front_face: bool,
) -> Vec3 {
    let frame = TangentFrame::for_fragment(world_normal, world_tangent, flags, is_front_face);
    frame.to_world(&decode_tangent_space_normal(texel, flags))
}

/// Geometric normal with the double-sided back-face flip applied
///
/// Used when no normal map (or no vertex tangent) is available.
pub fn prepare_world_normal(world_normal: &Vec3, flags: MaterialFlags, is_front_face: bool) -> Vec3 {
    let normal = world_normal.normalize();
    if flags.contains(MaterialFlags::DOUBLE_SIDED) && !is_front_face {
        -normal
    } else {
        normal
    }
}
