//! Texture sampling
//!
//! The shading pipeline only sees textures through [`TextureSampler`]. The real
//! binding layer hands in GPU-backed samplers; [`Texture2D`] is a CPU texture
//! with repeat addressing so layers tile across world-space coordinates, and
//! [`SolidColor`] stands in for untextured layers.

use crate::foundation::math::{utils, Vec2, Vec4};

/// Read-only texture lookup
pub trait TextureSampler: Send + Sync {
    /// Sample the texture at `uv`; `mip_bias` is forwarded to samplers that have mips
    fn sample(&self, uv: Vec2, mip_bias: f32) -> Vec4;
}

/// Texture construction errors
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TextureError {
    /// Width or height is zero
    #[error("Texture dimensions must be non-zero, got {width}x{height}")]
    EmptyDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// Texel count doesn't match the dimensions
    #[error("Expected {expected} texels, got {actual}")]
    SizeMismatch {
        /// Texels implied by the dimensions
        expected: usize,
        /// Texels provided
        actual: usize,
    },
}

/// A constant color, returned for every lookup
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SolidColor(pub Vec4);

impl TextureSampler for SolidColor {
    fn sample(&self, _uv: Vec2, _mip_bias: f32) -> Vec4 {
        self.0
    }
}

/// Linear RGBA texture stored on the CPU
///
/// Sampling uses repeat addressing on both axes and bilinear filtering. There
/// is a single mip level, so the mip bias is ignored.
#[derive(Debug, Clone)]
pub struct Texture2D {
    width: u32,
    height: u32,
    texels: Vec<Vec4>,
}

impl Texture2D {
    /// Create a texture from row-major texels
    pub fn new(width: u32, height: u32, texels: Vec<Vec4>) -> Result<Self, TextureError> {
        if width == 0 || height == 0 {
            return Err(TextureError::EmptyDimensions { width, height });
        }

        let expected = width as usize * height as usize;
        if texels.len() != expected {
            return Err(TextureError::SizeMismatch { expected, actual: texels.len() });
        }

        Ok(Self { width, height, texels })
    }

    /// Create a texture by evaluating `f(x, y)` for every texel
    pub fn from_fn(
        width: u32,
        height: u32,
        mut f: impl FnMut(u32, u32) -> Vec4,
    ) -> Result<Self, TextureError> {
        let mut texels = Vec::with_capacity(width as usize * height as usize);
        for y in 0..height {
            for x in 0..width {
                texels.push(f(x, y));
            }
        }
        Self::new(width, height, texels)
    }

    /// Width in texels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Fetch a texel with repeat wrapping
    pub fn texel(&self, x: i64, y: i64) -> Vec4 {
        let x = x.rem_euclid(i64::from(self.width)) as usize;
        let y = y.rem_euclid(i64::from(self.height)) as usize;
        self.texels[y * self.width as usize + x]
    }
}

impl TextureSampler for Texture2D {
    fn sample(&self, uv: Vec2, _mip_bias: f32) -> Vec4 {
        // Texel centers sit at half-integer coordinates
        let x = uv.x * self.width as f32 - 0.5;
        let y = uv.y * self.height as f32 - 0.5;

        let x0 = x.floor();
        let y0 = y.floor();
        let tx = x - x0;
        let ty = y - y0;

        // Wrap before stepping so huge coordinates can't overflow
        let (w, h) = (i64::from(self.width), i64::from(self.height));
        let (ix, iy) = ((x0 as i64).rem_euclid(w), (y0 as i64).rem_euclid(h));
        let (ix1, iy1) = ((ix + 1) % w, (iy + 1) % h);

        let top = utils::mix4(&self.texel(ix, iy), &self.texel(ix1, iy), tx);
        let bottom = utils::mix4(&self.texel(ix, iy1), &self.texel(ix1, iy1), tx);
        utils::mix4(&top, &bottom, ty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn checker() -> Texture2D {
        Texture2D::from_fn(2, 2, |x, y| {
            if (x + y) % 2 == 0 {
                Vec4::new(1.0, 1.0, 1.0, 1.0)
            } else {
                Vec4::new(0.0, 0.0, 0.0, 1.0)
            }
        })
        .unwrap()
    }

    #[test]
    fn test_rejects_bad_dimensions() {
        assert_eq!(
            Texture2D::new(0, 4, Vec::new()).unwrap_err(),
            TextureError::EmptyDimensions { width: 0, height: 4 }
        );
        assert_eq!(
            Texture2D::new(2, 2, vec![Vec4::zeros(); 3]).unwrap_err(),
            TextureError::SizeMismatch { expected: 4, actual: 3 }
        );
    }

    #[test]
    fn test_texel_center_is_exact() {
        let texture = checker();
        assert_relative_eq!(texture.sample(Vec2::new(0.25, 0.25), 0.0), Vec4::new(1.0, 1.0, 1.0, 1.0));
        assert_relative_eq!(texture.sample(Vec2::new(0.75, 0.25), 0.0), Vec4::new(0.0, 0.0, 0.0, 1.0));
    }

    #[test]
    fn test_repeat_addressing_tiles() {
        let texture = checker();
        let inside = texture.sample(Vec2::new(0.3, 0.6), 0.0);
        assert_relative_eq!(texture.sample(Vec2::new(3.3, -1.4), 0.0), inside, epsilon = 1e-5);
    }

    #[test]
    fn test_bilinear_midpoint_averages() {
        let texture = checker();
        // Halfway between texel centers (0,0) and (1,0)
        let mid = texture.sample(Vec2::new(0.5, 0.25), 0.0);
        assert_relative_eq!(mid.x, 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_huge_coordinates_stay_in_range() {
        let texture = checker();
        for uv in [Vec2::new(1.0e30, 0.0), Vec2::new(0.0, -1.0e30), Vec2::new(3.0e20, 7.0e25)] {
            let color = texture.sample(uv, 0.0);
            for channel in color.iter() {
                assert!((0.0..=1.0).contains(channel), "{uv:?} gave {color:?}");
            }
        }
    }
}
