//! Procedural heightfield and layer textures for the demo scene

use rand::prelude::*;
use terrain_shading::foundation::math::{Vec3, Vec4};
use terrain_shading::render::texture::{Texture2D, TextureError};

/// Rolling hills with a cliff band running along Z
#[derive(Debug, Clone, Copy)]
pub struct Heightfield {
    /// Overall height multiplier
    pub amplitude: f32,
    /// X coordinate of the cliff
    pub cliff_x: f32,
    /// Height of the cliff step
    pub cliff_height: f32,
}

impl Default for Heightfield {
    fn default() -> Self {
        Self {
            amplitude: 1.0,
            cliff_x: 40.0,
            cliff_height: 35.0,
        }
    }
}

impl Heightfield {
    /// Terrain height at `(x, z)`
    pub fn height(&self, x: f32, z: f32) -> f32 {
        let hills = 18.0 * (x * 0.021).sin() * (z * 0.017).cos() + 6.0 * (x * 0.07 + z * 0.05).sin();
        let cliff = self.cliff_height / (1.0 + (-(x - self.cliff_x) * 0.3).exp());
        self.amplitude * hills + cliff
    }

    /// Unit surface normal from central differences
    pub fn normal(&self, x: f32, z: f32) -> Vec3 {
        let (dx, dz) = self.slopes(x, z);
        Vec3::new(-dx, 1.0, -dz).normalize()
    }

    /// Unit tangent along +X following the surface
    pub fn tangent(&self, x: f32, z: f32) -> Vec3 {
        let (dx, _) = self.slopes(x, z);
        Vec3::new(1.0, dx, 0.0).normalize()
    }

    fn slopes(&self, x: f32, z: f32) -> (f32, f32) {
        const EPS: f32 = 0.05;
        let dx = (self.height(x + EPS, z) - self.height(x - EPS, z)) / (2.0 * EPS);
        let dz = (self.height(x, z + EPS) - self.height(x, z - EPS)) / (2.0 * EPS);
        (dx, dz)
    }

    /// First hit of a ray against the surface, refined by bisection
    pub fn intersect(&self, origin: &Vec3, direction: &Vec3, max_distance: f32) -> Option<Vec3> {
        let above = |t: f32| {
            let p = origin + direction * t;
            p.y - self.height(p.x, p.z)
        };

        let mut t_prev = 0.0;
        let mut t = 0.5;
        while t < max_distance {
            if above(t) < 0.0 {
                let (mut lo, mut hi) = (t_prev, t);
                for _ in 0..16 {
                    let mid = 0.5 * (lo + hi);
                    if above(mid) < 0.0 {
                        hi = mid;
                    } else {
                        lo = mid;
                    }
                }
                return Some(origin + direction * hi);
            }
            t_prev = t;
            t += (t * 0.01).max(0.25);
        }
        None
    }
}

/// Albedo texture with per-texel brightness noise around `base`
pub fn noise_albedo(size: u32, seed: u64, base: Vec3, variation: f32) -> Result<Texture2D, TextureError> {
    let mut rng = StdRng::seed_from_u64(seed);
    Texture2D::from_fn(size, size, |_, _| {
        let scale = 1.0 + rng.gen_range(-variation..=variation);
        let rgb = base * scale;
        Vec4::new(rgb.x, rgb.y, rgb.z, 1.0)
    })
}

/// Tangent-space normal map derived from a random bump height grid
pub fn noise_normal_map(size: u32, seed: u64, strength: f32) -> Result<Texture2D, TextureError> {
    let mut rng = StdRng::seed_from_u64(seed);
    let n = size as usize;
    let heights: Vec<f32> = (0..n * n).map(|_| rng.gen::<f32>()).collect();
    let at = |x: u32, y: u32| heights[(y % size) as usize * n + (x % size) as usize];

    Texture2D::from_fn(size, size, |x, y| {
        let dx = at(x + 1, y) - at(x + size - 1, y);
        let dy = at(x, y + 1) - at(x, y + size - 1);
        let normal = Vec3::new(-dx * strength, -dy * strength, 1.0).normalize();
        let encoded = normal * 0.5 + Vec3::repeat(0.5);
        Vec4::new(encoded.x, encoded.y, encoded.z, 1.0)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_heightfield_normal_points_up() {
        let field = Heightfield { amplitude: 0.0, cliff_height: 0.0, ..Heightfield::default() };
        assert_relative_eq!(field.normal(12.0, -7.0), Vec3::y(), epsilon = 1e-6);
        assert_relative_eq!(field.tangent(12.0, -7.0), Vec3::x(), epsilon = 1e-6);
    }

    #[test]
    fn test_cliff_is_steep() {
        let field = Heightfield::default();
        assert!(field.normal(field.cliff_x, 0.0).y < 0.5);
    }

    #[test]
    fn test_ray_hits_surface() {
        let field = Heightfield { amplitude: 0.0, cliff_height: 0.0, ..Heightfield::default() };
        let hit = field
            .intersect(&Vec3::new(0.0, 10.0, 0.0), &Vec3::new(0.0, -1.0, 0.0), 100.0)
            .unwrap();
        assert_relative_eq!(hit.y, 0.0, epsilon = 1e-3);
        assert!(field.intersect(&Vec3::new(0.0, 10.0, 0.0), &Vec3::y(), 100.0).is_none());
    }

    #[test]
    fn test_normal_map_texels_are_encoded_unit_vectors() {
        let map = noise_normal_map(8, 3, 2.0).unwrap();
        for y in 0..8 {
            for x in 0..8 {
                let decoded = map.texel(x, y).xyz() * 2.0 - Vec3::repeat(1.0);
                assert_relative_eq!(decoded.magnitude(), 1.0, epsilon = 1e-5);
                assert!(decoded.z > 0.0);
            }
        }
    }
}
