//! Alpha discard handling

use super::{AlphaMode, MaterialParams};
use crate::foundation::math::Vec4;

/// Applies a material's alpha mode to a color
///
/// Returns `None` when the fragment is discarded.
pub trait AlphaDiscard: Send + Sync {
    /// Resolve the output alpha for `color`, or discard it
    fn discard(&self, material: &MaterialParams, color: Vec4) -> Option<Vec4>;
}

/// Cutoff-based discard following the material's [`AlphaMode`]
#[derive(Debug, Clone, Copy, Default)]
pub struct CutoffDiscard;

impl AlphaDiscard for CutoffDiscard {
    fn discard(&self, material: &MaterialParams, color: Vec4) -> Option<Vec4> {
        match material.alpha_mode {
            AlphaMode::Opaque => Some(Vec4::new(color.x, color.y, color.z, 1.0)),
            AlphaMode::Mask => {
                if color.w < material.alpha_cutoff {
                    None
                } else {
                    Some(Vec4::new(color.x, color.y, color.z, 1.0))
                }
            }
            AlphaMode::Blend => Some(color),
        }
    }
}
