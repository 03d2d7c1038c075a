//! Shading input assembly
//!
//! Packages the blended surface, the final shading normal, the material and
//! the view-dependent vectors into the record a [`LightingEvaluator`] consumes.
//! Unlit materials stop here and never reach lighting or compositing.
//!
//! [`LightingEvaluator`]: crate::render::lighting::LightingEvaluator

use crate::core::config::PipelineCapabilities;
use crate::foundation::math::{Vec3, Vec4};
use crate::render::camera::ViewUniform;
use crate::render::material::{AlphaDiscard, MaterialFlags, MaterialParams};
use crate::render::shading::fragment::FragmentGeometry;
use crate::render::shading::normal::{prepare_world_normal, reconstruct_normal};

/// Everything the lighting evaluator needs for one fragment
#[derive(Debug, Clone, PartialEq)]
pub struct ShadingInput {
    /// Resolved base color, linear RGBA
    pub base_color: Vec4,
    /// Unit shading normal (possibly normal-mapped)
    pub world_normal: Vec3,
    /// Unit geometric normal after the double-sided flip
    pub geometric_normal: Vec3,
    /// Material parameters, copied verbatim
    pub material: MaterialParams,
    /// Ambient occlusion; always 1.0 (no occlusion) here
    pub occlusion: f32,
    /// World-space fragment position
    pub world_position: Vec3,
    /// Unit vector from the fragment toward the viewer
    pub view: Vec3,
    /// Whether the view vector came from an orthographic projection
    pub is_orthographic: bool,
}

/// Where the shading normal comes from, fixed when the pipeline is built
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NormalSource {
    /// Interpolated vertex normal, unperturbed
    Geometric,
    /// Vertex normal perturbed by the tangent-space normal map
    TangentSpace,
    /// Normal written by an earlier depth/normal prepass
    Prepass,
}

impl NormalSource {
    /// Pick the normal source for a capability set
    ///
    /// Tangent-space reconstruction needs both vertex tangents and a bound
    /// normal map; anything less falls back to the geometric normal.
    pub fn resolve(capabilities: &PipelineCapabilities, normal_maps_bound: bool) -> Self {
        if capabilities.prepass_normals {
            Self::Prepass
        } else if capabilities.can_reconstruct_normals() && normal_maps_bound {
            Self::TangentSpace
        } else {
            Self::Geometric
        }
    }
}

/// Result of input assembly
#[derive(Debug, Clone, PartialEq)]
pub enum AssembledFragment {
    /// Needs lighting
    Lit(ShadingInput),
    /// Unlit material; this is the final color
    Unlit(Vec4),
    /// Removed by alpha discard
    Discarded,
}

/// Final shading normal for a fragment
pub fn shading_normal(
    geometry: &FragmentGeometry,
    normal_texel: &Vec3,
    flags: MaterialFlags,
    source: NormalSource,
) -> Vec3 {
    match source {
        NormalSource::Geometric => prepare_world_normal(&geometry.world_normal, flags, geometry.is_front_face),
        NormalSource::TangentSpace => reconstruct_normal(
            &geometry.world_normal,
            &geometry.world_tangent,
            normal_texel,
            flags,
            geometry.is_front_face,
        ),
        NormalSource::Prepass => match geometry.prepass_normal {
            Some(normal) => normal.normalize(),
            None => prepare_world_normal(&geometry.world_normal, flags, geometry.is_front_face),
        },
    }
}

/// Build the lighting request for a fragment
///
/// Alpha discard runs first for every material. Unlit materials then return
/// their base color as the final output.
pub fn assemble(
    base_color: Vec4,
    normal_texel: &Vec3,
    geometry: &FragmentGeometry,
    material: &MaterialParams,
    normal_source: NormalSource,
    view: &ViewUniform,
    discard: &dyn AlphaDiscard,
) -> AssembledFragment {
    let Some(base_color) = discard.discard(material, base_color) else {
        return AssembledFragment::Discarded;
    };

    if material.flags.contains(MaterialFlags::UNLIT) {
        return AssembledFragment::Unlit(base_color);
    }

    let geometric_normal = prepare_world_normal(&geometry.world_normal, material.flags, geometry.is_front_face);
    let world_normal = shading_normal(geometry, normal_texel, material.flags, normal_source);

    AssembledFragment::Lit(ShadingInput {
        base_color,
        world_normal,
        geometric_normal,
        material: material.clone(),
        occlusion: 1.0,
        world_position: geometry.world_position,
        view: view.view_vector(&geometry.world_position),
        is_orthographic: view.is_orthographic(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::camera::Camera;
    use crate::render::material::{AlphaMode, CutoffDiscard};
    use approx::assert_relative_eq;

    fn perspective_view() -> ViewUniform {
        Camera::perspective(Vec3::new(0.0, 10.0, 0.0), 60.0, 1.0, 0.1, 1000.0)
            .look_at(Vec3::new(0.0, 0.0, -10.0), Vec3::y())
            .view_uniform()
    }

    #[test]
    fn test_normal_source_resolution() {
        let full = PipelineCapabilities::default();
        assert_eq!(NormalSource::resolve(&full, true), NormalSource::TangentSpace);
        assert_eq!(NormalSource::resolve(&full, false), NormalSource::Geometric);

        let no_tangents = PipelineCapabilities { vertex_tangents: false, ..full };
        assert_eq!(NormalSource::resolve(&no_tangents, true), NormalSource::Geometric);

        let prepass = PipelineCapabilities { prepass_normals: true, ..full };
        assert_eq!(NormalSource::resolve(&prepass, true), NormalSource::Prepass);
    }

    #[test]
    fn test_lit_input_copies_material_and_fixes_occlusion() {
        let material = MaterialParams::terrain_default();
        let geometry = FragmentGeometry::new(Vec3::new(3.0, 0.0, 4.0), Vec3::y());
        let assembled = assemble(
            Vec4::new(0.2, 0.4, 0.1, 1.0),
            &Vec3::new(0.9, 0.5, 0.8),
            &geometry,
            &material,
            NormalSource::Geometric,
            &perspective_view(),
            &CutoffDiscard,
        );

        let AssembledFragment::Lit(input) = assembled else {
            panic!("expected a lit fragment");
        };
        assert_eq!(input.material, material);
        assert_relative_eq!(input.occlusion, 1.0);
        assert_relative_eq!(input.world_normal, Vec3::y());
        assert_relative_eq!(input.view, Vec3::new(-3.0, 10.0, -4.0).normalize(), epsilon = 1e-6);
        assert!(!input.is_orthographic);
    }

    #[test]
    fn test_tangent_space_source_perturbs_normal() {
        let geometry = FragmentGeometry::new(Vec3::zeros(), Vec3::y()).with_tangent(Vec3::x(), 1.0);
        let texel = Vec3::new(1.0, 0.5, 1.0);

        let geometric = shading_normal(&geometry, &texel, MaterialFlags::empty(), NormalSource::Geometric);
        let mapped = shading_normal(&geometry, &texel, MaterialFlags::empty(), NormalSource::TangentSpace);

        assert_relative_eq!(geometric, Vec3::y());
        assert_relative_eq!(mapped, Vec3::new(1.0, 1.0, 0.0).normalize(), epsilon = 1e-6);
    }

    #[test]
    fn test_prepass_source_falls_back_without_data() {
        let geometry = FragmentGeometry::new(Vec3::zeros(), Vec3::y());
        let texel = Vec3::new(0.5, 0.5, 1.0);
        assert_relative_eq!(
            shading_normal(&geometry, &texel, MaterialFlags::empty(), NormalSource::Prepass),
            Vec3::y()
        );

        let geometry = geometry.with_prepass_normal(Vec3::new(0.0, 0.0, 2.0));
        assert_relative_eq!(
            shading_normal(&geometry, &texel, MaterialFlags::empty(), NormalSource::Prepass),
            Vec3::z()
        );
    }

    #[test]
    fn test_unlit_is_terminal() {
        let material = MaterialParams::default().with_flags(MaterialFlags::UNLIT);
        let geometry = FragmentGeometry::new(Vec3::zeros(), Vec3::y());
        let assembled = assemble(
            Vec4::new(1.0, 0.0, 0.0, 1.0),
            &Vec3::new(0.5, 0.5, 1.0),
            &geometry,
            &material,
            NormalSource::TangentSpace,
            &perspective_view(),
            &CutoffDiscard,
        );
        assert_eq!(assembled, AssembledFragment::Unlit(Vec4::new(1.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_masked_unlit_fragment_is_discarded() {
        let material = MaterialParams::default()
            .with_flags(MaterialFlags::UNLIT)
            .with_alpha(AlphaMode::Mask, 0.5);
        let geometry = FragmentGeometry::new(Vec3::zeros(), Vec3::y());
        let assembled = assemble(
            Vec4::new(1.0, 1.0, 1.0, 0.2),
            &Vec3::new(0.5, 0.5, 1.0),
            &geometry,
            &material,
            NormalSource::Geometric,
            &perspective_view(),
            &CutoffDiscard,
        );
        assert_eq!(assembled, AssembledFragment::Discarded);
    }

    #[test]
    fn test_orthographic_view_vector() {
        let view = Camera::orthographic(Vec3::new(0.0, 10.0, 10.0), 5.0, 1.0, 0.1, 100.0)
            .look_at(Vec3::zeros(), Vec3::y())
            .view_uniform();
        let geometry = FragmentGeometry::new(Vec3::new(5.0, 0.0, -5.0), Vec3::y());
        let AssembledFragment::Lit(input) = assemble(
            Vec4::new(1.0, 1.0, 1.0, 1.0),
            &Vec3::new(0.5, 0.5, 1.0),
            &geometry,
            &MaterialParams::default(),
            NormalSource::Geometric,
            &view,
            &CutoffDiscard,
        ) else {
            panic!("expected a lit fragment");
        };
        assert!(input.is_orthographic);
        assert_relative_eq!(input.view, Vec3::new(0.0, 1.0, 1.0).normalize(), epsilon = 1e-6);
    }

    fn lit_input(geometry: &FragmentGeometry, material: &MaterialParams, source: NormalSource) -> ShadingInput {
        let assembled = assemble(
            Vec4::new(0.5, 0.5, 0.5, 1.0),
            &Vec3::new(0.7, 0.6, 0.9),
            geometry,
            material,
            source,
            &perspective_view(),
            &CutoffDiscard,
        );
        match assembled {
            AssembledFragment::Lit(input) => input,
            other => panic!("expected a lit fragment, got {other:?}"),
        }
    }

    #[test]
    fn test_double_sided_back_face_negates_lit_normals() {
        let material = MaterialParams::terrain_default().with_flags(MaterialFlags::DOUBLE_SIDED);
        let front = FragmentGeometry::new(Vec3::new(1.0, 0.0, -2.0), Vec3::y()).with_tangent(Vec3::x(), 1.0);
        let back = front.with_front_face(false);

        for source in [NormalSource::Geometric, NormalSource::TangentSpace] {
            let front_input = lit_input(&front, &material, source);
            let back_input = lit_input(&back, &material, source);

            assert_relative_eq!(front_input.geometric_normal, Vec3::y());
            assert_relative_eq!(back_input.geometric_normal, -Vec3::y());
            assert_relative_eq!(back_input.world_normal, -front_input.world_normal, epsilon = 1e-6);
        }

        // Single-sided materials keep the front-face normal on back faces
        let single = MaterialParams::terrain_default();
        let back_input = lit_input(&back, &single, NormalSource::Geometric);
        assert_relative_eq!(back_input.world_normal, Vec3::y());
    }
}
