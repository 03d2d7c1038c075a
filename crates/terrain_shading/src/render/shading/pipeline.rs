//! # Terrain Shading Pipeline
//!
//! One parameterized pipeline covers every terrain shading variant: blend
//! only, fogged, normal-mapped and deferred. The variant is picked once from
//! [`PipelineCapabilities`](crate::core::config::PipelineCapabilities) in
//! [`TerrainPipeline::new`]; [`TerrainPipeline::shade`] then runs per fragment
//! with no further capability checks.
//!
//! ## Per-fragment flow
//!
//! ```text
//! FragmentGeometry ─► blend layers ─► assemble input ─┬─► unlit color
//!                                                     ├─► deferred input
//!                                                     └─► evaluate ─► composite ─► color
//! ```
//!
//! Per-frame state (camera, fog) and the external services arrive through a
//! read-only [`ShadingContext`], so one pipeline can be shared across threads.

use thiserror::Error;

use crate::config::ConfigError;
use crate::core::config::{LayerSlot, TerrainShadingConfig};
use crate::foundation::math::Vec4;
use crate::render::camera::ViewUniform;
use crate::render::lighting::LightingEvaluator;
use crate::render::material::{AlphaDiscard, CutoffDiscard};
use crate::render::shading::blend::{blend_samples, select_blend, BlendWeights, SurfaceSample, TerrainLayers};
use crate::render::shading::fragment::FragmentGeometry;
use crate::render::shading::input::{assemble, AssembledFragment, NormalSource, ShadingInput};
use crate::render::shading::post::{composite, FogParams, PostSteps};
use crate::render::tonemap::ToneMapper;

/// Errors raised while building a pipeline
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Configuration failed validation
    #[error("Invalid terrain shading configuration: {0}")]
    Config(#[from] ConfigError),

    /// Two capabilities that cannot be enabled together
    #[error("Incompatible pipeline capabilities: {0}")]
    IncompatibleCapabilities(&'static str),
}

/// Where lit fragments go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShadingPath {
    /// Evaluate lighting and composite to a final color
    Forward,
    /// Emit the assembled lighting input for a later deferred pass
    Deferred,
}

/// Read-only per-frame state and external services
#[derive(Clone, Copy)]
pub struct ShadingContext<'a> {
    /// Camera uniform
    pub view: &'a ViewUniform,
    /// Fog uniform
    pub fog: &'a FogParams,
    /// Lighting evaluator
    pub lighting: &'a dyn LightingEvaluator,
    /// Tone mapper for non-HDR targets
    pub tone_mapper: &'a dyn ToneMapper,
    /// Alpha discard
    pub alpha_discard: &'a dyn AlphaDiscard,
}

impl<'a> ShadingContext<'a> {
    /// Context using the camera's tone mapping curve and cutoff alpha discard
    pub fn new(view: &'a ViewUniform, fog: &'a FogParams, lighting: &'a dyn LightingEvaluator) -> Self {
        Self {
            view,
            fog,
            lighting,
            tone_mapper: &view.tonemapping,
            alpha_discard: &CutoffDiscard,
        }
    }

    /// Replace the tone mapper
    pub fn with_tone_mapper(mut self, tone_mapper: &'a dyn ToneMapper) -> Self {
        self.tone_mapper = tone_mapper;
        self
    }

    /// Replace the alpha discard
    pub fn with_alpha_discard(mut self, alpha_discard: &'a dyn AlphaDiscard) -> Self {
        self.alpha_discard = alpha_discard;
        self
    }
}

impl std::fmt::Debug for ShadingContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShadingContext")
            .field("view", self.view)
            .field("fog", self.fog)
            .finish_non_exhaustive()
    }
}

/// Result of shading one fragment
#[derive(Debug, Clone, PartialEq)]
pub enum FragmentOutput {
    /// Final color
    Color(Vec4),
    /// Fragment removed by alpha discard
    Discarded,
    /// Lighting input for a deferred pass
    Deferred(ShadingInput),
}

impl FragmentOutput {
    /// The final color, if this output carries one
    pub fn color(&self) -> Option<Vec4> {
        match self {
            Self::Color(color) => Some(*color),
            Self::Discarded | Self::Deferred(_) => None,
        }
    }
}

/// Terrain shading pipeline with its variant resolved
#[derive(Debug)]
pub struct TerrainPipeline<'a> {
    config: TerrainShadingConfig,
    layers: TerrainLayers<'a>,
    path: ShadingPath,
    normal_source: NormalSource,
    post: PostSteps,
}

impl<'a> TerrainPipeline<'a> {
    /// Validate `config` and resolve the shading variant for `layers`
    pub fn new(config: TerrainShadingConfig, layers: TerrainLayers<'a>) -> Result<Self, PipelineError> {
        config.validate()?;

        let capabilities = config.capabilities;
        if capabilities.prepass_pipeline && capabilities.prepass_normals {
            return Err(PipelineError::IncompatibleCapabilities(
                "a prepass pipeline cannot load normals from its own prepass",
            ));
        }

        let normal_source = NormalSource::resolve(&capabilities, layers.has_normal_maps());
        if capabilities.can_reconstruct_normals() && normal_source == NormalSource::Geometric {
            log::warn!("Normal mapping enabled but no layer has a normal map bound, using geometric normals");
        }

        let path = if capabilities.prepass_pipeline {
            ShadingPath::Deferred
        } else {
            ShadingPath::Forward
        };
        let post = PostSteps::resolve(&capabilities, &config.post);

        log::info!(
            "Built terrain pipeline: path {:?}, normals {:?}, layers '{}' x{} / '{}' x{}",
            path,
            normal_source,
            config.layers.grass.name,
            config.layers.grass.scale,
            config.layers.rock.name,
            config.layers.rock.scale
        );
        log::debug!("Terrain pipeline capabilities: {:?}, post steps: {:?}", capabilities, post);

        Ok(Self { config, layers, path, normal_source, post })
    }

    /// Configuration the pipeline was built from
    pub fn config(&self) -> &TerrainShadingConfig {
        &self.config
    }

    /// Resolved shading path
    pub fn path(&self) -> ShadingPath {
        self.path
    }

    /// Resolved normal source
    pub fn normal_source(&self) -> NormalSource {
        self.normal_source
    }

    /// Resolved post-lighting steps
    pub fn post_steps(&self) -> PostSteps {
        self.post
    }

    /// Sample both layers and mix them for a fragment `distance` away from the camera
    pub fn blend(&self, geometry: &FragmentGeometry, distance: f32) -> (BlendWeights, SurfaceSample) {
        let blend = &self.config.blend;
        let weights = select_blend(geometry.world_normal.y, distance, blend);

        let sample = |slot| {
            let scale = self.config.layers.get(slot).scale;
            self.layers.get(slot).sample(&geometry.world_position, scale, blend.mip_bias)
        };
        let (grass, rock) = (sample(LayerSlot::Grass), sample(LayerSlot::Rock));

        (weights, blend_samples(&grass, &rock, &weights, blend))
    }

    /// Shade one fragment
    pub fn shade(&self, ctx: &ShadingContext<'_>, geometry: &FragmentGeometry) -> FragmentOutput {
        let distance = ctx.view.distance_to(&geometry.world_position);
        let (weights, surface) = self.blend(geometry, distance);
        let material = self.layers.resolve_material(&weights, self.config.blend.material_source);

        let assembled = assemble(
            surface.base_color,
            &surface.tangent_space_normal,
            geometry,
            &material,
            self.normal_source,
            ctx.view,
            ctx.alpha_discard,
        );

        match assembled {
            AssembledFragment::Discarded => FragmentOutput::Discarded,
            AssembledFragment::Unlit(color) => FragmentOutput::Color(color),
            AssembledFragment::Lit(input) => match self.path {
                ShadingPath::Deferred => FragmentOutput::Deferred(input),
                ShadingPath::Forward => {
                    let lit = ctx.lighting.evaluate(&input);
                    FragmentOutput::Color(composite(
                        lit,
                        geometry,
                        &input.material,
                        ctx.fog,
                        ctx.view,
                        &self.post,
                        ctx.tone_mapper,
                    ))
                }
            },
        }
    }
}
