//! Terrain shading demo
//!
//! Ray-casts a procedural heightfield and shades every hit with the terrain
//! pipeline, then writes the frame to a PNG.
//!
//! ```text
//! terrain_demo [CONFIG.toml|CONFIG.ron] [--out FRAME.png] [--write-config PATH]
//! ```

mod terrain;

use std::path::PathBuf;

use clap::Parser;
use terrain_shading::config::{Config, ConfigError};
use terrain_shading::core::config::TerrainShadingConfig;
use terrain_shading::foundation::logging;
use terrain_shading::foundation::math::{Vec3, Vec4};
use terrain_shading::render::camera::{Camera, Projection, ViewUniform};
use terrain_shading::render::lighting::{LambertEvaluator, Light, LightingEnvironment};
use terrain_shading::render::material::MaterialParams;
use terrain_shading::render::shading::{
    FogParams, FragmentGeometry, FragmentOutput, PipelineError, ShadingContext, TerrainLayer, TerrainLayers,
    TerrainPipeline,
};
use terrain_shading::render::texture::TextureError;
use terrain_shading::render::tonemap::ColorGrading;
use thiserror::Error;

use terrain::{noise_albedo, noise_normal_map, Heightfield};

const WIDTH: u32 = 480;
const HEIGHT: u32 = 270;
const MAX_RAY_DISTANCE: f32 = 3000.0;

/// Errors that stop the demo
#[derive(Debug, Error)]
enum DemoError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    #[error("Texture error: {0}")]
    Texture(#[from] TextureError),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
}

/// Render a shaded terrain frame to a PNG
#[derive(Debug, Parser)]
#[command(name = "terrain_demo")]
#[command(about = "Ray-cast a procedural terrain and shade it with the terrain pipeline")]
struct Cli {
    /// Shading config to load (.toml or .ron); defaults are used when omitted
    config: Option<PathBuf>,

    /// Output PNG path
    #[arg(long, default_value = "terrain.png")]
    out: PathBuf,

    /// Also write the effective config to this path
    #[arg(long, value_name = "PATH")]
    write_config: Option<PathBuf>,
}

/// Linear to display-referred 8-bit
fn encode_srgb8(value: f32) -> u8 {
    let encoded = value.clamp(0.0, 1.0).powf(1.0 / 2.2);
    (encoded * 255.0).round() as u8
}

fn to_rgba8(color: &Vec4) -> image::Rgba<u8> {
    image::Rgba([
        encode_srgb8(color.x),
        encode_srgb8(color.y),
        encode_srgb8(color.z),
        (color.w.clamp(0.0, 1.0) * 255.0).round() as u8,
    ])
}

/// Unit ray through the center of pixel `(px, py)`
fn primary_ray(camera: &Camera, view: &ViewUniform, px: u32, py: u32) -> Vec3 {
    let m = &view.world_from_view;
    let right = Vec3::new(m[(0, 0)], m[(1, 0)], m[(2, 0)]);
    let up = Vec3::new(m[(0, 1)], m[(1, 1)], m[(2, 1)]);
    let forward = -view.backward();

    let tan_half = match camera.projection {
        Projection::Perspective { fov } => (fov * 0.5).tan(),
        Projection::Orthographic { .. } => 0.0,
    };
    let ndc_x = (2.0 * (px as f32 + 0.5) / WIDTH as f32 - 1.0) * camera.aspect * tan_half;
    let ndc_y = (1.0 - 2.0 * (py as f32 + 0.5) / HEIGHT as f32) * tan_half;

    (forward + right * ndc_x + up * ndc_y).normalize()
}

fn run(cli: &Cli) -> Result<(), DemoError> {
    let config = match &cli.config {
        Some(path) => {
            log::info!("Loading terrain shading config from {}", path.display());
            TerrainShadingConfig::load_from_file(path)?
        }
        None => TerrainShadingConfig::default(),
    };

    if let Some(path) = &cli.write_config {
        config.save_to_file(path)?;
        log::info!("Wrote configuration to {}", path.display());
    }

    let grass_albedo = noise_albedo(64, 11, Vec3::new(0.18, 0.42, 0.09), 0.25)?;
    let grass_normals = noise_normal_map(64, 12, 1.5)?;
    let rock_albedo = noise_albedo(64, 21, Vec3::new(0.36, 0.33, 0.30), 0.35)?;
    let rock_normals = noise_normal_map(64, 22, 4.0)?;

    let grass_material = MaterialParams::terrain_default();
    let rock_material = MaterialParams::terrain_default().with_roughness(0.8);

    let layers = TerrainLayers {
        grass: TerrainLayer::new(&grass_albedo, &grass_material).with_normal_map(&grass_normals),
        rock: TerrainLayer::new(&rock_albedo, &rock_material).with_normal_map(&rock_normals),
    };
    let pipeline = TerrainPipeline::new(config, layers)?;

    let camera = Camera::perspective(Vec3::new(0.0, 60.0, 160.0), 55.0, WIDTH as f32 / HEIGHT as f32, 0.1, 5000.0)
        .look_at(Vec3::new(20.0, 0.0, -60.0), Vec3::y())
        .with_color_grading(ColorGrading { exposure: 0.3, ..ColorGrading::default() });
    let view = camera.view_uniform();

    let fog = FogParams::exponential(Vec4::new(0.62, 0.72, 0.85, 1.0), 0.0025);
    let lighting = LambertEvaluator::new(
        LightingEnvironment::daylight().with_light(Light::point(
            Vec3::new(45.0, 50.0, 20.0),
            Vec3::new(1.0, 0.6, 0.3),
            3.0,
            80.0,
        )),
    );
    let ctx = ShadingContext::new(&view, &fog, &lighting);
    let heightfield = Heightfield::default();

    log::info!("Rendering {}x{} terrain frame", WIDTH, HEIGHT);
    let mut frame = image::RgbaImage::new(WIDTH, HEIGHT);
    let (mut hits, mut discarded, mut deferred) = (0_usize, 0_usize, 0_usize);

    for py in 0..HEIGHT {
        for px in 0..WIDTH {
            let direction = primary_ray(&camera, &view, px, py);
            let color = match heightfield.intersect(&camera.position, &direction, MAX_RAY_DISTANCE) {
                Some(hit) => {
                    hits += 1;
                    let geometry = FragmentGeometry::new(hit, heightfield.normal(hit.x, hit.z))
                        .with_tangent(heightfield.tangent(hit.x, hit.z), 1.0)
                        .with_screen_position(px as f32 + 0.5, py as f32 + 0.5);

                    match pipeline.shade(&ctx, &geometry) {
                        FragmentOutput::Color(color) => color,
                        FragmentOutput::Discarded => {
                            discarded += 1;
                            fog.color
                        }
                        FragmentOutput::Deferred(input) => {
                            // No lighting pass here; show the shading normal instead
                            deferred += 1;
                            let n = input.world_normal * 0.5 + Vec3::repeat(0.5);
                            Vec4::new(n.x, n.y, n.z, 1.0)
                        }
                    }
                }
                None => fog.color,
            };
            frame.put_pixel(px, py, to_rgba8(&color));
        }
    }

    log::debug!("{} terrain hits, {} discarded, {} deferred", hits, discarded, deferred);

    frame.save(&cli.out)?;
    log::info!("Saved frame to {}", cli.out.display());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init();
    log::info!("Starting terrain shading demo");

    run(&cli)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_arguments() {
        let cli = Cli::try_parse_from(["terrain_demo", "terrain.ron", "--out", "frame.png"]).unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("terrain.ron")));
        assert_eq!(cli.out, PathBuf::from("frame.png"));
        assert!(cli.write_config.is_none());

        let cli = Cli::try_parse_from(["terrain_demo", "--write-config", "out.toml"]).unwrap();
        assert!(cli.config.is_none());
        assert_eq!(cli.out, PathBuf::from("terrain.png"));
        assert_eq!(cli.write_config, Some(PathBuf::from("out.toml")));

        assert!(Cli::try_parse_from(["terrain_demo", "--out"]).is_err());
        assert!(Cli::try_parse_from(["terrain_demo", "--fast"]).is_err());
    }

    #[test]
    fn test_bundled_config_parses() {
        let config = TerrainShadingConfig::from_str_with_format(include_str!("../terrain.ron"), "terrain.ron").unwrap();
        assert!(config.validate().is_ok());
        assert!(config.blend.blend_normals);
        assert!(config.capabilities.deband_dither);
        assert_eq!(config.blend.fallback_color, TerrainShadingConfig::default().blend.fallback_color);
    }

    #[test]
    fn test_srgb_encoding_endpoints() {
        assert_eq!(encode_srgb8(0.0), 0);
        assert_eq!(encode_srgb8(1.0), 255);
        assert_eq!(encode_srgb8(4.0), 255);
        assert_eq!(encode_srgb8(-1.0), 0);
    }

    #[test]
    fn test_center_ray_matches_view_axis() {
        let camera = Camera::perspective(Vec3::new(0.0, 10.0, 10.0), 60.0, 1.0, 0.1, 100.0)
            .look_at(Vec3::zeros(), Vec3::y());
        let view = camera.view_uniform();
        let forward = -view.backward();

        let ray = primary_ray(&camera, &view, WIDTH / 2, HEIGHT / 2);
        assert!(ray.dot(&forward) > 0.99);
    }
}
