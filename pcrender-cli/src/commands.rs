//! Subcommand implementations

use crate::cli::{RenderArgs, SceneArgs, TurntableArgs};
use anyhow::{Context, Result};
use pcrender_algorithms::{orbit_params_from_pose, OrbitAxis, OrbitParams, OrbitSpec};
use pcrender_core::CameraPose;
use pcrender_io::{load_scene_config, read_point_set, write_frames, write_point_set, write_scene, RendererConfig, RendererInvoker};
use pcrender_scene::{orbit_documents, prepare_cloud, PrepareOptions, SceneConfig};
use std::path::PathBuf;

/// Load the configuration file (if any) and apply flag overrides
pub fn scene_config(args: &SceneArgs) -> Result<SceneConfig> {
    let mut config = match &args.config {
        Some(path) => load_scene_config(path)
            .with_context(|| format!("failed to load scene configuration {}", path.display()))?,
        None => SceneConfig::default(),
    };

    if let Some(integrator) = args.integrator {
        config.integrator = integrator;
    }
    if let Some(spp) = args.spp {
        config.samples_per_pixel = spp;
    }
    if let Some(width) = args.width {
        config.film_width = width;
    }
    if let Some(height) = args.height {
        config.film_height = height;
    }
    if let Some(fov) = args.fov {
        config.fov = fov;
    }
    if let Some(radius) = args.point_radius {
        config.point_radius = radius;
    }
    if let Some(mode) = &args.color_mode {
        config.color.mode = mode.clone();
    }
    if let Some(colormap) = &args.colormap {
        config.color.colormap = colormap.clone();
    }
    if let Some(axis) = args.color_axis {
        config.color.axis = axis;
    }
    if args.sample_count.is_some() {
        config.sample_count = args.sample_count;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.no_ground {
        config.include_ground = false;
    }
    if args.attach_ground {
        config.attach_ground = true;
    }
    if args.no_area_light {
        config.include_area_light = false;
    }

    config.validate().context("invalid scene settings")?;
    Ok(config)
}

/// The camera given on the command line, or else the configured one,
/// converted from viewer convention when asked
fn resolve_camera(params: Option<&str>, viewer_camera: bool, config: &SceneConfig) -> Result<Option<CameraPose>> {
    let camera = match params {
        Some(params) => Some(
            params
                .parse::<CameraPose>()
                .with_context(|| format!("invalid --camera-params '{}'", params))?,
        ),
        None => config.camera,
    };

    Ok(match camera {
        Some(camera) if viewer_camera => Some(camera.to_render_convention()),
        Some(camera) => Some(camera),
        None => {
            if viewer_camera {
                tracing::warn!("--viewer-camera given without a camera, using the default view");
            }
            None
        }
    })
}

fn renderer(args: &SceneArgs) -> Option<RendererInvoker> {
    if !args.render {
        return None;
    }
    args.renderer
        .as_ref()
        .map(|exe| RendererInvoker::new(RendererConfig::new(exe).with_variant(args.variant.clone())))
}

/// Build a single scene; returns the written scene path
pub fn run_render(args: &RenderArgs) -> Result<PathBuf> {
    let mut config = scene_config(&args.scene)?;
    config.camera = resolve_camera(args.camera_params.as_deref(), args.viewer_camera, &config)?;

    let cloud = read_point_set(&args.scene.input)
        .with_context(|| format!("failed to read {}", args.scene.input.display()))?;
    let prepared = prepare_cloud(&cloud, &PrepareOptions::from_config(&config))?;

    if let Some(path) = &args.export_ply {
        let exported = pcrender_core::PointSet {
            points: prepared.points.clone(),
            colors: prepared.colors.clone(),
        };
        write_point_set(&exported, path).with_context(|| format!("failed to export {}", path.display()))?;
        tracing::info!("exported prepared points to {}", path.display());
    }

    let document = prepared.build(&config)?;
    write_scene(&document, &args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    tracing::info!("wrote scene {}", args.output.display());

    if let Some(invoker) = renderer(&args.scene) {
        let image = invoker.render(&args.output, &args.output.with_extension("exr"))?;
        tracing::info!("rendered {}", image.display());
    }

    Ok(args.output.clone())
}

/// Orbit description from the turntable flags
fn orbit_spec(args: &TurntableArgs, camera: Option<CameraPose>) -> Result<OrbitSpec> {
    let axis = OrbitAxis::from(args.axis);
    let spec = match (axis.world_axis(), camera) {
        (None, reference) => OrbitSpec {
            axis,
            direction: args.direction(),
            frame_count: args.frames,
            reference,
            ..OrbitSpec::default()
        },
        (Some(world), Some(camera)) if args.camera_params.is_some() => {
            let params = orbit_params_from_pose(&camera.origin, &camera.target, world)?;
            tracing::info!(
                "orbit seeded from camera: distance {:.4}, elevation {:.2}, start angle {:.2}",
                params.distance,
                params.elevation_deg,
                params.start_angle_deg
            );
            OrbitSpec::world(world, params, args.direction(), args.frames)
        }
        (Some(world), _) => OrbitSpec::world(
            world,
            OrbitParams {
                distance: args.distance,
                elevation_deg: args.elevation,
                start_angle_deg: args.start_angle,
            },
            args.direction(),
            args.frames,
        ),
    };
    Ok(spec)
}

fn image_jobs(scenes: &[PathBuf]) -> Vec<(PathBuf, PathBuf)> {
    scenes
        .iter()
        .map(|scene| (scene.clone(), scene.with_extension("exr")))
        .collect()
}

/// Build one scene per orbit frame; returns the written scene paths
pub fn run_turntable(args: &TurntableArgs) -> Result<Vec<PathBuf>> {
    let config = scene_config(&args.scene)?;
    let camera = resolve_camera(args.camera_params.as_deref(), args.viewer_camera, &config)?;
    let spec = orbit_spec(args, camera)?;

    let cloud = read_point_set(&args.scene.input)
        .with_context(|| format!("failed to read {}", args.scene.input.display()))?;
    let prepared = prepare_cloud(&cloud, &PrepareOptions::from_config(&config))?;

    let documents = orbit_documents(&prepared, &config, &spec).context("failed to build orbit frames")?;
    let scenes = write_frames(&documents, &args.out_dir)
        .with_context(|| format!("failed to write frames to {}", args.out_dir.display()))?;

    if let Some(invoker) = renderer(&args.scene) {
        let images = invoker.render_all(&image_jobs(&scenes))?;
        tracing::info!("rendered {} frames", images.len());
    }

    Ok(scenes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use std::fs;
    use std::path::Path;

    fn write_cloud(dir: &Path) -> PathBuf {
        let path = dir.join("cloud.xyz");
        fs::write(
            &path,
            "0 0 0 255 0 0\n1 0 0 0 255 0\n0 2 0 0 0 255\n0 0 1 255 255 255\n",
        )
        .unwrap();
        path
    }

    fn frame_paths(dir: &Path, count: usize) -> Vec<PathBuf> {
        (0..count)
            .map(|i| dir.join(pcrender_io::frame_file_name("frame", i, "xml")))
            .collect()
    }

    fn parse(args: &[&str]) -> Command {
        Cli::try_parse_from(std::iter::once("pcrender").chain(args.iter().copied()))
            .unwrap()
            .command
    }

    #[test]
    fn test_render_writes_scene_and_export() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_cloud(dir.path());
        let output = dir.path().join("out").join("scene.xml");
        let export = dir.path().join("prepared.ply");

        let Command::Render(args) = parse(&[
            "render",
            input.to_str().unwrap(),
            "-o",
            output.to_str().unwrap(),
            "--export-ply",
            export.to_str().unwrap(),
            "--camera-params",
            "0,0,3 0,0,0 0,1,0",
            "--viewer-camera",
        ]) else {
            panic!("expected render");
        };

        let written = run_render(&args).unwrap();
        assert_eq!(written, output);

        let xml = fs::read_to_string(&output).unwrap();
        assert_eq!(xml.matches("type=\"sphere\"").count(), 4);
        assert!(xml.contains("origin=\"-3.0,0.0,0.0\""));
        assert!(xml.contains("up=\"0.0,-0.0,-1.0\""));

        let exported = read_point_set(&export).unwrap();
        assert_eq!(exported.len(), 4);
    }

    #[test]
    fn test_render_rejects_bad_camera() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_cloud(dir.path());
        let Command::Render(args) = parse(&["render", input.to_str().unwrap(), "--camera-params", "1 2 3"]) else {
            panic!("expected render");
        };
        assert!(run_render(&args).is_err());
    }

    #[test]
    fn test_config_file_and_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("scene.json");
        fs::write(&config_path, r#"{ "samples_per_pixel": 32, "fov": 60.0 }"#).unwrap();

        let Command::Render(args) = parse(&[
            "render",
            "cloud.ply",
            "--config",
            config_path.to_str().unwrap(),
            "--spp",
            "8",
            "--no-ground",
        ]) else {
            panic!("expected render");
        };
        let config = scene_config(&args.scene).unwrap();
        assert_eq!(config.samples_per_pixel, 8);
        assert_eq!(config.fov, 60.0);
        assert!(!config.include_ground);
    }

    #[test]
    fn test_turntable_writes_every_frame() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_cloud(dir.path());
        let out_dir = dir.path().join("frames");

        let Command::Turntable(args) = parse(&[
            "turntable",
            input.to_str().unwrap(),
            "--frames",
            "4",
            "--elevation",
            "0",
            "--out-dir",
            out_dir.to_str().unwrap(),
        ]) else {
            panic!("expected turntable");
        };

        let scenes = run_turntable(&args).unwrap();
        assert_eq!(scenes, frame_paths(&out_dir, 4));
        let first = fs::read_to_string(&scenes[0]).unwrap();
        assert!(first.contains("origin=\"2.0,0.0,0.0\""));
    }

    #[test]
    fn test_initial_up_turntable_needs_camera() {
        let dir = tempfile::tempdir().unwrap();
        let input = write_cloud(dir.path());
        let Command::Turntable(args) = parse(&[
            "turntable",
            input.to_str().unwrap(),
            "--axis",
            "initial-up",
            "--out-dir",
            dir.path().join("frames").to_str().unwrap(),
        ]) else {
            panic!("expected turntable");
        };
        assert!(run_turntable(&args).is_err());
    }

    #[test]
    fn test_orbit_seeded_from_camera() {
        let Command::Turntable(args) = parse(&[
            "turntable",
            "cloud.xyz",
            "--camera-params",
            "0,-4,0 0,0,0 0,0,1",
            "--frames",
            "8",
        ]) else {
            panic!("expected turntable");
        };
        let camera = resolve_camera(args.camera_params.as_deref(), false, &SceneConfig::default()).unwrap();
        let spec = orbit_spec(&args, camera).unwrap();

        assert!((spec.distance - 4.0).abs() < 1e-5);
        assert!(spec.elevation_deg.abs() < 1e-5);
        let first = spec.generate().unwrap()[0];
        assert!((first.origin - camera.unwrap().origin).norm() < 1e-4);
    }
}
