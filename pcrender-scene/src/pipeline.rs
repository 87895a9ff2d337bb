//! From a loaded point set to per-frame scene documents

use crate::builder::build_scene;
use crate::config::SceneConfig;
use crate::document::SceneDocument;
use pcrender_algorithms::{
    assign_colors, normalize_bbox, srgb_to_linear_rgb, ColorPolicy, ColorSource, NormalizationResult, NormalizeOptions,
    OrbitSpec,
};
use pcrender_core::{remap_points, CameraPose, Point3f, PointSet, Result, Rgb};

/// How a point set is turned into render-ready data
#[derive(Debug, Clone, Default)]
pub struct PrepareOptions {
    pub normalize: NormalizeOptions,
    pub color: ColorPolicy,
}

impl PrepareOptions {
    /// Options taken from a scene configuration
    pub fn from_config(config: &SceneConfig) -> Self {
        Self {
            normalize: config.normalize_options(),
            color: config.color.resolve(),
        }
    }
}

/// A normalized, remapped and colored point set
#[derive(Debug, Clone)]
pub struct PreparedCloud {
    /// Renderer-space positions
    pub points: Vec<Point3f>,
    /// Linear RGB per point; `None` when a custom color function failed
    pub colors: Option<Vec<Rgb>>,
    pub normalization: NormalizationResult,
}

impl PreparedCloud {
    /// Build a scene document for this cloud
    pub fn build(&self, config: &SceneConfig) -> Result<SceneDocument> {
        build_scene(config, &self.points, self.colors.as_deref())
    }

    /// Build a document with `camera` replacing the configured camera
    pub fn build_with_camera(&self, config: &SceneConfig, camera: &CameraPose) -> Result<SceneDocument> {
        let config = SceneConfig {
            camera: Some(*camera),
            ..config.clone()
        };
        self.build(&config)
    }
}

/// Normalize, remap and color a point set.
///
/// Colors are computed from the normalized positions before the renderer
/// axis remap, so height and position colormaps refer to the input's axes.
/// A fixed color is taken as sRGB and linearized for the renderer.
pub fn prepare_cloud(cloud: &PointSet, options: &PrepareOptions) -> Result<PreparedCloud> {
    let normalization = normalize_bbox(&cloud.points, &options.normalize)?;
    tracing::debug!(
        "normalized {} points: center {:?}, scale {}",
        normalization.points.len(),
        normalization.center,
        normalization.scale
    );

    let source = ColorSource {
        colors: cloud.colors.as_deref(),
        indices: normalization.indices.as_deref(),
        input_len: cloud.len(),
    };
    let mut colors = assign_colors(&normalization.points, &source, &options.color);
    if let (ColorPolicy::Fixed(_), Some(colors)) = (&options.color, colors.as_mut()) {
        for c in colors.iter_mut() {
            *c = srgb_to_linear_rgb(*c);
        }
    }
    let points = remap_points(&normalization.points);

    tracing::info!("prepared {} of {} points", points.len(), cloud.len());
    Ok(PreparedCloud {
        points,
        colors,
        normalization,
    })
}

/// Prepare a point set and build its scene document in one step
pub fn render_document(cloud: &PointSet, config: &SceneConfig) -> Result<SceneDocument> {
    let prepared = prepare_cloud(cloud, &PrepareOptions::from_config(config))?;
    prepared.build(config)
}

/// One scene document per orbit frame.
///
/// The attached ground plane depends on the camera, so with it enabled
/// every frame is rebuilt; otherwise the first frame is built once and the
/// rest are camera patches of it.
pub fn orbit_documents(prepared: &PreparedCloud, config: &SceneConfig, orbit: &OrbitSpec) -> Result<Vec<SceneDocument>> {
    let poses = orbit.generate()?;
    tracing::info!("generating {} orbit frames about {}", poses.len(), orbit.axis);

    if config.attach_ground {
        return poses
            .iter()
            .map(|pose| prepared.build_with_camera(config, pose))
            .collect();
    }

    let Some(first) = poses.first() else {
        return Ok(Vec::new());
    };
    let base = prepared.build_with_camera(config, first)?;
    Ok(poses.iter().map(|pose| base.with_camera(pose)).collect())
}
