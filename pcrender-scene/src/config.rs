//! Scene configuration

use pcrender_algorithms::{ColorPolicy, Colormap, NormalizeOptions};
use pcrender_core::{Axis, CameraPose, Error, Result, Rgb};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Light transport algorithm used by the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IntegratorKind {
    #[default]
    Path,
    Direct,
}

impl IntegratorKind {
    /// Name used in the scene document
    pub fn name(self) -> &'static str {
        match self {
            IntegratorKind::Path => "path",
            IntegratorKind::Direct => "direct",
        }
    }
}

impl FromStr for IntegratorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "path" => Ok(IntegratorKind::Path),
            "direct" => Ok(IntegratorKind::Direct),
            other => Err(Error::Unsupported(format!("unknown integrator '{}'", other))),
        }
    }
}

impl fmt::Display for IntegratorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Fixed ground plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroundSettings {
    pub size: f32,
    pub height: f32,
}

impl Default for GroundSettings {
    fn default() -> Self {
        Self {
            size: 10.0,
            height: -0.5,
        }
    }
}

/// Ground plane placed just below the cloud
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachedGroundSettings {
    /// Base size; the emitted rectangle is five times larger
    pub size: f32,
    /// Offset below the lowest point (applied twice)
    pub offset: f32,
}

impl Default for AttachedGroundSettings {
    fn default() -> Self {
        Self {
            size: 15.0,
            offset: -0.05,
        }
    }
}

/// Rectangular area light above the scene
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AreaLightSettings {
    pub intensity: f32,
    pub size: f32,
    pub height: f32,
}

impl Default for AreaLightSettings {
    fn default() -> Self {
        Self {
            intensity: 3.0,
            size: 10.0,
            height: 20.0,
        }
    }
}

/// Color settings as written in configuration files.
///
/// Names stay open strings here; [`ColorSettings::resolve`] turns them into
/// a [`ColorPolicy`] and falls back (with a warning) on anything unknown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorSettings {
    /// `original`, `position`, `height` or `fixed`
    pub mode: String,
    /// Coordinate index used by `height` (0 = x, 1 = y, 2 = z)
    pub axis: usize,
    /// Colormap used by `height`
    pub colormap: String,
    /// sRGB color used by `fixed`
    pub fixed_color: Rgb,
}

impl Default for ColorSettings {
    fn default() -> Self {
        Self {
            mode: "original".to_string(),
            axis: 2,
            colormap: Colormap::Viridis.name().to_string(),
            fixed_color: [0.7, 0.7, 0.7],
        }
    }
}

impl ColorSettings {
    /// Resolve the open names into a color policy
    pub fn resolve(&self) -> ColorPolicy {
        match self.mode.trim().to_ascii_lowercase().as_str() {
            "original" => ColorPolicy::Original,
            "position" => ColorPolicy::Position,
            "fixed" => ColorPolicy::Fixed(self.fixed_color),
            "height" => {
                let axis = Axis::from_index(self.axis).unwrap_or_else(|| {
                    tracing::warn!("color axis {} is not 0, 1 or 2, using z", self.axis);
                    Axis::Z
                });
                let colormap = self.colormap.parse::<Colormap>().unwrap_or_else(|err| {
                    tracing::warn!("{}, using viridis", err);
                    Colormap::Viridis
                });
                ColorPolicy::Height { axis, colormap }
            }
            other => {
                tracing::warn!("unknown color mode '{}', using position colors", other);
                ColorPolicy::Position
            }
        }
    }
}

/// Everything needed to synthesize a scene besides the points themselves
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub integrator: IntegratorKind,
    pub samples_per_pixel: u32,
    /// Path depth limit; values below 1 mean unlimited and are not written
    pub max_depth: i32,
    pub film_width: u32,
    pub film_height: u32,
    /// Field of view in degrees
    pub fov: f32,
    /// Renderer-space camera; `None` uses [`CameraPose::default`]
    pub camera: Option<CameraPose>,
    pub point_radius: f32,
    pub include_ground: bool,
    pub ground: GroundSettings,
    pub attach_ground: bool,
    pub attached_ground: AttachedGroundSettings,
    pub include_area_light: bool,
    pub area_light: AreaLightSettings,
    /// Radiance of the single background emitter
    pub background_color: Rgb,
    /// Accepted for compatibility; the background color is the only
    /// environment light and this value does not change the document
    pub env_light_intensity: f32,
    pub color: ColorSettings,
    /// Number of points to keep; `None` keeps all of them
    pub sample_count: Option<usize>,
    /// Seed for point subsampling
    pub seed: Option<u64>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            integrator: IntegratorKind::Path,
            samples_per_pixel: 256,
            max_depth: -1,
            film_width: 3840,
            film_height: 2160,
            fov: 91.49,
            camera: None,
            point_radius: 0.006,
            include_ground: true,
            ground: GroundSettings::default(),
            attach_ground: false,
            attached_ground: AttachedGroundSettings::default(),
            include_area_light: true,
            area_light: AreaLightSettings::default(),
            background_color: [1.0, 1.0, 1.0],
            env_light_intensity: 1.0,
            color: ColorSettings::default(),
            sample_count: None,
            seed: Some(42),
        }
    }
}

impl SceneConfig {
    /// Parse a JSON configuration; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Parse(format!("invalid scene configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to pretty-printed JSON
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::Parse(format!("cannot serialize scene configuration: {}", e)))
    }

    /// The camera the sensor will use
    pub fn camera_or_default(&self) -> CameraPose {
        self.camera.unwrap_or_default()
    }

    /// Normalization options derived from `sample_count` and `seed`
    pub fn normalize_options(&self) -> NormalizeOptions {
        NormalizeOptions {
            sample_count: self.sample_count,
            seed: self.seed,
        }
    }

    /// Check numeric settings and the camera pose
    pub fn validate(&self) -> Result<()> {
        if self.samples_per_pixel == 0 {
            return Err(Error::Configuration("samples_per_pixel must be at least 1".to_string()));
        }
        if self.film_width == 0 || self.film_height == 0 {
            return Err(Error::Configuration(format!(
                "film size {}x{} is empty",
                self.film_width, self.film_height
            )));
        }
        if !(self.fov > 0.0 && self.fov < 180.0) {
            return Err(Error::Configuration(format!(
                "field of view {} is outside (0, 180)",
                self.fov
            )));
        }
        if !self.point_radius.is_finite() || self.point_radius <= 0.0 {
            return Err(Error::Configuration(format!(
                "point radius {} must be positive",
                self.point_radius
            )));
        }
        if let Some(camera) = &self.camera {
            camera.validate()?;
        }
        Ok(())
    }
}
