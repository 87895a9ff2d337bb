//! Per-point color assignment
//!
//! All policies produce linear-light RGB in [0, 1], one triple per point.
//! Source colors (from the input file or a fixed color setting) are treated
//! as sRGB and converted before use.

use pcrender_core::{clamp_rgb, Axis, Error, Point3f, Result, Rgb};
use rayon::prelude::*;
use std::f32::consts::PI;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Lower bound applied to position colors before normalization, so no
/// channel ends up fully black
const POSITION_COLOR_FLOOR: f32 = 0.001;

/// Convert one sRGB-encoded channel to linear light
pub fn srgb_to_linear(c: f32) -> f32 {
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Convert one linear channel to sRGB encoding
pub fn linear_to_srgb(c: f32) -> f32 {
    if c <= 0.0031308 {
        c * 12.92
    } else {
        1.055 * c.powf(1.0 / 2.4) - 0.055
    }
}

/// Convert an sRGB triple to linear light
pub fn srgb_to_linear_rgb(color: Rgb) -> Rgb {
    color.map(srgb_to_linear)
}

/// Convert a linear triple to sRGB encoding
pub fn linear_to_srgb_rgb(color: Rgb) -> Rgb {
    color.map(linear_to_srgb)
}

/// Named colormaps mapping a scalar in [0, 1] to a color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Colormap {
    #[default]
    Viridis,
    Jet,
    Rainbow,
    Turbo,
}

impl Colormap {
    /// All supported colormaps
    pub const ALL: [Colormap; 4] = [
        Colormap::Viridis,
        Colormap::Jet,
        Colormap::Rainbow,
        Colormap::Turbo,
    ];

    /// Lowercase name used in configuration
    pub fn name(self) -> &'static str {
        match self {
            Colormap::Viridis => "viridis",
            Colormap::Jet => "jet",
            Colormap::Rainbow => "rainbow",
            Colormap::Turbo => "turbo",
        }
    }

    /// Evaluate the colormap at `t`; the result is clipped to [0, 1]
    pub fn sample(self, t: f32) -> Rgb {
        let color = match self {
            Colormap::Viridis => [
                0.267004 + 0.405133 * t,
                0.004874 + 0.838762 * t,
                0.329415 + 0.276025 * t,
            ],
            Colormap::Jet => {
                if t < 0.125 {
                    [0.0, 0.0, 0.5 + 4.0 * t]
                } else if t < 0.375 {
                    [0.0, 4.0 * (t - 0.125), 1.0]
                } else if t < 0.625 {
                    [4.0 * (t - 0.375), 1.0, 1.0 - 4.0 * (t - 0.375)]
                } else if t < 0.875 {
                    [1.0, 1.0 - 4.0 * (t - 0.625), 0.0]
                } else {
                    [1.0 - 4.0 * (t - 0.875), 0.0, 0.0]
                }
            }
            Colormap::Rainbow => [
                (2.0 * PI * t).sin().abs(),
                (2.0 * PI * (t + 1.0 / 3.0)).sin() * 0.5 + 0.5,
                (2.0 * PI * (t + 2.0 / 3.0)).sin() * 0.5 + 0.5,
            ],
            Colormap::Turbo => [
                polynomial(
                    t,
                    &[0.13572138, 4.61539260, -42.66032258, 132.13839591, -151.59036175, 62.35964731],
                ),
                polynomial(
                    t,
                    &[0.09140261, 2.19418839, 4.84296658, -14.18503333, 4.27729857, 2.82956604],
                ),
                polynomial(
                    t,
                    &[0.10667330, 12.64194608, -60.58204836, 110.36276771, -89.90310912, 27.34824973],
                ),
            ],
        };
        clamp_rgb(color, 0.0, 1.0)
    }
}

/// Evaluate `c0 + c1 t + c2 t^2 + ...` with Horner's scheme
fn polynomial(t: f32, coefficients: &[f32]) -> f32 {
    coefficients.iter().rev().fold(0.0, |acc, &c| acc * t + c)
}

impl FromStr for Colormap {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Colormap::ALL
            .into_iter()
            .find(|map| map.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Unsupported(format!("unknown colormap '{}'", s)))
    }
}

impl fmt::Display for Colormap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signature of a user-supplied color function: positions in, one color per
/// position out
pub type ColorFn = dyn Fn(&[Point3f]) -> Result<Vec<Rgb>> + Send + Sync;

/// How colors are chosen for a point set
#[derive(Clone, Default)]
pub enum ColorPolicy {
    /// Colors carried by the input, converted from sRGB
    Original,
    /// Colors derived from per-axis normalized positions
    #[default]
    Position,
    /// A colormap over one coordinate
    Height { axis: Axis, colormap: Colormap },
    /// The same color (sRGB) for every point
    Fixed(Rgb),
    /// A caller-provided function
    Custom(Arc<ColorFn>),
}

impl fmt::Debug for ColorPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorPolicy::Original => f.write_str("Original"),
            ColorPolicy::Position => f.write_str("Position"),
            ColorPolicy::Height { axis, colormap } => f
                .debug_struct("Height")
                .field("axis", axis)
                .field("colormap", colormap)
                .finish(),
            ColorPolicy::Fixed(color) => f.debug_tuple("Fixed").field(color).finish(),
            ColorPolicy::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Inputs to [`assign_colors`] beyond the positions themselves
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorSource<'a> {
    /// sRGB colors as loaded with the input, indexed like the input
    pub colors: Option<&'a [Rgb]>,
    /// Input indices of the kept points, when the positions were subsampled
    pub indices: Option<&'a [usize]>,
    /// Number of input points; subsampled colors must match it
    pub input_len: usize,
}

/// Color by position: shift each axis to start at zero, divide by its
/// extent, floor at a small positive value, then scale each triple to unit
/// length.
pub fn position_colors(points: &[Point3f]) -> Vec<Rgb> {
    if points.is_empty() {
        return Vec::new();
    }

    let mut min = points[0].coords;
    for p in points {
        min = min.inf(&p.coords);
    }
    let mut extent = points[0].coords - min;
    for p in points {
        extent = extent.sup(&(p.coords - min));
    }
    let extent = extent.map(|e| if e == 0.0 { 1.0 } else { e });

    points
        .par_iter()
        .map(|p| {
            let scaled = (p.coords - min)
                .component_div(&extent)
                .map(|c| c.clamp(POSITION_COLOR_FLOOR, 1.0));
            let norm = scaled.norm();
            let unit = if norm == 0.0 { scaled } else { scaled / norm };
            clamp_rgb([unit.x, unit.y, unit.z], 0.0, 1.0)
        })
        .collect()
}

/// Color by one coordinate through a colormap.
///
/// The coordinate is min-max normalized first; a constant coordinate maps
/// every point to the start of the colormap.
pub fn height_colors(points: &[Point3f], axis: Axis, colormap: Colormap) -> Vec<Rgb> {
    let index = axis.index();
    let (lo, hi) = points.iter().fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), p| {
        (lo.min(p[index]), hi.max(p[index]))
    });
    let range = hi - lo;

    points
        .par_iter()
        .map(|p| {
            let t = if range > 0.0 { (p[index] - lo) / range } else { 0.0 };
            colormap.sample(t)
        })
        .collect()
}

/// The same color, clamped to [0, 1], for `count` points
pub fn fixed_colors(count: usize, color: Rgb) -> Vec<Rgb> {
    vec![clamp_rgb(color, 0.0, 1.0); count]
}

/// Input colors aligned with `count` kept points and converted to linear
/// light.
///
/// Without a subsample the colors must match the kept points one to one.
/// With one, they must match the full input and are picked through the
/// subsample indices. Returns `None` when the colors cannot be aligned.
pub fn original_colors(count: usize, source: &ColorSource<'_>) -> Option<Vec<Rgb>> {
    let colors = source.colors?;

    let aligned: Vec<Rgb> = match source.indices {
        None if colors.len() == count => colors.to_vec(),
        None => return None,
        Some(indices) => {
            if colors.len() != source.input_len
                || indices.len() != count
                || indices.iter().any(|&i| i >= colors.len())
            {
                return None;
            }
            indices.iter().map(|&i| colors[i]).collect()
        }
    };

    Some(
        aligned
            .into_par_iter()
            .map(|c| srgb_to_linear_rgb(clamp_rgb(c, 0.0, 1.0)))
            .collect(),
    )
}

/// Run a user color function, discarding results that fail or have the
/// wrong length
pub fn custom_colors(points: &[Point3f], function: &ColorFn) -> Option<Vec<Rgb>> {
    match function(points) {
        Ok(colors) if colors.len() == points.len() => {
            Some(colors.into_iter().map(|c| clamp_rgb(c, 0.0, 1.0)).collect())
        }
        Ok(colors) => {
            tracing::warn!(
                "custom color function returned {} colors for {} points, ignoring it",
                colors.len(),
                points.len()
            );
            None
        }
        Err(err) => {
            tracing::warn!("custom color function failed: {}", err);
            None
        }
    }
}

/// Assign one linear RGB color per point according to `policy`.
///
/// `points` should be the normalized positions before the renderer axis
/// remap. Missing or misaligned input colors fall back to position colors
/// with a warning. `None` is returned only when a custom function fails, in
/// which case the scene builder uses its neutral default.
pub fn assign_colors(points: &[Point3f], source: &ColorSource<'_>, policy: &ColorPolicy) -> Option<Vec<Rgb>> {
    match policy {
        ColorPolicy::Original => match original_colors(points.len(), source) {
            Some(colors) => Some(colors),
            None => {
                if source.colors.is_none() {
                    tracing::warn!("input has no colors, falling back to position colors");
                } else {
                    tracing::warn!(
                        "input colors do not line up with the {} kept points, falling back to position colors",
                        points.len()
                    );
                }
                Some(position_colors(points))
            }
        },
        ColorPolicy::Position => Some(position_colors(points)),
        ColorPolicy::Height { axis, colormap } => Some(height_colors(points, *axis, *colormap)),
        ColorPolicy::Fixed(color) => Some(fixed_colors(points.len(), *color)),
        ColorPolicy::Custom(function) => custom_colors(points, function.as_ref()),
    }
}
