//! Bounding-box normalization with optional random subsampling

use pcrender_core::{Bounded, Error, Point3f, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Largest extents below this are treated as a degenerate (point-like) cloud
pub const DEGENERATE_SCALE_EPSILON: f32 = 1e-9;

/// Options controlling [`normalize_bbox`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NormalizeOptions {
    /// Keep this many points, chosen uniformly without replacement.
    /// `None`, `Some(0)` or a value not below the point count disables
    /// subsampling.
    pub sample_count: Option<usize>,
    /// Seed for the sampler; `None` draws from OS entropy
    pub seed: Option<u64>,
}

impl NormalizeOptions {
    /// Subsample to `count` points with a fixed seed
    pub fn sampled(count: usize, seed: u64) -> Self {
        Self {
            sample_count: Some(count),
            seed: Some(seed),
        }
    }
}

/// Output of bounding-box normalization
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizationResult {
    /// Midpoint of the bounding box of the (possibly subsampled) input
    pub center: Point3f,
    /// Largest bounding-box extent, or 1.0 for a degenerate cloud
    pub scale: f32,
    /// `(p - center) / scale` for every kept point, in kept order
    pub points: Vec<Point3f>,
    /// Indices into the input of the kept points, when subsampling happened
    pub indices: Option<Vec<usize>>,
}

impl NormalizationResult {
    /// Map a normalized point back into the input frame
    pub fn denormalize(&self, point: &Point3f) -> Point3f {
        self.center + point.coords * self.scale
    }
}

/// Choose `count` distinct indices out of `0..len`.
///
/// Returns every index in order when `count` is zero or not below `len`.
pub fn subsample_indices(len: usize, count: usize, seed: Option<u64>) -> Vec<usize> {
    if count == 0 || count >= len {
        return (0..len).collect();
    }

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    rand::seq::index::sample(&mut rng, len, count).into_vec()
}

/// Center a point list on its bounding-box midpoint and scale it so the
/// largest extent becomes 1.
///
/// After normalization every coordinate lies in [-0.5, 0.5] and at least
/// one axis spans that interval exactly (unless the cloud is degenerate).
///
/// # Arguments
/// * `points` - Input positions, must not be empty
/// * `options` - Optional subsampling
///
/// # Returns
/// * `Result<NormalizationResult>` - Normalized points with the center and
///   scale used, plus the kept indices when subsampling happened
pub fn normalize_bbox(points: &[Point3f], options: &NormalizeOptions) -> Result<NormalizationResult> {
    if points.is_empty() {
        return Err(Error::InvalidInput("cannot normalize an empty point set".to_string()));
    }

    let (kept, indices) = match options.sample_count {
        Some(count) if count > 0 && count < points.len() => {
            let indices = subsample_indices(points.len(), count, options.seed);
            let kept: Vec<Point3f> = indices.iter().map(|&i| points[i]).collect();
            tracing::debug!("subsampled {} of {} points", kept.len(), points.len());
            (kept, Some(indices))
        }
        _ => (points.to_vec(), None),
    };

    let bbox = kept
        .bounding_box()
        .ok_or_else(|| Error::InvalidInput("cannot normalize an empty point set".to_string()))?;
    let center = bbox.center();
    let mut scale = bbox.max_extent();
    if scale < DEGENERATE_SCALE_EPSILON {
        tracing::warn!(
            "point set has zero extent (largest extent {}), using scale 1.0",
            scale
        );
        scale = 1.0;
    }

    let normalized = kept
        .par_iter()
        .map(|p| Point3f::from((p - center) / scale))
        .collect();

    Ok(NormalizationResult {
        center,
        scale,
        points: normalized,
        indices,
    })
}
