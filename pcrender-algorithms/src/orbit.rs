//! Camera orbits for turntable animations
//!
//! Two trajectories are supported. A world-axis orbit places the camera on a
//! circle around one of the renderer-space axes, always looking at the
//! origin. An initial-up orbit rotates a user-supplied reference pose about
//! its own up vector, keeping the camera's roll stable from frame to frame.
//!
//! All poses produced here are already in renderer space.

use nalgebra::{Rotation3, Unit};
use pcrender_core::{parse_pose_numbers, Axis, CameraPose, Error, Point3f, Result, Vector3f, POSE_EPSILON};
use std::fmt;
use std::str::FromStr;

/// Elevations beyond this (in degrees, either sign) use a tangential up
/// vector instead of the rotation axis
pub const POLE_ELEVATION_DEG: f32 = 89.5;

/// Rotation axis of an orbit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OrbitAxis {
    X,
    Y,
    #[default]
    Z,
    /// The up vector of the reference pose
    InitialUp,
}

impl OrbitAxis {
    /// The world axis, or `None` for [`OrbitAxis::InitialUp`]
    pub fn world_axis(self) -> Option<Axis> {
        match self {
            OrbitAxis::X => Some(Axis::X),
            OrbitAxis::Y => Some(Axis::Y),
            OrbitAxis::Z => Some(Axis::Z),
            OrbitAxis::InitialUp => None,
        }
    }
}

impl From<Axis> for OrbitAxis {
    fn from(axis: Axis) -> Self {
        match axis {
            Axis::X => OrbitAxis::X,
            Axis::Y => OrbitAxis::Y,
            Axis::Z => OrbitAxis::Z,
        }
    }
}

impl FromStr for OrbitAxis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "initial-up" | "initial_up" | "initialup" => Ok(OrbitAxis::InitialUp),
            other => other.parse::<Axis>().map(OrbitAxis::from),
        }
    }
}

impl fmt::Display for OrbitAxis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OrbitAxis::X => "x",
            OrbitAxis::Y => "y",
            OrbitAxis::Z => "z",
            OrbitAxis::InitialUp => "initial-up",
        };
        f.write_str(name)
    }
}

/// Direction of travel along the orbit, seen from the positive axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    Clockwise,
    #[default]
    CounterClockwise,
}

impl Direction {
    /// Sign applied to the per-frame angle increment
    pub fn sign(self) -> f32 {
        match self {
            Direction::Clockwise => -1.0,
            Direction::CounterClockwise => 1.0,
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cw" | "clockwise" => Ok(Direction::Clockwise),
            "ccw" | "counterclockwise" | "counter-clockwise" => Ok(Direction::CounterClockwise),
            other => Err(Error::Unsupported(format!("unknown orbit direction '{}'", other))),
        }
    }
}

/// Distance, elevation and start angle of a world-axis orbit
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrbitParams {
    pub distance: f32,
    pub elevation_deg: f32,
    pub start_angle_deg: f32,
}

/// Description of a full orbit
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitSpec {
    pub axis: OrbitAxis,
    /// Camera distance from the origin (world-axis orbits only)
    pub distance: f32,
    /// Elevation above the rotation plane in degrees (world-axis orbits only)
    pub elevation_deg: f32,
    /// Angle of frame 0 in degrees (world-axis orbits only)
    pub start_angle_deg: f32,
    pub direction: Direction,
    pub frame_count: usize,
    /// Pose rotated by an initial-up orbit
    pub reference: Option<CameraPose>,
}

impl Default for OrbitSpec {
    fn default() -> Self {
        Self {
            axis: OrbitAxis::Z,
            distance: 2.0,
            elevation_deg: 15.0,
            start_angle_deg: 0.0,
            direction: Direction::CounterClockwise,
            frame_count: 36,
            reference: None,
        }
    }
}

impl OrbitSpec {
    /// A world-axis orbit
    pub fn world(axis: Axis, params: OrbitParams, direction: Direction, frame_count: usize) -> Self {
        Self {
            axis: axis.into(),
            distance: params.distance,
            elevation_deg: params.elevation_deg,
            start_angle_deg: params.start_angle_deg,
            direction,
            frame_count,
            reference: None,
        }
    }

    /// An orbit about the up vector of `reference`
    pub fn initial_up(reference: CameraPose, direction: Direction, frame_count: usize) -> Self {
        Self {
            axis: OrbitAxis::InitialUp,
            direction,
            frame_count,
            reference: Some(reference),
            ..Self::default()
        }
    }

    /// A world-axis orbit whose first frame reproduces an observed pose
    pub fn seeded_from_view(pose: &str, axis: Axis, direction: Direction, frame_count: usize) -> Result<Self> {
        let params = derive_orbit_params(pose, axis)?;
        Ok(Self::world(axis, params, direction, frame_count))
    }

    /// Rotation angle of frame `index` in degrees.
    ///
    /// World-axis orbits start at `start_angle_deg`; initial-up orbits start
    /// at zero (the reference pose itself).
    pub fn frame_angle(&self, index: usize) -> f32 {
        let step = index as f32 / self.frame_count as f32 * 360.0;
        let base = match self.axis {
            OrbitAxis::InitialUp => 0.0,
            _ => self.start_angle_deg,
        };
        base + self.direction.sign() * step
    }

    /// Generate one camera pose per frame
    pub fn generate(&self) -> Result<Vec<CameraPose>> {
        if self.frame_count == 0 {
            return Err(Error::Configuration("orbit needs at least one frame".to_string()));
        }

        match self.axis.world_axis() {
            Some(axis) => self.world_axis_poses(axis),
            None => self.initial_up_poses(),
        }
    }

    fn world_axis_poses(&self, axis: Axis) -> Result<Vec<CameraPose>> {
        if !self.distance.is_finite() || self.distance < POSE_EPSILON {
            return Err(Error::DegenerateGeometry(format!(
                "orbit distance {} is too small",
                self.distance
            )));
        }

        let elevation = self.elevation_deg.to_radians();
        let radial = self.distance * elevation.cos();
        let axial = self.distance * elevation.sin();
        let near_pole = self.elevation_deg.abs() > POLE_ELEVATION_DEG;

        let poses = (0..self.frame_count)
            .map(|i| {
                let angle_deg = self.frame_angle(i);
                tracing::debug!("orbit frame {} at {:.2} degrees", i, angle_deg.rem_euclid(360.0));
                let angle = angle_deg.to_radians();
                let (sin, cos) = angle.sin_cos();
                let u = radial * cos;
                let v = radial * sin;

                let (origin, up) = match axis {
                    Axis::Z => {
                        let up = if near_pole {
                            Vector3f::new(-cos, -sin, 0.0)
                        } else {
                            Vector3f::z()
                        };
                        (Point3f::new(u, v, axial), up)
                    }
                    Axis::Y => {
                        let up = if near_pole {
                            Vector3f::new(cos, 0.0, -sin)
                        } else {
                            Vector3f::y()
                        };
                        (Point3f::new(u, axial, v), up)
                    }
                    Axis::X => {
                        let up = if near_pole {
                            Vector3f::new(0.0, cos, -sin)
                        } else {
                            Vector3f::x()
                        };
                        (Point3f::new(axial, v, u), up)
                    }
                };

                CameraPose {
                    origin,
                    target: Point3f::origin(),
                    up,
                }
            })
            .collect();

        Ok(poses)
    }

    fn initial_up_poses(&self) -> Result<Vec<CameraPose>> {
        let reference = self.reference.ok_or_else(|| {
            Error::Configuration("an initial-up orbit requires a reference camera pose".to_string())
        })?;
        reference.validate()?;

        let axis = Unit::new_normalize(reference.up);
        let offset = reference.origin - reference.target;
        let view = reference.view_direction();
        let right = view.cross(&axis);
        if right.norm() < POSE_EPSILON {
            return Err(Error::InvalidInput(
                "reference up vector is parallel to the view direction".to_string(),
            ));
        }
        let right = right.normalize();
        let stable_up = right.cross(&view).normalize();

        let poses = (0..self.frame_count)
            .map(|i| {
                let angle_deg = self.frame_angle(i);
                tracing::debug!("orbit frame {} at {:.2} degrees", i, angle_deg.rem_euclid(360.0));
                let rotation = Rotation3::from_axis_angle(&axis, angle_deg.to_radians());

                // The cloud sits at the renderer origin, so the camera keeps its
                // offset from the rotation center but looks at the origin.
                CameraPose {
                    origin: Point3f::from(rotation * offset),
                    target: Point3f::origin(),
                    up: rotation * stable_up,
                }
            })
            .collect();

        Ok(poses)
    }
}

/// Back-solve the world-axis orbit parameters whose first frame reproduces
/// an observed pose.
///
/// The pose is shifted so its target lands on the origin; the view
/// direction and distance are preserved, the observed up vector is not.
///
/// The start angle is measured with the same in-plane component pair the
/// forward placement uses (z: `atan2(y, x)`, y: `atan2(z, x)`, x:
/// `atan2(y, z)`). This differs from turntable scripts that
/// swap the pair for the x and y axes, which would start those orbits a
/// quarter turn or mirrored away from the observed view.
pub fn orbit_params_from_pose(origin: &Point3f, target: &Point3f, axis: Axis) -> Result<OrbitParams> {
    let translated = origin - target;
    let distance = translated.norm();
    if distance < POSE_EPSILON {
        return Err(Error::DegenerateGeometry(
            "camera origin and target coincide, cannot derive an orbit".to_string(),
        ));
    }

    let (along, a, b) = match axis {
        Axis::Z => (translated.z, translated.x, translated.y),
        Axis::Y => (translated.y, translated.x, translated.z),
        Axis::X => (translated.x, translated.z, translated.y),
    };
    let elevation = (along / distance).clamp(-1.0, 1.0).asin();
    let start_angle = b.atan2(a);

    Ok(OrbitParams {
        distance,
        elevation_deg: elevation.to_degrees(),
        start_angle_deg: start_angle.to_degrees(),
    })
}

/// Parse a nine-number pose string and derive orbit parameters from it
pub fn derive_orbit_params(pose: &str, axis: Axis) -> Result<OrbitParams> {
    let v = parse_pose_numbers(pose)?;
    let params = orbit_params_from_pose(
        &Point3f::new(v[0], v[1], v[2]),
        &Point3f::new(v[3], v[4], v[5]),
        axis,
    )?;
    tracing::info!(
        "derived orbit: distance {:.4}, elevation {:.2}, start angle {:.2} about {:?}",
        params.distance,
        params.elevation_deg,
        params.start_angle_deg,
        axis
    );
    Ok(params)
}
