//! Command line arguments

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use pcrender_algorithms::{Direction, OrbitAxis};
use pcrender_scene::IntegratorKind;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "pcrender", version, about = "Render point clouds as sphere scenes")]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); overrides RUST_LOG
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Build a single scene for a point cloud
    Render(RenderArgs),
    /// Build one scene per frame of a camera orbit
    Turntable(TurntableArgs),
}

/// Settings shared by every subcommand
#[derive(Debug, Args)]
pub struct SceneArgs {
    /// Point cloud file (.ply, .xyz, .txt or .csv)
    pub input: PathBuf,

    /// JSON scene configuration; flags below override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub integrator: Option<IntegratorKind>,

    #[arg(long)]
    pub spp: Option<u32>,

    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    /// Field of view in degrees
    #[arg(long)]
    pub fov: Option<f32>,

    #[arg(long)]
    pub point_radius: Option<f32>,

    /// original, position, height or fixed
    #[arg(long)]
    pub color_mode: Option<String>,

    /// Colormap for height coloring
    #[arg(long)]
    pub colormap: Option<String>,

    /// Coordinate index for height coloring (0 = x, 1 = y, 2 = z)
    #[arg(long)]
    pub color_axis: Option<usize>,

    /// Keep this many randomly chosen points
    #[arg(long)]
    pub sample_count: Option<usize>,

    #[arg(long)]
    pub seed: Option<u64>,

    /// Drop the fixed ground plane
    #[arg(long)]
    pub no_ground: bool,

    /// Put a ground plane just below the cloud, facing the camera
    #[arg(long)]
    pub attach_ground: bool,

    #[arg(long)]
    pub no_area_light: bool,

    /// Renderer executable; required with --render
    #[arg(long)]
    pub renderer: Option<PathBuf>,

    #[arg(long, default_value = pcrender_io::renderer::DEFAULT_VARIANT)]
    pub variant: String,

    /// Run the renderer on every written scene
    #[arg(long, requires = "renderer")]
    pub render: bool,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub scene: SceneArgs,

    /// Scene file to write
    #[arg(short, long, default_value = "scene.xml")]
    pub output: PathBuf,

    /// Camera as nine numbers: origin, target, up
    #[arg(long, allow_hyphen_values = true)]
    pub camera_params: Option<String>,

    /// The camera was captured in viewer convention and needs converting
    #[arg(long)]
    pub viewer_camera: bool,

    /// Also write the prepared points (renderer space) as PLY
    #[arg(long)]
    pub export_ply: Option<PathBuf>,
}

/// Orbit axis as accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AxisArg {
    X,
    Y,
    Z,
    /// Rotate about the up vector of --camera-params
    InitialUp,
}

impl From<AxisArg> for OrbitAxis {
    fn from(axis: AxisArg) -> Self {
        match axis {
            AxisArg::X => OrbitAxis::X,
            AxisArg::Y => OrbitAxis::Y,
            AxisArg::Z => OrbitAxis::Z,
            AxisArg::InitialUp => OrbitAxis::InitialUp,
        }
    }
}

#[derive(Debug, Args)]
pub struct TurntableArgs {
    #[command(flatten)]
    pub scene: SceneArgs,

    #[arg(long, default_value_t = 36)]
    pub frames: usize,

    #[arg(long, value_enum, default_value_t = AxisArg::Z)]
    pub axis: AxisArg,

    #[arg(long)]
    pub clockwise: bool,

    #[arg(long, default_value_t = 2.0)]
    pub distance: f32,

    /// Degrees above the rotation plane
    #[arg(long, default_value_t = 15.0, allow_hyphen_values = true)]
    pub elevation: f32,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pub start_angle: f32,

    /// Start the orbit from this pose (nine numbers: origin, target, up);
    /// world-axis orbits derive distance, elevation and start angle from it
    #[arg(long, allow_hyphen_values = true)]
    pub camera_params: Option<String>,

    /// The camera was captured in viewer convention and needs converting
    #[arg(long)]
    pub viewer_camera: bool,

    #[arg(long, default_value = "frames")]
    pub out_dir: PathBuf,
}

impl TurntableArgs {
    pub fn direction(&self) -> Direction {
        if self.clockwise {
            Direction::Clockwise
        } else {
            Direction::CounterClockwise
        }
    }
}
