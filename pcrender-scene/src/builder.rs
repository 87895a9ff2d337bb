//! Scene graph synthesis
//!
//! Node order in a built document is fixed: integrator, background
//! emitter, sensor, shared surface material, one sphere per point, then the
//! optional ground plane, attached ground plane and area light.

use crate::config::{AreaLightSettings, AttachedGroundSettings, GroundSettings, IntegratorKind, SceneConfig};
use crate::document::{format_float, SceneDocument, SceneNode};
use pcrender_core::{format_triple, CameraPose, Point3f, Result, Rgb, Vector3f, FALLBACK_GRAY};

/// Far clipping distance of the sensor
pub const FAR_CLIP: f32 = 100.0;
/// Near clipping distance of the sensor
pub const NEAR_CLIP: f32 = 0.1;
/// Identifier of the shared ground material
pub const SURFACE_MATERIAL_ID: &str = "surfaceMaterial";
/// The attached ground rectangle is this many times its configured size
pub const ATTACHED_GROUND_SCALE: f32 = 5.0;
/// Fixed horizontal placement of the area light
const AREA_LIGHT_XY: (f32, f32) = (-4.0, 4.0);
/// Cross products shorter than this are considered degenerate when
/// orienting the attached ground
const MIN_BASIS_NORM: f32 = 0.1;

/// `<transform name="toWorld">` with the given children
fn to_world(children: Vec<SceneNode>) -> SceneNode {
    let mut transform = SceneNode::new("transform").with_attr("name", "toWorld");
    transform.children = children;
    transform
}

fn scale_node(x: f32, y: f32, z: f32) -> SceneNode {
    SceneNode::new("scale")
        .with_attr("x", format_float(x))
        .with_attr("y", format_float(y))
        .with_attr("z", format_float(z))
}

fn translate_node(x: f32, y: f32, z: f32) -> SceneNode {
    SceneNode::new("translate")
        .with_attr("x", format_float(x))
        .with_attr("y", format_float(y))
        .with_attr("z", format_float(z))
}

/// Integrator node; path tracing keeps emitters visible so the background
/// doubles as the sky
pub fn integrator_node(kind: IntegratorKind, max_depth: i32) -> SceneNode {
    let mut node = SceneNode::typed("integrator", kind.name());
    if kind == IntegratorKind::Path {
        if max_depth > 0 {
            node.push(SceneNode::integer("maxDepth", i64::from(max_depth)));
        }
        node.push(SceneNode::boolean("hideEmitters", false));
    }
    node
}

/// The single constant environment emitter
pub fn background_node(color: Rgb) -> SceneNode {
    SceneNode::typed("emitter", "constant").with_child(SceneNode::rgb("radiance", color))
}

/// Perspective sensor with sampler and film
pub fn sensor_node(camera: &CameraPose, config: &SceneConfig) -> SceneNode {
    let sampler = SceneNode::typed("sampler", "independent")
        .with_child(SceneNode::integer("sampleCount", i64::from(config.samples_per_pixel)));
    let film = SceneNode::typed("film", "hdrfilm")
        .with_child(SceneNode::integer("width", i64::from(config.film_width)))
        .with_child(SceneNode::integer("height", i64::from(config.film_height)))
        .with_child(SceneNode::typed("rfilter", "gaussian"));

    SceneNode::typed("sensor", "perspective")
        .with_child(SceneNode::float("farClip", FAR_CLIP))
        .with_child(SceneNode::float("nearClip", NEAR_CLIP))
        .with_child(to_world(vec![SceneNode::lookat(camera)]))
        .with_child(SceneNode::float("fov", config.fov))
        .with_child(sampler)
        .with_child(film)
}

/// Rough plastic material shared by the fixed ground plane
pub fn surface_material_node() -> SceneNode {
    SceneNode::typed("bsdf", "roughplastic")
        .with_attr("id", SURFACE_MATERIAL_ID)
        .with_child(SceneNode::string("distribution", "ggx"))
        .with_child(SceneNode::float("alpha", 0.05))
        .with_child(SceneNode::float("intIOR", 1.46))
        .with_child(SceneNode::rgb("diffuseReflectance", [1.0, 1.0, 1.0]))
}

/// One diffuse sphere per point.
///
/// Points beyond the end of `colors` (or all points, when `colors` is
/// `None`) get [`FALLBACK_GRAY`].
pub fn point_nodes(points: &[Point3f], colors: Option<&[Rgb]>, radius: f32) -> Vec<SceneNode> {
    points
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let color = colors.and_then(|c| c.get(i)).copied().unwrap_or(FALLBACK_GRAY);
            SceneNode::typed("shape", "sphere")
                .with_child(SceneNode::float("radius", radius))
                .with_child(to_world(vec![translate_node(p.x, p.y, p.z)]))
                .with_child(SceneNode::typed("bsdf", "diffuse").with_child(SceneNode::rgb("reflectance", color)))
        })
        .collect()
}

/// Fixed horizontal ground plane using the shared material
pub fn ground_node(settings: &GroundSettings) -> SceneNode {
    SceneNode::typed("shape", "rectangle")
        .with_child(
            SceneNode::new("ref")
                .with_attr("name", "bsdf")
                .with_attr("id", SURFACE_MATERIAL_ID),
        )
        .with_child(to_world(vec![
            scale_node(settings.size, settings.size, 1.0),
            translate_node(0.0, 0.0, settings.height),
        ]))
}

/// Ground plane hugging the underside of the cloud.
///
/// With a camera, the plane is perpendicular to the camera's up vector and
/// sits below the lowest projection of the points onto it. Without one, it
/// is horizontal just below the lowest z. Returns `None` for an empty cloud.
pub fn attached_ground_node(
    points: &[Point3f],
    settings: &AttachedGroundSettings,
    camera: Option<&CameraPose>,
) -> Option<SceneNode> {
    if points.is_empty() {
        return None;
    }

    let size = settings.size * ATTACHED_GROUND_SCALE;
    let placement = match camera {
        Some(camera) => {
            let up = camera.up.normalize();
            let min_projection = points
                .iter()
                .map(|p| p.coords.dot(&up))
                .fold(f32::INFINITY, f32::min);
            let plane_point = up * min_projection + up * (settings.offset * 2.0);
            let plane_target = plane_point + up;

            let mut lookat_up = up.cross(&camera.view_direction());
            if lookat_up.norm() < MIN_BASIS_NORM {
                lookat_up = up.cross(&Vector3f::x());
                if lookat_up.norm() < MIN_BASIS_NORM {
                    lookat_up = up.cross(&Vector3f::y());
                }
            }
            let lookat_up = lookat_up.normalize();

            SceneNode::new("lookat")
                .with_attr("origin", format_triple(plane_point.x, plane_point.y, plane_point.z))
                .with_attr("target", format_triple(plane_target.x, plane_target.y, plane_target.z))
                .with_attr("up", format_triple(lookat_up.x, lookat_up.y, lookat_up.z))
        }
        None => {
            let min_z = points.iter().map(|p| p.z).fold(f32::INFINITY, f32::min);
            translate_node(0.0, 0.0, min_z + settings.offset * 2.0)
        }
    };

    Some(
        SceneNode::typed("shape", "rectangle")
            .with_child(SceneNode::typed("bsdf", "diffuse").with_child(SceneNode::rgb("reflectance", [1.0, 1.0, 1.0])))
            .with_child(to_world(vec![scale_node(size, size, 1.0), placement])),
    )
}

/// Rectangular area light aimed at the origin
pub fn area_light_node(settings: &AreaLightSettings) -> SceneNode {
    let (x, y) = AREA_LIGHT_XY;
    let placement = CameraPose {
        origin: Point3f::new(x, y, settings.height),
        target: Point3f::origin(),
        up: Vector3f::z(),
    };
    let i = settings.intensity;

    SceneNode::typed("shape", "rectangle")
        .with_child(to_world(vec![
            scale_node(settings.size, settings.size, 1.0),
            SceneNode::lookat(&placement),
        ]))
        .with_child(SceneNode::typed("emitter", "area").with_child(SceneNode::rgb("radiance", [i, i, i])))
}

/// Build the complete scene document for one frame.
///
/// # Arguments
/// * `config` - Scene settings, including the renderer-space camera
/// * `points` - Renderer-space point positions
/// * `colors` - Linear RGB per point, if any
///
/// # Returns
/// * `Result<SceneDocument>` - The document, or an error when the
///   configuration or camera pose is invalid
pub fn build_scene(config: &SceneConfig, points: &[Point3f], colors: Option<&[Rgb]>) -> Result<SceneDocument> {
    config.validate()?;
    let camera = config.camera_or_default();
    camera.validate()?;

    let mut doc = SceneDocument::new();
    doc.push(integrator_node(config.integrator, config.max_depth));
    doc.push(background_node(config.background_color));
    doc.push(sensor_node(&camera, config));
    doc.push(surface_material_node());
    doc.root.children.extend(point_nodes(points, colors, config.point_radius));

    if config.include_ground {
        doc.push(ground_node(&config.ground));
    }
    if config.attach_ground {
        if let Some(node) = attached_ground_node(points, &config.attached_ground, config.camera.as_ref()) {
            doc.push(node);
        }
    }
    if config.include_area_light {
        doc.push(area_light_node(&config.area_light));
    }

    tracing::debug!("built scene with {} points", points.len());
    Ok(doc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn parse_triple(value: &str) -> Vector3f {
        let parts: Vec<f32> = value.split(',').map(|s| s.parse().unwrap()).collect();
        Vector3f::new(parts[0], parts[1], parts[2])
    }

    #[test]
    fn test_integrator_variants() {
        let path = integrator_node(IntegratorKind::Path, -1);
        assert_eq!(path.children.len(), 1);
        assert_eq!(path.children[0].attr("name"), Some("hideEmitters"));
        assert_eq!(path.children[0].attr("value"), Some("false"));

        let deep = integrator_node(IntegratorKind::Path, 8);
        assert_eq!(deep.children[0].attr("name"), Some("maxDepth"));
        assert_eq!(deep.children[0].attr("value"), Some("8"));

        let direct = integrator_node(IntegratorKind::Direct, 8);
        assert!(direct.children.is_empty());
        assert_eq!(direct.attr("type"), Some("direct"));
    }

    #[test]
    fn test_point_colors_fall_back_to_gray() {
        let points = vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 0.0)];
        let colors = vec![[1.0, 0.0, 0.0]];
        let nodes = point_nodes(&points, Some(&colors), 0.01);

        let reflectance = |n: &SceneNode| n.find(&["bsdf", "rgb"]).unwrap().attr("value").unwrap().to_string();
        assert_eq!(reflectance(&nodes[0]), "1.0,0.0,0.0");
        assert_eq!(reflectance(&nodes[1]), "0.7,0.7,0.7");
        assert_eq!(
            nodes[1].find(&["transform", "translate"]).unwrap().attr("x"),
            Some("1.0")
        );
    }

    #[test]
    fn test_attached_ground_without_camera() {
        let points = vec![Point3f::new(0.0, 0.0, -0.2), Point3f::new(0.0, 0.0, 0.4)];
        let node = attached_ground_node(&points, &AttachedGroundSettings::default(), None).unwrap();

        let scale = node.find(&["transform", "scale"]).unwrap();
        assert_eq!(scale.attr("x"), Some("75.0"));
        let translate = node.find(&["transform", "translate"]).unwrap();
        let z: f32 = translate.attr("z").unwrap().parse().unwrap();
        assert_relative_eq!(z, -0.3, epsilon = 1e-6);
    }

    #[test]
    fn test_attached_ground_follows_camera_up() {
        let points = vec![Point3f::new(0.0, -0.3, 0.0), Point3f::new(0.0, 0.5, 0.1)];
        let camera = CameraPose::new(
            Point3f::new(0.0, 0.0, 3.0),
            Point3f::origin(),
            Vector3f::new(0.0, 2.0, 0.0),
        )
        .unwrap();
        let node = attached_ground_node(&points, &AttachedGroundSettings::default(), Some(&camera)).unwrap();
        let lookat = node.find(&["transform", "lookat"]).unwrap();

        let origin = parse_triple(lookat.attr("origin").unwrap());
        let target = parse_triple(lookat.attr("target").unwrap());
        let up = parse_triple(lookat.attr("up").unwrap());

        assert_relative_eq!(origin, Vector3f::new(0.0, -0.4, 0.0), epsilon = 1e-6);
        assert_relative_eq!(target - origin, Vector3f::y(), epsilon = 1e-6);
        assert_relative_eq!(up.norm(), 1.0, epsilon = 1e-6);
        assert_relative_eq!(up.dot(&Vector3f::y()), 0.0, epsilon = 1e-6);
    }

    #[test]
    fn test_attached_ground_degenerate_basis() {
        // Camera looking straight down its own up axis.
        let camera = CameraPose {
            origin: Point3f::new(0.0, 0.0, 3.0),
            target: Point3f::origin(),
            up: Vector3f::z(),
        };
        let points = vec![Point3f::new(0.0, 0.0, 0.0)];
        let node = attached_ground_node(&points, &AttachedGroundSettings::default(), Some(&camera)).unwrap();
        let up = parse_triple(node.find(&["transform", "lookat"]).unwrap().attr("up").unwrap());
        assert_relative_eq!(up, Vector3f::new(0.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_attached_ground_empty_cloud() {
        assert!(attached_ground_node(&[], &AttachedGroundSettings::default(), None).is_none());
    }

    #[test]
    fn test_area_light_layout() {
        let node = area_light_node(&AreaLightSettings::default());
        let lookat = node.find(&["transform", "lookat"]).unwrap();
        assert_eq!(lookat.attr("origin"), Some("-4.0,4.0,20.0"));
        assert_eq!(lookat.attr("up"), Some("0.0,0.0,1.0"));
        assert_eq!(node.find(&["emitter", "rgb"]).unwrap().attr("value"), Some("3.0,3.0,3.0"));
    }

    #[test]
    fn test_build_rejects_degenerate_camera() {
        let config = SceneConfig {
            camera: Some(CameraPose {
                origin: Point3f::origin(),
                target: Point3f::origin(),
                up: Vector3f::z(),
            }),
            ..SceneConfig::default()
        };
        assert!(build_scene(&config, &[Point3f::origin()], None).is_err());
    }

    #[test]
    fn test_build_node_order() {
        let config = SceneConfig {
            attach_ground: true,
            ..SceneConfig::default()
        };
        let points = vec![Point3f::new(0.1, 0.2, 0.3), Point3f::new(-0.1, 0.0, 0.2)];
        let doc = build_scene(&config, &points, None).unwrap();
        let tags: Vec<(&str, Option<&str>)> = doc
            .root
            .children
            .iter()
            .map(|n| (n.tag.as_str(), n.attr("type")))
            .collect();

        assert_eq!(
            tags,
            vec![
                ("integrator", Some("path")),
                ("emitter", Some("constant")),
                ("sensor", Some("perspective")),
                ("bsdf", Some("roughplastic")),
                ("shape", Some("sphere")),
                ("shape", Some("sphere")),
                ("shape", Some("rectangle")),
                ("shape", Some("rectangle")),
                ("shape", Some("rectangle")),
            ]
        );
    }
}
