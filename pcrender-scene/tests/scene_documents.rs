//! End-to-end checks on generated scene documents

use pcrender_algorithms::{srgb_to_linear, ColorPolicy, Direction, OrbitSpec};
use pcrender_core::{CameraPose, Point3f, PointSet, Vector3f};
use pcrender_scene::*;

fn create_grid_cloud(n: usize) -> PointSet {
    let mut points = Vec::with_capacity(n * n);
    for i in 0..n {
        for j in 0..n {
            points.push(Point3f::new(i as f32, j as f32, ((i + j) % 3) as f32 * 0.5));
        }
    }
    PointSet::from_points(points)
}

fn count_tag(doc: &SceneDocument, tag: &str, kind: &str) -> usize {
    doc.root
        .count_matching(&|n: &SceneNode| n.tag == tag && n.attr("type") == Some(kind))
}

#[test]
fn test_document_structure_counts() {
    let cloud = create_grid_cloud(5);
    let doc = render_document(&cloud, &SceneConfig::default()).unwrap();

    assert_eq!(count_tag(&doc, "shape", "sphere"), 25);
    assert_eq!(count_tag(&doc, "emitter", "constant"), 1);
    assert_eq!(doc.root.count_matching(&|n: &SceneNode| n.tag == "sensor"), 1);
    assert!(doc.camera_lookat().is_some());
}

#[test]
fn test_build_is_deterministic() {
    let cloud = create_grid_cloud(4);
    let config = SceneConfig {
        sample_count: Some(7),
        seed: Some(5),
        ..SceneConfig::default()
    };
    let a = render_document(&cloud, &config).unwrap().to_xml();
    let b = render_document(&cloud, &config).unwrap().to_xml();
    assert_eq!(a, b);
    assert_eq!(a.matches("type=\"sphere\"").count(), 7);
}

#[test]
fn test_camera_patch_changes_only_lookat_line() {
    let cloud = create_grid_cloud(3);
    let doc = render_document(&cloud, &SceneConfig::default()).unwrap();
    let pose = CameraPose::new(
        Point3f::new(3.0, 1.0, 2.0),
        Point3f::new(0.0, 0.0, 0.5),
        Vector3f::new(0.0, 0.0, 1.0),
    )
    .unwrap();
    let patched = doc.with_camera(&pose);

    let before_xml = doc.to_xml();
    let after_xml = patched.to_xml();
    let before: Vec<&str> = before_xml.lines().collect();
    let after: Vec<&str> = after_xml.lines().collect();

    assert_eq!(before.len(), after.len());
    let changed: Vec<usize> = (0..before.len()).filter(|&i| before[i] != after[i]).collect();
    assert_eq!(changed.len(), 1);
    assert!(after[changed[0]].contains("<lookat origin=\"3.0,1.0,2.0\" target=\"0.0,0.0,0.5\" up=\"0.0,0.0,1.0\"/>"));
}

#[test]
fn test_viewer_camera_is_converted_before_use() {
    let viewer_pose = CameraPose::new(
        Point3f::new(0.0, 0.0, 3.0),
        Point3f::origin(),
        Vector3f::new(0.0, 1.0, 0.0),
    )
    .unwrap();
    let config = SceneConfig {
        camera: Some(viewer_pose.to_render_convention()),
        ..SceneConfig::default()
    };
    let doc = render_document(&create_grid_cloud(2), &config).unwrap();
    let lookat = doc.camera_lookat().unwrap();

    assert_eq!(lookat.attr("origin"), Some("-3.0,0.0,0.0"));
    assert_eq!(lookat.attr("target"), Some("-0.0,0.0,0.0125"));
    assert_eq!(lookat.attr("up"), Some("0.0,-0.0,-1.0"));
}

#[test]
fn test_fixed_color_written_linear() {
    let config = SceneConfig {
        color: ColorSettings {
            mode: "fixed".to_string(),
            fixed_color: [0.7, 0.7, 0.7],
            ..ColorSettings::default()
        },
        ..SceneConfig::default()
    };
    let doc = render_document(&create_grid_cloud(2), &config).unwrap();
    let linear = format_float(srgb_to_linear(0.7));
    let expected = format!("name=\"reflectance\" value=\"{0},{0},{0}\"", linear);
    assert_eq!(doc.to_xml().matches(&expected).count(), 4);
}

#[test]
fn test_failed_custom_colors_use_gray() {
    let prepared = prepare_cloud(
        &create_grid_cloud(2),
        &PrepareOptions {
            color: ColorPolicy::Custom(std::sync::Arc::new(
                |_: &[Point3f]| -> pcrender_core::Result<Vec<[f32; 3]>> { Ok(Vec::new()) },
            )),
            ..PrepareOptions::default()
        },
    )
    .unwrap();
    assert!(prepared.colors.is_none());

    let xml = prepared.build(&SceneConfig::default()).unwrap().to_xml();
    assert_eq!(xml.matches("value=\"0.7,0.7,0.7\"").count(), 4);
}

#[test]
fn test_turntable_frames() {
    let prepared = prepare_cloud(&create_grid_cloud(3), &PrepareOptions::default()).unwrap();
    let reference: CameraPose = "0,-3,1 0,0,0 0,0,1".parse().unwrap();
    let orbit = OrbitSpec::initial_up(reference, Direction::Clockwise, 6);
    let docs = orbit_documents(&prepared, &SceneConfig::default(), &orbit).unwrap();

    assert_eq!(docs.len(), 6);
    for doc in &docs {
        assert_eq!(doc.camera_lookat().unwrap().attr("target"), Some("0.0,0.0,0.0"));
        assert_eq!(count_tag(doc, "shape", "sphere"), 9);
    }
}
