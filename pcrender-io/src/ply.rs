//! PLY format support

use crate::{PointSetReader, PointSetWriter};
use pcrender_core::{Error, Point3f, PointSet, Result, Rgb};
use ply_rs::{
    parser::Parser,
    ply::{Addable, DefaultElement, ElementDef, Ply, Property, PropertyDef, PropertyType, ScalarType},
    writer::Writer,
};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

pub struct PlyReader;
pub struct PlyWriter;

impl PointSetReader for PlyReader {
    fn read_point_set<P: AsRef<Path>>(path: P) -> Result<PointSet> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);

        let parser = Parser::<DefaultElement>::new();
        let ply = parser.read_ply(&mut reader)?;

        let vertices = ply.payload.get("vertex").map(Vec::as_slice).unwrap_or(&[]);
        let mut points = Vec::with_capacity(vertices.len());
        let mut colors = Vec::with_capacity(vertices.len());
        let mut has_colors = !vertices.is_empty();

        for vertex in vertices {
            let x = extract_property_value(vertex, "x")?;
            let y = extract_property_value(vertex, "y")?;
            let z = extract_property_value(vertex, "z")?;
            points.push(Point3f::new(x, y, z));

            if has_colors {
                match extract_color(vertex) {
                    Some(color) => colors.push(color),
                    None => has_colors = false,
                }
            }
        }

        if !has_colors && !colors.is_empty() {
            tracing::warn!("only some PLY vertices carry colors, ignoring colors");
        }
        tracing::debug!("read {} PLY vertices (colors: {})", points.len(), has_colors);

        Ok(PointSet {
            points,
            colors: has_colors.then_some(colors),
        })
    }
}

impl PointSetWriter for PlyWriter {
    /// Write ASCII PLY with float positions and, when they match the point
    /// count, uchar colors
    fn write_point_set<P: AsRef<Path>>(set: &PointSet, path: P) -> Result<()> {
        if set.is_empty() {
            return Err(Error::InvalidInput("refusing to write an empty point set".to_string()));
        }

        let colors = match &set.colors {
            Some(colors) if colors.len() == set.len() => Some(colors),
            Some(colors) => {
                tracing::warn!(
                    "{} colors for {} points, writing positions only",
                    colors.len(),
                    set.len()
                );
                None
            }
            None => None,
        };

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let mut ply = Ply::<DefaultElement>::new();

        let mut vertex_element = ElementDef::new("vertex".to_string());
        vertex_element.count = set.len();
        for name in ["x", "y", "z"] {
            vertex_element.properties.add(PropertyDef::new(
                name.to_string(),
                PropertyType::Scalar(ScalarType::Float),
            ));
        }
        if colors.is_some() {
            for name in ["red", "green", "blue"] {
                vertex_element.properties.add(PropertyDef::new(
                    name.to_string(),
                    PropertyType::Scalar(ScalarType::UChar),
                ));
            }
        }
        ply.header.elements.add(vertex_element);

        let mut vertices = Vec::with_capacity(set.len());
        for (i, point) in set.points.iter().enumerate() {
            let mut vertex = DefaultElement::new();
            vertex.insert("x".to_string(), Property::Float(point.x));
            vertex.insert("y".to_string(), Property::Float(point.y));
            vertex.insert("z".to_string(), Property::Float(point.z));
            if let Some(colors) = colors {
                let [r, g, b] = colors[i].map(to_channel_byte);
                vertex.insert("red".to_string(), Property::UChar(r));
                vertex.insert("green".to_string(), Property::UChar(g));
                vertex.insert("blue".to_string(), Property::UChar(b));
            }
            vertices.push(vertex);
        }
        ply.payload.insert("vertex".to_string(), vertices);

        let writer_instance = Writer::new();
        writer_instance.write_ply(&mut writer, &mut ply)?;

        Ok(())
    }
}

fn to_channel_byte(c: f32) -> u8 {
    (c.clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Extract a property value as f32 from a PLY element
fn extract_property_value(element: &DefaultElement, name: &str) -> Result<f32> {
    match element.get(name) {
        Some(Property::Float(val)) => Ok(*val),
        Some(Property::Double(val)) => Ok(*val as f32),
        Some(Property::Int(val)) => Ok(*val as f32),
        Some(Property::UInt(val)) => Ok(*val as f32),
        Some(Property::Short(val)) => Ok(*val as f32),
        Some(Property::UShort(val)) => Ok(*val as f32),
        _ => Err(Error::Parse(format!(
            "vertex property '{}' not found or has an unsupported type",
            name
        ))),
    }
}

/// Color channel normalized to [0, 1]; integer channels are scaled by their
/// type's maximum, float channels are taken as already normalized
fn extract_channel(element: &DefaultElement, name: &str) -> Option<f32> {
    let value = match element.get(name)? {
        Property::UChar(val) => *val as f32 / 255.0,
        Property::UShort(val) => *val as f32 / 65535.0,
        Property::Float(val) => *val,
        Property::Double(val) => *val as f32,
        _ => return None,
    };
    Some(value.clamp(0.0, 1.0))
}

fn extract_color(element: &DefaultElement) -> Option<Rgb> {
    Some([
        extract_channel(element, "red")?,
        extract_channel(element, "green")?,
        extract_channel(element, "blue")?,
    ])
}
