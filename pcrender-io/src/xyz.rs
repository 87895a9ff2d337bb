//! XYZ point list support
//!
//! One point per line: `x y z` or `x y z r g b`. Columns may be separated by
//! spaces, tabs, commas or semicolons (detected from the first data line).
//! Blank lines and lines starting with `#` are skipped, and a leading line
//! that does not parse as numbers is treated as a header. Colors are taken
//! as [0, 1] unless some channel exceeds 1, in which case the whole color
//! block is read as 0-255 values.

use crate::{PointSetReader, PointSetWriter};
use pcrender_core::{Error, Point3f, PointSet, Result, Rgb};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

/// Supported column separators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Whitespace,
    Semicolon,
}

impl Delimiter {
    /// Detect the separator from a line of text
    pub fn detect_from_line(line: &str) -> Self {
        let comma_count = line.matches(',').count();
        let semicolon_count = line.matches(';').count();

        if comma_count == 0 && semicolon_count == 0 {
            Delimiter::Whitespace
        } else if comma_count >= semicolon_count {
            Delimiter::Comma
        } else {
            Delimiter::Semicolon
        }
    }

    /// Split a line into trimmed, non-empty fields
    pub fn split<'a>(&self, line: &'a str) -> Vec<&'a str> {
        match self {
            Delimiter::Whitespace => line.split_whitespace().collect(),
            Delimiter::Comma => line.split(',').map(str::trim).filter(|s| !s.is_empty()).collect(),
            Delimiter::Semicolon => line.split(';').map(str::trim).filter(|s| !s.is_empty()).collect(),
        }
    }
}

pub struct XyzReader;
pub struct XyzWriter;

impl XyzReader {
    /// Parse XYZ content from any buffered reader
    pub fn read_from<R: BufRead>(reader: R) -> Result<PointSet> {
        let mut delimiter = None;
        let mut points = Vec::new();
        let mut raw_colors: Vec<Rgb> = Vec::new();
        let mut all_colored = true;

        for (line_index, line) in reader.lines().enumerate() {
            let line = line?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }

            let delimiter = *delimiter.get_or_insert_with(|| Delimiter::detect_from_line(trimmed));
            let fields = delimiter.split(trimmed);
            let values: std::result::Result<Vec<f32>, _> = fields.iter().map(|f| f.parse::<f32>()).collect();

            let values = match values {
                Ok(values) => values,
                Err(_) if points.is_empty() => {
                    tracing::debug!("skipping header line {}", line_index + 1);
                    continue;
                }
                Err(e) => {
                    return Err(Error::Parse(format!(
                        "line {}: invalid number ({})",
                        line_index + 1,
                        e
                    )))
                }
            };

            if values.len() < 3 {
                return Err(Error::Parse(format!(
                    "line {}: expected at least 3 columns, found {}",
                    line_index + 1,
                    values.len()
                )));
            }

            points.push(Point3f::new(values[0], values[1], values[2]));
            if values.len() >= 6 {
                raw_colors.push([values[3], values[4], values[5]]);
            } else {
                all_colored = false;
            }
        }

        let colors = if all_colored && !raw_colors.is_empty() {
            let max = raw_colors.iter().flatten().fold(f32::NEG_INFINITY, |m, &c| m.max(c));
            let divisor = if max > 1.0 { 255.0 } else { 1.0 };
            Some(
                raw_colors
                    .into_iter()
                    .map(|c| c.map(|v| (v / divisor).clamp(0.0, 1.0)))
                    .collect(),
            )
        } else {
            if !raw_colors.is_empty() {
                tracing::warn!("only some XYZ lines carry colors, ignoring colors");
            }
            None
        };

        tracing::debug!("read {} XYZ points", points.len());
        Ok(PointSet { points, colors })
    }
}

impl PointSetReader for XyzReader {
    fn read_point_set<P: AsRef<Path>>(path: P) -> Result<PointSet> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }
}

impl PointSetWriter for XyzWriter {
    /// Space separated, colors (when they match the points) as [0, 1] floats
    fn write_point_set<P: AsRef<Path>>(set: &PointSet, path: P) -> Result<()> {
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        let colors = set.colors.as_ref().filter(|_| set.has_matching_colors());

        for (i, p) in set.points.iter().enumerate() {
            match colors {
                Some(colors) => {
                    let [r, g, b] = colors[i];
                    writeln!(writer, "{} {} {} {} {} {}", p.x, p.y, p.z, r, g, b)?;
                }
                None => writeln!(writer, "{} {} {}", p.x, p.y, p.z)?,
            }
        }

        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_delimiter_detection() {
        assert_eq!(Delimiter::detect_from_line("1 2 3"), Delimiter::Whitespace);
        assert_eq!(Delimiter::detect_from_line("1\t2\t3"), Delimiter::Whitespace);
        assert_eq!(Delimiter::detect_from_line("1,2,3"), Delimiter::Comma);
        assert_eq!(Delimiter::detect_from_line("1;2;3"), Delimiter::Semicolon);
    }

    #[test]
    fn test_positions_only() {
        let set = XyzReader::read_from(Cursor::new("# scan\n0 0 0\n\n1 2 3\n")).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set[1], Point3f::new(1.0, 2.0, 3.0));
        assert!(set.colors.is_none());
    }

    #[test]
    fn test_byte_colors_are_scaled() {
        let set = XyzReader::read_from(Cursor::new("x,y,z,r,g,b\n0,0,0,255,0,0\n1,1,1,0,51,0\n")).unwrap();
        let colors = set.colors.unwrap();
        assert_eq!(colors[0], [1.0, 0.0, 0.0]);
        assert!((colors[1][1] - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_unit_colors_are_kept() {
        let set = XyzReader::read_from(Cursor::new("0 0 0 0.5 0.25 1.0\n")).unwrap();
        assert_eq!(set.colors.unwrap()[0], [0.5, 0.25, 1.0]);
    }

    #[test]
    fn test_mixed_rows_drop_colors() {
        let set = XyzReader::read_from(Cursor::new("0 0 0 1 1 1\n1 1 1\n")).unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.colors.is_none());
    }

    #[test]
    fn test_malformed_rows() {
        assert!(matches!(
            XyzReader::read_from(Cursor::new("0 0\n")),
            Err(Error::Parse(_))
        ));
        assert!(matches!(
            XyzReader::read_from(Cursor::new("0 0 0\n1 x 1\n")),
            Err(Error::Parse(_))
        ));
    }

    #[test]
    fn test_writer_skips_mismatched_colors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.xyz");
        let set = PointSet::with_colors(
            vec![Point3f::new(0.0, 0.0, 0.0), Point3f::new(1.0, 0.0, 0.0)],
            vec![[1.0, 0.0, 0.0]],
        );

        XyzWriter::write_point_set(&set, &path).unwrap();
        let read = XyzReader::read_point_set(&path).unwrap();
        assert_eq!(read.len(), 2);
        assert!(read.colors.is_none());
    }
}
