//! Cell locations from CellCounter marker files.
//!
//! Expected layout:
//!
//! ```xml
//! <CellCounter_Marker_File>
//!   <Marker_Data>
//!     <Marker_Type>
//!       <Type>1</Type>
//!       <Marker>
//!         <MarkerX>1865</MarkerX>
//!         <MarkerY>4995</MarkerY>
//!         <MarkerZ>3646</MarkerZ>
//!       </Marker>
//!     </Marker_Type>
//!   </Marker_Data>
//! </CellCounter_Marker_File>
//! ```
//!
//! Markers outside `Marker_Data` are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::debug;

use crate::error::{StateError, StateResult};

/// Location of one marked cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Z coordinate.
    pub z: f64,
}

impl Point {
    /// Creates a point.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Coordinate list as annotation layers take it: `[x, y, z]`.
    pub fn to_annotation(&self) -> Value {
        json!([self.x, self.y, self.z])
    }
}

/// Reads all markers of a marker file.
pub fn points_from_xml<P: AsRef<Path>>(path: P) -> StateResult<Vec<Point>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let points = parse_points(BufReader::new(file))?;
    debug!(path = %path.display(), count = points.len(), "read marker file");
    Ok(points)
}

#[derive(Default)]
struct PartialPoint {
    x: Option<f64>,
    y: Option<f64>,
    z: Option<f64>,
}

impl PartialPoint {
    fn set(&mut self, element: &str, text: &str) -> StateResult<()> {
        let slot = match element {
            "MarkerX" => &mut self.x,
            "MarkerY" => &mut self.y,
            "MarkerZ" => &mut self.z,
            _ => return Ok(()),
        };
        let value = text.trim().parse::<f64>().map_err(|_| {
            StateError::malformed(format!("{element} must be numeric"), Value::String(text.to_string()))
        })?;
        *slot = Some(value);
        Ok(())
    }

    fn finish(self) -> StateResult<Point> {
        match (self.x, self.y, self.z) {
            (Some(x), Some(y), Some(z)) => Ok(Point { x, y, z }),
            (x, y, z) => Err(StateError::malformed(
                "marker requires MarkerX, MarkerY and MarkerZ",
                json!({"x": x, "y": y, "z": z}),
            )),
        }
    }
}

/// Parses markers from XML.
pub fn parse_points<R: BufRead>(reader: R) -> StateResult<Vec<Point>> {
    let mut xml = Reader::from_reader(reader);
    xml.config_mut().trim_text(true);

    let mut buf = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<PartialPoint> = None;
    let mut points = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "Marker" && path.iter().any(|p| p == "Marker_Data") {
                    current = Some(PartialPoint::default());
                }
                path.push(name);
            }
            Event::Text(ref e) => {
                if let (Some(point), Some(element)) = (current.as_mut(), path.last()) {
                    let text = String::from_utf8_lossy(e.as_ref());
                    point.set(element, &text)?;
                }
            }
            Event::End(ref e) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "Marker" {
                    if let Some(point) = current.take() {
                        points.push(point.finish()?);
                    }
                }
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const MARKERS: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<CellCounter_Marker_File>
  <Image_Properties>
    <Image_Filename>cells.tif</Image_Filename>
  </Image_Properties>
  <Marker_Data>
    <Current_Type>1</Current_Type>
    <Marker_Type>
      <Type>1</Type>
      <Marker>
        <MarkerX>1865</MarkerX>
        <MarkerY>4995</MarkerY>
        <MarkerZ>3646</MarkerZ>
      </Marker>
      <Marker>
        <MarkerX>1865</MarkerX>
        <MarkerY>4985</MarkerY>
        <MarkerZ>3641</MarkerZ>
      </Marker>
    </Marker_Type>
  </Marker_Data>
</CellCounter_Marker_File>
"#;

    #[test]
    fn parses_markers_in_order() {
        let points = parse_points(MARKERS.as_bytes()).unwrap();
        assert_eq!(
            points,
            [Point::new(1865.0, 4995.0, 3646.0), Point::new(1865.0, 4985.0, 3641.0)]
        );
    }

    #[test]
    fn annotation_is_xyz_list() {
        let p = Point::new(1.0, 2.5, 3.0);
        assert_eq!(p.to_annotation(), json!([1.0, 2.5, 3.0]));
    }

    #[test]
    fn missing_coordinate() {
        let xml = "<CellCounter_Marker_File><Marker_Data><Marker_Type>\
                   <Marker><MarkerX>1</MarkerX><MarkerY>2</MarkerY></Marker>\
                   </Marker_Type></Marker_Data></CellCounter_Marker_File>";
        assert!(matches!(parse_points(xml.as_bytes()), Err(StateError::MalformedInput { .. })));
    }

    #[test]
    fn non_numeric_coordinate() {
        let xml = "<CellCounter_Marker_File><Marker_Data><Marker_Type>\
                   <Marker><MarkerX>one</MarkerX><MarkerY>2</MarkerY><MarkerZ>3</MarkerZ></Marker>\
                   </Marker_Type></Marker_Data></CellCounter_Marker_File>";
        assert!(matches!(parse_points(xml.as_bytes()), Err(StateError::MalformedInput { .. })));
    }

    #[test]
    fn mismatched_tags() {
        let xml = "<CellCounter_Marker_File><Marker_Data></Marker_Type></CellCounter_Marker_File>";
        assert!(parse_points(xml.as_bytes()).is_err());
    }

    #[test]
    fn reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MARKERS.as_bytes()).unwrap();
        let points = points_from_xml(file.path()).unwrap();
        assert_eq!(points.len(), 2);
    }
}
