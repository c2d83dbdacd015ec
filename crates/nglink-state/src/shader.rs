//! GLSL shader source for image layers.
//!
//! Image layers get a two-control shader: a color picker and a normalized
//! intensity range. The emitter selects the output function, e.g. `RGB`
//! produces a call to `emitRGB`.
//!
//! # Example
//!
//! ```
//! use nglink_state::{Emitter, ShaderSpec};
//!
//! let shader = ShaderSpec::new("green", Emitter::Rgb, "vec3").render();
//! assert_eq!(
//!     shader,
//!     "#uicontrol vec3 color color(default=\"green\")\n\
//!      #uicontrol invlerp normalized\n\
//!      void main() {\n\
//!      emitRGB(color * normalized());\n\
//!      }"
//! );
//! ```

use std::fmt;
use std::str::FromStr;

use serde_json::Value;

use crate::error::{StateError, StateResult};

/// Viewer emit functions a generated shader may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Emitter {
    /// `emitRGB`
    Rgb,
    /// `emitRGBA`
    Rgba,
    /// `emitGrayscale`
    Grayscale,
    /// `emitTransparent`
    Transparent,
}

impl Emitter {
    /// Suffix appended to `emit` in the shader body.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rgb => "RGB",
            Self::Rgba => "RGBA",
            Self::Grayscale => "Grayscale",
            Self::Transparent => "Transparent",
        }
    }
}

impl fmt::Display for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Emitter {
    type Err = StateError;

    fn from_str(s: &str) -> StateResult<Self> {
        match s {
            "RGB" => Ok(Self::Rgb),
            "RGBA" => Ok(Self::Rgba),
            "Grayscale" => Ok(Self::Grayscale),
            "Transparent" => Ok(Self::Transparent),
            _ => Err(StateError::UnsupportedEmitter {
                emitter: s.to_string(),
            }),
        }
    }
}

/// Color, emitter and color-control type of a generated shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSpec {
    /// Default color of the color control, e.g. `"green"` or `"#ff0000"`.
    pub color: String,
    /// Output function.
    pub emitter: Emitter,
    /// GLSL type of the color control, usually `vec3`.
    pub vec: String,
}

impl ShaderSpec {
    /// Creates a shader spec.
    pub fn new(color: impl Into<String>, emitter: Emitter, vec: impl Into<String>) -> Self {
        Self {
            color: color.into(),
            emitter,
            vec: vec.into(),
        }
    }

    /// Parses `{color, emitter, vec}` from a description object.
    pub fn from_value(value: &Value) -> StateResult<Self> {
        let field = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .ok_or_else(|| StateError::malformed(format!("shader requires a string '{key}'"), value.clone()))
        };

        Ok(Self {
            color: field("color")?.to_string(),
            emitter: field("emitter")?.parse()?,
            vec: field("vec")?.to_string(),
        })
    }

    /// Renders the shader source.
    pub fn render(&self) -> String {
        let ui_controls = [
            format!("#uicontrol {} color color(default=\"{}\")", self.vec, self.color),
            "#uicontrol invlerp normalized".to_string(),
        ];

        let mut shader = String::new();
        for control in &ui_controls {
            shader.push_str(control);
            shader.push('\n');
        }
        shader.push_str(&format!(
            "void main() {{\nemit{}(color * normalized());\n}}",
            self.emitter
        ));
        shader
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn render_red_rgb() {
        let spec = ShaderSpec::from_value(&json!({"color": "red", "emitter": "RGB", "vec": "vec3"})).unwrap();
        let shader = spec.render();
        let lines: Vec<_> = shader.lines().collect();
        assert_eq!(
            lines,
            [
                "#uicontrol vec3 color color(default=\"red\")",
                "#uicontrol invlerp normalized",
                "void main() {",
                "emitRGB(color * normalized());",
                "}",
            ]
        );
        assert!(!shader.ends_with('\n'));
    }

    #[test]
    fn emitter_selects_function() {
        let shader = ShaderSpec::new("white", Emitter::Grayscale, "vec3").render();
        assert!(shader.contains("emitGrayscale(color * normalized());"));
    }

    #[test]
    fn unknown_emitter_fails_fast() {
        let err = ShaderSpec::from_value(&json!({"color": "red", "emitter": "RGB(); evil", "vec": "vec3"}))
            .unwrap_err();
        assert!(matches!(err, StateError::UnsupportedEmitter { .. }));
    }

    #[test]
    fn missing_field() {
        let err = ShaderSpec::from_value(&json!({"color": "red", "vec": "vec3"})).unwrap_err();
        assert!(matches!(err, StateError::MalformedInput { .. }));
    }
}
