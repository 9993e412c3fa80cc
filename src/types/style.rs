use std::fmt::Write as _;

pub type Rgb = palette::Srgb<u8>;

/// CSS functional notation, e.g. `rgb(12, 34, 56)`.
pub fn css_rgb(color: Rgb) -> String {
    format!("rgb({}, {}, {})", color.red, color.green, color.blue)
}

/// A derived CSS clip-path.
///
/// "No clip needed" (plain rectangles) is represented by the absence of a
/// `ClipPath`, not by a variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ClipPath {
    /// Extraction failed; the element keeps whatever it inherits.
    Inherit,
    /// Vertex list in element-local pixels.
    Polygon(Vec<(f64, f64)>),
    Circle { radius: f64, cx: f64, cy: f64 },
    /// Rotated ellipse sampled densely as a polygon.
    Ellipse(Vec<(f64, f64)>),
}

impl ClipPath {
    pub fn to_css(&self) -> String {
        match self {
            ClipPath::Inherit => "inherit".to_string(),
            ClipPath::Circle { radius, cx, cy } => {
                format!("circle({radius:.1}px at {cx:.1}px {cy:.1}px)")
            }
            ClipPath::Polygon(points) | ClipPath::Ellipse(points) => {
                let mut css = String::from("polygon(");
                for (i, (x, y)) in points.iter().enumerate() {
                    if i > 0 {
                        css.push_str(", ");
                    }
                    let _ = write!(css, "{x:.1}px {y:.1}px");
                }
                css.push(')');
                css
            }
        }
    }
}
