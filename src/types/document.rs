//! The decoded design document.
//!
//! The tree is produced once by a [`crate::decode::DocumentDecoder`] and only
//! ever read afterwards. Child order is the stored (front-to-back) order; the
//! layout builder is responsible for walking it back-to-front.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

use super::style::Rgb;

/// Layer bounding box in document pixel space (`x2`/`y2` exclusive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Bounds {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }
}

#[derive(Debug, Clone)]
pub struct Document {
    /// Document name without the file suffix; names the output directory.
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub layers: Vec<LayerNode>,
}

#[derive(Debug, Clone)]
pub struct LayerNode {
    pub name: String,
    pub bounds: Bounds,
    pub visible: bool,
    pub transparency_locked: bool,
    /// Rendered pixels, sized to `bounds`.
    pub raster: Option<RgbaImage>,
    pub kind: LayerKind,
}

#[derive(Debug, Clone)]
pub enum LayerKind {
    Group(Vec<LayerNode>),
    Raster { smart_object: bool },
    VectorShape(ShapeData),
    Text(TextData),
}

impl LayerNode {
    pub fn children(&self) -> &[LayerNode] {
        match &self.kind {
            LayerKind::Group(children) => children,
            _ => &[],
        }
    }

    /// Children in processing order (last stored child first).
    pub fn children_back_to_front(&self) -> impl Iterator<Item = &LayerNode> {
        self.children().iter().rev()
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, LayerKind::Group(_))
    }

    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            LayerKind::Group(_) => "group",
            LayerKind::Raster {
                smart_object: false,
            } => "pixel",
            LayerKind::Raster { smart_object: true } => "smartobject",
            LayerKind::VectorShape(_) => "shape",
            LayerKind::Text(_) => "type",
        }
    }

    pub fn shape(&self) -> Option<&ShapeData> {
        match &self.kind {
            LayerKind::VectorShape(shape) => Some(shape),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&TextData> {
        match &self.kind {
            LayerKind::Text(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ShapeData {
    /// Live-shape descriptors the shape was drawn from, if any.
    pub origination: Vec<Origination>,
    /// Declared solid fill.
    pub fill: Option<Rgb>,
}

impl ShapeData {
    pub fn rounded_rectangle(&self) -> Option<CornerRadii> {
        self.origination.iter().find_map(|o| match o {
            Origination::RoundedRectangle(radii) => Some(*radii),
            Origination::Other(_) => None,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Origination {
    RoundedRectangle(CornerRadii),
    Other(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CornerRadii {
    #[serde(default)]
    pub top_left: f64,
    #[serde(default)]
    pub top_right: f64,
    #[serde(default)]
    pub bottom_right: f64,
    #[serde(default)]
    pub bottom_left: f64,
}

impl CornerRadii {
    pub fn uniform(radius: f64) -> Self {
        Self {
            top_left: radius,
            top_right: radius,
            bottom_right: radius,
            bottom_left: radius,
        }
    }

    pub fn to_css(&self) -> String {
        format!(
            "{}px {}px {}px {}px",
            self.top_left, self.top_right, self.bottom_right, self.bottom_left
        )
    }
}

/// Raw text-layer metadata as stored by the design tool.
#[derive(Debug, Clone)]
pub struct TextData {
    pub text: String,
    /// Engine dictionary (`StyleRun`, `ParagraphRun`, ...).
    pub engine: serde_json::Value,
    /// Font set names in resource order.
    pub fonts: Vec<String>,
    /// Affine transform `[xx, xy, yx, yy, tx, ty]`.
    pub transform: Option<[f64; 6]>,
}
