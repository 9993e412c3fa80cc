//! Core types used throughout the converter.
//!
//! - [`document`] - the decoded layer tree ([`Document`], [`LayerNode`], [`LayerKind`])
//! - [`style`] - values produced while styling layers ([`ClipPath`], [`Rgb`])

pub mod document;
pub mod style;

pub use document::{
    Bounds, CornerRadii, Document, LayerKind, LayerNode, Origination, ShapeData, TextData,
};
pub use style::{css_rgb, ClipPath, Rgb};
