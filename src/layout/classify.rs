//! Layer-name vocabulary.
//!
//! Classification is a table lookup: every pattern that occurs in the layer
//! name is collected, patterns contained in a longer matched pattern are
//! dropped (`logoArea` beats `logo`, `hero 2` beats `hero`), and whatever is
//! left must name exactly one role.

use serde::Serialize;

use crate::error::ExtractionError;
use crate::types::{Bounds, Document, LayerNode};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
    Background,
    LogoArea,
    Logo,
    Shape(u8),
    ContentArea,
    MainHeading,
    SubHeading,
    Offer,
    ContactWrap,
    ContactArea,
    ContactBackground,
    Hero,
    Hero2,
    Cta,
    ImageWrap,
    ImageBorder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    Contains,
    Exact,
}

pub const PATTERNS: &[(&str, MatchKind, Role)] = &[
    ("bg", MatchKind::Exact, Role::Background),
    ("logoArea", MatchKind::Contains, Role::LogoArea),
    ("logo", MatchKind::Contains, Role::Logo),
    ("shape 1", MatchKind::Contains, Role::Shape(1)),
    ("shape 2", MatchKind::Contains, Role::Shape(2)),
    ("shape 3", MatchKind::Contains, Role::Shape(3)),
    ("shape 4", MatchKind::Contains, Role::Shape(4)),
    ("shape 5", MatchKind::Contains, Role::Shape(5)),
    ("shape 6", MatchKind::Contains, Role::Shape(6)),
    ("contentArea", MatchKind::Contains, Role::ContentArea),
    ("mainHeading", MatchKind::Contains, Role::MainHeading),
    ("subHeading", MatchKind::Contains, Role::SubHeading),
    ("offer", MatchKind::Contains, Role::Offer),
    ("contactWrap", MatchKind::Contains, Role::ContactWrap),
    ("contactArea", MatchKind::Contains, Role::ContactArea),
    ("contactBackground", MatchKind::Contains, Role::ContactBackground),
    ("hero 2", MatchKind::Contains, Role::Hero2),
    ("hero", MatchKind::Contains, Role::Hero),
    ("cta", MatchKind::Contains, Role::Cta),
    ("imageWrap1", MatchKind::Contains, Role::ImageWrap),
    ("imageWrap", MatchKind::Contains, Role::ImageWrap),
    ("imageBorder", MatchKind::Contains, Role::ImageBorder),
];

pub fn classify(name: &str) -> Result<Option<Role>, ExtractionError> {
    let matched: Vec<(&str, Role)> = PATTERNS
        .iter()
        .filter(|(pattern, kind, _)| match kind {
            MatchKind::Contains => name.contains(pattern),
            MatchKind::Exact => name == *pattern,
        })
        .map(|(pattern, _, role)| (*pattern, *role))
        .collect();

    let mut roles: Vec<Role> = Vec::new();
    for (pattern, role) in &matched {
        let subsumed = matched
            .iter()
            .any(|(other, _)| other.len() > pattern.len() && other.contains(pattern));
        if !subsumed && !roles.contains(role) {
            roles.push(*role);
        }
    }

    match roles.as_slice() {
        [] => Ok(None),
        [role] => Ok(Some(*role)),
        many => Err(ExtractionError::AmbiguousLayerName {
            layer: name.to_string(),
            roles: many
                .iter()
                .map(|r| format!("{r:?}"))
                .collect::<Vec<_>>()
                .join(", "),
        }),
    }
}

/// One node of the `inspect` report.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassifiedLayer {
    pub name: String,
    pub kind: &'static str,
    pub bounds: Bounds,
    pub visible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ClassifiedLayer>,
}

/// Classifies the whole tree, children listed in processing order.
pub fn classify_tree(doc: &Document) -> Vec<ClassifiedLayer> {
    doc.layers.iter().map(classify_node).collect()
}

fn classify_node(layer: &LayerNode) -> ClassifiedLayer {
    let (role, error) = match classify(&layer.name) {
        Ok(role) => (role, None),
        Err(err) => (None, Some(err.to_string())),
    };
    ClassifiedLayer {
        name: layer.name.clone(),
        kind: layer.kind_name(),
        bounds: layer.bounds,
        visible: layer.visible,
        role,
        error,
        children: layer.children_back_to_front().map(classify_node).collect(),
    }
}
