//! Layer classification and layout building.
//!
//! [`build_layout`] walks one decoded document in two passes. The anchor pass
//! records the content-area origin and the logo box; the main pass dispatches
//! every classified layer to its handler, which appends HTML fragments to a
//! [`Bucket`] and CSS rules to the shared rule list. Handlers contain their
//! own failures: an [`ExtractionError`] is logged and the document goes on.

pub mod classify;
mod css;
mod graphics;
mod hero;
mod text;

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::{debug, warn};

use crate::assets::AssetWriter;
use crate::error::ExtractionError;
use crate::shape::ShapeExtractor;
use crate::types::{Bounds, Document, LayerNode, Rgb};

pub use classify::{classify, classify_tree, ClassifiedLayer, MatchKind, Role, PATTERNS};
pub use css::CssRule;

/// Semantic destination of an HTML fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Bucket {
    Shapes,
    Logo,
    MainHeading,
    SubHeading,
    Offer,
    ContactWrap,
    Cta,
    MainImages,
}

/// Per-document inputs the handlers need besides the layer tree.
#[derive(Debug, Clone, Copy)]
pub struct LayoutOptions<'a> {
    pub click_through_url: &'a str,
    /// Document dimensions match one of the configured standard ad sizes.
    pub standard_size: bool,
    pub document_width: u32,
    pub assets: &'a AssetWriter,
    pub shapes: ShapeExtractor<'a>,
}

/// Everything the page assembler needs from one document.
#[derive(Debug, Default)]
pub struct Layout {
    pub background: Option<Rgb>,
    pub rules: Vec<CssRule>,
    buckets: BTreeMap<Bucket, Vec<String>>,
}

impl Layout {
    pub fn fragments(&self, bucket: Bucket) -> &[String] {
        self.buckets.get(&bucket).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First rule with the given selector.
    pub fn rule(&self, selector: &str) -> Option<&CssRule> {
        self.rules.iter().find(|r| r.selector() == selector)
    }

    fn push(&mut self, bucket: Bucket, fragment: String) {
        self.buckets.entry(bucket).or_default().push(fragment);
    }
}

/// Mutable traversal state for one document.
struct LayoutContext<'a> {
    options: &'a LayoutOptions<'a>,
    origin: (i32, i32),
    logo_area: Option<Bounds>,
    logo_done: bool,
    shape_count: u32,
    layout: Layout,
}

/// Builds the fragment buckets and stylesheet rules for `doc`.
pub fn build_layout<'a>(doc: &Document, options: &'a LayoutOptions<'a>) -> Layout {
    let mut ctx = LayoutContext {
        options,
        origin: (0, 0),
        logo_area: None,
        logo_done: false,
        shape_count: 0,
        layout: Layout::default(),
    };
    ctx.locate_anchors(&doc.layers);

    for layer in &doc.layers {
        if layer.transparency_locked {
            debug!(layer = %layer.name, "skipping transparency-locked layer");
            continue;
        }
        ctx.visit(layer);
    }
    ctx.layout
}

/// Depth-first order: top-level layers as stored, group children reversed.
fn processing_order(layers: &[LayerNode]) -> Vec<&LayerNode> {
    fn push<'d>(layer: &'d LayerNode, out: &mut Vec<&'d LayerNode>) {
        out.push(layer);
        for child in layer.children_back_to_front() {
            push(child, out);
        }
    }
    let mut out = Vec::new();
    for layer in layers {
        push(layer, &mut out);
    }
    out
}

/// A classified group's members in processing order; a classified leaf is
/// its own single member.
fn members(layer: &LayerNode) -> Vec<&LayerNode> {
    if layer.is_group() {
        layer.children_back_to_front().collect()
    } else {
        vec![layer]
    }
}

fn role_of(layer: &LayerNode) -> Option<Role> {
    classify(&layer.name).ok().flatten()
}

impl<'a> LayoutContext<'a> {
    fn locate_anchors(&mut self, layers: &[LayerNode]) {
        let order = processing_order(layers);

        match order.iter().find(|l| role_of(l) == Some(Role::ContentArea)) {
            Some(area) => {
                let b = area.bounds;
                self.origin = (b.x1, b.y1);
                self.layout.rules.push(
                    CssRule::new(".contentSection")
                        .px("width", b.width())
                        .px("height", b.height())
                        .decl("position", "relative")
                        .px("left", b.x1)
                        .px("top", b.y1)
                        .decl("overflow", "hidden"),
                );
                debug!(x = b.x1, y = b.y1, "content origin");
            }
            None => warn!("no contentArea layer; text is positioned from the document origin"),
        }

        self.logo_area = order
            .iter()
            .find(|l| role_of(l) == Some(Role::LogoArea))
            .map(|l| l.bounds);
    }

    fn visit(&mut self, layer: &LayerNode) {
        let role = match classify(&layer.name) {
            Ok(role) => role,
            Err(err) => {
                warn!(error = %err, "skipping ambiguous layer");
                return;
            }
        };
        let Some(role) = role else {
            if layer.is_group() {
                for child in layer.children_back_to_front() {
                    self.visit(child);
                }
            } else {
                debug!(layer = %layer.name, "unclassified layer");
            }
            return;
        };
        if let Err(err) = self.dispatch(role, layer) {
            warn!(layer = %layer.name, ?role, error = %err, "layer skipped");
        }
    }

    fn dispatch(&mut self, role: Role, layer: &LayerNode) -> Result<(), ExtractionError> {
        match role {
            Role::Background => self.background(layer),
            Role::Logo => self.logo(layer),
            Role::Shape(_) => self.shape(layer),
            Role::MainHeading => self.main_heading(layer),
            Role::SubHeading => self.sub_heading(layer),
            Role::Offer => self.offer(layer),
            Role::ContactWrap => self.contact_wrap(layer),
            Role::Cta => self.cta(layer),
            Role::Hero => self.hero(layer, hero::HeroGroup::First),
            Role::Hero2 => self.hero(layer, hero::HeroGroup::Second),
            // Consumed by the anchor pass.
            Role::ContentArea | Role::LogoArea => Ok(()),
            Role::ContactArea | Role::ContactBackground | Role::ImageWrap | Role::ImageBorder => {
                debug!(layer = %layer.name, ?role, "ignoring layer outside its parent group");
                Ok(())
            }
        }
    }

    /// Converts document coordinates to content-section coordinates.
    fn relative(&self, x: i32, y: i32) -> (i32, i32) {
        (x - self.origin.0, y - self.origin.1)
    }
}
