//! Background, logo and numbered shape layers.

use tracing::debug;

use super::{members, Bucket, CssRule, LayoutContext};
use crate::assets::sanitize_filename;
use crate::color::{sample_color, SampleMode};
use crate::error::ExtractionError;
use crate::shape::ShapeStyle;
use crate::types::{css_rgb, LayerNode, Rgb};

/// Dominant opaque color of the layer's pixels, else its declared fill.
pub(super) fn dominant_color(layer: &LayerNode) -> Option<Rgb> {
    layer
        .raster
        .as_ref()
        .and_then(|r| sample_color(r, SampleMode::DominantOpaque))
        .or_else(|| layer.shape().and_then(|s| s.fill))
}

/// Color of the first shape or pixel member of a group.
pub(super) fn group_color(layer: &LayerNode) -> Option<Rgb> {
    members(layer)
        .into_iter()
        .filter(|m| !m.is_group() && m.text().is_none())
        .find_map(dominant_color)
}

impl LayoutContext<'_> {
    pub(super) fn background(&mut self, layer: &LayerNode) -> Result<(), ExtractionError> {
        if layer.is_group() {
            debug!(layer = %layer.name, "background group has no single color");
            return Ok(());
        }
        let color = layer
            .shape()
            .and_then(|s| s.fill)
            .or_else(|| {
                layer
                    .raster
                    .as_ref()
                    .and_then(|r| sample_color(r, SampleMode::Mean))
            })
            .ok_or_else(|| ExtractionError::NoRaster {
                layer: layer.name.clone(),
            })?;
        debug!(color = %css_rgb(color), "container background");
        self.layout.background = Some(color);
        Ok(())
    }

    pub(super) fn logo(&mut self, layer: &LayerNode) -> Result<(), ExtractionError> {
        if self.logo_done {
            debug!(layer = %layer.name, "logo already placed");
            return Ok(());
        }
        let (source, raster) = members(layer)
            .into_iter()
            .find_map(|m| m.raster.as_ref().map(|r| (m, r)))
            .ok_or_else(|| ExtractionError::NoRaster {
                layer: layer.name.clone(),
            })?;

        let file = self
            .options
            .assets
            .save_png(raster, &sanitize_filename(&source.name))
            .map_err(|source| ExtractionError::Asset {
                layer: layer.name.clone(),
                source,
            })?;
        self.logo_done = true;

        self.layout.push(
            Bucket::Logo,
            format!(
                "<div class=\"logo\">\n<img src=\"images/{file}\" alt=\"logo\" id=\"sd_img_Logo\"/>\n</div>"
            ),
        );

        let area = self.logo_area.unwrap_or(source.bounds);
        let justify = if self.options.standard_size {
            "center"
        } else {
            "flex-start"
        };
        self.layout.rules.push(
            CssRule::new(".logo")
                .px("width", area.width() - 3)
                .px("height", area.height() - 3)
                .decl("position", "absolute")
                .px("left", area.x1)
                .px("top", area.y1)
                .decl("display", "flex")
                .decl("align-items", "center")
                .decl("justify-content", justify),
        );
        self.layout.rules.push(
            CssRule::new(".logo img")
                .px("max-width", area.width() - 3)
                .px("max-height", area.height() - 3),
        );
        Ok(())
    }

    pub(super) fn shape(&mut self, layer: &LayerNode) -> Result<(), ExtractionError> {
        let source = members(layer)
            .into_iter()
            .find(|m| !m.is_group() && m.visible)
            .ok_or_else(|| ExtractionError::missing(&layer.name, "shape layer"))?;

        self.shape_count += 1;
        let n = self.shape_count;
        let color = dominant_color(source)
            .map(css_rgb)
            .unwrap_or_else(|| "transparent".to_string());
        let style = self.options.shapes.style_for_layer(source);

        self.layout.push(
            Bucket::Shapes,
            format!("<div class=\"shape{n} animate_fadeIn delay_0s\" id=\"sd_bgcolor_Shape-{n}\">\n</div>"),
        );

        let b = source.bounds;
        let mut rule = CssRule::new(format!(".shape{n}"))
            .px("width", b.width() - 1)
            .px("height", b.height() - 1)
            .decl("position", "absolute")
            .px("left", b.x1)
            .px("top", b.y1)
            .decl("background-color", color);
        rule = match style {
            ShapeStyle::BorderRadius(radii) => rule.decl("border-radius", radii.to_css()),
            ShapeStyle::Clip(None) => rule.decl("border-radius", "initial"),
            ShapeStyle::Clip(Some(clip)) => {
                let clip = clip.to_css();
                rule.decl("border-radius", "initial")
                    .decl("clip-path", clip.clone())
                    .decl("-webkit-clip-path", clip)
            }
        };
        self.layout.rules.push(rule);
        debug!(layer = %layer.name, shape = n, "placed shape");
        Ok(())
    }
}
