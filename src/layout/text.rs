//! Text groups: headings, offer, contact lines and the call-to-action.

use tracing::{debug, warn};

use super::graphics::group_color;
use super::{members, role_of, Bucket, CssRule, LayoutContext, Role};
use crate::error::ExtractionError;
use crate::html::{escape, escape_attr};
use crate::types::{css_rgb, Bounds, LayerNode};
use crate::typography::{resolve_text_layer, TextStyle};

/// Fade-in delay of the first sub-heading and the step between runs.
const SUB_HEADING_DELAY: u32 = 4;
/// Fade-out delay of the first sub-heading wrapper.
const SUB_HEADING_FADE_OUT: u32 = 7;
/// CTA border radius is expressed relative to a 16px root font size.
const CTA_RADIUS_BASE: f64 = 16.0;
/// Share of the container width a standard-size CTA button may take.
const CTA_MAX_WIDTH_RATIO: f64 = 0.8;

/// Text members of a group with their resolved style; failures are logged
/// and the member dropped.
fn styled_texts(layer: &LayerNode) -> Vec<(&LayerNode, TextStyle)> {
    members(layer)
        .into_iter()
        .filter(|m| m.text().is_some())
        .filter_map(|m| match resolve_text_layer(m) {
            Ok(style) => Some((m, style)),
            Err(err) => {
                warn!(error = %err, "text layer skipped");
                None
            }
        })
        .collect()
}

/// Typography declarations shared by every text rule.
fn typography(rule: CssRule, style: &TextStyle) -> CssRule {
    let face = &style.font.face;
    rule.decl("font-family", format!("'{}', serif", face.family))
        .decl("font-weight", face.weight.to_string())
        .decl("font-style", face.style.as_css())
        .decl("font-size", format!("{:.2}px", style.font.font_size_px))
        .decl("color", css_rgb(style.color))
        .decl("line-height", format!("{:.2}em", style.font.line_height_em))
        .decl("text-align", style.align.as_css())
}

impl LayoutContext<'_> {
    fn text_rule(&self, selector: &str, bounds: Bounds, style: &TextStyle) -> CssRule {
        let (left, top) = self.relative(bounds.x1, bounds.y1);
        let rule = CssRule::new(selector)
            .px("width", bounds.width())
            .px("height", bounds.height())
            .decl("position", "absolute")
            .px("left", left)
            .px("top", top);
        typography(rule, style)
    }

    pub(super) fn main_heading(&mut self, layer: &LayerNode) -> Result<(), ExtractionError> {
        let texts = styled_texts(layer);
        let Some((_, first)) = texts.first() else {
            return Err(ExtractionError::missing(&layer.name, "text layer"));
        };
        let rule = self.text_rule(".mainHeading", layer.bounds, first);
        for (_, style) in &texts {
            self.layout.push(
                Bucket::MainHeading,
                format!(
                    "<div class=\"textWrap animate_fadeOut delay_3s\"><div class=\"mainHeading animate_fadeIn delay_0s\" id=\"sd_txta_Heading\">\n{}\n</div></div>",
                    escape(&style.text)
                ),
            );
        }
        self.layout.rules.push(rule);
        Ok(())
    }

    pub(super) fn sub_heading(&mut self, layer: &LayerNode) -> Result<(), ExtractionError> {
        let texts = styled_texts(layer);
        let Some((_, first)) = texts.first() else {
            return Err(ExtractionError::missing(&layer.name, "text layer"));
        };
        let rule = self.text_rule(".subHeading1,.subHeading2,.subHeading3", layer.bounds, first);

        let count = texts.len() as u32;
        for (i, (_, style)) in (1u32..).zip(&texts) {
            let step = SUB_HEADING_DELAY * (i - 1);
            let fade_out = if i < count {
                format!(" animate_fadeOut delay_{}s", SUB_HEADING_FADE_OUT + step)
            } else {
                String::new()
            };
            self.layout.push(
                Bucket::SubHeading,
                format!(
                    "<div class=\"textWrap{fade_out}\"><div class=\"subHeading{i} animate_fadeIn delay_{}s\" id=\"sd_txta_Sub-Heading-{i}\">\n{}\n</div></div>",
                    SUB_HEADING_DELAY + step,
                    escape(&style.text)
                ),
            );
        }
        self.layout.rules.push(rule);
        Ok(())
    }

    pub(super) fn offer(&mut self, layer: &LayerNode) -> Result<(), ExtractionError> {
        let texts = styled_texts(layer);
        let Some((_, first)) = texts.first() else {
            return Err(ExtractionError::missing(&layer.name, "text layer"));
        };
        let rule = self.text_rule(".offerBox", layer.bounds, first);
        for (_, style) in &texts {
            self.layout.push(
                Bucket::Offer,
                format!(
                    "<div class=\"offerwrap animate_fadeIn delay_0s\"><div class=\"offerBox\" id=\"sd_txta_Offer-text\">\n{}\n</div></div>",
                    escape(&style.text)
                ),
            );
        }
        self.layout.rules.push(rule);
        Ok(())
    }

    /// Background box, telephone line and email line.
    pub(super) fn contact_wrap(&mut self, layer: &LayerNode) -> Result<(), ExtractionError> {
        let mut line_width = None;
        for member in members(layer) {
            match role_of(member) {
                Some(Role::ContactBackground) => {
                    let b = member.bounds;
                    let background = group_color(layer)
                        .map(css_rgb)
                        .unwrap_or_else(|| "transparent".to_string());
                    self.layout.rules.push(
                        CssRule::new(".contactWrap")
                            .px("width", b.width())
                            .px("height", b.height())
                            .decl("position", "absolute")
                            .px("left", b.x1)
                            .px("top", b.y1)
                            .decl("background", background),
                    );
                }
                Some(Role::ContactArea) => line_width = Some(member.bounds.width() - 2),
                _ => {}
            }
        }

        let texts = styled_texts(layer);
        if texts.is_empty() {
            return Err(ExtractionError::missing(&layer.name, "text layer"));
        }
        if texts.len() > 2 {
            debug!(layer = %layer.name, extra = texts.len() - 2, "only telephone and email lines are placed");
        }

        let mut html = String::from("<div class=\"contactWrap\" id=\"sd_bgcolor_Contact-Background\">\n");
        for ((member, style), (class, id)) in texts.iter().zip([("tel", "Tel"), ("email", "Email")]) {
            html.push_str(&format!(
                "<div class=\"{class}\" id=\"sd_txta-{id}\">\n{}\n</div>\n",
                escape(&style.text)
            ));

            let b = member.bounds;
            let (left, top) = self.relative(b.x1, b.y1);
            let rule = CssRule::new(format!(".{class}"))
                .px("width", line_width.unwrap_or_else(|| b.width()))
                .px("height", b.height());
            self.layout.rules.push(
                typography(rule, style)
                    .decl("position", "absolute")
                    .px("left", left)
                    .px("top", top),
            );
        }
        html.push_str("</div>");
        self.layout.push(Bucket::ContactWrap, html);
        Ok(())
    }

    pub(super) fn cta(&mut self, layer: &LayerNode) -> Result<(), ExtractionError> {
        let texts = styled_texts(layer);
        let Some((_, style)) = texts.first() else {
            return Err(ExtractionError::missing(&layer.name, "text layer"));
        };

        let radius_em = members(layer)
            .into_iter()
            .find_map(|m| m.shape().and_then(|s| s.rounded_rectangle()))
            .map(|radii| radii.top_left / CTA_RADIUS_BASE)
            .unwrap_or(0.0);
        let background = group_color(layer)
            .map(css_rgb)
            .unwrap_or_else(|| "transparent".to_string());

        self.layout.push(
            Bucket::Cta,
            format!(
                "<div class=\"cta animate_fadeIn delay_5s\">\n<a class=\"button\" id=\"sd_btn_Click-Through-URL\" target=\"_blank\" href=\"{}\">{}\n</a>\n</div>",
                escape_attr(self.options.click_through_url),
                escape(&style.text)
            ),
        );

        let b = layer.bounds;
        let (left, top) = self.relative(b.x1, b.y1);
        let container_width = self.options.document_width as i32 - 1;
        let mut cta = CssRule::new(".cta");
        let max_width;
        if self.options.standard_size {
            max_width = container_width as f64 * CTA_MAX_WIDTH_RATIO;
            cta = cta
                .px("width", container_width)
                .decl("display", "flex")
                .decl("position", "absolute")
                .px("left", 0)
                .px("top", top)
                .decl("justify-content", "center");
        } else {
            max_width = (b.width() + 2) as f64;
            cta = cta
                .decl("width", "auto")
                .decl("display", "flex")
                .decl("position", "absolute")
                .px("left", left)
                .px("top", top)
                .decl("text-align", "center");
        }
        self.layout.rules.push(cta);

        let face = &style.font.face;
        self.layout.rules.push(
            CssRule::new(".button")
                .px("min-width", b.width())
                .decl("max-width", format!("{max_width:.2}px"))
                .px("max-height", b.height() - 2)
                .decl("font-size", format!("{:.2}px", style.font.font_size_px))
                .decl("font-family", format!("'{}', serif", face.family))
                .decl("font-weight", face.weight.to_string())
                .decl("font-style", face.style.as_css())
                .decl("cursor", "pointer")
                .decl("color", css_rgb(style.color))
                .decl("display", "inline-flex")
                .decl("align-items", "center")
                .decl("justify-content", "center")
                .decl("background-color", background)
                .decl("padding", "0.5em 0.65em 0.51em")
                .decl("text-align", "center")
                .decl("line-height", format!("{:.2}em", style.font.line_height_em))
                .decl("border-radius", format!("{radius_em:.2}em")),
        );
        Ok(())
    }
}
