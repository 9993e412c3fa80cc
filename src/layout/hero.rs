//! Hero image groups.

use tracing::{debug, warn};

use super::{members, role_of, Bucket, CssRule, LayoutContext, Role};
use crate::assets::{crop_to_mask, dashed_name, sanitize_filename};
use crate::error::ExtractionError;
use crate::shape::ShapeStyle;
use crate::types::{Bounds, ClipPath, LayerKind, LayerNode};

/// Images past this index are shown without an entrance animation.
const ANIMATED_IMAGES: u32 = 3;
const IMAGE_DELAY_STEP: u32 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum HeroGroup {
    First,
    Second,
}

impl HeroGroup {
    fn class_suffix(self) -> &'static str {
        match self {
            HeroGroup::First => "",
            HeroGroup::Second => "2",
        }
    }

    /// `delay_4s` for the first group, `delay_4_5s` for the second so the
    /// two slideshows interleave.
    fn delay_class(self, index: u32) -> String {
        let seconds = IMAGE_DELAY_STEP * (index - 1);
        match self {
            HeroGroup::First => format!("delay_{seconds}s"),
            HeroGroup::Second => format!("delay_{seconds}_5s"),
        }
    }

    fn file_stem(self, name: &str, index: u32) -> String {
        match self {
            HeroGroup::First => dashed_name(name),
            HeroGroup::Second => format!("{}{index}", dashed_name(name)),
        }
    }
}

/// Mask geometry and silhouette shared by every image of one group.
struct Mask {
    bounds: Bounds,
    border_radius: String,
    clip: Option<ClipPath>,
}

impl Mask {
    fn plain(bounds: Bounds) -> Self {
        Self {
            bounds,
            border_radius: "initial".to_string(),
            clip: None,
        }
    }
}

impl LayoutContext<'_> {
    pub(super) fn hero(&mut self, layer: &LayerNode, group: HeroGroup) -> Result<(), ExtractionError> {
        let suffix = group.class_suffix();
        let alt = sanitize_filename(&layer.name);
        let members = members(layer);
        let mask = self.hero_mask(layer, &members);
        let mut index = 0u32;

        for member in members {
            if matches!(role_of(member), Some(Role::ImageWrap | Role::ImageBorder)) {
                continue;
            }
            if !matches!(member.kind, LayerKind::Raster { .. }) || !member.visible {
                debug!(layer = %member.name, "not a visible image layer");
                continue;
            }
            let Some(raster) = member.raster.as_ref() else {
                warn!(layer = %member.name, "image layer has no pixels");
                continue;
            };
            let Some(cropped) = crop_to_mask(raster, member.bounds, mask.bounds) else {
                warn!(layer = %member.name, "image lies outside its mask");
                continue;
            };

            let next = index + 1;
            let file = match self
                .options
                .assets
                .save_jpeg(&cropped, &group.file_stem(&member.name, next))
            {
                Ok(file) => file,
                Err(source) => {
                    let err = ExtractionError::Asset {
                        layer: member.name.clone(),
                        source,
                    };
                    warn!(error = %err, "hero image skipped");
                    continue;
                }
            };
            index = next;

            let animation = if index <= ANIMATED_IMAGES {
                format!(" animate_fadeIn {}", group.delay_class(index))
            } else {
                String::new()
            };
            self.layout.push(
                Bucket::MainImages,
                format!(
                    "<div class=\"mainImage{index} imageBox{suffix}{animation}\">\n<img src=\"images/{file}\" alt=\"{alt}\" id=\"sd_img_Image-{index}\" />\n</div>"
                ),
            );
            if index == 1 {
                self.push_image_box_rules(suffix, &mask);
            }
        }

        if index == 0 {
            return Err(ExtractionError::NoRaster {
                layer: layer.name.clone(),
            });
        }
        Ok(())
    }

    /// The group's wrap member, wherever it sits among the images, defines
    /// the crop and the box geometry. Without one the group bounds apply.
    fn hero_mask(&self, layer: &LayerNode, members: &[&LayerNode]) -> Mask {
        let Some(wrap) = members
            .iter()
            .find(|m| role_of(m) == Some(Role::ImageWrap))
        else {
            return Mask::plain(layer.bounds);
        };
        match self.options.shapes.style_for_layer(wrap) {
            ShapeStyle::BorderRadius(radii) => Mask {
                bounds: wrap.bounds,
                border_radius: radii.to_css(),
                clip: None,
            },
            ShapeStyle::Clip(clip) => Mask {
                clip,
                ..Mask::plain(wrap.bounds)
            },
        }
    }

    fn push_image_box_rules(&mut self, suffix: &str, mask: &Mask) {
        let b = mask.bounds;
        let mut rule = CssRule::new(format!(".imageBox{suffix}"))
            .px("width", b.width() - 3)
            .px("height", b.height() - 3)
            .decl("position", "absolute")
            .px("left", b.x1)
            .px("top", b.y1)
            .decl("z-index", "1")
            .decl("overflow", "hidden")
            .decl("border-radius", mask.border_radius.clone());
        if let Some(clip) = &mask.clip {
            let clip = clip.to_css();
            rule = rule
                .decl("clip-path", clip.clone())
                .decl("-webkit-clip-path", clip);
        }
        self.layout.rules.push(rule);
        self.layout.rules.push(
            CssRule::new(format!(".imageBox{suffix} img"))
                .px("width", b.width() - 3)
                .px("height", b.height() - 3)
                .decl("object-fit", "cover"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_group_uses_half_second_offsets() {
        assert_eq!(HeroGroup::First.delay_class(1), "delay_0s");
        assert_eq!(HeroGroup::First.delay_class(3), "delay_8s");
        assert_eq!(HeroGroup::Second.delay_class(2), "delay_4_5s");
    }

    #[test]
    fn second_group_appends_index_to_file_names() {
        assert_eq!(HeroGroup::First.file_stem("summer sale", 2), "summer-sale");
        assert_eq!(HeroGroup::Second.file_stem("summer sale", 2), "summer-sale2");
    }
}
