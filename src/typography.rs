//! Typography resolution from text-engine run metadata.
//!
//! Sizes are stored in points under the layer's transform. They are converted
//! at 72 DPI, scaled by the transform's horizontal and vertical factors,
//! averaged and then multiplied by [`SIZE_CORRECTION`] to match the reference
//! renderer.

use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::error::ExtractionError;
use crate::types::{LayerNode, Rgb};

const DPI: f64 = 72.0;
pub const SIZE_CORRECTION: f64 = 0.75;
/// Line height never drops below this multiple of the font size.
pub const MIN_LINE_HEIGHT_RATIO: f64 = 1.2;

const IDENTITY: [f64; 6] = [1.0, 0.0, 0.0, 1.0, 0.0, 0.0];

const STYLE_SHEET: &str = "/StyleRun/RunArray/0/StyleSheet/StyleSheetData";
const JUSTIFICATION: &str = "/ParagraphRun/RunArray/0/ParagraphSheet/Properties/Justification";

/// Weight vocabulary in match order.
pub const WEIGHTS: [(&str, u16); 10] = [
    ("Thin", 100),
    ("ExtraLight", 200),
    ("Light", 300),
    ("Regular", 400),
    ("Normal", 400),
    ("Medium", 500),
    ("SemiBold", 600),
    ("Bold", 700),
    ("ExtraBold", 800),
    ("Black", 900),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
}

impl FontStyle {
    pub fn as_css(self) -> &'static str {
        match self {
            FontStyle::Normal => "normal",
            FontStyle::Italic => "italic",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

impl TextAlign {
    pub fn from_justification(code: Option<i64>) -> Self {
        match code {
            Some(1) | Some(2) => TextAlign::Center,
            _ => TextAlign::Left,
        }
    }

    pub fn as_css(self) -> &'static str {
        match self {
            TextAlign::Left => "left",
            TextAlign::Center => "center",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FontFace {
    pub family: String,
    pub weight_name: &'static str,
    pub weight: u16,
    pub style: FontStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFont {
    pub face: FontFace,
    pub font_size_px: f64,
    pub line_height_px: f64,
    /// Line height relative to the font size, rounded to two decimals.
    pub line_height_em: f64,
}

/// Fully resolved styling of one text layer.
#[derive(Debug, Clone, PartialEq)]
pub struct TextStyle {
    pub text: String,
    pub font: ResolvedFont,
    pub color: Rgb,
    pub align: TextAlign,
}

fn font_name_pattern() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)^(.*?)[-_ ]?(Thin|ExtraLight|Light|Regular|Normal|Medium|SemiBold|Bold|ExtraBold|Black)?(Italic)?$",
        )
        .ok()
    })
    .as_ref()
}

/// Splits a PostScript-ish font name such as `Lato-BoldItalic` into family,
/// weight and style. Unknown weight tokens resolve to Regular/400.
pub fn parse_font_name(raw: &str) -> FontFace {
    let cleaned: String = raw
        .trim()
        .trim_matches(|c| c == '\'' || c == '"')
        .replace('\u{a0}', " ")
        .chars()
        .filter(char::is_ascii)
        .collect();

    let captures = font_name_pattern().and_then(|re| re.captures(&cleaned));
    let (family, weight_token, italic) = match &captures {
        Some(caps) => (
            caps.get(1).map_or("", |m| m.as_str()),
            caps.get(2).map(|m| m.as_str()),
            caps.get(3).is_some(),
        ),
        None => (cleaned.as_str(), None, false),
    };

    let family = family
        .replace("Roman", "")
        .trim()
        .trim_end_matches(['-', '_', ' '])
        .to_string();

    let (weight_name, weight) = weight_token
        .and_then(|token| {
            WEIGHTS
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(token))
                .copied()
        })
        .unwrap_or(("Regular", 400));

    FontFace {
        family,
        weight_name,
        weight,
        style: if italic {
            FontStyle::Italic
        } else {
            FontStyle::Normal
        },
    }
}

/// Converts a point size under `transform` to CSS pixels.
pub fn points_to_px(points: f64, transform: &[f64; 6]) -> f64 {
    let px = points * (DPI / 72.0);
    let (sx, sy) = (px * transform[0], px * transform[3]);
    (sx + sy) / 2.0 * SIZE_CORRECTION
}

pub fn resolve_typography(
    raw_font_name: &str,
    font_size_pt: f64,
    leading_pt: Option<f64>,
    transform: &[f64; 6],
) -> ResolvedFont {
    let face = parse_font_name(raw_font_name);
    let floor = font_size_pt * MIN_LINE_HEIGHT_RATIO;
    let leading = match leading_pt {
        Some(l) if l >= floor => l,
        _ => floor,
    };

    let font_size_px = points_to_px(font_size_pt, transform);
    let line_height_px = points_to_px(leading, transform);
    let line_height_em = if font_size_px > 0.0 {
        (line_height_px / font_size_px * 100.0).round() / 100.0
    } else {
        MIN_LINE_HEIGHT_RATIO
    };

    ResolvedFont {
        face,
        font_size_px,
        line_height_px,
        line_height_em,
    }
}

/// Resolves everything needed to style a text layer from its engine data.
pub fn resolve_text_layer(layer: &LayerNode) -> Result<TextStyle, ExtractionError> {
    let data = layer
        .text()
        .ok_or_else(|| ExtractionError::missing(&layer.name, "text data"))?;
    let sheet = data
        .engine
        .pointer(STYLE_SHEET)
        .ok_or_else(|| ExtractionError::missing(&layer.name, "style run"))?;

    let font_size = match sheet.get("FontSize") {
        Some(v) => v
            .as_f64()
            .ok_or_else(|| ExtractionError::malformed(&layer.name, "font size", v.to_string()))?,
        None => return Err(ExtractionError::missing(&layer.name, "font size")),
    };
    if font_size <= 0.0 {
        return Err(ExtractionError::malformed(
            &layer.name,
            "font size",
            font_size.to_string(),
        ));
    }
    let leading = sheet.get("Leading").and_then(Value::as_f64);
    let caps = sheet.get("FontCaps").and_then(Value::as_i64) == Some(2);
    let fill = color_at(sheet, "/FillColor/Values", &layer.name)?;
    let align = TextAlign::from_justification(data.engine.pointer(JUSTIFICATION).and_then(Value::as_i64));

    let font_name = data
        .fonts
        .first()
        .ok_or_else(|| ExtractionError::missing(&layer.name, "font set"))?;
    let transform = data.transform.unwrap_or(IDENTITY);

    let mut text = data.text.replace('\r', " ");
    if caps {
        text = text.to_uppercase();
    }

    Ok(TextStyle {
        text,
        font: resolve_typography(font_name, font_size, leading, &transform),
        color: fill.unwrap_or(Rgb::new(0, 0, 0)),
        align,
    })
}

/// Reads an `[a, r, g, b]` float color (0..1 per channel).
fn color_at(sheet: &Value, pointer: &str, layer: &str) -> Result<Option<Rgb>, ExtractionError> {
    let Some(values) = sheet.pointer(pointer) else {
        return Ok(None);
    };
    let channels: Vec<f64> = values
        .as_array()
        .map(|vals| vals.iter().filter_map(Value::as_f64).collect())
        .unwrap_or_default();
    if channels.len() < 4 {
        return Err(ExtractionError::malformed(layer, "color", values.to_string()));
    }
    let to_u8 = |v: f64| (v * 255.0).clamp(0.0, 255.0) as u8;
    Ok(Some(Rgb::new(
        to_u8(channels[1]),
        to_u8(channels[2]),
        to_u8(channels[3]),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Bounds, LayerKind, TextData};
    use serde_json::json;

    fn text_layer(engine: Value, fonts: &[&str]) -> LayerNode {
        LayerNode {
            name: "heading".into(),
            bounds: Bounds::new(0, 0, 100, 40),
            visible: true,
            transparency_locked: false,
            raster: None,
            kind: LayerKind::Text(TextData {
                text: "Hello\rWorld".into(),
                engine,
                fonts: fonts.iter().map(|f| f.to_string()).collect(),
                transform: Some([1.0, 0.0, 0.0, 1.0, 0.0, 0.0]),
            }),
        }
    }

    fn engine(sheet: Value, justification: i64) -> Value {
        json!({
            "StyleRun": {"RunArray": [{"StyleSheet": {"StyleSheetData": sheet}}]},
            "ParagraphRun": {"RunArray": [{"ParagraphSheet": {"Properties": {"Justification": justification}}}]}
        })
    }

    #[test]
    fn parses_weight_and_italic_tokens() {
        let face = parse_font_name("Lato-BoldItalic");
        assert_eq!(face.family, "Lato");
        assert_eq!((face.weight_name, face.weight), ("Bold", 700));
        assert_eq!(face.style, FontStyle::Italic);

        let face = parse_font_name("'Montserrat-ExtraBold'");
        assert_eq!(face.family, "Montserrat");
        assert_eq!(face.weight, 800);
        assert_eq!(face.style, FontStyle::Normal);
    }

    #[test]
    fn strips_roman_and_defaults_to_regular() {
        let face = parse_font_name("TimesNewRoman");
        assert_eq!(face.family, "TimesNew");
        assert_eq!((face.weight_name, face.weight), ("Regular", 400));

        let face = parse_font_name("Helvetica\u{a0}Neue");
        assert_eq!(face.family, "Helvetica Neue");
        assert_eq!(face.weight, 400);
    }

    #[test]
    fn weight_is_always_from_vocabulary() {
        for name in ["Foo-Heavy", "Bar_light", "Baz Semibold", "", "Qux-Black", "Ünï-Medium"] {
            let face = parse_font_name(name);
            assert!(
                WEIGHTS.iter().any(|(_, w)| *w == face.weight),
                "{name} resolved to {}",
                face.weight
            );
        }
        assert_eq!(parse_font_name("Foo-Heavy").weight, 400);
        assert_eq!(parse_font_name("Bar_light").weight, 300);
    }

    #[test]
    fn size_applies_transform_average_and_correction() {
        let font = resolve_typography("Lato-Regular", 40.0, Some(48.0), &IDENTITY);
        assert!((font.font_size_px - 30.0).abs() < 1e-9);

        let scaled = [2.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let font = resolve_typography("Lato-Regular", 40.0, None, &scaled);
        assert!((font.font_size_px - 45.0).abs() < 1e-9);
    }

    #[test]
    fn line_height_never_below_floor() {
        for (size, leading) in [(10.0, Some(5.0)), (40.0, None), (12.0, Some(30.0)), (7.5, Some(9.0))] {
            let font = resolve_typography("Lato", size, leading, &IDENTITY);
            assert!(font.line_height_px + 1e-9 >= 1.2 * font.font_size_px);
        }
        let font = resolve_typography("Lato", 10.0, Some(5.0), &IDENTITY);
        assert_eq!(font.line_height_em, 1.2);
        let font = resolve_typography("Lato", 10.0, Some(15.0), &IDENTITY);
        assert_eq!(font.line_height_em, 1.5);
    }

    #[test]
    fn justification_codes_map_to_alignment() {
        assert_eq!(TextAlign::from_justification(Some(0)), TextAlign::Left);
        assert_eq!(TextAlign::from_justification(Some(1)), TextAlign::Center);
        assert_eq!(TextAlign::from_justification(Some(2)), TextAlign::Center);
        assert_eq!(TextAlign::from_justification(Some(3)), TextAlign::Left);
        assert_eq!(TextAlign::from_justification(None), TextAlign::Left);
    }

    #[test]
    fn resolves_text_layer_with_caps_and_fill() {
        let layer = text_layer(
            engine(
                json!({"FontSize": 40.0, "Leading": 20.0, "FontCaps": 2,
                       "FillColor": {"Values": [1.0, 1.0, 0.5, 0.0]}}),
                1,
            ),
            &["Lato-Regular"],
        );
        let style = resolve_text_layer(&layer).expect("resolve");
        assert_eq!(style.text, "HELLO WORLD");
        assert_eq!(style.color, Rgb::new(255, 127, 0));
        assert_eq!(style.align, TextAlign::Center);
        assert_eq!(style.font.face.weight, 400);
        assert_eq!(style.font.line_height_em, 1.2);
    }

    #[test]
    fn stroke_color_does_not_affect_the_layer() {
        let layer = text_layer(
            engine(
                json!({"FontSize": 20.0, "StrokeColor": {"Values": "not a color"},
                       "FillColor": {"Values": [1.0, 0.0, 1.0, 0.0]}}),
                0,
            ),
            &["Lato-Bold"],
        );
        let style = resolve_text_layer(&layer).expect("resolve");
        assert_eq!(style.color, Rgb::new(0, 255, 0));
        assert_eq!(style.font.face.weight, 700);
    }

    #[test]
    fn missing_font_size_is_an_extraction_error() {
        let layer = text_layer(engine(json!({"Leading": 20.0}), 0), &["Lato"]);
        assert!(matches!(
            resolve_text_layer(&layer),
            Err(ExtractionError::MissingField { field: "font size", .. })
        ));

        let layer = text_layer(engine(json!({"FontSize": 12.0}), 0), &[]);
        assert!(matches!(
            resolve_text_layer(&layer),
            Err(ExtractionError::MissingField { field: "font set", .. })
        ));
    }
}
