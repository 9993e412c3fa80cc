use std::path::{Component, Path};

use serde::Deserialize;
use tracing::{debug, warn};

use super::{DecodeError, DocumentDecoder};
use crate::types::{
    Bounds, CornerRadii, Document, LayerKind, LayerNode, Origination, Rgb, ShapeData, TextData,
};

/// File-name suffix of a layer-tree export.
pub const EXPORT_SUFFIX: &str = ".psd.json";

/// Reads `<doc>.psd.json` layer exports whose rasters are PNG files stored
/// next to the JSON (paths are relative to it).
#[derive(Debug, Clone, Copy, Default)]
pub struct ExportDecoder;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    width: u32,
    height: u32,
    #[serde(default)]
    layers: Vec<RawLayer>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawLayer {
    name: String,
    kind: String,
    #[serde(default)]
    bbox: [i32; 4],
    #[serde(default = "default_visible")]
    visible: bool,
    #[serde(default)]
    transparency_locked: bool,
    image: Option<String>,
    #[serde(default)]
    children: Vec<RawLayer>,
    #[serde(default)]
    origination: Vec<RawOrigination>,
    fill: Option<[u8; 3]>,
    text: Option<String>,
    #[serde(default)]
    engine_data: serde_json::Value,
    #[serde(default)]
    font_set: Vec<RawFont>,
    transform: Option<[f64; 6]>,
}

#[derive(Debug, Deserialize)]
struct RawOrigination {
    #[serde(rename = "type")]
    kind: String,
    radii: Option<CornerRadii>,
}

#[derive(Debug, Deserialize)]
struct RawFont {
    #[serde(rename = "Name")]
    name: String,
}

fn default_visible() -> bool {
    true
}

impl DocumentDecoder for ExportDecoder {
    fn matches(&self, file_name: &str) -> bool {
        file_name.to_ascii_lowercase().ends_with(EXPORT_SUFFIX)
    }

    fn decode(&self, path: &Path) -> Result<Document, DecodeError> {
        let raw = std::fs::read_to_string(path).map_err(|source| DecodeError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let doc: RawDocument = serde_json::from_str(&raw).map_err(|source| DecodeError::Json {
            path: path.to_path_buf(),
            source,
        })?;
        if doc.width == 0 || doc.height == 0 {
            return Err(DecodeError::InvalidDimensions {
                width: doc.width,
                height: doc.height,
            });
        }

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let layers = doc
            .layers
            .into_iter()
            .map(|layer| convert_layer(layer, base))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Document {
            name: document_name(path),
            width: doc.width,
            height: doc.height,
            layers,
        })
    }
}

/// File name with the export suffix (or, failing that, the extension) removed.
pub(crate) fn document_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(EXPORT_SUFFIX) {
        return file_name[..file_name.len() - EXPORT_SUFFIX.len()].to_string();
    }
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or(file_name)
}

fn convert_layer(raw: RawLayer, base: &Path) -> Result<LayerNode, DecodeError> {
    let [x1, y1, x2, y2] = raw.bbox;
    let raster = raw.image.as_deref().and_then(|rel| load_raster(&raw.name, base, rel));

    let kind = match raw.kind.as_str() {
        "group" => LayerKind::Group(
            raw.children
                .into_iter()
                .map(|child| convert_layer(child, base))
                .collect::<Result<Vec<_>, _>>()?,
        ),
        "pixel" => LayerKind::Raster {
            smart_object: false,
        },
        "smartobject" => LayerKind::Raster { smart_object: true },
        "shape" => LayerKind::VectorShape(ShapeData {
            origination: raw
                .origination
                .into_iter()
                .map(|o| match (o.kind.as_str(), o.radii) {
                    ("roundedRectangle", Some(radii)) => Origination::RoundedRectangle(radii),
                    _ => Origination::Other(o.kind),
                })
                .collect(),
            fill: raw.fill.map(|[r, g, b]| Rgb::new(r, g, b)),
        }),
        "type" => LayerKind::Text(TextData {
            text: raw.text.unwrap_or_default(),
            engine: raw.engine_data,
            fonts: raw.font_set.into_iter().map(|f| f.name).collect(),
            transform: raw.transform,
        }),
        other => {
            return Err(DecodeError::UnknownKind {
                layer: raw.name,
                kind: other.to_string(),
            })
        }
    };

    Ok(LayerNode {
        name: raw.name,
        bounds: Bounds::new(x1, y1, x2, y2),
        visible: raw.visible,
        transparency_locked: raw.transparency_locked,
        raster,
        kind,
    })
}

fn load_raster(layer: &str, base: &Path, rel: &str) -> Option<image::RgbaImage> {
    if !is_contained(Path::new(rel)) {
        warn!(layer, path = rel, "layer raster path leaves the document folder; continuing without pixels");
        return None;
    }
    let path = base.join(rel);
    match image::open(&path) {
        Ok(img) => {
            debug!(layer, path = %path.display(), "loaded layer raster");
            Some(img.to_rgba8())
        }
        Err(err) => {
            warn!(layer, path = %path.display(), error = %err, "layer raster unreadable; continuing without pixels");
            None
        }
    }
}

/// Only plain relative components; no roots, prefixes or `..`.
fn is_contained(rel: &Path) -> bool {
    rel.components()
        .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    fn write_doc(dir: &TempDir, name: &str, json: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, json).expect("write document");
        path
    }

    #[test]
    fn matches_only_export_suffix() {
        let decoder = ExportDecoder;
        assert!(decoder.matches("banner300x600.psd.json"));
        assert!(decoder.matches("BANNER.PSD.JSON"));
        assert!(!decoder.matches("banner.json"));
        assert!(!decoder.matches("banner.psd"));
    }

    #[test]
    fn decodes_layer_tree_with_rasters() {
        let dir = TempDir::new().expect("tempdir");
        RgbaImage::from_pixel(4, 2, Rgba([1, 2, 3, 255]))
            .save(dir.path().join("bg.png"))
            .expect("write raster");
        let path = write_doc(
            &dir,
            "banner.psd.json",
            r#"{
                "width": 300, "height": 600,
                "layers": [
                    {"name": "bg", "kind": "pixel", "bbox": [0, 0, 4, 2], "image": "bg.png"},
                    {"name": "cta", "kind": "group", "bbox": [10, 10, 110, 50], "children": [
                        {"name": "label", "kind": "type", "bbox": [12, 12, 100, 40],
                         "text": "Shop Now", "fontSet": [{"Name": "Lato-Bold"}],
                         "transform": [1, 0, 0, 1, 0, 0]},
                        {"name": "button", "kind": "shape", "bbox": [10, 10, 110, 50],
                         "origination": [{"type": "roundedRectangle",
                                          "radii": {"topLeft": 8, "topRight": 8,
                                                    "bottomRight": 8, "bottomLeft": 8}}]}
                    ]},
                    {"name": "locked", "kind": "pixel", "visible": false, "transparencyLocked": true}
                ]
            }"#,
        );

        let doc = ExportDecoder.decode(&path).expect("decode");
        assert_eq!(doc.name, "banner");
        assert_eq!((doc.width, doc.height), (300, 600));
        assert_eq!(doc.layers.len(), 3);

        let bg = &doc.layers[0];
        assert_eq!(bg.raster.as_ref().map(|r| r.dimensions()), Some((4, 2)));

        let cta = &doc.layers[1];
        let text = cta.children()[0].text().expect("text layer");
        assert_eq!(text.text, "Shop Now");
        assert_eq!(text.fonts, vec!["Lato-Bold".to_string()]);
        let shape = cta.children()[1].shape().expect("shape layer");
        assert_eq!(shape.rounded_rectangle(), Some(CornerRadii::uniform(8.0)));

        let locked = &doc.layers[2];
        assert!(!locked.visible);
        assert!(locked.transparency_locked);
    }

    #[test]
    fn missing_raster_is_not_fatal() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_doc(
            &dir,
            "a.psd.json",
            r#"{"width": 10, "height": 10,
                "layers": [{"name": "logo", "kind": "pixel", "bbox": [0,0,5,5], "image": "nope.png"}]}"#,
        );
        let doc = ExportDecoder.decode(&path).expect("decode");
        assert!(doc.layers[0].raster.is_none());
    }

    #[test]
    fn raster_paths_outside_the_document_folder_are_ignored() {
        let dir = TempDir::new().expect("tempdir");
        let docs = dir.path().join("docs");
        std::fs::create_dir_all(docs.join("img")).expect("docs dir");
        let pixels = RgbaImage::from_pixel(2, 2, Rgba([9, 9, 9, 255]));
        pixels.save(dir.path().join("secret.png")).expect("outside raster");
        pixels.save(docs.join("img").join("ok.png")).expect("inside raster");
        let absolute = dir.path().join("secret.png");

        let json = format!(
            r#"{{"width": 10, "height": 10, "layers": [
                {{"name": "up", "kind": "pixel", "bbox": [0,0,2,2], "image": "../secret.png"}},
                {{"name": "abs", "kind": "pixel", "bbox": [0,0,2,2], "image": {abs}}},
                {{"name": "ok", "kind": "pixel", "bbox": [0,0,2,2], "image": "./img/ok.png"}}
            ]}}"#,
            abs = serde_json::to_string(&absolute.to_string_lossy().into_owned()).expect("json string"),
        );
        let path = docs.join("a.psd.json");
        std::fs::write(&path, json).expect("write document");

        let doc = ExportDecoder.decode(&path).expect("decode");
        assert!(doc.layers[0].raster.is_none());
        assert!(doc.layers[1].raster.is_none());
        assert!(doc.layers[2].raster.is_some());
    }

    #[test]
    fn rejects_zero_dimensions_and_unknown_kinds() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_doc(&dir, "z.psd.json", r#"{"width": 0, "height": 10}"#);
        assert!(matches!(
            ExportDecoder.decode(&path),
            Err(DecodeError::InvalidDimensions { width: 0, height: 10 })
        ));

        let path = write_doc(
            &dir,
            "k.psd.json",
            r#"{"width": 5, "height": 5, "layers": [{"name": "x", "kind": "adjustment"}]}"#,
        );
        assert!(matches!(
            ExportDecoder.decode(&path),
            Err(DecodeError::UnknownKind { .. })
        ));
    }

    #[test]
    fn malformed_json_reports_path() {
        let dir = TempDir::new().expect("tempdir");
        let path = write_doc(&dir, "bad.psd.json", "{ not json");
        let err = ExportDecoder.decode(&path).expect_err("should fail");
        assert!(err.to_string().contains("bad.psd.json"));
    }
}
