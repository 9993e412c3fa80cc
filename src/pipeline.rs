//! Archive-level orchestration: extract, decode, lay out, write.

use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;

use tracing::{info, warn};

use crate::archive::ExtractedArchive;
use crate::assets::AssetWriter;
use crate::config::Config;
use crate::decode::{document_name, DocumentDecoder, ExportDecoder};
use crate::error::Result;
use crate::layout::{build_layout, classify_tree, LayoutOptions};
use crate::output::{
    ConvertOutput, DocumentResult, InspectOutput, InspectedDocument, PSDHTML_OUTPUT_VERSION,
};
use crate::page::{self, Page};
use crate::shape::ShapeExtractor;

/// Converts every document in the archive at `path`.
///
/// Archive-level problems (bad extension, missing file, unreadable ZIP, no
/// documents) are returned as errors. A document that fails to decode or
/// write is recorded in the results with `success: false`.
pub fn convert_archive(path: &Path, config: &Config) -> Result<ConvertOutput> {
    let decoder = ExportDecoder;
    let archive = ExtractedArchive::open(path, &decoder)?;
    fs::create_dir_all(&config.output_dir)?;

    let mut dirs = DocumentDirs::default();
    let mut results = BTreeMap::new();
    for document in archive.documents() {
        let name = archive.display_name(document);
        let document_dir = config.output_dir.join(dirs.claim(document_name(document)));
        let result = match convert_document(document, &decoder, config, &document_dir) {
            Ok(page) => {
                info!(document = %name, "converted");
                DocumentResult::converted(page.html, page.css)
            }
            Err(err) => {
                warn!(document = %name, error = %err, "document conversion failed");
                DocumentResult::failed(err.to_string())
            }
        };
        results.insert(name, result);
    }
    Ok(ConvertOutput::completed(results))
}

/// Output directory names already taken in one run. Documents sharing a
/// name in different archive folders get `-2`, `-3` and so on.
#[derive(Debug, Default)]
struct DocumentDirs(HashSet<String>);

impl DocumentDirs {
    fn claim(&mut self, name: String) -> String {
        let mut candidate = name.clone();
        let mut n = 1;
        while !self.0.insert(candidate.clone()) {
            n += 1;
            candidate = format!("{name}-{n}");
        }
        if n > 1 {
            warn!(name = %name, dir = %candidate, "output directory name already used");
        }
        candidate
    }
}

/// Converts one decoded document into `<document_dir>/index.html`,
/// `css/style.css` and `images/`.
pub fn convert_document(
    path: &Path,
    decoder: &dyn DocumentDecoder,
    config: &Config,
    document_dir: &Path,
) -> Result<Page> {
    let doc = decoder.decode(path)?;

    let css_dir = document_dir.join("css");
    let images_dir = document_dir.join("images");
    fs::create_dir_all(&css_dir)?;
    fs::create_dir_all(&images_dir)?;

    let assets = AssetWriter::new(&images_dir, config.hero_jpeg_quality);
    let shapes = if config.debug_rasters {
        ShapeExtractor::with_debug_dir(&images_dir)
    } else {
        ShapeExtractor::new()
    };
    let options = LayoutOptions {
        click_through_url: &config.click_through_url,
        standard_size: config.is_standard_size(doc.width, doc.height),
        document_width: doc.width,
        assets: &assets,
        shapes,
    };

    let layout = build_layout(&doc, &options);
    let page = page::assemble(&doc, &layout);
    fs::write(document_dir.join("index.html"), &page.html)?;
    fs::write(css_dir.join("style.css"), &page.css)?;
    Ok(page)
}

/// Decodes and classifies every document without writing any output.
pub fn inspect_archive(path: &Path) -> Result<InspectOutput> {
    let decoder = ExportDecoder;
    let archive = ExtractedArchive::open(path, &decoder)?;

    let documents = archive
        .documents()
        .iter()
        .map(|document| {
            let name = archive.display_name(document);
            let inspected = match decoder.decode(document) {
                Ok(doc) => InspectedDocument {
                    success: true,
                    width: Some(doc.width),
                    height: Some(doc.height),
                    layers: classify_tree(&doc),
                    error: None,
                },
                Err(err) => {
                    warn!(document = %name, error = %err, "document decode failed");
                    InspectedDocument {
                        success: false,
                        width: None,
                        height: None,
                        layers: Vec::new(),
                        error: Some(err.to_string()),
                    }
                }
            };
            (name, inspected)
        })
        .collect();

    Ok(InspectOutput {
        version: PSDHTML_OUTPUT_VERSION.to_string(),
        success: true,
        documents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use tempfile::TempDir;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    const EMPTY_DOC: &str = r#"{"width": 300, "height": 600, "layers": []}"#;

    fn archive(dir: &TempDir, entries: &[(&str, &str)]) -> std::path::PathBuf {
        let path = dir.path().join("input.zip");
        let mut zip = ZipWriter::new(File::create(&path).expect("create zip"));
        for (name, body) in entries {
            zip.start_file(*name, FileOptions::default())
                .expect("start entry");
            zip.write_all(body.as_bytes()).expect("write entry");
        }
        zip.finish().expect("finish zip");
        path
    }

    fn config_in(dir: &TempDir) -> Config {
        Config {
            output_dir: dir.path().join("out"),
            ..Config::default()
        }
    }

    #[test]
    fn broken_document_does_not_abort_the_archive() {
        let dir = TempDir::new().expect("tempdir");
        let zip = archive(
            &dir,
            &[
                ("good.psd.json", EMPTY_DOC),
                ("bad.psd.json", r#"{"width": 0, "height": 600}"#),
            ],
        );

        let output = convert_archive(&zip, &config_in(&dir)).expect("convert");
        assert!(output.success);
        assert!(output.results["good.psd.json"].success);
        let bad = &output.results["bad.psd.json"];
        assert!(!bad.success);
        assert!(bad
            .error
            .as_deref()
            .unwrap_or_default()
            .contains("invalid dimensions"));
    }

    #[test]
    fn writes_page_and_stylesheet_per_document() {
        let dir = TempDir::new().expect("tempdir");
        let zip = archive(&dir, &[("banners/sale.psd.json", EMPTY_DOC)]);
        let config = config_in(&dir);

        let output = convert_archive(&zip, &config).expect("convert");
        let result = &output.results["banners/sale.psd.json"];
        let written = config.output_dir.join("sale");
        let html = fs::read_to_string(written.join("index.html")).expect("index.html");
        let css = fs::read_to_string(written.join("css").join("style.css")).expect("style.css");
        assert_eq!(html, result.html);
        assert_eq!(css, result.css);
        assert!(written.join("images").is_dir());
    }

    #[test]
    fn directory_names_are_unique_within_a_run() {
        let mut dirs = DocumentDirs::default();
        assert_eq!(dirs.claim("sale".into()), "sale");
        assert_eq!(dirs.claim("sale".into()), "sale-2");
        assert_eq!(dirs.claim("sale".into()), "sale-3");
        assert_eq!(dirs.claim("sale-2".into()), "sale-2-2");
    }

    #[test]
    fn inspect_reports_dimensions_without_writing() {
        let dir = TempDir::new().expect("tempdir");
        let zip = archive(&dir, &[("sale.psd.json", EMPTY_DOC)]);

        let output = inspect_archive(&zip).expect("inspect");
        let doc = &output.documents["sale.psd.json"];
        assert!(doc.success);
        assert_eq!((doc.width, doc.height), (Some(300), Some(600)));
        assert!(!dir.path().join("out").exists());
    }
}
