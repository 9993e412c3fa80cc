use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use image::{Rgba, RgbaImage};
use psdhtml_lib::{convert_archive, inspect_archive, Config, ConvertError, Role};
use serde_json::{json, Value};
use tempfile::TempDir;
use zip::write::FileOptions;
use zip::ZipWriter;

const NAVY: Rgba<u8> = Rgba([10, 20, 90, 255]);

fn png_bytes(dir: &Path, name: &str, img: &RgbaImage) -> Vec<u8> {
    let path = dir.join(name);
    img.save(&path).expect("write png");
    fs::read(&path).expect("read png")
}

fn write_zip(path: &Path, entries: &[(&str, Vec<u8>)]) {
    let mut zip = ZipWriter::new(File::create(path).expect("create zip"));
    for (name, body) in entries {
        zip.start_file(*name, FileOptions::default())
            .expect("start entry");
        zip.write_all(body).expect("write entry");
    }
    zip.finish().expect("finish zip");
}

fn text_layer(name: &str, bbox: [i32; 4], text: &str, size_pt: f64) -> Value {
    json!({
        "name": name,
        "kind": "type",
        "bbox": bbox,
        "text": text,
        "engineData": {
            "StyleRun": {"RunArray": [{"StyleSheet": {"StyleSheetData": {
                "FontSize": size_pt,
                "FillColor": {"Values": [1.0, 1.0, 1.0, 1.0]}
            }}}]},
            "ParagraphRun": {"RunArray": [{"ParagraphSheet": {"Properties": {"Justification": 2}}}]}
        },
        "fontSet": [{"Name": "Lato-Regular"}],
        "transform": [1.0, 0.0, 0.0, 1.0, 0.0, 0.0]
    })
}

fn disc(size: u32, radius: f64) -> RgbaImage {
    let c = size as f64 / 2.0;
    RgbaImage::from_fn(size, size, |x, y| {
        let (dx, dy) = (x as f64 + 0.5 - c, y as f64 + 0.5 - c);
        if dx * dx + dy * dy <= radius * radius {
            NAVY
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}

struct Fixture {
    dir: TempDir,
    archive: PathBuf,
}

impl Fixture {
    /// A 300x600 banner with a background, content area, logo, heading, cta
    /// and a circular shape.
    fn banner() -> Self {
        let dir = TempDir::new().expect("tempdir");
        let scratch = dir.path().join("scratch");
        fs::create_dir_all(&scratch).expect("scratch dir");

        let doc = json!({
            "width": 300,
            "height": 600,
            "layers": [
                {"name": "bg", "kind": "shape", "bbox": [0, 0, 300, 600], "fill": [200, 30, 40]},
                {"name": "contentArea", "kind": "pixel", "bbox": [10, 100, 290, 500]},
                {"name": "logo", "kind": "pixel", "bbox": [100, 20, 200, 60], "image": "logo.png"},
                text_layer("mainHeading", [20, 120, 280, 180], "Hello World", 40.0),
                {
                    "name": "cta",
                    "kind": "group",
                    "bbox": [50, 520, 250, 560],
                    "children": [
                        text_layer("label", [60, 525, 240, 555], "Shop Now", 16.0),
                        {
                            "name": "button",
                            "kind": "shape",
                            "bbox": [50, 520, 250, 560],
                            "image": "button.png",
                            "origination": [{"type": "roundedRectangle", "radii": {
                                "topLeft": 8.0, "topRight": 8.0, "bottomRight": 8.0, "bottomLeft": 8.0
                            }}]
                        }
                    ]
                },
                {
                    "name": "shape 1",
                    "kind": "group",
                    "bbox": [20, 30, 120, 130],
                    "children": [
                        {"name": "circle", "kind": "pixel", "bbox": [20, 30, 120, 130], "image": "circle.png"}
                    ]
                }
            ]
        });

        let button = RgbaImage::from_pixel(200, 40, NAVY);
        let logo = RgbaImage::from_pixel(100, 40, Rgba([255, 255, 255, 255]));
        let archive = dir.path().join("banners.zip");
        write_zip(
            &archive,
            &[
                ("banner.psd.json", doc.to_string().into_bytes()),
                ("button.png", png_bytes(&scratch, "button.png", &button)),
                ("logo.png", png_bytes(&scratch, "logo.png", &logo)),
                ("circle.png", png_bytes(&scratch, "circle.png", &disc(100, 40.0))),
            ],
        );
        Self { dir, archive }
    }

    fn config(&self) -> Config {
        Config {
            output_dir: self.dir.path().join("out"),
            ..Config::default()
        }
    }
}

#[test]
fn heading_and_cta_are_styled_from_text_metadata() {
    let fixture = Fixture::banner();
    let output = convert_archive(&fixture.archive, &fixture.config()).expect("convert");

    assert!(output.success);
    let result = &output.results["banner.psd.json"];
    assert!(result.success, "document failed: {:?}", result.error);

    assert!(result.html.contains("Hello World"));
    assert!(result.html.contains("<img src=\"images/logo.png\" alt=\"logo\" id=\"sd_img_Logo\"/>"));
    assert!(result.html.contains(">Shop Now\n</a>"));
    assert!(result.html.contains("id=\"sd_txta_Heading\""));
    assert!(result.html.contains("href=\"https://www.example.com\""));
    assert!(result.css.contains("font-family: 'Lato', serif;"));
    assert!(result.css.contains("font-weight: 400;"));
    assert!(result.css.contains("font-size: 30.00px;"));
    assert!(result.css.contains("line-height: 1.20em;"));
    assert!(result.css.contains("border-radius: 0.50em;"));
    assert!(result.css.contains("background-color: rgb(200, 30, 40);"));
    assert!(result.css.contains("background-color: rgb(10, 20, 90);"));
}

#[test]
fn circular_shape_gets_circle_clip_path() {
    let fixture = Fixture::banner();
    let output = convert_archive(&fixture.archive, &fixture.config()).expect("convert");
    let result = &output.results["banner.psd.json"];

    assert!(result.html.contains("class=\"shape1 animate_fadeIn delay_0s\""));
    assert!(result.css.contains("clip-path: circle("));
    assert!(result.css.contains("-webkit-clip-path: circle("));
}

#[test]
fn output_files_match_reported_result() {
    let fixture = Fixture::banner();
    let config = fixture.config();
    let output = convert_archive(&fixture.archive, &config).expect("convert");
    let result = &output.results["banner.psd.json"];

    let doc_dir = config.output_dir.join("banner");
    let html = fs::read_to_string(doc_dir.join("index.html")).expect("index.html");
    let css = fs::read_to_string(doc_dir.join("css").join("style.css")).expect("style.css");
    assert_eq!(html, result.html);
    assert_eq!(css, result.css);

    let assets: Vec<String> = fs::read_dir(doc_dir.join("images"))
        .expect("images dir")
        .filter_map(Result::ok)
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(assets, vec!["logo.png"]);
}

#[test]
fn archive_without_documents_reports_input_error() {
    let dir = TempDir::new().expect("tempdir");
    let archive = dir.path().join("empty.zip");
    write_zip(&archive, &[("notes.txt", b"nothing to convert".to_vec())]);

    let config = Config {
        output_dir: dir.path().join("out"),
        ..Config::default()
    };
    let err = convert_archive(&archive, &config).expect_err("no documents");
    assert!(matches!(err, ConvertError::Input(_)));
    assert_eq!(err.to_string(), "No PSD files found in the ZIP");
}

#[test]
fn inspect_reports_dimensions_and_roles() {
    let fixture = Fixture::banner();
    let output = inspect_archive(&fixture.archive).expect("inspect");
    let doc = &output.documents["banner.psd.json"];

    assert_eq!((doc.width, doc.height), (Some(300), Some(600)));
    let roles: Vec<Option<Role>> = doc.layers.iter().map(|l| l.role).collect();
    assert_eq!(
        roles,
        vec![
            Some(Role::Background),
            Some(Role::ContentArea),
            Some(Role::Logo),
            Some(Role::MainHeading),
            Some(Role::Cta),
            Some(Role::Shape(1)),
        ]
    );
    assert!(!fixture.dir.path().join("out").exists());
}

#[test]
fn same_named_documents_in_different_folders_do_not_overwrite() {
    let dir = TempDir::new().expect("tempdir");
    let archive = dir.path().join("campaign.zip");
    let doc = |heading: &str| {
        json!({
            "width": 300,
            "height": 600,
            "layers": [text_layer("mainHeading", [20, 120, 280, 180], heading, 40.0)]
        })
        .to_string()
        .into_bytes()
    };
    write_zip(
        &archive,
        &[
            ("a/sale.psd.json", doc("Spring Sale")),
            ("b/sale.psd.json", doc("Autumn Sale")),
        ],
    );
    let config = Config {
        output_dir: dir.path().join("out"),
        ..Config::default()
    };

    let output = convert_archive(&archive, &config).expect("convert");
    let first = &output.results["a/sale.psd.json"];
    let second = &output.results["b/sale.psd.json"];
    assert!(first.success && second.success);
    assert!(first.html.contains("Spring Sale"));
    assert!(second.html.contains("Autumn Sale"));

    let read = |name: &str| {
        fs::read_to_string(config.output_dir.join(name).join("index.html")).expect("index.html")
    };
    assert_eq!(read("sale"), first.html);
    assert_eq!(read("sale-2"), second.html);
}
