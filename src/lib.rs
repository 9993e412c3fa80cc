//! PSD to HTML5 banner converter library.
//!
//! Turns layered design documents, named after a fixed layer-naming
//! convention, into a static banner page: `index.html`, `css/style.css` and
//! the extracted image assets.
//!
//! # Module Overview
//!
//! - [`archive`] - ZIP input extraction and document discovery
//! - [`decode`] - the [`DocumentDecoder`] seam and the layer-export decoder
//! - [`layout`] - layer classification and fragment/rule building
//! - [`typography`] - font, size, leading and color resolution for text layers
//! - [`shape`] - edge detection and contour fitting for `clip-path` values
//! - [`color`] - dominant and mean color sampling
//! - [`page`] - HTML shell and stylesheet assembly
//! - [`pipeline`] - archive-level conversion and inspection
//! - [`config`] - configuration file support
//! - [`output`] - JSON output schemas
//!
//! # Example
//!
//! ```no_run
//! use psdhtml_lib::{convert_archive, Config};
//! use std::path::Path;
//!
//! # fn example() -> psdhtml_lib::Result<()> {
//! let config = Config::default();
//! let output = convert_archive(Path::new("banners.zip"), &config)?;
//! for (name, result) in &output.results {
//!     println!("{name}: {}", if result.success { "ok" } else { "failed" });
//! }
//! # Ok(())
//! # }
//! ```

pub mod ad_size;
pub mod archive;
pub mod assets;
pub mod color;
pub mod config;
pub mod decode;
pub mod error;
pub mod html;
pub mod layout;
pub mod output;
pub mod page;
pub mod pipeline;
pub mod shape;
pub mod types;
pub mod typography;

pub use ad_size::AdSize;
pub use archive::{validate_archive_path, ExtractedArchive};
pub use config::Config;
pub use decode::{DecodeError, DocumentDecoder, ExportDecoder};
pub use error::{ConvertError, ErrorCategory, ErrorPayload, ExtractionError, Result};
pub use layout::{build_layout, classify, classify_tree, Bucket, ClassifiedLayer, Layout, Role};
pub use output::{
    ConvertOutput, DocumentResult, InspectOutput, InspectedDocument, PsdOutput,
    PSDHTML_OUTPUT_VERSION,
};
pub use page::{assemble, Page};
pub use pipeline::{convert_archive, convert_document, inspect_archive};
pub use shape::{ShapeExtractor, ShapeStyle};
pub use types::{ClipPath, Document, LayerKind, LayerNode, Rgb};
pub use typography::{resolve_text_layer, TextStyle};
