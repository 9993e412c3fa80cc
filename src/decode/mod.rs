//! Document decoding.
//!
//! The conversion engine only sees [`Document`] trees; how they are read from
//! disk is behind [`DocumentDecoder`]. [`ExportDecoder`] reads the JSON layer
//! export with sidecar PNG rasters.

mod export;

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::types::Document;

pub(crate) use export::document_name;
pub use export::{ExportDecoder, EXPORT_SUFFIX};

#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("document has invalid dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("layer '{layer}' has unknown kind '{kind}'")]
    UnknownKind { layer: String, kind: String },
}

pub trait DocumentDecoder {
    /// Whether an archive member with this file name is a document this
    /// decoder can read.
    fn matches(&self, file_name: &str) -> bool;

    fn decode(&self, path: &Path) -> Result<Document, DecodeError>;
}
