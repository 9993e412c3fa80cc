use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::assets::AssetError;
use crate::decode::DecodeError;

#[derive(Debug, Error)]
pub enum ConvertError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image processing error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("{0}")]
    Input(String),

    #[error("Document decode error: {0}")]
    Decode(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ConvertError {
    pub fn input(message: impl Into<String>) -> Self {
        ConvertError::Input(message.into())
    }

    pub fn to_payload(&self) -> ErrorPayload {
        match self {
            ConvertError::Io(e) => ErrorPayload::new(
                ErrorCategory::Io,
                e.to_string(),
                "Check file paths/permissions and free disk space.",
            ),
            ConvertError::Image(e) => ErrorPayload::new(
                ErrorCategory::Image,
                e.to_string(),
                "Verify the layer rasters are readable PNG files.",
            ),
            ConvertError::Serialization(e) => ErrorPayload::new(
                ErrorCategory::Decode,
                e.to_string(),
                "Check the document JSON; run with --verbose for details.",
            ),
            ConvertError::Archive(e) => ErrorPayload::new(
                ErrorCategory::Archive,
                e.to_string(),
                "Re-create the ZIP archive; it may be truncated or use an unsupported compression method.",
            ),
            ConvertError::Input(msg) => {
                let lower = msg.to_ascii_lowercase();
                if lower.contains("zip file") {
                    ErrorPayload::new(
                        ErrorCategory::Input,
                        msg.to_string(),
                        "Pass a .zip archive containing one or more design documents.",
                    )
                } else if lower.contains("file not found") {
                    ErrorPayload::new(
                        ErrorCategory::Input,
                        msg.to_string(),
                        "Verify the archive path; use an absolute path or run from the working directory.",
                    )
                } else if lower.contains("no psd files") {
                    ErrorPayload::new(
                        ErrorCategory::Input,
                        msg.to_string(),
                        "Add at least one <name>.psd.json document export to the archive.",
                    )
                } else {
                    ErrorPayload::new(
                        ErrorCategory::Input,
                        msg.to_string(),
                        "Check the input archive and retry.",
                    )
                }
            }
            ConvertError::Decode(msg) => ErrorPayload::new(
                ErrorCategory::Decode,
                msg.to_string(),
                "Re-export the document; the layer tree could not be decoded.",
            ),
            ConvertError::Config(msg) => ErrorPayload::new(
                ErrorCategory::Config,
                msg.to_string(),
                "Check flags and the config file (output_dir, click_through_url, standard_sizes, hero_jpeg_quality).",
            ),
        }
    }
}

impl From<DecodeError> for ConvertError {
    fn from(err: DecodeError) -> Self {
        ConvertError::Decode(err.to_string())
    }
}

impl From<AssetError> for ConvertError {
    fn from(err: AssetError) -> Self {
        match err {
            AssetError::Io(e) => ConvertError::Io(e),
            AssetError::Encode(e) => ConvertError::Image(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConvertError>;

/// Failure while styling a single layer.
///
/// These never abort a document: the layout builder logs them and omits the
/// affected fragment or falls back to a safe default.
#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("layer '{layer}' is missing {field}")]
    MissingField { layer: String, field: &'static str },

    #[error("layer '{layer}' has malformed {field}: {detail}")]
    Malformed {
        layer: String,
        field: &'static str,
        detail: String,
    },

    #[error("layer '{layer}' has no pixel data")]
    NoRaster { layer: String },

    #[error("layer name '{layer}' matches several roles: {roles}")]
    AmbiguousLayerName { layer: String, roles: String },

    #[error("failed to save asset for '{layer}': {source}")]
    Asset {
        layer: String,
        #[source]
        source: AssetError,
    },
}

impl ExtractionError {
    pub fn missing(layer: &str, field: &'static str) -> Self {
        ExtractionError::MissingField {
            layer: layer.to_string(),
            field,
        }
    }

    pub fn malformed(layer: &str, field: &'static str, detail: impl Into<String>) -> Self {
        ExtractionError::Malformed {
            layer: layer.to_string(),
            field,
            detail: detail.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Input,
    Archive,
    Decode,
    Image,
    Io,
    Config,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorPayload {
    pub category: ErrorCategory,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remediation: Option<String>,
}

impl ErrorPayload {
    pub fn new(category: ErrorCategory, message: String, remediation: impl Into<String>) -> Self {
        Self {
            category,
            message,
            remediation: Some(remediation.into()),
        }
    }
}
