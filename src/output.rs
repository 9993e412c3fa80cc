use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::ErrorPayload;
use crate::layout::ClassifiedLayer;

/// Schema version for output payloads.
pub const PSDHTML_OUTPUT_VERSION: &str = "0.1.0";

/// Everything the binary prints on stdout.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum PsdOutput {
    Convert(ConvertOutput),
    Inspect(InspectOutput),
}

/// Result of one `convert` run, keyed by archive-relative document name.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConvertOutput {
    pub success: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub results: BTreeMap<String, DocumentResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<ErrorPayload>,
}

impl ConvertOutput {
    pub fn completed(results: BTreeMap<String, DocumentResult>) -> Self {
        Self {
            success: true,
            results,
            error: None,
            error_detail: None,
        }
    }

    /// Top-level failure: no document was processed.
    pub fn failed(payload: ErrorPayload) -> Self {
        Self {
            success: false,
            results: BTreeMap::new(),
            error: Some(payload.message.clone()),
            error_detail: Some(payload),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentResult {
    pub success: bool,
    pub html: String,
    pub css: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DocumentResult {
    pub fn converted(html: String, css: String) -> Self {
        Self {
            success: true,
            html,
            css,
            error: None,
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            html: String::new(),
            css: String::new(),
            error: Some(error.into()),
        }
    }
}

/// Classified layer trees of every document in an archive.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectOutput {
    pub version: String,
    pub success: bool,
    pub documents: BTreeMap<String, InspectedDocument>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InspectedDocument {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub layers: Vec<ClassifiedLayer>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
