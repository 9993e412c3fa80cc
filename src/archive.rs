//! Input archive handling.
//!
//! The archive is unpacked into a temporary directory that lives as long as
//! the [`ExtractedArchive`]; dropping it removes the directory on every exit
//! path, including errors.

use std::fs::File;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::decode::DocumentDecoder;
use crate::error::{ConvertError, Result};

/// Metadata folder macOS adds to archives it creates.
const MACOS_METADATA_DIR: &str = "__MACOSX";

/// Rejects paths that are not existing `.zip` files, before anything is read.
pub fn validate_archive_path(path: &Path) -> Result<()> {
    let is_zip = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("zip"));
    if !is_zip {
        return Err(ConvertError::input("Input file must be a ZIP file"));
    }
    if !path.is_file() {
        return Err(ConvertError::input(format!(
            "File not found: {}",
            path.display()
        )));
    }
    Ok(())
}

#[derive(Debug)]
pub struct ExtractedArchive {
    dir: TempDir,
    documents: Vec<PathBuf>,
}

impl ExtractedArchive {
    /// Validates, extracts and discovers the documents `decoder` accepts.
    pub fn open(path: &Path, decoder: &dyn DocumentDecoder) -> Result<Self> {
        validate_archive_path(path)?;

        let dir = TempDir::new()?;
        let mut archive = ZipArchive::new(File::open(path)?)?;
        archive.extract(dir.path())?;
        info!(
            archive = %path.display(),
            entries = archive.len(),
            "extracted archive"
        );

        let documents = discover_documents(dir.path(), decoder);
        if documents.is_empty() {
            return Err(ConvertError::input("No PSD files found in the ZIP"));
        }
        debug!(count = documents.len(), "documents discovered");
        Ok(Self { dir, documents })
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn documents(&self) -> &[PathBuf] {
        &self.documents
    }

    /// Archive-relative name of a discovered document, `/`-separated.
    pub fn display_name(&self, document: &Path) -> String {
        document
            .strip_prefix(self.root())
            .unwrap_or(document)
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Recursive, sorted, skipping macOS metadata.
fn discover_documents(root: &Path, decoder: &dyn DocumentDecoder) -> Vec<PathBuf> {
    let mut documents: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| e.file_name() != MACOS_METADATA_DIR)
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.file_name().to_str().is_some_and(|name| decoder.matches(name)))
        .map(|e| e.into_path())
        .collect();
    documents.sort();
    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode::ExportDecoder;
    use std::io::Write;
    use zip::write::FileOptions;
    use zip::ZipWriter;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let mut zip = ZipWriter::new(File::create(path).expect("create zip"));
        for (name, body) in entries {
            zip.start_file(*name, FileOptions::default())
                .expect("start entry");
            zip.write_all(body.as_bytes()).expect("write entry");
        }
        zip.finish().expect("finish zip");
    }

    #[test]
    fn rejects_non_zip_extension_before_reading() {
        let err = validate_archive_path(Path::new("/does/not/exist/banner.psd"))
            .expect_err("extension check");
        assert!(err.to_string().contains("ZIP file"));
    }

    #[test]
    fn reports_missing_file() {
        let err = validate_archive_path(Path::new("/does/not/exist/banner.zip"))
            .expect_err("missing file");
        assert_eq!(err.to_string(), "File not found: /does/not/exist/banner.zip");
    }

    #[test]
    fn discovers_documents_sorted_and_skips_metadata() {
        let dir = TempDir::new().expect("tempdir");
        let zip_path = dir.path().join("banners.zip");
        write_zip(
            &zip_path,
            &[
                ("b/second.psd.json", "{}"),
                ("__MACOSX/b/._second.psd.json", "junk"),
                ("a.psd.json", "{}"),
                ("readme.txt", "hello"),
            ],
        );

        let archive = ExtractedArchive::open(&zip_path, &ExportDecoder).expect("open");
        let names: Vec<String> = archive
            .documents()
            .iter()
            .map(|d| archive.display_name(d))
            .collect();
        assert_eq!(names, vec!["a.psd.json", "b/second.psd.json"]);
    }

    #[test]
    fn archive_without_documents_is_an_input_error() {
        let dir = TempDir::new().expect("tempdir");
        let zip_path = dir.path().join("empty.zip");
        write_zip(&zip_path, &[("notes.txt", "nothing here")]);

        let err = ExtractedArchive::open(&zip_path, &ExportDecoder).expect_err("no documents");
        assert!(matches!(err, ConvertError::Input(_)));
        assert_eq!(err.to_string(), "No PSD files found in the ZIP");
    }

    #[test]
    fn temporary_directory_is_removed_on_drop() {
        let dir = TempDir::new().expect("tempdir");
        let zip_path = dir.path().join("one.zip");
        write_zip(&zip_path, &[("one.psd.json", "{}")]);

        let archive = ExtractedArchive::open(&zip_path, &ExportDecoder).expect("open");
        let root = archive.root().to_path_buf();
        assert!(root.exists());
        drop(archive);
        assert!(!root.exists());
    }
}
