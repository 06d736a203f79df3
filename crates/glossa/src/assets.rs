#![forbid(unsafe_code)]

//! Asset source boundary: how the engine reaches raw locale data.
//!
//! The engine only ever asks for three things — text, image bytes, and a
//! directory listing — so that is the whole trait. `FsAssetSource` is the
//! production implementation; `MemoryAssetSource` backs unit tests and
//! doctests without touching disk.

use std::collections::HashMap;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("asset not found: {0}")]
    NotFound(String),

    #[error("I/O error reading '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Source of raw locale assets, addressed by `/`-separated relative paths.
pub trait AssetSource {
    /// Load a text asset. Missing files are an error, not a panic.
    fn load_text(&self, path: &str) -> Result<String, AssetError>;

    /// Load an image asset as raw bytes. The engine never decodes these;
    /// it only stores and hands them back.
    fn load_image(&self, path: &str) -> Result<Vec<u8>, AssetError>;

    /// List the entry names directly under `path`. A missing or unreadable
    /// directory yields an empty listing.
    fn list_directory(&self, path: &str) -> Vec<String>;
}

/// Filesystem-backed asset source rooted at a base directory.
#[derive(Debug, Clone)]
pub struct FsAssetSource {
    root: PathBuf,
}

impl FsAssetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        let mut full = self.root.clone();
        for part in path.split('/').filter(|p| !p.is_empty()) {
            full.push(part);
        }
        full
    }
}

impl AssetSource for FsAssetSource {
    fn load_text(&self, path: &str) -> Result<String, AssetError> {
        let full = self.resolve(path);
        std::fs::read_to_string(&full).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(path.to_string()),
            _ => AssetError::Io {
                path: path.to_string(),
                source,
            },
        })
    }

    fn load_image(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        let full = self.resolve(path);
        std::fs::read(&full).map_err(|source| match source.kind() {
            std::io::ErrorKind::NotFound => AssetError::NotFound(path.to_string()),
            _ => AssetError::Io {
                path: path.to_string(),
                source,
            },
        })
    }

    fn list_directory(&self, path: &str) -> Vec<String> {
        let full = self.resolve(path);
        let Ok(entries) = std::fs::read_dir(&full) else {
            tracing::debug!(path, "directory listing unavailable");
            return Vec::new();
        };
        let mut names: Vec<String> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort_unstable();
        names
    }
}

/// In-memory asset source for tests and examples.
///
/// ```
/// use glossa::assets::{AssetSource, MemoryAssetSource};
///
/// let mut source = MemoryAssetSource::new();
/// source.insert_text("locales/en-US/data.tsv", "flag\tvalue\t\n");
/// assert!(source.load_text("locales/en-US/data.tsv").is_ok());
/// assert_eq!(source.list_directory("locales"), vec!["en-US"]);
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryAssetSource {
    texts: HashMap<String, String>,
    images: HashMap<String, Vec<u8>>,
}

impl MemoryAssetSource {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_text(&mut self, path: impl Into<String>, text: impl Into<String>) {
        self.texts.insert(path.into(), text.into());
    }

    pub fn insert_image(&mut self, path: impl Into<String>, bytes: Vec<u8>) {
        self.images.insert(path.into(), bytes);
    }
}

impl AssetSource for MemoryAssetSource {
    fn load_text(&self, path: &str) -> Result<String, AssetError> {
        self.texts
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }

    fn load_image(&self, path: &str) -> Result<Vec<u8>, AssetError> {
        self.images
            .get(path)
            .cloned()
            .ok_or_else(|| AssetError::NotFound(path.to_string()))
    }

    fn list_directory(&self, path: &str) -> Vec<String> {
        let prefix = format!("{}/", path.trim_end_matches('/'));
        let mut names: Vec<String> = self
            .texts
            .keys()
            .chain(self.images.keys())
            .filter_map(|k| k.strip_prefix(&prefix))
            .map(|rest| match rest.split_once('/') {
                Some((head, _)) => head.to_string(),
                None => rest.to_string(),
            })
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::{AssetError, AssetSource, FsAssetSource, MemoryAssetSource};

    #[test]
    fn memory_source_round_trips_text() {
        let mut source = MemoryAssetSource::new();
        source.insert_text("locales/index.xml", "<data/>");
        assert_eq!(source.load_text("locales/index.xml").unwrap(), "<data/>");
        assert!(matches!(
            source.load_text("locales/missing.xml"),
            Err(AssetError::NotFound(_))
        ));
    }

    #[test]
    fn memory_source_lists_first_segments() {
        let mut source = MemoryAssetSource::new();
        source.insert_text("locales/en-US/data.tsv", "");
        source.insert_text("locales/fr-FR/data.tsv", "");
        source.insert_text("locales/index.xml", "");
        source.insert_image("locales/_flags/en-US.png", vec![1]);
        assert_eq!(
            source.list_directory("locales"),
            vec!["_flags", "en-US", "fr-FR", "index.xml"]
        );
    }

    #[test]
    fn fs_source_missing_file_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let source = FsAssetSource::new(dir.path());
        assert!(matches!(
            source.load_text("locales/nothing.tsv"),
            Err(AssetError::NotFound(_))
        ));
        assert!(source.list_directory("locales").is_empty());
    }

    #[test]
    fn fs_source_reads_written_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("locales/en-US")).unwrap();
        std::fs::write(dir.path().join("locales/en-US/data.tsv"), "a\tb\t\n").unwrap();
        let source = FsAssetSource::new(dir.path());
        assert_eq!(
            source.load_text("locales/en-US/data.tsv").unwrap(),
            "a\tb\t\n"
        );
        assert_eq!(source.list_directory("locales"), vec!["en-US"]);
    }
}
