//! JSON document sources.
//!
//! A document is merged over the record's current JSON form and decoded back
//! into the record in one step; it is not walked field by field. Keys the
//! record does not know are ignored, keys the document omits keep their
//! current values, and nested objects merge recursively.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::ConfigError;
use crate::merge::deep_merge;
use crate::multi::Loader;

/// File-name suffix that marks a configuration document inside a directory.
pub const CONF_SUFFIX: &str = ".conf";

/// A single JSON document on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonFile {
    path: PathBuf,
}

impl JsonFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFile { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<R> Loader<R> for JsonFile
where
    R: Serialize + DeserializeOwned,
{
    fn load(&self, record: &mut R) -> Result<(), ConfigError> {
        let bytes = fs::read(&self.path).map_err(|source| ConfigError::ReadFile {
            path: self.path.clone(),
            source,
        })?;
        apply_document(&self.path, &bytes, record)?;
        debug!(path = %self.path.display(), "applied config document");
        Ok(())
    }
}

/// Merge the JSON document in `bytes` into `record`.
///
/// `path` is only used for diagnostics. On error the record is left unchanged.
pub fn apply_document<R>(path: &Path, bytes: &[u8], record: &mut R) -> Result<(), ConfigError>
where
    R: Serialize + DeserializeOwned,
{
    let document_error = |source: serde_json::Error| ConfigError::Document {
        path: path.to_path_buf(),
        source,
    };

    let document: serde_json::Value = serde_json::from_slice(bytes).map_err(document_error)?;
    let current = serde_json::to_value(&*record).map_err(document_error)?;
    let merged = deep_merge(current, document);

    let mut ignored = Vec::new();
    let updated: R = serde_ignored::deserialize(merged, |key| ignored.push(key.to_string()))
        .map_err(document_error)?;
    if !ignored.is_empty() {
        debug!(path = %path.display(), keys = ?ignored, "ignoring unknown keys");
    }

    *record = updated;
    Ok(())
}

/// Every `.conf` document in a list of directories.
///
/// Directories are processed in the order given; inside each one, documents
/// are applied in file-name order so later names win. Subdirectories are not
/// searched. A directory that cannot be listed is logged and skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JsonDirs {
    dirs: Vec<PathBuf>,
}

impl JsonDirs {
    pub fn new<I, P>(dirs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        JsonDirs {
            dirs: dirs.into_iter().map(Into::into).collect(),
        }
    }

    /// The platform config directory for `app_name` (XDG on Linux,
    /// ~/Library/Application Support on macOS). Empty if it cannot be determined.
    #[cfg(feature = "platform-dirs")]
    pub fn platform(app_name: &str) -> Self {
        let dirs = directories::ProjectDirs::from("", "", app_name)
            .map(|proj| proj.config_dir().to_path_buf())
            .into_iter()
            .collect();
        JsonDirs { dirs }
    }

    pub fn dirs(&self) -> &[PathBuf] {
        &self.dirs
    }
}

/// Sorted `.conf` files directly inside `dir`.
fn conf_files(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let matches = path
            .file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| name.ends_with(CONF_SUFFIX));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

impl<R> Loader<R> for JsonDirs
where
    R: Serialize + DeserializeOwned,
{
    fn load(&self, record: &mut R) -> Result<(), ConfigError> {
        for dir in &self.dirs {
            let files = match conf_files(dir) {
                Ok(files) => files,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "failed to read directory");
                    continue;
                }
            };
            for file in files {
                JsonFile::new(file).load(record)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fixtures::test::{PortConfig, TestConfig};
    use tempfile::TempDir;

    #[test]
    fn file_overrides_present_keys_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("app.conf");
        fs::write(&path, r#"{"port": 3000, "website": {"title": "home"}}"#).unwrap();

        let mut cfg = TestConfig::with_defaults();
        cfg.website.counter = 4;
        JsonFile::new(&path).load(&mut cfg).unwrap();

        assert_eq!(cfg.port, 3000);
        assert_eq!(cfg.website.title, "home");
        assert_eq!(cfg.website.counter, 4); // sibling in nested object preserved
        assert_eq!(cfg.listen_addr, ":8080"); // default preserved
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let mut cfg = PortConfig { port: 1 };
        apply_document(Path::new("x.conf"), br#"{"typo": 5, "port": 2}"#, &mut cfg).unwrap();
        assert_eq!(cfg.port, 2);
    }

    #[test]
    fn uses_serde_names() {
        let mut cfg = TestConfig::default();
        apply_document(Path::new("x.conf"), br#"{"upin": 9}"#, &mut cfg).unwrap();
        assert_eq!(cfg.un_pin, 9);
    }

    #[test]
    fn maps_merge_and_arrays_replace() {
        let mut cfg = TestConfig::with_defaults();
        cfg.friends.insert("ann".into(), 1);
        apply_document(
            Path::new("x.conf"),
            br#"{"friends": {"bob": 2}, "names": ["z"]}"#,
            &mut cfg,
        )
        .unwrap();
        assert_eq!(cfg.friends.len(), 2);
        assert_eq!(cfg.names, vec!["z"]);
    }

    #[test]
    fn missing_file_is_parse_error_with_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.conf");
        let mut cfg = PortConfig::default();
        let err = JsonFile::new(&path).load(&mut cfg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("absent.conf"));
    }

    #[test]
    fn malformed_document_leaves_record_untouched() {
        let mut cfg = PortConfig { port: 7 };
        let err = apply_document(Path::new("bad.conf"), b"{port: 1", &mut cfg).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.to_string().contains("bad.conf"));
        assert_eq!(cfg.port, 7);
    }

    #[test]
    fn wrong_type_is_parse_error() {
        let mut cfg = PortConfig { port: 7 };
        let err = apply_document(Path::new("t.conf"), br#"{"port": "high"}"#, &mut cfg)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Document { .. }));
        assert_eq!(cfg.port, 7);
    }

    #[test]
    fn directory_applies_conf_files_in_name_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("b.conf"), r#"{"port": 2}"#).unwrap();
        fs::write(dir.path().join("a.conf"), r#"{"port": 1}"#).unwrap();
        // Not valid JSON: would fail the load if it were read.
        fs::write(dir.path().join("notes.txt"), "port = 99").unwrap();

        let mut cfg = PortConfig { port: 0 };
        JsonDirs::new([dir.path()]).load(&mut cfg).unwrap();
        assert_eq!(cfg.port, 2);
    }

    #[test]
    fn subdirectories_are_not_searched() {
        let dir = TempDir::new().unwrap();
        fs::create_dir(dir.path().join("nested.conf")).unwrap();
        fs::write(dir.path().join("nested.conf").join("z.conf"), r#"{"port": 5}"#).unwrap();

        let mut cfg = PortConfig { port: 0 };
        JsonDirs::new([dir.path()]).load(&mut cfg).unwrap();
        assert_eq!(cfg.port, 0);
    }

    #[test]
    fn unreadable_directory_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.conf"), r#"{"port": 4}"#).unwrap();
        let missing = dir.path().join("does-not-exist");

        let mut cfg = PortConfig { port: 0 };
        JsonDirs::new([missing.as_path(), dir.path()])
            .load(&mut cfg)
            .unwrap();
        assert_eq!(cfg.port, 4);
    }

    #[test]
    fn later_directory_wins() {
        let low = TempDir::new().unwrap();
        let high = TempDir::new().unwrap();
        fs::write(low.path().join("z.conf"), r#"{"port": 1}"#).unwrap();
        fs::write(high.path().join("a.conf"), r#"{"port": 2}"#).unwrap();

        let mut cfg = PortConfig::default();
        JsonDirs::new([low.path(), high.path()]).load(&mut cfg).unwrap();
        assert_eq!(cfg.port, 2);
    }

    #[test]
    fn bad_document_stops_the_directory() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a.conf"), "not json").unwrap();
        fs::write(dir.path().join("b.conf"), r#"{"port": 2}"#).unwrap();

        let mut cfg = PortConfig { port: 0 };
        let err = JsonDirs::new([dir.path()]).load(&mut cfg).unwrap_err();
        assert!(err.to_string().contains("a.conf"));
        assert_eq!(cfg.port, 0);
    }

    #[cfg(feature = "platform-dirs")]
    #[test]
    fn platform_dir_names_the_app() {
        let dirs = JsonDirs::platform("multiconfig-test-app");
        assert!(
            dirs.dirs()
                .iter()
                .all(|d| d.to_string_lossy().contains("multiconfig-test-app"))
        );
    }
}
