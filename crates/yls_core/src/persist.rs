use std::ffi::OsString;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::CodecConfig;
use crate::document::Document;
use crate::error::{BackupError, LoadError, SaveError, TransportError};
use crate::parser::parse_with_config;
use crate::transport;

const TEMP_SUFFIX: &str = ".tmp";
const BACKUP_SUFFIX: &str = ".backup";

/// How a save file is stored on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerFormat {
    /// base64 text around a gzip stream, as written by the game.
    Encoded,
    /// Already-decoded table text, as produced by `decode`.
    Plain,
}

impl ContainerFormat {
    /// `.txt` files are plain; everything else is treated as an encoded save.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("txt") => Self::Plain,
            _ => Self::Encoded,
        }
    }

    pub fn unwrap_bytes(self, bytes: &[u8]) -> Result<Vec<u8>, TransportError> {
        match self {
            Self::Encoded => transport::decode(bytes),
            Self::Plain => Ok(bytes.to_vec()),
        }
    }

    pub fn wrap_bytes(self, raw: &[u8]) -> Result<Vec<u8>, TransportError> {
        match self {
            Self::Encoded => transport::encode(raw),
            Self::Plain => Ok(raw.to_vec()),
        }
    }
}

pub fn load(path: &Path) -> Result<Document, LoadError> {
    load_with_config(path, &CodecConfig::default())
}

pub fn load_with_config(path: &Path, config: &CodecConfig) -> Result<Document, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let doc = load_bytes(&bytes, ContainerFormat::from_path(path), config)?;
    info!(path = %path.display(), bytes = bytes.len(), "loaded save");
    Ok(doc)
}

pub fn load_bytes(
    bytes: &[u8],
    format: ContainerFormat,
    config: &CodecConfig,
) -> Result<Document, LoadError> {
    let raw = format.unwrap_bytes(bytes)?;
    Ok(parse_with_config(&raw, config)?)
}

pub fn to_container_bytes(doc: &Document, format: ContainerFormat) -> Result<Vec<u8>, TransportError> {
    format.wrap_bytes(&doc.to_bytes())
}

/// Encodes `doc` in the format implied by `path` and replaces the file atomically.
pub fn save(doc: &Document, path: &Path) -> Result<(), SaveError> {
    let bytes = to_container_bytes(doc, ContainerFormat::from_path(path))?;
    write_atomic(path, &bytes)
}

/// Sibling of `path` that new contents are staged in before the rename.
pub fn temp_path_for(path: &Path) -> PathBuf {
    with_suffix(path, TEMP_SUFFIX)
}

pub fn backup_path_for(path: &Path) -> PathBuf {
    with_suffix(path, BACKUP_SUFFIX)
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path
        .file_name()
        .map(|name| name.to_os_string())
        .unwrap_or_default();
    name.push(suffix);
    path.with_file_name(name)
}

/// Writes `bytes` to a temp file next to `path`, flushes it to disk, then
/// renames it over `path`. A reader of `path` sees either the old contents or
/// the new ones.
///
/// If the rename fails the temp file is left in place and named in the error.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), SaveError> {
    let temp_path = temp_path_for(path);

    if let Err(source) = write_and_sync(&temp_path, bytes) {
        let _ = fs::remove_file(&temp_path);
        return Err(SaveError::WriteFailed {
            path: temp_path,
            source,
        });
    }

    fs::rename(&temp_path, path).map_err(|source| SaveError::RenameFailed {
        temp_path: temp_path.clone(),
        target_path: path.to_path_buf(),
        source,
    })?;

    sync_parent_dir(path);
    info!(path = %path.display(), bytes = bytes.len(), "saved");
    Ok(())
}

fn write_and_sync(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(unix)]
fn sync_parent_dir(path: &Path) {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    if let Err(err) = File::open(parent).and_then(|dir| dir.sync_all()) {
        warn!(dir = %parent.display(), error = %err, "failed to sync directory after rename");
    }
}

#[cfg(not(unix))]
fn sync_parent_dir(_path: &Path) {}

/// Copies `path` to `<path>.backup`, replacing any earlier backup.
pub fn backup(path: &Path) -> Result<PathBuf, BackupError> {
    let backup_path = backup_path_for(path);
    fs::copy(path, &backup_path).map_err(|source| BackupError {
        path: path.to_path_buf(),
        backup_path: backup_path.clone(),
        source,
    })?;
    info!(path = %path.display(), backup = %backup_path.display(), "created backup");
    Ok(backup_path)
}
