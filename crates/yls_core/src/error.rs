use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::path::FieldPath;

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("container is not valid base64 text: {source}")]
    InvalidEncoding {
        #[source]
        source: base64::DecodeError,
    },
    #[error("compressed stream is corrupt or truncated: {source}")]
    CorruptStream {
        #[source]
        source: io::Error,
    },
    #[error("failed to compress save data: {source}")]
    Compress {
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed save data at byte {offset}: {reason}")]
    Malformed { offset: usize, reason: String },
}

impl ParseError {
    pub fn offset(&self) -> usize {
        match self {
            Self::Malformed { offset, .. } => *offset,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum PatchError {
    #[error("invalid value for {path}: {reason}")]
    InvalidValue { path: FieldPath, reason: String },
    #[error("field {path} does not exist in this save")]
    PathNotFound { path: FieldPath },
    #[error("field {path} is not editable")]
    NotEditable { path: FieldPath },
    #[error("{path} does not name a single value")]
    NotScalar { path: FieldPath },
}

impl PatchError {
    pub fn path(&self) -> &FieldPath {
        match self {
            Self::InvalidValue { path, .. }
            | Self::PathNotFound { path }
            | Self::NotEditable { path }
            | Self::NotScalar { path } => path,
        }
    }
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

#[derive(Debug, Error)]
pub enum SaveError {
    #[error(transparent)]
    Encode(#[from] TransportError),
    #[error("failed to write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to replace {target_path}; new data kept at {temp_path}: {source}")]
    RenameFailed {
        temp_path: PathBuf,
        target_path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Error)]
#[error("failed to back up {path} to {backup_path}: {source}")]
pub struct BackupError {
    pub path: PathBuf,
    pub backup_path: PathBuf,
    #[source]
    pub source: io::Error,
}
