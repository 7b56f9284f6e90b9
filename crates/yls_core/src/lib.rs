pub mod config;
pub mod core_api;
pub mod document;
pub mod error;
pub mod layout;
pub mod parser;
pub mod path;
pub mod persist;
pub mod reader;
pub mod serializer;
pub mod transport;

pub use config::CodecConfig;
pub use document::{Document, Node, NodeKind, Scalar, ScalarKind, ScalarValue};
pub use error::{BackupError, LoadError, ParseError, PatchError, SaveError, TransportError};
pub use path::FieldPath;
pub use persist::{ContainerFormat, backup, load, save};
