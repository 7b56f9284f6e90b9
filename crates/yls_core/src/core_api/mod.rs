mod engine;
pub mod fields;
pub mod player;
mod types;

pub use engine::{Engine, REQUIRED_TABLES, Session};
pub use fields::{EDITABLE_FIELDS, FieldSpec};
pub use types::{
    ChannelSummary, FieldEntry, PlayerSummary, SkillEntry, Snapshot, StatEntry, TableSummary,
    ValidationIssue,
};
