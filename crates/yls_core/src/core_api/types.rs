use serde::Serialize;

use crate::document::{ScalarKind, ScalarValue};
use crate::path::FieldPath;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub save_name: Option<String>,
    pub current_date: Option<f64>,
    pub money: Option<i64>,
    pub house: Option<i64>,
    pub player: Option<PlayerSummary>,
    pub channel: Option<ChannelSummary>,
    pub tables: Vec<TableSummary>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerSummary {
    pub row: usize,
    pub name: Option<String>,
    pub energy: Option<i64>,
    pub hunger: Option<i64>,
    pub social_life: Option<i64>,
    pub motivation: Option<i64>,
    pub stats: Vec<StatEntry>,
    pub skills: Vec<SkillEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatEntry {
    pub name: &'static str,
    pub value: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillEntry {
    pub name: &'static str,
    pub level: Option<i64>,
    pub exp: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChannelSummary {
    pub row: usize,
    pub name: Option<String>,
    pub subscribers: Option<i64>,
    pub views: Option<i64>,
}

/// A top-level table. Opaque tables are kept verbatim, so they report no row count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSummary {
    pub name: String,
    pub rows: Option<usize>,
    pub opaque: bool,
}

/// An editable field resolved against the player's rows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldEntry {
    pub path: FieldPath,
    pub label: &'static str,
    pub kind: ScalarKind,
    pub value: Option<ScalarValue>,
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub table: &'static str,
    pub message: String,
}
