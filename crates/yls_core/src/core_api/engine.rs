use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::CodecConfig;
use crate::document::{Document, Node, ScalarKind, ScalarValue};
use crate::error::{LoadError, PatchError, SaveError, TransportError};
use crate::parser::HEADING_PREFIX;
use crate::path::FieldPath;
use crate::persist::{self, ContainerFormat};

use super::fields::{self, EDITABLE_FIELDS, FieldSpec, SKILL_COLUMNS, STAT_COLUMNS};
use super::player;
use super::types::{
    ChannelSummary, FieldEntry, PlayerSummary, SkillEntry, Snapshot, StatEntry, TableSummary,
    ValidationIssue,
};

/// Tables every save written by the game contains.
pub const REQUIRED_TABLES: [&str; 3] = ["Savegame", "Youtuber", "Channel"];

#[derive(Debug, Default, Clone)]
pub struct Engine {
    config: CodecConfig,
}

/// An open save plus its unsaved-changes flag.
#[derive(Debug)]
pub struct Session {
    document: Document,
    dirty: bool,
    source: Option<PathBuf>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn open_bytes<B: AsRef<[u8]>>(
        &self,
        bytes: B,
        format: ContainerFormat,
    ) -> Result<Session, LoadError> {
        let document = persist::load_bytes(bytes.as_ref(), format, &self.config)?;
        Ok(Session::new(document, None))
    }

    pub fn open_path(&self, path: &Path) -> Result<Session, LoadError> {
        let document = persist::load_with_config(path, &self.config)?;
        Ok(Session::new(document, Some(path.to_path_buf())))
    }

    pub fn list_editable_fields(&self) -> &'static [FieldSpec] {
        EDITABLE_FIELDS
    }
}

fn rejected(path: &FieldPath, reason: String) -> PatchError {
    warn!(path = %path, reason = %reason, "rejected edit");
    PatchError::InvalidValue {
        path: path.clone(),
        reason,
    }
}

impl Session {
    pub fn new(document: Document, source: Option<PathBuf>) -> Self {
        Self {
            document,
            dirty: false,
            source,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// File the session was opened from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Reads any cell. Whitelisted fields are reported as their declared
    /// kind, so a text field holding `007` reads back as text.
    pub fn get(&self, path: &FieldPath) -> Option<ScalarValue> {
        let scalar = self.document.scalar(path)?;
        let value = match (fields::lookup_path(path).map(|spec| spec.kind), scalar.value()) {
            (Some(ScalarKind::Text), _) => ScalarValue::Text(scalar.text().to_string()),
            (Some(ScalarKind::Float), ScalarValue::Int(v)) => ScalarValue::Float(*v as f64),
            (_, value) => value.clone(),
        };
        Some(value)
    }

    /// Replaces one whitelisted scalar. On error nothing is modified.
    pub fn set(&mut self, path: &FieldPath, value: ScalarValue) -> Result<(), PatchError> {
        let spec = self.editable(path)?;
        let value = spec
            .check(value)
            .and_then(|value| self.keeps_row_shape(path, value))
            .map_err(|reason| rejected(path, reason))?;
        self.store(path, value)
    }

    /// Like [`Session::set`], parsing `input` as the field's declared kind.
    pub fn set_from_str(&mut self, path: &FieldPath, input: &str) -> Result<(), PatchError> {
        let spec = self.editable(path)?;
        let value = spec
            .parse_input(input)
            .and_then(|value| self.keeps_row_shape(path, value))
            .map_err(|reason| rejected(path, reason))?;
        self.store(path, value)
    }

    fn editable(&self, path: &FieldPath) -> Result<&'static FieldSpec, PatchError> {
        let Some(spec) = fields::lookup_path(path) else {
            warn!(path = %path, "rejected edit of non-editable field");
            return Err(PatchError::NotEditable { path: path.clone() });
        };
        match self.document.resolve(path) {
            None => Err(PatchError::PathNotFound { path: path.clone() }),
            Some(Node::Scalar(_)) => Ok(spec),
            Some(_) => Err(PatchError::NotScalar { path: path.clone() }),
        }
    }

    /// Rejects text that would make the edited line read back as something
    /// other than the same row: a heading when it leads the row, or a blank line.
    fn keeps_row_shape(
        &self,
        path: &FieldPath,
        value: ScalarValue,
    ) -> Result<ScalarValue, String> {
        let ScalarValue::Text(text) = &value else {
            return Ok(value);
        };
        let Some((table, row, column)) = path.as_cell() else {
            return Ok(value);
        };
        let Some(row) = self.document.table(table).and_then(|table| table.row(row)) else {
            return Ok(value);
        };

        if row.columns().next() == Some(column) && text.as_bytes().starts_with(HEADING_PREFIX) {
            return Err(format!("{text:?} would start a new table"));
        }

        let blank = |cell: &str| cell.bytes().all(|b| b.is_ascii_whitespace());
        let others_blank = row
            .columns()
            .filter(|&name| name != column)
            .all(|name| row.get(name).is_none_or(|cell| blank(cell.text())));
        if others_blank && blank(text) {
            return Err("the row would be left blank".to_string());
        }

        Ok(value)
    }

    fn store(&mut self, path: &FieldPath, value: ScalarValue) -> Result<(), PatchError> {
        let scalar = self
            .document
            .resolve_mut(path)
            .and_then(Node::as_scalar_mut)
            .ok_or_else(|| PatchError::PathNotFound { path: path.clone() })?;
        scalar.replace(value);
        debug!(path = %path, text = scalar.text(), "field updated");
        self.dirty = true;
        Ok(())
    }

    pub fn player_youtuber_row(&self) -> Option<usize> {
        player::player_youtuber_row(&self.document)
    }

    pub fn player_channel_row(&self) -> Option<usize> {
        player::player_channel_row(&self.document)
    }

    fn cell(&self, table: &str, row: usize, column: &str) -> Option<ScalarValue> {
        self.get(&FieldPath::cell(table, row, column))
    }

    fn cell_i64(&self, table: &str, row: usize, column: &str) -> Option<i64> {
        self.cell(table, row, column)?.as_i64()
    }

    fn cell_f64(&self, table: &str, row: usize, column: &str) -> Option<f64> {
        self.cell(table, row, column)?.as_f64()
    }

    fn cell_text(&self, table: &str, row: usize, column: &str) -> Option<String> {
        let path = FieldPath::cell(table, row, column);
        self.document
            .scalar(&path)
            .map(|scalar| scalar.text().to_string())
    }

    pub fn snapshot(&self) -> Snapshot {
        let save_row = player::player_row(&self.document, "Savegame");
        let player = self.player_youtuber_row().map(|row| PlayerSummary {
            row,
            name: self.cell_text("Youtuber", row, "Name"),
            energy: self.cell_i64("Youtuber", row, "Energy"),
            hunger: self.cell_i64("Youtuber", row, "Hunger"),
            social_life: self.cell_i64("Youtuber", row, "Social_life"),
            motivation: self.cell_i64("Youtuber", row, "Motivation"),
            stats: STAT_COLUMNS
                .iter()
                .map(|&name| StatEntry {
                    name,
                    value: self.cell_f64("Youtuber", row, name),
                })
                .collect(),
            skills: SKILL_COLUMNS
                .iter()
                .map(|&(name, level, exp)| SkillEntry {
                    name,
                    level: self.cell_i64("Youtuber", row, level),
                    exp: self.cell_i64("Youtuber", row, exp),
                })
                .collect(),
        });
        let channel = self.player_channel_row().map(|row| ChannelSummary {
            row,
            name: self.cell_text("Channel", row, "Name"),
            subscribers: self.cell_i64("Channel", row, "Subscribers"),
            views: self.cell_i64("Channel", row, "Views"),
        });

        Snapshot {
            save_name: save_row.and_then(|row| self.cell_text("Savegame", row, "Name")),
            current_date: save_row.and_then(|row| self.cell_f64("Savegame", row, "Current_date")),
            money: save_row.and_then(|row| self.cell_i64("Savegame", row, "Money")),
            house: save_row.and_then(|row| self.cell_i64("Savegame", row, "House")),
            player,
            channel,
            tables: self.table_summaries(),
        }
    }

    pub fn table_summaries(&self) -> Vec<TableSummary> {
        self.document
            .tables()
            .map(|(name, node)| TableSummary {
                name: name.to_string(),
                rows: self.document.table(name).map(|table| table.row_count()),
                opaque: matches!(node, Node::Opaque(_)),
            })
            .collect()
    }

    /// Every whitelisted field resolved against the player's rows.
    pub fn field_entries(&self) -> Vec<FieldEntry> {
        EDITABLE_FIELDS
            .iter()
            .map(|spec| {
                let row = player::player_row(&self.document, spec.table);
                let path = spec.path(row.unwrap_or(0));
                let value = row.and_then(|_| self.get(&path));
                let text = row.and_then(|_| self.document.scalar(&path).map(|s| s.text().to_string()));
                FieldEntry {
                    path,
                    label: spec.label,
                    kind: spec.kind,
                    value,
                    text,
                }
            })
            .collect()
    }

    pub fn validate(&self) -> Vec<ValidationIssue> {
        REQUIRED_TABLES
            .iter()
            .filter(|name| self.document.table(name).is_none())
            .map(|&table| ValidationIssue {
                table,
                message: format!("missing required table {table}"),
            })
            .collect()
    }

    pub fn to_raw_bytes(&self) -> Vec<u8> {
        self.document.to_bytes()
    }

    pub fn to_container_bytes(&self, format: ContainerFormat) -> Result<Vec<u8>, TransportError> {
        persist::to_container_bytes(&self.document, format)
    }

    /// Writes the document to `path`. The dirty flag is cleared only once the
    /// new file is in place.
    pub fn save(&mut self, path: &Path) -> Result<(), SaveError> {
        persist::save(&self.document, path)?;
        self.dirty = false;
        Ok(())
    }
}
