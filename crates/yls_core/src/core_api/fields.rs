use serde::Serialize;

use crate::document::{ScalarKind, ScalarValue};
use crate::path::FieldPath;

/// One editable column. Applies to every row of `table`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    pub table: &'static str,
    pub column: &'static str,
    pub label: &'static str,
    pub kind: ScalarKind,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

const fn text(table: &'static str, column: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        table,
        column,
        label,
        kind: ScalarKind::Text,
        min: None,
        max: None,
    }
}

const fn int(
    table: &'static str,
    column: &'static str,
    label: &'static str,
    min: i64,
    max: Option<i64>,
) -> FieldSpec {
    FieldSpec {
        table,
        column,
        label,
        kind: ScalarKind::Int,
        min: Some(min),
        max,
    }
}

const fn float(table: &'static str, column: &'static str, label: &'static str) -> FieldSpec {
    FieldSpec {
        table,
        column,
        label,
        kind: ScalarKind::Float,
        min: Some(0),
        max: None,
    }
}

pub const EDITABLE_FIELDS: &[FieldSpec] = &[
    text("Savegame", "Name", "Save name"),
    float("Savegame", "Current_date", "Current date"),
    int("Savegame", "Money", "Money", 0, None),
    int("Savegame", "House", "House", 1, Some(2)),
    text("Youtuber", "Name", "Name"),
    int("Youtuber", "Energy", "Energy", 0, Some(100)),
    int("Youtuber", "Hunger", "Hunger", 0, Some(100)),
    int("Youtuber", "Social_life", "Social life", 0, Some(100)),
    int("Youtuber", "Motivation", "Motivation", 0, Some(100)),
    float("Youtuber", "Scripting", "Scripting"),
    float("Youtuber", "Acting", "Acting"),
    float("Youtuber", "Sound", "Sound"),
    float("Youtuber", "Editing", "Editing"),
    float("Youtuber", "Effects", "Effects"),
    int("Youtuber", "Gaming", "Gaming level", 0, None),
    int("Youtuber", "Gaming_exp", "Gaming exp", 0, None),
    int("Youtuber", "Cooking", "Cooking level", 0, None),
    int("Youtuber", "Cooking_exp", "Cooking exp", 0, None),
    int("Youtuber", "Life", "Life level", 0, None),
    int("Youtuber", "Life_exp", "Life exp", 0, None),
    int("Youtuber", "Music", "Music level", 0, None),
    int("Youtuber", "Music_exp", "Music exp", 0, None),
    int("Youtuber", "Fashion", "Fashion level", 0, None),
    int("Youtuber", "Fashion_exp", "Fashion exp", 0, None),
    int("Youtuber", "Main_level", "Main level", 0, None),
    int("Youtuber", "Main_exp", "Main exp", 0, None),
    text("Channel", "Name", "Channel name"),
    int("Channel", "Subscribers", "Subscribers", 0, None),
    int("Channel", "Views", "Views", 0, None),
];

pub const STAT_COLUMNS: [&str; 5] = ["Scripting", "Acting", "Sound", "Editing", "Effects"];

/// Skill name with its level and exp columns.
pub const SKILL_COLUMNS: [(&str, &str, &str); 6] = [
    ("Gaming", "Gaming", "Gaming_exp"),
    ("Cooking", "Cooking", "Cooking_exp"),
    ("Life", "Life", "Life_exp"),
    ("Music", "Music", "Music_exp"),
    ("Fashion", "Fashion", "Fashion_exp"),
    ("Main", "Main_level", "Main_exp"),
];

pub fn lookup(table: &str, column: &str) -> Option<&'static FieldSpec> {
    EDITABLE_FIELDS
        .iter()
        .find(|spec| spec.table == table && spec.column == column)
}

pub fn lookup_path(path: &FieldPath) -> Option<&'static FieldSpec> {
    let (table, _, column) = path.as_cell()?;
    lookup(table, column)
}

impl FieldSpec {
    pub fn path(&self, row: usize) -> FieldPath {
        FieldPath::cell(self.table, row, self.column)
    }

    /// Validates `value` against the declared kind and range. Ints are
    /// widened for float fields; the returned value is the one to store.
    pub fn check(&self, value: ScalarValue) -> Result<ScalarValue, String> {
        let value = match (self.kind, value) {
            (ScalarKind::Float, ScalarValue::Int(v)) => ScalarValue::Float(v as f64),
            (_, value) => value,
        };
        if value.kind() != self.kind {
            return Err(format!("expected {}, got {}", self.kind, value.kind()));
        }

        match &value {
            ScalarValue::Int(v) => self.check_range(*v as f64, &v.to_string())?,
            ScalarValue::Float(v) => {
                if !v.is_finite() {
                    return Err(format!("{v} is not a finite number"));
                }
                self.check_range(*v, &v.to_string())?;
            }
            ScalarValue::Text(v) => {
                if v.contains(['\t', '\r', '\n']) {
                    return Err("text may not contain tabs or line breaks".to_string());
                }
            }
            ScalarValue::Bool(_) => {}
        }

        Ok(value)
    }

    fn check_range(&self, v: f64, shown: &str) -> Result<(), String> {
        if let Some(min) = self.min {
            if v < min as f64 {
                return Err(format!("{shown} is below the minimum of {min}"));
            }
        }
        if let Some(max) = self.max {
            if v > max as f64 {
                return Err(format!("{shown} is above the maximum of {max}"));
            }
        }
        Ok(())
    }

    /// Parses user input as this field's kind, then checks it.
    pub fn parse_input(&self, input: &str) -> Result<ScalarValue, String> {
        let value = match self.kind {
            ScalarKind::Int => input
                .trim()
                .parse::<i64>()
                .map(ScalarValue::Int)
                .map_err(|_| format!("{input:?} is not an integer"))?,
            ScalarKind::Float => input
                .trim()
                .parse::<f64>()
                .map(ScalarValue::Float)
                .map_err(|_| format!("{input:?} is not a number"))?,
            ScalarKind::Bool => match input.trim() {
                v if v.eq_ignore_ascii_case("true") => ScalarValue::Bool(true),
                v if v.eq_ignore_ascii_case("false") => ScalarValue::Bool(false),
                _ => return Err(format!("{input:?} is not true or false")),
            },
            ScalarKind::Text => ScalarValue::Text(input.to_string()),
        };
        self.check(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitelist_has_unique_columns() {
        for (i, spec) in EDITABLE_FIELDS.iter().enumerate() {
            assert!(
                EDITABLE_FIELDS[i + 1..]
                    .iter()
                    .all(|other| (other.table, other.column) != (spec.table, spec.column)),
                "{}/{} listed twice",
                spec.table,
                spec.column
            );
        }
    }

    #[test]
    fn lookup_by_path_ignores_row() {
        let path: FieldPath = "Channel/7/Subscribers".parse().expect("path");
        assert_eq!(lookup_path(&path).map(|spec| spec.label), Some("Subscribers"));
        assert!(lookup_path(&"Channel/0/Id".parse().expect("path")).is_none());
    }

    #[test]
    fn check_enforces_ranges() {
        let energy = lookup("Youtuber", "Energy").expect("energy");
        assert_eq!(energy.check(ScalarValue::Int(100)), Ok(ScalarValue::Int(100)));
        assert!(energy.check(ScalarValue::Int(101)).is_err());
        assert!(energy.check(ScalarValue::Int(-1)).is_err());

        let house = lookup("Savegame", "House").expect("house");
        assert!(house.check(ScalarValue::Int(0)).is_err());
        assert!(house.check(ScalarValue::Int(3)).is_err());
    }

    #[test]
    fn check_widens_ints_for_float_fields() {
        let sound = lookup("Youtuber", "Sound").expect("sound");
        assert_eq!(sound.check(ScalarValue::Int(3)), Ok(ScalarValue::Float(3.0)));
        assert!(sound.check(ScalarValue::Float(f64::NAN)).is_err());
        assert!(sound.check(ScalarValue::Float(-0.5)).is_err());

        let money = lookup("Savegame", "Money").expect("money");
        assert!(money.check(ScalarValue::Float(1.0)).is_err());
    }

    #[test]
    fn text_fields_stay_single_line() {
        let name = lookup("Channel", "Name").expect("name");
        assert!(name.check(ScalarValue::Text("a\tb".to_string())).is_err());
        assert!(name.check(ScalarValue::Int(5)).is_err());
        assert_eq!(
            name.parse_input("123"),
            Ok(ScalarValue::Text("123".to_string()))
        );
    }

    #[test]
    fn parse_input_follows_kind() {
        let subs = lookup("Channel", "Subscribers").expect("subs");
        assert_eq!(subs.parse_input("25000"), Ok(ScalarValue::Int(25000)));
        assert!(subs.parse_input("-5").is_err());
        assert!(subs.parse_input("lots").is_err());

        let date = lookup("Savegame", "Current_date").expect("date");
        assert_eq!(date.parse_input("14.5"), Ok(ScalarValue::Float(14.5)));
    }
}
