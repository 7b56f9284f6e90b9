use std::fmt::Write as _;

use serde_json::{Map as JsonMap, Value as JsonValue};
use yls_core::ScalarValue;
use yls_core::core_api::{FieldEntry, Session, SkillEntry, StatEntry, TableSummary};

const SHEET_WIDTH: usize = 76;
const LABEL_WIDTH: usize = 14;
const PATH_COL_WIDTH: usize = 30;
const FIELD_LABEL_COL_WIDTH: usize = 18;
const TABLE_NAME_COL_WIDTH: usize = 28;
const ABSENT: &str = "-";

pub fn render_json_summary(session: &Session) -> JsonValue {
    let snapshot = session.snapshot();
    let mut out = JsonMap::new();

    out.insert(
        "save_name".to_string(),
        JsonValue::from(snapshot.save_name.clone()),
    );
    out.insert(
        "current_date".to_string(),
        JsonValue::from(snapshot.current_date),
    );
    out.insert("money".to_string(), JsonValue::from(snapshot.money));
    out.insert("house".to_string(), JsonValue::from(snapshot.house));

    let player = match &snapshot.player {
        Some(player) => {
            let mut map = JsonMap::new();
            map.insert("row".to_string(), JsonValue::from(player.row));
            map.insert("name".to_string(), JsonValue::from(player.name.clone()));
            map.insert("energy".to_string(), JsonValue::from(player.energy));
            map.insert("hunger".to_string(), JsonValue::from(player.hunger));
            map.insert(
                "social_life".to_string(),
                JsonValue::from(player.social_life),
            );
            map.insert("motivation".to_string(), JsonValue::from(player.motivation));
            map.insert("stats".to_string(), stats_to_json(&player.stats));
            map.insert("skills".to_string(), skills_to_json(&player.skills));
            JsonValue::Object(map)
        }
        None => JsonValue::Null,
    };
    out.insert("player".to_string(), player);

    let channel = match &snapshot.channel {
        Some(channel) => {
            let mut map = JsonMap::new();
            map.insert("row".to_string(), JsonValue::from(channel.row));
            map.insert("name".to_string(), JsonValue::from(channel.name.clone()));
            map.insert(
                "subscribers".to_string(),
                JsonValue::from(channel.subscribers),
            );
            map.insert("views".to_string(), JsonValue::from(channel.views));
            JsonValue::Object(map)
        }
        None => JsonValue::Null,
    };
    out.insert("channel".to_string(), channel);
    out.insert("tables".to_string(), tables_to_json(&snapshot.tables));

    JsonValue::Object(out)
}

/// Whitelisted fields with their current values on the player's rows.
pub fn render_fields_json(session: &Session) -> JsonValue {
    JsonValue::Array(
        session
            .field_entries()
            .iter()
            .map(field_entry_to_json)
            .collect(),
    )
}

pub fn render_validation_json(session: &Session) -> JsonValue {
    let issues = session.validate();
    let mut out = JsonMap::new();
    out.insert("valid".to_string(), JsonValue::Bool(issues.is_empty()));
    out.insert(
        "issues".to_string(),
        JsonValue::Array(
            issues
                .iter()
                .map(|issue| {
                    let mut map = JsonMap::new();
                    map.insert("table".to_string(), JsonValue::from(issue.table));
                    map.insert(
                        "message".to_string(),
                        JsonValue::String(issue.message.clone()),
                    );
                    JsonValue::Object(map)
                })
                .collect(),
        ),
    );
    JsonValue::Object(out)
}

pub fn scalar_to_json(value: &ScalarValue) -> JsonValue {
    match value {
        ScalarValue::Int(v) => JsonValue::from(*v),
        ScalarValue::Float(v) => JsonValue::from(*v),
        ScalarValue::Bool(v) => JsonValue::Bool(*v),
        ScalarValue::Text(v) => JsonValue::String(v.clone()),
    }
}

fn stats_to_json(stats: &[StatEntry]) -> JsonValue {
    let mut map = JsonMap::new();
    for stat in stats {
        map.insert(stat.name.to_string(), JsonValue::from(stat.value));
    }
    JsonValue::Object(map)
}

fn skills_to_json(skills: &[SkillEntry]) -> JsonValue {
    JsonValue::Array(
        skills
            .iter()
            .map(|skill| {
                let mut map = JsonMap::new();
                map.insert("name".to_string(), JsonValue::from(skill.name));
                map.insert("level".to_string(), JsonValue::from(skill.level));
                map.insert("exp".to_string(), JsonValue::from(skill.exp));
                JsonValue::Object(map)
            })
            .collect(),
    )
}

fn tables_to_json(tables: &[TableSummary]) -> JsonValue {
    JsonValue::Array(
        tables
            .iter()
            .map(|table| {
                let mut map = JsonMap::new();
                map.insert("name".to_string(), JsonValue::String(table.name.clone()));
                map.insert("rows".to_string(), JsonValue::from(table.rows));
                map.insert("opaque".to_string(), JsonValue::Bool(table.opaque));
                JsonValue::Object(map)
            })
            .collect(),
    )
}

fn field_entry_to_json(entry: &FieldEntry) -> JsonValue {
    let mut map = JsonMap::new();
    map.insert("path".to_string(), JsonValue::String(entry.path.to_string()));
    map.insert("label".to_string(), JsonValue::from(entry.label));
    map.insert("kind".to_string(), JsonValue::from(entry.kind.as_str()));
    map.insert(
        "value".to_string(),
        entry.value.as_ref().map_or(JsonValue::Null, scalar_to_json),
    );
    JsonValue::Object(map)
}

pub fn render_text_summary(session: &Session) -> String {
    let snapshot = session.snapshot();

    let mut out = String::new();
    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(&mut out, "{}", centered_no_trailing("YOUTUBERS LIFE", SHEET_WIDTH))
        .expect("writing to String cannot fail");
    writeln!(&mut out, "{}", centered_no_trailing("SAVE SUMMARY", SHEET_WIDTH))
        .expect("writing to String cannot fail");
    writeln!(&mut out).expect("writing to String cannot fail");

    write_pair(&mut out, "Save", &text_or_absent(snapshot.save_name.as_deref()));
    write_pair(
        &mut out,
        "Date",
        &snapshot
            .current_date
            .map_or_else(|| ABSENT.to_string(), |v| v.to_string()),
    );
    write_pair(&mut out, "Money", &number_or_absent(snapshot.money));
    write_pair(&mut out, "House", &number_or_absent(snapshot.house));

    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(&mut out, " ::: Youtuber :::").expect("writing to String cannot fail");
    match &snapshot.player {
        Some(player) => {
            write_pair(&mut out, "Name", &text_or_absent(player.name.as_deref()));
            write_pair(&mut out, "Energy", &number_or_absent(player.energy));
            write_pair(&mut out, "Hunger", &number_or_absent(player.hunger));
            write_pair(&mut out, "Social life", &number_or_absent(player.social_life));
            write_pair(&mut out, "Motivation", &number_or_absent(player.motivation));
            for stat in &player.stats {
                write_pair(
                    &mut out,
                    stat.name,
                    &stat.value.map_or_else(|| ABSENT.to_string(), |v| v.to_string()),
                );
            }

            writeln!(&mut out).expect("writing to String cannot fail");
            writeln!(&mut out, " ::: Skills :::").expect("writing to String cannot fail");
            for skill in &player.skills {
                let line = format!(
                    "  {:<label$}Lv {:<6}Exp {}",
                    skill.name,
                    number_or_absent(skill.level),
                    number_or_absent(skill.exp),
                    label = LABEL_WIDTH,
                );
                writeln!(&mut out, "{}", line.trim_end()).expect("writing to String cannot fail");
            }
        }
        None => {
            writeln!(&mut out, "  No player-controlled youtuber found.")
                .expect("writing to String cannot fail");
        }
    }

    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(&mut out, " ::: Channel :::").expect("writing to String cannot fail");
    match &snapshot.channel {
        Some(channel) => {
            write_pair(&mut out, "Name", &text_or_absent(channel.name.as_deref()));
            write_pair(&mut out, "Subscribers", &number_or_absent(channel.subscribers));
            write_pair(&mut out, "Views", &number_or_absent(channel.views));
        }
        None => {
            writeln!(&mut out, "  No channel found.").expect("writing to String cannot fail");
        }
    }

    writeln!(&mut out).expect("writing to String cannot fail");
    writeln!(&mut out, " ::: Tables :::").expect("writing to String cannot fail");
    write_tables(&mut out, &snapshot.tables);

    out
}

pub fn render_fields_text(session: &Session) -> String {
    let mut out = String::new();
    for entry in session.field_entries() {
        let value = entry.text.as_deref().unwrap_or(ABSENT);
        let line = format!(
            "{:<path_w$}{:<label_w$}{}",
            fit_column(&entry.path.to_string(), PATH_COL_WIDTH - 1),
            fit_column(entry.label, FIELD_LABEL_COL_WIDTH - 1),
            value,
            path_w = PATH_COL_WIDTH,
            label_w = FIELD_LABEL_COL_WIDTH,
        );
        writeln!(&mut out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }
    out
}

pub fn render_tables_text(session: &Session) -> String {
    let mut out = String::new();
    write_tables(&mut out, &session.table_summaries());
    out
}

fn write_tables(out: &mut String, tables: &[TableSummary]) {
    for table in tables {
        let rows = match (table.opaque, table.rows) {
            (true, _) => "opaque".to_string(),
            (false, Some(rows)) => format!("{} rows", format_number_with_commas(rows as i64)),
            (false, None) => ABSENT.to_string(),
        };
        let line = format!(
            "  {:<width$}{}",
            fit_column(&table.name, TABLE_NAME_COL_WIDTH - 1),
            rows,
            width = TABLE_NAME_COL_WIDTH,
        );
        writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
    }
}

fn write_pair(out: &mut String, label: &str, value: &str) {
    let line = format!("  {:<width$}{}", format!("{label}:"), value, width = LABEL_WIDTH);
    writeln!(out, "{}", line.trim_end()).expect("writing to String cannot fail");
}

fn text_or_absent(value: Option<&str>) -> String {
    value.unwrap_or(ABSENT).to_string()
}

fn number_or_absent(value: Option<i64>) -> String {
    value.map_or_else(|| ABSENT.to_string(), format_number_with_commas)
}

fn fit_column(value: &str, width: usize) -> String {
    if value.chars().count() <= width {
        return value.to_string();
    }
    if width <= 3 {
        return value.chars().take(width).collect();
    }

    let mut out: String = value.chars().take(width - 3).collect();
    out.push_str("...");
    out
}

fn centered_no_trailing(value: &str, width: usize) -> String {
    let len = value.chars().count();
    if len >= width {
        return value.to_string();
    }

    let left_padding = (width - len) / 2;
    format!("{}{}", " ".repeat(left_padding), value)
}

fn format_number_with_commas(n: i64) -> String {
    let digits = n.unsigned_abs().to_string();
    let mut result = String::with_capacity(digits.len() + digits.len() / 3 + 1);
    if n < 0 {
        result.push('-');
    }
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
