use tracing::debug;

use crate::config::CodecConfig;
use crate::document::{Container, Document, Framing, Key, Node, Opaque, Scalar};
use crate::error::ParseError;
use crate::layout::{ByteRange, FileLayout, SectionId};
use crate::reader::{Line, LineReader};

pub(crate) const HEADING_PREFIX: &[u8] = b"###";
const CELL_SEPARATOR: &str = "\t";

pub fn parse(raw: &[u8]) -> Result<Document, ParseError> {
    parse_with_config(raw, &CodecConfig::default())
}

/// Builds the node tree for one decoded save.
///
/// Lines before the first `###` heading, lines the table grammar has no rule
/// for, and tables listed in `config.opaque_tables` are kept as opaque nodes,
/// so `serialize(parse(raw)) == raw` for every accepted input.
pub fn parse_with_config(raw: &[u8], config: &CodecConfig) -> Result<Document, ParseError> {
    let lines: Vec<Line<'_>> = LineReader::new(raw).collect();
    let mut root = Container::new(Framing::default());
    let mut layout = FileLayout {
        file_len: raw.len(),
        sections: Vec::new(),
    };

    let first_heading = lines.iter().position(is_heading).unwrap_or(lines.len());
    if first_heading > 0 {
        let range = span(&lines[..first_heading]);
        root.push(Key::Trivia, opaque(raw, range));
        layout.record(SectionId::Preamble, range.start, range.end);
    }

    let mut start = first_heading;
    while start < lines.len() {
        let end = lines[start + 1..]
            .iter()
            .position(is_heading)
            .map_or(lines.len(), |offset| start + 1 + offset);
        let block = &lines[start..end];
        let name = table_name(&block[0])?;
        let range = span(block);

        if config.is_opaque_table(&name) {
            root.push(Key::Name(name.clone()), opaque(raw, range));
            layout.record(SectionId::OpaqueTable(name), range.start, range.end);
        } else {
            let table = parse_table(raw, block)?;
            root.push(Key::Name(name.clone()), Node::Sequence(table));
            layout.record(SectionId::Table(name), range.start, range.end);
        }

        start = end;
    }

    layout.validate()?;
    debug!(
        bytes = raw.len(),
        lines = lines.len(),
        sections = layout.sections.len(),
        "parsed save structure"
    );

    Ok(Document::from_parts(Node::Mapping(root), layout))
}

fn is_heading(line: &Line<'_>) -> bool {
    line.body.starts_with(HEADING_PREFIX)
}

fn span(lines: &[Line<'_>]) -> ByteRange {
    match (lines.first(), lines.last()) {
        (Some(first), Some(last)) => ByteRange::new(first.range.start, last.range.end),
        _ => ByteRange::default(),
    }
}

fn opaque(raw: &[u8], range: ByteRange) -> Node {
    Node::Opaque(Opaque::new(raw[range.start..range.end].to_vec(), range))
}

fn table_name(heading: &Line<'_>) -> Result<String, ParseError> {
    let name = std::str::from_utf8(&heading.body[HEADING_PREFIX.len()..]).map_err(|_| {
        ParseError::Malformed {
            offset: heading.range.start,
            reason: "table heading is not valid UTF-8".to_string(),
        }
    })?;
    let name = name.trim();
    if name.is_empty() {
        return Err(ParseError::Malformed {
            offset: heading.range.start,
            reason: "table heading has no name".to_string(),
        });
    }
    Ok(name.to_string())
}

fn parse_table(raw: &[u8], block: &[Line<'_>]) -> Result<Container, ParseError> {
    let heading = &block[0];
    let mut table = Container::new(Framing {
        open: raw[heading.range.start..heading.range.end].to_vec(),
        ..Framing::default()
    });

    let mut columns: Option<Vec<String>> = None;
    let mut next_row = 0usize;
    for line in &block[1..] {
        let Some(names) = columns.as_ref() else {
            columns = column_names(line)?;
            table.push(Key::Trivia, opaque(raw, line.range));
            continue;
        };

        match parse_row(line, names) {
            Some(row) => {
                table.push(Key::Index(next_row), Node::Mapping(row));
                next_row += 1;
            }
            None => table.push(Key::Trivia, opaque(raw, line.range)),
        }
    }

    Ok(table)
}

/// Column names if `line` is a column line: more than one cell once
/// trailing empty cells are dropped.
fn column_names(line: &Line<'_>) -> Result<Option<Vec<String>>, ParseError> {
    let Some(text) = line.body_str() else {
        return Ok(None);
    };

    let mut cells: Vec<&str> = text.split(CELL_SEPARATOR).collect();
    while cells.last() == Some(&"") {
        cells.pop();
    }
    if cells.len() <= 1 {
        return Ok(None);
    }

    let mut names: Vec<String> = Vec::with_capacity(cells.len());
    for cell in cells {
        if names.iter().any(|name| name == cell) {
            return Err(ParseError::Malformed {
                offset: line.range.start,
                reason: format!("duplicate column {cell:?}"),
            });
        }
        names.push(cell.to_string());
    }

    Ok(Some(names))
}

fn parse_row(line: &Line<'_>, columns: &[String]) -> Option<Container> {
    if line.is_blank() {
        return None;
    }
    let text = line.body_str()?;

    let mut cells: Vec<&str> = text.split(CELL_SEPARATOR).collect();
    let mut trailing_separators = 0usize;
    while cells.len() > columns.len() && cells.last() == Some(&"") {
        cells.pop();
        trailing_separators += 1;
    }
    if cells.len() > columns.len() {
        return None;
    }

    let mut close = CELL_SEPARATOR.repeat(trailing_separators).into_bytes();
    close.extend_from_slice(line.terminator);

    let mut row = Container::new(Framing {
        open: Vec::new(),
        separator: CELL_SEPARATOR.as_bytes().to_vec(),
        close,
    });
    for (column, cell) in columns.iter().zip(cells) {
        row.push(Key::Name(column.clone()), Node::Scalar(Scalar::from_text(cell)));
    }

    Some(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{NodeKind, ScalarValue};
    use crate::path::FieldPath;
    use crate::serializer::serialize;

    const SMALL: &str = "3\n###Savegame\nId\tName\tMoney\n1\tMy Save\t100\n\n###Channel\nId\tSubscribers\n1\t5\n";

    fn cell(doc: &Document, path: &str) -> Option<ScalarValue> {
        let path: FieldPath = path.parse().expect("valid path");
        doc.scalar(&path).map(|s| s.value().clone())
    }

    #[test]
    fn parses_tables_rows_and_cells() {
        let doc = parse(SMALL.as_bytes()).expect("parse");
        assert_eq!(cell(&doc, "Savegame/0/Money"), Some(ScalarValue::Int(100)));
        assert_eq!(
            cell(&doc, "Savegame/0/Name"),
            Some(ScalarValue::Text("My Save".to_string()))
        );
        assert_eq!(cell(&doc, "Channel/0/Subscribers"), Some(ScalarValue::Int(5)));
        assert_eq!(cell(&doc, "Channel/1/Subscribers"), None);

        let names: Vec<&str> = doc.tables().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["Savegame", "Channel"]);
        assert_eq!(doc.table("Savegame").map(|t| t.row_count()), Some(1));
    }

    #[test]
    fn roundtrip_is_identity() {
        let inputs: &[&[u8]] = &[
            SMALL.as_bytes(),
            b"",
            b"\n\n",
            b"###T\r\nA\tB\r\n1\t2\r\n\r\n",
            b"###T\nA\tB\n1\t2\t3\n4\n5\t6\t\t\n",
            b"###T\nonly one column\nA\tB\n1\t2",
            b"###T\nA\tB\n\xff\xfe\t1\n",
            b"pre\namble\n###T\n",
        ];
        for input in inputs {
            let doc = parse(input).expect("parse");
            assert_eq!(serialize(&doc), *input, "roundtrip of {input:?}");
        }
    }

    #[test]
    fn crlf_rows_keep_terminator_out_of_cells() {
        let doc = parse(b"###T\r\nA\tB\r\n1\tx\r\n").expect("parse");
        assert_eq!(
            cell(&doc, "T/0/B"),
            Some(ScalarValue::Text("x".to_string()))
        );
    }

    #[test]
    fn short_rows_leave_missing_columns_absent() {
        let doc = parse(b"###T\nA\tB\tC\n1\t2\n").expect("parse");
        assert_eq!(cell(&doc, "T/0/B"), Some(ScalarValue::Int(2)));
        assert_eq!(cell(&doc, "T/0/C"), None);
    }

    #[test]
    fn overlong_rows_become_opaque() {
        let doc = parse(b"###T\nA\tB\n1\t2\t3\n4\t5\n").expect("parse");
        assert_eq!(cell(&doc, "T/0/A"), Some(ScalarValue::Int(4)));
        assert_eq!(doc.table("T").map(|t| t.row_count()), Some(1));
    }

    #[test]
    fn trailing_empty_cells_are_framing() {
        let doc = parse(b"###T\nA\tB\t\n1\t2\t\n").expect("parse");
        assert_eq!(cell(&doc, "T/0/B"), Some(ScalarValue::Int(2)));
        assert_eq!(serialize(&doc), b"###T\nA\tB\t\n1\t2\t\n");
    }

    #[test]
    fn configured_tables_are_opaque() {
        let input = b"###Youtuber_appearance\nId\tPiece\n1\t0042\n###T\nA\tB\n1\t2\n";
        let doc = parse(input).expect("parse");
        let (_, node) = doc
            .tables()
            .find(|(name, _)| *name == "Youtuber_appearance")
            .expect("appearance table");
        assert_eq!(node.kind(), NodeKind::Opaque);
        assert_eq!(cell(&doc, "Youtuber_appearance/0/Piece"), None);

        let modeled =
            parse_with_config(input, &CodecConfig::fully_modeled()).expect("parse modeled");
        assert_eq!(
            modeled
                .scalar(&"Youtuber_appearance/0/Piece".parse().expect("path"))
                .map(Scalar::text),
            Some("0042")
        );
    }

    #[test]
    fn layout_covers_input() {
        let doc = parse(SMALL.as_bytes()).expect("parse");
        let layout = doc.layout();
        assert_eq!(layout.file_len, SMALL.len());
        assert_eq!(layout.sections[0].id, SectionId::Preamble);
        assert_eq!(layout.sections[0].range, ByteRange::new(0, 2));
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn rejects_heading_without_name() {
        let err = parse(b"ok\n###  \nA\tB\n").expect_err("empty heading");
        assert_eq!(err.offset(), 3);
    }

    #[test]
    fn rejects_duplicate_columns() {
        let err = parse(b"###T\nA\tA\n").expect_err("duplicate column");
        assert_eq!(err.offset(), 5);
    }
}
