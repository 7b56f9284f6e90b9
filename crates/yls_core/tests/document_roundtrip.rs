use std::fs;
use std::path::PathBuf;

use yls_core::layout::SectionId;
use yls_core::parser::{parse, parse_with_config};
use yls_core::serializer::serialize;
use yls_core::{CodecConfig, ContainerFormat, FieldPath, Node, NodeKind, transport};

fn workspace_root() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../..")
}

fn fixture(name: &str) -> Vec<u8> {
    let path = workspace_root().join("tests/fixtures").join(name);
    fs::read(&path).unwrap_or_else(|e| panic!("failed to read {:?}: {}", path, e))
}

#[test]
fn fixture_container_decodes_to_plain_fixture() {
    let decoded = transport::decode(&fixture("sample.yls")).expect("decode");
    assert_eq!(decoded, fixture("sample.txt"));
}

#[test]
fn parse_then_serialize_is_identity() {
    let raw = fixture("sample.txt");
    for config in [CodecConfig::default(), CodecConfig::fully_modeled()] {
        let doc = parse_with_config(&raw, &config).expect("parse");
        assert_eq!(serialize(&doc), raw, "roundtrip with {:?}", config);
    }
}

#[test]
fn reencoded_container_decodes_to_same_bytes() {
    let raw = fixture("sample.txt");
    let doc = parse(&raw).expect("parse");
    let container = yls_core::persist::to_container_bytes(&doc, ContainerFormat::Encoded)
        .expect("encode");
    assert_eq!(transport::decode(&container).expect("decode"), raw);
}

#[test]
fn layout_tiles_the_fixture() {
    let raw = fixture("sample.txt");
    let doc = parse(&raw).expect("parse");
    let layout = doc.layout();
    layout.validate().expect("layout is contiguous");

    let ids: Vec<&SectionId> = layout.sections.iter().map(|s| &s.id).collect();
    assert_eq!(
        ids,
        vec![
            &SectionId::Preamble,
            &SectionId::Table("Savegame".to_string()),
            &SectionId::Table("Youtuber".to_string()),
            &SectionId::Table("Channel".to_string()),
            &SectionId::Table("Channel_stats".to_string()),
            &SectionId::OpaqueTable("Youtuber_appearance".to_string()),
            &SectionId::Table("Player_data".to_string()),
        ]
    );

    let appearance = layout
        .section(&SectionId::OpaqueTable("Youtuber_appearance".to_string()))
        .expect("appearance section");
    assert!(raw[appearance.range.start..].starts_with(b"###Youtuber_appearance\n"));

    let Some((_, Node::Opaque(opaque))) = doc
        .tables()
        .find(|(name, _)| *name == "Youtuber_appearance")
    else {
        panic!("appearance table should be opaque");
    };
    assert_eq!(opaque.origin(), appearance.range);
    assert_eq!(opaque.bytes(), &raw[appearance.range.start..appearance.range.end]);
}

#[test]
fn appearance_table_is_opaque_by_default() {
    let doc = parse(&fixture("sample.txt")).expect("parse");
    let kinds: Vec<(&str, NodeKind)> = doc.tables().map(|(name, node)| (name, node.kind())).collect();
    assert!(kinds.contains(&("Youtuber_appearance", NodeKind::Opaque)));
    assert!(kinds.contains(&("Youtuber", NodeKind::Sequence)));
    assert!(doc.table("Youtuber_appearance").is_none());
}

#[test]
fn fully_modeled_appearance_keeps_cell_text() {
    let doc = parse_with_config(&fixture("sample.txt"), &CodecConfig::fully_modeled())
        .expect("parse");
    let table = doc.table("Youtuber_appearance").expect("appearance table");
    assert_eq!(table.row_count(), 777);

    let first = table.row(0).expect("first row");
    assert_eq!(first.get("Id_piece").map(|c| c.text()), Some("5305"));
    assert_eq!(first.get("Hair_color").map(|c| c.text()), Some("02"));
    let second = table.row(1).expect("second row");
    assert_eq!(second.get("Hair_color").map(|c| c.text()), Some("1.50"));
}

#[test]
fn preamble_and_blank_lines_survive() {
    let doc = parse(&fixture("sample.txt")).expect("parse");
    let bytes = doc.to_bytes();
    assert!(bytes.starts_with(b"1.2.7\n###Savegame\n"));
    assert!(bytes.ends_with(b"Motto\tStay pixelated\n\n"));
}

#[test]
fn cells_are_typed_by_content() {
    let doc = parse(&fixture("sample.txt")).expect("parse");
    let scalar = |path: &str| {
        let path: FieldPath = path.parse().expect("path");
        doc.scalar(&path).cloned()
    };

    let money = scalar("Savegame/0/Money").expect("money");
    assert_eq!(money.value().as_i64(), Some(15000));
    let date = scalar("Savegame/0/Current_date").expect("date");
    assert_eq!(date.value().as_f64(), Some(12.5));
    assert_eq!(date.text(), "12.50");
    let version = scalar("Savegame/0/Version").expect("version");
    assert_eq!(version.value().as_str(), Some("1.2.7"));
    let tutorial = scalar("Player_data/0/Value_field").expect("tutorial");
    assert_eq!(tutorial.value().as_bool(), Some(true));
}
