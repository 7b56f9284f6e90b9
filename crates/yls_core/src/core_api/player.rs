use crate::document::Document;

/// Id assumed for the player when no youtuber row is player-controlled.
pub const DEFAULT_PLAYER_ID: i64 = 1;

/// Row of the player's youtuber: the first with `Player_controlled == 0`.
pub fn player_youtuber_row(doc: &Document) -> Option<usize> {
    doc.table("Youtuber")?
        .rows()
        .find(|row| {
            row.get("Player_controlled")
                .and_then(|cell| cell.value().as_i64())
                == Some(0)
        })
        .map(|row| row.index())
}

pub fn player_id(doc: &Document) -> i64 {
    player_youtuber_row(doc)
        .and_then(|index| doc.table("Youtuber")?.row(index)?.get("Id"))
        .and_then(|cell| cell.value().as_i64())
        .unwrap_or(DEFAULT_PLAYER_ID)
}

/// Row of the channel owned by the player, else the first channel row.
pub fn player_channel_row(doc: &Document) -> Option<usize> {
    let channels = doc.table("Channel")?;
    let id = player_id(doc);
    channels
        .rows()
        .find(|row| row.get("Id_youtuber").and_then(|cell| cell.value().as_i64()) == Some(id))
        .or_else(|| channels.rows().next())
        .map(|row| row.index())
}

/// Row that player-facing edits of `table` target.
pub fn player_row(doc: &Document, table: &str) -> Option<usize> {
    match table {
        "Youtuber" => player_youtuber_row(doc),
        "Channel" => player_channel_row(doc),
        _ => doc.table(table)?.rows().next().map(|row| row.index()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    const SAVE: &[u8] = b"###Savegame\nId\tMoney\n1\t5\n\
###Youtuber\nId\tName\tPlayer_controlled\n4\tNpc\t1\n7\tMe\t0\n\
###Channel\nId\tId_youtuber\n1\t4\n2\t7\n";

    #[test]
    fn finds_player_rows() {
        let doc = parse(SAVE).expect("parse");
        assert_eq!(player_youtuber_row(&doc), Some(1));
        assert_eq!(player_id(&doc), 7);
        assert_eq!(player_channel_row(&doc), Some(1));
        assert_eq!(player_row(&doc, "Savegame"), Some(0));
    }

    #[test]
    fn falls_back_to_first_channel() {
        let doc = parse(b"###Youtuber\nId\tPlayer_controlled\n3\t1\n###Channel\nId\tId_youtuber\n9\t3\n")
            .expect("parse");
        assert_eq!(player_youtuber_row(&doc), None);
        assert_eq!(player_id(&doc), DEFAULT_PLAYER_ID);
        assert_eq!(player_channel_row(&doc), Some(0));
    }

    #[test]
    fn missing_tables_have_no_rows() {
        let doc = parse(b"").expect("parse");
        assert_eq!(player_youtuber_row(&doc), None);
        assert_eq!(player_channel_row(&doc), None);
    }
}
