use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SectionId {
    Preamble,
    Table(String),
    OpaqueTable(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionLayout {
    pub id: SectionId,
    pub range: ByteRange,
}

/// Top-level byte map of a parsed save, as it was on disk.
#[derive(Debug, Clone, Default)]
pub struct FileLayout {
    pub file_len: usize,
    pub sections: Vec<SectionLayout>,
}

impl FileLayout {
    pub fn record(&mut self, id: SectionId, start: usize, end: usize) {
        self.sections.push(SectionLayout {
            id,
            range: ByteRange { start, end },
        });
    }

    /// Checks that the sections tile `0..file_len` with no gap or overlap.
    pub fn validate(&self) -> Result<(), ParseError> {
        if self.sections.is_empty() {
            if self.file_len == 0 {
                return Ok(());
            }
            return Err(ParseError::Malformed {
                offset: 0,
                reason: "layout must contain at least one section".to_string(),
            });
        }

        let mut expected = 0usize;
        for section in &self.sections {
            if section.range.start != expected {
                return Err(ParseError::Malformed {
                    offset: expected,
                    reason: format!(
                        "layout gap/overlap around section {:?}: expected start {}, got {}",
                        section.id, expected, section.range.start
                    ),
                });
            }
            if section.range.end < section.range.start {
                return Err(ParseError::Malformed {
                    offset: section.range.start,
                    reason: format!(
                        "invalid section range {:?}: {}..{}",
                        section.id, section.range.start, section.range.end
                    ),
                });
            }
            expected = section.range.end;
        }

        if expected != self.file_len {
            return Err(ParseError::Malformed {
                offset: expected,
                reason: format!(
                    "layout does not cover input: ended at {}, input length {}",
                    expected, self.file_len
                ),
            });
        }

        Ok(())
    }

    pub fn section(&self, id: &SectionId) -> Option<&SectionLayout> {
        self.sections.iter().find(|section| &section.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contiguous_sections_validate() {
        let mut layout = FileLayout {
            file_len: 10,
            sections: Vec::new(),
        };
        layout.record(SectionId::Preamble, 0, 4);
        layout.record(SectionId::Table("Savegame".to_string()), 4, 10);
        assert!(layout.validate().is_ok());
    }

    #[test]
    fn gap_reports_offset() {
        let mut layout = FileLayout {
            file_len: 10,
            sections: Vec::new(),
        };
        layout.record(SectionId::Preamble, 0, 4);
        layout.record(SectionId::Table("Savegame".to_string()), 5, 10);
        match layout.validate() {
            Err(ParseError::Malformed { offset, .. }) => assert_eq!(offset, 4),
            other => panic!("expected malformed layout, got {other:?}"),
        }
    }

    #[test]
    fn short_layout_is_rejected() {
        let mut layout = FileLayout {
            file_len: 10,
            sections: Vec::new(),
        };
        layout.record(SectionId::Preamble, 0, 4);
        assert!(layout.validate().is_err());
    }
}
