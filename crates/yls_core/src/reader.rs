use crate::layout::ByteRange;

/// One physical line of the decoded save, terminator kept separate from the body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Line<'a> {
    pub range: ByteRange,
    pub body: &'a [u8],
    pub terminator: &'a [u8],
}

impl<'a> Line<'a> {
    pub fn is_blank(&self) -> bool {
        self.body.iter().all(u8::is_ascii_whitespace)
    }

    pub fn body_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.body).ok()
    }
}

/// Splits a byte buffer into lines ending in `\n` or `\r\n`.
///
/// The final line may have an empty terminator. Concatenating `body` and
/// `terminator` of every yielded line reproduces the input exactly.
pub struct LineReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> LineReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl<'a> Iterator for LineReader<'a> {
    type Item = Line<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.pos >= self.data.len() {
            return None;
        }

        let start = self.pos;
        let rest = &self.data[start..];
        let (body_len, term_len) = match rest.iter().position(|&b| b == b'\n') {
            Some(nl) if nl > 0 && rest[nl - 1] == b'\r' => (nl - 1, 2),
            Some(nl) => (nl, 1),
            None => (rest.len(), 0),
        };

        let body_end = start + body_len;
        let end = body_end + term_len;
        self.pos = end;

        Some(Line {
            range: ByteRange { start, end },
            body: &self.data[start..body_end],
            terminator: &self.data[body_end..end],
        })
    }
}
