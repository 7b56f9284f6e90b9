use std::io::{self, Read, Write};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use flate2::Compression;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use tracing::debug;

use crate::error::TransportError;

/// Unwraps a save container: base64 text around a gzip stream.
///
/// ASCII whitespace in the container is ignored, so files that were wrapped
/// or saved with a trailing newline still decode.
pub fn decode(container: &[u8]) -> Result<Vec<u8>, TransportError> {
    let text: Vec<u8> = container
        .iter()
        .copied()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    let compressed = STANDARD
        .decode(&text)
        .map_err(|source| TransportError::InvalidEncoding { source })?;
    if compressed.is_empty() {
        return Err(TransportError::CorruptStream {
            source: io::Error::new(io::ErrorKind::UnexpectedEof, "container holds no data"),
        });
    }

    let mut decoder = MultiGzDecoder::new(compressed.as_slice());
    let mut raw = Vec::new();
    decoder
        .read_to_end(&mut raw)
        .map_err(|source| TransportError::CorruptStream { source })?;

    debug!(
        container = container.len(),
        compressed = compressed.len(),
        decoded = raw.len(),
        "decoded save container"
    );
    Ok(raw)
}

/// Wraps decoded bytes back into a container. The compressed bytes may
/// differ from the file originally read; `decode(encode(raw)) == raw` holds.
pub fn encode(raw: &[u8]) -> Result<Vec<u8>, TransportError> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(raw)
        .map_err(|source| TransportError::Compress { source })?;
    let compressed = encoder
        .finish()
        .map_err(|source| TransportError::Compress { source })?;

    Ok(STANDARD.encode(compressed).into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_then_decode_restores_bytes() {
        let raw = b"###Savegame\nId\tMoney\n1\t15000\n";
        let container = encode(raw).expect("encode");
        assert!(container.iter().all(|b| b.is_ascii()));
        assert_eq!(decode(&container).expect("decode"), raw);
    }

    #[test]
    fn decode_tolerates_wrapped_text() {
        let container = encode(b"hello").expect("encode");
        let mut wrapped = Vec::new();
        for chunk in container.chunks(8) {
            wrapped.extend_from_slice(chunk);
            wrapped.extend_from_slice(b"\r\n");
        }
        assert_eq!(decode(&wrapped).expect("decode"), b"hello");
    }

    #[test]
    fn rejects_non_base64() {
        let err = decode(b"not base64 at all!").expect_err("invalid");
        assert!(matches!(err, TransportError::InvalidEncoding { .. }));
    }

    #[test]
    fn rejects_plain_base64_without_gzip() {
        let container = STANDARD.encode(b"plain text, not gzip");
        let err = decode(container.as_bytes()).expect_err("not gzip");
        assert!(matches!(err, TransportError::CorruptStream { .. }));
    }

    #[test]
    fn rejects_truncated_stream() {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&[b'x'; 4096]).expect("write");
        let compressed = encoder.finish().expect("finish");
        let truncated = STANDARD.encode(&compressed[..compressed.len() / 2]);

        let err = decode(truncated.as_bytes()).expect_err("truncated");
        assert!(matches!(err, TransportError::CorruptStream { .. }));
    }

    #[test]
    fn rejects_empty_container() {
        let err = decode(b"  \n").expect_err("empty");
        assert!(matches!(err, TransportError::CorruptStream { .. }));
    }
}
