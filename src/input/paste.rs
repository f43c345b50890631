//! Clipboard paste encoding.

use super::InputModes;

/// Default per-chunk byte budget.
pub const DEFAULT_CHUNK_BYTES: usize = 4096;

const BRACKET_START: &[u8] = b"\x1b[200~";
const BRACKET_END: &[u8] = b"\x1b[201~";

/// Encode pasted text with the default chunk size.
pub fn encode_paste(text: &str, modes: &InputModes) -> Vec<Vec<u8>> {
    encode_paste_chunked(text, modes, DEFAULT_CHUNK_BYTES)
}

/// Normalize and chunk pasted text.
///
/// CRLF collapses to CR (lone CR is preserved — stripping it would eat
/// deliberate carriage returns). When bracketed paste is on, the payload
/// is wrapped in `ESC[200~` / `ESC[201~`, attached to the first and last
/// chunks only. Chunk boundaries never split a UTF-8 scalar.
pub fn encode_paste_chunked(text: &str, modes: &InputModes, chunk_bytes: usize) -> Vec<Vec<u8>> {
    let normalized = text.replace("\r\n", "\r");
    let chunk_bytes = chunk_bytes.max(4);

    let mut chunks: Vec<Vec<u8>> = Vec::new();
    let mut current = Vec::with_capacity(chunk_bytes.min(normalized.len() + 1));
    for ch in normalized.chars() {
        let mut buf = [0u8; 4];
        let encoded = ch.encode_utf8(&mut buf).as_bytes();
        if current.len() + encoded.len() > chunk_bytes {
            chunks.push(std::mem::take(&mut current));
        }
        current.extend_from_slice(encoded);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    if modes.bracketed_paste {
        if let Some(first) = chunks.first_mut() {
            let mut wrapped = BRACKET_START.to_vec();
            wrapped.append(first);
            *first = wrapped;
        } else {
            // Empty paste still sends the bracket pair.
            chunks.push(BRACKET_START.to_vec());
        }
        if let Some(last) = chunks.last_mut() {
            last.extend_from_slice(BRACKET_END);
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plain() -> InputModes {
        InputModes::default()
    }

    fn bracketed() -> InputModes {
        InputModes {
            bracketed_paste: true,
            ..InputModes::default()
        }
    }

    fn reassemble(chunks: &[Vec<u8>]) -> Vec<u8> {
        chunks.iter().flatten().copied().collect()
    }

    #[test]
    fn crlf_collapses_lone_cr_survives() {
        let chunks = encode_paste("a\r\nb\rc\nd", &plain());
        assert_eq!(reassemble(&chunks), b"a\rb\rc\nd".to_vec());
    }

    #[test]
    fn bracketed_wrapping() {
        let chunks = encode_paste("text", &bracketed());
        assert_eq!(reassemble(&chunks), b"\x1b[200~text\x1b[201~".to_vec());
    }

    #[test]
    fn empty_bracketed_paste_still_brackets() {
        let chunks = encode_paste("", &bracketed());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0], b"\x1b[200~\x1b[201~".to_vec());
        assert!(encode_paste("", &plain()).is_empty());
    }

    #[test]
    fn chunking_respects_scalar_boundaries() {
        // 3-byte scalars with a 4-byte budget: one scalar per chunk.
        let text = "漢漢漢";
        let chunks = encode_paste_chunked(text, &plain(), 4);
        assert_eq!(chunks.len(), 3);
        for chunk in &chunks {
            assert!(std::str::from_utf8(chunk).is_ok());
            assert!(chunk.len() <= 4);
        }
        assert_eq!(reassemble(&chunks), text.as_bytes());
    }

    #[test]
    fn brackets_attach_to_first_and_last_chunks_only() {
        let text = "aaaabbbbcccc";
        let chunks = encode_paste_chunked(text, &bracketed(), 4);
        assert_eq!(chunks.len(), 3);
        assert!(chunks[0].starts_with(BRACKET_START));
        assert!(!chunks[1].starts_with(BRACKET_START));
        assert!(chunks[2].ends_with(BRACKET_END));
        let all = reassemble(&chunks);
        assert_eq!(all, b"\x1b[200~aaaabbbbcccc\x1b[201~".to_vec());
    }

    #[test]
    fn reassembly_matches_normalized_input() {
        let text = "line one\r\nline two\nwide 漢字 tail";
        let chunks = encode_paste_chunked(text, &bracketed(), 8);
        let all = reassemble(&chunks);
        let mut expected = BRACKET_START.to_vec();
        expected.extend_from_slice("line one\rline two\nwide 漢字 tail".as_bytes());
        expected.extend_from_slice(BRACKET_END);
        assert_eq!(all, expected);
    }
}
