use bytes::{Bytes, BytesMut};

/// Splits a byte stream into newline-delimited records.
///
/// Network chunks rarely line up with record boundaries, so partial lines are
/// buffered until their terminating `\n` arrives. Blank lines are dropped. Lines
/// are handed out as raw bytes; UTF-8 validation is left to the JSON parser.
#[derive(Debug, Default)]
pub struct NdjsonDecoder {
    buffer: BytesMut,
    /// Bytes at the front of `buffer` already known to hold no `\n`
    scanned: usize,
}

impl NdjsonDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append raw bytes received from the transport
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Next complete, non-blank line, if one is buffered
    pub fn next_line(&mut self) -> Option<Bytes> {
        loop {
            let Some(offset) = self.buffer[self.scanned..].iter().position(|b| *b == b'\n') else {
                self.scanned = self.buffer.len();
                return None;
            };
            let newline = self.scanned + offset;
            self.scanned = 0;

            let mut raw = self.buffer.split_to(newline + 1);
            raw.truncate(newline);
            if let Some(line) = Self::clean(raw) {
                return Some(line);
            }
        }
    }

    /// Drain whatever is left once the stream has ended
    pub fn finish(&mut self) -> Option<Bytes> {
        self.scanned = 0;
        Self::clean(self.buffer.split())
    }

    fn clean(raw: BytesMut) -> Option<Bytes> {
        let start = raw.iter().position(|b| !b.is_ascii_whitespace())?;
        let end = raw.iter().rposition(|b| !b.is_ascii_whitespace())? + 1;
        Some(raw.freeze().slice(start..end))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(line: Option<Bytes>) -> Option<String> {
        line.map(|b| String::from_utf8(b.to_vec()).unwrap())
    }

    #[test]
    fn test_lines_split_across_chunks() {
        let mut decoder = NdjsonDecoder::new();
        decoder.push(b"{\"response\":\"He\"}\n{\"resp");
        assert_eq!(text(decoder.next_line()).as_deref(), Some("{\"response\":\"He\"}"));
        assert_eq!(decoder.next_line(), None);

        decoder.push(b"onse\":\"llo\"}\n");
        assert_eq!(text(decoder.next_line()).as_deref(), Some("{\"response\":\"llo\"}"));
        assert_eq!(decoder.next_line(), None);
    }

    #[test]
    fn test_long_line_in_many_small_chunks() {
        let line = format!("{{\"response\":\"{}\"}}", "x".repeat(10_000));
        let mut decoder = NdjsonDecoder::new();

        for piece in line.as_bytes().chunks(7) {
            decoder.push(piece);
            assert_eq!(decoder.next_line(), None);
            assert_eq!(decoder.scanned, decoder.buffer.len());
        }

        decoder.push(b"\n{\"done\":true}\n");
        assert_eq!(text(decoder.next_line()), Some(line));
        assert_eq!(text(decoder.next_line()).as_deref(), Some("{\"done\":true}"));
        assert_eq!(decoder.next_line(), None);
    }

    #[test]
    fn test_blank_and_crlf_lines() {
        let mut decoder = NdjsonDecoder::new();
        decoder.push(b"\n\r\n   \n{\"done\":true}\r\n");
        assert_eq!(text(decoder.next_line()).as_deref(), Some("{\"done\":true}"));
        assert_eq!(decoder.next_line(), None);
        assert_eq!(decoder.finish(), None);
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let line = "{\"response\":\"🧠\"}\n".as_bytes();
        let (head, tail) = line.split_at(15);
        let mut decoder = NdjsonDecoder::new();
        decoder.push(head);
        assert_eq!(decoder.next_line(), None);
        decoder.push(tail);
        assert_eq!(text(decoder.next_line()).as_deref(), Some("{\"response\":\"🧠\"}"));
    }

    #[test]
    fn test_invalid_utf8_is_passed_through_untouched() {
        let mut decoder = NdjsonDecoder::new();
        decoder.push(b"{\"response\":\"ab\xff\xfecd\"}\n");
        let line = decoder.next_line().unwrap();
        assert_eq!(&line[..], &b"{\"response\":\"ab\xff\xfecd\"}"[..]);
    }

    #[test]
    fn test_finish_returns_unterminated_tail() {
        let mut decoder = NdjsonDecoder::new();
        decoder.push(b"{\"response\":\"a\"}\n{\"done\":true}");
        assert_eq!(text(decoder.next_line()).as_deref(), Some("{\"response\":\"a\"}"));
        assert_eq!(decoder.next_line(), None);
        assert_eq!(text(decoder.finish()).as_deref(), Some("{\"done\":true}"));
        assert_eq!(decoder.finish(), None);
    }
}
