/// Converts local text to network ASCII (CRLF line endings) for downloads.
///
/// A bare CR or a bare LF each become CRLF; an existing CRLF pair is left as
/// is. State is kept across calls so a CRLF split between two chunks is not
/// doubled.
#[derive(Debug, Default)]
pub struct AsciiEncoder {
    skip_linefeed: bool,
}

impl AsciiEncoder {
    pub fn encode(&mut self, input: &[u8], out: &mut Vec<u8>) {
        out.reserve(input.len() + input.len() / 16);
        for &byte in input {
            match byte {
                b'\r' => {
                    out.extend_from_slice(b"\r\n");
                    self.skip_linefeed = true;
                }
                b'\n' => {
                    if !self.skip_linefeed {
                        out.extend_from_slice(b"\r\n");
                    }
                    self.skip_linefeed = false;
                }
                other => {
                    out.push(other);
                    self.skip_linefeed = false;
                }
            }
        }
    }
}

/// Converts network ASCII back to local line endings for uploads.
///
/// CRLF becomes LF, a lone CR is kept. A CR ending one chunk is held back
/// until the next chunk (or [`AsciiDecoder::finish`]) shows what follows it.
#[derive(Debug, Default)]
pub struct AsciiDecoder {
    pending_cr: bool,
}

impl AsciiDecoder {
    pub fn decode(&mut self, input: &[u8], out: &mut Vec<u8>) {
        out.reserve(input.len());
        for &byte in input {
            if self.pending_cr {
                self.pending_cr = false;
                if byte == b'\n' {
                    out.push(b'\n');
                    continue;
                }
                out.push(b'\r');
            }
            if byte == b'\r' {
                self.pending_cr = true;
            } else {
                out.push(byte);
            }
        }
    }

    /// Flushes a CR held back from the last chunk.
    pub fn finish(&mut self, out: &mut Vec<u8>) {
        if self.pending_cr {
            out.push(b'\r');
            self.pending_cr = false;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode_chunks(chunks: &[&[u8]]) -> Vec<u8> {
        let mut encoder = AsciiEncoder::default();
        let mut out = Vec::new();
        for chunk in chunks {
            encoder.encode(chunk, &mut out);
        }
        out
    }

    fn decode_chunks(chunks: &[&[u8]]) -> Vec<u8> {
        let mut decoder = AsciiDecoder::default();
        let mut out = Vec::new();
        for chunk in chunks {
            decoder.decode(chunk, &mut out);
        }
        decoder.finish(&mut out);
        out
    }

    #[test]
    fn test_encode_line_endings() {
        assert_eq!(encode_chunks(&[b"a\nb\n"]), b"a\r\nb\r\n");
        assert_eq!(encode_chunks(&[b"a\r\nb"]), b"a\r\nb");
        assert_eq!(encode_chunks(&[b"a\rb"]), b"a\r\nb");
        assert_eq!(encode_chunks(&[b"\n\n"]), b"\r\n\r\n");
    }

    #[test]
    fn test_encode_crlf_split_across_chunks() {
        assert_eq!(encode_chunks(&[b"line\r", b"\nnext"]), b"line\r\nnext");
    }

    #[test]
    fn test_decode_line_endings() {
        assert_eq!(decode_chunks(&[b"a\r\nb\r\n"]), b"a\nb\n");
        assert_eq!(decode_chunks(&[b"a\rb"]), b"a\rb");
        assert_eq!(decode_chunks(&[b"a\nb"]), b"a\nb");
        assert_eq!(decode_chunks(&[b"a\r\r\n"]), b"a\r\n");
    }

    #[test]
    fn test_decode_crlf_split_across_chunks() {
        assert_eq!(decode_chunks(&[b"line\r", b"\nnext"]), b"line\nnext");
        assert_eq!(decode_chunks(&[b"end\r"]), b"end\r");
    }

    #[test]
    fn test_binary_payload_untouched_outside_line_endings() {
        let data: Vec<u8> = (0u8..=255).filter(|b| *b != b'\r' && *b != b'\n').collect();
        assert_eq!(encode_chunks(&[&data]), data);
        assert_eq!(decode_chunks(&[&data]), data);
    }
}
