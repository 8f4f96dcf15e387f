use std::io::{self, BufReader, Read};

use thiserror::Error;
use tracing::{debug, warn};

use crate::board;
use crate::image::CodeImage;

/// Line terminator trailing each record's checksum pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineBreak {
    #[default]
    CrLf,
    Lf,
}

impl LineBreak {
    pub fn width(self) -> usize {
        match self {
            LineBreak::CrLf => 2,
            LineBreak::Lf => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserOptions {
    pub capacity: usize,
    pub line_break: LineBreak,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            capacity: board::CODE_SIZE,
            line_break: LineBreak::CrLf,
        }
    }
}

#[derive(Error, Debug)]
pub enum HexError {
    #[error("io: {0}")]
    Io(#[from] io::Error),

    #[error("image exceeds capacity: {needed} bytes needed, {capacity} available")]
    ImageTooLarge { capacity: usize, needed: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParserState {
    AwaitingLineStart,
    SkippingPreamble { remaining: usize },
    ReadingPayload,
    AtEndOfFile,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feed {
    More,
    Finished,
}

#[derive(Debug)]
pub enum ParseOutcome {
    /// The sentinel record was reached.
    Complete(CodeImage),
    /// The stream ran dry first; holds whatever lines were decoded.
    Incomplete(CodeImage),
}

impl ParseOutcome {
    pub fn image(&self) -> &CodeImage {
        match self {
            ParseOutcome::Complete(img) | ParseOutcome::Incomplete(img) => img,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, ParseOutcome::Complete(_))
    }
}

/// Maps one ASCII hex digit to its value. Anything else decodes to zero.
pub fn nibble(c: u8) -> u8 {
    match c {
        b'0'..=b'9' => c - b'0',
        b'a'..=b'f' => c - b'a' + 10,
        b'A'..=b'F' => c - b'A' + 10,
        _ => 0,
    }
}

/// Byte-at-a-time decoder for the hex files the bridge is fed.
///
/// Only three things about the file are interpreted: the `:` record marker, the
/// fixed-width preamble after it, and the record type `05` that ends the data. The
/// first record is skipped whole. Payload characters of a data record are buffered
/// and decoded when the next record starts, minus the checksum pair and line break
/// that trail them. Checksums are never verified.
pub struct HexParser {
    state: ParserState,
    options: ParserOptions,
    image: CodeImage,
    cursor: usize,
    payload_chars: usize,
    records_seen: usize,
    data_started: bool,
    preamble: [u8; board::PREAMBLE_WIDTH],
    preamble_pos: usize,
    line: Vec<u8>,
    line_capacity: usize,
    line_overflowed: bool,
}

impl HexParser {
    pub fn new(options: ParserOptions) -> Self {
        let line_capacity =
            board::PAYLOAD_WIDTH + board::CHECKSUM_WIDTH + options.line_break.width();
        Self {
            state: ParserState::AwaitingLineStart,
            options,
            image: CodeImage::new(options.capacity),
            cursor: 0,
            payload_chars: 0,
            records_seen: 0,
            data_started: false,
            preamble: [0u8; board::PREAMBLE_WIDTH],
            preamble_pos: 0,
            line: Vec::with_capacity(line_capacity),
            line_capacity,
            line_overflowed: false,
        }
    }

    pub fn state(&self) -> ParserState {
        self.state
    }

    pub fn feed(&mut self, byte: u8) -> Result<Feed, HexError> {
        match self.state {
            ParserState::AtEndOfFile => return Ok(Feed::Finished),
            ParserState::SkippingPreamble { remaining } => {
                if self.preamble_pos < self.preamble.len() {
                    self.preamble[self.preamble_pos] = byte;
                    self.preamble_pos += 1;
                }

                if self.at_sentinel() {
                    debug!(
                        records = self.records_seen,
                        payload_chars = self.payload_chars,
                        "sentinel record reached"
                    );
                    self.state = ParserState::AtEndOfFile;
                    return Ok(Feed::Finished);
                }

                self.state = match remaining.saturating_sub(1) {
                    0 if self.data_started => ParserState::ReadingPayload,
                    0 => ParserState::AwaitingLineStart,
                    remaining => ParserState::SkippingPreamble { remaining },
                };
            }
            ParserState::AwaitingLineStart | ParserState::ReadingPayload => {
                if byte == board::RECORD_START {
                    self.start_record()?;
                } else if self.state == ParserState::ReadingPayload {
                    self.accumulate(byte);
                }
            }
        }
        Ok(Feed::More)
    }

    /// Hands the image over. Its length is half the payload characters decoded.
    pub fn finish(mut self) -> CodeImage {
        self.image.set_len(self.payload_chars / 2);
        self.image
    }

    fn at_sentinel(&self) -> bool {
        self.preamble[board::PREAMBLE_WIDTH - 2..] == board::SENTINEL_RECORD_TYPE
    }

    fn start_record(&mut self) -> Result<(), HexError> {
        self.preamble_pos = 0;

        let skip = match self.records_seen {
            0 => board::HEADER_RECORD_WIDTH,
            1 => {
                self.data_started = true;
                board::PREAMBLE_WIDTH
            }
            _ => {
                self.flush_line()?;
                board::PREAMBLE_WIDTH
            }
        };

        self.line.clear();
        self.line_overflowed = false;
        self.records_seen = self.records_seen.saturating_add(1);
        self.state = ParserState::SkippingPreamble { remaining: skip };
        Ok(())
    }

    fn accumulate(&mut self, byte: u8) {
        if self.line.len() < self.line_capacity {
            self.line.push(byte);
            return;
        }
        if !self.line_overflowed {
            warn!(
                record = self.records_seen,
                capacity = self.line_capacity,
                "record longer than line buffer; dropping extra characters"
            );
            self.line_overflowed = true;
        }
    }

    fn flush_line(&mut self) -> Result<(), HexError> {
        let trailer = board::CHECKSUM_WIDTH + self.options.line_break.width();
        let payload_len = self.line.len().saturating_sub(trailer);

        // An odd payload borrows its low nibble from the checksum pair.
        let decoded: Vec<u8> = (0..payload_len)
            .step_by(2)
            .map(|i| {
                let hi = nibble(self.line[i]);
                let lo = self.line.get(i + 1).copied().map(nibble).unwrap_or(0);
                (hi << 4) | lo
            })
            .collect();

        if !self.image.write_at(self.cursor, &decoded) {
            return Err(HexError::ImageTooLarge {
                capacity: self.image.capacity(),
                needed: self.cursor + decoded.len(),
            });
        }

        self.cursor += decoded.len();
        self.payload_chars += payload_len;
        Ok(())
    }
}

/// Drains `reader` through a [`HexParser`] until the sentinel record or end of stream.
///
/// Bytes after the sentinel are left unread.
pub fn load_image<R: Read>(reader: R, options: ParserOptions) -> Result<ParseOutcome, HexError> {
    let mut parser = HexParser::new(options);

    for byte in BufReader::new(reader).bytes() {
        if parser.feed(byte?)? == Feed::Finished {
            return Ok(ParseOutcome::Complete(parser.finish()));
        }
    }

    warn!(state = ?parser.state(), "hex stream ended before the sentinel record");
    Ok(ParseOutcome::Incomplete(parser.finish()))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    fn checksum_ihex(bytes: &[u8]) -> u8 {
        let sum: u8 = bytes.iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
        (!sum).wrapping_add(1)
    }

    pub(crate) fn ihex_record(addr: u16, rec_type: u8, payload: &[u8]) -> String {
        let mut bytes: Vec<u8> = Vec::new();
        bytes.push(payload.len() as u8);
        bytes.extend_from_slice(&addr.to_be_bytes());
        bytes.push(rec_type);
        bytes.extend_from_slice(payload);
        let cksum = checksum_ihex(&bytes);
        bytes.push(cksum);

        let mut s = String::from(":");
        for b in bytes {
            s.push_str(&format!("{b:02X}"));
        }
        s
    }

    /// Header, one data record per 16-byte chunk, the `05` record, then EOF.
    pub(crate) fn hex_file(payload: &[u8], eol: &str) -> String {
        let mut lines = vec![ihex_record(0x0000, 0x04, &[0x08, 0x00])];
        for (i, chunk) in payload.chunks(16).enumerate() {
            lines.push(ihex_record((i * 16) as u16, 0x00, chunk));
        }
        lines.push(ihex_record(0x0000, 0x05, &[0x08, 0x00, 0x01, 0x31]));
        lines.push(ihex_record(0x0000, 0x01, &[]));

        let mut s = String::new();
        for l in lines {
            s.push_str(&l);
            s.push_str(eol);
        }
        s
    }

    fn opts(capacity: usize) -> ParserOptions {
        ParserOptions {
            capacity,
            ..Default::default()
        }
    }

    fn parse(content: &str, options: ParserOptions) -> ParseOutcome {
        load_image(content.as_bytes(), options).unwrap()
    }

    #[test]
    fn test_nibble_decodes_hex_digits() {
        for (i, c) in b"0123456789ABCDEF".iter().enumerate() {
            assert_eq!(nibble(*c), i as u8);
        }
        for (i, c) in b"abcdef".iter().enumerate() {
            assert_eq!(nibble(*c), 10 + i as u8);
        }
    }

    #[test]
    fn test_nibble_unrecognized_is_zero() {
        for c in [b'G', b'g', b' ', b'\r', b'\n', b':', 0x00, 0xFF] {
            assert_eq!(nibble(c), 0, "char 0x{c:02X}");
        }
    }

    #[test]
    fn test_load_image_decodes_every_data_record() {
        let payload: Vec<u8> = (0..80u8).map(|b| b.wrapping_mul(7)).collect();
        let out = parse(&hex_file(&payload, "\r\n"), opts(1024));

        assert!(out.is_complete());
        assert_eq!(out.image().len(), 80);
        assert_eq!(out.image().payload(), payload.as_slice());
    }

    #[test]
    fn test_first_data_record_drops_its_trailer_like_the_rest() {
        // The first data record is decoded one record later than it is read; its
        // checksum pair must still be excluded.
        let payload = [0x11u8; 16];
        let out = parse(&hex_file(&payload, "\r\n"), opts(64));

        assert_eq!(out.image().len(), 16);
        assert_eq!(out.image().payload(), &payload);
    }

    #[test]
    fn test_lf_line_breaks() {
        let payload: Vec<u8> = (0..48u8).collect();
        let options = ParserOptions {
            capacity: 256,
            line_break: LineBreak::Lf,
        };
        let out = parse(&hex_file(&payload, "\n"), options);

        assert!(out.is_complete());
        assert_eq!(out.image().payload(), payload.as_slice());
    }

    #[test]
    fn test_invalid_payload_chars_decode_to_zero_nibbles() {
        let content = ":020000040800F2\r\n\
                       :04000000G1Z2zzFF00\r\n\
                       :0400000508000131BD\r\n";
        let out = parse(content, opts(64));

        assert!(out.is_complete());
        assert_eq!(out.image().payload(), &[0x01, 0x02, 0x00, 0xFF]);
    }

    #[test]
    fn test_sentinel_stops_parsing_at_record_type() {
        let content = hex_file(&[0xAB; 16], "\r\n");
        let sentinel_at = content.find(":04000005").unwrap() + 8;

        let mut parser = HexParser::new(opts(64));
        let mut finished_at = None;
        for (i, b) in content.bytes().enumerate() {
            if parser.feed(b).unwrap() == Feed::Finished {
                finished_at = Some(i);
                break;
            }
        }

        assert_eq!(finished_at, Some(sentinel_at));
        assert_eq!(parser.state(), ParserState::AtEndOfFile);
        assert_eq!(parser.feed(b':').unwrap(), Feed::Finished);
        assert_eq!(parser.finish().payload(), &[0xAB; 16]);
    }

    #[test]
    fn test_bytes_after_sentinel_are_ignored() {
        let mut content = hex_file(&[0x5A; 32], "\r\n");
        content.push_str(&ihex_record(0x0000, 0x00, &[0xEE; 16]));
        content.push_str("\r\ngarbage");

        let out = parse(&content, opts(128));
        assert!(out.is_complete());
        assert_eq!(out.image().payload(), &[0x5A; 32]);
    }

    #[test]
    fn test_missing_sentinel_is_incomplete_with_flushed_records() {
        let mut content = String::new();
        for l in [
            ihex_record(0x0000, 0x04, &[0x08, 0x00]),
            ihex_record(0x0000, 0x00, &[0x01; 16]),
            ihex_record(0x0010, 0x00, &[0x02; 16]),
            ihex_record(0x0000, 0x01, &[]),
        ] {
            content.push_str(&l);
            content.push_str("\r\n");
        }

        let out = parse(&content, opts(128));
        assert!(!out.is_complete());
        let mut expected = vec![0x01; 16];
        expected.extend_from_slice(&[0x02; 16]);
        assert_eq!(out.image().payload(), expected.as_slice());
    }

    #[test]
    fn test_empty_stream_is_incomplete_and_empty() {
        let out = parse("", opts(64));
        assert!(!out.is_complete());
        assert!(out.image().is_empty());
    }

    #[test]
    fn test_image_too_large_is_rejected() {
        let content = hex_file(&[0x00; 48], "\r\n");
        let err = match load_image(content.as_bytes(), opts(32)) {
            Ok(_) => panic!("expected ImageTooLarge"),
            Err(e) => e,
        };
        match err {
            HexError::ImageTooLarge { capacity, needed } => {
                assert_eq!(capacity, 32);
                assert_eq!(needed, 48);
            }
            _ => panic!("expected ImageTooLarge, got {err:?}"),
        }
    }

    #[test]
    fn test_full_capacity_image() {
        let payload: Vec<u8> = (0..board::CODE_SIZE).map(|i| (i % 251) as u8).collect();
        let out = parse(&hex_file(&payload, "\r\n"), ParserOptions::default());

        assert!(out.is_complete());
        assert_eq!(out.image().len(), board::CODE_SIZE);
        assert_eq!(out.image().payload(), payload.as_slice());
    }

    #[test]
    fn test_overlong_record_keeps_buffer_bound() {
        // 40 payload characters: the tail past the line buffer is dropped.
        let content = format!(
            ":020000040800F2\r\n:14000000{}{}\r\n:0400000508000131BD\r\n",
            "12".repeat(20),
            "FF"
        );
        let out = parse(&content, opts(64));

        assert!(out.is_complete());
        // 36 buffered characters, minus checksum and line break widths.
        assert_eq!(out.image().len(), 16);
        assert!(out.image().payload().iter().all(|b| *b == 0x12));
    }
}
