/// Bytes reserved for the decoded application image.
pub const CODE_SIZE: usize = 24_576;

/// The companion bootloader only accepts whole pages.
pub const PAGE_SIZE: usize = 256;
/// Measured time for one page to leave the link at `LINK_BAUD`.
pub const PAGE_DRAIN_MS: u64 = 136;

pub const LINK_BAUD: u32 = 57_600;
pub const HEX_FILE_NAME: &str = "app.hex";

pub const FRAME_MARKER: u8 = 0xF0;
pub const FRAME_SIZE: usize = 3;

/// Three frame bytes plus idle time on the link.
pub const FRAME_SETTLE_MS: u64 = 6;
pub const TRANSMIT_SETTLE_MS: u64 = 1;
pub const STATUS_READ_TIMEOUT_MS: u64 = 10;

pub const RECORD_START: u8 = b':';
/// Byte count, address and record type: `LLAAAATT`.
pub const PREAMBLE_WIDTH: usize = 8;
/// The header record (`:020000040800F2`) is skipped whole.
pub const HEADER_RECORD_WIDTH: usize = 14;
pub const PAYLOAD_WIDTH: usize = 32;
pub const CHECKSUM_WIDTH: usize = 2;
/// Record type `05` (start linear address) is the last record the parser reads.
pub const SENTINEL_RECORD_TYPE: [u8; 2] = *b"05";
