use std::time::Duration;

use crate::board;
use crate::hex::{LineBreak, ParserOptions};
use crate::scheduler::Pacing;

#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Largest image accepted; also the size of an erase.
    pub capacity: usize,
    pub line_break: LineBreak,
    pub pacing: Pacing,

    pub link_baud: u32,
    pub hex_file_name: String,

    /// Wait after a control frame.
    pub frame_settle: Duration,
    /// Wait after a transmit has drained.
    pub transmit_settle: Duration,
    /// How long to wait for the status byte after a transmit.
    pub status_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            capacity: board::CODE_SIZE,
            line_break: LineBreak::CrLf,
            pacing: Pacing::default(),
            link_baud: board::LINK_BAUD,
            hex_file_name: board::HEX_FILE_NAME.to_string(),
            frame_settle: Duration::from_millis(board::FRAME_SETTLE_MS),
            transmit_settle: Duration::from_millis(board::TRANSMIT_SETTLE_MS),
            status_timeout: Duration::from_millis(board::STATUS_READ_TIMEOUT_MS),
        }
    }
}

impl BridgeConfig {
    pub fn parser_options(&self) -> ParserOptions {
        ParserOptions {
            capacity: self.capacity,
            line_break: self.line_break,
        }
    }
}
