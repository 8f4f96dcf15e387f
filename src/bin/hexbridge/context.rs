use std::time::Duration;

use hexbridge::hex::LineBreak;
use hexbridge::scheduler::Pacing;
use hexbridge::transport::SerialTransport;
use hexbridge::BridgeConfig;

use crate::cli;

pub fn bridge_config(image: &cli::ImageArgs, link: Option<&cli::LinkArgs>) -> BridgeConfig {
    let line_break = match image.line_break {
        cli::LineBreakArg::Crlf => LineBreak::CrLf,
        cli::LineBreakArg::Lf => LineBreak::Lf,
    };

    let mut config = BridgeConfig {
        capacity: image.capacity,
        line_break,
        pacing: Pacing {
            page_size: image.page_size,
            page_drain: Duration::from_millis(image.page_drain_ms),
        },
        hex_file_name: image.file.clone(),
        ..Default::default()
    };

    if let Some(link) = link {
        config.link_baud = link.baud;
        config.status_timeout = Duration::from_millis(link.status_timeout_ms);
    }

    config
}

pub fn serial_transport(link: &cli::LinkArgs, config: &BridgeConfig) -> SerialTransport {
    SerialTransport::new(link.port.clone(), config.link_baud, config.status_timeout)
}

/// Reads an operator-typed command code.
pub fn parse_code(input: &str) -> Option<i64> {
    input.trim().parse().ok()
}
