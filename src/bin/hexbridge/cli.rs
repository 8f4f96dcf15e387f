use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use hexbridge::board;

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LineBreakArg {
    /// Records end in "\r\n".
    Crlf,
    /// Records end in "\n".
    Lf,
}

#[derive(Parser)]
#[command(name = "hexbridge")]
#[command(about = "Load an Intel HEX app from storage and deliver it to a companion bootloader")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load the hex file, then read command codes from stdin until it closes.
    Session(SessionArgs),

    /// Load the hex file and run a single command code.
    Send(SendArgs),

    /// Decode the hex file and report its size and transmit timing.
    Inspect(InspectArgs),

    /// List serial ports.
    List(ListArgs),
}

#[derive(Parser, Clone)]
pub struct ImageArgs {
    /// Mount point of the storage medium holding the hex file.
    #[arg(long, default_value = ".")]
    pub medium: PathBuf,

    /// Hex file name on the medium.
    #[arg(long, default_value = board::HEX_FILE_NAME)]
    pub file: String,

    /// Largest image accepted, in bytes (also the erase size).
    #[arg(long, default_value_t = board::CODE_SIZE)]
    pub capacity: usize,

    /// Line terminator used by the hex file.
    #[arg(long, value_enum, default_value_t = LineBreakArg::Crlf)]
    pub line_break: LineBreakArg,

    /// Bootloader page size in bytes.
    #[arg(long, default_value_t = board::PAGE_SIZE, value_parser = page_size_in_range)]
    pub page_size: usize,

    /// Time for one page to drain at the link baud rate.
    #[arg(long, default_value_t = board::PAGE_DRAIN_MS)]
    pub page_drain_ms: u64,
}

#[derive(Parser, Clone)]
pub struct LinkArgs {
    /// Serial port wired to the companion device (e.g. /dev/ttyACM0 or COM6).
    #[arg(long)]
    pub port: String,

    /// Link baud rate; must match the companion bootloader.
    #[arg(long, default_value_t = board::LINK_BAUD)]
    pub baud: u32,

    /// Max time to wait for the status byte after a transmit.
    #[arg(long, default_value_t = board::STATUS_READ_TIMEOUT_MS)]
    pub status_timeout_ms: u64,
}

#[derive(Parser)]
pub struct SessionArgs {
    #[command(flatten)]
    pub image: ImageArgs,

    #[command(flatten)]
    pub link: LinkArgs,

    /// Emit JSON line events to stdout.
    #[arg(long)]
    pub json: bool,

    /// Reduce output (only errors).
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// More logs to stderr.
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Parser)]
pub struct SendArgs {
    /// Command code: 0 external control, 1 jump to app, 2 programmer mode,
    /// 3 reboot, 4 transmit image, 5 erase app region.
    #[arg(allow_negative_numbers = true)]
    pub code: i64,

    #[command(flatten)]
    pub image: ImageArgs,

    #[command(flatten)]
    pub link: LinkArgs,

    /// Emit JSON line events to stdout.
    #[arg(long)]
    pub json: bool,

    /// Reduce output (only errors).
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// More logs to stderr.
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Parser)]
pub struct InspectArgs {
    #[command(flatten)]
    pub image: ImageArgs,

    /// Emit JSON output.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct ListArgs {
    /// Emit JSON line output.
    #[arg(long)]
    pub json: bool,
}

fn page_size_in_range(s: &str) -> Result<usize, String> {
    let n: usize = s.parse().map_err(|e| format!("{e}"))?;
    if n == 0 {
        return Err("page size must be at least 1".to_string());
    }
    Ok(n)
}
