use crate::cli;

use hexbridge::operation::BridgeEvent;
use hexbridge::ports::PortInfo;
use hexbridge::StatusSignals;

pub mod human;
pub mod json;


#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub verbose: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InspectSummary {
    pub file: String,
    pub bytes: usize,
    pub complete: bool,
    pub capacity: usize,
    pub padded: usize,
    pub pages: usize,
    pub wait_ms: u64,
}

#[derive(Debug, Clone)]
pub enum Event {
    Bridge(BridgeEvent),
    /// The session is waiting for the next command code.
    Prompt,
    Inspect(InspectSummary),
    ListPorts(Vec<PortInfo>),
    Error { code: i32, message: String },
}

pub trait Reporter {
    fn emit(&mut self, event: Event);
    fn finish(&mut self);
}

fn make(json: bool, opts: OutputOptions) -> Box<dyn Reporter> {
    if json {
        Box::new(json::JsonOutput::new(opts))
    } else {
        Box::new(human::HumanOutput::new(opts))
    }
}

pub fn make_for_session(args: &cli::SessionArgs) -> Box<dyn Reporter> {
    let opts = OutputOptions {
        verbose: args.verbose,
        quiet: args.quiet,
    };
    make(args.json, opts)
}

pub fn make_for_send(args: &cli::SendArgs) -> Box<dyn Reporter> {
    let opts = OutputOptions {
        verbose: args.verbose,
        quiet: args.quiet,
    };
    make(args.json, opts)
}

pub fn make_for_inspect(args: &cli::InspectArgs) -> Box<dyn Reporter> {
    let opts = OutputOptions {
        verbose: false,
        quiet: false,
    };
    make(args.json, opts)
}

pub fn make_for_list(args: &cli::ListArgs) -> Box<dyn Reporter> {
    let opts = OutputOptions {
        verbose: false,
        quiet: false,
    };
    make(args.json, opts)
}

pub fn format_frame(frame: &[u8]) -> String {
    frame
        .iter()
        .map(|b| format!("{b:02X}"))
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn format_status(status: StatusSignals) -> String {
    format!(
        "ready={} image={}",
        if status.ready { "on" } else { "off" },
        if status.image_loaded { "loaded" } else { "none" }
    )
}

pub fn format_port_line(index: usize, p: &PortInfo) -> String {
    match (p.vid, p.pid) {
        (Some(vid), Some(pid)) => format!(
            "[{index}] {} {:04X}:{:04X} {}",
            p.port_name,
            vid,
            pid,
            p.product.as_deref().unwrap_or("")
        ),
        _ => format!("[{index}] {} ({:?})", p.port_name, p.kind),
    }
}
