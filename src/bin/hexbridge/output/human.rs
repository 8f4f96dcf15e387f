use std::io::{IsTerminal, Write};

use hexbridge::operation::BridgeEvent;
use hexbridge::ports::PortInfo;

use crate::output::{
    format_frame, format_port_line, format_status, Event, InspectSummary, OutputOptions,
    Reporter,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Quiet,
    Verbose,
    Normal,
}

pub struct HumanOutput {
    opts: OutputOptions,
    input_is_tty: bool,
    prompt_active: bool,
}

impl HumanOutput {
    pub fn new(opts: OutputOptions) -> Self {
        Self {
            opts,
            input_is_tty: std::io::stdin().is_terminal(),
            prompt_active: false,
        }
    }

    fn mode(&self) -> Mode {
        if self.opts.quiet {
            Mode::Quiet
        } else if self.opts.verbose {
            Mode::Verbose
        } else {
            Mode::Normal
        }
    }

    fn finish_line(&mut self) {
        if self.prompt_active {
            // A terminal already echoed the operator's newline.
            if !self.input_is_tty {
                eprintln!();
            }
            self.prompt_active = false;
        }
    }

    fn println(&mut self, msg: &str) {
        if self.mode() == Mode::Quiet {
            return;
        }
        self.finish_line();
        eprintln!("{msg}");
    }

    fn error(&mut self, msg: &str) {
        self.finish_line();
        eprintln!("error: {msg}");
    }

    fn prompt(&mut self) {
        if self.mode() == Mode::Quiet {
            return;
        }
        eprint!("command code (0-5, or 'reload'): ");
        let _ = std::io::stderr().flush();
        self.prompt_active = true;
    }
}

impl HumanOutput {
    fn on_bridge_event(&mut self, ev: BridgeEvent) {
        match ev {
            BridgeEvent::MediumOpened { path } => {
                if self.mode() == Mode::Verbose {
                    self.println(&format!("hex file found: {path}"));
                }
            }
            BridgeEvent::ImageLoaded {
                bytes,
                padded,
                wait_ms,
            } => {
                if self.mode() == Mode::Verbose {
                    self.println(&format!(
                        "hex file read: {bytes} bytes ({padded} bytes on the wire, {wait_ms} ms)"
                    ));
                } else {
                    self.println(&format!("hex file read: {bytes} bytes"));
                }
            }
            BridgeEvent::ImageIncomplete { bytes } => {
                self.println(&format!(
                    "hex file ended before its final record ({bytes} bytes decoded)"
                ));
            }
            BridgeEvent::ImageLoadFailed { message, .. } => self.error(&message),
            BridgeEvent::Status(status) => {
                self.println(&format!("status: {}", format_status(status)));
            }
            BridgeEvent::CommandAccepted { command } => {
                self.println(&format!("{command}..."));
            }
            BridgeEvent::CommandRejected { code, kind, .. } => {
                if self.mode() == Mode::Verbose {
                    self.println(&format!("command {code} rejected ({kind:?})"));
                }
            }
            BridgeEvent::FrameSent { frame, .. } => {
                if self.mode() == Mode::Verbose {
                    self.println(&format!("frame sent: {}", format_frame(&frame)));
                }
            }
            BridgeEvent::ImageSent {
                bytes,
                padded,
                wait_ms,
            } => {
                self.println(&format!(
                    "app sent: {bytes} bytes + {} padding, waited {wait_ms} ms",
                    padded - bytes
                ));
            }
            BridgeEvent::StatusByte { value } => {
                if self.mode() == Mode::Verbose {
                    match value {
                        Some(b) => self.println(&format!("device replied 0x{b:02X}")),
                        None => self.println("no reply from device"),
                    }
                }
            }
            BridgeEvent::RegionErased { bytes, wait_ms } => {
                self.println(&format!(
                    "app region erased: {bytes} bytes, waited {wait_ms} ms"
                ));
            }
            BridgeEvent::LinkClosed => {
                if self.mode() == Mode::Verbose {
                    self.println("link closed");
                }
            }
        }
    }
}

impl Reporter for HumanOutput {
    fn emit(&mut self, event: Event) {
        match event {
            Event::Bridge(ev) => self.on_bridge_event(ev),
            Event::Prompt => self.prompt(),
            Event::Inspect(summary) => emit_inspect(summary, self),
            Event::ListPorts(ports) => emit_list_ports(&ports, self),
            Event::Error { code: _, message } => self.error(&message),
        }
    }

    fn finish(&mut self) {
        self.finish_line();
    }
}

fn emit_inspect(summary: InspectSummary, out: &mut HumanOutput) {
    out.println(&format!("file: {}", summary.file));
    out.println(&format!(
        "image: {} / {} bytes{}",
        summary.bytes,
        summary.capacity,
        if summary.complete {
            ""
        } else {
            " (incomplete: no final record)"
        }
    ));
    out.println(&format!(
        "transmit: {} bytes in {} pages, {} ms",
        summary.padded, summary.pages, summary.wait_ms
    ));
}

fn emit_list_ports(ports: &[PortInfo], out: &mut HumanOutput) {
    if ports.is_empty() {
        out.println("No serial ports found");
        return;
    }

    for (i, p) in ports.iter().enumerate() {
        out.println(&format_port_line(i, p));
    }
}
