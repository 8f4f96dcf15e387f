use std::collections::BTreeMap;

use hexbridge::operation::BridgeEvent;
use hexbridge::ports::PortInfo;

use crate::output::{format_frame, Event, InspectSummary, OutputOptions, Reporter};

#[derive(serde::Serialize)]
pub struct JsonEvent {
    schema: u32,
    event: &'static str,
    #[serde(flatten)]
    fields: BTreeMap<&'static str, serde_json::Value>,
}

impl JsonEvent {
    pub fn status(event: &'static str) -> Self {
        Self {
            schema: 1,
            event,
            fields: BTreeMap::new(),
        }
    }

    pub fn with_u64(mut self, k: &'static str, v: u64) -> Self {
        self.fields.insert(k, serde_json::Value::from(v));
        self
    }

    pub fn with_str(mut self, k: &'static str, v: &str) -> Self {
        self.fields.insert(k, serde_json::Value::from(v));
        self
    }

    pub fn with_bool(mut self, k: &'static str, v: bool) -> Self {
        self.fields.insert(k, serde_json::Value::from(v));
        self
    }

    pub fn with_value(mut self, k: &'static str, v: serde_json::Value) -> Self {
        self.fields.insert(k, v);
        self
    }
}

pub struct JsonOutput {
    opts: OutputOptions,
}

impl JsonOutput {
    pub fn new(opts: OutputOptions) -> Self {
        Self { opts }
    }

    fn json_event(&mut self, ev: JsonEvent) {
        println!(
            "{}",
            serde_json::to_string(&ev).unwrap_or_else(|_| "{}".to_string())
        );
    }

    fn error_event(&mut self, code: i32, msg: &str) {
        self.json_event(
            JsonEvent::status("error")
                .with_u64("code", code.max(0) as u64)
                .with_str("message", msg),
        );

        if self.opts.verbose {
            eprintln!("error: {msg}");
        }
    }
}

impl Reporter for JsonOutput {
    fn emit(&mut self, event: Event) {
        match event {
            Event::Bridge(ev) => self.json_event(bridge_event_to_json(ev)),
            Event::Prompt => {}
            Event::Inspect(summary) => self.json_event(inspect_to_json(summary)),
            Event::ListPorts(ports) => self.json_event(list_to_json(&ports)),
            Event::Error { code, message } => self.error_event(code, &message),
        }
    }

    fn finish(&mut self) {}
}

pub fn list_to_json(ports: &[PortInfo]) -> JsonEvent {
    JsonEvent::status("list")
        .with_u64("count", ports.len() as u64)
        .with_value(
            "ports",
            serde_json::to_value(ports).unwrap_or_else(|_| serde_json::Value::Array(Vec::new())),
        )
}

pub fn inspect_to_json(summary: InspectSummary) -> JsonEvent {
    JsonEvent::status("inspect")
        .with_str("file", &summary.file)
        .with_u64("bytes", summary.bytes as u64)
        .with_bool("complete", summary.complete)
        .with_u64("capacity", summary.capacity as u64)
        .with_u64("padded", summary.padded as u64)
        .with_u64("pages", summary.pages as u64)
        .with_u64("wait_ms", summary.wait_ms)
}

fn kind_value<T: serde::Serialize>(kind: &T) -> serde_json::Value {
    serde_json::to_value(kind).unwrap_or_else(|_| serde_json::Value::from("unknown"))
}

pub fn bridge_event_to_json(ev: BridgeEvent) -> JsonEvent {
    match ev {
        BridgeEvent::MediumOpened { path } => {
            JsonEvent::status("medium_opened").with_str("path", &path)
        }
        BridgeEvent::ImageLoaded {
            bytes,
            padded,
            wait_ms,
        } => JsonEvent::status("image_loaded")
            .with_u64("bytes", bytes as u64)
            .with_u64("padded", padded as u64)
            .with_u64("wait_ms", wait_ms),
        BridgeEvent::ImageIncomplete { bytes } => {
            JsonEvent::status("image_incomplete").with_u64("bytes", bytes as u64)
        }
        BridgeEvent::ImageLoadFailed { kind, message } => JsonEvent::status("image_load_failed")
            .with_value("kind", kind_value(&kind))
            .with_str("message", &message),
        BridgeEvent::Status(status) => JsonEvent::status("status")
            .with_bool("ready", status.ready)
            .with_bool("image_loaded", status.image_loaded),
        BridgeEvent::CommandAccepted { command } => JsonEvent::status("command")
            .with_u64("code", command.code().max(0) as u64)
            .with_str("command", command.name()),
        BridgeEvent::CommandRejected {
            code,
            kind,
            message,
        } => JsonEvent::status("command_rejected")
            .with_value("code", serde_json::Value::from(code))
            .with_value("kind", kind_value(&kind))
            .with_str("message", &message),
        BridgeEvent::FrameSent { command, frame } => JsonEvent::status("frame_sent")
            .with_str("command", command.name())
            .with_str("frame", &format_frame(&frame)),
        BridgeEvent::ImageSent {
            bytes,
            padded,
            wait_ms,
        } => JsonEvent::status("image_sent")
            .with_u64("bytes", bytes as u64)
            .with_u64("padded", padded as u64)
            .with_u64("wait_ms", wait_ms),
        BridgeEvent::StatusByte { value } => {
            let ev = JsonEvent::status("status_byte");
            match value {
                Some(b) => ev.with_u64("value", b as u64),
                None => ev.with_value("value", serde_json::Value::Null),
            }
        }
        BridgeEvent::RegionErased { bytes, wait_ms } => JsonEvent::status("region_erased")
            .with_u64("bytes", bytes as u64)
            .with_u64("wait_ms", wait_ms),
        BridgeEvent::LinkClosed => JsonEvent::status("link_closed"),
    }
}
