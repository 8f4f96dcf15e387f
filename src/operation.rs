use crate::dispatcher::ErrorKind;
use crate::protocol::Command;
use crate::status::StatusSignals;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BridgeEvent {
    MediumOpened {
        path: String,
    },
    ImageLoaded {
        bytes: usize,
        padded: usize,
        wait_ms: u64,
    },
    ImageIncomplete {
        bytes: usize,
    },
    ImageLoadFailed {
        kind: ErrorKind,
        message: String,
    },

    Status(StatusSignals),

    CommandAccepted {
        command: Command,
    },
    CommandRejected {
        code: i64,
        kind: ErrorKind,
        message: String,
    },
    FrameSent {
        command: Command,
        frame: [u8; 3],
    },
    ImageSent {
        bytes: usize,
        padded: usize,
        wait_ms: u64,
    },
    StatusByte {
        value: Option<u8>,
    },
    RegionErased {
        bytes: usize,
        wait_ms: u64,
    },
    LinkClosed,
}
