//! Host-side bridge that turns an Intel HEX file on removable storage into a
//! binary image and delivers it, page-padded and paced, to a companion bootloader
//! over a serial link.

pub mod board;
pub mod config;
pub mod dispatcher;
pub mod hex;
pub mod image;
pub mod operation;
pub mod ports;
pub mod protocol;
pub mod scheduler;
pub mod status;
pub mod storage;
pub mod transport;

pub use config::BridgeConfig;
pub use dispatcher::{Dispatcher, DispatchError, ErrorKind, LoadError};
pub use image::CodeImage;
pub use protocol::Command;
pub use status::StatusSignals;
