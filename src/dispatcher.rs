use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::BridgeConfig;
use crate::hex::{self, HexError, ParseOutcome};
use crate::image::CodeImage;
use crate::operation::BridgeEvent;
use crate::protocol::Command;
use crate::scheduler;
use crate::status::StatusSignals;
use crate::storage::{Medium, StorageError};
use crate::transport::{Transport, TransportError};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    StorageUnavailable,
    FileNotFound,
    ImageTooLarge,
    UnknownCommand,
    TransmitWithoutImage,
    Transport,
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("invalid HEX: {0}")]
    Hex(#[from] HexError),
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::Storage(StorageError::FileNotFound { .. }) => ErrorKind::FileNotFound,
            LoadError::Storage(_) => ErrorKind::StorageUnavailable,
            LoadError::Hex(HexError::ImageTooLarge { .. }) => ErrorKind::ImageTooLarge,
            LoadError::Hex(HexError::Io(_)) => ErrorKind::StorageUnavailable,
        }
    }
}

#[derive(Error, Debug)]
pub enum DispatchError {
    #[error("command not found: {code}")]
    UnknownCommand { code: i64 },

    #[error("no image loaded; reload the hex file before transmitting")]
    TransmitWithoutImage,

    #[error("link: {0}")]
    Transport(#[from] TransportError),
}

impl DispatchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DispatchError::UnknownCommand { .. } => ErrorKind::UnknownCommand,
            DispatchError::TransmitWithoutImage => ErrorKind::TransmitWithoutImage,
            DispatchError::Transport(_) => ErrorKind::Transport,
        }
    }
}

/// Opens the configured hex file on `medium` and decodes it.
///
/// A stream without the final record is not an error; the partial image comes back as
/// [`ParseOutcome::Incomplete`].
pub fn read_image<F>(
    medium: &Medium,
    config: &BridgeConfig,
    on_event: &mut F,
) -> Result<ParseOutcome, LoadError>
where
    F: FnMut(BridgeEvent),
{
    let hex_file = medium.open(&config.hex_file_name)?;
    on_event(BridgeEvent::MediumOpened {
        path: hex_file.path.display().to_string(),
    });

    let outcome = hex::load_image(hex_file.file, config.parser_options())?;
    debug!(
        bytes = outcome.image().len(),
        complete = outcome.is_complete(),
        "hex file decoded"
    );
    Ok(outcome)
}

/// Drives the companion device from operator command codes.
///
/// The dispatcher owns the link and, between a successful load and the next
/// transmit, the decoded image. Every accepted command runs to completion on a
/// freshly opened link, which is closed again before `dispatch` returns.
pub struct Dispatcher<T> {
    transport: T,
    config: BridgeConfig,
    image: Option<CodeImage>,
    status: StatusSignals,
}

impl<T: Transport> Dispatcher<T> {
    pub fn new(transport: T, config: BridgeConfig) -> Self {
        Self {
            transport,
            config,
            image: None,
            status: StatusSignals::default(),
        }
    }

    pub fn status(&self) -> StatusSignals {
        self.status
    }

    pub fn image(&self) -> Option<&CodeImage> {
        self.image.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Loads the hex file from `medium`, replacing any image still held.
    ///
    /// Failure drops `ready` but leaves the dispatcher usable for commands that do
    /// not need an image. A file without its final record still loads whatever was
    /// decoded. Called once at startup and again to reload.
    pub fn load_image<F>(&mut self, medium: &Medium, mut on_event: F) -> Result<usize, LoadError>
    where
        F: FnMut(BridgeEvent),
    {
        self.image = None;

        let result = match read_image(medium, &self.config, &mut on_event) {
            Ok(ParseOutcome::Complete(image)) => Ok(image),
            Ok(ParseOutcome::Incomplete(image)) => {
                warn!(bytes = image.len(), "hex file ended before its final record");
                on_event(BridgeEvent::ImageIncomplete { bytes: image.len() });
                Ok(image)
            }
            Err(e) => Err(e),
        };

        match result {
            Ok(image) => {
                let bytes = image.len();
                let padded = scheduler::padded_len(bytes, self.config.pacing.page_size);
                let wait = scheduler::drain_wait(padded, &self.config.pacing);
                info!(bytes, padded, "hex file loaded");
                on_event(BridgeEvent::ImageLoaded {
                    bytes,
                    padded,
                    wait_ms: wait.as_millis() as u64,
                });

                self.image = Some(image);
                self.set_status(
                    StatusSignals {
                        image_loaded: true,
                        ..self.status
                    },
                    &mut on_event,
                );
                Ok(bytes)
            }
            Err(e) => {
                warn!("hex file load failed: {e}");
                on_event(BridgeEvent::ImageLoadFailed {
                    kind: e.kind(),
                    message: e.to_string(),
                });
                self.set_status(
                    StatusSignals {
                        ready: false,
                        image_loaded: false,
                    },
                    &mut on_event,
                );
                Err(e)
            }
        }
    }

    /// Runs the command for `code`.
    ///
    /// Unknown codes and a transmit without an image are rejected before the link is
    /// touched.
    pub fn dispatch<F>(&mut self, code: i64, mut on_event: F) -> Result<Command, DispatchError>
    where
        F: FnMut(BridgeEvent),
    {
        let command = Command::from_code(code);

        let rejected = match command {
            Command::Unknown(code) => Some(DispatchError::UnknownCommand { code }),
            Command::TransmitImage if self.image.is_none() => {
                Some(DispatchError::TransmitWithoutImage)
            }
            _ => None,
        };
        if let Some(e) = rejected {
            warn!(code, "command rejected: {e}");
            on_event(BridgeEvent::CommandRejected {
                code,
                kind: e.kind(),
                message: e.to_string(),
            });
            return Err(e);
        }

        on_event(BridgeEvent::CommandAccepted { command });
        self.transport.open()?;

        let result = self.run(command, &mut on_event);

        self.transport.close();
        on_event(BridgeEvent::LinkClosed);

        result.map(|()| command)
    }

    fn run<F>(&mut self, command: Command, on_event: &mut F) -> Result<(), DispatchError>
    where
        F: FnMut(BridgeEvent),
    {
        match command {
            Command::TransmitImage => {
                let Some(image) = self.image.take() else {
                    return Err(DispatchError::TransmitWithoutImage);
                };
                // Consumed whether or not the link keeps up.
                self.set_status(
                    StatusSignals {
                        image_loaded: false,
                        ..self.status
                    },
                    on_event,
                );

                let report =
                    scheduler::transmit_image(&mut self.transport, &image, &self.config.pacing)?;
                on_event(BridgeEvent::ImageSent {
                    bytes: report.payload,
                    padded: report.padded,
                    wait_ms: report.wait.as_millis() as u64,
                });
                on_event(BridgeEvent::StatusByte {
                    value: report.status_byte,
                });
                self.transport.idle(self.config.transmit_settle);
            }
            Command::EraseAppRegion => {
                let report = scheduler::erase_region(
                    &mut self.transport,
                    self.config.capacity,
                    &self.config.pacing,
                )?;
                on_event(BridgeEvent::RegionErased {
                    bytes: report.bytes,
                    wait_ms: report.wait.as_millis() as u64,
                });
            }
            Command::Unknown(code) => return Err(DispatchError::UnknownCommand { code }),
            _ => {
                let Some(frame) = command.frame() else {
                    return Err(DispatchError::UnknownCommand {
                        code: command.code(),
                    });
                };
                self.transport.write_all(&frame)?;
                debug!(%command, ?frame, "control frame sent");
                on_event(BridgeEvent::FrameSent { command, frame });
                self.transport.idle(self.config.frame_settle);

                if command == Command::EnterProgrammerMode {
                    self.set_status(
                        StatusSignals {
                            ready: false,
                            ..self.status
                        },
                        on_event,
                    );
                }
            }
        }
        Ok(())
    }

    fn set_status<F>(&mut self, status: StatusSignals, on_event: &mut F)
    where
        F: FnMut(BridgeEvent),
    {
        if status != self.status {
            self.status = status;
            on_event(BridgeEvent::Status(status));
        }
    }
}
