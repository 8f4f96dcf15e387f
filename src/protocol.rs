use std::fmt;

use crate::board;

/// Operator command codes understood by the bridge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Hand control of the device to the bridge.
    ActivateExternalControl,
    /// Leave the bootloader and start the application.
    JumpToApp,
    EnterProgrammerMode,
    Reboot,
    /// Stream the loaded image, padded to whole pages.
    TransmitImage,
    /// Zero the whole application region.
    EraseAppRegion,
    Unknown(i64),
}

impl Command {
    pub fn from_code(code: i64) -> Self {
        match code {
            0 => Command::ActivateExternalControl,
            1 => Command::JumpToApp,
            2 => Command::EnterProgrammerMode,
            3 => Command::Reboot,
            4 => Command::TransmitImage,
            5 => Command::EraseAppRegion,
            other => Command::Unknown(other),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            Command::ActivateExternalControl => 0,
            Command::JumpToApp => 1,
            Command::EnterProgrammerMode => 2,
            Command::Reboot => 3,
            Command::TransmitImage => 4,
            Command::EraseAppRegion => 5,
            Command::Unknown(code) => code,
        }
    }

    /// Opcode of the 3-byte control frame, for commands that send one.
    pub fn opcode(self) -> Option<u8> {
        match self {
            Command::ActivateExternalControl => Some(0xC3),
            Command::JumpToApp => Some(0xAA),
            Command::EnterProgrammerMode => Some(0xBB),
            Command::Reboot => Some(0xCC),
            Command::TransmitImage | Command::EraseAppRegion | Command::Unknown(_) => None,
        }
    }

    pub fn frame(self) -> Option<[u8; board::FRAME_SIZE]> {
        self.opcode()
            .map(|op| [board::FRAME_MARKER, board::FRAME_MARKER, op])
    }

    pub fn name(self) -> &'static str {
        match self {
            Command::ActivateExternalControl => "activate_external_control",
            Command::JumpToApp => "jump_to_app",
            Command::EnterProgrammerMode => "enter_programmer_mode",
            Command::Reboot => "reboot",
            Command::TransmitImage => "transmit_image",
            Command::EraseAppRegion => "erase_app_region",
            Command::Unknown(_) => "unknown",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::ActivateExternalControl => f.write_str("activate external control"),
            Command::JumpToApp => f.write_str("jump to application"),
            Command::EnterProgrammerMode => f.write_str("enter programmer mode"),
            Command::Reboot => f.write_str("reboot device"),
            Command::TransmitImage => f.write_str("transmit image"),
            Command::EraseAppRegion => f.write_str("erase application region"),
            Command::Unknown(code) => write!(f, "unknown command {code}"),
        }
    }
}
