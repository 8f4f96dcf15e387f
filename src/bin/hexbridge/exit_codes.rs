use hexbridge::ErrorKind;

pub const EXIT_OK: i32 = 0;
pub const EXIT_NO_STORAGE: i32 = 10;
pub const EXIT_INVALID_IMAGE: i32 = 11;
pub const EXIT_LINK_FAILED: i32 = 12;
pub const EXIT_UNKNOWN_COMMAND: i32 = 13;
pub const EXIT_NO_IMAGE: i32 = 14;
pub const EXIT_UNEXPECTED: i32 = 20;

pub fn for_kind(kind: ErrorKind) -> i32 {
    match kind {
        ErrorKind::StorageUnavailable | ErrorKind::FileNotFound => EXIT_NO_STORAGE,
        ErrorKind::ImageTooLarge => EXIT_INVALID_IMAGE,
        ErrorKind::Transport => EXIT_LINK_FAILED,
        ErrorKind::UnknownCommand => EXIT_UNKNOWN_COMMAND,
        ErrorKind::TransmitWithoutImage => EXIT_NO_IMAGE,
    }
}
