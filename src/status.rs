/// The two indicator outputs of the bridge.
///
/// `ready` drops when the hex file could not be loaded or the device was put in
/// programmer mode. `image_loaded` is set by a successful load and cleared once the
/// image has been transmitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusSignals {
    pub ready: bool,
    pub image_loaded: bool,
}

impl Default for StatusSignals {
    fn default() -> Self {
        Self {
            ready: true,
            image_loaded: false,
        }
    }
}
