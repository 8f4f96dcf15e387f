use std::time::Duration;

use tracing::{debug, info, warn};

use crate::board;
use crate::image::CodeImage;
use crate::transport::{Transport, TransportError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub page_size: usize,
    /// Time for one page to leave the link at the configured baud rate.
    pub page_drain: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            page_size: board::PAGE_SIZE,
            page_drain: Duration::from_millis(board::PAGE_DRAIN_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransmitReport {
    pub payload: usize,
    pub padded: usize,
    pub wait: Duration,
    pub status_byte: Option<u8>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EraseReport {
    pub bytes: usize,
    pub wait: Duration,
}

/// Bytes on the wire for a `len`-byte image.
///
/// Always at least one page more than the whole pages in `len`, so an aligned image
/// still gets a trailing page of zeros.
pub fn padded_len(len: usize, page_size: usize) -> usize {
    let page_size = page_size.max(1);
    (len / page_size + 1) * page_size
}

/// Time the link needs to drain `bytes`, counted in whole pages.
pub fn drain_wait(bytes: usize, pacing: &Pacing) -> Duration {
    let pages = bytes / pacing.page_size.max(1);
    pacing
        .page_drain
        .saturating_mul(u32::try_from(pages).unwrap_or(u32::MAX))
}

/// Sends the image payload, zero-pads it to the page boundary, waits for the link to
/// drain, then reads the device's status byte.
///
/// The status byte is advisory: a failed read is logged and reported as `None`.
pub fn transmit_image<T: Transport + ?Sized>(
    transport: &mut T,
    image: &CodeImage,
    pacing: &Pacing,
) -> Result<TransmitReport, TransportError> {
    let payload = image.payload();
    let padded = padded_len(payload.len(), pacing.page_size);

    transport.write_all(payload)?;
    transport.write_all(&vec![0u8; padded - payload.len()])?;

    let wait = drain_wait(padded, pacing);
    debug!(
        payload = payload.len(),
        padded,
        wait_ms = wait.as_millis() as u64,
        "image written, waiting for link to drain"
    );
    transport.idle(wait);

    let status_byte = match transport.read_status() {
        Ok(b) => b,
        Err(e) => {
            warn!("status byte read failed: {e}");
            None
        }
    };

    info!(payload = payload.len(), padded, ?status_byte, "image transmitted");
    Ok(TransmitReport {
        payload: payload.len(),
        padded,
        wait,
        status_byte,
    })
}

/// Overwrites the application region with `capacity` zero bytes.
pub fn erase_region<T: Transport + ?Sized>(
    transport: &mut T,
    capacity: usize,
    pacing: &Pacing,
) -> Result<EraseReport, TransportError> {
    transport.write_all(&vec![0u8; capacity])?;

    let wait = drain_wait(capacity, pacing);
    transport.idle(wait);

    info!(bytes = capacity, wait_ms = wait.as_millis() as u64, "application region erased");
    Ok(EraseReport {
        bytes: capacity,
        wait,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::MockTransport;

    fn image_of(bytes: &[u8], capacity: usize) -> CodeImage {
        let mut img = CodeImage::new(capacity);
        assert!(img.write_at(0, bytes));
        img.set_len(bytes.len());
        img
    }

    fn open_mock() -> MockTransport {
        let mut t = MockTransport::default();
        t.open().unwrap();
        t
    }

    #[test]
    fn test_padded_len_always_adds_a_page() {
        let cases = [
            (0, 256),
            (1, 256),
            (255, 256),
            (256, 512),
            (257, 512),
            (511, 512),
            (512, 768),
        ];
        for (len, padded) in cases {
            assert_eq!(padded_len(len, 256), padded, "len {len}");
        }
    }

    #[test]
    fn test_drain_wait_is_linear_in_pages() {
        let pacing = Pacing::default();
        for pages in [1usize, 2, 3, 10, 96, 97] {
            assert_eq!(
                drain_wait(pages * 256, &pacing),
                Duration::from_millis(pages as u64 * 136)
            );
        }
        assert_eq!(drain_wait(0, &pacing), Duration::ZERO);
    }

    #[test]
    fn test_full_capacity_image_timing() {
        let pacing = Pacing::default();
        let padded = padded_len(board::CODE_SIZE, pacing.page_size);
        assert_eq!(padded, 24_832);
        assert_eq!(drain_wait(padded, &pacing), Duration::from_millis(13_192));
    }

    #[test]
    fn test_transmit_writes_payload_then_zero_padding() {
        let mut t = open_mock();
        t.status = Some(0x79);
        let payload: Vec<u8> = (1..=100u8).collect();
        let img = image_of(&payload, 1024);

        let report = transmit_image(&mut t, &img, &Pacing::default()).unwrap();

        assert_eq!(t.written.len(), 256);
        assert_eq!(&t.written[..100], payload.as_slice());
        assert!(t.written[100..].iter().all(|b| *b == 0));
        assert_eq!(t.idles, vec![Duration::from_millis(136)]);
        assert_eq!(t.status_reads, 1);
        assert_eq!(
            report,
            TransmitReport {
                payload: 100,
                padded: 256,
                wait: Duration::from_millis(136),
                status_byte: Some(0x79),
            }
        );
    }

    #[test]
    fn test_transmit_never_sends_bytes_past_len_as_payload() {
        let mut img = CodeImage::new(512);
        assert!(img.write_at(0, &[0xAA; 300]));
        img.set_len(10);

        let mut t = open_mock();
        transmit_image(&mut t, &img, &Pacing::default()).unwrap();

        assert_eq!(t.written.len(), 256);
        assert!(t.written[10..].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_transmit_ignores_status_read_failure() {
        let mut t = open_mock();
        t.fail_status = true;
        let img = image_of(&[0x01; 256], 1024);

        let report = transmit_image(&mut t, &img, &Pacing::default()).unwrap();
        assert_eq!(report.padded, 512);
        assert_eq!(report.status_byte, None);
    }

    #[test]
    fn test_erase_sends_capacity_zeros_without_extra_page() {
        let mut t = open_mock();

        let report = erase_region(&mut t, board::CODE_SIZE, &Pacing::default()).unwrap();

        assert_eq!(t.written.len(), board::CODE_SIZE);
        assert!(t.written.iter().all(|b| *b == 0));
        assert_eq!(report.wait, Duration::from_millis(96 * 136));
        assert_eq!(t.idles, vec![report.wait]);
        assert_eq!(t.status_reads, 0);
    }
}
