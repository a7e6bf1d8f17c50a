use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use packed_struct::{PackedStruct, PackingError};
use thiserror::Error;
use tokio::sync::mpsc;

use crate::gesture::{
    contact::RawTouchSample,
    event::{GestureEvent, GestureEventListener, MouseOutput},
};

use super::hid_report::{PackedMouseReport, PackedTouchReport, TOUCH_REPORT_ID};

/// Size of a digitizer touch report
pub const TOUCH_PACKET_SIZE: usize = 7;
/// Size of a synthesized mouse report
pub const MOUSE_PACKET_SIZE: usize = 7;

/// Possible errors decoding or encoding HID reports
#[derive(Error, Debug)]
pub enum DriverError {
    #[error("invalid input report size was received: {0}/{TOUCH_PACKET_SIZE}")]
    InvalidSize(usize),
    #[error("unexpected report id: {0:#04x}")]
    InvalidReportId(u8),
    #[error("failed to pack or unpack report: {0}")]
    Packing(#[from] PackingError),
}

/// Decode a raw digitizer input report into a touch sample
pub fn decode_touch_report(buf: &[u8]) -> Result<RawTouchSample, DriverError> {
    let Ok(buf) = <&[u8; TOUCH_PACKET_SIZE]>::try_from(buf) else {
        return Err(DriverError::InvalidSize(buf.len()));
    };
    let report = PackedTouchReport::unpack(buf)?;
    if report.report_id != TOUCH_REPORT_ID {
        return Err(DriverError::InvalidReportId(report.report_id));
    }

    Ok(report.sample())
}

/// Encode the given output into a mouse input report
pub fn encode_mouse_report(output: MouseOutput) -> Result<[u8; MOUSE_PACKET_SIZE], DriverError> {
    let report = PackedMouseReport::from(output);
    Ok(report.pack()?)
}

/// Read-only handle to the pointing mode of a [PointingModeListener]. The
/// transport uses it to decide whether raw touch reports pass through.
#[derive(Debug, Clone)]
pub struct PointingMode(Arc<AtomicBool>);

impl PointingMode {
    pub fn is_enabled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Gesture listener for a touch-to-mouse filter. The four-finger toggle
/// gesture switches between pointing mode, where synthesized mouse reports
/// are forwarded, and touch mode, where they are dropped.
#[derive(Debug)]
pub struct PointingModeListener {
    enabled: Arc<AtomicBool>,
    tx: mpsc::Sender<[u8; MOUSE_PACKET_SIZE]>,
}

impl PointingModeListener {
    /// Create a listener in pointing mode that sends encoded mouse reports
    /// over the given channel.
    pub fn new(tx: mpsc::Sender<[u8; MOUSE_PACKET_SIZE]>) -> Self {
        Self {
            enabled: Arc::new(AtomicBool::new(true)),
            tx,
        }
    }

    pub fn pointing_mode(&self) -> PointingMode {
        PointingMode(self.enabled.clone())
    }
}

impl GestureEventListener for PointingModeListener {
    fn on_gesture_event(&mut self, event: &mut GestureEvent<'_>) {
        if event.is_toggle_event() {
            let was_enabled = self.enabled.fetch_xor(true, Ordering::SeqCst);
            if was_enabled {
                log::info!("Pointing mode disabled");
            } else {
                log::info!("Pointing mode enabled");
            }
            event.clear_gesture_state();
        }

        if !self.enabled.load(Ordering::SeqCst) {
            return;
        }

        let report = match encode_mouse_report(event.output()) {
            Ok(report) => report,
            Err(e) => {
                log::error!("Failed to encode mouse report: {e}");
                return;
            }
        };
        if let Err(e) = self.tx.try_send(report) {
            log::warn!("Dropping mouse report: {e}");
        }
    }
}
