use packed_struct::prelude::*;

use crate::gesture::{contact::RawTouchSample, event::MouseOutput};

/// Report id of digitizer touch reports
pub const TOUCH_REPORT_ID: u8 = 0x01;
/// Report id of synthesized mouse reports
pub const MOUSE_REPORT_ID: u8 = 0x02;

/// Status bit set while the contact touches the surface
pub const TIP_SWITCH: u8 = 0x01;

// ReportID: 1 | Tip Switch: 1 | Contact Id: 0 | X: 540 | Y: 505
// 01 01 00 1c 02 f9 01
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "7")]
pub struct PackedTouchReport {
    #[packed_field(bytes = "0")]
    pub report_id: u8,
    #[packed_field(bytes = "1")]
    pub status: u8,
    #[packed_field(bytes = "2")]
    pub contact_id: u8,
    #[packed_field(bytes = "3..=4", endian = "lsb")]
    pub x: Integer<u16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "5..=6", endian = "lsb")]
    pub y: Integer<u16, packed_bits::Bits<16>>,
}

impl PackedTouchReport {
    pub fn is_touching(&self) -> bool {
        self.status & TIP_SWITCH != 0
    }

    /// Convert the report into a sample for the gesture engine
    pub fn sample(&self) -> RawTouchSample {
        RawTouchSample::new(
            self.contact_id as u32,
            self.x.to_primitive(),
            self.y.to_primitive(),
            self.is_touching(),
        )
    }
}

impl Default for PackedTouchReport {
    fn default() -> Self {
        Self {
            report_id: TOUCH_REPORT_ID,
            status: 0,
            contact_id: 0,
            x: Integer::from_primitive(0),
            y: Integer::from_primitive(0),
        }
    }
}

impl From<RawTouchSample> for PackedTouchReport {
    fn from(sample: RawTouchSample) -> Self {
        Self {
            status: if sample.down { TIP_SWITCH } else { 0 },
            contact_id: sample.contact_id.min(u8::MAX as u32) as u8,
            x: Integer::from_primitive(sample.x),
            y: Integer::from_primitive(sample.y),
            ..Default::default()
        }
    }
}

// ReportID: 2 | Button: 1 | # | X: -60 | Y: 0 | Wheel: 0
// 02 01 c4 ff 00 00 00
#[derive(PackedStruct, Debug, Copy, Clone, PartialEq)]
#[packed_struct(bit_numbering = "msb0", size_bytes = "7")]
pub struct PackedMouseReport {
    #[packed_field(bytes = "0")]
    pub report_id: u8,
    #[packed_field(bytes = "1")]
    pub buttons: u8,
    #[packed_field(bytes = "2..=3", endian = "lsb")]
    pub x: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "4..=5", endian = "lsb")]
    pub y: Integer<i16, packed_bits::Bits<16>>,
    #[packed_field(bytes = "6")]
    pub wheel: Integer<i8, packed_bits::Bits<8>>,
}

impl Default for PackedMouseReport {
    fn default() -> Self {
        Self {
            report_id: MOUSE_REPORT_ID,
            buttons: 0,
            x: Integer::from_primitive(0),
            y: Integer::from_primitive(0),
            wheel: Integer::from_primitive(0),
        }
    }
}

impl From<MouseOutput> for PackedMouseReport {
    fn from(output: MouseOutput) -> Self {
        Self {
            buttons: output.buttons,
            x: Integer::from_primitive(output.x),
            y: Integer::from_primitive(output.y),
            wheel: Integer::from_primitive(output.wheel),
            ..Default::default()
        }
    }
}

impl From<PackedMouseReport> for MouseOutput {
    fn from(report: PackedMouseReport) -> Self {
        Self {
            x: report.x.to_primitive(),
            y: report.y.to_primitive(),
            wheel: report.wheel.to_primitive(),
            buttons: report.buttons,
        }
    }
}
