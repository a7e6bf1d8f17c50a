//! HID touch-to-mouse filter. Digitizer touch reports are decoded into
//! gesture engine samples and synthesized output is encoded as mouse reports.

pub mod driver;
pub mod hid_report;
#[cfg(test)]
pub mod hid_report_test;
