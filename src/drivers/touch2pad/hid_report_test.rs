use std::error::Error;

use packed_struct::{
    types::{Integer, SizedInteger},
    PackedStruct,
};

use crate::{
    drivers::touch2pad::hid_report::{PackedMouseReport, PackedTouchReport, TIP_SWITCH},
    gesture::{contact::RawTouchSample, event::MouseOutput},
};

// ReportID: 1 | Tip Switch: 1 | Contact Id: 0 | X: 540 | Y: 505
#[tokio::test]
async fn test_touch_report() -> Result<(), Box<dyn Error>> {
    let mut report = PackedTouchReport::default();
    report.status = TIP_SWITCH;
    report.contact_id = 0;
    report.x = Integer::from_primitive(540);
    report.y = Integer::from_primitive(505);

    let expected: [u8; 7] = [0x01, 0x01, 0x00, 0x1c, 0x02, 0xf9, 0x01];
    let packed = report.pack()?;
    assert_eq!(expected, packed);

    let unpacked = PackedTouchReport::unpack(&expected)?;
    assert_eq!(unpacked.sample(), RawTouchSample::new(0, 540, 505, true));

    Ok(())
}

// ReportID: 1 | Tip Switch: 0 | Contact Id: 3 | X: 4095 | Y: 0
#[tokio::test]
async fn test_touch_report_lift() -> Result<(), Box<dyn Error>> {
    let buf: [u8; 7] = [0x01, 0x00, 0x03, 0xff, 0x0f, 0x00, 0x00];
    let report = PackedTouchReport::unpack(&buf)?;
    assert!(!report.is_touching());
    assert_eq!(report.x.to_primitive(), 4095);
    assert_eq!(report.sample(), RawTouchSample::new(3, 4095, 0, false));

    let from_sample = PackedTouchReport::from(RawTouchSample::new(3, 4095, 0, false));
    assert_eq!(from_sample, report);

    Ok(())
}

// ReportID: 2 | Button: 1 | # | X: -60 | Y: 0 | Wheel: 0
#[tokio::test]
async fn test_mouse_report() -> Result<(), Box<dyn Error>> {
    let output = MouseOutput {
        x: -60,
        y: 0,
        wheel: 0,
        buttons: 0x1,
    };
    let report = PackedMouseReport::from(output);

    let expected: [u8; 7] = [0x02, 0x01, 0xc4, 0xff, 0x00, 0x00, 0x00];
    let packed = report.pack()?;
    assert_eq!(expected, packed);

    Ok(())
}

// ReportID: 2 | Button: 0 | # | X: 0 | Y: 1023 | Wheel: -10
#[tokio::test]
async fn test_mouse_report_wheel() -> Result<(), Box<dyn Error>> {
    let buf: [u8; 7] = [0x02, 0x00, 0x00, 0x00, 0xff, 0x03, 0xf6];
    let report = PackedMouseReport::unpack(&buf)?;
    let output = MouseOutput::from(report);
    assert_eq!(
        output,
        MouseOutput {
            x: 0,
            y: 1023,
            wheel: -10,
            buttons: 0,
        }
    );

    Ok(())
}
