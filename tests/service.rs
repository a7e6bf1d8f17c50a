use std::error::Error;
use std::time::Duration;

use packed_struct::PackedStruct;
use tokio::sync::mpsc;
use tokio::time::sleep;
use touch2pad::config::GestureConfig;
use touch2pad::drivers::touch2pad::driver::{decode_touch_report, PointingModeListener};
use touch2pad::drivers::touch2pad::hid_report::{PackedMouseReport, PackedTouchReport};
use touch2pad::gesture::contact::RawTouchSample;
use touch2pad::gesture::event::MouseOutput;
use touch2pad::gesture::service::GestureService;

/// Feed raw HID touch reports through the service the way a filter
/// transport would, and collect the mouse reports it produces.
async fn run_reports(
    samples: &[(RawTouchSample, u64)],
) -> Result<Vec<MouseOutput>, Box<dyn Error>> {
    let (tx, mut rx) = mpsc::channel(64);
    let mut service = GestureService::new(GestureConfig::default(), PointingModeListener::new(tx))?;
    let client = service.client();
    let task = tokio::spawn(async move { service.run().await });

    for (sample, delay_ms) in samples {
        sleep(Duration::from_millis(*delay_ms)).await;
        let report = PackedTouchReport::from(*sample).pack()?;
        client.inject_touch_point(decode_touch_report(&report)?).await?;
    }
    sleep(Duration::from_millis(600)).await;
    client.stop().await?;
    assert!(task.await?.is_ok());

    let mut outputs = Vec::new();
    while let Some(buf) = rx.recv().await {
        outputs.push(PackedMouseReport::unpack(&buf)?.into());
    }

    Ok(outputs)
}

#[tokio::test(start_paused = true)]
async fn test_drag_holds_left_button() -> Result<(), Box<dyn Error>> {
    let samples = [
        (RawTouchSample::new(0, 1200, 800, true), 0),
        (RawTouchSample::new(0, 1200, 800, false), 60),
        (RawTouchSample::new(0, 1205, 800, true), 60),
        (RawTouchSample::new(0, 1240, 820, true), 400),
        (RawTouchSample::new(0, 1240, 820, false), 10),
    ];
    let outputs = run_reports(&samples).await?;

    let expected = vec![
        MouseOutput {
            buttons: 0x1,
            ..Default::default()
        },
        MouseOutput {
            x: 35,
            y: 20,
            wheel: 0,
            buttons: 0x1,
        },
        MouseOutput::default(),
    ];
    assert_eq!(outputs, expected);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_two_finger_scroll() -> Result<(), Box<dyn Error>> {
    let samples = [
        (RawTouchSample::new(0, 1000, 1500, true), 0),
        (RawTouchSample::new(1, 1400, 1500, true), 10),
        (RawTouchSample::new(0, 1000, 1520, true), 400),
        (RawTouchSample::new(0, 1000, 1560, true), 10),
        (RawTouchSample::new(0, 1000, 1620, true), 10),
        (RawTouchSample::new(1, 1400, 1620, false), 10),
        (RawTouchSample::new(0, 1000, 1620, false), 10),
    ];
    let outputs = run_reports(&samples).await?;

    let wheel: Vec<i8> = outputs.iter().map(|output| output.wheel).collect();
    assert_eq!(wheel, vec![40, 60]);
    assert!(outputs.iter().all(|output| output.buttons == 0));

    Ok(())
}
