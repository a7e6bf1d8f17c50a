use std::error::Error;
use std::path::{Path, PathBuf};
use std::time::Duration;

use packed_struct::types::SizedInteger;
use packed_struct::PackedStruct;
use serde::Deserialize;
use tabled::settings::{Panel, Style};
use tabled::{Table, Tabled};
use tokio::sync::mpsc;
use tokio::time::{sleep, Instant};
use touch2pad::config::GestureConfig;
use touch2pad::drivers::touch2pad::driver::PointingModeListener;
use touch2pad::drivers::touch2pad::hid_report::PackedMouseReport;
use touch2pad::gesture::contact::RawTouchSample;
use touch2pad::gesture::service::GestureService;

/// Maximum number of mouse reports buffered while replaying
const REPORT_BUFFER_SIZE: usize = 1024;

/// A single recorded touch sample
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TraceStep {
    pub contact_id: u32,
    pub x: u16,
    pub y: u16,
    pub down: bool,
    /// Delay in milliseconds before this sample is injected
    #[serde(default)]
    pub delay_ms: u64,
}

impl From<&TraceStep> for RawTouchSample {
    fn from(step: &TraceStep) -> Self {
        RawTouchSample::new(step.contact_id, step.x, step.y, step.down)
    }
}

#[derive(Tabled)]
struct MouseReportRow {
    #[tabled(rename = "Time (ms)")]
    time: u128,
    #[tabled(rename = "Buttons")]
    buttons: String,
    #[tabled(rename = "X")]
    x: i16,
    #[tabled(rename = "Y")]
    y: i16,
    #[tabled(rename = "Wheel")]
    wheel: i8,
}

impl MouseReportRow {
    fn new(time: Duration, report: &PackedMouseReport) -> Self {
        Self {
            time: time.as_millis(),
            buttons: format!("{:#04x}", report.buttons),
            x: report.x.to_primitive(),
            y: report.y.to_primitive(),
            wheel: report.wheel.to_primitive(),
        }
    }
}

/// Load a touch trace from the given YAML file
pub fn load_trace(path: &Path) -> Result<Vec<TraceStep>, Box<dyn Error + Send + Sync>> {
    let content = std::fs::read_to_string(path)?;
    let steps: Vec<TraceStep> = serde_yaml::from_str(&content)?;
    Ok(steps)
}

/// Replay the touch trace at the given path and print every mouse report
/// the gesture service synthesized.
pub async fn handle_replay(
    path: PathBuf,
    config: GestureConfig,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let steps = load_trace(&path)?;
    log::info!("Replaying {} touch sample(s) from {}", steps.len(), path.display());

    // Enough time for the last short-tap window and its clicks to play out
    let settle = config.short_tap_window() + config.button_pacing() * 4;

    let (tx, mut rx) = mpsc::channel(REPORT_BUFFER_SIZE);
    let listener = PointingModeListener::new(tx);
    let pointing_mode = listener.pointing_mode();
    let mut service = GestureService::new(config, listener)?;
    let client = service.client();
    let service_task = tokio::spawn(async move { service.run().await });

    // Collect reports until the service drops the listener
    let start = Instant::now();
    let collector = tokio::spawn(async move {
        let mut rows = Vec::new();
        while let Some(buf) = rx.recv().await {
            let report = match PackedMouseReport::unpack(&buf) {
                Ok(report) => report,
                Err(e) => {
                    log::error!("Failed to unpack mouse report: {e:?}");
                    continue;
                }
            };
            log::debug!("Mouse report: {report:?}");
            rows.push(MouseReportRow::new(start.elapsed(), &report));
        }
        rows
    });

    for step in steps.iter() {
        if step.delay_ms > 0 {
            sleep(Duration::from_millis(step.delay_ms)).await;
        }
        client.inject_touch_point(step.into()).await?;
    }
    sleep(settle).await;
    client.stop().await?;
    service_task.await??;

    let rows = collector.await?;
    let count = rows.len();
    let mut table = Table::new(rows);
    table
        .with(Style::modern_rounded())
        .with(Panel::header("Mouse Reports"));
    println!("{table}");
    println!("Generated {count} mouse report(s)");
    if !pointing_mode.is_enabled() {
        println!("Pointing mode is disabled");
    }

    Ok(())
}
