use std::{error::Error, time::Duration};

use tokio::{sync::mpsc, time::sleep};

use crate::gesture::timer::TapTimer;

#[tokio::test(start_paused = true)]
async fn test_start_stop_round_trip() -> Result<(), Box<dyn Error>> {
    let timer = TapTimer::new()?;
    assert!(timer.is_stopped());
    assert!(timer.is_expired());

    timer.start(Duration::from_millis(300), || ());
    assert!(!timer.is_stopped());
    assert!(!timer.is_expired());

    timer.stop();
    assert!(timer.is_stopped());
    assert!(timer.is_expired());

    // Stopping twice is harmless
    timer.stop();
    assert!(timer.is_stopped());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_callback_fires_after_threshold() -> Result<(), Box<dyn Error>> {
    let timer = TapTimer::new()?;
    let (tx, mut rx) = mpsc::unbounded_channel();
    timer.start(Duration::from_millis(300), move || {
        let _ = tx.send("fired");
    });

    sleep(Duration::from_millis(290)).await;
    assert!(rx.try_recv().is_err());
    assert!(!timer.is_expired());

    sleep(Duration::from_millis(20)).await;
    assert_eq!(rx.try_recv()?, "fired");
    assert!(timer.is_expired());
    // An elapsed timer is expired but was never stopped
    assert!(!timer.is_stopped());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_stop_cancels_callback() -> Result<(), Box<dyn Error>> {
    let timer = TapTimer::new()?;
    let (tx, mut rx) = mpsc::unbounded_channel::<()>();
    timer.start(Duration::from_millis(300), move || {
        let _ = tx.send(());
    });

    sleep(Duration::from_millis(100)).await;
    timer.stop();
    sleep(Duration::from_millis(500)).await;

    // The callback was dropped without running, closing the channel
    assert!(matches!(
        rx.try_recv(),
        Err(mpsc::error::TryRecvError::Disconnected)
    ));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_restart_replaces_deadline_and_callback() -> Result<(), Box<dyn Error>> {
    let timer = TapTimer::new()?;
    let (tx, mut rx) = mpsc::unbounded_channel();

    let first = tx.clone();
    timer.start(Duration::from_millis(300), move || {
        let _ = first.send(1);
    });
    sleep(Duration::from_millis(200)).await;

    let second = tx.clone();
    timer.start(Duration::from_millis(300), move || {
        let _ = second.send(2);
    });

    // The original deadline passes without firing
    sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err());

    sleep(Duration::from_millis(150)).await;
    assert_eq!(rx.try_recv()?, 2);
    assert!(rx.try_recv().is_err());

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_timer_is_reusable() -> Result<(), Box<dyn Error>> {
    let timer = TapTimer::new()?;
    let (tx, mut rx) = mpsc::unbounded_channel();

    for round in 0..3 {
        let tx = tx.clone();
        timer.start(Duration::from_millis(50), move || {
            let _ = tx.send(round);
        });
        let fired = tokio::time::timeout(Duration::from_secs(1), rx.recv()).await?;
        assert_eq!(fired, Some(round));
    }

    Ok(())
}

#[test]
fn test_new_requires_runtime() {
    assert!(TapTimer::new().is_err());
}
