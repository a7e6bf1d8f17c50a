use std::{error::Error, time::Duration};

use tokio::sync::mpsc::{self, error::TrySendError};

use crate::config::GestureConfig;

use super::{
    client::GestureClient,
    contact::RawTouchSample,
    engine::{GestureEngine, TimeoutToken},
    event::{GestureEventListener, MouseOutput},
    state::GestureState,
    GestureError,
};

/// Size of the command channel buffer for processing touch samples. A
/// timeout that finds the buffer full is delivered from its own task once
/// there is room again.
pub(crate) const BUFFER_SIZE: usize = 2048;

/// Commands processed by a [GestureService]
#[derive(Debug, Clone)]
pub enum GestureCommand {
    InjectTouchPoint(RawTouchSample),
    Timeout(TimeoutToken),
    GetOutput(mpsc::Sender<MouseOutput>),
    GetGestureState(mpsc::Sender<GestureState>),
    ClearGestureState,
    Stop,
}

/// Owns a [GestureEngine] and serializes every touch sample and short-tap
/// expiration through a single command loop. Queued button transitions are
/// applied after each command, paced apart by the configured delay.
#[derive(Debug)]
pub struct GestureService {
    engine: GestureEngine,
    button_pacing: Duration,
    tx: mpsc::Sender<GestureCommand>,
    rx: mpsc::Receiver<GestureCommand>,
}

impl GestureService {
    /// Create a new service that reports synthesized mouse events to the
    /// given listener. Must be called from within a tokio runtime.
    pub fn new<L>(config: GestureConfig, listener: L) -> Result<Self, GestureError>
    where
        L: GestureEventListener + 'static,
    {
        let (tx, rx) = mpsc::channel(BUFFER_SIZE);
        let button_pacing = config.button_pacing();

        // Expirations are routed through the command loop. The callback runs
        // on the timer task and must not block it.
        let timeout_tx = tx.clone();
        let mut engine = GestureEngine::new(config, move |token| {
            match timeout_tx.try_send(GestureCommand::Timeout(token)) {
                Ok(_) => (),
                Err(TrySendError::Full(cmd)) => {
                    log::debug!("Command queue full, deferring short-tap timeout");
                    let tx = timeout_tx.clone();
                    tokio::spawn(async move {
                        if let Err(e) = tx.send(cmd).await {
                            log::debug!("Gesture service stopped before timeout delivery: {e}");
                        }
                    });
                }
                Err(TrySendError::Closed(_)) => {
                    log::debug!("Gesture service stopped, dropping short-tap timeout");
                }
            }
        })?;
        engine.set_event_listener(listener);

        Ok(Self {
            engine,
            button_pacing,
            tx,
            rx,
        })
    }

    /// Returns a client to communicate with the service
    pub fn client(&self) -> GestureClient {
        self.tx.clone().into()
    }

    /// Process commands until the service is stopped
    pub async fn run(&mut self) -> Result<(), Box<dyn Error + Send + Sync>> {
        log::debug!("Starting gesture service");
        while let Some(cmd) = self.rx.recv().await {
            match cmd {
                GestureCommand::InjectTouchPoint(sample) => {
                    if let Err(e) = self.engine.inject_touch_point(sample) {
                        log::warn!("Dropping touch sample: {e}");
                    }
                }
                GestureCommand::Timeout(token) => self.engine.on_timeout(token),
                GestureCommand::GetOutput(sender) => {
                    if let Err(e) = sender.send(self.engine.output()).await {
                        log::error!("Failed to send mouse output: {e:?}");
                    }
                }
                GestureCommand::GetGestureState(sender) => {
                    if let Err(e) = sender.send(self.engine.state()).await {
                        log::error!("Failed to send gesture state: {e:?}");
                    }
                }
                GestureCommand::ClearGestureState => self.engine.clear_gesture_state(),
                GestureCommand::Stop => {
                    log::debug!("Stopping gesture service");
                    break;
                }
            }

            self.apply_buttons().await;
        }

        self.engine.stop();
        log::debug!("Gesture service stopped");

        Ok(())
    }

    /// Apply queued button transitions with a pause between each one, so a
    /// press and its release are never observed as a single report.
    async fn apply_buttons(&mut self) {
        while let Some(step) = self.engine.apply_next_button() {
            log::trace!("Applied button step: {step:?}");
            if self.engine.has_pending_buttons() && !self.button_pacing.is_zero() {
                tokio::time::sleep(self.button_pacing).await;
            }
        }
    }
}
