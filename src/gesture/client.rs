use std::time::Duration;

use thiserror::Error;
use tokio::sync::mpsc::{
    channel,
    error::{SendError, SendTimeoutError},
    Receiver, Sender,
};

use super::{
    contact::RawTouchSample, event::MouseOutput, service::GestureCommand, state::GestureState,
};

/// Maximum duration to wait for a response from a command. If this timeout
/// is reached, that typically indicates a deadlock somewhere in the code.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Possible errors for a gesture service client
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("failed to send command to gesture service: {0}")]
    SendError(SendError<GestureCommand>),
    #[error("service encountered an error processing the request: {0}")]
    ServiceError(Box<dyn std::error::Error + Send + Sync>),
    #[error("gesture service no longer exists")]
    ChannelClosed,
}

impl From<SendError<GestureCommand>> for ClientError {
    fn from(err: SendError<GestureCommand>) -> Self {
        Self::SendError(err)
    }
}

/// A client for a [super::service::GestureService]
#[derive(Debug, Clone)]
pub struct GestureClient {
    tx: Sender<GestureCommand>,
}

impl From<Sender<GestureCommand>> for GestureClient {
    fn from(tx: Sender<GestureCommand>) -> Self {
        GestureClient::new(tx)
    }
}

impl GestureClient {
    pub fn new(tx: Sender<GestureCommand>) -> Self {
        Self { tx }
    }

    /// Send the given command to the gesture service. This method uses a
    /// timeout to detect potential deadlocks.
    async fn send(&self, cmd: GestureCommand) -> Result<(), ClientError> {
        let result = self.tx.send_timeout(cmd, DEFAULT_TIMEOUT).await;
        let Err(err) = result else {
            return Ok(());
        };
        match err {
            SendTimeoutError::Timeout(ref cmd) => {
                log::error!("POSSIBLE DEADLOCK: timed out after {DEFAULT_TIMEOUT:?} sending command to gesture service: {cmd:?}");
                Err(ClientError::ServiceError(err.into()))
            }
            SendTimeoutError::Closed(_) => Err(ClientError::ChannelClosed),
        }
    }

    /// Use the given receiver to wait for a response from the gesture service.
    /// This method uses a timeout to detect potential deadlocks.
    async fn recv<T>(mut rx: Receiver<T>) -> Option<T> {
        match tokio::time::timeout(DEFAULT_TIMEOUT, rx.recv()).await {
            Ok(value) => value,
            Err(_) => {
                log::error!("POSSIBLE DEADLOCK: timed out after {DEFAULT_TIMEOUT:?} waiting for response from gesture service");
                None
            }
        }
    }

    /// Process the given touch sample
    pub async fn inject_touch_point(&self, sample: RawTouchSample) -> Result<(), ClientError> {
        self.send(GestureCommand::InjectTouchPoint(sample)).await
    }

    /// Process the given touch sample (blocking)
    pub fn blocking_inject_touch_point(&self, sample: RawTouchSample) -> Result<(), ClientError> {
        self.tx
            .blocking_send(GestureCommand::InjectTouchPoint(sample))?;
        Ok(())
    }

    /// Get the current synthesized mouse output
    pub async fn get_output(&self) -> Result<MouseOutput, ClientError> {
        let (tx, rx) = channel(1);
        self.send(GestureCommand::GetOutput(tx)).await?;
        if let Some(output) = Self::recv(rx).await {
            return Ok(output);
        }
        Err(ClientError::ChannelClosed)
    }

    /// Get the current gesture state
    pub async fn get_gesture_state(&self) -> Result<GestureState, ClientError> {
        let (tx, rx) = channel(1);
        self.send(GestureCommand::GetGestureState(tx)).await?;
        if let Some(state) = Self::recv(rx).await {
            return Ok(state);
        }
        Err(ClientError::ChannelClosed)
    }

    /// Returns true if a toggle gesture is waiting to be consumed
    pub async fn is_toggle_event(&self) -> Result<bool, ClientError> {
        let state = self.get_gesture_state().await?;
        Ok(state == GestureState::Toggle)
    }

    /// Reset the gesture state, consuming a pending toggle gesture
    pub async fn clear_gesture_state(&self) -> Result<(), ClientError> {
        self.send(GestureCommand::ClearGestureState).await
    }

    /// Stop the gesture service
    pub async fn stop(&self) -> Result<(), ClientError> {
        self.send(GestureCommand::Stop).await
    }
}
