//! Lifecycle of one connection to the remote file-transfer endpoint.
//!
//! A [`RemoteTransferSession`] is obtained from [`RemoteTransferSession::connect`]
//! already authenticated, performs exactly one upload or download and closes
//! itself before returning, whatever the outcome. Transfers take the session
//! by value, so a handle can neither be reused nor shared between two
//! concurrent transfers.
//!
//! ```text
//! Init -> Connecting -> Ready -> Transferring -> Closed
//!            \                        \
//!             +-------> Error <--------+
//!                         |
//!                         +--> Closed
//! ```

use std::fmt;
use std::path::PathBuf;

use adapters::ftp::{FtpChannel, FtpConnector};
use adapters::{AdapterError, ConnectionConfig};
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;

use crate::errors::SessionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Init,
    Connecting,
    Ready,
    Transferring,
    Closed,
    Error,
}

impl SessionState {
    pub fn can_transition_to(self, next: SessionState) -> bool {
        use SessionState::*;
        matches!(
            (self, next),
            (Init, Connecting)
                | (Connecting, Ready)
                | (Connecting, Error)
                | (Ready, Transferring)
                | (Ready, Closed)
                | (Transferring, Closed)
                | (Transferring, Error)
                | (Error, Closed)
        )
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionState::Init => "init",
            SessionState::Connecting => "connecting",
            SessionState::Ready => "ready",
            SessionState::Transferring => "transferring",
            SessionState::Closed => "closed",
            SessionState::Error => "error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferDirection {
    Upload,
    Download,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    pub local_path: PathBuf,
    pub remote_path: String,
    pub direction: TransferDirection,
}

impl TransferRequest {
    pub fn upload(local_path: impl Into<PathBuf>, remote_path: impl Into<String>) -> Self {
        Self {
            local_path: local_path.into(),
            remote_path: remote_path.into(),
            direction: TransferDirection::Upload,
        }
    }

    pub fn download(remote_path: impl Into<String>, local_path: impl Into<PathBuf>) -> Self {
        Self {
            local_path: local_path.into(),
            remote_path: remote_path.into(),
            direction: TransferDirection::Download,
        }
    }
}

/// Success marker of a completed transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransferOutcome {
    pub direction: TransferDirection,
    pub bytes: u64,
}

/// An authenticated, single-use session.
///
/// There is no timeout parameter. Callers that need one race the operation
/// against `tokio::time::timeout`; when the timer wins the future is dropped,
/// and dropping the session drops its socket.
pub struct RemoteTransferSession {
    channel: Option<Box<dyn FtpChannel>>,
    state: SessionState,
    address: String,
}

impl fmt::Debug for RemoteTransferSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteTransferSession")
            .field("address", &self.address)
            .field("state", &self.state)
            .finish()
    }
}

impl RemoteTransferSession {
    /// Connects and authenticates. Resolves only when the transport is ready
    /// and reports itself connected; no retry is attempted.
    pub async fn connect(
        connector: &dyn FtpConnector,
        config: &ConnectionConfig,
    ) -> Result<Self, SessionError> {
        let mut session = Self {
            channel: None,
            state: SessionState::Init,
            address: config.address(),
        };
        session.transition(SessionState::Connecting);

        if let Err(err) = config.validate() {
            session.abandon();
            return Err(SessionError::Connection(err.to_string()));
        }

        let mut channel = match connector.open(config).await {
            Ok(channel) => channel,
            Err(err) => {
                tracing::warn!(address = %session.address, error = %err, "FTP connect failed");
                session.abandon();
                return Err(SessionError::Connection(err.to_string()));
            }
        };

        // A ready transport is not enough: the login must have stuck.
        if !channel.is_connected() {
            if let Err(err) = channel.close().await {
                tracing::debug!(error = %err, "closing unauthenticated channel failed");
            }
            session.abandon();
            return Err(SessionError::Connection(
                "transport reported ready but the session is not authenticated".into(),
            ));
        }

        session.channel = Some(channel);
        session.transition(SessionState::Ready);
        Ok(session)
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Runs the transfer `request.direction` asks for.
    pub async fn transfer(self, request: &TransferRequest) -> Result<TransferOutcome, SessionError> {
        match request.direction {
            TransferDirection::Upload => self.upload(request).await,
            TransferDirection::Download => self.download(request).await,
        }
    }

    /// Sends `request.local_path` to `request.remote_path`, then closes.
    pub async fn upload(mut self, request: &TransferRequest) -> Result<TransferOutcome, SessionError> {
        let mut channel = self.begin(request, TransferDirection::Upload).await?;
        tracing::info!(
            address = %self.address,
            local = %request.local_path.display(),
            remote = %request.remote_path,
            "FTP upload"
        );

        let result = channel
            .store(&request.local_path, &request.remote_path)
            .await;
        self.finish(channel, TransferDirection::Upload, result).await
    }

    /// Fetches `request.remote_path` into `request.local_path`, then closes.
    ///
    /// The local file is created only once the server accepted the request,
    /// and the session stays open until the file is flushed to disk and the
    /// server confirmed the end of the transfer.
    pub async fn download(mut self, request: &TransferRequest) -> Result<TransferOutcome, SessionError> {
        let mut channel = self.begin(request, TransferDirection::Download).await?;
        tracing::info!(
            address = %self.address,
            remote = %request.remote_path,
            local = %request.local_path.display(),
            "FTP download"
        );

        let result = receive(channel.as_mut(), request).await;
        self.finish(channel, TransferDirection::Download, result).await
    }

    async fn begin(
        &mut self,
        request: &TransferRequest,
        expected: TransferDirection,
    ) -> Result<Box<dyn FtpChannel>, SessionError> {
        let mut channel = match (self.state, self.channel.take()) {
            (SessionState::Ready, Some(channel)) => channel,
            (state, _) => {
                return Err(SessionError::Transfer(format!(
                    "session is {state}, not ready"
                )))
            }
        };

        if request.direction != expected {
            if let Err(err) = channel.close().await {
                tracing::debug!(error = %err, "close after rejected request failed");
            }
            self.transition(SessionState::Closed);
            return Err(SessionError::Transfer(format!(
                "{:?} request passed to {:?}",
                request.direction, expected
            )));
        }

        self.transition(SessionState::Transferring);
        Ok(channel)
    }

    /// Closes the channel exactly once and settles the transfer result.
    async fn finish(
        &mut self,
        mut channel: Box<dyn FtpChannel>,
        direction: TransferDirection,
        result: Result<u64, AdapterError>,
    ) -> Result<TransferOutcome, SessionError> {
        if result.is_err() {
            self.transition(SessionState::Error);
        }

        if let Err(err) = channel.close().await {
            tracing::warn!(address = %self.address, error = %err, "FTP close failed");
        }
        self.transition(SessionState::Closed);

        match result {
            Ok(bytes) => {
                tracing::info!(address = %self.address, bytes, ?direction, "FTP transfer complete");
                Ok(TransferOutcome { direction, bytes })
            }
            Err(err) => {
                tracing::warn!(address = %self.address, error = %err, ?direction, "FTP transfer failed");
                Err(SessionError::Transfer(err.to_string()))
            }
        }
    }

    fn abandon(&mut self) {
        self.transition(SessionState::Error);
        self.transition(SessionState::Closed);
    }

    fn transition(&mut self, next: SessionState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "invalid session transition {} -> {}",
            self.state,
            next
        );
        tracing::debug!(address = %self.address, from = %self.state, to = %next, "session state");
        self.state = next;
    }
}

impl Drop for RemoteTransferSession {
    fn drop(&mut self) {
        if self.channel.is_some() {
            tracing::debug!(address = %self.address, state = %self.state, "session dropped without a transfer");
        }
    }
}

async fn receive(channel: &mut dyn FtpChannel, request: &TransferRequest) -> Result<u64, AdapterError> {
    let mut stream = channel.retrieve(&request.remote_path).await?;

    let mut file = tokio::fs::File::create(&request.local_path).await?;
    let bytes = tokio::io::copy(&mut stream, &mut file).await?;
    file.flush().await?;
    file.sync_all().await?;
    drop(file);
    drop(stream);

    channel.finish_transfer().await?;
    Ok(bytes)
}

/// Connects a fresh session and runs one transfer on it.
pub async fn run_transfer(
    connector: &dyn FtpConnector,
    config: &ConnectionConfig,
    request: &TransferRequest,
) -> Result<TransferOutcome, SessionError> {
    RemoteTransferSession::connect(connector, config)
        .await?
        .transfer(request)
        .await
}
