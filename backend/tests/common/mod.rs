#![allow(dead_code)]

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use adapters::crypt::CredentialHasher;
use adapters::ftp::{DataStream, FtpChannel, FtpConnector};
use adapters::{AdapterError, ConnectionConfig};
use async_trait::async_trait;
use tokio::io::AsyncWriteExt;

/// Ordered record of the calls a mock channel received.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, event: impl Into<String>) {
        self.0.lock().unwrap().push(event.into());
    }

    pub fn events(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|e| *e == event).count()
    }
}

/// In-process stand-in for an FTP server, configured per test.
#[derive(Debug, Clone)]
pub struct MockFtpServer {
    /// Value of the connected flag once the transport reports ready.
    pub connected_after_ready: bool,
    pub open_error: Option<(u16, String)>,
    pub store_error: Option<(u16, String)>,
    pub files: HashMap<String, Vec<u8>>,
    pub chunk_size: usize,
    pub chunk_delay: Duration,
    /// Stop streaming after this many bytes and fail the transfer.
    pub abort_after: Option<usize>,
    /// Local file whose size is sampled when the channel is closed.
    pub observe_local: Option<PathBuf>,
    pub stored: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    pub local_size_at_close: Arc<Mutex<Vec<Option<u64>>>>,
    pub log: CallLog,
}

impl Default for MockFtpServer {
    fn default() -> Self {
        Self {
            connected_after_ready: true,
            open_error: None,
            store_error: None,
            files: HashMap::new(),
            chunk_size: 4,
            chunk_delay: Duration::ZERO,
            abort_after: None,
            observe_local: None,
            stored: Arc::default(),
            local_size_at_close: Arc::default(),
            log: CallLog::default(),
        }
    }
}

impl MockFtpServer {
    pub fn with_file(mut self, path: &str, body: &[u8]) -> Self {
        self.files.insert(path.to_string(), body.to_vec());
        self
    }
}

#[async_trait]
impl FtpConnector for MockFtpServer {
    async fn open(&self, _config: &ConnectionConfig) -> adapters::Result<Box<dyn FtpChannel>> {
        self.log.push("open");
        if let Some((code, message)) = &self.open_error {
            return Err(AdapterError::Reply {
                code: *code,
                message: message.clone(),
            });
        }
        Ok(Box::new(MockChannel {
            server: self.clone(),
            connected: self.connected_after_ready,
        }))
    }
}

pub struct MockChannel {
    server: MockFtpServer,
    connected: bool,
}

#[async_trait]
impl FtpChannel for MockChannel {
    fn is_connected(&self) -> bool {
        self.connected
    }

    async fn store(&mut self, local: &Path, remote: &str) -> adapters::Result<u64> {
        self.server.log.push("store");
        let body = tokio::fs::read(local).await?;
        if let Some((code, message)) = &self.server.store_error {
            return Err(AdapterError::Reply {
                code: *code,
                message: message.clone(),
            });
        }
        let len = body.len() as u64;
        self.server.stored.lock().unwrap().insert(remote.to_string(), body);
        Ok(len)
    }

    async fn retrieve(&mut self, remote: &str) -> adapters::Result<DataStream> {
        self.server.log.push("retrieve");
        let body = self
            .server
            .files
            .get(remote)
            .cloned()
            .ok_or_else(|| AdapterError::Reply {
                code: 550,
                message: "No such file or directory".into(),
            })?;

        let body = match self.server.abort_after {
            Some(limit) => body[..limit.min(body.len())].to_vec(),
            None => body,
        };

        let (mut writer, reader) = tokio::io::duplex(64);
        let chunk_size = self.server.chunk_size.max(1);
        let delay = self.server.chunk_delay;
        tokio::spawn(async move {
            for chunk in body.chunks(chunk_size) {
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                if writer.write_all(chunk).await.is_err() {
                    return;
                }
            }
            let _ = writer.shutdown().await;
        });
        Ok(Box::new(reader))
    }

    async fn finish_transfer(&mut self) -> adapters::Result<()> {
        self.server.log.push("finish");
        if self.server.abort_after.is_some() {
            return Err(AdapterError::Reply {
                code: 426,
                message: "Connection closed; transfer aborted".into(),
            });
        }
        Ok(())
    }

    async fn close(&mut self) -> adapters::Result<()> {
        self.server.log.push("close");
        let size = self
            .server
            .observe_local
            .as_ref()
            .and_then(|path| std::fs::metadata(path).ok())
            .map(|meta| meta.len());
        self.server.local_size_at_close.lock().unwrap().push(size);
        self.connected = false;
        Ok(())
    }
}

pub fn ftp_config() -> ConnectionConfig {
    ConnectionConfig::new("ftp.example.com", 21, "u", "p")
}

/// Hasher that "hashes" by prefixing, so tests stay fast and deterministic.
pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash(&self, plaintext: &str) -> adapters::Result<String> {
        Ok(format!("plain:{plaintext}"))
    }

    fn compare(&self, plaintext: &str, hash: &str) -> adapters::Result<bool> {
        Ok(hash == format!("plain:{plaintext}"))
    }
}
