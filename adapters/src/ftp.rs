//! FTP client adapter for the remote file-transfer endpoint.
//!
//! This file contains the `FtpConnector`/`FtpChannel` traits the backend talks
//! to, and their tokio implementation speaking the RFC 959 control and passive
//! data channels: greeting, `USER`/`PASS` login, binary `TYPE I`, `PASV`,
//! `STOR`, `RETR` and `QUIT`.

use std::net::{IpAddr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;

use crate::errors::{AdapterError, Result};
use crate::models::ConnectionConfig;

pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

/// Remote data stream returned by [`FtpChannel::retrieve`].
pub type DataStream = Box<dyn AsyncRead + Send + Unpin>;

/// An authenticated control connection.
///
/// Not safe for concurrent use: at most one transfer may be in flight, which
/// `&mut self` enforces.
#[async_trait]
pub trait FtpChannel: Send {
    /// True once login succeeded and until the channel is closed or lost.
    fn is_connected(&self) -> bool;

    /// Sends the file at `local` to `remote`. Returns the number of bytes sent.
    async fn store(&mut self, local: &Path, remote: &str) -> Result<u64>;

    /// Starts a download of `remote`. The caller must drain the stream and
    /// then call [`FtpChannel::finish_transfer`].
    async fn retrieve(&mut self, remote: &str) -> Result<DataStream>;

    /// Waits for the server's end-of-transfer reply after a retrieve.
    async fn finish_transfer(&mut self) -> Result<()>;

    /// Ends the session. Calling it on a closed channel is a no-op.
    async fn close(&mut self) -> Result<()>;
}

/// Opens authenticated channels.
#[async_trait]
pub trait FtpConnector: Send + Sync {
    async fn open(&self, config: &ConnectionConfig) -> Result<Box<dyn FtpChannel>>;
}

/// Single reply from the control channel. Multi-line texts are joined with `\n`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub message: String,
}

impl Reply {
    pub fn is_preliminary(&self) -> bool {
        (100..200).contains(&self.code)
    }

    pub fn is_negative(&self) -> bool {
        self.code >= 400
    }

    fn into_error(self) -> AdapterError {
        AdapterError::Reply {
            code: self.code,
            message: self.message,
        }
    }
}

/// Splits `"230 Logged in"` / `"220-Welcome"` into code, continuation flag and text.
pub fn parse_reply_line(line: &str) -> Result<(u16, bool, &str)> {
    let bytes = line.as_bytes();
    if bytes.len() < 3 || !bytes[..3].iter().all(u8::is_ascii_digit) {
        return Err(AdapterError::UnexpectedReply(line.to_string()));
    }
    let code = line[..3]
        .parse::<u16>()
        .map_err(|_| AdapterError::UnexpectedReply(line.to_string()))?;
    match bytes.get(3) {
        None => Ok((code, false, "")),
        Some(b' ') => Ok((code, false, &line[4..])),
        Some(b'-') => Ok((code, true, &line[4..])),
        Some(_) => Err(AdapterError::UnexpectedReply(line.to_string())),
    }
}

/// Extracts the data port from a `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)` text.
pub fn parse_pasv_port(message: &str) -> Result<u16> {
    let start = message
        .find(|c: char| c.is_ascii_digit())
        .ok_or_else(|| AdapterError::UnexpectedReply(message.to_string()))?;
    let numbers: Vec<u16> = message[start..]
        .split(|c: char| !c.is_ascii_digit())
        .filter(|part| !part.is_empty())
        .take(6)
        .map(str::parse)
        .collect::<std::result::Result<_, _>>()
        .map_err(|_| AdapterError::UnexpectedReply(message.to_string()))?;

    if numbers.len() != 6 || numbers.iter().any(|n| *n > 255) {
        return Err(AdapterError::UnexpectedReply(message.to_string()));
    }
    Ok(numbers[4] * 256 + numbers[5])
}

/// Production connector over tokio TCP.
#[derive(Debug, Clone)]
pub struct TcpFtpConnector {
    timeout: Duration,
}

impl TcpFtpConnector {
    pub fn new() -> Self {
        Self {
            timeout: DEFAULT_CONNECT_TIMEOUT,
        }
    }

    /// Bounds the TCP connect and the whole login exchange.
    pub fn with_timeout(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for TcpFtpConnector {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl FtpConnector for TcpFtpConnector {
    async fn open(&self, config: &ConnectionConfig) -> Result<Box<dyn FtpChannel>> {
        config.validate()?;

        let handshake = async {
            let stream = TcpStream::connect(config.address()).await?;
            let mut client = FtpClient::new(stream)?;
            client.greet().await?;
            client.login(config).await?;
            Ok::<_, AdapterError>(client)
        };

        let mut client = tokio::time::timeout(self.timeout, handshake)
            .await
            .map_err(|_| AdapterError::Timeout(self.timeout))??;

        client.timeout = self.timeout;
        log::debug!("FTP session ready on {}", config.address());
        Ok(Box::new(client))
    }
}

/// Control connection state for one FTP session.
pub struct FtpClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    peer: IpAddr,
    /// Bounds the QUIT exchange in [`FtpChannel::close`].
    timeout: Duration,
    connected: bool,
    closed: bool,
}

impl FtpClient {
    fn new(stream: TcpStream) -> Result<Self> {
        let peer = stream.peer_addr()?.ip();
        let (read, write) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(read),
            writer: write,
            peer,
            timeout: DEFAULT_CONNECT_TIMEOUT,
            connected: false,
            closed: false,
        })
    }

    async fn greet(&mut self) -> Result<()> {
        let mut reply = self.read_reply().await?;
        // 120: service ready in a few minutes, a 220 follows.
        while reply.code == 120 {
            reply = self.read_reply().await?;
        }
        expect(reply, &[220]).map(|_| ())
    }

    async fn login(&mut self, config: &ConnectionConfig) -> Result<()> {
        let reply = self.command(&format!("USER {}", config.username)).await?;
        let reply = match reply.code {
            230 => reply,
            331 => {
                let pass = format!("PASS {}", config.credential.expose());
                let reply = self.command(&pass).await?;
                expect(reply, &[230, 202])?
            }
            _ => return Err(unexpected_or_negative(reply)),
        };
        log::debug!("FTP login accepted: {} {}", reply.code, reply.message);
        self.connected = true;

        let reply = self.command("TYPE I").await?;
        expect(reply, &[200])?;
        Ok(())
    }

    async fn read_reply(&mut self) -> Result<Reply> {
        let first = self.read_line().await?;
        let (code, multiline, text) = parse_reply_line(&first)?;
        let mut message = text.to_string();

        if multiline {
            let terminator = format!("{code} ");
            loop {
                let line = self.read_line().await?;
                message.push('\n');
                if let Some(rest) = line.strip_prefix(&terminator) {
                    message.push_str(rest);
                    break;
                }
                if line == terminator.trim_end() {
                    break;
                }
                message.push_str(&line);
            }
        }

        Ok(Reply { code, message })
    }

    async fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        let read = self.reader.read_line(&mut line).await?;
        if read == 0 {
            self.connected = false;
            return Err(AdapterError::ConnectionClosed);
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    async fn send(&mut self, command: &str) -> Result<()> {
        if command.contains(['\r', '\n']) {
            return Err(AdapterError::InvalidInput(
                "control channel commands must be a single line".into(),
            ));
        }
        if command.starts_with("PASS ") {
            log::trace!("FTP > PASS ***");
        } else {
            log::trace!("FTP > {command}");
        }
        self.writer.write_all(command.as_bytes()).await?;
        self.writer.write_all(b"\r\n").await?;
        self.writer.flush().await?;
        Ok(())
    }

    async fn command(&mut self, command: &str) -> Result<Reply> {
        self.send(command).await?;
        let reply = self.read_reply().await?;
        log::trace!("FTP < {} {}", reply.code, reply.message);
        Ok(reply)
    }

    /// Opens the passive data connection. The advertised address is ignored
    /// because servers behind NAT commonly report a private one.
    async fn passive(&mut self) -> Result<TcpStream> {
        let reply = self.command("PASV").await?;
        let reply = expect(reply, &[227])?;
        let port = parse_pasv_port(&reply.message)?;
        let data = TcpStream::connect(SocketAddr::new(self.peer, port)).await?;
        Ok(data)
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.connected && !self.closed {
            Ok(())
        } else {
            Err(AdapterError::ConnectionClosed)
        }
    }
}

#[async_trait]
impl FtpChannel for FtpClient {
    fn is_connected(&self) -> bool {
        self.connected && !self.closed
    }

    async fn store(&mut self, local: &Path, remote: &str) -> Result<u64> {
        self.ensure_connected()?;
        check_path_argument(remote)?;
        let mut file = File::open(local).await?;
        let mut data = self.passive().await?;

        let reply = self.command(&format!("STOR {remote}")).await?;
        if !reply.is_preliminary() {
            return Err(unexpected_or_negative(reply));
        }

        let sent = tokio::io::copy(&mut file, &mut data).await?;
        data.shutdown().await?;
        drop(data);

        let reply = self.read_reply().await?;
        expect(reply, &[226, 250])?;
        log::debug!("FTP stored {sent} bytes at {remote}");
        Ok(sent)
    }

    async fn retrieve(&mut self, remote: &str) -> Result<DataStream> {
        self.ensure_connected()?;
        check_path_argument(remote)?;
        let data = self.passive().await?;

        let reply = self.command(&format!("RETR {remote}")).await?;
        if !reply.is_preliminary() {
            return Err(unexpected_or_negative(reply));
        }
        Ok(Box::new(data))
    }

    async fn finish_transfer(&mut self) -> Result<()> {
        let reply = self.read_reply().await?;
        expect(reply, &[226, 250]).map(|_| ())
    }

    async fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.connected = false;

        // Best effort: the server may already be gone or never answer.
        let timeout = self.timeout;
        let quit = async {
            self.send("QUIT").await?;
            self.read_reply().await
        };
        match tokio::time::timeout(timeout, quit).await {
            Ok(Ok(reply)) => log::trace!("FTP < {} {}", reply.code, reply.message),
            Ok(Err(err)) => log::debug!("FTP QUIT failed: {err}"),
            Err(_) => log::debug!("FTP QUIT unanswered after {timeout:?}"),
        }
        self.writer.shutdown().await.ok();
        Ok(())
    }
}

/// Path arguments end up on the control channel verbatim.
fn check_path_argument(path: &str) -> Result<()> {
    if path.is_empty() || path.contains(['\r', '\n', '\0']) {
        return Err(AdapterError::InvalidInput(format!("invalid remote path {path:?}")));
    }
    Ok(())
}

fn expect(reply: Reply, accepted: &[u16]) -> Result<Reply> {
    if accepted.contains(&reply.code) {
        Ok(reply)
    } else {
        Err(unexpected_or_negative(reply))
    }
}

fn unexpected_or_negative(reply: Reply) -> AdapterError {
    if reply.is_negative() {
        reply.into_error()
    } else {
        AdapterError::UnexpectedReply(format!("{} {}", reply.code, reply.message))
    }
}
