use regex::Regex;
use std::future::Future;
use std::net::SocketAddr;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{lookup_host, TcpStream};
use tracing::{debug, info, warn};

use crate::errors::{PublishError, PublishResult};
use crate::models::PublishTarget;
use crate::utils::human_format::{format_duration, format_size};

/// Outcome of a successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishReport {
    pub remote_file: String,
    /// Directory the file was stored in, `/` when no CWD happened
    pub remote_dir: String,
    pub bytes_sent: u64,
}

/// Lifecycle of one FTP session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Connected,
    Authenticated,
    Navigated,
    Uploading,
    Closed,
    Failed,
}

/// One parsed server reply, continuation lines joined with `\n`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub code: u16,
    pub message: String,
}

/// Uploads a finished playlist to an FTP server
#[derive(Debug, Clone)]
pub struct FtpPublisher {
    timeout: Duration,
}

impl FtpPublisher {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub async fn publish(&self, file: &Path, target: &PublishTarget) -> PublishResult<PublishReport> {
        let started = Instant::now();

        let data = tokio::fs::read(file)
            .await
            .map_err(|source| PublishError::LocalFile {
                path: file.to_path_buf(),
                source,
            })?;
        let remote_file = file
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| PublishError::protocol("Local file name is not valid UTF-8"))?
            .to_string();

        info!(
            "Uploading {} ({}) to ftp://{}:{}",
            remote_file,
            format_size(data.len() as u64),
            target.host,
            target.port
        );

        let mut session = FtpSession::open(target, self.timeout).await?;
        match session.upload(target, &remote_file, &data).await {
            Ok(report) => {
                info!(
                    "FTP upload completed: file={} dir={} bytes={} duration={}",
                    report.remote_file,
                    report.remote_dir,
                    report.bytes_sent,
                    format_duration(started.elapsed().as_millis() as u64)
                );
                Ok(report)
            }
            Err(e) => {
                session.transition(SessionState::Failed);
                Err(e)
            }
        }
    }
}

struct FtpSession {
    control: ControlChannel,
    state: SessionState,
}

impl FtpSession {
    async fn open(target: &PublishTarget, timeout: Duration) -> PublishResult<Self> {
        let addresses = resolve(&target.host, target.port, timeout).await?;
        let stream = connect_any(&addresses, timeout).await?;

        let mut session = Self {
            control: ControlChannel::new(stream, timeout)?,
            state: SessionState::Idle,
        };

        let greeting = session.control.read_reply("greeting").await?;
        expect(greeting, "connect", &[220])?;
        session.transition(SessionState::Connected);
        Ok(session)
    }

    fn transition(&mut self, next: SessionState) {
        debug!("FTP session {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    async fn upload(
        &mut self,
        target: &PublishTarget,
        remote_file: &str,
        data: &[u8],
    ) -> PublishResult<PublishReport> {
        self.login(&target.username, &target.secret).await?;

        let reply = self.control.command("TYPE I", "TYPE").await?;
        expect(reply, "TYPE I", &[200])?;

        let remote_dir = if target.needs_cwd() {
            self.change_directory(target.remote_path.trim()).await?
        } else {
            "/".to_string()
        };

        let bytes_sent = self.store(remote_file, data).await?;
        self.quit().await;

        Ok(PublishReport {
            remote_file: remote_file.to_string(),
            remote_dir,
            bytes_sent,
        })
    }

    async fn login(&mut self, username: &str, secret: &str) -> PublishResult<()> {
        let reply = self.control.command(&format!("USER {username}"), "USER").await?;
        let reply = match reply.code {
            230 => reply,
            331 | 332 => {
                let reply = self.control.command(&format!("PASS {secret}"), "PASS").await?;
                expect(reply, "PASS", &[230, 202])?
            }
            _ => return Err(PublishError::rejected("USER", reply.code, reply.message)),
        };

        debug!("Logged in: {} {}", reply.code, reply.message);
        self.transition(SessionState::Authenticated);
        Ok(())
    }

    /// Best-effort CWD; returns the directory the upload will land in
    ///
    /// A refusal falls back to the login directory. A timeout or I/O error
    /// leaves the control channel unusable and fails the session.
    async fn change_directory(&mut self, remote_path: &str) -> PublishResult<String> {
        let reply = self.control.command(&format!("CWD {remote_path}"), "CWD").await?;
        if (200..300).contains(&reply.code) {
            self.transition(SessionState::Navigated);
            return Ok(remote_path.to_string());
        }

        warn!(
            "Could not change to remote directory {}: {} {}, uploading to the login directory",
            remote_path, reply.code, reply.message
        );
        Ok("/".to_string())
    }

    async fn store(&mut self, remote_file: &str, data: &[u8]) -> PublishResult<u64> {
        let reply = self.control.command("PASV", "PASV").await?;
        let reply = expect(reply, "PASV", &[227])?;
        let port = parse_pasv_port(&reply.message)?;
        let data_address = SocketAddr::new(self.control.peer.ip(), port);
        debug!("Opening data connection to {}", data_address);

        let timeout = self.control.timeout;
        let mut data_stream = with_timeout(timeout, "data connect", async {
            TcpStream::connect(data_address)
                .await
                .map_err(|e| PublishError::Connect {
                    address: data_address.to_string(),
                    message: e.to_string(),
                })
        })
        .await?;

        let reply = self
            .control
            .command(&format!("STOR {remote_file}"), "STOR")
            .await?;
        expect(reply, "STOR", &[125, 150])?;
        self.transition(SessionState::Uploading);

        with_timeout(timeout, "data transfer", async {
            data_stream.write_all(data).await?;
            data_stream.shutdown().await?;
            Ok::<(), PublishError>(())
        })
        .await?;
        drop(data_stream);

        let reply = self.control.read_reply("transfer completion").await?;
        expect(reply, "STOR", &[226, 250])?;
        Ok(data.len() as u64)
    }

    async fn quit(&mut self) {
        match self.control.command("QUIT", "QUIT").await {
            Ok(reply) if reply.code == 221 => {}
            Ok(reply) => warn!("Unexpected QUIT reply: {} {}", reply.code, reply.message),
            Err(e) => warn!("QUIT failed after upload: {}", e),
        }
        self.transition(SessionState::Closed);
    }
}

struct ControlChannel {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
    peer: SocketAddr,
    timeout: Duration,
}

impl ControlChannel {
    fn new(stream: TcpStream, timeout: Duration) -> PublishResult<Self> {
        let peer = stream.peer_addr()?;
        let (reader, writer) = stream.into_split();
        Ok(Self {
            reader: BufReader::new(reader),
            writer,
            peer,
            timeout,
        })
    }

    async fn command(&mut self, command: &str, stage: &'static str) -> PublishResult<Reply> {
        debug!("FTP > {}", mask_command(command));
        let line = format!("{command}\r\n");
        let writer = &mut self.writer;
        with_timeout(self.timeout, stage, async {
            writer.write_all(line.as_bytes()).await?;
            Ok::<(), PublishError>(())
        })
        .await?;
        self.read_reply(stage).await
    }

    async fn read_reply(&mut self, stage: &'static str) -> PublishResult<Reply> {
        let reply = with_timeout(self.timeout, stage, read_reply(&mut self.reader)).await?;
        debug!("FTP < {} {}", reply.code, reply.message);
        Ok(reply)
    }
}

async fn with_timeout<T, F>(limit: Duration, stage: &'static str, future: F) -> PublishResult<T>
where
    F: Future<Output = PublishResult<T>>,
{
    tokio::time::timeout(limit, future)
        .await
        .map_err(|_| PublishError::Timeout { stage })?
}

fn expect(reply: Reply, command: &str, accepted: &[u16]) -> PublishResult<Reply> {
    if accepted.contains(&reply.code) {
        Ok(reply)
    } else {
        Err(PublishError::rejected(command, reply.code, reply.message))
    }
}

fn mask_command(command: &str) -> String {
    match command.strip_prefix("PASS ") {
        Some(secret) => format!("PASS {}", "*".repeat(secret.chars().count())),
        None => command.to_string(),
    }
}

/// Strip an `ftp://` or `ftps://` prefix and any trailing slash
pub fn strip_scheme(host: &str) -> &str {
    let lower = host.to_ascii_lowercase();
    let rest = ["ftp://", "ftps://"]
        .iter()
        .find(|prefix| lower.starts_with(*prefix))
        .map_or(host, |prefix| &host[prefix.len()..]);
    rest.trim_end_matches('/')
}

async fn lookup(host: &str, port: u16, timeout: Duration) -> PublishResult<Vec<SocketAddr>> {
    let addresses = with_timeout(timeout, "resolve", async {
        lookup_host((host, port))
            .await
            .map(|addresses| addresses.collect::<Vec<_>>())
            .map_err(|e| PublishError::Resolve {
                host: host.to_string(),
                message: e.to_string(),
            })
    })
    .await?;

    if addresses.is_empty() {
        return Err(PublishError::Resolve {
            host: host.to_string(),
            message: "no addresses found".to_string(),
        });
    }
    Ok(addresses)
}

async fn resolve(host: &str, port: u16, timeout: Duration) -> PublishResult<Vec<SocketAddr>> {
    match lookup(host, port, timeout).await {
        Ok(addresses) => Ok(addresses),
        Err(e) => {
            let stripped = strip_scheme(host);
            if stripped == host || stripped.is_empty() {
                return Err(e);
            }
            warn!("Could not resolve '{}' ({}), retrying as '{}'", host, e, stripped);
            lookup(stripped, port, timeout).await
        }
    }
}

async fn connect_any(addresses: &[SocketAddr], timeout: Duration) -> PublishResult<TcpStream> {
    let mut last_error = None;

    for address in addresses {
        debug!("Connecting to {}", address);
        match tokio::time::timeout(timeout, TcpStream::connect(address)).await {
            Ok(Ok(stream)) => return Ok(stream),
            Ok(Err(e)) => {
                last_error = Some(PublishError::Connect {
                    address: address.to_string(),
                    message: e.to_string(),
                })
            }
            Err(_) => last_error = Some(PublishError::Timeout { stage: "connect" }),
        }
    }

    Err(last_error.unwrap_or_else(|| PublishError::protocol("No address to connect to")))
}

/// Split a reply line into code, continuation flag, and text
pub fn parse_reply_line(line: &str) -> PublishResult<(u16, bool, &str)> {
    let code = line
        .get(..3)
        .filter(|digits| digits.bytes().all(|b| b.is_ascii_digit()))
        .and_then(|digits| digits.parse::<u16>().ok())
        .ok_or_else(|| PublishError::protocol(format!("Malformed reply: '{line}'")))?;

    let text = line.get(4..).unwrap_or("");
    match line.as_bytes().get(3) {
        None | Some(b' ') => Ok((code, false, text)),
        Some(b'-') => Ok((code, true, text)),
        Some(_) => Err(PublishError::protocol(format!("Malformed reply: '{line}'"))),
    }
}

async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> PublishResult<String> {
    let mut line = String::new();
    if reader.read_line(&mut line).await? == 0 {
        return Err(PublishError::protocol("Connection closed by server"));
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// Read one complete reply, following `123-` continuations up to `123 `
pub async fn read_reply<R: AsyncBufRead + Unpin>(reader: &mut R) -> PublishResult<Reply> {
    let first = read_line(reader).await?;
    let (code, mut continues, text) = parse_reply_line(&first)?;
    let mut lines = vec![text.to_string()];

    while continues {
        let line = read_line(reader).await?;
        match parse_reply_line(&line) {
            Ok((next_code, false, text)) if next_code == code => {
                lines.push(text.to_string());
                continues = false;
            }
            _ => lines.push(line.trim().to_string()),
        }
    }

    Ok(Reply {
        code,
        message: lines.join("\n"),
    })
}

/// Port announced in a `227 Entering Passive Mode (h1,h2,h3,h4,p1,p2)` reply
pub fn parse_pasv_port(message: &str) -> PublishResult<u16> {
    let pattern = Regex::new(r"(\d{1,3}),(\d{1,3}),(\d{1,3}),(\d{1,3}),(\d{1,3}),(\d{1,3})")
        .map_err(|e| PublishError::protocol(e.to_string()))?;
    let captures = pattern
        .captures(message)
        .ok_or_else(|| PublishError::protocol(format!("Unparseable PASV reply: '{message}'")))?;

    let octet = |group: usize| -> PublishResult<u16> {
        captures[group]
            .parse::<u8>()
            .map(u16::from)
            .map_err(|_| PublishError::protocol(format!("Invalid PASV reply: '{message}'")))
    };

    let port = octet(5)? * 256 + octet(6)?;
    if port == 0 {
        return Err(PublishError::protocol("PASV announced port 0"));
    }
    Ok(port)
}
