use std::io;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use cvguard_core::constants::CLAMAV_CHUNK_SIZE;
use cvguard_core::{AvScanConfig, AvScanResult};
use cvguard_processing::VirusScanner;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

const INSTREAM_COMMAND: &[u8] = b"zINSTREAM\0";
const PING_COMMAND: &[u8] = b"zPING\0";

/// Transport failures inside a single daemon exchange.
#[derive(Debug, thiserror::Error)]
enum ClamAvError {
    #[error("connection to scanner failed")]
    Connect(#[source] io::Error),
    #[error("failed to send data to scanner: {0}")]
    Write(#[source] io::Error),
    #[error("failed to read scanner response: {0}")]
    Read(#[source] io::Error),
}

/// Client for a clamd daemon reachable over TCP.
///
/// Every call opens its own connection, bounded by the configured timeout, and
/// every outcome (including transport failure) comes back as an
/// [`AvScanResult`].
#[derive(Clone, Debug)]
pub struct ClamAvClient {
    config: AvScanConfig,
}

impl ClamAvClient {
    pub fn new(config: AvScanConfig) -> Self {
        Self { config }
    }

    pub fn from_env() -> Self {
        Self::new(AvScanConfig::from_env())
    }

    pub fn config(&self) -> &AvScanConfig {
        &self.config
    }

    /// Scan an in-memory buffer with the INSTREAM command.
    pub async fn scan_bytes(&self, data: &[u8]) -> AvScanResult {
        if !self.config.enabled {
            tracing::debug!("ClamAV scanning disabled, skipping");
            return AvScanResult::clean();
        }

        let start = Instant::now();
        let address = self.config.address();
        tracing::debug!(address = %address, size = data.len(), "Starting ClamAV scan");

        // Dropping the exchange future on timeout also drops its socket.
        let outcome = tokio::time::timeout(self.config.timeout(), self.instream(&address, data)).await;

        match outcome {
            Ok(Ok(reply)) => {
                let result = parse_response(&reply);
                let duration_ms = start.elapsed().as_millis() as u64;
                if result.clean {
                    tracing::info!(duration_ms, "File scan completed: clean");
                } else if result.is_unavailable() {
                    tracing::error!(duration_ms, response = %reply, "ClamAV returned an error");
                } else {
                    tracing::warn!(
                        duration_ms,
                        virus = extract_virus_name(&reply).unwrap_or("unknown"),
                        response = %reply,
                        "File scan detected virus"
                    );
                }
                result
            }
            Ok(Err(e)) => {
                tracing::error!(address = %address, error = ?e, "ClamAV scan failed");
                AvScanResult::unavailable(e.to_string())
            }
            Err(_) => {
                tracing::error!(
                    timeout_ms = self.config.timeout_ms,
                    "ClamAV scan timeout"
                );
                AvScanResult::unavailable("timeout")
            }
        }
    }

    /// Check that the daemon answers `PONG`.
    pub async fn ping(&self) -> bool {
        let address = self.config.address();
        let outcome = tokio::time::timeout(
            self.config.timeout(),
            self.exchange(&address, PING_COMMAND),
        )
        .await;

        match outcome {
            Ok(Ok(reply)) if reply == "PONG" => true,
            Ok(Ok(reply)) => {
                tracing::warn!(response = %reply, "Unexpected ClamAV ping response");
                false
            }
            Ok(Err(e)) => {
                tracing::warn!(address = %address, error = ?e, "ClamAV ping failed");
                false
            }
            Err(_) => {
                tracing::warn!(timeout_ms = self.config.timeout_ms, "ClamAV ping timeout");
                false
            }
        }
    }

    async fn instream(&self, address: &str, data: &[u8]) -> Result<String, ClamAvError> {
        let mut stream = connect(address).await?;

        stream
            .write_all(INSTREAM_COMMAND)
            .await
            .map_err(ClamAvError::Write)?;

        for chunk in data.chunks(CLAMAV_CHUNK_SIZE) {
            let len = (chunk.len() as u32).to_be_bytes();
            stream.write_all(&len).await.map_err(ClamAvError::Write)?;
            stream.write_all(chunk).await.map_err(ClamAvError::Write)?;
        }

        // Zero-length chunk ends the stream
        stream
            .write_all(&0u32.to_be_bytes())
            .await
            .map_err(ClamAvError::Write)?;
        stream.flush().await.map_err(ClamAvError::Write)?;

        read_reply(&mut stream).await
    }

    async fn exchange(&self, address: &str, command: &[u8]) -> Result<String, ClamAvError> {
        let mut stream = connect(address).await?;
        stream.write_all(command).await.map_err(ClamAvError::Write)?;
        stream.flush().await.map_err(ClamAvError::Write)?;
        read_reply(&mut stream).await
    }
}

async fn connect(address: &str) -> Result<TcpStream, ClamAvError> {
    TcpStream::connect(address)
        .await
        .map_err(ClamAvError::Connect)
}

/// Read until the daemon closes the connection.
async fn read_reply(stream: &mut TcpStream) -> Result<String, ClamAvError> {
    let mut buf = Vec::new();
    stream
        .read_to_end(&mut buf)
        .await
        .map_err(ClamAvError::Read)?;
    Ok(String::from_utf8_lossy(&buf)
        .trim_matches(|c: char| c == '\0' || c.is_whitespace())
        .to_string())
}

/// Classify a daemon reply.
///
/// `FOUND` is checked before `OK` so an infected reply can never read as clean.
pub fn parse_response(reply: &str) -> AvScanResult {
    let reply = reply.trim_matches(|c: char| c == '\0' || c.is_whitespace());

    if reply.contains(" FOUND") {
        AvScanResult::infected(reply)
    } else if reply.contains(" OK") {
        AvScanResult::clean()
    } else if reply.contains("ERROR") {
        AvScanResult::unavailable(reply)
    } else if reply.is_empty() {
        AvScanResult::unavailable("empty response from scanner")
    } else {
        AvScanResult::unavailable(format!("unexpected response: {}", reply))
    }
}

/// Signature name from a `stream: <name> FOUND` reply.
pub fn extract_virus_name(reply: &str) -> Option<&str> {
    let (_, rest) = reply.trim().split_once(':')?;
    let name = rest.trim().strip_suffix("FOUND")?.trim();
    (!name.is_empty()).then_some(name)
}

/// [`VirusScanner`] backed by a [`ClamAvClient`].
#[derive(Clone, Debug)]
pub struct ClamAvVirusScanner {
    client: Arc<ClamAvClient>,
}

impl ClamAvVirusScanner {
    pub fn new(client: ClamAvClient) -> Self {
        Self {
            client: Arc::new(client),
        }
    }
}

#[async_trait]
impl VirusScanner for ClamAvVirusScanner {
    async fn scan(&self, data: &[u8]) -> AvScanResult {
        self.client.scan_bytes(data).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvguard_core::constants::CLAMAV_MIN_TIMEOUT_MS;
    use std::time::Duration;
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    fn config(port: u16) -> AvScanConfig {
        AvScanConfig {
            enabled: true,
            fail_closed: true,
            host: "127.0.0.1".to_string(),
            port,
            timeout_ms: 2_000,
        }
    }

    /// Frames received by the fake daemon: payload and individual chunk sizes.
    type Received = (Vec<u8>, Vec<usize>);

    async fn read_instream(stream: &mut TcpStream) -> Received {
        let mut command = [0u8; 10];
        stream.read_exact(&mut command).await.unwrap();
        assert_eq!(&command, INSTREAM_COMMAND);

        let mut data = Vec::new();
        let mut sizes = Vec::new();
        loop {
            let mut len = [0u8; 4];
            stream.read_exact(&mut len).await.unwrap();
            let len = u32::from_be_bytes(len) as usize;
            if len == 0 {
                break;
            }
            let mut chunk = vec![0u8; len];
            stream.read_exact(&mut chunk).await.unwrap();
            sizes.push(len);
            data.extend_from_slice(&chunk);
        }
        (data, sizes)
    }

    /// One-shot fake clamd that answers INSTREAM with `reply`.
    async fn fake_daemon(reply: &'static [u8]) -> (u16, JoinHandle<Received>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let received = read_instream(&mut stream).await;
            stream.write_all(reply).await.unwrap();
            received
        });
        (port, handle)
    }

    async fn closed_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }

    #[test]
    fn parse_known_replies() {
        assert_eq!(parse_response("stream: OK"), AvScanResult::clean());
        assert_eq!(parse_response("stream: OK\0"), AvScanResult::clean());

        let infected = parse_response("stream: Eicar-Test-Signature FOUND");
        assert!(!infected.clean);
        assert!(!infected.is_unavailable());
        assert!(infected.reason.unwrap().contains("FOUND"));

        let error = parse_response("INSTREAM size limit exceeded. ERROR");
        assert!(error.is_unavailable());
        assert_eq!(error.reason.as_deref(), Some("INSTREAM size limit exceeded. ERROR"));
    }

    #[test]
    fn parse_unrecognized_is_unavailable() {
        for reply in ["", "\0", "UNKNOWN COMMAND", "OK"] {
            let result = parse_response(reply);
            assert!(!result.clean, "{:?}", reply);
            assert!(result.is_unavailable(), "{:?}", reply);
        }
    }

    #[test]
    fn virus_name_extraction() {
        assert_eq!(
            extract_virus_name("stream: Win.Test.EICAR_HDB-1 FOUND"),
            Some("Win.Test.EICAR_HDB-1")
        );
        assert_eq!(extract_virus_name("stream: OK"), None);
        assert_eq!(extract_virus_name("stream: FOUND"), None);
    }

    #[tokio::test]
    async fn clean_reply() {
        let (port, daemon) = fake_daemon(b"stream: OK\0").await;
        let client = ClamAvClient::new(config(port));

        let result = client.scan_bytes(b"%PDF-1.4 harmless").await;
        assert_eq!(result, AvScanResult::clean());

        let (data, _) = daemon.await.unwrap();
        assert_eq!(data, b"%PDF-1.4 harmless");
    }

    #[tokio::test]
    async fn found_reply() {
        let (port, daemon) = fake_daemon(b"stream: Eicar-Test-Signature FOUND\0").await;
        let client = ClamAvClient::new(config(port));

        let result = client.scan_bytes(b"payload").await;
        assert!(!result.clean);
        assert!(!result.is_unavailable());
        assert!(result.reason.unwrap().contains("FOUND"));
        daemon.await.unwrap();
    }

    #[tokio::test]
    async fn error_reply_is_unavailable() {
        let (port, daemon) = fake_daemon(b"INSTREAM size limit exceeded. ERROR\0").await;
        let result = ClamAvClient::new(config(port)).scan_bytes(b"payload").await;
        assert!(result.is_unavailable());
        assert!(result.reason.unwrap().contains("ERROR"));
        daemon.await.unwrap();
    }

    #[tokio::test]
    async fn large_payload_is_chunked() {
        let (port, daemon) = fake_daemon(b"stream: OK\0").await;
        let payload: Vec<u8> = (0..(CLAMAV_CHUNK_SIZE * 2 + 100))
            .map(|i| (i % 251) as u8)
            .collect();

        let result = ClamAvClient::new(config(port)).scan_bytes(&payload).await;
        assert!(result.clean);

        let (data, sizes) = daemon.await.unwrap();
        assert_eq!(sizes, vec![CLAMAV_CHUNK_SIZE, CLAMAV_CHUNK_SIZE, 100]);
        assert_eq!(data, payload);
    }

    #[tokio::test]
    async fn silent_daemon_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let daemon = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            read_instream(&mut stream).await;
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let mut cfg = config(port);
        cfg.timeout_ms = CLAMAV_MIN_TIMEOUT_MS;
        let start = Instant::now();
        let result = ClamAvClient::new(cfg).scan_bytes(b"payload").await;

        assert!(start.elapsed() < Duration::from_secs(5));
        assert!(!result.clean);
        assert!(result.is_unavailable());
        assert_eq!(result.reason.as_deref(), Some("timeout"));
        daemon.abort();
    }

    #[tokio::test]
    async fn refused_connection_is_unavailable() {
        let port = closed_port().await;
        let result = ClamAvClient::new(config(port)).scan_bytes(b"payload").await;
        assert!(!result.clean);
        assert!(result.is_unavailable());

        let reason = result.reason.unwrap();
        assert_eq!(reason, "connection to scanner failed");
        assert!(!reason.contains("127.0.0.1"), "{}", reason);
        assert!(!reason.contains(&port.to_string()), "{}", reason);
    }

    #[tokio::test]
    async fn disabled_never_connects() {
        let port = closed_port().await;
        let mut cfg = config(port);
        cfg.enabled = false;
        let result = ClamAvClient::new(cfg).scan_bytes(b"payload").await;
        assert_eq!(result, AvScanResult::clean());
    }

    #[tokio::test]
    async fn ping_pong() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let daemon = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut command = [0u8; 6];
            stream.read_exact(&mut command).await.unwrap();
            assert_eq!(&command, PING_COMMAND);
            stream.write_all(b"PONG\0").await.unwrap();
        });

        assert!(ClamAvClient::new(config(port)).ping().await);
        daemon.await.unwrap();

        let port = closed_port().await;
        assert!(!ClamAvClient::new(config(port)).ping().await);
    }

    #[tokio::test]
    async fn adapter_delegates_to_client() {
        let (port, daemon) = fake_daemon(b"stream: OK\0").await;
        let scanner = ClamAvVirusScanner::new(ClamAvClient::new(config(port)));
        assert!(scanner.scan(b"payload").await.clean);
        daemon.await.unwrap();
    }
}
