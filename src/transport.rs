//! Byte-stream transport abstraction and the default TCP implementation.
//!
//! The core consumes only this trait: send bytes, receive the next chunk (or
//! end-of-stream), close. No message framing is assumed - the client splits
//! CR-LF lines itself, so a line arriving across two chunks still parses.

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::warn;

/// Capacity hint for a single receive chunk.
const RECV_CHUNK: usize = 4096;

/// A bidirectional byte stream to an IRC server.
#[async_trait]
pub trait Transport: Send {
    /// Send raw bytes.
    async fn send(&mut self, bytes: &[u8]) -> std::io::Result<()>;

    /// Receive the next chunk of bytes. `Ok(None)` means the peer closed
    /// cleanly. Chunk boundaries are arbitrary.
    async fn recv(&mut self) -> std::io::Result<Option<Bytes>>;

    /// Close both directions of the stream.
    async fn close(&mut self) -> std::io::Result<()>;
}

/// Plain TCP transport.
pub struct TcpTransport {
    stream: TcpStream,
}

impl TcpTransport {
    /// Connect to `host:port`.
    pub async fn connect(host: &str, port: u16) -> std::io::Result<Self> {
        let stream = TcpStream::connect((host, port)).await?;
        if let Err(e) = Self::enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }
        Ok(Self { stream })
    }

    fn enable_keepalive(stream: &TcpStream) -> anyhow::Result<()> {
        use socket2::{SockRef, TcpKeepalive};
        use std::time::Duration;

        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));

        sock.set_tcp_keepalive(&keepalive)?;
        Ok(())
    }
}

#[async_trait]
impl Transport for TcpTransport {
    async fn send(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        self.stream.write_all(bytes).await
    }

    async fn recv(&mut self) -> std::io::Result<Option<Bytes>> {
        let mut buf = BytesMut::with_capacity(RECV_CHUNK);
        let n = self.stream.read_buf(&mut buf).await?;
        if n == 0 {
            Ok(None)
        } else {
            Ok(Some(buf.freeze()))
        }
    }

    async fn close(&mut self) -> std::io::Result<()> {
        // Shuts down the write half; the read half closes when the
        // transport is dropped.
        self.stream.shutdown().await
    }
}
