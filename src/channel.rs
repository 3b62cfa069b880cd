//! Ordered, reliable, point-to-point message channels.

use core::future::Future;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use crate::{Error, Result};

/// Default cap on a single TCP frame (16 MiB).
pub const DEFAULT_MAX_FRAME_LEN: usize = 16 * 1024 * 1024;

/// Transport used by protocol executions.
///
/// Send and receive are the only suspension points of a protocol run.
/// Implementations report I/O failures as [`Error::Transport`].
pub trait Channel: Send {
    fn send(&mut self, message: Vec<u8>) -> impl Future<Output = Result<()>> + Send;

    fn receive(&mut self) -> impl Future<Output = Result<Vec<u8>>> + Send;
}

/// One end of an in-process channel pair.
#[derive(Debug)]
pub struct LocalChannel {
    outgoing: UnboundedSender<Vec<u8>>,
    incoming: UnboundedReceiver<Vec<u8>>,
}

impl LocalChannel {
    /// Creates two connected ends.
    pub fn pair() -> (Self, Self) {
        let (a_tx, a_rx) = unbounded_channel();
        let (b_tx, b_rx) = unbounded_channel();
        (
            Self {
                outgoing: a_tx,
                incoming: b_rx,
            },
            Self {
                outgoing: b_tx,
                incoming: a_rx,
            },
        )
    }
}

impl Channel for LocalChannel {
    async fn send(&mut self, message: Vec<u8>) -> Result<()> {
        self.outgoing
            .send(message)
            .map_err(|_| Error::Transport("peer end of local channel is closed".to_string()))
    }

    async fn receive(&mut self) -> Result<Vec<u8>> {
        self.incoming
            .recv()
            .await
            .ok_or_else(|| Error::Transport("peer end of local channel is closed".to_string()))
    }
}

/// Length-prefixed frames over a TCP stream.
#[derive(Debug)]
pub struct TcpChannel {
    stream: TcpStream,
    max_frame_len: usize,
}

impl TcpChannel {
    /// Connects to `addr`.
    pub async fn connect(addr: impl ToSocketAddrs) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        Ok(Self::new(stream))
    }

    /// Wraps an established stream.
    pub fn new(stream: TcpStream) -> Self {
        Self {
            stream,
            max_frame_len: DEFAULT_MAX_FRAME_LEN,
        }
    }

    pub fn with_max_frame_len(mut self, max_frame_len: usize) -> Self {
        self.max_frame_len = max_frame_len;
        self
    }
}

impl Channel for TcpChannel {
    async fn send(&mut self, message: Vec<u8>) -> Result<()> {
        if message.len() > self.max_frame_len {
            return Err(Error::InvalidInput(format!(
                "frame of {} bytes exceeds limit of {}",
                message.len(),
                self.max_frame_len
            )));
        }
        self.stream.write_u32(message.len() as u32).await?;
        self.stream.write_all(&message).await?;
        self.stream.flush().await?;
        debug!(len = message.len(), "sent frame");
        Ok(())
    }

    async fn receive(&mut self) -> Result<Vec<u8>> {
        let len = self.stream.read_u32().await? as usize;
        if len > self.max_frame_len {
            return Err(Error::Deserialization(format!(
                "incoming frame of {len} bytes exceeds limit of {}",
                self.max_frame_len
            )));
        }
        let mut message = vec![0u8; len];
        self.stream.read_exact(&mut message).await?;
        debug!(len, "received frame");
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn local_pair_delivers_in_order() {
        let (mut a, mut b) = LocalChannel::pair();
        a.send(vec![1]).await.unwrap();
        a.send(vec![2, 2]).await.unwrap();
        assert_eq!(b.receive().await.unwrap(), vec![1]);
        assert_eq!(b.receive().await.unwrap(), vec![2, 2]);
        b.send(vec![3]).await.unwrap();
        assert_eq!(a.receive().await.unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn closed_peer_is_transport_error() {
        let (mut a, b) = LocalChannel::pair();
        drop(b);
        assert!(matches!(a.send(vec![1]).await, Err(Error::Transport(_))));
        assert!(matches!(a.receive().await, Err(Error::Transport(_))));
    }

    #[tokio::test]
    async fn tcp_frames_round_trip_and_enforce_limit() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let mut channel = TcpChannel::new(stream).with_max_frame_len(8);
            let first = channel.receive().await.unwrap();
            let second = channel.receive().await;
            (first, second)
        });

        let mut client = TcpChannel::connect(addr).await.unwrap();
        client.send(vec![7; 8]).await.unwrap();
        client.send(vec![7; 9]).await.unwrap();

        let (first, second) = server.await.unwrap();
        assert_eq!(first, vec![7; 8]);
        assert!(matches!(second, Err(Error::Deserialization(_))));
    }
}
