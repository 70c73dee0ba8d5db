//! Framed ServerQuery transport over TCP.
//!
//! # Usage
//!
//! ```ignore
//! use ts_query_proto::{Command, Transport};
//!
//! let mut transport = Transport::connect("127.0.0.1:10011").await?;
//! transport.write_command(&Command::whoami()).await?;
//! while let Some(reply) = transport.read_reply().await? {
//!     // ...
//! }
//! ```
//!
//! Use [`Transport::split`] to hand the reply stream to a reader task while
//! commands are written from elsewhere.

use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpStream, ToSocketAddrs};
use tokio_util::codec::Framed;
use tracing::{debug, warn};

use crate::codec::QueryCodec;
use crate::command::Command;
use crate::error::{ProtocolError, Result};
use crate::reply::Reply;

/// Read half of a split transport.
pub type ReplyStream = SplitStream<Framed<TcpStream, QueryCodec>>;

/// Write half of a split transport.
pub type CommandSink = SplitSink<Framed<TcpStream, QueryCodec>, Command>;

/// ServerQuery transport over a TCP stream.
pub struct Transport {
    framed: Framed<TcpStream, QueryCodec>,
}

impl Transport {
    /// Connect to a ServerQuery endpoint and consume its greeting.
    pub async fn connect<A: ToSocketAddrs>(addr: A) -> Result<Self> {
        let stream = TcpStream::connect(addr).await?;
        let mut transport = Self::tcp(stream);
        transport.read_greeting().await?;
        Ok(transport)
    }

    /// Wrap an already connected stream. The greeting is not consumed.
    pub fn tcp(stream: TcpStream) -> Self {
        if let Err(e) = Self::enable_keepalive(&stream) {
            warn!("failed to enable TCP keepalive: {}", e);
        }

        Self {
            framed: Framed::new(stream, QueryCodec::new()),
        }
    }

    fn enable_keepalive(stream: &TcpStream) -> std::io::Result<()> {
        use socket2::{SockRef, TcpKeepalive};
        use std::time::Duration;

        let sock = SockRef::from(stream);
        let keepalive = TcpKeepalive::new()
            .with_time(Duration::from_secs(120))
            .with_interval(Duration::from_secs(30));

        sock.set_tcp_keepalive(&keepalive)
    }

    /// Read the two-line greeting (`TS3` followed by a welcome banner).
    pub async fn read_greeting(&mut self) -> Result<()> {
        match self.read_reply().await? {
            Some(Reply::Data(records)) if records.first().is_some_and(|r| r.contains("TS3")) => {}
            Some(other) => return Err(ProtocolError::UnexpectedGreeting(format!("{:?}", other))),
            None => return Err(closed_during_greeting()),
        }

        match self.read_reply().await? {
            Some(Reply::Data(_)) => {
                debug!("ServerQuery greeting received");
                Ok(())
            }
            Some(other) => Err(ProtocolError::UnexpectedGreeting(format!("{:?}", other))),
            None => Err(closed_during_greeting()),
        }
    }

    /// Read the next reply. Returns `Ok(None)` when the connection is closed.
    pub async fn read_reply(&mut self) -> Result<Option<Reply>> {
        self.framed.next().await.transpose()
    }

    /// Write a command.
    pub async fn write_command(&mut self, command: &Command) -> Result<()> {
        self.framed.send(command.clone()).await
    }

    /// Split into a reply stream and a command sink, keeping buffered bytes.
    pub fn split(self) -> (CommandSink, ReplyStream) {
        self.framed.split()
    }
}

fn closed_during_greeting() -> ProtocolError {
    ProtocolError::Io(std::io::Error::new(
        std::io::ErrorKind::UnexpectedEof,
        "connection closed during greeting",
    ))
}
