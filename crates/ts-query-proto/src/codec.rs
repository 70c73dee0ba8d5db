//! ServerQuery codec for tokio.
//!
//! Decodes lines into [`Reply`] values and encodes [`Command`] values.

use bytes::BytesMut;
use tokio_util::codec::{Decoder, Encoder};
use tracing::warn;

use crate::command::Command;
use crate::error;
use crate::line::LineCodec;
use crate::reply::Reply;

/// Tokio codec for ServerQuery replies and commands.
///
/// Wraps [`LineCodec`]. Blank lines are skipped, and so are lines that do
/// not parse as a reply; only I/O and framing errors end the stream.
#[derive(Default)]
pub struct QueryCodec {
    inner: LineCodec,
}

impl QueryCodec {
    /// Create a codec with the default line limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a codec with a custom max line length.
    pub fn with_max_len(max_len: usize) -> Self {
        Self {
            inner: LineCodec::with_max_len(max_len),
        }
    }
}

impl Decoder for QueryCodec {
    type Item = Reply;
    type Error = error::ProtocolError;

    fn decode(&mut self, src: &mut BytesMut) -> error::Result<Option<Reply>> {
        loop {
            match self.inner.decode(src)? {
                Some(line) if line.is_empty() => continue,
                Some(line) => match line.parse::<Reply>() {
                    Ok(reply) => return Ok(Some(reply)),
                    Err(e @ error::ProtocolError::InvalidReply { .. }) => {
                        warn!(error = %e, "Skipping unparseable ServerQuery line");
                        continue;
                    }
                    Err(e) => return Err(e),
                },
                None => return Ok(None),
            }
        }
    }
}

impl Encoder<Command> for QueryCodec {
    type Error = error::ProtocolError;

    fn encode(&mut self, cmd: Command, dst: &mut BytesMut) -> error::Result<()> {
        self.inner.encode(cmd.to_string(), dst)
    }
}
