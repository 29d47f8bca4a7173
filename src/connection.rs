//! Accepted connection state
//!
//! Splits a stream into framed read/write halves and creates the outbound
//! queue whose sending side is registered with the ChatServer.

use std::net::SocketAddr;

use tokio::io::{AsyncRead, AsyncWrite, ReadHalf, WriteHalf};
use tokio::sync::mpsc;
use tokio_util::codec::{FramedRead, FramedWrite};

use crate::client::Client;
use crate::codec::LineCodec;
use crate::types::Identity;

/// One accepted connection, owned by its processor
pub struct Connection<S> {
    pub identity: Identity,
    pub peer: Option<SocketAddr>,
    pub reader: FramedRead<ReadHalf<S>, LineCodec>,
    pub writer: FramedWrite<WriteHalf<S>, LineCodec>,
    /// Lines queued by the broadcaster for this connection
    pub outbound: mpsc::UnboundedReceiver<String>,
}

impl<S> Connection<S>
where
    S: AsyncRead + AsyncWrite,
{
    /// Wrap `stream`, returning the connection and its registry handle
    pub fn open(
        identity: Identity,
        peer: Option<SocketAddr>,
        stream: S,
        max_line_length: usize,
    ) -> (Self, Client) {
        let (read_half, write_half) = tokio::io::split(stream);
        let (tx, rx) = mpsc::unbounded_channel();

        let conn = Self {
            identity,
            peer,
            reader: FramedRead::new(read_half, LineCodec::with_max_length(max_line_length)),
            writer: FramedWrite::new(write_half, LineCodec::new()),
            outbound: rx,
        };

        (conn, Client::new(identity, peer, tx))
    }
}
