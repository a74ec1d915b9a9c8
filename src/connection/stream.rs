//! Buffered, framed transport (§4.1/§4.2): reads and writes whole
//! [`Packet`]s over an arbitrary byte stream, tracking the sequence id the
//! way the connection state machine expects.

use bytes::BytesMut;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpStream;

use crate::error::Error;
use crate::protocol::{check_sequence, encode_packet, try_parse_packet, Packet};

const DEFAULT_BUF_SIZE: usize = 8192;

/// Anything the stream can be built over. Implemented for any tokio duplex
/// byte stream, so a TLS-wrapped stream works as well as a raw TCP one.
pub trait Socket: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

impl<T> Socket for T where T: AsyncRead + AsyncWrite + Unpin + Send + 'static {}

pub struct MySqlStream {
    socket: Box<dyn Socket>,
    read_buf: BytesMut,
    write_buf: Vec<u8>,
    seq_id: u8,
}

impl MySqlStream {
    pub fn new(socket: impl Socket) -> MySqlStream {
        MySqlStream {
            socket: Box::new(socket),
            read_buf: BytesMut::with_capacity(DEFAULT_BUF_SIZE),
            write_buf: Vec::with_capacity(DEFAULT_BUF_SIZE),
            seq_id: 0,
        }
    }

    pub async fn connect_tcp(host: &str, port: u16) -> Result<MySqlStream, Error> {
        let host = host.trim_matches(&['[', ']'][..]);
        let stream = TcpStream::connect((host, port)).await?;
        stream.set_nodelay(true)?;
        Ok(MySqlStream::new(stream))
    }

    /// Resets the sequence counter to 0, as required at the start of every
    /// new client-initiated command (§3 invariants).
    pub fn begin_command(&mut self) {
        self.seq_id = 0;
    }

    /// Reads one logical packet, pulling more bytes from the socket as
    /// needed, and checks its sequence id against what this side expects
    /// next.
    pub async fn read_packet(&mut self) -> Result<Packet, Error> {
        loop {
            if let Some((packet, last_seq)) = try_parse_packet(&mut self.read_buf)? {
                check_sequence(&packet, self.seq_id)?;
                // A packet spanning continuation frames consumes one wire
                // sequence number per frame; resume counting past the last
                // frame actually seen, not just the packet's own (first
                // frame's) sequence id.
                self.seq_id = last_seq.wrapping_add(1);
                return Ok(packet);
            }

            let read = self.socket.read_buf(&mut self.read_buf).await?;
            if read == 0 {
                return Err(Error::Io(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "server closed the connection while a packet was expected",
                )));
            }
        }
    }

    /// Frames `payload` and queues it for the next [`flush`](Self::flush),
    /// splitting it into continuation frames if it is larger than a single
    /// frame can carry.
    pub fn write_packet(&mut self, payload: &[u8]) {
        encode_packet(payload, &mut self.seq_id, &mut self.write_buf);
    }

    pub async fn flush(&mut self) -> Result<(), Error> {
        if !self.write_buf.is_empty() {
            self.socket.write_all(&self.write_buf).await?;
            self.write_buf.clear();
        }
        self.socket.flush().await?;
        Ok(())
    }

    pub async fn shutdown(&mut self) -> Result<(), Error> {
        self.flush().await?;
        let _ = self.socket.shutdown().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{encode_packet, MAX_FRAME_PAYLOAD};

    /// A packet spanning continuation frames must leave `seq_id` resuming
    /// past the *last* physical frame, not the packet's own first-frame
    /// `sequence_id` — otherwise the very next `read_packet` call raises a
    /// spurious sequence mismatch and tears the connection down.
    #[tokio::test]
    async fn read_packet_resumes_past_every_continuation_frame() {
        let big_payload = vec![0xABu8; MAX_FRAME_PAYLOAD + 10];

        let mut seq = 0u8;
        let mut wire = Vec::new();
        encode_packet(&big_payload, &mut seq, &mut wire);
        assert_eq!(seq, 2, "one full frame plus one short closer");
        encode_packet(b"ok", &mut seq, &mut wire);

        let (client, mut server) = tokio::io::duplex(wire.len() + 1024);
        server.write_all(&wire).await.unwrap();
        server.flush().await.unwrap();
        drop(server);

        let mut stream = MySqlStream::new(client);

        let first = stream.read_packet().await.unwrap();
        assert_eq!(first.sequence_id, 0);
        assert_eq!(first.payload.len(), big_payload.len());

        let second = stream.read_packet().await.unwrap();
        assert_eq!(second.sequence_id, 2);
        assert_eq!(&second.payload[..], b"ok");
    }
}
