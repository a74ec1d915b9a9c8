//! The packet framer (§4.2): turns the raw byte stream into `Packet`s and
//! back, handling the 3-byte length + 1-byte sequence-id header and
//! `0xFFFFFF`-length continuation frames.

use bytes::{Buf, Bytes, BytesMut};

use crate::error::Error;

/// The largest payload that fits in a single frame. A logical packet larger
/// than this is split into consecutive frames of this size, the last one
/// short (or, pathologically, exactly zero bytes) to close the sequence.
pub const MAX_FRAME_PAYLOAD: usize = 0xFF_FFFF;

const HEADER_LEN: usize = 4;

/// A fully reassembled protocol packet: a logical unit handed to the message
/// layer. The 24-bit length prefix is framing-only and does not appear here.
#[derive(Debug, Clone)]
pub struct Packet {
    pub sequence_id: u8,
    pub payload: Bytes,
}

impl Packet {
    pub fn first_byte(&self) -> Option<u8> {
        self.payload.first().copied()
    }
}

/// Attempts to read one logical packet (merging continuation frames) from
/// the front of `buf`. Returns `Ok(None)` without consuming anything if the
/// buffer does not yet contain a complete packet; the caller should read
/// more bytes from the transport and retry.
///
/// On success, also returns the sequence id of the *last* physical frame
/// consumed (equal to the packet's own `sequence_id` when it was a single
/// frame). A caller tracking the next expected wire sequence number must
/// advance past this, not past the packet's own `sequence_id`, since a
/// packet spanning N continuation frames consumes N wire sequence numbers.
pub fn try_parse(buf: &mut BytesMut) -> Result<Option<(Packet, u8)>, Error> {
    let mut cursor = 0usize;
    let mut sequence_id = None;
    let mut last_seq = 0u8;
    let mut payload = Vec::new();

    loop {
        if buf.len() < cursor + HEADER_LEN {
            return Ok(None);
        }

        let header = &buf[cursor..cursor + HEADER_LEN];
        let len = u32::from(header[0]) | (u32::from(header[1]) << 8) | (u32::from(header[2]) << 16);
        let seq = header[3];

        if sequence_id.is_none() {
            sequence_id = Some(seq);
        }
        last_seq = seq;

        let len = len as usize;

        if buf.len() < cursor + HEADER_LEN + len {
            return Ok(None);
        }

        payload.extend_from_slice(&buf[cursor + HEADER_LEN..cursor + HEADER_LEN + len]);
        cursor += HEADER_LEN + len;

        if len < MAX_FRAME_PAYLOAD {
            break;
        }
        // len == MAX_FRAME_PAYLOAD: a continuation frame follows immediately.
    }

    let packet = Packet {
        sequence_id: sequence_id.expect("loop always sets sequence_id before breaking"),
        payload: Bytes::from(payload),
    };

    buf.advance(cursor);
    Ok(Some((packet, last_seq)))
}

/// Encodes `payload` as one or more frames with sequence ids starting at
/// `*seq_id`, splitting at [`MAX_FRAME_PAYLOAD`] boundaries. `*seq_id` is left
/// one past the last frame written, ready for the next outbound packet in
/// the same exchange.
pub fn encode(payload: &[u8], seq_id: &mut u8, out: &mut Vec<u8>) {
    let mut remaining = payload;

    loop {
        let chunk_len = remaining.len().min(MAX_FRAME_PAYLOAD);
        let (chunk, rest) = remaining.split_at(chunk_len);

        out.push((chunk_len & 0xFF) as u8);
        out.push(((chunk_len >> 8) & 0xFF) as u8);
        out.push(((chunk_len >> 16) & 0xFF) as u8);
        out.push(*seq_id);
        out.extend_from_slice(chunk);

        *seq_id = seq_id.wrapping_add(1);
        remaining = rest;

        if chunk_len < MAX_FRAME_PAYLOAD {
            break;
        }
    }
}

/// Validates that `packet.sequence_id` matches `expected`, per the
/// sequence-id discipline in §4.4: mismatch is a fatal framing fault.
pub fn check_sequence(packet: &Packet, expected: u8) -> Result<(), Error> {
    if packet.sequence_id != expected {
        return Err(Error::InvalidPacket(format!(
            "sequence id mismatch: expected {}, got {}",
            expected, packet.sequence_id
        )));
    }
    Ok(())
}
