//! `EOF_Packet` (§4.3). Only sent when `DEPRECATE_EOF` was not negotiated.
//!
//! <https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_basic_eof_packet.html>
//! <https://mariadb.com/kb/en/eof_packet/>

use crate::error::{protocol_err, Error};
use crate::io::MySqlBufExt;
use crate::protocol::Status;

pub const EOF_HEADER: u8 = 0xFE;

#[derive(Debug)]
pub struct EofPacket {
    pub warnings: u16,
    pub status: Status,
}

impl EofPacket {
    pub fn read(mut buf: &[u8]) -> Result<Self, Error> {
        let header = buf.get_u8()?;
        if header != EOF_HEADER {
            return Err(protocol_err!("expected EOF (0xFE); received 0x{:X}", header));
        }

        let warnings = buf.get_u16_le()?;
        let status = buf.get_u16_le()?;

        Ok(Self {
            warnings,
            status: Status::from_bits_truncate(status),
        })
    }

    /// A packet whose length is short enough, and whose first byte is
    /// `0xFE`, to be ambiguous between an EOF and a lenenc-encoded column
    /// count/value in the text protocol. The wire format disambiguates by
    /// length only: a genuine EOF packet is always <= 9 bytes.
    pub fn looks_like_eof(first_byte: u8, packet_len: usize) -> bool {
        first_byte == EOF_HEADER && packet_len < 9
    }
}
