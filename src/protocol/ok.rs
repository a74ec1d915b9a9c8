//! `OK_Packet` (§4.3).
//!
//! <https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_basic_ok_packet.html>
//! <https://mariadb.com/kb/en/ok_packet/>

use crate::error::{protocol_err, Error};
use crate::io::MySqlBufExt;
use crate::protocol::Status;

#[derive(Debug)]
pub struct OkPacket {
    pub affected_rows: u64,
    pub last_insert_id: u64,
    pub status: Status,
    pub warnings: u16,
    pub info: String,
}

pub const OK_HEADER: u8 = 0x00;

impl OkPacket {
    pub fn read(mut buf: &[u8]) -> Result<Self, Error> {
        let header = buf.get_u8()?;
        if header != 0x00 && header != 0xFE {
            return Err(protocol_err!("expected 0x00 or 0xFE; received 0x{:X}", header));
        }

        let affected_rows = buf.get_uint_lenenc()?.unwrap_or(0);
        let last_insert_id = buf.get_uint_lenenc()?.unwrap_or(0);
        let status = Status::from_bits_truncate(buf.get_u16_le()?);
        let warnings = buf.get_u16_le()?;
        let info = buf.get_str(buf.len())?.to_owned();

        Ok(Self {
            affected_rows,
            last_insert_id,
            status,
            warnings,
            info,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK_HANDSHAKE: &[u8] = b"\x00\x00\x00\x02@\x00\x00";

    #[test]
    fn decodes_ok_handshake() {
        let p = OkPacket::read(OK_HANDSHAKE).unwrap();

        assert_eq!(p.affected_rows, 0);
        assert_eq!(p.last_insert_id, 0);
        assert_eq!(p.warnings, 0);
        assert!(p.status.contains(Status::SERVER_STATUS_AUTOCOMMIT));
        assert!(p.status.contains(Status::SERVER_SESSION_STATE_CHANGED));
        assert!(p.info.is_empty());
    }

    #[test]
    fn rejects_bad_header() {
        assert!(OkPacket::read(&[0x01, 0x00]).is_err());
    }
}
