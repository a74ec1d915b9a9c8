//! `ERR_Packet` (§4.3).
//!
//! <https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_basic_err_packet.html>
//! <https://mariadb.com/kb/en/err_packet/>

use crate::error::{protocol_err, Error};
use crate::io::MySqlBufExt;

pub const ERR_HEADER: u8 = 0xFF;

#[derive(Debug)]
pub struct ErrPacket {
    pub error_code: u16,
    pub sql_state: String,
    pub error_message: String,
}

impl ErrPacket {
    pub fn read(mut buf: &[u8]) -> Result<Self, Error> {
        let header = buf.get_u8()?;
        if header != ERR_HEADER {
            return Err(protocol_err!("expected 0xFF; received 0x{:X}", header));
        }

        let error_code = buf.get_u16_le()?;

        let _sql_state_marker = buf.get_u8()?;
        let sql_state = buf.get_str(5)?.to_owned();

        let error_message = buf.get_str(buf.len())?.to_owned();

        Ok(Self {
            error_code,
            sql_state,
            error_message,
        })
    }

    /// The server's two "bad credentials" error codes: a plain wrong
    /// password/user (`ER_ACCESS_DENIED_ERROR`) and the no-password variant
    /// (`ER_ACCESS_DENIED_NO_PASSWORD_ERROR`).
    pub fn is_access_denied(&self) -> bool {
        matches!(self.error_code, 1045 | 1698)
    }

    pub fn into_server_error(self) -> Error {
        Error::ServerError {
            code: self.error_code,
            sql_state: self.sql_state,
            message: self.error_message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ERR_HANDSHAKE_UNKNOWN_DB: &[u8] = b"\xff\x19\x04#42000Unknown database \'unknown\'";

    #[test]
    fn decodes_err_packet() {
        let p = ErrPacket::read(ERR_HANDSHAKE_UNKNOWN_DB).unwrap();

        assert_eq!(p.error_code, 1049);
        assert_eq!(p.sql_state, "42000");
        assert_eq!(p.error_message, "Unknown database 'unknown'");
        assert!(!p.is_access_denied());
    }

    #[test]
    fn recognizes_access_denied_error_codes() {
        let wire = b"\xff\x15\x04#28000Access denied for user 'root'@'localhost'";
        let p = ErrPacket::read(wire).unwrap();
        assert_eq!(p.error_code, 1045);
        assert!(p.is_access_denied());
    }
}
