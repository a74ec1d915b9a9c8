//! `COM_STMT_PREPARE_OK` (§4.3): the header of a successful prepare
//! response. The server follows it with `params` parameter definitions,
//! then (if `PROTOCOL_41` omits `DEPRECATE_EOF`) an EOF, then `columns`
//! column definitions, then another EOF — all read by the caller using the
//! counts here.
//!
//! <https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_stmt_prepare.html#sect_protocol_com_stmt_prepare_response_ok>

use crate::error::{protocol_err, Error};
use crate::io::MySqlBufExt;

pub const COM_STMT_PREPARE_OK_HEADER: u8 = 0x00;

#[derive(Debug)]
pub struct ComStmtPrepareOk {
    pub statement_id: u32,
    pub columns: u16,
    pub params: u16,
    pub warnings: u16,
}

impl ComStmtPrepareOk {
    pub fn read(mut buf: &[u8]) -> Result<Self, Error> {
        let header = buf.get_u8()?;
        if header != COM_STMT_PREPARE_OK_HEADER {
            return Err(protocol_err!(
                "expected COM_STMT_PREPARE_OK (0x00); received 0x{:X}",
                header
            ));
        }

        let statement_id = buf.get_u32_le()?;
        let columns = buf.get_u16_le()?;
        let params = buf.get_u16_le()?;

        buf.get_bytes(1)?; // filler

        let warnings = buf.get_u16_le()?;

        Ok(Self {
            statement_id,
            columns,
            params,
            warnings,
        })
    }
}
