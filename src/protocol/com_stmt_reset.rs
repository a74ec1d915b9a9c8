//! `COM_STMT_RESET` (§4.5): resets a prepared statement's accumulated
//! parameter bindings and cursor state without deallocating it. The server
//! replies with an `OK_Packet`.
//!
//! <https://dev.mysql.com/doc/internals/en/com-stmt-reset.html>

use crate::io::MySqlBufMutExt;

pub const COM_STMT_RESET: u8 = 0x1a;

#[derive(Debug)]
pub struct ComStmtReset {
    pub statement_id: u32,
}

impl ComStmtReset {
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(COM_STMT_RESET);
        buf.put_u32_le(self.statement_id);
    }
}
