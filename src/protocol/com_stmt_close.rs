//! `COM_STMT_CLOSE` (§4.5): deallocates a prepared statement on the server.
//! No response is sent.
//!
//! <https://dev.mysql.com/doc/internals/en/com-stmt-close.html>

use crate::io::MySqlBufMutExt;

pub const COM_STMT_CLOSE: u8 = 0x19;

#[derive(Debug)]
pub struct ComStmtClose {
    pub statement_id: u32,
}

impl ComStmtClose {
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(COM_STMT_CLOSE);
        buf.put_u32_le(self.statement_id);
    }
}
