//! `COM_STMT_PREPARE` (§4.3).
//!
//! <https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_stmt_prepare.html>

use crate::io::MySqlBufMutExt;

pub const COM_STMT_PREPARE: u8 = 0x16;

#[derive(Debug)]
pub struct ComStmtPrepare<'a> {
    pub query: &'a str,
}

impl ComStmtPrepare<'_> {
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(COM_STMT_PREPARE);
        buf.put_str(self.query);
    }
}
