//! `COM_QUERY` (§4.3): the text-protocol query request.
//!
//! <https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_query.html>

use crate::io::MySqlBufMutExt;

pub const COM_QUERY: u8 = 0x03;

#[derive(Debug)]
pub struct ComQuery<'a> {
    pub query: &'a str,
}

impl ComQuery<'_> {
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(COM_QUERY);
        buf.put_str(self.query);
    }
}
