//! `COM_QUIT` (§4.5): closes the connection gracefully from the client
//! side. The server does not reply; the caller drops the socket after
//! flushing this.
//!
//! <https://dev.mysql.com/doc/internals/en/com-quit.html>

use crate::io::MySqlBufMutExt;

pub const COM_QUIT: u8 = 0x01;

#[derive(Debug)]
pub struct ComQuit;

impl ComQuit {
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(COM_QUIT);
    }
}
