//! `COM_PING` (§4.6): used by the pool's health check before reviving an
//! idle connection. The server always replies with an `OK_Packet`.
//!
//! <https://dev.mysql.com/doc/internals/en/com-ping.html>

use crate::io::MySqlBufMutExt;

pub const COM_PING: u8 = 0x0e;

#[derive(Debug)]
pub struct ComPing;

impl ComPing {
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(COM_PING);
    }
}
