//! `HandshakeResponse41`: the client's reply to [`super::handshake::HandshakeV10`].
//!
//! <https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_connection_phase_packets_protocol_handshake_response.html>
//! <https://mariadb.com/kb/en/connection/#handshake-response-packet>

use crate::io::MySqlBufMutExt;
use crate::protocol::{AuthPlugin, Capabilities};

#[derive(Debug)]
pub struct HandshakeResponse41<'a> {
    pub max_packet_size: u32,
    pub client_collation: u8,
    pub username: &'a str,
    pub database: Option<&'a str>,
    pub auth_plugin: AuthPlugin,
    pub auth_response: &'a [u8],
}

impl HandshakeResponse41<'_> {
    pub fn encode(&self, capabilities: Capabilities, buf: &mut Vec<u8>) {
        buf.put_u32_le(capabilities.bits() as u32);
        buf.put_u32_le(self.max_packet_size);
        buf.put_u8(self.client_collation);
        buf.put_bytes(&[0u8; 19]);

        if capabilities.contains(Capabilities::MYSQL) {
            buf.put_bytes(&[0u8; 4]);
        } else {
            buf.put_u32_le((capabilities.bits() >> 32) as u32);
        }

        buf.put_str_nul(self.username);

        if capabilities.contains(Capabilities::PLUGIN_AUTH_LENENC_DATA) {
            buf.put_bytes_lenenc(self.auth_response);
        } else if capabilities.contains(Capabilities::SECURE_CONNECTION) {
            buf.put_u8(self.auth_response.len() as u8);
            buf.put_bytes(self.auth_response);
        } else {
            buf.put_u8(0);
        }

        if capabilities.contains(Capabilities::CONNECT_WITH_DB) {
            if let Some(database) = self.database {
                buf.put_str_nul(database);
            }
        }

        if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            buf.put_str_nul(self.auth_plugin.name());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_username_and_auth_response() {
        let response = HandshakeResponse41 {
            max_packet_size: 0xFF_FF_FF,
            client_collation: 45,
            username: "root",
            database: Some("test"),
            auth_plugin: AuthPlugin::MySqlNativePassword,
            auth_response: &[1, 2, 3, 4],
        };

        let mut buf = Vec::new();
        response.encode(Capabilities::client_default(false), &mut buf);

        assert!(buf.windows(4).any(|w| w == b"root"));
        assert!(buf.windows(4).any(|w| w == b"test"));
    }
}
