//! `HandshakeV10`: the first packet the server sends on connect (§4.3).
//!
//! <https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_connection_phase_packets_protocol_handshake_v10.html>
//! <https://mariadb.com/kb/en/connection/#initial-handshake-packet>

use crate::error::Error;
use crate::io::MySqlBufExt;
use crate::protocol::{AuthPlugin, Capabilities, Status};

#[derive(Debug)]
pub struct HandshakeV10 {
    pub protocol_version: u8,
    pub server_version: String,
    pub connection_id: u32,
    pub server_capabilities: Capabilities,
    pub server_default_collation: u8,
    pub status: Status,
    pub auth_plugin: AuthPlugin,
    pub auth_plugin_data: Vec<u8>,
}

impl HandshakeV10 {
    pub fn read(mut buf: &[u8]) -> Result<Self, Error> {
        let protocol_version = buf.get_u8()?;
        let server_version = buf.get_str_nul()?.to_owned();
        let connection_id = buf.get_u32_le()?;

        let mut scramble = Vec::with_capacity(20);
        scramble.extend_from_slice(buf.get_bytes(8)?);

        buf.get_bytes(1)?; // reserved

        let capabilities_1 = buf.get_u16_le()?;
        let mut capabilities = Capabilities::from_bits_truncate(capabilities_1.into());

        let char_set = buf.get_u8()?;

        let status = buf.get_u16_le()?;
        let status = Status::from_bits_truncate(status);

        let capabilities_2 = buf.get_u16_le()?;
        capabilities |= Capabilities::from_bits_truncate(u64::from(capabilities_2) << 16);

        let auth_plugin_data_len = if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            buf.get_u8()?
        } else {
            buf.get_u8()?; // 0x00 filler byte, still present on the wire
            0
        };

        buf.get_bytes(6)?; // reserved

        if capabilities.contains(Capabilities::MYSQL) {
            buf.get_bytes(4)?; // reserved
        } else {
            let capabilities_3 = buf.get_u32_le()?;
            capabilities |= Capabilities::from_bits_truncate(u64::from(capabilities_3) << 32);
        }

        if capabilities.contains(Capabilities::SECURE_CONNECTION) {
            let len = (auth_plugin_data_len as isize - 9).max(12) as usize;
            scramble.extend_from_slice(buf.get_bytes(len)?);
            buf.get_bytes(1)?; // reserved
        }

        let auth_plugin = if capabilities.contains(Capabilities::PLUGIN_AUTH) {
            AuthPlugin::from_name(buf.get_str_nul()?)
        } else {
            AuthPlugin::MySqlNativePassword
        };

        Ok(Self {
            protocol_version,
            server_capabilities: capabilities,
            server_version,
            server_default_collation: char_set,
            connection_id,
            auth_plugin_data: scramble,
            auth_plugin,
            status,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HANDSHAKE_MARIA_DB_10_4_7: &[u8] = b"\n5.5.5-10.4.7-MariaDB-1:10.4.7+maria~bionic\x00\x0b\x00\x00\x00t6L\\j\"dS\x00\xfe\xf7\x08\x02\x00\xff\x81\x15\x00\x00\x00\x00\x00\x00\x07\x00\x00\x00U14Oph9\"<H5n\x00mysql_native_password\x00";
    const HANDSHAKE_MYSQL_8_0_18: &[u8] = b"\n8.0.18\x00\x19\x00\x00\x00\x114aB0c\x06g\x00\xff\xff\xff\x02\x00\xff\xc7\x15\x00\x00\x00\x00\x00\x00\x00\x00\x00\x00tL\x03s\x0f[4\rl4. \x00caching_sha2_password\x00";

    #[test]
    fn reads_mysql_8_0_18_handshake() {
        let p = HandshakeV10::read(HANDSHAKE_MYSQL_8_0_18).unwrap();

        assert_eq!(p.protocol_version, 10);
        assert_eq!(p.server_default_collation, 255);
        assert!(p.status.contains(Status::SERVER_STATUS_AUTOCOMMIT));
        assert_eq!(p.auth_plugin, AuthPlugin::CachingSha2Password);
        assert!(p.server_capabilities.contains(Capabilities::PLUGIN_AUTH));
        assert!(p.server_capabilities.contains(Capabilities::DEPRECATE_EOF));

        assert_eq!(
            &p.auth_plugin_data[..],
            &[17, 52, 97, 66, 48, 99, 6, 103, 116, 76, 3, 115, 15, 91, 52, 13, 108, 52, 46, 32,]
        );
    }

    #[test]
    fn reads_mariadb_10_4_7_handshake() {
        let p = HandshakeV10::read(HANDSHAKE_MARIA_DB_10_4_7).unwrap();

        assert_eq!(p.protocol_version, 10);
        assert_eq!(
            p.server_version,
            "5.5.5-10.4.7-MariaDB-1:10.4.7+maria~bionic"
        );
        assert_eq!(p.server_default_collation, 8);
        assert!(p.status.contains(Status::SERVER_STATUS_AUTOCOMMIT));
        assert_eq!(p.auth_plugin, AuthPlugin::MySqlNativePassword);

        assert_eq!(
            &p.auth_plugin_data[..],
            &[
                116, 54, 76, 92, 106, 34, 100, 83, 85, 49, 52, 79, 112, 104, 57, 34, 60, 72, 53,
                110,
            ]
        );
    }

    #[test]
    fn short_handshake_buffer_is_an_error_not_a_panic() {
        assert!(HandshakeV10::read(&HANDSHAKE_MYSQL_8_0_18[..10]).is_err());
    }
}
