//! `AuthSwitchRequest`: the server asking the client to restart
//! authentication with a different plugin and salt (§4.3, §4.4).
//!
//! <https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_connection_phase_packets_protocol_auth_switch_request.html>

use crate::error::{protocol_err, Error};
use crate::io::MySqlBufExt;
use crate::protocol::AuthPlugin;

pub const AUTH_SWITCH_REQUEST_HEADER: u8 = 0xFE;

#[derive(Debug)]
pub struct AuthSwitchRequest {
    pub auth_plugin: AuthPlugin,
    pub auth_plugin_data: Vec<u8>,
}

impl AuthSwitchRequest {
    pub fn read(mut buf: &[u8]) -> Result<Self, Error> {
        let header = buf.get_u8()?;
        if header != AUTH_SWITCH_REQUEST_HEADER {
            return Err(protocol_err!(
                "expected AuthSwitchRequest (0x{:X}); received 0x{:X}",
                AUTH_SWITCH_REQUEST_HEADER,
                header
            ));
        }

        let auth_plugin = AuthPlugin::from_name(buf.get_str_nul()?);
        // Trailing bytes are the new salt, unterminated, running to the end
        // of the packet; a trailing NUL some servers include is harmless to
        // keep since the scramble functions only read the salt's prefix.
        let auth_plugin_data = buf.to_vec();

        Ok(Self {
            auth_plugin,
            auth_plugin_data,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_an_auth_switch_request() {
        let mut wire = vec![0xFE];
        wire.extend_from_slice(b"caching_sha2_password\0");
        wire.extend_from_slice(b"0123456789012345678\0");

        let req = AuthSwitchRequest::read(&wire).unwrap();
        assert_eq!(req.auth_plugin, AuthPlugin::CachingSha2Password);
        assert!(!req.auth_plugin_data.is_empty());
    }

    #[test]
    fn rejects_wrong_header_byte() {
        let wire = vec![0x00];
        assert!(AuthSwitchRequest::read(&wire).is_err());
    }
}
