//! The handshake/authentication exchange (§4.3, §4.4 `HS/*` states). Unlike
//! [`super::state`] this is driven imperatively rather than as a pure
//! transition function, since it needs the caller's credentials and runs
//! exactly once per connection rather than being re-entered per command.

use crate::connection::stream::MySqlStream;
use crate::error::{protocol_err, Error};
use crate::options::MySqlConnectOptions;
use crate::protocol::{
    self, caching_sha2_status, scramble_caching_sha2, scramble_native_password, AuthPlugin,
    AuthSwitchRequest, Capabilities, ErrPacket, HandshakeResponse41, HandshakeV10, OkPacket,
};

/// The caching_sha2_password "more data" packet's header byte, distinct from
/// `AuthSwitchRequest`'s `0xFE`.
const CACHING_SHA2_MORE_DATA_HEADER: u8 = 0x01;

/// What survives the handshake: the capability set both sides agreed on
/// (the basis for every later protocol decision) plus basic server identity.
#[derive(Debug, Clone)]
pub struct Established {
    pub capabilities: Capabilities,
    pub server_version: String,
    pub connection_id: u32,
}

fn scramble_for(plugin: AuthPlugin, password: &[u8], salt: &[u8]) -> Result<Vec<u8>, Error> {
    plugin.require_supported()?;
    Ok(match plugin {
        AuthPlugin::MySqlNativePassword => scramble_native_password(password, salt),
        AuthPlugin::CachingSha2Password => scramble_caching_sha2(password, salt),
        AuthPlugin::Other => unreachable!("require_supported rejects AuthPlugin::Other above"),
    })
}

/// Drives the full handshake: reads `HandshakeV10`, negotiates capabilities,
/// sends `HandshakeResponse41`, and follows the server through any number of
/// `AuthSwitchRequest`s or a `caching_sha2_password` fast-auth round before
/// resolving to `OK` or a server error.
pub async fn establish(stream: &mut MySqlStream, options: &MySqlConnectOptions) -> Result<Established, Error> {
    stream.begin_command();
    let packet = stream.read_packet().await?;
    let handshake = HandshakeV10::read(&packet.payload)?;

    if handshake.protocol_version != 10 {
        return Err(Error::InvalidHandshake(format!(
            "unsupported protocol version {}",
            handshake.protocol_version
        )));
    }

    let capabilities = Capabilities::client_default(options.allow_multiple_statements) & handshake.server_capabilities;
    if !capabilities.contains(Capabilities::PROTOCOL_41) {
        return Err(Error::Unsupported {
            what: "server does not support the 4.1 protocol".to_owned(),
        });
    }

    let password = options.password.as_deref().unwrap_or("").as_bytes();
    let mut plugin = handshake.auth_plugin;
    let auth_response = scramble_for(plugin, password, &handshake.auth_plugin_data)?;

    let response = HandshakeResponse41 {
        max_packet_size: 0xFF_FF_FF,
        client_collation: handshake.server_default_collation,
        username: &options.username,
        database: options.database.as_deref(),
        auth_plugin: plugin,
        auth_response: &auth_response,
    };

    let mut payload = Vec::new();
    response.encode(capabilities, &mut payload);
    stream.write_packet(&payload);
    stream.flush().await?;

    loop {
        let packet = stream.read_packet().await?;

        match packet.first_byte() {
            Some(protocol::OK_HEADER) => {
                OkPacket::read(&packet.payload)?;
                return Ok(Established {
                    capabilities,
                    server_version: handshake.server_version,
                    connection_id: handshake.connection_id,
                });
            }

            Some(protocol::ERR_HEADER) => {
                let err = ErrPacket::read(&packet.payload)?;
                if err.is_access_denied() {
                    return Err(Error::InvalidCredentials);
                }
                return Err(err.into_server_error());
            }

            Some(CACHING_SHA2_MORE_DATA_HEADER) if plugin == AuthPlugin::CachingSha2Password => {
                let status = *packet.payload.get(1).ok_or_else(|| protocol_err!("empty caching_sha2_password status packet"))?;

                match status {
                    caching_sha2_status::FAST_AUTH_SUCCESS => continue,
                    caching_sha2_status::FULL_AUTH_REQUIRED => {
                        return Err(Error::Unsupported {
                            what: "caching_sha2_password full authentication (RSA key exchange over an \
                                   unencrypted channel) is not supported"
                                .to_owned(),
                        });
                    }
                    other => return Err(protocol_err!("unrecognized caching_sha2_password status byte {}", other)),
                }
            }

            Some(protocol::AUTH_SWITCH_REQUEST_HEADER) => {
                let switch = AuthSwitchRequest::read(&packet.payload)?;

                if switch.auth_plugin != AuthPlugin::MySqlNativePassword {
                    return Err(Error::Unsupported {
                        what: format!("switching authentication mid-handshake to {:?}", switch.auth_plugin),
                    });
                }
                plugin = switch.auth_plugin;

                let response = scramble_for(plugin, password, &switch.auth_plugin_data)?;
                stream.write_packet(&response);
                stream.flush().await?;
            }

            _ => return Err(Error::UnexpectedResponse),
        }
    }
}
