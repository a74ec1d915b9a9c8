use crate::error::{protocol_err, Error};

/// An authentication plugin named by the server during handshake or an
/// `AuthSwitchRequest`.
///
/// Per §1/§9 this driver fully drives `mysql_native_password`; it recognizes
/// `caching_sha2_password` only far enough to use its fast-auth success path
/// (an immediate OK) and to reject a full-auth request with
/// [`Error::Unsupported`] rather than attempting the RSA-encrypted exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPlugin {
    MySqlNativePassword,
    CachingSha2Password,
    Other,
}

impl AuthPlugin {
    pub fn from_name(name: &str) -> AuthPlugin {
        match name {
            "mysql_native_password" => AuthPlugin::MySqlNativePassword,
            "caching_sha2_password" => AuthPlugin::CachingSha2Password,
            _ => AuthPlugin::Other,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            AuthPlugin::MySqlNativePassword => "mysql_native_password",
            AuthPlugin::CachingSha2Password => "caching_sha2_password",
            AuthPlugin::Other => "unknown",
        }
    }

    pub(crate) fn require_supported(self) -> Result<(), Error> {
        match self {
            AuthPlugin::MySqlNativePassword | AuthPlugin::CachingSha2Password => Ok(()),
            AuthPlugin::Other => Err(protocol_err!(
                "unsupported authentication plugin; only mysql_native_password \
                 and the caching_sha2_password fast-auth path are supported"
            )),
        }
    }
}
