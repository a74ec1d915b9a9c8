bitflags::bitflags! {
    /// Client/server capability flags negotiated during the handshake.
    ///
    /// The effective capability set for the lifetime of a connection is the
    /// bitwise AND of what the client advertises in `HandshakeResponse41`
    /// and what the server advertised in its `HandshakeV10` packet; it is
    /// frozen at the end of the handshake.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u64 {
        const LONG_PASSWORD = 1;
        const FOUND_ROWS = 1 << 1;
        const LONG_FLAG = 1 << 2;
        const CONNECT_WITH_DB = 1 << 3;
        const NO_SCHEMA = 1 << 4;
        const COMPRESS = 1 << 5;
        const ODBC = 1 << 6;
        const LOCAL_FILES = 1 << 7;
        const IGNORE_SPACE = 1 << 8;
        const PROTOCOL_41 = 1 << 9;
        const INTERACTIVE = 1 << 10;
        const SSL = 1 << 11;
        const IGNORE_SIGPIPE = 1 << 12;
        const TRANSACTIONS = 1 << 13;
        const RESERVED = 1 << 14;
        const SECURE_CONNECTION = 1 << 15;
        const MULTI_STATEMENTS = 1 << 16;
        const MULTI_RESULTS = 1 << 17;
        const PS_MULTI_RESULTS = 1 << 18;
        const PLUGIN_AUTH = 1 << 19;
        const CONNECT_ATTRS = 1 << 20;
        const PLUGIN_AUTH_LENENC_DATA = 1 << 21;
        const CAN_HANDLE_EXPIRED_PASSWORDS = 1 << 22;
        const SESSION_TRACK = 1 << 23;
        const DEPRECATE_EOF = 1 << 24;
        const OPTIONAL_RESULTSET_METADATA = 1 << 25;
        const ZSTD_COMPRESSION_ALGORITHM = 1 << 26;
        const SSL_VERIFY_SERVER_CERT = 1 << 30;
        const REMEMBER_OPTIONS = 1 << 31;
        /// MariaDB-only flag occupying what would otherwise be capability
        /// bit 32 in the extended (`capability_flags_3`) field; MariaDB
        /// repurposes those 4 reserved bytes, so on a MariaDB handshake this
        /// bit is set instead of a third capability word being present.
        const MYSQL = 1 << 32;
    }
}

impl Capabilities {
    /// The capability set this driver is willing to advertise to the server.
    /// `PROTOCOL_41` and `SECURE_CONNECTION` are mandatory per §4.3; the rest
    /// are negotiated down to whatever the server also supports.
    /// `MULTI_STATEMENTS` is only advertised when `allow_multiple_statements`
    /// is set, mirroring `MySqlConnectOptions`'s `false` default (§6).
    pub fn client_default(allow_multiple_statements: bool) -> Capabilities {
        let mut capabilities = Capabilities::PROTOCOL_41
            | Capabilities::SECURE_CONNECTION
            | Capabilities::PLUGIN_AUTH
            | Capabilities::PLUGIN_AUTH_LENENC_DATA
            | Capabilities::CONNECT_WITH_DB
            | Capabilities::DEPRECATE_EOF
            | Capabilities::TRANSACTIONS
            | Capabilities::SESSION_TRACK
            | Capabilities::SSL;

        if allow_multiple_statements {
            capabilities |= Capabilities::MULTI_STATEMENTS;
        }

        capabilities
    }
}
