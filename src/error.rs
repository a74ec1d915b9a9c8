//! Error and Result types for the core driver.

use std::fmt;

/// A specialized `Result` type for this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while speaking the wire protocol, driving
/// the connection state machine, or managing the pool.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Transport-level failure (socket read/write/shutdown).
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The server's initial handshake packet could not be parsed or did not
    /// meet this driver's minimum requirements (protocol version, salt length).
    #[error("invalid handshake packet: {0}")]
    InvalidHandshake(String),

    /// A packet was well-framed but its payload didn't parse as the message
    /// the state machine expected in its current state.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The packet framer encountered a malformed header or an impossible
    /// continuation sequence.
    #[error("invalid packet: {0}")]
    InvalidPacket(String),

    /// A length-encoded integer, string, or other primitive failed to parse.
    #[error("parsing error: {0}")]
    ParsingError(String),

    /// A value was read successfully but could not be decoded into the
    /// caller-requested shape (wrong width, invalid UTF-8, etc).
    #[error("decoding error: {0}")]
    DecodingError(String),

    /// The server rejected the supplied credentials.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// A protocol feature this driver deliberately does not support.
    #[error("unsupported: {what}")]
    Unsupported { what: String },

    /// A second command was issued on a connection that already has one in flight.
    #[error("connection already has a command in flight")]
    ConnectionInUse,

    /// The server sent a packet that is syntactically valid but not legal in
    /// the connection's current phase.
    #[error("unexpected response from server")]
    UnexpectedResponse,

    /// A bound value's declared type is not assignable to the parameter's
    /// column type.
    #[error("invalid type bound: got {got}, expected {expected}")]
    InvalidTypeBound { got: String, expected: String },

    /// A bound value could not be serialized for the named parameter.
    #[error("invalid binding for parameter {for_}")]
    InvalidBinding { for_: usize },

    /// More values were bound than the prepared statement declares parameters.
    #[error("too many parameters bound: statement expects {expected}, got {got}")]
    TooManyParametersBound { expected: usize, got: usize },

    /// Fewer values were bound than the prepared statement declares parameters.
    #[error("not enough parameters bound: statement expects {expected}, got {got}")]
    NotEnoughParametersBound { expected: usize, got: usize },

    /// The server returned `ERR_Packet` in response to a command.
    #[error("server error {code} ({sql_state}): {message}")]
    ServerError {
        code: u16,
        sql_state: String,
        message: String,
    },

    /// [`Pool::acquire`](crate::pool::Pool::acquire) timed out waiting for a connection.
    #[error("timed out while waiting for a connection")]
    PoolTimedOut,

    /// The pool has been closed and will not hand out further connections.
    #[error("attempted to acquire a connection from a closed pool")]
    PoolClosed,

    /// The connect-string URL could not be parsed.
    #[error("invalid connection url: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl Error {
    pub(crate) fn protocol(args: fmt::Arguments<'_>) -> Error {
        Error::InvalidResponse(args.to_string())
    }
}

/// Shorthand used throughout the protocol module to build an
/// [`Error::InvalidResponse`] with a formatted message, mirroring the
/// `protocol_err!` helper used by similarly-shaped drivers.
macro_rules! protocol_err {
    ($($args:tt)*) => {
        $crate::error::Error::protocol(format_args!($($args)*))
    };
}

pub(crate) use protocol_err;
