//! Core MySQL/MariaDB wire protocol driver.
//!
//! Layers, bottom to top: [`io`] (byte-level codec), [`protocol`] (typed
//! wire messages), [`connection`] (the framed transport, handshake, state
//! machine, and request API), and [`pool`] (a pool of connections). [`value`],
//! [`column`], [`row`], and [`statement`] are the caller-visible data model
//! shared by both the single-connection and pooled APIs.

mod column;
mod connection;
mod error;
mod io;
mod options;
mod pool;
mod protocol;
mod row;
mod statement;
mod value;

pub use column::Column;
pub use connection::{Connection, QueryStream, Socket};
pub use error::{Error, Result};
pub use options::{MySqlConnectOptions, PoolOptions, TlsMode, TlsOptions, TlsVerify};
pub use pool::{Pool, PooledConnection};
pub use row::{FromValue, Row};
pub use statement::{Bind, PreparedStatement};
pub use value::{MySqlTime, Value};
