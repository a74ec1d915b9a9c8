//! The connection layer (§4): a framed [`stream`], the [`establish`]
//! handshake/auth flow, the pure [`state`] machine, and the [`executor`]
//! request API built on top of all three.

mod establish;
mod executor;
mod state;
mod stream;

pub use executor::{Connection, QueryStream};
pub use stream::Socket;
