//! The message layer (§4.3): typed request/response structs built on top of
//! the byte codec and packet framer, one module per wire message.

mod auth;
mod auth_plugin;
mod auth_switch;
mod binary_row;
mod capabilities;
mod column_def;
mod com_ping;
mod com_query;
mod com_quit;
mod com_stmt_close;
mod com_stmt_execute;
mod com_stmt_prepare;
mod com_stmt_prepare_ok;
mod com_stmt_reset;
mod eof;
mod err;
mod field_flags;
mod handshake;
mod handshake_response;
mod ok;
mod packet;
mod status;
mod text_row;
mod type_id;

pub use auth::{caching_sha2_status, scramble_caching_sha2, scramble_native_password};
pub use auth_plugin::AuthPlugin;
pub use auth_switch::{AuthSwitchRequest, AUTH_SWITCH_REQUEST_HEADER};
pub use capabilities::Capabilities;
pub use column_def::ColumnDefinition;
pub use com_ping::{ComPing, COM_PING};
pub use com_query::{ComQuery, COM_QUERY};
pub use com_quit::{ComQuit, COM_QUIT};
pub use com_stmt_close::{ComStmtClose, COM_STMT_CLOSE};
pub use com_stmt_execute::{ComStmtExecute, CursorType, ParamType};
pub use com_stmt_prepare::{ComStmtPrepare, COM_STMT_PREPARE};
pub use com_stmt_prepare_ok::ComStmtPrepareOk;
pub use com_stmt_reset::{ComStmtReset, COM_STMT_RESET};
pub use eof::{EofPacket, EOF_HEADER};
pub use err::{ErrPacket, ERR_HEADER};
pub use field_flags::FieldFlags;
pub use handshake::HandshakeV10;
pub use handshake_response::HandshakeResponse41;
pub use ok::{OkPacket, OK_HEADER};
pub use packet::{check_sequence, Packet, MAX_FRAME_PAYLOAD};
pub use status::Status;
pub use type_id::{FieldType, WidthClass};

pub use packet::{encode as encode_packet, try_parse as try_parse_packet};
pub use binary_row::decode as decode_binary_row;
pub use text_row::decode as decode_text_row;
