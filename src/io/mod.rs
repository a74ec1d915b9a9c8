//! Byte-level primitive codec: fixed-width integers, floats, null-terminated
//! strings, and MySQL's length-encoded (lenenc) integers/strings/bytes.
//!
//! Every reader here is short-read safe: on insufficient input it returns
//! `Err(Error::ParsingError(..))` without having consumed anything from the
//! slice it was handed, since the caller (the packet framer) is responsible
//! for ensuring a full packet's payload is available before decode is
//! attempted at all. These readers therefore never see a "need more bytes"
//! case in practice, but they're defensive against a malformed payload that
//! claims a length that doesn't fit.

mod buf;
mod buf_mut;

pub use buf::MySqlBufExt;
pub use buf_mut::MySqlBufMutExt;
