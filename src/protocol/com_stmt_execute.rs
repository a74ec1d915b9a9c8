//! `COM_STMT_EXECUTE` (§4.3, §4.5): runs a prepared statement with bound
//! parameters in the binary protocol.
//!
//! <https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_stmt_execute.html>

use crate::io::MySqlBufMutExt;
use crate::protocol::FieldType;

pub const COM_STMT_EXECUTE: u8 = 0x17;

bitflags::bitflags! {
    /// <https://mariadb.com/kb/en/library/com_stmt_execute/#flag>
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct CursorType: u8 {
        const NO_CURSOR = 0;
        const READ_ONLY = 1;
        const FOR_UPDATE = 2;
        const SCROLLABLE = 4;
    }
}

/// One bound parameter's type tag, carried alongside its serialized value.
#[derive(Debug, Clone, Copy)]
pub struct ParamType {
    pub field_type: FieldType,
    pub is_unsigned: bool,
}

#[derive(Debug)]
pub struct ComStmtExecute<'a> {
    pub statement_id: u32,
    pub cursor: CursorType,
    /// Already-concatenated binary-encoded parameter values, in bind order.
    pub params: &'a [u8],
    /// `NULL`-bitmap over the parameters, `(param_count + 7) / 8` bytes.
    pub null_bitmap: &'a [u8],
    pub param_types: &'a [ParamType],
}

impl ComStmtExecute<'_> {
    pub fn encode(&self, buf: &mut Vec<u8>) {
        buf.put_u8(COM_STMT_EXECUTE);
        buf.put_u32_le(self.statement_id);
        buf.put_u8(self.cursor.bits());
        buf.put_u32_le(1); // iteration-count, always 1

        if !self.param_types.is_empty() {
            buf.put_bytes(self.null_bitmap);
            buf.put_u8(1); // new-params-bound-flag

            for ty in self.param_types {
                buf.put_u8(ty.field_type.code());
                buf.put_u8(if ty.is_unsigned { 0x80 } else { 0 });
            }

            buf.put_bytes(self.params);
        }
    }
}
