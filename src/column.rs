//! The caller-facing column model (§3), derived from the wire
//! [`ColumnDefinition`](crate::protocol::ColumnDefinition).

use crate::protocol::{ColumnDefinition, FieldFlags, FieldType};

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub ordinal: usize,
    pub field_type: FieldType,
    pub flags: FieldFlags,
    pub max_size: u32,
    pub decimals: u8,
}

impl Column {
    pub fn is_unsigned(&self) -> bool {
        self.flags.contains(FieldFlags::UNSIGNED)
    }

    pub fn is_nullable(&self) -> bool {
        !self.flags.contains(FieldFlags::NOT_NULL)
    }

    pub(crate) fn from_definition(def: ColumnDefinition, ordinal: usize) -> Column {
        Column {
            name: def.name().unwrap_or_default().to_owned(),
            ordinal,
            field_type: def.field_type,
            flags: def.flags,
            max_size: def.max_size,
            decimals: def.decimals,
        }
    }
}
