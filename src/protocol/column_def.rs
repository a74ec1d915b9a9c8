//! `ColumnDefinition41` (§3, §4.3).
//!
//! <https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_com_query_response_text_resultset_column_definition.html>
//! <https://mariadb.com/kb/en/resultset/#column-definition-packet>

use crate::error::{protocol_err, Error};
use crate::io::MySqlBufExt;
use crate::protocol::{FieldFlags, FieldType};

#[derive(Debug, Clone)]
pub struct ColumnDefinition {
    pub schema: Option<String>,
    pub table_alias: Option<String>,
    pub table: Option<String>,
    pub column_alias: Option<String>,
    pub column: Option<String>,
    pub char_set: u16,
    pub max_size: u32,
    pub field_type: FieldType,
    pub flags: FieldFlags,
    pub decimals: u8,
}

impl ColumnDefinition {
    /// The name callers see: the alias if the column was aliased in the
    /// query, else the underlying column name.
    pub fn name(&self) -> Option<&str> {
        self.column_alias.as_deref().or(self.column.as_deref())
    }

    pub fn read(mut buf: &[u8]) -> Result<Self, Error> {
        let catalog = buf.get_str_lenenc()?;
        if catalog != Some("def") {
            return Err(protocol_err!(
                "expected ColumnDefinition catalog \"def\"; received {:?}",
                catalog
            ));
        }

        let schema = buf.get_str_lenenc()?.map(str::to_owned);
        let table_alias = buf.get_str_lenenc()?.map(str::to_owned);
        let table = buf.get_str_lenenc()?.map(str::to_owned);
        let column_alias = buf.get_str_lenenc()?.map(str::to_owned);
        let column = buf.get_str_lenenc()?.map(str::to_owned);

        let len_fixed_fields = buf.get_uint_lenenc()?.unwrap_or(0);
        if len_fixed_fields != 0x0c {
            return Err(protocol_err!(
                "expected ColumnDefinition fixed-length fields marker (0x0c); received {}",
                len_fixed_fields
            ));
        }

        let char_set = buf.get_u16_le()?;
        let max_size = buf.get_u32_le()?;
        let field_type = FieldType::from_code(buf.get_u8()?);
        let flags = FieldFlags::from_bits_truncate(buf.get_u16_le()?);
        let decimals = buf.get_u8()?;

        Ok(Self {
            schema,
            table,
            table_alias,
            column,
            column_alias,
            char_set,
            max_size,
            field_type,
            flags,
            decimals,
        })
    }
}
