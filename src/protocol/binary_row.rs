//! Binary protocol result row (§4.3): a leading NULL-bitmap followed by
//! fixed- or length-encoded values per [`WidthClass`](crate::protocol::WidthClass).
//!
//! <https://dev.mysql.com/doc/dev/mysql-server/8.0.12/page_protocol_binary_resultset.html>

use crate::error::{protocol_err, Error};
use crate::io::MySqlBufExt;
use crate::protocol::{FieldType, WidthClass};

const ROW_HEADER: u8 = 0x00;
/// The binary protocol's NULL-bitmap reserves its first two bits (offset
/// from the protocol's use of this same bitmap shape for statement-execute
/// parameters, where bits 0-1 are unused placeholders).
const NULL_BITMAP_OFFSET: usize = 2;

/// Decodes one binary-protocol row given the statement's column types, in
/// column order. `None` denotes SQL NULL.
pub fn decode(mut buf: &[u8], columns: &[FieldType]) -> Result<Vec<Option<Vec<u8>>>, Error> {
    let header = buf.get_u8()?;
    if header != ROW_HEADER {
        return Err(protocol_err!("expected binary row header (0x00); received 0x{:X}", header));
    }

    let null_bitmap_len = (columns.len() + NULL_BITMAP_OFFSET + 7) / 8;
    let null_bitmap = buf.get_bytes(null_bitmap_len)?;

    let mut values = Vec::with_capacity(columns.len());

    for (i, field_type) in columns.iter().enumerate() {
        let bit_index = i + NULL_BITMAP_OFFSET;
        let is_null = null_bitmap[bit_index / 8] & (1 << (bit_index % 8)) != 0;

        if is_null {
            values.push(None);
            continue;
        }

        let value = match field_type.width_class() {
            WidthClass::FixedInt(n) | WidthClass::FixedFloat(n) => {
                buf.get_bytes(n as usize)?.to_vec()
            }
            WidthClass::Temporal => {
                let len = buf.get_u8()? as usize;
                buf.get_bytes(len)?.to_vec()
            }
            WidthClass::LenencBytes | WidthClass::LenencString => {
                buf.get_bytes_lenenc()?.unwrap_or(&[]).to_vec()
            }
        };

        values.push(Some(value));
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MySqlBufMutExt;

    #[test]
    fn decodes_a_row_with_one_null_column() {
        let columns = [FieldType::Long, FieldType::VarString];

        let mut buf = vec![ROW_HEADER];
        // null bitmap: 1 byte covers offset 2 + 2 columns = bits 2,3
        // mark column 1 (bit index 3) as NULL
        buf.push(0b0000_1000);
        buf.extend_from_slice(&42i32.to_le_bytes());
        // column 1 is NULL, nothing further written for it

        let row = decode(&buf, &columns).unwrap();
        assert_eq!(row[0].as_deref(), Some(&42i32.to_le_bytes()[..]));
        assert_eq!(row[1], None);
    }

    #[test]
    fn decodes_a_lenenc_string_column() {
        let columns = [FieldType::VarString];

        let mut buf = vec![ROW_HEADER, 0b0000_0000];
        buf.put_str_lenenc("hi");

        let row = decode(&buf, &columns).unwrap();
        assert_eq!(row[0].as_deref(), Some(&b"hi"[..]));
    }

    #[test]
    fn rejects_wrong_header() {
        let columns = [FieldType::Long];
        let buf = [0x01u8, 0x00, 0, 0, 0, 0];
        assert!(decode(&buf, &columns).is_err());
    }
}
