//! Text protocol result row (§4.3): each column's raw bytes are carried as
//! its textual representation, one length-encoded string per column.

use crate::error::Error;
use crate::io::MySqlBufExt;

/// Decodes one text-protocol row into `num_columns` raw (still-textual)
/// column values. `None` denotes SQL NULL.
pub fn decode(mut buf: &[u8], num_columns: usize) -> Result<Vec<Option<Vec<u8>>>, Error> {
    let mut values = Vec::with_capacity(num_columns);

    for _ in 0..num_columns {
        let value = buf.get_bytes_lenenc()?.map(<[u8]>::to_vec);
        values.push(value);
    }

    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MySqlBufMutExt;

    #[test]
    fn decodes_mixed_null_and_value_columns() {
        let mut buf = Vec::new();
        buf.put_str_lenenc("1");
        buf.put_u8(0xFB); // NULL
        buf.put_str_lenenc("hello");

        let row = decode(&buf, 3).unwrap();
        assert_eq!(row[0].as_deref(), Some(&b"1"[..]));
        assert_eq!(row[1], None);
        assert_eq!(row[2].as_deref(), Some(&b"hello"[..]));
    }

    #[test]
    fn short_buffer_is_an_error() {
        let buf = [0x05u8, b'h', b'i'];
        assert!(decode(&buf, 1).is_err());
    }
}
