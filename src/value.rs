//! Decoded column and bound-parameter values (§3).

use crate::error::Error;
use crate::io::{MySqlBufExt, MySqlBufMutExt};
use crate::protocol::FieldType;

/// A date/time/datetime value in the shape the binary protocol carries it,
/// kept free of any external date/time crate dependency per the core's
/// scope — a higher-level decoder is expected to convert this into
/// whichever calendar type the caller prefers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MySqlTime {
    pub years: u16,
    pub months: u8,
    pub days: u32,
    pub hours: u8,
    pub minutes: u8,
    pub seconds: u8,
    pub micros: u32,
    pub is_negative: bool,
}

/// A single column value, tagged by the shape it decoded as.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Bytes(Vec<u8>),
    Temporal(MySqlTime),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Decodes one binary-protocol column's raw bytes (as produced by
/// [`crate::protocol::decode_binary_row`]) into a typed [`Value`], per its
/// declared [`FieldType`].
pub fn decode_binary_value(field_type: FieldType, raw: &[u8]) -> Result<Value, Error> {
    let mut buf = raw;

    Ok(match field_type {
        FieldType::Tiny => Value::Int(i64::from(buf.get_i8()?)),
        FieldType::Short | FieldType::Year => Value::Int(i64::from(buf.get_i16_le()?)),
        FieldType::Long | FieldType::Int24 => Value::Int(i64::from(buf.get_i32_le()?)),
        FieldType::LongLong => Value::Int(buf.get_i64_le()?),
        FieldType::Float => Value::Float(f64::from(buf.get_f32_le()?)),
        FieldType::Double => Value::Float(buf.get_f64_le()?),
        FieldType::Null => Value::Null,
        FieldType::Date | FieldType::DateTime | FieldType::Timestamp => {
            Value::Temporal(decode_date_time(buf)?)
        }
        FieldType::Time => Value::Temporal(decode_time(buf)?),
        FieldType::TinyBlob
        | FieldType::MediumBlob
        | FieldType::LongBlob
        | FieldType::Blob
        | FieldType::Geometry
        | FieldType::Bit => Value::Bytes(raw.to_vec()),
        FieldType::VarChar
        | FieldType::VarString
        | FieldType::String
        | FieldType::Json
        | FieldType::NewDecimal
        | FieldType::Decimal
        | FieldType::Enum
        | FieldType::Set => {
            Value::String(
                std::str::from_utf8(raw)
                    .map_err(|e| Error::DecodingError(format!("invalid utf-8 in column value: {}", e)))?
                    .to_owned(),
            )
        }
        FieldType::NewDate | FieldType::Unknown(_) => Value::Bytes(raw.to_vec()),
    })
}

/// Decodes a text-protocol column (always textual on the wire) into a
/// typed `Value`, interpreting it according to `field_type` where the
/// database's declared type implies a non-string Rust type.
pub fn decode_text_value(field_type: FieldType, raw: &[u8]) -> Result<Value, Error> {
    let text = std::str::from_utf8(raw).map_err(|e| Error::DecodingError(format!("invalid utf-8 in column value: {}", e)))?;

    Ok(match field_type {
        FieldType::Tiny | FieldType::Short | FieldType::Long | FieldType::Int24 | FieldType::LongLong | FieldType::Year => {
            match text.parse::<i64>() {
                Ok(n) => Value::Int(n),
                Err(_) => Value::UInt(
                    text.parse::<u64>()
                        .map_err(|e| Error::DecodingError(format!("invalid integer column value {:?}: {}", text, e)))?,
                ),
            }
        }
        FieldType::Float | FieldType::Double | FieldType::NewDecimal | FieldType::Decimal => {
            Value::Float(
                text.parse::<f64>()
                    .map_err(|e| Error::DecodingError(format!("invalid float column value {:?}: {}", text, e)))?,
            )
        }
        _ => Value::String(text.to_owned()),
    })
}

fn decode_date_time(mut buf: &[u8]) -> Result<MySqlTime, Error> {
    if buf.is_empty() {
        return Ok(MySqlTime::default());
    }

    let years = buf.get_u16_le()?;
    let months = buf.get_u8()?;
    let days = u32::from(buf.get_u8()?);

    let mut time = MySqlTime {
        years,
        months,
        days,
        ..MySqlTime::default()
    };

    if buf.is_empty() {
        return Ok(time);
    }

    time.hours = buf.get_u8()?;
    time.minutes = buf.get_u8()?;
    time.seconds = buf.get_u8()?;

    if !buf.is_empty() {
        time.micros = buf.get_u32_le()?;
    }

    Ok(time)
}

fn decode_time(mut buf: &[u8]) -> Result<MySqlTime, Error> {
    if buf.is_empty() {
        return Ok(MySqlTime::default());
    }

    let is_negative = buf.get_u8()? != 0;
    let days = buf.get_u32_le()?;

    let mut time = MySqlTime {
        days,
        is_negative,
        ..MySqlTime::default()
    };

    if buf.is_empty() {
        return Ok(time);
    }

    time.hours = buf.get_u8()?;
    time.minutes = buf.get_u8()?;
    time.seconds = buf.get_u8()?;

    if !buf.is_empty() {
        time.micros = buf.get_u32_le()?;
    }

    Ok(time)
}

/// Serializes a bound parameter value into the binary protocol's
/// per-type encoding for `COM_STMT_EXECUTE` (§4.5). The caller is
/// responsible for tracking NULLs in the separate parameter null-bitmap
/// rather than emitting anything here for `Value::Null`.
pub fn encode_binary_value(value: &Value, buf: &mut Vec<u8>) -> Result<FieldType, Error> {
    Ok(match value {
        Value::Null => FieldType::Null,
        Value::Int(n) => {
            buf.put_i64_le(*n);
            FieldType::LongLong
        }
        Value::UInt(n) => {
            buf.put_u64_le(*n);
            FieldType::LongLong
        }
        Value::Float(f) => {
            buf.put_f64_le(*f);
            FieldType::Double
        }
        Value::String(s) => {
            buf.put_str_lenenc(s);
            FieldType::VarString
        }
        Value::Bytes(b) => {
            buf.put_bytes_lenenc(b);
            FieldType::Blob
        }
        Value::Temporal(t) => {
            encode_temporal(t, buf);
            FieldType::DateTime
        }
    })
}

fn encode_temporal(t: &MySqlTime, buf: &mut Vec<u8>) {
    let has_micros = t.micros != 0;
    let has_time = has_micros || t.hours != 0 || t.minutes != 0 || t.seconds != 0;

    let len: u8 = if has_micros {
        11
    } else if has_time {
        7
    } else {
        4
    };

    buf.put_u8(len);
    if len == 0 {
        return;
    }

    buf.put_u16_le(t.years);
    buf.put_u8(t.months);
    buf.put_u8(t.days as u8);

    if len >= 7 {
        buf.put_u8(t.hours);
        buf.put_u8(t.minutes);
        buf.put_u8(t.seconds);
    }

    if len >= 11 {
        buf.put_u32_le(t.micros);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_binary_tiny_int() {
        let v = decode_binary_value(FieldType::Tiny, &[200u8.to_le_bytes()[0]]).unwrap();
        assert_eq!(v, Value::Int(-56));
    }

    #[test]
    fn decodes_binary_long_long() {
        let raw = 123456789i64.to_le_bytes();
        let v = decode_binary_value(FieldType::LongLong, &raw).unwrap();
        assert_eq!(v, Value::Int(123456789));
    }

    #[test]
    fn decodes_text_integer_column() {
        let v = decode_text_value(FieldType::Long, b"42").unwrap();
        assert_eq!(v, Value::Int(42));
    }

    #[test]
    fn decodes_text_string_column() {
        let v = decode_text_value(FieldType::VarString, b"hello").unwrap();
        assert_eq!(v, Value::String("hello".to_owned()));
    }

    #[test]
    fn decodes_empty_date_payload_as_zero_date() {
        let v = decode_date_time(&[]).unwrap();
        assert_eq!(v, MySqlTime::default());
    }

    #[test]
    fn decodes_date_only_payload() {
        let mut raw = Vec::new();
        raw.put_u16_le(2024);
        raw.put_u8(3);
        raw.put_u8(15);

        let v = decode_date_time(&raw).unwrap();
        assert_eq!(v.years, 2024);
        assert_eq!(v.months, 3);
        assert_eq!(v.days, 15);
        assert_eq!(v.hours, 0);
    }

    #[test]
    fn round_trips_datetime_with_micros() {
        let t = MySqlTime {
            years: 2024,
            months: 3,
            days: 15,
            hours: 13,
            minutes: 5,
            seconds: 9,
            micros: 500_000,
            is_negative: false,
        };

        let mut buf = Vec::new();
        encode_temporal(&t, &mut buf);

        let len = buf[0] as usize;
        let decoded = decode_date_time(&buf[1..1 + len]).unwrap();
        assert_eq!(decoded, t);
    }

    #[test]
    fn encodes_null_marker_value_type_without_writing_bytes() {
        let mut buf = Vec::new();
        let ty = encode_binary_value(&Value::Null, &mut buf).unwrap();
        assert_eq!(ty, FieldType::Null);
        assert!(buf.is_empty());
    }
}
