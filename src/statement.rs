//! `PreparedStatement` and parameter binding (§3, §4.5).

use std::sync::Arc;

use crate::column::Column;
use crate::error::Error;
use crate::protocol::FieldType;
use crate::value::{encode_binary_value, Value};

/// A statement prepared on a specific connection. Using it against a
/// different connection is a caller error the higher-level API is expected
/// to reject before this type is ever constructed for the wrong connection.
#[derive(Debug, Clone)]
pub struct PreparedStatement {
    pub id: u32,
    pub parameters: Arc<[Column]>,
    pub columns: Arc<[Column]>,
}

/// The values to bind to one execution of a [`PreparedStatement`].
#[derive(Debug, Default)]
pub struct Bind {
    values: Vec<Value>,
}

impl Bind {
    pub fn new() -> Bind {
        Bind { values: Vec::new() }
    }

    pub fn push(&mut self, value: impl Into<Value>) -> &mut Self {
        self.values.push(value.into());
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Whether `bound` may be assigned to a parameter declared as `declared`,
/// per the fixed compatibility table in §4.5/§6. NULL is always
/// assignable; this function does not by itself check nullability of the
/// declared parameter (the server enforces that).
fn is_assignable(bound: &Value, declared: FieldType) -> bool {
    if matches!(bound, Value::Null) {
        return true;
    }

    let declared_is_integer = matches!(
        declared,
        FieldType::Tiny
            | FieldType::Short
            | FieldType::Int24
            | FieldType::Long
            | FieldType::LongLong
            | FieldType::Year
    );
    let declared_is_float = matches!(declared, FieldType::Float | FieldType::Double | FieldType::NewDecimal | FieldType::Decimal);
    let declared_is_string = matches!(
        declared,
        FieldType::VarChar | FieldType::VarString | FieldType::String | FieldType::Enum | FieldType::Set | FieldType::Json
    );
    let declared_is_bytes = matches!(
        declared,
        FieldType::TinyBlob | FieldType::MediumBlob | FieldType::LongBlob | FieldType::Blob | FieldType::Bit | FieldType::Geometry
    );
    let declared_is_temporal = matches!(declared, FieldType::Date | FieldType::DateTime | FieldType::Timestamp | FieldType::Time);

    match bound {
        Value::Null => true,
        Value::Int(_) | Value::UInt(_) => declared_is_integer || declared_is_float,
        Value::Float(_) => declared_is_float,
        Value::String(_) => declared_is_string,
        Value::Bytes(_) => declared_is_bytes,
        Value::Temporal(_) => declared_is_temporal,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Int(_) => "int",
        Value::UInt(_) => "uint",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::Bytes(_) => "bytes",
        Value::Temporal(_) => "temporal",
    }
}

fn declared_type_name(field_type: FieldType) -> &'static str {
    match field_type {
        FieldType::Tiny | FieldType::Short | FieldType::Int24 | FieldType::Long | FieldType::LongLong | FieldType::Year => "int",
        FieldType::Float | FieldType::Double | FieldType::NewDecimal | FieldType::Decimal => "float",
        FieldType::VarChar | FieldType::VarString | FieldType::String | FieldType::Enum | FieldType::Set | FieldType::Json => "string",
        FieldType::TinyBlob | FieldType::MediumBlob | FieldType::LongBlob | FieldType::Blob | FieldType::Bit | FieldType::Geometry => "bytes",
        FieldType::Date | FieldType::DateTime | FieldType::Timestamp | FieldType::Time => "temporal",
        _ => "unknown",
    }
}

/// Validates a [`Bind`] against the statement's declared parameters and,
/// if it checks out, serializes the binary-protocol payload: the NULL
/// bitmap, the type tags, and the concatenated encoded values — everything
/// [`crate::protocol::ComStmtExecute`] needs besides the statement id.
pub struct EncodedParams {
    pub null_bitmap: Vec<u8>,
    pub param_types: Vec<crate::protocol::ParamType>,
    pub values: Vec<u8>,
}

pub fn encode_bind(statement: &PreparedStatement, bind: &Bind) -> Result<EncodedParams, Error> {
    let expected = statement.parameters.len();
    let got = bind.values.len();

    if got > expected {
        return Err(Error::TooManyParametersBound { expected, got });
    }
    if got < expected {
        return Err(Error::NotEnoughParametersBound { expected, got });
    }

    for (i, (value, column)) in bind.values.iter().zip(statement.parameters.iter()).enumerate() {
        if !is_assignable(value, column.field_type) {
            let _ = i;
            return Err(Error::InvalidTypeBound {
                got: type_name(value).to_owned(),
                expected: declared_type_name(column.field_type).to_owned(),
            });
        }
    }

    let null_bitmap_len = (expected + 7) / 8;
    let mut null_bitmap = vec![0u8; null_bitmap_len];
    let mut param_types = Vec::with_capacity(expected);
    let mut values = Vec::new();

    for (i, (value, column)) in bind.values.iter().zip(statement.parameters.iter()).enumerate() {
        if value.is_null() {
            null_bitmap[i / 8] |= 1 << (i % 8);
            param_types.push(crate::protocol::ParamType {
                field_type: FieldType::Null,
                is_unsigned: column.is_unsigned(),
            });
            continue;
        }

        let encoded_type = encode_binary_value(value, &mut values)?;
        param_types.push(crate::protocol::ParamType {
            field_type: encoded_type,
            is_unsigned: column.is_unsigned(),
        });
    }

    Ok(EncodedParams {
        null_bitmap,
        param_types,
        values,
    })
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int(v)
    }
}

impl From<u64> for Value {
    fn from(v: u64) -> Self {
        Value::UInt(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_owned())
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        match v {
            Some(v) => v.into(),
            None => Value::Null,
        }
    }
}
