//! The caller-visible [`Row`] (§3, §6): a name-keyed view over decoded
//! [`Value`]s, built once per row from the column list negotiated for the
//! result set.

use std::sync::Arc;

use crate::column::Column;
use crate::error::Error;
use crate::value::Value;

/// A single result row. Cheap to pass around: columns are shared via `Arc`
/// across every row of the same result set.
#[derive(Debug, Clone)]
pub struct Row {
    columns: Arc<[Column]>,
    values: Vec<Value>,
}

impl Row {
    pub(crate) fn new(columns: Arc<[Column]>, values: Vec<Value>) -> Row {
        Row { columns, values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn get_by_index(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Looks up a value by column name. When the result set has duplicate
    /// column names (e.g. a `JOIN` on two tables with the same column),
    /// the first matching column wins, mirroring how most MySQL client
    /// libraries resolve name collisions.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        let ordinal = self.columns.iter().position(|c| c.name == name)?;
        self.values.get(ordinal)
    }

    pub fn try_get<T: FromValue>(&self, name: &str) -> Result<T, Error> {
        let value = self
            .get_by_name(name)
            .ok_or_else(|| Error::InvalidBinding { for_: usize::MAX })?;

        T::from_value(value)
    }
}

/// Converts a decoded [`Value`] into a caller-requested Rust type, applying
/// the widening/narrowing rules from §6: integer→integer if representable,
/// integer→string via decimal, string→integer by strict parse, NULL only
/// into an `Option`.
pub trait FromValue: Sized {
    fn from_value(value: &Value) -> Result<Self, Error>;
}

macro_rules! impl_from_value_int {
    ($ty:ty) => {
        impl FromValue for $ty {
            fn from_value(value: &Value) -> Result<Self, Error> {
                match value {
                    Value::Int(n) => <$ty>::try_from(*n).map_err(|_| Error::InvalidTypeBound {
                        got: "int".into(),
                        expected: stringify!($ty).into(),
                    }),
                    Value::UInt(n) => <$ty>::try_from(*n).map_err(|_| Error::InvalidTypeBound {
                        got: "uint".into(),
                        expected: stringify!($ty).into(),
                    }),
                    Value::String(s) => s.parse::<$ty>().map_err(|_| Error::InvalidTypeBound {
                        got: "string".into(),
                        expected: stringify!($ty).into(),
                    }),
                    other => Err(Error::InvalidTypeBound {
                        got: format!("{:?}", other),
                        expected: stringify!($ty).into(),
                    }),
                }
            }
        }
    };
}

impl_from_value_int!(i8);
impl_from_value_int!(i16);
impl_from_value_int!(i32);
impl_from_value_int!(i64);
impl_from_value_int!(u8);
impl_from_value_int!(u16);
impl_from_value_int!(u32);
impl_from_value_int!(u64);

impl FromValue for String {
    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Int(n) => Ok(n.to_string()),
            Value::UInt(n) => Ok(n.to_string()),
            Value::Float(f) => Ok(f.to_string()),
            other => Err(Error::InvalidTypeBound {
                got: format!("{:?}", other),
                expected: "string".into(),
            }),
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Float(f) => Ok(*f),
            Value::Int(n) => Ok(*n as f64),
            Value::UInt(n) => Ok(*n as f64),
            Value::String(s) => s.parse::<f64>().map_err(|_| Error::InvalidTypeBound {
                got: "string".into(),
                expected: "f64".into(),
            }),
            other => Err(Error::InvalidTypeBound {
                got: format!("{:?}", other),
                expected: "f64".into(),
            }),
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: &Value) -> Result<Self, Error> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{FieldFlags, FieldType};

    fn row_with(names_and_values: Vec<(&str, Value)>) -> Row {
        let columns: Arc<[Column]> = names_and_values
            .iter()
            .enumerate()
            .map(|(i, (name, _))| Column {
                name: (*name).to_owned(),
                ordinal: i,
                field_type: FieldType::VarString,
                flags: FieldFlags::empty(),
                max_size: 0,
                decimals: 0,
            })
            .collect();

        let values = names_and_values.into_iter().map(|(_, v)| v).collect();
        Row::new(columns, values)
    }

    #[test]
    fn duplicate_column_names_resolve_to_first() {
        let row = row_with(vec![
            ("id", Value::Int(1)),
            ("id", Value::Int(2)),
        ]);

        assert_eq!(row.get_by_name("id"), Some(&Value::Int(1)));
    }

    #[test]
    fn integer_widens_to_requested_int_type() {
        let row = row_with(vec![("n", Value::Int(42))]);
        let v: i32 = row.try_get("n").unwrap();
        assert_eq!(v, 42);
    }

    #[test]
    fn out_of_range_integer_narrowing_is_invalid_type_bound() {
        let row = row_with(vec![("n", Value::Int(1000))]);
        let err = row.try_get::<i8>("n").unwrap_err();
        assert!(matches!(err, Error::InvalidTypeBound { .. }));
    }

    #[test]
    fn null_converts_only_into_option() {
        let row = row_with(vec![("n", Value::Null)]);
        let v: Option<i32> = row.try_get("n").unwrap();
        assert_eq!(v, None);

        let err = row.try_get::<i32>("n").unwrap_err();
        assert!(matches!(err, Error::InvalidTypeBound { .. }));
    }

    #[test]
    fn string_parses_strictly_into_integer() {
        let row = row_with(vec![("n", Value::String("123".into()))]);
        let v: i64 = row.try_get("n").unwrap();
        assert_eq!(v, 123);

        let row = row_with(vec![("n", Value::String("abc".into()))]);
        assert!(row.try_get::<i64>("n").is_err());
    }
}
