/// The width class a [`FieldType`] decodes/encodes as on the wire, used by
/// both the binary-protocol row decoder (§4.3) and the statement-execute
/// parameter serializer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidthClass {
    FixedInt(u8),
    FixedFloat(u8),
    LenencString,
    LenencBytes,
    Temporal,
}

/// A MySQL column type code, tagged with its binary-encoding width class.
///
/// See <https://dev.mysql.com/doc/dev/mysql-server/latest/binary__log__types_8h.html>.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum FieldType {
    Decimal,
    Tiny,
    Short,
    Long,
    Float,
    Double,
    Null,
    Timestamp,
    LongLong,
    Int24,
    Date,
    Time,
    DateTime,
    Year,
    NewDate,
    VarChar,
    Bit,
    Json,
    NewDecimal,
    Enum,
    Set,
    TinyBlob,
    MediumBlob,
    LongBlob,
    Blob,
    VarString,
    String,
    Geometry,
    Unknown(u8),
}

impl FieldType {
    pub fn from_code(code: u8) -> FieldType {
        match code {
            0 => FieldType::Decimal,
            1 => FieldType::Tiny,
            2 => FieldType::Short,
            3 => FieldType::Long,
            4 => FieldType::Float,
            5 => FieldType::Double,
            6 => FieldType::Null,
            7 => FieldType::Timestamp,
            8 => FieldType::LongLong,
            9 => FieldType::Int24,
            10 => FieldType::Date,
            11 => FieldType::Time,
            12 => FieldType::DateTime,
            13 => FieldType::Year,
            14 => FieldType::NewDate,
            15 => FieldType::VarChar,
            16 => FieldType::Bit,
            245 => FieldType::Json,
            246 => FieldType::NewDecimal,
            247 => FieldType::Enum,
            248 => FieldType::Set,
            249 => FieldType::TinyBlob,
            250 => FieldType::MediumBlob,
            251 => FieldType::LongBlob,
            252 => FieldType::Blob,
            253 => FieldType::VarString,
            254 => FieldType::String,
            255 => FieldType::Geometry,
            other => FieldType::Unknown(other),
        }
    }

    pub fn code(self) -> u8 {
        match self {
            FieldType::Decimal => 0,
            FieldType::Tiny => 1,
            FieldType::Short => 2,
            FieldType::Long => 3,
            FieldType::Float => 4,
            FieldType::Double => 5,
            FieldType::Null => 6,
            FieldType::Timestamp => 7,
            FieldType::LongLong => 8,
            FieldType::Int24 => 9,
            FieldType::Date => 10,
            FieldType::Time => 11,
            FieldType::DateTime => 12,
            FieldType::Year => 13,
            FieldType::NewDate => 14,
            FieldType::VarChar => 15,
            FieldType::Bit => 16,
            FieldType::Json => 245,
            FieldType::NewDecimal => 246,
            FieldType::Enum => 247,
            FieldType::Set => 248,
            FieldType::TinyBlob => 249,
            FieldType::MediumBlob => 250,
            FieldType::LongBlob => 251,
            FieldType::Blob => 252,
            FieldType::VarString => 253,
            FieldType::String => 254,
            FieldType::Geometry => 255,
            FieldType::Unknown(other) => other,
        }
    }

    /// The shape this type takes in the binary result-row / statement-execute
    /// encoding.
    pub fn width_class(self) -> WidthClass {
        match self {
            FieldType::Tiny => WidthClass::FixedInt(1),
            FieldType::Short | FieldType::Year => WidthClass::FixedInt(2),
            FieldType::Long | FieldType::Int24 => WidthClass::FixedInt(4),
            FieldType::LongLong => WidthClass::FixedInt(8),
            FieldType::Float => WidthClass::FixedFloat(4),
            FieldType::Double => WidthClass::FixedFloat(8),
            FieldType::Date | FieldType::DateTime | FieldType::Timestamp | FieldType::Time => {
                WidthClass::Temporal
            }
            FieldType::TinyBlob
            | FieldType::MediumBlob
            | FieldType::LongBlob
            | FieldType::Blob
            | FieldType::VarString
            | FieldType::String
            | FieldType::VarChar
            | FieldType::Json
            | FieldType::NewDecimal
            | FieldType::Decimal
            | FieldType::Enum
            | FieldType::Set
            | FieldType::Bit
            | FieldType::Geometry => WidthClass::LenencBytes,
            FieldType::Null => WidthClass::LenencBytes,
            FieldType::NewDate | FieldType::Unknown(_) => WidthClass::LenencString,
        }
    }
}
