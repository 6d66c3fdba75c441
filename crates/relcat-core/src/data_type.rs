//! Engine-neutral column types

use serde::{Deserialize, Serialize};
use std::fmt;

/// A column type in the neutral model.
///
/// Not every backend can store every type; backend type converters reject the
/// ones they cannot encode with `RelcatError::UnsupportedType`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    Boolean,
    /// 8-bit signed integer
    Byte,
    /// 16-bit signed integer
    Short,
    /// 32-bit signed integer
    Integer,
    /// 64-bit signed integer
    Long,
    Float,
    Double,
    Decimal {
        precision: u32,
        scale: u32,
    },
    Date,
    Time,
    Timestamp {
        with_time_zone: bool,
    },
    IntervalDay,
    IntervalYear,
    /// Unbounded character data
    String,
    VarChar {
        length: u32,
    },
    FixedChar {
        length: u32,
    },
    Uuid,
    /// Fixed-length binary
    Fixed {
        length: u32,
    },
    /// Variable binary data
    Binary,
    List {
        element: Box<DataType>,
        element_nullable: bool,
    },
    Map {
        key: Box<DataType>,
        value: Box<DataType>,
        value_nullable: bool,
    },
    Union {
        types: Vec<DataType>,
    },
    Struct {
        fields: Vec<StructField>,
    },
    /// A native type the backend reported but the neutral model has no
    /// equivalent for. Carries the backend's own type string.
    Unparsed(String),
}

/// Field of a `DataType::Struct`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StructField {
    pub name: String,
    pub data_type: DataType,
    pub nullable: bool,
    pub comment: Option<String>,
}

impl StructField {
    pub fn nullable(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            comment: None,
        }
    }

    pub fn not_null(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            nullable: false,
            ..Self::nullable(name, data_type)
        }
    }
}

impl DataType {
    pub fn decimal(precision: u32, scale: u32) -> Self {
        DataType::Decimal { precision, scale }
    }

    pub fn varchar(length: u32) -> Self {
        DataType::VarChar { length }
    }

    pub fn fixed_char(length: u32) -> Self {
        DataType::FixedChar { length }
    }

    pub fn fixed(length: u32) -> Self {
        DataType::Fixed { length }
    }

    pub fn timestamp_without_time_zone() -> Self {
        DataType::Timestamp {
            with_time_zone: false,
        }
    }

    pub fn timestamp_with_time_zone() -> Self {
        DataType::Timestamp {
            with_time_zone: true,
        }
    }

    pub fn list(element: DataType, element_nullable: bool) -> Self {
        DataType::List {
            element: Box::new(element),
            element_nullable,
        }
    }

    pub fn map(key: DataType, value: DataType, value_nullable: bool) -> Self {
        DataType::Map {
            key: Box::new(key),
            value: Box::new(value),
            value_nullable,
        }
    }

    pub fn union(types: Vec<DataType>) -> Self {
        DataType::Union { types }
    }

    pub fn structure(fields: Vec<StructField>) -> Self {
        DataType::Struct { fields }
    }

    /// Whether values of this type are whole numbers
    pub fn is_integral(&self) -> bool {
        matches!(
            self,
            DataType::Byte | DataType::Short | DataType::Integer | DataType::Long
        )
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Boolean => write!(f, "boolean"),
            DataType::Byte => write!(f, "byte"),
            DataType::Short => write!(f, "short"),
            DataType::Integer => write!(f, "integer"),
            DataType::Long => write!(f, "long"),
            DataType::Float => write!(f, "float"),
            DataType::Double => write!(f, "double"),
            DataType::Decimal { precision, scale } => write!(f, "decimal({},{})", precision, scale),
            DataType::Date => write!(f, "date"),
            DataType::Time => write!(f, "time"),
            DataType::Timestamp { with_time_zone } => {
                if *with_time_zone {
                    write!(f, "timestamp_tz")
                } else {
                    write!(f, "timestamp")
                }
            }
            DataType::IntervalDay => write!(f, "interval_day"),
            DataType::IntervalYear => write!(f, "interval_year"),
            DataType::String => write!(f, "string"),
            DataType::VarChar { length } => write!(f, "varchar({})", length),
            DataType::FixedChar { length } => write!(f, "char({})", length),
            DataType::Uuid => write!(f, "uuid"),
            DataType::Fixed { length } => write!(f, "fixed({})", length),
            DataType::Binary => write!(f, "binary"),
            DataType::List { element, .. } => write!(f, "list<{}>", element),
            DataType::Map { key, value, .. } => write!(f, "map<{},{}>", key, value),
            DataType::Union { types } => {
                let names: Vec<String> = types.iter().map(|t| t.to_string()).collect();
                write!(f, "union<{}>", names.join(","))
            }
            DataType::Struct { fields } => {
                let fields: Vec<String> = fields
                    .iter()
                    .map(|field| {
                        let mut s = format!("{}:{}", field.name, field.data_type);
                        if !field.nullable {
                            s.push_str(" NOT NULL");
                        }
                        s
                    })
                    .collect();
                write!(f, "struct<{}>", fields.join(","))
            }
            DataType::Unparsed(native) => write!(f, "unparsed({})", native),
        }
    }
}
