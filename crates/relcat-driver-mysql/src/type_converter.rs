//! Mapping between neutral `DataType`s and MySQL column types

use relcat_core::{DataType, RelcatError, Result};

/// The `information_schema.COLUMNS` fields that describe a column's type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MySqlTypeDescriptor {
    /// `DATA_TYPE`, e.g. `varchar`
    pub data_type: String,
    /// `COLUMN_TYPE`, e.g. `varchar(255)` or `int unsigned`
    pub column_type: String,
    pub character_maximum_length: Option<u64>,
    pub numeric_precision: Option<u64>,
    pub numeric_scale: Option<u64>,
}

impl MySqlTypeDescriptor {
    /// Descriptor for a column whose `DATA_TYPE` and `COLUMN_TYPE` agree
    pub fn simple(data_type: &str) -> Self {
        Self {
            data_type: data_type.to_string(),
            column_type: data_type.to_string(),
            ..Self::default()
        }
    }
}

/// Render the MySQL column type for a neutral type.
///
/// Fails with `UnsupportedType` for types MySQL cannot store natively.
pub fn to_mysql_type(data_type: &DataType) -> Result<String> {
    let sql = match data_type {
        DataType::Byte => "tinyint".to_string(),
        DataType::Short => "smallint".to_string(),
        DataType::Integer => "int".to_string(),
        DataType::Long => "bigint".to_string(),
        DataType::Float => "float".to_string(),
        DataType::Double => "double".to_string(),
        DataType::Decimal { precision, scale } => format!("decimal({},{})", precision, scale),
        DataType::Date => "date".to_string(),
        DataType::Time => "time".to_string(),
        DataType::Timestamp {
            with_time_zone: false,
        } => "datetime".to_string(),
        DataType::VarChar { length } => format!("varchar({})", length),
        DataType::FixedChar { length } => format!("char({})", length),
        DataType::String => "text".to_string(),
        DataType::Binary => "binary".to_string(),
        DataType::Unparsed(native) => native.clone(),
        DataType::Boolean
        | DataType::Timestamp {
            with_time_zone: true,
        }
        | DataType::IntervalDay
        | DataType::IntervalYear
        | DataType::Uuid
        | DataType::Fixed { .. }
        | DataType::List { .. }
        | DataType::Map { .. }
        | DataType::Union { .. }
        | DataType::Struct { .. } => {
            return Err(RelcatError::UnsupportedType(data_type.clone()));
        }
    };
    Ok(sql)
}

/// Render the type of a column that already exists on the server and is
/// being re-declared unchanged.
///
/// A native `timestamp` column loads as `Timestamp { with_time_zone: true }`,
/// which cannot be requested for new columns but must be written back as is.
pub fn to_existing_mysql_type(data_type: &DataType) -> Result<String> {
    match data_type {
        DataType::Timestamp {
            with_time_zone: true,
        } => Ok("timestamp".to_string()),
        other => to_mysql_type(other),
    }
}

/// Decode a catalog type description into a neutral type.
///
/// Never fails: anything without a neutral equivalent (unsigned integers,
/// enums, fractional-second temporals, ...) comes back as
/// `DataType::Unparsed` carrying `COLUMN_TYPE`.
pub fn from_mysql_type(descriptor: &MySqlTypeDescriptor) -> DataType {
    let data_type = descriptor.data_type.to_ascii_lowercase();
    let column_type = descriptor.column_type.to_ascii_lowercase();
    let unparsed = || DataType::Unparsed(descriptor.column_type.clone());

    if column_type.contains("unsigned") || column_type.contains("zerofill") {
        return unparsed();
    }

    match data_type.as_str() {
        "tinyint" => DataType::Byte,
        "smallint" => DataType::Short,
        "int" | "integer" => DataType::Integer,
        "bigint" => DataType::Long,
        // explicit (M,D) would be lost on the way back out
        "float" | "double" if column_type != data_type => unparsed(),
        "float" => DataType::Float,
        "double" => DataType::Double,
        "decimal" => {
            let (precision, scale) = match (descriptor.numeric_precision, descriptor.numeric_scale)
            {
                (Some(p), Some(s)) => (u32::try_from(p).ok(), u32::try_from(s).ok()),
                _ => parse_precision_scale(&column_type),
            };
            match (precision, scale) {
                (Some(precision), Some(scale)) => DataType::Decimal { precision, scale },
                _ => unparsed(),
            }
        }
        "date" => DataType::Date,
        // fractional-second precision has no neutral equivalent
        "time" | "datetime" | "timestamp" if column_type != data_type => unparsed(),
        "time" => DataType::Time,
        "datetime" => DataType::Timestamp {
            with_time_zone: false,
        },
        "timestamp" => DataType::Timestamp {
            with_time_zone: true,
        },
        "varchar" => match char_length(descriptor, &column_type) {
            Some(length) => DataType::VarChar { length },
            None => unparsed(),
        },
        "char" => match char_length(descriptor, &column_type) {
            Some(length) => DataType::FixedChar { length },
            None => unparsed(),
        },
        "text" => DataType::String,
        "binary" => match char_length(descriptor, &column_type) {
            None | Some(1) => DataType::Binary,
            Some(_) => unparsed(),
        },
        _ => unparsed(),
    }
}

fn char_length(descriptor: &MySqlTypeDescriptor, column_type: &str) -> Option<u32> {
    descriptor
        .character_maximum_length
        .and_then(|l| u32::try_from(l).ok())
        .or_else(|| parse_precision_scale(column_type).0)
}

/// Parse `name(a)` or `name(a,b)` arguments
fn parse_precision_scale(column_type: &str) -> (Option<u32>, Option<u32>) {
    let Some(args) = column_type
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(args, _)| args)
    else {
        return (None, None);
    };
    let mut parts = args.split(',').map(|p| p.trim().parse::<u32>().ok());
    let first = parts.next().flatten();
    let second = parts.next().flatten();
    (first, second)
}
