//! Conversion of raw flag text into typed field values.

use crate::schema::{FieldKind, Signedness};
use thiserror::Error;

/// Errors that can occur while coercing a raw value.
#[derive(Debug, Error)]
pub enum CoerceError {
    #[error("invalid numeric value '{value}' for --{field}")]
    NumericConversionFailed { field: &'static str, value: String },

    #[error("--{field} targets a field of unsupported type {type_name}")]
    UnsupportedFieldType {
        field: &'static str,
        type_name: &'static str,
    },
}

/// A coerced value, tagged with the widest carrier for its kind.
///
/// Narrowing to the concrete field width happens in the field's store
/// function, so the coercer never needs to know widths.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Signed(i64),
    Unsigned(u64),
    Float(f64),
    Bool(bool),
    Text(String),
}

/// Convert a raw textual value according to a field's kind.
///
/// Signed integers accept an optional leading sign; unsigned integers
/// reject one. Boolean kind ignores the raw value entirely: the flag's
/// presence is the value. Text is stored verbatim, with no escaping or
/// quoting rules.
pub fn coerce(kind: FieldKind, raw: &str, field: &'static str) -> Result<Value, CoerceError> {
    match kind {
        FieldKind::Int(Signedness::Signed) => raw
            .parse::<i64>()
            .map(Value::Signed)
            .map_err(|_| numeric_error(field, raw)),
        FieldKind::Int(Signedness::Unsigned) => {
            if raw.starts_with(['+', '-']) {
                return Err(numeric_error(field, raw));
            }
            raw.parse::<u64>()
                .map(Value::Unsigned)
                .map_err(|_| numeric_error(field, raw))
        }
        FieldKind::Float => raw
            .parse::<f64>()
            .map(Value::Float)
            .map_err(|_| numeric_error(field, raw)),
        FieldKind::Bool => Ok(Value::Bool(true)),
        FieldKind::Text => Ok(Value::Text(raw.to_string())),
        FieldKind::Unsupported { type_name } => {
            Err(CoerceError::UnsupportedFieldType { field, type_name })
        }
    }
}

fn numeric_error(field: &'static str, raw: &str) -> CoerceError {
    CoerceError::NumericConversionFailed {
        field,
        value: raw.to_string(),
    }
}

// A value variant paired with a foreign kind tag; unreachable through
// tables built with `FieldSpec::new`, which derives both from one impl.
fn kind_mismatch<F>(field: &'static str) -> CoerceError {
    CoerceError::UnsupportedFieldType {
        field,
        type_name: std::any::type_name::<F>(),
    }
}

/// Bridge between a concrete field type and the coercion machinery.
///
/// Implementations supply the kind tag the coercer dispatches on and absorb
/// the coerced value into the concrete type, narrowing where the carrier is
/// wider than the field.
pub trait BindField: Sized {
    /// Kind tag for this field type.
    const KIND: FieldKind;
    /// Whether a matched flag without a value is tolerated.
    const OPTIONAL: bool = false;

    /// Turn a coerced value into this field type.
    fn absorb(value: Value, field: &'static str) -> Result<Self, CoerceError>;
}

macro_rules! bind_signed {
    ($($ty:ty),+) => {$(
        impl BindField for $ty {
            const KIND: FieldKind = FieldKind::Int(Signedness::Signed);

            fn absorb(value: Value, field: &'static str) -> Result<Self, CoerceError> {
                match value {
                    Value::Signed(v) => <$ty>::try_from(v).map_err(|_| {
                        CoerceError::NumericConversionFailed {
                            field,
                            value: v.to_string(),
                        }
                    }),
                    _ => Err(kind_mismatch::<$ty>(field)),
                }
            }
        }
    )+};
}

macro_rules! bind_unsigned {
    ($($ty:ty),+) => {$(
        impl BindField for $ty {
            const KIND: FieldKind = FieldKind::Int(Signedness::Unsigned);

            fn absorb(value: Value, field: &'static str) -> Result<Self, CoerceError> {
                match value {
                    Value::Unsigned(v) => <$ty>::try_from(v).map_err(|_| {
                        CoerceError::NumericConversionFailed {
                            field,
                            value: v.to_string(),
                        }
                    }),
                    _ => Err(kind_mismatch::<$ty>(field)),
                }
            }
        }
    )+};
}

bind_signed! { i8, i16, i32, i64, isize }
bind_unsigned! { u8, u16, u32, u64, usize }

impl BindField for f64 {
    const KIND: FieldKind = FieldKind::Float;

    fn absorb(value: Value, field: &'static str) -> Result<Self, CoerceError> {
        match value {
            Value::Float(v) => Ok(v),
            _ => Err(kind_mismatch::<f64>(field)),
        }
    }
}

impl BindField for f32 {
    const KIND: FieldKind = FieldKind::Float;

    fn absorb(value: Value, field: &'static str) -> Result<Self, CoerceError> {
        match value {
            Value::Float(v) => Ok(v as f32),
            _ => Err(kind_mismatch::<f32>(field)),
        }
    }
}

impl BindField for bool {
    const KIND: FieldKind = FieldKind::Bool;

    fn absorb(value: Value, field: &'static str) -> Result<Self, CoerceError> {
        match value {
            Value::Bool(v) => Ok(v),
            _ => Err(kind_mismatch::<bool>(field)),
        }
    }
}

impl BindField for String {
    const KIND: FieldKind = FieldKind::Text;

    fn absorb(value: Value, field: &'static str) -> Result<Self, CoerceError> {
        match value {
            Value::Text(v) => Ok(v),
            _ => Err(kind_mismatch::<String>(field)),
        }
    }
}

/// An optional field carries the wrapped kind; absence is not an error.
impl<F: BindField> BindField for Option<F> {
    const KIND: FieldKind = F::KIND;
    const OPTIONAL: bool = true;

    fn absorb(value: Value, field: &'static str) -> Result<Self, CoerceError> {
        F::absorb(value, field).map(Some)
    }
}
