//! The binding driver: scanner, schema and coercer tied together.

use crate::coerce::{coerce, CoerceError, Value};
use crate::scanner::Scanner;
use crate::schema::{Bindable, FieldKind, SchemaError};
use thiserror::Error;

/// Errors surfaced by a bind operation.
///
/// All are terminal: the first one aborts the whole parse and no partial
/// instance is returned.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("invalid schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("failed to coerce value: {0}")]
    Coerce(#[from] CoerceError),

    #[error("missing value for required flag --{flag}")]
    RequiredValueMissing { flag: &'static str },
}

/// Bind a configuration instance from an explicit argument sequence.
///
/// `args[0]` is the invocation name and is never inspected. Unknown flags
/// and everything from the first non-flag token onwards are silently
/// ignored; fields never targeted by a flag keep their factory defaults.
pub fn bind_from<T: Bindable>(args: &[String]) -> Result<T, BindError> {
    let schema = T::schema();
    schema.validate()?;
    let mut config = schema.instantiate()?;

    for flag in Scanner::new(args) {
        let field = match schema.lookup(flag.name) {
            Some(field) => field,
            None => continue,
        };

        // Presence alone is the value for booleans; any raw value the
        // scanner picked up is discarded.
        if field.kind == FieldKind::Bool {
            field.apply(&mut config, Value::Bool(true))?;
            continue;
        }

        let raw = match flag.value {
            Some(raw) => raw,
            None if field.optional => continue,
            None => return Err(BindError::RequiredValueMissing { flag: field.name }),
        };

        let value = coerce(field.kind, raw, field.name)?;
        field.apply(&mut config, value)?;
    }

    Ok(config)
}

/// Bind a configuration instance from the process arguments.
///
/// The argument snapshot lives only for the duration of the call.
pub fn bind<T: Bindable>() -> Result<T, BindError> {
    let args: Vec<String> = std::env::args().collect();
    bind_from(&args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindable;
    use crate::schema::{FactorySpec, FieldSpec, Schema};

    bindable! {
        #[derive(Debug, PartialEq)]
        struct Probe {
            count: u8 = 0,
            offset: i32 = -1,
            rate: f64 = 1.5,
            verbose: bool = false,
            label: String = String::new(),
            name: Option<String> = None,
            limit: Option<u32> = None,
        }
    }

    fn args(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn test_zero_arguments_returns_factory_defaults() {
        let probe: Probe = bind_from(&args(&["prog"])).unwrap();
        assert_eq!(probe, Probe::new());
    }

    #[test]
    fn test_integer_flag_equals_form() {
        let probe: Probe = bind_from(&args(&["prog", "--count=5"])).unwrap();
        assert_eq!(probe.count, 5);
    }

    #[test]
    fn test_integer_flag_two_token_form() {
        let probe: Probe = bind_from(&args(&["prog", "--count", "7"])).unwrap();
        assert_eq!(probe.count, 7);
    }

    #[test]
    fn test_required_flag_without_value_errors() {
        let result: Result<Probe, _> = bind_from(&args(&["prog", "--count"]));
        assert!(matches!(
            result,
            Err(BindError::RequiredValueMissing { flag: "count" })
        ));
    }

    #[test]
    fn test_signed_field_accepts_negative_value() {
        let probe: Probe = bind_from(&args(&["prog", "--offset=-12"])).unwrap();
        assert_eq!(probe.offset, -12);
    }

    #[test]
    fn test_float_field_accepts_exponent() {
        let probe: Probe = bind_from(&args(&["prog", "--rate=2.5e-1"])).unwrap();
        assert_eq!(probe.rate, 0.25);
    }

    #[test]
    fn test_boolean_flag_sets_true() {
        let probe: Probe = bind_from(&args(&["prog", "--verbose"])).unwrap();
        assert!(probe.verbose);
    }

    #[test]
    fn test_boolean_flag_ignores_equals_value() {
        let probe: Probe = bind_from(&args(&["prog", "--verbose=no"])).unwrap();
        assert!(probe.verbose);
    }

    #[test]
    fn test_boolean_flag_swallows_following_token() {
        // The scanner grabs the next token as the raw value before the
        // driver knows the field is boolean; the value is discarded and
        // the swallowed flag never binds.
        let probe: Probe = bind_from(&args(&["prog", "--verbose", "--count=9"])).unwrap();
        assert!(probe.verbose);
        assert_eq!(probe.count, 0);
    }

    #[test]
    fn test_string_field_stored_verbatim() {
        let probe: Probe = bind_from(&args(&["prog", "--label", "hello $USER!"])).unwrap();
        assert_eq!(probe.label, "hello $USER!");
    }

    #[test]
    fn test_optional_field_defaults_when_absent() {
        let probe: Probe = bind_from(&args(&["prog", "--count=1"])).unwrap();
        assert_eq!(probe.name, None);
    }

    #[test]
    fn test_optional_field_binds_value() {
        let probe: Probe = bind_from(&args(&["prog", "--name=bob"])).unwrap();
        assert_eq!(probe.name, Some("bob".to_string()));
    }

    #[test]
    fn test_optional_flag_without_value_keeps_default() {
        let probe: Probe = bind_from(&args(&["prog", "--limit"])).unwrap();
        assert_eq!(probe.limit, None);
    }

    #[test]
    fn test_numeric_conversion_failure() {
        let result: Result<Probe, _> = bind_from(&args(&["prog", "--count=abc"]));
        assert!(matches!(
            result,
            Err(BindError::Coerce(CoerceError::NumericConversionFailed {
                field: "count",
                ..
            }))
        ));
    }

    #[test]
    fn test_narrowing_overflow_fails() {
        let result: Result<Probe, _> = bind_from(&args(&["prog", "--count=300"]));
        assert!(matches!(
            result,
            Err(BindError::Coerce(CoerceError::NumericConversionFailed { .. }))
        ));
    }

    #[test]
    fn test_unknown_flag_is_ignored() {
        let probe: Probe = bind_from(&args(&["prog", "--unknownflag=1"])).unwrap();
        assert_eq!(probe, Probe::new());
    }

    #[test]
    fn test_unknown_flag_two_token_form_swallows_its_value() {
        let probe: Probe = bind_from(&args(&["prog", "--unknown", "x", "--count=3"])).unwrap();
        assert_eq!(probe.count, 3);
    }

    #[test]
    fn test_non_flag_token_ends_binding() {
        let probe: Probe = bind_from(&args(&["prog", "stop", "--count=5"])).unwrap();
        assert_eq!(probe.count, 0);
    }

    #[test]
    fn test_first_error_aborts_the_parse() {
        let result: Result<Probe, _> = bind_from(&args(&["prog", "--rate=fast", "--count=5"]));
        assert!(matches!(result, Err(BindError::Coerce(_))));
    }

    #[derive(Debug)]
    struct Mismatched {
        count: u8,
    }

    struct Decoy;

    impl Bindable for Mismatched {
        fn schema() -> Schema<Self> {
            Schema::new()
                .factory(FactorySpec::nullary(|| Decoy))
                .field(FieldSpec::new("count", |m| &mut m.count))
        }
    }

    #[test]
    fn test_wrong_factory_return_type_rejected_before_any_argument() {
        // Rejected even with zero arguments supplied
        let result: Result<Mismatched, _> = bind_from(&args(&["prog"]));
        assert!(matches!(
            result,
            Err(BindError::Schema(SchemaError::FactoryWrongReturnType { .. }))
        ));
    }

    #[derive(Debug)]
    struct Factoryless {
        count: u8,
    }

    impl Bindable for Factoryless {
        fn schema() -> Schema<Self> {
            Schema::new().field(FieldSpec::new("count", |f| &mut f.count))
        }
    }

    #[test]
    fn test_missing_factory_rejected_before_any_argument() {
        let result: Result<Factoryless, _> = bind_from(&args(&["prog"]));
        assert!(matches!(
            result,
            Err(BindError::Schema(SchemaError::MissingFactory { .. }))
        ));
    }

    #[derive(Debug)]
    struct Holder {
        blob: Vec<u8>,
        size: u64,
    }

    impl Bindable for Holder {
        fn schema() -> Schema<Self> {
            Schema::new()
                .factory(FactorySpec::nullary(|| Holder {
                    blob: Vec::new(),
                    size: 0,
                }))
                .field(FieldSpec::unsupported("blob", "Vec<u8>"))
                .field(FieldSpec::new("size", |h| &mut h.size))
        }
    }

    #[test]
    fn test_unsupported_field_only_errors_when_targeted() {
        let holder: Holder = bind_from(&args(&["prog", "--size=16"])).unwrap();
        assert_eq!(holder.size, 16);
        assert!(holder.blob.is_empty());

        let result: Result<Holder, _> = bind_from(&args(&["prog", "--blob=1"]));
        assert!(matches!(
            result,
            Err(BindError::Coerce(CoerceError::UnsupportedFieldType {
                field: "blob",
                ..
            }))
        ));
    }
}
