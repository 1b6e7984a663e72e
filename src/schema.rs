//! Schema descriptors for bindable configuration types.

use crate::coerce::{BindField, CoerceError, Value};
use std::any::{Any, TypeId};
use thiserror::Error;

/// Errors raised by schema validation.
///
/// All of these are discovered at setup time, before any argument is read,
/// so a malformed configuration type is rejected deterministically
/// regardless of input.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("configuration type {type_name} has no zero-argument factory")]
    MissingFactory { type_name: &'static str },

    #[error("factory for {type_name} takes {count} argument(s); it must take none")]
    FactoryHasArguments { type_name: &'static str, count: usize },

    #[error("factory for {type_name} returns {actual}, not the configuration type")]
    FactoryWrongReturnType {
        type_name: &'static str,
        actual: &'static str,
    },
}

/// Signedness of an integer field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Signedness {
    Signed,
    Unsigned,
}

/// The value kind of a field, driving coercion dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Base-10 integer with the given signedness.
    Int(Signedness),
    /// Decimal or exponential floating point.
    Float,
    /// Presence-is-truth boolean; never takes a value.
    Bool,
    /// Raw text, stored verbatim.
    Text,
    /// A declared field the binder cannot populate. Coercion rejects it,
    /// but only once a flag actually targets the field.
    Unsupported { type_name: &'static str },
}

/// Declaration shape of a configuration type's factory.
///
/// The shape is recorded (arity, output type) rather than held as a bare
/// `fn() -> T`, so every factory failure mode stays representable and
/// [`Schema::validate`] can reject it before anything is invoked.
pub enum FactorySpec {
    /// A callable zero-argument constructor.
    Nullary {
        output: TypeId,
        output_name: &'static str,
        produce: Box<dyn Fn() -> Box<dyn Any>>,
    },
    /// A constructor declared with parameters; never invocable here.
    HasArguments { count: usize },
}

impl FactorySpec {
    /// Describe a zero-argument factory.
    pub fn nullary<R: Any>(factory: fn() -> R) -> Self {
        FactorySpec::Nullary {
            output: TypeId::of::<R>(),
            output_name: std::any::type_name::<R>(),
            produce: Box::new(move || Box::new(factory()) as Box<dyn Any>),
        }
    }

    /// Describe a constructor that takes `count` arguments.
    pub fn with_arguments(count: usize) -> Self {
        FactorySpec::HasArguments { count }
    }
}

/// Read-only descriptor for one bindable field.
pub struct FieldSpec<T> {
    /// Flag name the field answers to.
    pub name: &'static str,
    /// Value kind the coercer dispatches on.
    pub kind: FieldKind,
    /// Whether a matched flag without a value is tolerated.
    pub optional: bool,
    store: Box<dyn Fn(&mut T, Value) -> Result<(), CoerceError>>,
}

impl<T: 'static> FieldSpec<T> {
    /// Describe a field of type `F`, reachable through `access`.
    ///
    /// The kind tag and the store function come from the same [`BindField`]
    /// impl, so they cannot disagree.
    pub fn new<F: BindField + 'static>(name: &'static str, access: fn(&mut T) -> &mut F) -> Self {
        FieldSpec {
            name,
            kind: F::KIND,
            optional: F::OPTIONAL,
            store: Box::new(move |instance, value| {
                *access(instance) = F::absorb(value, name)?;
                Ok(())
            }),
        }
    }

    /// Describe a field whose declared type the binder cannot populate.
    ///
    /// Keeps the table total over a struct's fields; the error fires only
    /// when a flag targets the field.
    pub fn unsupported(name: &'static str, type_name: &'static str) -> Self {
        FieldSpec {
            name,
            kind: FieldKind::Unsupported { type_name },
            optional: false,
            store: Box::new(move |_, _| {
                Err(CoerceError::UnsupportedFieldType {
                    field: name,
                    type_name,
                })
            }),
        }
    }

    /// Apply a coerced value to the in-progress instance.
    pub fn apply(&self, instance: &mut T, value: Value) -> Result<(), CoerceError> {
        (self.store)(instance, value)
    }
}

/// Derived view of a configuration type: its factory plus field table.
///
/// Computed once per bind invocation and not mutated afterwards.
pub struct Schema<T> {
    factory: Option<FactorySpec>,
    fields: Vec<FieldSpec<T>>,
}

impl<T: Any> Schema<T> {
    pub fn new() -> Self {
        Schema {
            factory: None,
            fields: Vec::new(),
        }
    }

    /// Register the factory descriptor.
    pub fn factory(mut self, spec: FactorySpec) -> Self {
        self.factory = Some(spec);
        self
    }

    /// Append a field descriptor.
    pub fn field(mut self, spec: FieldSpec<T>) -> Self {
        self.fields.push(spec);
        self
    }

    /// Run the setup-time factory checks: a factory exists, takes no
    /// arguments, and its recorded output type is exactly `T`.
    pub fn validate(&self) -> Result<(), SchemaError> {
        let type_name = std::any::type_name::<T>();
        match &self.factory {
            None => Err(SchemaError::MissingFactory { type_name }),
            Some(FactorySpec::HasArguments { count }) => Err(SchemaError::FactoryHasArguments {
                type_name,
                count: *count,
            }),
            Some(FactorySpec::Nullary {
                output,
                output_name,
                ..
            }) => {
                if *output != TypeId::of::<T>() {
                    return Err(SchemaError::FactoryWrongReturnType {
                        type_name,
                        actual: *output_name,
                    });
                }
                Ok(())
            }
        }
    }

    /// Invoke the factory and hand back the default instance.
    pub fn instantiate(&self) -> Result<T, SchemaError> {
        let type_name = std::any::type_name::<T>();
        match &self.factory {
            Some(FactorySpec::Nullary {
                produce,
                output_name,
                ..
            }) => produce()
                .downcast::<T>()
                .map(|instance| *instance)
                .map_err(|_| SchemaError::FactoryWrongReturnType {
                    type_name,
                    actual: *output_name,
                }),
            Some(FactorySpec::HasArguments { count }) => Err(SchemaError::FactoryHasArguments {
                type_name,
                count: *count,
            }),
            None => Err(SchemaError::MissingFactory { type_name }),
        }
    }

    /// Linear first-match lookup by flag name.
    pub fn lookup(&self, name: &str) -> Option<&FieldSpec<T>> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// The field table, in declaration order.
    pub fn fields(&self) -> &[FieldSpec<T>] {
        &self.fields
    }
}

impl<T: Any> Default for Schema<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Contract a configuration type exposes to the binder.
///
/// The binder imposes nothing else on its consumer: describe yourself as a
/// schema (factory plus field table). [`bindable!`](crate::bindable) writes
/// impls of this trait for you.
pub trait Bindable: Sized + Any {
    /// Build the schema for this type.
    fn schema() -> Schema<Self>;
}

/// Declare a configuration struct together with its binding schema.
///
/// Generates the struct, a zero-argument `new()` factory from the per-field
/// defaults, a `Default` impl delegating to it, and the [`Bindable`] table.
///
/// ```
/// flagbind::bindable! {
///     pub struct Fetch {
///         retries: u32 = 3,
///         timeout: Option<f64> = None,
///     }
/// }
///
/// let fetch: Fetch =
///     flagbind::bind_from(&["prog".into(), "--retries=5".into()]).unwrap();
/// assert_eq!(fetch.retries, 5);
/// assert_eq!(fetch.timeout, None);
/// ```
#[macro_export]
macro_rules! bindable {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty = $default:expr
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $(#[$field_meta])* $field_vis $field : $ty, )+
        }

        impl $name {
            /// Zero-argument factory producing the declared defaults.
            pub fn new() -> Self {
                Self { $( $field : $default, )+ }
            }
        }

        impl ::core::default::Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl $crate::schema::Bindable for $name {
            fn schema() -> $crate::schema::Schema<Self> {
                $crate::schema::Schema::<Self>::new()
                    .factory($crate::schema::FactorySpec::nullary(Self::new))
                    $(
                        .field($crate::schema::FieldSpec::new(
                            stringify!($field),
                            |config| &mut config.$field,
                        ))
                    )+
            }
        }
    };
}
