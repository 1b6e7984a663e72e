//! flagbind - Type-directed binding of command-line flags onto
//! configuration structs.
//!
//! A configuration type describes itself as a schema: a zero-argument
//! factory plus a table of field descriptors (name, kind, signedness,
//! optionality). The binder walks the process arguments, matches
//! `--name[=value]` flags against the table and coerces raw text into each
//! field's declared type, mutating a factory-produced instance in place.
//! The [`bindable!`] macro generates the struct, the factory and the table
//! from one declaration.

pub mod bind;
pub mod coerce;
pub mod scanner;
pub mod schema;

pub use bind::{bind, bind_from, BindError};
pub use coerce::{coerce, BindField, CoerceError, Value};
pub use scanner::{Flag, Scanner};
pub use schema::{Bindable, FactorySpec, FieldKind, FieldSpec, Schema, SchemaError, Signedness};
