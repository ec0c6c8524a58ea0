#![forbid(unsafe_code)]

mod error;
mod introspection;
mod registry;
mod type_ext;
mod value_ext;

pub use error::SchemaError;
pub use registry::{
    Deprecation, MetaEnumValue, MetaField, MetaInputValue, MetaType, OperationKind, Registry,
    RootMap, TypeKind,
};
pub use type_ext::{ScalarKind, TypeExt, TypeRef};
pub use value_ext::ValueExt;
