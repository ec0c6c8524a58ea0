use thiserror::Error;

#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum FixtureError {
    #[error("{name} can't be null")]
    CannotBeNull { name: String },

    #[error("{name} fixture is not an array and it should be one.")]
    NotAnArray { name: String },

    #[error("{name} is not the same type as the document.")]
    NotSameType { name: String },

    #[error("{key} fixture is not the same type as the document")]
    UnknownKey { key: String },

    #[error("Cannot return null for non-nullable field {type_name}.{field}.")]
    NonNullable { type_name: String, field: String },
}
