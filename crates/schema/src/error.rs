use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("{0}")]
    Parse(#[from] parser::Error),

    #[error("Must provide only one schema definition.")]
    SchemaDefinedMoreThanOnce,

    #[error("Type \"{type_name}\" was defined more than once.")]
    TypeDefinedMoreThanOnce { type_name: String },

    #[error("Specified {operation} type \"{type_name}\" not found in document.")]
    RootTypeNotFound {
        operation: &'static str,
        type_name: String,
    },

    #[error("Type \"{type_name}\" definition conflicted.")]
    DefinitionConflicted { type_name: String },

    #[error("Field \"{type_name}.{field_name}\" definition conflicted.")]
    FieldConflicted {
        type_name: String,
        field_name: String,
    },

    #[error("Invalid introspection result: {0}")]
    IntrospectionFormat(#[from] serde_json::Error),

    #[error("Invalid introspection result: {message}")]
    InvalidIntrospection { message: String },

    #[error("Unknown type \"{type_name}\" referenced by \"{referenced_by}\".")]
    UnknownType {
        type_name: String,
        referenced_by: String,
    },
}
