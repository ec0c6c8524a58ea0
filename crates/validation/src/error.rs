use graphmock_schema::OperationKind;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("{0}")]
    Parse(#[from] parser::Error),

    #[error("The document does not contain any operation.")]
    NoOperation,

    #[error("Unknown operation named \"{name}\".")]
    UnknownOperation { name: String },

    #[error("Operation name required in the request.")]
    OperationNameRequired,

    #[error("Variables are missing")]
    MissingVariables,

    #[error("Variable \"${name}\" is not defined.")]
    UndefinedVariable { name: String },

    #[error("Variable \"${name}\" is never used.")]
    UnusedVariable { name: String },

    #[error("Unknown fragment \"{name}\".")]
    UnknownFragment { name: String },

    #[error("Cannot spread fragment \"{name}\" within itself.")]
    FragmentCycle { name: String },

    #[error("There is no {kind} type on the Schema")]
    MissingRootType { kind: OperationKind },

    #[error("There is no {kind} called {name} on the Schema")]
    UnknownOperationField { kind: OperationKind, name: String },

    #[error("Invalid field {field} on {operation}")]
    InvalidField { field: String, operation: String },

    #[error("{operation}: Must select field on {field}")]
    MustSelectField { operation: String, field: String },

    #[error("{operation}: Field {field} must not have a selection since type \"{type_name}\" has no subfields")]
    LeafSelection {
        operation: String,
        field: String,
        type_name: String,
    },

    #[error("There is no type {type_name} on the Schema")]
    UnknownType { type_name: String },

    #[error("Fragment cannot be spread here as objects of type \"{parent}\" can never be of type \"{type_name}\".")]
    FragmentTypeMismatch { parent: String, type_name: String },

    #[error("{argument} argument is missing on {field}")]
    ArgumentMissing { argument: String, field: String },

    #[error("{argument} argument is not type {type_name}")]
    ArgumentType { argument: String, type_name: String },

    #[error("{argument} must be an Array on {field}")]
    ArgumentNotArray { argument: String, field: String },

    #[error("{argument} argument is not defined on {field} arguments")]
    UnknownArgument { argument: String, field: String },

    #[error("The input value on {field} must be an array")]
    InputNotArray { field: String },

    #[error("The input value on {field} must be an object")]
    InputNotObject { field: String },

    #[error("{key} is not defined on {field} Input")]
    UnknownInputField { key: String, field: String },

    #[error(
        "The field {type_name}.{field} is deprecated. {}",
        .reason.as_deref().unwrap_or("No longer supported")
    )]
    DeprecatedField {
        type_name: String,
        field: String,
        reason: Option<String>,
    },

    #[error(
        "The enum value {type_name}.{value} is deprecated. {}",
        .reason.as_deref().unwrap_or("No longer supported")
    )]
    DeprecatedEnumValue {
        type_name: String,
        value: String,
        reason: Option<String>,
    },
}
