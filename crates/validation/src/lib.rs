#![forbid(unsafe_code)]

#[cfg(test)]
#[macro_use]
mod test_harness;

mod arguments;
mod error;
mod operation;
mod source;
mod validator;
mod variables;

pub use arguments::check_arguments;
pub use error::ValidationError;
pub use operation::{
    parse_operation, Argument, ArgumentKind, DeclaredVariable, InlineFragment,
    OperationDescriptor, OperationParser, ParsedOperation, SelectedField, Selection,
};
pub use source::{Shape, Source};
pub use validator::{merge_field, ValidationOptions, Validator, VariableArguments};
pub use variables::check_unused_variables;
