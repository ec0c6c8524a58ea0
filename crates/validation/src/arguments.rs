use graphmock_schema::{MetaField, MetaType, Registry, ScalarKind, TypeKind};
use indexmap::IndexMap;
use parser::types::{BaseType, Type};
use value::{ConstValue, Name};

use crate::operation::{ArgumentKind, SelectedField};
use crate::validator::{ValidationOptions, VariableArguments};
use crate::ValidationError;

/// Checks the arguments of `field` against its definition: required ones are
/// present, every value fits its declared type and nothing undeclared is
/// passed. With `validate_deprecated`, deprecated enum values are rejected.
pub fn check_arguments(
    definition: &MetaField,
    field: &SelectedField,
    registry: &Registry,
    options: ValidationOptions,
) -> Result<(), ValidationError> {
    let checker = InputChecker {
        registry,
        field: &field.name,
        validate_deprecated: options.validate_deprecated,
    };

    for (name, argument_definition) in &definition.arguments {
        let argument = match field.argument(name) {
            Some(argument) => argument,
            None if argument_definition.is_required() => {
                return Err(checker.missing(name));
            }
            None => continue,
        };
        if argument.kind == ArgumentKind::Variable
            && options.variable_arguments == VariableArguments::Defer
        {
            continue;
        }
        match &argument.resolved {
            Some(value) => checker.check_value(&argument_definition.ty, name, value)?,
            None if argument_definition.is_required() => return Err(checker.missing(name)),
            None => {}
        }
    }

    if let Some(argument) = field
        .arguments
        .iter()
        .find(|argument| !definition.arguments.contains_key(&argument.name))
    {
        return Err(ValidationError::UnknownArgument {
            argument: argument.name.to_string(),
            field: field.name.to_string(),
        });
    }

    Ok(())
}

struct InputChecker<'a> {
    registry: &'a Registry,
    field: &'a str,
    validate_deprecated: bool,
}

impl<'a> InputChecker<'a> {
    fn check_value(&self, ty: &Type, argument: &str, value: &ConstValue) -> Result<(), ValidationError> {
        if matches!(value, ConstValue::Null) {
            return if ty.nullable {
                Ok(())
            } else {
                Err(self.missing(argument))
            };
        }

        match &ty.base {
            BaseType::List(element_ty) => match value {
                ConstValue::List(elements) => elements
                    .iter()
                    .try_for_each(|element| self.check_value(element_ty, argument, element)),
                _ if self.is_input_object(element_ty) => Err(ValidationError::InputNotArray {
                    field: self.field.to_string(),
                }),
                _ => Err(ValidationError::ArgumentNotArray {
                    argument: argument.to_string(),
                    field: self.field.to_string(),
                }),
            },
            BaseType::Named(type_name) => {
                let ty = match self.registry.get_type(type_name) {
                    Some(ty) => ty,
                    None => return Ok(()),
                };
                match ty.kind {
                    TypeKind::Scalar if is_valid_scalar_value(type_name, value) => Ok(()),
                    TypeKind::Enum if is_enum_member(ty, value) => self.check_enum_value(ty, value),
                    TypeKind::InputObject => match value {
                        ConstValue::Object(fields) => self.check_input_object(ty, fields),
                        ConstValue::List(_) => Err(ValidationError::InputNotObject {
                            field: self.field.to_string(),
                        }),
                        _ => Err(self.wrong_type(argument, type_name)),
                    },
                    TypeKind::Scalar | TypeKind::Enum => Err(self.wrong_type(argument, type_name)),
                    _ => Ok(()),
                }
            }
        }
    }

    fn check_input_object(
        &self,
        ty: &MetaType,
        fields: &IndexMap<Name, ConstValue>,
    ) -> Result<(), ValidationError> {
        for (name, field) in &ty.input_fields {
            match fields.get(name) {
                Some(value) => self.check_value(&field.ty, name, value)?,
                None if field.is_required() => return Err(self.missing(name)),
                None => {}
            }
        }

        if let Some(key) = fields.keys().find(|key| !ty.input_fields.contains_key(*key)) {
            return Err(ValidationError::UnknownInputField {
                key: key.to_string(),
                field: self.field.to_string(),
            });
        }
        Ok(())
    }

    fn check_enum_value(&self, ty: &MetaType, value: &ConstValue) -> Result<(), ValidationError> {
        if !self.validate_deprecated {
            return Ok(());
        }
        let name = match value {
            ConstValue::Enum(name) => name.as_str(),
            ConstValue::String(name) => name.as_str(),
            _ => return Ok(()),
        };
        match ty.enum_values.get(name) {
            Some(enum_value) if enum_value.deprecation.is_deprecated() => {
                Err(ValidationError::DeprecatedEnumValue {
                    type_name: ty.name.to_string(),
                    value: name.to_string(),
                    reason: enum_value.deprecation.reason().map(ToString::to_string),
                })
            }
            _ => Ok(()),
        }
    }

    fn is_input_object(&self, ty: &Type) -> bool {
        match &ty.base {
            BaseType::Named(name) => self
                .registry
                .get_type(name)
                .map_or(false, |ty| ty.kind == TypeKind::InputObject),
            BaseType::List(_) => false,
        }
    }

    fn missing(&self, argument: &str) -> ValidationError {
        ValidationError::ArgumentMissing {
            argument: argument.to_string(),
            field: self.field.to_string(),
        }
    }

    fn wrong_type(&self, argument: &str, type_name: &str) -> ValidationError {
        ValidationError::ArgumentType {
            argument: argument.to_string(),
            type_name: type_name.to_string(),
        }
    }
}

fn is_enum_member(ty: &MetaType, value: &ConstValue) -> bool {
    match value {
        ConstValue::Enum(value) => ty.enum_values.contains_key(value),
        ConstValue::String(value) => ty.enum_values.contains_key(value.as_str()),
        _ => false,
    }
}

/// Unquoted enum literals pass for `String` and `ID`.
fn is_valid_scalar_value(type_name: &str, value: &ConstValue) -> bool {
    match (ScalarKind::of(type_name), value) {
        (ScalarKind::Int, ConstValue::Number(n)) => n.is_i64() || n.is_u64(),
        (ScalarKind::Float, ConstValue::Number(_)) => true,
        (ScalarKind::String, ConstValue::String(_) | ConstValue::Enum(_)) => true,
        (ScalarKind::Id, ConstValue::String(_) | ConstValue::Enum(_)) => true,
        (ScalarKind::Id, ConstValue::Number(n)) => n.is_i64() || n.is_u64(),
        (ScalarKind::Boolean, ConstValue::Boolean(_)) => true,
        (ScalarKind::Custom, _) => true,
        _ => false,
    }
}
