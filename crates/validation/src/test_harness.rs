use graphmock_schema::{MetaType, Registry, ScalarKind, TypeExt, TypeKind};
use once_cell::sync::Lazy;
use parser::types::{BaseType, Type};
use value::{ConstValue, Name, Variables};

use crate::source::{Shape, Source};
use crate::{check_unused_variables, parse_operation, ValidationError, ValidationOptions, Validator};

static REGISTRY: Lazy<Registry> =
    Lazy::new(|| Registry::parse(include_str!("test_harness.graphql")).unwrap());

pub fn registry() -> &'static Registry {
    &REGISTRY
}

pub fn variables(variables: serde_json::Value) -> Variables {
    Variables::from_json(variables)
}

/// Answers every field with a fixed value of its declared type and every list
/// with one element.
pub struct DefaultsSource<'a> {
    registry: &'a Registry,
}

impl<'a> DefaultsSource<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self { registry }
    }

    fn object_type(&self, ty: &Type) -> Option<&'a MetaType> {
        let meta = self.registry.concrete_type(ty)?;
        match meta.kind {
            TypeKind::Interface | TypeKind::Union => meta
                .possible_types
                .first()
                .and_then(|name| self.registry.get_type(name)),
            _ => Some(meta),
        }
    }
}

impl<'a> Source for DefaultsSource<'a> {
    type Node = Type;

    fn root(&self, root_type: &str, field: &str) -> Option<Type> {
        let field = self.registry.get_type(root_type)?.field_by_name(field)?;
        Some(field.ty.clone())
    }

    fn child(&self, node: &Type, field: &str) -> Option<Type> {
        let field = self.object_type(node)?.field_by_name(field)?;
        Some(field.ty.clone())
    }

    fn shape(&self, node: &Type) -> Shape<Type> {
        if let BaseType::List(element) = &node.base {
            return Shape::List(vec![element.as_ref().clone()]);
        }
        let meta = match self.object_type(node) {
            Some(meta) => meta,
            None => return Shape::Null,
        };
        match meta.kind {
            TypeKind::Scalar => Shape::Leaf(match ScalarKind::of(node.concrete_typename()) {
                ScalarKind::Int => ConstValue::Number(42.into()),
                ScalarKind::Float => ConstValue::Number(serde_json::Number::from_f64(4.2).unwrap()),
                ScalarKind::Id => ConstValue::String("1".to_string()),
                ScalarKind::Boolean => ConstValue::Boolean(true),
                _ => ConstValue::String("Hello World".to_string()),
            }),
            TypeKind::Enum => Shape::Leaf(
                meta.enum_values
                    .keys()
                    .next()
                    .map(|name| ConstValue::Enum(name.clone()))
                    .unwrap_or(ConstValue::Null),
            ),
            _ => Shape::Object {
                typename: Some(Name::new(&meta.name)),
            },
        }
    }
}

pub fn validate_with(
    query: &str,
    variables: serde_json::Value,
    options: ValidationOptions,
) -> Result<Vec<ConstValue>, ValidationError> {
    let registry = registry();
    let operation = parse_operation(registry, query, None, &self::variables(variables))?;
    let source = DefaultsSource::new(registry);
    let validator = Validator::new(registry, &source).options(options);
    let results = operation
        .descriptors
        .iter()
        .map(|descriptor| validator.validate(descriptor))
        .collect::<Result<Vec<_>, _>>()?;
    check_unused_variables(&operation)?;
    Ok(results)
}

pub fn expect_passes_(query: &str, variables: serde_json::Value) -> Vec<ConstValue> {
    match validate_with(query, variables, ValidationOptions::default()) {
        Ok(results) => results,
        Err(err) => panic!("Expected validation to pass, but found: {}", err),
    }
}

macro_rules! expect_passes {
    ($query:literal, $variables:tt $(,)?) => {
        crate::test_harness::expect_passes_($query, serde_json::json!($variables))
    };
    ($query:literal $(,)?) => {
        crate::test_harness::expect_passes_($query, serde_json::json!({}))
    };
}

pub fn expect_fails_(query: &str, variables: serde_json::Value, message: &str) {
    match validate_with(query, variables, ValidationOptions::default()) {
        Ok(_) => panic!("Expected validation to fail, but no errors were found"),
        Err(err) => assert_eq!(err.to_string(), message),
    }
}

macro_rules! expect_fails {
    ($query:literal, $variables:tt, $message:literal $(,)?) => {
        crate::test_harness::expect_fails_($query, serde_json::json!($variables), $message)
    };
    ($query:literal, $message:literal $(,)?) => {
        crate::test_harness::expect_fails_($query, serde_json::json!({}), $message)
    };
}
