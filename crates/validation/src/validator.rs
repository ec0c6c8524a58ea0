use graphmock_schema::{MetaField, MetaType, Registry, TypeExt};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use value::{ConstValue, Name};

use crate::arguments::check_arguments;
use crate::operation::{OperationDescriptor, SelectedField, Selection};
use crate::source::{Shape, Source};
use crate::ValidationError;

/// How arguments bound to variables are checked against their declared type.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariableArguments {
    /// Check the substituted value.
    #[default]
    Check,
    /// Leave them to the variable types declared by the operation.
    Defer,
}

#[derive(Debug, Copy, Clone, Default)]
pub struct ValidationOptions {
    pub validate_deprecated: bool,
    pub variable_arguments: VariableArguments,
}

/// Checks one root field against the registry and builds its result from a
/// [`Source`], so the value mirrors the selection.
pub struct Validator<'a, S> {
    registry: &'a Registry,
    source: &'a S,
    options: ValidationOptions,
}

impl<'a, S: Source> Validator<'a, S> {
    pub fn new(registry: &'a Registry, source: &'a S) -> Self {
        Self {
            registry,
            source,
            options: ValidationOptions::default(),
        }
    }

    pub fn options(self, options: ValidationOptions) -> Self {
        Self { options, ..self }
    }

    pub fn validate(&self, operation: &OperationDescriptor) -> Result<ConstValue, ValidationError> {
        let root_type = self
            .registry
            .root_type(operation.kind)
            .ok_or(ValidationError::MissingRootType {
                kind: operation.kind,
            })?;
        let definition = root_type.field_by_name(operation.name()).ok_or_else(|| {
            ValidationError::UnknownOperationField {
                kind: operation.kind,
                name: operation.name().to_string(),
            }
        })?;

        let node = self.source.root(&root_type.name, operation.name());
        let value = self.resolve_field(
            operation.name(),
            root_type,
            definition,
            &operation.field,
            node,
        )?;
        tracing::trace!(kind = %operation.kind, field = operation.name(), "Operation validated.");
        Ok(value)
    }

    fn resolve_field(
        &self,
        operation: &str,
        parent: &MetaType,
        definition: &MetaField,
        field: &SelectedField,
        node: Option<S::Node>,
    ) -> Result<ConstValue, ValidationError> {
        self.check_deprecated(parent, definition)?;
        let field_type = self.field_type(definition)?;
        self.check_selection_shape(operation, field_type, field)?;

        let node = node.ok_or_else(|| ValidationError::InvalidField {
            field: field.name.to_string(),
            operation: operation.to_string(),
        })?;
        let value = if field_type.is_leaf() {
            self.leaf_value(&node)
        } else {
            self.resolve_composite(operation, field_type, &field.selections, &node)?
        };

        check_arguments(definition, field, self.registry, self.options)?;
        Ok(value)
    }

    fn resolve_composite(
        &self,
        operation: &str,
        declared: &MetaType,
        selections: &[Selection],
        node: &S::Node,
    ) -> Result<ConstValue, ValidationError> {
        match self.source.shape(node) {
            Shape::List(items) if items.is_empty() => {
                self.check_selections(operation, declared, selections)?;
                Ok(ConstValue::List(Vec::new()))
            }
            Shape::List(items) => items
                .iter()
                .map(|item| self.resolve_composite(operation, declared, selections, item))
                .collect::<Result<Vec<_>, _>>()
                .map(ConstValue::List),
            Shape::Object { typename } => {
                let concrete = self.concrete_type(declared, typename.as_deref());
                let mut fields = IndexMap::new();
                self.collect_fields(operation, declared, concrete, selections, node, &mut fields)?;
                Ok(ConstValue::Object(fields))
            }
            Shape::Null | Shape::Leaf(_) => {
                self.check_selections(operation, declared, selections)?;
                Ok(ConstValue::Null)
            }
        }
    }

    fn collect_fields(
        &self,
        operation: &str,
        scope: &MetaType,
        concrete: &MetaType,
        selections: &[Selection],
        node: &S::Node,
        output: &mut IndexMap<Name, ConstValue>,
    ) -> Result<(), ValidationError> {
        for selection in selections {
            match selection {
                Selection::Field(field) => {
                    if field.name == "__typename" {
                        output.insert(
                            field.alias.clone(),
                            ConstValue::String(concrete.name.to_string()),
                        );
                        continue;
                    }

                    let definition = self.field_definition(operation, scope, field)?;
                    let definition = concrete.field_by_name(&field.name).unwrap_or(definition);
                    let child = self.source.child(node, &field.name);
                    let value = self.resolve_field(operation, concrete, definition, field, child)?;
                    merge_field(output, field.alias.clone(), value);
                }
                Selection::InlineFragment(fragment) => {
                    let fragment_type = match &fragment.type_condition {
                        Some(type_name) => self.named_type(type_name)?,
                        None => scope,
                    };
                    if fragment_type.is_possible_type(&concrete.name) {
                        self.collect_fields(
                            operation,
                            fragment_type,
                            concrete,
                            &fragment.selections,
                            node,
                            output,
                        )?;
                    } else {
                        self.check_selections(operation, fragment_type, &fragment.selections)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Schema-only pass over selections that produce no value.
    fn check_selections(
        &self,
        operation: &str,
        scope: &MetaType,
        selections: &[Selection],
    ) -> Result<(), ValidationError> {
        for selection in selections {
            match selection {
                Selection::Field(field) => {
                    if field.name == "__typename" {
                        continue;
                    }
                    let definition = self.field_definition(operation, scope, field)?;
                    self.check_deprecated(scope, definition)?;
                    let field_type = self.field_type(definition)?;
                    self.check_selection_shape(operation, field_type, field)?;
                    if !field_type.is_leaf() {
                        self.check_selections(operation, field_type, &field.selections)?;
                    }
                    check_arguments(definition, field, self.registry, self.options)?;
                }
                Selection::InlineFragment(fragment) => {
                    let fragment_type = match &fragment.type_condition {
                        Some(type_name) => self.named_type(type_name)?,
                        None => scope,
                    };
                    self.check_selections(operation, fragment_type, &fragment.selections)?;
                }
            }
        }
        Ok(())
    }

    fn check_selection_shape(
        &self,
        operation: &str,
        field_type: &MetaType,
        field: &SelectedField,
    ) -> Result<(), ValidationError> {
        match (field_type.is_leaf(), field.selections.is_empty()) {
            (true, false) => Err(ValidationError::LeafSelection {
                operation: operation.to_string(),
                field: field.name.to_string(),
                type_name: field_type.name.to_string(),
            }),
            (false, true) => Err(ValidationError::MustSelectField {
                operation: operation.to_string(),
                field: field.name.to_string(),
            }),
            _ => Ok(()),
        }
    }

    fn check_deprecated(&self, parent: &MetaType, definition: &MetaField) -> Result<(), ValidationError> {
        if self.options.validate_deprecated && definition.deprecation.is_deprecated() {
            return Err(ValidationError::DeprecatedField {
                type_name: parent.name.to_string(),
                field: definition.name.to_string(),
                reason: definition.deprecation.reason().map(ToString::to_string),
            });
        }
        Ok(())
    }

    fn field_definition<'b>(
        &self,
        operation: &str,
        scope: &'b MetaType,
        field: &SelectedField,
    ) -> Result<&'b MetaField, ValidationError> {
        scope
            .field_by_name(&field.name)
            .ok_or_else(|| ValidationError::InvalidField {
                field: field.name.to_string(),
                operation: operation.to_string(),
            })
    }

    fn field_type(&self, definition: &MetaField) -> Result<&'a MetaType, ValidationError> {
        self.named_type(definition.ty.concrete_typename())
    }

    fn named_type(&self, type_name: &str) -> Result<&'a MetaType, ValidationError> {
        self.registry
            .get_type(type_name)
            .ok_or_else(|| ValidationError::UnknownType {
                type_name: type_name.to_string(),
            })
    }

    /// Abstract types resolve to the type the source names, falling back to
    /// the first possible type.
    fn concrete_type<'b>(&self, declared: &'b MetaType, typename: Option<&str>) -> &'b MetaType
    where
        'a: 'b,
    {
        if !declared.is_abstract() {
            return declared;
        }
        typename
            .filter(|typename| declared.is_possible_type(typename))
            .or_else(|| declared.possible_types.first().map(|name| name.as_str()))
            .and_then(|typename| self.registry.get_type(typename))
            .unwrap_or(declared)
    }

    fn leaf_value(&self, node: &S::Node) -> ConstValue {
        match self.source.shape(node) {
            Shape::Leaf(value) => value,
            Shape::List(items) => {
                ConstValue::List(items.iter().map(|item| self.leaf_value(item)).collect())
            }
            Shape::Null | Shape::Object { .. } => ConstValue::Null,
        }
    }
}

/// Inserts `value` under `key`, deep-merging objects selected more than once.
pub fn merge_field(output: &mut IndexMap<Name, ConstValue>, key: Name, value: ConstValue) {
    match output.get_mut(&key) {
        Some(existing) => merge_value(existing, value),
        None => {
            output.insert(key, value);
        }
    }
}

fn merge_value(existing: &mut ConstValue, value: ConstValue) {
    match (existing, value) {
        (ConstValue::Object(existing), ConstValue::Object(fields)) => {
            for (key, value) in fields {
                merge_field(existing, key, value);
            }
        }
        (ConstValue::List(existing), ConstValue::List(items)) if existing.len() == items.len() => {
            for (existing, value) in existing.iter_mut().zip(items) {
                merge_value(existing, value);
            }
        }
        (existing, value) => *existing = value,
    }
}
