use graphmock_schema::{MetaField, MetaType, Registry, ScalarKind, TypeKind};
use graphmock_validation::{merge_field, OperationDescriptor, ParsedOperation, SelectedField, Selection};
use indexmap::IndexMap;
use parser::types::{BaseType, Type};
use serde::{Deserialize, Serialize};
use value::{ConstValue, Name};

use crate::{FixtureError, MockSchema};

/// What to do with fixture keys that are neither selected nor fields of the
/// type they appear on.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFixtureKeys {
    #[default]
    Ignore,
    Reject,
}

/// Overlays fixture values on a result tree, following the selection.
pub struct FixtureMerger<'a> {
    registry: &'a Registry,
    mock: Option<&'a MockSchema>,
    unknown_keys: UnknownFixtureKeys,
    auto_mock: bool,
}

impl<'a> FixtureMerger<'a> {
    pub fn new(registry: &'a Registry) -> Self {
        Self {
            registry,
            mock: None,
            unknown_keys: UnknownFixtureKeys::default(),
            auto_mock: true,
        }
    }

    /// Fills fields the base result lacks, such as those of a concrete type
    /// picked by the fixture's `__typename`.
    pub fn mock_schema(self, mock: &'a MockSchema) -> Self {
        Self {
            mock: Some(mock),
            ..self
        }
    }

    pub fn unknown_keys(self, unknown_keys: UnknownFixtureKeys) -> Self {
        Self {
            unknown_keys,
            ..self
        }
    }

    /// When disabled, fields the fixture leaves out are not filled from the
    /// base result.
    pub fn auto_mock(self, auto_mock: bool) -> Self {
        Self { auto_mock, ..self }
    }

    /// Overlays the entry of `data` for the descriptor's root field on `base`.
    pub fn merge(
        &self,
        operation: &OperationDescriptor,
        base: ConstValue,
        data: &IndexMap<Name, ConstValue>,
    ) -> Result<ConstValue, FixtureError> {
        let (root, definition) = match self
            .registry
            .root_type(operation.kind)
            .and_then(|root| Some((root, root.field_by_name(operation.name())?)))
        {
            Some(found) => found,
            None => return Ok(base),
        };
        self.merge_field(root, definition, &operation.field, base, lookup(data, &operation.field))
    }

    /// Checks the top level of a fixture against the operation's root type.
    pub fn check_data_keys(
        &self,
        operation: &ParsedOperation,
        data: &IndexMap<Name, ConstValue>,
    ) -> Result<(), FixtureError> {
        if self.unknown_keys == UnknownFixtureKeys::Ignore {
            return Ok(());
        }
        let root = match self.registry.root_type(operation.kind) {
            Some(root) => root,
            None => return Ok(()),
        };
        match data.keys().find(|key| {
            root.field_by_name(key).is_none()
                && !operation
                    .descriptors
                    .iter()
                    .any(|descriptor| descriptor.alias() == key.as_str())
        }) {
            Some(key) => Err(FixtureError::UnknownKey {
                key: key.to_string(),
            }),
            None => Ok(()),
        }
    }

    fn merge_field(
        &self,
        parent: &MetaType,
        definition: &MetaField,
        field: &SelectedField,
        base: ConstValue,
        fixture: Option<&ConstValue>,
    ) -> Result<ConstValue, FixtureError> {
        match fixture {
            Some(fixture) => self.merge_value(&definition.ty, field, base, fixture),
            None if self.auto_mock && (definition.ty.nullable || !matches!(base, ConstValue::Null)) => {
                Ok(base)
            }
            None if definition.ty.nullable => Ok(ConstValue::Null),
            None => Err(FixtureError::NonNullable {
                type_name: parent.name.to_string(),
                field: definition.name.to_string(),
            }),
        }
    }

    fn merge_value(
        &self,
        ty: &Type,
        field: &SelectedField,
        base: ConstValue,
        fixture: &ConstValue,
    ) -> Result<ConstValue, FixtureError> {
        if let ConstValue::Null = fixture {
            return if ty.nullable {
                Ok(ConstValue::Null)
            } else {
                Err(FixtureError::CannotBeNull {
                    name: field.name.to_string(),
                })
            };
        }

        let type_name = match &ty.base {
            BaseType::List(element_ty) => {
                let items = match fixture {
                    ConstValue::List(items) => items,
                    _ => {
                        return Err(FixtureError::NotAnArray {
                            name: field.name.to_string(),
                        })
                    }
                };
                let representative = match base {
                    ConstValue::List(base) => base.into_iter().next().unwrap_or(ConstValue::Null),
                    _ => ConstValue::Null,
                };
                return items
                    .iter()
                    .map(|item| self.merge_value(element_ty, field, representative.clone(), item))
                    .collect::<Result<Vec<_>, _>>()
                    .map(ConstValue::List);
            }
            BaseType::Named(type_name) => type_name,
        };

        let meta = match self.registry.get_type(type_name) {
            Some(meta) => meta,
            None => return Ok(fixture.clone()),
        };
        let not_same_type = || FixtureError::NotSameType {
            name: field.name.to_string(),
        };

        match meta.kind {
            TypeKind::Scalar if is_scalar_fixture(type_name, fixture) => Ok(fixture.clone()),
            TypeKind::Scalar => Err(not_same_type()),
            TypeKind::Enum => match fixture {
                ConstValue::Enum(value) if meta.enum_values.contains_key(value) => {
                    Ok(fixture.clone())
                }
                ConstValue::String(value) if meta.enum_values.contains_key(value.as_str()) => {
                    Ok(ConstValue::Enum(Name::new(value)))
                }
                _ => Err(not_same_type()),
            },
            TypeKind::Object | TypeKind::Interface | TypeKind::Union => match fixture {
                ConstValue::Object(fixture) => self.merge_object(meta, field, base, fixture),
                _ => Err(not_same_type()),
            },
            TypeKind::InputObject => Ok(fixture.clone()),
        }
    }

    fn merge_object(
        &self,
        declared: &MetaType,
        field: &SelectedField,
        base: ConstValue,
        fixture: &IndexMap<Name, ConstValue>,
    ) -> Result<ConstValue, FixtureError> {
        let concrete = self.concrete_type(declared, fixture);
        let mut base = match base {
            ConstValue::Object(base) => base,
            _ => IndexMap::new(),
        };
        if declared.is_abstract() {
            let base_type = base_typename(&field.selections, &base)
                .or_else(|| declared.possible_types.first().map(|name| name.as_str()));
            let stale = base_type != Some(concrete.name.as_str());
            if stale {
                base.clear();
            }
        }

        let mut output = IndexMap::new();
        self.merge_selections(declared, concrete, &field.selections, &base, fixture, &mut output)?;

        if self.unknown_keys == UnknownFixtureKeys::Reject {
            if let Some(key) = fixture.keys().find(|key| {
                key.as_str() != "__typename"
                    && concrete.field_by_name(key).is_none()
                    && declared.field_by_name(key).is_none()
                    && !is_selected(&field.selections, key)
            }) {
                return Err(FixtureError::UnknownKey {
                    key: key.to_string(),
                });
            }
        }

        Ok(ConstValue::Object(output))
    }

    fn merge_selections(
        &self,
        scope: &MetaType,
        concrete: &MetaType,
        selections: &[Selection],
        base: &IndexMap<Name, ConstValue>,
        fixture: &IndexMap<Name, ConstValue>,
        output: &mut IndexMap<Name, ConstValue>,
    ) -> Result<(), FixtureError> {
        for selection in selections {
            match selection {
                Selection::Field(field) if field.name == "__typename" => {
                    output.insert(
                        field.alias.clone(),
                        ConstValue::String(concrete.name.to_string()),
                    );
                }
                Selection::Field(field) => {
                    let definition = match concrete
                        .field_by_name(&field.name)
                        .or_else(|| scope.field_by_name(&field.name))
                    {
                        Some(definition) => definition,
                        None => continue,
                    };
                    let base = match base.get(&field.alias) {
                        Some(base) => base.clone(),
                        None => self.mock_value(concrete, field),
                    };
                    let value =
                        self.merge_field(concrete, definition, field, base, lookup(fixture, field))?;
                    merge_field(output, field.alias.clone(), value);
                }
                Selection::InlineFragment(fragment) => {
                    let fragment_type = match &fragment.type_condition {
                        Some(type_name) => match self.registry.get_type(type_name) {
                            Some(ty) => ty,
                            None => continue,
                        },
                        None => scope,
                    };
                    if fragment_type.is_possible_type(&concrete.name) {
                        self.merge_selections(
                            fragment_type,
                            concrete,
                            &fragment.selections,
                            base,
                            fixture,
                            output,
                        )?;
                    }
                }
            }
        }
        Ok(())
    }

    fn mock_value(&self, concrete: &MetaType, field: &SelectedField) -> ConstValue {
        self.mock
            .and_then(|mock| mock.value_of(self.registry, &concrete.name, field))
            .unwrap_or(ConstValue::Null)
    }

    /// The type named by a `__typename` key, else the first possible type.
    fn concrete_type<'b>(
        &self,
        declared: &'b MetaType,
        fixture: &IndexMap<Name, ConstValue>,
    ) -> &'b MetaType
    where
        'a: 'b,
    {
        if !declared.is_abstract() {
            return declared;
        }
        let typename = match fixture.get("__typename") {
            Some(ConstValue::String(typename)) if declared.is_possible_type(typename) => {
                Some(typename.as_str())
            }
            _ => declared.possible_types.first().map(|name| name.as_str()),
        };
        typename
            .and_then(|typename| self.registry.get_type(typename))
            .unwrap_or(declared)
    }
}

/// Rewrites a result keyed by response keys into one keyed by field names.
pub fn unalias(field: &SelectedField, value: ConstValue) -> ConstValue {
    match value {
        ConstValue::List(items) => {
            ConstValue::List(items.into_iter().map(|item| unalias(field, item)).collect())
        }
        ConstValue::Object(fields) => {
            let mut output = IndexMap::new();
            unalias_selections(&field.selections, &fields, &mut output);
            ConstValue::Object(output)
        }
        value => value,
    }
}

fn unalias_selections(
    selections: &[Selection],
    fields: &IndexMap<Name, ConstValue>,
    output: &mut IndexMap<Name, ConstValue>,
) {
    for selection in selections {
        match selection {
            Selection::Field(field) => {
                if let Some(value) = fields.get(&field.alias) {
                    merge_field(output, field.name.clone(), unalias(field, value.clone()));
                }
            }
            Selection::InlineFragment(fragment) => {
                unalias_selections(&fragment.selections, fields, output)
            }
        }
    }
}

/// The concrete type a result object was built for, when `__typename` was
/// selected.
fn base_typename<'v>(selections: &[Selection], base: &'v IndexMap<Name, ConstValue>) -> Option<&'v str> {
    selections.iter().find_map(|selection| match selection {
        Selection::Field(field) if field.name == "__typename" => match base.get(&field.alias) {
            Some(ConstValue::String(typename)) => Some(typename.as_str()),
            _ => None,
        },
        Selection::Field(_) => None,
        Selection::InlineFragment(fragment) => base_typename(&fragment.selections, base),
    })
}

fn lookup<'v>(fixture: &'v IndexMap<Name, ConstValue>, field: &SelectedField) -> Option<&'v ConstValue> {
    fixture
        .get(&field.alias)
        .or_else(|| fixture.get(&field.name))
}

fn is_selected(selections: &[Selection], key: &str) -> bool {
    selections.iter().any(|selection| match selection {
        Selection::Field(field) => field.alias == key || field.name == key,
        Selection::InlineFragment(fragment) => is_selected(&fragment.selections, key),
    })
}

fn is_scalar_fixture(type_name: &str, value: &ConstValue) -> bool {
    match (ScalarKind::of(type_name), value) {
        (ScalarKind::Int | ScalarKind::Float, ConstValue::Number(_)) => true,
        (ScalarKind::String, ConstValue::String(_)) => true,
        (ScalarKind::Id, ConstValue::String(_)) => true,
        (ScalarKind::Id, ConstValue::Number(n)) => n.is_i64() || n.is_u64(),
        (ScalarKind::Boolean, ConstValue::Boolean(_)) => true,
        (ScalarKind::Custom, _) => true,
        _ => false,
    }
}
