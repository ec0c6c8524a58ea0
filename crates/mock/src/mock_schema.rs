use std::collections::HashMap;

use graphmock_schema::{Registry, TypeKind};
use graphmock_validation::{merge_field, SelectedField, Selection, Shape, Source};
use indexmap::IndexMap;
use parser::types::{BaseType, Type};
use value::{ConstValue, Name};

use crate::MockGenerator;

/// Mock value of a single field. Objects refer to their type by name, so
/// recursive types need no unfolding.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum MockValue {
    Null,
    Leaf(ConstValue),
    Object(Name),
    List(Box<MockValue>),
}

/// Mock value of every field of every object and interface type, plus the
/// results saved from earlier calls.
#[derive(Debug, Clone)]
pub struct MockSchema {
    types: IndexMap<Name, IndexMap<Name, MockValue>>,
    list_length: usize,
    saved: HashMap<(Name, Name), ConstValue>,
}

impl MockSchema {
    pub fn generate(registry: &Registry, generator: &dyn MockGenerator, list_length: usize) -> Self {
        let types = registry
            .types()
            .filter(|ty| matches!(ty.kind, TypeKind::Object | TypeKind::Interface))
            .map(|ty| {
                let fields = ty
                    .fields
                    .values()
                    .map(|field| {
                        let value = mock_value(registry, generator, &ty.name, &field.name, &field.ty);
                        (field.name.clone(), value)
                    })
                    .collect();
                (ty.name.clone(), fields)
            })
            .collect::<IndexMap<_, _>>();

        tracing::debug!(types = types.len(), list_length, "Mock schema generated.");
        Self {
            types,
            list_length,
            saved: HashMap::new(),
        }
    }

    #[inline]
    pub fn field(&self, type_name: &str, field: &str) -> Option<&MockValue> {
        self.types.get(type_name)?.get(field)
    }

    /// Stores a result, keyed by field names, for a root field.
    pub fn save(&mut self, root_type: &str, field: &str, value: ConstValue) {
        tracing::debug!(root_type, field, "Fixture saved.");
        self.saved
            .insert((Name::new(root_type), Name::new(field)), value);
    }

    pub fn saved(&self, root_type: &str, field: &str) -> Option<&ConstValue> {
        self.saved.get(&(Name::new(root_type), Name::new(field)))
    }

    /// The mock value of `field` on an object of type `type_name`, shaped by
    /// the field's selections. Selections are assumed valid.
    pub fn value_of(
        &self,
        registry: &Registry,
        type_name: &str,
        field: &SelectedField,
    ) -> Option<ConstValue> {
        let node = self.field(type_name, &field.name)?;
        Some(self.build(registry, node, &field.selections))
    }

    fn build(&self, registry: &Registry, node: &MockValue, selections: &[Selection]) -> ConstValue {
        match node {
            MockValue::Null => ConstValue::Null,
            MockValue::Leaf(value) => value.clone(),
            MockValue::List(element) => {
                ConstValue::List(vec![self.build(registry, element, selections); self.list_length])
            }
            MockValue::Object(type_name) => {
                let mut output = IndexMap::new();
                self.build_selections(registry, type_name, selections, &mut output);
                ConstValue::Object(output)
            }
        }
    }

    fn build_selections(
        &self,
        registry: &Registry,
        type_name: &Name,
        selections: &[Selection],
        output: &mut IndexMap<Name, ConstValue>,
    ) {
        for selection in selections {
            match selection {
                Selection::Field(field) if field.name == "__typename" => {
                    output.insert(field.alias.clone(), ConstValue::String(type_name.to_string()));
                }
                Selection::Field(field) => {
                    if let Some(value) = self.value_of(registry, type_name, field) {
                        merge_field(output, field.alias.clone(), value);
                    }
                }
                Selection::InlineFragment(fragment) => {
                    let applies = match &fragment.type_condition {
                        Some(condition) => registry
                            .get_type(condition)
                            .map_or(false, |ty| ty.is_possible_type(type_name)),
                        None => true,
                    };
                    if applies {
                        self.build_selections(registry, type_name, &fragment.selections, output);
                    }
                }
            }
        }
    }
}

impl Source for MockSchema {
    type Node = MockValue;

    fn root(&self, root_type: &str, field: &str) -> Option<MockValue> {
        self.field(root_type, field).cloned()
    }

    fn child(&self, node: &MockValue, field: &str) -> Option<MockValue> {
        match node {
            MockValue::Object(type_name) => self.field(type_name, field).cloned(),
            _ => None,
        }
    }

    fn shape(&self, node: &MockValue) -> Shape<MockValue> {
        match node {
            MockValue::Null => Shape::Null,
            MockValue::Leaf(value) => Shape::Leaf(value.clone()),
            MockValue::Object(type_name) => Shape::Object {
                typename: Some(type_name.clone()),
            },
            MockValue::List(element) => Shape::List(vec![element.as_ref().clone(); self.list_length]),
        }
    }
}

fn mock_value(
    registry: &Registry,
    generator: &dyn MockGenerator,
    owner: &str,
    field: &str,
    ty: &Type,
) -> MockValue {
    let type_name = match &ty.base {
        BaseType::List(element) => {
            return MockValue::List(Box::new(mock_value(registry, generator, owner, field, element)))
        }
        BaseType::Named(type_name) => type_name,
    };
    let meta = match registry.get_type(type_name) {
        Some(meta) => meta,
        None => return MockValue::Null,
    };

    match meta.kind {
        TypeKind::Scalar => MockValue::Leaf(generator.scalar(type_name, owner, field)),
        TypeKind::Enum => meta
            .enum_values
            .keys()
            .next()
            .map(|value| MockValue::Leaf(ConstValue::Enum(value.clone())))
            .unwrap_or(MockValue::Null),
        TypeKind::Object => MockValue::Object(meta.name.clone()),
        TypeKind::Interface | TypeKind::Union => meta
            .possible_types
            .first()
            .map(|name| MockValue::Object(name.clone()))
            .unwrap_or(MockValue::Null),
        TypeKind::InputObject => MockValue::Null,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DefaultMockGenerator;

    const SCHEMA: &str = r#"
        enum Role { ADMIN USER }
        interface Node { id: ID! }
        type User implements Node {
            id: ID!
            role: Role!
            scores: [Int]!
            friends: [User!]!
        }
        union Search = User
        type Query { me: User node: Node search: [Search] }
    "#;

    fn mock_schema(list_length: usize) -> MockSchema {
        let registry = Registry::parse(SCHEMA).unwrap();
        MockSchema::generate(&registry, &DefaultMockGenerator::new(), list_length)
    }

    #[test]
    fn recursive_types_are_references() {
        let mock = mock_schema(1);
        assert_eq!(
            mock.field("User", "friends"),
            Some(&MockValue::List(Box::new(MockValue::Object(Name::new("User")))))
        );
        assert_eq!(
            mock.field("User", "role"),
            Some(&MockValue::Leaf(ConstValue::Enum(Name::new("ADMIN"))))
        );
        assert_eq!(
            mock.field("Query", "node"),
            Some(&MockValue::Object(Name::new("User")))
        );
    }

    #[test]
    fn lists_repeat_the_representative_element() {
        let mock = mock_schema(3);
        let scores = mock.field("User", "scores").unwrap();
        match mock.shape(scores) {
            Shape::List(items) => {
                assert_eq!(items.len(), 3);
                assert!(items
                    .iter()
                    .all(|item| *item == MockValue::Leaf(ConstValue::Number(42.into()))));
            }
            shape => panic!("unexpected shape {:?}", shape),
        }
    }

    #[test]
    fn value_of_follows_selections() {
        let registry = Registry::parse(SCHEMA).unwrap();
        let mock = MockSchema::generate(&registry, &DefaultMockGenerator::new(), 2);
        let operation = graphmock_validation::parse_operation(
            &registry,
            "{ me { key: id friends { __typename ... on Node { id } } } }",
            None,
            &Default::default(),
        )
        .unwrap();
        let value = mock
            .value_of(&registry, "Query", &operation.descriptors[0].field)
            .unwrap();
        assert_eq!(
            value.into_json().unwrap(),
            serde_json::json!({
                "key": "1",
                "friends": [
                    { "__typename": "User", "id": "1" },
                    { "__typename": "User", "id": "1" }
                ]
            })
        );
    }

    #[test]
    fn saved_results() {
        let mut mock = mock_schema(1);
        assert!(mock.saved("Query", "me").is_none());
        mock.save("Query", "me", ConstValue::Null);
        assert_eq!(mock.saved("Query", "me"), Some(&ConstValue::Null));
    }
}
