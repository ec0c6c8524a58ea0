use std::collections::HashSet;
use std::fmt::{self, Display, Formatter};

use indexmap::{IndexMap, IndexSet};
use parser::types::{
    self, ConstDirective, EnumType, InputObjectType, InterfaceType, ObjectType, OperationType,
    SchemaDefinition, ServiceDocument, Type, TypeDefinition, TypeSystemDefinition, UnionType,
};
use parser::Positioned;
use value::{ConstValue, Name};

use crate::introspection::introspection_to_sdl;
use crate::type_ext::TypeExt;
use crate::SchemaError;

const BUILTIN_SCALARS: &[&str] = &["String", "Int", "Float", "Boolean", "ID"];

#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Deprecation {
    NoDeprecated,
    Deprecated { reason: Option<String> },
}

impl Deprecation {
    #[inline]
    pub fn is_deprecated(&self) -> bool {
        matches!(self, Deprecation::Deprecated { .. })
    }

    #[inline]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Deprecation::NoDeprecated => None,
            Deprecation::Deprecated { reason } => reason.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MetaField {
    pub description: Option<String>,
    pub name: Name,
    pub arguments: IndexMap<Name, MetaInputValue>,
    pub ty: Type,
    pub deprecation: Deprecation,
}

impl MetaField {
    /// Two definitions of the same field are compatible when their types and
    /// arguments agree; descriptions and deprecations may differ.
    fn same_signature(&self, other: &MetaField) -> bool {
        self.ty == other.ty
            && self.arguments.len() == other.arguments.len()
            && self.arguments.iter().all(|(name, arg)| {
                other
                    .arguments
                    .get(name)
                    .map_or(false, |other| arg.same_signature(other))
            })
    }
}

#[derive(Debug, Eq, PartialEq, Copy, Clone)]
pub enum TypeKind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MetaEnumValue {
    pub description: Option<String>,
    pub value: Name,
    pub deprecation: Deprecation,
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MetaInputValue {
    pub description: Option<String>,
    pub name: Name,
    pub ty: Type,
    pub default_value: Option<ConstValue>,
}

impl MetaInputValue {
    /// Whether the value must be supplied by the caller.
    #[inline]
    pub fn is_required(&self) -> bool {
        !self.ty.nullable && self.default_value.is_none()
    }

    fn same_signature(&self, other: &MetaInputValue) -> bool {
        self.ty == other.ty && self.default_value == other.default_value
    }
}

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct MetaType {
    pub description: Option<String>,
    pub name: Name,
    pub kind: TypeKind,
    pub implements: IndexSet<Name>,
    pub fields: IndexMap<Name, MetaField>,
    pub possible_types: IndexSet<Name>,
    pub enum_values: IndexMap<Name, MetaEnumValue>,
    pub input_fields: IndexMap<Name, MetaInputValue>,
}

impl MetaType {
    fn new(name: Name, kind: TypeKind) -> Self {
        Self {
            description: None,
            name,
            kind,
            implements: Default::default(),
            fields: Default::default(),
            possible_types: Default::default(),
            enum_values: Default::default(),
            input_fields: Default::default(),
        }
    }

    #[inline]
    pub fn field_by_name(&self, name: &str) -> Option<&MetaField> {
        self.fields.get(name)
    }

    #[inline]
    pub fn is_abstract(&self) -> bool {
        matches!(self.kind, TypeKind::Interface | TypeKind::Union)
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, TypeKind::Enum | TypeKind::Scalar)
    }

    #[inline]
    pub fn is_possible_type(&self, type_name: &str) -> bool {
        match self.kind {
            TypeKind::Interface | TypeKind::Union => self.possible_types.contains(type_name),
            TypeKind::Object => self.name == type_name,
            _ => false,
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }
}

impl From<OperationType> for OperationKind {
    fn from(ty: OperationType) -> Self {
        match ty {
            OperationType::Query => OperationKind::Query,
            OperationType::Mutation => OperationKind::Mutation,
            OperationType::Subscription => OperationKind::Subscription,
        }
    }
}

impl Display for OperationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Root type name of each operation kind.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct RootMap {
    pub query: Option<Name>,
    pub mutation: Option<Name>,
    pub subscription: Option<Name>,
}

impl Default for RootMap {
    fn default() -> Self {
        Self {
            query: Some(Name::new("Query")),
            mutation: Some(Name::new("Mutation")),
            subscription: Some(Name::new("Subscription")),
        }
    }
}

impl RootMap {
    #[inline]
    pub fn get(&self, kind: OperationKind) -> Option<&str> {
        match kind {
            OperationKind::Query => self.query.as_deref(),
            OperationKind::Mutation => self.mutation.as_deref(),
            OperationKind::Subscription => self.subscription.as_deref(),
        }
    }

    fn entries(&self) -> [(OperationKind, Option<&Name>); 3] {
        [
            (OperationKind::Query, self.query.as_ref()),
            (OperationKind::Mutation, self.mutation.as_ref()),
            (OperationKind::Subscription, self.subscription.as_ref()),
        ]
    }
}

/// Every type of a schema, keyed by name, plus the root map.
///
/// Types reference each other by name only, so recursive shapes such as
/// `User -> FamilyInfo -> User` are ordinary lookups.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    root_map: RootMap,
    types: IndexMap<Name, MetaType>,
}

impl Registry {
    pub fn parse(document: &str) -> Result<Registry, SchemaError> {
        Self::new(parser::parse_schema(document)?)
    }

    /// Parses and merges several type-definition documents.
    pub fn parse_many<I, S>(documents: I) -> Result<Registry, SchemaError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let documents = documents
            .into_iter()
            .map(|document| parser::parse_schema(document.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Self::combine(documents)
    }

    /// Builds the registry from a JSON introspection result, either the full
    /// response or its `data` object.
    pub fn from_introspection(introspection: serde_json::Value) -> Result<Registry, SchemaError> {
        let sdl = introspection_to_sdl(introspection)?;
        tracing::trace!(sdl = %sdl, "Introspection result printed.");
        Self::parse(&sdl)
    }

    pub fn new(document: ServiceDocument) -> Result<Registry, SchemaError> {
        Self::combine(std::iter::once(document))
    }

    pub fn combine(
        documents: impl IntoIterator<Item = ServiceDocument>,
    ) -> Result<Registry, SchemaError> {
        let mut registry = Registry::default();
        let mut schema_definition = None;
        let mut schema_extensions = Vec::new();

        for document in documents {
            let mut declared = HashSet::new();

            for definition in document.definitions {
                match definition {
                    TypeSystemDefinition::Schema(schema) => {
                        if schema.node.extend {
                            schema_extensions.push(schema.node);
                        } else if schema_definition.is_some() {
                            return Err(SchemaError::SchemaDefinedMoreThanOnce);
                        } else {
                            schema_definition = Some(schema.node);
                        }
                    }
                    TypeSystemDefinition::Type(type_definition) => {
                        let name = type_definition.node.name.node.clone();
                        if !type_definition.node.extend && !declared.insert(name.clone()) {
                            return Err(SchemaError::TypeDefinedMoreThanOnce {
                                type_name: name.to_string(),
                            });
                        }
                        registry.merge_type(convert_type_definition(type_definition.node))?;
                    }
                    TypeSystemDefinition::Directive(_) => {}
                }
            }
        }

        let explicit_roots = schema_definition.is_some() || !schema_extensions.is_empty();
        if let Some(schema_definition) = schema_definition {
            convert_schema_definition(&mut registry.root_map, schema_definition, false);
        }
        for extension in schema_extensions {
            convert_schema_definition(&mut registry.root_map, extension, true);
        }

        finish_registry(&mut registry, explicit_roots)?;
        tracing::debug!(
            types = registry.types.len(),
            query = ?registry.root_map.query,
            mutation = ?registry.root_map.mutation,
            subscription = ?registry.root_map.subscription,
            "Schema registry built."
        );
        Ok(registry)
    }

    #[inline]
    pub fn root_map(&self) -> &RootMap {
        &self.root_map
    }

    #[inline]
    pub fn root_type(&self, kind: OperationKind) -> Option<&MetaType> {
        self.root_map.get(kind).and_then(|name| self.types.get(name))
    }

    /// The operation kind a type is the root of, if any.
    pub fn operation_kind_of(&self, type_name: &str) -> Option<OperationKind> {
        self.root_map
            .entries()
            .into_iter()
            .find(|(_, name)| name.map_or(false, |name| name.as_str() == type_name))
            .map(|(kind, _)| kind)
    }

    #[inline]
    pub fn types(&self) -> impl Iterator<Item = &MetaType> {
        self.types.values()
    }

    #[inline]
    pub fn get_type(&self, name: &str) -> Option<&MetaType> {
        self.types.get(name)
    }

    #[inline]
    pub fn concrete_type(&self, ty: &Type) -> Option<&MetaType> {
        self.types.get(ty.concrete_typename())
    }

    fn merge_type(&mut self, meta_type: MetaType) -> Result<(), SchemaError> {
        let existing = match self.types.get_mut(&meta_type.name) {
            Some(existing) => existing,
            None => {
                self.types.insert(meta_type.name.clone(), meta_type);
                return Ok(());
            }
        };

        if existing.kind != meta_type.kind {
            return Err(SchemaError::DefinitionConflicted {
                type_name: meta_type.name.to_string(),
            });
        }

        for (name, field) in meta_type.fields {
            match existing.fields.get(&name) {
                Some(current) if !current.same_signature(&field) => {
                    return Err(SchemaError::FieldConflicted {
                        type_name: meta_type.name.to_string(),
                        field_name: name.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    existing.fields.insert(name, field);
                }
            }
        }

        for (name, field) in meta_type.input_fields {
            match existing.input_fields.get(&name) {
                Some(current) if !current.same_signature(&field) => {
                    return Err(SchemaError::FieldConflicted {
                        type_name: meta_type.name.to_string(),
                        field_name: name.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    existing.input_fields.insert(name, field);
                }
            }
        }

        for (name, value) in meta_type.enum_values {
            existing.enum_values.entry(name).or_insert(value);
        }
        existing.implements.extend(meta_type.implements);
        existing.possible_types.extend(meta_type.possible_types);
        if existing.description.is_none() {
            existing.description = meta_type.description;
        }
        Ok(())
    }
}

fn convert_schema_definition(
    root_map: &mut RootMap,
    schema_definition: SchemaDefinition,
    extend: bool,
) {
    let query = schema_definition.query.map(|name| name.node);
    let mutation = schema_definition.mutation.map(|name| name.node);
    let subscription = schema_definition.subscription.map(|name| name.node);

    if extend {
        root_map.query = query.or(root_map.query.take());
        root_map.mutation = mutation.or(root_map.mutation.take());
        root_map.subscription = subscription.or(root_map.subscription.take());
    } else {
        root_map.query = query;
        root_map.mutation = mutation;
        root_map.subscription = subscription;
    }
}

fn convert_type_definition(definition: TypeDefinition) -> MetaType {
    let mut type_definition = MetaType::new(definition.name.node, TypeKind::Scalar);
    type_definition.description = definition.description.map(|description| description.node);

    match definition.kind {
        types::TypeKind::Scalar => type_definition.kind = TypeKind::Scalar,
        types::TypeKind::Object(ObjectType { implements, fields }) => {
            type_definition.kind = TypeKind::Object;
            type_definition.implements = implements
                .into_iter()
                .map(|implement| implement.node)
                .collect();
            type_definition
                .fields
                .extend(fields.into_iter().map(|field| {
                    (
                        field.node.name.node.clone(),
                        convert_field_definition(field.node),
                    )
                }));
        }
        types::TypeKind::Interface(InterfaceType { implements, fields }) => {
            type_definition.kind = TypeKind::Interface;
            type_definition.implements = implements.into_iter().map(|name| name.node).collect();
            type_definition.fields = fields
                .into_iter()
                .map(|field| {
                    (
                        field.node.name.node.clone(),
                        convert_field_definition(field.node),
                    )
                })
                .collect();
        }
        types::TypeKind::Union(UnionType { members }) => {
            type_definition.kind = TypeKind::Union;
            type_definition.possible_types = members.into_iter().map(|name| name.node).collect();
        }
        types::TypeKind::Enum(EnumType { values }) => {
            type_definition.kind = TypeKind::Enum;
            type_definition
                .enum_values
                .extend(values.into_iter().map(|value| {
                    (
                        value.node.value.node.clone(),
                        MetaEnumValue {
                            description: value.node.description.map(|description| description.node),
                            value: value.node.value.node,
                            deprecation: get_deprecated(&value.node.directives),
                        },
                    )
                }));
        }
        types::TypeKind::InputObject(InputObjectType { fields }) => {
            type_definition.kind = TypeKind::InputObject;
            type_definition
                .input_fields
                .extend(fields.into_iter().map(|field| {
                    (
                        field.node.name.node.clone(),
                        convert_input_value_definition(field.node),
                    )
                }));
        }
    }

    type_definition
}

fn convert_field_definition(definition: types::FieldDefinition) -> MetaField {
    MetaField {
        description: definition.description.map(|description| description.node),
        name: definition.name.node,
        arguments: definition
            .arguments
            .into_iter()
            .map(|arg| {
                (
                    arg.node.name.node.clone(),
                    convert_input_value_definition(arg.node),
                )
            })
            .collect(),
        ty: definition.ty.node,
        deprecation: get_deprecated(&definition.directives),
    }
}

fn convert_input_value_definition(arg: types::InputValueDefinition) -> MetaInputValue {
    MetaInputValue {
        description: arg.description.map(|description| description.node),
        name: arg.name.node,
        ty: arg.ty.node,
        default_value: arg.default_value.map(|default_value| default_value.node),
    }
}

fn get_argument_str<'a>(
    arguments: &'a [(Positioned<Name>, Positioned<ConstValue>)],
    name: &str,
) -> Option<&'a str> {
    arguments.iter().find_map(|(arg_name, value)| {
        match (arg_name.node.as_str() == name, &value.node) {
            (true, ConstValue::String(s)) => Some(s.as_str()),
            _ => None,
        }
    })
}

fn get_deprecated(directives: &[Positioned<ConstDirective>]) -> Deprecation {
    directives
        .iter()
        .find(|directive| directive.node.name.node.as_str() == "deprecated")
        .map(|directive| Deprecation::Deprecated {
            reason: get_argument_str(&directive.node.arguments, "reason").map(ToString::to_string),
        })
        .unwrap_or(Deprecation::NoDeprecated)
}

fn finish_registry(registry: &mut Registry, explicit_roots: bool) -> Result<(), SchemaError> {
    for name in BUILTIN_SCALARS {
        registry
            .types
            .entry(Name::new(name))
            .or_insert_with(|| MetaType::new(Name::new(name), TypeKind::Scalar));
    }

    for (kind, name) in registry.root_map.entries() {
        if let Some(name) = name {
            if explicit_roots && !registry.types.contains_key(name) {
                return Err(SchemaError::RootTypeNotFound {
                    operation: kind.as_str(),
                    type_name: name.to_string(),
                });
            }
        }
    }

    let mut possible_types: IndexMap<Name, IndexSet<Name>> = Default::default();
    for ty in registry.types.values() {
        if ty.kind == TypeKind::Object {
            for implement in &ty.implements {
                possible_types
                    .entry(implement.clone())
                    .or_default()
                    .insert(ty.name.clone());
            }
        }
    }
    for (name, types) in possible_types {
        if let Some(ty) = registry.types.get_mut(&name) {
            if ty.kind == TypeKind::Interface {
                ty.possible_types.extend(types);
            }
        }
    }

    check_references(registry)
}

fn check_references(registry: &Registry) -> Result<(), SchemaError> {
    let check = |type_name: &str, referenced_by: &dyn Fn() -> String| {
        if registry.types.contains_key(type_name) {
            Ok(())
        } else {
            Err(SchemaError::UnknownType {
                type_name: type_name.to_string(),
                referenced_by: referenced_by(),
            })
        }
    };

    for ty in registry.types.values() {
        for field in ty.fields.values() {
            check(field.ty.concrete_typename(), &|| {
                format!("{}.{}", ty.name, field.name)
            })?;
            for arg in field.arguments.values() {
                check(arg.ty.concrete_typename(), &|| {
                    format!("{}.{}({}:)", ty.name, field.name, arg.name)
                })?;
            }
        }
        for field in ty.input_fields.values() {
            check(field.ty.concrete_typename(), &|| {
                format!("{}.{}", ty.name, field.name)
            })?;
        }
        for name in ty.implements.iter() {
            check(name, &|| ty.name.to_string())?;
        }
        if ty.kind == TypeKind::Union {
            for member in &ty.possible_types {
                check(member, &|| ty.name.to_string())?;
            }
        }
    }
    Ok(())
}
