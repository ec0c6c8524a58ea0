use std::collections::HashMap;

use graphmock_schema::{OperationKind, Registry, ValueExt};
use indexmap::IndexSet;
use parser::types::{
    Directive, DocumentOperations, ExecutableDocument, Field, FragmentDefinition,
    OperationDefinition, Selection as AstSelection, SelectionSet, Type,
};
use parser::{Pos, Positioned};
use value::{ConstValue, Name, Value, Variables};

use crate::ValidationError;

/// Literal category of an argument as written in the document.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ArgumentKind {
    Variable,
    Null,
    Int,
    Float,
    String,
    Boolean,
    Enum,
    List,
    Object,
}

impl ArgumentKind {
    pub fn of(value: &Value) -> ArgumentKind {
        match value {
            Value::Variable(_) => ArgumentKind::Variable,
            Value::Null => ArgumentKind::Null,
            Value::Number(n) if n.is_f64() => ArgumentKind::Float,
            Value::Number(_) => ArgumentKind::Int,
            Value::Boolean(_) => ArgumentKind::Boolean,
            Value::Enum(_) => ArgumentKind::Enum,
            Value::List(_) => ArgumentKind::List,
            Value::Object(_) => ArgumentKind::Object,
            _ => ArgumentKind::String,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Argument {
    pub name: Name,
    pub kind: ArgumentKind,
    /// The value as written, variables unresolved.
    pub value: Value,
    /// The value with variables substituted; `None` when it refers to a
    /// variable that was neither supplied nor defaulted.
    pub resolved: Option<ConstValue>,
    pub pos: Pos,
}

#[derive(Debug, Clone)]
pub struct SelectedField {
    pub name: Name,
    pub alias: Name,
    pub arguments: Vec<Argument>,
    pub selections: Vec<Selection>,
    pub pos: Pos,
}

impl SelectedField {
    #[inline]
    pub fn argument(&self, name: &str) -> Option<&Argument> {
        self.arguments.iter().find(|argument| argument.name == name)
    }
}

#[derive(Debug, Clone)]
pub struct InlineFragment {
    pub type_condition: Option<Name>,
    pub selections: Vec<Selection>,
    pub pos: Pos,
}

/// A selection with fragment spreads already replaced by the fragment body.
#[derive(Debug, Clone)]
pub enum Selection {
    Field(SelectedField),
    InlineFragment(InlineFragment),
}

#[derive(Debug, Clone)]
pub struct DeclaredVariable {
    pub name: Name,
    pub ty: Type,
    pub default_value: Option<ConstValue>,
}

/// One root field of an operation.
#[derive(Debug, Clone)]
pub struct OperationDescriptor {
    pub kind: OperationKind,
    pub declared_name: Option<Name>,
    pub field: SelectedField,
}

impl OperationDescriptor {
    #[inline]
    pub fn name(&self) -> &str {
        &self.field.name
    }

    #[inline]
    pub fn alias(&self) -> &str {
        &self.field.alias
    }
}

#[derive(Debug, Clone)]
pub struct ParsedOperation {
    pub kind: OperationKind,
    pub declared_name: Option<Name>,
    pub variables: Vec<DeclaredVariable>,
    /// Variables used outside the kept arguments: `@skip`/`@include`
    /// conditions and the arguments of skipped selections.
    pub directive_variables: IndexSet<Name>,
    pub descriptors: Vec<OperationDescriptor>,
}

/// Parses `source` and selects the operation to run.
pub fn parse_operation(
    registry: &Registry,
    source: &str,
    operation_name: Option<&str>,
    variables: &Variables,
) -> Result<ParsedOperation, ValidationError> {
    let document = parser::parse_query(source)?;
    OperationParser::new(registry, &document, variables)
        .operation_name(operation_name)
        .parse()
}

pub struct OperationParser<'a> {
    registry: &'a Registry,
    document: &'a ExecutableDocument,
    variables: &'a Variables,
    operation_name: Option<&'a str>,
}

impl<'a> OperationParser<'a> {
    pub fn new(
        registry: &'a Registry,
        document: &'a ExecutableDocument,
        variables: &'a Variables,
    ) -> Self {
        Self {
            registry,
            document,
            variables,
            operation_name: None,
        }
    }

    pub fn operation_name(self, operation_name: Option<&'a str>) -> Self {
        Self {
            operation_name,
            ..self
        }
    }

    pub fn parse(&self) -> Result<ParsedOperation, ValidationError> {
        let (declared_name, operation) = self.select_operation()?;
        let kind = OperationKind::from(operation.node.ty);

        let declared = operation
            .node
            .variable_definitions
            .iter()
            .map(|definition| DeclaredVariable {
                name: definition.node.name.node.clone(),
                ty: definition.node.var_type.node.clone(),
                default_value: definition
                    .node
                    .default_value
                    .as_ref()
                    .map(|value| value.node.clone()),
            })
            .collect::<Vec<_>>();

        let mut ctx = Context {
            fragments: &self.document.fragments,
            declared: &declared,
            variables: self.variables,
            directive_variables: IndexSet::new(),
            fragment_stack: Vec::new(),
        };
        let selections = ctx.convert_selection_set(&operation.node.selection_set.node)?;
        let directive_variables = ctx.directive_variables;

        let mut fields = Vec::new();
        self.hoist_fields(kind, selections, &mut fields)?;
        let mut descriptors = fields
            .into_iter()
            .map(|field| OperationDescriptor {
                kind,
                declared_name: declared_name.clone(),
                field,
            })
            .collect::<Vec<_>>();

        if kind == OperationKind::Mutation {
            self.bind_mutation_inputs(&mut descriptors)?;
        }

        tracing::trace!(
            kind = %kind,
            operation = ?declared_name,
            fields = descriptors.len(),
            "Operation parsed."
        );

        Ok(ParsedOperation {
            kind,
            declared_name,
            variables: declared,
            directive_variables,
            descriptors,
        })
    }

    fn select_operation(
        &self,
    ) -> Result<(Option<Name>, &'a Positioned<OperationDefinition>), ValidationError> {
        match (&self.document.operations, self.operation_name) {
            (DocumentOperations::Single(operation), _) => Ok((None, operation)),
            (DocumentOperations::Multiple(operations), Some(name)) => operations
                .get_key_value(name)
                .map(|(name, operation)| (Some(name.clone()), operation))
                .ok_or_else(|| ValidationError::UnknownOperation {
                    name: name.to_string(),
                }),
            (DocumentOperations::Multiple(operations), None) => {
                let mut iter = operations.iter();
                match (iter.next(), iter.next()) {
                    (Some((name, operation)), None) => Ok((Some(name.clone()), operation)),
                    (None, _) => Err(ValidationError::NoOperation),
                    (Some(_), Some(_)) => Err(ValidationError::OperationNameRequired),
                }
            }
        }
    }

    /// Lifts root fields out of top-level fragments, whose type condition
    /// must cover the root type.
    fn hoist_fields(
        &self,
        kind: OperationKind,
        selections: Vec<Selection>,
        fields: &mut Vec<SelectedField>,
    ) -> Result<(), ValidationError> {
        for selection in selections {
            match selection {
                Selection::Field(field) => fields.push(field),
                Selection::InlineFragment(fragment) => {
                    if let Some(type_name) = &fragment.type_condition {
                        self.check_root_condition(kind, type_name)?;
                    }
                    self.hoist_fields(kind, fragment.selections, fields)?;
                }
            }
        }
        Ok(())
    }

    fn check_root_condition(&self, kind: OperationKind, type_name: &str) -> Result<(), ValidationError> {
        let fragment_type =
            self.registry
                .get_type(type_name)
                .ok_or_else(|| ValidationError::UnknownType {
                    type_name: type_name.to_string(),
                })?;
        match self.registry.root_type(kind) {
            Some(root) if !fragment_type.is_possible_type(&root.name) => {
                Err(ValidationError::FragmentTypeMismatch {
                    parent: root.name.to_string(),
                    type_name: type_name.to_string(),
                })
            }
            _ => Ok(()),
        }
    }

    /// Mutation fields that declare arguments but receive none take the whole
    /// variables object as their first argument.
    fn bind_mutation_inputs(
        &self,
        descriptors: &mut [OperationDescriptor],
    ) -> Result<(), ValidationError> {
        let root = match self.registry.root_type(OperationKind::Mutation) {
            Some(root) => root,
            None => return Ok(()),
        };

        for descriptor in descriptors {
            let definition = match root.field_by_name(descriptor.name()) {
                Some(definition) => definition,
                None => continue,
            };
            if definition.arguments.is_empty() || !descriptor.field.arguments.is_empty() {
                continue;
            }
            if self.variables.is_empty() {
                return Err(ValidationError::MissingVariables);
            }
            if let Some((name, _)) = definition.arguments.first() {
                let input = self.variables.clone().into_value();
                descriptor.field.arguments.push(Argument {
                    name: name.clone(),
                    kind: ArgumentKind::Object,
                    value: input.clone().into_value(),
                    resolved: Some(input),
                    pos: descriptor.field.pos,
                });
            }
        }
        Ok(())
    }
}

struct Context<'a> {
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    declared: &'a [DeclaredVariable],
    variables: &'a Variables,
    directive_variables: IndexSet<Name>,
    fragment_stack: Vec<Name>,
}

impl<'a> Context<'a> {
    fn convert_selection_set(
        &mut self,
        selection_set: &SelectionSet,
    ) -> Result<Vec<Selection>, ValidationError> {
        let mut selections = Vec::new();

        for selection in &selection_set.items {
            match &selection.node {
                AstSelection::Field(field) => {
                    if self.is_skipped(&field.node.directives)? {
                        self.record_skipped(&selection.node);
                        continue;
                    }
                    selections.push(Selection::Field(self.convert_field(field)?));
                }
                AstSelection::FragmentSpread(spread) => {
                    if self.is_skipped(&spread.node.directives)? {
                        self.record_skipped(&selection.node);
                        continue;
                    }
                    let name = &spread.node.fragment_name.node;
                    let fragment = self.fragments.get(name).ok_or_else(|| {
                        ValidationError::UnknownFragment {
                            name: name.to_string(),
                        }
                    })?;
                    if self.fragment_stack.contains(name) {
                        return Err(ValidationError::FragmentCycle {
                            name: name.to_string(),
                        });
                    }

                    self.fragment_stack.push(name.clone());
                    let inner = self.convert_selection_set(&fragment.node.selection_set.node)?;
                    self.fragment_stack.pop();

                    selections.push(Selection::InlineFragment(InlineFragment {
                        type_condition: Some(fragment.node.type_condition.node.on.node.clone()),
                        selections: inner,
                        pos: spread.pos,
                    }));
                }
                AstSelection::InlineFragment(inline_fragment) => {
                    if self.is_skipped(&inline_fragment.node.directives)? {
                        self.record_skipped(&selection.node);
                        continue;
                    }
                    let inner =
                        self.convert_selection_set(&inline_fragment.node.selection_set.node)?;
                    selections.push(Selection::InlineFragment(InlineFragment {
                        type_condition: inline_fragment
                            .node
                            .type_condition
                            .as_ref()
                            .map(|condition| condition.node.on.node.clone()),
                        selections: inner,
                        pos: inline_fragment.pos,
                    }));
                }
            }
        }

        Ok(selections)
    }

    fn convert_field(&mut self, field: &Positioned<Field>) -> Result<SelectedField, ValidationError> {
        let arguments = field
            .node
            .arguments
            .iter()
            .map(|(name, value)| self.convert_argument(name, value))
            .collect::<Result<Vec<_>, _>>()?;
        let selections = self.convert_selection_set(&field.node.selection_set.node)?;

        Ok(SelectedField {
            name: field.node.name.node.clone(),
            alias: field.node.response_key().node.clone(),
            arguments,
            selections,
            pos: field.pos,
        })
    }

    fn convert_argument(
        &self,
        name: &Positioned<Name>,
        value: &Positioned<Value>,
    ) -> Result<Argument, ValidationError> {
        let resolved = match &value.node {
            Value::Variable(variable) => self.variable_value(variable)?,
            value => Some(self.resolve(value)?),
        };
        Ok(Argument {
            name: name.node.clone(),
            kind: ArgumentKind::of(&value.node),
            value: value.node.clone(),
            resolved,
            pos: name.pos,
        })
    }

    fn variable_value(&self, name: &Name) -> Result<Option<ConstValue>, ValidationError> {
        let declared = self
            .declared
            .iter()
            .find(|variable| variable.name == *name)
            .ok_or_else(|| ValidationError::UndefinedVariable {
                name: name.to_string(),
            })?;
        Ok(self
            .variables
            .get(name)
            .cloned()
            .or_else(|| declared.default_value.clone()))
    }

    fn resolve(&self, value: &Value) -> Result<ConstValue, ValidationError> {
        value
            .clone()
            .into_const_with(|name| Ok(self.variable_value(&name)?.unwrap_or(ConstValue::Null)))
    }

    /// A skipped selection still counts as using every variable it references.
    fn record_skipped(&mut self, selection: &AstSelection) {
        let mut visited = Vec::new();
        self.record_selection_variables(selection, &mut visited);
    }

    fn record_selection_variables(&mut self, selection: &AstSelection, visited: &mut Vec<Name>) {
        let (directives, selection_set) = match selection {
            AstSelection::Field(field) => {
                for (_, value) in &field.node.arguments {
                    self.record_variables(&value.node);
                }
                (&field.node.directives, Some(&field.node.selection_set.node))
            }
            AstSelection::InlineFragment(fragment) => (
                &fragment.node.directives,
                Some(&fragment.node.selection_set.node),
            ),
            AstSelection::FragmentSpread(spread) => {
                let name = &spread.node.fragment_name.node;
                let fragments = self.fragments;
                let selection_set = match fragments.get(name) {
                    Some(fragment) if !visited.contains(name) => {
                        visited.push(name.clone());
                        Some(&fragment.node.selection_set.node)
                    }
                    _ => None,
                };
                (&spread.node.directives, selection_set)
            }
        };

        for directive in directives {
            for (_, value) in &directive.node.arguments {
                self.record_variables(&value.node);
            }
        }
        if let Some(selection_set) = selection_set {
            for item in &selection_set.items {
                self.record_selection_variables(&item.node, visited);
            }
        }
    }

    fn record_variables(&mut self, value: &Value) {
        self.directive_variables
            .extend(value.referenced_variables().into_iter().map(Name::new));
    }

    fn is_skipped(&mut self, directives: &[Positioned<Directive>]) -> Result<bool, ValidationError> {
        for directive in directives {
            for (_, value) in &directive.node.arguments {
                self.record_variables(&value.node);
            }

            let include = match directive.node.name.node.as_str() {
                "skip" => false,
                "include" => true,
                _ => continue,
            };
            let condition = directive
                .node
                .arguments
                .iter()
                .find(|(name, _)| name.node.as_str() == "if")
                .map(|(_, value)| self.resolve(&value.node))
                .transpose()?;
            match condition {
                Some(ConstValue::Boolean(condition)) if condition != include => return Ok(true),
                Some(ConstValue::Boolean(_)) => {}
                _ => {
                    return Err(ValidationError::ArgumentType {
                        argument: "if".to_string(),
                        type_name: "Boolean".to_string(),
                    })
                }
            }
        }
        Ok(false)
    }
}
