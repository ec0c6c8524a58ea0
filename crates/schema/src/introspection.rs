use std::fmt::Write;

use serde::Deserialize;

use crate::SchemaError;

const BUILTIN_SCALARS: &[&str] = &["String", "Int", "Float", "Boolean", "ID"];

#[derive(Debug, Deserialize)]
struct Response {
    data: Option<SchemaField>,
    #[serde(rename = "__schema")]
    schema: Option<Schema>,
}

#[derive(Debug, Deserialize)]
struct SchemaField {
    #[serde(rename = "__schema")]
    schema: Schema,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Schema {
    query_type: Option<NamedType>,
    mutation_type: Option<NamedType>,
    subscription_type: Option<NamedType>,
    types: Vec<FullType>,
}

#[derive(Debug, Deserialize)]
struct NamedType {
    name: String,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum Kind {
    Scalar,
    Object,
    Interface,
    Union,
    Enum,
    InputObject,
    List,
    NonNull,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FullType {
    kind: Kind,
    name: String,
    description: Option<String>,
    fields: Option<Vec<Field>>,
    input_fields: Option<Vec<InputValue>>,
    interfaces: Option<Vec<TypeRef>>,
    enum_values: Option<Vec<EnumValue>>,
    possible_types: Option<Vec<TypeRef>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Field {
    name: String,
    description: Option<String>,
    #[serde(default)]
    args: Vec<InputValue>,
    #[serde(rename = "type")]
    ty: TypeRef,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InputValue {
    name: String,
    description: Option<String>,
    #[serde(rename = "type")]
    ty: TypeRef,
    /// A GraphQL literal, as printed by the server.
    default_value: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnumValue {
    name: String,
    description: Option<String>,
    #[serde(default)]
    is_deprecated: bool,
    deprecation_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TypeRef {
    kind: Kind,
    name: Option<String>,
    of_type: Option<Box<TypeRef>>,
}

/// Prints an introspection result, with or without its `data` envelope, as
/// a type-definition document.
pub(crate) fn introspection_to_sdl(value: serde_json::Value) -> Result<String, SchemaError> {
    let response: Response = serde_json::from_value(value)?;
    let schema = match (response.data, response.schema) {
        (Some(data), _) => data.schema,
        (None, Some(schema)) => schema,
        (None, None) => {
            return Err(SchemaError::InvalidIntrospection {
                message: "missing \"__schema\"".to_string(),
            })
        }
    };

    let mut sdl = String::new();
    let roots = [
        ("query", &schema.query_type),
        ("mutation", &schema.mutation_type),
        ("subscription", &schema.subscription_type),
    ];
    if roots.iter().any(|(_, root)| root.is_some()) {
        sdl.push_str("schema {\n");
        for (operation, root) in roots {
            if let Some(root) = root {
                let _ = writeln!(sdl, "  {}: {}", operation, root.name);
            }
        }
        sdl.push_str("}\n");
    }

    for ty in &schema.types {
        if ty.name.starts_with("__") || BUILTIN_SCALARS.contains(&ty.name.as_str()) {
            continue;
        }
        print_type(&mut sdl, ty)?;
    }
    Ok(sdl)
}

fn print_type(sdl: &mut String, ty: &FullType) -> Result<(), SchemaError> {
    sdl.push('\n');
    print_description(sdl, "", &ty.description);

    match ty.kind {
        Kind::Scalar => {
            let _ = writeln!(sdl, "scalar {}", ty.name);
        }
        Kind::Object | Kind::Interface => {
            let keyword = if ty.kind == Kind::Object { "type" } else { "interface" };
            let _ = write!(sdl, "{} {}", keyword, ty.name);
            let interfaces = named_list(ty.interfaces.as_deref().unwrap_or_default())?;
            if !interfaces.is_empty() {
                let _ = write!(sdl, " implements {}", interfaces.join(" & "));
            }
            let mut body = String::new();
            for field in ty.fields.as_deref().unwrap_or_default() {
                print_description(&mut body, "  ", &field.description);
                let _ = write!(body, "  {}", field.name);
                if !field.args.is_empty() {
                    let args = field
                        .args
                        .iter()
                        .map(input_value)
                        .collect::<Result<Vec<_>, _>>()?;
                    let _ = write!(body, "({})", args.join(", "));
                }
                let _ = write!(body, ": {}", type_ref(&field.ty)?);
                print_deprecated(&mut body, field.is_deprecated, &field.deprecation_reason);
                body.push('\n');
            }
            print_body(sdl, &body);
        }
        Kind::Union => {
            let members = named_list(ty.possible_types.as_deref().unwrap_or_default())?;
            if members.is_empty() {
                let _ = writeln!(sdl, "union {}", ty.name);
            } else {
                let _ = writeln!(sdl, "union {} = {}", ty.name, members.join(" | "));
            }
        }
        Kind::Enum => {
            let _ = write!(sdl, "enum {}", ty.name);
            let mut body = String::new();
            for value in ty.enum_values.as_deref().unwrap_or_default() {
                print_description(&mut body, "  ", &value.description);
                let _ = write!(body, "  {}", value.name);
                print_deprecated(&mut body, value.is_deprecated, &value.deprecation_reason);
                body.push('\n');
            }
            print_body(sdl, &body);
        }
        Kind::InputObject => {
            let _ = write!(sdl, "input {}", ty.name);
            let mut body = String::new();
            for field in ty.input_fields.as_deref().unwrap_or_default() {
                print_description(&mut body, "  ", &field.description);
                let _ = writeln!(body, "  {}", input_value(field)?);
            }
            print_body(sdl, &body);
        }
        Kind::List | Kind::NonNull => {
            return Err(SchemaError::InvalidIntrospection {
                message: format!("type \"{}\" is a wrapper", ty.name),
            })
        }
    }
    Ok(())
}

/// Type definitions without members omit their braces.
fn print_body(sdl: &mut String, body: &str) {
    if body.is_empty() {
        sdl.push('\n');
    } else {
        let _ = write!(sdl, " {{\n{}}}\n", body);
    }
}

fn input_value(value: &InputValue) -> Result<String, SchemaError> {
    let mut printed = format!("{}: {}", value.name, type_ref(&value.ty)?);
    if let Some(default_value) = &value.default_value {
        let _ = write!(printed, " = {}", default_value);
    }
    Ok(printed)
}

fn type_ref(ty: &TypeRef) -> Result<String, SchemaError> {
    match (ty.kind, &ty.of_type, &ty.name) {
        (Kind::NonNull, Some(inner), _) => Ok(format!("{}!", type_ref(inner)?)),
        (Kind::List, Some(inner), _) => Ok(format!("[{}]", type_ref(inner)?)),
        (Kind::NonNull | Kind::List, None, _) => Err(SchemaError::InvalidIntrospection {
            message: "wrapping type without \"ofType\"".to_string(),
        }),
        (_, _, Some(name)) => Ok(name.clone()),
        (_, _, None) => Err(SchemaError::InvalidIntrospection {
            message: "named type without \"name\"".to_string(),
        }),
    }
}

fn named_list(types: &[TypeRef]) -> Result<Vec<String>, SchemaError> {
    types.iter().map(type_ref).collect()
}

fn print_description(sdl: &mut String, indent: &str, description: &Option<String>) {
    if let Some(description) = description {
        let _ = writeln!(sdl, "{}{}", indent, string_literal(description));
    }
}

fn print_deprecated(sdl: &mut String, is_deprecated: bool, reason: &Option<String>) {
    match (is_deprecated, reason) {
        (false, _) => {}
        (true, Some(reason)) => {
            let _ = write!(sdl, " @deprecated(reason: {})", string_literal(reason));
        }
        (true, None) => sdl.push_str(" @deprecated"),
    }
}

/// JSON string escapes are valid GraphQL string escapes.
fn string_literal(value: &str) -> String {
    serde_json::Value::String(value.to_string()).to_string()
}
