use parser::types::{BaseType, Type};
use value::Name;

pub trait TypeExt {
    fn concrete_typename(&self) -> &str;
    fn is_list(&self) -> bool;
    fn list_element(&self) -> Option<&Type>;
    fn type_ref(&self) -> TypeRef;
}

impl TypeExt for Type {
    fn concrete_typename(&self) -> &str {
        match &self.base {
            BaseType::Named(name) => name.as_str(),
            BaseType::List(ty) => ty.concrete_typename(),
        }
    }

    #[inline]
    fn is_list(&self) -> bool {
        matches!(self.base, BaseType::List(_))
    }

    #[inline]
    fn list_element(&self) -> Option<&Type> {
        match &self.base {
            BaseType::List(ty) => Some(ty),
            BaseType::Named(_) => None,
        }
    }

    fn type_ref(&self) -> TypeRef {
        TypeRef {
            name: Name::new(self.concrete_typename()),
            non_null: !self.nullable,
            is_array: self.is_list(),
            non_null_elements: self.list_element().map_or(false, |ty| !ty.nullable),
        }
    }
}

/// Flattened view of a wrapped type, e.g. `[Int!]!` has `non_null`,
/// `is_array` and `non_null_elements` set while `[Int]!` only the first two.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: Name,
    pub non_null: bool,
    pub is_array: bool,
    pub non_null_elements: bool,
}

/// Category of a scalar as far as literal and fixture checking is concerned.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ScalarKind {
    Int,
    Float,
    String,
    Boolean,
    Id,
    Custom,
}

impl ScalarKind {
    pub fn of(type_name: &str) -> ScalarKind {
        match type_name {
            "Int" => ScalarKind::Int,
            "Float" => ScalarKind::Float,
            "String" => ScalarKind::String,
            "Boolean" => ScalarKind::Boolean,
            "ID" => ScalarKind::Id,
            _ => ScalarKind::Custom,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_ref_distinguishes_wrappers() {
        let ty = Type::new("[Int!]!").unwrap();
        assert_eq!(
            ty.type_ref(),
            TypeRef {
                name: Name::new("Int"),
                non_null: true,
                is_array: true,
                non_null_elements: true,
            }
        );

        let ty = Type::new("[Int]!").unwrap();
        let type_ref = ty.type_ref();
        assert!(type_ref.non_null);
        assert!(type_ref.is_array);
        assert!(!type_ref.non_null_elements);

        let ty = Type::new("String").unwrap();
        let type_ref = ty.type_ref();
        assert!(!type_ref.non_null);
        assert!(!type_ref.is_array);
        assert_eq!(ty.concrete_typename(), "String");
    }

    #[test]
    fn scalar_kinds() {
        assert_eq!(ScalarKind::of("ID"), ScalarKind::Id);
        assert_eq!(ScalarKind::of("DateTime"), ScalarKind::Custom);
        assert_eq!(ScalarKind::of("Boolean"), ScalarKind::Boolean);
    }
}
