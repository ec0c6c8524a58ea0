use graphmock_schema::ScalarKind;
use indexmap::IndexMap;
use value::{ConstValue, Name};

/// Produces the mock value of a scalar field.
pub trait MockGenerator {
    fn scalar(&self, type_name: &str, owner: &str, field: &str) -> ConstValue;
}

/// Fixed values per scalar kind. Custom scalars mock as their type name
/// unless a value is registered for them.
#[derive(Debug, Clone, Default)]
pub struct DefaultMockGenerator {
    scalars: IndexMap<Name, ConstValue>,
}

impl DefaultMockGenerator {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_scalar(mut self, type_name: impl AsRef<str>, value: ConstValue) -> Self {
        self.scalars.insert(Name::new(type_name), value);
        self
    }

    pub fn with_scalars<I, K>(self, scalars: I) -> Self
    where
        I: IntoIterator<Item = (K, ConstValue)>,
        K: AsRef<str>,
    {
        scalars
            .into_iter()
            .fold(self, |generator, (type_name, value)| generator.with_scalar(type_name, value))
    }
}

impl MockGenerator for DefaultMockGenerator {
    fn scalar(&self, type_name: &str, _owner: &str, _field: &str) -> ConstValue {
        if let Some(value) = self.scalars.get(type_name) {
            return value.clone();
        }
        match ScalarKind::of(type_name) {
            ScalarKind::Int => ConstValue::Number(42.into()),
            ScalarKind::Float => serde_json::Number::from_f64(4.2)
                .map(ConstValue::Number)
                .unwrap_or(ConstValue::Null),
            ScalarKind::String => ConstValue::String("Hello World".to_string()),
            ScalarKind::Boolean => ConstValue::Boolean(true),
            ScalarKind::Id => ConstValue::String("1".to_string()),
            ScalarKind::Custom => ConstValue::String(type_name.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_and_custom_scalars() {
        let generator = DefaultMockGenerator::new()
            .with_scalars([("DateTime", ConstValue::String("2020-01-01".to_string()))]);
        assert_eq!(
            generator.scalar("Int", "User", "age"),
            ConstValue::Number(42.into())
        );
        assert_eq!(
            generator.scalar("ID", "User", "id"),
            ConstValue::String("1".to_string())
        );
        assert_eq!(
            generator.scalar("DateTime", "User", "createdAt"),
            ConstValue::String("2020-01-01".to_string())
        );
        assert_eq!(
            generator.scalar("Url", "User", "avatar"),
            ConstValue::String("Url".to_string())
        );
    }
}
