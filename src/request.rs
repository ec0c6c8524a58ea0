use serde::{Deserialize, Deserializer, Serialize};
use value::{ConstValue, Variables};

use crate::ServerError;

/// Example values to return instead of, or on top of, the mock values.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    /// `Some(ConstValue::Null)` when the fixture sets `"data": null`.
    #[serde(
        default,
        deserialize_with = "deserialize_data",
        skip_serializing_if = "Option::is_none"
    )]
    pub data: Option<ConstValue>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<ServerError>,
}

impl Fixture {
    pub fn new(data: ConstValue) -> Self {
        Self {
            data: Some(data),
            errors: Vec::new(),
        }
    }

    pub fn from_json(fixture: serde_json::Value) -> serde_json::Result<Self> {
        serde_json::from_value(fixture)
    }

    pub fn errors(self, errors: Vec<ServerError>) -> Self {
        Self { errors, ..self }
    }

    /// Errors without data replace the whole response.
    pub(crate) fn is_error_only(&self) -> bool {
        !self.errors.is_empty() && matches!(self.data, None | Some(ConstValue::Null))
    }
}

fn deserialize_data<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<ConstValue>, D::Error> {
    ConstValue::deserialize(deserializer).map(Some)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MockRequest {
    pub query: String,

    pub operation: Option<String>,

    #[serde(skip_serializing_if = "variables_is_empty", default)]
    pub variables: Variables,

    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub fixture: Option<Fixture>,

    /// Store the result so later calls for the same root field return it.
    #[serde(default)]
    pub save_fixture: bool,

    pub auto_mock: Option<bool>,

    pub mock_errors: Option<bool>,

    pub validate_deprecated: Option<bool>,
}

impl MockRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn operation(self, operation: impl Into<String>) -> Self {
        Self {
            operation: Some(operation.into()),
            ..self
        }
    }

    pub fn variables(self, variables: Variables) -> Self {
        Self { variables, ..self }
    }

    pub fn extend_variables(mut self, variables: Variables) -> Self {
        if let ConstValue::Object(obj) = variables.into_value() {
            self.variables.extend(obj);
        }
        self
    }

    pub fn fixture(self, fixture: Fixture) -> Self {
        Self {
            fixture: Some(fixture),
            ..self
        }
    }

    pub fn save_fixture(self, save_fixture: bool) -> Self {
        Self {
            save_fixture,
            ..self
        }
    }

    pub fn auto_mock(self, auto_mock: bool) -> Self {
        Self {
            auto_mock: Some(auto_mock),
            ..self
        }
    }

    pub fn mock_errors(self, mock_errors: bool) -> Self {
        Self {
            mock_errors: Some(mock_errors),
            ..self
        }
    }

    pub fn validate_deprecated(self, validate_deprecated: bool) -> Self {
        Self {
            validate_deprecated: Some(validate_deprecated),
            ..self
        }
    }
}

impl From<&str> for MockRequest {
    fn from(query: &str) -> Self {
        MockRequest::new(query)
    }
}

impl From<String> for MockRequest {
    fn from(query: String) -> Self {
        MockRequest::new(query)
    }
}

#[inline]
fn variables_is_empty(variables: &Variables) -> bool {
    variables.is_empty()
}
