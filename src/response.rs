use parser::Pos;
use serde::{Deserialize, Serialize};
use value::ConstValue;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerError {
    pub message: String,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub path: Vec<ConstValue>,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub locations: Vec<Pos>,
}

impl ServerError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            path: Default::default(),
            locations: Default::default(),
        }
    }

    pub fn path(self, path: impl Into<String>) -> Self {
        Self {
            path: vec![ConstValue::String(path.into())],
            ..self
        }
    }

    pub fn location(self, pos: Pos) -> Self {
        Self {
            locations: vec![pos],
            ..self
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Response {
    pub data: ConstValue,

    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub errors: Vec<ServerError>,
}

impl Response {
    #[inline]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The response as GraphQL JSON.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn serializes_like_graphql() {
        let response = Response {
            data: ConstValue::Null,
            errors: vec![ServerError::new("boom")
                .path("getMe")
                .location(Pos { line: 1, column: 3 })],
        };
        assert_eq!(
            response.to_json(),
            json!({
                "data": null,
                "errors": [{
                    "message": "boom",
                    "path": ["getMe"],
                    "locations": [{ "line": 1, "column": 3 }]
                }]
            })
        );

        let response = Response {
            data: ConstValue::from_json(json!({ "a": 1 })).unwrap(),
            errors: Vec::new(),
        };
        assert!(response.is_ok());
        assert_eq!(response.to_json(), json!({ "data": { "a": 1 } }));
    }
}
