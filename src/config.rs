use graphmock_mock::{DefaultMockGenerator, UnknownFixtureKeys};
use graphmock_validation::VariableArguments;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use value::ConstValue;

use crate::Error;

/// Engine-wide defaults. Per-call options on a `MockRequest` override the
/// matching fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_list_length")]
    pub list_length: usize,

    #[serde(default = "default_auto_mock")]
    pub auto_mock: bool,

    #[serde(default)]
    pub mock_errors: bool,

    #[serde(default)]
    pub validate_deprecated: bool,

    #[serde(default)]
    pub variable_arguments: VariableArguments,

    #[serde(default)]
    pub unknown_fixture_keys: UnknownFixtureKeys,

    /// Mock values of custom scalars, by type name.
    #[serde(default)]
    pub scalars: IndexMap<String, serde_json::Value>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            list_length: default_list_length(),
            auto_mock: default_auto_mock(),
            mock_errors: false,
            validate_deprecated: false,
            variable_arguments: VariableArguments::default(),
            unknown_fixture_keys: UnknownFixtureKeys::default(),
            scalars: IndexMap::new(),
        }
    }
}

impl Config {
    pub fn from_toml(text: &str) -> Result<Self, Error> {
        Ok(toml::from_str(text)?)
    }

    pub fn generator(&self) -> Result<DefaultMockGenerator, Error> {
        let scalars = self
            .scalars
            .iter()
            .map(|(name, value)| {
                ConstValue::from_json(value.clone())
                    .map(|value| (name, value))
                    .map_err(|source| Error::Scalar {
                        name: name.clone(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(DefaultMockGenerator::new().with_scalars(scalars))
    }
}

fn default_list_length() -> usize {
    1
}

fn default_auto_mock() -> bool {
    true
}
