use graphmock_mock::FixtureError;
use graphmock_schema::SchemaError;
use graphmock_validation::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Fixture(#[from] FixtureError),

    /// First error of a response that was expected to be clean.
    #[error("{message}")]
    Reported { message: String },

    #[error("The operation was expected to be invalid, but it passed.")]
    ExpectedInvalid,

    #[error("Invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Invalid mock value for scalar \"{name}\": {source}")]
    Scalar {
        name: String,
        source: serde_json::Error,
    },
}
