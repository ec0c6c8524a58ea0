//! Schema-bound GraphQL mocking for tests.
//!
//! A [`Tester`] checks that an operation is legal against a schema and answers
//! it with deterministic mock data, optionally overlaid with fixtures.

#![forbid(unsafe_code)]

mod config;
mod error;
mod request;
mod response;
mod tester;

pub use config::Config;
pub use error::Error;
pub use graphmock_mock::{
    DefaultMockGenerator, FixtureError, MockGenerator, MockSchema, UnknownFixtureKeys,
};
pub use graphmock_schema::{Registry, SchemaError};
pub use graphmock_validation::{ValidationError, VariableArguments};
pub use request::{Fixture, MockRequest};
pub use response::{Response, ServerError};
pub use tester::Tester;
