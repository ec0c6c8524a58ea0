#![forbid(unsafe_code)]

mod error;
mod fixture;
mod generator;
mod mock_schema;

pub use error::FixtureError;
pub use fixture::{unalias, FixtureMerger, UnknownFixtureKeys};
pub use generator::{DefaultMockGenerator, MockGenerator};
pub use mock_schema::{MockSchema, MockValue};
