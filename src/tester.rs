use std::sync::Arc;

use graphmock_mock::{unalias, FixtureError, FixtureMerger, MockSchema};
use graphmock_schema::Registry;
use graphmock_validation::{
    check_unused_variables, merge_field, parse_operation, OperationDescriptor, ValidationError,
    ValidationOptions, Validator,
};
use indexmap::IndexMap;
use value::{ConstValue, Name};

use crate::{Config, Error, Fixture, MockRequest, Response, ServerError};

struct ScopedFixture {
    fixture: Fixture,
    auto_mock: bool,
}

/// Validates operations against a schema and answers them with mock data.
///
/// ```ignore
/// let mut tester = Tester::new("type Query { hello: String }")?;
/// let response = tester.mock("{ hello }")?;
/// assert_eq!(response.to_json()["data"]["hello"], "Hello World");
/// ```
pub struct Tester {
    registry: Arc<Registry>,
    mock: MockSchema,
    config: Config,
    fixture: Option<ScopedFixture>,
}

impl Tester {
    pub fn new(schema: &str) -> Result<Self, Error> {
        Self::with_config(Registry::parse(schema)?, Config::default())
    }

    /// Builds the engine from several type-definition documents merged into
    /// one schema.
    pub fn from_documents<I, S>(documents: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::with_config(Registry::parse_many(documents)?, Config::default())
    }

    /// Builds the engine from an introspection query result, with or without
    /// the `data` envelope.
    pub fn from_introspection(introspection: serde_json::Value) -> Result<Self, Error> {
        Self::with_config(Registry::from_introspection(introspection)?, Config::default())
    }

    pub fn with_config(registry: impl Into<Arc<Registry>>, config: Config) -> Result<Self, Error> {
        let registry = registry.into();
        let generator = config.generator()?;
        let mock = MockSchema::generate(&registry, &generator, config.list_length);
        Ok(Self {
            registry,
            mock,
            config,
            fixture: None,
        })
    }

    #[inline]
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Applies `fixture` to every following call without its own fixture.
    pub fn set_fixture(&mut self, fixture: Fixture, auto_mock: bool) {
        self.fixture = Some(ScopedFixture { fixture, auto_mock });
    }

    /// Saved fixtures are kept.
    pub fn clear_fixture(&mut self) {
        self.fixture = None;
    }

    pub fn mock(&mut self, request: impl Into<MockRequest>) -> Result<Response, Error> {
        let mut request = request.into();
        let (fixture, auto_mock) = match (request.fixture.take(), &self.fixture) {
            (Some(fixture), _) => (Some(fixture), self.config.auto_mock),
            (None, Some(scoped)) => (Some(scoped.fixture.clone()), scoped.auto_mock),
            (None, None) => (None, self.config.auto_mock),
        };
        let auto_mock = request.auto_mock.unwrap_or(auto_mock);
        let mock_errors = request.mock_errors.unwrap_or(self.config.mock_errors);

        if let Some(fixture) = fixture.as_ref().filter(|fixture| fixture.is_error_only()) {
            tracing::debug!(errors = fixture.errors.len(), "Fixture errors returned.");
            return Ok(Response {
                data: ConstValue::Null,
                errors: fixture.errors.clone(),
            });
        }

        let operation = match parse_operation(
            &self.registry,
            &request.query,
            request.operation.as_deref(),
            &request.variables,
        ) {
            Ok(operation) => operation,
            Err(err @ ValidationError::Parse(_)) => return Err(err.into()),
            Err(err) if mock_errors => {
                tracing::debug!(error = %err, "Operation rejected.");
                return Ok(Response {
                    data: ConstValue::Null,
                    errors: vec![ServerError::new(err.to_string())],
                });
            }
            Err(err) => return Err(err.into()),
        };

        let fixture_data = match fixture.as_ref().and_then(|fixture| fixture.data.as_ref()) {
            Some(ConstValue::Object(data)) => Some(data),
            Some(ConstValue::Null) => None,
            Some(_) => {
                return Err(FixtureError::NotSameType {
                    name: "data".to_string(),
                }
                .into())
            }
            None => None,
        };
        let empty = IndexMap::new();
        let fixture_data = match (&fixture, fixture_data) {
            (Some(_), None) => Some(&empty),
            (_, data) => data,
        };

        let options = ValidationOptions {
            validate_deprecated: request
                .validate_deprecated
                .unwrap_or(self.config.validate_deprecated),
            variable_arguments: self.config.variable_arguments,
        };
        let merger = FixtureMerger::new(&self.registry)
            .mock_schema(&self.mock)
            .unknown_keys(self.config.unknown_fixture_keys)
            .auto_mock(auto_mock);

        let mut errors = Vec::new();
        if let Some(data) = fixture_data {
            if let Err(err) = merger.check_data_keys(&operation, data) {
                if !mock_errors {
                    return Err(err.into());
                }
                errors.push(ServerError::new(err.to_string()));
            }
        }

        let mut results = Vec::with_capacity(operation.descriptors.len());
        for descriptor in &operation.descriptors {
            match self.resolve(descriptor, options, &merger, fixture_data) {
                Ok(value) => results.push((descriptor, Some(value))),
                Err(err) if mock_errors => {
                    tracing::debug!(field = descriptor.alias(), error = %err, "Field failed.");
                    errors.push(
                        ServerError::new(err.to_string())
                            .path(descriptor.alias())
                            .location(descriptor.field.pos),
                    );
                    results.push((descriptor, None));
                }
                Err(err) => return Err(err),
            }
        }

        if let Err(err) = check_unused_variables(&operation) {
            if !mock_errors {
                return Err(err.into());
            }
            errors.push(ServerError::new(err.to_string()));
        }

        let mut data = IndexMap::new();
        for (descriptor, value) in results {
            let value = match value {
                Some(value) => value,
                None => {
                    data.insert(Name::new(descriptor.alias()), ConstValue::Null);
                    continue;
                }
            };
            if request.save_fixture {
                if let Some(root_type) = self.registry.root_map().get(descriptor.kind) {
                    self.mock.save(
                        root_type,
                        descriptor.name(),
                        unalias(&descriptor.field, value.clone()),
                    );
                }
            }
            merge_field(&mut data, Name::new(descriptor.alias()), value);
        }

        if let Some(fixture) = fixture {
            errors.extend(fixture.errors);
        }

        tracing::debug!(
            kind = %operation.kind,
            operation = ?operation.declared_name,
            fields = operation.descriptors.len(),
            errors = errors.len(),
            "Mock response built."
        );
        Ok(Response {
            data: ConstValue::Object(data),
            errors,
        })
    }

    /// Mocks `request` and checks the outcome: any error, returned or
    /// collected into the response, makes the operation invalid.
    pub fn test(&mut self, expected_valid: bool, request: impl Into<MockRequest>) -> Result<(), Error> {
        let outcome = self.mock(request).and_then(|response| {
            match response.errors.into_iter().next() {
                Some(error) => Err(Error::Reported {
                    message: error.message,
                }),
                None => Ok(()),
            }
        });
        match (expected_valid, outcome) {
            (true, outcome) => outcome,
            (false, Ok(())) => Err(Error::ExpectedInvalid),
            (false, Err(err)) => {
                tracing::debug!(error = %err, "Operation is invalid as expected.");
                Ok(())
            }
        }
    }

    fn resolve(
        &self,
        descriptor: &OperationDescriptor,
        options: ValidationOptions,
        merger: &FixtureMerger<'_>,
        fixture_data: Option<&IndexMap<Name, ConstValue>>,
    ) -> Result<ConstValue, Error> {
        let mut value = Validator::new(&self.registry, &self.mock)
            .options(options)
            .validate(descriptor)?;

        let saved = self
            .registry
            .root_map()
            .get(descriptor.kind)
            .and_then(|root_type| self.mock.saved(root_type, descriptor.name()));
        if let Some(saved) = saved {
            let mut data = IndexMap::new();
            data.insert(Name::new(descriptor.alias()), saved.clone());
            value = FixtureMerger::new(&self.registry)
                .mock_schema(&self.mock)
                .merge(descriptor, value, &data)?;
        }

        if let Some(data) = fixture_data {
            value = merger.merge(descriptor, value, data)?;
        }
        Ok(value)
    }
}
