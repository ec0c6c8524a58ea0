use std::sync::Arc;

use graphmock::{
    Config, Error, Fixture, MockRequest, Registry, Tester, UnknownFixtureKeys, ValidationError,
};
use once_cell::sync::Lazy;
use serde_json::json;
use value::Variables;

static REGISTRY: Lazy<Arc<Registry>> =
    Lazy::new(|| Arc::new(Registry::parse(include_str!("test.graphql")).unwrap()));

fn tester() -> Tester {
    Tester::with_config(REGISTRY.clone(), Config::default()).unwrap()
}

fn data(tester: &mut Tester, request: impl Into<MockRequest>) -> serde_json::Value {
    let response = tester.mock(request).unwrap();
    assert!(response.is_ok(), "unexpected errors: {:?}", response.errors);
    response.data.into_json().unwrap()
}

fn error(tester: &mut Tester, request: impl Into<MockRequest>) -> String {
    tester.mock(request).unwrap_err().to_string()
}

#[test]
fn missing_required_argument() {
    assert_eq!(
        error(
            &mut tester(),
            "{ getUserByUsername(username: test) { email } }"
        ),
        "name argument is missing on getUserByUsername"
    );
}

#[test]
fn scalar_where_array_expected() {
    assert_eq!(
        error(
            &mut tester(),
            "mutation { updateUserScores(input: { scores: 1 }) { id } }"
        ),
        "scores must be an Array on updateUserScores"
    );
}

#[test]
fn invalid_field() {
    assert_eq!(
        error(&mut tester(), "{ getMe { id invalidName } }"),
        "Invalid field invalidName on getMe"
    );
}

#[test]
fn unknown_fragment_type() {
    assert_eq!(
        error(&mut tester(), "{ getMe { id ... on InvalidType { id } } }"),
        "There is no type InvalidType on the Schema"
    );
}

#[test]
fn saved_fixture_is_reused() {
    let mut tester = tester();
    let fixture = Fixture::from_json(json!({
        "data": { "getMe": { "email": "demo@demo.com", "username": "demo" } }
    }))
    .unwrap();

    let first = data(
        &mut tester,
        MockRequest::new("{ getMe { id email username } }")
            .fixture(fixture)
            .save_fixture(true),
    );
    assert_eq!(
        first,
        json!({ "getMe": { "id": "1", "email": "demo@demo.com", "username": "demo" } })
    );

    let second = data(&mut tester, "{ me: getMe { mail: email scores } }");
    assert_eq!(
        second,
        json!({ "me": { "mail": "demo@demo.com", "scores": [42] } })
    );

    tester.clear_fixture();
    let third = data(&mut tester, "{ getMe { username } }");
    assert_eq!(third, json!({ "getMe": { "username": "demo" } }));
}

#[test]
fn repeated_fixture_is_idempotent() {
    let mut tester = tester();
    let fixture = Fixture::from_json(json!({
        "data": { "getUsers": [{ "email": "a@b.c" }, { "email": "d@e.f" }] }
    }))
    .unwrap();
    tester.set_fixture(fixture, true);

    let first = data(&mut tester, "{ getUsers { email role } }");
    let second = data(&mut tester, "{ getUsers { email role } }");
    assert_eq!(first, second);
    assert_eq!(
        first,
        json!({
            "getUsers": [
                { "email": "a@b.c", "role": "ADMIN" },
                { "email": "d@e.f", "role": "ADMIN" }
            ]
        })
    );
}

#[test]
fn fixture_errors_without_data() {
    let mut tester = tester();
    let fixture = Fixture::from_json(json!({
        "data": null,
        "errors": [{ "message": "Not authorized", "path": ["getMe"] }]
    }))
    .unwrap();
    let response = tester
        .mock(MockRequest::new("{ getMe { id } }").fixture(fixture))
        .unwrap();
    assert_eq!(
        response.to_json(),
        json!({
            "data": null,
            "errors": [{ "message": "Not authorized", "path": ["getMe"] }]
        })
    );
}

#[test]
fn fixture_errors_with_data_are_appended() {
    let mut tester = tester();
    let fixture = Fixture::from_json(json!({
        "data": { "getMe": { "id": "5" } },
        "errors": [{ "message": "Partial result" }]
    }))
    .unwrap();
    let response = tester
        .mock(MockRequest::new("{ getMe { id } }").fixture(fixture))
        .unwrap();
    assert_eq!(
        response.to_json(),
        json!({
            "data": { "getMe": { "id": "5" } },
            "errors": [{ "message": "Partial result" }]
        })
    );
}

#[test]
fn fixture_shape_errors() {
    let mut tester = tester();
    let fixture = Fixture::from_json(json!({ "data": { "getUsers": { "id": "1" } } })).unwrap();
    assert_eq!(
        error(
            &mut tester,
            MockRequest::new("{ getUsers { id } }").fixture(fixture)
        ),
        "getUsers fixture is not an array and it should be one."
    );

    let fixture = Fixture::from_json(json!({ "data": { "getMe": { "email": 3 } } })).unwrap();
    assert_eq!(
        error(
            &mut tester,
            MockRequest::new("{ getMe { email } }").fixture(fixture)
        ),
        "email is not the same type as the document."
    );
}

#[test]
fn without_auto_mock() {
    let mut tester = tester();
    let fixture = Fixture::from_json(json!({ "data": { "getMe": { "id": "7" } } })).unwrap();
    tester.set_fixture(fixture, false);

    assert_eq!(
        data(&mut tester, "{ getMe { id username } }"),
        json!({ "getMe": { "id": "7", "username": null } })
    );
    assert_eq!(
        error(&mut tester, "{ getMe { id email } }"),
        "Cannot return null for non-nullable field User.email."
    );

    tester.clear_fixture();
    assert_eq!(
        data(&mut tester, "{ getMe { email } }"),
        json!({ "getMe": { "email": "Hello World" } })
    );
}

#[test]
fn mock_errors_collects_failures() {
    let mut tester = tester();
    let response = tester
        .mock(MockRequest::new("{ getMe { id } getUserByUsername(username: a) { id } }").mock_errors(true))
        .unwrap();
    assert_eq!(
        response.data.into_json().unwrap(),
        json!({ "getMe": { "id": "1" }, "getUserByUsername": null })
    );
    assert_eq!(response.errors.len(), 1);
    assert_eq!(
        response.errors[0].message,
        "name argument is missing on getUserByUsername"
    );
    assert_eq!(response.errors[0].locations[0].line, 1);
}

#[test]
fn syntax_errors_are_always_returned() {
    let err = tester()
        .mock(MockRequest::new("{ getMe { id }").mock_errors(true))
        .unwrap_err();
    assert!(matches!(err, Error::Validation(ValidationError::Parse(_))));
}

#[test]
fn test_reports_validity() {
    let mut tester = tester();
    tester.test(true, "{ getMe { id } }").unwrap();
    tester.test(false, "{ getMe { invalidName } }").unwrap();

    let err = tester.test(true, "{ getMe }").unwrap_err();
    assert_eq!(err.to_string(), "getMe: Must select field on getMe");

    let err = tester.test(false, "{ getMe { id } }").unwrap_err();
    assert!(matches!(err, Error::ExpectedInvalid));

    tester
        .test(
            false,
            MockRequest::new("{ getMe { invalidName } }").mock_errors(true),
        )
        .unwrap();
}

#[test]
fn mutation_variables_as_input() {
    let mut tester = tester();
    let result = data(
        &mut tester,
        MockRequest::new("mutation { createUser { email } }").variables(Variables::from_json(
            json!({ "email": "a@b.c", "password": "secret" }),
        )),
    );
    assert_eq!(result, json!({ "createUser": { "email": "Hello World" } }));

    assert_eq!(
        error(&mut tester, "mutation { createUser { email } }"),
        "Variables are missing"
    );
    assert_eq!(
        error(
            &mut tester,
            MockRequest::new("mutation { createUser { email } }")
                .variables(Variables::from_json(json!({ "email": "a@b.c" })))
        ),
        "password argument is missing on createUser"
    );
}

#[test]
fn mutation_with_declared_variables() {
    let mut tester = tester();
    let request = MockRequest::new(
        r#"
        mutation CreateUser($input: UserInput!) {
            createUser(input: $input) { id email }
        }
        "#,
    )
    .variables(Variables::from_json(json!({
        "input": { "email": "a@b.c", "password": "secret" }
    })));
    assert_eq!(
        data(&mut tester, request),
        json!({ "createUser": { "id": "1", "email": "Hello World" } })
    );
}

#[test]
fn unused_variables() {
    assert_eq!(
        error(
            &mut tester(),
            MockRequest::new("query ($limit: Int, $role: Role) { getUsers(limit: $limit) { id } }")
                .variables(Variables::from_json(json!({ "limit": 1 })))
        ),
        "Variable \"$role\" is never used."
    );
}

#[test]
fn deprecated_fields() {
    let mut tester = tester();
    data(&mut tester, "{ getMe { fullName } }");
    assert_eq!(
        error(
            &mut tester,
            MockRequest::new("{ getMe { fullName } }").validate_deprecated(true)
        ),
        "The field User.fullName is deprecated. Use username"
    );
}

#[test]
fn deprecated_enum_values() {
    let mut tester = Tester::new(
        r#"
        enum Role { ADMIN USER @deprecated(reason: "Use ADMIN") }
        type User { id: ID! }
        type Query { users(role: Role): [User] }
        "#,
    )
    .unwrap();
    data(&mut tester, "{ users(role: USER) { id } }");
    assert_eq!(
        error(
            &mut tester,
            MockRequest::new("{ users(role: USER) { id } }").validate_deprecated(true)
        ),
        "The enum value Role.USER is deprecated. Use ADMIN"
    );
}

#[test]
fn empty_lists_still_validate_selections() {
    let config = Config {
        list_length: 0,
        ..Config::default()
    };
    let mut tester = Tester::with_config(REGISTRY.clone(), config).unwrap();

    assert_eq!(
        data(&mut tester, "{ getUsers { id familyInfo { id } } }"),
        json!({ "getUsers": [] })
    );
    assert_eq!(
        error(&mut tester, "{ getUsers { invalidName } }"),
        "Invalid field invalidName on getUsers"
    );
    assert_eq!(
        error(&mut tester, "{ getUsers { familyInfo } }"),
        "getUsers: Must select field on familyInfo"
    );
    assert_eq!(
        error(&mut tester, "{ getUsers { posts(first: \"x\") { id } } }"),
        "first argument is not type Int"
    );

    let fixture = Fixture::from_json(json!({ "data": { "getUsers": [{ "id": "a" }] } })).unwrap();
    assert_eq!(
        data(
            &mut tester,
            MockRequest::new("{ getUsers { id email } }").fixture(fixture)
        ),
        json!({ "getUsers": [{ "id": "a", "email": "Hello World" }] })
    );
}

#[test]
fn fixture_typename_picks_union_member() {
    let fixture = Fixture::from_json(json!({
        "data": { "search": [{ "__typename": "Post", "title": "Hi" }] }
    }))
    .unwrap();
    assert_eq!(
        data(
            &mut tester(),
            MockRequest::new(r#"{ search(term: "a") { __typename ... on Post { id title } } }"#)
                .fixture(fixture)
        ),
        json!({ "search": [{ "__typename": "Post", "id": "1", "title": "Hi" }] })
    );
}

#[test]
fn named_operations() {
    let mut tester = tester();
    let query = "query Me { getMe { id } } query Users { getUsers { email } }";
    assert_eq!(
        data(&mut tester, MockRequest::new(query).operation("Users")),
        json!({ "getUsers": [{ "email": "Hello World" }] })
    );
    assert_eq!(
        error(&mut tester, query),
        "Operation name required in the request."
    );
}

#[test]
fn custom_root_types() {
    let mut tester = Tester::new(
        r#"
        schema { query: RootQuery subscription: RootSubscription }
        type Post { content: String }
        type RootQuery { posts: [Post] }
        type RootSubscription { newPost: Post }
        "#,
    )
    .unwrap();
    assert_eq!(
        data(&mut tester, "{ posts { content } }"),
        json!({ "posts": [{ "content": "Hello World" }] })
    );
    assert_eq!(
        data(&mut tester, "subscription { newPost { content } }"),
        json!({ "newPost": { "content": "Hello World" } })
    );
    assert_eq!(
        error(&mut tester, "mutation { createPost { content } }"),
        "There is no mutation type on the Schema"
    );
}

#[test]
fn multiple_documents() {
    let mut tester = Tester::from_documents([
        "type User { id: ID! } type Query { me: User }",
        "type User { name: String } type Query { users: [User] }",
    ])
    .unwrap();
    assert_eq!(
        data(&mut tester, "{ me { id name } users { id } }"),
        json!({ "me": { "id": "1", "name": "Hello World" }, "users": [{ "id": "1" }] })
    );

    let err = Tester::from_documents(["type User { id: ID! }", "type User { id: Int }"])
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "Field \"User.id\" definition conflicted.");
}

#[test]
fn configured_engine() {
    let config = Config::from_toml(
        r#"
        list_length = 2
        unknown_fixture_keys = "reject"

        [scalars]
        DateTime = "2021-01-01T00:00:00Z"
        "#,
    )
    .unwrap();
    let mut tester = Tester::with_config(REGISTRY.clone(), config).unwrap();

    assert_eq!(
        data(&mut tester, "{ getUsers { createdAt } }"),
        json!({
            "getUsers": [
                { "createdAt": "2021-01-01T00:00:00Z" },
                { "createdAt": "2021-01-01T00:00:00Z" }
            ]
        })
    );

    let fixture = Fixture::from_json(json!({ "data": { "getMe": { "nickname": "x" } } })).unwrap();
    assert_eq!(
        error(
            &mut tester,
            MockRequest::new("{ getMe { id } }").fixture(fixture)
        ),
        "nickname fixture is not the same type as the document"
    );

    let fixture = Fixture::from_json(json!({ "data": { "getYou": { "id": "1" } } })).unwrap();
    assert!(matches!(
        tester
            .mock(MockRequest::new("{ getMe { id } }").fixture(fixture))
            .unwrap_err(),
        Error::Fixture(_)
    ));
}

#[test]
fn unknown_fixture_keys_are_ignored_by_default() {
    assert_eq!(Config::default().unknown_fixture_keys, UnknownFixtureKeys::Ignore);
    let fixture = Fixture::from_json(json!({
        "data": { "getMe": { "id": "2", "nickname": "x" }, "getYou": 1 }
    }))
    .unwrap();
    assert_eq!(
        data(
            &mut tester(),
            MockRequest::new("{ getMe { id } }").fixture(fixture)
        ),
        json!({ "getMe": { "id": "2" } })
    );
}

#[test]
fn schema_from_introspection() {
    let introspection = json!({
        "data": {
            "__schema": {
                "queryType": { "name": "Query" },
                "mutationType": null,
                "subscriptionType": null,
                "types": [
                    {
                        "kind": "OBJECT",
                        "name": "Query",
                        "fields": [
                            {
                                "name": "hello",
                                "args": [],
                                "type": {
                                    "kind": "NON_NULL",
                                    "name": null,
                                    "ofType": { "kind": "SCALAR", "name": "String", "ofType": null }
                                },
                                "isDeprecated": false,
                                "deprecationReason": null
                            }
                        ],
                        "inputFields": null,
                        "interfaces": [],
                        "enumValues": null,
                        "possibleTypes": null
                    },
                    {
                        "kind": "SCALAR",
                        "name": "String",
                        "fields": null,
                        "inputFields": null,
                        "interfaces": null,
                        "enumValues": null,
                        "possibleTypes": null
                    }
                ],
                "directives": []
            }
        }
    });
    let mut tester = Tester::from_introspection(introspection).unwrap();
    assert_eq!(data(&mut tester, "{ hello }"), json!({ "hello": "Hello World" }));
    assert_eq!(
        error(&mut tester, "{ goodbye }"),
        "There is no query called goodbye on the Schema"
    );
}
