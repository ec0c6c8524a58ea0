use graphmock_schema::ValueExt;
use indexmap::IndexSet;

use crate::operation::{ParsedOperation, SelectedField, Selection};
use crate::ValidationError;

/// Fails on the first declared variable that no argument or directive uses.
pub fn check_unused_variables(operation: &ParsedOperation) -> Result<(), ValidationError> {
    let mut unused = operation
        .variables
        .iter()
        .map(|variable| variable.name.as_str())
        .collect::<IndexSet<_>>();

    for name in &operation.directive_variables {
        unused.shift_remove(name.as_str());
    }
    for descriptor in &operation.descriptors {
        remove_referenced(&descriptor.field, &mut unused);
    }

    match unused.first() {
        Some(name) => Err(ValidationError::UnusedVariable {
            name: name.to_string(),
        }),
        None => Ok(()),
    }
}

fn remove_referenced(field: &SelectedField, unused: &mut IndexSet<&str>) {
    for argument in &field.arguments {
        for name in argument.value.referenced_variables() {
            unused.shift_remove(name);
        }
    }
    remove_referenced_in(&field.selections, unused);
}

fn remove_referenced_in(selections: &[Selection], unused: &mut IndexSet<&str>) {
    for selection in selections {
        match selection {
            Selection::Field(field) => remove_referenced(field, unused),
            Selection::InlineFragment(fragment) => {
                remove_referenced_in(&fragment.selections, unused)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn unused_variable() {
        expect_fails!(
            "query ($limit: Int, $offset: Int) { getUsers(limit: $limit) { id } }",
            "Variable \"$offset\" is never used."
        );
    }

    #[test]
    fn variables_used_in_nested_inputs_and_fragments() {
        expect_passes!(
            r#"
            mutation ($email: String!, $limit: Int) {
                createUser(input: { email: $email }) { ...Friends }
            }
            fragment Friends on User { friends(limit: $limit) { id } }
            "#,
            { "email": "a@b.c" }
        );
    }

    #[test]
    fn variables_in_skipped_selections_are_used() {
        expect_passes!(
            r#"
            query ($hide: Boolean!, $limit: Int) {
                getUsers(limit: $limit) @skip(if: $hide) { id }
                getMe { id }
            }
            "#,
            { "hide": true }
        );
        expect_passes!(
            r#"
            query ($show: Boolean!, $limit: Int) {
                getMe { id ... on User @include(if: $show) { friends(limit: $limit) { id } } }
            }
            "#,
            { "show": false }
        );
    }

    #[test]
    fn variables_used_by_directives() {
        expect_passes!(
            "query ($skipEmail: Boolean!) { getMe { id email @skip(if: $skipEmail) } }",
            { "skipEmail": true }
        );
    }
}
