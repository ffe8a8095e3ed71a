use super::{
    argument, field_node, has_field, merge_arguments, merge_directive, object_value,
    selection_for_type, string_value,
};
use crate::{field_definition, find_record, Result, SelectionAddress, TargetMut};
use apollo_compiler::ast::{self, Selection};
use apollo_compiler::{name, Schema};

/// Page size declared for the `first` argument
const DEFAULT_PAGE_SIZE: i32 = 20;

/// Copy of `document` where the connection field at `record_path` is set up
/// for cursor pagination.
///
/// The enclosing fragment becomes `@refetchable` and declares `first` and
/// `after` with `@argumentDefinitions`; the field receives those arguments, a
/// `@connection` key and an `edges { node { ... } }` selection when it has
/// none. `None` when the node is not a field of a fragment whose type has
/// `edges.node`.
pub fn add_pagination(
    document: &ast::Document,
    record_path: &str,
    schema: &Schema,
) -> Result<Option<ast::Document>> {
    let Some(found) = find_record(document, record_path, schema) else {
        return Ok(None);
    };
    if found.field_definition.is_none() {
        return Ok(None);
    }

    let Some((_, edges_type)) = field_definition(schema, found.ty.name(), "edges") else {
        tracing::debug!(record_path, "Field is not a connection");
        return Ok(None);
    };
    let Some((_, node_type)) = field_definition(schema, edges_type.inner_named_type(), "node")
    else {
        tracing::debug!(record_path, "Connection edges have no node");
        return Ok(None);
    };

    let Some(ast::Definition::FragmentDefinition(fragment)) =
        document.definitions.get(found.address.definition)
    else {
        return Ok(None);
    };
    let fragment_name = fragment.name.clone();

    let mut updated = document.clone();

    if let Some(mut definition) =
        SelectionAddress::definition(found.address.definition).resolve_mut(&mut updated)
    {
        let directives = definition.directives();
        merge_directive(
            directives,
            name!("refetchable"),
            vec![argument(
                name!("queryName"),
                string_value(format!("{fragment_name}PaginationQuery")),
            )],
        );
        merge_directive(
            directives,
            name!("argumentDefinitions"),
            vec![
                argument(
                    name!("first"),
                    object_value(vec![
                        (name!("type"), string_value("Int")),
                        (
                            name!("defaultValue"),
                            ast::Value::Int(ast::IntValue::from(DEFAULT_PAGE_SIZE)),
                        ),
                    ]),
                ),
                argument(
                    name!("after"),
                    object_value(vec![(name!("type"), string_value("String"))]),
                ),
            ],
        );
    }

    let Some(TargetMut::Field(field)) = found.address.resolve_mut(&mut updated) else {
        return Ok(None);
    };

    merge_arguments(
        &mut field.arguments,
        vec![
            argument(name!("first"), ast::Value::Variable(name!("first"))),
            argument(name!("after"), ast::Value::Variable(name!("after"))),
        ],
    );
    merge_directive(
        &mut field.directives,
        name!("connection"),
        vec![argument(
            name!("key"),
            string_value(format!("{fragment_name}_{}", field.name)),
        )],
    );

    if !has_field(&field.selection_set, "edges") {
        let node = field_node(
            name!("node"),
            selection_for_type(schema, node_type.inner_named_type(), 0),
        );
        let edges = field_node(name!("edges"), vec![Selection::Field(node)]);
        field.selection_set.push(Selection::Field(edges));
    }

    Ok(Some(updated))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_document;

    const SCHEMA: &str = r"
        type Query { viewer: User }
        type User {
          id: ID!
          friends(first: Int, after: String, orderBy: String): FriendConnection!
          name: String
        }
        type FriendConnection { edges: [FriendEdge] pageInfo: PageInfo! }
        type FriendEdge { cursor: String! node: Friend }
        type Friend { id: ID! name: String }
        type PageInfo { hasNextPage: Boolean! endCursor: String }
    ";

    fn schema() -> Schema {
        Schema::parse(SCHEMA, "schema.graphql").unwrap()
    }

    fn fragment(document: &ast::Document) -> &apollo_compiler::Node<ast::FragmentDefinition> {
        match &document.definitions[0] {
            ast::Definition::FragmentDefinition(fragment) => fragment,
            _ => panic!("expected a fragment"),
        }
    }

    #[test]
    fn test_scaffolds_connection() {
        let document =
            parse_document("fragment App_user on User {\n  friends(orderBy: \"name\") {\n    pageInfo { hasNextPage }\n  }\n}").unwrap();
        let updated = add_pagination(&document, "fragment_friends", &schema())
            .unwrap()
            .unwrap();
        let fragment = fragment(&updated);

        let directives: Vec<_> = fragment
            .directives
            .0
            .iter()
            .map(|directive| directive.name.as_str())
            .collect();
        assert_eq!(directives, ["refetchable", "argumentDefinitions"]);
        assert_eq!(
            *fragment.directives.0[0].arguments[0].value,
            ast::Value::String("App_userPaginationQuery".to_string())
        );

        let ast::Selection::Field(friends) = &fragment.selection_set[0] else {
            panic!("expected a field");
        };
        insta::assert_snapshot!(
            friends.serialize().no_indent().to_string(),
            @r#"friends(orderBy: "name", first: $first, after: $after) @connection(key: "App_user_friends") { pageInfo { hasNextPage } edges { node { id } } }"#
        );
    }

    #[test]
    fn test_argument_definitions_value() {
        let document = parse_document("fragment F on User { friends { edges { cursor } } }").unwrap();
        let updated = add_pagination(&document, "fragment_friends", &schema())
            .unwrap()
            .unwrap();
        let definitions = &fragment(&updated).directives.0[1];

        let ast::Value::Object(first) = &*definitions.arguments[0].value else {
            panic!("expected an object value");
        };
        assert_eq!(first[0].0.as_str(), "type");
        assert_eq!(*first[1].1, ast::Value::Int(ast::IntValue::from(20)));

        // Existing edges selections are kept as they are
        let ast::Selection::Field(friends) = &fragment(&updated).selection_set[0] else {
            panic!("expected a field");
        };
        assert_eq!(friends.selection_set.len(), 1);
    }

    #[test]
    fn test_paginating_twice_does_not_duplicate() {
        let document = parse_document("fragment F on User { friends { pageInfo { endCursor } } }").unwrap();
        let once = add_pagination(&document, "fragment_friends", &schema())
            .unwrap()
            .unwrap();
        let twice = add_pagination(&once, "fragment_friends", &schema())
            .unwrap()
            .unwrap();

        assert_eq!(once.definitions, twice.definitions);
    }

    #[test]
    fn test_non_connection_fields_are_rejected() {
        let document = parse_document("fragment F on User { name friends { pageInfo { endCursor } } }").unwrap();
        assert!(add_pagination(&document, "fragment_name", &schema())
            .unwrap()
            .is_none());
        assert!(add_pagination(&document, "fragment", &schema())
            .unwrap()
            .is_none());

        let query = parse_document("query Q { viewer { friends { pageInfo { endCursor } } } }").unwrap();
        assert!(add_pagination(&query, "fragment_viewer_friends", &schema())
            .unwrap()
            .is_none());
    }
}
