use crate::{
    node_span, walk_document, ContextError, Result, SelectionAddress, Span, TypeInfo, TypedVisitor,
};
use apollo_compiler::ast;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::{Node, Schema};
use graphql_extract::{LineIndex, Position};

/// Parse an executable GraphQL document, failing on any syntax error
pub fn parse_document(source: &str) -> Result<ast::Document> {
    ast::Document::parse(source, "fragment.graphql")
        .map_err(|invalid| ContextError::DocumentParse(invalid.errors.to_string()))
}

/// What a record path refers to inside a fragment
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQLRecordContext {
    /// Schema type of the node: the field's named output type, the type
    /// condition of an inline fragment or fragment, or an operation root
    pub ty: ExtendedType,
    /// Start of the node, in coordinates of the parsed source
    pub start: Option<Position>,
    pub end: Option<Position>,
    /// Field description, or the type description for non-field nodes
    pub description: Option<String>,
    /// Declared output type of the field, e.g. `[User!]!`
    pub field_type: Option<String>,
}

impl GraphQLRecordContext {
    #[must_use]
    pub fn type_name(&self) -> &str {
        self.ty.name().as_str()
    }
}

/// The first node whose record path matched
#[derive(Debug, Clone, PartialEq)]
pub struct RecordMatch {
    pub address: SelectionAddress,
    pub ty: ExtendedType,
    pub field_definition: Option<ast::FieldDefinition>,
    pub span: Option<Span>,
    pub description: Option<String>,
}

/// Resolve `record_path` inside `source` against `schema`.
///
/// Fails if `source` does not parse. `None` means no node carries that
/// record path, or the node's type is unknown to the schema.
pub fn resolve_record(
    source: &str,
    record_path: &str,
    schema: &Schema,
) -> Result<Option<GraphQLRecordContext>> {
    let document = parse_document(source)?;
    Ok(resolve_record_in_document(
        &document,
        source,
        record_path,
        schema,
    ))
}

/// [`resolve_record`] over an already parsed document of `source`
#[must_use]
pub fn resolve_record_in_document(
    document: &ast::Document,
    source: &str,
    record_path: &str,
    schema: &Schema,
) -> Option<GraphQLRecordContext> {
    let Some(found) = find_record(document, record_path, schema) else {
        tracing::debug!(record_path, "No node matches record path");
        return None;
    };

    let index = LineIndex::new(source);
    let start = found.span.map(|span| index.offset_to_position(span.start));
    let end = found.span.map(|span| index.offset_to_position(span.end));

    Some(GraphQLRecordContext {
        field_type: found
            .field_definition
            .as_ref()
            .map(|definition| definition.ty.to_string()),
        ty: found.ty,
        start,
        end,
        description: found.description,
    })
}

/// Find the first node, in pre-order, whose record path is `record_path`
#[must_use]
pub fn find_record(
    document: &ast::Document,
    record_path: &str,
    schema: &Schema,
) -> Option<RecordMatch> {
    let mut finder = RecordFinder {
        target: record_path,
        found: None,
    };
    walk_document(&mut finder, document, schema);
    finder.found
}

/// Address of the first node, in pre-order, whose record path is
/// `record_path`, whether or not its type is known
#[must_use]
pub fn locate_record(
    document: &ast::Document,
    record_path: &str,
    schema: &Schema,
) -> Option<SelectionAddress> {
    let mut locator = RecordLocator {
        target: record_path,
        found: None,
    };
    walk_document(&mut locator, document, schema);
    locator.found
}

struct RecordFinder<'a> {
    target: &'a str,
    found: Option<RecordMatch>,
}

impl RecordFinder<'_> {
    fn capture(
        &mut self,
        ty: Option<&ExtendedType>,
        span: Option<Span>,
        description: Option<String>,
        field_definition: Option<&ast::FieldDefinition>,
        info: &TypeInfo<'_>,
    ) {
        if !info.record_path().matches(self.target) {
            return;
        }

        if let Some(found) = &mut self.found {
            // Location and type stay with the first match
            if found.description.is_none() {
                found.description = description;
            }
            return;
        }

        let Some(ty) = ty else {
            tracing::debug!(record_path = self.target, "Record path has no schema type");
            return;
        };

        self.found = Some(RecordMatch {
            address: info.address().clone(),
            ty: ty.clone(),
            field_definition: field_definition.cloned(),
            span,
            description,
        });
    }
}

impl TypedVisitor for RecordFinder<'_> {
    fn enter_operation(&mut self, operation: &Node<ast::OperationDefinition>, info: &TypeInfo<'_>) {
        let ty = info.parent_type();
        let description = ty.and_then(type_description);
        self.capture(ty, node_span(operation), description, None, info);
    }

    fn enter_fragment_definition(
        &mut self,
        fragment: &Node<ast::FragmentDefinition>,
        info: &TypeInfo<'_>,
    ) {
        let ty = info.parent_type();
        let description = ty.and_then(type_description);
        self.capture(ty, node_span(fragment), description, None, info);
    }

    fn enter_field(&mut self, field: &Node<ast::Field>, info: &TypeInfo<'_>) {
        let definition = info.field_def();
        let description = definition
            .and_then(|definition| definition.description.as_ref())
            .map(|text| String::from(&**text));
        self.capture(
            info.field_named_type(),
            node_span(field),
            description,
            definition,
            info,
        );
    }

    fn enter_inline_fragment(&mut self, inline: &Node<ast::InlineFragment>, info: &TypeInfo<'_>) {
        if inline.type_condition.is_none() {
            return;
        }
        let ty = info.parent_type();
        let description = ty.and_then(type_description);
        self.capture(ty, node_span(inline), description, None, info);
    }
}

fn type_description(ty: &ExtendedType) -> Option<String> {
    ty.description().map(|text| String::from(&**text))
}

struct RecordLocator<'a> {
    target: &'a str,
    found: Option<SelectionAddress>,
}

impl RecordLocator<'_> {
    fn visit(&mut self, info: &TypeInfo<'_>) {
        if self.found.is_none() && info.record_path().matches(self.target) {
            self.found = Some(info.address().clone());
        }
    }
}

impl TypedVisitor for RecordLocator<'_> {
    fn enter_operation(&mut self, _operation: &Node<ast::OperationDefinition>, info: &TypeInfo<'_>) {
        self.visit(info);
    }

    fn enter_fragment_definition(
        &mut self,
        _fragment: &Node<ast::FragmentDefinition>,
        info: &TypeInfo<'_>,
    ) {
        self.visit(info);
    }

    fn enter_field(&mut self, _field: &Node<ast::Field>, info: &TypeInfo<'_>) {
        self.visit(info);
    }

    fn enter_inline_fragment(&mut self, inline: &Node<ast::InlineFragment>, info: &TypeInfo<'_>) {
        if inline.type_condition.is_some() {
            self.visit(info);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
        type Query { node(id: ID!): Node }
        interface Node { id: ID! }
        "A person using the app"
        type User implements Node {
          id: ID!
          "Display name"
          name: String
          friends: [Friend!]!
        }
        type Friend implements Node { id: ID! "Friend's user" user: User }
    "#;

    fn schema() -> Schema {
        Schema::parse(SCHEMA, "schema.graphql").unwrap()
    }

    #[test]
    fn test_fragment_root() {
        let source = "fragment App_user on User { id }";
        let context = resolve_record(source, "fragment", &schema()).unwrap().unwrap();

        assert_eq!(context.type_name(), "User");
        assert_eq!(context.description.as_deref(), Some("A person using the app"));
        assert_eq!(context.field_type, None);
        assert_eq!(context.start, Some(Position::new(0, 0)));
        assert_eq!(context.end, Some(Position::new(0, source.len())));
    }

    #[test]
    fn test_nested_field() {
        let source = "\n  fragment App_user on User {\n    friends {\n      user { name }\n    }\n  }\n";
        let context = resolve_record(source, "fragment_friends_user", &schema())
            .unwrap()
            .unwrap();

        assert_eq!(context.type_name(), "User");
        assert_eq!(context.field_type.as_deref(), Some("User"));
        assert_eq!(context.description.as_deref(), Some("Friend's user"));
        assert_eq!(context.start, Some(Position::new(3, 6)));
        assert_eq!(context.end, Some(Position::new(3, 19)));
    }

    #[test]
    fn test_leaf_field_resolves_to_scalar() {
        let context = resolve_record("fragment F on User { name }", "fragment_name", &schema())
            .unwrap()
            .unwrap();

        assert!(matches!(context.ty, ExtendedType::Scalar(_)));
        assert_eq!(context.type_name(), "String");
        assert_eq!(context.description.as_deref(), Some("Display name"));
    }

    #[test]
    fn test_inline_fragment_segment() {
        let source = "query Q { node(id: 1) { ... on User { friends { id } } } }";
        let context = resolve_record(source, "fragment_node_User_friends", &schema())
            .unwrap()
            .unwrap();
        assert_eq!(context.type_name(), "Friend");
        assert_eq!(context.field_type.as_deref(), Some("[Friend!]!"));

        let inline = resolve_record(source, "fragment_node_User", &schema())
            .unwrap()
            .unwrap();
        assert_eq!(inline.type_name(), "User");
    }

    #[test]
    fn test_alias_is_not_part_of_path() {
        let source = "fragment F on User { buddies: friends { id } }";
        assert!(resolve_record(source, "fragment_friends", &schema())
            .unwrap()
            .is_some());
        assert!(resolve_record(source, "fragment_buddies", &schema())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_first_location_wins() {
        let source = "fragment F on User {\n  a: friends { id }\n  b: friends { user { id } }\n}";
        let context = resolve_record(source, "fragment_friends", &schema())
            .unwrap()
            .unwrap();
        assert_eq!(context.start, Some(Position::new(1, 2)));
    }

    #[test]
    fn test_unknown_path_is_none() {
        let result = resolve_record("fragment F on User { id }", "fragment_missing", &schema());
        assert!(result.unwrap().is_none());
    }

    #[test]
    fn test_parse_error_propagates() {
        let result = resolve_record("fragment F on User {", "fragment", &schema());
        assert!(matches!(result, Err(ContextError::DocumentParse(_))));
    }

    #[test]
    fn test_every_path_resolves_to_its_node() {
        struct Paths(Vec<(String, Option<Span>)>);
        impl TypedVisitor for Paths {
            fn enter_field(&mut self, field: &Node<ast::Field>, info: &TypeInfo<'_>) {
                self.0.push((info.record_path().to_string(), node_span(field)));
            }
        }

        let source = "fragment F on User {\n  id\n  name\n  friends {\n    id\n    user {\n      id\n      friends { id }\n    }\n  }\n}";
        let schema = schema();
        let document = parse_document(source).unwrap();
        let mut paths = Paths(Vec::new());
        walk_document(&mut paths, &document, &schema);

        assert_eq!(paths.0.len(), 8);
        for (path, span) in paths.0 {
            let found = find_record(&document, &path, &schema).unwrap();
            assert_eq!(found.span, span, "{path}");
        }
    }

    #[test]
    fn test_locate_record_addresses() {
        let document = parse_document("fragment A on User { id }\nfragment B on User { id friends { id } }").unwrap();
        assert_eq!(
            locate_record(&document, "fragment_friends", &schema()),
            Some(SelectionAddress::definition(1).child(1))
        );
        assert_eq!(
            locate_record(&document, "fragment", &schema()),
            Some(SelectionAddress::definition(0))
        );
        assert_eq!(locate_record(&document, "fragment_nope", &schema()), None);
    }
}
