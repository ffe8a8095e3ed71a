//! Schema-aware traversal of executable documents.
//!
//! [`walk_document`] visits operations and fragments depth-first in source
//! order while maintaining a [`TypeInfo`]: the composite type each selection
//! set selects on, the definition and output type of the current field, the
//! expected input type of argument values, the record path and the index
//! address of the current node. Visitors read that state from the callbacks
//! of a [`TypedVisitor`].
//!
//! # Example
//!
//! ```
//! use apollo_compiler::{ast, Node, Schema};
//! use graphql_context::{walk_document, TypeInfo, TypedVisitor};
//!
//! struct FieldTypes(Vec<String>);
//!
//! impl TypedVisitor for FieldTypes {
//!     fn enter_field(&mut self, _field: &Node<ast::Field>, info: &TypeInfo<'_>) {
//!         let ty = info.field_type().map(ToString::to_string);
//!         self.0.push(ty.unwrap_or_default());
//!     }
//! }
//!
//! let schema = Schema::parse("type Query { user: User } type User { id: ID! }", "schema.graphql").unwrap();
//! let document = ast::Document::parse("{ user { id } }", "query.graphql").unwrap();
//!
//! let mut visitor = FieldTypes(Vec::new());
//! walk_document(&mut visitor, &document, &schema);
//! assert_eq!(visitor.0, ["User", "ID!"]);
//! ```

use crate::{node_span, RecordPath, SelectionAddress, Span};
use apollo_compiler::Name;
use apollo_compiler::ast::{self, NamedType, OperationType, Selection, Type};
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::{name, Node, Schema};

/// Callbacks for [`walk_document`].
///
/// `enter_*` methods run before children are visited and `leave_*` methods
/// after. The [`TypeInfo`] passed along already reflects the node being
/// entered: its record path includes the node and, for fields, its field
/// definition is current.
#[allow(unused_variables)]
pub trait TypedVisitor {
    fn enter_operation(&mut self, operation: &Node<ast::OperationDefinition>, info: &TypeInfo<'_>) {
    }

    fn leave_operation(&mut self, operation: &Node<ast::OperationDefinition>, info: &TypeInfo<'_>) {
    }

    fn enter_fragment_definition(
        &mut self,
        fragment: &Node<ast::FragmentDefinition>,
        info: &TypeInfo<'_>,
    ) {
    }

    fn leave_fragment_definition(
        &mut self,
        fragment: &Node<ast::FragmentDefinition>,
        info: &TypeInfo<'_>,
    ) {
    }

    /// Called for every non-empty selection set. `owner` is the span of the
    /// node the set belongs to.
    fn enter_selection_set(
        &mut self,
        selections: &[Selection],
        owner: Option<Span>,
        info: &TypeInfo<'_>,
    ) {
    }

    fn enter_field(&mut self, field: &Node<ast::Field>, info: &TypeInfo<'_>) {}

    fn leave_field(&mut self, field: &Node<ast::Field>, info: &TypeInfo<'_>) {}

    fn enter_inline_fragment(&mut self, inline: &Node<ast::InlineFragment>, info: &TypeInfo<'_>) {}

    fn leave_inline_fragment(&mut self, inline: &Node<ast::InlineFragment>, info: &TypeInfo<'_>) {}

    fn visit_fragment_spread(&mut self, spread: &Node<ast::FragmentSpread>, info: &TypeInfo<'_>) {}

    /// Called for every variable reference in argument values. The expected
    /// type of the position it is used in is [`TypeInfo::input_type`].
    fn visit_variable(&mut self, variable: &Name, value: &Node<ast::Value>, info: &TypeInfo<'_>) {}
}

/// Running type state of a [`walk_document`] traversal
#[derive(Debug)]
pub struct TypeInfo<'s> {
    schema: &'s Schema,
    parent_types: Vec<Option<NamedType>>,
    field_defs: Vec<Option<&'s ast::FieldDefinition>>,
    field_types: Vec<Option<Type>>,
    input_types: Vec<Option<Type>>,
    path: RecordPath,
    address: SelectionAddress,
}

impl<'s> TypeInfo<'s> {
    #[must_use]
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            parent_types: Vec::new(),
            field_defs: Vec::new(),
            field_types: Vec::new(),
            input_types: Vec::new(),
            path: RecordPath::root(),
            address: SelectionAddress::default(),
        }
    }

    #[must_use]
    pub const fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Name of the type the innermost selection set selects on
    #[must_use]
    pub fn parent_type_name(&self) -> Option<&NamedType> {
        self.parent_types.last().and_then(Option::as_ref)
    }

    /// Schema definition of [`Self::parent_type_name`]
    #[must_use]
    pub fn parent_type(&self) -> Option<&'s ExtendedType> {
        let name = self.parent_type_name()?;
        self.schema.types.get(name)
    }

    /// Definition of the current field, `None` for `__typename` and unknown
    /// fields
    #[must_use]
    pub fn field_def(&self) -> Option<&'s ast::FieldDefinition> {
        self.field_defs.last().copied().flatten()
    }

    /// Output type of the current field
    #[must_use]
    pub fn field_type(&self) -> Option<&Type> {
        self.field_types.last().and_then(Option::as_ref)
    }

    /// Schema definition of the current field's named output type
    #[must_use]
    pub fn field_named_type(&self) -> Option<&'s ExtendedType> {
        let ty = self.field_type()?;
        self.schema.types.get(ty.inner_named_type())
    }

    /// Expected type of the argument value being visited
    #[must_use]
    pub fn input_type(&self) -> Option<&Type> {
        self.input_types.last().and_then(Option::as_ref)
    }

    #[must_use]
    pub const fn record_path(&self) -> &RecordPath {
        &self.path
    }

    #[must_use]
    pub const fn address(&self) -> &SelectionAddress {
        &self.address
    }
}

/// Visit every operation and fragment definition of `document`
pub fn walk_document<V: TypedVisitor>(visitor: &mut V, document: &ast::Document, schema: &Schema) {
    let mut info = TypeInfo::new(schema);

    for (index, definition) in document.definitions.iter().enumerate() {
        info.address = SelectionAddress::definition(index);
        info.path = RecordPath::root();

        match definition {
            ast::Definition::OperationDefinition(operation) => {
                walk_operation(visitor, operation, &mut info);
            }
            ast::Definition::FragmentDefinition(fragment) => {
                walk_fragment_definition(visitor, fragment, &mut info);
            }
            _ => {}
        }
    }
}

/// Root type of `operation_type`, following the schema definition
#[must_use]
pub fn root_operation_type(schema: &Schema, operation_type: OperationType) -> Option<&NamedType> {
    let root = match operation_type {
        OperationType::Query => &schema.schema_definition.query,
        OperationType::Mutation => &schema.schema_definition.mutation,
        OperationType::Subscription => &schema.schema_definition.subscription,
    };
    root.as_ref().map(|component| &component.name)
}

/// Definition and output type of `field_name` on `type_name`.
///
/// `__typename` resolves to `String!` on any type and has no definition.
#[must_use]
pub fn field_definition<'s>(
    schema: &'s Schema,
    type_name: &str,
    field_name: &str,
) -> Option<(Option<&'s ast::FieldDefinition>, Type)> {
    if field_name == "__typename" {
        return Some((None, Type::NonNullNamed(name!("String"))));
    }

    let definition: &'s ast::FieldDefinition = match schema.types.get(type_name)? {
        ExtendedType::Object(object) => &*object.fields.get(field_name)?.node,
        ExtendedType::Interface(interface) => &*interface.fields.get(field_name)?.node,
        _ => return None,
    };

    Some((Some(definition), definition.ty.clone()))
}

fn walk_operation<V: TypedVisitor>(
    visitor: &mut V,
    operation: &Node<ast::OperationDefinition>,
    info: &mut TypeInfo<'_>,
) {
    let root = root_operation_type(info.schema, operation.operation_type).cloned();
    info.parent_types.push(root);

    visitor.enter_operation(operation, info);
    walk_directives(visitor, &operation.directives, info);
    walk_selection_set(visitor, &operation.selection_set, node_span(operation), info);
    visitor.leave_operation(operation, info);

    info.parent_types.pop();
}

fn walk_fragment_definition<V: TypedVisitor>(
    visitor: &mut V,
    fragment: &Node<ast::FragmentDefinition>,
    info: &mut TypeInfo<'_>,
) {
    info.parent_types.push(Some(fragment.type_condition.clone()));

    visitor.enter_fragment_definition(fragment, info);
    walk_directives(visitor, &fragment.directives, info);
    walk_selection_set(visitor, &fragment.selection_set, node_span(fragment), info);
    visitor.leave_fragment_definition(fragment, info);

    info.parent_types.pop();
}

fn walk_selection_set<V: TypedVisitor>(
    visitor: &mut V,
    selections: &[Selection],
    owner: Option<Span>,
    info: &mut TypeInfo<'_>,
) {
    if selections.is_empty() {
        return;
    }

    visitor.enter_selection_set(selections, owner, info);

    for (index, selection) in selections.iter().enumerate() {
        info.address.selections.push(index);
        match selection {
            Selection::Field(field) => walk_field(visitor, field, info),
            Selection::InlineFragment(inline) => walk_inline_fragment(visitor, inline, info),
            Selection::FragmentSpread(spread) => {
                visitor.visit_fragment_spread(spread, info);
                walk_directives(visitor, &spread.directives, info);
            }
        }
        info.address.selections.pop();
    }
}

fn walk_field<V: TypedVisitor>(visitor: &mut V, field: &Node<ast::Field>, info: &mut TypeInfo<'_>) {
    let schema = info.schema;
    let resolved = info
        .parent_type_name()
        .and_then(|parent| field_definition(schema, parent, &field.name));
    let (definition, ty) = match resolved {
        Some((definition, ty)) => (definition, Some(ty)),
        None => (None, None),
    };

    info.field_defs.push(definition);
    info.field_types.push(ty);
    info.path.push(&field.name);

    visitor.enter_field(field, info);

    for argument in &field.arguments {
        let expected = definition
            .and_then(|definition| {
                definition
                    .arguments
                    .iter()
                    .find(|candidate| candidate.name == argument.name)
            })
            .map(|candidate| (*candidate.ty).clone());
        walk_value(visitor, &argument.value, expected, info);
    }
    walk_directives(visitor, &field.directives, info);

    let selection_type = info.field_type().map(|ty| ty.inner_named_type().clone());
    info.parent_types.push(selection_type);
    walk_selection_set(visitor, &field.selection_set, node_span(field), info);
    info.parent_types.pop();

    visitor.leave_field(field, info);

    info.path.pop();
    info.field_types.pop();
    info.field_defs.pop();
}

fn walk_inline_fragment<V: TypedVisitor>(
    visitor: &mut V,
    inline: &Node<ast::InlineFragment>,
    info: &mut TypeInfo<'_>,
) {
    let condition = inline.type_condition.as_ref();
    if let Some(condition) = condition {
        info.path.push(condition);
    }
    let parent = condition.or_else(|| info.parent_type_name()).cloned();
    info.parent_types.push(parent);

    visitor.enter_inline_fragment(inline, info);
    walk_directives(visitor, &inline.directives, info);
    walk_selection_set(visitor, &inline.selection_set, node_span(inline), info);
    visitor.leave_inline_fragment(inline, info);

    info.parent_types.pop();
    if condition.is_some() {
        info.path.pop();
    }
}

fn walk_directives<V: TypedVisitor>(
    visitor: &mut V,
    directives: &ast::DirectiveList,
    info: &mut TypeInfo<'_>,
) {
    let schema = info.schema;
    for directive in directives.iter() {
        let definition = schema.directive_definitions.get(&directive.name);
        for argument in &directive.arguments {
            let expected = definition
                .and_then(|definition| {
                    definition
                        .arguments
                        .iter()
                        .find(|candidate| candidate.name == argument.name)
                })
                .map(|candidate| (*candidate.ty).clone());
            walk_value(visitor, &argument.value, expected, info);
        }
    }
}

fn walk_value<V: TypedVisitor>(
    visitor: &mut V,
    value: &Node<ast::Value>,
    expected: Option<Type>,
    info: &mut TypeInfo<'_>,
) {
    let schema = info.schema;
    info.input_types.push(expected);

    match &**value {
        ast::Value::Variable(variable) => visitor.visit_variable(variable, value, info),
        ast::Value::List(items) => {
            let item_type = info.input_type().map(|ty| list_item_type(ty).clone());
            for item in items {
                walk_value(visitor, item, item_type.clone(), info);
            }
        }
        ast::Value::Object(fields) => {
            let input_object = info
                .input_type()
                .and_then(|ty| schema.types.get(ty.inner_named_type()));
            for (name, field_value) in fields {
                let expected = match input_object {
                    Some(ExtendedType::InputObject(input)) => input
                        .fields
                        .get(name)
                        .map(|definition| (*definition.node.ty).clone()),
                    _ => None,
                };
                walk_value(visitor, field_value, expected, info);
            }
        }
        _ => {}
    }

    info.input_types.pop();
}

/// Item type of a list type; other types are returned unchanged, matching
/// input coercion of single values into lists
fn list_item_type(ty: &Type) -> &Type {
    match ty {
        Type::List(item) | Type::NonNullList(item) => item,
        _ => ty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r"
        type Query { user(id: ID!): User search(filter: Filter): [User!]! }
        type User { id: ID! name: String friends(first: Int, ids: [ID!]): [User!]! pet: Pet }
        union Pet = Cat | Dog
        type Cat { meows: Boolean }
        type Dog { barks: Boolean }
        input Filter { name: String nested: Filter }
    ";

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl TypedVisitor for Recorder {
        fn enter_field(&mut self, field: &Node<ast::Field>, info: &TypeInfo<'_>) {
            self.events.push(format!(
                "field {} on {} -> {} at {}",
                field.name,
                info.parent_type_name().map_or("?", |name| name.as_str()),
                info.field_type().map_or("?".to_string(), ToString::to_string),
                info.record_path()
            ));
        }

        fn enter_inline_fragment(&mut self, _inline: &Node<ast::InlineFragment>, info: &TypeInfo<'_>) {
            self.events.push(format!(
                "inline on {} at {}",
                info.parent_type_name().map_or("?", |name| name.as_str()),
                info.record_path()
            ));
        }

        fn visit_variable(&mut self, variable: &Name, _value: &Node<ast::Value>, info: &TypeInfo<'_>) {
            self.events.push(format!(
                "${variable}: {}",
                info.input_type().map_or("?".to_string(), ToString::to_string)
            ));
        }
    }

    fn walk(source: &str) -> Vec<String> {
        let schema = Schema::parse(SCHEMA, "schema.graphql").unwrap();
        let document = ast::Document::parse(source, "query.graphql").unwrap();
        let mut recorder = Recorder::default();
        walk_document(&mut recorder, &document, &schema);
        recorder.events
    }

    #[test]
    fn test_tracks_field_types_and_paths() {
        let events = walk("query Q($id: ID!) { user(id: $id) { id friends { name } } }");
        assert_eq!(
            events,
            [
                "field user on Query -> User at fragment_user",
                "$id: ID!",
                "field id on User -> ID! at fragment_user_id",
                "field friends on User -> [User!]! at fragment_user_friends",
                "field name on User -> String at fragment_user_friends_name",
            ]
        );
    }

    #[test]
    fn test_inline_fragments_extend_path_only_with_condition() {
        let events = walk(
            "fragment F on User { pet { __typename ... on Cat { meows } ... @include(if: true) { __typename } } }",
        );
        assert_eq!(
            events,
            [
                "field pet on User -> Pet at fragment_pet",
                "field __typename on Pet -> String! at fragment_pet___typename",
                "inline on Cat at fragment_pet_Cat",
                "field meows on Cat -> Boolean at fragment_pet_Cat_meows",
                "inline on Pet at fragment_pet",
                "field __typename on Pet -> String! at fragment_pet___typename",
            ]
        );
    }

    #[test]
    fn test_variable_types_in_nested_values() {
        let events = walk(
            "query Q($ids: [ID!], $id: ID!, $name: String, $keep: Boolean!) {
                search(filter: { nested: { name: $name } }) {
                    friends(ids: [$id], first: 1) @include(if: $keep) { id }
                }
                user(id: $ids) { id }
            }",
        );
        let variables: Vec<String> = events
            .into_iter()
            .filter(|event| event.starts_with('$'))
            .collect();
        assert_eq!(
            variables,
            ["$name: String", "$id: ID!", "$keep: Boolean!", "$ids: ID!"]
        );
    }

    #[test]
    fn test_unknown_fields_have_no_type() {
        let events = walk("{ missing { id } }");
        assert_eq!(
            events,
            [
                "field missing on Query -> ? at fragment_missing",
                "field id on ? -> ? at fragment_missing_id",
            ]
        );
    }

    #[test]
    fn test_addresses_follow_selection_indices() {
        struct Addresses(Vec<SelectionAddress>);
        impl TypedVisitor for Addresses {
            fn enter_field(&mut self, _field: &Node<ast::Field>, info: &TypeInfo<'_>) {
                self.0.push(info.address().clone());
            }
        }

        let schema = Schema::parse(SCHEMA, "schema.graphql").unwrap();
        let document = ast::Document::parse(
            "fragment A on User { id }\nfragment B on User { id friends { name } }",
            "query.graphql",
        )
        .unwrap();
        let mut visitor = Addresses(Vec::new());
        walk_document(&mut visitor, &document, &schema);

        assert_eq!(
            visitor.0,
            [
                SelectionAddress::definition(0).child(0),
                SelectionAddress::definition(1).child(0),
                SelectionAddress::definition(1).child(1),
                SelectionAddress::definition(1).child(1).child(0),
            ]
        );
    }
}
