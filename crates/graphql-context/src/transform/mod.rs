//! Edits over parsed executable documents.
//!
//! Every transform takes the document by reference and returns a new one.
//! Unchanged subtrees are shared with the input through `Node`, and the
//! nodes on the path to an edit are copied before they are modified.

mod directive;
mod extract;
mod field;
mod pagination;

pub use directive::{add_directive_to_node, merge_arguments, merge_directive, HasDirectives};
pub use extract::{
    add_fragment_here, build_fragment_definition, extract_selection, insert_fragment_spread,
    replace_with_spread, ExtractedFragmentSpec, FragmentInsertion,
};
pub use field::{add_field_at_position, first_field, selection_for_type};
pub use pagination::add_pagination;

use crate::{node_span, ContextError, Result, Span};
use apollo_compiler::Name;
use apollo_compiler::ast::{self, Selection};
use apollo_compiler::Node;
use graphql_extract::LineIndex;

/// Inclusive range of lines inside a parsed source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineRange {
    pub start: usize,
    pub end: usize,
}

impl LineRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Lines covered by `span`
    #[must_use]
    pub fn of_span(index: &LineIndex, span: Span) -> Self {
        Self {
            start: index.offset_to_position(span.start).line,
            end: index.offset_to_position(span.end).line,
        }
    }

    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

pub(crate) fn graphql_name(value: &str) -> Result<Name> {
    Name::new(value).map_err(|_| ContextError::InvalidName(value.to_string()))
}

pub(crate) fn selection_span(selection: &Selection) -> Option<Span> {
    match selection {
        Selection::Field(field) => node_span(field),
        Selection::FragmentSpread(spread) => node_span(spread),
        Selection::InlineFragment(inline) => node_span(inline),
    }
}

pub(crate) fn has_field(selections: &[Selection], name: &str) -> bool {
    selections
        .iter()
        .any(|selection| matches!(selection, Selection::Field(field) if field.name.as_str() == name))
}

pub(crate) fn field_node(name: Name, selection_set: Vec<Selection>) -> Node<ast::Field> {
    Node::new(ast::Field {
        alias: None,
        name,
        arguments: Vec::new(),
        directives: ast::DirectiveList(Vec::new()),
        selection_set,
    })
}

pub(crate) fn argument(name: Name, value: ast::Value) -> Node<ast::Argument> {
    Node::new(ast::Argument {
        name,
        value: Node::new(value),
    })
}

pub(crate) fn string_value(value: impl Into<String>) -> ast::Value {
    ast::Value::String(value.into())
}

pub(crate) fn object_value(fields: Vec<(Name, ast::Value)>) -> ast::Value {
    ast::Value::Object(
        fields
            .into_iter()
            .map(|(name, value)| (name, Node::new(value)))
            .collect(),
    )
}
