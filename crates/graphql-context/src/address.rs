use apollo_compiler::ast::{self, Definition, Selection};
use apollo_compiler::Node;

/// Byte span of a parsed node inside the document source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

/// Source span of `node`, `None` for synthesized nodes
pub fn node_span<T>(node: &Node<T>) -> Option<Span> {
    node.location().map(|location| Span {
        start: location.offset(),
        end: location.end_offset(),
    })
}

/// Index path from a document to one of its nodes.
///
/// `definition` indexes `Document::definitions`; each entry of `selections`
/// indexes the selection set reached so far. An empty `selections` addresses
/// the definition itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectionAddress {
    pub definition: usize,
    pub selections: Vec<usize>,
}

impl SelectionAddress {
    #[must_use]
    pub const fn definition(definition: usize) -> Self {
        Self {
            definition,
            selections: Vec::new(),
        }
    }

    /// Address of the selection at `index` inside this node's selection set
    #[must_use]
    pub fn child(&self, index: usize) -> Self {
        let mut child = self.clone();
        child.selections.push(index);
        child
    }

    /// Mutable access to the addressed node.
    ///
    /// Nodes on the way down are made unique with `Node::make_mut`, so editing
    /// a clone of a document never touches the nodes it shares with the
    /// original.
    pub fn resolve_mut<'a>(&self, document: &'a mut ast::Document) -> Option<TargetMut<'a>> {
        match document.definitions.get_mut(self.definition)? {
            Definition::OperationDefinition(operation) => {
                let operation = operation.make_mut();
                if self.selections.is_empty() {
                    Some(TargetMut::Operation(operation))
                } else {
                    descend(&mut operation.selection_set, &self.selections)
                }
            }
            Definition::FragmentDefinition(fragment) => {
                let fragment = fragment.make_mut();
                if self.selections.is_empty() {
                    Some(TargetMut::Fragment(fragment))
                } else {
                    descend(&mut fragment.selection_set, &self.selections)
                }
            }
            _ => None,
        }
    }

    /// Shared access to the addressed node
    #[must_use]
    pub fn resolve<'a>(&self, document: &'a ast::Document) -> Option<Target<'a>> {
        let (root, mut selections) = match document.definitions.get(self.definition)? {
            Definition::OperationDefinition(operation) => {
                (Target::Operation(operation), &operation.selection_set)
            }
            Definition::FragmentDefinition(fragment) => {
                (Target::Fragment(fragment), &fragment.selection_set)
            }
            _ => return None,
        };

        let mut target = root;
        for &index in &self.selections {
            target = match selections.get(index)? {
                Selection::Field(field) => {
                    selections = &field.selection_set;
                    Target::Field(field)
                }
                Selection::InlineFragment(inline) => {
                    selections = &inline.selection_set;
                    Target::InlineFragment(inline)
                }
                Selection::FragmentSpread(_) => return None,
            };
        }

        Some(target)
    }
}

fn descend<'a>(selections: &'a mut [Selection], path: &[usize]) -> Option<TargetMut<'a>> {
    let (first, rest) = path.split_first()?;
    match selections.get_mut(*first)? {
        Selection::Field(field) => {
            let field = field.make_mut();
            if rest.is_empty() {
                Some(TargetMut::Field(field))
            } else {
                descend(&mut field.selection_set, rest)
            }
        }
        Selection::InlineFragment(inline) => {
            let inline = inline.make_mut();
            if rest.is_empty() {
                Some(TargetMut::InlineFragment(inline))
            } else {
                descend(&mut inline.selection_set, rest)
            }
        }
        Selection::FragmentSpread(_) => None,
    }
}

/// A node that owns a selection set
#[derive(Debug, Clone, Copy)]
pub enum Target<'a> {
    Operation(&'a Node<ast::OperationDefinition>),
    Fragment(&'a Node<ast::FragmentDefinition>),
    Field(&'a Node<ast::Field>),
    InlineFragment(&'a Node<ast::InlineFragment>),
}

impl<'a> Target<'a> {
    #[must_use]
    pub fn selection_set(self) -> &'a [Selection] {
        match self {
            Self::Operation(operation) => &operation.selection_set,
            Self::Fragment(fragment) => &fragment.selection_set,
            Self::Field(field) => &field.selection_set,
            Self::InlineFragment(inline) => &inline.selection_set,
        }
    }

    #[must_use]
    pub fn span(self) -> Option<Span> {
        match self {
            Self::Operation(operation) => node_span(operation),
            Self::Fragment(fragment) => node_span(fragment),
            Self::Field(field) => node_span(field),
            Self::InlineFragment(inline) => node_span(inline),
        }
    }
}

/// Mutable counterpart of [`Target`]
#[derive(Debug)]
pub enum TargetMut<'a> {
    Operation(&'a mut ast::OperationDefinition),
    Fragment(&'a mut ast::FragmentDefinition),
    Field(&'a mut ast::Field),
    InlineFragment(&'a mut ast::InlineFragment),
}

impl TargetMut<'_> {
    pub fn selection_set(&mut self) -> &mut Vec<Selection> {
        match self {
            Self::Operation(operation) => &mut operation.selection_set,
            Self::Fragment(fragment) => &mut fragment.selection_set,
            Self::Field(field) => &mut field.selection_set,
            Self::InlineFragment(inline) => &mut inline.selection_set,
        }
    }

    pub fn directives(&mut self) -> &mut ast::DirectiveList {
        match self {
            Self::Operation(operation) => &mut operation.directives,
            Self::Fragment(fragment) => &mut fragment.directives,
            Self::Field(field) => &mut field.directives,
            Self::InlineFragment(inline) => &mut inline.directives,
        }
    }
}
