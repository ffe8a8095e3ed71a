use super::{argument, graphql_name, object_value, selection_span, string_value, LineRange};
use crate::{
    walk_document, ContextError, Result, SelectionAddress, Span, TypeInfo, TypedVisitor,
};
use apollo_compiler::Name;
use apollo_compiler::ast::{self, NamedType, Selection};
use apollo_compiler::{name, Node, Schema};
use graphql_extract::LineIndex;
use std::collections::BTreeMap;

/// Selections chosen to become a fragment of their own
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFragmentSpec {
    /// The selected children, in document order
    pub selections: Vec<Selection>,
    /// The whole selection set they were taken from
    pub target_selection_set: Vec<Selection>,
    /// Node owning `target_selection_set`
    pub target: SelectionAddress,
    /// Positions of `selections` inside `target_selection_set`
    pub selection_indices: Vec<usize>,
    /// Type the new fragment is declared on
    pub parent_type_name: NamedType,
    /// Variables used by the selected lines, mapped to the type expected
    /// where they are used
    pub variables: BTreeMap<String, String>,
    /// Variables whose location or expected type could not be determined
    pub unresolved_variables: Vec<String>,
}

/// Where a fragment spread can be inserted for a line range
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentInsertion {
    /// First selection inside the range; `None` appends to the set
    pub insert_before: Option<Selection>,
    pub insert_index: Option<usize>,
    pub target_selection_set: Vec<Selection>,
    pub target: SelectionAddress,
    pub parent_type_name: NamedType,
}

/// Collect the selections of `range` that can be moved into a new fragment.
///
/// The innermost selection set whose owner spans all of `range` is the
/// target; its children lying entirely inside `range` are selected. Returns
/// `None` when no selection set encloses the range, its type is unknown, or
/// no child lies inside the range.
#[must_use]
pub fn extract_selection(
    document: &ast::Document,
    range: LineRange,
    schema: &Schema,
    source: &str,
) -> Option<ExtractedFragmentSpec> {
    let found = find_enclosing(document, range, schema, source)?;
    let (selection_indices, selections): (Vec<_>, Vec<_>) =
        found.children_in_range(range).into_iter().unzip();

    if selections.is_empty() {
        tracing::debug!(?range, "No selections inside line range");
        return None;
    }

    Some(ExtractedFragmentSpec {
        selections,
        target_selection_set: found.enclosing.selections,
        target: found.enclosing.address,
        selection_indices,
        parent_type_name: found.enclosing.parent_type_name,
        variables: found.variables,
        unresolved_variables: found.unresolved_variables,
    })
}

/// Find where a spread for `range` belongs: the same enclosing selection set
/// as [`extract_selection`], anchored before its first child inside `range`
#[must_use]
pub fn add_fragment_here(
    document: &ast::Document,
    range: LineRange,
    schema: &Schema,
    source: &str,
) -> Option<FragmentInsertion> {
    let found = find_enclosing(document, range, schema, source)?;
    let anchor = found.children_in_range(range).into_iter().next();

    Some(FragmentInsertion {
        insert_index: anchor.as_ref().map(|(index, _)| *index),
        insert_before: anchor.map(|(_, selection)| selection),
        target_selection_set: found.enclosing.selections,
        target: found.enclosing.address,
        parent_type_name: found.enclosing.parent_type_name,
    })
}

/// A fragment definition named `name` holding the extracted selections.
///
/// Extracted variables are declared with
/// `@argumentDefinitions(var: {type: "Type"})`.
pub fn build_fragment_definition(
    spec: &ExtractedFragmentSpec,
    name: &str,
) -> Result<Node<ast::FragmentDefinition>> {
    let mut directives = ast::DirectiveList(Vec::new());

    if !spec.variables.is_empty() {
        let arguments = spec
            .variables
            .iter()
            .map(|(variable, ty)| {
                Ok(argument(
                    graphql_name(variable)?,
                    object_value(vec![(name!("type"), string_value(ty.as_str()))]),
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        directives.0.push(Node::new(ast::Directive {
            name: name!("argumentDefinitions"),
            arguments,
        }));
    }

    Ok(Node::new(ast::FragmentDefinition {
        name: graphql_name(name)?,
        type_condition: spec.parent_type_name.clone(),
        directives,
        selection_set: spec.selections.clone(),
    }))
}

/// Copy of `document` where the extracted selections are replaced by a
/// spread of fragment `name`, placed where the first of them was.
///
/// Extracted variables are passed on with `@arguments(var: $var)`.
pub fn replace_with_spread(
    document: &ast::Document,
    spec: &ExtractedFragmentSpec,
    name: &str,
) -> Result<ast::Document> {
    let mut directives = ast::DirectiveList(Vec::new());
    if !spec.variables.is_empty() {
        let arguments = spec
            .variables
            .keys()
            .map(|variable| {
                let variable = graphql_name(variable)?;
                Ok(argument(variable.clone(), ast::Value::Variable(variable)))
            })
            .collect::<Result<Vec<_>>>()?;
        directives.0.push(Node::new(ast::Directive {
            name: name!("arguments"),
            arguments,
        }));
    }
    let spread = spread_selection(name, directives)?;

    let mut indices = spec.selection_indices.clone();
    indices.sort_unstable();
    indices.dedup();
    let Some(&first) = indices.first() else {
        return Ok(document.clone());
    };

    let mut updated = document.clone();
    let mut target = spec
        .target
        .resolve_mut(&mut updated)
        .ok_or_else(|| ContextError::NodeNotFound(format!("{:?}", spec.target)))?;
    let selections = target.selection_set();

    for &index in indices.iter().rev() {
        if index < selections.len() {
            selections.remove(index);
        }
    }
    selections.insert(first.min(selections.len()), spread);

    Ok(updated)
}

/// Copy of `document` with a spread of fragment `name` inserted where
/// `insertion` points
pub fn insert_fragment_spread(
    document: &ast::Document,
    insertion: &FragmentInsertion,
    name: &str,
) -> Result<ast::Document> {
    let spread = spread_selection(name, ast::DirectiveList(Vec::new()))?;

    let mut updated = document.clone();
    let mut target = insertion
        .target
        .resolve_mut(&mut updated)
        .ok_or_else(|| ContextError::NodeNotFound(format!("{:?}", insertion.target)))?;
    let selections = target.selection_set();

    match insertion.insert_index {
        Some(index) if index <= selections.len() => selections.insert(index, spread),
        _ => selections.push(spread),
    }

    Ok(updated)
}

fn spread_selection(name: &str, directives: ast::DirectiveList) -> Result<Selection> {
    Ok(Selection::FragmentSpread(Node::new(ast::FragmentSpread {
        fragment_name: graphql_name(name)?,
        directives,
    })))
}

struct Enclosing {
    selections: Vec<Selection>,
    address: SelectionAddress,
    parent_type_name: NamedType,
}

struct EnclosingSearch {
    index: LineIndex,
    range: LineRange,
    enclosing: Option<Option<Enclosing>>,
    variables: BTreeMap<String, String>,
    unresolved_variables: Vec<String>,
}

struct Found {
    enclosing: Enclosing,
    index: LineIndex,
    variables: BTreeMap<String, String>,
    unresolved_variables: Vec<String>,
}

impl Found {
    fn children_in_range(&self, range: LineRange) -> Vec<(usize, Selection)> {
        self.enclosing
            .selections
            .iter()
            .enumerate()
            .filter(|(_, selection)| {
                selection_span(selection)
                    .is_some_and(|span| range.contains(LineRange::of_span(&self.index, span)))
            })
            .map(|(index, selection)| (index, selection.clone()))
            .collect()
    }
}

fn find_enclosing(
    document: &ast::Document,
    range: LineRange,
    schema: &Schema,
    source: &str,
) -> Option<Found> {
    let mut search = EnclosingSearch {
        index: LineIndex::new(source),
        range,
        enclosing: None,
        variables: BTreeMap::new(),
        unresolved_variables: Vec::new(),
    };
    walk_document(&mut search, document, schema);

    let Some(enclosing) = search.enclosing else {
        tracing::debug!(?range, "No selection set encloses line range");
        return None;
    };
    let Some(enclosing) = enclosing else {
        tracing::debug!(?range, "Enclosing selection set has no known type");
        return None;
    };

    Some(Found {
        enclosing,
        index: search.index,
        variables: search.variables,
        unresolved_variables: search.unresolved_variables,
    })
}

impl EnclosingSearch {
    fn lines(&self, span: Span) -> LineRange {
        LineRange::of_span(&self.index, span)
    }

    fn flag_unresolved(&mut self, variable: &Name) {
        if !self.unresolved_variables.iter().any(|name| name == variable.as_str()) {
            self.unresolved_variables.push(variable.to_string());
        }
    }
}

impl TypedVisitor for EnclosingSearch {
    fn enter_selection_set(
        &mut self,
        selections: &[Selection],
        owner: Option<Span>,
        info: &TypeInfo<'_>,
    ) {
        let Some(owner) = owner else {
            return;
        };
        if !self.lines(owner).contains(self.range) {
            return;
        }

        // Deeper sets are visited later and replace shallower ones
        let parent_type_name = info
            .parent_type()
            .and_then(|_| info.parent_type_name().cloned());
        self.enclosing = Some(parent_type_name.map(|parent_type_name| Enclosing {
            selections: selections.to_vec(),
            address: info.address().clone(),
            parent_type_name,
        }));
    }

    fn visit_variable(&mut self, variable: &Name, value: &Node<ast::Value>, info: &TypeInfo<'_>) {
        let Some(span) = crate::node_span(value) else {
            self.flag_unresolved(variable);
            return;
        };
        if !self.range.contains(self.lines(span)) {
            return;
        }

        match info.input_type() {
            Some(ty) => {
                self.variables.insert(variable.to_string(), ty.to_string());
            }
            None => self.flag_unresolved(variable),
        }
    }
}
