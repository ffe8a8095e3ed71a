use super::graphql_name;
use crate::Result;
use apollo_compiler::ast;
use apollo_compiler::Name;
use apollo_compiler::Node;

/// AST nodes that carry a directive list
pub trait HasDirectives: Clone {
    fn directives_mut(&mut self) -> &mut ast::DirectiveList;
}

impl HasDirectives for ast::Field {
    fn directives_mut(&mut self) -> &mut ast::DirectiveList {
        &mut self.directives
    }
}

impl HasDirectives for ast::InlineFragment {
    fn directives_mut(&mut self) -> &mut ast::DirectiveList {
        &mut self.directives
    }
}

impl HasDirectives for ast::FragmentSpread {
    fn directives_mut(&mut self) -> &mut ast::DirectiveList {
        &mut self.directives
    }
}

impl HasDirectives for ast::FragmentDefinition {
    fn directives_mut(&mut self) -> &mut ast::DirectiveList {
        &mut self.directives
    }
}

impl HasDirectives for ast::OperationDefinition {
    fn directives_mut(&mut self) -> &mut ast::DirectiveList {
        &mut self.directives
    }
}

/// Copy of `node` carrying directive `name` with `arguments`.
///
/// An existing directive of the same name is merged into rather than
/// repeated, see [`merge_directive`].
pub fn add_directive_to_node<N: HasDirectives>(
    node: &Node<N>,
    name: &str,
    arguments: Vec<Node<ast::Argument>>,
) -> Result<Node<N>> {
    let name = graphql_name(name)?;
    let mut updated = node.clone();
    merge_directive(updated.make_mut().directives_mut(), name, arguments);
    Ok(updated)
}

/// Add directive `name` to `directives`, or merge `arguments` into the
/// existing one: its arguments not named in `arguments` come first, followed
/// by all of `arguments`.
pub fn merge_directive(
    directives: &mut ast::DirectiveList,
    name: Name,
    arguments: Vec<Node<ast::Argument>>,
) {
    match directives.0.iter_mut().find(|directive| directive.name == name) {
        Some(existing) => merge_arguments(&mut existing.make_mut().arguments, arguments),
        None => directives.0.push(Node::new(ast::Directive { name, arguments })),
    }
}

/// Replace arguments of the same name and append the rest
pub fn merge_arguments(existing: &mut Vec<Node<ast::Argument>>, arguments: Vec<Node<ast::Argument>>) {
    existing.retain(|current| !arguments.iter().any(|new| new.name == current.name));
    existing.extend(arguments);
}
