use super::{field_node, graphql_name, has_field};
use crate::{field_definition, locate_record, root_operation_type, ContextError, Result};
use apollo_compiler::Name;
use apollo_compiler::ast::{self, OperationType, Selection};
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::{name, Node, Schema};

/// Nesting limit when scaffolding selections for composite types
const MAX_SCAFFOLD_DEPTH: usize = 3;

/// Copy of `document` with field `field_name` of `parent_type` appended to
/// the selection set at `record_path`.
///
/// A composite field gets a selection set scaffolded with [`first_field`].
/// If the selection set already has a field of that name the copy is
/// unchanged. `None` means no node carries `record_path`.
pub fn add_field_at_position(
    document: &ast::Document,
    record_path: &str,
    parent_type: &ExtendedType,
    field_name: &str,
    schema: &Schema,
) -> Result<Option<ast::Document>> {
    let Some(address) = locate_record(document, record_path, schema) else {
        tracing::debug!(record_path, "No node to add a field to");
        return Ok(None);
    };
    let Some(target) = address.resolve(document) else {
        return Ok(None);
    };

    if has_field(target.selection_set(), field_name) {
        tracing::debug!(record_path, field_name, "Field already selected");
        return Ok(Some(document.clone()));
    }

    let field = new_field(schema, parent_type.name(), field_name)?;

    let mut updated = document.clone();
    if let Some(mut target) = address.resolve_mut(&mut updated) {
        target.selection_set().push(Selection::Field(field));
    }
    Ok(Some(updated))
}

/// Field to select first when scaffolding a selection on `type_name`.
///
/// `id` wins when the type has one. On the mutation root the first field of
/// object type is preferred. Otherwise the first declared field is used.
#[must_use]
pub fn first_field<'s>(
    schema: &'s Schema,
    type_name: &str,
) -> Option<(&'s Name, &'s ast::FieldDefinition)> {
    let fields = match schema.types.get(type_name)? {
        ExtendedType::Object(object) => &object.fields,
        ExtendedType::Interface(interface) => &interface.fields,
        _ => return None,
    };

    if let Some((name, field)) = fields.get_key_value("id") {
        return Some((name, &*field.node));
    }

    let is_mutation_root = root_operation_type(schema, OperationType::Mutation)
        .is_some_and(|root| root.as_str() == type_name);
    if is_mutation_root {
        let object_field = fields.iter().find(|(_, field)| {
            matches!(
                schema.types.get(field.node.ty.inner_named_type()),
                Some(ExtendedType::Object(_))
            )
        });
        if let Some((name, field)) = object_field {
            return Some((name, &*field.node));
        }
    }

    fields
        .iter()
        .next()
        .map(|(name, field)| (name, &*field.node))
}

/// Minimal selections for a newly selected field of type `type_name`.
///
/// Abstract types always start with `__typename`; a union selects nothing
/// else. Nested composite fields recurse until `MAX_SCAFFOLD_DEPTH`.
#[must_use]
pub fn selection_for_type(schema: &Schema, type_name: &str, depth: usize) -> Vec<Selection> {
    let mut selections = Vec::new();

    if is_abstract(schema, type_name) {
        selections.push(typename_selection());
    }

    if depth < MAX_SCAFFOLD_DEPTH {
        if let Some((name, definition)) = first_field(schema, type_name) {
            let field_type = definition.ty.inner_named_type();
            let nested = if is_composite(schema, field_type) {
                selection_for_type(schema, field_type, depth + 1)
            } else {
                Vec::new()
            };
            selections.push(Selection::Field(field_node(name.clone(), nested)));
        }
    }

    if selections.is_empty() {
        selections.push(typename_selection());
    }
    selections
}

fn new_field(schema: &Schema, type_name: &str, field_name: &str) -> Result<Node<ast::Field>> {
    let (_, ty) =
        field_definition(schema, type_name, field_name).ok_or_else(|| ContextError::UnknownField {
            type_name: type_name.to_string(),
            field_name: field_name.to_string(),
        })?;

    let field_type = ty.inner_named_type();
    let selection_set = if is_composite(schema, field_type) {
        selection_for_type(schema, field_type, 0)
    } else {
        Vec::new()
    };

    Ok(field_node(graphql_name(field_name)?, selection_set))
}

fn typename_selection() -> Selection {
    Selection::Field(field_node(name!("__typename"), Vec::new()))
}

fn is_abstract(schema: &Schema, type_name: &str) -> bool {
    matches!(
        schema.types.get(type_name),
        Some(ExtendedType::Interface(_) | ExtendedType::Union(_))
    )
}

pub(crate) fn is_composite(schema: &Schema, type_name: &str) -> bool {
    matches!(
        schema.types.get(type_name),
        Some(ExtendedType::Object(_) | ExtendedType::Interface(_) | ExtendedType::Union(_))
    )
}
