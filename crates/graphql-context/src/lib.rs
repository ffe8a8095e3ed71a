//! Record-path resolution and structural edits for GraphQL embedded in
//! host-language sources.
//!
//! Generated types name nodes of a fragment with record paths such as
//! `fragment_user_friends_Friend_node`. This crate maps such a path back to
//! the node, its schema type and its source location, and rewrites
//! documents around those nodes.

mod address;
mod analysis;
mod context;
mod error;
mod hover;
mod record_path;
mod schema;
mod transform;
mod type_info;

pub use address::{node_span, SelectionAddress, Span, Target, TargetMut};
pub use analysis::{
    find_definition_source, record_context_at, AnalysisClient, AnalysisCommand, ResolvedRecord,
    TypeDefinition,
};
pub use context::{
    find_record, locate_record, parse_document, resolve_record, resolve_record_in_document,
    GraphQLRecordContext, RecordMatch,
};
pub use error::{ContextError, Result};
pub use hover::{resolve_from_hover_text, HoverRecord};
pub use record_path::{RecordPath, RECORD_ROOT};
pub use schema::{SchemaCache, SchemaLoader, Workspace};
pub use transform::{
    add_directive_to_node, add_field_at_position, add_fragment_here, add_pagination,
    build_fragment_definition, extract_selection, first_field, insert_fragment_spread,
    merge_arguments, merge_directive, replace_with_spread, selection_for_type,
    ExtractedFragmentSpec, FragmentInsertion, HasDirectives, LineRange,
};
pub use type_info::{
    field_definition, root_operation_type, walk_document, TypeInfo, TypedVisitor,
};

// Re-export common types from dependencies
pub use apollo_compiler::{ast, Node, Schema};
