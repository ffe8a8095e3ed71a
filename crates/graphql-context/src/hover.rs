use once_cell::sync::Lazy;
use regex::Regex;

/// A `rescript` code block naming a generated record type, such as
/// `App.User_user_graphql.Types.fragment_friends`
static GENERATED_TYPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"`+rescript\n\w+\.(\w+)_graphql\.Types\.(\w+)\n")
        .expect("generated type pattern is valid")
});

/// A generated record type named by hover text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverRecord {
    /// Operation or fragment the record type was generated for
    pub fragment_name: String,
    /// Record path inside that operation or fragment
    pub record_name: String,
}

/// Find the generated record type referenced by `hover_text`.
///
/// Hover text may contain several fenced blocks; the last reference is the
/// innermost type and wins. Text without a reference yields `None`.
#[must_use]
pub fn resolve_from_hover_text(hover_text: &str) -> Option<HoverRecord> {
    let captures = GENERATED_TYPE.captures_iter(hover_text).last()?;

    Some(HoverRecord {
        fragment_name: captures[1].to_string(),
        record_name: captures[2].to_string(),
    })
}
