use crate::{Position, SourceFragment};

/// Pick the fragment of `document` that `position` falls into.
///
/// A single fragment spanning the whole document (raw GraphQL files) is
/// always returned. Otherwise only lines are compared, so a position on a
/// line shared by two fragments matches both; the one declared later wins.
#[must_use]
pub fn select_at<'a>(
    fragments: &'a [SourceFragment],
    document: &str,
    position: Position,
) -> Option<&'a SourceFragment> {
    if let [only] = fragments {
        if only.location.offset == 0 && only.location.length == document.len() {
            return Some(only);
        }
    }

    let selected = fragments
        .iter()
        .filter(|fragment| fragment.location.range.contains_line(position.line))
        .last();

    if selected.is_none() {
        tracing::trace!(?position, "No GraphQL fragment at position");
    }

    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{extract_from_source, ExtractConfig, Language};

    fn fragments(source: &str) -> Vec<SourceFragment> {
        extract_from_source(source, Language::ReScript, &ExtractConfig::default()).unwrap()
    }

    const SOURCE: &str = r"module A = %relay(`
  fragment A on User { id }
`)

let x = 1

module B = %relay(`
  fragment B on User { id }
`)";

    #[test]
    fn test_selects_by_line() {
        let fragments = fragments(SOURCE);

        let a = select_at(&fragments, SOURCE, Position::new(1, 4)).unwrap();
        assert_eq!(a.module_label(), "A");

        let b = select_at(&fragments, SOURCE, Position::new(7, 0)).unwrap();
        assert_eq!(b.module_label(), "B");
    }

    #[test]
    fn test_outside_any_fragment() {
        let fragments = fragments(SOURCE);
        assert!(select_at(&fragments, SOURCE, Position::new(4, 2)).is_none());
        assert!(select_at(&fragments, SOURCE, Position::new(100, 0)).is_none());
    }

    #[test]
    fn test_boundaries_are_inclusive() {
        let fragments = fragments(SOURCE);
        // Opening line, where the content starts after the backtick
        let a = select_at(&fragments, SOURCE, Position::new(0, 0)).unwrap();
        assert_eq!(a.module_label(), "A");
        // Closing line
        let a = select_at(&fragments, SOURCE, Position::new(2, 0)).unwrap();
        assert_eq!(a.module_label(), "A");
    }

    #[test]
    fn test_last_fragment_wins_on_shared_line() {
        let source = "module A = %relay(`fragment A on User { id }`) module B = %relay(`fragment B on User { id }`)";
        let fragments = fragments(source);
        assert_eq!(fragments.len(), 2);

        let selected = select_at(&fragments, source, Position::new(0, 20)).unwrap();
        assert!(selected.content.contains("fragment B"));
    }

    #[test]
    fn test_whole_document_mode() {
        let source = "query Q {\n  viewer { id }\n}\n";
        let fragments =
            extract_from_source(source, Language::GraphQL, &ExtractConfig::default()).unwrap();

        let selected = select_at(&fragments, source, Position::new(40, 0)).unwrap();
        assert_eq!(selected.content, source);
    }

    #[test]
    fn test_no_fragments() {
        assert!(select_at(&[], "", Position::new(0, 0)).is_none());
    }
}
