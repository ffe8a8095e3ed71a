use std::fmt;

/// Leading token of every record path
pub const RECORD_ROOT: &str = "fragment";

/// Name of a node in a selection tree, as generated types refer to it.
///
/// The path starts at [`RECORD_ROOT`] and gains one segment per enclosing
/// field (its name, never its alias) and per typed inline fragment (its type
/// condition). Joined with `_`, a field `friends` under an inline fragment on
/// `Friend` inside field `user` is `fragment_user_Friend_friends`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPath {
    segments: Vec<String>,
}

impl RecordPath {
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    pub fn push(&mut self, segment: &str) {
        self.segments.push(segment.to_string());
    }

    pub fn pop(&mut self) -> Option<String> {
        self.segments.pop()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Whether the joined path equals `record_name`, without joining
    #[must_use]
    pub fn matches(&self, record_name: &str) -> bool {
        let Some(mut rest) = record_name.strip_prefix(RECORD_ROOT) else {
            return false;
        };

        for segment in &self.segments {
            match rest
                .strip_prefix('_')
                .and_then(|rest| rest.strip_prefix(segment.as_str()))
            {
                Some(remaining) => rest = remaining,
                None => return false,
            }
        }

        rest.is_empty()
    }
}

impl fmt::Display for RecordPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(RECORD_ROOT)?;
        for segment in &self.segments {
            write!(f, "_{segment}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn path(segments: &[&str]) -> RecordPath {
        let mut path = RecordPath::root();
        for segment in segments {
            path.push(segment);
        }
        path
    }

    #[test]
    fn test_root_path() {
        let root = RecordPath::root();
        assert!(root.is_root());
        assert_eq!(root.to_string(), "fragment");
        assert!(root.matches("fragment"));
        assert!(!root.matches("fragment_user"));
    }

    #[test]
    fn test_join_segments() {
        let path = path(&["user", "friends", "Friend", "node"]);
        assert_eq!(path.to_string(), "fragment_user_friends_Friend_node");
        assert!(path.matches("fragment_user_friends_Friend_node"));
    }

    #[test]
    fn test_matches_agrees_with_display() {
        let path = path(&["user", "friends"]);
        for candidate in [
            "fragment_user_friends",
            "fragment_user_friend",
            "fragment_user_friends_",
            "fragment_user",
            "fragment__user_friends",
            "fragmentuser_friends",
            "",
        ] {
            assert_eq!(
                path.matches(candidate),
                path.to_string() == candidate,
                "{candidate}"
            );
        }
    }

    #[test]
    fn test_push_pop() {
        let mut path = path(&["user"]);
        path.push("avatar");
        assert_eq!(path.pop().as_deref(), Some("avatar"));
        assert_eq!(path.segments(), ["user".to_string()]);
    }
}
