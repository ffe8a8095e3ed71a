use std::path::Path;

/// Host languages GraphQL can be extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    /// Raw GraphQL files (.graphql, .gql): the whole document is one fragment
    GraphQL,
    /// ReScript sources (.res, .resi) embedding GraphQL in tagged template literals
    ReScript,
}

impl Language {
    /// Detect language from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?;

        match extension {
            "graphql" | "gql" => Some(Self::GraphQL),
            "res" | "resi" => Some(Self::ReScript),
            _ => None,
        }
    }

    /// Check if this language embeds GraphQL in tagged regions (vs raw GraphQL)
    #[must_use]
    pub const fn is_embedded(&self) -> bool {
        !matches!(self, Self::GraphQL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_language_from_path() {
        assert_eq!(
            Language::from_path(&PathBuf::from("schema.graphql")),
            Some(Language::GraphQL)
        );
        assert_eq!(
            Language::from_path(&PathBuf::from("query.gql")),
            Some(Language::GraphQL)
        );
        assert_eq!(
            Language::from_path(&PathBuf::from("src/UserProfile.res")),
            Some(Language::ReScript)
        );
        assert_eq!(
            Language::from_path(&PathBuf::from("src/UserProfile.resi")),
            Some(Language::ReScript)
        );
        assert_eq!(Language::from_path(&PathBuf::from("README.md")), None);
        assert_eq!(Language::from_path(&PathBuf::from("Makefile")), None);
    }

    #[test]
    fn test_is_embedded() {
        assert!(!Language::GraphQL.is_embedded());
        assert!(Language::ReScript.is_embedded());
    }
}
