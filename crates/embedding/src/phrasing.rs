/// Text embedded for every catalog row, and for CLI lookups
pub fn catalog_text(name: &str) -> String {
    format!("Medicine: {}", name)
}

/// Text embedded for lookups coming from the search page
pub fn web_query_text(name: &str) -> String {
    format!("Information about the medicine: {}", name)
}

/// How a lookup string is phrased before it is embedded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryPhrasing {
    /// Same phrasing as the indexed rows
    Catalog,
    /// Slightly more descriptive phrasing used by the HTTP API
    #[default]
    Web,
}

impl QueryPhrasing {
    pub fn phrase(self, name: &str) -> String {
        match self {
            Self::Catalog => catalog_text(name),
            Self::Web => web_query_text(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_text() {
        assert_eq!(catalog_text("Paracetamol"), "Medicine: Paracetamol");
    }

    #[test]
    fn test_phrasing() {
        assert_eq!(
            QueryPhrasing::Web.phrase("Crocin"),
            "Information about the medicine: Crocin"
        );
        assert_eq!(QueryPhrasing::Catalog.phrase("Crocin"), "Medicine: Crocin");
        assert_eq!(QueryPhrasing::default(), QueryPhrasing::Web);
    }

    #[test]
    fn test_empty_name_passes_through() {
        assert_eq!(catalog_text(""), "Medicine: ");
    }
}
