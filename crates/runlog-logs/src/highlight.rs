use regex::{Regex, RegexBuilder};

use runlog_types::{QueryTerm, QueryToken};

/// Finds the free-text query terms inside a message
#[derive(Clone, Debug, Default)]
pub struct MatchHighlighter {
    regex: Option<Regex>,
}

impl MatchHighlighter {
    /// Build a highlighter from the non-empty free-text terms
    pub fn new(terms: &[QueryTerm]) -> Result<Self, regex::Error> {
        let alternatives: Vec<String> = terms
            .iter()
            .filter(|t| t.token == QueryToken::Text && !t.value.is_empty())
            .map(|t| regex::escape(&t.value))
            .collect();

        if alternatives.is_empty() {
            return Ok(Self::default());
        }

        let regex = RegexBuilder::new(&alternatives.join("|"))
            .case_insensitive(true)
            .build()?;

        Ok(Self { regex: Some(regex) })
    }

    /// Byte ranges of every match, for highlighting
    pub fn find_matches(&self, text: &str) -> Vec<(usize, usize)> {
        match &self.regex {
            Some(re) => re.find_iter(text).map(|m| (m.start(), m.end())).collect(),
            None => Vec::new(),
        }
    }

    pub fn has_pattern(&self) -> bool {
        self.regex.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_matches() {
        let terms = vec![
            QueryTerm::new(QueryToken::Step, "error"),
            QueryTerm::text("error"),
        ];
        let highlighter = MatchHighlighter::new(&terms).unwrap();
        let matches = highlighter.find_matches("an Error occurred, another error here");
        assert_eq!(matches, vec![(3, 8), (27, 32)]);
    }

    #[test]
    fn test_special_characters_are_literal() {
        let highlighter = MatchHighlighter::new(&[QueryTerm::text("a.b(")]).unwrap();
        assert_eq!(highlighter.find_matches("axb( a.b("), vec![(5, 9)]);
    }

    #[test]
    fn test_no_text_terms() {
        let highlighter = MatchHighlighter::new(&[QueryTerm::new(QueryToken::Type, "X")]).unwrap();
        assert!(!highlighter.has_pattern());
        assert!(highlighter.find_matches("X").is_empty());
    }
}
