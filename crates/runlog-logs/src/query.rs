use runlog_types::{QueryTerm, QueryToken};

/// Split user input into query terms
///
/// Words shaped like `step:foo` become tokenized terms when the token is
/// known; any other word, `foo:bar` included, is matched as free text.
pub fn parse_log_query(input: &str) -> Vec<QueryTerm> {
    input.split_whitespace().map(parse_term).collect()
}

fn parse_term(word: &str) -> QueryTerm {
    if let Some((token, value)) = word.split_once(':') {
        let token = QueryToken::from_token(token);
        if token != QueryToken::Text {
            return QueryTerm::new(token, value);
        }
    }
    QueryTerm::text(word)
}

/// Render terms back into the input form
pub fn format_log_query(terms: &[QueryTerm]) -> String {
    terms
        .iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
