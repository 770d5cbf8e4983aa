//! Search text handling for list endpoints.
//!
//! Search input is forgiving: surrounding whitespace is stripped, and empty or over-long text
//! means "no filter" rather than an error.

use std::collections::HashMap;

use serde::Deserialize;

use super::pagination::Pagination;

/// Longest search text that is applied as a filter.
pub const MAX_SEARCH_LENGTH: usize = 100;

/// The query string of a searchable list endpoint, before the search parameter is picked out.
///
/// Search parameters are collected loosely so that no value, and no repetition of one, can
/// fail the request. A repeated key keeps its last value.
#[derive(Debug, Deserialize)]
pub struct RawListQuery {
    #[serde(flatten)]
    pub pagination: Pagination,
    #[serde(flatten)]
    pub params: HashMap<String, String>,
}

impl RawListQuery {
    /// Remove and return the raw value of `name`, if it was sent.
    pub fn take(&mut self, name: &str) -> Option<String> {
        self.params.remove(name)
    }
}

/// Turn raw search input into the filter to apply, if any.
pub fn search_term(raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.chars().count() > MAX_SEARCH_LENGTH {
        tracing::debug!("Ignoring search text longer than {MAX_SEARCH_LENGTH} characters");
        return None;
    }
    Some(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::Uri};

    fn raw_query(query: &str) -> RawListQuery {
        let uri: Uri = format!("/dishes?{query}").parse().unwrap();
        Query::<RawListQuery>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_repeated_parameter_keeps_last_value() {
        let mut query = raw_query("search=tom&page=2&search=soup");
        assert_eq!(query.pagination.page, Some(2));
        assert_eq!(query.take("search").as_deref(), Some("soup"));
        assert_eq!(query.take("search"), None);
    }

    #[test]
    fn test_unrelated_parameters_are_ignored() {
        let mut query = raw_query("name=&colour=red");
        assert_eq!(query.pagination.page, None);
        assert_eq!(search_term(query.take("name").as_deref()), None);
    }

    #[test]
    fn test_absent_and_blank_mean_no_filter() {
        assert_eq!(search_term(None), None);
        assert_eq!(search_term(Some("")), None);
        assert_eq!(search_term(Some("   ")), None);
    }

    #[test]
    fn test_trims_whitespace() {
        assert_eq!(search_term(Some("  tom ")), Some("tom".to_string()));
    }

    #[test]
    fn test_over_long_text_means_no_filter() {
        let exactly = "a".repeat(MAX_SEARCH_LENGTH);
        assert_eq!(search_term(Some(&exactly)), Some(exactly.clone()));

        let too_long = "a".repeat(MAX_SEARCH_LENGTH + 1);
        assert_eq!(search_term(Some(&too_long)), None);

        // Counted in characters, not bytes
        let wide = "é".repeat(MAX_SEARCH_LENGTH);
        assert_eq!(search_term(Some(&wide)), Some(wide.clone()));
    }
}
