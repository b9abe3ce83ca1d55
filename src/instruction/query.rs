//! Query string handling.

use std::collections::BTreeMap;

use url::form_urlencoded;

/// Named (`key=value`) and positional (`flag`) query parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedQuery {
    pub parameters: BTreeMap<String, String>,
    pub list: Vec<String>,
}

/// Split `path?query` at the first `?`. An empty query counts as none.
pub fn split_query(path: &str) -> (&str, Option<&str>) {
    match path.split_once('?') {
        Some((path, query)) if !query.is_empty() => (path, Some(query)),
        Some((path, _)) => (path, None),
        None => (path, None),
    }
}

pub fn parse_query(query: Option<&str>) -> ParsedQuery {
    let mut parsed = ParsedQuery::default();
    let Some(query) = query.map(|q| q.trim_start_matches('?')) else {
        return parsed;
    };
    for part in query.split('&').filter(|p| !p.is_empty()) {
        let Some((key, value)) = form_urlencoded::parse(part.as_bytes()).next() else {
            continue;
        };
        if part.contains('=') {
            parsed.parameters.insert(key.into_owned(), value.into_owned());
        } else {
            parsed.list.push(key.into_owned());
        }
    }
    parsed
}
