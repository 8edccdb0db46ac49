//! Ordered header pairs and conversion to the transport's `HeaderMap`.
//!
//! Request and response descriptors carry headers as an ordered list of
//! name/value pairs with duplicates allowed, which is the form the editor
//! and the persistence layer work with. The transport layer works with
//! `http::HeaderMap`. Conversion keeps every occurrence of a repeated
//! name; lookups compare names case-insensitively.

use http::header::{HeaderMap, HeaderName, HeaderValue};

/// A header pair that cannot be represented in `http::HeaderMap`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("invalid header {name:?}: {reason}")]
pub struct InvalidHeader {
    /// Name of the offending pair.
    pub name: String,
    /// What the header type rejected.
    pub reason: String,
}

/// Convert ordered pairs into a `HeaderMap`.
///
/// Repeated names are appended, so every occurrence survives in order.
///
/// # Errors
///
/// Returns [`InvalidHeader`] when a name or value contains bytes the
/// `http` types reject.
pub fn pairs_to_header_map(pairs: &[(String, String)]) -> Result<HeaderMap, InvalidHeader> {
    let mut map = HeaderMap::with_capacity(pairs.len());
    for (name, value) in pairs {
        let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        let header_value = HeaderValue::from_str(value).map_err(|e| InvalidHeader {
            name: name.clone(),
            reason: e.to_string(),
        })?;
        map.append(header_name, header_value);
    }
    Ok(map)
}

/// Convert a `HeaderMap` into ordered pairs.
///
/// Multi-valued headers produce one pair per value. Values that are not
/// UTF-8 are replaced lossily rather than dropped.
pub fn header_map_to_pairs(map: &HeaderMap) -> Vec<(String, String)> {
    map.iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect()
}

/// Case-insensitive lookup of a header value in ordered pairs.
///
/// The first occurrence wins.
pub fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

/// Look up the `content-type` header in ordered pairs.
pub fn content_type(pairs: &[(String, String)]) -> Option<&str> {
    lookup(pairs, "content-type")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(entries: &[(&str, &str)]) -> Vec<(String, String)> {
        entries
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_pairs_to_header_map_keeps_duplicates() {
        let map = pairs_to_header_map(&pairs(&[
            ("set-cookie", "a=1"),
            ("set-cookie", "b=2"),
            ("accept", "application/json"),
        ]))
        .unwrap();

        let cookies: Vec<_> = map.get_all("set-cookie").iter().collect();
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies[0], "a=1");
        assert_eq!(cookies[1], "b=2");
        assert_eq!(map.get("accept").unwrap(), "application/json");
    }

    #[test]
    fn test_pairs_to_header_map_rejects_bad_name() {
        let err = pairs_to_header_map(&pairs(&[("bad header", "x")])).unwrap_err();
        assert_eq!(err.name, "bad header");
    }

    #[test]
    fn test_header_map_round_trip() {
        let original = pairs(&[("x-a", "1"), ("x-a", "2"), ("x-b", "3")]);
        let map = pairs_to_header_map(&original).unwrap();
        let back = header_map_to_pairs(&map);
        // HeaderMap groups values under their name but keeps each one.
        assert_eq!(back.len(), 3);
        let a_values: Vec<_> = back
            .iter()
            .filter(|(n, _)| n == "x-a")
            .map(|(_, v)| v.as_str())
            .collect();
        assert_eq!(a_values, ["1", "2"]);
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let headers = pairs(&[("Content-Type", "application/json")]);
        assert_eq!(content_type(&headers), Some("application/json"));
        assert_eq!(lookup(&headers, "CONTENT-TYPE"), Some("application/json"));
        assert_eq!(lookup(&headers, "accept"), None);
    }

    #[test]
    fn test_lookup_first_occurrence_wins() {
        let headers = pairs(&[("x-id", "first"), ("X-Id", "second")]);
        assert_eq!(lookup(&headers, "x-id"), Some("first"));
    }
}
