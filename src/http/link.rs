//! Parsing of the `Link` response header used for pagination.

/// Returns the target of the `rel="next"` entry, if any.
///
/// Entries look like `<http://host/api/customers/?page=2>; rel="next"` and are
/// separated by commas.
pub fn next_link(header: &str) -> Option<String> {
    header.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        let is_next = parts.any(|param| {
            let param = param.trim();
            match param.split_once('=') {
                Some((key, value)) => {
                    key.trim().eq_ignore_ascii_case("rel")
                        && value
                            .trim()
                            .trim_matches('"')
                            .split_whitespace()
                            .any(|rel| rel.eq_ignore_ascii_case("next"))
                }
                None => false,
            }
        });
        is_next.then(|| target.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_page() {
        let header = r#"<http://example.com/api/customers/>; rel="first", <http://example.com/api/customers/?page=2>; rel="next", <http://example.com/api/customers/?page=3>; rel="last""#;
        assert_eq!(
            next_link(header),
            Some("http://example.com/api/customers/?page=2".to_string())
        );
    }

    #[test]
    fn test_middle_page() {
        let header = r#"<http://e/api/c/>; rel="first", <http://e/api/c/?page=1>; rel="prev", <http://e/api/c/?page=3>; rel="next", <http://e/api/c/?page=4>; rel="last""#;
        assert_eq!(next_link(header), Some("http://e/api/c/?page=3".to_string()));
    }

    #[test]
    fn test_last_page_has_no_next() {
        let header = r#"<http://e/api/c/>; rel="first", <http://e/api/c/?page=2>; rel="prev", <http://e/api/c/?page=3>; rel="last""#;
        assert_eq!(next_link(header), None);
    }

    #[test]
    fn test_malformed_entries_are_ignored() {
        assert_eq!(next_link(""), None);
        assert_eq!(next_link("garbage; rel=\"next\""), None);
        assert_eq!(next_link("<http://e/>; rel=next"), Some("http://e/".to_string()));
    }
}
