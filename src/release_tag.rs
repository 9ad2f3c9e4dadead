//! Release tag recognition shared by the build script and the library.

/// Returns true when `tag` is a plain three-part numeric version (`1.2.3`).
///
/// Only such tags trigger a publish and become the package version.
pub fn is_release_tag(tag: &str) -> bool {
    let parts: Vec<&str> = tag.split('.').collect();
    parts.len() == 3
        && parts
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_versions_are_release_tags() {
        assert!(is_release_tag("1.2.3"));
        assert!(is_release_tag("0.1.0"));
        assert!(is_release_tag("10.20.30"));
    }

    #[test]
    fn test_other_tags_are_not_release_tags() {
        assert!(!is_release_tag("v1.2.3"));
        assert!(!is_release_tag("1.2"));
        assert!(!is_release_tag("1.2.3.4"));
        assert!(!is_release_tag("1.2.3-rc1"));
        assert!(!is_release_tag("1..3"));
        assert!(!is_release_tag(""));
    }
}
