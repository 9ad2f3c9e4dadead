//! Classification of user-supplied object identifiers.

use uuid::Uuid;

/// Accepts the forms Waldur emits: hex with or without hyphens, braced or URN.
pub fn is_uuid(value: &str) -> bool {
    Uuid::parse_str(value).is_ok()
}

/// How a caller referred to an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identifier<'a> {
    Uuid(&'a str),
    Url(&'a str),
    Name(&'a str),
}

impl<'a> Identifier<'a> {
    pub fn classify(value: &'a str) -> Self {
        if is_uuid(value) {
            Identifier::Uuid(value)
        } else if value.starts_with("http://") || value.starts_with("https://") {
            Identifier::Url(value)
        } else {
            Identifier::Name(value)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_uuid() {
        assert!(is_uuid("df3ee5cac5874dffa1aad86bc1919d8d"));
        assert!(is_uuid("6b6e6087-0ad6-4085-aadc-dcbc1fd84a7e"));
        assert!(!is_uuid("uuid_offering"));
        assert!(!is_uuid("59e46d029a79473779915a22"));
        assert!(!is_uuid(""));
    }

    #[test]
    fn test_classify() {
        assert_eq!(
            Identifier::classify("df3ee5cac5874dffa1aad86bc1919d8d"),
            Identifier::Uuid("df3ee5cac5874dffa1aad86bc1919d8d")
        );
        assert_eq!(
            Identifier::classify("https://waldur.example.com/api/customers/x/"),
            Identifier::Url("https://waldur.example.com/api/customers/x/")
        );
        assert_eq!(Identifier::classify("alice"), Identifier::Name("alice"));
    }
}
