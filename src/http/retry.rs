//! Response classification for the Waldur transport.
//!
//! Waldur answers `409 Conflict` while an asynchronous operation on the same
//! object is still running, so that status is retried after a pause. Every
//! other unexpected status fails immediately.

use reqwest::{Method, StatusCode};

/// Attempts for mutating requests.
pub const MAX_ATTEMPTS: usize = 3;

/// GET requests are not retried on conflict.
pub const GET_ATTEMPTS: usize = 1;

/// Upper bound on followed redirects for a single request.
pub const MAX_REDIRECTS: usize = 10;

/// What to do with a response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Disposition {
    Accept,
    /// Re-issue the same request to the given location.
    Redirect(String),
    Conflict,
    Reject,
}

/// Default attempt count for a method.
pub fn attempts_for(method: &Method) -> usize {
    if method == Method::GET {
        GET_ATTEMPTS
    } else {
        MAX_ATTEMPTS
    }
}

pub fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Classifies a response status against the statuses an operation accepts.
///
/// The caller passes the `Location` header; a redirect without one is rejected.
pub fn classify(status: StatusCode, valid: &[StatusCode], location: Option<&str>) -> Disposition {
    if is_redirect(status) && !valid.contains(&status) {
        return match location {
            Some(location) => Disposition::Redirect(location.to_string()),
            None => Disposition::Reject,
        };
    }
    if valid.contains(&status) {
        return Disposition::Accept;
    }
    if status == StatusCode::CONFLICT {
        return Disposition::Conflict;
    }
    Disposition::Reject
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK: &[StatusCode] = &[StatusCode::OK];

    #[test]
    fn test_valid_status_is_accepted() {
        assert_eq!(classify(StatusCode::OK, OK, None), Disposition::Accept);
        assert_eq!(
            classify(StatusCode::NO_CONTENT, &[StatusCode::ACCEPTED, StatusCode::NO_CONTENT], None),
            Disposition::Accept
        );
    }

    #[test]
    fn test_conflict_is_retryable() {
        assert_eq!(classify(StatusCode::CONFLICT, OK, None), Disposition::Conflict);
    }

    #[test]
    fn test_redirect_needs_location() {
        assert_eq!(
            classify(StatusCode::TEMPORARY_REDIRECT, OK, Some("http://x/api/y/")),
            Disposition::Redirect("http://x/api/y/".to_string())
        );
        assert_eq!(classify(StatusCode::FOUND, OK, None), Disposition::Reject);
    }

    #[test]
    fn test_other_errors_are_rejected() {
        assert_eq!(classify(StatusCode::BAD_REQUEST, OK, None), Disposition::Reject);
        assert_eq!(classify(StatusCode::NOT_FOUND, OK, None), Disposition::Reject);
        assert_eq!(
            classify(StatusCode::INTERNAL_SERVER_ERROR, OK, None),
            Disposition::Reject
        );
        assert_eq!(classify(StatusCode::CREATED, OK, None), Disposition::Reject);
    }

    #[test]
    fn test_attempts_for_method() {
        assert_eq!(attempts_for(&Method::GET), 1);
        assert_eq!(attempts_for(&Method::POST), 3);
        assert_eq!(attempts_for(&Method::DELETE), 3);
    }
}
