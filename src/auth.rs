//! Session model and bearer-token extraction.
//!
//! The remote service delivers the token out-of-band in the `authorization`
//! response header as `Bearer <urlencoded-token>`. Validity on the client is
//! just "a token exists and has not hit its expiry"; the service remains the
//! final arbiter and rejects stale tokens on its own.

pub const TOKEN_TTL_DAYS: i64 = 7;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Client-side session state as an explicit tagged value rather than an
/// implicit "cookie happens to be set".
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Unauthenticated,
    Authenticated {
        token: String,
        /// Unix millis at which the credential lapses.
        expires_at: i64,
    },
}

impl Session {
    /// Session freshly issued at `now_ms` with the standard 7-day lifetime.
    pub fn issued(token: String, now_ms: i64) -> Self {
        Session::Authenticated {
            token,
            expires_at: now_ms + TOKEN_TTL_DAYS * MILLIS_PER_DAY,
        }
    }

    pub fn is_authenticated(&self, now_ms: i64) -> bool {
        match self {
            Session::Unauthenticated => false,
            Session::Authenticated { expires_at, .. } => now_ms < *expires_at,
        }
    }

    pub fn token(&self) -> Option<&str> {
        match self {
            Session::Unauthenticated => None,
            Session::Authenticated { token, .. } => Some(token.as_str()),
        }
    }
}

/// Extracts the token from an `authorization` response header value.
///
/// Strips the literal `"Bearer "` prefix and percent-decodes the rest; the
/// service urlencodes the token before putting it on the wire. Returns `None`
/// when the prefix is missing or the remainder does not decode.
pub fn parse_bearer(header: &str) -> Option<String> {
    let raw = header.strip_prefix("Bearer ")?;
    if raw.is_empty() {
        return None;
    }
    urlencoding::decode(raw).ok().map(|cow| cow.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bearer_prefix_is_stripped_and_decoded() {
        assert_eq!(parse_bearer("Bearer A%2FB%3D"), Some("A/B=".to_string()));
        assert_eq!(
            parse_bearer("Bearer dGVzdA%3D%3D"),
            Some("dGVzdA==".to_string())
        );
    }

    #[test]
    fn plain_tokens_pass_through() {
        assert_eq!(parse_bearer("Bearer abc123"), Some("abc123".to_string()));
    }

    #[test]
    fn missing_prefix_or_empty_token_is_rejected() {
        assert_eq!(parse_bearer("abc123"), None);
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer(""), None);
    }

    #[test]
    fn issued_session_expires_after_seven_days() {
        let now = 1_700_000_000_000;
        let session = Session::issued("tok".into(), now);
        assert!(session.is_authenticated(now));
        assert!(session.is_authenticated(now + 7 * MILLIS_PER_DAY - 1));
        assert!(!session.is_authenticated(now + 7 * MILLIS_PER_DAY));
        assert_eq!(session.token(), Some("tok"));
    }

    #[test]
    fn unauthenticated_has_no_token() {
        let session = Session::default();
        assert!(!session.is_authenticated(0));
        assert_eq!(session.token(), None);
    }
}
