//! Persistent credential store.
//!
//! The bearer token lives in a `JWT` cookie: secure transport only,
//! same-site restricted, 7-day lifetime. The browser handles expiry, so a
//! lapsed credential simply stops showing up on reads. The token value is
//! percent-encoded on write and decoded on read so characters like `/` and
//! `=` survive the cookie grammar; callers always see the raw token.

pub const COOKIE_NAME: &str = "JWT";

const SECONDS_PER_DAY: i64 = 24 * 60 * 60;

/// Builds the `Set-Cookie`-style string handed to `document.cookie`.
pub fn build_set_cookie(name: &str, token: &str, ttl_days: i64) -> String {
    format!(
        "{}={}; Max-Age={}; Path=/; Secure; SameSite=Strict",
        name,
        urlencoding::encode(token),
        ttl_days * SECONDS_PER_DAY
    )
}

/// Cookie string that drops the credential immediately.
pub fn build_clear_cookie(name: &str) -> String {
    format!("{}=; Max-Age=0; Path=/; Secure; SameSite=Strict", name)
}

/// Picks the named cookie out of a `document.cookie`-shaped string
/// (`a=1; b=2; ...`) and percent-decodes its value.
pub fn token_from_cookie_header(header: &str, name: &str) -> Option<String> {
    for pair in header.split(';') {
        let pair = pair.trim_start();
        if let Some((key, value)) = pair.split_once('=') {
            if key == name && !value.is_empty() {
                return urlencoding::decode(value).ok().map(|cow| cow.into_owned());
            }
        }
    }
    None
}

#[cfg(feature = "frontend")]
pub use store::CredentialStore;

#[cfg(feature = "frontend")]
mod store {
    use wasm_bindgen::JsCast;

    use super::{build_clear_cookie, build_set_cookie, token_from_cookie_header, COOKIE_NAME};

    /// Handle to the browser-persisted credential slot. Stateless: every
    /// read goes back to `document.cookie`, never to an in-memory copy.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct CredentialStore;

    impl CredentialStore {
        pub fn new() -> Self {
            CredentialStore
        }

        fn html_document() -> Option<web_sys::HtmlDocument> {
            web_sys::window()?
                .document()?
                .dyn_into::<web_sys::HtmlDocument>()
                .ok()
        }

        /// Persists the token verbatim; no shape validation happens here.
        pub fn set(&self, token: &str, ttl_days: i64) {
            if let Some(doc) = Self::html_document() {
                let _ = doc.set_cookie(&build_set_cookie(COOKIE_NAME, token, ttl_days));
            }
        }

        /// Current token, or `None` when absent or expired.
        pub fn get(&self) -> Option<String> {
            let doc = Self::html_document()?;
            let cookies = doc.cookie().ok()?;
            token_from_cookie_header(&cookies, COOKIE_NAME)
        }

        pub fn clear(&self) {
            if let Some(doc) = Self::html_document() {
                let _ = doc.set_cookie(&build_clear_cookie(COOKIE_NAME));
            }
        }
    }
}
