//! Session lifecycle: login, registration, logout.
//!
//! Both flows validate locally first and never touch the network for
//! trivially invalid input. Login pulls the bearer token out of the
//! `authorization` response header and persists it; registration never
//! issues a token.

use crate::auth::{parse_bearer, Session, TOKEN_TTL_DAYS};
use crate::gateway::Gateway;
use crate::validate;
use crate::{LoginRequest, RegisterRequest};

pub const LOGIN_FALLBACK: &str = "Login failed";
pub const REGISTER_FALLBACK: &str = "Registration failed";

#[derive(Debug, Clone, Default)]
pub struct SessionController {
    gateway: Gateway,
}

impl SessionController {
    pub fn new(gateway: Gateway) -> Self {
        SessionController { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    /// A live credential in the store is what "logged in" means; the browser
    /// drops the cookie at expiry, and the service rejects anything stale.
    pub fn is_authenticated(&self) -> bool {
        self.gateway.store().get().is_some()
    }

    /// Credential exchange. On success the token from the `authorization`
    /// header is persisted with its 7-day lifetime and the resulting session
    /// is returned; a 2xx answer without the header leaves the store
    /// untouched and yields an unauthenticated session. Errors carry the
    /// server payload, or a generic fallback when there is none.
    pub async fn login(&self, username: &str, password: &str) -> Result<Session, String> {
        validate::validate_login(username, password).map_err(str::to_string)?;

        let body = LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        };
        let response = self
            .gateway
            .post_json("/user/login", &body)
            .await
            .map_err(|e| e.message_or(LOGIN_FALLBACK))?;

        let token = response
            .headers()
            .get("authorization")
            .and_then(|header| parse_bearer(&header));

        match token {
            Some(token) => {
                self.gateway.store().set(&token, TOKEN_TTL_DAYS);
                Ok(Session::issued(token, js_sys::Date::now() as i64))
            }
            None => Ok(Session::Unauthenticated),
        }
    }

    /// No automatic login on success; the user signs in afterwards.
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<(), String> {
        validate::validate_registration(username, email, password, confirm_password)
            .map_err(str::to_string)?;

        let body = RegisterRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        };
        self.gateway
            .post_json("/user/register", &body)
            .await
            .map_err(|e| e.message_or(REGISTER_FALLBACK))?;
        Ok(())
    }

    pub fn logout(&self) {
        self.gateway.store().clear();
    }
}
