use std::sync::Mutex;

use axum::http::HeaderMap;
use axum_extra::extract::CookieJar;

use commissionhub_auth::{AccessToken, Destination, Navigator};

/// Cookie holding the provider's access token.
pub const SESSION_COOKIE: &str = "sb-access-token";

/// Access token for this request: session cookie first, then `Authorization: Bearer`.
pub fn session_token(jar: &CookieJar, headers: &HeaderMap) -> Option<AccessToken> {
    jar.get(SESSION_COOKIE)
        .map(|c| c.value().trim())
        .filter(|v| !v.is_empty())
        .or_else(|| extract_bearer(headers))
        .map(AccessToken::new)
}

fn extract_bearer(headers: &HeaderMap) -> Option<&str> {
    let header = headers.get(axum::http::header::AUTHORIZATION)?;
    let token = header.to_str().ok()?.strip_prefix("Bearer ")?.trim();
    (!token.is_empty()).then_some(token)
}

/// Navigator that records the redirect a handler should answer with.
///
/// Only the latest destination is kept; a server response replaces the
/// current location exactly once.
#[derive(Debug, Default)]
pub struct RedirectNavigator {
    target: Mutex<Option<Destination>>,
}

impl RedirectNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Option<Destination> {
        self.target
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .take()
    }
}

impl Navigator for RedirectNavigator {
    fn replace(&self, destination: Destination) {
        *self
            .target
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = Some(destination);
    }
}
