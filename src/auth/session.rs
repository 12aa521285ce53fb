// Cookie Session Management
// Typed session data carried in a private (encrypted + signed) client-side
// cookie, plus the short-lived per-login OAuth state cookie.

use axum_extra::extract::PrivateCookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use serde::{Deserialize, Serialize};
use time::Duration;

pub const SESSION_COOKIE: &str = "auth-session";
pub const STATE_COOKIE: &str = "auth-state";

/// Session schema. Defaults apply when the cookie is absent or does not
/// decode, so a missing session simply reads as unauthenticated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionData {
    #[serde(default)]
    pub authenticated: bool,
}

/// Read the session from the jar, falling back to the default session.
pub fn read_session(jar: &PrivateCookieJar) -> SessionData {
    jar.get(SESSION_COOKIE)
        .and_then(|cookie| serde_json::from_str(cookie.value()).ok())
        .unwrap_or_default()
}

/// Write the session back into the jar.
pub fn write_session(jar: PrivateCookieJar, data: &SessionData) -> PrivateCookieJar {
    let value = serde_json::to_string(data).unwrap_or_else(|_| "{}".to_string());
    let cookie = Cookie::build((SESSION_COOKIE, value))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .build();
    jar.add(cookie)
}

/// Fresh random state token for one login attempt.
pub fn new_state_token() -> String {
    hex::encode(rand::random::<[u8; 16]>())
}

/// Cookie holding the pending login attempt's state token. Scoped to the
/// auth routes and short-lived.
pub fn state_cookie(state: &str) -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, state.to_string()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/auth")
        .max_age(Duration::minutes(5))
        .build()
}

/// Removal cookie for the state token.
pub fn clear_state_cookie() -> Cookie<'static> {
    Cookie::build((STATE_COOKIE, ""))
        .path("/auth")
        .max_age(Duration::ZERO)
        .build()
}

/// The state token stored for the pending login attempt, if any.
pub fn stored_state(jar: &PrivateCookieJar) -> Option<String> {
    jar.get(STATE_COOKIE).map(|c| c.value().to_string())
}
