//! Authentication routes: login initiation and the OAuth2 callback. Every
//! auth-flow failure is a soft-fail, logged server-side with the user
//! redirected to the home page.

use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::PrivateCookieJar;
use serde::Deserialize;

use super::session::{self, SessionData};
use crate::AppState;

/// OAuth2 callback parameters
#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    /// Authorization code from provider
    code: Option<String>,

    /// Anti-forgery state token
    state: Option<String>,
}

/// Start the login flow: bind a fresh state token to this attempt and
/// redirect (307) to the provider's authorization endpoint.
pub async fn login(
    State(app): State<AppState>,
    jar: PrivateCookieJar,
) -> (PrivateCookieJar, Response) {
    let state_token = session::new_state_token();

    let auth_url = match app.oauth.authorization_url(&state_token) {
        Ok(url) => url,
        Err(e) => {
            tracing::error!(error = %e, "could not build authorization URL");
            return (jar, Redirect::temporary("/").into_response());
        }
    };

    let jar = jar.add(session::state_cookie(&state_token));
    (jar, Redirect::temporary(&auth_url).into_response())
}

/// Complete the OAuth2 exchange. The received state must match the token
/// stored when login started; the stored token is cleared either way.
pub async fn callback(
    State(app): State<AppState>,
    jar: PrivateCookieJar,
    Query(params): Query<CallbackParams>,
) -> (PrivateCookieJar, Response) {
    let stored = session::stored_state(&jar);
    let jar = jar.remove(session::clear_state_cookie());

    let (code, received_state) = match (params.code, params.state) {
        (Some(code), Some(state)) => (code, state),
        _ => {
            tracing::warn!("callback missing code or state");
            return (jar, Redirect::temporary("/").into_response());
        }
    };

    match stored {
        Some(stored) if stored == received_state => {}
        _ => {
            tracing::warn!("OAuth state mismatch");
            return (jar, Redirect::temporary("/").into_response());
        }
    }

    let tokens = match app.oauth.exchange_code(&code).await {
        Ok(tokens) => tokens,
        Err(e) => {
            tracing::error!(error = %e, "token exchange failed");
            return (jar, Redirect::temporary("/").into_response());
        }
    };

    let userinfo = match app.oauth.user_info(&tokens.access_token).await {
        Ok(info) => info,
        Err(e) => {
            tracing::error!(error = %e, "userinfo request failed");
            return (jar, Redirect::temporary("/").into_response());
        }
    };

    // Login succeeded: establish the session, then show the profile.
    let jar = session::write_session(jar, &SessionData { authenticated: true });

    tracing::info!(sub = %userinfo.sub, "login successful");

    let profile = serde_json::to_string(&userinfo).unwrap_or_default();
    (jar, format!("UserInfo: {profile}").into_response())
}
