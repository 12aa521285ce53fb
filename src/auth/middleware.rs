/// Authentication Middleware
///
/// Gate for the protected post-creation route: requires an authenticated
/// session cookie and answers 403 otherwise. The gate never establishes a
/// session itself and never redirects to login.
use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum_extra::extract::PrivateCookieJar;

use super::session;
use crate::AppState;
use crate::error::AppError;

pub async fn require_auth(
    State(_app): State<AppState>,
    jar: PrivateCookieJar,
    request: Request,
    next: Next,
) -> Response {
    let session = session::read_session(&jar);

    if !session.authenticated {
        return AppError::Forbidden.into_response();
    }

    next.run(request).await
}
