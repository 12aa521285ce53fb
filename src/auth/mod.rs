// Authentication Module
// Google OAuth2 authorization-code flow with a cookie session gate

pub mod error;
pub mod google;
pub mod middleware;
pub mod routes;
pub mod session;

pub use error::AuthError;
pub use google::{GoogleProvider, TokenResponse, UserInfo};
pub use session::SessionData;
