/// Google OAuth2 Provider
///
/// Implements the three-step authorization-code flow against Google:
/// authorization URL construction, code-for-token exchange, and a
/// userinfo fetch with the obtained access token.
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::error::AuthError;
use crate::config::OAuthConfig;

const GOOGLE_AUTH_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const GOOGLE_TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const GOOGLE_USERINFO_URL: &str = "https://www.googleapis.com/oauth2/v3/userinfo";

/// Google OAuth2 token response
#[derive(Debug, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: Option<u64>,
    pub scope: Option<String>,
    pub id_token: Option<String>,
}

/// Profile fetched from the userinfo endpoint. Rendered to the response
/// body after login; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserInfo {
    pub sub: String,
    pub email: Option<String>,
    pub email_verified: Option<bool>,
    pub name: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
    pub picture: Option<String>,
    pub locale: Option<String>,
}

/// Google OAuth2 token request
#[derive(Debug, Serialize)]
struct TokenRequest {
    code: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    grant_type: String,
}

/// Google OAuth2 provider client
pub struct GoogleProvider {
    config: OAuthConfig,
    http_client: reqwest::Client,
}

impl GoogleProvider {
    pub fn new(config: OAuthConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AuthError::ConfigError(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Deterministic authorization URL embedding client id, redirect URL,
    /// scopes, and the opaque `state` value. Pure construction.
    pub fn authorization_url(&self, state: &str) -> Result<String, AuthError> {
        let auth_url = self.config.auth_url.as_deref().unwrap_or(GOOGLE_AUTH_URL);

        let mut url = url::Url::parse(auth_url)
            .map_err(|e| AuthError::ConfigError(format!("Invalid auth URL: {e}")))?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("client_id", &self.config.client_id);
            query.append_pair("redirect_uri", &self.config.redirect_url);
            query.append_pair("response_type", "code");
            query.append_pair("scope", &self.config.scopes.join(" "));
            query.append_pair("state", state);
        }

        Ok(url.to_string())
    }

    /// Exchange an authorization code for tokens at the token endpoint.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, AuthError> {
        let token_url = self.config.token_url.as_deref().unwrap_or(GOOGLE_TOKEN_URL);

        let token_request = TokenRequest {
            code: code.to_string(),
            client_id: self.config.client_id.clone(),
            client_secret: self.config.client_secret.clone(),
            redirect_uri: self.config.redirect_url.clone(),
            grant_type: "authorization_code".to_string(),
        };

        // Transport failures map through From<reqwest::Error>.
        let response = self
            .http_client
            .post(token_url)
            .form(&token_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::CodeExchangeFailed(format!(
                "Token request failed with status {status}: {error_text}"
            )));
        }

        let token_response: TokenResponse = response.json().await.map_err(|e| {
            AuthError::CodeExchangeFailed(format!("Failed to parse token response: {e}"))
        })?;

        Ok(token_response)
    }

    /// Fetch the user profile with a bearer token.
    pub async fn user_info(&self, access_token: &str) -> Result<UserInfo, AuthError> {
        let userinfo_url = self
            .config
            .userinfo_url
            .as_deref()
            .unwrap_or(GOOGLE_USERINFO_URL);

        let response = self
            .http_client
            .get(userinfo_url)
            .bearer_auth(access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(AuthError::UserInfoFailed(format!(
                "UserInfo request failed with status {status}: {error_text}"
            )));
        }

        let userinfo: UserInfo = response
            .json()
            .await
            .map_err(|e| AuthError::UserInfoFailed(format!("Failed to parse userinfo: {e}")))?;

        Ok(userinfo)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_config() -> OAuthConfig {
        OAuthConfig {
            client_id: "test-client-id".to_string(),
            client_secret: "test-client-secret".to_string(),
            redirect_url: "http://localhost:8080/auth/callback".to_string(),
            scopes: vec![
                "https://www.googleapis.com/auth/userinfo.profile".to_string(),
                "https://www.googleapis.com/auth/userinfo.email".to_string(),
            ],
            auth_url: None,
            token_url: None,
            userinfo_url: None,
        }
    }

    #[test]
    fn test_provider_creation() {
        let provider = GoogleProvider::new(create_test_config());
        assert!(provider.is_ok());
    }

    #[test]
    fn test_authorization_url_generation() {
        let provider = GoogleProvider::new(create_test_config()).unwrap();

        let auth_url = provider.authorization_url("test-state").unwrap();

        assert!(auth_url.starts_with(GOOGLE_AUTH_URL));
        assert!(auth_url.contains("client_id=test-client-id"));
        assert!(auth_url.contains("state=test-state"));
        assert!(auth_url.contains("response_type=code"));
        assert!(auth_url.contains("redirect_uri="));
        assert!(auth_url.contains("userinfo.profile"));
        assert!(auth_url.contains("userinfo.email"));
    }

    #[test]
    fn test_authorization_url_is_deterministic() {
        let provider = GoogleProvider::new(create_test_config()).unwrap();
        let first = provider.authorization_url("abc").unwrap();
        let second = provider.authorization_url("abc").unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_exchange_code_maps_connection_errors() {
        let mut config = create_test_config();
        // Nothing listens on port 1; the send itself fails.
        config.token_url = Some("http://127.0.0.1:1/token".to_string());
        let provider = GoogleProvider::new(config).unwrap();

        let err = provider.exchange_code("some-code").await.unwrap_err();
        assert!(matches!(err, AuthError::HttpError(_)));
    }

    #[test]
    fn test_authorization_url_respects_override() {
        let mut config = create_test_config();
        config.auth_url = Some("http://127.0.0.1:9999/authorize".to_string());
        let provider = GoogleProvider::new(config).unwrap();
        let url = provider.authorization_url("s").unwrap();
        assert!(url.starts_with("http://127.0.0.1:9999/authorize"));
    }
}
