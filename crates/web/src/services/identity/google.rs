//! Google OAuth 2.0 identity provider.

use std::sync::Arc;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::Deserialize;

use super::{ExternalIdentity, IdentityError, IdentityProvider};
use crate::config::GoogleOAuthConfig;

const AUTHORIZE_URL: &str = "https://accounts.google.com/o/oauth2/v2/auth";
const TOKEN_URL: &str = "https://oauth2.googleapis.com/token";
const USERINFO_URL: &str = "https://openidconnect.googleapis.com/v1/userinfo";

/// Raw token response from Google's token endpoint.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// `OpenID` Connect userinfo claims.
#[derive(Debug, Deserialize)]
struct UserInfo {
    sub: String,
    email: Option<String>,
    name: Option<String>,
    picture: Option<String>,
}

impl From<UserInfo> for ExternalIdentity {
    fn from(info: UserInfo) -> Self {
        let display_name = info
            .name
            .filter(|name| !name.is_empty())
            .or_else(|| info.email.clone())
            .unwrap_or_else(|| info.sub.clone());

        Self {
            external_id: info.sub,
            email: info.email,
            display_name,
            avatar_url: info.picture,
        }
    }
}

/// Google sign-in client.
///
/// Cheaply cloneable; the HTTP client and credentials are shared.
#[derive(Clone)]
pub struct GoogleIdentityProvider {
    inner: Arc<Inner>,
}

struct Inner {
    client: reqwest::Client,
    config: GoogleOAuthConfig,
}

impl GoogleIdentityProvider {
    #[must_use]
    pub fn new(config: GoogleOAuthConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                client: reqwest::Client::new(),
                config,
            }),
        }
    }
}

#[async_trait]
impl IdentityProvider for GoogleIdentityProvider {
    fn authorization_url(&self, redirect_uri: &str, state: &str) -> String {
        format!(
            "{AUTHORIZE_URL}?\
            client_id={}&\
            response_type=code&\
            redirect_uri={}&\
            scope=openid%20profile%20email&\
            state={}",
            urlencoding::encode(&self.inner.config.client_id),
            urlencoding::encode(redirect_uri),
            urlencoding::encode(state)
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<ExternalIdentity, IdentityError> {
        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", self.inner.config.client_id.as_str()),
            (
                "client_secret",
                self.inner.config.client_secret.expose_secret(),
            ),
            ("code", code),
            ("redirect_uri", redirect_uri),
        ];

        let response = self
            .inner
            .client
            .post(TOKEN_URL)
            .form(&params)
            .send()
            .await?;

        if !response.status().is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(IdentityError::Provider(format!(
                "Token exchange failed: {text}"
            )));
        }

        let token: TokenResponse = response.json().await?;

        let response = self
            .inner
            .client
            .get(USERINFO_URL)
            .bearer_auth(&token.access_token)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(IdentityError::Provider(format!(
                "Userinfo request failed with status {}",
                response.status()
            )));
        }

        let info: UserInfo = response.json().await?;
        Ok(info.into())
    }
}
