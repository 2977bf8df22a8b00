use log::{info, warn};
use reqwest::{header::ACCEPT, Client};
use serde_json::Value;

use crate::config::Credentials;
use crate::error::AuthError;

/// Bearer token issued by the provider. Fetched once at startup and never
/// refreshed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken(<redacted>)")
    }
}

/// Exchange the client id and secret for an access token.
pub async fn acquire_token(
    client: &Client,
    token_url: &str,
    credentials: &Credentials,
) -> Result<AccessToken, AuthError> {
    info!("Requesting access token from {}", token_url);

    let response = client
        .post(token_url)
        .query(&[
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ])
        .header(ACCEPT, "application/json")
        .json(&"")
        .send()
        .await
        .map_err(AuthError::request)?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(AuthError::Status {
            status: status.as_u16(),
            body,
        });
    }

    let body: Value = response.json().await.map_err(AuthError::request)?;

    match body.get("access_token").and_then(Value::as_str) {
        Some(token) if !token.is_empty() => {
            info!("Access token acquired");
            Ok(AccessToken::new(token))
        }
        _ => {
            let detail = body
                .get("error_description")
                .or_else(|| body.get("error"))
                .and_then(Value::as_str)
                .unwrap_or("no error description")
                .to_string();
            warn!("Token endpoint answered without a token: {}", detail);
            Err(AuthError::MissingToken(detail))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{unreachable_url, FakeProvider};
    use actix_web::http::StatusCode;
    use serde_json::json;

    fn credentials() -> Credentials {
        Credentials {
            client_id: "my-ak".into(),
            client_secret: "my-sk".into(),
        }
    }

    #[actix_web::test]
    async fn returns_token_from_successful_response() {
        let reply = json!({ "access_token": "tok-123", "expires_in": 2592000 });
        let (url, provider) = FakeProvider::spawn(StatusCode::OK, reply).await;

        let token = acquire_token(&Client::new(), &url, &credentials()).await.unwrap();

        assert_eq!(token.as_str(), "tok-123");
        assert_eq!(provider.hits(), 1);
        let query = &provider.queries()[0];
        assert!(query.contains("grant_type=client_credentials"));
        assert!(query.contains("client_id=my-ak"));
        assert!(query.contains("client_secret=my-sk"));
    }

    #[actix_web::test]
    async fn non_success_status_is_an_auth_error() {
        let (url, _provider) =
            FakeProvider::spawn(StatusCode::UNAUTHORIZED, json!({ "error": "unauthorized" })).await;

        let err = acquire_token(&Client::new(), &url, &credentials()).await.unwrap_err();

        assert!(matches!(err, AuthError::Status { status: 401, .. }));
    }

    #[actix_web::test]
    async fn in_band_error_carries_description() {
        let (url, _provider) = FakeProvider::spawn(
            StatusCode::OK,
            json!({ "error": "invalid_client", "error_description": "unknown client id" }),
        )
        .await;

        let err = acquire_token(&Client::new(), &url, &credentials()).await.unwrap_err();

        assert!(matches!(err, AuthError::MissingToken(ref d) if d == "unknown client id"));
    }

    #[actix_web::test]
    async fn unreachable_endpoint_is_a_request_error() {
        let err = acquire_token(&Client::new(), &unreachable_url(), &credentials())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Request(_)));
    }

    #[actix_web::test]
    async fn request_error_does_not_expose_credentials() {
        let credentials = Credentials {
            client_id: "visible-ak".into(),
            client_secret: "hidden-sk".into(),
        };
        let err = acquire_token(&Client::new(), &unreachable_url(), &credentials)
            .await
            .unwrap_err();

        let chained = anyhow::Error::new(err).context("failed to acquire access token");
        assert!(!format!("{:#}", chained).contains("hidden-sk"));
        assert!(!format!("{:?}", chained).contains("hidden-sk"));
    }

    #[test]
    fn debug_never_prints_the_token() {
        let token = AccessToken::new("super-secret");
        assert!(!format!("{:?}", token).contains("super-secret"));
    }
}
