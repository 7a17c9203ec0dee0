//! Bearer-token authentication for the management API.
//!
//! Streaming routes stay public; only `/api` is gated. Tokens are static
//! strings from configuration: a shared API key resolves to an anonymous
//! identity, per-user tokens resolve to their configured user id.

use axum::extract::{Request, State};
use axum::http::header;
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

use super::{AppContext, AppError};
use crate::config::AuthConfig;
use crate::Error;

/// Who a request is acting as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Identity {
    User(Uuid),
    Anonymous,
}

/// Map an `Authorization` header to an identity, or `None` if the
/// credentials don't check out.
pub fn resolve_identity(auth: &AuthConfig, authorization: Option<&str>) -> Option<Identity> {
    if !auth.enabled {
        return Some(Identity::Anonymous);
    }

    let token = authorization?.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        return None;
    }

    if auth.api_key.as_deref() == Some(token) {
        return Some(Identity::Anonymous);
    }
    auth.tokens
        .iter()
        .find(|t| t.token == token)
        .map(|t| Identity::User(t.user_id))
}

/// Middleware that rejects unauthenticated `/api` requests with 401.
///
/// On success the resolved [`Identity`] is stored in request extensions for
/// downstream handlers.
pub async fn require_bearer(
    State(ctx): State<AppContext>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let authorization = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    match resolve_identity(&ctx.config.server.auth, authorization.as_deref()) {
        Some(identity) => {
            request.extensions_mut().insert(identity);
            Ok(next.run(request).await)
        }
        None => Err(Error::Unauthorized("missing or invalid bearer token".into()).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StaticToken;

    fn auth_config() -> AuthConfig {
        AuthConfig {
            enabled: true,
            api_key: Some("shared-key".into()),
            tokens: vec![StaticToken {
                token: "alice-token".into(),
                user_id: Uuid::nil(),
            }],
        }
    }

    #[test]
    fn disabled_auth_admits_everyone() {
        let auth = AuthConfig::default();
        assert_eq!(resolve_identity(&auth, None), Some(Identity::Anonymous));
    }

    #[test]
    fn api_key_resolves_anonymous() {
        let auth = auth_config();
        assert_eq!(
            resolve_identity(&auth, Some("Bearer shared-key")),
            Some(Identity::Anonymous)
        );
    }

    #[test]
    fn user_token_resolves_user() {
        let auth = auth_config();
        assert_eq!(
            resolve_identity(&auth, Some("Bearer alice-token")),
            Some(Identity::User(Uuid::nil()))
        );
    }

    #[test]
    fn bad_credentials_are_rejected() {
        let auth = auth_config();
        assert_eq!(resolve_identity(&auth, None), None);
        assert_eq!(resolve_identity(&auth, Some("Bearer wrong")), None);
        assert_eq!(resolve_identity(&auth, Some("Basic shared-key")), None);
        assert_eq!(resolve_identity(&auth, Some("Bearer ")), None);
    }
}
