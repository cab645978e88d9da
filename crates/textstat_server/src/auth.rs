//! Caller authentication and permission gating.
//!
//! Token issuance lives outside this service; callers present a bearer
//! token that an [`Authenticator`] resolves to a [`Principal`].

use crate::config::TokenEntry;
use crate::error::ApiError;
use crate::AppState;
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::collections::HashMap;
use textstat_core::{role_has_permission, Permission};

/// Authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub subject: String,
    pub role: String,
}

impl Principal {
    /// Fails with `Forbidden` when the caller's role lacks `permission`.
    pub fn require(&self, permission: Permission) -> Result<(), ApiError> {
        if role_has_permission(&self.role, permission) {
            return Ok(());
        }

        log::warn!(
            "event=access_denied module=auth status=denied subject={} role={} permission={}",
            self.subject,
            self.role,
            permission
        );
        Err(ApiError::Forbidden)
    }
}

/// Resolves bearer tokens to callers.
pub trait Authenticator: Send + Sync {
    fn authenticate(&self, token: &str) -> Option<Principal>;
}

/// Authenticator backed by the `[[auth.tokens]]` config table.
#[derive(Debug, Default)]
pub struct StaticTokenAuthenticator {
    principals: HashMap<String, Principal>,
}

impl StaticTokenAuthenticator {
    pub fn new(entries: &[TokenEntry]) -> Self {
        let principals = entries
            .iter()
            .map(|entry| {
                (
                    entry.token.clone(),
                    Principal {
                        subject: entry.subject.clone(),
                        role: entry.role.clone(),
                    },
                )
            })
            .collect();
        Self { principals }
    }
}

impl Authenticator for StaticTokenAuthenticator {
    fn authenticate(&self, token: &str) -> Option<Principal> {
        self.principals.get(token).cloned()
    }
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = header.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    Some(token.trim()).filter(|token| !token.is_empty())
}

#[async_trait]
impl FromRequestParts<AppState> for Principal {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Some(token) = bearer_token(parts) else {
            log::debug!("event=authenticate module=auth status=missing_token");
            return Err(ApiError::Unauthorized);
        };

        match state.authenticator.authenticate(token) {
            Some(principal) => Ok(principal),
            None => {
                log::warn!("event=authenticate module=auth status=unknown_token");
                Err(ApiError::Unauthorized)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{bearer_token, Authenticator, Principal, StaticTokenAuthenticator};
    use crate::config::TokenEntry;
    use crate::error::ApiError;
    use axum::http::Request;
    use textstat_core::Permission;

    fn parts_with_auth(value: Option<&str>) -> axum::http::request::Parts {
        let mut builder = Request::builder().uri("/v1/texts");
        if let Some(value) = value {
            builder = builder.header("authorization", value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn bearer_token_parses_scheme_case_insensitively() {
        assert_eq!(
            bearer_token(&parts_with_auth(Some("Bearer abc"))),
            Some("abc")
        );
        assert_eq!(
            bearer_token(&parts_with_auth(Some("bearer   abc "))),
            Some("abc")
        );
        assert_eq!(bearer_token(&parts_with_auth(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&parts_with_auth(Some("Bearer "))), None);
        assert_eq!(bearer_token(&parts_with_auth(None)), None);
    }

    #[test]
    fn static_authenticator_resolves_known_tokens_only() {
        let authenticator = StaticTokenAuthenticator::new(&[TokenEntry {
            token: "t-1".to_string(),
            subject: "alice".to_string(),
            role: "user".to_string(),
        }]);

        let principal = authenticator.authenticate("t-1").unwrap();
        assert_eq!(principal.subject, "alice");
        assert!(authenticator.authenticate("t-2").is_none());
    }

    #[test]
    fn require_denies_unknown_roles() {
        let principal = Principal {
            subject: "mallory".to_string(),
            role: "superuser".to_string(),
        };
        assert!(matches!(
            principal.require(Permission::GetTexts),
            Err(ApiError::Forbidden)
        ));

        let user = Principal {
            subject: "alice".to_string(),
            role: "user".to_string(),
        };
        assert!(user.require(Permission::ManageTexts).is_ok());
        assert!(matches!(
            user.require(Permission::ManageUsers),
            Err(ApiError::Forbidden)
        ));
    }
}
