use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header::AUTHORIZATION, request::Parts},
};
use tracing::warn;

use crate::auth::tokens::AdminTokenKeys;

/// Admin account id taken from a valid admin session token, if the request
/// carries one. Accepts `Authorization: Bearer <token>` or `X-Admin-Token`.
pub struct AdminSession(pub Option<i64>);

impl AdminSession {
    pub fn is_admin(&self) -> bool {
        self.0.is_some()
    }
}

fn presented_token(parts: &Parts) -> Option<&str> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")));
    bearer
        .or_else(|| {
            parts
                .headers
                .get("x-admin-token")
                .and_then(|h| h.to_str().ok())
        })
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminSession
where
    S: Send + Sync,
    AdminTokenKeys: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Some(token) = presented_token(parts) else {
            return Ok(AdminSession(None));
        };
        let keys = AdminTokenKeys::from_ref(state);
        let admin = keys.verify(token);
        if admin.is_none() {
            warn!("invalid or expired admin token");
        }
        Ok(AdminSession(admin))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(headers: &[(&str, &str)]) -> Parts {
        let mut req = Request::builder().uri("/");
        for (k, v) in headers {
            req = req.header(*k, *v);
        }
        req.body(()).unwrap().into_parts().0
    }

    #[test]
    fn reads_bearer_and_custom_header() {
        assert_eq!(presented_token(&parts(&[("authorization", "Bearer abc")])), Some("abc"));
        assert_eq!(presented_token(&parts(&[("x-admin-token", "xyz")])), Some("xyz"));
        assert_eq!(presented_token(&parts(&[("authorization", "Basic abc")])), None);
        assert_eq!(presented_token(&parts(&[("authorization", "Bearer ")])), None);
        assert_eq!(presented_token(&parts(&[])), None);
    }
}
