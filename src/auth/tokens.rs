use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::auth::repo_types::Role;
use crate::config::AdminTokenConfig;
use crate::state::AppState;

/// Admin sessions last this long from issuance.
pub const ADMIN_TOKEN_TTL: Duration = Duration::hours(8);

/// Admin session token payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminClaims {
    pub sub: i64,   // account id
    pub role: Role, // always admin
    pub iat: i64,   // issued at (unix timestamp)
    pub exp: i64,   // iat + ADMIN_TOKEN_TTL
    pub iss: String,
    pub aud: String,
}

/// Signs and verifies stateless admin session tokens.
#[derive(Clone)]
pub struct AdminTokenKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
}

impl AdminTokenKeys {
    pub fn new(cfg: &AdminTokenConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
        }
    }

    pub fn issue(&self, account_id: i64) -> anyhow::Result<String> {
        self.issue_at(account_id, OffsetDateTime::now_utc())
    }

    pub(crate) fn issue_at(&self, account_id: i64, issued_at: OffsetDateTime) -> anyhow::Result<String> {
        let claims = AdminClaims {
            sub: account_id,
            role: Role::Admin,
            iat: issued_at.unix_timestamp(),
            exp: (issued_at + ADMIN_TOKEN_TTL).unix_timestamp(),
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(account_id, "admin token signed");
        Ok(token)
    }

    /// Returns the admin account id, or `None` for malformed, forged or expired tokens.
    pub fn verify(&self, token: &str) -> Option<i64> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));

        let claims = match decode::<AdminClaims>(token, &self.decoding, &validation) {
            Ok(data) => data.claims,
            Err(e) => {
                debug!(error = %e, "admin token rejected");
                return None;
            }
        };
        if claims.role != Role::Admin {
            debug!(account_id = claims.sub, "token without admin role marker");
            return None;
        }
        let age = OffsetDateTime::now_utc().unix_timestamp() - claims.iat;
        if age > ADMIN_TOKEN_TTL.whole_seconds() {
            debug!(account_id = claims.sub, age, "admin token past validity window");
            return None;
        }
        debug!(account_id = claims.sub, "admin token verified");
        Some(claims.sub)
    }
}

impl FromRef<AppState> for AdminTokenKeys {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}
