use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use tracing::debug;

use crate::errors::AppError;

/// Listing id from the `:id` path segment. An id that does not parse names no
/// listing, so it is reported as not found.
pub struct ListingId(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for ListingId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        match Path::<i64>::from_request_parts(parts, state).await {
            Ok(Path(id)) => Ok(Self(id)),
            Err(e) => {
                debug!(error = %e.body_text(), "unparseable listing id");
                Err(AppError::NotFound("Product not found".into()))
            }
        }
    }
}
