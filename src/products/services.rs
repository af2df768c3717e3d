use tracing::{info, warn};

use crate::auth::repo_types::{Account, Role};
use crate::errors::AppError;
use crate::products::dto::NewListingInput;
use crate::products::repo_types::{Listing, ListingStatus, NewListing};
use crate::state::AppState;
use crate::uploads::services::{self as uploads, UploadCategory};

/// Parses a listing price; only positive finite numbers are accepted.
pub fn parse_price(raw: &str) -> Result<f64, AppError> {
    match raw.trim().parse::<f64>() {
        Ok(price) if price.is_finite() && price > 0.0 => Ok(price),
        _ => Err(AppError::InvalidPrice),
    }
}

fn parse_status(raw: &str) -> Result<ListingStatus, AppError> {
    raw.trim().parse().map_err(|_| AppError::InvalidStatus)
}

async fn find_seller(st: &AppState, email: &str) -> Result<Account, AppError> {
    match st.accounts.find_by_email(email).await? {
        Some(account) if account.role == Role::Seller => Ok(account),
        _ => {
            warn!(%email, "seller not found");
            Err(AppError::SellerNotFound)
        }
    }
}

/// Submits a listing for moderation. The image is stored before the row is
/// inserted and removed again if the insert fails.
pub async fn create_listing(st: &AppState, input: NewListingInput) -> Result<Listing, AppError> {
    let price = parse_price(&input.price)?;
    let seller = find_seller(st, &input.seller_email).await?;
    let image = input.image.ok_or(AppError::MissingFile("Product image"))?;

    let stored = uploads::store(st, image, UploadCategory::ProductImage).await?;

    let created = st
        .listings
        .create(NewListing {
            seller_id: seller.id,
            seller_name: input.seller_name,
            name: input.name,
            price,
            description: input.description,
            image_path: stored.url.clone(),
            category: Some(input.category),
        })
        .await;

    let listing = match created {
        Ok(listing) => listing,
        Err(e) => {
            uploads::discard(st, &stored).await;
            return Err(e.into());
        }
    };

    info!(listing_id = listing.id, seller_id = seller.id, "listing submitted for approval");
    Ok(listing)
}

/// Public catalogue view. Without a status filter only approved listings are
/// returned; pending and rejected ones need an admin caller.
pub async fn list_listings(
    st: &AppState,
    status: Option<&str>,
    category: Option<&str>,
    caller_is_admin: bool,
) -> Result<Vec<Listing>, AppError> {
    let status = status
        .map(parse_status)
        .transpose()?
        .unwrap_or(ListingStatus::Approved);
    if status != ListingStatus::Approved && !caller_is_admin {
        warn!(%status, "non-approved listings requested without admin token");
        return Err(AppError::admin_required());
    }
    Ok(st.listings.list(status, category).await?)
}

/// Any single listing is readable by id, whatever its status.
pub async fn get_listing(st: &AppState, id: i64) -> Result<Listing, AppError> {
    st.listings
        .get(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))
}

pub async fn set_status(
    st: &AppState,
    id: i64,
    new_status: Option<&str>,
    caller_is_admin: bool,
) -> Result<Listing, AppError> {
    if !caller_is_admin {
        warn!(listing_id = id, "status change without admin token");
        return Err(AppError::admin_required());
    }
    let status = new_status
        .map(parse_status)
        .transpose()?
        .ok_or(AppError::InvalidStatus)?;

    let listing = st
        .listings
        .set_status(id, status)
        .await?
        .ok_or_else(|| AppError::NotFound("Product not found".into()))?;

    info!(listing_id = id, %status, "listing status updated");
    Ok(listing)
}

/// A seller's own listings in every status.
pub async fn list_by_seller(st: &AppState, seller_email: &str) -> Result<Vec<Listing>, AppError> {
    let seller = find_seller(st, seller_email).await?;
    Ok(st.listings.list_by_seller(seller.id).await?)
}
