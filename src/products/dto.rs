use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::forms::{required, MultipartForm};
use crate::products::repo_types::ListingStatus;
use crate::uploads::services::UploadItem;

/// Listing submission with every text field present. The price is checked by
/// the catalog and the image may still be missing.
#[derive(Debug, Clone)]
pub struct NewListingInput {
    pub seller_email: String,
    pub seller_name: String,
    pub name: String,
    pub price: String,
    pub description: String,
    pub category: String,
    pub image: Option<UploadItem>,
}

impl NewListingInput {
    pub fn from_form(mut form: MultipartForm) -> Result<Self, AppError> {
        Ok(Self {
            seller_email: required(form.text("seller_email"), "seller_email")?.trim().to_string(),
            seller_name: required(form.text("seller_name"), "seller_name")?,
            name: required(form.text("product_name"), "product_name")?,
            price: required(form.text("price"), "price")?,
            description: required(form.text("description"), "description")?,
            category: required(form.text("category"), "category")?,
            image: form.file("product_image"),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ListingQuery {
    pub status: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MyProductsQuery {
    pub seller_email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListingStatusResponse {
    pub message: &'static str,
    pub id: i64,
    pub status: ListingStatus,
}
