use serde::{Deserialize, Serialize};

use crate::auth::repo_types::{Account, Role};
use crate::errors::AppError;
use crate::forms::{optional, required, MultipartForm};
use crate::uploads::services::UploadItem;

/// Buyer registration as submitted; every field is required.
#[derive(Debug, Deserialize)]
pub struct RegisterBuyerRequest {
    pub fullname: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub password: Option<String>,
}

/// Validated buyer registration.
#[derive(Debug, Clone)]
pub struct NewBuyer {
    pub fullname: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub password: String,
}

impl TryFrom<RegisterBuyerRequest> for NewBuyer {
    type Error = AppError;

    fn try_from(r: RegisterBuyerRequest) -> Result<Self, Self::Error> {
        Ok(Self {
            fullname: required(r.fullname, "fullname")?,
            email: required(r.email, "email")?.trim().to_string(),
            phone: required(r.phone, "phone")?,
            address: required(r.address, "address")?,
            password: required(r.password, "password")?,
        })
    }
}

/// Validated seller registration; the government ID may still be absent here
/// so the registry can report it with its own error.
#[derive(Debug, Clone)]
pub struct NewSeller {
    pub fullname: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub payment_details: String,
    pub password: String,
    pub govt_id: Option<UploadItem>,
}

impl NewSeller {
    pub fn from_form(mut form: MultipartForm) -> Result<Self, AppError> {
        let address = optional(form.text("address_location")).or_else(|| form.text("address"));
        Ok(Self {
            fullname: required(form.text("fullname"), "fullname")?,
            email: required(form.text("email"), "email")?.trim().to_string(),
            phone: required(form.text("phone"), "phone")?,
            address: required(address, "address_location")?,
            payment_details: required(form.text("payment_details"), "payment_details")?,
            password: required(form.text("password"), "password")?,
            govt_id: form.file("govt_id"),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

/// Validated login input. The role is kept as submitted and only compared
/// once the credentials check out.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    pub expected_role: Option<String>,
}

impl TryFrom<LoginRequest> for Credentials {
    type Error = AppError;

    fn try_from(r: LoginRequest) -> Result<Self, Self::Error> {
        let (Some(email), Some(password)) = (optional(r.email), optional(r.password)) else {
            return Err(AppError::Validation("Email and password are required".into()));
        };
        Ok(Self {
            email: email.trim().to_string(),
            password,
            expected_role: optional(r.role).map(|role| role.trim().to_string()),
        })
    }
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub user: PublicUser,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_token: Option<String>,
}

/// Account summary returned to the client.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub id: i64,
    pub fullname: String,
    pub email: String,
    pub role: Role,
}

impl From<&Account> for PublicUser {
    fn from(a: &Account) -> Self {
        Self {
            id: a.id,
            fullname: a.fullname.clone(),
            email: a.email.clone(),
            role: a.role,
        }
    }
}
