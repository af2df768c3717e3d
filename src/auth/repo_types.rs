use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
    Admin,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            "admin" => Ok(Role::Admin),
            other => anyhow::bail!("unknown role {other:?}"),
        }
    }
}

/// Row as stored in `users`.
#[derive(Debug, Clone, FromRow)]
pub struct AccountRow {
    pub id: i64,
    pub fullname: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: String,
    pub password_hash: String,
    pub govt_id_path: Option<String>,
    pub payment_details: Option<String>,
    pub created_at: OffsetDateTime,
}

/// Registered account. Responses use `PublicUser`; the profile columns are
/// carried for storage round trips only.
#[derive(Debug, Clone)]
#[allow(dead_code)]
pub struct Account {
    pub id: i64,
    pub fullname: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub password_hash: String,
    pub govt_id_path: Option<String>,
    pub payment_details: Option<String>,
    pub created_at: OffsetDateTime,
}

impl TryFrom<AccountRow> for Account {
    type Error = anyhow::Error;

    fn try_from(r: AccountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            fullname: r.fullname,
            email: r.email,
            phone: r.phone,
            address: r.address,
            role: r.role.parse()?,
            password_hash: r.password_hash,
            govt_id_path: r.govt_id_path,
            payment_details: r.payment_details,
            created_at: r.created_at,
        })
    }
}

/// Insert payload; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub fullname: String,
    pub email: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub role: Role,
    pub password_hash: String,
    pub govt_id_path: Option<String>,
    pub payment_details: Option<String>,
}
