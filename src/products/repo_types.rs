use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;

/// Moderation status of a listing.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ListingStatus {
    Pending,
    Approved,
    Rejected,
}

impl ListingStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ListingStatus::Pending => "pending",
            ListingStatus::Approved => "approved",
            ListingStatus::Rejected => "rejected",
        }
    }
}

impl fmt::Display for ListingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(ListingStatus::Pending),
            "approved" => Ok(ListingStatus::Approved),
            "rejected" => Ok(ListingStatus::Rejected),
            other => anyhow::bail!("unknown listing status {other:?}"),
        }
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct ListingRow {
    pub id: i64,
    pub seller_id: i64,
    pub seller_name: String,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_path: String,
    pub category: Option<String>,
    pub status: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Listing {
    pub id: i64,
    pub seller_id: i64,
    pub seller_name: String,
    pub name: String,
    pub price: f64,
    pub description: String,
    #[serde(rename = "image_url")]
    pub image_path: String,
    pub category: Option<String>,
    pub status: ListingStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl TryFrom<ListingRow> for Listing {
    type Error = anyhow::Error;

    fn try_from(r: ListingRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            seller_id: r.seller_id,
            seller_name: r.seller_name,
            name: r.name,
            price: r.price,
            description: r.description,
            image_path: r.image_path,
            category: r.category,
            status: r.status.parse()?,
            created_at: r.created_at,
        })
    }
}

/// Insert payload; status is always pending and not part of it.
#[derive(Debug, Clone)]
pub struct NewListing {
    pub seller_id: i64,
    pub seller_name: String,
    pub name: String,
    pub price: f64,
    pub description: String,
    pub image_path: String,
    pub category: Option<String>,
}
