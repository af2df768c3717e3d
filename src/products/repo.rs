use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::products::repo_types::{Listing, ListingRow, ListingStatus, NewListing};

#[async_trait]
pub trait ListingRepo: Send + Sync {
    /// Inserts with status `pending`.
    async fn create(&self, listing: NewListing) -> anyhow::Result<Listing>;
    async fn get(&self, id: i64) -> anyhow::Result<Option<Listing>>;
    /// Listings in `status`, optionally narrowed to one category, newest first.
    async fn list(&self, status: ListingStatus, category: Option<&str>) -> anyhow::Result<Vec<Listing>>;
    /// Every listing of one seller regardless of status, newest first.
    async fn list_by_seller(&self, seller_id: i64) -> anyhow::Result<Vec<Listing>>;
    /// Returns `None` when no listing has that id.
    async fn set_status(&self, id: i64, status: ListingStatus) -> anyhow::Result<Option<Listing>>;
}

const LISTING_COLUMNS: &str = "id, seller_id, seller_name, name, price, description, \
                               image_path, category, status, created_at";

#[derive(Clone)]
pub struct PgListingRepo {
    db: PgPool,
}

impl PgListingRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_listings(rows: Vec<ListingRow>) -> anyhow::Result<Vec<Listing>> {
    rows.into_iter().map(Listing::try_from).collect()
}

#[async_trait]
impl ListingRepo for PgListingRepo {
    async fn create(&self, listing: NewListing) -> anyhow::Result<Listing> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            r#"
            INSERT INTO products (seller_id, seller_name, name, price, description,
                                  image_path, category, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, 'pending')
            RETURNING {LISTING_COLUMNS}
            "#
        ))
        .bind(listing.seller_id)
        .bind(&listing.seller_name)
        .bind(&listing.name)
        .bind(listing.price)
        .bind(&listing.description)
        .bind(&listing.image_path)
        .bind(&listing.category)
        .fetch_one(&self.db)
        .await
        .context("insert product")?;
        row.try_into()
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Listing>> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "SELECT {LISTING_COLUMNS} FROM products WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get product")?;
        row.map(Listing::try_from).transpose()
    }

    async fn list(&self, status: ListingStatus, category: Option<&str>) -> anyhow::Result<Vec<Listing>> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            r#"
            SELECT {LISTING_COLUMNS}
            FROM products
            WHERE status = $1
              AND ($2::TEXT IS NULL OR category = $2)
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(status.as_str())
        .bind(category)
        .fetch_all(&self.db)
        .await
        .context("list products")?;
        into_listings(rows)
    }

    async fn list_by_seller(&self, seller_id: i64) -> anyhow::Result<Vec<Listing>> {
        let rows = sqlx::query_as::<_, ListingRow>(&format!(
            r#"
            SELECT {LISTING_COLUMNS}
            FROM products
            WHERE seller_id = $1
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(seller_id)
        .fetch_all(&self.db)
        .await
        .context("list products by seller")?;
        into_listings(rows)
    }

    async fn set_status(&self, id: i64, status: ListingStatus) -> anyhow::Result<Option<Listing>> {
        let row = sqlx::query_as::<_, ListingRow>(&format!(
            "UPDATE products SET status = $2 WHERE id = $1 RETURNING {LISTING_COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.db)
        .await
        .context("update product status")?;
        row.map(Listing::try_from).transpose()
    }
}
