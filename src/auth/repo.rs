use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::repo_types::{Account, AccountRow, NewAccount};

#[async_trait]
pub trait AccountRepo: Send + Sync {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>>;

    /// Insert a new account. Returns `None` when the email is already taken;
    /// uniqueness is decided by the store, not by a prior lookup.
    async fn create(&self, account: NewAccount) -> anyhow::Result<Option<Account>>;
}

#[derive(Clone)]
pub struct PgAccountRepo {
    db: PgPool,
}

impl PgAccountRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepo for PgAccountRepo {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            SELECT id, fullname, email, phone, address, role, password_hash,
                   govt_id_path, payment_details, created_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(&self.db)
        .await
        .context("find user by email")?;
        row.map(Account::try_from).transpose()
    }

    async fn create(&self, account: NewAccount) -> anyhow::Result<Option<Account>> {
        let row = sqlx::query_as::<_, AccountRow>(
            r#"
            INSERT INTO users (fullname, email, phone, address, role, password_hash,
                               govt_id_path, payment_details)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT (email) DO NOTHING
            RETURNING id, fullname, email, phone, address, role, password_hash,
                      govt_id_path, payment_details, created_at
            "#,
        )
        .bind(&account.fullname)
        .bind(&account.email)
        .bind(&account.phone)
        .bind(&account.address)
        .bind(account.role.as_str())
        .bind(&account.password_hash)
        .bind(&account.govt_id_path)
        .bind(&account.payment_details)
        .fetch_optional(&self.db)
        .await
        .context("insert user")?;
        row.map(Account::try_from).transpose()
    }
}
