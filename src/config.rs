use anyhow::Context;
use serde::Deserialize;

/// Signing parameters for admin session tokens.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminTokenConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Debug, Clone, Deserialize)]
pub enum StorageConfig {
    Local {
        root: String,
        public_base: String,
    },
    S3 {
        endpoint: String,
        bucket: String,
        access_key: String,
        secret_key: String,
        region: String,
        public_base: String,
    },
}

/// Admin account created at startup when `ADMIN_EMAIL` and `ADMIN_PASSWORD` are set.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSeed {
    pub fullname: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,
    pub admin_token: AdminTokenConfig,
    pub storage: StorageConfig,
    pub admin_seed: Option<AdminSeed>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL")?;
        let host = std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port = std::env::var("APP_PORT")
            .ok()
            .map(|v| v.parse::<u16>())
            .transpose()
            .context("APP_PORT")?
            .unwrap_or(8080);

        let admin_token = AdminTokenConfig {
            secret: std::env::var("ADMIN_TOKEN_SECRET").context("ADMIN_TOKEN_SECRET")?,
            issuer: std::env::var("ADMIN_TOKEN_ISSUER").unwrap_or_else(|_| "craftchain".into()),
            audience: std::env::var("ADMIN_TOKEN_AUDIENCE")
                .unwrap_or_else(|_| "craftchain-admin".into()),
        };

        let storage = match std::env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "local".into())
            .as_str()
        {
            "local" => StorageConfig::Local {
                root: std::env::var("UPLOAD_DIR").unwrap_or_else(|_| "./static".into()),
                public_base: std::env::var("UPLOAD_PUBLIC_BASE")
                    .unwrap_or_else(|_| "/static".into()),
            },
            "s3" => StorageConfig::S3 {
                endpoint: std::env::var("S3_ENDPOINT").context("S3_ENDPOINT")?,
                bucket: std::env::var("S3_BUCKET").context("S3_BUCKET")?,
                access_key: std::env::var("S3_ACCESS_KEY").context("S3_ACCESS_KEY")?,
                secret_key: std::env::var("S3_SECRET_KEY").context("S3_SECRET_KEY")?,
                region: std::env::var("S3_REGION").unwrap_or_else(|_| "us-east-1".into()),
                public_base: std::env::var("S3_PUBLIC_BASE").context("S3_PUBLIC_BASE")?,
            },
            other => anyhow::bail!("unknown STORAGE_BACKEND {other:?}, expected local or s3"),
        };

        let admin_seed = match (std::env::var("ADMIN_EMAIL"), std::env::var("ADMIN_PASSWORD")) {
            (Ok(email), Ok(password)) => Some(AdminSeed {
                fullname: std::env::var("ADMIN_FULLNAME").unwrap_or_else(|_| "Administrator".into()),
                email,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url,
            host,
            port,
            admin_token,
            storage,
            admin_seed,
        })
    }
}
