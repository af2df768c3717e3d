use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, warn};

use crate::auth::dto::{Credentials, NewBuyer, NewSeller};
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo_types::{Account, NewAccount, Role};
use crate::config::AdminSeed;
use crate::errors::AppError;
use crate::state::AppState;
use crate::uploads::services::{self as uploads, UploadCategory};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

fn check_email(email: &str) -> Result<(), AppError> {
    if is_valid_email(email) {
        Ok(())
    } else {
        warn!(%email, "invalid email");
        Err(AppError::Validation("Invalid email".into()))
    }
}

async fn ensure_email_free(st: &AppState, email: &str) -> Result<(), AppError> {
    if st.accounts.find_by_email(email).await?.is_some() {
        warn!(%email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }
    Ok(())
}

pub async fn register_buyer(st: &AppState, buyer: NewBuyer) -> Result<Account, AppError> {
    check_email(&buyer.email)?;
    ensure_email_free(st, &buyer.email).await?;

    let account = st
        .accounts
        .create(NewAccount {
            fullname: buyer.fullname,
            email: buyer.email.clone(),
            phone: Some(buyer.phone),
            address: Some(buyer.address),
            role: Role::Buyer,
            password_hash: hash_password(&buyer.password)?,
            govt_id_path: None,
            payment_details: None,
        })
        .await?
        .ok_or_else(|| {
            warn!(email = %buyer.email, "lost duplicate email race");
            AppError::DuplicateEmail
        })?;

    info!(account_id = account.id, email = %account.email, "buyer registered");
    Ok(account)
}

/// Stores the government ID before inserting the account. A failed insert
/// removes the stored file again.
pub async fn register_seller(st: &AppState, seller: NewSeller) -> Result<Account, AppError> {
    let govt_id = seller
        .govt_id
        .ok_or(AppError::MissingFile("Government ID"))?;
    check_email(&seller.email)?;
    ensure_email_free(st, &seller.email).await?;
    let password_hash = hash_password(&seller.password)?;

    let stored = uploads::store(st, govt_id, UploadCategory::GovtId).await?;

    let created = st
        .accounts
        .create(NewAccount {
            fullname: seller.fullname,
            email: seller.email.clone(),
            phone: Some(seller.phone),
            address: Some(seller.address),
            role: Role::Seller,
            password_hash,
            govt_id_path: Some(stored.url.clone()),
            payment_details: Some(seller.payment_details),
        })
        .await;

    let account = match created {
        Ok(Some(account)) => account,
        Ok(None) => {
            warn!(email = %seller.email, "lost duplicate email race");
            uploads::discard(st, &stored).await;
            return Err(AppError::DuplicateEmail);
        }
        Err(e) => {
            uploads::discard(st, &stored).await;
            return Err(e.into());
        }
    };

    info!(account_id = account.id, email = %account.email, "seller registered");
    Ok(account)
}

/// Successful login: the account, plus an admin session token for admins.
#[derive(Debug)]
pub struct LoginOutcome {
    pub account: Account,
    pub admin_token: Option<String>,
}

pub async fn login(st: &AppState, creds: Credentials) -> Result<LoginOutcome, AppError> {
    let Some(account) = st.accounts.find_by_email(&creds.email).await? else {
        warn!(email = %creds.email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    if !verify_password(&creds.password, &account.password_hash)? {
        warn!(account_id = account.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    if let Some(expected) = creds.expected_role.as_deref() {
        if expected != account.role.as_str() {
            warn!(account_id = account.id, expected, actual = %account.role, "login role mismatch");
            return Err(AppError::RoleMismatch(account.role));
        }
    }

    let admin_token = match account.role {
        Role::Admin => Some(st.tokens.issue(account.id)?),
        Role::Buyer | Role::Seller => None,
    };

    info!(account_id = account.id, role = %account.role, "user logged in");
    Ok(LoginOutcome {
        account,
        admin_token,
    })
}

/// Creates the configured admin account unless the email is already in use.
pub async fn bootstrap_admin(st: &AppState, seed: &AdminSeed) -> anyhow::Result<()> {
    anyhow::ensure!(is_valid_email(&seed.email), "ADMIN_EMAIL is not a valid email");
    if let Some(existing) = st.accounts.find_by_email(&seed.email).await? {
        if existing.role != Role::Admin {
            warn!(email = %seed.email, role = %existing.role, "admin email belongs to a non-admin account");
        }
        return Ok(());
    }

    let created = st
        .accounts
        .create(NewAccount {
            fullname: seed.fullname.clone(),
            email: seed.email.clone(),
            phone: None,
            address: None,
            role: Role::Admin,
            password_hash: hash_password(&seed.password)?,
            govt_id_path: None,
            payment_details: None,
        })
        .await?;
    if let Some(admin) = created {
        info!(account_id = admin.id, email = %admin.email, "admin account created");
    }
    Ok(())
}
