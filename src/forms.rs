use std::collections::HashMap;

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Multipart, Query, Request},
    http::{header::CONTENT_TYPE, request::Parts},
    Form, Json,
};
use serde::de::DeserializeOwned;

use crate::errors::AppError;
use crate::uploads::services::UploadItem;

/// Returns the value if present and not blank.
pub fn required(value: Option<String>, name: &str) -> Result<String, AppError> {
    optional(value).ok_or_else(|| AppError::missing_field(name))
}

/// Treats absent and blank values alike.
pub fn optional(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Text fields and file parts of a `multipart/form-data` body.
#[derive(Debug, Default)]
pub struct MultipartForm {
    fields: HashMap<String, String>,
    files: HashMap<String, UploadItem>,
}

impl MultipartForm {
    pub async fn read(mut mp: Multipart) -> Result<Self, AppError> {
        let mut form = Self::default();
        while let Some(field) = mp.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };
            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    let content_type = field.content_type().map(str::to_string);
                    let body = field.bytes().await?;
                    form.files.insert(
                        name,
                        UploadItem {
                            body,
                            filename: Some(filename),
                            content_type,
                        },
                    );
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }
        Ok(form)
    }

    pub fn text(&mut self, name: &str) -> Option<String> {
        self.fields.remove(name)
    }

    /// A browser submits an empty, unnamed part for an untouched file input;
    /// that counts as no file.
    pub fn file(&mut self, name: &str) -> Option<UploadItem> {
        self.files.remove(name).filter(|f| {
            !(f.body.is_empty() && f.filename.as_deref().map_or(true, str::is_empty))
        })
    }
}

#[async_trait]
impl<S> FromRequest<S> for MultipartForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let mp = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        Self::read(mp).await
    }
}

/// `Query` with rejections reported as `AppError`.
pub struct QueryInput<T>(pub T);

#[async_trait]
impl<S, T> FromRequestParts<S> for QueryInput<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::Validation(e.body_text()))?;
        Ok(Self(value))
    }
}

/// Body extractor accepting JSON, urlencoded or multipart text fields.
pub struct FormInput<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for FormInput<T>
where
    S: Send + Sync,
    T: DeserializeOwned,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("application/json") {
            let Json(value) = Json::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            Ok(Self(value))
        } else if content_type.starts_with("multipart/form-data") {
            let form = MultipartForm::from_request(req, state).await?;
            let map = form
                .fields
                .into_iter()
                .map(|(k, v)| (k, serde_json::Value::String(v)))
                .collect();
            let value = serde_json::from_value(serde_json::Value::Object(map))
                .map_err(|e| AppError::Validation(e.to_string()))?;
            Ok(Self(value))
        } else {
            let Form(value) = Form::<T>::from_request(req, state)
                .await
                .map_err(|e| AppError::Validation(e.body_text()))?;
            Ok(Self(value))
        }
    }
}
