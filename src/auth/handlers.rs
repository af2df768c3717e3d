use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{
            Credentials, LoginRequest, LoginResponse, MessageResponse, NewBuyer, NewSeller,
            PublicUser, RegisterBuyerRequest,
        },
        services,
    },
    errors::AppError,
    forms::{FormInput, MultipartForm},
    state::AppState,
    uploads::MAX_UPLOAD_BYTES,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register/buyer", post(register_buyer))
        .route("/register/seller", post(register_seller))
        .route("/login", post(login))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

#[instrument(skip(state, payload))]
pub async fn register_buyer(
    State(state): State<AppState>,
    FormInput(payload): FormInput<RegisterBuyerRequest>,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let buyer = NewBuyer::try_from(payload)?;
    services::register_buyer(&state, buyer).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Buyer registered successfully",
        }),
    ))
}

#[instrument(skip(state, form))]
pub async fn register_seller(
    State(state): State<AppState>,
    form: MultipartForm,
) -> Result<(StatusCode, Json<MessageResponse>), AppError> {
    let seller = NewSeller::from_form(form)?;
    services::register_seller(&state, seller).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse {
            message: "Seller registered successfully",
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    FormInput(payload): FormInput<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let creds = Credentials::try_from(payload)?;
    let outcome = services::login(&state, creds).await?;
    Ok(Json(LoginResponse {
        message: "Login successful",
        user: PublicUser::from(&outcome.account),
        admin_token: outcome.admin_token,
    }))
}
