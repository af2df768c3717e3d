use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    routing::{get, patch, post},
    Json, Router,
};
use tracing::{debug, instrument};

use crate::{
    auth::extractors::AdminSession,
    errors::AppError,
    forms::{optional, required, MultipartForm, QueryInput},
    products::{
        dto::{ListingQuery, ListingStatusResponse, MyProductsQuery, NewListingInput, StatusUpdateRequest},
        extractors::ListingId,
        repo_types::Listing,
        services,
    },
    state::AppState,
    uploads::MAX_UPLOAD_BYTES,
};

pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(list_products))
        .route("/products/:id", get(get_product))
        .route("/my-products", get(my_products))
}

pub fn write_routes() -> Router<AppState> {
    Router::new()
        .route("/products", post(create_product))
        .route("/products/:id/status", patch(update_status))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

/// POST /products (multipart, image in `product_image`)
#[instrument(skip(state, form))]
pub async fn create_product(
    State(state): State<AppState>,
    form: MultipartForm,
) -> Result<(StatusCode, HeaderMap, Json<ListingStatusResponse>), AppError> {
    let input = NewListingInput::from_form(form)?;
    let listing = services::create_listing(&state, input).await?;

    let mut headers = HeaderMap::new();
    if let Ok(location) = HeaderValue::from_str(&format!("/api/products/{}", listing.id)) {
        headers.insert(header::LOCATION, location);
    }

    Ok((
        StatusCode::CREATED,
        headers,
        Json(ListingStatusResponse {
            message: "Product submitted for approval",
            id: listing.id,
            status: listing.status,
        }),
    ))
}

#[instrument(skip(state, admin))]
pub async fn list_products(
    State(state): State<AppState>,
    admin: AdminSession,
    QueryInput(q): QueryInput<ListingQuery>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let status = optional(q.status);
    let category = optional(q.category);
    let listings = services::list_listings(
        &state,
        status.as_deref(),
        category.as_deref(),
        admin.is_admin(),
    )
    .await?;
    Ok(Json(listings))
}

#[instrument(skip(state))]
pub async fn get_product(
    State(state): State<AppState>,
    ListingId(id): ListingId,
) -> Result<Json<Listing>, AppError> {
    Ok(Json(services::get_listing(&state, id).await?))
}

/// PATCH /products/:id/status { "status": "approved" }
#[instrument(skip(state, admin, body))]
pub async fn update_status(
    State(state): State<AppState>,
    admin: AdminSession,
    ListingId(id): ListingId,
    body: Bytes,
) -> Result<Json<ListingStatusResponse>, AppError> {
    // An unreadable body is reported as an invalid status, after the admin check.
    let req: StatusUpdateRequest = serde_json::from_slice(&body).unwrap_or_else(|e| {
        debug!(error = %e, "status update body is not valid JSON");
        StatusUpdateRequest::default()
    });
    let listing = services::set_status(&state, id, req.status.as_deref(), admin.is_admin()).await?;
    Ok(Json(ListingStatusResponse {
        message: "Status updated",
        id: listing.id,
        status: listing.status,
    }))
}

#[instrument(skip(state))]
pub async fn my_products(
    State(state): State<AppState>,
    QueryInput(q): QueryInput<MyProductsQuery>,
) -> Result<Json<Vec<Listing>>, AppError> {
    let seller_email = required(q.seller_email, "seller_email")
        .map_err(|_| AppError::Validation("seller_email is required".into()))?;
    let listings = services::list_by_seller(&state, seller_email.trim()).await?;
    Ok(Json(listings))
}
