use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::config::AppConfig;
use crate::state::AppState;
use crate::{auth, products};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(products::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri, status = tracing::field::Empty)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::services::bootstrap_admin;
    use crate::config::AdminSeed;
    use crate::testing::{test_state, MemoryStorage};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
        response::Response,
    };
    use serde_json::Value;
    use std::sync::Arc;
    use time::{Duration, OffsetDateTime};
    use tower::ServiceExt;

    const BOUNDARY: &str = "craftchain-test-boundary";

    enum Part<'a> {
        Text(&'a str, &'a str),
        File(&'a str, &'a str, &'a [u8]),
    }

    fn multipart(parts: &[Part<'_>]) -> Vec<u8> {
        let mut body = Vec::new();
        for part in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            match part {
                Part::Text(name, value) => {
                    body.extend_from_slice(
                        format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n")
                            .as_bytes(),
                    );
                }
                Part::File(name, filename, data) => {
                    body.extend_from_slice(
                        format!(
                            "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n\
                             Content-Type: application/octet-stream\r\n\r\n"
                        )
                        .as_bytes(),
                    );
                    body.extend_from_slice(data);
                    body.extend_from_slice(b"\r\n");
                }
            }
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn multipart_request(uri: &str, parts: &[Part<'_>]) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart(parts)))
            .unwrap()
    }

    fn form_request(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn json_request(method: Method, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut req = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        req.body(Body::from(body.to_string())).unwrap()
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut req = Request::builder().uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        req.body(Body::empty()).unwrap()
    }

    async fn send(app: &Router, req: Request<Body>) -> Response {
        app.clone().oneshot(req).await.unwrap()
    }

    async fn json_body(res: Response) -> Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn seller_parts<'a>(email: &'a str, with_id: bool) -> Vec<Part<'a>> {
        let mut parts = vec![
            Part::Text("fullname", "Sam Seller"),
            Part::Text("email", email),
            Part::Text("phone", "555"),
            Part::Text("address_location", "Market Row"),
            Part::Text("payment_details", "IBAN XX00"),
            Part::Text("password", "sellerpw"),
        ];
        if with_id {
            parts.push(Part::File("govt_id", "id.pdf", b"%PDF"));
        }
        parts
    }

    fn product_parts<'a>(price: &'a str) -> Vec<Part<'a>> {
        vec![
            Part::Text("seller_email", "s@x.com"),
            Part::Text("seller_name", "Sam's Crafts"),
            Part::Text("product_name", "Clay pot"),
            Part::Text("price", price),
            Part::Text("description", "Hand thrown"),
            Part::Text("category", "pots"),
            Part::File("product_image", "pot.png", b"\x89PNG"),
        ]
    }

    async fn app_with_admin() -> (Router, crate::state::AppState) {
        let state = test_state(Arc::new(MemoryStorage::default()));
        bootstrap_admin(
            &state,
            &AdminSeed {
                fullname: "Root".into(),
                email: "admin@x.com".into(),
                password: "adminpw".into(),
            },
        )
        .await
        .unwrap();
        (build_app(state.clone()), state)
    }

    async fn admin_token(app: &Router) -> String {
        let res = send(app, form_request("/api/login", "email=admin%40x.com&password=adminpw&role=admin")).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = json_body(res).await;
        assert_eq!(body["user"]["role"], "admin");
        body["admin_token"].as_str().expect("admin token").to_string()
    }

    #[tokio::test]
    async fn health() {
        let (app, _) = app_with_admin().await;
        let res = send(&app, get("/api/health", None)).await;
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn buyer_registration_and_login_flow() {
        let (app, _) = app_with_admin().await;
        let register = |pw: &str| {
            form_request(
                "/api/register/buyer",
                &format!("fullname=Ada&email=a%40x.com&phone=555&address=Main+St&password={pw}"),
            )
        };

        assert_eq!(send(&app, register("pw1")).await.status(), StatusCode::CREATED);
        let dup = send(&app, register("pw2")).await;
        assert_eq!(dup.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(dup).await["error"], "Email already registered");

        let bad = send(&app, form_request("/api/login", "email=a%40x.com&password=pw2")).await;
        assert_eq!(bad.status(), StatusCode::UNAUTHORIZED);

        let ok = send(&app, form_request("/api/login", "email=a%40x.com&password=pw1")).await;
        assert_eq!(ok.status(), StatusCode::OK);
        let body = json_body(ok).await;
        assert_eq!(body["user"]["role"], "buyer");
        assert!(body.get("admin_token").is_none());
        assert!(body["user"].get("password_hash").is_none());
    }

    #[tokio::test]
    async fn registration_ignores_client_supplied_role() {
        let (app, _) = app_with_admin().await;
        let res = send(
            &app,
            json_request(
                Method::POST,
                "/api/register/buyer",
                None,
                serde_json::json!({
                    "fullname": "Eve", "email": "eve@x.com", "phone": "1",
                    "address": "2", "password": "pw", "role": "admin"
                }),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::CREATED);

        let login = send(&app, form_request("/api/login", "email=eve%40x.com&password=pw")).await;
        let body = json_body(login).await;
        assert_eq!(body["user"]["role"], "buyer");
        assert!(body.get("admin_token").is_none());
    }

    #[tokio::test]
    async fn missing_fields_and_role_mismatch() {
        let (app, _) = app_with_admin().await;
        let res = send(&app, form_request("/api/register/buyer", "fullname=Ada&email=a%40x.com")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["error"], "Missing field: phone");

        let res = send(&app, form_request("/api/login", "email=admin%40x.com")).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = send(&app, form_request("/api/login", "email=admin%40x.com&password=adminpw&role=seller")).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(res).await["error"], "Please login as admin");

        let res = send(&app, form_request("/api/login", "email=admin%40x.com&password=adminpw&role=Admin")).await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
        assert_eq!(json_body(res).await["error"], "Please login as admin");

        let res = send(&app, form_request("/api/login", "email=ghost%40x.com&password=nope&role=root")).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(res).await["error"], "Invalid credentials");
    }

    #[tokio::test]
    async fn seller_without_govt_id_is_rejected() {
        let (app, state) = app_with_admin().await;
        let res = send(&app, multipart_request("/api/register/seller", &seller_parts("s@x.com", false))).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(res).await["error"], "Government ID is required");
        assert!(state.accounts.find_by_email("s@x.com").await.unwrap().is_none());

        let res = send(&app, multipart_request("/api/register/seller", &seller_parts("s@x.com", true))).await;
        assert_eq!(res.status(), StatusCode::CREATED);
    }

    #[tokio::test]
    async fn product_price_validation_and_moderation_flow() {
        let (app, _) = app_with_admin().await;
        let res = send(&app, multipart_request("/api/register/seller", &seller_parts("s@x.com", true))).await;
        assert_eq!(res.status(), StatusCode::CREATED);

        for bad in ["free", "-5"] {
            let res = send(&app, multipart_request("/api/products", &product_parts(bad))).await;
            assert_eq!(res.status(), StatusCode::BAD_REQUEST, "price {bad}");
            assert_eq!(json_body(res).await["error"], "Invalid price");
        }

        let res = send(&app, multipart_request("/api/products", &product_parts("19.99"))).await;
        assert_eq!(res.status(), StatusCode::CREATED);
        let created = json_body(res).await;
        assert_eq!(created["status"], "pending");
        let id = created["id"].as_i64().unwrap();

        // not public yet, but fetchable by id
        let listed = json_body(send(&app, get("/api/products", None)).await).await;
        assert_eq!(listed.as_array().unwrap().len(), 0);
        let single = send(&app, get(&format!("/api/products/{id}"), None)).await;
        assert_eq!(single.status(), StatusCode::OK);
        assert_eq!(json_body(single).await["status"], "pending");

        let res = send(&app, get("/api/products?status=pending", None)).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let token = admin_token(&app).await;
        let pending = json_body(send(&app, get("/api/products?status=pending", Some(&token))).await).await;
        assert_eq!(pending.as_array().unwrap().len(), 1);

        let uri = format!("/api/products/{id}/status");
        let res = send(
            &app,
            json_request(Method::PATCH, &uri, Some(&token), serde_json::json!({ "status": "approved" })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(json_body(res).await["status"], "approved");

        let listed = json_body(send(&app, get("/api/products", None)).await).await;
        let items = listed.as_array().unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0]["id"], id);
        assert!(items[0]["image_url"].as_str().unwrap().contains("uploads/products/"));

        let res = send(
            &app,
            json_request(Method::PATCH, &uri, Some("garbage"), serde_json::json!({ "status": "rejected" })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = send(
            &app,
            json_request(Method::PATCH, &uri, Some(&token), serde_json::json!({ "status": "sold" })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = send(
            &app,
            json_request(
                Method::PATCH,
                "/api/products/9999/status",
                Some(&token),
                serde_json::json!({ "status": "approved" }),
            ),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn expired_admin_token_is_rejected() {
        let (app, state) = app_with_admin().await;
        let stale = state
            .tokens
            .issue_at(1, OffsetDateTime::now_utc() - Duration::hours(9))
            .unwrap();
        let res = send(
            &app,
            json_request(Method::PATCH, "/api/products/1/status", Some(&stale), serde_json::json!({ "status": "approved" })),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

        let res = send(&app, get("/api/products?status=rejected", Some(&stale))).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn my_products_requires_known_seller() {
        let (app, _) = app_with_admin().await;
        let res = send(&app, get("/api/my-products", None)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);

        let res = send(&app, get("/api/my-products?seller_email=ghost%40x.com", None)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        send(&app, multipart_request("/api/register/seller", &seller_parts("s@x.com", true))).await;
        send(&app, multipart_request("/api/products", &product_parts("5"))).await;
        let res = send(&app, get("/api/my-products?seller_email=s%40x.com", None)).await;
        assert_eq!(res.status(), StatusCode::OK);
        let mine = json_body(res).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);
        assert_eq!(mine[0]["status"], "pending");
    }

    #[tokio::test]
    async fn oversized_uploads_are_refused() {
        let (app, _) = app_with_admin().await;
        let big = vec![b'x'; crate::uploads::MAX_UPLOAD_BYTES + 1];
        let mut parts = seller_parts("big@x.com", false);
        parts.push(Part::File("govt_id", "id.pdf", &big));
        let res = send(&app, multipart_request("/api/register/seller", &parts)).await;
        assert_eq!(res.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn extractor_failures_use_the_error_body() {
        let (app, _) = app_with_admin().await;

        let res = send(&app, get("/api/products/abc", None)).await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(res).await["error"], "Product not found");

        let res = send(
            &app,
            json_request(Method::POST, "/api/register/seller", None, serde_json::json!({"email": "s@x.com"})),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(res).await["error"].is_string());

        let res = send(&app, get("/api/products?status=approved&status=pending", None)).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(json_body(res).await["error"].is_string());
    }
}
