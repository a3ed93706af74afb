use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{self, auth, customers, orders, products},
    middleware::{api_key_audit, process_time},
    AppState,
};

fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/customers", get(customers::list).post(customers::create))
        .route(
            "/customers/:id",
            get(customers::get)
                .put(customers::update)
                .delete(customers::delete),
        )
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/:id",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/products/:id/stock", patch(products::adjust_stock))
        .route("/orders", get(orders::list).post(orders::create))
        .route(
            "/orders/:id",
            get(orders::get).put(orders::update).delete(orders::delete),
        )
        .route(
            "/orders/customer/:customer_id",
            get(orders::list_for_customer),
        )
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/token", post(auth::login))
        .route("/login", post(auth::login))
        .route("/users/me", get(auth::me))
        .route("/users/me/items", get(auth::my_items))
        .route("/admin", get(auth::admin))
        .route("/public/data", get(auth::public_data))
        .route("/protected/data", get(auth::protected_data))
        .nest("/api", api_routes())
        .layer(axum::middleware::from_fn(api_key_audit))
        .layer(axum::middleware::from_fn(process_time))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{header, Method, Request, StatusCode},
    };
    use jsonwebtoken::Algorithm;
    use secrecy::SecretString;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        auth::TokenService,
        db,
        models::user::NewUser,
    };

    async fn app() -> Router {
        let pool = db::memory_pool().await;
        let mut ghost = NewUser::new("ghost", "Ghost User", "ghost@example.com", "boo");
        ghost.disabled = true;
        let seed = [
            NewUser::new("john", "John Doe", "john@example.com", "secret"),
            ghost,
        ];
        db::seed_users(&pool, &seed).await.unwrap();

        let tokens = TokenService::new(
            &SecretString::from("router-test-secret".to_string()),
            Algorithm::HS256,
            chrono::Duration::minutes(30),
        );
        router(AppState { db: pool, tokens })
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get_request(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri("/token")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!(
                "username={username}&password={password}&grant_type=password"
            )))
            .unwrap();
        send(app, request).await
    }

    async fn token_for(app: &Router, username: &str, password: &str) -> String {
        let (status, body) = login(app, username, password).await;
        assert_eq!(status, StatusCode::OK);
        body["access_token"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn login_then_read_profile() {
        let app = app().await;
        let (status, body) = login(&app, "john", "secret").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token_type"], "bearer");

        let token = body["access_token"].as_str().unwrap();
        let (status, me) = send(&app, get_request("/users/me", Some(token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["username"], "john");
        assert_eq!(me["email"], "john@example.com");
        assert_eq!(me["disabled"], false);
        assert!(me.get("hashed_password").is_none());
    }

    #[tokio::test]
    async fn missing_token_is_not_authenticated() {
        let app = app().await;
        let response = app
            .clone()
            .oneshot(get_request("/users/me", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.headers()[header::WWW_AUTHENTICATE], "Bearer");

        let (_, body) = send(&app, get_request("/users/me", None)).await;
        assert_eq!(body, json!({"detail": "Not authenticated"}));
    }

    #[tokio::test]
    async fn garbage_token_is_rejected() {
        let app = app().await;
        let (status, body) = send(&app, get_request("/users/me", Some("not.a.jwt"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"detail": "Could not validate credentials"}));
    }

    #[tokio::test]
    async fn bad_password_and_unknown_user_look_the_same() {
        let app = app().await;
        let (wrong_status, wrong_body) = login(&app, "john", "nope").await;
        let (unknown_status, unknown_body) = login(&app, "nobody", "secret").await;

        assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
        assert_eq!(wrong_status, unknown_status);
        assert_eq!(wrong_body, unknown_body);
        assert_eq!(wrong_body["detail"], "Incorrect username or password");
    }

    #[tokio::test]
    async fn login_without_password_is_unprocessable() {
        let app = app().await;
        let request = Request::builder()
            .method(Method::POST)
            .uri("/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=john"))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["detail"].is_array());
    }

    #[tokio::test]
    async fn disabled_user_token_opens_nothing() {
        let app = app().await;
        let token = token_for(&app, "ghost", "boo").await;

        for uri in ["/users/me", "/users/me/items", "/protected/data", "/admin"] {
            let (status, body) = send(&app, get_request(uri, Some(&token))).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
            assert_eq!(body, json!({"detail": "Inactive user"}), "{uri}");
        }

        let john = token_for(&app, "john", "secret").await;
        let (status, body) = send(&app, get_request("/admin", Some(&john))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"], "john");
    }

    #[tokio::test]
    async fn public_and_protected_data() {
        let app = app().await;
        let (status, _) = send(&app, get_request("/public/data", None)).await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(&app, get_request("/protected/data", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let token = token_for(&app, "john", "secret").await;
        let (status, body) = send(&app, get_request("/protected/data", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accessed_by"], "john");
    }

    #[tokio::test]
    async fn health_reports_process_time() {
        let app = app().await;
        let response = app
            .clone()
            .oneshot(get_request("/health", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let elapsed: f64 = response.headers()["x-process-time"]
            .to_str()
            .unwrap()
            .parse()
            .unwrap();
        assert!(elapsed >= 0.0);
    }

    #[tokio::test]
    async fn customer_lifecycle() {
        let app = app().await;
        let (status, created) = send(
            &app,
            json_request(
                Method::POST,
                "/api/customers",
                json!({"name": "Ada", "email": "ada@example.com"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/customers",
                json!({"name": "Other Ada", "email": "ada@example.com"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["detail"], "Email already registered");

        let (status, updated) = send(
            &app,
            json_request(
                Method::PUT,
                &format!("/api/customers/{id}"),
                json!({"phone": "555-0100"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["phone"], "555-0100");
        assert_eq!(updated["name"], "Ada");

        let (status, body) = send(
            &app,
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/api/customers/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body["message"],
            format!("Customer with id {id} deleted successfully")
        );

        let (status, body) = send(&app, get_request(&format!("/api/customers/{id}"), None)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["detail"], format!("Customer with id {id} not found"));
    }

    #[tokio::test]
    async fn invalid_bodies_report_field_locations() {
        let app = app().await;
        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/products",
                json!({"name": "Widget", "price": -1.0}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["detail"][0]["loc"], json!(["body", "price"]));

        let (status, _) = send(&app, get_request("/api/products/abc", None)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

        let (status, _) = send(&app, get_request("/api/products?limit=0", None)).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn stock_never_goes_negative() {
        let app = app().await;
        let (_, product) = send(
            &app,
            json_request(
                Method::POST,
                "/api/products",
                json!({"name": "Widget", "price": 2.5, "stock": 3}),
            ),
        )
        .await;
        let id = product["id"].as_i64().unwrap();
        let uri = format!("/api/products/{id}/stock");

        let (status, body) =
            send(&app, json_request(Method::PATCH, &uri, json!({"quantity_change": -4}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Insufficient stock for product Widget");

        let (status, body) =
            send(&app, json_request(Method::PATCH, &uri, json!({"quantity_change": 7}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stock"], 10);
    }

    #[tokio::test]
    async fn stock_overflow_is_refused_and_product_stays_readable() {
        let app = app().await;
        let (_, product) = send(
            &app,
            json_request(
                Method::POST,
                "/api/products",
                json!({"name": "Widget", "price": 2.5, "stock": 3}),
            ),
        )
        .await;
        let id = product["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            json_request(
                Method::PATCH,
                &format!("/api/products/{id}/stock"),
                json!({"quantity_change": i64::MAX}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Stock level out of range for product Widget");

        let (status, body) = send(&app, get_request(&format!("/api/products/{id}"), None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["stock"], 3);

        let (status, body) = send(&app, get_request("/api/products", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn order_flow() {
        let app = app().await;
        let (_, customer) = send(
            &app,
            json_request(
                Method::POST,
                "/api/customers",
                json!({"name": "Grace", "email": "grace@example.com"}),
            ),
        )
        .await;
        let customer_id = customer["id"].as_i64().unwrap();
        let (_, product) = send(
            &app,
            json_request(
                Method::POST,
                "/api/products",
                json!({"name": "Lamp", "price": 10.0, "stock": 5}),
            ),
        )
        .await;
        let product_id = product["id"].as_i64().unwrap();

        let (status, order) = send(
            &app,
            json_request(
                Method::POST,
                "/api/orders",
                json!({"customer_id": customer_id, "items": [{"product_id": product_id, "quantity": 2}]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(order["total_amount"], 20.0);
        assert_eq!(order["status"], "pending");
        assert_eq!(order["items"][0]["price_at_time"], 10.0);
        let order_id = order["id"].as_i64().unwrap();

        let (status, body) = send(
            &app,
            json_request(
                Method::POST,
                "/api/orders",
                json!({"customer_id": customer_id, "items": [{"product_id": product_id, "quantity": 10}]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "Insufficient stock for product Lamp");

        let (_, product) =
            send(&app, get_request(&format!("/api/products/{product_id}"), None)).await;
        assert_eq!(product["stock"], 3);

        let order_uri = format!("/api/orders/{order_id}");
        let (status, body) = send(&app, json_request(Method::PUT, &order_uri, json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["detail"], "No update data provided");

        let (status, body) = send(
            &app,
            json_request(Method::PUT, &order_uri, json!({"status": "completed"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "completed");

        let (_, mine) = send(
            &app,
            get_request(&format!("/api/orders/customer/{customer_id}"), None),
        )
        .await;
        assert_eq!(mine.as_array().unwrap().len(), 1);

        let (status, _) = send(
            &app,
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/api/customers/{customer_id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, orders) = send(&app, get_request("/api/orders", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(orders, json!([]));
    }
}
