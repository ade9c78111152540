use chrono::{Duration as ChronoDuration, Utc};
use partsdesk_auth::{JwtClaims, Role};
use partsdesk_core::UserId;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::StatusCode;
use serde_json::json;

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Same router as prod, bound to an ephemeral port.
        let app = partsdesk_api::app::build_app(jwt_secret.to_string());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, roles: Vec<Role>) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub: UserId::new(),
        roles,
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

struct Fixture {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl Fixture {
    /// Seed a product with stock and a dealer; returns (product_id, dealer_id).
    async fn seed(&self, sku: &str, price: &str, stock: i64) -> (i64, i64) {
        let res = self
            .client
            .post(format!("{}/products", self.base_url))
            .bearer_auth(&self.token)
            .json(&json!({ "name": "Brake Pad", "sku": sku, "price": price }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let product: serde_json::Value = res.json().await.unwrap();
        let product_id = product["id"].as_i64().unwrap();

        let res = self
            .client
            .put(format!("{}/inventory/{}/adjust", self.base_url, product_id))
            .bearer_auth(&self.token)
            .json(&json!({ "change": stock, "note": "initial stock" }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["detail"], "Inventory adjusted");

        let res = self
            .client
            .post(format!("{}/dealers", self.base_url))
            .bearer_auth(&self.token)
            .json(&json!({ "name": "ABC Motors", "code": format!("ABC-{sku}") }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let dealer: serde_json::Value = res.json().await.unwrap();
        (product_id, dealer["id"].as_i64().unwrap())
    }

    async fn create_order(&self, dealer_id: i64, product_id: i64, quantity: u32) -> i64 {
        let res = self
            .client
            .post(format!("{}/orders", self.base_url))
            .bearer_auth(&self.token)
            .json(&json!({
                "dealer": dealer_id,
                "items": [{ "product": product_id, "quantity": quantity }],
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);
        let order: serde_json::Value = res.json().await.unwrap();
        assert_eq!(order["status"], "DRAFT");
        assert!(order["order_number"].as_str().unwrap().starts_with("ORD-"));
        order["id"].as_i64().unwrap()
    }

    async fn stock_of(&self, product_id: i64) -> i64 {
        let res = self
            .client
            .get(format!("{}/inventory", self.base_url))
            .bearer_auth(&self.token)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let levels: serde_json::Value = res.json().await.unwrap();
        levels
            .as_array()
            .unwrap()
            .iter()
            .find(|l| l["product_id"].as_i64() == Some(product_id))
            .map(|l| l["quantity"].as_i64().unwrap())
            .expect("product has no inventory record")
    }
}

async fn admin_fixture(srv: &TestServer, jwt_secret: &str) -> Fixture {
    Fixture {
        client: reqwest::Client::new(),
        base_url: srv.base_url.clone(),
        token: mint_jwt(jwt_secret, vec![Role::admin()]),
    }
}

#[tokio::test]
async fn health_is_public_but_everything_else_needs_a_token() {
    let srv = TestServer::spawn("test-secret").await;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = client
        .get(format!("{}/orders", srv.base_url))
        .bearer_auth("not-a-jwt")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn whoami_reflects_token_roles() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let token = mint_jwt(jwt_secret, vec![Role::admin(), Role::new("dealer")]);

    let client = reqwest::Client::new();
    let res = client
        .get(format!("{}/whoami", srv.base_url))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["roles"].as_array().unwrap().iter().any(|r| r == "admin"));
    assert!(body["user_id"].as_str().is_some());
}

#[tokio::test]
async fn order_lifecycle_deducts_stock_on_confirm_only() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let fx = admin_fixture(&srv, jwt_secret).await;

    let (product_id, dealer_id) = fx.seed("BP-001", "500.00", 100).await;
    let order_id = fx.create_order(dealer_id, product_id, 10).await;

    // Total is snapshotted price times quantity.
    let res = fx
        .client
        .get(format!("{}/orders/{}", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    let order: serde_json::Value = res.json().await.unwrap();
    assert_eq!(order["total_amount"], "5000.00");
    assert_eq!(fx.stock_of(product_id).await, 100);

    let res = fx
        .client
        .post(format!("{}/orders/{}/confirm", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Order confirmed");
    assert_eq!(fx.stock_of(product_id).await, 90);

    // Second confirm is an illegal transition.
    let res = fx
        .client
        .post(format!("{}/orders/{}/confirm", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Only Draft orders can be confirmed");

    // Delivery changes status, never stock.
    let res = fx
        .client
        .post(format!("{}/orders/{}/deliver", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Order marked as delivered");
    assert_eq!(fx.stock_of(product_id).await, 90);
}

#[tokio::test]
async fn insufficient_stock_returns_shortfall_items() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let fx = admin_fixture(&srv, jwt_secret).await;

    let (product_id, dealer_id) = fx.seed("BP-002", "500.00", 5).await;
    let order_id = fx.create_order(dealer_id, product_id, 10).await;

    let res = fx
        .client
        .post(format!("{}/orders/{}/confirm", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["detail"],
        "Insufficient stock for Brake Pad. Available: 5, Requested: 10"
    );
    let items = body["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["product"], "BP-002");
    assert_eq!(items[0]["available"], 5);
    assert_eq!(items[0]["requested"], 10);

    // Nothing moved, nothing transitioned.
    assert_eq!(fx.stock_of(product_id).await, 5);
    let res = fx
        .client
        .get(format!("{}/orders/{}", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    let order: serde_json::Value = res.json().await.unwrap();
    assert_eq!(order["status"], "DRAFT");
}

#[tokio::test]
async fn deleting_a_confirmed_order_restores_stock() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let fx = admin_fixture(&srv, jwt_secret).await;

    let (product_id, dealer_id) = fx.seed("BP-003", "500.00", 100).await;
    let order_id = fx.create_order(dealer_id, product_id, 10).await;

    let res = fx
        .client
        .post(format!("{}/orders/{}/confirm", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(fx.stock_of(product_id).await, 90);

    let res = fx
        .client
        .delete(format!("{}/orders/{}", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert_eq!(fx.stock_of(product_id).await, 100);

    let res = fx
        .client
        .get(format!("{}/orders/{}", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn updates_cannot_change_status_and_only_drafts_are_editable() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let fx = admin_fixture(&srv, jwt_secret).await;

    let (product_id, dealer_id) = fx.seed("BP-004", "500.00", 100).await;
    let order_id = fx.create_order(dealer_id, product_id, 10).await;

    let res = fx
        .client
        .put(format!("{}/orders/{}", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .json(&json!({ "status": "CONFIRMED" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["detail"],
        "Order status cannot be changed via update; use confirm or deliver endpoints"
    );

    // An explicit null is still a status field in the payload.
    let res = fx
        .client
        .put(format!("{}/orders/{}", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .json(&json!({ "status": null }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(
        body["detail"],
        "Order status cannot be changed via update; use confirm or deliver endpoints"
    );

    // A legitimate item edit while still Draft.
    let res = fx
        .client
        .put(format!("{}/orders/{}", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .json(&json!({ "items": [{ "product": product_id, "quantity": 2 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let order: serde_json::Value = res.json().await.unwrap();
    assert_eq!(order["total_amount"], "1000.00");

    fx.client
        .post(format!("{}/orders/{}/confirm", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();

    let res = fx
        .client
        .put(format!("{}/orders/{}", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .json(&json!({ "items": [{ "product": product_id, "quantity": 1 }] }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Only Draft orders can be edited");
}

#[tokio::test]
async fn cancel_is_draft_only() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let fx = admin_fixture(&srv, jwt_secret).await;

    let (product_id, dealer_id) = fx.seed("BP-005", "500.00", 100).await;
    let order_id = fx.create_order(dealer_id, product_id, 10).await;

    let res = fx
        .client
        .post(format!("{}/orders/{}/cancel", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Order cancelled");
    assert_eq!(fx.stock_of(product_id).await, 100);

    let res = fx
        .client
        .post(format!("{}/orders/{}/cancel", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Only Draft orders can be cancelled");
}

#[tokio::test]
async fn inventory_endpoints_require_admin() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let admin = admin_fixture(&srv, jwt_secret).await;
    let (product_id, _) = admin.seed("BP-006", "500.00", 100).await;

    let token = mint_jwt(jwt_secret, vec![Role::new("dealer")]);
    let client = reqwest::Client::new();

    for (method, url) in [
        (reqwest::Method::GET, format!("{}/inventory", srv.base_url)),
        (
            reqwest::Method::GET,
            format!("{}/inventory/adjustments", srv.base_url),
        ),
        (
            reqwest::Method::PUT,
            format!("{}/inventory/{}/adjust", srv.base_url, product_id),
        ),
    ] {
        let res = client
            .request(method, url)
            .bearer_auth(&token)
            .json(&json!({ "change": 1 }))
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}

#[tokio::test]
async fn manual_adjustments_are_audited() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let fx = admin_fixture(&srv, jwt_secret).await;

    let (product_id, _) = fx.seed("BP-007", "500.00", 100).await;

    let res = fx
        .client
        .put(format!("{}/inventory/{}/adjust", fx.base_url, product_id))
        .bearer_auth(&fx.token)
        .json(&json!({ "change": -3, "note": "damaged in warehouse" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(fx.stock_of(product_id).await, 97);

    let res = fx
        .client
        .get(format!("{}/inventory/adjustments", fx.base_url))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let records: serde_json::Value = res.json().await.unwrap();
    let records = records.as_array().unwrap();
    // Seed adjustment plus the manual one.
    assert_eq!(records.len(), 2);
    assert_eq!(records[1]["change"], -3);
    assert_eq!(records[1]["note"], "damaged in warehouse");
    assert!(records[1]["changed_by"].as_str().is_some());
}

#[tokio::test]
async fn product_deletion_clears_references_but_keeps_snapshots() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let fx = admin_fixture(&srv, jwt_secret).await;

    let (product_id, dealer_id) = fx.seed("BP-008", "500.00", 100).await;
    let order_id = fx.create_order(dealer_id, product_id, 10).await;

    let res = fx
        .client
        .delete(format!("{}/products/{}", fx.base_url, product_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let res = fx
        .client
        .get(format!("{}/orders/{}", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    let order: serde_json::Value = res.json().await.unwrap();
    assert!(order["items"][0]["product"].is_null());
    assert_eq!(order["items"][0]["product_sku"], "BP-008");

    let res = fx
        .client
        .post(format!("{}/orders/{}/confirm", fx.base_url, order_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["detail"], "Product no longer exists");
}

#[tokio::test]
async fn dealer_detail_embeds_order_summaries() {
    let jwt_secret = "test-secret";
    let srv = TestServer::spawn(jwt_secret).await;
    let fx = admin_fixture(&srv, jwt_secret).await;

    let (product_id, dealer_id) = fx.seed("BP-009", "500.00", 100).await;
    fx.create_order(dealer_id, product_id, 2).await;
    fx.create_order(dealer_id, product_id, 3).await;

    let res = fx
        .client
        .get(format!("{}/dealers/{}", fx.base_url, dealer_id))
        .bearer_auth(&fx.token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["code"], "ABC-BP-009");
    let orders = body["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 2);
    assert!(orders.iter().all(|o| o["status"] == "DRAFT"));
    assert!(orders
        .iter()
        .all(|o| o["order_number"].as_str().unwrap().starts_with("ORD-")));
}
