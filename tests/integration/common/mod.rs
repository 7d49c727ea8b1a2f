use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tempfile::TempDir;

use quoteforge::ai::SuggestionEngine;
use quoteforge::config::{
    AiConfig, AppConfig, AuthConfig, BudgetConfig, CorsConfig, DatabaseConfig, ServerConfig,
};
use quoteforge::error::AppError;
use quoteforge::state::AppState;

pub mod routes {
    pub const REGISTER: &str = "/api/users/register";
    pub const LOGIN: &str = "/api/users/login";
    pub const PROFILE: &str = "/api/users/profile";

    pub const PRODUCT_SERVICES: &str = "/api/productservices";

    pub fn product_service(id: &str) -> String {
        format!("/api/productservices/{id}")
    }

    pub const INPUTS: &str = "/api/inputs";

    pub fn inputs_of(product_service_id: &str) -> String {
        format!("/api/inputs/{product_service_id}")
    }

    pub fn input(id: &str) -> String {
        format!("/api/inputs/single/{id}")
    }

    pub const BUDGETS: &str = "/api/budgets";

    pub fn budget(id: &str) -> String {
        format!("/api/budgets/{id}")
    }

    pub fn budget_pdf(id: &str) -> String {
        format!("/api/budgets/{id}/pdf")
    }

    pub const BUDGET_ITEMS: &str = "/api/budgetitems";

    pub fn budget_items_of(budget_id: &str) -> String {
        format!("/api/budgetitems/{budget_id}")
    }

    pub fn budget_item(id: &str) -> String {
        format!("/api/budgetitems/single/{id}")
    }

    pub const AI_GENERATE: &str = "/api/ai/generate-budget-items";
}

/// Canned suggestion engine for tests. Returns its reply verbatim, so tests
/// control exactly what the parsing layer sees.
pub struct StubEngine {
    pub reply: String,
}

#[async_trait]
impl SuggestionEngine for StubEngine {
    async fn complete(&self, _prompt: &str) -> Result<String, AppError> {
        Ok(self.reply.clone())
    }
}

/// A running test server backed by a throwaway SQLite database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub client: Client,
    _db_dir: TempDir,
}

/// Parsed HTTP response for test assertions.
pub struct TestResponse {
    pub status: u16,
    /// Raw response body as text.
    pub text: String,
    /// Parsed JSON body, or `Null` if the response is not valid JSON.
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        let reply = serde_json::json!([{
            "name": "Stub item",
            "quantity": 1,
            "unit_price": 100.0,
            "total_item_price": 100.0
        }])
        .to_string();
        Self::spawn_with_engine(Arc::new(StubEngine { reply })).await
    }

    pub async fn spawn_with_engine(engine: Arc<dyn SuggestionEngine>) -> Self {
        let db_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = db_dir.path().join("test.db");
        let db_url = format!("sqlite://{}?mode=rwc", db_path.display());

        let database = DatabaseConfig {
            url: db_url,
            max_connections: 5,
            min_connections: 1,
            acquire_timeout_secs: 8,
        };

        let db = quoteforge::database::init_db(&database)
            .await
            .expect("Failed to initialize test database");

        let config = AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors: CorsConfig {
                    allow_origins: vec![],
                    max_age: 3600,
                },
            },
            database,
            auth: AuthConfig {
                jwt_secret: "test-secret-for-integration-tests".to_string(),
                token_expiry_days: 1,
            },
            ai: AiConfig {
                api_key: String::new(),
                model: "test-model".to_string(),
                endpoint: "http://127.0.0.1:1".to_string(),
            },
            budget: BudgetConfig {
                recompute_item_totals: false,
            },
        };

        let state = AppState {
            db,
            config: Arc::new(config),
            suggestions: engine,
        };

        let app = quoteforge::build_router(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            addr,
            client: Client::new(),
            _db_dir: db_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn post_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn post_without_token(&self, path: &str, body: &Value) -> TestResponse {
        let res = self
            .client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to send POST request");

        TestResponse::from_response(res).await
    }

    pub async fn get_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn get_without_token(&self, path: &str) -> TestResponse {
        let res = self
            .client
            .get(self.url(path))
            .send()
            .await
            .expect("Failed to send GET request");

        TestResponse::from_response(res).await
    }

    pub async fn put_with_token(&self, path: &str, body: &Value, token: &str) -> TestResponse {
        let res = self
            .client
            .put(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .json(body)
            .send()
            .await
            .expect("Failed to send PUT request");

        TestResponse::from_response(res).await
    }

    pub async fn delete_with_token(&self, path: &str, token: &str) -> TestResponse {
        let res = self
            .client
            .delete(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send DELETE request");

        TestResponse::from_response(res).await
    }

    /// GET returning the raw bytes, for binary endpoints.
    pub async fn get_bytes_with_token(
        &self,
        path: &str,
        token: &str,
    ) -> (u16, reqwest::header::HeaderMap, Vec<u8>) {
        let res = self
            .client
            .get(self.url(path))
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .expect("Failed to send GET request");

        let status = res.status().as_u16();
        let headers = res.headers().clone();
        let bytes = res.bytes().await.expect("Failed to read body").to_vec();
        (status, headers, bytes)
    }

    /// Register a user and return the auth token from the response.
    pub async fn create_authenticated_user(&self, email: &str) -> String {
        let res = self
            .post_without_token(
                routes::REGISTER,
                &serde_json::json!({
                    "name": "Test User",
                    "email": email,
                    "password": "securepass",
                }),
            )
            .await;
        assert_eq!(res.status, 201, "Registration failed: {}", res.text);

        res.body["token"]
            .as_str()
            .expect("Registration response should contain a token")
            .to_string()
    }

    /// Create a budget via the API and return its `id`.
    pub async fn create_budget(&self, token: &str, client_name: &str) -> String {
        let res = self
            .post_with_token(
                routes::BUDGETS,
                &serde_json::json!({ "client_name": client_name }),
                token,
            )
            .await;
        assert_eq!(res.status, 201, "create_budget failed: {}", res.text);
        res.id()
    }

    /// Create a catalog entry via the API and return its `id`.
    pub async fn create_product_service(&self, token: &str, name: &str) -> String {
        let res = self
            .post_with_token(
                routes::PRODUCT_SERVICES,
                &serde_json::json!({
                    "name": name,
                    "kind": "service",
                    "base_price": 150.00,
                }),
                token,
            )
            .await;
        assert_eq!(res.status, 201, "create_product_service failed: {}", res.text);
        res.id()
    }

    /// Create a budget item via the API and return its `id`.
    pub async fn create_budget_item(
        &self,
        token: &str,
        budget_id: &str,
        name: &str,
        quantity: f64,
        unit_price: f64,
    ) -> String {
        let res = self
            .post_with_token(
                routes::BUDGET_ITEMS,
                &serde_json::json!({
                    "budget_id": budget_id,
                    "name": name,
                    "quantity": quantity,
                    "unit_price": unit_price,
                    "total_item_price": quantity * unit_price,
                }),
                token,
            )
            .await;
        assert_eq!(res.status, 201, "create_budget_item failed: {}", res.text);
        res.body["budget_item"]["id"]
            .as_str()
            .expect("budget item response should contain 'id'")
            .to_string()
    }
}

impl TestResponse {
    pub async fn from_response(res: reqwest::Response) -> Self {
        let status = res.status().as_u16();
        let text = res.text().await.unwrap_or_default();
        let body = serde_json::from_str(&text).unwrap_or(Value::Null);
        Self { status, text, body }
    }

    pub fn id(&self) -> String {
        self.body["id"]
            .as_str()
            .expect("response body should contain 'id'")
            .to_string()
    }
}
