#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::IntoResponse;
use axum::{Json, Router};
use serde_json::{json, Value};

use risk_console::client::ApiClient;
use risk_console::geolocation::{GeolocationError, GeolocationProvider};
use risk_console::pipeline::{EnrichmentPipeline, RegionResolver};
use risk_console::region::Coordinates;
use risk_console::session::SessionHandle;

pub const PASSWORD: &str = "correct horse";
pub const TOKEN: &str = "tok123";

/// Serve `app` on a free local port, returning its origin
pub async fn serve(app: Router) -> Result<String> {
    let port = portpicker::pick_unused_port().context("failed to pick free port")?;
    let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
        .await
        .context("failed to bind mock server")?;

    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });

    Ok(format!("http://127.0.0.1:{}", port))
}

/// One request as the mock backend saw it
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub headers: HeaderMap,
    pub body: Value,
}

impl Recorded {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

type Log = Arc<Mutex<Vec<Recorded>>>;

/// In-process stand-in for the risk management backend
pub struct MockBackend {
    pub base_url: String,
    log: Log,
}

impl MockBackend {
    pub async fn spawn() -> Result<Self> {
        let log: Log = Arc::default();
        let app = Router::new().fallback(respond).with_state(log.clone());
        let origin = serve(app).await?;

        Ok(Self {
            base_url: format!("{}/api", origin),
            log,
        })
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn last(&self) -> Recorded {
        self.requests().pop().expect("no request reached the backend")
    }

    /// Client with the standard pipeline and the given geolocation provider
    pub fn client(&self, provider: impl GeolocationProvider + 'static) -> ApiClient {
        self.client_with_session(provider, SessionHandle::default())
    }

    pub fn client_with_session(&self, provider: impl GeolocationProvider + 'static, session: SessionHandle) -> ApiClient {
        let resolver = RegionResolver::new(Arc::new(provider), Duration::from_millis(200));
        ApiClient::new(&self.base_url, session, EnrichmentPipeline::standard(resolver)).unwrap()
    }
}

async fn respond(State(log): State<Log>, method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> impl IntoResponse {
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    let path = uri.path().trim_start_matches("/api").to_string();

    log.lock().unwrap().push(Recorded {
        method: method.clone(),
        path: path.clone(),
        headers,
        body: body.clone(),
    });

    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    match (method, segments.as_slice()) {
        (Method::POST, ["users", "login"]) => {
            if body["password"] == PASSWORD {
                (
                    StatusCode::OK,
                    Json(json!({
                        "token": TOKEN,
                        "user": {
                            "_id": "u1",
                            "name": "Ada",
                            "email": body["email"],
                            "role": "root",
                            "organization": "acme"
                        }
                    })),
                )
            } else {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid credentials" })))
            }
        }
        (Method::GET, ["risks"]) => (StatusCode::OK, Json(json!([risk("r1", "R-1", "acme"), risk("r2", "R-2", "globex")]))),
        (Method::GET, ["risks", "missing"]) => (StatusCode::NOT_FOUND, Json(json!({ "error": "Risk not found" }))),
        (Method::GET, ["risks", id]) => (StatusCode::OK, Json(risk(id, "R-1", "acme"))),
        (Method::GET, ["users", "departments"]) => (
            StatusCode::OK,
            Json(json!([
                { "_id": "d1", "name": "Finance", "organization": "acme" },
                { "_id": "d2", "name": "Legal", "organization": "globex" }
            ])),
        ),
        (Method::GET, ["users", "organizations"]) => (
            StatusCode::OK,
            Json(json!([{ "_id": "acme", "name": "Acme" }, { "_id": "globex", "name": "Globex" }])),
        ),
        (Method::GET, ["users"]) => (
            StatusCode::OK,
            Json(json!([
                { "_id": "u1", "name": "Ada", "email": "ada@acme.test", "role": "root", "organization": "acme" },
                { "_id": "u2", "name": "Bo", "email": "bo@globex.test", "role": "risk_owner", "organization": "globex" }
            ])),
        ),
        // Backends that answer lists with an envelope
        (Method::GET, ["wrapped"]) => (StatusCode::OK, Json(json!({ "data": [] }))),
        (_, _) => (StatusCode::OK, Json(json!({ "ok": true, "received": body }))),
    }
}

fn risk(id: &str, risk_id: &str, org: &str) -> Value {
    json!({
        "_id": id,
        "riskId": risk_id,
        "riskDescription": "Payroll fraud",
        "department": "Finance",
        "organization": org,
        "riskType": "Operational",
        "riskLevel": "Low",
        "riskScore": 1,
        "asset": "ERP",
        "assetType": "Confidential",
        "confidentiality": 2,
        "integrity": 0,
        "availability": 1,
        "impact": 2,
        "likelihood": 3,
        "status": "Open",
        "deadlineDate": "2025-06-30T00:00:00.000Z"
    })
}

/// Geolocation that always reports the same position
pub struct At(pub f64, pub f64);

#[async_trait]
impl GeolocationProvider for At {
    fn name(&self) -> &'static str {
        "test-fixed"
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Ok(Coordinates::new(self.0, self.1))
    }
}

/// Geolocation whose user declines the permission prompt
pub struct Declined;

#[async_trait]
impl GeolocationProvider for Declined {
    fn name(&self) -> &'static str {
        "test-declined"
    }

    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Denied("declined in test".to_string()))
    }
}
