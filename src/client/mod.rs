pub mod resources;

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use crate::config::AppConfig;
use crate::error::{ApiError, ClientResult};
use crate::pipeline::{EnrichmentPipeline, RegionResolver, RequestDescriptor};
use crate::session::SessionHandle;

pub use resources::LoginOutcome;

/// HTTP client for the risk management backend.
///
/// Every call is described as a [`RequestDescriptor`], decorated by the
/// enrichment pipeline against the shared session, then transmitted.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: SessionHandle,
    pipeline: Arc<EnrichmentPipeline>,
}

impl ApiClient {
    pub fn new(base_url: &str, session: SessionHandle, pipeline: EnrichmentPipeline) -> ClientResult<Self> {
        Ok(Self {
            http: reqwest::Client::new(),
            base_url: Url::parse(base_url)?,
            session,
            pipeline: Arc::new(pipeline),
        })
    }

    /// Client with the standard pipeline and the configured HTTP settings
    pub fn from_config(config: &AppConfig, session: SessionHandle) -> ClientResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.api.request_timeout())
            .user_agent(config.api.user_agent.clone())
            .build()?;

        let pipeline = EnrichmentPipeline::standard(RegionResolver::from_config(&config.geolocation));

        Ok(Self::new(&config.api.base_url, session, pipeline)?.with_http_client(http))
    }

    pub fn with_http_client(mut self, http: reqwest::Client) -> Self {
        self.http = http;
        self
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an API path against the base URL, keeping any base path prefix
    pub fn url_for(&self, path: &str) -> ClientResult<Url> {
        let joined = format!(
            "{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        Ok(Url::parse(&joined)?)
    }

    /// Enrich, send and decode a call. Non-success statuses become `ApiError`.
    pub async fn execute(&self, request: RequestDescriptor) -> ClientResult<Value> {
        let request = self.pipeline.enrich(request, &self.session).await;
        let url = self.url_for(&request.path)?;

        tracing::debug!("{} {}", request.method, url);

        let mut builder = self
            .http
            .request(request.method.clone(), url)
            .headers(request.headers);
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        let body = parse_body(&text);

        if status.is_success() {
            Ok(body)
        } else {
            let error = ApiError::from_response(status, &body);
            tracing::warn!("{} {} failed: {}", request.method, request.path, error);
            Err(error.into())
        }
    }

    /// Execute and deserialize the response body
    pub async fn call<T: DeserializeOwned>(&self, request: RequestDescriptor) -> ClientResult<T> {
        let body = self.execute(request).await?;
        Ok(serde_json::from_value(body)?)
    }

    /// Execute and deserialize a list. A body that is not an array yields an
    /// empty list.
    pub async fn call_list<T: DeserializeOwned>(&self, request: RequestDescriptor) -> ClientResult<Vec<T>> {
        match self.execute(request).await? {
            Value::Array(items) => Ok(serde_json::from_value(Value::Array(items))?),
            other => {
                tracing::debug!("Expected a list, got {}", kind_of(&other));
                Ok(Vec::new())
            }
        }
    }
}

fn parse_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
