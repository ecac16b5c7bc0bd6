// Outbound request enrichment: every API call passes through these steps
// before it is transmitted.

pub mod region;
pub mod steps;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;

use crate::session::SessionHandle;

pub use region::RegionResolver;
pub use steps::{CredentialStep, OrganizationStep, RegionStep};

pub const ORG_HEADER: HeaderName = HeaderName::from_static("x-org");
pub const REGION_HEADER: HeaderName = HeaderName::from_static("x-region");

/// An API call before transmission. Enrichment only ever touches `headers`.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::POST, path).with_body(body)
    }

    pub fn put(path: impl Into<String>, body: Value) -> Self {
        Self::new(Method::PUT, path).with_body(body)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }
}

/// Enrichment stages, applied in ascending order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Stage {
    Credential = 0,
    Organization = 1,
    Region = 2,
}

/// One decoration applied to every outbound request.
///
/// Steps never fail: when their input is missing they leave the request
/// untouched.
#[async_trait]
pub trait EnrichmentStep: Send + Sync {
    fn name(&self) -> &'static str;

    fn stage(&self) -> Stage;

    async fn apply(&self, request: &mut RequestDescriptor, session: &SessionHandle);
}

pub type StepBox = Box<dyn EnrichmentStep>;

/// Ordered set of enrichment steps
pub struct EnrichmentPipeline {
    steps: Vec<StepBox>,
}

impl EnrichmentPipeline {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    /// Credential, organization and region steps
    pub fn standard(resolver: RegionResolver) -> Self {
        let mut pipeline = Self::new();
        pipeline.register_step(Box::new(CredentialStep));
        pipeline.register_step(Box::new(OrganizationStep));
        pipeline.register_step(Box::new(RegionStep::new(resolver)));
        pipeline
    }

    /// Add a step; steps of the same stage keep registration order
    pub fn register_step(&mut self, step: StepBox) {
        tracing::debug!("Registered enrichment step '{}' for stage {:?}", step.name(), step.stage());
        self.steps.push(step);
        self.steps.sort_by_key(|s| s.stage());
    }

    pub fn step_names(&self) -> Vec<&'static str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    /// Decorate a request. Resolves only after every step has been attempted.
    pub async fn enrich(&self, mut request: RequestDescriptor, session: &SessionHandle) -> RequestDescriptor {
        for step in &self.steps {
            step.apply(&mut request, session).await;
        }

        tracing::debug!(
            "Enriched {} {} with headers: {:?}",
            request.method,
            request.path,
            request.headers.keys().map(|k| k.as_str()).collect::<Vec<_>>()
        );

        request
    }
}

impl Default for EnrichmentPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Insert a header, skipping values that cannot be encoded
pub(crate) fn set_header(headers: &mut HeaderMap, name: HeaderName, value: &str, step: &str) {
    match HeaderValue::from_str(value) {
        Ok(v) => {
            headers.insert(name, v);
        }
        Err(_) => {
            tracing::warn!("Step '{}' skipped header '{}': value is not a valid header", step, name);
        }
    }
}
