pub mod claims;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard, RwLock};

use crate::models::User;
use crate::region::{Region, RegionSelection};

pub use claims::CredentialClaims;

/// Per-login bundle of credential, organization and routing region
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionContext {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    /// Resolved once per session, then reused by every request
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<Region>,
    /// Login-time choice, consumed by the first region resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region_selection: Option<RegionSelection>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub established_at: Option<DateTime<Utc>>,
}

impl SessionContext {
    pub fn is_authenticated(&self) -> bool {
        self.credential.is_some()
    }

    pub fn claims(&self) -> Option<CredentialClaims> {
        let credential = self.credential.as_deref()?;
        match CredentialClaims::inspect(credential) {
            Ok(claims) => Some(claims),
            Err(e) => {
                tracing::debug!("Stored credential is not a readable JWT: {}", e);
                None
            }
        }
    }
}

/// Shared, injectable handle to the active session.
///
/// Cloning the handle shares the same session. Region resolution is
/// serialized through a separate gate so concurrent first requests perform a
/// single geolocation lookup.
#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<SessionContext>>,
    resolution: Arc<Mutex<()>>,
}

impl SessionHandle {
    pub fn new(context: SessionContext) -> Self {
        Self {
            inner: Arc::new(RwLock::new(context)),
            resolution: Arc::new(Mutex::new(())),
        }
    }

    pub async fn snapshot(&self) -> SessionContext {
        self.inner.read().await.clone()
    }

    pub async fn credential(&self) -> Option<String> {
        self.inner.read().await.credential.clone()
    }

    pub async fn organization(&self) -> Option<String> {
        self.inner.read().await.organization.clone()
    }

    pub async fn region(&self) -> Option<Region> {
        self.inner.read().await.region
    }

    pub async fn user(&self) -> Option<User> {
        self.inner.read().await.user.clone()
    }

    pub async fn cache_region(&self, region: Region) {
        self.inner.write().await.region = Some(region);
    }

    /// Drop the cached region so the next request resolves it again
    pub async fn forget_region(&self) {
        self.inner.write().await.region = None;
    }

    /// Take the pending login-time selection, leaving none behind
    pub async fn take_region_selection(&self) -> Option<RegionSelection> {
        self.inner.write().await.region_selection.take()
    }

    /// Replace whatever session was active with a fresh, unauthenticated one
    /// carrying the login-time region selection
    pub async fn begin_login(&self, selection: RegionSelection) {
        let mut ctx = self.inner.write().await;
        *ctx = SessionContext {
            region_selection: Some(selection),
            ..SessionContext::default()
        };
        tracing::debug!("Session reset for login (region selection: {})", selection);
    }

    /// Record a successful login
    pub async fn establish(&self, credential: String, user: Option<User>) {
        let mut ctx = self.inner.write().await;
        ctx.credential = Some(credential);
        ctx.organization = user.as_ref().and_then(|u| u.organization.clone());
        ctx.user = user;
        ctx.established_at = Some(Utc::now());
        tracing::info!(
            "Session established (organization: {}, region: {})",
            ctx.organization.as_deref().unwrap_or("-"),
            ctx.region.map(|r| r.as_str()).unwrap_or("unresolved"),
        );
    }

    pub async fn clear(&self) {
        *self.inner.write().await = SessionContext::default();
        tracing::info!("Session cleared");
    }

    pub(crate) async fn resolution_gate(&self) -> MutexGuard<'_, ()> {
        self.resolution.lock().await
    }
}
