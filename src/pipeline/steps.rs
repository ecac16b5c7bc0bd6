use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;

use super::{set_header, EnrichmentStep, RegionResolver, RequestDescriptor, Stage, ORG_HEADER, REGION_HEADER};
use crate::session::SessionHandle;

/// `Authorization: Bearer <credential>` when the session holds a credential
pub struct CredentialStep;

#[async_trait]
impl EnrichmentStep for CredentialStep {
    fn name(&self) -> &'static str {
        "credential"
    }

    fn stage(&self) -> Stage {
        Stage::Credential
    }

    async fn apply(&self, request: &mut RequestDescriptor, session: &SessionHandle) {
        if let Some(credential) = session.credential().await {
            set_header(
                &mut request.headers,
                AUTHORIZATION,
                &format!("Bearer {}", credential),
                self.name(),
            );
        }
    }
}

/// `x-org: <organization>` when the session belongs to an organization
pub struct OrganizationStep;

#[async_trait]
impl EnrichmentStep for OrganizationStep {
    fn name(&self) -> &'static str {
        "organization"
    }

    fn stage(&self) -> Stage {
        Stage::Organization
    }

    async fn apply(&self, request: &mut RequestDescriptor, session: &SessionHandle) {
        if let Some(organization) = session.organization().await {
            set_header(&mut request.headers, ORG_HEADER, &organization, self.name());
        }
    }
}

/// `x-region: US|EU|INDIA`, always set once resolution completes
pub struct RegionStep {
    resolver: RegionResolver,
}

impl RegionStep {
    pub fn new(resolver: RegionResolver) -> Self {
        Self { resolver }
    }
}

#[async_trait]
impl EnrichmentStep for RegionStep {
    fn name(&self) -> &'static str {
        "region"
    }

    fn stage(&self) -> Stage {
        Stage::Region
    }

    async fn apply(&self, request: &mut RequestDescriptor, session: &SessionHandle) {
        let region = self.resolver.resolve(session).await;
        set_header(&mut request.headers, REGION_HEADER, region.as_str(), self.name());
    }
}
