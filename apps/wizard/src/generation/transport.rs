use async_trait::async_trait;

use crate::generation::channel::Channel;
use crate::models::profile::ProfileAggregate;
use crate::models::result::GenerationPayload;
use crate::service_client::{ServiceClient, ServiceError};
use crate::wizard::upload::UploadedFile;

/// Everything one outbound generation call carries.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub channel: Channel,
    pub session_id: Option<String>,
    pub resume: Option<UploadedFile>,
    /// Omitted when the wizard has nothing committed yet.
    pub profile: Option<ProfileAggregate>,
}

/// Sends a generation request and returns the raw 2xx body.
///
/// `ServiceClient` is the production implementation; the orchestrator only
/// sees this trait.
#[async_trait]
pub trait GenerationTransport: Send + Sync {
    async fn send(&self, request: &GenerationRequest) -> Result<GenerationPayload, ServiceError>;
}

#[async_trait]
impl GenerationTransport for ServiceClient {
    async fn send(&self, request: &GenerationRequest) -> Result<GenerationPayload, ServiceError> {
        self.generate(request).await
    }
}
