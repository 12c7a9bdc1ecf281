use tracing::info;

use crate::service_client::{ServiceClient, ServiceError};

/// The externally supplied list of template names.
#[derive(Debug, Clone, Default)]
pub struct TemplateCatalog {
    names: Vec<String>,
}

impl TemplateCatalog {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub async fn load(client: &ServiceClient) -> Result<Self, ServiceError> {
        let names = client.list_templates().await?;
        info!("Loaded {} templates", names.len());
        Ok(Self::new(names))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}
