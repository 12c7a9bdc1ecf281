//! Service client: the single point of entry for all HTTP calls to the
//! resume generation backend.
//!
//! No other module talks to the backend directly. Calls are made exactly once
//! (no retry) and without a timeout.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use crate::generation::transport::GenerationRequest;
use crate::models::result::{GenerationPayload, HistoryEntry};
use crate::wizard::upload::UploadedFile;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx with a JSON error body; `message` is whatever the body carried.
    #[error("API error (status {status}): {}", message.as_deref().unwrap_or("no details"))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// Non-2xx whose body is not JSON.
    #[error("HTTP status {status}")]
    Status { status: u16 },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid artifact identifier: {0}")]
    InvalidIdentifier(String),
}

#[derive(Debug, Default, Deserialize)]
struct TemplatesResponse {
    #[serde(default)]
    templates: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
struct HistoryResponse {
    #[serde(default)]
    history: Vec<HistoryEntry>,
}

/// Server acknowledgement of a stand-alone resume upload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadReceipt {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub filename: Option<String>,
    pub original_name: Option<String>,
}

#[derive(Clone)]
pub struct ServiceClient {
    client: Client,
    base_url: Url,
}

impl ServiceClient {
    pub fn new(mut base_url: Url) -> Result<Self, ServiceError> {
        // Url::join drops the last segment unless the base ends in '/'
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client: Client::builder().build()?,
            base_url,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// POSTs one multipart generation request and returns the raw success body.
    pub async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationPayload, ServiceError> {
        let kind = request.channel.kind();
        let url = self.base_url.join(kind.endpoint())?;

        let mut form = Form::new().text(kind.form_field(), request.channel.input().to_string());
        if let Some(session) = &request.session_id {
            form = form.text("user_id", session.clone());
        }
        if let Some(profile) = &request.profile {
            form = form.text("profile", serde_json::to_string(profile)?);
        }
        if let Some(file) = &request.resume {
            form = form.part("resume", file_part(file)?);
        }

        info!("POST {url} ({kind:?})");
        let response = self.client.post(url).multipart(form).send().await?;
        let body = read_success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn upload_resume(&self, file: &UploadedFile) -> Result<UploadReceipt, ServiceError> {
        let url = self.base_url.join("upload-resume")?;
        let form = Form::new().part("resume", file_part(file)?);

        info!("POST {url} ({} bytes)", file.size);
        let response = self.client.post(url).multipart(form).send().await?;
        let body = read_success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }

    pub async fn list_templates(&self) -> Result<Vec<String>, ServiceError> {
        let body: TemplatesResponse = self.get_json("templates").await?;
        Ok(body.templates)
    }

    pub async fn list_history(&self) -> Result<Vec<HistoryEntry>, ServiceError> {
        let body: HistoryResponse = self.get_json("history").await?;
        Ok(body.history)
    }

    /// URL for downloading a generated artifact. Path-like identifiers are
    /// refused before they reach the server.
    pub fn download_url(&self, identifier: &str) -> Result<Url, ServiceError> {
        if identifier.is_empty() || identifier.contains("..") || identifier.starts_with('/') {
            return Err(ServiceError::InvalidIdentifier(identifier.to_string()));
        }
        let mut url = self.base_url.join("download/")?;
        url.path_segments_mut()
            .map_err(|_| ServiceError::InvalidIdentifier(identifier.to_string()))?
            .pop_if_empty()
            .push(identifier);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
    ) -> Result<T, ServiceError> {
        let url = self.base_url.join(path)?;
        debug!("GET {url}");
        let response = self.client.get(url).send().await?;
        let body = read_success_body(response).await?;
        Ok(serde_json::from_str(&body)?)
    }
}

fn file_part(file: &UploadedFile) -> Result<Part, ServiceError> {
    Ok(Part::stream_with_length(file.content.clone(), file.size)
        .file_name(file.file_name.clone())
        .mime_str(&file.mime_type)?)
}

/// Returns the body of a 2xx response; anything else becomes an error.
async fn read_success_body(response: reqwest::Response) -> Result<String, ServiceError> {
    let status = response.status();
    let body = response.text().await?;
    debug!("Response {status}: {} bytes", body.len());

    if status.is_success() {
        return Ok(body);
    }

    warn!("Backend returned {status}");
    Err(api_error(status, &body))
}

fn api_error(status: StatusCode, body: &str) -> ServiceError {
    match serde_json::from_str::<serde_json::Value>(body) {
        Ok(value) => ServiceError::Api {
            status: status.as_u16(),
            message: error_message(&value),
        },
        Err(_) => ServiceError::Status {
            status: status.as_u16(),
        },
    }
}

/// `detail` (as sent by the backend's HTTP exceptions), `message`, or
/// `error.message`, whichever is a non-blank string first.
fn error_message(value: &serde_json::Value) -> Option<String> {
    ["/detail", "/message", "/error/message"]
        .iter()
        .filter_map(|p| value.pointer(p).and_then(|v| v.as_str()))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_string)
}
