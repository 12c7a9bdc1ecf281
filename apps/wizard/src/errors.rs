use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::service_client::ServiceError;
use crate::wizard::sections::SectionKind;

pub(crate) const GENERIC_REJECTION: &str = "The server could not process the request";

/// Every failure the wizard core can surface.
///
/// None of these are fatal: the caller shows them as a transient
/// notification (see [`WizardError::to_notification`]) and the wizard stays
/// on its current step / the orchestrator returns to idle.
#[derive(Debug, Error)]
pub enum WizardError {
    #[error("Validation failed for: {}", fields.join(", "))]
    Validation { fields: Vec<String> },

    #[error("Missing required input: {0}")]
    MissingRequiredInput(String),

    #[error("A resume file is required for this action")]
    ResumeRequired,

    #[error("Unsupported file type: {0}")]
    InvalidFileType(String),

    #[error("File too large: {size} bytes (max {max})")]
    FileTooLarge { size: u64, max: u64 },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Server rejected request (status {status}): {message}")]
    ServerRejected { status: u16, message: String },

    #[error("Generation declined: {0}")]
    GenerationDeclined(String),

    #[error("A generation request is already in progress")]
    AlreadyInProgress,

    #[error("Malformed result: {0}")]
    MalformedResult(String),

    #[error("Unknown entry: {0}")]
    UnknownEntry(Uuid),

    #[error("Unknown field '{field}' for {kind:?} entries")]
    UnknownField { kind: SectionKind, field: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Transient, user-facing projection of a [`WizardError`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub code: &'static str,
    pub message: String,
}

impl WizardError {
    pub fn code(&self) -> &'static str {
        match self {
            WizardError::Validation { .. } => "VALIDATION_ERROR",
            WizardError::MissingRequiredInput(_) => "MISSING_REQUIRED_INPUT",
            WizardError::ResumeRequired => "RESUME_REQUIRED",
            WizardError::InvalidFileType(_) => "INVALID_FILE_TYPE",
            WizardError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            WizardError::Transport(_) => "TRANSPORT_ERROR",
            WizardError::ServerRejected { .. } => "SERVER_REJECTED",
            WizardError::GenerationDeclined(_) => "GENERATION_DECLINED",
            WizardError::AlreadyInProgress => "ALREADY_IN_PROGRESS",
            WizardError::MalformedResult(_) => "MALFORMED_RESULT",
            WizardError::UnknownEntry(_) => "UNKNOWN_ENTRY",
            WizardError::UnknownField { .. } => "UNKNOWN_FIELD",
            WizardError::Io(_) => "IO_ERROR",
        }
    }

    pub fn to_notification(&self) -> Notification {
        let message = match self {
            WizardError::Validation { fields } => {
                format!("Please fill in: {}", fields.join(", "))
            }
            WizardError::ServerRejected { message, .. } => message.clone(),
            WizardError::GenerationDeclined(message) => message.clone(),
            WizardError::Transport(msg) => {
                tracing::error!("Transport error: {msg}");
                "Could not reach the generation service".to_string()
            }
            WizardError::Io(e) => {
                tracing::error!("I/O error: {e}");
                "Could not read the selected file".to_string()
            }
            other => other.to_string(),
        };

        Notification {
            code: self.code(),
            message,
        }
    }
}

/// Backend failures in the user-facing taxonomy: a JSON error body is a
/// server rejection, anything else that failed in transit is a transport error.
impl From<ServiceError> for WizardError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::Api { status, message } => WizardError::ServerRejected {
                status,
                message: message.unwrap_or_else(|| GENERIC_REJECTION.to_string()),
            },
            ServiceError::Status { status } => WizardError::Transport(format!("HTTP {status}")),
            ServiceError::Http(e) => WizardError::Transport(e.to_string()),
            ServiceError::Parse(e) => {
                WizardError::MalformedResult(format!("response is not valid JSON: {e}"))
            }
            ServiceError::Url(e) => WizardError::Transport(e.to_string()),
            ServiceError::InvalidIdentifier(id) => {
                WizardError::Transport(format!("invalid identifier '{id}'"))
            }
        }
    }
}
