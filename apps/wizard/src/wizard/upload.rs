use std::path::Path;

use bytes::Bytes;
use tracing::{info, warn};

use crate::errors::WizardError;

/// 10 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_TEXT: &str = "text/plain";

const ACCEPTED_TYPES: &[&str] = &[MIME_PDF, MIME_DOC, MIME_DOCX, MIME_TEXT];

/// A user-selected resume file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub size: u64,
    pub content: Bytes,
}

impl UploadedFile {
    pub fn new(file_name: impl Into<String>, mime_type: impl Into<String>, content: Bytes) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            size: content.len() as u64,
            content,
        }
    }

    /// Reads a file from disk, declaring its type from the extension.
    pub fn from_path(path: &Path) -> Result<Self, WizardError> {
        let content = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "resume".to_string());
        let mime = mime_for_extension(path.extension().and_then(|e| e.to_str()).unwrap_or(""));
        Ok(Self::new(file_name, mime, Bytes::from(content)))
    }
}

fn mime_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "pdf" => MIME_PDF,
        "doc" => MIME_DOC,
        "docx" => MIME_DOCX,
        "txt" => MIME_TEXT,
        _ => "application/octet-stream",
    }
}

/// Holds at most one validated resume file.
#[derive(Debug, Clone, Default)]
pub struct UploadGate {
    current: Option<UploadedFile>,
}

impl UploadGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks type then size. On success the file replaces any previous one;
    /// on failure the previous file is kept.
    pub fn validate_and_set(&mut self, file: UploadedFile) -> Result<&UploadedFile, WizardError> {
        let mime = file.mime_type.trim().to_ascii_lowercase();
        if !ACCEPTED_TYPES.contains(&mime.as_str()) {
            warn!("Rejected upload '{}': type {}", file.file_name, file.mime_type);
            return Err(WizardError::InvalidFileType(file.mime_type));
        }
        if file.size > MAX_UPLOAD_BYTES {
            warn!("Rejected upload '{}': {} bytes", file.file_name, file.size);
            return Err(WizardError::FileTooLarge {
                size: file.size,
                max: MAX_UPLOAD_BYTES,
            });
        }

        info!("Accepted upload '{}' ({} bytes)", file.file_name, file.size);
        Ok(&*self.current.insert(file))
    }

    pub fn current(&self) -> Option<&UploadedFile> {
        self.current.as_ref()
    }

    pub fn clear(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn file_of(mime: &str, size: usize) -> UploadedFile {
        UploadedFile::new("cv", mime, Bytes::from(vec![0u8; size]))
    }

    #[test]
    fn test_accepts_exactly_ten_mib() {
        let mut gate = UploadGate::new();
        assert!(gate
            .validate_and_set(file_of(MIME_PDF, MAX_UPLOAD_BYTES as usize))
            .is_ok());
        assert_eq!(gate.current().unwrap().size, MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_rejects_one_byte_over() {
        let mut gate = UploadGate::new();
        let err = gate
            .validate_and_set(file_of(MIME_PDF, MAX_UPLOAD_BYTES as usize + 1))
            .unwrap_err();
        assert!(matches!(err, WizardError::FileTooLarge { size, .. } if size == MAX_UPLOAD_BYTES + 1));
        assert!(gate.current().is_none());
    }

    #[test]
    fn test_rejects_unaccepted_type() {
        let mut gate = UploadGate::new();
        let err = gate.validate_and_set(file_of("image/png", 10)).unwrap_err();
        assert!(matches!(err, WizardError::InvalidFileType(t) if t == "image/png"));
    }

    #[test]
    fn test_accepts_all_document_types() {
        for mime in [MIME_PDF, MIME_DOC, MIME_DOCX, MIME_TEXT] {
            let mut gate = UploadGate::new();
            assert!(gate.validate_and_set(file_of(mime, 1)).is_ok(), "{mime}");
        }
    }

    #[test]
    fn test_replacement_discards_previous_and_failure_keeps_it() {
        let mut gate = UploadGate::new();
        gate.validate_and_set(UploadedFile::new("a.pdf", MIME_PDF, Bytes::from_static(b"a")))
            .unwrap();
        gate.validate_and_set(UploadedFile::new("b.txt", MIME_TEXT, Bytes::from_static(b"b")))
            .unwrap();
        assert_eq!(gate.current().unwrap().file_name, "b.txt");

        assert!(gate.validate_and_set(file_of("image/gif", 1)).is_err());
        assert_eq!(gate.current().unwrap().file_name, "b.txt");

        gate.clear();
        assert!(gate.current().is_none());
    }

    #[test]
    fn test_from_path_infers_type() {
        let mut tmp = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        tmp.write_all(b"PK\x03\x04").unwrap();

        let file = UploadedFile::from_path(tmp.path()).unwrap();
        assert_eq!(file.mime_type, MIME_DOCX);
        assert_eq!(file.size, 4);
        assert!(file.file_name.ends_with(".docx"));
    }

    #[test]
    fn test_from_path_unknown_extension_is_rejected_by_gate() {
        let tmp = tempfile::Builder::new().suffix(".exe").tempfile().unwrap();
        let file = UploadedFile::from_path(tmp.path()).unwrap();
        let mut gate = UploadGate::new();
        assert!(matches!(
            gate.validate_and_set(file),
            Err(WizardError::InvalidFileType(_))
        ));
    }
}
