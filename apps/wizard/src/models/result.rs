use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::WizardError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactFormat {
    Html,
    Pdf,
    Docx,
}

impl ArtifactFormat {
    pub fn parse(key: &str) -> Option<Self> {
        match key.trim().to_ascii_lowercase().as_str() {
            "html" | "htm" => Some(ArtifactFormat::Html),
            "pdf" => Some(ArtifactFormat::Pdf),
            "docx" => Some(ArtifactFormat::Docx),
            _ => None,
        }
    }

    /// Guesses the format of a legacy single-file identifier from its extension.
    /// Identifiers without a recognised extension are PDFs: that was the only
    /// format the single-file responses produced.
    pub fn from_identifier(identifier: &str) -> Self {
        identifier
            .rsplit_once('.')
            .and_then(|(_, ext)| ArtifactFormat::parse(ext))
            .unwrap_or(ArtifactFormat::Pdf)
    }

    pub fn label(&self) -> &'static str {
        match self {
            ArtifactFormat::Html => "HTML",
            ArtifactFormat::Pdf => "PDF",
            ArtifactFormat::Docx => "DOCX",
        }
    }
}

/// Normalized outcome of one generation request, independent of the channel.
///
/// `success` is the only field a serialized snapshot must carry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationResult {
    pub success: bool,
    #[serde(default)]
    pub match_score_percent: Option<f64>,
    #[serde(default)]
    pub suggestions: Vec<String>,
    #[serde(default)]
    pub ats_suggestions: Vec<String>,
    #[serde(default)]
    pub artifacts: BTreeMap<ArtifactFormat, String>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

/// Raw success body as sent by the generation endpoints. Every field is optional.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerationPayload {
    pub success: Option<bool>,
    pub message: Option<String>,
    pub match_score: Option<f64>,
    pub suggestions: Option<Vec<String>>,
    pub ats_suggestions: Option<Vec<String>>,
    pub generated_file: Option<String>,
    pub generated_files: Option<BTreeMap<String, Option<String>>>,
    pub formats: Option<BTreeMap<String, Option<String>>>,
    pub timestamp: Option<String>,
}

impl GenerationPayload {
    /// Maps the payload into a [`GenerationResult`].
    ///
    /// `success: false` becomes `GenerationDeclined`; a missing `success` flag is
    /// `MalformedResult`.
    pub fn normalize(self) -> Result<GenerationResult, WizardError> {
        let success = self
            .success
            .ok_or_else(|| WizardError::MalformedResult("response has no 'success' flag".into()))?;

        if !success {
            return Err(WizardError::GenerationDeclined(
                self.message
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| "Generation failed".to_string()),
            ));
        }

        let mut artifacts = BTreeMap::new();
        if let Some(legacy) = self.generated_file.filter(|f| !f.trim().is_empty()) {
            artifacts.insert(ArtifactFormat::from_identifier(&legacy), legacy);
        }
        // `generated_files` wins over the duplicate `formats` mapping.
        for map in [self.formats, self.generated_files].into_iter().flatten() {
            for (key, value) in map {
                let (Some(format), Some(id)) = (ArtifactFormat::parse(&key), value) else {
                    continue;
                };
                if !id.trim().is_empty() {
                    artifacts.insert(format, id);
                }
            }
        }

        Ok(GenerationResult {
            success,
            match_score_percent: self.match_score.map(score_to_percent),
            suggestions: self.suggestions.unwrap_or_default(),
            ats_suggestions: self.ats_suggestions.unwrap_or_default(),
            artifacts,
            timestamp: self
                .timestamp
                .as_deref()
                .and_then(parse_timestamp)
                .unwrap_or_else(Utc::now),
        })
    }
}

/// Scores in `[0, 1]` are fractions; anything larger is already a percentage.
fn score_to_percent(score: f64) -> f64 {
    if (0.0..=1.0).contains(&score) {
        score * 100.0
    } else {
        score
    }
}

fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    // naive ISO timestamps (no offset) are taken as UTC
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// One row of the read-only history listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub input: Option<String>,
    #[serde(default)]
    pub match_score: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<String>,
    #[serde(default)]
    pub output: Option<String>,
}
