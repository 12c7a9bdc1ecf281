//! Render projection: a pure mapping from a generation result to the sections
//! the view should show. No I/O, no state.

use serde::Serialize;

use crate::errors::WizardError;
use crate::models::result::{ArtifactFormat, GenerationResult};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "section", rename_all = "snake_case")]
pub enum RenderSection {
    Banner { success: bool, text: String },
    MatchScore { percent: f64, display: String },
    Suggestions { items: Vec<String> },
    AtsSuggestions { items: Vec<String> },
    Download { format: ArtifactFormat, label: String, identifier: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderPlan {
    pub sections: Vec<RenderSection>,
}

impl RenderPlan {
    pub fn downloads(&self) -> impl Iterator<Item = (ArtifactFormat, &str)> {
        self.sections.iter().filter_map(|s| match s {
            RenderSection::Download {
                format, identifier, ..
            } => Some((*format, identifier.as_str())),
            _ => None,
        })
    }

    /// Plain-text rendering, one line per visible element.
    pub fn lines(&self) -> Vec<String> {
        let mut out = Vec::new();
        for section in &self.sections {
            match section {
                RenderSection::Banner { text, .. } => out.push(text.clone()),
                RenderSection::MatchScore { display, .. } => out.push(display.clone()),
                RenderSection::Suggestions { items } => {
                    out.push("Suggestions:".to_string());
                    out.extend(items.iter().map(|i| format!("  - {i}")));
                }
                RenderSection::AtsSuggestions { items } => {
                    out.push("ATS suggestions:".to_string());
                    out.extend(items.iter().map(|i| format!("  - {i}")));
                }
                RenderSection::Download {
                    label, identifier, ..
                } => out.push(format!("{label}: {identifier}")),
            }
        }
        out
    }
}

pub struct ResultPresenter;

impl ResultPresenter {
    pub fn present(result: &GenerationResult) -> RenderPlan {
        let mut sections = vec![RenderSection::Banner {
            success: result.success,
            text: if result.success {
                "Resume generated successfully".to_string()
            } else {
                "Resume generation failed".to_string()
            },
        }];

        if let Some(percent) = result.match_score_percent {
            sections.push(RenderSection::MatchScore {
                percent,
                display: format!("Match score: {}%", percent.round()),
            });
        }
        if !result.suggestions.is_empty() {
            sections.push(RenderSection::Suggestions {
                items: result.suggestions.clone(),
            });
        }
        if !result.ats_suggestions.is_empty() {
            sections.push(RenderSection::AtsSuggestions {
                items: result.ats_suggestions.clone(),
            });
        }
        if result.success {
            // BTreeMap order: html, pdf, docx
            sections.extend(result.artifacts.iter().map(|(format, id)| {
                RenderSection::Download {
                    format: *format,
                    label: format!("Download {}", format.label()),
                    identifier: id.clone(),
                }
            }));
        }

        RenderPlan { sections }
    }

    /// Projects a serialized result snapshot. A snapshot without a boolean
    /// `success` flag is refused rather than guessed at.
    pub fn present_value(value: &serde_json::Value) -> Result<RenderPlan, WizardError> {
        if !value.get("success").is_some_and(|v| v.is_boolean()) {
            return Err(WizardError::MalformedResult(
                "result has no boolean 'success' flag".to_string(),
            ));
        }
        let result: GenerationResult = serde_json::from_value(value.clone())
            .map_err(|e| WizardError::MalformedResult(e.to_string()))?;
        Ok(Self::present(&result))
    }
}
