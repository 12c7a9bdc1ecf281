use serde::{Deserialize, Serialize};
use url::Url;

use crate::errors::WizardError;
use crate::generation::templates::TemplateCatalog;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelKind {
    Description,
    Link,
    Template,
}

impl ChannelKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "description" => Some(ChannelKind::Description),
            "link" | "url" => Some(ChannelKind::Link),
            "template" => Some(ChannelKind::Template),
            _ => None,
        }
    }

    /// Path of the generation endpoint for this channel.
    pub fn endpoint(&self) -> &'static str {
        match self {
            ChannelKind::Description => "generate-by-description",
            ChannelKind::Link => "generate-by-url",
            ChannelKind::Template => "generate-by-template",
        }
    }

    /// Name of the multipart field carrying the channel input.
    pub fn form_field(&self) -> &'static str {
        match self {
            ChannelKind::Description => "description",
            ChannelKind::Link => "url",
            ChannelKind::Template => "template_name",
        }
    }
}

/// How a generation request is framed, with its input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Channel {
    Description(String),
    Link(String),
    Template(String),
}

impl Channel {
    pub fn kind(&self) -> ChannelKind {
        match self {
            Channel::Description(_) => ChannelKind::Description,
            Channel::Link(_) => ChannelKind::Link,
            Channel::Template(_) => ChannelKind::Template,
        }
    }

    pub fn input(&self) -> &str {
        match self {
            Channel::Description(s) | Channel::Link(s) | Channel::Template(s) => s.trim(),
        }
    }

    /// Local input check, run before any network interaction.
    pub fn check_input(&self, templates: &TemplateCatalog) -> Result<(), WizardError> {
        let input = self.input();
        let ok = match self {
            Channel::Description(_) => !input.is_empty(),
            Channel::Link(_) => is_plausible_url(input),
            Channel::Template(_) => !input.is_empty() && templates.contains(input),
        };
        if ok {
            Ok(())
        } else {
            Err(WizardError::MissingRequiredInput(
                self.kind().form_field().to_string(),
            ))
        }
    }
}

/// An absolute http(s) URL with a host.
fn is_plausible_url(raw: &str) -> bool {
    Url::parse(raw)
        .map(|u| matches!(u.scheme(), "http" | "https") && u.host_str().is_some_and(|h| !h.is_empty()))
        .unwrap_or(false)
}
