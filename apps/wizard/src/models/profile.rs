use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Step 1 of the wizard. Overwritten wholesale every time the step is confirmed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub target_position: String,
    pub summary: String,
}

impl BasicInfo {
    /// Field ids that must be non-empty before the wizard may leave step 1.
    pub const REQUIRED: [&'static str; 4] = ["name", "email", "phone", "target_position"];

    /// Returns the ids of required fields that are blank after trimming.
    pub fn missing_required(&self) -> Vec<String> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phone", &self.phone),
            ("target_position", &self.target_position),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(id, _)| id.to_string())
        .collect()
    }

    pub fn trimmed(&self) -> Self {
        BasicInfo {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            target_position: self.target_position.trim().to_string(),
            summary: self.summary.trim().to_string(),
        }
    }
}

/// One experience or education entry: field id → non-empty value.
pub type SectionEntry = BTreeMap<String, String>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub language: String,
    pub proficiency_level: String,
}

/// The profile accumulated across wizard steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileAggregate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub basic_info: Option<BasicInfo>,
    pub experience: Vec<SectionEntry>,
    pub education: Vec<SectionEntry>,
    pub skills: Vec<String>,
    pub languages: Vec<LanguageEntry>,
}

impl ProfileAggregate {
    pub fn is_empty(&self) -> bool {
        self.basic_info.is_none()
            && self.experience.is_empty()
            && self.education.is_empty()
            && self.skills.is_empty()
            && self.languages.is_empty()
    }
}
