use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::errors::WizardError;
use crate::models::profile::{LanguageEntry, ProfileAggregate, SectionEntry};
use crate::wizard::WizardEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Experience,
    Education,
    Language,
}

impl SectionKind {
    /// Stable field ids accepted by sub-forms of this kind.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            SectionKind::Experience => &[
                "company",
                "position",
                "start_date",
                "end_date",
                "description",
            ],
            SectionKind::Education => &[
                "institution",
                "degree",
                "field_of_study",
                "start_date",
                "end_date",
            ],
            SectionKind::Language => &["language", "proficiency_level"],
        }
    }
}

/// Opaque handle for one sub-form instance. Only used to edit or remove it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle(Uuid);

impl EntryHandle {
    pub fn id(&self) -> Uuid {
        self.0
    }
}

#[derive(Debug, Clone)]
struct SubForm {
    handle: EntryHandle,
    kind: SectionKind,
    fields: BTreeMap<String, String>,
}

/// Dynamically added/removed sub-forms for the repeatable wizard sections.
#[derive(Debug, Clone, Default)]
pub struct RepeatableSectionManager {
    forms: Vec<SubForm>,
}

impl RepeatableSectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty sub-form of `kind` and returns its handle.
    pub fn add_entry(&mut self, kind: SectionKind) -> (EntryHandle, WizardEvent) {
        let handle = EntryHandle(Uuid::new_v4());
        self.forms.push(SubForm {
            handle,
            kind,
            fields: BTreeMap::new(),
        });
        (handle, self.changed(kind))
    }

    /// Removes exactly the referenced sub-form. Sibling handles stay valid.
    pub fn remove_entry(&mut self, handle: EntryHandle) -> Result<WizardEvent, WizardError> {
        let idx = self
            .forms
            .iter()
            .position(|f| f.handle == handle)
            .ok_or(WizardError::UnknownEntry(handle.0))?;
        let kind = self.forms.remove(idx).kind;
        Ok(self.changed(kind))
    }

    pub fn set_field(
        &mut self,
        handle: EntryHandle,
        field: &str,
        value: &str,
    ) -> Result<(), WizardError> {
        let form = self
            .forms
            .iter_mut()
            .find(|f| f.handle == handle)
            .ok_or(WizardError::UnknownEntry(handle.0))?;
        if !form.kind.fields().contains(&field) {
            return Err(WizardError::UnknownField {
                kind: form.kind,
                field: field.to_string(),
            });
        }
        form.fields.insert(field.to_string(), value.to_string());
        Ok(())
    }

    pub fn count(&self, kind: SectionKind) -> usize {
        self.forms.iter().filter(|f| f.kind == kind).count()
    }

    pub fn clear(&mut self) {
        self.forms.clear();
    }

    /// Replaces the profile's sequence for `kind` with the non-empty sub-forms
    /// currently present. Each commit is authoritative: nothing from earlier
    /// commits survives. Returns the number of entries written.
    pub fn commit(&self, kind: SectionKind, profile: &mut ProfileAggregate) -> usize {
        let entries = self.collect(kind);
        let written = entries.len();
        debug!("Committing {written} {kind:?} entries");

        match kind {
            SectionKind::Experience => profile.experience = entries,
            SectionKind::Education => profile.education = entries,
            SectionKind::Language => {
                profile.languages = entries
                    .into_iter()
                    .map(|mut e| LanguageEntry {
                        language: e.remove("language").unwrap_or_default(),
                        proficiency_level: e.remove("proficiency_level").unwrap_or_default(),
                    })
                    .collect();
            }
        }
        written
    }

    fn collect(&self, kind: SectionKind) -> Vec<SectionEntry> {
        self.forms
            .iter()
            .filter(|f| f.kind == kind)
            .map(|f| {
                f.fields
                    .iter()
                    .filter_map(|(k, v)| {
                        let v = v.trim();
                        (!v.is_empty()).then(|| (k.clone(), v.to_string()))
                    })
                    .collect::<SectionEntry>()
            })
            .filter(|entry| !entry.is_empty())
            .collect()
    }

    fn changed(&self, kind: SectionKind) -> WizardEvent {
        WizardEvent::SectionChanged {
            kind,
            entries: self.count(kind),
        }
    }
}
