use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::errors::WizardError;
use crate::models::profile::{BasicInfo, ProfileAggregate};
use crate::wizard::sections::{EntryHandle, RepeatableSectionManager, SectionKind};
use crate::wizard::tags::TagListManager;
use crate::wizard::upload::{UploadGate, UploadedFile};
use crate::wizard::WizardEvent;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    #[default]
    BasicInfo,
    Experience,
    Education,
    SkillsAndLanguages,
    Review,
}

impl Step {
    pub const ALL: [Step; 5] = [
        Step::BasicInfo,
        Step::Experience,
        Step::Education,
        Step::SkillsAndLanguages,
        Step::Review,
    ];
    pub const TOTAL: usize = Self::ALL.len();

    /// 1-based position.
    pub fn number(&self) -> usize {
        *self as usize + 1
    }

    pub fn from_number(n: usize) -> Option<Step> {
        n.checked_sub(1).and_then(|i| Self::ALL.get(i).copied())
    }

    pub fn next(&self) -> Option<Step> {
        Self::from_number(self.number() + 1)
    }

    pub fn prev(&self) -> Option<Step> {
        Self::from_number(self.number() - 1)
    }

    pub fn is_last(&self) -> bool {
        self.number() == Self::TOTAL
    }
}

/// Owns wizard progress and the profile being built.
///
/// The profile is only written on [`advance`](Self::advance): edits to the
/// basic-info draft, tags and sub-forms stay pending until their step is
/// confirmed.
#[derive(Debug, Default)]
pub struct WizardState {
    step: Step,
    profile: ProfileAggregate,
    basic_draft: BasicInfo,
    tags: TagListManager,
    sections: RepeatableSectionManager,
    upload: UploadGate,
    events: Vec<WizardEvent>,
}

impl WizardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn step(&self) -> Step {
        self.step
    }

    /// currentStep / totalSteps.
    pub fn progress(&self) -> f64 {
        self.step.number() as f64 / Step::TOTAL as f64
    }

    pub fn profile(&self) -> &ProfileAggregate {
        &self.profile
    }

    pub fn skills(&self) -> &[String] {
        self.tags.items()
    }

    pub fn uploaded_file(&self) -> Option<&UploadedFile> {
        self.upload.current()
    }

    pub fn basic_info_mut(&mut self) -> &mut BasicInfo {
        &mut self.basic_draft
    }

    pub fn add_skill(&mut self, text: &str) -> bool {
        let event = self.tags.add(text);
        self.emit(event)
    }

    pub fn remove_skill(&mut self, text: &str) -> bool {
        let event = self.tags.remove(text);
        self.emit(event)
    }

    pub fn add_entry(&mut self, kind: SectionKind) -> EntryHandle {
        let (handle, event) = self.sections.add_entry(kind);
        self.events.push(event);
        handle
    }

    pub fn remove_entry(&mut self, handle: EntryHandle) -> Result<(), WizardError> {
        let event = self.sections.remove_entry(handle)?;
        self.events.push(event);
        Ok(())
    }

    pub fn set_entry_field(
        &mut self,
        handle: EntryHandle,
        field: &str,
        value: &str,
    ) -> Result<(), WizardError> {
        self.sections.set_field(handle, field, value)
    }

    /// Validates and stores the resume file. A rejected file leaves the
    /// previous one in place.
    pub fn select_file(&mut self, file: UploadedFile) -> Result<(), WizardError> {
        let name = self.upload.validate_and_set(file)?.file_name.clone();
        self.events.push(WizardEvent::UploadChanged {
            file_name: Some(name),
        });
        Ok(())
    }

    /// Validates the current step, commits its fields and moves forward.
    /// Clamped at the last step. On validation failure nothing changes.
    pub fn advance(&mut self) -> Result<Step, WizardError> {
        self.validate(self.step)?;
        self.commit(self.step);

        if let Some(next) = self.step.next() {
            info!("Wizard step {} -> {}", self.step.number(), next.number());
            self.step = next;
            self.emit_step();
        } else {
            debug!("Wizard already on final step");
        }
        Ok(self.step)
    }

    /// Moves back one step. Committed data is kept; nothing is re-validated.
    pub fn retreat(&mut self) -> Step {
        if let Some(prev) = self.step.prev() {
            info!("Wizard step {} -> {}", self.step.number(), prev.number());
            self.step = prev;
            self.emit_step();
        }
        self.step
    }

    /// Back to step 1 with an empty profile, no skills, no sub-forms, no file.
    pub fn reset(&mut self) {
        info!("Wizard reset");
        self.step = Step::BasicInfo;
        self.profile = ProfileAggregate::default();
        self.basic_draft = BasicInfo::default();
        self.tags.clear();
        self.sections.clear();
        self.upload.clear();
        self.events.push(WizardEvent::Reset);
    }

    pub fn drain_events(&mut self) -> Vec<WizardEvent> {
        std::mem::take(&mut self.events)
    }

    fn validate(&self, step: Step) -> Result<(), WizardError> {
        match step {
            Step::BasicInfo => {
                let fields = self.basic_draft.missing_required();
                if fields.is_empty() {
                    Ok(())
                } else {
                    debug!("Step 1 validation failed: {fields:?}");
                    Err(WizardError::Validation { fields })
                }
            }
            Step::Experience | Step::Education | Step::SkillsAndLanguages | Step::Review => Ok(()),
        }
    }

    fn commit(&mut self, step: Step) {
        match step {
            Step::BasicInfo => self.profile.basic_info = Some(self.basic_draft.trimmed()),
            Step::Experience => {
                self.sections.commit(SectionKind::Experience, &mut self.profile);
            }
            Step::Education => {
                self.sections.commit(SectionKind::Education, &mut self.profile);
            }
            Step::SkillsAndLanguages => {
                self.profile.skills = self.tags.items().to_vec();
                self.sections.commit(SectionKind::Language, &mut self.profile);
            }
            Step::Review => {}
        }
    }

    fn emit(&mut self, event: Option<WizardEvent>) -> bool {
        match event {
            Some(e) => {
                self.events.push(e);
                true
            }
            None => false,
        }
    }

    fn emit_step(&mut self) {
        self.events.push(WizardEvent::StepChanged {
            step: self.step,
            progress: self.progress(),
        });
    }
}
