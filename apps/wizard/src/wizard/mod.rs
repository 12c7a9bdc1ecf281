//! Wizard core: step sequencing plus the managers that feed the profile.
//!
//! Mutations never touch a view directly. They queue [`WizardEvent`]s which the
//! view layer drains via [`state::WizardState::drain_events`] and re-renders from.

pub mod sections;
pub mod state;
pub mod tags;
pub mod upload;

use crate::wizard::sections::SectionKind;
use crate::wizard::state::Step;

#[derive(Debug, Clone, PartialEq)]
pub enum WizardEvent {
    StepChanged { step: Step, progress: f64 },
    /// Full ordered tag list; redraw, don't patch.
    TagsRendered(Vec<String>),
    SectionChanged { kind: SectionKind, entries: usize },
    UploadChanged { file_name: Option<String> },
    Reset,
}
