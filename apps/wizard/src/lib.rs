pub mod config;
pub mod errors;
pub mod generation;
pub mod models;
pub mod render;
pub mod service_client;
pub mod wizard;

pub use errors::{Notification, WizardError};
pub use generation::channel::{Channel, ChannelKind};
pub use generation::orchestrator::{GenerationOrchestrator, Phase};
pub use models::profile::ProfileAggregate;
pub use models::result::GenerationResult;
pub use render::{RenderPlan, ResultPresenter};
pub use wizard::state::{Step, WizardState};
