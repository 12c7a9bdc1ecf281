//! Generation orchestrator: turns a channel selection plus the wizard's profile
//! into exactly one outbound request and a normalized result.
//!
//! Flow: busy check → channel input check → resume check → Idle→InFlight →
//!       transport.send → normalize → Succeeded/Failed → Idle.
//!
//! One request at a time per orchestrator. A second `submit` while one is in
//! flight is refused, not queued. There is no cancellation and no timeout.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::{error, info, warn};

use crate::config::Config;
use crate::errors::WizardError;
use crate::generation::channel::{Channel, ChannelKind};
use crate::generation::templates::TemplateCatalog;
use crate::generation::transport::{GenerationRequest, GenerationTransport};
use crate::models::profile::ProfileAggregate;
use crate::models::result::GenerationResult;
use crate::wizard::state::WizardState;
use crate::wizard::upload::UploadedFile;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    InFlight(ChannelKind),
    Succeeded,
    Failed,
}

pub struct GenerationOrchestrator {
    transport: Arc<dyn GenerationTransport>,
    templates: TemplateCatalog,
    resume_required: HashSet<ChannelKind>,
    session_id: Option<String>,
    phase: Mutex<Phase>,
}

impl GenerationOrchestrator {
    pub fn new(transport: Arc<dyn GenerationTransport>) -> Self {
        Self {
            transport,
            templates: TemplateCatalog::default(),
            resume_required: HashSet::new(),
            session_id: None,
            phase: Mutex::new(Phase::Idle),
        }
    }

    pub fn from_config(transport: Arc<dyn GenerationTransport>, config: &Config) -> Self {
        Self::new(transport)
            .with_resume_required(config.resume_required.iter().copied())
            .with_session_id(config.session_id.clone())
    }

    pub fn with_templates(mut self, templates: TemplateCatalog) -> Self {
        self.templates = templates;
        self
    }

    pub fn with_resume_required(mut self, kinds: impl IntoIterator<Item = ChannelKind>) -> Self {
        self.resume_required = kinds.into_iter().collect();
        self
    }

    pub fn with_session_id(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn set_templates(&mut self, templates: TemplateCatalog) {
        self.templates = templates;
    }

    pub fn phase(&self) -> Phase {
        *self.lock_phase()
    }

    /// Convenience wrapper submitting the wizard's committed profile and file.
    pub async fn submit_wizard(
        &self,
        channel: Channel,
        wizard: &WizardState,
    ) -> Result<GenerationResult, WizardError> {
        self.submit(channel, wizard.profile(), wizard.uploaded_file())
            .await
    }

    /// Sends one generation request and normalizes the response.
    ///
    /// Local failures (`AlreadyInProgress`, `MissingRequiredInput`,
    /// `ResumeRequired`) happen before any network interaction. Whatever the
    /// outcome, the orchestrator is `Idle` again when this returns.
    pub async fn submit(
        &self,
        channel: Channel,
        profile: &ProfileAggregate,
        resume: Option<&UploadedFile>,
    ) -> Result<GenerationResult, WizardError> {
        if matches!(self.phase(), Phase::InFlight(_)) {
            warn!("Generation refused: request already in flight");
            return Err(WizardError::AlreadyInProgress);
        }

        let kind = channel.kind();
        channel.check_input(&self.templates)?;
        if resume.is_none() && self.resume_required.contains(&kind) {
            return Err(WizardError::ResumeRequired);
        }

        let request = GenerationRequest {
            channel,
            session_id: self.session_id.clone(),
            resume: resume.cloned(),
            profile: (!profile.is_empty()).then(|| profile.clone()),
        };

        let flight = self.begin(kind)?;
        let outcome = match self.transport.send(&request).await {
            Ok(payload) => payload.normalize(),
            Err(e) => Err(e.into()),
        };
        flight.finish(&outcome);
        outcome
    }

    /// Idle→InFlight, atomically. The returned guard puts the phase back to
    /// Idle when dropped.
    fn begin(&self, kind: ChannelKind) -> Result<InFlight<'_>, WizardError> {
        let mut phase = self.lock_phase();
        if matches!(*phase, Phase::InFlight(_)) {
            warn!("Generation refused: request already in flight");
            return Err(WizardError::AlreadyInProgress);
        }
        *phase = Phase::InFlight(kind);
        info!("Generation in flight ({kind:?})");
        Ok(InFlight { phase: &self.phase })
    }

    fn lock_phase(&self) -> MutexGuard<'_, Phase> {
        self.phase.lock().unwrap_or_else(|e| e.into_inner())
    }
}

struct InFlight<'a> {
    phase: &'a Mutex<Phase>,
}

impl InFlight<'_> {
    fn finish(&self, outcome: &Result<GenerationResult, WizardError>) {
        let terminal = match outcome {
            Ok(result) => {
                info!(
                    "Generation succeeded: score={:?}, artifacts={}",
                    result.match_score_percent,
                    result.artifacts.len()
                );
                Phase::Succeeded
            }
            Err(e) => {
                error!("Generation failed: {e}");
                Phase::Failed
            }
        };
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = terminal;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        *self.phase.lock().unwrap_or_else(|e| e.into_inner()) = Phase::Idle;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;

    use async_trait::async_trait;
    use bytes::Bytes;
    use serde_json::json;
    use tokio::sync::Notify;

    use super::*;
    use crate::errors::GENERIC_REJECTION;
    use crate::models::result::{ArtifactFormat, GenerationPayload};
    use crate::service_client::ServiceError;
    use crate::wizard::upload::MIME_PDF;

    /// Replays canned responses and records every request it sees.
    #[derive(Default)]
    struct StubTransport {
        responses: Mutex<VecDeque<Result<GenerationPayload, ServiceError>>>,
        seen: Mutex<Vec<GenerationRequest>>,
        gate: Option<Arc<Notify>>,
    }

    impl StubTransport {
        fn replying(responses: Vec<Result<GenerationPayload, ServiceError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.seen.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl GenerationTransport for StubTransport {
        async fn send(
            &self,
            request: &GenerationRequest,
        ) -> Result<GenerationPayload, ServiceError> {
            self.seen.lock().unwrap().push(request.clone());
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .expect("no canned response left")
        }
    }

    fn ok(value: serde_json::Value) -> Result<GenerationPayload, ServiceError> {
        Ok(serde_json::from_value(value).unwrap())
    }

    fn orchestrator(stub: Arc<StubTransport>) -> GenerationOrchestrator {
        GenerationOrchestrator::new(stub)
    }

    fn resume() -> UploadedFile {
        UploadedFile::new("cv.pdf", MIME_PDF, Bytes::from_static(b"%PDF-1.4"))
    }

    #[tokio::test]
    async fn test_description_without_file_succeeds_when_not_required() {
        let stub = Arc::new(StubTransport::replying(vec![ok(json!({"success": true}))]));
        let orch = orchestrator(stub.clone());

        let result = orch
            .submit(
                Channel::Description("Backend engineer".into()),
                &ProfileAggregate::default(),
                None,
            )
            .await
            .unwrap();

        assert!(result.success);
        assert_eq!(stub.calls(), 1);
        let seen = stub.seen.lock().unwrap();
        assert!(seen[0].resume.is_none());
        assert!(seen[0].profile.is_none());
        assert_eq!(orch.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_resume_required_fails_before_network() {
        let stub = Arc::new(StubTransport::default());
        let orch = orchestrator(stub.clone()).with_resume_required([ChannelKind::Description]);

        let err = orch
            .submit(
                Channel::Description("Backend engineer".into()),
                &ProfileAggregate::default(),
                None,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, WizardError::ResumeRequired));
        assert_eq!(stub.calls(), 0);
        assert_eq!(orch.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_resume_required_satisfied_by_file() {
        let stub = Arc::new(StubTransport::replying(vec![ok(json!({"success": true}))]));
        let orch = orchestrator(stub.clone()).with_resume_required([ChannelKind::Link]);
        let file = resume();

        orch.submit(
            Channel::Link("https://jobs.example.com/42".into()),
            &ProfileAggregate::default(),
            Some(&file),
        )
        .await
        .unwrap();

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen[0].resume.as_ref().unwrap().file_name, "cv.pdf");
    }

    #[tokio::test]
    async fn test_missing_input_fails_before_network() {
        let stub = Arc::new(StubTransport::default());
        let orch = orchestrator(stub.clone());

        let err = orch
            .submit(Channel::Template("designer".into()), &ProfileAggregate::default(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, WizardError::MissingRequiredInput(f) if f == "template_name"));
        assert_eq!(stub.calls(), 0);
    }

    #[tokio::test]
    async fn test_template_from_catalog_is_sent() {
        let stub = Arc::new(StubTransport::replying(vec![ok(json!({"success": true}))]));
        let orch = orchestrator(stub.clone())
            .with_templates(TemplateCatalog::new(vec!["designer".to_string()]))
            .with_session_id(Some("user-7".to_string()));

        orch.submit(Channel::Template("designer".into()), &ProfileAggregate::default(), None)
            .await
            .unwrap();

        let seen = stub.seen.lock().unwrap();
        assert_eq!(seen[0].channel, Channel::Template("designer".into()));
        assert_eq!(seen[0].session_id.as_deref(), Some("user-7"));
    }

    #[tokio::test]
    async fn test_success_payload_is_normalized() {
        let stub = Arc::new(StubTransport::replying(vec![ok(json!({
            "success": true,
            "match_score": 82,
            "generated_files": {"pdf": "a.pdf"}
        }))]));
        let orch = orchestrator(stub);

        let result = orch
            .submit(Channel::Description("x".into()), &ProfileAggregate::default(), None)
            .await
            .unwrap();

        assert_eq!(result.match_score_percent, Some(82.0));
        assert_eq!(result.artifacts.len(), 1);
        assert_eq!(result.artifacts[&ArtifactFormat::Pdf], "a.pdf");
        assert!(result.suggestions.is_empty());
    }

    #[tokio::test]
    async fn test_server_error_with_detail_is_rejected() {
        let stub = Arc::new(StubTransport::replying(vec![Err(ServiceError::Api {
            status: 500,
            message: Some("boom".to_string()),
        })]));
        let orch = orchestrator(stub);

        let err = orch
            .submit(Channel::Description("x".into()), &ProfileAggregate::default(), None)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            WizardError::ServerRejected { status: 500, ref message } if message == "boom"
        ));
        assert_eq!(orch.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_server_error_without_message_uses_fallback() {
        let stub = Arc::new(StubTransport::replying(vec![Err(ServiceError::Api {
            status: 422,
            message: None,
        })]));
        let orch = orchestrator(stub);

        let err = orch
            .submit(Channel::Description("x".into()), &ProfileAggregate::default(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, WizardError::ServerRejected { message, .. } if message == GENERIC_REJECTION));
    }

    #[tokio::test]
    async fn test_unparseable_error_is_transport() {
        let stub = Arc::new(StubTransport::replying(vec![Err(ServiceError::Status {
            status: 502,
        })]));
        let orch = orchestrator(stub);

        let err = orch
            .submit(Channel::Description("x".into()), &ProfileAggregate::default(), None)
            .await
            .unwrap_err();

        assert!(matches!(err, WizardError::Transport(m) if m == "HTTP 502"));
    }

    #[tokio::test]
    async fn test_declined_then_retry_succeeds() {
        let stub = Arc::new(StubTransport::replying(vec![
            ok(json!({"success": false, "message": "template missing"})),
            ok(json!({"success": true})),
        ]));
        let orch = orchestrator(stub.clone());

        let err = orch
            .submit(Channel::Description("x".into()), &ProfileAggregate::default(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, WizardError::GenerationDeclined(m) if m == "template missing"));
        assert_eq!(orch.phase(), Phase::Idle);

        assert!(orch
            .submit(Channel::Description("x".into()), &ProfileAggregate::default(), None)
            .await
            .is_ok());
        assert_eq!(stub.calls(), 2);
    }

    #[tokio::test]
    async fn test_second_submit_while_in_flight_is_refused() {
        let gate = Arc::new(Notify::new());
        let stub = Arc::new(StubTransport {
            responses: Mutex::new(VecDeque::from([ok(json!({"success": true}))])),
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let orch = orchestrator(stub.clone());
        let profile = ProfileAggregate::default();

        let (first, second) = tokio::join!(
            orch.submit(Channel::Description("first".into()), &profile, None),
            async {
                assert!(matches!(orch.phase(), Phase::InFlight(ChannelKind::Description)));
                let r = orch
                    .submit(Channel::Description("second".into()), &profile, None)
                    .await;
                gate.notify_one();
                r
            }
        );

        assert!(first.is_ok());
        assert!(matches!(second, Err(WizardError::AlreadyInProgress)));
        assert_eq!(stub.calls(), 1);
        assert_eq!(orch.phase(), Phase::Idle);
    }

    #[tokio::test]
    async fn test_submit_wizard_sends_committed_profile_and_file() {
        let stub = Arc::new(StubTransport::replying(vec![ok(json!({"success": true}))]));
        let orch = orchestrator(stub.clone());

        let mut wizard = WizardState::new();
        let info = wizard.basic_info_mut();
        info.name = "Ada".into();
        info.email = "ada@example.com".into();
        info.phone = "1".into();
        info.target_position = "Engineer".into();
        wizard.advance().unwrap();
        wizard.select_file(resume()).unwrap();

        orch.submit_wizard(Channel::Description("Backend engineer".into()), &wizard)
            .await
            .unwrap();

        let seen = stub.seen.lock().unwrap();
        let profile = seen[0].profile.as_ref().unwrap();
        assert_eq!(profile.basic_info.as_ref().unwrap().name, "Ada");
        assert!(seen[0].resume.is_some());
    }
}
