use crate::errors::{CommandError, EngineError, ErrorMessageVerbosity};
use crate::models::ExecutionId;
use derivative::Derivative;
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone)]
/// EngineEvent: represents an event happening during an automation run.
pub enum EngineEvent {
    /// Debug: represents a debug message event.
    Debug(EventDetails, EventMessage),
    /// Info: represents an info message event.
    Info(EventDetails, EventMessage),
    /// Warning: represents a warning message event.
    Warning(EventDetails, EventMessage),
    /// Error: represents an error event.
    Error(EngineError, Option<EventMessage>),
}

impl EngineEvent {
    /// Returns event details.
    pub fn get_details(&self) -> &EventDetails {
        match self {
            EngineEvent::Debug(details, _message) => details,
            EngineEvent::Info(details, _message) => details,
            EngineEvent::Warning(details, _message) => details,
            EngineEvent::Error(engine_error, _message) => engine_error.event_details(),
        }
    }

    /// Returns event message.
    pub fn message(&self, message_verbosity: EventMessageVerbosity) -> String {
        match self {
            EngineEvent::Debug(_details, message) => message.message(message_verbosity),
            EngineEvent::Info(_details, message) => message.message(message_verbosity),
            EngineEvent::Warning(_details, message) => message.message(message_verbosity),
            EngineEvent::Error(engine_error, _message) => engine_error.message(message_verbosity.into()),
        }
    }
}

/// EventMessageVerbosity: represents event message's verbosity from minimal to full verbosity.
pub enum EventMessageVerbosity {
    SafeOnly,
    FullDetailsWithoutEnvVars,
    FullDetails,
}

impl From<EventMessageVerbosity> for ErrorMessageVerbosity {
    fn from(verbosity: EventMessageVerbosity) -> Self {
        match verbosity {
            EventMessageVerbosity::SafeOnly => ErrorMessageVerbosity::SafeOnly,
            EventMessageVerbosity::FullDetailsWithoutEnvVars => ErrorMessageVerbosity::FullDetailsWithoutEnvVars,
            EventMessageVerbosity::FullDetails => ErrorMessageVerbosity::FullDetails,
        }
    }
}

#[derive(Derivative, Clone)]
#[derivative(Debug)]
/// EventMessage: represents an event message.
pub struct EventMessage {
    // Message which is known to be safe: doesn't expose any credentials nor touchy info.
    safe_message: String,
    // String containing full details including touchy data (passwords and tokens).
    full_details: Option<String>,
    // Environments variables including touchy data such as secret keys.
    #[derivative(Debug = "ignore")]
    env_vars: Option<Vec<(String, String)>>,
}

impl EventMessage {
    /// Creates e new EventMessage.
    ///
    /// Arguments
    ///
    /// * `safe_message`: Event safe message string (from which all unsafe text such as passwords and tokens has been removed).
    /// * `full_details`: Event raw message string (which may include unsafe text such as passwords and tokens).
    pub fn new(safe_message: String, full_details: Option<String>) -> Self {
        EventMessage {
            safe_message,
            full_details,
            env_vars: None,
        }
    }

    /// Creates e new EventMessage from safe message.
    pub fn new_from_safe(safe_message: String) -> Self {
        EventMessage {
            safe_message,
            full_details: None,
            env_vars: None,
        }
    }

    /// Returns message for event message.
    pub fn message(&self, message_verbosity: EventMessageVerbosity) -> String {
        match message_verbosity {
            EventMessageVerbosity::SafeOnly => self.safe_message.to_string(),
            EventMessageVerbosity::FullDetailsWithoutEnvVars => match &self.full_details {
                None => self.safe_message.to_string(),
                Some(details) => format!("{} / Full details: {}", self.safe_message, details),
            },
            EventMessageVerbosity::FullDetails => match &self.full_details {
                None => self.safe_message.to_string(),
                Some(details) => match &self.env_vars {
                    None => format!("{} / Full details: {}", self.safe_message, details),
                    Some(env_vars) => {
                        format!(
                            "{} / Full details: {} / Env vars: {}",
                            self.safe_message,
                            details,
                            env_vars
                                .iter()
                                .map(|(k, v)| format!("{k}={v}"))
                                .collect::<Vec<String>>()
                                .join(" "),
                        )
                    }
                },
            },
        }
    }
}

impl From<CommandError> for EventMessage {
    fn from(e: CommandError) -> Self {
        EventMessage {
            safe_message: e.message_safe(),
            full_details: e.message_raw(),
            env_vars: e.env_vars(),
        }
    }
}

impl Display for EventMessage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message(EventMessageVerbosity::SafeOnly).as_str()) // By default, expose only the safe message.
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Stage: the automation stage an event belongs to.
pub enum Stage {
    /// General: shared across every stage (input validation, system requirements).
    General(GeneralStep),
    /// Credentials: loading and validating the service account.
    Credentials(CredentialsStep),
    /// Provisioning: bucket creation and image deployment.
    Provisioning(ProvisioningStep),
    /// Testing: test suite run, report generation and upload.
    Testing(TestingStep),
    /// Reclaim: deletion of every tracked resource.
    Reclaim(ReclaimStep),
}

impl Stage {
    /// Returns stage's sub step name.
    pub fn sub_step_name(&self) -> String {
        match &self {
            Stage::General(step) => step.to_string(),
            Stage::Credentials(step) => step.to_string(),
            Stage::Provisioning(step) => step.to_string(),
            Stage::Testing(step) => step.to_string(),
            Stage::Reclaim(step) => step.to_string(),
        }
    }
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        f.write_str(match &self {
            Stage::General(_) => "general",
            Stage::Credentials(_) => "credentials",
            Stage::Provisioning(_) => "provisioning",
            Stage::Testing(_) => "testing",
            Stage::Reclaim(_) => "reclaim",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneralStep {
    ValidateInput,
    ValidateSystemRequirements,
    LoadResourceLog,
    SaveResourceLog,
}

impl Display for GeneralStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match &self {
            GeneralStep::ValidateInput => "validate-input",
            GeneralStep::ValidateSystemRequirements => "validate-system-requirements",
            GeneralStep::LoadResourceLog => "load-resource-log",
            GeneralStep::SaveResourceLog => "save-resource-log",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsStep {
    Load,
    Verify,
    Verified,
}

impl Display for CredentialsStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match &self {
            CredentialsStep::Load => "load",
            CredentialsStep::Verify => "verify",
            CredentialsStep::Verified => "verified",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningStep {
    CreateBucket,
    CreateRepository,
    BuildImage,
    PushImage,
    DeployService,
    WaitForService,
    Provisioned,
}

impl Display for ProvisioningStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match &self {
            ProvisioningStep::CreateBucket => "create-bucket",
            ProvisioningStep::CreateRepository => "create-repository",
            ProvisioningStep::BuildImage => "build-image",
            ProvisioningStep::PushImage => "push-image",
            ProvisioningStep::DeployService => "deploy-service",
            ProvisioningStep::WaitForService => "wait-for-service",
            ProvisioningStep::Provisioned => "provisioned",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestingStep {
    RunSuite,
    CaptureScreenshot,
    GenerateReport,
    UploadArtifacts,
}

impl Display for TestingStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match &self {
            TestingStep::RunSuite => "run-suite",
            TestingStep::CaptureScreenshot => "capture-screenshot",
            TestingStep::GenerateReport => "generate-report",
            TestingStep::UploadArtifacts => "upload-artifacts",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReclaimStep {
    DeleteService,
    DeleteImage,
    DeleteRepository,
    DeleteBucket,
    Reclaimed,
    ReclaimError,
}

impl Display for ReclaimStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match &self {
            ReclaimStep::DeleteService => "delete-service",
            ReclaimStep::DeleteImage => "delete-image",
            ReclaimStep::DeleteRepository => "delete-repository",
            ReclaimStep::DeleteBucket => "delete-bucket",
            ReclaimStep::Reclaimed => "reclaimed",
            ReclaimStep::ReclaimError => "reclaim-error",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Transmitter: represents the event's source caller (transmitter).
pub enum Transmitter {
    /// TaskManager: the command being run (init, setup, reset).
    TaskManager(String),
    /// DeploymentTarget: where the container image runs.
    DeploymentTarget(String),
    /// TestRunner: the test suite runner.
    TestRunner,
}

impl Display for Transmitter {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match &self {
                Transmitter::TaskManager(command) => format!("task_manager({command})"),
                Transmitter::DeploymentTarget(name) => format!("deployment_target({name})"),
                Transmitter::TestRunner => "test_runner".to_string(),
            }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// EventDetails: represents an event details, carrying all useful data such as project ID, execution ID, etc.
pub struct EventDetails {
    project_id: String,
    execution_id: ExecutionId,
    stage: Stage,
    transmitter: Transmitter,
}

impl EventDetails {
    pub fn new(project_id: String, execution_id: ExecutionId, stage: Stage, transmitter: Transmitter) -> Self {
        EventDetails {
            project_id,
            execution_id,
            stage,
            transmitter,
        }
    }

    /// Clones these details while moving to another stage.
    pub fn clone_changing_stage(event_details: &EventDetails, stage: Stage) -> Self {
        let mut event_details = event_details.clone();
        event_details.stage = stage;
        event_details
    }

    /// Clones these details while changing the transmitter.
    pub fn clone_changing_transmitter(event_details: &EventDetails, transmitter: Transmitter) -> Self {
        let mut event_details = event_details.clone();
        event_details.transmitter = transmitter;
        event_details
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn execution_id(&self) -> &ExecutionId {
        &self.execution_id
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn transmitter(&self) -> &Transmitter {
        &self.transmitter
    }
}
