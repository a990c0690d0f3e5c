use anyhow::Context;
use clap::Parser;
use gcp_automation::cmd::chrome::HeadlessChrome;
use gcp_automation::cmd::command::does_binary_exist;
use gcp_automation::cmd::docker::Docker;
use gcp_automation::cmd::gcloud::Gcloud;
use gcp_automation::config::{Cli, Command, GlobalArgs, LogFormat};
use gcp_automation::deployment::cloud_run::CloudRun;
use gcp_automation::errors::{CommandError, EngineError};
use gcp_automation::events::{CredentialsStep, EngineEvent, EventDetails, EventMessage, GeneralStep, Stage, Transmitter};
use gcp_automation::initializer::{CredentialInitializer, ValidatedCredentials, verify_with_google_cloud};
use gcp_automation::logger::{Logger, StdIoLogger};
use gcp_automation::models::ExecutionId;
use gcp_automation::object_storage::google_object_storage::GoogleOS;
use gcp_automation::provisioner::Provisioner;
use gcp_automation::reclaimer::Reclaimer;
use gcp_automation::services::gcp::object_storage_service::ObjectStorageService;
use gcp_automation::test_runner::TestRunner;
use gcp_automation::test_runner::screenshot::Screenshotter;
use gcp_automation::uploader::Uploader;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

const EXIT_TESTS_FAILED: u8 = 3;

enum Outcome {
    Done,
    TestsFailed,
}

fn main() -> ExitCode {
    // usage errors exit with code 2
    let cli = Cli::parse();

    if let Err(e) = init_tracing(&cli.global) {
        eprintln!("{e:#}");
        return ExitCode::FAILURE;
    }

    let event_details = EventDetails::new(
        cli.command.credentials().project.to_string(),
        ExecutionId::new_random(),
        Stage::General(GeneralStep::ValidateInput),
        Transmitter::TaskManager(cli.command.name().to_string()),
    );
    let logger: Box<dyn Logger> = Box::new(StdIoLogger::new());

    match run(&cli, logger.clone(), &event_details) {
        Ok(Outcome::Done) => ExitCode::SUCCESS,
        Ok(Outcome::TestsFailed) => ExitCode::from(EXIT_TESTS_FAILED),
        Err(err) => {
            logger.log(EngineEvent::Error(*err, None));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(global: &GlobalArgs) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&global.log_level)
        .with_context(|| format!("invalid log level `{}`", global.log_level))?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);

    match global.log_format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().with_current_span(true).try_init(),
    }
    .map_err(|e| anyhow::anyhow!(e))
    .context("cannot install the tracing subscriber")
}

fn system_requirements_error(event_details: &EventDetails, message: String) -> Box<EngineError> {
    Box::new(EngineError::new_invalid_configuration(
        EventDetails::clone_changing_stage(event_details, Stage::General(GeneralStep::ValidateSystemRequirements)),
        message,
    ))
}

fn run(cli: &Cli, logger: Box<dyn Logger>, event_details: &EventDetails) -> Result<Outcome, Box<EngineError>> {
    let global = &cli.global;
    let credentials_args = cli.command.credentials();

    if !does_binary_exist("gcloud") {
        return Err(system_requirements_error(
            event_details,
            "`gcloud` is not installed or not in PATH.".to_string(),
        ));
    }

    // the storage client is built from the key file before it is verified, it does the verification
    let initializer = CredentialInitializer::new(logger.clone(), event_details);
    let credentials_file = initializer.load(&credentials_args.creds, &credentials_args.project)?;
    let storage_service = ObjectStorageService::new(credentials_file.credentials()).map_err(|e| {
        EngineError::new_credentials_invalid(
            EventDetails::clone_changing_stage(event_details, Stage::Credentials(CredentialsStep::Load)),
            CommandError::new(
                "Cannot create the Cloud Storage client.".to_string(),
                Some(e.to_string()),
                None,
            ),
        )
    })?;
    let object_storage = GoogleOS::new(
        event_details.execution_id().short(),
        "Google Cloud Storage",
        &credentials_args.project,
        global.bucket_location,
        Arc::new(storage_service),
    );
    let gcloud = Gcloud::new(&credentials_args.project);

    let credentials = initializer.initialize(&credentials_args.creds, &credentials_args.project, |file| {
        verify_with_google_cloud(&gcloud, file, &object_storage)
    })?;

    match &cli.command {
        Command::Init(_) => Ok(Outcome::Done),
        Command::Setup(setup) => {
            global
                .validate_context_dir()
                .map_err(|message| system_requirements_error(event_details, message))?;
            let docker = Docker::new(None).map_err(|e| system_requirements_error(event_details, e.to_string()))?;
            let deployment_target = CloudRun::new(credentials.gcloud(), Some(docker), global.region, &global.repository);

            let test_runner = TestRunner::new(
                global.test_runner_config(setup),
                screenshotter(global, logger.as_ref(), event_details),
                logger.clone(),
                event_details.clone(),
            );
            let uploader = Uploader::new(&object_storage, logger.clone(), event_details);
            let provisioner = Provisioner::new(
                &credentials,
                &object_storage,
                &deployment_target,
                global.provisioner_config(),
                logger.clone(),
                event_details,
            );

            let outcome = provisioner.setup(&test_runner, &uploader)?;
            match setup.fail_on_test_failure && outcome.report.has_failures() {
                true => Ok(Outcome::TestsFailed),
                false => Ok(Outcome::Done),
            }
        }
        Command::Reset(_) => {
            reset(&credentials, &object_storage, global, logger, event_details)?;
            Ok(Outcome::Done)
        }
    }
}

fn reset(
    credentials: &ValidatedCredentials,
    object_storage: &GoogleOS,
    global: &GlobalArgs,
    logger: Box<dyn Logger>,
    event_details: &EventDetails,
) -> Result<(), Box<EngineError>> {
    // deleting needs no docker daemon
    let deployment_target = CloudRun::new(credentials.gcloud(), None, global.region, &global.repository);
    Reclaimer::new(object_storage, &deployment_target, &global.resource_log, logger, event_details).reclaim()?;
    Ok(())
}

fn screenshotter(
    global: &GlobalArgs,
    logger: &dyn Logger,
    event_details: &EventDetails,
) -> Option<Box<dyn Screenshotter>> {
    match HeadlessChrome::find(global.browser.as_deref()) {
        Ok(chrome) => Some(Box::new(chrome)),
        Err(e) => {
            logger.log(EngineEvent::Warning(
                EventDetails::clone_changing_stage(event_details, Stage::General(GeneralStep::ValidateSystemRequirements)),
                EventMessage::new_from_safe(format!("{e}, failures will have no screenshot")),
            ));
            None
        }
    }
}
