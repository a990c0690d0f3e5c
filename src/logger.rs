use crate::events::{EngineEvent, EventMessageVerbosity};
use tracing;

#[derive(Debug, Clone)]
pub enum LogLevel {
    Debug,
    Info,
    Warning,
    Error,
}

pub trait Logger: Send + Sync {
    fn log(&self, event: EngineEvent);
    fn clone_dyn(&self) -> Box<dyn Logger>;
}

impl Clone for Box<dyn Logger> {
    fn clone(&self) -> Self {
        self.clone_dyn()
    }
}

impl From<&EngineEvent> for LogLevel {
    fn from(event: &EngineEvent) -> Self {
        match event {
            EngineEvent::Debug(_, _) => LogLevel::Debug,
            EngineEvent::Info(_, _) => LogLevel::Info,
            EngineEvent::Warning(_, _) => LogLevel::Warning,
            EngineEvent::Error(_, _) => LogLevel::Error,
        }
    }
}

/// Forwards events to `tracing`, the subscriber installed by the binary decides where they go.
#[derive(Clone, Default)]
pub struct StdIoLogger {}

impl StdIoLogger {
    pub fn new() -> StdIoLogger {
        StdIoLogger {}
    }
}

impl Logger for StdIoLogger {
    fn log(&self, event: EngineEvent) {
        let event_details = event.get_details();
        let stage = event_details.stage();
        let execution_id = event_details.execution_id().to_string();

        tracing::span!(
            tracing::Level::INFO,
            "std_io_logger",
            execution_id = execution_id.as_str(),
            project_id = event_details.project_id(),
            stage = stage.to_string().as_str(),
            step = stage.sub_step_name().as_str(),
            transmitter = event_details.transmitter().to_string().as_str(),
        )
        .in_scope(|| {
            // env vars may hold access tokens, they never reach the logs
            let message = event.message(EventMessageVerbosity::FullDetailsWithoutEnvVars);
            match LogLevel::from(&event) {
                LogLevel::Debug => debug!("{}", message),
                LogLevel::Info => info!("{}", message),
                LogLevel::Warning => warn!("{}", message),
                LogLevel::Error => error!("{}", message),
            };
        });
    }

    fn clone_dyn(&self) -> Box<dyn Logger> {
        Box::new(self.clone())
    }
}
