use crate::cmd::command::{CommandError, CommandKiller, ExternalCommand, does_binary_exist};
use std::fs;
use std::path::Path;
use std::time::Duration;
use url::Url;

/// Binaries tried, in order, when no browser is explicitly configured.
pub const DEFAULT_BROWSER_BINARIES: [&str; 4] = ["chromium", "chromium-browser", "google-chrome", "google-chrome-stable"];

#[derive(thiserror::Error, Debug)]
pub enum ChromeError {
    #[error("No headless browser found, tried: {0}")]
    BrowserNotFound(String),

    #[error("Browser `{binary}` failed to capture `{url}`: {raw_error_message}")]
    CaptureFailed {
        binary: String,
        url: String,
        raw_error_message: String,
    },
}

#[derive(Debug, Clone)]
pub struct HeadlessChrome {
    binary: String,
    window_size: (u32, u32),
    timeout: Duration,
}

impl HeadlessChrome {
    pub fn new(binary: &str) -> Self {
        HeadlessChrome {
            binary: binary.to_string(),
            window_size: (1920, 1080),
            timeout: Duration::from_secs(60),
        }
    }

    /// Picks the configured binary if any, otherwise the first default one installed.
    pub fn find(configured_binary: Option<&str>) -> Result<Self, ChromeError> {
        let candidates: Vec<&str> = match configured_binary {
            Some(binary) => vec![binary],
            None => DEFAULT_BROWSER_BINARIES.to_vec(),
        };

        candidates
            .iter()
            .find(|binary| does_binary_exist(binary))
            .map(|binary| HeadlessChrome::new(binary))
            .ok_or_else(|| ChromeError::BrowserNotFound(candidates.join(", ")))
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    fn screenshot_args(&self, url: &Url, destination: &Path) -> Vec<String> {
        vec![
            "--headless".to_string(),
            "--no-sandbox".to_string(),
            "--disable-gpu".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--hide-scrollbars".to_string(),
            format!("--window-size={},{}", self.window_size.0, self.window_size.1),
            format!("--screenshot={}", destination.display()),
            url.to_string(),
        ]
    }

    pub fn screenshot(&self, url: &Url, destination: &Path) -> Result<(), ChromeError> {
        let args = self.screenshot_args(url, destination);
        let mut cmd = ExternalCommand::new(
            &self.binary,
            &args.iter().map(|x| x.as_str()).collect::<Vec<&str>>(),
            &[],
        );

        let to_capture_error = |raw_error_message: String| ChromeError::CaptureFailed {
            binary: self.binary.to_string(),
            url: url.to_string(),
            raw_error_message,
        };

        // a file left by an earlier run must not pass for this capture
        if destination.exists() {
            fs::remove_file(destination).map_err(|e| {
                to_capture_error(format!("cannot remove previous screenshot `{}`: {e}", destination.display()))
            })?;
        }

        cmd.exec_with_abort(
            &mut |line| debug!("{}", line),
            &mut |line| debug!("{}", line),
            &CommandKiller::from_timeout(self.timeout),
        )
        .map_err(|e: CommandError| to_capture_error(e.to_string()))?;

        // chrome exits successfully on some rendering errors without writing anything
        if !destination.is_file() {
            return Err(to_capture_error(format!(
                "screenshot file `{}` has not been written",
                destination.display()
            )));
        }

        Ok(())
    }
}
