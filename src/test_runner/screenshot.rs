use crate::cmd::chrome::{ChromeError, HeadlessChrome};
use std::path::Path;
use thiserror::Error;
use url::Url;

#[derive(Clone, Error, Debug, PartialEq, Eq)]
pub enum ScreenshotError {
    #[error("Cannot capture `{url}`: {raw_error_message:?}.")]
    CaptureFailed { url: String, raw_error_message: String },
}

/// Renders a page into a PNG file.
pub trait Screenshotter {
    fn name(&self) -> &str;
    fn capture(&self, url: &Url, destination: &Path) -> Result<(), ScreenshotError>;
}

impl Screenshotter for HeadlessChrome {
    fn name(&self) -> &str {
        self.binary()
    }

    fn capture(&self, url: &Url, destination: &Path) -> Result<(), ScreenshotError> {
        self.screenshot(url, destination).map_err(|e| ScreenshotError::CaptureFailed {
            url: url.to_string(),
            raw_error_message: match e {
                ChromeError::BrowserNotFound(tried) => format!("no browser found, tried: {tried}"),
                ChromeError::CaptureFailed { raw_error_message, .. } => raw_error_message,
            },
        })
    }
}
