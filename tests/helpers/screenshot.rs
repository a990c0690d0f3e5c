use gcp_automation::test_runner::screenshot::{ScreenshotError, Screenshotter};
use std::path::Path;
use std::sync::{Arc, Mutex};
use url::Url;

/// PNG signature, enough for a file to be recognized as an image.
pub const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a];

/// Records every requested capture; clones share the record.
#[derive(Clone, Default)]
pub struct RecordingScreenshotter {
    captured: Arc<Mutex<Vec<Url>>>,
    failing: bool,
}

impl RecordingScreenshotter {
    pub fn failing() -> Self {
        RecordingScreenshotter {
            failing: true,
            ..Default::default()
        }
    }

    pub fn captured(&self) -> Vec<Url> {
        self.captured.lock().unwrap().clone()
    }
}

impl Screenshotter for RecordingScreenshotter {
    fn name(&self) -> &str {
        "recording"
    }

    fn capture(&self, url: &Url, destination: &Path) -> Result<(), ScreenshotError> {
        self.captured.lock().unwrap().push(url.clone());
        if self.failing {
            return Err(ScreenshotError::CaptureFailed {
                url: url.to_string(),
                raw_error_message: "browser crashed".to_string(),
            });
        }

        std::fs::write(destination, PNG_BYTES).map_err(|e| ScreenshotError::CaptureFailed {
            url: url.to_string(),
            raw_error_message: e.to_string(),
        })
    }
}
