use crate::errors::{CommandError, EngineError};
use crate::events::{EngineEvent, EventDetails, EventMessage, Stage, TestingStep};
use crate::logger::Logger;
use crate::object_storage::{BucketObject, ObjectStorage};
use crate::test_runner::report::{REPORT_FILE_NAME, SCREENSHOTS_DIR_NAME, TestReport};
use std::path::{Path, PathBuf};

/// Pushes the report and its screenshots to the provisioned bucket.
pub struct Uploader<'a> {
    object_storage: &'a dyn ObjectStorage,
    logger: Box<dyn Logger>,
    event_details: EventDetails,
}

impl<'a> Uploader<'a> {
    pub fn new(object_storage: &'a dyn ObjectStorage, logger: Box<dyn Logger>, event_details: &EventDetails) -> Self {
        Uploader {
            object_storage,
            logger,
            event_details: EventDetails::clone_changing_stage(event_details, Stage::Testing(TestingStep::UploadArtifacts)),
        }
    }

    /// `report.html` lands under `report.html`, each screenshot recorded in the report under `screenshots/<file>`.
    pub fn upload(
        &self,
        bucket_name: &str,
        output_dir: &Path,
        report: &TestReport,
    ) -> Result<Vec<BucketObject>, EngineError> {
        let report_path = output_dir.join(REPORT_FILE_NAME);
        if !report_path.is_file() {
            return Err(EngineError::new_report_not_found(self.event_details.clone(), &report_path));
        }

        let mut artifacts: Vec<(String, PathBuf)> = vec![(REPORT_FILE_NAME.to_string(), report_path)];
        artifacts.extend(report.screenshots().into_iter().map(|path| (object_key(path), path.to_path_buf())));

        self.logger.log(EngineEvent::Debug(
            self.event_details.clone(),
            EventMessage::new_from_safe(format!(
                "Uploading {} artifacts to `{}` with {} ({})",
                artifacts.len(),
                bucket_name,
                self.object_storage.name(),
                self.object_storage.id()
            )),
        ));

        let mut uploaded = Vec::with_capacity(artifacts.len());
        for (object_key, file_path) in artifacts {
            let object = self
                .object_storage
                .put_object(bucket_name, &object_key, &file_path)
                .map_err(|e| {
                    EngineError::new_cannot_upload_artifact(
                        self.event_details.clone(),
                        bucket_name,
                        &object_key,
                        CommandError::from(e),
                    )
                })?;

            self.logger.log(EngineEvent::Info(
                self.event_details.clone(),
                EventMessage::new_from_safe(format!("Uploaded gs://{}/{} ({} bytes)", bucket_name, object.key, object.size)),
            ));
            uploaded.push(object);
        }

        Ok(uploaded)
    }
}

fn object_key(screenshot: &Path) -> String {
    let file_name = screenshot.file_name().unwrap_or_default().to_string_lossy();
    format!("{SCREENSHOTS_DIR_NAME}/{file_name}")
}
