// live tests, they need a real project
#[cfg(feature = "test-gcp-minimal")]
mod gcp_artifact_registry_service;
#[cfg(feature = "test-gcp-minimal")]
mod gcp_object_storage;
