pub mod artifact_registry_service;
pub mod auth_service;
pub mod cloud_run_service;
pub mod google_cloud_sdk_types;
pub mod object_storage_regions;
pub mod object_storage_service;
