pub mod chrome;
pub mod command;
pub mod docker;
pub mod gcloud;
