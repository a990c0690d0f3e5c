#[macro_use]
extern crate tracing;

pub mod cmd;
pub mod config;
pub mod deployment;
pub mod errors;
pub mod events;
pub mod initializer;
pub mod logger;
pub mod models;
pub mod object_storage;
pub mod provisioner;
pub mod reclaimer;
pub mod resource_log;
mod runtime;
pub mod services;
pub mod test_runner;
pub mod uploader;
