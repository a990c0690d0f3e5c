pub mod gcp;

use std::fmt::{Display, Formatter};
use uuid::Uuid;

pub trait ToCloudProviderFormat {
    /// Returns cloud provider string representation.
    fn to_cloud_provider_format(&self) -> &str;
}

/// Identifier of one tool invocation, its short form names the resources created during the run.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ExecutionId {
    long_id: Uuid,
    short: String,
}

impl ExecutionId {
    pub fn new(long_id: Uuid) -> Self {
        ExecutionId {
            long_id,
            short: to_short_id(&long_id),
        }
    }

    pub fn new_random() -> Self {
        Self::new(Uuid::new_v4())
    }

    pub fn short(&self) -> &str {
        &self.short
    }
}

impl Default for ExecutionId {
    fn default() -> Self {
        ExecutionId::new_random()
    }
}

impl Display for ExecutionId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.long_id.to_string().as_str())
    }
}

/// First 8 hex chars of the uuid.
pub fn to_short_id(id: &Uuid) -> String {
    id.simple().to_string()[..8].to_string()
}
