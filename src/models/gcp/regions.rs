use crate::models::ToCloudProviderFormat;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use strum_macros::EnumIter;

/// Regions where both Cloud Run and Artifact Registry are available.
#[derive(PartialEq, Eq, Debug, Clone, Copy, EnumIter, Hash, Default)]
pub enum GcpRegion {
    #[default]
    UsCentral1,
    UsEast1,
    UsEast4,
    UsWest1,
    EuropeWest1,
    EuropeWest4,
    EuropeWest9,
    AsiaEast1,
    AsiaNortheast1,
}

impl GcpRegion {
    pub fn as_str(&self) -> &'static str {
        match self {
            GcpRegion::UsCentral1 => "us-central1",
            GcpRegion::UsEast1 => "us-east1",
            GcpRegion::UsEast4 => "us-east4",
            GcpRegion::UsWest1 => "us-west1",
            GcpRegion::EuropeWest1 => "europe-west1",
            GcpRegion::EuropeWest4 => "europe-west4",
            GcpRegion::EuropeWest9 => "europe-west9",
            GcpRegion::AsiaEast1 => "asia-east1",
            GcpRegion::AsiaNortheast1 => "asia-northeast1",
        }
    }

    /// Artifact Registry docker host for this region.
    pub fn docker_registry_host(&self) -> String {
        format!("{}-docker.pkg.dev", self.as_str())
    }
}

impl ToCloudProviderFormat for GcpRegion {
    fn to_cloud_provider_format(&self) -> &str {
        self.as_str()
    }
}

impl Display for GcpRegion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GcpRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "us-central1" => Ok(GcpRegion::UsCentral1),
            "us-east1" => Ok(GcpRegion::UsEast1),
            "us-east4" => Ok(GcpRegion::UsEast4),
            "us-west1" => Ok(GcpRegion::UsWest1),
            "europe-west1" => Ok(GcpRegion::EuropeWest1),
            "europe-west4" => Ok(GcpRegion::EuropeWest4),
            "europe-west9" => Ok(GcpRegion::EuropeWest9),
            "asia-east1" => Ok(GcpRegion::AsiaEast1),
            "asia-northeast1" => Ok(GcpRegion::AsiaNortheast1),
            _ => Err(format!("Unknown region: `{s}`.")),
        }
    }
}

impl Serialize for GcpRegion {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GcpRegion {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        GcpRegion::from_str(&raw).map_err(serde::de::Error::custom)
    }
}
