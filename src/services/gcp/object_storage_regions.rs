use crate::models::ToCloudProviderFormat;
use crate::models::gcp::regions::GcpRegion;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Bucket location: a multi-region or a single region.
#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash, Default)]
pub enum GcpStorageRegion {
    #[default]
    Us,
    Eu,
    Asia,
    Region(GcpRegion),
}

impl From<GcpRegion> for GcpStorageRegion {
    fn from(value: GcpRegion) -> Self {
        GcpStorageRegion::Region(value)
    }
}

impl ToCloudProviderFormat for GcpStorageRegion {
    fn to_cloud_provider_format(&self) -> &str {
        match self {
            GcpStorageRegion::Us => "US",
            GcpStorageRegion::Eu => "EU",
            GcpStorageRegion::Asia => "ASIA",
            GcpStorageRegion::Region(region) => region.as_str(),
        }
    }
}

impl Display for GcpStorageRegion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        // Google returns bucket locations upper-cased
        f.write_str(self.to_cloud_provider_format().to_uppercase().as_str())
    }
}

impl FromStr for GcpStorageRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "US" => Ok(GcpStorageRegion::Us),
            "EU" => Ok(GcpStorageRegion::Eu),
            "ASIA" => Ok(GcpStorageRegion::Asia),
            other => GcpRegion::from_str(other)
                .map(GcpStorageRegion::Region)
                .map_err(|_| format!("Unknown storage region: `{s}`.")),
        }
    }
}
