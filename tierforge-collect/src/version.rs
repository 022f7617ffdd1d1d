//! Content version targeting

use crate::client::PacedSource;
use crate::error::{CollectError, Result};
use std::fmt;
use tierforge_common::models::patch_of;
use tracing::{info, warn};

/// The `major.minor` version a crawl collects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetVersion(String);

impl TargetVersion {
    /// Parse any version string down to its `major.minor` prefix
    pub fn parse(version: &str) -> Option<Self> {
        patch_of(version).map(TargetVersion)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Compares whole components, so `14.1` does not accept `14.10.x`
    pub fn matches(&self, version: &str) -> bool {
        patch_of(version).as_deref() == Some(self.0.as_str())
    }
}

impl fmt::Display for TargetVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Configured version if any, else the newest upstream version
pub async fn resolve_target_version(
    source: &PacedSource,
    configured: Option<&str>,
) -> Result<TargetVersion> {
    if let Some(configured) = configured {
        return TargetVersion::parse(configured).ok_or(CollectError::NoTargetVersion);
    }

    let versions = match source.versions().await {
        Ok(versions) => versions,
        Err(e) if e.is_fatal() => return Err(CollectError::Fatal(e)),
        Err(e) => {
            warn!(error = %e, "Could not fetch version list");
            return Err(CollectError::NoTargetVersion);
        }
    };

    let target = versions
        .first()
        .and_then(|newest| TargetVersion::parse(newest))
        .ok_or(CollectError::NoTargetVersion)?;
    info!(target = %target, "Resolved target version");
    Ok(target)
}
