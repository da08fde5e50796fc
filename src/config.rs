use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::a11y::auditor::AuditConfig;
use crate::monitor::leak::LeakDetectorConfig;
use crate::monitor::performance::MonitorConfig;
use crate::monitor::tester::TesterConfig;
use crate::native::HostConfig;
use crate::surface::SurfaceConfig;

/// Top-level configuration. Every field is optional in the JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LumenConfig {
    pub monitor: MonitorConfig,
    pub leak: LeakDetectorConfig,
    pub tester: TesterConfig,
    pub audit: AuditConfig,
    pub host: HostConfig,
    pub surface: SurfaceConfig,
}

impl LumenConfig {
    pub fn from_json_str(raw: &str) -> Result<Self> {
        serde_json::from_str(raw).context("invalid lumen configuration")
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json_str(&raw).with_context(|| format!("failed to parse config {}", path.display()))
    }
}
