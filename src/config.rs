use std::{fs, path::Path, path::PathBuf};

use derivative::Derivative;
use serde::{Deserialize, Serialize};

use crate::registers::{HARDWARE_REVISION, SOFTWARE_REVISION};

/// Settings for the interaction device itself, not the emulator config it switches between.
#[derive(Derivative, Serialize, Deserialize, Clone)]
#[derivative(Debug, Default, PartialEq)]
#[serde(default)]
pub struct DeviceConfig {
    /// Active emulator config file until the guest loads another one.
    #[derivative(Default(value = "PathBuf::from(\"default.cfg\")"))]
    pub default_config_file: PathBuf,
    /// Longest guest string accepted for a pointer argument, terminator included.
    #[derivative(Default(value = "255"))]
    pub max_string_len: usize,
    #[derivative(Default(value = "HARDWARE_REVISION"))]
    pub hardware_revision: u32,
    #[derivative(Default(value = "SOFTWARE_REVISION"))]
    pub software_revision: u32,
}

impl DeviceConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config = serde_json::from_str(&contents)?;
        tracing::info!("[PISTORM-DEV] Loaded device config {:?}", path.as_ref());
        Ok(config)
    }
}
