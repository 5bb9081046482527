use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Bridge map loaded from JSON: which serial port reaches which device.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub bridges: Vec<BridgeConfig>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BridgeConfig {
    /// BLE MAC address of the controller behind this bridge
    pub device_address: String,
    /// Serial port of the BLE-UART bridge
    pub port: String,
    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,
}

fn default_baud_rate() -> u32 {
    115200
}

impl Config {
    pub fn load(path: &Path) -> Result<Config> {
        let data = fs::read_to_string(path)
            .context(format!("Failed to read config {}", path.display()))?;
        let config = serde_json::from_str(&data)
            .context(format!("Failed to parse config {}", path.display()))?;
        Ok(config)
    }

    /// Case-insensitive lookup by device address.
    pub fn bridge_for(&self, device_address: &str) -> Option<&BridgeConfig> {
        self.bridges
            .iter()
            .find(|bridge| bridge.device_address.eq_ignore_ascii_case(device_address))
    }
}
