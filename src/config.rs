use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default = "default_device_name_filter")]
    pub device_name_filter: String,

    /// Advertised by the peripheral; only logged, never used to select.
    #[serde(default = "default_service_uuid")]
    pub service_uuid: Uuid,

    #[serde(default = "default_characteristic_uuid")]
    pub characteristic_uuid: Uuid,

    #[serde(default = "default_scan_secs")]
    pub scan_secs: u64,

    #[serde(default = "default_listen_secs")]
    pub listen_secs: u64,

    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,

    #[serde(default = "default_container")]
    pub container: String,

    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    #[serde(default = "default_channels")]
    pub channels: u16,
}

fn default_device_name_filter() -> String {
    "XIAO_S3_SENSE".to_string()
}

fn default_service_uuid() -> Uuid {
    Uuid::from_u128(0x0000FFF0_0000_1000_8000_00805F9B34FB)
}

fn default_characteristic_uuid() -> Uuid {
    Uuid::from_u128(0x0000FFF1_0000_1000_8000_00805F9B34FB)
}

fn default_scan_secs() -> u64 {
    5
}

fn default_listen_secs() -> u64 {
    180
}

fn default_output_path() -> PathBuf {
    PathBuf::from("received_audio.wav")
}

fn default_container() -> String {
    "raw".to_string()
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_channels() -> u16 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device_name_filter: default_device_name_filter(),
            service_uuid: default_service_uuid(),
            characteristic_uuid: default_characteristic_uuid(),
            scan_secs: default_scan_secs(),
            listen_secs: default_listen_secs(),
            output_path: default_output_path(),
            container: default_container(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
        }
    }
}

impl Config {
    /// Load configuration from ~/.config/ble-recorder/config.json, falling back
    /// to the built-in defaults when the file does not exist.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path(
            std::env::var("XDG_CONFIG_HOME").ok(),
            std::env::var("HOME").ok(),
        );
        Self::load_at(config_path)
    }

    fn load_at(config_path: Option<PathBuf>) -> Result<Self> {
        let Some(config_path) = config_path else {
            tracing::debug!("No config directory could be resolved, using defaults");
            return Ok(Self::default());
        };

        if !config_path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", config_path);
            return Ok(Self::default());
        }

        Self::load_from(&config_path)
    }

    fn load_from(config_path: &std::path::Path) -> Result<Self> {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;

        let config: Self = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;

        tracing::info!("Loaded config from {:?}", config_path);
        Ok(config)
    }

    /// Get the path to the configuration file, if a config directory exists
    fn config_path(xdg_config_home: Option<String>, home: Option<String>) -> Option<PathBuf> {
        let config_dir = match (xdg_config_home, home) {
            (Some(dir), _) => PathBuf::from(dir),
            (None, Some(home)) => PathBuf::from(home).join(".config"),
            (None, None) => return None,
        };

        Some(config_dir.join("ble-recorder").join("config.json"))
    }

    pub fn scan_duration(&self) -> Duration {
        Duration::from_secs(self.scan_secs)
    }

    pub fn listen_duration(&self) -> Duration {
        Duration::from_secs(self.listen_secs)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.device_name_filter.is_empty() {
            return Err(anyhow::anyhow!("device_name_filter cannot be empty"));
        }

        if self.scan_secs == 0 {
            return Err(anyhow::anyhow!("scan_secs must be greater than zero"));
        }

        if self.listen_secs == 0 {
            return Err(anyhow::anyhow!("listen_secs must be greater than zero"));
        }

        if !["raw", "wav"].contains(&self.container.as_str()) {
            return Err(anyhow::anyhow!("container must be one of: raw, wav"));
        }

        if self.sample_rate == 0 || self.channels == 0 {
            return Err(anyhow::anyhow!(
                "sample_rate and channels must be greater than zero"
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_device_firmware() {
        let config = Config::default();

        assert_eq!(config.device_name_filter, "XIAO_S3_SENSE");
        assert_eq!(
            config.characteristic_uuid,
            Uuid::parse_str("0000FFF1-0000-1000-8000-00805F9B34FB").unwrap()
        );
        assert_eq!(
            config.service_uuid,
            Uuid::parse_str("0000FFF0-0000-1000-8000-00805F9B34FB").unwrap()
        );
        assert_eq!(config.listen_duration(), Duration::from_secs(180));
        assert_eq!(config.output_path, PathBuf::from("received_audio.wav"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "listen_secs": 30, "container": "wav" }"#).unwrap();

        let config = Config::load_from(&path).unwrap();

        assert_eq!(config.listen_secs, 30);
        assert_eq!(config.container, "wav");
        assert_eq!(config.device_name_filter, "XIAO_S3_SENSE");
        assert_eq!(config.sample_rate, 16000);
    }

    #[test]
    fn test_config_path_resolution() {
        assert_eq!(
            Config::config_path(Some("/etc/xdg".to_string()), Some("/home/u".to_string())),
            Some(PathBuf::from("/etc/xdg/ble-recorder/config.json"))
        );
        assert_eq!(
            Config::config_path(None, Some("/home/u".to_string())),
            Some(PathBuf::from("/home/u/.config/ble-recorder/config.json"))
        );
        assert_eq!(Config::config_path(None, None), None);
    }

    #[test]
    fn test_no_config_dir_uses_defaults() {
        let config = Config::load_at(Config::config_path(None, None)).unwrap();

        assert_eq!(config.device_name_filter, "XIAO_S3_SENSE");
        assert_eq!(config.listen_secs, 180);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_config_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_at(Some(dir.path().join("config.json"))).unwrap();

        assert_eq!(config.output_path, PathBuf::from("received_audio.wav"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let config = Config {
            container: "flac".to_string(),
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            listen_secs: 0,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        let config = Config {
            device_name_filter: String::new(),
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }
}
