use std::path::{Path, PathBuf};

use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,
    pub control: ControlConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub refresh_interval_secs: u64,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            refresh_interval_secs: 5,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Delay between the stop and start steps of a service restart.
    pub restart_settle_ms: u64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        ControlConfig {
            restart_settle_ms: 1000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Widest cell rendered in the CLI tables before truncation.
    pub max_cell_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig { max_cell_width: 40 }
    }
}

pub fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("hostwatch").join("config.toml"))
}

pub fn load_config() -> Config {
    match config_path() {
        Some(path) if path.exists() => load_config_from_path(&path),
        _ => Config::default(),
    }
}

pub fn load_config_from_path(path: &Path) -> Config {
    match std::fs::read_to_string(path) {
        Ok(contents) => toml::from_str(&contents).unwrap_or_default(),
        Err(_) => Config::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let config = Config::default();
        assert_eq!(config.general.refresh_interval_secs, 5);
        assert_eq!(config.control.restart_settle_ms, 1000);
        assert_eq!(config.output.max_cell_width, 40);
    }

    #[test]
    fn parse_partial_toml() {
        let toml_str = r#"
[general]
refresh_interval_secs = 30
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.refresh_interval_secs, 30);
        // Other sections fall back to defaults
        assert_eq!(config.control.restart_settle_ms, 1000);
        assert_eq!(config.output.max_cell_width, 40);
    }

    #[test]
    fn parse_full_toml() {
        let toml_str = r#"
[general]
refresh_interval_secs = 2

[control]
restart_settle_ms = 500

[output]
max_cell_width = 60
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.general.refresh_interval_secs, 2);
        assert_eq!(config.control.restart_settle_ms, 500);
        assert_eq!(config.output.max_cell_width, 60);
    }

    #[test]
    fn missing_file_returns_default() {
        let config = load_config_from_path(Path::new("/nonexistent/path/config.toml"));
        assert_eq!(config.general.refresh_interval_secs, 5);
    }

    #[test]
    fn invalid_toml_returns_default() {
        let temp = std::env::temp_dir().join("hostwatch_test_invalid.toml");
        std::fs::write(&temp, "this is not valid toml {{{{").unwrap();
        let config = load_config_from_path(&temp);
        assert_eq!(config.general.refresh_interval_secs, 5);
        let _ = std::fs::remove_file(&temp);
    }
}
