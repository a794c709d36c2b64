use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use studyplan::domain::StudyWindow;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: Option<String>,
    pub schedule: ScheduleConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Daily study window start, `HH:MM`
    pub study_window_start: String,
    /// Daily study window end, `HH:MM`
    pub study_window_end: String,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            study_window_start: "08:00".to_string(),
            study_window_end: "22:00".to_string(),
        }
    }
}

impl ScheduleConfig {
    pub fn study_window(&self) -> Result<StudyWindow> {
        StudyWindow::parse(&self.study_window_start, &self.study_window_end).context("Invalid schedule config")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("studyplan")
                .join("studyplan.db"),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Some("info".to_string()),
            schedule: ScheduleConfig::default(),
            storage: StorageConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        // If explicit config path provided, try to load it
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        let project_name = env!("CARGO_PKG_NAME");

        // Try primary location: ~/.config/<project>/<project>.yml
        if let Some(config_dir) = dirs::config_dir() {
            let primary_config = config_dir.join(project_name).join(format!("{}.yml", project_name));
            if primary_config.exists() {
                match Self::load_from_file(&primary_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => {
                        log::warn!("Failed to load config from {}: {}", primary_config.display(), e);
                    }
                }
            }
        }

        // Try fallback location: ./<project>.yml
        let fallback_config = PathBuf::from(format!("{}.yml", project_name));
        if fallback_config.exists() {
            match Self::load_from_file(&fallback_config) {
                Ok(config) => return Ok(config),
                Err(e) => {
                    log::warn!("Failed to load config from {}: {}", fallback_config.display(), e);
                }
            }
        }

        // No config file found, use defaults
        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;

        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;

        log::info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_level.as_deref(), Some("info"));
        assert_eq!(config.schedule.study_window().unwrap(), StudyWindow::default());
        assert!(config.storage.db_path.ends_with("studyplan/studyplan.db"));
    }

    #[test]
    fn test_load_partial_yaml_keeps_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("studyplan.yml");
        fs::write(&path, "schedule:\n  study_window_start: \"09:30\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.schedule.study_window_start, "09:30");
        assert_eq!(config.schedule.study_window_end, "22:00");
        assert_eq!(config.log_level.as_deref(), Some("info"));
    }

    #[test]
    fn test_load_storage_path() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("studyplan.yml");
        fs::write(&path, "storage:\n  db_path: /tmp/plans.db\nlog_level: debug\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.storage.db_path, PathBuf::from("/tmp/plans.db"));
        assert_eq!(config.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("missing.yml");
        assert!(Config::load(Some(&path)).is_err());
    }

    #[test]
    fn test_invalid_window_rejected() {
        let schedule = ScheduleConfig {
            study_window_start: "23:00".to_string(),
            study_window_end: "07:00".to_string(),
        };
        assert!(schedule.study_window().is_err());
    }
}
