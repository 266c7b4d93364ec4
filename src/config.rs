//! Configuration file handling for budget-pet.
//!
//! The configuration file is stored at `$BUDGET_PET_HOME/config.json` and holds the backup
//! settings, the pet mood thresholds and the password hashing cost. The account directory and
//! every user's ledger live as JSON files in `$BUDGET_PET_HOME/data`.

use crate::backup::Backup;
use crate::credential::DEFAULT_HASH_ITERATIONS;
use crate::model::MoodThresholds;
use crate::store::FileStore;
use crate::{utils, Result};
use anyhow::{bail, ensure, Context};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "budget-pet";
const CONFIG_VERSION: u8 = 1;
const BACKUP_COPIES: u32 = 5;
const BACKUPS: &str = ".backups";
const DATA: &str = "data";
const CONFIG_JSON: &str = "config.json";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$BUDGET_PET_HOME` and from there it loads `$BUDGET_PET_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    backups: PathBuf,
    data: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its subdirectories and an initial `config.json` with default
    /// settings.
    ///
    /// # Errors
    /// - Returns an error if `config.json` already exists.
    /// - Returns an error if any file operations fail.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        Self::create_with(dir, ConfigFile::default())
    }

    pub(crate) fn create_with(dir: impl Into<PathBuf>, config_file: ConfigFile) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative).context("Unable to create the budget-pet home directory")?;
        let root = utils::canonicalize(&maybe_relative)?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A configuration already exists at '{}'",
                config_path.display()
            );
        }

        let backups = root.join(BACKUPS);
        utils::make_dir(&backups)?;
        let data = root.join(DATA);
        utils::make_dir(&data)?;

        config_file.validate()?;
        config_file.save(&config_path)?;

        Ok(Self {
            root,
            backups,
            data,
            config_path,
            config_file,
        })
    }

    /// This will
    /// - validate that the home directory and the config file exist
    /// - load and validate the config file
    /// - validate that the backups and data directories exist
    pub fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .context("The budget-pet home is missing, run 'budget-pet init'")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run 'budget-pet init'",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path)?;

        let config = Self {
            root: root.clone(),
            backups: root.join(BACKUPS),
            data: root.join(DATA),
            config_path,
            config_file,
        };
        if !config.backups.is_dir() {
            bail!(
                "The backups directory is missing '{}'",
                config.backups.display()
            )
        }
        if !config.data.is_dir() {
            bail!("The data directory is missing '{}'", config.data.display())
        }
        Ok(config)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn backups(&self) -> &Path {
        &self.backups
    }

    pub fn data(&self) -> &Path {
        &self.data
    }

    pub fn backup_copies(&self) -> u32 {
        self.config_file.backup_copies
    }

    pub fn hash_iterations(&self) -> u32 {
        self.config_file.hash_iterations
    }

    pub fn thresholds(&self) -> MoodThresholds {
        MoodThresholds {
            low_balance_ratio: self.config_file.low_balance_ratio,
            good_progress_ratio: self.config_file.good_progress_ratio,
        }
    }

    /// Opens the key-value store in the data directory.
    pub fn store(&self) -> Result<FileStore> {
        FileStore::open(&self.data)
    }

    /// Creates a new `Backup` instance for managing backup files.
    pub fn backup(&self) -> Backup {
        Backup::new(self)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "budget-pet",
///   "config_version": 1,
///   "backup_copies": 5,
///   "low_balance_ratio": "0.2",
///   "good_progress_ratio": "0.5",
///   "hash_iterations": 100000
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub(crate) struct ConfigFile {
    /// Application name, should always be "budget-pet"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Number of backup copies to keep per user
    #[serde(default = "default_backup_copies")]
    backup_copies: u32,

    /// A balance below this share of income makes the pet wary
    #[serde(default = "default_low_balance_ratio")]
    low_balance_ratio: Decimal,

    /// Goal progress at or above this share of the total target makes the pet happy
    #[serde(default = "default_good_progress_ratio")]
    good_progress_ratio: Decimal,

    /// PBKDF2 iterations for new password hashes
    #[serde(default = "default_hash_iterations")]
    hash_iterations: u32,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            backup_copies: BACKUP_COPIES,
            low_balance_ratio: default_low_balance_ratio(),
            good_progress_ratio: default_good_progress_ratio(),
            hash_iterations: DEFAULT_HASH_ITERATIONS,
        }
    }
}

fn default_backup_copies() -> u32 {
    BACKUP_COPIES
}

fn default_low_balance_ratio() -> Decimal {
    MoodThresholds::default().low_balance_ratio
}

fn default_good_progress_ratio() -> Decimal {
    MoodThresholds::default().good_progress_ratio
}

fn default_hash_iterations() -> u32 {
    DEFAULT_HASH_ITERATIONS
}

impl ConfigFile {
    /// Loads and validates a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read, parsed or fails validation
    pub(crate) fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let config: ConfigFile = utils::deserialize(path)?;
        config
            .validate()
            .with_context(|| format!("Invalid config file at {}", path.display()))?;
        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    pub(crate) fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data).context("Unable to write config file")
    }

    fn validate(&self) -> Result<()> {
        ensure!(
            self.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            self.app_name
        );
        for (name, ratio) in [
            ("low_balance_ratio", self.low_balance_ratio),
            ("good_progress_ratio", self.good_progress_ratio),
        ] {
            ensure!(
                ratio >= Decimal::ZERO && ratio <= Decimal::ONE,
                "{name} must be between 0 and 1, got {ratio}"
            );
        }
        ensure!(self.hash_iterations > 0, "hash_iterations must be positive");
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn with_hash_iterations(mut self, hash_iterations: u32) -> Self {
        self.hash_iterations = hash_iterations;
        self
    }

    #[cfg(test)]
    pub(crate) fn with_backup_copies(mut self, backup_copies: u32) -> Self {
        self.backup_copies = backup_copies;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_create() {
        let dir = TempDir::new().unwrap();
        let home_dir = dir.path().join("budget_home");

        let config = Config::create(&home_dir).unwrap();

        assert!(config.backups().is_dir());
        assert!(config.data().is_dir());
        assert!(config.config_path().is_file());
        assert_eq!(config.backup_copies(), 5);
        assert_eq!(config.thresholds(), MoodThresholds::default());
        assert_eq!(config.hash_iterations(), DEFAULT_HASH_ITERATIONS);
    }

    #[test]
    fn test_config_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path()).unwrap();
        let err = Config::create(dir.path()).unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }

    #[test]
    fn test_config_load() {
        let dir = TempDir::new().unwrap();
        let created = Config::create(dir.path()).unwrap();
        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(created.root(), loaded.root());
        assert_eq!(created.config_file, loaded.config_file);
    }

    #[test]
    fn test_config_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path().join("nope"));
        assert!(result.is_err());
    }

    #[test]
    fn test_config_load_missing_data_dir() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path()).unwrap();
        std::fs::remove_dir(config.data()).unwrap();
        let err = Config::load(dir.path()).unwrap_err();
        assert!(err.to_string().contains("data directory"));
    }

    #[test]
    fn test_config_file_load_with_minimal_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "budget-pet",
            "config_version": 1
        }"#;
        std::fs::write(&config_path, json).unwrap();

        let config = ConfigFile::load(&config_path).unwrap();
        assert_eq!(config, ConfigFile::default());
    }

    #[test]
    fn test_config_file_load_invalid_app_name() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "wrong_app",
            "config_version": 1
        }"#;
        std::fs::write(&config_path, json).unwrap();

        let result = ConfigFile::load(&config_path);
        assert!(result.is_err());
        assert!(format!("{:#}", result.unwrap_err()).contains("Invalid app_name"));
    }

    #[test]
    fn test_config_file_rejects_out_of_range_ratio() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let json = r#"{
            "app_name": "budget-pet",
            "config_version": 1,
            "low_balance_ratio": "1.5"
        }"#;
        std::fs::write(&config_path, json).unwrap();

        let err = ConfigFile::load(&config_path).unwrap_err();
        assert!(format!("{err:#}").contains("low_balance_ratio"));
    }

    #[test]
    fn test_config_file_save_and_load() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.json");
        let original = ConfigFile::default()
            .with_backup_copies(9)
            .with_hash_iterations(1000);
        original.save(&config_path).unwrap();
        let loaded = ConfigFile::load(&config_path).unwrap();
        assert_eq!(original, loaded);
    }
}
