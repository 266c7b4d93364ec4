//! Rotating JSON backups of ledger snapshots.

use crate::store::encode_key;
use crate::{utils, Config, Result};
use anyhow::Context;
use chrono::{Local, NaiveDate};
use serde::Serialize;
use std::path::PathBuf;

/// Prefix for ledger backup files, followed by the username.
pub const LEDGER: &str = "ledger";

/// Manages backup file creation and rotation.
///
/// The `Backup` struct is immutable and owns copies of the paths and settings it needs.
/// Create a new instance via `Config::backup()` or `Backup::new()`.
#[derive(Debug, Clone)]
pub struct Backup {
    backups_dir: PathBuf,
    backup_copies: u32,
}

impl Backup {
    /// Creates a new `Backup` instance from a `Config`.
    pub fn new(config: &Config) -> Self {
        Self {
            backups_dir: config.backups().to_path_buf(),
            backup_copies: config.backup_copies(),
        }
    }

    /// The backup prefix used for a user's ledger. The username is encoded the way `FileStore`
    /// encodes keys, so it never contains `.` or a path separator.
    pub fn ledger_prefix(username: &str) -> String {
        format!("{LEDGER}-{}", encode_key(username))
    }

    /// Saves `data` as a pretty-printed JSON backup file.
    ///
    /// The filename format is `{prefix}.YYYY-MM-DD-NNN.json` where NNN is a sequence number.
    /// Automatically rotates old backups, keeping only `backup_copies` files.
    ///
    /// Returns the path to the created backup file.
    pub fn save_json<T>(&self, prefix: &str, data: &T) -> Result<PathBuf>
    where
        T: Serialize + ?Sized,
    {
        let date = today();
        let seq = self.next_sequence_number(prefix, &date)?;
        let filename = format!("{prefix}.{date}-{seq:03}.json");
        let path = self.backups_dir.join(&filename);

        let json = serde_json::to_string_pretty(data).context("Failed to serialize the backup")?;
        utils::write(&path, json)?;

        self.rotate(prefix)?;

        Ok(path)
    }

    /// Scans the backups directory for existing files with the given prefix and date,
    /// and returns the next sequence number.
    fn next_sequence_number(&self, prefix: &str, date: &str) -> Result<u32> {
        let max_seq = utils::file_names(&self.backups_dir)?
            .iter()
            .filter_map(|name| parse_sequence_number(name, prefix, date))
            .max()
            .unwrap_or(0);
        Ok(max_seq + 1)
    }

    /// Rotates old backup files, keeping only `backup_copies` files with the given prefix.
    fn rotate(&self, prefix: &str) -> Result<()> {
        let mut files: Vec<String> = utils::file_names(&self.backups_dir)?
            .into_iter()
            .filter(|name| is_backup_file(name, prefix))
            .collect();

        // Sort by filename (which sorts by date and sequence number due to format)
        files.sort();

        let to_delete = files.len().saturating_sub(self.backup_copies as usize);
        for name in files.into_iter().take(to_delete) {
            utils::remove(&self.backups_dir.join(name))?;
        }

        Ok(())
    }
}

/// Returns today's date in YYYY-MM-DD format.
fn today() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}

/// Parses the sequence number from a backup filename.
/// Returns None if the filename doesn't match `{prefix}.{date}-{NNN}.json`.
fn parse_sequence_number(filename: &str, prefix: &str, date: &str) -> Option<u32> {
    filename
        .strip_prefix(&format!("{prefix}.{date}-"))?
        .strip_suffix(".json")?
        .parse()
        .ok()
}

/// Checks if a filename is exactly `{prefix}.YYYY-MM-DD-NNN.json`.
fn is_backup_file(filename: &str, prefix: &str) -> bool {
    let Some(stamp) = filename
        .strip_prefix(prefix)
        .and_then(|rest| rest.strip_prefix('.'))
        .and_then(|rest| rest.strip_suffix(".json"))
    else {
        return false;
    };
    let Some((date, seq)) = stamp.rsplit_once('-') else {
        return false;
    };
    NaiveDate::parse_from_str(date, "%Y-%m-%d").is_ok()
        && !seq.is_empty()
        && seq.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFile;
    use tempfile::TempDir;

    #[test]
    fn test_parse_sequence_number() {
        assert_eq!(
            parse_sequence_number("ledger-sam.2025-12-14-001.json", "ledger-sam", "2025-12-14"),
            Some(1)
        );
        assert_eq!(
            parse_sequence_number("ledger-sam.2025-12-14-042.json", "ledger-sam", "2025-12-14"),
            Some(42)
        );
        // Wrong prefix
        assert_eq!(
            parse_sequence_number("ledger-sa.2025-12-14-001.json", "ledger-sam", "2025-12-14"),
            None
        );
        // Wrong date
        assert_eq!(
            parse_sequence_number("ledger-sam.2025-12-13-001.json", "ledger-sam", "2025-12-14"),
            None
        );
    }

    #[test]
    fn test_is_backup_file() {
        assert!(is_backup_file("ledger-sam.2025-12-14-001.json", "ledger-sam"));
        assert!(!is_backup_file("ledger-sam.2025-12-14-001.json", "ledger-pat"));
        assert!(!is_backup_file("ledger-sam.2025-12-14-001.txt", "ledger-sam"));
        assert!(!is_backup_file("ledger-sam.0.2025-12-14-001.json", "ledger-sam"));
        assert!(!is_backup_file("ledger-sam.notes.json", "ledger-sam"));
        assert!(!is_backup_file("ledger-sam.2025-12-14-.json", "ledger-sam"));
    }

    #[test]
    fn test_ledger_prefix_is_a_plain_file_name() {
        assert_eq!(Backup::ledger_prefix("sam"), "ledger-sam");
        for username in ["../etc", "a/b", "sam.0", "..", "C:\\x"] {
            let prefix = Backup::ledger_prefix(username);
            assert!(!prefix.contains(['/', '\\', '.']), "{prefix}");
        }
        assert_ne!(Backup::ledger_prefix("sam.0"), Backup::ledger_prefix("sam"));
    }

    #[test]
    fn test_rotation_keeps_other_users_with_a_shared_prefix() {
        let dir = TempDir::new().unwrap();
        let config =
            Config::create_with(dir.path(), ConfigFile::default().with_backup_copies(1)).unwrap();
        let backup = config.backup();

        let kept = backup
            .save_json(&Backup::ledger_prefix("sam.0"), &vec![0])
            .unwrap();
        for n in 1..=3 {
            backup.save_json(&Backup::ledger_prefix("sam"), &vec![n]).unwrap();
        }

        assert!(kept.is_file());
        assert!(kept.starts_with(config.backups()));
        assert_eq!(utils::file_names(config.backups()).unwrap().len(), 2);
    }

    #[test]
    fn test_save_and_rotate() {
        let dir = TempDir::new().unwrap();
        let config =
            Config::create_with(dir.path(), ConfigFile::default().with_backup_copies(2)).unwrap();
        let backup = config.backup();
        let prefix = Backup::ledger_prefix("sam");

        let first = backup.save_json(&prefix, &vec![1]).unwrap();
        let second = backup.save_json(&prefix, &vec![2]).unwrap();
        let third = backup.save_json(&prefix, &vec![3]).unwrap();
        backup.save_json(&Backup::ledger_prefix("pat"), &vec![4]).unwrap();

        assert!(!first.exists());
        assert!(second.is_file());
        assert!(third.is_file());
        assert!(third.to_string_lossy().ends_with("-003.json"));
        assert_eq!(utils::file_names(config.backups()).unwrap().len(), 3);
    }
}
