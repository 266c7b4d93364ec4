use crate::commands::Out;
use crate::{Config, Result};
use anyhow::Context;
use std::path::Path;

/// Creates the home directory, its `data` and `.backups` subdirectories and an initial
/// `config.json` with default settings.
///
/// # Arguments
/// - `home` - The directory that will be the root of the data directory, e.g. `$HOME/budget-pet`
///
/// # Errors
/// - Returns an error if the config file already exists.
/// - Returns an error if any file operations fail.
pub fn init(home: &Path) -> Result<Out<()>> {
    let config = Config::create(home).context("Unable to create the data directory and configs")?;
    Ok(format!(
        "Successfully created the budget-pet directory at {}",
        config.root().display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_init() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("pet");
        let out = init(&home).unwrap();
        assert!(out.message().starts_with("Successfully created"));
        assert!(Config::load(&home).is_ok());
        assert!(init(&home).is_err());
    }
}
