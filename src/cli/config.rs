//! Effective configuration command

use tablebook_core::{error::Result, Settings};

/// Print the merged configuration as TOML
pub async fn handle(settings: &Settings) -> Result<()> {
    print!("{}", settings.to_toml()?);
    Ok(())
}
