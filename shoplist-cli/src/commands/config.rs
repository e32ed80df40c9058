use std::fs;

use anyhow::{Context, Result};
use shared::config::{ClientConfig, ConfigFormat};

/// Write a configuration file with default values to the working directory.
///
/// # Errors
/// Returns an error if serialization or writing the file fails.
pub fn generate_config(format: ConfigFormat) -> Result<()> {
    let rendered = ClientConfig::with_defaults().render(format)?;
    let file_name = format.file_name();
    fs::write(file_name, rendered)
        .with_context(|| format!("failed to write configuration file {file_name}"))?;

    println!("Configuration file '{file_name}' generated successfully.");
    Ok(())
}
