use crate::cli::OutputFormat;
use crate::config::config;

/// The JWT secret is never serialized
pub fn handle(_output_format: OutputFormat) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(config())?);
    Ok(())
}
