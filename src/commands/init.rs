use anyhow::{Context, Result};
use legends_ingest::config::{Config, DEFAULT_CONFIG_FILE};
use std::path::PathBuf;

pub async fn init_config(path: PathBuf) -> Result<()> {
    let config_path = path.join(DEFAULT_CONFIG_FILE);
    if config_path.exists() {
        anyhow::bail!("Config file already exists: {}", config_path.display());
    }

    std::fs::create_dir_all(&path)
        .with_context(|| format!("Failed to create directory: {}", path.display()))?;
    std::fs::write(&config_path, Config::default_toml())
        .with_context(|| format!("Failed to write config: {}", config_path.display()))?;

    println!("Created configuration at {}", config_path.display());
    Ok(())
}
