use anyhow::{bail, Result};

use kinetic_core::AppConfig;

pub fn show(config: &AppConfig) -> Result<()> {
    print!("{}", config.to_toml()?);
    Ok(())
}

pub fn path() -> Result<()> {
    println!("{}", AppConfig::config_path().display());
    Ok(())
}

pub async fn init(force: bool) -> Result<()> {
    let path = AppConfig::config_path();
    if tokio::fs::try_exists(&path).await? && !force {
        bail!(
            "Config file already exists at {}\nUse --force to overwrite it.",
            path.display()
        );
    }

    tokio::task::spawn_blocking(|| AppConfig::default().save()).await??;
    println!("Wrote default configuration to {}", path.display());
    Ok(())
}
