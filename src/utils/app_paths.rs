use std::error::Error;
use std::fs;
use std::path::PathBuf;

pub struct AppPaths;

impl AppPaths {
    pub fn config_dir() -> Result<PathBuf, Box<dyn Error>> {
        let config_dir = dirs::config_dir()
            .ok_or("Cannot determine config directory")?
            .join("context-cli");

        fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn data_dir() -> Result<PathBuf, Box<dyn Error>> {
        let data_dir = dirs::data_dir()
            .ok_or("Cannot determine data directory")?
            .join("context-cli");

        fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn config_file() -> Result<PathBuf, Box<dyn Error>> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    pub fn log_file() -> Result<PathBuf, Box<dyn Error>> {
        Ok(Self::data_dir()?.join("context-cli.log"))
    }

    pub fn export_dir() -> Result<PathBuf, Box<dyn Error>> {
        let export_dir = Self::data_dir()?.join("exports");
        fs::create_dir_all(&export_dir)?;
        Ok(export_dir)
    }
}
