use anyhow::{Context, Result};
use directories::{BaseDirs, ProjectDirs};
use std::ffi::OsString;
use std::path::PathBuf;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "FITLOG_DIR";

const DB_FILE: &str = "db.sqlite";

#[derive(Debug)]
pub struct Config {
    pub data_dir: PathBuf,
    pub db_path: PathBuf,
}

impl Config {
    /// Resolve the data directory: explicit flag, then `FITLOG_DIR`, then the
    /// per-user config directory.
    pub fn load(flag: Option<PathBuf>, env: Option<OsString>) -> Result<Self> {
        let data_dir = match (flag, env.filter(|v| !v.is_empty())) {
            (Some(dir), _) => dir,
            (None, Some(dir)) => expand_home(PathBuf::from(dir)),
            (None, None) => ProjectDirs::from("", "", "fitlog")
                .context("Could not determine home directory")?
                .config_dir()
                .to_path_buf(),
        };
        let db_path = data_dir.join(DB_FILE);
        Ok(Config { data_dir, db_path })
    }
}

fn expand_home(path: PathBuf) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path;
    };
    match BaseDirs::new() {
        Some(dirs) => dirs.home_dir().join(rest),
        None => path,
    }
}
