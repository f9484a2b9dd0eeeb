//! Database location resolution.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;

/// Environment variable naming the database
pub const DB_NAME_VAR: &str = "DB_NAME";

pub const DEFAULT_DB_NAME: &str = "pokedex";

const DB_EXTENSION: &str = "sqlite3";

/// Where the reference database lives.
#[derive(Debug, Clone, PartialEq)]
pub struct DbConfig {
    pub path: PathBuf,
}

impl DbConfig {
    /// Resolve from an explicit path, else `DB_NAME`, else the default name.
    /// Named databases live in the platform data directory.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self> {
        Self::resolve_with(explicit, std::env::var(DB_NAME_VAR).ok(), data_dir)
    }

    fn resolve_with(
        explicit: Option<PathBuf>,
        db_name: Option<String>,
        data_dir: impl FnOnce() -> Result<PathBuf>,
    ) -> Result<Self> {
        if let Some(path) = explicit {
            return Ok(Self { path });
        }

        let name = db_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_DB_NAME.to_string());

        let path = data_dir()?.join(format!("{}.{}", name, DB_EXTENSION));
        Ok(Self { path })
    }
}

fn data_dir() -> Result<PathBuf> {
    let proj_dirs = ProjectDirs::from("", "", "pokedex-db")
        .context("Could not determine data directory")?;
    Ok(proj_dirs.data_dir().to_path_buf())
}
