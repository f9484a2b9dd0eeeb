//! Growth-rate seeding from the training categories fixture.
//!
//! The fixture is a JSON object whose `growth_rate` key holds the category
//! names in order:
//!
//! ```json
//! {"growth_rate": ["Slow", "Medium", "Fast"]}
//! ```

use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;

use crate::db::Database;
use crate::model::GrowthRate;
use crate::schema::GROWTH_RATE_CATEGORIES;

/// Fixture read by the seed command when no path is given
pub const DEFAULT_TRAINING_FIXTURE: &str = "./data/categories/training.json";

pub const GROWTH_RATE_KEY: &str = "growth_rate";

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid JSON in {path:?}: {source}")]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Key '{key}' not found in {path:?}")]
    MissingKey { path: PathBuf, key: &'static str },
    #[error("Database error: {0}")]
    Database(#[from] anyhow::Error),
}

/// Read the list of names stored under `key` in a JSON fixture
pub fn read_category_names(path: &Path, key: &'static str) -> Result<Vec<String>, SeedError> {
    let contents = fs::read_to_string(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let json: Value = serde_json::from_str(&contents).map_err(|source| SeedError::Json {
        path: path.to_path_buf(),
        source,
    })?;

    let names = json.get(key).cloned().ok_or_else(|| SeedError::MissingKey {
        path: path.to_path_buf(),
        key,
    })?;

    serde_json::from_value(names).map_err(|source| SeedError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// One unsaved [`GrowthRate`] per name in the fixture, in fixture order
pub fn load_growth_rates(path: &Path) -> Result<Vec<GrowthRate>, SeedError> {
    let rates: Vec<GrowthRate> = read_category_names(path, GROWTH_RATE_KEY)?
        .into_iter()
        .map(GrowthRate::new)
        .collect();

    info!("Loaded {} growth rates from {:?}", rates.len(), path);
    Ok(rates)
}

/// Build the growth-rate records and, when a database is given, commit them.
///
/// The growth-rate table is created first if the database does not have it.
pub fn populate_training(
    path: &Path,
    db: Option<&mut Database>,
) -> Result<Vec<GrowthRate>, SeedError> {
    let mut rates = load_growth_rates(path)?;

    if let Some(db) = db {
        db.create_tables(&[&GROWTH_RATE_CATEGORIES])?;
        db.insert_categories(&mut rates)?;
    }

    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn fixture(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_loads_names_in_order() {
        let file = fixture(r#"{"growth_rate": ["Slow", "Medium", "Fast"]}"#);
        let rates = load_growth_rates(file.path()).unwrap();

        let names: Vec<&str> = rates.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Slow", "Medium", "Fast"]);
        assert!(rates.iter().all(|r| r.id.is_none()));
    }

    #[test]
    fn test_other_keys_are_ignored() {
        let file = fixture(r#"{"friendship": ["Normal"], "growth_rate": []}"#);
        assert!(load_growth_rates(file.path()).unwrap().is_empty());
    }

    #[test]
    fn test_missing_key_fails() {
        let file = fixture(r#"{"friendship": ["Normal"]}"#);
        let err = load_growth_rates(file.path()).unwrap_err();
        assert!(matches!(err, SeedError::MissingKey { key: "growth_rate", .. }));
    }

    #[test]
    fn test_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_growth_rates(&dir.path().join("training.json")).unwrap_err();
        match err {
            SeedError::Io { source, .. } => {
                assert_eq!(source.kind(), std::io::ErrorKind::NotFound)
            }
            other => panic!("expected Io error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_json_fails() {
        let file = fixture(r#"{"growth_rate": ["Slow""#);
        assert!(matches!(
            load_growth_rates(file.path()),
            Err(SeedError::Json { .. })
        ));
    }

    #[test]
    fn test_wrong_shape_fails() {
        let file = fixture(r#"{"growth_rate": "Slow"}"#);
        assert!(matches!(
            load_growth_rates(file.path()),
            Err(SeedError::Json { .. })
        ));
    }
}
