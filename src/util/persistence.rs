use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde_json::Error as SerdeError;
use tracing::{debug, warn};

use crate::domain::app_state::Preferences;

const APP_QUALIFIER: &str = "com";
const APP_ORG: &str = "CardGradingScanner";
const APP_NAME: &str = "CardGradingScanner";

pub fn preferences_file() -> Option<PathBuf> {
    ProjectDirs::from(APP_QUALIFIER, APP_ORG, APP_NAME)
        .map(|dirs| dirs.config_dir().join("preferences.json"))
}

pub fn load_preferences() -> Option<Preferences> {
    load_preferences_from(&preferences_file()?)
}

pub fn load_preferences_from(path: &Path) -> Option<Preferences> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) => {
            debug!(path = %path.display(), error = %err, "no saved preferences");
            return None;
        }
    };
    match serde_json::from_str(&data) {
        Ok(preferences) => Some(preferences),
        Err(err) => {
            warn!(path = %path.display(), error = %err, "ignoring unreadable preferences");
            None
        }
    }
}

pub fn save_preferences(preferences: &Preferences) -> Result<PathBuf, PersistSaveError> {
    let path = preferences_file().ok_or(PersistSaveError::StorageUnavailable)?;
    save_preferences_to(&path, preferences)?;
    Ok(path)
}

pub fn save_preferences_to(path: &Path, preferences: &Preferences) -> Result<(), PersistSaveError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(preferences)?;
    fs::write(path, json)?;
    Ok(())
}

#[derive(Debug, thiserror::Error)]
pub enum PersistSaveError {
    #[error("storage directory unavailable")]
    StorageUnavailable,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Serde(#[from] SerdeError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayMode, SortKey, SortSpec};

    #[test]
    fn preferences_roundtrip_on_disk() {
        let path = std::env::temp_dir()
            .join(format!("card-grading-scanner-prefs-{}", std::process::id()))
            .join("preferences.json");
        let mut preferences = Preferences {
            sort: SortSpec::for_key(SortKey::ProfitRate),
            mode: DisplayMode::Reveal,
            ..Preferences::default()
        };
        preferences.criteria.keyword = "ブラッキー".into();
        preferences.criteria.misc_expenses = 800.0;

        save_preferences_to(&path, &preferences).expect("save");
        assert_eq!(load_preferences_from(&path), Some(preferences));
        let _ = fs::remove_file(path);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let path = std::env::temp_dir()
            .join(format!("card-grading-scanner-prefs-partial-{}", std::process::id()))
            .join("preferences.json");
        fs::create_dir_all(path.parent().expect("parent")).expect("dir");
        fs::write(&path, r#"{ "criteria": { "in_stock_only": true } }"#).expect("write");

        let loaded = load_preferences_from(&path).expect("load");
        assert!(loaded.criteria.in_stock_only);
        assert_eq!(loaded.criteria.profit_rate_min, Some(20.0));
        assert_eq!(loaded.sort, SortSpec::default());
        let _ = fs::remove_file(path);
    }
}
