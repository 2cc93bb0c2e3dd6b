//! Persistent on-disk snapshot of the last fetched card list, with TTL.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::OnceLock,
    time::{Duration, SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::domain::RawCard;

const SNAPSHOT_FILENAME: &str = "cards_snapshot.json";

/// Snapshot TTL: 24 hours. The scrapers refresh prices about once a day.
pub const SNAPSHOT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Card list as last seen from the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CardSnapshot {
    /// Unix timestamp (seconds) when this snapshot was taken.
    pub cached_at: u64,
    /// Endpoint the cards came from.
    pub source: String,
    pub cards: Vec<RawCard>,
}

impl CardSnapshot {
    pub fn new(source: impl Into<String>, cards: Vec<RawCard>) -> Self {
        Self {
            cached_at: unix_now(),
            source: source.into(),
            cards,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.age() > SNAPSHOT_TTL
    }

    pub fn age(&self) -> Duration {
        Duration::from_secs(unix_now().saturating_sub(self.cached_at))
    }

    pub fn fetched_at(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(self.cached_at)
    }

    /// Human-readable age string.
    pub fn age_string(&self) -> String {
        humanize_duration(self.age())
    }
}

pub fn humanize_duration(age: Duration) -> String {
    let secs = age.as_secs();
    if secs < 60 {
        format!("{secs}s")
    } else if secs < 3600 {
        format!("{}m", secs / 60)
    } else if secs < 86400 {
        format!("{}h", secs / 3600)
    } else {
        format!("{}d", secs / 86400)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Default snapshot location (in the app data directory).
pub fn snapshot_path() -> PathBuf {
    static PATH: OnceLock<PathBuf> = OnceLock::new();
    PATH.get_or_init(|| {
        let base = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("card-grading-scanner");
        if let Err(err) = fs::create_dir_all(&base) {
            warn!(path = %base.display(), error = %err, "could not create data directory");
        }
        base.join(SNAPSHOT_FILENAME)
    })
    .clone()
}

/// Load a snapshot, expired or not. Callers decide whether an expired one is
/// still good enough.
pub fn load_snapshot(path: &Path) -> Option<CardSnapshot> {
    if !path.exists() {
        debug!(path = %path.display(), "no card snapshot found");
        return None;
    }

    match fs::read_to_string(path) {
        Ok(content) => match serde_json::from_str::<CardSnapshot>(&content) {
            Ok(snapshot) => {
                info!(
                    cards = snapshot.cards.len(),
                    age = %snapshot.age_string(),
                    expired = snapshot.is_expired(),
                    "loaded card snapshot"
                );
                Some(snapshot)
            }
            Err(err) => {
                warn!(error = %err, "failed to parse card snapshot");
                None
            }
        },
        Err(err) => {
            warn!(error = %err, "failed to read card snapshot");
            None
        }
    }
}

pub fn save_snapshot(path: &Path, snapshot: &CardSnapshot) -> Result<(), std::io::Error> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string(snapshot)?; // compact, can be large
    fs::write(path, content)?;
    info!(
        cards = snapshot.cards.len(),
        path = %path.display(),
        "saved card snapshot"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OUT_OF_STOCK_MARKER;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("card-grading-scanner-test-{}", std::process::id()))
            .join(name)
    }

    fn card() -> RawCard {
        RawCard {
            id: "7_SV2a_0".into(),
            no: Some("7".into()),
            name: "Mew ex".into(),
            card_number: Some("SV2a 205/165".into()),
            buy_price: 52_000.0,
            sell_price: 21_800.0,
            stock: OUT_OF_STOCK_MARKER.into(),
            image_url: None,
            reference_url: None,
            profit: None,
        }
    }

    #[test]
    fn snapshot_survives_disk_roundtrip() {
        let path = temp_path("roundtrip.json");
        let snapshot = CardSnapshot::new("http://127.0.0.1:8000/api/cards", vec![card()]);
        save_snapshot(&path, &snapshot).expect("save");

        let loaded = load_snapshot(&path).expect("load");
        assert_eq!(loaded.cards, snapshot.cards);
        assert_eq!(loaded.source, snapshot.source);
        assert!(!loaded.is_expired());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn missing_or_corrupt_snapshot_is_none() {
        assert!(load_snapshot(&temp_path("does-not-exist.json")).is_none());

        let path = temp_path("corrupt.json");
        fs::create_dir_all(path.parent().expect("parent")).expect("dir");
        fs::write(&path, "{ not json").expect("write");
        assert!(load_snapshot(&path).is_none());
        let _ = fs::remove_file(path);
    }

    #[test]
    fn old_snapshot_is_expired() {
        let mut snapshot = CardSnapshot::new("x", Vec::new());
        snapshot.cached_at = snapshot.cached_at.saturating_sub(2 * 24 * 60 * 60);
        assert!(snapshot.is_expired());
        assert_eq!(snapshot.age_string(), "2d");
    }

    #[test]
    fn durations_humanize() {
        assert_eq!(humanize_duration(Duration::from_secs(42)), "42s");
        assert_eq!(humanize_duration(Duration::from_secs(5 * 60)), "5m");
        assert_eq!(humanize_duration(Duration::from_secs(3 * 3600 + 5)), "3h");
    }
}
