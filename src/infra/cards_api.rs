//! Thin asynchronous client for the card comparison API.
//!
//! - Fetches the merged card list (`GET /api/cards`).
//! - Keeps an in-memory copy with a TTL and falls back to stale data, then
//!   to the on-disk snapshot, when the API is unreachable.

use std::{
    path::PathBuf,
    sync::Arc,
    time::{Duration, SystemTime},
};

use reqwest::{Client, Url};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{normalize_stock_status, RawCard};
use crate::domain::entities::{FETCH_FAILED_MARKER, UNKNOWN_NAME};
use crate::infra::cache::{load_snapshot, save_snapshot, snapshot_path, CardSnapshot};
use crate::util::version::user_agent;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/";
pub const DEFAULT_TTL: Duration = Duration::from_secs(60 * 60);
const CARDS_PATH: &str = "api/cards";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum CardsClientError {
    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
    #[error("http request error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected payload: {0}")]
    Payload(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CacheStatus {
    Fresh,
    Cached,
    Stale,
}

impl CacheStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Fresh => "fresh",
            Self::Cached => "cached",
            Self::Stale => "stale",
        }
    }
}

#[derive(Clone, Debug)]
pub struct CachedPayload<T> {
    pub data: T,
    pub fetched_at: SystemTime,
    pub status: CacheStatus,
}

impl<T> CachedPayload<T> {
    fn new(data: T, fetched_at: SystemTime, status: CacheStatus) -> Self {
        Self {
            data,
            fetched_at,
            status,
        }
    }
}

#[derive(Clone)]
pub struct CardsClient {
    http: Client,
    base_url: Url,
    cache: Arc<Mutex<Option<Cached<Vec<RawCard>>>>>,
    ttl: Duration,
    snapshot_path: Option<PathBuf>,
}

impl CardsClient {
    pub fn new() -> Result<Self, CardsClientError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Result<Self, CardsClientError> {
        let base_url = Url::parse(&with_trailing_slash(base))?;
        let http = Client::builder()
            .user_agent(user_agent())
            .connect_timeout(CONNECT_TIMEOUT)
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            base_url,
            cache: Arc::new(Mutex::new(None)),
            ttl: DEFAULT_TTL,
            snapshot_path: Some(snapshot_path()),
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Where the on-disk fallback lives; `None` disables it.
    pub fn with_snapshot_path(mut self, path: Option<PathBuf>) -> Self {
        self.snapshot_path = path;
        self
    }

    pub fn cards_url(&self) -> Result<Url, url::ParseError> {
        self.base_url.join(CARDS_PATH)
    }

    /// Card list, from memory when fresh, otherwise from the API. A failed
    /// request falls back to whatever copy we still have.
    pub async fn get_cards(&self) -> Result<CachedPayload<Vec<RawCard>>, CardsClientError> {
        if let Some(payload) = self.cached_cards().await {
            debug!(cards = payload.data.len(), "serving cached card list");
            return Ok(payload);
        }

        let url = self.cards_url()?;
        info!(%url, "requesting card list");
        match self.fetch_cards(url.clone()).await {
            Ok(cards) => {
                info!(cards = cards.len(), "card list loaded");
                self.write_snapshot(url.as_str(), &cards);
                Ok(self.store_cards(cards).await)
            }
            Err(error) => {
                warn!(%url, %error, "card list request failed");
                if let Some(stale) = self.cached_cards_stale().await {
                    return Ok(stale);
                }
                if let Some(snapshot) = self.offline_snapshot() {
                    return Ok(snapshot);
                }
                Err(error)
            }
        }
    }

    /// Card list from the on-disk snapshot only, without touching the network.
    pub fn offline_snapshot(&self) -> Option<CachedPayload<Vec<RawCard>>> {
        let path = self.snapshot_path.as_ref()?;
        let snapshot = load_snapshot(path)?;
        let status = if snapshot.is_expired() {
            CacheStatus::Stale
        } else {
            CacheStatus::Cached
        };
        let fetched_at = snapshot.fetched_at();
        Some(CachedPayload::new(snapshot.cards, fetched_at, status))
    }

    pub async fn clear_cache(&self) {
        *self.cache.lock().await = None;
    }

    async fn fetch_cards(&self, url: Url) -> Result<Vec<RawCard>, CardsClientError> {
        let response = self.http.get(url).send().await?.error_for_status()?;
        let raw: serde_json::Value = response.json().await?;
        parse_cards(raw)
    }

    async fn cached_cards(&self) -> Option<CachedPayload<Vec<RawCard>>> {
        let cache = self.cache.lock().await;
        cache.as_ref().and_then(|entry| entry.if_fresh(self.ttl))
    }

    async fn cached_cards_stale(&self) -> Option<CachedPayload<Vec<RawCard>>> {
        let cache = self.cache.lock().await;
        cache.as_ref().map(Cached::stale)
    }

    async fn store_cards(&self, data: Vec<RawCard>) -> CachedPayload<Vec<RawCard>> {
        let fetched_at = SystemTime::now();
        let payload = CachedPayload::new(data.clone(), fetched_at, CacheStatus::Fresh);
        *self.cache.lock().await = Some(Cached::new(data, fetched_at));
        payload
    }

    fn write_snapshot(&self, source: &str, cards: &[RawCard]) {
        let Some(path) = self.snapshot_path.as_ref() else {
            return;
        };
        let snapshot = CardSnapshot::new(source, cards.to_vec());
        if let Err(error) = save_snapshot(path, &snapshot) {
            warn!(%error, "failed to save card snapshot");
        }
    }
}

fn with_trailing_slash(base: &str) -> String {
    if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{base}/")
    }
}

struct Cached<T> {
    value: T,
    fetched_at: SystemTime,
}

impl<T: Clone> Cached<T> {
    fn new(value: T, fetched_at: SystemTime) -> Self {
        Self { value, fetched_at }
    }

    fn if_fresh(&self, ttl: Duration) -> Option<CachedPayload<T>> {
        if self
            .fetched_at
            .elapsed()
            .map(|elapsed| elapsed <= ttl)
            .unwrap_or(false)
        {
            Some(CachedPayload::new(
                self.value.clone(),
                self.fetched_at,
                CacheStatus::Cached,
            ))
        } else {
            None
        }
    }

    fn stale(&self) -> CachedPayload<T> {
        CachedPayload::new(self.value.clone(), self.fetched_at, CacheStatus::Stale)
    }
}

#[derive(Debug, Deserialize)]
struct CardDto {
    #[serde(default, deserialize_with = "lenient_string")]
    id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    no: Option<String>,
    #[serde(default, alias = "name", deserialize_with = "lenient_string")]
    card_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    card_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    buy_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    sell_price: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string")]
    stock_original: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    stock_normalized: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    ebay_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    profit: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CardListWrapper {
    data: Vec<CardDto>,
}

impl CardDto {
    fn into_card(self, index: usize) -> RawCard {
        let no = self.no.filter(|value| !value.trim().is_empty());
        let card_number = self.card_number.filter(|value| !value.trim().is_empty());
        let id = self.id.filter(|value| !value.is_empty()).unwrap_or_else(|| {
            format!(
                "{}_{}_{index}",
                no.as_deref().unwrap_or_default(),
                card_number.as_deref().unwrap_or_default()
            )
        });
        let stock = match self.stock_normalized {
            Some(normalized) if !normalized.trim().is_empty() => normalized,
            _ => normalize_stock_status(self.stock_original.as_deref()),
        };

        RawCard {
            id,
            no,
            name: self
                .card_name
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            card_number,
            buy_price: self.buy_price.unwrap_or(0.0),
            sell_price: self.sell_price.unwrap_or(0.0),
            stock,
            image_url: usable_link(self.image_url),
            reference_url: usable_link(self.ebay_url),
            profit: self.profit,
        }
    }
}

fn usable_link(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && value != FETCH_FAILED_MARKER)
}

/// Decode a card list payload: a bare array or a `{ "data": [...] }` wrapper.
pub fn parse_cards(value: serde_json::Value) -> Result<Vec<RawCard>, CardsClientError> {
    let dtos = match value {
        serde_json::Value::Array(_) => serde_json::from_value::<Vec<CardDto>>(value)
            .map_err(|err| CardsClientError::Payload(err.to_string()))?,
        serde_json::Value::Object(_) => serde_json::from_value::<CardListWrapper>(value)
            .map(|wrapper| wrapper.data)
            .map_err(|err| CardsClientError::Payload(err.to_string()))?,
        other => {
            return Err(CardsClientError::Payload(format!(
                "expected an array of cards, got {}",
                json_kind(&other)
            )))
        }
    };

    Ok(dtos
        .into_iter()
        .enumerate()
        .map(|(index, dto)| dto.into_card(index))
        .collect())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Numbers arrive as numbers, numeric strings, empty strings, null or NaN
/// placeholders. Anything unusable becomes `None`.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::Number(number)) => number.as_f64(),
        Some(serde_json::Value::String(text)) => text
            .trim()
            .replace(',', "")
            .parse::<f64>()
            .ok(),
        _ => None,
    }
    .filter(|number| number.is_finite()))
}

/// Id-like fields come as strings or numbers (pandas turns `No` into floats).
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(text)) => Some(text),
        Some(serde_json::Value::Number(number)) => Some(match number.as_f64() {
            Some(float) if float.fract() == 0.0 && float.abs() < 1e15 => {
                format!("{}", float as i64)
            }
            _ => number.to_string(),
        }),
        Some(serde_json::Value::Bool(flag)) => Some(flag.to_string()),
        _ => None,
    })
}
