use crate::config::Config;
use crate::datasources::nominatim::coordinates_label;
use crate::datasources::{AdvisorClient, NominatimClient, OpenMeteoClient};
use crate::error::{Result, SprayError};
use crate::models::{AdvisoryOutcome, AdvisoryRequest, HourPoint, LocationRef, PresetRegistry};
use chrono::{DateTime, Duration, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use super::analysis::SprayReport;

/// How long a fetched series is reused for the same coordinates
pub const SERIES_TTL_MINUTES: i64 = 30;

#[derive(Debug, Clone)]
struct CachedSeries {
    key: (i64, i64),
    fetched_at: DateTime<Utc>,
    points: Vec<HourPoint>,
}

/// Cache key: coordinates at the precision sent to the provider
fn coord_key(lat: f64, lon: f64) -> (i64, i64) {
    ((lat * 10_000.0).round() as i64, (lon * 10_000.0).round() as i64)
}

/// Result of a series load.
#[derive(Debug, Clone, PartialEq)]
pub enum SeriesFetch {
    Fresh(Vec<HourPoint>),
    Cached(Vec<HourPoint>),
    /// A newer request started while this one was in flight; its result was dropped
    Superseded,
}

/// Hands out request tickets; only the latest ticket may publish results.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    latest: Arc<AtomicU64>,
}

impl RequestTracker {
    pub fn begin(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    pub fn is_current(&self, ticket: u64) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket
    }
}

/// Orchestrates the collaborators around the engine: forecast fetch with a
/// short-lived cache, geocoding and the remote advisory.
pub struct SprayService {
    config: Config,
    registry: PresetRegistry,
    weather: OpenMeteoClient,
    geocoder: Option<NominatimClient>,
    advisor: Option<AdvisorClient>,
    cache: Arc<RwLock<Option<CachedSeries>>>,
    requests: RequestTracker,
}

impl SprayService {
    pub fn new(config: Config) -> Self {
        let geocoder = match NominatimClient::new(config.geocoding.clone()) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::warn!("Geocoding client unavailable: {}", e);
                None
            }
        };

        let advisor = if config.advisor.is_active() {
            match AdvisorClient::new(config.advisor.clone()) {
                Ok(client) => {
                    tracing::info!("Remote advisory configured at {}", config.advisor.url);
                    Some(client)
                }
                Err(e) => {
                    tracing::warn!("Remote advisory client unavailable: {}", e);
                    None
                }
            }
        } else {
            tracing::info!("Remote advisory not configured - local advice only");
            None
        };

        Self {
            registry: config.preset_registry(),
            weather: OpenMeteoClient::new(config.weather.clone()),
            geocoder,
            advisor,
            cache: Arc::new(RwLock::new(None)),
            requests: RequestTracker::default(),
            config,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &PresetRegistry {
        &self.registry
    }

    pub fn has_remote_advisor(&self) -> bool {
        self.advisor.is_some()
    }

    /// Hourly series for a point. A fresh cached series for the same
    /// coordinates is reused; a fetch overtaken by a newer load, cached or
    /// not, is dropped.
    pub async fn load_series(&self, lat: f64, lon: f64) -> Result<SeriesFetch> {
        let key = coord_key(lat, lon);
        let ticket = self.requests.begin();

        if let Some(points) = self.cached(key, Utc::now()).await {
            tracing::debug!("Reusing cached forecast");
            return Ok(SeriesFetch::Cached(points));
        }

        let points = self.weather.fetch_hourly(lat, lon).await?;

        if !self.requests.is_current(ticket) {
            tracing::debug!("Dropping superseded forecast for {:?}", key);
            return Ok(SeriesFetch::Superseded);
        }

        self.store(key, points.clone(), Utc::now()).await;
        tracing::info!("Forecast updated: {} hours", points.len());
        Ok(SeriesFetch::Fresh(points))
    }

    async fn cached(&self, key: (i64, i64), now: DateTime<Utc>) -> Option<Vec<HourPoint>> {
        let cache = self.cache.read().await;
        cache
            .as_ref()
            .filter(|c| c.key == key && now - c.fetched_at < Duration::minutes(SERIES_TTL_MINUTES))
            .map(|c| c.points.clone())
    }

    async fn store(&self, key: (i64, i64), points: Vec<HourPoint>, now: DateTime<Utc>) {
        let mut cache = self.cache.write().await;
        *cache = Some(CachedSeries {
            key,
            fetched_at: now,
            points,
        });
    }

    /// Resolve the field: a place query wins over coordinates, then the
    /// configured default location.
    pub async fn resolve_location(
        &self,
        place: Option<&str>,
        coords: Option<(f64, f64)>,
    ) -> Result<LocationRef> {
        if let Some(query) = place {
            let geocoder = self
                .geocoder
                .as_ref()
                .ok_or_else(|| SprayError::DataSourceUnavailable("Geocoding not available".into()))?;
            return geocoder.search(query).await;
        }

        if let Some((lat, lon)) = coords {
            let name = match &self.geocoder {
                Some(geocoder) => geocoder.reverse(lat, lon).await,
                None => coordinates_label(lat, lon),
            };
            return Ok(LocationRef { lat, lon, name });
        }

        match &self.config.location {
            Some(loc) => Ok(LocationRef {
                lat: loc.latitude,
                lon: loc.longitude,
                name: loc
                    .name
                    .clone()
                    .unwrap_or_else(|| coordinates_label(loc.latitude, loc.longitude)),
            }),
            None => Err(SprayError::InvalidData(
                "No location: pass --lat/--lon or --place, or set one in the config".into(),
            )),
        }
    }

    /// Remote opinion when configured, otherwise the report's local advice.
    pub async fn advise(&self, report: &SprayReport, request: &AdvisoryRequest) -> AdvisoryOutcome {
        match &self.advisor {
            Some(client) => client.advise(request, &report.advice).await,
            None => AdvisoryOutcome::local(report.advice.clone()),
        }
    }

    pub async fn check_connections(&self, lat: f64, lon: f64) -> ConnectionStatus {
        let mut status = ConnectionStatus::default();

        status.weather = self.weather.test_connection(lat, lon).await.unwrap_or(false);

        if let Some(ref geocoder) = self.geocoder {
            status.geocoding = geocoder.test_connection(lat, lon).await.unwrap_or(false);
        }

        status.advisor = self.advisor.is_some();

        status
    }
}

#[derive(Debug, Clone, Default)]
pub struct ConnectionStatus {
    pub weather: bool,
    pub geocoding: bool,
    /// Configured, not probed
    pub advisor: bool,
}

impl ConnectionStatus {
    pub fn core_connected(&self) -> bool {
        self.weather
    }
}
