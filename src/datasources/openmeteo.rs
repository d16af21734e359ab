use crate::config::WeatherConfig;
use crate::error::{Result, SprayError};
use crate::models::{fill_forward_rain, HourPoint};
use serde::Deserialize;

const HOURLY_VARIABLES: &str = "temperature_2m,relative_humidity_2m,precipitation,wind_speed_10m,wind_gusts_10m,wind_direction_10m";

pub struct OpenMeteoClient {
    client: reqwest::Client,
    config: WeatherConfig,
}

// Open-Meteo API response structures
#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    #[serde(default)]
    hourly: Option<OmHourly>,
}

/// Parallel arrays indexed by hour; any of them may be missing or hold nulls
#[derive(Debug, Default, Deserialize)]
struct OmHourly {
    #[serde(default)]
    time: Vec<String>,
    #[serde(default)]
    temperature_2m: Vec<Option<f64>>,
    #[serde(default)]
    relative_humidity_2m: Vec<Option<f64>>,
    #[serde(default)]
    precipitation: Vec<Option<f64>>,
    #[serde(default)]
    wind_speed_10m: Vec<Option<f64>>,
    #[serde(default)]
    wind_gusts_10m: Vec<Option<f64>>,
    #[serde(default)]
    wind_direction_10m: Vec<Option<f64>>,
}

fn at(values: &[Option<f64>], i: usize) -> Option<f64> {
    values.get(i).copied().flatten()
}

impl OpenMeteoClient {
    pub fn new(config: WeatherConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            config,
        }
    }

    fn forecast_url(&self, lat: f64, lon: f64) -> Result<reqwest::Url> {
        let latitude = format!("{:.4}", lat);
        let longitude = format!("{:.4}", lon);
        let forecast_days = self.config.forecast_days.to_string();
        reqwest::Url::parse_with_params(
            &self.config.base_url,
            &[
                ("latitude", latitude.as_str()),
                ("longitude", longitude.as_str()),
                ("timezone", self.config.timezone.as_str()),
                ("forecast_days", forecast_days.as_str()),
                ("hourly", HOURLY_VARIABLES),
                ("windspeed_unit", "ms"),
                ("precipitation_unit", "mm"),
            ],
        )
        .map_err(|e| SprayError::Config(format!("Invalid weather base URL: {}", e)))
    }

    /// Fetch the hourly series with the forward 6-hour rain sum filled in
    pub async fn fetch_hourly(&self, lat: f64, lon: f64) -> Result<Vec<HourPoint>> {
        let url = self.forecast_url(lat, lon)?;
        tracing::debug!("Fetching forecast from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SprayError::DataSourceUnavailable(format!("Open-Meteo: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(SprayError::DataSourceUnavailable(format!(
                "Open-Meteo returned {}: {}",
                status, body
            )));
        }

        let om_response: OmForecastResponse = response.json().await.map_err(|e| {
            SprayError::DataSourceUnavailable(format!("Failed to parse Open-Meteo response: {}", e))
        })?;

        Ok(convert_response(om_response))
    }

    /// Test connection to the Open-Meteo API
    pub async fn test_connection(&self, lat: f64, lon: f64) -> Result<bool> {
        let url = self.forecast_url(lat, lon)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SprayError::DataSourceUnavailable(format!("Open-Meteo: {}", e)))?;

        Ok(response.status().is_success())
    }
}

fn convert_response(response: OmForecastResponse) -> Vec<HourPoint> {
    let hourly = response.hourly.unwrap_or_default();

    let mut points: Vec<HourPoint> = hourly
        .time
        .iter()
        .enumerate()
        .map(|(i, ts)| HourPoint {
            ts: ts.clone(),
            temp_c: at(&hourly.temperature_2m, i),
            rh_pct: at(&hourly.relative_humidity_2m, i),
            wind_ms: at(&hourly.wind_speed_10m, i),
            gust_ms: at(&hourly.wind_gusts_10m, i),
            rain_mm: at(&hourly.precipitation, i),
            wind_dir_deg: at(&hourly.wind_direction_10m, i),
            rain6h_mm: None,
        })
        .collect();

    fill_forward_rain(&mut points);
    points
}
