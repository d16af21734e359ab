use crate::config::GeocodingConfig;
use crate::error::{Result, SprayError};
use crate::models::LocationRef;
use serde::Deserialize;

pub struct NominatimClient {
    client: reqwest::Client,
    config: GeocodingConfig,
}

// Nominatim returns coordinates as strings
#[derive(Debug, Deserialize)]
struct NmPlace {
    lat: String,
    lon: String,
    #[serde(default)]
    display_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NmReverse {
    #[serde(default)]
    display_name: Option<String>,
}

/// `"lat, lon"` to five decimals, the name used when no place name is known
pub fn coordinates_label(lat: f64, lon: f64) -> String {
    format!("{:.5}, {:.5}", lat, lon)
}

impl NominatimClient {
    pub fn new(config: GeocodingConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: reqwest::Url) -> Result<T> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::ACCEPT_LANGUAGE, &self.config.language)
            .send()
            .await
            .map_err(|e| SprayError::DataSourceUnavailable(format!("Nominatim: {}", e)))?;

        if !response.status().is_success() {
            return Err(SprayError::DataSourceUnavailable(format!(
                "Nominatim returned {}",
                response.status()
            )));
        }

        response.json().await.map_err(|e| {
            SprayError::DataSourceUnavailable(format!("Failed to parse Nominatim response: {}", e))
        })
    }

    fn endpoint(&self, path: &str, params: &[(&str, &str)]) -> Result<reqwest::Url> {
        let base = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        reqwest::Url::parse_with_params(&base, params)
            .map_err(|e| SprayError::Config(format!("Invalid geocoding base URL: {}", e)))
    }

    /// First match for a free-text query
    pub async fn search(&self, query: &str) -> Result<LocationRef> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SprayError::InvalidData("Empty place query".into()));
        }

        let url = self.endpoint("search", &[("format", "json"), ("limit", "1"), ("q", query)])?;
        let places: Vec<NmPlace> = self.get_json(url).await?;
        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| SprayError::NotFound(format!("No place found for '{}'", query)))?;

        place_to_location(place)
    }

    /// Test connection to the Nominatim API
    pub async fn test_connection(&self, lat: f64, lon: f64) -> Result<bool> {
        let lat_s = lat.to_string();
        let lon_s = lon.to_string();
        let url = self.endpoint(
            "reverse",
            &[("format", "json"), ("lat", lat_s.as_str()), ("lon", lon_s.as_str())],
        )?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| SprayError::DataSourceUnavailable(format!("Nominatim: {}", e)))?;

        Ok(response.status().is_success())
    }

    /// Display name of a point. Lookup failures fall back to the coordinates.
    pub async fn reverse(&self, lat: f64, lon: f64) -> String {
        let lat_s = lat.to_string();
        let lon_s = lon.to_string();
        let result = match self.endpoint(
            "reverse",
            &[
                ("format", "json"),
                ("lat", lat_s.as_str()),
                ("lon", lon_s.as_str()),
                ("zoom", "10"),
                ("addressdetails", "1"),
            ],
        ) {
            Ok(url) => self.get_json::<NmReverse>(url).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(reverse) => reverse
                .display_name
                .unwrap_or_else(|| coordinates_label(lat, lon)),
            Err(e) => {
                tracing::warn!("Reverse geocoding unavailable: {}", e);
                coordinates_label(lat, lon)
            }
        }
    }
}

fn place_to_location(place: NmPlace) -> Result<LocationRef> {
    let lat: f64 = place
        .lat
        .parse()
        .map_err(|_| SprayError::InvalidData(format!("Bad latitude '{}'", place.lat)))?;
    let lon: f64 = place
        .lon
        .parse()
        .map_err(|_| SprayError::InvalidData(format!("Bad longitude '{}'", place.lon)))?;
    let name = place
        .display_name
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| coordinates_label(lat, lon));
    Ok(LocationRef { lat, lon, name })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_result_is_parsed() {
        let places: Vec<NmPlace> = serde_json::from_str(
            r#"[{"lat": "44.4938", "lon": "11.3387", "display_name": "Bologna, Emilia-Romagna, Italia"}]"#,
        )
        .unwrap();
        let location = place_to_location(places.into_iter().next().unwrap()).unwrap();

        assert!((location.lat - 44.4938).abs() < 1e-9);
        assert_eq!(location.name, "Bologna, Emilia-Romagna, Italia");
    }

    #[test]
    fn nameless_place_uses_coordinates() {
        let place: NmPlace = serde_json::from_str(r#"{"lat": "45.1", "lon": "9.25"}"#).unwrap();
        let location = place_to_location(place).unwrap();
        assert_eq!(location.name, "45.10000, 9.25000");
    }

    #[test]
    fn bad_coordinates_are_rejected() {
        let place: NmPlace = serde_json::from_str(r#"{"lat": "nord", "lon": "9.25"}"#).unwrap();
        assert!(matches!(place_to_location(place), Err(SprayError::InvalidData(_))));
    }

    #[test]
    fn endpoint_encodes_query() {
        let client = NominatimClient::new(GeocodingConfig::default()).unwrap();
        let url = client
            .endpoint("search", &[("q", "Reggio Emilia")])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://nominatim.openstreetmap.org/search?q=Reggio+Emilia"
        );
    }
}
