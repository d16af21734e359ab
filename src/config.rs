use crate::error::{Result, SprayError};
use crate::models::PresetRegistry;
use dialoguer::{Confirm, Input, Password};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub location: Option<LocationConfig>,
    #[serde(default)]
    pub weather: WeatherConfig,
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    #[serde(default)]
    pub advisor: AdvisorConfig,
    #[serde(default)]
    pub server: ServerConfig,
    /// Custom records merged over the built-in presets
    #[serde(default)]
    pub presets: PresetRegistry,
}

/// Default field location, used when no coordinates are given on the command line.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LocationConfig {
    #[serde(default)]
    pub name: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_url")]
    pub base_url: String,
    #[serde(default = "default_timezone")]
    pub timezone: String,
    #[serde(default = "default_forecast_days")]
    pub forecast_days: u8,
}

fn default_weather_url() -> String {
    "https://api.open-meteo.com/v1/forecast".into()
}

fn default_timezone() -> String {
    "Europe/Rome".into()
}

fn default_forecast_days() -> u8 {
    2
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_url(),
            timezone: default_timezone(),
            forecast_days: default_forecast_days(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeocodingConfig {
    #[serde(default = "default_geocoding_url")]
    pub base_url: String,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    #[serde(default = "default_language")]
    pub language: String,
}

fn default_geocoding_url() -> String {
    "https://nominatim.openstreetmap.org".into()
}

fn default_user_agent() -> String {
    concat!("agrispray/", env!("CARGO_PKG_VERSION")).into()
}

fn default_language() -> String {
    "it".into()
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            base_url: default_geocoding_url(),
            user_agent: default_user_agent(),
            language: default_language(),
        }
    }
}

#[derive(Clone, Deserialize, Serialize)]
pub struct AdvisorConfig {
    /// Remote advisory endpoint; empty disables the remote opinion
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_advisor_timeout")]
    pub timeout_secs: u64,
}

fn default_enabled() -> bool {
    true
}

fn default_advisor_timeout() -> u64 {
    15
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            api_key: String::new(),
            enabled: default_enabled(),
            timeout_secs: default_advisor_timeout(),
        }
    }
}

impl AdvisorConfig {
    pub fn is_active(&self) -> bool {
        self.enabled && !self.url.is_empty()
    }
}

impl std::fmt::Debug for AdvisorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdvisorConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("enabled", &self.enabled)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Bind address of the mock advisory server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}

fn default_port() -> u16 {
    8787
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn input_error(e: dialoguer::Error) -> SprayError {
    SprayError::Config(format!("Input error: {}", e))
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(SprayError::Config(format!(
                "Config file not found at {:?}. Run `agrispray init` to set up.",
                config_path
            )));
        }

        let config_str = std::fs::read_to_string(&config_path)
            .map_err(|e| SprayError::Config(format!("Failed to read config: {}", e)))?;

        Self::parse(&config_str)
    }

    /// Like [`Config::load`], but a missing file in the standard locations
    /// yields the compiled-in defaults. An explicit path must exist.
    pub fn load_or_default(config_override: Option<PathBuf>) -> Result<Self> {
        if config_override.is_none() && !Self::exists(None) {
            tracing::debug!("No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load(config_override)
    }

    pub fn parse(content: &str) -> Result<Self> {
        // Substitute environment variables
        let content = Self::substitute_env_vars(content);

        serde_yaml::from_str(&content)
            .map_err(|e| SprayError::Config(format!("Failed to parse config: {}", e)))
    }

    /// Built-in presets extended with the custom ones from this file.
    pub fn preset_registry(&self) -> PresetRegistry {
        PresetRegistry::builtin().extended_with(&self.presets)
    }

    /// Search for config.yaml in standard locations.
    /// Returns the path of the first found config, or the XDG default path if none found.
    fn find_config_path() -> Result<PathBuf> {
        let local_config = PathBuf::from("config/config.yaml");
        if local_config.exists() {
            return Ok(local_config);
        }

        let default_path = Self::default_config_path()?;
        Ok(default_path)
    }

    /// Returns true if a config file can be found in any standard location.
    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(p) => p.exists(),
            None => Self::find_config_path()
                .map(|p| p.exists())
                .unwrap_or(false),
        }
    }

    /// Default path for writing new config files (~/.config/agrispray/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| SprayError::Config("Cannot determine config directory".into()))?
            .join("agrispray");
        Ok(config_dir.join("config.yaml"))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the new Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up agrispray.");
        println!();

        println!("Default field (leave name blank to skip)");
        let name: String = Input::new()
            .with_prompt("  Name")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(input_error)?;

        let location = if name.is_empty() {
            None
        } else {
            let latitude: f64 = Input::new()
                .with_prompt("  Latitude")
                .default(44.4949)
                .interact_text()
                .map_err(input_error)?;
            let longitude: f64 = Input::new()
                .with_prompt("  Longitude")
                .default(11.3426)
                .interact_text()
                .map_err(input_error)?;
            Some(LocationConfig {
                name: Some(name),
                latitude,
                longitude,
            })
        };

        println!();

        println!("Weather forecast");
        let timezone: String = Input::new()
            .with_prompt("  Timezone")
            .default(default_timezone())
            .interact_text()
            .map_err(input_error)?;

        println!();

        println!("Remote advisory (leave URL blank to skip)");
        let url: String = Input::new()
            .with_prompt("  URL")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(input_error)?;

        let advisor = if url.is_empty() {
            AdvisorConfig::default()
        } else {
            let api_key: String = Password::new()
                .with_prompt("  API key")
                .allow_empty_password(true)
                .interact()
                .map_err(input_error)?;
            let enabled = Confirm::new()
                .with_prompt("  Ask the remote advisor on every report?")
                .default(true)
                .interact()
                .map_err(input_error)?;
            AdvisorConfig {
                url,
                api_key,
                enabled,
                ..AdvisorConfig::default()
            }
        };

        println!();

        let config = Config {
            location,
            weather: WeatherConfig {
                timezone,
                ..WeatherConfig::default()
            },
            advisor,
            ..Config::default()
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| SprayError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# agrispray configuration\n# Generated by `agrispray init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    fn substitute_env_vars(content: &str) -> String {
        let mut result = content.to_string();

        // Find all ${VAR_NAME} patterns and substitute
        let Ok(re) = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") else {
            return result;
        };

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let placeholder = &cap[0];
            if let Ok(value) = std::env::var(var_name) {
                result = result.replace(placeholder, &value);
            }
        }

        result
    }

    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        // CLI override takes priority
        if let Some(dir) = data_dir_override {
            std::fs::create_dir_all(dir)?;
            return Ok(dir.clone());
        }

        if let Ok(dir) = std::env::var("AGRISPRAY_DATA_DIR") {
            let p = PathBuf::from(dir);
            std::fs::create_dir_all(&p)?;
            return Ok(p);
        }

        let data_dir = dirs::data_dir()
            .ok_or_else(|| SprayError::Config("Cannot determine data directory".into()))?
            .join("agrispray");

        std::fs::create_dir_all(&data_dir)?;
        Ok(data_dir)
    }

    pub fn db_path(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        Ok(Self::data_dir(data_dir_override)?.join("agrispray.db"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let config = Config::parse("{}").unwrap();
        assert!(config.location.is_none());
        assert_eq!(config.weather.timezone, "Europe/Rome");
        assert_eq!(config.weather.forecast_days, 2);
        assert_eq!(config.server.port, 8787);
        assert!(!config.advisor.is_active());
    }

    #[test]
    fn env_vars_are_substituted() {
        std::env::set_var("AGRISPRAY_TEST_ADVISOR_KEY", "segreto");
        let config = Config::parse(
            "advisor:\n  url: http://127.0.0.1:8787/api/ai/agronomist-advice\n  api_key: ${AGRISPRAY_TEST_ADVISOR_KEY}\n",
        )
        .unwrap();
        assert_eq!(config.advisor.api_key, "segreto");
        assert!(config.advisor.is_active());
    }

    #[test]
    fn advisor_key_is_redacted() {
        let advisor = AdvisorConfig {
            api_key: "segreto".into(),
            ..AdvisorConfig::default()
        };
        let debug = format!("{:?}", advisor);
        assert!(!debug.contains("segreto"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn custom_presets_extend_builtins() {
        let config = Config::parse(
            r#"
presets:
  crops:
    mais:
      label: Mais
      thresholds:
        windGood: 5.5
        tempGoodMax: "alto"
"#,
        )
        .unwrap();
        let registry = config.preset_registry();
        let mais = registry.crop("mais").unwrap();
        assert_eq!(mais.thresholds.wind_good, Some(5.5));
        assert_eq!(mais.thresholds.temp_good_max, None);
        assert!(registry.crop("vite").is_some());
    }

    #[test]
    fn invalid_yaml_is_config_error() {
        assert!(matches!(
            Config::parse("weather: [unterminated"),
            Err(SprayError::Config(_))
        ));
    }
}
