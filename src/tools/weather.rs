// ABOUTME: WeatherForecastTool - US forecasts from the weather.gov API.
// ABOUTME: Resolves zip codes to coordinates, then points -> forecast periods.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::config::GatewayConfig;
use crate::error::{ConfigError, ToolError};
use crate::http;
use crate::tool::{Tool, ToolResult, parse_params};

const WEATHER_SERVICE: &str = "weather.gov API";
const ZIP_SERVICE: &str = "zip code lookup";
const HOURLY_PERIOD_LIMIT: usize = 24;

/// A US location as supplied by the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Location {
    Zip(String),
    Coordinates { latitude: f64, longitude: f64 },
}

impl FromStr for Location {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == 5 && s.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(Location::Zip(s.to_string()));
        }

        let invalid = || {
            ToolError::InvalidParams(format!(
                "Invalid location {s:?}. Use a 5-digit US zip code (e.g. '10001') or 'latitude,longitude' (e.g. '39.7456,-97.0892')"
            ))
        };

        let (lat, lon) = s.split_once(',').ok_or_else(invalid)?;
        let latitude: f64 = lat.trim().parse().map_err(|_| invalid())?;
        let longitude: f64 = lon.trim().parse().map_err(|_| invalid())?;
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(invalid());
        }
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(ToolError::InvalidParams(format!(
                "Coordinates out of range: latitude must be within [-90, 90] and longitude within [-180, 180], got {latitude},{longitude}"
            )));
        }
        Ok(Location::Coordinates {
            latitude,
            longitude,
        })
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Zip(zip) => write!(f, "{zip}"),
            Location::Coordinates {
                latitude,
                longitude,
            } => write!(f, "{latitude},{longitude}"),
        }
    }
}

/// Forecast granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ForecastKind {
    /// Twelve-hour day/night periods.
    Forecast,
    Hourly,
}

impl FromStr for ForecastKind {
    type Err = ToolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forecast" | "" => Ok(ForecastKind::Forecast),
            "hourly" => Ok(ForecastKind::Hourly),
            other => Err(ToolError::InvalidParams(format!(
                "`forecast_type` must be 'forecast' or 'hourly', got {other:?}"
            ))),
        }
    }
}

/// Resolved coordinates plus a human-readable place.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
}

/// One forecast period as reported to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastPeriod {
    pub number: u32,
    pub name: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub is_daytime: Option<bool>,
    pub temperature: serde_json::Value,
    pub temperature_unit: Option<String>,
    pub wind_speed: Option<String>,
    pub wind_direction: Option<String>,
    pub short_forecast: String,
    pub detailed_forecast: String,
}

#[derive(Deserialize)]
struct ZipResponse {
    #[serde(default)]
    places: Vec<ZipPlace>,
}

#[derive(Deserialize)]
struct ZipPlace {
    #[serde(rename = "place name")]
    place_name: String,
    #[serde(rename = "state abbreviation")]
    state_abbreviation: String,
    latitude: String,
    longitude: String,
}

#[derive(Deserialize)]
struct PointsResponse {
    properties: PointProperties,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PointProperties {
    forecast: Option<String>,
    forecast_hourly: Option<String>,
    #[serde(default)]
    relative_location: Option<RelativeLocation>,
}

#[derive(Deserialize)]
struct RelativeLocation {
    properties: RelativeLocationProperties,
}

#[derive(Deserialize)]
struct RelativeLocationProperties {
    city: Option<String>,
    state: Option<String>,
}

#[derive(Deserialize)]
struct ForecastResponse {
    properties: ForecastProperties,
}

#[derive(Deserialize)]
struct ForecastProperties {
    #[serde(default)]
    periods: Vec<RawPeriod>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawPeriod {
    #[serde(default)]
    number: u32,
    #[serde(default)]
    name: String,
    start_time: Option<String>,
    end_time: Option<String>,
    is_daytime: Option<bool>,
    #[serde(default)]
    temperature: serde_json::Value,
    temperature_unit: Option<String>,
    wind_speed: Option<String>,
    wind_direction: Option<String>,
    #[serde(default)]
    short_forecast: String,
    #[serde(default)]
    detailed_forecast: String,
}

impl From<RawPeriod> for ForecastPeriod {
    fn from(p: RawPeriod) -> Self {
        Self {
            number: p.number,
            name: p.name,
            start_time: p.start_time,
            end_time: p.end_time,
            is_daytime: p.is_daytime,
            temperature: p.temperature,
            temperature_unit: p.temperature_unit,
            wind_speed: p.wind_speed,
            wind_direction: p.wind_direction,
            short_forecast: p.short_forecast,
            detailed_forecast: p.detailed_forecast,
        }
    }
}

/// Tool for US weather forecasts.
pub struct WeatherForecastTool {
    client: reqwest::Client,
    weather_url: String,
    zip_url: String,
}

impl WeatherForecastTool {
    /// Create the tool from the gateway configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_client(
            http::build_client(config)?,
            &config.weather_api_url,
            &config.zip_lookup_url,
        ))
    }

    /// Create with a custom reqwest client and upstream base URLs.
    pub fn with_client(client: reqwest::Client, weather_url: &str, zip_url: &str) -> Self {
        Self {
            client,
            weather_url: weather_url.trim_end_matches('/').to_string(),
            zip_url: zip_url.trim_end_matches('/').to_string(),
        }
    }

    async fn resolve_zip(&self, zip: &str) -> Result<ResolvedLocation, ToolError> {
        let url = format!("{}/us/{}", self.zip_url, zip);
        tracing::debug!(%url, "zip code lookup");
        let data: ZipResponse = http::fetch_json(
            ZIP_SERVICE,
            self.client.get(&url),
            || format!("Zip code {zip} not found"),
            "",
        )
        .await?;

        let place = data
            .places
            .into_iter()
            .next()
            .ok_or_else(|| ToolError::NotFound(format!("Zip code {zip} not found")))?;
        let parse = |field: &str, raw: &str| {
            raw.trim()
                .parse::<f64>()
                .map_err(|_| ToolError::MalformedResponse {
                    service: ZIP_SERVICE,
                    reason: format!("{field} {raw:?} is not a number"),
                })
        };

        Ok(ResolvedLocation {
            latitude: parse("latitude", &place.latitude)?,
            longitude: parse("longitude", &place.longitude)?,
            city: Some(place.place_name),
            state: Some(place.state_abbreviation),
            zip_code: Some(zip.to_string()),
        })
    }

    async fn points(&self, latitude: f64, longitude: f64) -> Result<PointProperties, ToolError> {
        let coords = format!("{},{}", format_coord(latitude), format_coord(longitude));
        let url = format!("{}/points/{}", self.weather_url, coords);
        tracing::debug!(%url, "weather.gov points lookup");
        let data: PointsResponse = http::fetch_json(
            WEATHER_SERVICE,
            self.client
                .get(&url)
                .header(reqwest::header::ACCEPT, "application/geo+json"),
            || {
                format!(
                    "Location {coords} is outside the area covered by weather.gov (US only)"
                )
            },
            "",
        )
        .await?;
        Ok(data.properties)
    }

    async fn periods(&self, forecast_url: &str) -> Result<Vec<RawPeriod>, ToolError> {
        tracing::debug!(url = forecast_url, "weather.gov forecast");
        let data: ForecastResponse = http::fetch_json(
            WEATHER_SERVICE,
            self.client
                .get(forecast_url)
                .header(reqwest::header::ACCEPT, "application/geo+json"),
            || "Forecast is not available for this location".to_string(),
            "",
        )
        .await?;
        Ok(data.properties.periods)
    }
}

/// weather.gov accepts at most four decimal places.
fn format_coord(value: f64) -> String {
    let s = format!("{value:.4}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[async_trait]
impl Tool for WeatherForecastTool {
    fn name(&self) -> &str {
        "weather_forecast"
    }

    fn description(&self) -> &str {
        "Get weather forecast for a US location using the weather.gov API. Accepts a 5-digit zip code or 'latitude,longitude'."
    }

    fn schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "location": {
                    "type": "string",
                    "description": "5-digit US zip code (e.g., '10001') or latitude,longitude (e.g., '39.7456,-97.0892')"
                },
                "forecast_type": {
                    "type": "string",
                    "enum": ["forecast", "hourly"],
                    "description": "'forecast' for 12-hour periods (default), 'hourly' for hourly forecast",
                    "default": "forecast"
                }
            },
            "required": ["location"]
        })
    }

    async fn invoke(&self, params: serde_json::Value) -> Result<ToolResult, ToolError> {
        #[derive(Deserialize)]
        struct Params {
            location: String,
            #[serde(default)]
            forecast_type: Option<String>,
        }

        let params: Params = parse_params(params)?;
        let location: Location = params.location.parse()?;
        let kind: ForecastKind = params.forecast_type.as_deref().unwrap_or("forecast").parse()?;

        let mut resolved = match &location {
            Location::Zip(zip) => self.resolve_zip(zip).await?,
            Location::Coordinates {
                latitude,
                longitude,
            } => ResolvedLocation {
                latitude: *latitude,
                longitude: *longitude,
                city: None,
                state: None,
                zip_code: None,
            },
        };

        let point = self.points(resolved.latitude, resolved.longitude).await?;
        if let Some(relative) = point.relative_location {
            resolved.city = resolved.city.or(relative.properties.city);
            resolved.state = resolved.state.or(relative.properties.state);
        }

        let forecast_url = match kind {
            ForecastKind::Forecast => point.forecast,
            ForecastKind::Hourly => point.forecast_hourly,
        }
        .ok_or_else(|| ToolError::MalformedResponse {
            service: WEATHER_SERVICE,
            reason: "points response has no forecast URL".into(),
        })?;

        let mut periods: Vec<ForecastPeriod> = self
            .periods(&forecast_url)
            .await?
            .into_iter()
            .map(ForecastPeriod::from)
            .collect();
        if kind == ForecastKind::Hourly {
            periods.truncate(HOURLY_PERIOD_LIMIT);
        }
        if periods.is_empty() {
            return Err(ToolError::MalformedResponse {
                service: WEATHER_SERVICE,
                reason: "forecast contains no periods".into(),
            });
        }
        let period_count = periods.len();

        Ok(ToolResult::success(json!({
            "location": resolved,
            "forecast_type": kind,
            "periods": periods,
        }))
        .with_detail("location_input", location.to_string())
        .with_detail("forecast_url", forecast_url)
        .with_detail("period_count", period_count))
    }
}
