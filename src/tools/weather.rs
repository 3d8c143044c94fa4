use super::{str_param, ParameterDocs, Tool, ToolError};
use crate::config::ApiSettings;
use crate::core::{title_case, DEFAULT_CITY};
use crate::models::ToolKind;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

const CURRENT_FIELDS: &str =
    "temperature_2m,relative_humidity_2m,apparent_temperature,weather_code,wind_speed_10m,wind_direction_10m";

/// Current conditions from Open-Meteo, with OpenWeatherMap as a keyed backup
pub struct WeatherTool {
    client: Client,
    geocoding_base: String,
    forecast_base: String,
    openweather_base: String,
    openweather_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Units {
    pub temperature: String,
    pub wind_speed: String,
}

impl Default for Units {
    fn default() -> Self {
        Self {
            temperature: "°C".to_string(),
            wind_speed: "km/h".to_string(),
        }
    }
}

/// Data returned in a successful tool result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherData {
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub longitude: Option<f64>,
    pub temperature: f64,
    pub feels_like: Option<f64>,
    pub humidity: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weather_code: Option<u32>,
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub wind_speed: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_direction: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pressure: Option<f64>,
    #[serde(default)]
    pub units: Units,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeHit>,
}

#[derive(Debug, Deserialize)]
struct GeocodeHit {
    latitude: f64,
    longitude: f64,
    #[serde(default)]
    country: Option<String>,
    #[serde(default)]
    admin1: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    #[serde(default)]
    current: CurrentConditions,
}

#[derive(Debug, Default, Deserialize)]
struct CurrentConditions {
    #[serde(default)]
    temperature_2m: f64,
    #[serde(default)]
    relative_humidity_2m: f64,
    #[serde(default)]
    apparent_temperature: f64,
    #[serde(default)]
    weather_code: u32,
    #[serde(default)]
    wind_speed_10m: f64,
    #[serde(default)]
    wind_direction_10m: f64,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherResponse {
    name: String,
    sys: OpenWeatherSys,
    main: OpenWeatherMain,
    #[serde(default)]
    weather: Vec<OpenWeatherCondition>,
    wind: OpenWeatherWind,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherMain {
    temp: f64,
    feels_like: f64,
    humidity: f64,
    pressure: f64,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherCondition {
    main: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct OpenWeatherWind {
    speed: f64,
}

/// Human readable text for a WMO weather interpretation code
pub fn weather_condition(code: u32) -> &'static str {
    match code {
        0 => "Clear sky",
        1 => "Mainly clear",
        2 => "Partly cloudy",
        3 => "Overcast",
        45 => "Fog",
        48 => "Depositing rime fog",
        51 => "Light drizzle",
        53 => "Moderate drizzle",
        55 => "Dense drizzle",
        61 => "Slight rain",
        63 => "Moderate rain",
        65 => "Heavy rain",
        71 => "Slight snow",
        73 => "Moderate snow",
        75 => "Heavy snow",
        80 => "Slight rain showers",
        81 => "Moderate rain showers",
        82 => "Violent rain showers",
        95 => "Thunderstorm",
        96 => "Thunderstorm with slight hail",
        99 => "Thunderstorm with heavy hail",
        _ => "Unknown",
    }
}

fn check_status(service: &str, status: StatusCode) -> Result<(), ToolError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(ToolError::from_status(service, status))
    }
}

impl WeatherTool {
    pub fn new(client: Client, apis: &ApiSettings) -> Self {
        Self {
            client,
            geocoding_base: apis.geocoding_api_base.trim_end_matches('/').to_string(),
            forecast_base: apis.weather_api_base.trim_end_matches('/').to_string(),
            openweather_base: apis.openweather_api_base.trim_end_matches('/').to_string(),
            openweather_key: apis.openweather_api_key.clone().filter(|k| !k.trim().is_empty()),
        }
    }

    /// Current weather for `city`, trying OpenWeatherMap if Open-Meteo fails
    pub async fn current_weather(&self, city: &str) -> Result<WeatherData, ToolError> {
        match self.open_meteo(city).await {
            Ok(data) => Ok(data),
            Err(e) => match &self.openweather_key {
                Some(key) => {
                    tracing::warn!("Open-Meteo failed for {} ({}), trying OpenWeatherMap", city, e);
                    self.openweather(city, key).await
                }
                None => Err(e),
            },
        }
    }

    async fn open_meteo(&self, city: &str) -> Result<WeatherData, ToolError> {
        let geocode_url = format!(
            "{}/search?name={}&count=1&language=en&format=json",
            self.geocoding_base,
            urlencoding::encode(city)
        );

        tracing::debug!("Geocoding city: {}", city);

        let response = self.client.get(&geocode_url).send().await?;
        check_status("Open-Meteo geocoding", response.status())?;

        let geocode: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| ToolError::InvalidResponse(format!("Failed to parse geocoding response: {}", e)))?;

        let location = geocode
            .results
            .into_iter()
            .next()
            .ok_or_else(|| ToolError::NotFound(format!("No location found for {}", city)))?;

        let forecast_url = format!(
            "{}/forecast?latitude={}&longitude={}&current={}&timezone=auto",
            self.forecast_base, location.latitude, location.longitude, CURRENT_FIELDS
        );

        let response = self.client.get(&forecast_url).send().await?;
        check_status("Open-Meteo forecast", response.status())?;

        let forecast: ForecastResponse = response
            .json()
            .await
            .map_err(|e| ToolError::InvalidResponse(format!("Failed to parse forecast response: {}", e)))?;

        let current = forecast.current;

        Ok(WeatherData {
            city: city.to_string(),
            country: location.country.unwrap_or_default(),
            region: location.admin1,
            latitude: Some(location.latitude),
            longitude: Some(location.longitude),
            temperature: current.temperature_2m,
            feels_like: Some(current.apparent_temperature),
            humidity: current.relative_humidity_2m,
            weather_code: Some(current.weather_code),
            condition: weather_condition(current.weather_code).to_string(),
            description: None,
            wind_speed: current.wind_speed_10m,
            wind_direction: Some(current.wind_direction_10m),
            pressure: None,
            units: Units::default(),
            source: "open-meteo_api".to_string(),
            note: None,
        })
    }

    async fn openweather(&self, city: &str, key: &str) -> Result<WeatherData, ToolError> {
        let url = format!(
            "{}/weather?q={}&appid={}&units=metric",
            self.openweather_base,
            urlencoding::encode(city),
            urlencoding::encode(key)
        );

        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ToolError::NotFound(format!("OpenWeatherMap has no data for {}", city)));
        }
        check_status("OpenWeatherMap", response.status())?;

        let body: OpenWeatherResponse = response
            .json()
            .await
            .map_err(|e| ToolError::InvalidResponse(format!("Failed to parse OpenWeatherMap response: {}", e)))?;

        let (condition, description) = body
            .weather
            .into_iter()
            .next()
            .map(|w| (w.main, Some(w.description)))
            .unwrap_or_else(|| ("Unknown".to_string(), None));

        Ok(WeatherData {
            city: body.name,
            country: body.sys.country,
            region: None,
            latitude: None,
            longitude: None,
            temperature: body.main.temp,
            feels_like: Some(body.main.feels_like),
            humidity: body.main.humidity,
            weather_code: None,
            condition,
            description,
            // metric units report m/s
            wind_speed: (body.wind.speed * 3.6 * 10.0).round() / 10.0,
            wind_direction: None,
            pressure: Some(body.main.pressure),
            units: Units::default(),
            source: "openweathermap_api".to_string(),
            note: None,
        })
    }
}

/// Canned conditions for when no weather API is reachable
pub fn fallback_data(city: &str) -> WeatherData {
    let (temperature, condition, humidity, wind_speed) = match title_case(city).as_str() {
        "Tokyo" => (25.5, "Clear sky", 60.0, 12.3),
        "London" => (14.0, "Overcast", 85.0, 15.2),
        "New York" => (22.0, "Partly cloudy", 55.0, 8.7),
        "Paris" => (19.5, "Light drizzle", 70.0, 10.5),
        "Berlin" => (16.0, "Moderate rain", 75.0, 12.8),
        "Mumbai" => (32.0, "Clear sky", 80.0, 6.5),
        "Sydney" => (24.5, "Sunny", 65.0, 14.2),
        _ => (20.0, "Unknown", 50.0, 10.0),
    };

    WeatherData {
        city: city.to_string(),
        country: String::new(),
        region: None,
        latitude: None,
        longitude: None,
        temperature,
        feels_like: Some(temperature),
        humidity,
        weather_code: None,
        condition: condition.to_string(),
        description: None,
        wind_speed,
        wind_direction: None,
        pressure: None,
        units: Units::default(),
        source: "fallback_data".to_string(),
        note: Some("Using fallback data (API unavailable)".to_string()),
    }
}

fn city_param(params: &Map<String, Value>) -> &str {
    str_param(params, "city").unwrap_or(DEFAULT_CITY)
}

#[async_trait]
impl Tool for WeatherTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Weather
    }

    fn description(&self) -> &'static str {
        "Get current weather"
    }

    fn parameters(&self) -> ParameterDocs {
        ParameterDocs::from([("city".to_string(), "City name (string, required)".to_string())])
    }

    fn validate(&self, params: &Map<String, Value>) -> bool {
        str_param(params, "city").is_some()
    }

    async fn execute(&self, params: &Map<String, Value>) -> Result<Value, ToolError> {
        let city = city_param(params);
        tracing::debug!("Getting weather for: {}", city);

        let data = self.current_weather(city).await?;
        serde_json::to_value(data).map_err(|e| ToolError::InvalidResponse(e.to_string()))
    }

    fn fallback(&self, params: &Map<String, Value>) -> Option<Value> {
        serde_json::to_value(fallback_data(city_param(params))).ok()
    }

    /// A weather step always degrades to canned conditions rather than failing
    fn fallback_on(&self, _error: &ToolError) -> bool {
        true
    }
}
