//! HTTP clients for the OpenWeatherMap and New York Times APIs

use crate::config::Settings;
use crate::error::LookupError;
use crate::infrastructure::traits::{NewsProvider, WeatherProvider};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use di::{Ref, inject, injectable};
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub city: String,
    /// Degrees Celsius.
    pub temperature: f64,
    /// Percent.
    pub humidity: f64,
    /// hPa.
    pub pressure: f64,
    /// Metres per second.
    pub wind_speed: f64,
    pub sunrise: DateTime<Utc>,
    pub sunset: DateTime<Utc>,
    /// Shift of the city's local time from UTC, in seconds, when known.
    pub utc_offset: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewsStory {
    pub url: String,
    pub title: String,
    #[serde(rename = "abstract")]
    pub summary: String,
}

pub struct OpenWeatherMapProvider {
    client: reqwest::Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

#[injectable(WeatherProvider)]
impl OpenWeatherMapProvider {
    #[inject]
    pub fn new(settings: Ref<Settings>) -> Self {
        OpenWeatherMapProvider {
            client: reqwest::Client::new(),
            url: settings.weather_api_url.clone(),
            api_key: settings.weather_api_token.clone(),
            timeout: settings.provider_timeout,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherMapProvider {
    async fn fetch(&self, city: &str) -> Result<WeatherReport, LookupError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("q", city), ("appid", self.api_key.as_str()), ("units", "metric")])
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        parse_weather(&response.text().await?)
    }
}

pub struct NyTimesNewsProvider {
    client: reqwest::Client,
    url: String,
    api_key: String,
    timeout: Duration,
}

#[injectable(NewsProvider)]
impl NyTimesNewsProvider {
    #[inject]
    pub fn new(settings: Ref<Settings>) -> Self {
        NyTimesNewsProvider {
            client: reqwest::Client::new(),
            url: settings.news_api_url.clone(),
            api_key: settings.news_api_token.clone(),
            timeout: settings.provider_timeout,
        }
    }
}

#[async_trait]
impl NewsProvider for NyTimesNewsProvider {
    async fn fetch_top_stories(&self) -> Result<Vec<NewsStory>, LookupError> {
        let response = self
            .client
            .get(&self.url)
            .query(&[("api-key", &self.api_key)])
            .timeout(self.timeout)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(LookupError::Status(response.status().as_u16()));
        }

        parse_news(&response.text().await?)
    }
}

mod payloads {
    use super::NewsStory;
    use serde::Deserialize;

    #[derive(Deserialize)]
    pub struct Weather {
        pub name: String,
        pub main: Main,
        pub wind: Wind,
        pub sys: Sys,
        #[serde(default)]
        pub timezone: Option<i32>,
    }

    #[derive(Deserialize)]
    pub struct Main {
        pub temp: f64,
        pub humidity: f64,
        pub pressure: f64,
    }

    #[derive(Deserialize)]
    pub struct Wind {
        pub speed: f64,
    }

    #[derive(Deserialize)]
    pub struct Sys {
        pub sunrise: i64,
        pub sunset: i64,
    }

    #[derive(Deserialize)]
    pub struct News {
        pub results: Vec<NewsStory>,
    }
}

/// Parses an OpenWeatherMap "current weather" body (metric units).
pub fn parse_weather(body: &str) -> Result<WeatherReport, LookupError> {
    let payload: payloads::Weather = serde_json::from_str(body)?;

    Ok(WeatherReport {
        city: payload.name,
        temperature: payload.main.temp,
        humidity: payload.main.humidity,
        pressure: payload.main.pressure,
        wind_speed: payload.wind.speed,
        sunrise: timestamp(payload.sys.sunrise)?,
        sunset: timestamp(payload.sys.sunset)?,
        utc_offset: payload.timezone,
    })
}

/// Parses a "most popular" body; an empty result list is an error.
pub fn parse_news(body: &str) -> Result<Vec<NewsStory>, LookupError> {
    let payload: payloads::News = serde_json::from_str(body)?;

    if payload.results.is_empty() {
        return Err(LookupError::Empty);
    }

    Ok(payload.results)
}

fn timestamp(secs: i64) -> Result<DateTime<Utc>, LookupError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| LookupError::Malformed(format!("timestamp {secs} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONDON: &str = r#"{
        "coord": {"lon": -0.1257, "lat": 51.5085},
        "weather": [{"id": 803, "main": "Clouds", "description": "broken clouds"}],
        "main": {"temp": 20, "feels_like": 19.5, "pressure": 1012, "humidity": 50},
        "wind": {"speed": 3, "deg": 240},
        "sys": {"country": "GB", "sunrise": 1690343700, "sunset": 1690400100},
        "timezone": 3600,
        "name": "London",
        "cod": 200
    }"#;

    #[test]
    fn test_parse_weather_reads_metric_fields() {
        let report = parse_weather(LONDON).unwrap();

        assert_eq!(report.city, "London");
        assert_eq!(report.temperature, 20.0);
        assert_eq!(report.humidity, 50.0);
        assert_eq!(report.pressure, 1012.0);
        assert_eq!(report.wind_speed, 3.0);
        assert_eq!(report.sunrise.timestamp(), 1690343700);
        assert_eq!(report.sunset.timestamp(), 1690400100);
        assert_eq!(report.utc_offset, Some(3600));
    }

    #[test]
    fn test_parse_weather_without_timezone() {
        let body = r#"{"name": "Oslo", "main": {"temp": -3.5, "pressure": 990, "humidity": 80},
            "wind": {"speed": 7.2}, "sys": {"sunrise": 1700000000, "sunset": 1700020000}}"#;

        let report = parse_weather(body).unwrap();
        assert_eq!(report.temperature, -3.5);
        assert_eq!(report.utc_offset, None);
    }

    #[test]
    fn test_parse_weather_rejects_error_payload() {
        let body = r#"{"cod": "404", "message": "city not found"}"#;
        assert!(matches!(parse_weather(body), Err(LookupError::Malformed(_))));
    }

    #[test]
    fn test_parse_weather_rejects_non_json() {
        assert!(matches!(parse_weather("<html>"), Err(LookupError::Malformed(_))));
    }

    #[test]
    fn test_parse_news_keeps_order() {
        let body = r#"{"status": "OK", "num_results": 2, "results": [
            {"url": "https://example.com/a", "title": "A", "abstract": "first", "section": "U.S."},
            {"url": "https://example.com/b", "title": "B", "abstract": "second"}
        ]}"#;

        let stories = parse_news(body).unwrap();
        assert_eq!(stories.len(), 2);
        assert_eq!(stories[0].title, "A");
        assert_eq!(stories[0].summary, "first");
        assert_eq!(stories[1].url, "https://example.com/b");
    }

    #[test]
    fn test_parse_news_empty_results() {
        let body = r#"{"status": "OK", "results": []}"#;
        assert!(matches!(parse_news(body), Err(LookupError::Empty)));
    }

    #[test]
    fn test_parse_news_missing_results() {
        let body = r#"{"fault": {"faultstring": "Invalid ApiKey"}}"#;
        assert!(matches!(parse_news(body), Err(LookupError::Malformed(_))));
    }
}
