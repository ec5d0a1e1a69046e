//! Application settings, read from the environment (and `.env`, if present)

use crate::error::ConfigError;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_WEATHER_API_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
const DEFAULT_NEWS_API_URL: &str = "https://api.nytimes.com/svc/mostpopular/v2/emailed/7.json";

#[derive(Clone)]
pub struct Settings {
    pub telegram_token: String,
    pub database_url: String,
    pub database_max_connections: u32,
    pub weather_api_token: String,
    pub weather_api_url: String,
    pub news_api_token: String,
    pub news_api_url: String,
    /// Upper bound for a single weather or news lookup.
    pub provider_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            telegram_token: String::new(),
            database_url: "sqlite://db.sqlite3".to_owned(),
            database_max_connections: 5,
            weather_api_token: String::new(),
            weather_api_url: DEFAULT_WEATHER_API_URL.to_owned(),
            news_api_token: String::new(),
            news_api_url: DEFAULT_NEWS_API_URL.to_owned(),
            provider_timeout: Duration::from_secs(10),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Settings, ConfigError> {
        dotenvy::dotenv().ok();
        Settings::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary key lookup, falling back to defaults for
    /// everything except the bot token.
    pub fn from_lookup<F>(lookup: F) -> Result<Settings, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();

        let telegram_token = lookup("TELOXIDE_TOKEN")
            .filter(|token| !token.trim().is_empty())
            .ok_or(ConfigError::Missing("TELOXIDE_TOKEN"))?;

        let database_max_connections =
            parse_positive(&lookup, "DATABASE_MAX_CONNECTIONS")?.unwrap_or(defaults.database_max_connections);

        let provider_timeout = parse_positive::<u64, _>(&lookup, "PROVIDER_TIMEOUT_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.provider_timeout);

        Ok(Settings {
            telegram_token,
            database_url: lookup("DATABASE_URL").unwrap_or(defaults.database_url),
            database_max_connections,
            weather_api_token: lookup("OPEN_WEATHERMAP_TOKEN").unwrap_or_default(),
            weather_api_url: lookup("WEATHER_API_URL").unwrap_or(defaults.weather_api_url),
            news_api_token: lookup("NY_TIMES_API_TOKEN").unwrap_or_default(),
            news_api_url: lookup("NEWS_API_URL").unwrap_or(defaults.news_api_url),
            provider_timeout,
        })
    }
}

fn parse_positive<T, F>(lookup: &F, var: &'static str) -> Result<Option<T>, ConfigError>
where
    T: FromStr + PartialOrd + Default,
    F: Fn(&str) -> Option<String>,
{
    let Some(value) = lookup(var) else {
        return Ok(None);
    };

    match value.trim().parse::<T>() {
        Ok(parsed) if parsed > T::default() => Ok(Some(parsed)),
        _ => Err(ConfigError::Invalid { var, value }),
    }
}

impl fmt::Debug for Settings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settings")
            .field("telegram_token", &"<redacted>")
            .field("database_url", &self.database_url)
            .field("database_max_connections", &self.database_max_connections)
            .field("weather_api_token", &"<redacted>")
            .field("weather_api_url", &self.weather_api_url)
            .field("news_api_token", &"<redacted>")
            .field("news_api_url", &self.news_api_url)
            .field("provider_timeout", &self.provider_timeout)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_apply_when_only_token_is_set() {
        let settings = Settings::from_lookup(lookup_from(&[("TELOXIDE_TOKEN", "123:abc")])).unwrap();

        assert_eq!(settings.telegram_token, "123:abc");
        assert_eq!(settings.database_url, "sqlite://db.sqlite3");
        assert_eq!(settings.database_max_connections, 5);
        assert_eq!(settings.provider_timeout, Duration::from_secs(10));
        assert_eq!(settings.weather_api_url, DEFAULT_WEATHER_API_URL);
        assert!(settings.news_api_token.is_empty());
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let result = Settings::from_lookup(lookup_from(&[("DATABASE_URL", "sqlite::memory:")]));
        assert!(matches!(result, Err(ConfigError::Missing("TELOXIDE_TOKEN"))));

        let blank = Settings::from_lookup(lookup_from(&[("TELOXIDE_TOKEN", "  ")]));
        assert!(matches!(blank, Err(ConfigError::Missing("TELOXIDE_TOKEN"))));
    }

    #[test]
    fn test_overrides_are_read() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("TELOXIDE_TOKEN", "t"),
            ("DATABASE_URL", "sqlite://bot.db"),
            ("DATABASE_MAX_CONNECTIONS", "8"),
            ("PROVIDER_TIMEOUT_SECS", "3"),
            ("OPEN_WEATHERMAP_TOKEN", "weather-key"),
            ("NY_TIMES_API_TOKEN", "news-key"),
        ]))
        .unwrap();

        assert_eq!(settings.database_url, "sqlite://bot.db");
        assert_eq!(settings.database_max_connections, 8);
        assert_eq!(settings.provider_timeout, Duration::from_secs(3));
        assert_eq!(settings.weather_api_token, "weather-key");
        assert_eq!(settings.news_api_token, "news-key");
    }

    #[test]
    fn test_zero_and_garbage_numbers_are_invalid() {
        let zero = Settings::from_lookup(lookup_from(&[
            ("TELOXIDE_TOKEN", "t"),
            ("PROVIDER_TIMEOUT_SECS", "0"),
        ]));
        assert!(matches!(
            zero,
            Err(ConfigError::Invalid { var: "PROVIDER_TIMEOUT_SECS", .. })
        ));

        let garbage = Settings::from_lookup(lookup_from(&[
            ("TELOXIDE_TOKEN", "t"),
            ("DATABASE_MAX_CONNECTIONS", "lots"),
        ]));
        assert!(matches!(
            garbage,
            Err(ConfigError::Invalid { var: "DATABASE_MAX_CONNECTIONS", .. })
        ));
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        let settings = Settings::from_lookup(lookup_from(&[
            ("TELOXIDE_TOKEN", "super-secret-token"),
            ("OPEN_WEATHERMAP_TOKEN", "weather-secret"),
        ]))
        .unwrap();

        let printed = format!("{settings:?}");
        assert!(!printed.contains("super-secret-token"));
        assert!(!printed.contains("weather-secret"));
    }
}
