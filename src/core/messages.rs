//! Texts the bot composes itself

use crate::infrastructure::providers::{NewsStory, WeatherReport};
use chrono::{DateTime, FixedOffset, Local, TimeDelta, Utc};
use minijinja::{Environment, context};
use teloxide::utils::html;

pub const WEATHER_FALLBACK: &str =
    "Please check the city name. Only city names written in English are supported.";

pub const NEWS_FALLBACK: &str = "Oops, something went wrong.";

const WEATHER_TEMPLATE: &str = "<b>{{ now }}</b>
Weather in: {{ city }}
Temperature: {{ temperature }}°C
Humidity: {{ humidity }}%
Pressure: {{ pressure }} hPa
Wind: {{ wind_speed }} m/s
Sunrise: {{ sunrise }}
Sunset: {{ sunset }}
Day length: {{ day_length }}";

const NEWS_TEMPLATE: &str = "<strong>Your random popular story:</strong>
{{ url }}
<strong>{{ title }}</strong>
{{ summary }}";

const HEADER_FORMAT: &str = "%Y-%m-%d %H:%M";
const SUN_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

fn render(source: &str, ctx: minijinja::Value) -> Result<String, minijinja::Error> {
    Environment::new().render_str(source, ctx)
}

/// HTML weather report. Values are escaped; `now` is the header timestamp.
pub fn weather_report(
    report: &WeatherReport,
    now: DateTime<Local>,
) -> Result<String, minijinja::Error> {
    render(
        WEATHER_TEMPLATE,
        context! {
            now => now.format(HEADER_FORMAT).to_string(),
            city => html::escape(&report.city),
            temperature => report.temperature.to_string(),
            humidity => report.humidity.to_string(),
            pressure => report.pressure.to_string(),
            wind_speed => report.wind_speed.to_string(),
            sunrise => city_time(report.sunrise, report.utc_offset),
            sunset => city_time(report.sunset, report.utc_offset),
            day_length => day_length(report.sunset - report.sunrise),
        },
    )
}

/// HTML message presenting one news story.
pub fn news_story(story: &NewsStory) -> Result<String, minijinja::Error> {
    render(
        NEWS_TEMPLATE,
        context! {
            url => html::escape(&story.url),
            title => html::escape(&story.title),
            summary => html::escape(&story.summary),
        },
    )
}

fn city_time(at: DateTime<Utc>, utc_offset: Option<i32>) -> String {
    match utc_offset.and_then(FixedOffset::east_opt) {
        Some(offset) => at.with_timezone(&offset).format(SUN_FORMAT).to_string(),
        None => at.format(SUN_FORMAT).to_string(),
    }
}

/// Formats a span as `H:MM:SS`.
pub fn day_length(span: TimeDelta) -> String {
    let seconds = span.num_seconds();
    let sign = if seconds < 0 { "-" } else { "" };
    let seconds = seconds.unsigned_abs();

    format!(
        "{sign}{}:{:02}:{:02}",
        seconds / 3600,
        seconds % 3600 / 60,
        seconds % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn london() -> WeatherReport {
        WeatherReport {
            city: "London".to_owned(),
            temperature: 20.0,
            humidity: 50.0,
            pressure: 1012.0,
            wind_speed: 3.5,
            sunrise: Utc.with_ymd_and_hms(2023, 7, 26, 4, 15, 30).unwrap(),
            sunset: Utc.with_ymd_and_hms(2023, 7, 26, 19, 45, 45).unwrap(),
            utc_offset: Some(3600),
        }
    }

    #[test]
    fn test_day_length_format() {
        assert_eq!(day_length(TimeDelta::seconds(52215)), "14:30:15");
        assert_eq!(day_length(TimeDelta::seconds(59)), "0:00:59");
        assert_eq!(day_length(TimeDelta::seconds(-61)), "-0:01:01");
    }

    #[test]
    fn test_weather_report_lists_every_field() {
        let now = Local.with_ymd_and_hms(2023, 7, 26, 12, 30, 0).unwrap();
        let text = weather_report(&london(), now).unwrap();

        assert!(text.starts_with("<b>2023-07-26 12:30</b>"));
        assert!(text.contains("Weather in: London"));
        assert!(text.contains("Temperature: 20°C"));
        assert!(text.contains("Humidity: 50%"));
        assert!(text.contains("Pressure: 1012 hPa"));
        assert!(text.contains("Wind: 3.5 m/s"));
        assert!(text.contains("Sunrise: 2023-07-26 05:15:30"));
        assert!(text.contains("Sunset: 2023-07-26 20:45:45"));
        assert!(text.contains("Day length: 15:30:15"));
    }

    #[test]
    fn test_weather_report_without_offset_uses_utc() {
        let mut report = london();
        report.utc_offset = None;

        let text = weather_report(&report, Local::now()).unwrap();
        assert!(text.contains("Sunrise: 2023-07-26 04:15:30"));
    }

    #[test]
    fn test_news_story_escapes_markup() {
        let story = NewsStory {
            url: "https://example.com/story?a=1&b=2".to_owned(),
            title: "Q&A: <Theaters>".to_owned(),
            summary: "Stages go dark.".to_owned(),
        };

        let text = news_story(&story).unwrap();
        assert!(text.starts_with("<strong>Your random popular story:</strong>"));
        assert!(text.contains("https://example.com/story?a=1&amp;b=2"));
        assert!(text.contains("<strong>Q&amp;A: &lt;Theaters&gt;</strong>"));
        assert!(text.contains("Stages go dark."));
    }
}
