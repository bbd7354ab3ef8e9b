//! Human-readable rendering of a weather report.

use weatherly_core::Units;

use crate::types::{LookupOutcome, ReportSource, WeatherReport};

/// Lines in a report, not counting the cache notice.
pub const REPORT_LINE_COUNT: usize = 6;

pub const CACHE_NOTICE: &str = "(Data from cache)";

/// Render a report as display lines.
///
/// Six lines (header, temperature, feels like, humidity, conditions, wind),
/// followed by [`CACHE_NOTICE`] when the report was served from cache.
pub fn format_report(
    report: &WeatherReport,
    city: &str,
    units: Units,
    source: ReportSource,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(REPORT_LINE_COUNT + 1);

    lines.push(format!("Weather in {}:", title_case(city)));
    lines.push(format!(
        "Temperature: {}",
        format_temperature(report.main.temp, units)
    ));
    lines.push(format!(
        "Feels like: {}",
        format_temperature(report.main.feels_like, units)
    ));
    lines.push(format!("Humidity: {}%", report.main.humidity));
    lines.push(format!("Conditions: {}", title_case(report.description())));
    lines.push(format!(
        "Wind Speed: {} {}",
        format_wind_speed(report.wind.speed),
        units.wind_speed_unit()
    ));

    if source == ReportSource::Cache {
        lines.push(CACHE_NOTICE.to_string());
    }

    lines
}

/// Render a completed lookup.
pub fn format_outcome(outcome: &LookupOutcome) -> Vec<String> {
    format_report(&outcome.report, &outcome.city, outcome.units, outcome.source)
}

/// One decimal place plus the unit symbol, e.g. `15.0°C`.
pub fn format_temperature(temp: f64, units: Units) -> String {
    format!("{:.1}{}", temp, units.temperature_symbol())
}

/// Shortest round-trip form, keeping a trailing `.0` on whole numbers.
///
/// Speeds are decoded as `f64`, so an integer payload such as `"speed": 4`
/// is normalized and printed as `4.0`.
fn format_wind_speed(speed: f64) -> String {
    if speed.is_finite() && speed.fract() == 0.0 {
        format!("{:.1}", speed)
    } else {
        speed.to_string()
    }
}

/// Uppercase the first letter of every word and lowercase the rest.
///
/// A word starts at any letter not preceded by another letter, so
/// `saint-denis` becomes `Saint-Denis`.
pub fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_is_letter = false;

    for c in s.chars() {
        if prev_is_letter {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_is_letter = c.is_alphabetic();
    }

    out
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::types::{Condition, MainReadings, Wind};

    fn sample_report() -> WeatherReport {
        WeatherReport {
            main: MainReadings {
                temp: 15.0,
                feels_like: 14.2,
                humidity: 80,
            },
            weather: vec![Condition {
                description: "light rain".to_string(),
            }],
            wind: Wind { speed: 3.5 },
        }
    }

    #[test]
    fn test_metric_report() {
        let lines = format_report(&sample_report(), "paris", Units::Metric, ReportSource::Fresh);

        assert_eq!(
            lines,
            vec![
                "Weather in Paris:",
                "Temperature: 15.0°C",
                "Feels like: 14.2°C",
                "Humidity: 80%",
                "Conditions: Light Rain",
                "Wind Speed: 3.5 m/s",
            ]
        );
    }

    #[test]
    fn test_imperial_report() {
        let mut report = sample_report();
        report.main.temp = 59.04;
        report.main.feels_like = 57.56;
        report.wind.speed = 7.83;

        let lines = format_report(&report, "new york", Units::Imperial, ReportSource::Fresh);

        assert_eq!(lines[0], "Weather in New York:");
        assert_eq!(lines[1], "Temperature: 59.0°F");
        assert_eq!(lines[2], "Feels like: 57.6°F");
        assert_eq!(lines[5], "Wind Speed: 7.83 mph");
    }

    #[test]
    fn test_cache_notice_appended() {
        let lines = format_report(&sample_report(), "Paris", Units::Metric, ReportSource::Cache);
        assert_eq!(lines.len(), REPORT_LINE_COUNT + 1);
        assert_eq!(lines.last().map(String::as_str), Some(CACHE_NOTICE));
    }

    #[test]
    fn test_fresh_report_has_no_notice() {
        let lines = format_report(&sample_report(), "Paris", Units::Metric, ReportSource::Fresh);
        assert_eq!(lines.len(), REPORT_LINE_COUNT);
        assert!(!lines.iter().any(|l| l == CACHE_NOTICE));
    }

    #[test]
    fn test_format_outcome_uses_outcome_fields() {
        let outcome = LookupOutcome {
            report: sample_report(),
            source: ReportSource::Cache,
            city: "oslo".to_string(),
            units: Units::Imperial,
        };
        let lines = format_outcome(&outcome);
        assert_eq!(lines[0], "Weather in Oslo:");
        assert!(lines[1].ends_with("°F"));
        assert_eq!(lines[6], CACHE_NOTICE);
    }

    #[test]
    fn test_temperature_rounding() {
        assert_eq!(format_temperature(-3.04, Units::Metric), "-3.0°C");
        assert_eq!(format_temperature(21.96, Units::Metric), "22.0°C");
        assert_eq!(format_temperature(70.0, Units::Imperial), "70.0°F");
    }

    #[test]
    fn test_whole_wind_speed_keeps_decimal() {
        assert_eq!(format_wind_speed(4.0), "4.0");
        assert_eq!(format_wind_speed(0.0), "0.0");
        assert_eq!(format_wind_speed(3.5), "3.5");
        assert_eq!(format_wind_speed(12.35), "12.35");
    }

    #[test]
    fn test_integer_wind_payload_is_normalized() {
        let report = WeatherReport::from_json(
            r#"{"main":{"temp":20,"feels_like":19,"humidity":40},"weather":[{"description":"clear sky"}],"wind":{"speed":4}}"#,
        )
        .unwrap();
        let lines = format_report(&report, "Oslo", Units::Metric, ReportSource::Fresh);
        assert_eq!(lines[5], "Wind Speed: 4.0 m/s");
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("SAN FRANCISCO"), "San Francisco");
        assert_eq!(title_case("saint-denis"), "Saint-Denis");
        assert_eq!(title_case("overcast clouds"), "Overcast Clouds");
        assert_eq!(title_case(""), "");
    }
}
