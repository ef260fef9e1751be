use serde::{Deserialize, Serialize};

use crate::filter::{ConditionCategory, TemperatureBand};

/// One cached, normalized weather snapshot for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityWeather {
    /// Canonical display name, unique (case-insensitively) within a roster.
    pub name: String,
    pub country: String,
    /// Degrees Celsius, rounded.
    pub temperature: i32,
    pub feels_like: i32,
    /// First character capitalized, the rest as the service sent it.
    pub description: String,
    pub humidity_pct: u8,
    /// Meters per second, always rendered with one decimal.
    pub wind_speed: String,
    pub pressure_hpa: i64,
    pub visibility_km: i64,
    pub icon_code: Option<String>,
    pub temp_min: i32,
    pub temp_max: i32,
    pub cloudiness_pct: u8,
    pub sunrise: String,
    pub sunset: String,
    pub coordinates: serde_json::Value,
    /// Local display timestamp fixed when the snapshot was normalized.
    pub captured_at: String,
}

impl CityWeather {
    /// Case-insensitive comparison against the roster key.
    pub fn is_named(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }

    pub fn band(&self) -> TemperatureBand {
        TemperatureBand::of(self.temperature)
    }

    pub fn category(&self) -> Option<ConditionCategory> {
        ConditionCategory::of(&self.description)
    }

    pub fn mood(&self) -> WeatherMood {
        WeatherMood::classify(&self.description, self.icon_code.as_deref())
    }

    pub fn icon_url(&self) -> Option<String> {
        self.icon_code
            .as_deref()
            .map(|code| format!("https://openweathermap.org/img/wn/{code}@2x.png"))
    }

    pub fn emoji(&self) -> &'static str {
        if let Some(code) = self.icon_code.as_deref() {
            return match code {
                "01d" => "☀️",
                "01n" => "🌙",
                "02d" | "02n" => "⛅",
                "03d" | "03n" | "04d" | "04n" => "☁️",
                "09d" | "09n" => "🌧️",
                "10d" | "10n" => "🌦️",
                "11d" | "11n" => "⛈️",
                "13d" | "13n" => "❄️",
                "50d" | "50n" => "🌫️",
                _ => "☁️",
            };
        }

        let desc = self.description.to_lowercase();
        if desc.contains("despejado") || desc.contains("clear") {
            "☀️"
        } else if desc.contains("lluvia") || desc.contains("rain") {
            "🌧️"
        } else if desc.contains("tormenta") || desc.contains("storm") {
            "⛈️"
        } else if desc.contains("nieve") || desc.contains("snow") {
            "❄️"
        } else if desc.contains("niebla") || desc.contains("mist") {
            "🌫️"
        } else {
            "☁️"
        }
    }
}

/// Coarse look of a card, picked from the icon code first and the
/// description second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WeatherMood {
    Sunny,
    Rainy,
    Cloudy,
}

impl WeatherMood {
    pub fn classify(description: &str, icon_code: Option<&str>) -> Self {
        if let Some(code) = icon_code {
            if code.contains("01") || code.contains("02") {
                return WeatherMood::Sunny;
            }
            if code.contains("09") || code.contains("10") || code.contains("11") {
                return WeatherMood::Rainy;
            }
        }

        let desc = description.to_lowercase();
        if desc.contains("clear") || desc.contains("despejado") {
            WeatherMood::Sunny
        } else if desc.contains("rain") || desc.contains("lluvia") || desc.contains("storm") {
            WeatherMood::Rainy
        } else {
            WeatherMood::Cloudy
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherMood::Sunny => "sunny",
            WeatherMood::Rainy => "rainy",
            WeatherMood::Cloudy => "cloudy",
        }
    }
}

#[cfg(test)]
pub(crate) fn sample_city(name: &str, temperature: i32, description: &str) -> CityWeather {
    CityWeather {
        name: name.to_string(),
        country: "PE".to_string(),
        temperature,
        feels_like: temperature,
        description: description.to_string(),
        humidity_pct: 60,
        wind_speed: "3.1".to_string(),
        pressure_hpa: 1013,
        visibility_km: 10,
        icon_code: None,
        temp_min: temperature - 2,
        temp_max: temperature + 2,
        cloudiness_pct: 20,
        sunrise: "06:01:00".to_string(),
        sunset: "18:15:00".to_string(),
        coordinates: serde_json::json!({ "latitud": -12.04, "longitud": -77.03 }),
        captured_at: "2025-01-01 12:00:00".to_string(),
    }
}
