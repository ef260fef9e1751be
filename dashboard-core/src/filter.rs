//! Pure filtering of roster snapshots.

use std::str::FromStr;

use crate::model::CityWeather;

/// Temperature buckets. The concrete bands partition the integers:
/// every temperature falls in exactly one of hot, warm and cold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TemperatureBand {
    #[default]
    All,
    Hot,
    Warm,
    Cold,
}

impl TemperatureBand {
    /// The concrete band a temperature belongs to.
    pub fn of(temperature: i32) -> Self {
        if temperature > 25 {
            TemperatureBand::Hot
        } else if temperature >= 15 {
            TemperatureBand::Warm
        } else {
            TemperatureBand::Cold
        }
    }

    pub fn matches(&self, temperature: i32) -> bool {
        match self {
            TemperatureBand::All => true,
            band => TemperatureBand::of(temperature) == *band,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureBand::All => "all",
            TemperatureBand::Hot => "hot",
            TemperatureBand::Warm => "warm",
            TemperatureBand::Cold => "cold",
        }
    }

    pub const fn all() -> &'static [TemperatureBand] {
        &[
            TemperatureBand::All,
            TemperatureBand::Hot,
            TemperatureBand::Warm,
            TemperatureBand::Cold,
        ]
    }
}

impl std::fmt::Display for TemperatureBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TemperatureBand {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "all" => Ok(TemperatureBand::All),
            "hot" => Ok(TemperatureBand::Hot),
            "warm" => Ok(TemperatureBand::Warm),
            "cold" => Ok(TemperatureBand::Cold),
            _ => Err(anyhow::anyhow!(
                "Unknown temperature band '{value}'. Supported bands: all, hot, warm, cold."
            )),
        }
    }
}

/// Condition filter. Descriptions arrive in English or Spanish, so each
/// category matches keywords from both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ConditionCategory {
    #[default]
    All,
    Clear,
    Clouds,
    Rain,
    Snow,
}

impl ConditionCategory {
    pub fn keywords(&self) -> &'static [&'static str] {
        match self {
            ConditionCategory::All => &[],
            ConditionCategory::Clear => &["clear", "despejado"],
            ConditionCategory::Clouds => &["cloud", "nube"],
            ConditionCategory::Rain => &["rain", "lluvia"],
            ConditionCategory::Snow => &["snow", "nieve"],
        }
    }

    pub fn matches(&self, description: &str) -> bool {
        if *self == ConditionCategory::All {
            return true;
        }
        let desc = description.to_lowercase();
        self.keywords().iter().any(|keyword| desc.contains(keyword))
    }

    /// First concrete category whose keywords occur in `description`.
    pub fn of(description: &str) -> Option<Self> {
        Self::all()[1..]
            .iter()
            .copied()
            .find(|category| category.matches(description))
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionCategory::All => "all",
            ConditionCategory::Clear => "clear",
            ConditionCategory::Clouds => "clouds",
            ConditionCategory::Rain => "rain",
            ConditionCategory::Snow => "snow",
        }
    }

    pub const fn all() -> &'static [ConditionCategory] {
        &[
            ConditionCategory::All,
            ConditionCategory::Clear,
            ConditionCategory::Clouds,
            ConditionCategory::Rain,
            ConditionCategory::Snow,
        ]
    }
}

impl std::fmt::Display for ConditionCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConditionCategory {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "all" => Ok(ConditionCategory::All),
            "clear" => Ok(ConditionCategory::Clear),
            "clouds" => Ok(ConditionCategory::Clouds),
            "rain" => Ok(ConditionCategory::Rain),
            "snow" => Ok(ConditionCategory::Snow),
            _ => Err(anyhow::anyhow!(
                "Unknown condition '{value}'. Supported conditions: all, clear, clouds, rain, snow."
            )),
        }
    }
}

/// Roster filter. Immutable; derive a new value per change.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FilterCriteria {
    pub search_term: String,
    pub band: TemperatureBand,
    pub condition: ConditionCategory,
}

impl FilterCriteria {
    pub fn with_search(self, search_term: impl Into<String>) -> Self {
        Self { search_term: search_term.into(), ..self }
    }

    pub fn with_band(self, band: TemperatureBand) -> Self {
        Self { band, ..self }
    }

    pub fn with_condition(self, condition: ConditionCategory) -> Self {
        Self { condition, ..self }
    }

    pub fn matches(&self, city: &CityWeather) -> bool {
        let term = self.search_term.to_lowercase();
        (term.is_empty() || city.name.to_lowercase().contains(&term))
            && self.band.matches(city.temperature)
            && self.condition.matches(&city.description)
    }
}

/// Cities matching `criteria`, in roster order.
pub fn apply<'a>(cities: &'a [CityWeather], criteria: &FilterCriteria) -> Vec<&'a CityWeather> {
    cities.iter().filter(|city| criteria.matches(city)).collect()
}
