#![allow(dead_code)]

use std::{
    collections::HashMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use dashboard_core::{
    CityWeather, DashboardError, DashboardResult, Entry, EntryBackend, NewEntry, WeatherProvider,
};
use tokio::sync::Semaphore;

pub fn city(name: &str, temperature: i32, description: &str) -> CityWeather {
    CityWeather {
        name: name.to_string(),
        country: "PE".to_string(),
        temperature,
        feels_like: temperature - 1,
        description: description.to_string(),
        humidity_pct: 70,
        wind_speed: "2.6".to_string(),
        pressure_hpa: 1012,
        visibility_km: 10,
        icon_code: Some("01d".to_string()),
        temp_min: temperature - 3,
        temp_max: temperature + 3,
        cloudiness_pct: 0,
        sunrise: "06:10:00".to_string(),
        sunset: "18:20:00".to_string(),
        coordinates: serde_json::json!({ "latitud": -12.05, "longitud": -77.04 }),
        captured_at: "2025-03-01 10:00:00".to_string(),
    }
}

/// Scripted provider: one canned result per (lowercased) city name.
#[derive(Debug, Default)]
pub struct MockWeatherProvider {
    responses: Mutex<HashMap<String, DashboardResult<CityWeather>>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    calls: Mutex<Vec<String>>,
    health_error: Mutex<Option<DashboardError>>,
}

impl MockWeatherProvider {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn respond(&self, lookup: &str, result: DashboardResult<CityWeather>) {
        self.responses.lock().unwrap().insert(lookup.to_lowercase(), result);
    }

    pub fn succeed(&self, weather: CityWeather) {
        let lookup = weather.name.clone();
        self.respond(&lookup, Ok(weather));
    }

    pub fn fail(&self, lookup: &str, err: DashboardError) {
        self.respond(lookup, Err(err));
    }

    pub fn set_health(&self, err: Option<DashboardError>) {
        *self.health_error.lock().unwrap() = err;
    }

    /// Fetches started from now on park until the returned semaphore gets permits.
    pub fn hold(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Fetches started from now on run straight through.
    pub fn release_hold(&self) {
        *self.gate.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn take_calls(&self) -> Vec<String> {
        std::mem::take(&mut *self.calls.lock().unwrap())
    }
}

#[async_trait]
impl WeatherProvider for MockWeatherProvider {
    async fn fetch_city(&self, city: &str) -> DashboardResult<CityWeather> {
        self.calls.lock().unwrap().push(city.to_string());

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate closed").forget();
        }

        self.responses
            .lock()
            .unwrap()
            .get(&city.to_lowercase())
            .cloned()
            .unwrap_or_else(|| Err(DashboardError::CityNotFound(city.to_string())))
    }

    async fn health(&self) -> DashboardResult<()> {
        match self.health_error.lock().unwrap().clone() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

pub fn entry(id: i64, city: &str, condition: &str, origin: &str) -> Entry {
    Entry {
        id,
        submitter_name: format!("user{id}"),
        city: city.to_string(),
        condition: condition.to_string(),
        description: format!("entry {id}"),
        image: None,
        origin: origin.to_string(),
    }
}

#[derive(Debug, Default)]
pub struct MockEntryBackend {
    entries: Mutex<Vec<Entry>>,
    list_error: Mutex<Option<DashboardError>>,
    submitted: Mutex<Vec<NewEntry>>,
    list_calls: Mutex<usize>,
}

impl MockEntryBackend {
    pub fn with_entries(entries: Vec<Entry>) -> Arc<Self> {
        Arc::new(Self { entries: Mutex::new(entries), ..Self::default() })
    }

    pub fn set_entries(&self, entries: Vec<Entry>) {
        *self.entries.lock().unwrap() = entries;
    }

    pub fn fail_listing(&self, err: Option<DashboardError>) {
        *self.list_error.lock().unwrap() = err;
    }

    pub fn submitted(&self) -> Vec<NewEntry> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn list_calls(&self) -> usize {
        *self.list_calls.lock().unwrap()
    }
}

#[async_trait]
impl EntryBackend for MockEntryBackend {
    async fn list_entries(&self) -> DashboardResult<Vec<Entry>> {
        *self.list_calls.lock().unwrap() += 1;
        if let Some(err) = self.list_error.lock().unwrap().clone() {
            return Err(err);
        }
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn create_entry(&self, new: &NewEntry) -> DashboardResult<Entry> {
        self.submitted.lock().unwrap().push(new.clone());
        let mut entries = self.entries.lock().unwrap();
        let created = Entry {
            id: entries.len() as i64 + 1,
            submitter_name: new.submitter_name.clone(),
            city: new.city.clone(),
            condition: new.condition.clone(),
            description: new.description.clone(),
            image: None,
            origin: "formulario".to_string(),
        };
        entries.push(created.clone());
        Ok(created)
    }
}
