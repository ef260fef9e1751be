//! The ordered, name-deduplicated collection of city snapshots.
//!
//! [`CityRoster`] is a cheap handle over shared state, so an `add` or
//! `clear` can run while a [`CityRoster::refresh_all`] is waiting on the
//! network. Refresh results are bound to the [`CityId`] captured when the
//! refresh started and are applied against whatever the roster holds once
//! every request has settled. The lock is never held across an `.await`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::{
    error::{DashboardError, DashboardResult, ErrorKind},
    filter::{self, FilterCriteria},
    model::CityWeather,
    provider::{WeatherProvider, clean_city_name},
};

/// Stable identity of a roster slot. Never reused, not even after `clear`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CityId(u64);

#[derive(Debug, Clone)]
struct Slot {
    id: CityId,
    weather: CityWeather,
}

#[derive(Debug, Default)]
struct RosterState {
    next_id: u64,
    slots: Vec<Slot>,
}

impl RosterState {
    fn position_of_name(&self, name: &str) -> Option<usize> {
        self.slots.iter().position(|slot| slot.weather.is_named(name))
    }

    fn push(&mut self, weather: CityWeather) -> CityId {
        let id = CityId(self.next_id);
        self.next_id += 1;
        self.slots.push(Slot { id, weather });
        id
    }

    fn apply(&mut self, id: CityId, weather: CityWeather) -> RefreshStatus {
        let Some(position) = self.slots.iter().position(|slot| slot.id == id) else {
            return RefreshStatus::Discarded;
        };

        let collides = self
            .slots
            .iter()
            .any(|slot| slot.id != id && slot.weather.is_named(&weather.name));
        if collides {
            return RefreshStatus::Failed(DashboardError::DuplicateCity(weather.name));
        }

        self.slots[position].weather = weather;
        RefreshStatus::Updated
    }
}

/// What happened to one city during a bulk refresh.
#[derive(Debug, Clone, PartialEq)]
pub enum RefreshStatus {
    Updated,
    /// The previous snapshot was kept.
    Failed(DashboardError),
    /// The fetch succeeded but the city left the roster while it was in flight.
    Discarded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RefreshOutcome {
    /// Position of the city when the refresh started.
    pub index: usize,
    pub id: CityId,
    pub city: String,
    pub status: RefreshStatus,
}

impl RefreshOutcome {
    pub fn succeeded(&self) -> bool {
        self.status == RefreshStatus::Updated
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match &self.status {
            RefreshStatus::Failed(err) => Some(err.kind()),
            _ => None,
        }
    }
}

/// Aggregate of one `refresh_all` call. Every attempted city is counted
/// exactly once.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RefreshSummary {
    pub outcomes: Vec<RefreshOutcome>,
    pub succeeded: usize,
    pub failed: usize,
    pub discarded: usize,
}

impl RefreshSummary {
    fn from_outcomes(outcomes: Vec<RefreshOutcome>) -> Self {
        let mut summary = Self::default();
        for outcome in &outcomes {
            match outcome.status {
                RefreshStatus::Updated => summary.succeeded += 1,
                RefreshStatus::Failed(_) => summary.failed += 1,
                RefreshStatus::Discarded => summary.discarded += 1,
            }
        }
        summary.outcomes = outcomes;
        summary
    }

    pub fn attempted(&self) -> usize {
        self.outcomes.len()
    }

    /// The roster was empty; nothing was requested.
    pub fn is_noop(&self) -> bool {
        self.outcomes.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct CityRoster {
    provider: Arc<dyn WeatherProvider>,
    state: Arc<Mutex<RosterState>>,
}

impl CityRoster {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self { provider, state: Arc::new(Mutex::new(RosterState::default())) }
    }

    fn lock(&self) -> DashboardResult<MutexGuard<'_, RosterState>> {
        self.state.lock().map_err(|_| DashboardError::RosterUnavailable)
    }

    fn read(&self) -> MutexGuard<'_, RosterState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn len(&self) -> usize {
        self.read().slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().slots.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().position_of_name(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<CityWeather> {
        let state = self.read();
        state.position_of_name(name).map(|i| state.slots[i].weather.clone())
    }

    /// Copy of the roster in insertion order.
    pub fn snapshot(&self) -> Vec<CityWeather> {
        self.read().slots.iter().map(|slot| slot.weather.clone()).collect()
    }

    pub fn filtered(&self, criteria: &FilterCriteria) -> Vec<CityWeather> {
        let cities = self.snapshot();
        filter::apply(&cities, criteria).into_iter().cloned().collect()
    }

    /// Fetch `name` and append it. Duplicates are rejected before any request.
    pub async fn add(&self, name: &str) -> DashboardResult<CityWeather> {
        let name = clean_city_name(name)?;
        if self.contains(name) {
            return Err(DashboardError::DuplicateCity(name.to_string()));
        }

        let weather = self.provider.fetch_city(name).await.inspect_err(|err| {
            warn!(city = name, kind = %err.kind(), error = %err, "failed to add city");
        })?;

        let mut state = self.lock()?;
        // The service may canonicalize the name, and another add may have
        // landed while this one was in flight.
        if state.position_of_name(&weather.name).is_some() {
            return Err(DashboardError::DuplicateCity(weather.name));
        }
        state.push(weather.clone());
        info!(city = %weather.name, roster_len = state.slots.len(), "city added");

        Ok(weather)
    }

    /// Re-fetch every city concurrently and apply the results once all of
    /// them have settled. A failed city keeps its previous snapshot.
    pub async fn refresh_all(&self) -> DashboardResult<RefreshSummary> {
        let targets: Vec<(usize, CityId, String)> = {
            let state = self.lock()?;
            state
                .slots
                .iter()
                .enumerate()
                .map(|(index, slot)| (index, slot.id, slot.weather.name.clone()))
                .collect()
        };

        if targets.is_empty() {
            debug!("roster is empty, nothing to refresh");
            return Ok(RefreshSummary::default());
        }

        let results =
            join_all(targets.iter().map(|(_, _, name)| self.provider.fetch_city(name))).await;

        let mut state = self.lock()?;
        let outcomes: Vec<RefreshOutcome> = targets
            .into_iter()
            .zip(results)
            .map(|((index, id, city), result)| {
                let status = match result {
                    Ok(weather) => state.apply(id, weather),
                    Err(err) => RefreshStatus::Failed(err),
                };
                match &status {
                    RefreshStatus::Updated => debug!(city = %city, "snapshot refreshed"),
                    RefreshStatus::Failed(err) => {
                        warn!(
                            city = %city,
                            kind = %err.kind(),
                            error = %err,
                            "refresh failed, keeping previous snapshot"
                        )
                    }
                    RefreshStatus::Discarded => {
                        warn!(city = %city, "city left the roster, result discarded")
                    }
                }
                RefreshOutcome { index, id, city, status }
            })
            .collect();
        drop(state);

        let summary = RefreshSummary::from_outcomes(outcomes);
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            discarded = summary.discarded,
            "roster refreshed"
        );
        Ok(summary)
    }

    /// Remove every city. Returns how many were removed.
    pub fn clear(&self) -> DashboardResult<usize> {
        let mut state = self.lock()?;
        let removed = state.slots.len();
        state.slots.clear();
        info!(removed, "roster cleared");
        Ok(removed)
    }
}
