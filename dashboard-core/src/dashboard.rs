//! Command handlers a front end calls in response to user actions.
//!
//! Handlers never let an error escape unreported: every failure becomes a
//! notification before it is handed back to the caller.

use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use crate::{
    config::Config,
    entries::{
        Entry, EntryBackend, EntryBrowser, EntryRepository, EntryView, HttpEntryBackend, NewEntry,
    },
    error::DashboardResult,
    filter::FilterCriteria,
    model::CityWeather,
    notify::{NotificationCenter, Severity},
    provider::{WeatherProvider, provider_from_config},
    roster::{CityRoster, RefreshSummary},
};

#[derive(Debug)]
pub struct Dashboard {
    provider: Arc<dyn WeatherProvider>,
    roster: CityRoster,
    criteria: FilterCriteria,
    entries: EntryBrowser,
    notifications: NotificationCenter,
}

impl Dashboard {
    pub fn new(
        provider: Arc<dyn WeatherProvider>,
        backend: Arc<dyn EntryBackend>,
        page_size: NonZeroUsize,
        display_for: Duration,
    ) -> Self {
        Self {
            roster: CityRoster::new(provider.clone()),
            provider,
            criteria: FilterCriteria::default(),
            entries: EntryBrowser::new(EntryRepository::new(backend), page_size),
            notifications: NotificationCenter::new(display_for),
        }
    }

    /// Wire the HTTP weather client and entries backend from config.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = provider_from_config(config)?;
        let backend = Arc::new(HttpEntryBackend::new(config.api_base_url.clone()));
        Ok(Self::new(provider, backend, config.page_size(), config.notification_display()))
    }

    pub fn roster(&self) -> &CityRoster {
        &self.roster
    }

    pub fn notifications(&self) -> &NotificationCenter {
        &self.notifications
    }

    pub fn entries(&mut self) -> &mut EntryBrowser {
        &mut self.entries
    }

    /// Probe the weather service. Failure is reported, never fatal.
    pub async fn check_service(&self) -> bool {
        match self.provider.health().await {
            Ok(()) => {
                self.notifications.notify("Connected to the weather service", Severity::Success);
                true
            }
            Err(err) => {
                self.notifications
                    .notify(format!("Weather service unreachable: {err}"), Severity::Error);
                false
            }
        }
    }

    pub async fn add_city(&self, name: &str) -> DashboardResult<CityWeather> {
        match self.roster.add(name).await {
            Ok(city) => {
                self.notifications
                    .notify(format!("{} added successfully", city.name), Severity::Success);
                Ok(city)
            }
            Err(err) => {
                self.notifications.notify(format!("Error: {err}"), Severity::Error);
                Err(err)
            }
        }
    }

    pub async fn refresh_all(&self) -> DashboardResult<RefreshSummary> {
        let summary = match self.roster.refresh_all().await {
            Ok(summary) => summary,
            Err(err) => {
                self.notifications
                    .notify(format!("Error refreshing cities: {err}"), Severity::Error);
                return Err(err);
            }
        };

        if summary.is_noop() {
            self.notifications.notify("No cities to refresh", Severity::Warning);
        } else if summary.failed == 0 && summary.discarded == 0 {
            self.notifications.notify(
                format!("{} cities refreshed successfully", summary.succeeded),
                Severity::Success,
            );
        } else {
            let mut message =
                format!("{} refreshed, {} failed", summary.succeeded, summary.failed);
            if summary.discarded > 0 {
                message.push_str(&format!(", {} removed while refreshing", summary.discarded));
            }
            self.notifications.notify(message, Severity::Warning);
        }

        Ok(summary)
    }

    /// Remove every city. The caller is responsible for confirming first.
    pub fn clear_cities(&self) -> usize {
        if self.roster.is_empty() {
            self.notifications.notify("No cities to remove", Severity::Warning);
            return 0;
        }
        match self.roster.clear() {
            Ok(removed) => {
                self.notifications.notify("All cities removed", Severity::Info);
                removed
            }
            Err(err) => {
                self.notifications.notify(format!("Error: {err}"), Severity::Error);
                0
            }
        }
    }

    pub fn filter(&self) -> &FilterCriteria {
        &self.criteria
    }

    pub fn set_filter(&mut self, criteria: FilterCriteria) {
        self.criteria = criteria;
    }

    /// The roster as currently filtered, recomputed from scratch.
    pub fn visible_cities(&self) -> Vec<CityWeather> {
        self.roster.filtered(&self.criteria)
    }

    pub async fn load_entries(&mut self) -> EntryView {
        let view = self.entries.load().await;
        if let EntryView::Unavailable { reason } = &view {
            self.notifications
                .notify(format!("Unable to load entries: {reason}"), Severity::Error);
        }
        view
    }

    pub async fn submit_entry(&self, entry: &NewEntry) -> DashboardResult<Entry> {
        match self.entries.submit(entry).await {
            Ok(created) => {
                self.notifications.notify("Entry submitted successfully", Severity::Success);
                Ok(created)
            }
            Err(err) => {
                self.notifications
                    .notify(format!("Could not submit entry: {err}"), Severity::Error);
                Err(err)
            }
        }
    }
}
