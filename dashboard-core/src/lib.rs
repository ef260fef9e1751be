//! Core library for the `weather-dashboard` CLI.
//!
//! This crate defines:
//! - Configuration handling
//! - The weather service client and payload normalization
//! - The city roster with its concurrent bulk refresh
//! - Roster filtering, and the filtered, paginated entries view
//! - Transient notifications and the `Dashboard` command handlers
//!
//! It is used by `dashboard-cli`, but can also be driven by any other front end.

pub mod config;
pub mod dashboard;
pub mod entries;
pub mod error;
pub mod filter;
pub mod model;
pub mod normalize;
pub mod notify;
pub mod pagination;
pub mod provider;
pub mod roster;

pub use config::Config;
pub use dashboard::Dashboard;
pub use entries::{
    Choice, Entry, EntryBackend, EntryBrowser, EntryFilterCriteria, EntryPage, EntryRepository,
    EntryView, HttpEntryBackend, ImageAttachment, NewEntry,
};
pub use error::{DashboardError, DashboardResult, ErrorKind};
pub use filter::{ConditionCategory, FilterCriteria, TemperatureBand};
pub use model::{CityWeather, WeatherMood};
pub use notify::{Notification, NotificationCenter, Severity};
pub use pagination::PaginationState;
pub use provider::{WeatherProvider, service::WeatherServiceClient};
pub use roster::{CityId, CityRoster, RefreshOutcome, RefreshStatus, RefreshSummary};
