//! Read-only, client-filtered and paginated view over submitted entries.

use serde::{Deserialize, Deserializer, Serialize};
use std::{num::NonZeroUsize, sync::Arc};
use tracing::{debug, warn};

use crate::{
    error::{DashboardError, DashboardResult},
    pagination::PaginationState,
};

pub mod backend;

pub use backend::{EntryBackend, HttpEntryBackend};

/// An entry as stored by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub id: i64,
    #[serde(rename = "nombre")]
    pub submitter_name: String,
    #[serde(rename = "ciudad")]
    pub city: String,
    #[serde(rename = "clima")]
    pub condition: String,
    #[serde(rename = "descripcion", default, deserialize_with = "null_as_empty")]
    pub description: String,
    /// Base64 image payload or reference, as the backend returns it.
    #[serde(rename = "imagen", default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(rename = "origen", default, deserialize_with = "null_as_empty")]
    pub origin: String,
}

/// Older records carry `null` where newer ones carry text.
fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

impl Entry {
    /// The backend answers a creation either with the record itself or
    /// wrapped as `{"message": ..., "entrada": {...}}`.
    pub(crate) fn from_created_body(body: &str) -> DashboardResult<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Created {
            Bare(Entry),
            Wrapped { entrada: Entry },
        }

        match serde_json::from_str::<Created>(body) {
            Ok(Created::Bare(entry)) | Ok(Created::Wrapped { entrada: entry }) => Ok(entry),
            Err(e) => Err(DashboardError::Validation(format!(
                "malformed entry creation response: {e}"
            ))),
        }
    }
}

/// File attached to a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAttachment {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// A new entry, sent as multipart form data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub submitter_name: String,
    pub city: String,
    pub condition: String,
    pub description: String,
    pub image: Option<ImageAttachment>,
}

impl NewEntry {
    pub fn validate(&self) -> DashboardResult<()> {
        let fields = [
            ("submitter name", &self.submitter_name),
            ("city", &self.city),
            ("condition", &self.condition),
            ("description", &self.description),
        ];
        if let Some((field, _)) = fields.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(DashboardError::Validation(format!("{field} must not be empty")));
        }
        if self.image.as_ref().is_some_and(|image| image.bytes.is_empty()) {
            return Err(DashboardError::Validation("attached image is empty".to_string()));
        }
        Ok(())
    }
}

/// Either no constraint, or one required value.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Choice {
    #[default]
    All,
    Exactly(String),
}

impl Choice {
    /// `"all"` (any case) or an empty string means no constraint.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if value.is_empty() || value.eq_ignore_ascii_case("all") {
            Choice::All
        } else {
            Choice::Exactly(value.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryFilterCriteria {
    pub city_text: String,
    /// Compared case-insensitively.
    pub condition: Choice,
    /// Compared exactly.
    pub origin: Choice,
}

impl EntryFilterCriteria {
    pub fn matches(&self, entry: &Entry) -> bool {
        let city_ok = entry.city.to_lowercase().contains(&self.city_text.to_lowercase());
        let condition_ok = match &self.condition {
            Choice::All => true,
            Choice::Exactly(wanted) => entry.condition.to_lowercase() == wanted.to_lowercase(),
        };
        let origin_ok = match &self.origin {
            Choice::All => true,
            Choice::Exactly(wanted) => entry.origin == *wanted,
        };
        city_ok && condition_ok && origin_ok
    }
}

/// One rendered page of filtered entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryPage {
    pub entries: Vec<Entry>,
    pub current_page: usize,
    pub total_pages: usize,
    pub filtered_count: usize,
}

impl EntryPage {
    pub fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    pub fn has_next(&self) -> bool {
        self.current_page < self.total_pages
    }

    /// No entry matched the criteria (as opposed to a failed load).
    pub fn is_empty(&self) -> bool {
        self.filtered_count == 0
    }
}

/// Result of a load: a page, or the reason the backend could not be read.
#[derive(Debug, Clone, PartialEq)]
pub enum EntryView {
    Page(EntryPage),
    Unavailable { reason: DashboardError },
}

/// Filter `entries` and cut out the page `pagination` points at, clamping it first.
pub fn paginate(
    entries: &[Entry],
    criteria: &EntryFilterCriteria,
    pagination: &mut PaginationState,
) -> EntryPage {
    let filtered: Vec<Entry> = entries.iter().filter(|e| criteria.matches(e)).cloned().collect();
    let page = pagination.slice(&filtered).to_vec();

    EntryPage {
        entries: page,
        current_page: pagination.current_page(),
        total_pages: pagination.total_pages(filtered.len()),
        filtered_count: filtered.len(),
    }
}

#[derive(Debug, Clone)]
pub struct EntryRepository {
    backend: Arc<dyn EntryBackend>,
}

impl EntryRepository {
    pub fn new(backend: Arc<dyn EntryBackend>) -> Self {
        Self { backend }
    }

    /// Load the whole collection and return the requested page.
    pub async fn fetch(
        &self,
        criteria: &EntryFilterCriteria,
        pagination: &mut PaginationState,
    ) -> EntryView {
        match self.backend.list_entries().await {
            Ok(entries) => {
                let page = paginate(&entries, criteria, pagination);
                debug!(
                    total = entries.len(),
                    filtered = page.filtered_count,
                    page = page.current_page,
                    "entries loaded"
                );
                EntryView::Page(page)
            }
            Err(reason) => {
                warn!(kind = %reason.kind(), error = %reason, "unable to load entries");
                EntryView::Unavailable { reason }
            }
        }
    }

    pub async fn submit(&self, entry: &NewEntry) -> DashboardResult<Entry> {
        entry.validate()?;
        self.backend.create_entry(entry).await
    }
}

/// Criteria plus page cursor for one browsing session. Changing a
/// criterion goes back to page 1; moving between pages leaves the
/// criteria alone and stays within the pages of the last load.
#[derive(Debug, Clone)]
pub struct EntryBrowser {
    repository: EntryRepository,
    criteria: EntryFilterCriteria,
    pagination: PaginationState,
    /// Matches of the last successful load; unknown until one happens
    /// under the current criteria.
    last_count: Option<usize>,
}

impl EntryBrowser {
    pub fn new(repository: EntryRepository, page_size: NonZeroUsize) -> Self {
        Self {
            repository,
            criteria: EntryFilterCriteria::default(),
            pagination: PaginationState::new(page_size),
            last_count: None,
        }
    }

    pub fn criteria(&self) -> &EntryFilterCriteria {
        &self.criteria
    }

    pub fn current_page(&self) -> usize {
        self.pagination.current_page()
    }

    pub fn set_criteria(&mut self, criteria: EntryFilterCriteria) {
        self.criteria = criteria;
        self.criteria_changed();
    }

    pub fn set_city_text(&mut self, city_text: impl Into<String>) {
        self.criteria.city_text = city_text.into();
        self.criteria_changed();
    }

    pub fn set_condition(&mut self, condition: Choice) {
        self.criteria.condition = condition;
        self.criteria_changed();
    }

    pub fn set_origin(&mut self, origin: Choice) {
        self.criteria.origin = origin;
        self.criteria_changed();
    }

    fn criteria_changed(&mut self) {
        self.pagination.reset();
        self.last_count = None;
    }

    fn stay_in_range(&mut self) {
        if let Some(count) = self.last_count {
            self.pagination.clamp(count);
        }
    }

    pub fn next_page(&mut self) {
        self.pagination.next();
        self.stay_in_range();
    }

    pub fn previous_page(&mut self) {
        self.pagination.previous();
    }

    pub fn go_to(&mut self, page: usize) {
        self.pagination.go_to(page);
        self.stay_in_range();
    }

    pub async fn load(&mut self) -> EntryView {
        let view = self.repository.fetch(&self.criteria, &mut self.pagination).await;
        if let EntryView::Page(page) = &view {
            self.last_count = Some(page.filtered_count);
        }
        view
    }

    pub async fn submit(&self, entry: &NewEntry) -> DashboardResult<Entry> {
        self.repository.submit(entry).await
    }
}

#[cfg(test)]
pub(crate) fn sample_entry(id: i64, city: &str, condition: &str, origin: &str) -> Entry {
    Entry {
        id,
        submitter_name: format!("user{id}"),
        city: city.to_string(),
        condition: condition.to_string(),
        description: String::new(),
        image: None,
        origin: origin.to_string(),
    }
}
