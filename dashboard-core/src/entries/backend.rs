use async_trait::async_trait;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Deserialize;
use std::fmt::Debug;
use tracing::{debug, warn};

use crate::{
    entries::{Entry, NewEntry},
    error::{DashboardError, DashboardResult},
    provider::truncate_body,
};

/// Store of user-submitted entries.
#[async_trait]
pub trait EntryBackend: Send + Sync + Debug {
    /// The whole collection; filtering happens on the client.
    async fn list_entries(&self) -> DashboardResult<Vec<Entry>>;

    async fn create_entry(&self, entry: &NewEntry) -> DashboardResult<Entry>;
}

/// `GET`/`POST /entradas` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpEntryBackend {
    base_url: String,
    http: Client,
}

/// Error body of the backend, e.g. `{"detail": "..."}`.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

impl HttpEntryBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    fn entries_url(&self) -> String {
        format!("{}/entradas", self.base_url)
    }

    fn transport(&self, err: &reqwest::Error) -> DashboardError {
        DashboardError::from_transport(err, &self.base_url)
    }
}

fn multipart_form(entry: &NewEntry) -> DashboardResult<Form> {
    let mut form = Form::new()
        .text("nombre", entry.submitter_name.clone())
        .text("ciudad", entry.city.clone())
        .text("clima", entry.condition.clone())
        .text("descripcion", entry.description.clone());

    if let Some(image) = &entry.image {
        let part = Part::bytes(image.bytes.clone())
            .file_name(image.file_name.clone())
            .mime_str(&image.content_type)
            .map_err(|e| DashboardError::Validation(format!("invalid image type: {e}")))?;
        form = form.part("imagen", part);
    }

    Ok(form)
}

fn rejection(status: reqwest::StatusCode, body: &str) -> DashboardError {
    let detail = match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody { detail: serde_json::Value::String(text) }) => text,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) if status.is_server_error() => {
            return DashboardError::ServerError(status.as_u16());
        }
        Err(_) => truncate_body(body),
    };
    DashboardError::Rejected { status: status.as_u16(), detail }
}

#[async_trait]
impl EntryBackend for HttpEntryBackend {
    async fn list_entries(&self) -> DashboardResult<Vec<Entry>> {
        let url = self.entries_url();
        debug!(%url, "listing entries");

        let res = self.http.get(&url).send().await.map_err(|e| self.transport(&e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| self.transport(&e))?;

        if !status.is_success() {
            warn!(%status, body = %truncate_body(&body), "listing entries failed");
            return Err(DashboardError::ServerError(status.as_u16()));
        }

        serde_json::from_str(&body)
            .map_err(|e| DashboardError::Validation(format!("malformed entries response: {e}")))
    }

    async fn create_entry(&self, entry: &NewEntry) -> DashboardResult<Entry> {
        entry.validate()?;
        let url = self.entries_url();
        debug!(%url, city = %entry.city, "submitting entry");

        let res = self
            .http
            .post(&url)
            .multipart(multipart_form(entry)?)
            .send()
            .await
            .map_err(|e| self.transport(&e))?;

        let status = res.status();
        let body = res.text().await.map_err(|e| self.transport(&e))?;

        if !status.is_success() {
            warn!(%status, body = %truncate_body(&body), "entry submission rejected");
            return Err(rejection(status, &body));
        }

        Entry::from_created_body(&body)
    }
}
