//! Slides service backends: the REST API and a dry-run recorder.

use reqwest::blocking::{Client, Response};
use serde_json::{json, Value};
use slidesync_core::types::to_requests;
use slidesync_core::{Error, MutationOp, PresentationDoc, Result, SlidesService};
use std::path::Path;

const SLIDES_API: &str = "https://slides.googleapis.com/v1";

/// Google Slides REST client authenticated with a bearer token.
pub struct HttpSlides {
    client: Client,
    token: String,
    base_url: String,
}

impl HttpSlides {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            token: token.into(),
            base_url: SLIDES_API.to_string(),
        }
    }
}

/// Turn a non-2xx response into a service error carrying the body.
fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(Error::Service(format!("{}: {}", status, body.trim())))
}

fn transport(e: reqwest::Error) -> Error {
    Error::Service(e.to_string())
}

impl SlidesService for HttpSlides {
    fn presentation(&mut self, presentation_id: &str) -> Result<PresentationDoc> {
        let url = format!("{}/presentations/{}", self.base_url, presentation_id);
        log::debug!("GET {}", url);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.token)
            .send()
            .map_err(transport)?;
        check(response)?.json().map_err(transport)
    }

    fn batch_update(&mut self, presentation_id: &str, ops: &[MutationOp]) -> Result<Value> {
        let url = format!(
            "{}/presentations/{}:batchUpdate",
            self.base_url, presentation_id
        );
        log::debug!("POST {} ({} requests)", url, ops.len());
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(&json!({ "requests": to_requests(ops) }))
            .send()
            .map_err(transport)?;
        check(response)?.json().map_err(transport)
    }
}

/// Records batches instead of sending them.
///
/// Update-mode sessions need a presentation snapshot, read from a JSON file
/// in `presentations.get` format.
#[derive(Default)]
pub struct DryRunSlides {
    snapshot: Option<PresentationDoc>,
    batches: Vec<Value>,
}

impl DryRunSlides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_snapshot(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let snapshot: PresentationDoc = serde_json::from_str(&content)?;
        Ok(Self {
            snapshot: Some(snapshot),
            batches: Vec::new(),
        })
    }

    /// Every recorded `batchUpdate` body, in send order.
    pub fn batches(&self) -> &[Value] {
        &self.batches
    }
}

impl SlidesService for DryRunSlides {
    fn presentation(&mut self, presentation_id: &str) -> Result<PresentationDoc> {
        self.snapshot.clone().ok_or_else(|| {
            Error::Service(format!(
                "no snapshot of presentation {} given for dry run",
                presentation_id
            ))
        })
    }

    fn batch_update(&mut self, presentation_id: &str, ops: &[MutationOp]) -> Result<Value> {
        self.batches.push(json!({
            "presentationId": presentation_id,
            "requests": to_requests(ops),
        }));
        Ok(json!({ "presentationId": presentation_id, "replies": [] }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slidesync_core::TextRange;

    #[test]
    fn test_dry_run_records_batches() {
        let mut slides = DryRunSlides::new();
        let ops = vec![MutationOp::DeleteText {
            object_id: "notes".to_string(),
            cell: None,
            range: TextRange::All,
        }];

        slides.batch_update("deck", &ops).unwrap();
        assert_eq!(slides.batches().len(), 1);
        assert_eq!(slides.batches()[0]["requests"][0]["deleteText"]["objectId"], "notes");
    }

    #[test]
    fn test_dry_run_without_snapshot_cannot_update() {
        let mut slides = DryRunSlides::new();
        assert!(matches!(slides.presentation("deck"), Err(Error::Service(_))));
    }
}
