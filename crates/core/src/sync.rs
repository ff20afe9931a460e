//! Record-by-record synchronization loop.

use crate::batch::{BatchBuilder, BatchTarget, SessionContent};
use crate::colors::StatusColorTable;
use crate::config::SyncConfig;
use crate::error::Result;
use crate::identity::{IdSource, IdentityDeriver};
use crate::normalize::{PeopleList, RepresentationNormalizer};
use crate::record::{resolve_curation_status, RecordSource, SessionRecord};
use crate::slide::PresentationDoc;
use crate::types::MutationOp;
use chrono::{DateTime, Utc};
use serde_json::Value;

/// The presentation service batches are sent to.
pub trait SlidesService {
    /// Current state of the presentation.
    fn presentation(&mut self, presentation_id: &str) -> Result<PresentationDoc>;

    /// Apply `ops` atomically; either all of them take effect or none.
    fn batch_update(&mut self, presentation_id: &str, ops: &[MutationOp]) -> Result<Value>;
}

/// What to sync and where.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub presentation_id: String,
    /// Template duplicated for sessions without a slide.
    pub template_slide_id: Option<String>,
    /// Create slides for sessions that have none instead of skipping them.
    pub create_missing: bool,
    /// Only sessions modified after this instant.
    pub modified_since: Option<DateTime<Utc>>,
    /// Process at most this many sessions.
    pub limit: Option<usize>,
}

/// Result of syncing one session.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordOutcome {
    Applied {
        slide_id: String,
        created: bool,
        requests: usize,
        response: Value,
    },
    Skipped {
        reason: String,
    },
    Failed {
        error: String,
        /// The slide lacks the structure the batch needs; retrying won't help.
        missing_structure: bool,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordReport {
    pub record_id: String,
    pub outcome: RecordOutcome,
}

/// Per-session outcomes of one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub records: Vec<RecordReport>,
}

impl SyncReport {
    pub fn applied(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Applied { .. }))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Skipped { .. }))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| matches!(o, RecordOutcome::Failed { .. }))
    }

    fn count(&self, pred: impl Fn(&RecordOutcome) -> bool) -> usize {
        self.records.iter().filter(|r| pred(&r.outcome)).count()
    }
}

/// Turns session rows into slide batches and hands them to a service.
pub struct SessionSync<I: IdSource> {
    config: SyncConfig,
    normalizer: RepresentationNormalizer,
    statuses: StatusColorTable,
    builder: BatchBuilder,
    deriver: IdentityDeriver<I>,
}

impl<I: IdSource> SessionSync<I> {
    pub fn new(config: SyncConfig, ids: I) -> Self {
        let statuses = config.status_table();
        let builder = BatchBuilder::new(config.cells);
        let deriver = IdentityDeriver::new(ids).with_numbering(config.template);
        Self {
            config,
            normalizer: RepresentationNormalizer::new(),
            statuses,
            builder,
            deriver,
        }
    }

    /// Replace the status table, e.g. with a fixture in tests.
    pub fn with_status_table(mut self, statuses: StatusColorTable) -> Self {
        self.statuses = statuses;
        self
    }

    /// Slide content for a session with the given curation status.
    pub fn content_for(&self, session: &SessionRecord, curation_status: &str) -> SessionContent {
        SessionContent {
            title: session.title.clone(),
            datetime: session.datetime.clone(),
            channel: session.channel.clone(),
            description: session.description.clone(),
            moderators: PeopleList::build(
                &self.normalizer,
                &self.statuses,
                &session.moderators,
                &session.moderator_statuses,
            ),
            speakers: PeopleList::build(
                &self.normalizer,
                &self.statuses,
                &session.speakers,
                &session.speaker_statuses,
            ),
            notes: session.notes.clone(),
            background: self.config.background.color_for(curation_status),
        }
    }

    /// Sync every selected session; one session's failure never stops the rest.
    ///
    /// Fails only when the session list itself cannot be read.
    pub fn run(
        &mut self,
        records: &dyn RecordSource,
        service: &mut dyn SlidesService,
        options: &SyncOptions,
    ) -> Result<SyncReport> {
        let rows = records.sessions()?;
        let total = rows.len();

        let sessions: Vec<SessionRecord> = rows
            .iter()
            .map(|row| SessionRecord::from_record(row, &self.config.fields))
            .filter(|session| {
                options
                    .modified_since
                    .map_or(true, |cutoff| session.modified_after(cutoff))
            })
            .take(options.limit.unwrap_or(usize::MAX))
            .collect();
        log::info!("Found {} of {} session(s) to process", sessions.len(), total);

        let mut report = SyncReport::default();
        for session in &sessions {
            let outcome = match self.sync_session(records, service, options, session) {
                Ok(outcome) => outcome,
                Err(e) => {
                    log::error!("Error updating slide for record {}: {}", session.record_id, e);
                    RecordOutcome::Failed {
                        error: e.to_string(),
                        missing_structure: e.is_missing_structure(),
                    }
                }
            };
            report.records.push(RecordReport {
                record_id: session.record_id.clone(),
                outcome,
            });
        }

        log::info!(
            "Sync finished: {} applied, {} skipped, {} failed",
            report.applied(),
            report.skipped(),
            report.failed()
        );
        Ok(report)
    }

    /// Build and apply the batch for one session.
    pub fn sync_session(
        &mut self,
        records: &dyn RecordSource,
        service: &mut dyn SlidesService,
        options: &SyncOptions,
        session: &SessionRecord,
    ) -> Result<RecordOutcome> {
        let curation_status = resolve_curation_status(records, &self.config.tables, session)?;
        let content = self.content_for(session, &curation_status);

        let (ops, slide_id, created) = match &session.slide_id {
            Some(slide_id) => {
                let doc = service.presentation(&options.presentation_id)?;
                let target = BatchTarget::Update {
                    doc: &doc,
                    slide_id,
                };
                (self.builder.build(target, &content)?, slide_id.clone(), false)
            }
            None => {
                let template = match (&options.template_slide_id, options.create_missing) {
                    (Some(template), true) => template,
                    (None, true) => {
                        return Ok(RecordOutcome::Skipped {
                            reason: "no slide id and no template slide configured".to_string(),
                        })
                    }
                    (_, false) => {
                        log::debug!("Record {} has no slide id, skipping", session.record_id);
                        return Ok(RecordOutcome::Skipped {
                            reason: "no slide id".to_string(),
                        });
                    }
                };
                let plan = self.deriver.plan(template);
                let ops = self.builder.build(BatchTarget::Create(&plan), &content)?;
                (ops, plan.identity.slide_id.clone(), true)
            }
        };

        log::debug!(
            "Sending {} requests for record {} to slide {}",
            ops.len(),
            session.record_id,
            slide_id
        );
        let response = service.batch_update(&options.presentation_id, &ops)?;
        log::info!(
            "Slide {} {} for record {}",
            slide_id,
            if created { "created" } else { "updated" },
            session.record_id
        );

        Ok(RecordOutcome::Applied {
            slide_id,
            created,
            requests: ops.len(),
            response,
        })
    }
}
