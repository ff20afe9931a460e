//! Core of the session-to-slide synchronizer: participant list
//! normalization, styled-range indexing, template id derivation and
//! `batchUpdate` assembly.

pub mod batch;
pub mod colors;
pub mod config;
pub mod error;
pub mod identity;
pub mod normalize;
pub mod record;
pub mod slide;
pub mod sync;
pub mod types;

pub use batch::{BatchBuilder, BatchTarget, CellLayout, SessionContent};
pub use colors::{BackgroundPolicy, StatusColorTable};
pub use config::SyncConfig;
pub use error::{Error, Result};
pub use identity::{IdSource, IdentityDeriver, RandomSuffix, RunCounter, TemplateNumbering};
pub use normalize::{PeopleList, RepresentationNormalizer};
pub use record::{JsonRecordStore, Record, RecordSource, SessionRecord};
pub use slide::PresentationDoc;
pub use sync::{RecordOutcome, SessionSync, SlidesService, SyncOptions, SyncReport};
pub use types::{CellLocation, ColorLabel, MutationOp, ObjectIdentity, RgbColor, Segment, TextRange};
