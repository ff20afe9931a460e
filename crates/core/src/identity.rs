//! Object id derivation for duplicated template slides.
//!
//! A template slide `prefix_group_N` owns nested objects numbered after it
//! (the table at `N + 1`, the speaker notes shape at `N + 6` in the stock
//! template). Duplicating the slide maps each of those ids to a fresh one
//! carrying a per-invocation suffix.

use crate::types::ObjectIdentity;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Slides rejects object ids longer than this.
const MAX_OBJECT_ID_LEN: usize = 50;

/// Range fallback numbers are drawn from when a template id has none.
const FALLBACK_NUMBER_RANGE: std::ops::RangeInclusive<u64> = 1..=1_000_000_000;

/// Offsets of the nested objects relative to the template slide number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateNumbering {
    pub table_offset: u64,
    pub notes_offset: u64,
}

impl Default for TemplateNumbering {
    fn default() -> Self {
        Self {
            table_offset: 1,
            notes_offset: 6,
        }
    }
}

/// Ids of the template's nested objects, before any suffix is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SiblingIds {
    pub table_id: String,
    pub notes_id: String,
}

/// Source of per-invocation uniqueness.
pub trait IdSource {
    /// A fresh suffix; never repeats within the lifetime of the source.
    fn next_suffix(&mut self) -> String;

    /// Number used when a template id carries no parseable number.
    fn fallback_number(&mut self) -> u64;
}

/// Suffix from the decimal tail of a random draw.
#[derive(Debug)]
pub struct RandomSuffix {
    rng: StdRng,
}

impl RandomSuffix {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSuffix {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for RandomSuffix {
    fn next_suffix(&mut self) -> String {
        format!("{:011}", self.rng.gen_range(0..100_000_000_000u64))
    }

    fn fallback_number(&mut self) -> u64 {
        self.rng.gen_range(FALLBACK_NUMBER_RANGE)
    }
}

/// Run-scoped suffix: a random run tag plus a monotonic counter.
///
/// Suffixes from one source never collide; two runs collide only if their
/// tags do.
#[derive(Debug)]
pub struct RunCounter {
    tag: String,
    next: u64,
    rng: StdRng,
}

impl RunCounter {
    pub fn new() -> Self {
        let mut rng = StdRng::from_entropy();
        let tag = format!("{:06}", rng.gen_range(0..1_000_000u32));
        Self { tag, next: 1, rng }
    }

    pub fn with_tag(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            next: 1,
            rng: StdRng::seed_from_u64(0),
        }
    }
}

impl Default for RunCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl IdSource for RunCounter {
    fn next_suffix(&mut self) -> String {
        let suffix = format!("{}{}", self.tag, self.next);
        self.next += 1;
        suffix
    }

    fn fallback_number(&mut self) -> u64 {
        self.rng.gen_range(FALLBACK_NUMBER_RANGE)
    }
}

/// Derive the nested-object ids of a template slide.
///
/// `prefix_group_N` gives `prefix_group_{N+table}` and `prefix_group_{N+notes}`.
/// `N` may be negative. A missing last component, or one that is not an
/// `i64`, is replaced by `fallback()`; an
/// id with no underscore gets `_{table}` / `_{notes}` appended as is.
pub fn derive_sibling_ids(
    template_id: &str,
    numbering: TemplateNumbering,
    fallback: impl FnOnce() -> u64,
) -> SiblingIds {
    let parts: Vec<&str> = template_id.split('_').collect();

    if parts.len() < 2 {
        return SiblingIds {
            table_id: format!("{}_{}", template_id, numbering.table_offset),
            notes_id: format!("{}_{}", template_id, numbering.notes_offset),
        };
    }

    let (stem, number) = if parts.len() >= 3 {
        let stem = parts[..parts.len() - 1].join("_");
        let number = parts[parts.len() - 1].parse::<i64>().ok().map(i128::from);
        (stem, number)
    } else {
        (template_id.to_string(), None)
    };

    let number = number.unwrap_or_else(|| {
        let n = fallback();
        log::warn!(
            "Template id {:?} has no trailing number, using {} for nested ids",
            template_id,
            n
        );
        i128::from(n)
    });

    // i64 + u64 always fits in i128
    SiblingIds {
        table_id: format!("{}_{}", stem, number + i128::from(numbering.table_offset)),
        notes_id: format!("{}_{}", stem, number + i128::from(numbering.notes_offset)),
    }
}

/// Plans the ids of one template duplication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicationPlan {
    pub template_id: String,
    pub siblings: SiblingIds,
    pub identity: ObjectIdentity,
}

impl DuplicationPlan {
    /// The `objectIds` map of the duplicate request: template id to new id.
    pub fn id_map(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            (self.template_id.clone(), self.identity.slide_id.clone()),
            (self.siblings.table_id.clone(), self.identity.table_id.clone()),
            (self.siblings.notes_id.clone(), self.identity.notes_id.clone()),
        ])
    }
}

/// Derives fresh ids for each duplication of a template slide.
#[derive(Debug)]
pub struct IdentityDeriver<S: IdSource> {
    source: S,
    numbering: TemplateNumbering,
}

impl<S: IdSource> IdentityDeriver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            numbering: TemplateNumbering::default(),
        }
    }

    pub fn with_numbering(mut self, numbering: TemplateNumbering) -> Self {
        self.numbering = numbering;
        self
    }

    /// Plan a duplication of `template_id`, consuming one suffix.
    pub fn plan(&mut self, template_id: &str) -> DuplicationPlan {
        let siblings = derive_sibling_ids(template_id, self.numbering, || {
            self.source.fallback_number()
        });
        let suffix = self.source.next_suffix();

        let identity = ObjectIdentity {
            slide_id: format!("{}_{}", template_id, suffix),
            table_id: format!("{}_{}", siblings.table_id, suffix),
            notes_id: format!("{}_{}", siblings.notes_id, suffix),
        };

        for id in [&identity.slide_id, &identity.table_id, &identity.notes_id] {
            if id.len() > MAX_OBJECT_ID_LEN {
                log::warn!(
                    "Derived object id {:?} exceeds {} characters and may be rejected",
                    id,
                    MAX_OBJECT_ID_LEN
                );
            }
        }

        DuplicationPlan {
            template_id: template_id.to_string(),
            siblings,
            identity,
        }
    }
}
