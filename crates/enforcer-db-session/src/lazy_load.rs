//! Per-relation accounting of parent loads made one record at a time.
//!
//! [`Repository::load_related`](crate::Repository::load_related) costs one
//! backend read per call. When the same relation keeps being resolved that
//! way, the caller almost always holds a list and should have asked
//! [`EntityList::fetch_associated`](crate::EntityList::fetch_associated)
//! for a single batch read instead:
//!
//! ```ignore
//! for key in &mut keys {
//!     repo.load_related(key, HsmKey::POLICY)?;   // one read each
//! }
//! list.fetch_associated(HsmKey::POLICY)?;        // one read in total
//! ```
//!
//! Only a count and the first [`SAMPLED_SITES`] caller locations are kept
//! per relation, so a long-lived repository stays bounded.

use std::collections::HashMap;
use std::panic::Location;

use enforcer_db_core::{Entity, Relation};

use crate::config::RepositoryConfig;

/// Warning target for lazy-load reports.
pub const LAZY_LOAD_TARGET: &str = "enforcer_db::lazy";

/// Caller locations remembered per relation.
pub const SAMPLED_SITES: usize = 5;

/// (child table, foreign-key column)
type RelationId = (&'static str, &'static str);

#[derive(Debug, Default)]
struct RelationLoads {
    count: usize,
    sites: Vec<&'static Location<'static>>,
}

/// Parent loads per relation for one repository.
#[derive(Debug)]
pub struct LazyLoads {
    relations: HashMap<RelationId, RelationLoads>,
    threshold: usize,
    enabled: bool,
}

impl LazyLoads {
    pub(crate) fn from_config(config: &RepositoryConfig) -> Self {
        Self {
            relations: HashMap::new(),
            threshold: config.lazy_load_warn_threshold,
            enabled: config.detect_lazy_loads,
        }
    }

    /// Count one load of `field` on `table` made from `site`.
    pub(crate) fn record(
        &mut self,
        table: &'static str,
        field: &'static str,
        site: &'static Location<'static>,
    ) {
        if !self.enabled {
            return;
        }
        let loads = self.relations.entry((table, field)).or_default();
        loads.count += 1;
        if loads.sites.len() < SAMPLED_SITES {
            loads.sites.push(site);
        }
        if loads.count == self.threshold {
            tracing::warn!(
                target: LAZY_LOAD_TARGET,
                table,
                relation = field,
                loads = loads.count,
                "parent loaded once per record; batch with EntityList::fetch_associated"
            );
            for site in &loads.sites {
                tracing::debug!(target: LAZY_LOAD_TARGET, table, relation = field, "  at {site}");
            }
        }
    }

    /// The warning threshold.
    #[must_use]
    pub fn threshold(&self) -> usize {
        self.threshold
    }

    /// Per-record loads of `relation` so far.
    #[must_use]
    pub fn count<C: Entity, P>(&self, relation: Relation<C, P>) -> usize {
        self.relations
            .get(&(C::TABLE_NAME, relation.field))
            .map_or(0, |loads| loads.count)
    }

    /// The first caller locations that loaded `relation`.
    #[must_use]
    pub fn sites<C: Entity, P>(&self, relation: Relation<C, P>) -> &[&'static Location<'static>] {
        self.relations
            .get(&(C::TABLE_NAME, relation.field))
            .map(|loads| loads.sites.as_slice())
            .unwrap_or_default()
    }

    /// Relations loaded at least `threshold` times.
    #[must_use]
    pub fn flagged(&self) -> usize {
        self.relations
            .values()
            .filter(|loads| loads.count >= self.threshold)
            .count()
    }

    /// Forget every count, e.g. between requests.
    pub fn clear(&mut self) {
        self.relations.clear();
    }
}
