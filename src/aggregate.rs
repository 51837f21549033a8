//! Grouping of materialized records by destination.
//!
//! Every record lands in the [`JobConfig`] of the destination its job
//! resolved to. Destinations are keyed by their resolved path, so jobs from
//! different input documents that resolve to the same path share one
//! output document. Records keep insertion order until [`Aggregator::sort`]
//! is called.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

use crate::materialize::Record;
use crate::records::{JobConfig, Periodic, Postsubmit, Presubmit};

/// Where an output document is written.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Destination {
    Stdout,
    File(PathBuf),
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Stdout => f.write_str("<stdout>"),
            Destination::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Direction records are sorted by name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// Stable sort by name, so records sharing a name keep insertion order in
/// either direction.
fn sort_by_name<T>(records: &mut [T], order: SortOrder, name: impl Fn(&T) -> &str) {
    match order {
        SortOrder::Ascending => records.sort_by(|a, b| name(a).cmp(name(b))),
        SortOrder::Descending => records.sort_by(|a, b| name(b).cmp(name(a))),
    }
}

/// Per-destination collections of records.
#[derive(Debug, Clone, Default)]
pub struct Aggregator {
    outputs: BTreeMap<Destination, JobConfig>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, destination: &Destination) -> &mut JobConfig {
        self.outputs.entry(destination.clone()).or_default()
    }

    pub fn add_presubmit(&mut self, destination: &Destination, org_repo: &str, record: Presubmit) {
        self.entry(destination)
            .presubmits
            .entry(org_repo.to_string())
            .or_default()
            .push(record);
    }

    pub fn add_postsubmit(&mut self, destination: &Destination, org_repo: &str, record: Postsubmit) {
        self.entry(destination)
            .postsubmits
            .entry(org_repo.to_string())
            .or_default()
            .push(record);
    }

    pub fn add_periodic(&mut self, destination: &Destination, record: Periodic) {
        self.entry(destination).periodics.push(record);
    }

    /// Add a record of any kind.
    pub fn add(&mut self, destination: &Destination, org_repo: &str, record: Record) {
        match record {
            Record::Presubmit(r) => self.add_presubmit(destination, org_repo, r),
            Record::Postsubmit(r) => self.add_postsubmit(destination, org_repo, r),
            Record::Periodic(r) => self.add_periodic(destination, r),
        }
    }

    /// Sort every collection of every destination by record name.
    pub fn sort(&mut self, order: SortOrder) {
        for config in self.outputs.values_mut() {
            for records in config.presubmits.values_mut() {
                sort_by_name(records, order, |r| r.base.name.as_str());
            }
            for records in config.postsubmits.values_mut() {
                sort_by_name(records, order, |r| r.base.name.as_str());
            }
            sort_by_name(&mut config.periodics, order, |r| r.base.name.as_str());
        }
    }

    /// True when `destination` holds no records (or is unknown).
    pub fn is_empty(&self, destination: &Destination) -> bool {
        self.outputs
            .get(destination)
            .map_or(true, JobConfig::is_empty)
    }

    pub fn get(&self, destination: &Destination) -> Option<&JobConfig> {
        self.outputs.get(destination)
    }

    /// Destinations holding at least one record, in path order.
    pub fn non_empty(&self) -> impl Iterator<Item = (&Destination, &JobConfig)> {
        self.outputs.iter().filter(|(_, config)| !config.is_empty())
    }

    pub fn len(&self) -> usize {
        self.outputs.len()
    }
}
