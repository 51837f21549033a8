//! Requirement resolution.
//!
//! A job lists requirement names under `require`; each name refers to a
//! partial job under `requirements` (usually declared once in a document's
//! `defaults`). Fragments are merged in list order with the same
//! fill-empty rule as defaults, after defaults have been applied. A
//! fragment can therefore supply what the job did not inherit, but never
//! replaces anything the job already has.

use log::debug;

use crate::error::{Error, ErrorCollection};
use crate::job::Job;
use crate::merge::Merge;

/// Apply every requirement named by `job.require`, in order.
///
/// Unknown names and failed merges are recorded and skipped; the remaining
/// requirements are still applied.
pub fn apply(job: &mut Job) -> ErrorCollection {
    let mut errors = ErrorCollection::new();
    let names = job.require.clone();

    for name in &names {
        let Some(fragment) = job.requirements.get(name).cloned() else {
            errors.push(Error::UnknownRequirement {
                job: job.name.clone(),
                name: name.clone(),
            });
            continue;
        };

        debug!("Applying requirement '{}' to job '{}'", name, job.name);
        if let Err(e) = job.merge_from(&fragment) {
            errors.push(e);
        }
    }

    errors
}
