//! # Merge Engine
//!
//! Layers one job definition onto another with "fill empty fields only"
//! semantics. A field on the target is overwritten only while it holds its
//! empty value (empty string, empty list or map, zero, absent block), so
//! applying layers from most specific to least specific gives "most
//! specific wins".
//!
//! ## Nested blocks
//!
//! Structured blocks (resources, security context, decoration/rerun/reporter
//! configuration, label maps, requirement maps) are merged as whole units. A
//! block that is already set on the target is kept as-is and the source's
//! block is discarded; the two are never reconciled key by key.
//!
//! ## Failure
//!
//! When both sides carry an opaque block of different YAML shapes (say a
//! mapping on one side and a list on the other) the merge fails with
//! [`Error::Merge`]. Shapes are checked before any field is written, so a
//! failed merge leaves the target untouched.

use std::collections::BTreeMap;

use serde_yaml::Value;

use crate::error::{Error, Result};
use crate::job::Job;

/// Fill the empty fields of `self` from `source`.
pub trait Merge {
    fn merge_from(&mut self, source: &Self) -> Result<()>;
}

/// Values with a distinguished empty state.
pub trait Empty {
    fn is_empty_value(&self) -> bool;
}

impl Empty for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Empty for u32 {
    fn is_empty_value(&self) -> bool {
        *self == 0
    }
}

impl<T> Empty for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> Empty for BTreeMap<K, V> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Empty for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.is_none()
    }
}

/// Copy `source` into `target` when `target` is empty.
pub fn fill<T: Empty + Clone>(target: &mut T, source: &T) {
    if target.is_empty_value() && !source.is_empty_value() {
        *target = source.clone();
    }
}

fn shape(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Mapping(_) => "mapping",
        Value::Sequence(_) => "sequence",
        Value::Tagged(_) => "tagged value",
        Value::Bool(_) | Value::Number(_) | Value::String(_) => "scalar",
    }
}

/// Fail when both sides hold an opaque block and the shapes disagree.
pub fn check_block(field: &str, target: &Option<Value>, source: &Option<Value>) -> Result<()> {
    if let (Some(target), Some(source)) = (target, source) {
        if shape(target) != shape(source) {
            return Err(Error::Merge {
                field: field.to_string(),
                message: format!(
                    "cannot merge a {} into a {}",
                    shape(source),
                    shape(target)
                ),
            });
        }
    }
    Ok(())
}

impl Merge for Job {
    fn merge_from(&mut self, source: &Job) -> Result<()> {
        for (field, target, source) in [
            ("resources", &self.resources, &source.resources),
            (
                "security_context",
                &self.security_context,
                &source.security_context,
            ),
            (
                "decoration_config",
                &self.decoration_config,
                &source.decoration_config,
            ),
            (
                "rerun_auth_config",
                &self.rerun_auth_config,
                &source.rerun_auth_config,
            ),
            (
                "reporter_config",
                &self.reporter_config,
                &source.reporter_config,
            ),
        ] {
            check_block(field, target, source)?;
        }

        // Identity and metadata
        fill(&mut self.name, &source.name);
        fill(&mut self.labels, &source.labels);
        fill(&mut self.annotations, &source.annotations);
        fill(&mut self.namespace, &source.namespace);
        fill(&mut self.cluster, &source.cluster);
        fill(&mut self.org_repo, &source.org_repo);

        // Execution spec
        fill(&mut self.image, &source.image);
        fill(&mut self.command, &source.command);
        fill(&mut self.env, &source.env);
        fill(&mut self.resources, &source.resources);
        fill(&mut self.volume_mounts, &source.volume_mounts);
        fill(&mut self.security_context, &source.security_context);
        fill(&mut self.volumes, &source.volumes);
        fill(&mut self.node_selector, &source.node_selector);
        fill(&mut self.extra_repos, &source.extra_repos);

        // CI behaviour
        fill(&mut self.branches, &source.branches);
        fill(&mut self.skip_branches, &source.skip_branches);
        fill(&mut self.regex, &source.regex);
        fill(&mut self.trigger, &source.trigger);
        fill(&mut self.rerun_command, &source.rerun_command);
        fill(&mut self.aliases, &source.aliases);
        fill(&mut self.clone_tmpl, &source.clone_tmpl);
        fill(&mut self.output_tmpl, &source.output_tmpl);
        fill(&mut self.max_concurrency, &source.max_concurrency);
        fill(&mut self.timeout, &source.timeout);
        fill(&mut self.decoration_config, &source.decoration_config);
        fill(&mut self.rerun_auth_config, &source.rerun_auth_config);
        fill(&mut self.reporter_config, &source.reporter_config);

        // Classification
        fill(&mut self.types, &source.types);
        fill(&mut self.modifiers, &source.modifiers);

        // Schedule
        fill(&mut self.cron, &source.cron);
        fill(&mut self.interval, &source.interval);

        // Inheritance
        fill(&mut self.require, &source.require);
        fill(&mut self.requirements, &source.requirements);

        Ok(())
    }
}
