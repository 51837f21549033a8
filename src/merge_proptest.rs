//! Property-based tests for merging, requirements, templates and sorting.
//!
//! These tests use proptest to generate random inputs and verify that
//! invariants hold for all possible inputs.

#[cfg(test)]
mod proptest_tests {
    use std::collections::BTreeMap;

    use proptest::prelude::*;

    use crate::aggregate::{Aggregator, Destination, SortOrder};
    use crate::job::{Job, OrgRepo};
    use crate::merge::Merge;
    use crate::records::{Brancher, JobBase, Presubmit};
    use crate::requirements;
    use crate::template::{render, TemplateVars};

    fn job(image: &str, branches: Vec<String>, labels: BTreeMap<String, String>) -> Job {
        Job {
            image: image.to_string(),
            branches,
            labels,
            ..Default::default()
        }
    }

    fn presubmit(name: &str, seq: usize) -> Presubmit {
        Presubmit {
            base: JobBase {
                name: name.to_string(),
                ..Default::default()
            },
            always_run: true,
            optional: false,
            trigger: seq.to_string(),
            rerun_command: String::new(),
            brancher: Brancher::default(),
            run_if_changed: String::new(),
            skip_report: false,
        }
    }

    // ============================================================================
    // Fill-empty merge
    // ============================================================================

    proptest! {
        /// Property: a non-empty target field is never overwritten, an empty one
        /// takes the source value
        #[test]
        fn merge_only_fills_empty_fields(
            target in "[a-z:.0-9]{0,8}",
            source in "[a-z:.0-9]{0,8}",
        ) {
            let mut merged = job(&target, Vec::new(), BTreeMap::new());
            merged.merge_from(&job(&source, Vec::new(), BTreeMap::new())).unwrap();

            let expected = if target.is_empty() { &source } else { &target };
            prop_assert_eq!(&merged.image, expected);
        }

        /// Property: collections merge as whole units, never element by element
        #[test]
        fn merge_does_not_union_collections(
            target in prop::collection::vec("[a-z]{1,6}", 0..4),
            source in prop::collection::vec("[a-z]{1,6}", 0..4),
            target_labels in prop::collection::btree_map("[a-z]{1,4}", "[a-z]{1,4}", 0..3),
            source_labels in prop::collection::btree_map("[a-z]{1,4}", "[a-z]{1,4}", 0..3),
        ) {
            let mut merged = job("", target.clone(), target_labels.clone());
            merged.merge_from(&job("", source.clone(), source_labels.clone())).unwrap();

            let expected = if target.is_empty() { source } else { target };
            prop_assert_eq!(merged.branches, expected);
            let expected = if target_labels.is_empty() { source_labels } else { target_labels };
            prop_assert_eq!(merged.labels, expected);
        }

        /// Property: merging the same source twice changes nothing the second time
        #[test]
        fn merge_is_idempotent(
            target in "[a-z]{0,6}",
            source in "[a-z]{0,6}",
            branches in prop::collection::vec("[a-z]{1,6}", 0..3),
        ) {
            let source = job(&source, branches, BTreeMap::new());
            let mut once = job(&target, Vec::new(), BTreeMap::new());
            once.merge_from(&source).unwrap();
            let mut twice = once.clone();
            twice.merge_from(&source).unwrap();

            prop_assert_eq!(once, twice);
        }

        /// Property: the first requirement naming a field wins
        #[test]
        fn requirements_apply_in_list_order(
            images in prop::collection::vec("[a-z]{1,6}", 1..5),
        ) {
            let mut target = Job {
                name: "job".to_string(),
                ..Default::default()
            };
            for (idx, image) in images.iter().enumerate() {
                let name = format!("req{}", idx);
                target.require.push(name.clone());
                target.requirements.insert(name, job(image, Vec::new(), BTreeMap::new()));
            }

            let errors = requirements::apply(&mut target);

            prop_assert!(errors.is_empty());
            prop_assert_eq!(&target.image, &images[0]);
        }
    }

    // ============================================================================
    // Templates
    // ============================================================================

    proptest! {
        /// Property: text without actions renders unchanged
        #[test]
        fn render_without_actions_is_identity(text in "[^{}]*") {
            let org_repo = OrgRepo { org: "acme".to_string(), repo: "widget".to_string() };
            let rendered = render(&text, &TemplateVars::from(&org_repo)).unwrap();
            prop_assert_eq!(rendered, text);
        }

        /// Property: org and repo substitute verbatim
        #[test]
        fn render_substitutes_org_and_repo(
            org in "[a-zA-Z0-9_-]{1,10}",
            repo in "[a-zA-Z0-9_.-]{1,10}",
        ) {
            let org_repo = OrgRepo { org: org.clone(), repo: repo.clone() };
            let rendered = render("{{ .Org }}/{{ .Repo }}", &TemplateVars::from(&org_repo)).unwrap();
            prop_assert_eq!(rendered, format!("{}/{}", org, repo));
        }

        /// Property: org/repo parsing splits on the first slash and displays back
        #[test]
        fn org_repo_round_trips(org in "[a-z0-9-]{1,8}", repo in "[a-z0-9-]{1,8}(/[a-z0-9-]{1,8})?") {
            let value = format!("{}/{}", org, repo);
            let parsed: OrgRepo = value.parse().unwrap();
            prop_assert_eq!(&parsed.org, &org);
            prop_assert_eq!(&parsed.repo, &repo);
            prop_assert_eq!(parsed.to_string(), value);
        }
    }

    // ============================================================================
    // Sorting
    // ============================================================================

    proptest! {
        /// Property: sorting orders by name and keeps insertion order among
        /// equal names, in either direction
        #[test]
        fn sort_is_ordered_and_stable(
            names in prop::collection::vec("[abc]", 0..12),
            descending in any::<bool>(),
        ) {
            let order = if descending { SortOrder::Descending } else { SortOrder::Ascending };
            let destination = Destination::Stdout;
            let mut aggregator = Aggregator::new();
            for (seq, name) in names.iter().enumerate() {
                aggregator.add_presubmit(&destination, "o/r", presubmit(name, seq));
            }

            aggregator.sort(order);

            let Some(config) = aggregator.get(&destination) else {
                prop_assert!(names.is_empty());
                return Ok(());
            };
            let sorted = &config.presubmits["o/r"];
            prop_assert_eq!(sorted.len(), names.len());
            for pair in sorted.windows(2) {
                let (a, b) = (&pair[0], &pair[1]);
                if descending {
                    prop_assert!(a.base.name >= b.base.name);
                } else {
                    prop_assert!(a.base.name <= b.base.name);
                }
                if a.base.name == b.base.name {
                    let (sa, sb): (usize, usize) =
                        (a.trigger.parse().unwrap(), b.trigger.parse().unwrap());
                    prop_assert!(sa < sb);
                }
            }
        }
    }
}
