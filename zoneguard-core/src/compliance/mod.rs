//! compliance — per-person helmet verdicts and object directives
//!
//! Every detection gets one directive in input order.  In-zone persons are
//! judged against the frame's helmets and restyled: green when a helmet is
//! associated, red with the warning suffix when not.  Each tracked identity
//! is judged at most once per frame.

use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::annotation::{AnnotationDirective, AnnotationStyles, AnnotationTarget};
use crate::association::HelmetMatcher;
use crate::cache::VerdictCache;
use crate::detection::{classify, Detection};

/// Label suffix for in-zone persons without a helmet.
pub const DEFAULT_WARNING_SUFFIX: &str = " DANGER ZONE: WEAR A HELMET!";

/// Verdict for one in-zone person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ComplianceResult {
    pub index: usize,
    pub track_id: Option<u64>,
    pub compliant: bool,
    /// Compliant only by virtue of the cross-frame verdict hold.
    pub held: bool,
}

#[derive(Debug, Clone, Default)]
pub struct ComplianceReport {
    pub results: Vec<ComplianceResult>,
    /// One per detection, same order as the input.
    pub directives: Vec<AnnotationDirective>,
    pub person_count: usize,
    pub alert_count: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ComplianceClassifier {
    matcher: HelmetMatcher,
    styles: AnnotationStyles,
    warning_suffix: String,
}

impl ComplianceClassifier {
    pub fn new(matcher: HelmetMatcher, styles: AnnotationStyles, warning_suffix: impl Into<String>) -> Self {
        Self {
            matcher,
            styles,
            warning_suffix: warning_suffix.into(),
        }
    }

    pub fn assess(&self, detections: &[Detection], mut hold: Option<&mut VerdictCache>) -> ComplianceReport {
        let frame = classify(detections);

        let mut directives: Vec<AnnotationDirective> = detections
            .iter()
            .enumerate()
            .map(|(index, d)| self.styles.neutral(target(index, d), &d.label))
            .collect();

        let mut judged: HashSet<u64> = HashSet::new();
        let mut results = Vec::new();

        for person in &frame.persons {
            let d = person.detection;
            if !d.in_restricted_zone {
                continue;
            }
            if let Some(id) = d.track_id {
                if !judged.insert(id) {
                    debug!(track_id = id, "duplicate person entry ignored");
                    continue;
                }
            }

            let matched = self.matcher.find_helmet(&d.rect, &frame.helmets).is_some();
            let held = !matched
                && d
                    .track_id
                    .zip(hold.as_deref())
                    .is_some_and(|(id, cache)| cache.holds(id));
            if matched {
                if let (Some(id), Some(cache)) = (d.track_id, hold.as_deref_mut()) {
                    cache.remember(id);
                }
            }
            let compliant = matched || held;

            let target = target(person.index, d);
            directives[person.index] = if compliant {
                self.styles.compliant(target, &d.label)
            } else {
                self.styles.violation(target, &d.label, &self.warning_suffix)
            };

            debug!(track_id = ?d.track_id, compliant, held, "person judged");
            results.push(ComplianceResult {
                index: person.index,
                track_id: d.track_id,
                compliant,
                held,
            });
        }

        let alert_count = results.iter().filter(|r| !r.compliant).count();
        ComplianceReport {
            results,
            directives,
            person_count: frame.persons.len(),
            alert_count,
        }
    }
}

fn target(index: usize, d: &Detection) -> AnnotationTarget {
    AnnotationTarget::Object {
        index,
        track_id: d.track_id,
    }
}
