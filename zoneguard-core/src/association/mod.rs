//! association — decide whether a helmet sits on a person's head
//!
//! The head reference point is the horizontal centre of the person box, one
//! `head_divisor`-th of the box height below its top edge.  A helmet is "on"
//! the person when its centre lies strictly closer to that point than
//! `height / head_divisor`, so the acceptance radius grows with apparent size.
//!
//! Helmets are never removed from the pool once matched: one helmet may
//! satisfy several overlapping persons.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::detection::{BBox, Located, Point};

/// Fraction of the person box height used for both the head offset and the
/// acceptance radius.
pub const DEFAULT_HEAD_DIVISOR: f32 = 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssociationStrategy {
    /// First helmet in input order within the radius wins.
    #[default]
    FirstMatch,
    /// Closest helmet within the radius wins; ties go to the earlier helmet.
    Nearest,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HelmetMatcher {
    pub strategy: AssociationStrategy,
    pub head_divisor: f32,
}

impl HelmetMatcher {
    pub fn new(strategy: AssociationStrategy, head_divisor: f32) -> Self {
        Self {
            strategy,
            head_divisor,
        }
    }

    pub fn head_reference(&self, person: &BBox) -> Point {
        Point::new(person.center_x(), person.top + person.height / self.head_divisor)
    }

    pub fn acceptance_radius(&self, person: &BBox) -> f32 {
        person.height / self.head_divisor
    }

    /// Return the position in `helmets` of the helmet associated with
    /// `person`, if any.
    pub fn find_helmet(&self, person: &BBox, helmets: &[Located<'_>]) -> Option<usize> {
        let radius = self.acceptance_radius(person);
        // Zero, negative or NaN heights can never match.
        if !(radius > 0.0) {
            return None;
        }
        let head = self.head_reference(person);
        let mut within = helmets
            .iter()
            .enumerate()
            .map(|(i, h)| (i, nalgebra::distance(&head, &h.center)))
            .filter(|&(_, d)| d < radius);

        let found = match self.strategy {
            AssociationStrategy::FirstMatch => within.next(),
            AssociationStrategy::Nearest => within.min_by(|a, b| a.1.total_cmp(&b.1)),
        };
        if let Some((i, distance)) = found {
            debug!(helmet = helmets[i].index, distance, radius, "helmet associated");
        }
        found.map(|(i, _)| i)
    }
}

impl Default for HelmetMatcher {
    fn default() -> Self {
        Self::new(AssociationStrategy::FirstMatch, DEFAULT_HEAD_DIVISOR)
    }
}
