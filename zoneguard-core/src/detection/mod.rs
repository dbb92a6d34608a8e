//! detection — per-frame object records and the person/helmet split
//!
//! The upstream perception pipeline reports one `ObjectMeta` per object per
//! frame: raw class label, bounding box, tracker identity and the names of
//! the zones the object currently overlaps.  This module turns those records
//! into typed `Detection`s and partitions a frame into persons and helmets.

use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::zones::RestrictedZones;

// ── Constants ────────────────────────────────────────────────────────────────

/// Track id the upstream tracker assigns to objects it is not following.
pub const UNTRACKED_ID: u64 = u64::MAX;

// ── Geometry ─────────────────────────────────────────────────────────────────

/// A point in frame pixel coordinates.
pub type Point = Point2<f32>;

/// Axis-aligned bounding box in frame pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl BBox {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }
    pub fn center_x(&self) -> f32 {
        self.left + self.width / 2.0
    }
    pub fn center_y(&self) -> f32 {
        self.top + self.height / 2.0
    }
    pub fn center(&self) -> Point {
        Point::new(self.center_x(), self.center_y())
    }
}

// ── Classes ──────────────────────────────────────────────────────────────────

/// The closed set of object kinds the compliance pass distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectClass {
    Person,
    Helmet,
    Other,
}

/// Raw detector labels recognised as persons and helmets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LabelSet {
    pub person: Vec<String>,
    pub helmet: Vec<String>,
    pub case_sensitive: bool,
}

impl LabelSet {
    pub fn class_of(&self, label: &str) -> ObjectClass {
        let matches = |name: &String| {
            if self.case_sensitive {
                name == label
            } else {
                name.eq_ignore_ascii_case(label)
            }
        };
        if self.person.iter().any(matches) {
            ObjectClass::Person
        } else if self.helmet.iter().any(matches) {
            ObjectClass::Helmet
        } else {
            ObjectClass::Other
        }
    }
}

impl Default for LabelSet {
    fn default() -> Self {
        Self {
            person: vec!["person".into()],
            helmet: vec!["helmet".into()],
            case_sensitive: false,
        }
    }
}

// ── Records ──────────────────────────────────────────────────────────────────

/// One object as reported by the upstream pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectMeta {
    #[serde(default)]
    pub track_id: Option<u64>,
    pub label: String,
    pub rect: BBox,
    /// Names of the zones the object currently overlaps.
    #[serde(default)]
    pub zones: Vec<String>,
}

/// A classified detection.  Immutable for the duration of one frame's pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// `None` for objects the tracker is not following.
    pub track_id: Option<u64>,
    pub class: ObjectClass,
    pub label: String,
    pub rect: BBox,
    pub in_restricted_zone: bool,
}

impl Detection {
    pub fn from_meta(meta: &ObjectMeta, labels: &LabelSet, zones: &RestrictedZones) -> Self {
        Self {
            track_id: meta.track_id.filter(|&id| id != UNTRACKED_ID),
            class: labels.class_of(&meta.label),
            label: meta.label.clone(),
            rect: meta.rect,
            in_restricted_zone: zones.contains(&meta.zones),
        }
    }
}

/// A detection together with its position in the frame and its box centre.
#[derive(Debug, Clone, Copy)]
pub struct Located<'a> {
    /// Index into the frame's detection list.
    pub index: usize,
    pub detection: &'a Detection,
    pub center: Point,
}

/// A frame's detections split by class, input order preserved per class.
#[derive(Debug, Default)]
pub struct ClassifiedFrame<'a> {
    pub persons: Vec<Located<'a>>,
    pub helmets: Vec<Located<'a>>,
}

/// Partition `detections` into persons and helmets.  `Other` detections are
/// dropped from both lists.
pub fn classify(detections: &[Detection]) -> ClassifiedFrame<'_> {
    let mut frame = ClassifiedFrame::default();
    for (index, detection) in detections.iter().enumerate() {
        let located = Located {
            index,
            detection,
            center: detection.rect.center(),
        };
        match detection.class {
            ObjectClass::Person => frame.persons.push(located),
            ObjectClass::Helmet => frame.helmets.push(located),
            ObjectClass::Other => {}
        }
    }
    frame
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(track_id: Option<u64>, label: &str, zones: &[&str]) -> ObjectMeta {
        ObjectMeta {
            track_id,
            label: label.into(),
            rect: BBox::new(10.0, 20.0, 30.0, 60.0),
            zones: zones.iter().map(|z| z.to_string()).collect(),
        }
    }

    #[test]
    fn bbox_center() {
        let b = BBox::new(100.0, 100.0, 50.0, 200.0);
        assert_eq!(b.center(), Point::new(125.0, 200.0));
    }

    #[test]
    fn labels_match_case_insensitively_by_default() {
        let labels = LabelSet::default();
        assert_eq!(labels.class_of("Person"), ObjectClass::Person);
        assert_eq!(labels.class_of("Helmet"), ObjectClass::Helmet);
        assert_eq!(labels.class_of("Bag"), ObjectClass::Other);
    }

    #[test]
    fn case_sensitive_labels() {
        let labels = LabelSet {
            case_sensitive: true,
            ..LabelSet::default()
        };
        assert_eq!(labels.class_of("person"), ObjectClass::Person);
        assert_eq!(labels.class_of("Person"), ObjectClass::Other);
    }

    #[test]
    fn untracked_sentinel_becomes_none() {
        let labels = LabelSet::default();
        let zones = RestrictedZones::default();
        let d = Detection::from_meta(&meta(Some(UNTRACKED_ID), "person", &[]), &labels, &zones);
        assert_eq!(d.track_id, None);
        let d = Detection::from_meta(&meta(Some(4), "person", &[]), &labels, &zones);
        assert_eq!(d.track_id, Some(4));
    }

    #[test]
    fn zone_membership_is_read_from_tags() {
        let labels = LabelSet::default();
        let zones = RestrictedZones::default();
        let inside = Detection::from_meta(
            &meta(Some(1), "person", &["Loading Dock", "Restricted Area"]),
            &labels,
            &zones,
        );
        let outside = Detection::from_meta(&meta(Some(2), "person", &["Loading Dock"]), &labels, &zones);
        assert!(inside.in_restricted_zone);
        assert!(!outside.in_restricted_zone);
    }

    #[test]
    fn classify_splits_and_keeps_order() {
        let labels = LabelSet::default();
        let zones = RestrictedZones::default();
        let detections: Vec<Detection> = [
            meta(Some(1), "person", &[]),
            meta(Some(2), "helmet", &[]),
            meta(Some(3), "Bag", &[]),
            meta(Some(4), "person", &[]),
        ]
        .iter()
        .map(|m| Detection::from_meta(m, &labels, &zones))
        .collect();

        let frame = classify(&detections);
        let persons: Vec<usize> = frame.persons.iter().map(|p| p.index).collect();
        let helmets: Vec<usize> = frame.helmets.iter().map(|h| h.index).collect();
        assert_eq!(persons, vec![0, 3]);
        assert_eq!(helmets, vec![1]);
        assert_eq!(frame.persons[0].center, Point::new(25.0, 50.0));
    }

    #[test]
    fn classify_empty_frame() {
        let frame = classify(&[]);
        assert!(frame.persons.is_empty());
        assert!(frame.helmets.is_empty());
    }
}
