use std::sync::Arc;

use pretty_assertions::assert_eq;
use zoneguard_core::annotation::Rgba;
use zoneguard_core::config::EngineConfig;
use zoneguard_core::detection::{BBox, ObjectMeta};
use zoneguard_core::metrics::NoopMetrics;
use zoneguard_core::pipeline::{ComplianceEngine, FrameMeta, FrameOutput};
use zoneguard_core::summary::{FrameZoneStats, NamedCount, NamedFlag};

const RESTRICTED: &str = "Restricted Area";

fn engine() -> ComplianceEngine {
    ComplianceEngine::new(&EngineConfig::default(), Arc::new(NoopMetrics))
}

fn person(track_id: u64, rect: BBox, in_zone: bool) -> ObjectMeta {
    ObjectMeta {
        track_id: Some(track_id),
        label: "person".into(),
        rect,
        zones: if in_zone {
            vec![RESTRICTED.to_string()]
        } else {
            Vec::new()
        },
    }
}

fn helmet_at(track_id: u64, cx: f32, cy: f32) -> ObjectMeta {
    ObjectMeta {
        track_id: Some(track_id),
        label: "Helmet".into(),
        rect: BBox::new(cx - 8.0, cy - 6.0, 16.0, 12.0),
        zones: Vec::new(),
    }
}

fn run(objects: Vec<ObjectMeta>, stats: Option<FrameZoneStats>) -> FrameOutput {
    engine().process_frame(&FrameMeta {
        stream_id: 0,
        frame_num: 0,
        objects,
        stats,
    })
}

fn assert_alert_invariants(out: &FrameOutput) {
    let non_compliant = out.results.iter().filter(|r| !r.compliant).count();
    assert_eq!(out.summary.alert_count, non_compliant);
    assert!(out.summary.alert_count <= out.summary.person_count);
}

const WORKER: BBox = BBox {
    left: 100.0,
    top: 100.0,
    width: 50.0,
    height: 200.0,
};

#[test]
fn scenario_helmet_on_head_is_compliant() {
    let out = run(vec![person(1, WORKER, true), helmet_at(2, 125.0, 120.0)], None);
    assert_eq!(out.results.len(), 1);
    assert!(out.results[0].compliant);
    assert_eq!(out.objects[0].border_color, Rgba::GREEN);
    assert_eq!(out.summary.alert_count, 0);
    assert_alert_invariants(&out);
}

#[test]
fn scenario_distant_helmet_raises_alert() {
    let out = run(vec![person(1, WORKER, true), helmet_at(2, 300.0, 300.0)], None);
    assert!(!out.results[0].compliant);
    assert_eq!(out.objects[0].border_color, Rgba::RED);
    assert_eq!(out.objects[0].background_color, Some(Rgba::new(1.0, 0.0, 0.0, 0.3)));
    assert_eq!(out.objects[0].text, "person DANGER ZONE: WEAR A HELMET!");
    assert_eq!(out.summary.alert_count, 1);
    assert_alert_invariants(&out);
}

#[test]
fn scenario_one_helmet_two_persons() {
    let second = BBox::new(400.0, 100.0, 50.0, 200.0);
    let out = run(
        vec![
            person(1, WORKER, true),
            person(2, second, true),
            helmet_at(3, 125.0, 120.0),
        ],
        None,
    );
    assert!(out.results[0].compliant);
    assert!(!out.results[1].compliant);
    assert_eq!(out.summary.person_count, 2);
    assert_eq!(out.summary.alert_count, 1);
    assert_alert_invariants(&out);
}

#[test]
fn scenario_empty_frame() {
    let out = run(Vec::new(), None);
    assert!(out.summary.text.starts_with("People Current Frame: 0"));
    assert_eq!(out.summary.text, "People Current Frame: 0\nSecurity alerts: 0");
    assert!(out.objects.is_empty());
    assert_eq!(out.overlay.text, out.summary.text);
}

#[test]
fn scenario_zone_stats_without_lines() {
    let stats = FrameZoneStats {
        zone_counts: vec![NamedCount {
            name: "Zone A".into(),
            count: 3,
        }],
        line_totals: Vec::new(),
        overcrowding: vec![NamedFlag {
            name: "Zone A".into(),
            status: true,
        }],
    };
    let out = run(Vec::new(), Some(stats));
    assert_eq!(
        out.summary.text,
        "People Current Frame: 0\n\
         People in Zone A: 3\n\
         Overcrowding in Zone A: Yes\n\
         Security alerts: 0"
    );
    assert!(!out.summary.text.contains("Total:"));
}

#[test]
fn outside_zone_never_alerts_even_with_helmet_far_away() {
    let out = run(vec![person(1, WORKER, false), helmet_at(2, 900.0, 900.0)], None);
    assert!(out.results.is_empty());
    assert_eq!(out.summary.alert_count, 0);
    assert_eq!(out.summary.person_count, 1);
    assert_eq!(out.objects[0].text, "person");
}

#[test]
fn coincident_helmet_is_always_compliant() {
    for height in [12.5_f32, 60.0, 200.0, 731.0] {
        let rect = BBox::new(40.0, 30.0, 20.0, height);
        let head_y = rect.top + rect.height / 12.0;
        let out = run(vec![person(1, rect, true), helmet_at(2, rect.center_x(), head_y)], None);
        assert!(out.results[0].compliant, "height {height}");
    }
}

#[test]
fn in_zone_without_helmets_is_always_flagged() {
    let rects = [
        WORKER,
        BBox::new(0.0, 0.0, 1.0, 1.0),
        BBox::new(10.0, 10.0, 0.0, 0.0),
        BBox::new(10.0, 10.0, 40.0, -20.0),
    ];
    for (i, rect) in rects.into_iter().enumerate() {
        let out = run(vec![person(i as u64, rect, true)], None);
        assert_eq!(out.summary.alert_count, 1);
        assert_alert_invariants(&out);
    }
}

#[test]
fn taller_person_can_flip_to_compliant() {
    // Helmet 12px right of the head reference in both frames.
    let verdict = |height: f32| {
        let rect = BBox::new(100.0, 100.0, 50.0, height);
        let head_y = rect.top + rect.height / 12.0;
        run(vec![person(1, rect, true), helmet_at(2, 137.0, head_y)], None).results[0].compliant
    };
    assert!(!verdict(120.0));
    assert!(verdict(180.0));
}

#[test]
fn mixed_frame_invariants() {
    let mut objects = Vec::new();
    for i in 0..12u64 {
        let rect = BBox::new(60.0 * i as f32, 50.0, 40.0, 120.0 + 10.0 * i as f32);
        objects.push(person(i, rect, i % 3 != 0));
        if i % 2 == 0 {
            objects.push(helmet_at(100 + i, rect.center_x(), rect.top + rect.height / 12.0));
        }
    }
    objects.push(ObjectMeta {
        track_id: Some(500),
        label: "Bag".into(),
        rect: BBox::new(5.0, 5.0, 10.0, 10.0),
        zones: vec![RESTRICTED.to_string()],
    });

    let out = run(objects.clone(), None);
    assert_eq!(out.objects.len(), objects.len());
    assert_eq!(out.summary.person_count, 12);
    // in zone: i % 3 != 0 -> 8 persons; of those, odd i have no helmet: 1, 5, 7, 11
    assert_eq!(out.results.len(), 8);
    assert_eq!(out.summary.alert_count, 4);
    assert_alert_invariants(&out);

    let again = run(objects, None);
    assert_eq!(again, out);
}
