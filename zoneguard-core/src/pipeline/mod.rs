use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::annotation::{AnnotationDirective, OverlayStyle};
use crate::cache::VerdictCache;
use crate::compliance::{ComplianceClassifier, ComplianceResult};
use crate::config::EngineConfig;
use crate::detection::{Detection, LabelSet, ObjectMeta};
use crate::metrics::MetricsSink;
use crate::summary::{FrameSummary, FrameZoneStats};
use crate::zones::RestrictedZones;

/// Metadata for one frame of one camera stream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameMeta {
    #[serde(default)]
    pub stream_id: u32,
    #[serde(default)]
    pub frame_num: u64,
    #[serde(default)]
    pub objects: Vec<ObjectMeta>,
    /// Absent when the zone analytics attached nothing to this frame.
    #[serde(default)]
    pub stats: Option<FrameZoneStats>,
}

/// Frames from one or more streams processed together upstream.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchMeta {
    pub frames: Vec<FrameMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameOutput {
    pub stream_id: u32,
    pub frame_num: u64,
    pub results: Vec<ComplianceResult>,
    /// One directive per input object, in input order.
    pub objects: Vec<AnnotationDirective>,
    pub overlay: AnnotationDirective,
    pub summary: FrameSummary,
}

/// The stateless half of the engine: one frame in, one output out.
#[derive(Debug, Clone)]
pub struct Correlator {
    labels: LabelSet,
    zones: RestrictedZones,
    classifier: ComplianceClassifier,
    overlay: OverlayStyle,
}

impl Correlator {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            labels: config.labels.clone(),
            zones: RestrictedZones::new(config.restricted_zones.iter().cloned()),
            classifier: ComplianceClassifier::new(
                config.association,
                config.style.clone(),
                config.warning_suffix.clone(),
            ),
            overlay: config.overlay.clone(),
        }
    }

    pub fn correlate(&self, frame: &FrameMeta, hold: Option<&mut VerdictCache>) -> FrameOutput {
        let detections: Vec<Detection> = frame
            .objects
            .iter()
            .map(|meta| Detection::from_meta(meta, &self.labels, &self.zones))
            .collect();

        let report = self.classifier.assess(&detections, hold);
        let summary = FrameSummary::build(report.person_count, report.alert_count, frame.stats.as_ref());
        let overlay = self.overlay.directive(summary.text.clone());

        FrameOutput {
            stream_id: frame.stream_id,
            frame_num: frame.frame_num,
            results: report.results,
            objects: report.directives,
            overlay,
            summary,
        }
    }
}

pub struct ComplianceEngine {
    correlator: Correlator,
    hold_frames: Option<u32>,
    holds: HashMap<u32, VerdictCache>,
    metrics: Arc<dyn MetricsSink>,
    prof_frames: u64,
    prof_correlate: Duration,
}

impl ComplianceEngine {
    pub fn new(config: &EngineConfig, metrics: Arc<dyn MetricsSink>) -> Self {
        Self {
            correlator: Correlator::new(config),
            hold_frames: config.hold.map(|h| h.frames),
            holds: HashMap::new(),
            metrics,
            prof_frames: 0,
            prof_correlate: Duration::ZERO,
        }
    }

    /// True when no state crosses frame boundaries.
    pub fn is_frame_local(&self) -> bool {
        self.hold_frames.is_none()
    }

    pub fn process_frame(&mut self, frame: &FrameMeta) -> FrameOutput {
        let start = Instant::now();
        let out = self.correlate_held(frame);
        self.finish(start, std::slice::from_ref(&out));
        out
    }

    /// Process every frame of a batch.  Output order matches input order.
    ///
    /// Frames are independent when the engine is frame-local and are spread
    /// across the rayon pool; with a verdict hold they run in order so each
    /// stream's cache sees its frames sequentially.
    pub fn process_batch(&mut self, frames: &[FrameMeta]) -> Vec<FrameOutput> {
        let start = Instant::now();
        let outputs: Vec<FrameOutput> = if self.is_frame_local() {
            let correlator = &self.correlator;
            frames
                .par_iter()
                .map(|frame| correlator.correlate(frame, None))
                .collect()
        } else {
            frames.iter().map(|frame| self.correlate_held(frame)).collect()
        };
        self.finish(start, &outputs);
        outputs
    }

    fn correlate_held(&mut self, frame: &FrameMeta) -> FrameOutput {
        let mut hold = self.hold_frames.map(|period| {
            self.holds
                .entry(frame.stream_id)
                .or_insert_with(|| VerdictCache::new(period))
        });
        let out = self.correlator.correlate(frame, hold.as_deref_mut());
        if let Some(cache) = hold {
            cache.tick();
        }
        out
    }

    fn finish(&mut self, start: Instant, outputs: &[FrameOutput]) {
        self.prof_correlate += start.elapsed();
        for out in outputs {
            self.metrics.record_frame(out.stream_id, &out.summary);
        }

        let before = self.prof_frames;
        self.prof_frames += outputs.len() as u64;
        if before / 300 != self.prof_frames / 300 {
            tracing::info!(
                frames = self.prof_frames,
                correlate_us_per_frame = format!(
                    "{:.2}",
                    self.prof_correlate.as_secs_f64() * 1e6 / self.prof_frames as f64
                ),
                "engine correlate timings"
            );
        }
    }
}
