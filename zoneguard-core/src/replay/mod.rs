//! replay — drive the engine from recorded perception metadata
//!
//! Input is JSON Lines: each line is either one frame record or a batch
//! record `{"frames": [...]}`.  Output is JSON Lines with one `FrameOutput`
//! per processed frame, in input order.
//!
//! A line that fails to parse is logged and skipped; per-frame data never
//! aborts a replay.  Only I/O failures do.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::pipeline::{BatchMeta, ComplianceEngine, FrameMeta, FrameOutput};

/// Counters for a finished (or in-progress) replay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ReplayStats {
    /// Non-blank input lines seen.
    pub lines: u64,
    pub frames: u64,
    /// Lines that failed to parse.
    pub skipped: u64,
    pub alerts: u64,
}

enum Record {
    Frame(FrameMeta),
    Batch(Vec<FrameMeta>),
}

fn parse_line(line: &str) -> Result<Record> {
    let value: serde_json::Value = serde_json::from_str(line).context("not valid JSON")?;
    if value.get("frames").is_some() {
        let batch: BatchMeta = serde_json::from_value(value).context("malformed batch record")?;
        Ok(Record::Batch(batch.frames))
    } else {
        let frame: FrameMeta = serde_json::from_value(value).context("malformed frame record")?;
        Ok(Record::Frame(frame))
    }
}

/// Replay every record from `input_path`, calling `frame_fn` with each
/// frame's output.
pub fn replay<P, F>(input_path: P, engine: &mut ComplianceEngine, mut frame_fn: F) -> Result<ReplayStats>
where
    P: AsRef<Path>,
    F: FnMut(&FrameOutput) -> Result<()>,
{
    let reader = open_input(input_path.as_ref())?;
    replay_reader(reader, engine, &mut frame_fn, &mut |_| {})
}

/// Replay `input_path` and write every frame output to `output_path` as JSON
/// Lines.  `progress_fn` is called after each input line.
pub fn replay_to_file<P, Q, G>(
    input_path: P,
    output_path: Q,
    engine: &mut ComplianceEngine,
    mut progress_fn: G,
) -> Result<ReplayStats>
where
    P: AsRef<Path>,
    Q: AsRef<Path>,
    G: FnMut(&ReplayStats),
{
    let output_path = output_path.as_ref();
    let reader = open_input(input_path.as_ref())?;
    let file = File::create(output_path)
        .with_context(|| format!("could not create output file {}", output_path.display()))?;
    let mut writer = BufWriter::new(file);

    let stats = replay_reader(
        reader,
        engine,
        &mut |out| {
            serde_json::to_writer(&mut writer, out).context("failed to serialise frame output")?;
            writer.write_all(b"\n").context("failed to write output line")
        },
        &mut progress_fn,
    )?;

    writer.flush().context("failed to flush output file")?;
    Ok(stats)
}

/// Core loop over any line source.
pub fn replay_reader<R: BufRead>(
    reader: R,
    engine: &mut ComplianceEngine,
    frame_fn: &mut dyn FnMut(&FrameOutput) -> Result<()>,
    progress_fn: &mut dyn FnMut(&ReplayStats),
) -> Result<ReplayStats> {
    let mut stats = ReplayStats::default();

    for (line_no, raw) in reader.split(b'\n').enumerate() {
        let raw = raw.with_context(|| format!("failed to read input line {}", line_no + 1))?;
        let line = std::str::from_utf8(&raw).map(str::trim);
        if matches!(line, Ok("")) {
            continue;
        }
        stats.lines += 1;

        let outputs = match line.context("not valid UTF-8").and_then(parse_line) {
            Ok(Record::Frame(frame)) => vec![engine.process_frame(&frame)],
            Ok(Record::Batch(frames)) => engine.process_batch(&frames),
            Err(e) => {
                warn!(line = line_no + 1, "skipping record: {e:#}");
                stats.skipped += 1;
                progress_fn(&stats);
                continue;
            }
        };

        for out in &outputs {
            stats.frames += 1;
            stats.alerts += out.summary.alert_count as u64;
            frame_fn(out)?;
        }
        progress_fn(&stats);

        if stats.lines % 1000 == 0 {
            debug!(lines = stats.lines, frames = stats.frames, "replayed records");
        }
    }

    info!(
        lines = stats.lines,
        frames = stats.frames,
        skipped = stats.skipped,
        alerts = stats.alerts,
        "replay complete"
    );
    Ok(stats)
}

/// Count the non-blank lines of `input_path` (used for progress reporting).
/// Falls back to 0 if the file cannot be read.
pub fn total_records<P: AsRef<Path>>(input_path: P) -> u64 {
    let Ok(file) = File::open(input_path) else {
        return 0;
    };
    BufReader::new(file)
        .split(b'\n')
        .map_while(|line| line.ok())
        .filter(|line| line.iter().any(|b| !b.is_ascii_whitespace()))
        .count() as u64
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
    let file =
        File::open(path).with_context(|| format!("could not open input file {}", path.display()))?;
    info!(path = %path.display(), "replaying frame metadata");
    Ok(BufReader::new(file))
}
