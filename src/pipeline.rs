use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};

use crate::capture::{CaptureError, FrameBuffer, SampleSource};
use crate::config::Config;
use crate::dsp::{BandTable, LevelScale, SpectrumAnalyzer};
use crate::output::FrameSink;

/// What a single scheduler tick did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tick {
    /// Interval not yet elapsed; nothing ran.
    Idle,
    /// Full pass: capture, analyze, aggregate, encode, emit.
    Emitted,
    /// Capture failed; the cycle was abandoned with nothing emitted.
    Skipped,
    /// The source is out of data; no further cycles will run.
    Finished,
}

/// Fixed-cadence gate over an elapsed-time check, no blocking involved.
struct Cadence {
    interval: Duration,
    last: Option<Instant>,
}

impl Cadence {
    fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// True at most once per interval, the first call included. The
    /// recorded time advances on admission, before the cycle's work, so a
    /// cycle that overruns delays later cycles instead of queueing them.
    fn admit(&mut self) -> bool {
        let due = match self.last {
            None => true,
            Some(last) => last.elapsed() >= self.interval,
        };
        if due {
            self.last = Some(Instant::now());
        }
        due
    }
}

/// The whole analysis chain with its pre-sized buffers. Every cycle rewrites
/// the same memory; nothing is allocated after construction.
pub struct Pipeline {
    cadence: Cadence,
    frame: FrameBuffer,
    analyzer: SpectrumAnalyzer,
    bands: BandTable,
    scale: LevelScale,
    levels: Vec<f32>,
}

impl Pipeline {
    pub fn new(cfg: &Config) -> Self {
        let analysis = &cfg.analysis;
        let bin_width = analysis.sample_rate as f32 / analysis.frame_len as f32;
        let bands = BandTable::new(&cfg.bands.boundaries, bin_width, analysis.frame_len / 2);
        let levels = vec![0.0; bands.band_count()];
        Self {
            cadence: Cadence::new(Duration::from_millis(analysis.interval_ms)),
            frame: FrameBuffer::new(analysis.frame_len),
            analyzer: SpectrumAnalyzer::new(
                analysis.frame_len,
                analysis.sample_rate,
                analysis.max_frequency,
            ),
            bands,
            scale: LevelScale::new(cfg.levels.floor, cfg.levels.min_db, cfg.levels.max_db),
            levels,
        }
    }

    /// One scheduler iteration: a no-op unless the interval has elapsed,
    /// then a full pass. A failed capture abandons the cycle silently and
    /// the next eligible cycle starts fresh; only sink errors abort.
    pub fn tick<W: Write>(
        &mut self,
        source: &mut dyn SampleSource,
        sink: &mut FrameSink<W>,
    ) -> Result<Tick> {
        if !self.cadence.admit() {
            return Ok(Tick::Idle);
        }
        let frame = match self.frame.fill(source) {
            Ok(frame) => frame,
            Err(CaptureError::Exhausted) => return Ok(Tick::Finished),
            Err(err) => {
                log::debug!("Capture failed, skipping cycle: {}", err);
                return Ok(Tick::Skipped);
            }
        };
        let mags = self.analyzer.analyze(frame);
        self.bands.aggregate_into(mags, &mut self.levels);
        for level in &mut self.levels {
            *level = self.scale.encode(*level);
        }
        sink.write_frame(&self.levels)
            .context("Failed to write frame")?;
        Ok(Tick::Emitted)
    }
}
