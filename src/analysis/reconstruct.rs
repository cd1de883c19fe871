use serde::Serialize;

use crate::analysis::align::AlignedSignal;
use crate::analysis::error::AnalysisError;
use crate::analysis::segment::evenly_spaced;
use crate::types::SensorChannel;

/// Acquisition period of the source instrument: one sample per millisecond.
pub const SAMPLE_PERIOD_MS: f64 = 1.0;

const MS_PER_MINUTE: f64 = 60_000.0;
const RANGE_MARGIN: f64 = 0.05;

/// Value range shared by all channels of one cycle, with a 5% margin.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
}

impl ValueRange {
    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    pub fn is_flat(&self) -> bool {
        self.span() <= 0.0
    }

    /// Bounds safe to hand to a renderer: a flat range is widened by `fallback` each way.
    pub fn plot_bounds(&self, fallback: f64) -> (f64, f64) {
        if self.is_flat() {
            (self.min - fallback, self.max + fallback)
        } else {
            (self.min, self.max)
        }
    }
}

/// Compression and reversed decompression halves of one channel.
#[derive(Clone, Debug, PartialEq)]
pub struct HalfCycle {
    pub channel: SensorChannel,
    pub compression: Vec<f64>,
    pub decompression: Vec<f64>,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct CycleMetrics {
    pub samples: usize,
    pub duration_ms: f64,
    pub rpm: f64,
}

impl CycleMetrics {
    pub fn new(samples: usize, sample_period_ms: f64) -> Self {
        let duration_ms = samples as f64 * sample_period_ms;
        Self {
            samples,
            duration_ms,
            rpm: MS_PER_MINUTE / duration_ms,
        }
    }
}

/// Everything derived from one aligned cycle.
#[derive(Clone, Debug, PartialEq)]
pub struct ReconstructedCycle {
    pub angles: Vec<f64>,
    pub half_angles: Vec<f64>,
    pub halves: Vec<HalfCycle>,
    pub range: ValueRange,
    pub metrics: CycleMetrics,
}

/// Splits at `mid = n / 2`. With odd `n` the middle sample belongs to neither half.
pub fn split_halves(signal: &AlignedSignal) -> HalfCycle {
    let n = signal.samples.len();
    let mid = n / 2;
    HalfCycle {
        channel: signal.channel,
        compression: signal.samples[..mid].to_vec(),
        decompression: signal.samples[n - mid..].iter().rev().copied().collect(),
    }
}

/// Range over the full aligned signals of every channel, padded by 5% of the span.
pub fn shared_range(signals: &[AlignedSignal]) -> Option<ValueRange> {
    let mut values = signals.iter().flat_map(|s| s.samples.iter().copied());
    let first = values.next()?;
    let (min, max) = values.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let margin = RANGE_MARGIN * (max - min);
    Some(ValueRange {
        min: min - margin,
        max: max + margin,
    })
}

/// `cycle` only labels the error of a degenerate window.
pub fn reconstruct(
    cycle: usize,
    signals: &[AlignedSignal],
    n: usize,
    sample_period_ms: f64,
) -> Result<ReconstructedCycle, AnalysisError> {
    if n < 2 || signals.iter().any(|s| s.samples.len() != n) {
        return Err(AnalysisError::DegenerateCycle { cycle, samples: n });
    }
    let range = shared_range(signals).ok_or(AnalysisError::DegenerateCycle { cycle, samples: n })?;
    let mid = n / 2;
    Ok(ReconstructedCycle {
        angles: evenly_spaced(360.0, n),
        half_angles: evenly_spaced(180.0, mid),
        halves: signals.iter().map(split_halves).collect(),
        range,
        metrics: CycleMetrics::new(n, sample_period_ms),
    })
}
