use log::info;
use serde::Serialize;

use crate::analysis::align::align_cycle;
use crate::analysis::error::AnalysisError;
use crate::analysis::reconstruct::{reconstruct, ValueRange, SAMPLE_PERIOD_MS};
use crate::analysis::record::SampleTable;
use crate::analysis::segment::{CycleWindow, EdgeIndexList};
use crate::types::{OffsetConfiguration, SensorChannel, TRACKED_CHANNELS};

/// X-axis limits of the full-cycle view.
pub const FULL_CYCLE_X_LIMITS: (f64, f64) = (-10.0, 390.0);
/// X-axis limits of the half-cycle view.
pub const HALF_CYCLE_X_LIMITS: (f64, f64) = (-10.0, 190.0);

/// One plottable line: `[angle, value]` pairs.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct PlotSeries {
    pub channel: SensorChannel,
    pub label: String,
    pub color: [u8; 3],
    pub points: Vec<[f64; 2]>,
}

impl PlotSeries {
    fn new(channel: SensorChannel, label: String, angles: &[f64], values: &[f64]) -> Self {
        Self {
            channel,
            label,
            color: channel.color_rgb(),
            points: angles.iter().zip(values).map(|(&a, &v)| [a, v]).collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HalfCycleSeries {
    pub compression: PlotSeries,
    pub decompression: PlotSeries,
}

/// Ready-to-draw description of one cycle; renderers do no further math.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CycleRenderData {
    pub cycle_number: usize,
    pub window: CycleWindow,
    pub full_cycle: Vec<PlotSeries>,
    pub half_cycle: Vec<HalfCycleSeries>,
    pub value_range: ValueRange,
    pub samples: usize,
    pub duration_ms: f64,
    pub rpm: f64,
    pub offsets: OffsetConfiguration,
}

impl CycleRenderData {
    /// One-based cycle title.
    pub fn title(&self) -> String {
        format!("Cycle {}", self.cycle_number + 1)
    }

    pub fn summary(&self) -> String {
        let channels = TRACKED_CHANNELS
            .iter()
            .map(|&ch| format!("{}: {}°", ch.label(), self.offsets.channel(ch)))
            .collect::<Vec<_>>()
            .join(" | ");
        format!(
            "Duration: {} ms | Speed: {:.1} RPM | Global offset: {}° | {}",
            self.duration_ms, self.rpm, self.offsets.global, channels
        )
    }
}

/// Aligns and reconstructs cycle `cycle_number` assuming one sample per millisecond.
pub fn render_cycle(
    table: &SampleTable,
    edges: &EdgeIndexList,
    cycle_number: usize,
    offsets: &OffsetConfiguration,
) -> Result<CycleRenderData, AnalysisError> {
    render_cycle_with_period(table, edges, cycle_number, offsets, SAMPLE_PERIOD_MS)
}

pub fn render_cycle_with_period(
    table: &SampleTable,
    edges: &EdgeIndexList,
    cycle_number: usize,
    offsets: &OffsetConfiguration,
    sample_period_ms: f64,
) -> Result<CycleRenderData, AnalysisError> {
    offsets.validate()?;
    let window = edges.window(cycle_number)?;
    if window.end > table.len() {
        return Err(AnalysisError::InvalidCycleNumber {
            requested: cycle_number,
            available: edges.cycle_count(),
        });
    }
    let n = window.len();
    if n < 2 {
        return Err(AnalysisError::DegenerateCycle {
            cycle: cycle_number,
            samples: n,
        });
    }

    let aligned = align_cycle(table, window, offsets);
    let cycle = reconstruct(cycle_number, &aligned, n, sample_period_ms)?;

    let full_cycle = aligned
        .iter()
        .map(|s| PlotSeries::new(s.channel, s.channel.label().to_owned(), &cycle.angles, &s.samples))
        .collect();
    let half_cycle = cycle
        .halves
        .iter()
        .map(|h| HalfCycleSeries {
            compression: PlotSeries::new(
                h.channel,
                format!("{} compression", h.channel.label()),
                &cycle.half_angles,
                &h.compression,
            ),
            decompression: PlotSeries::new(
                h.channel,
                format!("{} decompression", h.channel.label()),
                &cycle.half_angles,
                &h.decompression,
            ),
        })
        .collect();

    info!(
        "rendered cycle {} [{}, {}): {} samples, {:.1} rpm",
        cycle_number, window.start, window.end, n, cycle.metrics.rpm
    );
    Ok(CycleRenderData {
        cycle_number,
        window,
        full_cycle,
        half_cycle,
        value_range: cycle.range,
        samples: n,
        duration_ms: cycle.metrics.duration_ms,
        rpm: cycle.metrics.rpm,
        offsets: *offsets,
    })
}
