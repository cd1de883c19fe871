// src/analysis/mod.rs
pub mod align;
pub mod error;
pub mod plot;
pub mod reconstruct;
pub mod record;
pub mod render;
pub mod segment;
pub mod session;
// Re-exports for the shells
pub use align::{align_channel, align_cycle, channel_shift, rotate, sample_shift, AlignedSignal};
pub use error::{AnalysisError, MalformedCause};
pub use plot::{render_cycle_png, PlotStyle};
pub use reconstruct::{reconstruct, CycleMetrics, ValueRange, SAMPLE_PERIOD_MS};
pub use record::{SampleRow, SampleTable};
pub use render::{render_cycle, render_cycle_with_period, CycleRenderData, PlotSeries};
pub use segment::{detect_edges, segment, CycleWindow, EdgeIndexList};
pub use session::CycleSession;
