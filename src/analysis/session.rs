use std::io::Read;
use std::path::Path;

use log::info;

use crate::analysis::error::AnalysisError;
use crate::analysis::record::SampleTable;
use crate::analysis::render::{render_cycle_with_period, CycleRenderData};
use crate::analysis::segment::{segment, EdgeIndexList};
use crate::analysis::reconstruct::SAMPLE_PERIOD_MS;
use crate::types::OffsetConfiguration;

/// A loaded recording together with its trigger edges. Built once per file;
/// a shell swaps its session only when a new one loads successfully.
#[derive(Clone, Debug)]
pub struct CycleSession {
    source: String,
    table: SampleTable,
    edges: EdgeIndexList,
    sample_period_ms: f64,
}

impl CycleSession {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let table = SampleTable::from_path(path)?;
        Self::from_table(path.display().to_string(), table)
    }

    pub fn from_reader<R: Read>(source: impl Into<String>, input: R) -> Result<Self, AnalysisError> {
        let table = SampleTable::from_reader(input)?;
        Self::from_table(source, table)
    }

    pub fn from_table(source: impl Into<String>, table: SampleTable) -> Result<Self, AnalysisError> {
        let source = source.into();
        let edges = segment(&table)?;
        info!(
            "{}: {} samples, {} cycles",
            source,
            table.len(),
            edges.cycle_count()
        );
        Ok(Self {
            source,
            table,
            edges,
            sample_period_ms: SAMPLE_PERIOD_MS,
        })
    }

    pub fn with_sample_period_ms(mut self, sample_period_ms: f64) -> Self {
        self.sample_period_ms = sample_period_ms;
        self
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn table(&self) -> &SampleTable {
        &self.table
    }

    pub fn edges(&self) -> &EdgeIndexList {
        &self.edges
    }

    pub fn cycle_count(&self) -> usize {
        self.edges.cycle_count()
    }

    /// Highest valid cycle number.
    pub fn last_cycle(&self) -> usize {
        self.cycle_count().saturating_sub(1)
    }

    pub fn render(
        &self,
        cycle_number: usize,
        offsets: &OffsetConfiguration,
    ) -> Result<CycleRenderData, AnalysisError> {
        render_cycle_with_period(
            &self.table,
            &self.edges,
            cycle_number,
            offsets,
            self.sample_period_ms,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::record::tests::recording_with_trigger;

    fn trigger_with_cycles(lengths: &[usize]) -> Vec<f64> {
        let mut trigger = vec![0.0];
        for &len in lengths {
            trigger.push(40.0);
            trigger.extend(std::iter::repeat(0.0).take(len - 1));
        }
        trigger.push(40.0);
        trigger
    }

    #[test]
    fn loads_segments_and_renders() {
        let text = recording_with_trigger(&trigger_with_cycles(&[100, 40, 2, 60]));
        let session = CycleSession::from_reader("memory", text.as_bytes()).unwrap();
        assert_eq!(session.source(), "memory");
        assert_eq!(session.edges().as_slice(), &[1, 101, 141, 143, 203]);
        assert_eq!(session.cycle_count(), 4);
        assert_eq!(session.last_cycle(), 3);

        let data = session.render(0, &OffsetConfiguration::default()).unwrap();
        assert_eq!(data.rpm, 600.0);
        // Shortest cycle a scan can produce: above, then at-or-below.
        let shortest = session.render(2, &OffsetConfiguration::default()).unwrap();
        assert_eq!(shortest.samples, 2);
        assert_eq!(shortest.half_cycle[0].compression.points.len(), 1);
        assert!(matches!(
            session.render(4, &OffsetConfiguration::default()),
            Err(AnalysisError::InvalidCycleNumber { .. })
        ));
    }

    #[test]
    fn recording_without_cycles_does_not_open() {
        let text = recording_with_trigger(&[1.0; 50]);
        assert!(matches!(
            CycleSession::from_reader("flat", text.as_bytes()),
            Err(AnalysisError::InsufficientCycles { found: 0 })
        ));
    }

    #[test]
    fn sample_period_is_configurable() {
        let text = recording_with_trigger(&trigger_with_cycles(&[100, 100]));
        let session = CycleSession::from_reader("memory", text.as_bytes())
            .unwrap()
            .with_sample_period_ms(2.0);
        let data = session.render(1, &OffsetConfiguration::zero()).unwrap();
        assert_eq!(data.duration_ms, 200.0);
        assert_eq!(data.rpm, 300.0);
    }
}
