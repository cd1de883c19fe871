use std::ops::Range;

use log::debug;
use serde::Serialize;

use crate::analysis::error::AnalysisError;
use crate::analysis::record::SampleTable;
use crate::types::SensorChannel;

/// Channel whose rising edges mark the start of each cycle.
pub const TRIGGER_CHANNEL: SensorChannel = SensorChannel::Ch5;
/// Trigger level; an edge is `prev <= level && current > level`.
pub const TRIGGER_THRESHOLD: f64 = 23.0;

/// Strictly increasing row indices of trigger rising edges.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct EdgeIndexList {
    indices: Vec<usize>,
}

impl EdgeIndexList {
    /// Wraps indices produced elsewhere; rejects any list that is not strictly increasing.
    pub fn from_indices(indices: Vec<usize>) -> Result<Self, AnalysisError> {
        if let Some(position) = indices.windows(2).position(|w| w[0] >= w[1]) {
            return Err(AnalysisError::UnorderedEdges {
                position: position + 1,
                previous: indices[position],
                next: indices[position + 1],
            });
        }
        Ok(Self { indices })
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.indices
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Number of complete cycles between consecutive edges.
    pub fn cycle_count(&self) -> usize {
        self.indices.len().saturating_sub(1)
    }

    pub fn ensure_cycles(&self) -> Result<(), AnalysisError> {
        if self.indices.len() < 2 {
            return Err(AnalysisError::InsufficientCycles {
                found: self.indices.len(),
            });
        }
        Ok(())
    }

    /// Window of cycle `cycle`, bounded by edges `cycle` and `cycle + 1`.
    pub fn window(&self, cycle: usize) -> Result<CycleWindow, AnalysisError> {
        self.ensure_cycles()?;
        let end = cycle.checked_add(1).and_then(|next| self.indices.get(next));
        match (self.indices.get(cycle), end) {
            (Some(&start), Some(&end)) => Ok(CycleWindow { start, end }),
            _ => Err(AnalysisError::InvalidCycleNumber {
                requested: cycle,
                available: self.cycle_count(),
            }),
        }
    }
}

/// Half-open row range `[start, end)` covering one cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct CycleWindow {
    pub start: usize,
    pub end: usize,
}

impl CycleWindow {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    /// `k * 360 / n` for each of the window's `n` samples.
    pub fn angles(&self) -> Vec<f64> {
        evenly_spaced(360.0, self.len())
    }
}

/// `count` points from 0 towards `span`, excluding `span` itself.
pub(crate) fn evenly_spaced(span: f64, count: usize) -> Vec<f64> {
    (0..count)
        .map(|k| k as f64 * span / count as f64)
        .collect()
}

/// Single left-to-right scan of the trigger channel. May return fewer than two edges.
pub fn detect_edges(table: &SampleTable) -> EdgeIndexList {
    let indices: Vec<usize> = table
        .rows()
        .windows(2)
        .enumerate()
        .filter(|(_, pair)| {
            let prev = pair[0].pressure(TRIGGER_CHANNEL);
            let current = pair[1].pressure(TRIGGER_CHANNEL);
            prev <= TRIGGER_THRESHOLD && current > TRIGGER_THRESHOLD
        })
        .map(|(i, _)| i + 1)
        .collect();
    debug!(
        "found {} trigger edges in {} samples",
        indices.len(),
        table.len()
    );
    EdgeIndexList { indices }
}

/// Edge scan that also requires at least one complete cycle.
pub fn segment(table: &SampleTable) -> Result<EdgeIndexList, AnalysisError> {
    let edges = detect_edges(table);
    edges.ensure_cycles()?;
    Ok(edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::record::tests::recording_with_trigger;

    fn table(trigger: &[f64]) -> SampleTable {
        SampleTable::from_bytes(recording_with_trigger(trigger).as_bytes()).unwrap()
    }

    #[test]
    fn finds_strict_rising_crossings_only() {
        // 23 itself is not above the threshold; 23 -> 24 is an edge.
        let t = table(&[30.0, 10.0, 23.0, 24.0, 50.0, 23.0, 23.5, 0.0, 23.0]);
        assert_eq!(detect_edges(&t).as_slice(), &[3, 6]);
    }

    #[test]
    fn first_row_is_never_an_edge() {
        let t = table(&[40.0, 40.0, 0.0, 40.0]);
        assert_eq!(detect_edges(&t).as_slice(), &[3]);
    }

    #[test]
    fn alternating_trigger_gives_two_sample_cycles() {
        let t = table(&[0.0, 30.0, 0.0, 30.0, 30.0, 0.0, 30.0]);
        let edges = segment(&t).unwrap();
        assert_eq!(edges.as_slice(), &[1, 3, 6]);
        assert_eq!(edges.window(0).unwrap().len(), 2);
    }

    #[test]
    fn edges_one_row_apart_give_a_one_sample_window() {
        let edges = EdgeIndexList::from_indices(vec![4, 5]).unwrap();
        assert_eq!(edges.cycle_count(), 1);
        assert_eq!(edges.window(0).unwrap().len(), 1);
    }

    #[test]
    fn flat_trigger_yields_no_edges_and_no_segmentation() {
        let t = table(&[5.0; 20]);
        assert!(detect_edges(&t).is_empty());
        assert!(matches!(
            segment(&t),
            Err(AnalysisError::InsufficientCycles { found: 0 })
        ));
    }

    #[test]
    fn single_edge_is_insufficient() {
        let t = table(&[0.0, 30.0, 30.0]);
        assert!(matches!(
            segment(&t),
            Err(AnalysisError::InsufficientCycles { found: 1 })
        ));
    }

    #[test]
    fn windows_follow_consecutive_edges() {
        let edges = EdgeIndexList::from_indices(vec![5, 105, 205, 300]).unwrap();
        assert_eq!(edges.cycle_count(), 3);
        let window = edges.window(1).unwrap();
        assert_eq!(window, CycleWindow { start: 105, end: 205 });
        assert_eq!(window.len(), 100);
        assert_eq!(edges.window(2).unwrap().len(), 95);
        assert!(matches!(
            edges.window(3),
            Err(AnalysisError::InvalidCycleNumber {
                requested: 3,
                available: 3
            })
        ));
    }

    #[test]
    fn out_of_order_indices_are_rejected() {
        for (indices, position, previous, next) in [
            (vec![10, 5, 20], 1, 10, 5),
            (vec![1, 4, 4, 9], 2, 4, 4),
        ] {
            match EdgeIndexList::from_indices(indices) {
                Err(AnalysisError::UnorderedEdges {
                    position: p,
                    previous: a,
                    next: b,
                }) => assert_eq!((p, a, b), (position, previous, next)),
                other => panic!("unexpected result: {other:?}"),
            }
        }
        assert!(EdgeIndexList::from_indices(vec![]).unwrap().is_empty());
    }

    #[test]
    fn largest_cycle_number_is_out_of_range() {
        let edges = EdgeIndexList::from_indices(vec![0, 10, 20]).unwrap();
        assert!(matches!(
            edges.window(usize::MAX),
            Err(AnalysisError::InvalidCycleNumber {
                requested: usize::MAX,
                available: 2
            })
        ));
    }

    #[test]
    fn angles_cover_a_turn_without_the_endpoint() {
        let window = CycleWindow { start: 0, end: 8 };
        assert_eq!(
            window.angles(),
            vec![0.0, 45.0, 90.0, 135.0, 180.0, 225.0, 270.0, 315.0]
        );
    }
}
