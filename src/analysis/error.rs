use std::path::PathBuf;

use thiserror::Error;

/// Everything the analysis core reports to its caller. Nothing is retried or
/// replaced by a fallback value internally.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("malformed input: {0}")]
    MalformedInput(#[from] MalformedCause),
    #[error("not enough trigger edges to form a cycle: found {found}, need at least 2")]
    InsufficientCycles { found: usize },
    #[error("cycle {requested} out of range: {available} cycle(s) available")]
    InvalidCycleNumber { requested: usize, available: usize },
    #[error("cycle {cycle} has {samples} sample(s); at least 2 are needed")]
    DegenerateCycle { cycle: usize, samples: usize },
    #[error("edge list not strictly increasing at position {position}: {previous} then {next}")]
    UnorderedEdges {
        position: usize,
        previous: usize,
        next: usize,
    },
    #[error("{label} offset {degrees}° is outside 0..=360")]
    OffsetOutOfRange { label: &'static str, degrees: u16 },
    #[error("cannot open {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to render plot: {0}")]
    Plot(String),
}

/// Underlying reason a recording was rejected by the record parser.
#[derive(Debug, Error)]
pub enum MalformedCause {
    #[error("input ended after {read} of {expected} preamble lines")]
    TruncatedPreamble { read: usize, expected: usize },
    #[error("no sample rows after the preamble")]
    NoRows,
    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: usize,
        found: usize,
        expected: usize,
    },
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// Lets chart drawing use `?` directly; the backend error only survives as text.
impl<E> From<plotters::drawing::DrawingAreaErrorKind<E>> for AnalysisError
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn from(err: plotters::drawing::DrawingAreaErrorKind<E>) -> Self {
        Self::Plot(err.to_string())
    }
}
