use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::ops::Range;
use std::path::Path;

use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::analysis::error::{AnalysisError, MalformedCause};
use crate::types::SensorChannel;

/// Instrument banner lines preceding the first sample row.
pub const PREAMBLE_LINES: usize = 27;
/// Fields per sample row.
pub const FIELD_COUNT: usize = 14;

/// One acquisition row. Field order is the on-disk column order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SampleRow {
    pub number: u64,
    pub date: String,
    pub time: String,
    pub us: f64,
    pub ch1: f64,
    pub ch2: f64,
    pub ch3: f64,
    pub ch4: f64,
    pub ch5: f64,
    pub extra1: f64,
    pub extra2: f64,
    pub extra3: f64,
    pub dummy1: String,
    pub dummy2: String,
}

impl SampleRow {
    pub fn pressure(&self, channel: SensorChannel) -> f64 {
        match channel {
            SensorChannel::Ch1 => self.ch1,
            SensorChannel::Ch2 => self.ch2,
            SensorChannel::Ch3 => self.ch3,
            SensorChannel::Ch4 => self.ch4,
            SensorChannel::Ch5 => self.ch5,
        }
    }
}

/// Parsed recording in acquisition order. Never modified after loading.
#[derive(Clone, Debug, Default)]
pub struct SampleTable {
    rows: Vec<SampleRow>,
}

impl SampleTable {
    pub fn from_rows(rows: Vec<SampleRow>) -> Self {
        Self { rows }
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| AnalysisError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::from_reader(file)?;
        info!("loaded {} samples from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AnalysisError> {
        Self::from_reader(bytes)
    }

    /// Skips the instrument preamble, then reads headerless comma separated rows.
    /// Any deviation from the 14-field layout rejects the whole input.
    pub fn from_reader<R: Read>(input: R) -> Result<Self, AnalysisError> {
        let mut input = BufReader::new(input);
        skip_preamble(&mut input)?;
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(input);
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(MalformedCause::from)?;
            if record.len() != FIELD_COUNT {
                let line = record
                    .position()
                    .map(|p| p.line() as usize + PREAMBLE_LINES)
                    .unwrap_or_default();
                return Err(MalformedCause::FieldCount {
                    line,
                    found: record.len(),
                    expected: FIELD_COUNT,
                }
                .into());
            }
            let row: SampleRow = record.deserialize(None).map_err(MalformedCause::from)?;
            rows.push(row);
        }
        if rows.is_empty() {
            return Err(MalformedCause::NoRows.into());
        }
        debug!("parsed {} sample rows", rows.len());
        Ok(Self { rows })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[SampleRow] {
        &self.rows
    }

    pub fn column(&self, channel: SensorChannel) -> Vec<f64> {
        self.rows.iter().map(|row| row.pressure(channel)).collect()
    }

    /// Values of one channel over `range`. Callers pass ranges built from
    /// edge indices, which always lie inside the table.
    pub fn values(&self, channel: SensorChannel, range: Range<usize>) -> Vec<f64> {
        self.rows[range]
            .iter()
            .map(|row| row.pressure(channel))
            .collect()
    }
}

fn skip_preamble<R: BufRead>(input: &mut R) -> Result<(), MalformedCause> {
    // Raw bytes: the banner is not guaranteed to be UTF-8.
    let mut line = Vec::new();
    for read in 0..PREAMBLE_LINES {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            return Err(MalformedCause::TruncatedPreamble {
                read,
                expected: PREAMBLE_LINES,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Write;

    /// Builds a recording in the instrument's layout with the given trigger trace.
    pub(crate) fn recording_with_trigger(trigger: &[f64]) -> String {
        let mut text = String::new();
        for i in 0..PREAMBLE_LINES {
            text.push_str(&format!("# banner line {i}\n"));
        }
        for (i, ch5) in trigger.iter().enumerate() {
            text.push_str(&format!(
                "{},2024/05/14,10:21:{:02},{},{},{},{},{},{},0.1,0.2,0.3,x,y\n",
                i + 1,
                i % 60,
                i * 1000,
                i as f64,
                i as f64 * 2.0,
                -(i as f64),
                100.0 + i as f64,
                ch5
            ));
        }
        text
    }

    #[test]
    fn parses_rows_after_preamble() {
        let text = recording_with_trigger(&[10.0, 30.0, 5.0]);
        let table = SampleTable::from_bytes(text.as_bytes()).unwrap();
        assert_eq!(table.len(), 3);
        let row = &table.rows()[1];
        assert_eq!(row.number, 2);
        assert_eq!(row.date, "2024/05/14");
        assert_eq!(row.us, 1000.0);
        assert_eq!(row.ch2, 2.0);
        assert_eq!(row.ch4, 101.0);
        assert_eq!(row.dummy2, "y");
        assert_eq!(table.column(SensorChannel::Ch5), vec![10.0, 30.0, 5.0]);
        assert_eq!(table.values(SensorChannel::Ch1, 1..3), vec![1.0, 2.0]);
    }

    #[test]
    fn preamble_is_not_required_to_be_utf8() {
        let mut bytes = vec![0xff, 0xfe, b'\n'];
        let text = recording_with_trigger(&[1.0, 2.0]);
        // Replace the first banner line with invalid UTF-8.
        let rest = text.split_once('\n').map(|(_, rest)| rest).unwrap();
        bytes.extend_from_slice(rest.as_bytes());
        let table = SampleTable::from_bytes(&bytes).unwrap();
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn short_preamble_is_malformed() {
        let text = "only\nthree\nlines\n";
        match SampleTable::from_bytes(text.as_bytes()) {
            Err(AnalysisError::MalformedInput(MalformedCause::TruncatedPreamble {
                read,
                expected,
            })) => {
                assert_eq!(read, 3);
                assert_eq!(expected, PREAMBLE_LINES);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn preamble_without_rows_is_malformed() {
        let text = recording_with_trigger(&[]);
        assert!(matches!(
            SampleTable::from_bytes(text.as_bytes()),
            Err(AnalysisError::MalformedInput(MalformedCause::NoRows))
        ));
    }

    #[test]
    fn wrong_field_count_is_malformed() {
        let mut text = recording_with_trigger(&[1.0]);
        text.push_str("2,2024/05/14,10:21:01,1000,1,2,3,4\n");
        match SampleTable::from_bytes(text.as_bytes()) {
            Err(AnalysisError::MalformedInput(MalformedCause::FieldCount {
                found,
                expected,
                ..
            })) => {
                assert_eq!(found, 8);
                assert_eq!(expected, FIELD_COUNT);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn non_numeric_pressure_is_malformed() {
        let mut text = recording_with_trigger(&[1.0]);
        text.push_str("2,2024/05/14,10:21:01,1000,abc,2,3,4,5,0,0,0,x,y\n");
        assert!(matches!(
            SampleTable::from_bytes(text.as_bytes()),
            Err(AnalysisError::MalformedInput(MalformedCause::Csv(_)))
        ));
    }

    #[test]
    fn loads_from_path_and_reports_missing_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(recording_with_trigger(&[1.0, 40.0]).as_bytes())
            .unwrap();
        let table = SampleTable::from_path(file.path()).unwrap();
        assert_eq!(table.len(), 2);

        let missing = file.path().with_extension("missing");
        assert!(matches!(
            SampleTable::from_path(&missing),
            Err(AnalysisError::Io { .. })
        ));
    }
}
