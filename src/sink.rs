use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, Int32Array, StringArray, UInt32Array},
    csv::WriterBuilder,
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    str::FromStr,
    sync::Arc,
};
use tracing::info;

use crate::{calendar::BulletinWeek, extract::ReservoirRecord};

/// File name used in accumulate mode.
pub const ACCUMULATED_FILE: &str = "embalses_acumulado.csv";

/// How weekly results are persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// One file per week (`S`).
    #[default]
    PerWeek,
    /// One file for the whole run (`A`).
    Accumulate,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "S" | "s" => Ok(OutputMode::PerWeek),
            "A" | "a" => Ok(OutputMode::Accumulate),
            other => Err(format!("unknown output mode `{other}` (expected S or A)")),
        }
    }
}

/// CSV destination for scraped weeks.
pub struct CsvSink {
    mode: OutputMode,
    output_dir: PathBuf,
    accumulated: Vec<ReservoirRecord>,
    files_written: Vec<PathBuf>,
    records_written: usize,
}

impl CsvSink {
    pub fn new(mode: OutputMode, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        fs::create_dir_all(&output_dir)
            .with_context(|| format!("creating output directory {}", output_dir.display()))?;
        Ok(Self {
            mode,
            output_dir,
            accumulated: Vec::new(),
            files_written: Vec::new(),
            records_written: 0,
        })
    }

    pub fn mode(&self) -> OutputMode {
        self.mode
    }

    /// Hand over every record scraped for one week.
    pub fn accept_week(&mut self, tag: BulletinWeek, records: Vec<ReservoirRecord>) -> Result<()> {
        match self.mode {
            OutputMode::PerWeek => {
                if records.is_empty() {
                    info!(year = tag.year, week = tag.week, "no data for week; nothing written");
                    return Ok(());
                }
                let path = self
                    .output_dir
                    .join(format!("embalses_{}_{}.csv", tag.year, tag.week));
                self.write(&path, &records)?;
            }
            OutputMode::Accumulate => {
                info!(year = tag.year, week = tag.week, rows = records.len(), "accumulated week");
                self.accumulated.extend(records);
            }
        }
        Ok(())
    }

    /// Flush whatever is still buffered and return the files written during the run.
    pub fn finish(mut self) -> Result<SinkReport> {
        if self.mode == OutputMode::Accumulate {
            let records = std::mem::take(&mut self.accumulated);
            if records.is_empty() {
                info!("no data collected; nothing written");
            } else {
                let path = self.output_dir.join(ACCUMULATED_FILE);
                self.write(&path, &records)?;
            }
        }
        Ok(SinkReport {
            files: self.files_written,
            records: self.records_written,
        })
    }

    fn write(&mut self, path: &Path, records: &[ReservoirRecord]) -> Result<()> {
        write_csv(path, records)?;
        info!(path = %path.display(), rows = records.len(), "data saved");
        self.files_written.push(path.to_path_buf());
        self.records_written += records.len();
        Ok(())
    }
}

/// Files and rows produced by a [`CsvSink`].
#[derive(Clone, Debug, Default)]
pub struct SinkReport {
    pub files: Vec<PathBuf>,
    pub records: usize,
}

fn record_schema() -> Schema {
    let text = |name: &str| Field::new(name, DataType::Utf8, false);
    Schema::new(vec![
        text("district"),
        text("reservoirName"),
        text("river"),
        text("capacity"),
        text("currentVolume"),
        text("differenceFromPrevious"),
        text("availableEnergy"),
        text("energyCapacity"),
        Field::new("year", DataType::Int32, false),
        Field::new("week", DataType::UInt32, false),
    ])
}

fn to_batch(records: &[ReservoirRecord]) -> Result<RecordBatch> {
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.district))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.reservoir_name))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.river))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.capacity))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.current_volume))),
        Arc::new(StringArray::from_iter_values(
            records.iter().map(|r| &r.difference_from_previous),
        )),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.available_energy))),
        Arc::new(StringArray::from_iter_values(records.iter().map(|r| &r.energy_capacity))),
        Arc::new(Int32Array::from_iter_values(records.iter().map(|r| r.year))),
        Arc::new(UInt32Array::from_iter_values(records.iter().map(|r| r.week))),
    ];
    RecordBatch::try_new(Arc::new(record_schema()), columns).context("building record batch")
}

/// Write `records` as UTF-8 CSV with a header row.
///
/// Goes through a `.tmp` sibling so a partially written file never carries the final name.
pub fn write_csv(path: &Path, records: &[ReservoirRecord]) -> Result<()> {
    let batch = to_batch(records)?;
    let tmp_path = path.with_extension("csv.tmp");

    let file = File::create(&tmp_path)
        .with_context(|| format!("creating {}", tmp_path.display()))?;
    let mut writer = WriterBuilder::new()
        .with_header(true)
        .build(BufWriter::new(file));
    writer
        .write(&batch)
        .with_context(|| format!("writing {}", tmp_path.display()))?;
    writer
        .into_inner()
        .flush()
        .with_context(|| format!("flushing {}", tmp_path.display()))?;

    fs::rename(&tmp_path, path)
        .with_context(|| format!("renaming {} to {}", tmp_path.display(), path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(district: &str, name: &str, week: u32) -> ReservoirRecord {
        ReservoirRecord {
            district: district.to_string(),
            reservoir_name: name.to_string(),
            river: "Río".to_string(),
            capacity: "1.234".to_string(),
            current_volume: "567".to_string(),
            difference_from_previous: "-3".to_string(),
            available_energy: "12,5".to_string(),
            energy_capacity: "20".to_string(),
            year: 2024,
            week,
        }
    }

    #[test]
    fn test_output_mode_from_str() {
        assert_eq!("S".parse::<OutputMode>(), Ok(OutputMode::PerWeek));
        assert_eq!("a".parse::<OutputMode>(), Ok(OutputMode::Accumulate));
        assert!("X".parse::<OutputMode>().is_err());
        assert_eq!(OutputMode::default(), OutputMode::PerWeek);
    }

    #[test]
    fn test_per_week_writes_named_file() {
        let tmp = tempdir().unwrap();
        let mut sink = CsvSink::new(OutputMode::PerWeek, tmp.path()).unwrap();
        let tag = BulletinWeek { year: 2024, week: 2 };
        let rows = vec![record("Tinto, Odiel y Piedras", "Alarcón*", 2)];
        sink.accept_week(tag, rows).unwrap();
        sink.accept_week(BulletinWeek { year: 2024, week: 3 }, Vec::new()).unwrap();
        let report = sink.finish().unwrap();

        let path = tmp.path().join("embalses_2024_2.csv");
        assert_eq!(report.files, vec![path.clone()]);
        assert_eq!(report.records, 1);
        assert!(!tmp.path().join("embalses_2024_3.csv").exists());

        let text = fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "district,reservoirName,river,capacity,currentVolume,differenceFromPrevious,availableEnergy,energyCapacity,year,week"
        );
        assert_eq!(
            lines.next().unwrap(),
            "\"Tinto, Odiel y Piedras\",Alarcón*,Río,1.234,567,-3,\"12,5\",20,2024,2"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_accumulate_writes_once_on_finish() {
        let tmp = tempdir().unwrap();
        let mut sink = CsvSink::new(OutputMode::Accumulate, tmp.path().join("out")).unwrap();
        for week in 1..=3 {
            let records = (0..week).map(|i| record("Ebro", &format!("E{i}"), week)).collect();
            sink.accept_week(BulletinWeek { year: 2024, week }, records).unwrap();
        }
        let acc = tmp.path().join("out").join(ACCUMULATED_FILE);
        assert!(!acc.exists());

        let report = sink.finish().unwrap();
        assert_eq!(report.files, vec![acc.clone()]);
        assert_eq!(report.records, 6);
        let text = fs::read_to_string(&acc).unwrap();
        assert_eq!(text.lines().count(), 1 + 6);
    }

    #[test]
    fn test_accumulate_without_records_writes_nothing() {
        let tmp = tempdir().unwrap();
        let mut sink = CsvSink::new(OutputMode::Accumulate, tmp.path()).unwrap();
        sink.accept_week(BulletinWeek { year: 2024, week: 1 }, Vec::new()).unwrap();
        let report = sink.finish().unwrap();
        assert!(report.files.is_empty());
        assert_eq!(fs::read_dir(tmp.path()).unwrap().count(), 0);
    }
}
