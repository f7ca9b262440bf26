// src/logging.rs
//
// Telemetry sinks for the ADDF simulator.
// - EventSink: trait used by the season runner
// - NoopSink:  discards all events
// - FileSink:  writes one JSON object per line (day records, season resets,
//              final summary) for offline analysis

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::Serialize;

use crate::coordinator::DayReport;
use crate::runner::RunSummary;

/// Abstract sink for per-day telemetry.
pub trait EventSink {
    fn log_day(&mut self, report: &DayReport);

    fn log_season_reset(&mut self, _season: u64, _run_day: u64) {}

    fn log_summary(&mut self, _summary: &RunSummary) {}
}

impl<S: EventSink + ?Sized> EventSink for Box<S> {
    fn log_day(&mut self, report: &DayReport) {
        (**self).log_day(report)
    }

    fn log_season_reset(&mut self, season: u64, run_day: u64) {
        (**self).log_season_reset(season, run_day)
    }

    fn log_summary(&mut self, summary: &RunSummary) {
        (**self).log_summary(summary)
    }
}

/// Sink that discards all events.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl EventSink for NoopSink {
    fn log_day(&mut self, _report: &DayReport) {}
}

/// In-memory sink; keeps every day report. Handy for tests and narration.
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub days: Vec<DayReport>,
    pub resets: Vec<(u64, u64)>,
}

impl EventSink for MemorySink {
    fn log_day(&mut self, report: &DayReport) {
        self.days.push(report.clone());
    }

    fn log_season_reset(&mut self, season: u64, run_day: u64) {
        self.resets.push((season, run_day));
    }
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum Record<'a> {
    Day(&'a DayReport),
    SeasonReset { season: u64, run_day: u64 },
    Summary(&'a RunSummary),
}

/// JSONL file sink.
///
/// Each event is one JSON object on its own line, tagged with an `event`
/// field (`day`, `season_reset`, `summary`).
pub struct FileSink {
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create a new sink writing to `path`.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn write_record(&mut self, record: &Record<'_>) {
        // Telemetry failures must not abort a simulation, so I/O and
        // encoding errors are dropped here.
        if let Ok(line) = serde_json::to_string(record) {
            let _ = self.writer.write_all(line.as_bytes());
            let _ = self.writer.write_all(b"\n");
        }
    }
}

impl EventSink for FileSink {
    fn log_day(&mut self, report: &DayReport) {
        self.write_record(&Record::Day(report));
    }

    fn log_season_reset(&mut self, season: u64, run_day: u64) {
        self.write_record(&Record::SeasonReset { season, run_day });
    }

    fn log_summary(&mut self, summary: &RunSummary) {
        self.write_record(&Record::Summary(summary));
        let _ = self.writer.flush();
    }
}

impl Drop for FileSink {
    fn drop(&mut self) {
        let _ = self.writer.flush();
    }
}
